//! Datentypen des Relay-Vertrags
//!
//! Nachrichten, Presence-Eintraege und Verbindungszustaende so, wie das
//! Relay sie liefert. Die Sitzungsschicht liest diese Typen nur.

use podium_core::{ClientId, Identity};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Kanalnamen
// ---------------------------------------------------------------------------

/// Namen der drei logischen Kanaele einer Sitzung
pub mod kanal {
    use podium_core::ClientId;

    /// Broadcast an alle Teilnehmer
    pub const BROADCAST_ALLE: &str = "broadcast:all";

    /// Rueckkanal Publikum -> Host, traegt auch die Presence
    pub const ANTWORT: &str = "response";

    /// Privater Broadcast-Kanal eines einzelnen Teilnehmers
    pub fn privat(client_id: &ClientId) -> String {
        format!("broadcast:{client_id}")
    }
}

// ---------------------------------------------------------------------------
// Verbindungszustand
// ---------------------------------------------------------------------------

/// Zustand der Relay-Verbindung
///
/// Gehoert dem Relay-Client; die Sitzung beobachtet ihn nur.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Initialized,
    Connecting,
    Connected,
    Disconnected,
    Suspended,
    Closing,
    Closed,
    Failed,
}

impl ConnectionState {
    /// Verbindung ist fuer eine Sitzung brauchbar
    ///
    /// `Disconnected` zaehlt dazu: das Relay verbindet selbststaendig neu.
    pub fn ist_nutzbar(&self) -> bool {
        matches!(self, Self::Connected | Self::Disconnected)
    }

    /// Verbindungsaufbau laeuft noch
    pub fn ist_uebergang(&self) -> bool {
        matches!(self, Self::Initialized | Self::Connecting)
    }

    /// Kein Warten lohnt sich mehr
    pub fn ist_endgueltig(&self) -> bool {
        !self.ist_nutzbar() && !self.ist_uebergang()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Initialized => "initialized",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
            Self::Suspended => "suspended",
            Self::Closing => "closing",
            Self::Closed => "closed",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Verbindungsoptionen
// ---------------------------------------------------------------------------

/// Zugangsdaten fuer das Relay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Credentials {
    /// Fertiges Token
    Token(String),
    /// Endpunkt, bei dem der Client sich selbst ein Token holt
    AuthUrl(String),
}

/// Alles was zum Aufbau einer Relay-Verbindung noetig ist
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub identity: Identity,
    pub credentials: Credentials,
}

// ---------------------------------------------------------------------------
// Nachrichten
// ---------------------------------------------------------------------------

/// Eingehende Nachricht auf einem Kanal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayMessage {
    /// Ereignisname, unter dem publiziert wurde
    pub name: String,
    /// Absender laut Relay
    pub client_id: ClientId,
    /// Nutzdaten
    pub data: Value,
}

/// Art eines Presence-Ereignisses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceAction {
    Enter,
    Update,
    Leave,
}

/// Presence-Ereignis eines Teilnehmers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenceMessage {
    pub action: PresenceAction,
    pub client_id: ClientId,
    pub data: Value,
}

/// Eintrag in der Presence-Menge eines Kanals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenceMember {
    pub client_id: ClientId,
    pub data: Value,
}

// ---------------------------------------------------------------------------
// Abonnements
// ---------------------------------------------------------------------------

/// Vom Relay vergebene Kennung eines Abonnements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sub:{}", self.0)
    }
}

/// Handler fuer eingehende Kanal-Nachrichten
pub type MessageHandler = Arc<dyn Fn(RelayMessage) + Send + Sync>;

/// Handler fuer Presence-Ereignisse
pub type PresenceHandler = Arc<dyn Fn(PresenceMessage) + Send + Sync>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zustaende_klassifizieren() {
        assert!(ConnectionState::Connected.ist_nutzbar());
        assert!(ConnectionState::Disconnected.ist_nutzbar());
        assert!(ConnectionState::Initialized.ist_uebergang());
        assert!(ConnectionState::Connecting.ist_uebergang());
        for z in [
            ConnectionState::Suspended,
            ConnectionState::Closing,
            ConnectionState::Closed,
            ConnectionState::Failed,
        ] {
            assert!(z.ist_endgueltig(), "{z} muss endgueltig sein");
        }
    }

    #[test]
    fn privater_kanal_enthaelt_client_id() {
        let id = ClientId::new("alice-id");
        assert_eq!(kanal::privat(&id), "broadcast:alice-id");
    }

    #[test]
    fn zustand_serde_kleingeschrieben() {
        let json = serde_json::to_string(&ConnectionState::Suspended).unwrap();
        assert_eq!(json, "\"suspended\"");
    }

    #[test]
    fn credentials_aus_toml_form() {
        let c: Credentials = serde_json::from_str(r#"{"auth_url":"https://auth.example"}"#).unwrap();
        assert_eq!(c, Credentials::AuthUrl("https://auth.example".into()));
    }
}
