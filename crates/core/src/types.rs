//! Gemeinsame Identifikationstypen fuer Podium
//!
//! Die Client-ID ist die Kennung, unter der ein Teilnehmer beim Relay
//! angemeldet ist. Sie wird vom Relay fuer private Kanaele und Presence-
//! Eintraege verwendet und bleibt fuer die Dauer einer Sitzung unveraendert.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Relay-Kennung eines Teilnehmers
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(pub String);

impl ClientId {
    /// Erstellt eine ClientId aus einer beliebigen Zeichenkette
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Erstellt eine neue zufaellige ClientId (UUID v4)
    pub fn zufaellig() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Gibt die Kennung als &str zurueck
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClientId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ClientId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Identitaet eines Teilnehmers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Relay-Kennung, unveraenderlich fuer die Sitzung
    pub id: ClientId,
    /// Anzeigename
    pub display_name: String,
}

impl Identity {
    pub fn new(id: impl Into<ClientId>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

/// Rolle eines Teilnehmers in der Sitzung
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rolle {
    /// Steuert die Praesentation, hoert auf dem Antwort-Kanal
    Host,
    /// Zuschauer, sendet nur
    #[default]
    Publikum,
}

impl Rolle {
    pub fn ist_host(&self) -> bool {
        matches!(self, Self::Host)
    }
}
