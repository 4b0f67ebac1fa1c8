//! Fehlertypen fuer den Relay-Vertrag

use podium_core::ClientId;
use thiserror::Error;

/// Fehlertyp aller Relay-Operationen
#[derive(Debug, Error)]
pub enum RelayError {
    /// Zugangsdaten fehlen oder wurden abgelehnt
    #[error("Authentifizierung beim Relay fehlgeschlagen: {0}")]
    Authentifizierung(String),

    /// Operation auf einer geschlossenen oder fehlgeschlagenen Verbindung
    #[error("Verbindung von {0} ist nicht offen")]
    VerbindungGeschlossen(ClientId),

    /// Presence-Abfrage vom Relay abgelehnt
    #[error("Presence-Abfrage fehlgeschlagen: {0}")]
    PresenceAbfrage(String),

    /// Nutzdaten liessen sich nicht serialisieren
    #[error("Serialisierungsfehler: {0}")]
    Serialisierung(#[from] serde_json::Error),

    /// Sonstiger Fehler des Relays
    #[error("Relay-Fehler: {0}")]
    Intern(String),
}

impl RelayError {
    /// Erstellt einen internen Fehler
    pub fn intern(msg: impl Into<String>) -> Self {
        Self::Intern(msg.into())
    }
}

/// Result-Typ fuer Relay-Operationen
pub type RelayResult<T> = Result<T, RelayError>;
