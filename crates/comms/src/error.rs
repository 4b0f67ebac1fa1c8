//! Fehlertypen fuer die Sitzungsschicht

use podium_core::PodiumError;
use podium_relay::{ConnectionState, RelayError};
use thiserror::Error;

/// Fehlertyp fuer Comms
#[derive(Debug, Error)]
pub enum CommsError {
    /// Relay blieb zu lange im Verbindungsaufbau
    #[error("Zeitlimit beim Verbinden zum Relay ueberschritten ({versuche} Wartezyklen, zuletzt {zustand})")]
    Zeitlimit {
        versuche: u32,
        zustand: ConnectionState,
    },

    /// Verbindung ist in einem Zustand, in dem Warten nichts bringt
    #[error("Verbindung zum Relay nicht nutzbar: {0}")]
    NichtNutzbar(ConnectionState),

    /// Verbindung ist nach dem Aufbau unbrauchbar geworden
    #[error("Verbindung zum Relay verloren: {0}")]
    VerbindungVerloren(ConnectionState),

    /// `configure` wurde noch nicht aufgerufen
    #[error("Comms ist nicht konfiguriert")]
    NichtKonfiguriert,

    /// Operation braucht eine gestartete Sitzung
    #[error("Sitzung ist nicht gestartet")]
    NichtGestartet,

    #[error("Sitzung ist bereits gestartet")]
    BereitsGestartet,

    /// `stop` oder `configure` kam einem laufenden `start` zuvor
    #[error("Start abgebrochen: Sitzung wurde waehrenddessen gestoppt")]
    Abgebrochen,

    /// Presence-Teilaktualisierung ist kein JSON-Objekt
    #[error("Ungueltige Presence-Daten: {0}")]
    UngueltigePresence(String),

    #[error("Relay-Fehler: {0}")]
    Relay(#[from] RelayError),

    #[error("Serialisierungsfehler: {0}")]
    Serialisierung(#[from] serde_json::Error),
}

impl CommsError {
    /// Gibt true zurueck wenn der Fehler aus dem Warten auf die Verbindung stammt
    pub fn ist_verbindungsfehler(&self) -> bool {
        matches!(
            self,
            Self::Zeitlimit { .. } | Self::NichtNutzbar(_) | Self::VerbindungVerloren(_)
        )
    }
}

impl From<CommsError> for PodiumError {
    fn from(e: CommsError) -> Self {
        match e {
            CommsError::Zeitlimit { .. } => PodiumError::Zeitlimit(e.to_string()),
            CommsError::NichtNutzbar(_) | CommsError::VerbindungVerloren(_) => {
                PodiumError::Verbindung(e.to_string())
            }
            andere => PodiumError::Sitzung(andere.to_string()),
        }
    }
}

/// Result-Typ fuer Comms
pub type CommsResult<T> = Result<T, CommsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zeitlimit_wird_wiederholbarer_podium_fehler() {
        let e: PodiumError = CommsError::Zeitlimit {
            versuche: 20,
            zustand: ConnectionState::Connecting,
        }
        .into();
        assert!(e.ist_wiederholbar());
        assert!(e.to_string().contains("connecting"));
    }

    #[test]
    fn sitzungsfehler_nicht_wiederholbar() {
        let e: PodiumError = CommsError::NichtGestartet.into();
        assert!(!e.ist_wiederholbar());
    }

    #[test]
    fn verbindungsfehler_erkennung() {
        assert!(CommsError::NichtNutzbar(ConnectionState::Failed).ist_verbindungsfehler());
        assert!(!CommsError::Abgebrochen.ist_verbindungsfehler());
    }
}
