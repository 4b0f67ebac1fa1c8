//! Fehlertypen fuer Podium
//!
//! Zentraler Fehler-Enum fuer die Anwendungsebene. Die einzelnen Crates
//! definieren eigene Fehler und werden hier via `From` zusammengefuehrt.

use thiserror::Error;

/// Globaler Result-Alias fuer Podium
pub type Result<T> = std::result::Result<T, PodiumError>;

/// Alle Fehler die bis in die Anwendung durchgereicht werden
#[derive(Debug, Error)]
pub enum PodiumError {
    // --- Verbindung & Relay ---
    #[error("Verbindung fehlgeschlagen: {0}")]
    Verbindung(String),

    #[error("Zeitlimit ueberschritten: {0}")]
    Zeitlimit(String),

    #[error("Sitzungsfehler: {0}")]
    Sitzung(String),

    // --- Inhalte ---
    #[error("Board-Fehler: {0}")]
    Board(String),

    #[error("Speicherfehler: {0}")]
    Speicher(String),

    // --- Konfiguration ---
    #[error("Konfigurationsfehler: {0}")]
    Konfiguration(String),

    // --- Intern ---
    #[error("Interner Fehler: {0}")]
    Intern(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl PodiumError {
    /// Erstellt einen internen Fehler aus einer beliebigen Nachricht
    pub fn intern(msg: impl Into<String>) -> Self {
        Self::Intern(msg.into())
    }

    /// Gibt true zurueck wenn ein erneuter Versuch sinnvoll sein koennte
    ///
    /// Die Sitzung selbst wiederholt nichts automatisch; die Oberflaeche
    /// entscheidet anhand dieses Flags ob sie "Erneut verbinden" anbietet.
    pub fn ist_wiederholbar(&self) -> bool {
        matches!(self, Self::Zeitlimit(_) | Self::Verbindung(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fehler_anzeige() {
        let e = PodiumError::Board("Label fehlt".into());
        assert_eq!(e.to_string(), "Board-Fehler: Label fehlt");
    }

    #[test]
    fn wiederholbar_erkennung() {
        assert!(PodiumError::Zeitlimit("relay".into()).ist_wiederholbar());
        assert!(PodiumError::Verbindung("relay".into()).ist_wiederholbar());
        assert!(!PodiumError::Konfiguration("test".into()).ist_wiederholbar());
    }

    #[test]
    fn anyhow_wird_durchgereicht() {
        let e: PodiumError = anyhow::anyhow!("kaputt").into();
        assert_eq!(e.to_string(), "kaputt");
    }
}
