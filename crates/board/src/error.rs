//! Fehlertypen fuer das Board

use podium_core::PodiumError;
use thiserror::Error;

/// Fehlertyp fuer Board-Operationen
#[derive(Debug, Error)]
pub enum BoardError {
    /// `persist_active_slide` vor dem ersten erfolgreichen `load`
    #[error("Board wurde noch nicht geladen")]
    NichtGeladen,

    /// Konfigurationsfehler: das Board hat kein Label fuer die aktive Folie
    #[error("Board hat kein Label '{0}' fuer die aktive Folie")]
    AktivLabelFehlt(String),

    #[error("Ungueltige Board-URL: {0}")]
    UngueltigeUrl(String),

    #[error("Board-API antwortete mit HTTP {status}: {text}")]
    Status { status: u16, text: String },

    #[error("HTTP-Fehler: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Board-Daten nicht lesbar: {0}")]
    Serialisierung(#[from] serde_json::Error),
}

impl BoardError {
    /// Fehler, die auf falsche Konfiguration statt auf das Netz zurueckgehen
    pub fn ist_konfigurationsfehler(&self) -> bool {
        matches!(self, Self::AktivLabelFehlt(_) | Self::UngueltigeUrl(_))
    }
}

impl From<BoardError> for PodiumError {
    fn from(e: BoardError) -> Self {
        if e.ist_konfigurationsfehler() {
            PodiumError::Konfiguration(e.to_string())
        } else {
            PodiumError::Board(e.to_string())
        }
    }
}

/// Result-Typ fuer Board-Operationen
pub type BoardResult<T> = Result<T, BoardError>;
