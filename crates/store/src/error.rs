//! Fehlertypen fuer den lokalen Speicher

use podium_core::PodiumError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Speicherdatei {pfad} nicht lesbar: {quelle}")]
    Lesen {
        pfad: PathBuf,
        #[source]
        quelle: std::io::Error,
    },

    #[error("Speicherdatei {pfad} nicht schreibbar: {quelle}")]
    Schreiben {
        pfad: PathBuf,
        #[source]
        quelle: std::io::Error,
    },

    #[error("Wert nicht serialisierbar: {0}")]
    Serialisierung(#[from] serde_json::Error),
}

impl From<StoreError> for PodiumError {
    fn from(e: StoreError) -> Self {
        PodiumError::Speicher(e.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
