//! podium-store – lokaler Speicher fuer Client-Kennung und Anzeigename
//!
//! Eine JSON-Datei pro Speicher. Die Datei enthaelt ein Objekt, dessen
//! Werte selbst JSON-kodierte Strings sind. Jede Aenderung wird sofort
//! geschrieben.

pub mod error;
pub mod local;

pub use error::{StoreError, StoreResult};
pub use local::LocalStore;
