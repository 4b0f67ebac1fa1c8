//! podium-board – Folien aus Trello-Boards
//!
//! Laedt einen Board-Export, macht daraus Foliensaetze und schreibt die
//! aktive Folie als Label zurueck. Das Zurueckschreiben ist eine
//! Nebenwirkung: einzelne API-Fehler werden protokolliert, nicht gemeldet.

pub mod api;
pub mod error;
pub mod model;
pub mod policy;
pub mod slides;
pub mod source;

pub use api::{BoardApi, HttpBoardApi, HttpBoardConfig};
pub use error::{BoardError, BoardResult};
pub use model::Board;
pub use policy::best_effort;
pub use slides::{extract_slides, extract_slides_mit_label, Presentation, SlideData, SlideSet};
pub use source::{BoardSource, TrelloBoard};
