//! Folienquelle: Board laden und aktive Folie zurueckschreiben

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::api::BoardApi;
use crate::error::{BoardError, BoardResult};
use crate::model::Board;
use crate::policy::best_effort;
use crate::slides::{extract_slides_mit_label, Presentation, AKTIV_LABEL};

/// Quelle fuer Praesentationen
#[async_trait]
pub trait BoardSource: Send + Sync {
    /// Laedt das Board und extrahiert die Folien
    async fn load(&self, url: &str) -> BoardResult<Presentation>;

    /// Markiert `slide_id` als aktive Folie; `None` entfernt nur die Markierung
    async fn persist_active_slide(&self, slide_id: Option<&str>) -> BoardResult<()>;
}

// ---------------------------------------------------------------------------
// TrelloBoard
// ---------------------------------------------------------------------------

struct Geladen {
    board: Board,
    /// Karten, die aktuell das Aktiv-Label tragen
    aktive_karten: Vec<String>,
}

/// Trello-Board als Folienquelle
pub struct TrelloBoard<A: BoardApi> {
    api: A,
    aktiv_label: String,
    geladen: Mutex<Option<Geladen>>,
}

impl<A: BoardApi> TrelloBoard<A> {
    pub fn neu(api: A) -> Self {
        Self {
            api,
            aktiv_label: AKTIV_LABEL.to_string(),
            geladen: Mutex::new(None),
        }
    }

    /// Anderer Labelname fuer die aktive Folie (Schreibweise egal)
    pub fn mit_aktiv_label(mut self, name: impl Into<String>) -> Self {
        self.aktiv_label = name.into();
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Karten, die laut letztem Stand das Aktiv-Label tragen
    pub fn aktive_karten(&self) -> Vec<String> {
        self.geladen
            .lock()
            .as_ref()
            .map(|g| g.aktive_karten.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl<A: BoardApi> BoardSource for TrelloBoard<A> {
    async fn load(&self, url: &str) -> BoardResult<Presentation> {
        *self.geladen.lock() = None;

        let board = self.api.fetch_board(url).await?;
        let praesentation = extract_slides_mit_label(&board, &self.aktiv_label);
        let aktive_karten = board
            .cards
            .iter()
            .filter(|k| k.hat_label(&self.aktiv_label))
            .map(|k| k.id.clone())
            .collect();

        tracing::info!(
            board = %board.id,
            saetze = praesentation.slide_sets.len(),
            aktiv = ?praesentation.active_slide_id,
            "Board geladen"
        );
        *self.geladen.lock() = Some(Geladen {
            board,
            aktive_karten,
        });
        Ok(praesentation)
    }

    async fn persist_active_slide(&self, slide_id: Option<&str>) -> BoardResult<()> {
        let (label_id, vorher) = {
            let geladen = self.geladen.lock();
            let geladen = geladen.as_ref().ok_or(BoardError::NichtGeladen)?;
            let label = geladen
                .board
                .label_nach_name(&self.aktiv_label)
                .ok_or_else(|| BoardError::AktivLabelFehlt(self.aktiv_label.clone()))?;
            (label.id.clone(), geladen.aktive_karten.clone())
        };

        // Fehlgeschlagene Entfernungen bleiben vermerkt und werden beim
        // naechsten Schreiben erneut versucht
        let mut aktiv_danach = Vec::new();
        for karte in vorher.iter().filter(|k| Some(k.as_str()) != slide_id) {
            let entfernt = best_effort(
                "Aktiv-Label entfernen",
                self.api.remove_label(karte, &label_id),
            )
            .await;
            if !entfernt {
                aktiv_danach.push(karte.clone());
            }
        }

        if let Some(id) = slide_id {
            if vorher.iter().any(|k| k == id) {
                tracing::debug!(karte = id, "Folie ist bereits aktiv");
                aktiv_danach.push(id.to_string());
            } else if best_effort("Aktiv-Label setzen", self.api.add_label(id, &label_id)).await {
                aktiv_danach.push(id.to_string());
            }
        }

        if let Some(geladen) = self.geladen.lock().as_mut() {
            geladen.aktive_karten = aktiv_danach;
        }
        tracing::debug!(aktiv = ?slide_id, "Aktive Folie gespeichert");
        Ok(())
    }
}
