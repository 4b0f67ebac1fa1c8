//! Folien aus einem Board extrahieren
//!
//! Regeln:
//! - Listen mit `*` im Namen werden uebersprungen
//! - jede uebrige Liste wird ein [`SlideSet`], jede Karte darin eine Folie
//! - Bilder: Anhaenge mit MIME-Typ `image/*`, Vorschau Nr. 4
//! - Auswahl: Checkliste namens `choices` (Schreibweise egal)
//! - Freitext: Checkbox-Feld `free text` ist gesetzt
//! - Label `active` markiert die aktive Folie (die letzte gewinnt)

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::model::{Board, Karte, Vorschau};

/// Index der Vorschaugroesse, die als Folienbild verwendet wird
pub const VORSCHAU_INDEX: usize = 4;

/// Name der Checkliste mit den Antwortmoeglichkeiten
pub const AUSWAHL_CHECKLISTE: &str = "choices";

/// Name des Labels fuer die aktive Folie
pub const AKTIV_LABEL: &str = "active";

static FREITEXT_FELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bfree\s+text\b").expect("statisches Regex-Muster muss kompilieren")
});

// ---------------------------------------------------------------------------
// Datentypen
// ---------------------------------------------------------------------------

/// Eine Folie (eine Karte)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideData {
    pub id: String,
    pub title: String,
    pub body: String,
    pub images: Vec<Vorschau>,
    /// `None` wenn die Karte keine Auswahl-Checkliste hat
    pub choices: Option<Vec<String>>,
    pub free_text_response: bool,
}

/// Ein Foliensatz (eine Liste)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlideSet {
    pub id: String,
    pub name: String,
    pub slides: Vec<SlideData>,
}

/// Ergebnis eines Board-Ladevorgangs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Presentation {
    pub slide_sets: Vec<SlideSet>,
    pub active_slide_id: Option<String>,
}

impl Presentation {
    /// Sucht eine Folie in allen Foliensaetzen
    pub fn slide(&self, id: &str) -> Option<&SlideData> {
        self.slides().find(|s| s.id == id)
    }

    /// Alle Folien in Board-Reihenfolge
    pub fn slides(&self) -> impl Iterator<Item = &SlideData> {
        self.slide_sets.iter().flat_map(|set| set.slides.iter())
    }

    /// Aktive Folie, sonst die erste
    pub fn start_folie(&self) -> Option<&SlideData> {
        self.active_slide_id
            .as_deref()
            .and_then(|id| self.slide(id))
            .or_else(|| self.slides().next())
    }
}

// ---------------------------------------------------------------------------
// Extraktion
// ---------------------------------------------------------------------------

/// Wandelt ein Board in Foliensaetze um
pub fn extract_slides(board: &Board) -> Presentation {
    extract_slides_mit_label(board, AKTIV_LABEL)
}

/// Wie [`extract_slides`], aber mit eigenem Namen fuer das Aktiv-Label
pub fn extract_slides_mit_label(board: &Board, aktiv_label: &str) -> Presentation {
    let freitext_feld = freitext_feld_id(board);
    let mut active_slide_id = None;

    let slide_sets = board
        .lists
        .iter()
        .filter(|liste| !liste.name.contains('*'))
        .map(|liste| {
            let slides = board
                .cards
                .iter()
                .filter(|karte| karte.id_list == liste.id)
                .map(|karte| {
                    if karte.hat_label(aktiv_label) {
                        active_slide_id = Some(karte.id.clone());
                    }
                    folie_aus_karte(karte, board, freitext_feld)
                })
                .collect();
            SlideSet {
                id: liste.id.clone(),
                name: liste.name.clone(),
                slides,
            }
        })
        .collect::<Vec<_>>();

    tracing::debug!(
        board = %board.id,
        saetze = slide_sets.len(),
        aktiv = ?active_slide_id,
        "Folien extrahiert"
    );

    Presentation {
        slide_sets,
        active_slide_id,
    }
}

fn folie_aus_karte(karte: &Karte, board: &Board, freitext_feld: Option<&str>) -> SlideData {
    SlideData {
        id: karte.id.clone(),
        title: karte.name.clone(),
        body: karte.desc.clone(),
        images: bilder(karte),
        choices: auswahl(karte, board),
        free_text_response: ist_freitext(karte, freitext_feld),
    }
}

fn bilder(karte: &Karte) -> Vec<Vorschau> {
    karte
        .attachments
        .iter()
        .filter(|a| {
            a.mime_type
                .as_deref()
                .is_some_and(|m| m.to_ascii_lowercase().starts_with("image/"))
        })
        .filter_map(|a| a.previews.get(VORSCHAU_INDEX).cloned())
        .collect()
}

fn auswahl(karte: &Karte, board: &Board) -> Option<Vec<String>> {
    board
        .checklists
        .iter()
        .filter(|c| karte.id_checklists.contains(&c.id))
        .find(|c| c.name.eq_ignore_ascii_case(AUSWAHL_CHECKLISTE))
        .map(|c| c.check_items.iter().map(|e| e.name.clone()).collect())
}

fn freitext_feld_id(board: &Board) -> Option<&str> {
    board
        .custom_fields
        .iter()
        .find(|f| f.typ == "checkbox" && FREITEXT_FELD.is_match(&f.name))
        .map(|f| f.id.as_str())
}

fn ist_freitext(karte: &Karte, freitext_feld: Option<&str>) -> bool {
    let Some(feld) = freitext_feld else {
        return false;
    };
    karte.custom_field_items.iter().any(|item| {
        item.id_custom_field == feld
            && item
                .value
                .as_ref()
                .and_then(|w| w.checked.as_deref())
                .is_some_and(|c| c == "true")
    })
}
