//! Host-Steuerung: Folien zeigen, Antworten sammeln, Nachzuegler abholen
//!
//! Die Handler, die an `Comms` gehen, halten nur einen `Weak`-Verweis auf
//! den Controller. Sonst wuerde `Comms` den Controller und der Controller
//! `Comms` am Leben halten.

use parking_lot::Mutex;
use podium_board::{BoardSource, Presentation};
use podium_comms::{Comms, CommsHandlers, ResponsePayload, EREIGNIS_ANTWORT};
use podium_core::{ClientId, PodiumError};
use podium_relay::{PresenceMessage, RelayMessage};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Weak};

/// Befehl an das Publikum: Folie anzeigen
pub const BEFEHL_FOLIE_ZEIGEN: &str = "show-slide";

/// Eine Antwort aus dem Publikum
#[derive(Debug, Clone, PartialEq)]
pub struct Antwort {
    pub client_id: ClientId,
    pub message: Value,
    pub context: Value,
}

/// Steuert eine Praesentation als Host
#[derive(Clone)]
pub struct HostController {
    inner: Arc<HostInner>,
}

struct HostInner {
    comms: Comms,
    board: Arc<dyn BoardSource>,
    praesentation: Mutex<Presentation>,
    aktuelle_folie: Mutex<Option<String>>,
    antworten: Mutex<HashMap<String, Vec<Antwort>>>,
}

impl HostController {
    pub fn neu(comms: Comms, board: Arc<dyn BoardSource>, praesentation: Presentation) -> Self {
        Self {
            inner: Arc::new(HostInner {
                comms,
                board,
                praesentation: Mutex::new(praesentation),
                aktuelle_folie: Mutex::new(None),
                antworten: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn comms(&self) -> &Comms {
        &self.inner.comms
    }

    /// Handler fuer `Comms::configure`
    ///
    /// Antworten werden gesammelt; neue Teilnehmer bekommen die aktuelle
    /// Folie privat nachgeschickt.
    pub fn handlers(&self) -> CommsHandlers {
        let fuer_antworten = Arc::downgrade(&self.inner);
        let fuer_presence = Arc::downgrade(&self.inner);

        CommsHandlers::new()
            .on_response(move |nachricht| {
                if let Some(inner) = fuer_antworten.upgrade() {
                    HostController { inner }.antwort_aufnehmen(nachricht);
                }
            })
            .on_presence_enter(move |ereignis| teilnehmer_abholen(&fuer_presence, ereignis))
            .on_presence_leave(|ereignis| {
                tracing::info!(client_id = %ereignis.client_id, "Teilnehmer hat die Sitzung verlassen");
            })
    }

    /// Zeigt eine Folie bei allen Teilnehmern und merkt sie im Board
    ///
    /// Das Zurueckschreiben ins Board ist Nebensache: ein Fehler dort wird
    /// protokolliert, aber nicht gemeldet.
    pub async fn show_slide(&self, slide_id: &str) -> Result<(), PodiumError> {
        if self.inner.praesentation.lock().slide(slide_id).is_none() {
            return Err(PodiumError::Board(format!("Folie '{slide_id}' existiert nicht")));
        }

        self.inner
            .comms
            .broadcast(BEFEHL_FOLIE_ZEIGEN, json!({ "slideId": slide_id }))
            .await?;
        *self.inner.aktuelle_folie.lock() = Some(slide_id.to_string());
        tracing::info!(folie = slide_id, "Folie gezeigt");

        if let Err(e) = self.inner.board.persist_active_slide(Some(slide_id)).await {
            tracing::warn!(folie = slide_id, fehler = %e, "Aktive Folie nicht im Board gespeichert");
        }
        Ok(())
    }

    /// Schickt die aktuelle Folie privat an einen Teilnehmer
    pub async fn sync_participant(&self, client_id: &ClientId) -> Result<(), PodiumError> {
        let Some(folie) = self.aktuelle_folie() else {
            return Ok(());
        };
        self.inner
            .comms
            .send_private_message(client_id, BEFEHL_FOLIE_ZEIGEN, json!({ "slideId": folie }))
            .await?;
        tracing::debug!(client_id = %client_id, folie = %folie, "Teilnehmer synchronisiert");
        Ok(())
    }

    /// Gesammelte Antworten zu einer Folie, in Eingangsreihenfolge
    pub fn responses_for(&self, slide_id: &str) -> Vec<Antwort> {
        self.inner
            .antworten
            .lock()
            .get(slide_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn aktuelle_folie(&self) -> Option<String> {
        self.inner.aktuelle_folie.lock().clone()
    }

    pub fn praesentation(&self) -> Presentation {
        self.inner.praesentation.lock().clone()
    }

    fn antwort_aufnehmen(&self, nachricht: RelayMessage) {
        if nachricht.name != EREIGNIS_ANTWORT {
            tracing::debug!(ereignis = %nachricht.name, client_id = %nachricht.client_id, "Ereignis ignoriert");
            return;
        }
        let payload = match ResponsePayload::aus_nachricht(&nachricht) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(client_id = %nachricht.client_id, fehler = %e, "Antwort nicht lesbar");
                return;
            }
        };

        // Ohne slideId im Kontext gilt die Antwort der aktuellen Folie
        let folie = payload
            .context
            .get("slideId")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| self.aktuelle_folie());
        let Some(folie) = folie else {
            tracing::warn!(client_id = %nachricht.client_id, "Antwort ohne Folie verworfen");
            return;
        };

        self.inner
            .antworten
            .lock()
            .entry(folie)
            .or_default()
            .push(Antwort {
                client_id: nachricht.client_id,
                message: payload.message,
                context: payload.context,
            });
    }
}

fn teilnehmer_abholen(inner: &Weak<HostInner>, ereignis: PresenceMessage) {
    let Some(inner) = inner.upgrade() else {
        return;
    };
    let host = HostController { inner };
    if host.comms().client_id().as_ref() == Some(&ereignis.client_id) {
        return;
    }
    tracing::info!(client_id = %ereignis.client_id, "Teilnehmer beigetreten");

    tokio::spawn(async move {
        if let Err(e) = host.sync_participant(&ereignis.client_id).await {
            tracing::warn!(client_id = %ereignis.client_id, fehler = %e, "Synchronisierung fehlgeschlagen");
        }
    });
}
