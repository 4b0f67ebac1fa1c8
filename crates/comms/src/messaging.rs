//! Nachrichten-Fassade ueber den Sitzungskanaelen
//!
//! | Operation              | Kanal                  | Ereignis     |
//! |------------------------|------------------------|--------------|
//! | `send`                 | `response`             | frei         |
//! | `send_message`         | `response`             | `response`   |
//! | `broadcast`            | `broadcast:all`        | `broadcast`  |
//! | `send_private_message` | `broadcast:<clientId>` | `broadcast`  |
//! | `get_users`            | Presence auf `response`| -            |

use podium_core::ClientId;
use podium_relay::{kanal, PresenceMember, RelayChannel, RelayConnection, RelayMessage};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::error::{CommsError, CommsResult};
use crate::session::Comms;

/// Ereignisname fuer Befehle an das Publikum
pub const EREIGNIS_BROADCAST: &str = "broadcast";
/// Ereignisname fuer Antworten an den Host
pub const EREIGNIS_ANTWORT: &str = "response";

// ---------------------------------------------------------------------------
// Nutzdaten
// ---------------------------------------------------------------------------

/// Befehl auf einem Broadcast-Kanal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandPayload {
    pub command: String,
    #[serde(default)]
    pub context: Value,
}

impl CommandPayload {
    pub fn new(command: impl Into<String>, context: Value) -> Self {
        Self {
            command: command.into(),
            context,
        }
    }

    /// Liest den Befehl aus einer empfangenen Broadcast-Nachricht
    pub fn aus_nachricht(nachricht: &RelayMessage) -> CommsResult<Self> {
        Ok(serde_json::from_value(nachricht.data.clone())?)
    }
}

/// Antwort eines Teilnehmers auf dem Antwort-Kanal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponsePayload {
    pub message: Value,
    #[serde(default)]
    pub context: Value,
}

impl ResponsePayload {
    pub fn aus_nachricht(nachricht: &RelayMessage) -> CommsResult<Self> {
        Ok(serde_json::from_value(nachricht.data.clone())?)
    }
}

/// Teilnehmer laut Presence-Abfrage: Presence-Felder plus `userId`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    #[serde(rename = "userId")]
    pub user_id: ClientId,
    #[serde(flatten)]
    pub felder: Map<String, Value>,
}

impl Participant {
    /// `userId` kommt immer von der Relay-Kennung, nie aus den Presence-Daten
    pub fn aus_mitglied(mitglied: PresenceMember) -> Self {
        let felder = match mitglied.data {
            Value::Object(mut map) => {
                map.remove("userId");
                map
            }
            Value::Null => Map::new(),
            anderer => {
                let mut map = Map::new();
                map.insert("data".into(), anderer);
                map
            }
        };
        Self {
            user_id: mitglied.client_id,
            felder,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.felder.get("name").and_then(Value::as_str)
    }
}

// ---------------------------------------------------------------------------
// Operationen
// ---------------------------------------------------------------------------

/// Kanaele einer laufenden Sitzung (ausserhalb des Sitzungs-Locks verwendet)
struct AktiveKanaele {
    verbindung: Arc<dyn RelayConnection>,
    broadcast: Arc<dyn RelayChannel>,
    antwort: Arc<dyn RelayChannel>,
}

impl Comms {
    async fn aktive_kanaele(&self) -> CommsResult<AktiveKanaele> {
        let sitzung = self.inner.sitzung.lock().await;
        if !sitzung.gestartet {
            return Err(CommsError::NichtGestartet);
        }
        match (&sitzung.verbindung, &sitzung.broadcast, &sitzung.antwort) {
            (Some(verbindung), Some(broadcast), Some(antwort)) => Ok(AktiveKanaele {
                verbindung: Arc::clone(verbindung),
                broadcast: Arc::clone(broadcast),
                antwort: Arc::clone(antwort),
            }),
            _ => Err(CommsError::NichtGestartet),
        }
    }

    /// Veroeffentlicht ein frei benanntes Ereignis auf dem Antwort-Kanal
    pub async fn send(&self, typ: &str, data: Value) -> CommsResult<()> {
        let kanaele = self.aktive_kanaele().await?;
        kanaele.antwort.publish(typ, data).await?;
        tracing::trace!(ereignis = typ, "Ereignis gesendet");
        Ok(())
    }

    /// Sendet eine Antwort an den Host
    pub async fn send_message(&self, message: Value, context: Value) -> CommsResult<()> {
        let kanaele = self.aktive_kanaele().await?;
        let daten = serde_json::to_value(ResponsePayload { message, context })?;
        kanaele.antwort.publish(EREIGNIS_ANTWORT, daten).await?;
        Ok(())
    }

    /// Sendet einen Befehl an alle Teilnehmer
    pub async fn broadcast(&self, command: &str, context: Value) -> CommsResult<()> {
        let kanaele = self.aktive_kanaele().await?;
        let daten = serde_json::to_value(CommandPayload::new(command, context))?;
        kanaele.broadcast.publish(EREIGNIS_BROADCAST, daten).await?;
        tracing::debug!(befehl = command, "Broadcast gesendet");
        Ok(())
    }

    /// Sendet einen Befehl an genau einen Teilnehmer
    pub async fn send_private_message(
        &self,
        client_id: &ClientId,
        command: &str,
        context: Value,
    ) -> CommsResult<()> {
        let kanaele = self.aktive_kanaele().await?;
        let daten = serde_json::to_value(CommandPayload::new(command, context))?;
        let privat = kanaele.verbindung.channel(&kanal::privat(client_id));
        privat.publish(EREIGNIS_BROADCAST, daten).await?;
        tracing::debug!(empfaenger = %client_id, befehl = command, "Private Nachricht gesendet");
        Ok(())
    }

    /// Aktuelle Teilnehmer auf dem Antwort-Kanal, in Beitrittsreihenfolge
    pub async fn get_users(&self) -> CommsResult<Vec<Participant>> {
        let kanaele = self.aktive_kanaele().await?;
        let mitglieder = kanaele.antwort.presence_members().await.map_err(|e| {
            tracing::warn!(fehler = %e, "Presence-Abfrage fehlgeschlagen");
            e
        })?;
        Ok(mitglieder.into_iter().map(Participant::aus_mitglied).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn mitglied(id: &str, data: Value) -> PresenceMember {
        PresenceMember {
            client_id: ClientId::new(id),
            data,
        }
    }

    #[test]
    fn user_id_kommt_von_der_relay_kennung() {
        let p = Participant::aus_mitglied(mitglied(
            "echt",
            json!({"type": "user", "name": "Ada", "userId": "gefaelscht"}),
        ));
        assert_eq!(p.user_id.as_str(), "echt");
        assert_eq!(p.name(), Some("Ada"));
        assert_eq!(
            serde_json::to_value(&p).unwrap(),
            json!({"type": "user", "name": "Ada", "userId": "echt"})
        );
    }

    #[test]
    fn nicht_objekt_daten_landen_unter_data() {
        let p = Participant::aus_mitglied(mitglied("x", json!("hallo")));
        assert_eq!(p.felder["data"], "hallo");
        assert!(Participant::aus_mitglied(mitglied("y", Value::Null)).felder.is_empty());
    }

    #[test]
    fn befehl_aus_nachricht() {
        let n = RelayMessage {
            name: EREIGNIS_BROADCAST.into(),
            client_id: ClientId::new("host"),
            data: json!({"command": "show-slide", "context": {"slideId": "s1"}}),
        };
        let befehl = CommandPayload::aus_nachricht(&n).unwrap();
        assert_eq!(befehl.command, "show-slide");
        assert_eq!(befehl.context["slideId"], "s1");

        let kaputt = RelayMessage { data: json!(5), ..n };
        assert!(matches!(
            CommandPayload::aus_nachricht(&kaputt),
            Err(CommsError::Serialisierung(_))
        ));
    }
}
