//! Presence-Datensatz des lokalen Teilnehmers
//!
//! Der Datensatz hat einen festen Teil (`type` ist immer `"user"`, `name`
//! optional) und einen offenen Teil fuer beliebige Sitzungsfelder.
//! Teilaktualisierungen werden flach zusammengefuehrt: jeder Schluessel
//! der Aktualisierung ueberschreibt den vorhandenen Wert.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CommsError;

/// Fester Wert des `type`-Feldes
pub const PRESENCE_TYP: &str = "user";

// ---------------------------------------------------------------------------
// PresenceRecord
// ---------------------------------------------------------------------------

/// Presence-Datensatz, wie er beim Relay veroeffentlicht wird
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenceRecord {
    #[serde(rename = "type")]
    typ: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub felder: Map<String, Value>,
}

impl PresenceRecord {
    /// Leerer Datensatz: `{type: "user"}`
    pub fn neu() -> Self {
        Self {
            typ: PRESENCE_TYP.to_string(),
            name: None,
            felder: Map::new(),
        }
    }

    pub fn typ(&self) -> &str {
        &self.typ
    }

    /// Fuehrt eine Teilaktualisierung ein
    ///
    /// `type` ist nicht ueberschreibbar. `name` muss ein String oder `null` sein.
    pub fn zusammenfuehren(&mut self, update: &PresenceUpdate) {
        for (schluessel, wert) in &update.0 {
            match schluessel.as_str() {
                "type" => {
                    tracing::warn!(wert = %wert, "Presence-Feld 'type' ist fest, Aktualisierung ignoriert");
                }
                "name" => match wert {
                    Value::String(name) => self.name = Some(name.clone()),
                    Value::Null => self.name = None,
                    anderer => {
                        tracing::warn!(wert = %anderer, "Presence-Name ist kein String, ignoriert");
                    }
                },
                _ => {
                    self.felder.insert(schluessel.clone(), wert.clone());
                }
            }
        }
    }

    /// Datensatz als JSON fuer das Relay
    pub fn als_json(&self) -> Value {
        let mut objekt = self.felder.clone();
        objekt.insert("type".into(), Value::String(self.typ.clone()));
        if let Some(name) = &self.name {
            objekt.insert("name".into(), Value::String(name.clone()));
        }
        Value::Object(objekt)
    }
}

impl Default for PresenceRecord {
    fn default() -> Self {
        Self::neu()
    }
}

// ---------------------------------------------------------------------------
// PresenceUpdate
// ---------------------------------------------------------------------------

/// Teilaktualisierung fuer den Presence-Datensatz
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PresenceUpdate(Map<String, Value>);

impl PresenceUpdate {
    /// Leere Aktualisierung (aendert nichts)
    pub fn leer() -> Self {
        Self::default()
    }

    /// Setzt einen Schluessel (Builder)
    pub fn mit(mut self, schluessel: impl Into<String>, wert: impl Into<Value>) -> Self {
        self.0.insert(schluessel.into(), wert.into());
        self
    }

    pub fn ist_leer(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for PresenceUpdate {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for PresenceUpdate {
    type Error = CommsError;

    fn try_from(wert: Value) -> Result<Self, Self::Error> {
        match wert {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Ok(Self::leer()),
            anderer => Err(CommsError::UngueltigePresence(format!(
                "erwartet JSON-Objekt, erhalten: {anderer}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn neuer_datensatz_hat_nur_typ() {
        assert_eq!(PresenceRecord::neu().als_json(), json!({"type": "user"}));
    }

    #[test]
    fn zusammenfuehren_ueberschreibt_flach() {
        let mut record = PresenceRecord::neu();
        record.zusammenfuehren(&PresenceUpdate::leer().mit("farbe", "rot").mit("punkte", 3));
        record.zusammenfuehren(&PresenceUpdate::leer().mit("farbe", "blau"));

        assert_eq!(
            record.als_json(),
            json!({"type": "user", "farbe": "blau", "punkte": 3})
        );
    }

    #[test]
    fn verschachtelte_werte_werden_ersetzt_nicht_gemischt() {
        let mut record = PresenceRecord::neu();
        record.zusammenfuehren(&PresenceUpdate::leer().mit("antwort", json!({"a": 1, "b": 2})));
        record.zusammenfuehren(&PresenceUpdate::leer().mit("antwort", json!({"c": 3})));
        assert_eq!(record.felder["antwort"], json!({"c": 3}));
    }

    #[test]
    fn typ_ist_nicht_ueberschreibbar() {
        let mut record = PresenceRecord::neu();
        record.zusammenfuehren(&PresenceUpdate::leer().mit("type", "admin"));
        assert_eq!(record.typ(), "user");
        assert_eq!(record.als_json()["type"], "user");
    }

    #[test]
    fn name_setzen_und_loeschen() {
        let mut record = PresenceRecord::neu();
        record.zusammenfuehren(&PresenceUpdate::leer().mit("name", "Alice"));
        assert_eq!(record.name.as_deref(), Some("Alice"));

        record.zusammenfuehren(&PresenceUpdate::leer().mit("name", 42));
        assert_eq!(record.name.as_deref(), Some("Alice"), "Nicht-String wird ignoriert");

        record.zusammenfuehren(&PresenceUpdate::leer().mit("name", Value::Null));
        assert!(record.name.is_none());
    }

    #[test]
    fn serde_entspricht_als_json() {
        let mut record = PresenceRecord::neu();
        record.zusammenfuehren(&PresenceUpdate::leer().mit("name", "Bob").mit("rolle", "host"));

        let serialisiert = serde_json::to_value(&record).unwrap();
        assert_eq!(serialisiert, record.als_json());

        let zurueck: PresenceRecord = serde_json::from_value(serialisiert).unwrap();
        assert_eq!(zurueck, record);
    }

    #[test]
    fn update_aus_json_wert() {
        assert!(PresenceUpdate::try_from(json!({"a": 1})).is_ok());
        assert!(PresenceUpdate::try_from(Value::Null).unwrap().ist_leer());
        assert!(matches!(
            PresenceUpdate::try_from(json!([1, 2])),
            Err(CommsError::UngueltigePresence(_))
        ));
    }
}
