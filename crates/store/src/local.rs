//! JSON-Datei als Schluessel-Wert-Speicher

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use crate::error::{StoreError, StoreResult};

/// Schluessel-Wert-Speicher in einer JSON-Datei
///
/// Unlesbarer oder falsch geformter Inhalt wird verworfen und die Datei
/// mit einem leeren Objekt ueberschrieben.
#[derive(Debug)]
pub struct LocalStore {
    pfad: PathBuf,
    daten: Map<String, Value>,
}

impl LocalStore {
    /// Oeffnet den Speicher; eine fehlende Datei ergibt einen leeren Speicher
    pub fn open(pfad: impl Into<PathBuf>) -> StoreResult<Self> {
        let pfad = pfad.into();
        let inhalt = match std::fs::read_to_string(&pfad) {
            Ok(inhalt) => Some(inhalt),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(quelle) => return Err(StoreError::Lesen { pfad, quelle }),
        };

        let Some(inhalt) = inhalt else {
            tracing::debug!(pfad = %pfad.display(), "Speicherdatei fehlt, starte leer");
            return Ok(Self {
                pfad,
                daten: Map::new(),
            });
        };

        match serde_json::from_str::<Value>(&inhalt) {
            Ok(Value::Object(daten)) => Ok(Self { pfad, daten }),
            andere => {
                tracing::warn!(
                    pfad = %pfad.display(),
                    fehler = ?andere.err(),
                    "Speicherdatei unbrauchbar, wird zurueckgesetzt"
                );
                let speicher = Self {
                    pfad,
                    daten: Map::new(),
                };
                speicher.persist()?;
                Ok(speicher)
            }
        }
    }

    pub fn pfad(&self) -> &Path {
        &self.pfad
    }

    /// Liest und dekodiert einen Wert
    ///
    /// Ein nicht dekodierbarer Wert wird wie ein fehlender behandelt.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let kodiert = self.daten.get(key)?.as_str()?;
        match serde_json::from_str(kodiert) {
            Ok(wert) => Some(wert),
            Err(e) => {
                tracing::warn!(schluessel = key, fehler = %e, "Gespeicherter Wert nicht lesbar");
                None
            }
        }
    }

    /// Speichert einen Wert JSON-kodiert und schreibt die Datei
    pub fn set<T: Serialize + ?Sized>(&mut self, key: &str, wert: &T) -> StoreResult<()> {
        let kodiert = serde_json::to_string(wert)?;
        self.daten.insert(key.to_string(), Value::String(kodiert));
        self.persist()
    }

    pub fn has(&self, key: &str) -> bool {
        self.daten.get(key).is_some_and(|v| !v.is_null())
    }

    /// Entfernt einen Schluessel, oder mit `None` alle
    pub fn clear(&mut self, key: Option<&str>) -> StoreResult<()> {
        match key {
            Some(key) => {
                self.daten.remove(key);
            }
            None => self.daten.clear(),
        }
        self.persist()
    }

    fn persist(&self) -> StoreResult<()> {
        if let Some(verzeichnis) = self.pfad.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(verzeichnis).map_err(|quelle| StoreError::Schreiben {
                pfad: self.pfad.clone(),
                quelle,
            })?;
        }
        let inhalt = serde_json::to_string(&self.daten)?;
        std::fs::write(&self.pfad, inhalt).map_err(|quelle| StoreError::Schreiben {
            pfad: self.pfad.clone(),
            quelle,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    fn pfad(dir: &TempDir) -> PathBuf {
        dir.path().join("podium").join("store.json")
    }

    #[test]
    fn fehlende_datei_ergibt_leeren_speicher() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::open(pfad(&dir)).unwrap();
        assert!(!store.has("client_id"));
        assert!(!pfad(&dir).exists(), "Oeffnen allein schreibt nichts");
    }

    #[test]
    fn werte_ueberleben_neues_oeffnen() {
        let dir = TempDir::new().unwrap();
        let mut store = LocalStore::open(pfad(&dir)).unwrap();
        store.set("client_id", "abc-123").unwrap();
        store.set("punkte", &42u32).unwrap();

        let store = LocalStore::open(pfad(&dir)).unwrap();
        assert_eq!(store.get::<String>("client_id").as_deref(), Some("abc-123"));
        assert_eq!(store.get::<u32>("punkte"), Some(42));
    }

    #[test]
    fn werte_sind_json_kodiert() {
        let dir = TempDir::new().unwrap();
        let mut store = LocalStore::open(pfad(&dir)).unwrap();
        store.set("name", "Ada").unwrap();

        let roh: Value = serde_json::from_str(&std::fs::read_to_string(pfad(&dir)).unwrap()).unwrap();
        assert_eq!(roh, serde_json::json!({"name": "\"Ada\""}));
    }

    #[test]
    fn strukturen_speichern() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Einstellung {
            farbe: String,
            groesse: u8,
        }

        let dir = TempDir::new().unwrap();
        let mut store = LocalStore::open(pfad(&dir)).unwrap();
        let e = Einstellung { farbe: "blau".into(), groesse: 3 };
        store.set("einstellung", &e).unwrap();
        assert_eq!(store.get::<Einstellung>("einstellung"), Some(e));
        assert_eq!(store.get::<u8>("einstellung"), None, "falscher Typ ergibt None");
    }

    #[test]
    fn kaputte_datei_wird_zurueckgesetzt() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(pfad(&dir).parent().unwrap()).unwrap();

        for inhalt in ["{kein json", "[1, 2, 3]", "\"text\""] {
            std::fs::write(pfad(&dir), inhalt).unwrap();
            let store = LocalStore::open(pfad(&dir)).unwrap();
            assert!(!store.has("x"));
            assert_eq!(std::fs::read_to_string(pfad(&dir)).unwrap(), "{}");
        }
    }

    #[test]
    fn clear_einzeln_und_alle() {
        let dir = TempDir::new().unwrap();
        let mut store = LocalStore::open(pfad(&dir)).unwrap();
        store.set("a", &1).unwrap();
        store.set("b", &2).unwrap();

        store.clear(Some("a")).unwrap();
        assert!(!store.has("a"));
        assert!(store.has("b"));

        store.clear(None).unwrap();
        let store = LocalStore::open(pfad(&dir)).unwrap();
        assert!(!store.has("b"));
    }
}
