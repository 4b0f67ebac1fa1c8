//! Identitaet des lokalen Teilnehmers
//!
//! Reihenfolge: Konfiguration, dann lokaler Speicher, sonst neu erzeugt und
//! gespeichert. So behaelt ein Teilnehmer ueber Neustarts dieselbe Kennung.

use podium_comms::{Comms, PresenceUpdate};
use podium_core::{ClientId, Identity, PodiumError};
use podium_store::LocalStore;

use crate::config::SitzungEinstellungen;

pub const SCHLUESSEL_CLIENT_ID: &str = "client_id";
pub const SCHLUESSEL_NAME: &str = "name";

/// Bestimmt Client-ID und Anzeigename
pub fn identitaet_aufloesen(
    einstellungen: &SitzungEinstellungen,
    store: &mut LocalStore,
) -> Result<Identity, PodiumError> {
    let id = match &einstellungen.client_id {
        Some(id) => ClientId::new(id.clone()),
        None => match store.get::<String>(SCHLUESSEL_CLIENT_ID) {
            Some(id) => ClientId::new(id),
            None => {
                let id = ClientId::zufaellig();
                store.set(SCHLUESSEL_CLIENT_ID, id.as_str())?;
                tracing::info!(client_id = %id, "Neue Client-ID erzeugt");
                id
            }
        },
    };

    let name = match &einstellungen.anzeigename {
        Some(name) => name.clone(),
        None => match store.get::<String>(SCHLUESSEL_NAME) {
            Some(name) => name,
            None => {
                let name = standard_name(&id);
                store.set(SCHLUESSEL_NAME, &name)?;
                name
            }
        },
    };

    Ok(Identity::new(id, name))
}

/// Aendert den Anzeigenamen dauerhaft und in der laufenden Sitzung
pub async fn name_aendern(
    store: &mut LocalStore,
    comms: &Comms,
    name: &str,
) -> Result<(), PodiumError> {
    store.set(SCHLUESSEL_NAME, name)?;
    comms
        .update_presence_data(PresenceUpdate::leer().mit("name", name))
        .await?;
    tracing::info!(name, "Anzeigename geaendert");
    Ok(())
}

/// Vergisst Client-ID und Namen (naechster Start erzeugt neue)
pub fn abmelden(store: &mut LocalStore) -> Result<(), PodiumError> {
    store.clear(None)?;
    Ok(())
}

fn standard_name(id: &ClientId) -> String {
    let kurz: String = id.as_str().chars().take(4).collect();
    format!("Teilnehmer {kurz}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> LocalStore {
        LocalStore::open(dir.path().join("store.json")).unwrap()
    }

    #[test]
    fn konfiguration_hat_vorrang() {
        let dir = TempDir::new().unwrap();
        let mut s = store(&dir);
        s.set(SCHLUESSEL_CLIENT_ID, "gespeichert").unwrap();

        let einstellungen = SitzungEinstellungen {
            client_id: Some("fest".into()),
            anzeigename: Some("Ada".into()),
            ..Default::default()
        };
        let identitaet = identitaet_aufloesen(&einstellungen, &mut s).unwrap();
        assert_eq!(identitaet.id.as_str(), "fest");
        assert_eq!(identitaet.display_name, "Ada");
    }

    #[test]
    fn erzeugte_identitaet_bleibt_erhalten() {
        let dir = TempDir::new().unwrap();
        let einstellungen = SitzungEinstellungen::default();

        let erste = identitaet_aufloesen(&einstellungen, &mut store(&dir)).unwrap();
        let zweite = identitaet_aufloesen(&einstellungen, &mut store(&dir)).unwrap();

        assert_eq!(erste, zweite);
        assert_eq!(erste.id.as_str().len(), 36, "UUID v4");
        assert!(erste.display_name.starts_with("Teilnehmer "));
    }

    #[test]
    fn abmelden_vergisst_identitaet() {
        let dir = TempDir::new().unwrap();
        let einstellungen = SitzungEinstellungen::default();

        let erste = identitaet_aufloesen(&einstellungen, &mut store(&dir)).unwrap();
        abmelden(&mut store(&dir)).unwrap();
        let zweite = identitaet_aufloesen(&einstellungen, &mut store(&dir)).unwrap();
        assert_ne!(erste.id, zweite.id);
    }
}
