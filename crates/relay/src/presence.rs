//! Presence-Menge eines Kanals
//!
//! Wer ist auf einem Kanal anwesend, mit welchen Daten? Die Menge haelt
//! die Eintraege in Beitrittsreihenfolge und kennt die Presence-
//! Abonnenten, damit das Relay Enter/Update/Leave verteilen kann.
//! Zustellung selbst passiert im Relay, nicht hier.

use podium_core::ClientId;
use serde_json::Value;

use crate::types::{PresenceAction, PresenceHandler, PresenceMember, SubscriptionId};

// ---------------------------------------------------------------------------
// Eintraege
// ---------------------------------------------------------------------------

/// Presence-Eintrag inklusive der Verbindung, die ihn angelegt hat
#[derive(Debug, Clone)]
struct Eintrag {
    verbindung: u64,
    mitglied: PresenceMember,
}

/// Presence-Abonnent eines Kanals
#[derive(Clone)]
pub struct PresenceAbonnent {
    pub id: SubscriptionId,
    pub verbindung: u64,
    pub action: PresenceAction,
    pub handler: PresenceHandler,
}

// ---------------------------------------------------------------------------
// PresenceSet
// ---------------------------------------------------------------------------

/// Presence-Menge und Presence-Abonnenten eines Kanals
#[derive(Default)]
pub struct PresenceSet {
    eintraege: Vec<Eintrag>,
    abonnenten: Vec<PresenceAbonnent>,
}

impl PresenceSet {
    pub fn neu() -> Self {
        Self::default()
    }

    /// Traegt einen Client ein oder aktualisiert ihn
    ///
    /// Gibt `Enter` zurueck wenn der Client neu ist, sonst `Update`.
    pub fn eintragen(&mut self, verbindung: u64, client_id: &ClientId, data: Value) -> PresenceAction {
        match self
            .eintraege
            .iter_mut()
            .find(|e| &e.mitglied.client_id == client_id)
        {
            Some(eintrag) => {
                eintrag.verbindung = verbindung;
                eintrag.mitglied.data = data;
                PresenceAction::Update
            }
            None => {
                self.eintraege.push(Eintrag {
                    verbindung,
                    mitglied: PresenceMember {
                        client_id: client_id.clone(),
                        data,
                    },
                });
                tracing::debug!(client_id = %client_id, "Presence betreten");
                PresenceAction::Enter
            }
        }
    }

    /// Entfernt einen Client, gibt den letzten Stand zurueck
    pub fn austragen(&mut self, client_id: &ClientId) -> Option<PresenceMember> {
        let pos = self
            .eintraege
            .iter()
            .position(|e| &e.mitglied.client_id == client_id)?;
        tracing::debug!(client_id = %client_id, "Presence verlassen");
        Some(self.eintraege.remove(pos).mitglied)
    }

    /// Entfernt alle Eintraege einer Verbindung (implizites Verlassen beim Schliessen)
    pub fn verbindung_austragen(&mut self, verbindung: u64) -> Vec<PresenceMember> {
        let mut entfernt = Vec::new();
        self.eintraege.retain(|e| {
            if e.verbindung == verbindung {
                entfernt.push(e.mitglied.clone());
                false
            } else {
                true
            }
        });
        self.abonnenten.retain(|a| a.verbindung != verbindung);
        entfernt
    }

    /// Gibt alle anwesenden Clients in Beitrittsreihenfolge zurueck
    pub fn mitglieder(&self) -> Vec<PresenceMember> {
        self.eintraege.iter().map(|e| e.mitglied.clone()).collect()
    }

    /// Prueft ob ein Client anwesend ist
    pub fn ist_anwesend(&self, client_id: &ClientId) -> bool {
        self.eintraege.iter().any(|e| &e.mitglied.client_id == client_id)
    }

    pub fn abonnieren(&mut self, abonnent: PresenceAbonnent) {
        self.abonnenten.push(abonnent);
    }

    /// Gibt `true` zurueck wenn das Abonnement existierte
    pub fn abbestellen(&mut self, id: SubscriptionId) -> bool {
        let vorher = self.abonnenten.len();
        self.abonnenten.retain(|a| a.id != id);
        self.abonnenten.len() != vorher
    }

    /// Alle Handler fuer eine Ereignisart
    pub fn handler_fuer(&self, action: PresenceAction) -> Vec<PresenceHandler> {
        self.abonnenten
            .iter()
            .filter(|a| a.action == action)
            .map(|a| a.handler.clone())
            .collect()
    }

    pub fn abonnenten_anzahl(&self) -> usize {
        self.abonnenten.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    fn abonnent(id: u64, verbindung: u64, action: PresenceAction) -> PresenceAbonnent {
        PresenceAbonnent {
            id: SubscriptionId(id),
            verbindung,
            action,
            handler: Arc::new(|_| {}),
        }
    }

    #[test]
    fn eintragen_und_austragen() {
        let mut set = PresenceSet::neu();
        let alice = ClientId::new("alice");

        assert_eq!(set.eintragen(1, &alice, json!({"name": "Alice"})), PresenceAction::Enter);
        assert!(set.ist_anwesend(&alice));

        let letzter = set.austragen(&alice).expect("Alice muss anwesend sein");
        assert_eq!(letzter.data, json!({"name": "Alice"}));
        assert!(!set.ist_anwesend(&alice));
        assert!(set.austragen(&alice).is_none());
    }

    #[test]
    fn erneutes_eintragen_ist_update() {
        let mut set = PresenceSet::neu();
        let alice = ClientId::new("alice");

        set.eintragen(1, &alice, json!({"name": "A"}));
        assert_eq!(set.eintragen(1, &alice, json!({"name": "Alice"})), PresenceAction::Update);
        assert_eq!(set.mitglieder().len(), 1);
        assert_eq!(set.mitglieder()[0].data, json!({"name": "Alice"}));
    }

    #[test]
    fn mitglieder_in_beitrittsreihenfolge() {
        let mut set = PresenceSet::neu();
        for name in ["c", "a", "b"] {
            set.eintragen(1, &ClientId::new(name), json!({}));
        }
        let ids: Vec<_> = set.mitglieder().into_iter().map(|m| m.client_id.0).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn verbindung_austragen_entfernt_eintraege_und_abos() {
        let mut set = PresenceSet::neu();
        set.eintragen(1, &ClientId::new("eins"), json!({}));
        set.eintragen(2, &ClientId::new("zwei"), json!({}));
        set.abonnieren(abonnent(10, 1, PresenceAction::Enter));
        set.abonnieren(abonnent(11, 2, PresenceAction::Enter));

        let entfernt = set.verbindung_austragen(1);
        assert_eq!(entfernt.len(), 1);
        assert_eq!(entfernt[0].client_id, ClientId::new("eins"));
        assert_eq!(set.mitglieder().len(), 1);
        assert_eq!(set.abonnenten_anzahl(), 1);
    }

    #[test]
    fn handler_nach_ereignisart_gefiltert() {
        let mut set = PresenceSet::neu();
        set.abonnieren(abonnent(1, 1, PresenceAction::Enter));
        set.abonnieren(abonnent(2, 1, PresenceAction::Leave));
        set.abonnieren(abonnent(3, 1, PresenceAction::Leave));

        assert_eq!(set.handler_fuer(PresenceAction::Enter).len(), 1);
        assert_eq!(set.handler_fuer(PresenceAction::Update).len(), 0);
        assert_eq!(set.handler_fuer(PresenceAction::Leave).len(), 2);

        assert!(set.abbestellen(SubscriptionId(2)));
        assert!(!set.abbestellen(SubscriptionId(2)));
        assert_eq!(set.handler_fuer(PresenceAction::Leave).len(), 1);
    }
}
