//! Fehlerpolitik fuer Nebenwirkungen, die den Ablauf nicht aufhalten duerfen

use std::fmt::Display;
use std::future::Future;

/// Fuehrt `aktion` aus; ein Fehler wird protokolliert und verworfen
///
/// Gibt zurueck, ob die Aktion gelungen ist.
pub async fn best_effort<F, E>(beschreibung: &str, aktion: F) -> bool
where
    F: Future<Output = Result<(), E>>,
    E: Display,
{
    match aktion.await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(aktion = beschreibung, fehler = %e, "Fehler ignoriert");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fehler_wird_geschluckt() {
        assert!(best_effort("ok", async { Ok::<(), String>(()) }).await);
        assert!(!best_effort("kaputt", async { Err::<(), _>("nein") }).await);
    }
}
