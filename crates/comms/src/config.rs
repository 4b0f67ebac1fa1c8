//! Konfiguration einer Comms-Instanz

use podium_core::Identity;
use podium_relay::Credentials;
use std::time::Duration;

/// Abstand zwischen zwei Zustandspruefungen in `await_ready`
pub const STANDARD_POLL_INTERVALL: Duration = Duration::from_secs(1);

/// Maximale Wartezyklen in `await_ready` (ca. 20 s mit Standard-Intervall)
pub const STANDARD_MAX_VERSUCHE: u32 = 20;

/// Wie lange auf eine brauchbare Verbindung gewartet wird
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessConfig {
    pub poll_interval: Duration,
    pub max_attempts: u32,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            poll_interval: STANDARD_POLL_INTERVALL,
            max_attempts: STANDARD_MAX_VERSUCHE,
        }
    }
}

impl ReadinessConfig {
    /// Obergrenze der Wartezeit bis `await_ready` aufgibt
    pub fn zeitlimit(&self) -> Duration {
        self.poll_interval * self.max_attempts
    }
}

/// Alles was `Comms::configure` braucht (ausser den Handlern)
#[derive(Debug, Clone)]
pub struct CommsConfig {
    pub identity: Identity,
    pub credentials: Credentials,
    pub readiness: ReadinessConfig,
}

impl CommsConfig {
    pub fn new(identity: Identity, credentials: Credentials) -> Self {
        Self {
            identity,
            credentials,
            readiness: ReadinessConfig::default(),
        }
    }

    pub fn mit_readiness(mut self, readiness: ReadinessConfig) -> Self {
        self.readiness = readiness;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_wartet_zwanzig_sekunden() {
        let cfg = ReadinessConfig::default();
        assert_eq!(cfg.max_attempts, 20);
        assert_eq!(cfg.zeitlimit(), Duration::from_secs(20));
    }
}
