//! App-Konfiguration
//!
//! Wird beim Start aus einer TOML-Datei geladen. Alle Felder haben
//! Standardwerte, sodass eine lokale Sitzung ohne Konfigurationsdatei
//! laeuft.

use podium_board::HttpBoardConfig;
use podium_comms::ReadinessConfig;
use podium_core::{PodiumError, Rolle};
use podium_observability::LogFormat;
use podium_relay::Credentials;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Vollstaendige App-Konfiguration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub sitzung: SitzungEinstellungen,
    pub relay: RelayEinstellungen,
    pub board: BoardEinstellungen,
    pub speicher: SpeicherEinstellungen,
    pub logging: LoggingEinstellungen,
}

/// Wer nimmt wie an der Sitzung teil
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SitzungEinstellungen {
    /// Anzeigename; fehlt er, wird der gespeicherte oder ein erzeugter verwendet
    pub anzeigename: Option<String>,
    pub rolle: Rolle,
    /// Feste Client-ID (sonst aus dem lokalen Speicher)
    pub client_id: Option<String>,
}

impl Default for SitzungEinstellungen {
    fn default() -> Self {
        Self {
            anzeigename: None,
            rolle: Rolle::Host,
            client_id: None,
        }
    }
}

/// Relay-Zugang und Verbindungsbereitschaft
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayEinstellungen {
    /// Token hat Vorrang vor `auth_url`
    pub token: Option<String>,
    pub auth_url: Option<String>,
    pub poll_intervall_ms: u64,
    pub max_versuche: u32,
}

impl Default for RelayEinstellungen {
    fn default() -> Self {
        let readiness = ReadinessConfig::default();
        Self {
            // Das In-Process-Relay akzeptiert jedes nicht-leere Token
            token: Some("lokal".into()),
            auth_url: None,
            poll_intervall_ms: readiness.poll_interval.as_millis() as u64,
            max_versuche: readiness.max_attempts,
        }
    }
}

impl RelayEinstellungen {
    pub fn credentials(&self) -> Result<Credentials, PodiumError> {
        let nicht_leer = |s: &Option<String>| s.as_ref().filter(|v| !v.trim().is_empty()).cloned();
        nicht_leer(&self.token)
            .map(Credentials::Token)
            .or_else(|| nicht_leer(&self.auth_url).map(Credentials::AuthUrl))
            .ok_or_else(|| {
                PodiumError::Konfiguration("[relay] braucht token oder auth_url".into())
            })
    }

    pub fn readiness(&self) -> ReadinessConfig {
        ReadinessConfig {
            poll_interval: Duration::from_millis(self.poll_intervall_ms),
            max_attempts: self.max_versuche,
        }
    }
}

/// Board mit den Folien
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardEinstellungen {
    /// URL des Board-Exports; ohne URL startet die Sitzung ohne Folien
    pub url: Option<String>,
    pub api_basis: String,
    pub key: String,
    pub token: String,
    pub aktiv_label: String,
    pub timeout_s: u64,
}

impl std::fmt::Debug for BoardEinstellungen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoardEinstellungen")
            .field("url", &self.url)
            .field("api_basis", &self.api_basis)
            .field("key", &"[REDACTED]")
            .field("token", &"[REDACTED]")
            .field("aktiv_label", &self.aktiv_label)
            .field("timeout_s", &self.timeout_s)
            .finish()
    }
}

impl Default for BoardEinstellungen {
    fn default() -> Self {
        let http = HttpBoardConfig::default();
        Self {
            url: None,
            api_basis: http.api_base,
            key: String::new(),
            token: String::new(),
            aktiv_label: podium_board::slides::AKTIV_LABEL.into(),
            timeout_s: http.timeout.as_secs(),
        }
    }
}

impl BoardEinstellungen {
    pub fn http_config(&self) -> HttpBoardConfig {
        HttpBoardConfig {
            api_base: self.api_basis.clone(),
            key: self.key.clone(),
            token: self.token.clone(),
            timeout: Duration::from_secs(self.timeout_s),
        }
    }
}

/// Lokaler Speicher fuer Client-ID und Name
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeicherEinstellungen {
    pub pfad: String,
}

impl Default for SpeicherEinstellungen {
    fn default() -> Self {
        Self {
            pfad: "podium-store.json".into(),
        }
    }
}

/// Logging-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingEinstellungen {
    /// EnvFilter-Ausdruck, z.B. "info" oder "podium_comms=debug,info"
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingEinstellungen {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Text,
        }
    }
}

impl AppConfig {
    /// Laedt die Konfiguration aus einer TOML-Datei.
    /// Gibt die Standardkonfiguration zurueck wenn die Datei nicht existiert.
    pub fn laden(pfad: &str) -> anyhow::Result<Self> {
        match std::fs::read_to_string(pfad) {
            Ok(inhalt) => {
                let config: Self = toml::from_str(&inhalt)
                    .map_err(|e| anyhow::anyhow!("Konfigurationsfehler in '{pfad}': {e}"))?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    pfad = pfad,
                    "Konfigurationsdatei nicht gefunden, verwende Standardwerte"
                );
                Ok(Self::default())
            }
            Err(e) => Err(anyhow::anyhow!(
                "Konfigurationsdatei '{pfad}' nicht lesbar: {e}"
            )),
        }
    }
}
