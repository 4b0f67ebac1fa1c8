//! Zugriff auf die Board-API
//!
//! [`BoardApi`] kapselt die drei Aufrufe, die Podium braucht. Die
//! HTTP-Implementierung spricht die Trello-REST-API; Tests verwenden eine
//! eigene Implementierung oder einen Mock-Server.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::{BoardError, BoardResult};
use crate::model::Board;

/// Standard-Basisadresse der Trello-REST-API
pub const STANDARD_API_BASIS: &str = "https://api.trello.com";

#[async_trait]
pub trait BoardApi: Send + Sync {
    /// Laedt den Board-Export von `url`
    async fn fetch_board(&self, url: &str) -> BoardResult<Board>;

    /// Haengt ein Label an eine Karte
    async fn add_label(&self, card_id: &str, label_id: &str) -> BoardResult<()>;

    /// Entfernt ein Label von einer Karte
    async fn remove_label(&self, card_id: &str, label_id: &str) -> BoardResult<()>;
}

// ---------------------------------------------------------------------------
// HttpBoardApi
// ---------------------------------------------------------------------------

/// Zugangsdaten und Adresse der Board-API
#[derive(Clone)]
pub struct HttpBoardConfig {
    pub api_base: String,
    pub key: String,
    pub token: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for HttpBoardConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpBoardConfig")
            .field("api_base", &self.api_base)
            .field("key", &"[REDACTED]")
            .field("token", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for HttpBoardConfig {
    fn default() -> Self {
        Self {
            api_base: STANDARD_API_BASIS.to_string(),
            key: String::new(),
            token: String::new(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Board-API ueber HTTP (reqwest)
pub struct HttpBoardApi {
    config: HttpBoardConfig,
    http: reqwest::Client,
}

impl HttpBoardApi {
    pub fn neu(config: HttpBoardConfig) -> BoardResult<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(config.timeout)
            .build()?;
        Ok(Self { config, http })
    }

    fn karten_label_url(&self, card_id: &str) -> String {
        format!(
            "{}/1/cards/{}/idLabels",
            self.config.api_base.trim_end_matches('/'),
            card_id
        )
    }

    fn zugang(&self) -> [(&'static str, &str); 2] {
        [("key", self.config.key.as_str()), ("token", self.config.token.as_str())]
    }

    async fn pruefen(antwort: reqwest::Response) -> BoardResult<reqwest::Response> {
        let status = antwort.status();
        if status.is_success() {
            return Ok(antwort);
        }
        let text = antwort.text().await.unwrap_or_default();
        Err(BoardError::Status {
            status: status.as_u16(),
            text,
        })
    }
}

#[async_trait]
impl BoardApi for HttpBoardApi {
    async fn fetch_board(&self, url: &str) -> BoardResult<Board> {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(BoardError::UngueltigeUrl(url.to_string()));
        }
        tracing::debug!(url, "Board wird geladen");

        let antwort = self.http.get(url).send().await?;
        let antwort = Self::pruefen(antwort).await?;
        let text = antwort.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    async fn add_label(&self, card_id: &str, label_id: &str) -> BoardResult<()> {
        let antwort = self
            .http
            .post(self.karten_label_url(card_id))
            .query(&self.zugang())
            .query(&[("value", label_id)])
            .send()
            .await?;
        Self::pruefen(antwort).await?;
        tracing::debug!(karte = card_id, label = label_id, "Label gesetzt");
        Ok(())
    }

    async fn remove_label(&self, card_id: &str, label_id: &str) -> BoardResult<()> {
        let url = format!("{}/{}", self.karten_label_url(card_id), label_id);
        let antwort = self.http.delete(url).query(&self.zugang()).send().await?;
        Self::pruefen(antwort).await?;
        tracing::debug!(karte = card_id, label = label_id, "Label entfernt");
        Ok(())
    }
}
