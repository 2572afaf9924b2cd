use super::*;
use std::time::Duration;

/// Remote key-value store speaking the Firebase Realtime Database REST dialect.
///
/// Ledgers live at `{base_url}/scores/{room}.json`. A missing key answers with
/// `null` (or 404 on plain key-value servers); both mean "not found".
pub struct RemoteStore {
    base_url: String,
    auth_token: Option<String>,
    client: reqwest::Client,
}

impl RemoteStore {
    pub fn new(
        base_url: String,
        auth_token: Option<String>,
        timeout: Duration,
    ) -> StoreResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token,
            client,
        })
    }

    fn url_for(&self, room: &str) -> String {
        format!("{}/scores/{}.json", self.base_url, room)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth_token {
            Some(token) => request.query(&[("auth", token)]),
            None => request,
        }
    }
}

#[async_trait]
impl LedgerStore for RemoteStore {
    async fn save(&self, room: &str, ledger: &ScoreLedger) -> StoreResult<()> {
        let response = self
            .authorize(self.client.put(self.url_for(room)))
            .json(&ledger.export())
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::warn!("Saving room {} failed: {}", room, response.status());
            return Err(StoreError::Status(response.status()));
        }

        tracing::debug!("Saved room {} to remote store", room);
        Ok(())
    }

    async fn load(&self, room: &str) -> StoreResult<Option<ScoreLedger>> {
        let response = self
            .authorize(self.client.get(self.url_for(room)))
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(StoreError::Status(response.status()));
        }

        let blob = response.text().await?;
        let trimmed = blob.trim();
        if trimmed.is_empty() || trimmed == "null" {
            return Ok(None);
        }

        decode(room, trimmed).map(Some)
    }

    fn name(&self) -> &str {
        "remote"
    }
}
