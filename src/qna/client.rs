use std::time::Duration;

use serde::Deserialize;

use super::dto::QnaData;
use crate::result::{Error, Result};

const CONNECT_TIMEOUT_MS: u64 = 1000;
const REQUEST_TIMEOUT_MS: u64 = 10000;

#[derive(Deserialize)]
struct ServerMessage {
    message: String,
}

/// Thin wrapper over the studio's QnA REST endpoints. All three calls are
/// POSTs, mirroring the module mount point routes:
/// `/mod/qna/questions`, `/mod/qna/questions/{id}`,
/// `/mod/qna/questions/{id}/delete`.
#[derive(Clone)]
pub struct QnaClient {
    client: reqwest::Client,
    base_url: String,
}

impl QnaClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_millis(CONNECT_TIMEOUT_MS))
            .timeout(Duration::from_millis(REQUEST_TIMEOUT_MS))
            .build()?;
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Ok(QnaClient { client, base_url })
    }

    /// Creates a question pair. The server answers with an array whose first
    /// element is the assigned id.
    pub async fn create(&self, data: &QnaData) -> Result<String> {
        let url = format!("{}/mod/qna/questions", self.base_url);
        let res = self.client.post(&url).json(data).send().await?;
        if !res.status().is_success() {
            return Err(Error::ErrorWithMessage(read_server_message(res).await));
        }
        let ids: Vec<String> = res.json().await?;
        ids.into_iter().next().ok_or_else(|| {
            Error::ErrorWithMessage(String::from("Create response carried no id"))
        })
    }

    pub async fn update(&self, id: &str, data: &QnaData) -> Result<()> {
        let url = format!("{}/mod/qna/questions/{}", self.base_url, id);
        let res = self.client.post(&url).json(data).send().await?;
        if !res.status().is_success() {
            return Err(Error::ErrorWithMessage(read_server_message(res).await));
        }
        Ok(())
    }

    /// Deletes a persisted item. The response body is ignored.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let url = format!("{}/mod/qna/questions/{}/delete", self.base_url, id);
        let res = self.client.post(&url).send().await?;
        if !res.status().is_success() {
            return Err(Error::ErrorWithMessage(read_server_message(res).await));
        }
        Ok(())
    }
}

/// Error bodies carry `{message}`. Anything else degrades to the status line
/// so the user still sees something actionable.
async fn read_server_message(res: reqwest::Response) -> String {
    let status = res.status();
    match res.text().await {
        Ok(body) => serde_json::from_str::<ServerMessage>(&body)
            .map(|m| m.message)
            .unwrap_or_else(|_| format!("HTTP {}", status)),
        Err(_) => format!("HTTP {}", status),
    }
}
