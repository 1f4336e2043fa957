//! Topic and workflow naming helpers from the studio side panel, plus the
//! topic REST calls the panel wires to its create/list buttons.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::result::{Error, Result};

pub const FLOW_EXT: &str = ".flow.json";

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Topic {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// First of `base`, `base-1`, `base-2`, … not already taken. Used when the
/// panel creates a topic or workflow without asking for a name.
pub fn next_unique_name<'a, I>(base: &str, existing: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let taken: Vec<&str> = existing.into_iter().collect();
    let mut name = String::from(base);
    let mut index = 0;
    while taken.iter().any(|t| *t == name) {
        index += 1;
        name = format!("{}-{}", base, index);
    }
    name
}

/// A workflow's full flow name, `"<topic>/<workflow>"`, with the flow file
/// extension when `with_ext` is set.
pub fn build_flow_name(topic: &str, workflow: &str, with_ext: bool) -> String {
    if with_ext {
        format!("{}/{}{}", topic, workflow, FLOW_EXT)
    } else {
        format!("{}/{}", topic, workflow)
    }
}

pub fn strip_flow_ext(flow: &str) -> &str {
    flow.strip_suffix(FLOW_EXT).unwrap_or(flow)
}

#[derive(Clone)]
pub struct TopicClient {
    client: reqwest::Client,
    base_url: String,
}

impl TopicClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_millis(1000))
            .timeout(Duration::from_millis(10000))
            .build()?;
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Ok(TopicClient { client, base_url })
    }

    pub async fn create(&self, name: &str, description: Option<&str>) -> Result<()> {
        let url = format!("{}/topic", self.base_url);
        let body = Topic {
            name: String::from(name),
            description: description.map(String::from),
        };
        let res = self.client.post(&url).json(&body).send().await?;
        if !res.status().is_success() {
            return Err(Error::ErrorWithMessage(format!(
                "Creating topic {} failed: HTTP {}",
                name,
                res.status()
            )));
        }
        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<Topic>> {
        let url = format!("{}/topic", self.base_url);
        let res = self.client.get(&url).send().await?;
        if !res.status().is_success() {
            return Err(Error::ErrorWithMessage(format!(
                "Fetching topics failed: HTTP {}",
                res.status()
            )));
        }
        Ok(res.json().await?)
    }
}
