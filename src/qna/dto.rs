use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::de::{Deserializer, Error as DeError};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::form::FormData;

/// Wire prefix marking a client-generated id. Never stored by the server.
pub const LOCAL_ID_PREFIX: &str = "qna-";

static NEXT_LOCAL_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a QnA item. A `Local` id exists only in the editing session
/// and is replaced by a `Remote` id once the server accepts the item.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum QnaId {
    Local(u64),
    Remote(String),
}

impl QnaId {
    pub fn next_local() -> Self {
        QnaId::Local(NEXT_LOCAL_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn is_local(&self) -> bool {
        matches!(self, QnaId::Local(_))
    }
}

impl fmt::Display for QnaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QnaId::Local(n) => write!(f, "{}{}", LOCAL_ID_PREFIX, n),
            QnaId::Remote(id) => write!(f, "{}", id),
        }
    }
}

impl FromStr for QnaId {
    type Err = crate::result::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.strip_prefix(LOCAL_ID_PREFIX) {
            Some(tail) => tail.parse::<u64>().map(QnaId::Local).map_err(|_| {
                crate::result::Error::ErrorWithMessage(format!("Invalid local QnA id: {}", s))
            }),
            None => Ok(QnaId::Remote(String::from(s))),
        }
    }
}

impl Serialize for QnaId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for QnaId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|e| D::Error::custom(format!("{}", e)))
    }
}

/// Where an update or delete lands in [`super::state::ListState`]: a slot in
/// the paginated list, or the single deep-linked item outside it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateTarget {
    ByIndex(usize),
    Highlighted,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct QnaData {
    pub action: String,
    pub contexts: Vec<String>,
    pub enabled: bool,
    pub questions: HashMap<String, Vec<String>>,
    pub answers: HashMap<String, Vec<String>>,
    #[serde(rename = "contentAnswers", default)]
    pub content_answers: HashMap<String, Vec<FormData>>,
    // Empty string means "not set", matching the studio wire format.
    #[serde(rename = "redirectFlow", default)]
    pub redirect_flow: String,
    #[serde(rename = "redirectNode", default)]
    pub redirect_node: String,
}

impl QnaData {
    /// Blank template for a freshly added item: one empty phrasing and answer
    /// slot per language so the editor has something to expand into.
    pub fn blank_template(languages: &[String], contexts: Vec<String>) -> Self {
        let empty_entries: HashMap<String, Vec<String>> = languages
            .iter()
            .map(|l| (l.clone(), vec![String::new()]))
            .collect();
        let content_answers = languages.iter().map(|l| (l.clone(), Vec::new())).collect();
        QnaData {
            action: String::from("text"),
            contexts,
            enabled: true,
            questions: empty_entries.clone(),
            answers: empty_entries,
            content_answers,
            redirect_flow: String::new(),
            redirect_node: String::new(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct QnaItem {
    pub id: QnaId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(rename = "isNew", default)]
    pub is_new: bool,
    pub data: QnaData,
    #[serde(rename = "saveError", default, skip_serializing_if = "Option::is_none")]
    pub save_error: Option<String>,
}

impl QnaItem {
    /// Expansion-map key: the stable client key when present, the id
    /// otherwise. Client keys survive the id swap after a successful create.
    pub fn key_or_id(&self) -> String {
        self.key.clone().unwrap_or_else(|| self.id.to_string())
    }
}
