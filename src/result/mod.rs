use serde::ser::{Serialize, SerializeStruct};
use std::convert::From;

pub type Result<D> = core::result::Result<D, Error>;

#[derive(Debug)]
pub enum Error {
    ErrorWithMessage(String),
    SerdeError(serde_json::Error),
    NetworkError(reqwest::Error),
    InvalidJsonStructure(serde_json::Error),
}

impl Serialize for Error {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let message = match &self {
            Self::ErrorWithMessage(s) => String::from(s),
            Self::SerdeError(e) => format!("{:?}", e),
            Self::NetworkError(e) => format!("Network error: {:?}", e),
            Self::InvalidJsonStructure(e) => format!("Invalid JSON structure: {:?}", e),
        };
        let mut s = serializer.serialize_struct("Error", 1)?;
        s.serialize_field("message", &message)?;
        s.end()
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ErrorWithMessage(s) => write!(f, "{}", s),
            Self::SerdeError(e) => write!(f, "{:?}", e),
            Self::NetworkError(e) => write!(f, "Network error: {:?}", e),
            Self::InvalidJsonStructure(e) => write!(f, "Invalid JSON structure: {:?}", e),
        }
    }
}

impl std::error::Error for Error {}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerdeError(err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::NetworkError(err)
    }
}
