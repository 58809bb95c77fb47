use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Malformed filter: {0}")]
    MalformedFilter(String),

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),
}

impl From<serde_json::Error> for FilterError {
    fn from(err: serde_json::Error) -> Self {
        FilterError::MalformedFilter(err.to_string())
    }
}

impl From<bson::extjson::de::Error> for FilterError {
    fn from(err: bson::extjson::de::Error) -> Self {
        FilterError::MalformedFilter(err.to_string())
    }
}
