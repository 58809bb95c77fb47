use bson::Document;
use serde::{Deserialize, Serialize};

/// Raw listing parameters exactly as they arrive on the query string.
/// Everything is kept as a string so bad numbers fall back to defaults
/// instead of failing extraction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListParams {
    pub query: Option<String>,
    pub fields: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: i64,
    pub limit: i64,
    pub skip: u64,
}

impl PageWindow {
    pub fn new(page: i64, limit: i64) -> Self {
        let skip = (page.saturating_sub(1)).saturating_mul(limit).max(0) as u64;
        Self { page, limit, skip }
    }
}

/// Translator output handed to the store
#[derive(Debug, Clone, PartialEq)]
pub struct FilterData {
    pub filter: Document,
    /// Empty means no restriction
    pub projection: Document,
    pub window: PageWindow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldMode {
    Include,
    Exclude,
}

impl FieldMode {
    pub fn flag(&self) -> i32 {
        match self {
            FieldMode::Include => 1,
            FieldMode::Exclude => 0,
        }
    }
}
