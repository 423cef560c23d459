use serde::{Deserialize, Serialize};

/// A citation backing a retrieved item, deduplicated by (title, date).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub title: String,
    pub date: String,
    pub url: String,
}
