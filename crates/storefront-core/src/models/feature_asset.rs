use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Confirmed asset held in the backend's feature list.
///
/// Ids are assigned by the backend. The wire format uses `_id` and `image`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureAsset {
    #[serde(rename = "_id", deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(rename = "image")]
    pub remote_url: String,
    #[serde(
        rename = "createdAt",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

impl FeatureAsset {
    pub fn new(id: impl Into<String>, remote_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            remote_url: remote_url.into(),
            created_at: None,
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(i64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}
