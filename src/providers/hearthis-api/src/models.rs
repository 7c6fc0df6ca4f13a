//! Wire formats of the hearthis v2 API.
//!
//! The API serialises most numbers as strings (`"id": "123"`), so numeric
//! fields accept either form.

use serde::{de, Deserialize, Deserializer};

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    #[serde(deserialize_with = "number_or_string")]
    pub id: u64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub secret: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Track {
    #[serde(deserialize_with = "number_or_string")]
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub stream_url: Option<String>,
    #[serde(default, deserialize_with = "optional_number_or_string")]
    pub user_id: Option<u64>,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub permalink_url: Option<String>,
    #[serde(default, deserialize_with = "optional_number_or_string")]
    pub duration: Option<u64>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub artwork_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct User {
    #[serde(deserialize_with = "number_or_string")]
    pub id: u64,
    pub username: String,
    pub permalink: String,
}

#[derive(Debug, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(u64),
    Text(String),
}

fn number_or_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::Text(s) => s.trim().parse().map_err(de::Error::custom),
    }
}

/// Missing, `null` and empty strings all decode to `None`.
fn optional_number_or_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<u64>, D::Error> {
    match Option::<NumberOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrString::Number(n)) => Ok(Some(n)),
        Some(NumberOrString::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(NumberOrString::Text(s)) => s.trim().parse().map(Some).map_err(de::Error::custom),
    }
}
