use serde::{Deserialize, Serialize};

/// Owner of a remote track as reported by the hearthis API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteUser {
    pub id: u64,
    pub username: String,
    /// Path segment the remote API uses to address this user's catalog.
    pub permalink: String,
}

/// A track record exactly as fetched from the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingleTrack {
    pub id: u64,
    pub title: String,
    /// Direct playable-media URL. Unique per track.
    pub stream_url: String,
    pub user_id: u64,
    pub user: RemoteUser,
    pub permalink_url: Option<String>,
    pub duration_seconds: Option<u32>,
    pub genre: Option<String>,
    pub artwork_url: Option<String>,
}

/// A remote genre/category. Ids are slugs such as `drumandbass`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
}

impl Category {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Which remote feed to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FeedType {
    #[default]
    Undefined,
    New,
    Popular,
}

impl FeedType {
    /// Value of the `type` query parameter, `None` for the unfiltered feed.
    pub fn as_query_value(&self) -> Option<&'static str> {
        match self {
            FeedType::Undefined => None,
            FeedType::New => Some("new"),
            FeedType::Popular => Some("popular"),
        }
    }
}

/// Authenticated login session. `key` and `secret` accompany every call.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: u64,
    pub username: String,
    pub key: String,
    pub secret: String,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("username", &self.username)
            .field("key", &"[REDACTED]")
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// Artist derived from a track's owning user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistEntity {
    /// `hearthis:artist:<user-id>`
    pub uri: String,
    pub name: String,
    pub permalink: String,
}

/// Track as exposed to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackEntity {
    /// `hearthis:track:<track-id>`
    pub uri: String,
    pub stream_url: String,
    pub name: String,
    pub artist: ArtistEntity,
    pub duration_seconds: Option<u32>,
    pub genre: Option<String>,
    pub artwork_url: Option<String>,
}

/// The unit inserted into the catalog cache: both entities plus the raw record
/// they were built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub artist: ArtistEntity,
    pub track: TrackEntity,
    pub source: SingleTrack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefKind {
    Directory,
    Track,
    Artist,
}

/// A named pointer into the browse tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ref {
    pub kind: RefKind,
    pub uri: String,
    pub name: String,
}

impl Ref {
    pub fn directory(uri: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: RefKind::Directory,
            uri: uri.into(),
            name: name.into(),
        }
    }

    pub fn track(uri: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: RefKind::Track,
            uri: uri.into(),
            name: name.into(),
        }
    }
}

/// Host search query. Each field holds the terms entered for that key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub any: Vec<String>,
    #[serde(default)]
    pub album: Vec<String>,
    #[serde(default)]
    pub artist: Vec<String>,
}

impl SearchQuery {
    pub fn any(term: impl Into<String>) -> Self {
        Self {
            any: vec![term.into()],
            ..Self::default()
        }
    }

    /// First non-blank term of `any`, then `album`, then `artist`.
    pub fn primary_term(&self) -> Option<&str> {
        [&self.any, &self.album, &self.artist]
            .into_iter()
            .flatten()
            .map(|term| term.trim())
            .find(|term| !term.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub uri: String,
    pub tracks: Vec<TrackEntity>,
    pub artists: Vec<ArtistEntity>,
    /// The remote catalog has no albums; always empty.
    pub albums: Vec<String>,
}
