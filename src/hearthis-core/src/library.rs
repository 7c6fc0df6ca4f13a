//! Navigation and resolution over the synthetic URI tree.
//!
//! [`HearthisLibrary`] turns browse/lookup/search requests into remote fetches,
//! merges every fetched batch into its [`CatalogCache`] and renders results by
//! reading back from the cache, so anything it lists can later be resolved
//! from the same in-memory entities.

use crate::cache::{CacheStats, CatalogCache};
use crate::factory::{create_directory_refs, create_track_models};
use crate::models::{ArtistEntity, FeedType, Ref, SearchResult, Session, SingleTrack, TrackEntity};
use crate::remote::{FetchError, RemoteCatalog, PAGE_SIZE};
use crate::uri::{
    artist_uri, category_page_prefix, category_uri, pad_page, search_uri, track_uri, LibraryUri,
    CATEGORIES_URI, FEED_URI, NEWS_URI,
};
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("entity not found: {entity}")]
    NotFound { entity: String },
    #[error("invalid uri: {uri}")]
    InvalidUri { uri: String },
    #[error(transparent)]
    Remote(#[from] FetchError),
}

pub type LibraryResult<T> = Result<T, LibraryError>;

/// Account used to open the remote session.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

pub struct HearthisLibrary<C> {
    catalog: C,
    credentials: Credentials,
    session: Mutex<Option<Session>>,
    cache: Mutex<CatalogCache>,
}

impl<C: RemoteCatalog> HearthisLibrary<C> {
    pub fn new(catalog: C, credentials: Credentials) -> Self {
        Self {
            catalog,
            credentials,
            session: Mutex::new(None),
            cache: Mutex::new(CatalogCache::new()),
        }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.lock_cache().stats()
    }

    /// Children of a directory URI.
    pub fn browse(&self, uri: &str) -> LibraryResult<Vec<Ref>> {
        match parse(uri)? {
            LibraryUri::Root => Ok(root_refs()),
            LibraryUri::Feed { page } => self.feed(FeedType::Undefined, page, FEED_URI),
            LibraryUri::News { page } => self.feed(FeedType::New, page, NEWS_URI),
            LibraryUri::Categories => self.categories(),
            LibraryUri::Category { id, page } => {
                let page = page.unwrap_or(1);
                let refs = self
                    .category_tracks(&id, page)?
                    .iter()
                    .map(track_ref)
                    .collect();
                Ok(with_page_folders(refs, &category_page_prefix(&id), page))
            }
            // leaves
            LibraryUri::Track { .. } | LibraryUri::Artist { .. } => Ok(Vec::new()),
        }
    }

    /// Tracks addressed by a track, artist or category URI.
    pub fn lookup(&self, uri: &str) -> LibraryResult<Vec<TrackEntity>> {
        tracing::debug!(uri, "lookup");
        match parse(uri)? {
            LibraryUri::Track { id } => self.track(id).map(|track| vec![track]),
            LibraryUri::Artist { id } => self.artist_tracks(id),
            LibraryUri::Category { id, page } => self.category_tracks(&id, page.unwrap_or(1)),
            _ => Err(LibraryError::InvalidUri {
                uri: uri.to_string(),
            }),
        }
    }

    /// First page of a free-text search.
    pub fn search(&self, query: &str) -> LibraryResult<SearchResult> {
        let session = self.session()?;
        let fetched = self.catalog.search(&session, query, 1, PAGE_SIZE)?;
        let tracks = self.merge(&fetched, false);

        let mut artists: Vec<ArtistEntity> = Vec::new();
        for track in &tracks {
            if !artists.iter().any(|artist| artist.uri == track.artist.uri) {
                artists.push(track.artist.clone());
            }
        }

        Ok(SearchResult {
            uri: search_uri(query),
            tracks,
            artists,
            albums: Vec::new(),
        })
    }

    fn feed(&self, feed_type: FeedType, page: Option<u32>, prefix: &str) -> LibraryResult<Vec<Ref>> {
        let page = page.unwrap_or(1);
        let session = self.session()?;
        let fetched = self.catalog.get_feed(&session, feed_type, page, PAGE_SIZE)?;
        let refs = self.merge(&fetched, false).iter().map(track_ref).collect();
        Ok(with_page_folders(refs, prefix, page))
    }

    fn categories(&self) -> LibraryResult<Vec<Ref>> {
        {
            let cache = self.lock_cache();
            if cache.has_categories() {
                return Ok(sorted_by_name(create_directory_refs(cache.categories())));
            }
        }

        let session = self.session()?;
        let fetched = self.catalog.get_categories(&session)?;
        tracing::debug!(count = fetched.len(), "fetched category list");

        let mut cache = self.lock_cache();
        cache.add_categories(fetched);
        Ok(sorted_by_name(create_directory_refs(cache.categories())))
    }

    /// Only categories already listed under `hearthis:categories` resolve.
    fn category_tracks(&self, category_id: &str, page: u32) -> LibraryResult<Vec<TrackEntity>> {
        let category = self
            .lock_cache()
            .category(category_id)
            .cloned()
            .ok_or_else(|| LibraryError::NotFound {
                entity: category_uri(category_id),
            })?;

        let session = self.session()?;
        let fetched = self
            .catalog
            .get_category_tracks(&session, &category, page, PAGE_SIZE)?;
        Ok(self.merge(&fetched, false))
    }

    fn track(&self, track_id: u64) -> LibraryResult<TrackEntity> {
        let uri = track_uri(track_id);
        self.lock_cache()
            .track_by_uri(&uri)
            .cloned()
            .ok_or(LibraryError::NotFound { entity: uri })
    }

    fn artist_tracks(&self, user_id: u64) -> LibraryResult<Vec<TrackEntity>> {
        let uri = artist_uri(user_id);
        let (complete, artist) = {
            let cache = self.lock_cache();
            (cache.is_artist_complete(&uri), cache.artist(&uri).cloned())
        };

        if !complete {
            // the remote API addresses artists by permalink, which is only
            // known once one of their tracks has been listed
            let artist = artist.ok_or_else(|| LibraryError::NotFound {
                entity: uri.clone(),
            })?;
            let session = self.session()?;
            let fetched = self
                .catalog
                .get_artist_tracks(&session, &artist.permalink)?;
            tracing::info!(artist = %uri, count = fetched.len(), "fetched full artist catalog");

            let mut cache = self.lock_cache();
            cache.insert_many(create_track_models(&fetched), true);
            cache.mark_artist_complete(&uri);
        }

        Ok(self.lock_cache().artist_tracks(&uri))
    }

    /// Insert a fetched batch and read it back from the cache in batch order.
    fn merge(&self, fetched: &[SingleTrack], complete_artist: bool) -> Vec<TrackEntity> {
        let entries = create_track_models(fetched);
        let stream_urls: Vec<String> = entries
            .iter()
            .map(|entry| entry.track.stream_url.clone())
            .collect();

        let mut cache = self.lock_cache();
        cache.insert_many(entries, complete_artist);
        tracing::debug!(stats = ?cache.stats(), "merged {} tracks", stream_urls.len());

        stream_urls
            .iter()
            .filter_map(|url| cache.track_by_stream_url(url).cloned())
            .collect()
    }

    fn session(&self) -> LibraryResult<Session> {
        let mut guard = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(session) = guard.as_ref() {
            return Ok(session.clone());
        }

        let session = self
            .catalog
            .login(&self.credentials.username, &self.credentials.password)?;
        tracing::info!(user = %session.username, "logged in to hearthis");
        *guard = Some(session.clone());
        Ok(session)
    }

    fn lock_cache(&self) -> MutexGuard<'_, CatalogCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn parse(uri: &str) -> LibraryResult<LibraryUri> {
    LibraryUri::parse(uri).ok_or_else(|| LibraryError::InvalidUri {
        uri: uri.to_string(),
    })
}

fn root_refs() -> Vec<Ref> {
    vec![
        Ref::directory(FEED_URI, "Feed"),
        Ref::directory(CATEGORIES_URI, "Categories"),
        Ref::directory(NEWS_URI, "News"),
    ]
}

fn track_ref(track: &TrackEntity) -> Ref {
    Ref::track(track.uri.clone(), track.name.clone())
}

fn sorted_by_name(mut refs: Vec<Ref>) -> Vec<Ref> {
    refs.sort_by(|a, b| a.name.cmp(&b.name));
    refs
}

/// Prepend page navigation entries: `[previous (page > 1), next, ..items]`.
pub fn with_page_folders(items: Vec<Ref>, prefix: &str, current_page: u32) -> Vec<Ref> {
    let mut refs = Vec::with_capacity(items.len() + 2);
    if current_page > 1 {
        refs.push(page_ref(prefix, current_page - 1));
    }
    if let Some(next) = current_page.checked_add(1) {
        refs.push(page_ref(prefix, next));
    }
    refs.extend(items);
    refs
}

fn page_ref(prefix: &str, page: u32) -> Ref {
    Ref::directory(format!("{prefix}:{page}"), format!("Page {}", pad_page(page)))
}
