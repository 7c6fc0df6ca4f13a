//! In-memory catalog cache.
//!
//! Every fetched track is stored once, keyed by its stream address. The
//! synthetic track URI and the per-artist listings index into that primary
//! map, so a listing rendered from the cache and a later lookup of one of its
//! URIs always see the same entity. Entries are never updated or evicted: the
//! first insert of a stream address wins for the lifetime of the cache.

use crate::models::{ArtistEntity, CacheEntry, Category, TrackEntity};
use std::collections::HashMap;

#[derive(Debug, Default)]
struct ArtistTracks {
    /// Set once a full artist fetch has been merged. Never cleared.
    complete: bool,
    /// Stream addresses in insertion order.
    stream_urls: Vec<String>,
}

#[derive(Debug, Default)]
pub struct CatalogCache {
    by_stream_url: HashMap<String, CacheEntry>,
    /// Track URI -> stream address
    by_track_uri: HashMap<String, String>,
    artist_tracks: HashMap<String, ArtistTracks>,
    artists: HashMap<String, ArtistEntity>,
    categories: HashMap<String, Category>,
}

impl CatalogCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one entry.
    ///
    /// A stream address that is already cached leaves every track index
    /// untouched, including the artist's listing. `complete_artist` marks the
    /// artist's listing complete even when the track itself was a duplicate.
    pub fn insert(&mut self, entry: CacheEntry, complete_artist: bool) {
        let artist_uri = entry.artist.uri.clone();

        if !self.artists.contains_key(&artist_uri) {
            self.artists.insert(artist_uri.clone(), entry.artist.clone());
        }

        let listing = self.artist_tracks.entry(artist_uri).or_default();
        if complete_artist {
            listing.complete = true;
        }

        let stream_url = entry.track.stream_url.clone();
        if self.by_stream_url.contains_key(&stream_url) {
            tracing::trace!(stream_url = %stream_url, "ignoring already cached track");
            return;
        }

        self.by_track_uri
            .entry(entry.track.uri.clone())
            .or_insert_with(|| stream_url.clone());
        listing.stream_urls.push(stream_url.clone());
        self.by_stream_url.insert(stream_url, entry);
    }

    /// Insert entries in order; the order defines the artist listing order.
    pub fn insert_many(&mut self, entries: impl IntoIterator<Item = CacheEntry>, complete_artist: bool) {
        for entry in entries {
            self.insert(entry, complete_artist);
        }
    }

    /// Flag an artist's listing complete without adding tracks, e.g. after a
    /// full fetch that returned nothing.
    pub fn mark_artist_complete(&mut self, artist_uri: &str) {
        self.artist_tracks
            .entry(artist_uri.to_string())
            .or_default()
            .complete = true;
    }

    pub fn is_artist_complete(&self, artist_uri: &str) -> bool {
        self.artist_tracks
            .get(artist_uri)
            .map(|listing| listing.complete)
            .unwrap_or(false)
    }

    /// Cached tracks of one artist in insertion order; empty when unseen.
    pub fn artist_tracks(&self, artist_uri: &str) -> Vec<TrackEntity> {
        self.artist_tracks
            .get(artist_uri)
            .map(|listing| {
                listing
                    .stream_urls
                    .iter()
                    .filter_map(|url| self.track_by_stream_url(url))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn artist(&self, artist_uri: &str) -> Option<&ArtistEntity> {
        self.artists.get(artist_uri)
    }

    pub fn track_by_stream_url(&self, stream_url: &str) -> Option<&TrackEntity> {
        self.by_stream_url.get(stream_url).map(|entry| &entry.track)
    }

    pub fn track_by_uri(&self, track_uri: &str) -> Option<&TrackEntity> {
        self.by_track_uri
            .get(track_uri)
            .and_then(|stream_url| self.track_by_stream_url(stream_url))
    }

    pub fn has_categories(&self) -> bool {
        !self.categories.is_empty()
    }

    /// All cached categories. Order is unspecified.
    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.categories.values()
    }

    pub fn category(&self, category_id: &str) -> Option<&Category> {
        self.categories.get(category_id)
    }

    pub fn add_categories(&mut self, categories: impl IntoIterator<Item = Category>) {
        for category in categories {
            self.categories
                .entry(category.id.clone())
                .or_insert(category);
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            track_count: self.by_stream_url.len(),
            artist_count: self.artists.len(),
            complete_artist_count: self
                .artist_tracks
                .values()
                .filter(|listing| listing.complete)
                .count(),
            category_count: self.categories.len(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub track_count: usize,
    pub artist_count: usize,
    pub complete_artist_count: usize,
    pub category_count: usize,
}
