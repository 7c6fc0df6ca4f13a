//! Pure conversion from remote records into cacheable entities.

use crate::models::{ArtistEntity, CacheEntry, Category, Ref, SingleTrack, TrackEntity};
use crate::uri::{artist_uri, category_uri, track_uri};

pub fn create_track_model(track: &SingleTrack) -> CacheEntry {
    let artist = ArtistEntity {
        uri: artist_uri(track.user_id),
        name: track.user.username.clone(),
        permalink: track.user.permalink.clone(),
    };
    let entity = TrackEntity {
        uri: track_uri(track.id),
        stream_url: track.stream_url.clone(),
        name: track.title.clone(),
        artist: artist.clone(),
        duration_seconds: track.duration_seconds,
        genre: track.genre.clone(),
        artwork_url: track.artwork_url.clone(),
    };
    CacheEntry {
        artist,
        track: entity,
        source: track.clone(),
    }
}

/// One entry per input record, in input order.
pub fn create_track_models(tracks: &[SingleTrack]) -> Vec<CacheEntry> {
    tracks.iter().map(create_track_model).collect()
}

pub fn create_directory_refs<'a>(categories: impl IntoIterator<Item = &'a Category>) -> Vec<Ref> {
    categories
        .into_iter()
        .map(|category| Ref::directory(category_uri(&category.id), category.name.clone()))
        .collect()
}
