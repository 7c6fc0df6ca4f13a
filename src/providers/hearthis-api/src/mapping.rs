use crate::models::{Category, LoginResponse, Track};
use hearthis_core::models::{Category as CoreCategory, RemoteUser, Session, SingleTrack};
use hearthis_core::FetchError;

/// Tracks without a stream address or owner cannot be cached and are dropped.
pub fn map_track(track: Track) -> Option<SingleTrack> {
    let stream_url = track.stream_url.filter(|url| !url.is_empty())?;
    let user = track.user?;
    Some(SingleTrack {
        id: track.id,
        title: track.title,
        stream_url,
        user_id: track.user_id.unwrap_or(user.id),
        user: RemoteUser {
            id: user.id,
            username: user.username,
            permalink: user.permalink,
        },
        permalink_url: track.permalink_url,
        duration_seconds: track.duration.and_then(|d| u32::try_from(d).ok()),
        genre: track.genre.filter(|g| !g.is_empty()),
        artwork_url: track.artwork_url,
    })
}

pub fn map_tracks(tracks: Vec<Track>) -> Vec<SingleTrack> {
    let total = tracks.len();
    let mapped: Vec<SingleTrack> = tracks.into_iter().filter_map(map_track).collect();
    if mapped.len() < total {
        tracing::debug!(
            dropped = total - mapped.len(),
            "skipped tracks without stream url or owner"
        );
    }
    mapped
}

pub fn map_category(category: Category) -> CoreCategory {
    CoreCategory {
        id: category.id,
        name: category.name,
    }
}

pub fn map_session(login: LoginResponse, username: &str) -> Result<Session, FetchError> {
    match (login.key, login.secret) {
        (Some(key), Some(secret)) if !key.is_empty() && !secret.is_empty() => Ok(Session {
            user_id: login.id,
            username: login.username.unwrap_or_else(|| username.to_string()),
            key,
            secret,
        }),
        _ => Err(FetchError::Authentication {
            message: "login response did not include a session key".into(),
        }),
    }
}
