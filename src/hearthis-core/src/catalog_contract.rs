use crate::models::{Category, FeedType, Session, SingleTrack};
use crate::remote::{RemoteCatalog, PAGE_SIZE};
use std::collections::HashSet;
use thiserror::Error;

/// Fixtures a catalog implementation supplies to run the shared contract suite.
#[derive(Debug, Clone)]
pub struct CatalogContractExpectations {
    pub username: String,
    pub password: String,
    /// Query whose first result is known.
    pub search_query: String,
    pub expected_first_track_id: u64,
    /// Category that must appear in the category list and have tracks.
    pub category_id: String,
    /// Artist whose full catalog must be non-empty and owned by one user.
    pub artist_permalink: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogContractError {
    #[error("login returned an empty session key")]
    EmptySessionKey,
    #[error("search returned no tracks for query: {query}")]
    EmptySearch { query: String },
    #[error("search returned wrong first track id: expected {expected}, got {actual}")]
    SearchWrongFirstTrack { expected: u64, actual: u64 },
    #[error("{operation} returned {count} tracks for a page size of {page_size}")]
    PageTooLarge {
        operation: String,
        count: usize,
        page_size: u32,
    },
    #[error("{operation} returned track {track_id} without a stream url")]
    MissingStreamUrl { operation: String, track_id: u64 },
    #[error("{operation} returned duplicate stream url {stream_url}")]
    DuplicateStreamUrl {
        operation: String,
        stream_url: String,
    },
    #[error("track {track_id} has user_id {user_id} but owner {owner_id}")]
    OwnerMismatch {
        track_id: u64,
        user_id: u64,
        owner_id: u64,
    },
    #[error("category list does not contain {category_id}")]
    MissingCategory { category_id: String },
    #[error("category {category_id} returned no tracks")]
    EmptyCategory { category_id: String },
    #[error("artist {permalink} returned no tracks")]
    EmptyArtist { permalink: String },
    #[error("artist {permalink} returned tracks from several users")]
    MixedArtist { permalink: String },
    #[error("catalog error while running contract: {0}")]
    CatalogFailure(String),
}

/// Run the shared contract suite against a remote catalog implementation.
pub fn run_catalog_contract<C: RemoteCatalog>(
    catalog: &C,
    expectations: &CatalogContractExpectations,
) -> Result<(), CatalogContractError> {
    let session = catalog
        .login(&expectations.username, &expectations.password)
        .map_err(failure)?;
    if session.key.is_empty() {
        return Err(CatalogContractError::EmptySessionKey);
    }

    verify_search(catalog, &session, expectations)?;
    verify_feed(catalog, &session)?;
    let category = verify_categories(catalog, &session, expectations)?;
    verify_category_tracks(catalog, &session, &category)?;
    verify_artist(catalog, &session, expectations)?;
    Ok(())
}

fn verify_search<C: RemoteCatalog>(
    catalog: &C,
    session: &Session,
    expectations: &CatalogContractExpectations,
) -> Result<(), CatalogContractError> {
    let tracks = catalog
        .search(session, &expectations.search_query, 1, PAGE_SIZE)
        .map_err(failure)?;
    let first = tracks.first().ok_or_else(|| CatalogContractError::EmptySearch {
        query: expectations.search_query.clone(),
    })?;
    if first.id != expectations.expected_first_track_id {
        return Err(CatalogContractError::SearchWrongFirstTrack {
            expected: expectations.expected_first_track_id,
            actual: first.id,
        });
    }
    verify_page("search", &tracks)
}

fn verify_feed<C: RemoteCatalog>(catalog: &C, session: &Session) -> Result<(), CatalogContractError> {
    for feed_type in [FeedType::Undefined, FeedType::New] {
        let tracks = catalog
            .get_feed(session, feed_type, 1, PAGE_SIZE)
            .map_err(failure)?;
        verify_page("feed", &tracks)?;
    }
    Ok(())
}

fn verify_categories<C: RemoteCatalog>(
    catalog: &C,
    session: &Session,
    expectations: &CatalogContractExpectations,
) -> Result<Category, CatalogContractError> {
    catalog
        .get_categories(session)
        .map_err(failure)?
        .into_iter()
        .find(|category| category.id == expectations.category_id)
        .ok_or_else(|| CatalogContractError::MissingCategory {
            category_id: expectations.category_id.clone(),
        })
}

fn verify_category_tracks<C: RemoteCatalog>(
    catalog: &C,
    session: &Session,
    category: &Category,
) -> Result<(), CatalogContractError> {
    let tracks = catalog
        .get_category_tracks(session, category, 1, PAGE_SIZE)
        .map_err(failure)?;
    if tracks.is_empty() {
        return Err(CatalogContractError::EmptyCategory {
            category_id: category.id.clone(),
        });
    }
    verify_page("category", &tracks)
}

fn verify_artist<C: RemoteCatalog>(
    catalog: &C,
    session: &Session,
    expectations: &CatalogContractExpectations,
) -> Result<(), CatalogContractError> {
    let permalink = &expectations.artist_permalink;
    let tracks = catalog
        .get_artist_tracks(session, permalink)
        .map_err(failure)?;
    if tracks.is_empty() {
        return Err(CatalogContractError::EmptyArtist {
            permalink: permalink.clone(),
        });
    }
    let owners: HashSet<u64> = tracks.iter().map(|t| t.user_id).collect();
    if owners.len() > 1 {
        return Err(CatalogContractError::MixedArtist {
            permalink: permalink.clone(),
        });
    }
    verify_tracks("artist", &tracks)
}

fn verify_page(operation: &str, tracks: &[SingleTrack]) -> Result<(), CatalogContractError> {
    if tracks.len() > PAGE_SIZE as usize {
        return Err(CatalogContractError::PageTooLarge {
            operation: operation.into(),
            count: tracks.len(),
            page_size: PAGE_SIZE,
        });
    }
    verify_tracks(operation, tracks)
}

fn verify_tracks(operation: &str, tracks: &[SingleTrack]) -> Result<(), CatalogContractError> {
    let mut seen = HashSet::new();
    for track in tracks {
        if track.stream_url.is_empty() {
            return Err(CatalogContractError::MissingStreamUrl {
                operation: operation.into(),
                track_id: track.id,
            });
        }
        if !seen.insert(track.stream_url.as_str()) {
            return Err(CatalogContractError::DuplicateStreamUrl {
                operation: operation.into(),
                stream_url: track.stream_url.clone(),
            });
        }
        if track.user_id != track.user.id {
            return Err(CatalogContractError::OwnerMismatch {
                track_id: track.id,
                user_id: track.user_id,
                owner_id: track.user.id,
            });
        }
    }
    Ok(())
}

fn failure(err: crate::remote::FetchError) -> CatalogContractError {
    CatalogContractError::CatalogFailure(err.to_string())
}
