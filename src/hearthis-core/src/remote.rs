use crate::models::{Category, FeedType, Session, SingleTrack};
use thiserror::Error;

/// Number of records requested per page for every paginated call.
pub const PAGE_SIZE: u32 = 20;

/// Failures surfaced by a remote catalog fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error: {message}")]
    Network { message: String },
    #[error("authentication error: {message}")]
    Authentication { message: String },
    #[error("unexpected status {status} from {endpoint}")]
    Status { endpoint: String, status: u16 },
    #[error("failed to decode response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },
    #[error("{message}")]
    Other { message: String },
}

pub type FetchResult<T> = Result<T, FetchError>;

/// Blocking interface to the remote hearthis catalog.
///
/// Implementations may drive async I/O internally, but every call returns only
/// once the fetch has completed or failed. Sessions are obtained through
/// [`RemoteCatalog::login`] and cached by the caller.
pub trait RemoteCatalog: Send + Sync {
    fn login(&self, username: &str, password: &str) -> FetchResult<Session>;

    fn search(
        &self,
        session: &Session,
        query: &str,
        page: u32,
        page_size: u32,
    ) -> FetchResult<Vec<SingleTrack>>;

    fn get_feed(
        &self,
        session: &Session,
        feed_type: FeedType,
        page: u32,
        page_size: u32,
    ) -> FetchResult<Vec<SingleTrack>>;

    fn get_category_tracks(
        &self,
        session: &Session,
        category: &Category,
        page: u32,
        page_size: u32,
    ) -> FetchResult<Vec<SingleTrack>>;

    fn get_categories(&self, session: &Session) -> FetchResult<Vec<Category>>;

    /// Full, unpaged track listing of one artist.
    fn get_artist_tracks(
        &self,
        session: &Session,
        artist_permalink: &str,
    ) -> FetchResult<Vec<SingleTrack>>;
}
