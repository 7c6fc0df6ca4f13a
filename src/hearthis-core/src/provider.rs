use crate::library::{HearthisLibrary, LibraryError};
use crate::models::{Ref, SearchQuery, SearchResult, TrackEntity};
use crate::remote::RemoteCatalog;
use crate::uri::ROOT_URI;

/// Library surface exposed to the host media player.
///
/// Implementations never fail: errors are logged and turned into empty
/// results, so the host only ever sees an empty listing.
pub trait LibraryProvider: Send + Sync {
    /// Directory the host shows as the entry point of this library.
    fn root_directory(&self) -> Ref;

    fn browse(&self, uri: &str) -> Vec<Ref>;

    fn lookup(&self, uri: &str) -> Vec<TrackEntity>;

    /// `None` when the query has no terms or the search failed.
    fn search(&self, query: &SearchQuery) -> Option<SearchResult>;
}

pub struct HearthisLibraryProvider<C> {
    library: HearthisLibrary<C>,
}

impl<C: RemoteCatalog> HearthisLibraryProvider<C> {
    pub fn new(library: HearthisLibrary<C>) -> Self {
        Self { library }
    }

    pub fn library(&self) -> &HearthisLibrary<C> {
        &self.library
    }
}

impl<C: RemoteCatalog> LibraryProvider for HearthisLibraryProvider<C> {
    fn root_directory(&self) -> Ref {
        Ref::directory(ROOT_URI, "Hearthis music community")
    }

    fn browse(&self, uri: &str) -> Vec<Ref> {
        self.library
            .browse(uri)
            .unwrap_or_else(|err| log_failure("browse", uri, err))
    }

    fn lookup(&self, uri: &str) -> Vec<TrackEntity> {
        self.library
            .lookup(uri)
            .unwrap_or_else(|err| log_failure("lookup", uri, err))
    }

    fn search(&self, query: &SearchQuery) -> Option<SearchResult> {
        let term = query.primary_term()?;
        match self.library.search(term) {
            Ok(result) => Some(result),
            Err(err) => {
                tracing::error!(query = term, error = %err, "search failed");
                None
            }
        }
    }
}

fn log_failure<T>(operation: &str, uri: &str, err: LibraryError) -> Vec<T> {
    match err {
        LibraryError::NotFound { .. } => {
            tracing::warn!(operation, uri, error = %err, "nothing to return")
        }
        _ => tracing::error!(operation, uri, error = %err, "request failed"),
    }
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::fixtures::track;
    use crate::library::Credentials;
    use crate::models::{Category, FeedType, Session, SingleTrack};
    use crate::remote::{FetchError, FetchResult};

    /// Serves one fixed batch for every track listing; optionally fails every call.
    struct StaticCatalog {
        offline: bool,
    }

    impl StaticCatalog {
        fn batch(&self) -> FetchResult<Vec<SingleTrack>> {
            if self.offline {
                return Err(FetchError::Network {
                    message: "connection refused".into(),
                });
            }
            Ok(vec![track(1, 101, "Track 1"), track(2, 201, "Track 2")])
        }
    }

    impl RemoteCatalog for StaticCatalog {
        fn login(&self, username: &str, _password: &str) -> FetchResult<Session> {
            Ok(Session {
                user_id: 1,
                username: username.into(),
                key: "k".into(),
                secret: "s".into(),
            })
        }

        fn search(&self, _: &Session, _: &str, _: u32, _: u32) -> FetchResult<Vec<SingleTrack>> {
            self.batch()
        }

        fn get_feed(&self, _: &Session, _: FeedType, _: u32, _: u32) -> FetchResult<Vec<SingleTrack>> {
            self.batch()
        }

        fn get_category_tracks(
            &self,
            _: &Session,
            _: &Category,
            _: u32,
            _: u32,
        ) -> FetchResult<Vec<SingleTrack>> {
            self.batch()
        }

        fn get_categories(&self, _: &Session) -> FetchResult<Vec<Category>> {
            Ok(vec![Category::new("house", "House")])
        }

        fn get_artist_tracks(&self, _: &Session, _: &str) -> FetchResult<Vec<SingleTrack>> {
            self.batch()
        }
    }

    fn provider(offline: bool) -> HearthisLibraryProvider<StaticCatalog> {
        HearthisLibraryProvider::new(HearthisLibrary::new(
            StaticCatalog { offline },
            Credentials {
                username: "u".into(),
                password: "p".into(),
            },
        ))
    }

    #[test]
    fn root_directory_uri() {
        assert_eq!(provider(false).root_directory().uri, "hearthis:root");
    }

    #[test]
    fn failures_become_empty_results() {
        let provider = provider(true);

        assert!(provider.browse("hearthis:feed").is_empty());
        assert!(provider.browse("nonsense").is_empty());
        assert!(provider.lookup("hearthis:track:1").is_empty());
        assert!(provider.lookup("hearthis:album:1").is_empty());
        assert!(provider.search(&SearchQuery::any("x")).is_none());
    }

    #[test]
    fn out_of_range_pages_become_empty_results() {
        let provider = provider(false);

        assert!(provider.browse("hearthis:feed:4294967295").is_empty());
        assert!(provider.browse("hearthis:news:4294967295").is_empty());
        assert!(provider
            .browse("hearthis:categories:_p:house:4294967295")
            .is_empty());
    }

    #[test]
    fn browse_then_lookup_round_trip() {
        let provider = provider(false);

        let refs = provider.browse("hearthis:feed");
        let track_uri = &refs[1].uri;
        let tracks = provider.lookup(track_uri);

        assert_eq!(tracks.len(), 1);
        assert_eq!(&tracks[0].uri, track_uri);
    }

    #[test]
    fn search_uses_first_available_term() {
        let provider = provider(false);
        let query = SearchQuery {
            any: vec![],
            album: vec![],
            artist: vec!["someone".into()],
        };

        let result = provider.search(&query).expect("search result");

        assert_eq!(result.uri, "hearthis:search:someone");
        assert_eq!(result.tracks.len(), 2);
        assert!(provider.search(&SearchQuery::default()).is_none());
    }
}
