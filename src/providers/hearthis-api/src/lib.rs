//! HTTP client for the hearthis v2 API.
//!
//! [`HearthisClient`] implements [`RemoteCatalog`] on top of reqwest. Every
//! call runs on its own short-lived runtime with a fresh connection pool, so
//! the client can be called from any thread without an ambient executor.

mod mapping;
pub mod models;

use hearthis_core::config::HearthisConfig;
use hearthis_core::models::{Category, FeedType, Session, SingleTrack};
use hearthis_core::redact::redact_secrets;
use hearthis_core::{FetchError, FetchResult, RemoteCatalog};
use mapping::{map_category, map_session, map_tracks};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct HearthisClientConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl From<&HearthisConfig> for HearthisClientConfig {
    fn from(config: &HearthisConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            timeout: Duration::from_secs(config.timeout_seconds),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HearthisClient {
    base_url: Url,
    timeout: Duration,
}

type Query = Vec<(&'static str, String)>;

impl HearthisClient {
    pub fn new(config: HearthisClientConfig) -> FetchResult<Self> {
        let mut raw = config.base_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let base_url = Url::parse(&raw).map_err(|e| FetchError::Other {
            message: format!("invalid base_url: {e}"),
        })?;
        Ok(Self {
            base_url,
            timeout: config.timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append path segments to the base URL, keeping the trailing slash the
    /// API expects.
    fn endpoint(&self, segments: &[&str]) -> FetchResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::Other {
                message: format!("base_url cannot be a base: {}", self.base_url),
            })?
            .pop_if_empty()
            .extend(segments)
            .push("");
        Ok(url)
    }

    fn session_query(session: &Session) -> Query {
        vec![
            ("key", session.key.clone()),
            ("secret", session.secret.clone()),
        ]
    }

    fn paging_query(page: u32, page_size: u32) -> Query {
        vec![("page", page.to_string()), ("count", page_size.to_string())]
    }

    fn get_json<T: DeserializeOwned>(&self, url: Url, query: Query) -> FetchResult<T> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| FetchError::Other {
                message: format!("failed to start runtime: {e}"),
            })?;
        runtime.block_on(self.fetch(url, query))
    }

    async fn fetch<T: DeserializeOwned>(&self, url: Url, query: Query) -> FetchResult<T> {
        let endpoint = url.path().to_string();
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(self.timeout)
            .build()
            .map_err(|e| FetchError::Other {
                message: e.to_string(),
            })?;
        let request = client
            .get(url)
            .query(&query)
            .build()
            .map_err(|e| FetchError::Other {
                message: e.to_string(),
            })?;
        tracing::debug!(url = %redact_secrets(request.url().as_str()), "hearthis request");

        let resp = client
            .execute(request)
            .await
            .map_err(|e| FetchError::Network {
                message: redact_secrets(&e.to_string()).into_owned(),
            })?;
        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(FetchError::Authentication {
                message: format!("{endpoint} returned {status}"),
            });
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                endpoint,
                status: status.as_u16(),
            });
        }
        resp.json::<T>().await.map_err(|e| FetchError::Decode {
            endpoint,
            message: redact_secrets(&e.to_string()).into_owned(),
        })
    }

    fn get_tracks(&self, url: Url, query: Query) -> FetchResult<Vec<SingleTrack>> {
        let tracks: Vec<models::Track> = self.get_json(url, query)?;
        Ok(map_tracks(tracks))
    }
}

impl RemoteCatalog for HearthisClient {
    fn login(&self, username: &str, password: &str) -> FetchResult<Session> {
        let url = self.endpoint(&["login"])?;
        let query = vec![
            ("email", username.to_string()),
            ("password", password.to_string()),
        ];
        let login: models::LoginResponse = self.get_json(url, query)?;
        let session = map_session(login, username)?;
        tracing::info!(user_id = session.user_id, "hearthis login succeeded");
        Ok(session)
    }

    fn search(
        &self,
        session: &Session,
        query: &str,
        page: u32,
        page_size: u32,
    ) -> FetchResult<Vec<SingleTrack>> {
        let url = self.endpoint(&["search"])?;
        let mut params = vec![("t", query.to_string())];
        params.extend(Self::paging_query(page, page_size));
        params.extend(Self::session_query(session));
        self.get_tracks(url, params)
    }

    fn get_feed(
        &self,
        session: &Session,
        feed_type: FeedType,
        page: u32,
        page_size: u32,
    ) -> FetchResult<Vec<SingleTrack>> {
        let url = self.endpoint(&["feed"])?;
        let mut params = Query::new();
        if let Some(kind) = feed_type.as_query_value() {
            params.push(("type", kind.to_string()));
        }
        params.extend(Self::paging_query(page, page_size));
        params.extend(Self::session_query(session));
        self.get_tracks(url, params)
    }

    fn get_category_tracks(
        &self,
        session: &Session,
        category: &Category,
        page: u32,
        page_size: u32,
    ) -> FetchResult<Vec<SingleTrack>> {
        let url = self.endpoint(&["categories", &category.id])?;
        let mut params = Self::paging_query(page, page_size);
        params.extend(Self::session_query(session));
        self.get_tracks(url, params)
    }

    fn get_categories(&self, session: &Session) -> FetchResult<Vec<Category>> {
        let url = self.endpoint(&["categories"])?;
        let categories: Vec<models::Category> =
            self.get_json(url, Self::session_query(session))?;
        Ok(categories.into_iter().map(map_category).collect())
    }

    fn get_artist_tracks(
        &self,
        session: &Session,
        artist_permalink: &str,
    ) -> FetchResult<Vec<SingleTrack>> {
        let url = self.endpoint(&[artist_permalink])?;
        let mut params = vec![("type", "tracks".to_string())];
        params.extend(Self::session_query(session));
        self.get_tracks(url, params)
    }
}
