use hearthis_api::{HearthisClient, HearthisClientConfig};
use hearthis_core::catalog_contract::{run_catalog_contract, CatalogContractExpectations};
use hearthis_core::models::{Category, FeedType, RefKind, Session};
use hearthis_core::{Credentials, FetchError, HearthisLibrary, RemoteCatalog};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::runtime::Runtime;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mock server on its own runtime; the blocking client is called from the
/// test thread.
struct Harness {
    server: MockServer,
    rt: Runtime,
}

impl Harness {
    fn start() -> Self {
        let rt = Runtime::new().unwrap();
        let server = rt.block_on(MockServer::start());
        Self { server, rt }
    }

    fn mount(&self, mock: Mock) {
        self.rt.block_on(mock.mount(&self.server));
    }

    fn client(&self) -> HearthisClient {
        HearthisClient::new(HearthisClientConfig {
            base_url: self.server.uri(),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    fn requested_urls(&self) -> Vec<String> {
        self.rt
            .block_on(self.server.received_requests())
            .unwrap_or_default()
            .iter()
            .map(|request| request.url.to_string())
            .collect()
    }
}

fn session() -> Session {
    Session {
        user_id: 9,
        username: "listener".into(),
        key: "k-123".into(),
        secret: "s-456".into(),
    }
}

fn track_json(id: u64, user_id: u64, title: &str) -> Value {
    json!({
        "id": id.to_string(),
        "title": title,
        "user_id": user_id.to_string(),
        "duration": "1800",
        "genre": "House",
        "permalink_url": format!("https://hearthis.at/artist-{user_id}/{id}/"),
        "artwork_url": null,
        "stream_url": format!("https://hearthis.at/artist-{user_id}/{id}/listen/"),
        "user": {
            "id": user_id.to_string(),
            "username": format!("Artist {user_id}"),
            "permalink": format!("artist-{user_id}")
        }
    })
}

fn json_get(route: &str, body: Value) -> Mock {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
}

fn mount_catalog(harness: &Harness) {
    harness.mount(
        Mock::given(method("GET"))
            .and(path("/login/"))
            .and(query_param("email", "listener@example.com"))
            .and(query_param("password", "hunter2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "9",
                "username": "listener",
                "key": "k-123",
                "secret": "s-456"
            }))),
    );
    harness.mount(json_get(
        "/search/",
        json!([track_json(1, 101, "Deep One"), track_json(2, 201, "Deep Two")]),
    ));
    harness.mount(json_get(
        "/feed/",
        json!([track_json(1, 101, "Deep One"), track_json(3, 101, "Feed Three")]),
    ));
    harness.mount(json_get(
        "/categories/",
        json!([
            {"id": "house", "name": "House"},
            {"id": "ambient", "name": "Ambient"}
        ]),
    ));
    harness.mount(json_get(
        "/categories/house/",
        json!([track_json(4, 201, "House Four")]),
    ));
    harness.mount(
        Mock::given(method("GET"))
            .and(path("/artist-101/"))
            .and(query_param("type", "tracks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                track_json(1, 101, "Deep One"),
                track_json(3, 101, "Feed Three"),
                track_json(5, 101, "Archive Five")
            ]))),
    );
}

#[test]
fn client_satisfies_catalog_contract() {
    let harness = Harness::start();
    mount_catalog(&harness);

    let expectations = CatalogContractExpectations {
        username: "listener@example.com".into(),
        password: "hunter2".into(),
        search_query: "deep".into(),
        expected_first_track_id: 1,
        category_id: "house".into(),
        artist_permalink: "artist-101".into(),
    };

    let result = run_catalog_contract(&harness.client(), &expectations);
    assert!(result.is_ok(), "expected contract to pass: {result:?}");
}

#[test]
fn requests_carry_session_and_paging() {
    let harness = Harness::start();
    mount_catalog(&harness);

    let tracks = harness
        .client()
        .search(&session(), "deep house", 2, 20)
        .unwrap();
    assert_eq!(tracks.len(), 2);
    assert_eq!(tracks[0].user.permalink, "artist-101");
    assert_eq!(tracks[0].duration_seconds, Some(1800));

    let urls = harness.requested_urls();
    let search = urls.iter().find(|u| u.contains("/search/")).unwrap();
    assert!(search.contains("t=deep+house"));
    assert!(search.contains("page=2"));
    assert!(search.contains("count=20"));
    assert!(search.contains("key=k-123"));
    assert!(search.contains("secret=s-456"));
}

#[test]
fn feed_type_is_only_sent_when_defined() {
    let harness = Harness::start();
    mount_catalog(&harness);
    let client = harness.client();

    client
        .get_feed(&session(), FeedType::Undefined, 1, 20)
        .unwrap();
    client.get_feed(&session(), FeedType::Popular, 1, 20).unwrap();

    let feeds: Vec<String> = harness
        .requested_urls()
        .into_iter()
        .filter(|u| u.contains("/feed/"))
        .collect();
    assert_eq!(feeds.len(), 2);
    assert!(!feeds[0].contains("type="));
    assert!(feeds[1].contains("type=popular"));
}

#[test]
fn category_tracks_use_category_slug() {
    let harness = Harness::start();
    mount_catalog(&harness);

    let tracks = harness
        .client()
        .get_category_tracks(&session(), &Category::new("house", "House"), 1, 20)
        .unwrap();

    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].id, 4);
}

#[test]
fn tracks_without_stream_url_are_skipped() {
    let harness = Harness::start();
    let mut private = track_json(8, 101, "Private");
    private["stream_url"] = Value::Null;
    harness.mount(json_get(
        "/feed/",
        json!([private, track_json(9, 101, "Public")]),
    ));

    let tracks = harness
        .client()
        .get_feed(&session(), FeedType::New, 1, 20)
        .unwrap();

    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].id, 9);
}

#[test]
fn unauthorized_maps_to_authentication_error() {
    let harness = Harness::start();
    harness.mount(
        Mock::given(method("GET"))
            .and(path("/login/"))
            .respond_with(ResponseTemplate::new(401)),
    );

    let err = harness.client().login("me", "wrong").unwrap_err();
    assert!(matches!(err, FetchError::Authentication { .. }));
}

#[test]
fn server_errors_map_to_status() {
    let harness = Harness::start();
    harness.mount(
        Mock::given(method("GET"))
            .and(path("/categories/"))
            .respond_with(ResponseTemplate::new(503)),
    );

    let err = harness.client().get_categories(&session()).unwrap_err();
    match err {
        FetchError::Status { endpoint, status } => {
            assert_eq!(endpoint, "/categories/");
            assert_eq!(status, 503);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn malformed_body_maps_to_decode_error() {
    let harness = Harness::start();
    harness.mount(
        Mock::given(method("GET"))
            .and(path("/search/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>")),
    );

    let err = harness
        .client()
        .search(&session(), "deep", 1, 20)
        .unwrap_err();
    assert!(matches!(err, FetchError::Decode { .. }));
}

#[test]
fn unreachable_server_maps_to_network_error() {
    let client = HearthisClient::new(HearthisClientConfig {
        base_url: "http://127.0.0.1:9/".into(),
        timeout: Duration::from_secs(2),
    })
    .unwrap();

    let err = client.get_categories(&session()).unwrap_err();
    assert!(matches!(err, FetchError::Network { .. }));
}

#[test]
fn library_resolves_what_it_listed() {
    let harness = Harness::start();
    mount_catalog(&harness);
    let library = HearthisLibrary::new(
        harness.client(),
        Credentials {
            username: "listener@example.com".into(),
            password: "hunter2".into(),
        },
    );

    let feed = library.browse("hearthis:feed").unwrap();
    let tracks: Vec<_> = feed.iter().filter(|r| r.kind == RefKind::Track).collect();
    assert_eq!(tracks.len(), 2);

    let looked_up = library.lookup(&tracks[0].uri).unwrap();
    assert_eq!(looked_up.len(), 1);
    assert_eq!(looked_up[0].name, "Deep One");

    let artist = library.lookup(&looked_up[0].artist.uri).unwrap();
    let names: Vec<&str> = artist.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Deep One", "Feed Three", "Archive Five"]);

    let categories = library.browse("hearthis:categories").unwrap();
    let names: Vec<&str> = categories.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Ambient", "House"]);
}
