#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use marquee_config::{ApiToken, StaticToken};
use marquee_core::sync::{AssetSource, ByteStream};
use marquee_core::tmdb::{
    ApiRequest, ApiResponse, HttpTransport, RetryPolicy, TmdbClient,
};
use marquee_core::{Result, SyncError, TransportError};
use serde_json::{Value, json};

/// Canned TMDB responses keyed by path (and `page` for paged endpoints).
///
/// Unknown routes answer 404. Every request is recorded.
#[derive(Debug, Default)]
pub struct FixtureTransport {
    routes: Mutex<HashMap<String, (u16, String)>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl FixtureTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(path: &str, page: Option<&str>) -> String {
        match page {
            Some(page) => format!("{path}?page={page}"),
            None => path.to_string(),
        }
    }

    pub fn json(&self, path: &str, body: Value) -> &Self {
        self.raw(path, 200, body.to_string())
    }

    pub fn page(&self, path: &str, page: u32, body: Value) -> &Self {
        let key = Self::key(path, Some(&page.to_string()));
        self.routes
            .lock()
            .unwrap()
            .insert(key, (200, body.to_string()));
        self
    }

    pub fn page_status(&self, path: &str, page: u32, status: u16) -> &Self {
        let key = Self::key(path, Some(&page.to_string()));
        self.routes
            .lock()
            .unwrap()
            .insert(key, (status, String::from("{}")));
        self
    }

    pub fn raw(&self, path: &str, status: u16, body: impl Into<String>) -> &Self {
        self.routes
            .lock()
            .unwrap()
            .insert(path.to_string(), (status, body.into()));
        self
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|request| request.path == path)
            .count()
    }

    pub fn requested_pages(&self, path: &str) -> Vec<u32> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|request| request.path == path)
            .filter_map(|request| request.query_value("page"))
            .filter_map(|page| page.parse().ok())
            .collect()
    }

    pub fn clear_requests(&self) {
        self.requests.lock().unwrap().clear();
    }
}

#[async_trait]
impl HttpTransport for FixtureTransport {
    async fn get(
        &self,
        request: &ApiRequest,
        token: &ApiToken,
    ) -> std::result::Result<ApiResponse, TransportError> {
        assert_eq!(token.expose(), "test-token");
        self.requests.lock().unwrap().push(request.clone());

        let routes = self.routes.lock().unwrap();
        let paged = request
            .query_value("page")
            .and_then(|page| routes.get(&Self::key(&request.path, Some(page))));
        let (status, body) = paged
            .or_else(|| routes.get(&request.path))
            .cloned()
            .unwrap_or((404, String::from(r#"{"status_code": 34}"#)));

        Ok(ApiResponse {
            status,
            body: Bytes::from(body),
        })
    }
}

pub fn client(transport: Arc<FixtureTransport>) -> TmdbClient {
    TmdbClient::new(
        transport,
        Arc::new(StaticToken::new("test-token")),
        RetryPolicy::new(0, Duration::ZERO),
        "zh-CN",
    )
}

pub fn discover_page(page: u32, total_pages: u32, results: Vec<Value>) -> Value {
    json!({
        "page": page,
        "results": results,
        "total_pages": total_pages,
        "total_results": total_pages * 20,
    })
}

pub fn discover_movie(id: i64, title: &str, genre_ids: &[i64]) -> Value {
    json!({
        "id": id,
        "title": title,
        "original_title": title,
        "original_language": "en",
        "overview": format!("{title} overview"),
        "poster_path": format!("/poster-{id}.jpg"),
        "backdrop_path": null,
        "release_date": "1999-03-31",
        "adult": false,
        "video": false,
        "popularity": 12.5,
        "vote_average": 8.2,
        "vote_count": 2400,
        "genre_ids": genre_ids,
    })
}

pub fn movie_details(id: i64, runtime: i32) -> Value {
    json!({
        "id": id,
        "runtime": runtime,
        "budget": 63_000_000,
        "revenue": 0,
        "homepage": "",
        "imdb_id": format!("tt{id:07}"),
        "tagline": "Welcome to the real world.",
        "status": "Released",
    })
}

/// `(credit_id, person_id)` pairs for cast and crew.
pub fn movie_credits(cast: &[(&str, i64)], crew: &[(&str, i64)]) -> Value {
    let entries = |items: &[(&str, i64)]| -> Vec<Value> {
        items
            .iter()
            .map(|(credit, person)| json!({"credit_id": credit, "id": person}))
            .collect()
    };
    json!({ "cast": entries(cast), "crew": entries(crew) })
}

pub fn credit_details(id: &str, kind: &str, person_id: i64) -> Value {
    let (department, job, character) = if kind == "cast" {
        ("Acting", "Actor", "Lead")
    } else {
        ("Directing", "Director", "")
    };
    json!({
        "id": id,
        "credit_type": kind,
        "department": department,
        "job": job,
        "media": {"character": character},
        "person": {"id": person_id, "name": format!("Person {person_id}")},
    })
}

pub fn person(id: i64) -> Value {
    json!({
        "id": id,
        "name": format!("Person {id}"),
        "gender": 2,
        "adult": false,
        "known_for_department": "Acting",
        "popularity": 3.1,
        "profile_path": format!("/profile-{id}.jpg"),
        "also_known_as": [],
        "biography": "",
        "birthday": "1970-01-01",
        "deathday": null,
        "homepage": null,
        "place_of_birth": "Somewhere",
    })
}

pub fn image(path: &str) -> Value {
    json!({
        "file_path": path,
        "width": 2000,
        "height": 3000,
        "aspect_ratio": 0.667,
        "iso_639_1": null,
        "vote_average": 5.3,
        "vote_count": 4,
    })
}

/// Registers a credit with its detail and person routes.
pub fn register_credit(
    transport: &FixtureTransport,
    credit_id: &str,
    kind: &str,
    person_id: i64,
) {
    transport.json(
        &format!("/credit/{credit_id}"),
        credit_details(credit_id, kind, person_id),
    );
    transport.json(&format!("/person/{person_id}"), person(person_id));
}

/// Two discovery pages, three movies, shared people and a shared poster.
///
/// - 101 "The Matrix": genres {1, 2}, crew c-101-dir (501), cast c-101-neo
///   (500) and c-101-trinity (502), images: 2 posters (one shared) and a
///   backdrop.
/// - 102 "John Wick": genres {2, 3}, cast c-102-john (500), the shared
///   poster.
/// - 103 "Speed" on page 2: genres {1}, no credits, no images.
pub fn catalog_fixture() -> Arc<FixtureTransport> {
    let transport = Arc::new(FixtureTransport::new());

    transport.json(
        "/genre/movie/list",
        json!({"genres": [
            {"id": 1, "name": "剧情"},
            {"id": 2, "name": "动作"},
            {"id": 3, "name": "惊悚"},
        ]}),
    );

    transport.page(
        "/discover/movie",
        1,
        discover_page(
            1,
            2,
            vec![
                discover_movie(101, "The Matrix", &[1, 2]),
                discover_movie(102, "John Wick", &[2, 3]),
            ],
        ),
    );
    transport.page(
        "/discover/movie",
        2,
        discover_page(2, 2, vec![discover_movie(103, "Speed", &[1])]),
    );

    for (id, runtime) in [(101, 136), (102, 101), (103, 116)] {
        transport.json(&format!("/movie/{id}"), movie_details(id, runtime));
    }

    transport.json(
        "/movie/101/credits",
        movie_credits(
            &[("c-101-neo", 500), ("c-101-trinity", 502)],
            &[("c-101-dir", 501)],
        ),
    );
    transport.json(
        "/movie/102/credits",
        movie_credits(&[("c-102-john", 500)], &[]),
    );
    transport.json("/movie/103/credits", movie_credits(&[], &[]));

    register_credit(&transport, "c-101-neo", "cast", 500);
    register_credit(&transport, "c-101-trinity", "cast", 502);
    register_credit(&transport, "c-101-dir", "crew", 501);
    register_credit(&transport, "c-102-john", "cast", 500);

    transport.json(
        "/movie/101/images",
        json!({
            "backdrops": [image("/b101.jpg")],
            "posters": [image("/p101.jpg"), image("/shared.jpg")],
            "logos": [],
        }),
    );
    transport.json(
        "/movie/102/images",
        json!({"backdrops": [], "posters": [image("/shared.jpg")], "logos": []}),
    );
    transport.json("/movie/103/images", json!({}));

    transport
}

/// In-memory asset store that tracks how many transfers overlap.
#[derive(Debug, Default)]
pub struct FixtureAssets {
    failing: HashSet<String>,
    delay: Duration,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
    opened: Mutex<Vec<String>>,
}

impl FixtureAssets {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub fn failing(mut self, path: &str) -> Self {
        self.failing.insert(path.to_string());
        self
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }
}

#[async_trait]
impl AssetSource for FixtureAssets {
    async fn open(&self, file_path: &str) -> Result<ByteStream> {
        self.opened.lock().unwrap().push(file_path.to_string());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(self.delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.contains(file_path) {
            return Err(SyncError::RemoteStatus { code: 404 });
        }

        let body = Bytes::from(format!("image bytes for {file_path}"));
        Ok(futures::stream::iter(vec![Ok(body)]).boxed())
    }
}
