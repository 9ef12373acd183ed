//! Synchronous client for the dashboard's **REST service**.
//!
//! Covers the mock analytics endpoints that feed the charts, plus health,
//! login and the posts CRUD endpoints. Chart payloads come back as tagged
//! [`RawPayload`] variants; [`Client::fetch_state`] wraps a request into the
//! `{data, is_loading, is_error}` shape the dashboard consumes.
//!
//! ### Notes
//! - GET requests retry transient failures (5xx / network errors) three times
//!   with a short backoff. Writes are sent once.
//! - A bearer token set with [`Client::with_token`] is attached to every request.
//!
//! Typical usage:
//! ```no_run
//! # use dashcharts::api::{Client, Endpoint};
//! let client = Client::default();
//! let payload = client.fetch_payload(Endpoint::WeeklyMoodTrend)?;
//! # Ok::<(), anyhow::Error>(())
//! ```
use crate::models::{
    BrandEntry, DepartmentsPayload, FetchState, RawPayload, TeamsPayload, listing_items,
};
use crate::posts::{CreatePost, Post, PostFilters, PostsPage, UpdatePost};
use anyhow::{Context, Result, anyhow};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};
use reqwest::Method;
use reqwest::blocking::{Client as HttpClient, RequestBuilder, Response};
use reqwest::redirect::Policy;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://fe-hiring-rest-api.vercel.app";

/// Delays before each GET retry, in milliseconds.
pub const RETRY_BACKOFF_MS: [u64; 3] = [100, 300, 700];

/// Analytics endpoints backing the dashboard charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    TopCoffeeBrands,
    PopularSnackBrands,
    WeeklyMoodTrend,
    WeeklyWorkoutTrend,
    CoffeeConsumption,
    SnackImpact,
}

impl Endpoint {
    pub const ALL: [Endpoint; 6] = [
        Endpoint::TopCoffeeBrands,
        Endpoint::PopularSnackBrands,
        Endpoint::WeeklyMoodTrend,
        Endpoint::WeeklyWorkoutTrend,
        Endpoint::CoffeeConsumption,
        Endpoint::SnackImpact,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::TopCoffeeBrands => "/mock/top-coffee-brands",
            Endpoint::PopularSnackBrands => "/mock/popular-snack-brands",
            Endpoint::WeeklyMoodTrend => "/mock/weekly-mood-trend",
            Endpoint::WeeklyWorkoutTrend => "/mock/weekly-workout-trend",
            Endpoint::CoffeeConsumption => "/mock/coffee-consumption",
            Endpoint::SnackImpact => "/mock/snack-impact",
        }
    }

    /// Decode a response body into the payload variant this endpoint serves.
    ///
    /// Never fails: malformed parts degrade to empty lists, missing names and
    /// zero values, so a partial payload still draws what it can.
    pub fn parse(&self, v: Value) -> RawPayload {
        match self {
            Endpoint::TopCoffeeBrands | Endpoint::PopularSnackBrands => RawPayload::Brands(
                listing_items(&v)
                    .iter()
                    .filter(|e| e.is_object())
                    .map(BrandEntry::from_value)
                    .collect(),
            ),
            Endpoint::WeeklyMoodTrend | Endpoint::WeeklyWorkoutTrend => RawPayload::Weekly(
                listing_items(&v)
                    .iter()
                    .filter_map(|r| r.as_object().cloned())
                    .collect(),
            ),
            Endpoint::CoffeeConsumption => RawPayload::Teams(TeamsPayload::from_value(&v)),
            Endpoint::SnackImpact => RawPayload::Departments(DepartmentsPayload::from_value(&v)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub uptime: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Mock posts come either bare or as `{items: [...]}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MockPosts {
    Bare(Vec<Post>),
    Wrapped {
        #[serde(default)]
        items: Vec<Post>,
    },
}

#[derive(Debug, Clone)]
pub struct Client {
    pub base_url: String,
    token: Option<String>,
    http: HttpClient,
}

impl Default for Client {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL).unwrap_or_else(|e| {
            log::warn!("falling back to a default http client: {e:#}");
            Self {
                base_url: DEFAULT_BASE_URL.into(),
                token: None,
                http: HttpClient::new(),
            }
        })
    }
}

// Allow -, _, . unescaped in path segments (ids)
const SAFE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

fn enc_segment(s: &str) -> String {
    percent_encoding::utf8_percent_encode(s.trim(), SAFE).to_string()
}

impl Client {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(10)) // total request timeout
            .connect_timeout(Duration::from_secs(5)) // connect timeout
            .redirect(Policy::limited(5)) // cap redirects
            .user_agent(concat!("dashcharts/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("build http client")?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
            http,
        })
    }

    /// Attach a bearer token to every subsequent request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into()).filter(|t: &String| !t.is_empty());
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let req = self.http.request(method, url);
        match &self.token {
            Some(t) => req.bearer_auth(t),
            None => req,
        }
    }

    /// GET with a small retry for transient failures (5xx / network errors).
    /// One initial attempt, then one retry per entry of [`RETRY_BACKOFF_MS`].
    fn get_json(&self, path: &str) -> Result<Value> {
        let url = self.url(path);
        let mut last_err = anyhow!("no attempt made");
        for attempt in 0..=RETRY_BACKOFF_MS.len() {
            if attempt > 0 {
                std::thread::sleep(Duration::from_millis(RETRY_BACKOFF_MS[attempt - 1]));
            }
            match self.request(Method::GET, &url).send() {
                Ok(r) if r.status().is_success() => {
                    return r.json().context("decode json").with_context(|| format!("GET {url}"));
                }
                Ok(r) if r.status().is_server_error() => {
                    log::warn!("GET {url}: HTTP {} (attempt {})", r.status(), attempt + 1);
                    last_err = status_error(r);
                }
                Ok(r) => return Err(status_error(r)).with_context(|| format!("GET {url}")),
                Err(e) => {
                    log::warn!("GET {url}: {e} (attempt {})", attempt + 1);
                    last_err = e.into();
                }
            }
        }
        Err(last_err.context(format!(
            "GET {url}: giving up after {} attempts",
            RETRY_BACKOFF_MS.len() + 1
        )))
    }

    fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let v = self.get_json(path)?;
        serde_json::from_value(v).with_context(|| format!("decode response of {path}"))
    }

    fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Response> {
        let url = self.url(path);
        let mut req = self.request(method.clone(), &url);
        if let Some(b) = body {
            req = req.json(b);
        }
        let r = req.send().with_context(|| format!("{method} {url}"))?;
        if !r.status().is_success() {
            return Err(status_error(r)).with_context(|| format!("{method} {url}"));
        }
        Ok(r)
    }

    /// Fetch one analytics endpoint.
    pub fn fetch_payload(&self, endpoint: Endpoint) -> Result<RawPayload> {
        let v = self.get_json(endpoint.path())?;
        Ok(endpoint.parse(v))
    }

    /// Fetch one analytics endpoint as a finished [`FetchState`]: failures set
    /// `is_error` instead of propagating.
    pub fn fetch_state(&self, endpoint: Endpoint) -> FetchState<RawPayload> {
        match self.fetch_payload(endpoint) {
            Ok(p) => FetchState::ready(p),
            Err(e) => {
                log::warn!("{}: {e:#}", endpoint.path());
                FetchState::failed()
            }
        }
    }

    pub fn health(&self) -> Result<Health> {
        self.get("/health")
    }

    /// Log in and return the session; the token is not stored.
    pub fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        let body = LoginRequest { email, password };
        let r = self.send_json(Method::POST, "/auth/login", Some(&body))?;
        r.json().context("decode login response")
    }

    /// One cursor page of posts.
    pub fn list_posts(&self, filters: &PostFilters) -> Result<PostsPage> {
        let query = filters.to_query();
        let path = if query.is_empty() {
            "/posts".to_string()
        } else {
            format!("/posts?{query}")
        };
        self.get(&path)
    }

    /// Follow `nextCursor` until exhausted or `max_pages` pages were read.
    pub fn fetch_all_posts(&self, filters: &PostFilters, max_pages: u32) -> Result<Vec<Post>> {
        let mut filters = filters.clone();
        let mut out = Vec::new();
        for _ in 0..max_pages.max(1) {
            let page = self.list_posts(&filters)?;
            out.extend(page.items);
            match page.next_cursor.filter(|c| !c.is_empty()) {
                Some(next) if filters.cursor.as_deref() != Some(next.as_str()) => {
                    filters.cursor = Some(next);
                }
                _ => return Ok(out),
            }
        }
        log::debug!("stopped after {max_pages} page(s) of posts");
        Ok(out)
    }

    pub fn get_post(&self, id: &str) -> Result<Post> {
        self.get(&format!("/posts/{}", enc_segment(id)))
    }

    pub fn create_post(&self, post: &CreatePost) -> Result<Post> {
        crate::posts::validate_create(post)?;
        let r = self.send_json(Method::POST, "/posts", Some(post))?;
        r.json().context("decode created post")
    }

    pub fn update_post(&self, id: &str, patch: &UpdatePost) -> Result<Post> {
        crate::posts::validate_update(patch)?;
        let path = format!("/posts/{}", enc_segment(id));
        let r = self.send_json(Method::PATCH, &path, Some(patch))?;
        r.json().context("decode updated post")
    }

    pub fn delete_post(&self, id: &str) -> Result<()> {
        let path = format!("/posts/{}", enc_segment(id));
        self.send_json::<()>(Method::DELETE, &path, None)?;
        Ok(())
    }

    pub fn mock_posts(&self) -> Result<Vec<Post>> {
        let posts: MockPosts = self.get("/mock/posts")?;
        Ok(match posts {
            MockPosts::Bare(v) => v,
            MockPosts::Wrapped { items } => items,
        })
    }
}

fn status_error(r: Response) -> anyhow::Error {
    let status = r.status();
    match status.as_u16() {
        401 => anyhow::anyhow!("unauthorized (HTTP 401): log in again"),
        403 => anyhow::anyhow!("forbidden (HTTP 403)"),
        404 => anyhow::anyhow!("not found (HTTP 404)"),
        _ => anyhow::anyhow!("request failed with HTTP {status}"),
    }
}
