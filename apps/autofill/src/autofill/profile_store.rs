//! Candidate profile stores.
//!
//! The engine only ever sees `Arc<dyn ProfileStore>`, so the backend is chosen once
//! at startup from `Config` and can be swapped without touching the engine or the
//! route handlers.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use crate::autofill::profile::{ApplicantProfile, CandidateProfile};
use crate::config::Config;

#[derive(Debug, Error)]
pub enum ProfileStoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Profile store returned status {status}")]
    Status { status: u16 },

    #[error("Invalid profile store URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Loads the stored profile for `user_id`. A user with nothing stored yields
    /// an empty profile, not an error.
    async fn load(&self, user_id: &str) -> Result<CandidateProfile, ProfileStoreError>;

    /// Short backend name for logs.
    fn backend(&self) -> &'static str;
}

// ────────────────────────────────────────────────────────────────────────────
// HTTP
// ────────────────────────────────────────────────────────────────────────────

/// Fetches `GET {base_url}/profiles/{user_id}`.
pub struct HttpProfileStore {
    client: Client,
    base_url: Url,
}

impl HttpProfileStore {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ProfileStoreError> {
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url,
        })
    }

    fn profile_url(&self, user_id: &str) -> Result<Url, ProfileStoreError> {
        let mut url = self.base_url.join("profiles/")?;
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .push(user_id);
        Ok(url)
    }
}

#[async_trait]
impl ProfileStore for HttpProfileStore {
    async fn load(&self, user_id: &str) -> Result<CandidateProfile, ProfileStoreError> {
        let url = self.profile_url(user_id)?;
        debug!(%url, "Fetching candidate profile");

        let response = self.client.get(url).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(CandidateProfile::default()),
            status if status.is_success() => Ok(response.json::<CandidateProfile>().await?),
            status => Err(ProfileStoreError::Status {
                status: status.as_u16(),
            }),
        }
    }

    fn backend(&self) -> &'static str {
        "http"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// File
// ────────────────────────────────────────────────────────────────────────────

/// A single JSON profile on disk, shared by every user id.
pub struct FileProfileStore {
    path: PathBuf,
}

impl FileProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ProfileStore for FileProfileStore {
    async fn load(&self, _user_id: &str) -> Result<CandidateProfile, ProfileStoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(CandidateProfile::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn backend(&self) -> &'static str {
        "file"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Static
// ────────────────────────────────────────────────────────────────────────────

/// In-memory profile. Used when no store is configured.
#[derive(Default)]
pub struct StaticProfileStore {
    profile: CandidateProfile,
}

impl StaticProfileStore {
    pub fn new(profile: CandidateProfile) -> Self {
        Self { profile }
    }
}

#[async_trait]
impl ProfileStore for StaticProfileStore {
    async fn load(&self, _user_id: &str) -> Result<CandidateProfile, ProfileStoreError> {
        Ok(self.profile.clone())
    }

    fn backend(&self) -> &'static str {
        "static"
    }
}

/// Loads and merges the profile. Never fails: any store error falls back to the
/// safe defaults in full.
pub async fn load_profile(store: &dyn ProfileStore, user_id: &str) -> ApplicantProfile {
    match store.load(user_id).await {
        Ok(profile) => ApplicantProfile::from(profile),
        Err(e) => {
            warn!(backend = store.backend(), user_id, "Profile load failed, using safe defaults: {e}");
            ApplicantProfile::default()
        }
    }
}

/// Picks the backend from config: URL first, then file, else an empty static profile.
pub fn store_from_config(config: &Config) -> Result<Arc<dyn ProfileStore>, ProfileStoreError> {
    let store: Arc<dyn ProfileStore> = match (&config.profile_store_url, &config.profile_path) {
        (Some(url), _) => Arc::new(HttpProfileStore::new(
            url,
            Duration::from_secs(config.profile_store_timeout_secs),
        )?),
        (None, Some(path)) => Arc::new(FileProfileStore::new(path)),
        (None, None) => Arc::new(StaticProfileStore::default()),
    };
    info!(backend = store.backend(), "Profile store initialized");
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_http_store_fetches_profile() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/profiles/user-42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "firstName": "Grace",
                "email": "grace@example.org"
            })))
            .mount(&server)
            .await;

        let store =
            HttpProfileStore::new(&format!("{}/api", server.uri()), Duration::from_secs(5)).unwrap();
        let profile = store.load("user-42").await.unwrap();
        assert_eq!(profile.first_name.as_deref(), Some("Grace"));
        assert_eq!(profile.email.as_deref(), Some("grace@example.org"));
        assert_eq!(profile.phone, None);
    }

    #[tokio::test]
    async fn test_http_store_not_found_is_empty_profile() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let store = HttpProfileStore::new(&server.uri(), Duration::from_secs(5)).unwrap();
        assert_eq!(store.load("nobody").await.unwrap(), CandidateProfile::default());
    }

    #[tokio::test]
    async fn test_http_store_error_falls_back_to_defaults() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let store = HttpProfileStore::new(&server.uri(), Duration::from_secs(5)).unwrap();
        assert!(matches!(
            store.load("u").await,
            Err(ProfileStoreError::Status { status: 503 })
        ));
        assert_eq!(load_profile(&store, "u").await, ApplicantProfile::default());
    }

    #[tokio::test]
    async fn test_file_store_reads_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"first_name": "Linus", "github": "https://github.com/l"}}"#).unwrap();

        let store = FileProfileStore::new(file.path());
        let merged = load_profile(&store, "anyone").await;
        assert_eq!(merged.first_name, "Linus");
        assert_eq!(merged.last_name, "Candidate");
        assert_eq!(merged.github, "https://github.com/l");
    }

    #[tokio::test]
    async fn test_file_store_missing_file_is_empty_profile() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileProfileStore::new(dir.path().join("missing.json"));
        assert_eq!(store.load("u").await.unwrap(), CandidateProfile::default());
    }

    #[tokio::test]
    async fn test_file_store_malformed_json_falls_back() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let store = FileProfileStore::new(file.path());
        assert!(matches!(store.load("u").await, Err(ProfileStoreError::Parse(_))));
        assert_eq!(load_profile(&store, "u").await, ApplicantProfile::default());
    }

    #[test]
    fn test_store_from_config_precedence() {
        let mut config = Config {
            port: 8080,
            rust_log: "info".to_string(),
            profile_store_url: None,
            profile_path: None,
            profile_store_timeout_secs: 10,
        };
        assert_eq!(store_from_config(&config).unwrap().backend(), "static");

        config.profile_path = Some("/tmp/profile.json".into());
        assert_eq!(store_from_config(&config).unwrap().backend(), "file");

        config.profile_store_url = Some("http://localhost:9000".to_string());
        assert_eq!(store_from_config(&config).unwrap().backend(), "http");
    }
}
