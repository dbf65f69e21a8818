//! Playlist client.
//!
//! Obtains a client-credentials access token (cached), then looks up the
//! configured playlist with it.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::cache::CacheAside;
use crate::config::PlaylistConfig;
use crate::outcome::{Error, ErrorCatalog, ErrorKind, Outcome};
use crate::sources::{decode_response, endpoint, fail, invalid_endpoint, SourceClient};
use crate::transport::{Transport, UpstreamRequest};

pub const SOURCE: &str = "playlist";
pub const TOKEN_CACHE_KEY: &str = "playlist.access_token";

pub const ERRORS: ErrorCatalog = ErrorCatalog {
    failed_response: Error::new(
        "playlist.failed_response",
        ErrorKind::UpstreamUnavailable,
        "Playlist service request failed",
    ),
    empty_response: Error::new(
        "playlist.empty_response",
        ErrorKind::EmptyUpstreamResponse,
        "Playlist service returned an empty response",
    ),
    malformed_response: Error::new(
        "playlist.malformed_response",
        ErrorKind::MalformedUpstreamResponse,
        "Playlist service response could not be parsed",
    ),
};

pub const TOKEN_ERRORS: ErrorCatalog = ErrorCatalog {
    failed_response: Error::new(
        "playlist.token.failed_response",
        ErrorKind::UpstreamUnavailable,
        "Access token request failed",
    ),
    empty_response: Error::new(
        "playlist.token.empty_response",
        ErrorKind::EmptyUpstreamResponse,
        "Access token response was empty",
    ),
    malformed_response: Error::new(
        "playlist.token.malformed_response",
        ErrorKind::MalformedUpstreamResponse,
        "Access token response could not be parsed",
    ),
};

/// Client-credentials grant result.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub owner: Owner,
    pub followers: Followers,
    pub tracks: Tracks,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Owner {
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Followers {
    pub total: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tracks {
    pub total: u64,
    pub items: Vec<PlaylistItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaylistItem {
    pub added_at: Option<String>,
    /// Null for tracks removed from the catalog.
    pub track: Option<Track>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Track {
    pub name: String,
    pub artists: Vec<Artist>,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Artist {
    pub name: String,
}

pub struct PlaylistClient {
    transport: Arc<dyn Transport>,
    cache: Arc<CacheAside>,
    config: PlaylistConfig,
    token_ttl: Duration,
}

impl PlaylistClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        cache: Arc<CacheAside>,
        config: PlaylistConfig,
        token_ttl: Duration,
    ) -> Self {
        Self {
            transport,
            cache,
            config,
            token_ttl,
        }
    }

    /// Cached access token, requesting a new one when missing or expired.
    pub async fn access_token(&self) -> Outcome<String> {
        self.cache
            .get_or_fetch(TOKEN_CACHE_KEY, self.token_ttl, || self.request_token())
            .await
    }

    async fn request_token(&self) -> Outcome<String> {
        let url = match Url::parse(&self.config.token_url) {
            Ok(url) => url,
            Err(e) => return invalid_endpoint(SOURCE, &TOKEN_ERRORS, e),
        };
        let form = vec![
            ("grant_type".to_string(), "client_credentials".to_string()),
            ("client_id".to_string(), self.config.client_id.clone()),
            ("client_secret".to_string(), self.config.client_secret.clone()),
        ];

        let result = self
            .transport
            .send(UpstreamRequest::post_form(SOURCE, url, form))
            .await;

        match decode_response::<AccessToken>(SOURCE, &TOKEN_ERRORS, result) {
            Outcome::Success(token) if token.access_token.trim().is_empty() => {
                fail(SOURCE, TOKEN_ERRORS.malformed_response)
            }
            Outcome::Success(token) => {
                tracing::debug!(expires_in = token.expires_in, "Obtained playlist access token");
                Outcome::success(token.access_token)
            }
            Outcome::Failure(error) => Outcome::failure(error),
        }
    }
}

#[async_trait]
impl SourceClient for PlaylistClient {
    type Params = ();
    type Payload = Playlist;

    fn source(&self) -> &'static str {
        SOURCE
    }

    async fn fetch(&self, _params: ()) -> Outcome<Playlist> {
        let token = match self.access_token().await {
            Outcome::Success(token) => token,
            Outcome::Failure(error) => return Outcome::failure(error),
        };

        let path = format!("playlists/{}", self.config.playlist_id);
        let url = match endpoint(&self.config.api_url, &path) {
            Ok(url) => url,
            Err(e) => return invalid_endpoint(SOURCE, &ERRORS, e),
        };

        let request = UpstreamRequest::get(SOURCE, url).bearer(token);
        let result = self.transport.send(request).await;
        decode_response(SOURCE, &ERRORS, result)
    }
}
