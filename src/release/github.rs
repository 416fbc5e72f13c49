use chrono::{DateTime, Utc};
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use std::env;

use super::{ReleaseInfo, ReleaseSource};
use crate::error::{Error, Result};
use crate::platform::PlatformTag;

pub const LATEST_RELEASE_URL: &str =
    "https://api.github.com/repos/kacperkwapisz/sortpath/releases/latest";

#[derive(Debug, Deserialize)]
struct Release {
    tag_name: String,
    #[serde(default)]
    published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    assets: Vec<Asset>,
}

#[derive(Debug, Deserialize)]
struct Asset {
    name: String,
    browser_download_url: String,
}

/// HTTP client with the GitHub API headers; `GITHUB_TOKEN` is sent as a
/// bearer token when set.
pub fn gh_client() -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/vnd.github+json"),
    );
    headers.insert(USER_AGENT, HeaderValue::from_static("sortpath-updater"));
    if let Ok(tok) = env::var("GITHUB_TOKEN")
        && let Ok(v) = HeaderValue::from_str(&format!("Bearer {}", tok))
    {
        headers.insert(AUTHORIZATION, v);
    }
    Client::builder()
        .default_headers(headers)
        .build()
        .map_err(|source| Error::Network {
            url: LATEST_RELEASE_URL.to_string(),
            source,
        })
}

/// Latest-release lookup against the GitHub releases API.
pub struct GithubReleases {
    client: Client,
    endpoint: String,
    platform: Option<PlatformTag>,
}

impl GithubReleases {
    /// Resolver for the real endpoint and the compiled-for platform.
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: gh_client()?,
            endpoint: LATEST_RELEASE_URL.to_string(),
            platform: PlatformTag::current().ok(),
        })
    }

    pub fn with_endpoint(endpoint: impl Into<String>, platform: PlatformTag) -> Result<Self> {
        Ok(Self {
            client: gh_client()?,
            endpoint: endpoint.into(),
            platform: Some(platform),
        })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

impl ReleaseSource for GithubReleases {
    fn latest_release(&self) -> Result<ReleaseInfo> {
        log::debug!("fetching {}", self.endpoint);
        let resp = self
            .client
            .get(&self.endpoint)
            .send()
            .map_err(|source| Error::Network {
                url: self.endpoint.clone(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Remote {
                status: status.as_u16(),
            });
        }

        let body = resp.text().map_err(|source| Error::Network {
            url: self.endpoint.clone(),
            source,
        })?;
        let rel: Release = serde_json::from_str(&body).map_err(|e| Error::Decode(e.to_string()))?;

        let pattern = match self.platform {
            Some(p) => p.asset_pattern(),
            None => {
                return Err(Error::NoAsset {
                    pattern: format!("{}-{}", env::consts::OS, env::consts::ARCH),
                });
            }
        };
        let asset = rel
            .assets
            .iter()
            .find(|a| a.name.contains(&pattern))
            .ok_or_else(|| Error::NoAsset {
                pattern: pattern.clone(),
            })?;

        let version = rel.tag_name.trim_start_matches('v').to_string();
        log::debug!("latest release {} -> {}", version, asset.name);
        Ok(ReleaseInfo {
            version,
            download_url: asset.browser_download_url.clone(),
            published_at: rel.published_at,
        })
    }
}
