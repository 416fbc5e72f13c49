//! Release discovery.
//!
//! [`ReleaseSource`] is the seam the update scheduler and the `update`
//! command talk to; [`GithubReleases`] is the production implementation
//! backed by the GitHub "latest release" endpoint.

mod github;

use chrono::{DateTime, Utc};

use crate::error::Result;

pub use github::{GithubReleases, LATEST_RELEASE_URL, gh_client};

/// The newest published release for this platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseInfo {
    /// Semantic version without the leading `v`.
    pub version: String,
    pub download_url: String,
    pub published_at: Option<DateTime<Utc>>,
}

pub trait ReleaseSource: Send + Sync {
    fn latest_release(&self) -> Result<ReleaseInfo>;
}
