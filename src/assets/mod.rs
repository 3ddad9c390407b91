//! Static game asset metadata.
//!
//! The asset ("Data Dragon") version used in image URLs is process-wide state:
//! the first access starts a single background fetch, readers get the default
//! until it lands, and a failed fetch settles on the default for the life of
//! the process.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tokio::sync::OnceCell;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Version used until the latest one is known, and if fetching it fails.
pub const DEFAULT_VERSION: &str = "16.1.1";

pub const VERSIONS_URL: &str = "https://ddragon.leagueoflegends.com/api/versions.json";

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {0} fetching versions")]
    HttpStatus(u16),

    #[error("Version list is empty")]
    EmptyVersionList,
}

/// Where the latest asset version comes from.
#[async_trait]
pub trait VersionSource: Send + Sync {
    async fn latest_version(&self) -> Result<String, AssetError>;
}

/// Reads the version list published alongside the static assets.
pub struct DataDragonSource {
    client: Client,
    url: String,
}

impl DataDragonSource {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            url: VERSIONS_URL.to_string(),
        }
    }
}

#[async_trait]
impl VersionSource for DataDragonSource {
    async fn latest_version(&self) -> Result<String, AssetError> {
        let response = self.client.get(&self.url).send().await?;
        if !response.status().is_success() {
            return Err(AssetError::HttpStatus(response.status().as_u16()));
        }

        // Newest first
        let versions: Vec<String> = response.json().await?;
        versions
            .into_iter()
            .next()
            .ok_or(AssetError::EmptyVersionList)
    }
}

pub struct AssetVersion {
    source: Arc<dyn VersionSource>,
    version: OnceCell<String>,
}

impl AssetVersion {
    pub fn new(source: Arc<dyn VersionSource>) -> Self {
        Self {
            source,
            version: OnceCell::new(),
        }
    }

    /// The loaded version, or [`DEFAULT_VERSION`] while it is unknown.
    pub fn current(&self) -> String {
        self.version
            .get()
            .cloned()
            .unwrap_or_else(|| DEFAULT_VERSION.to_string())
    }

    pub fn is_loaded(&self) -> bool {
        self.version.initialized()
    }

    /// Fetch the version if no fetch has completed yet. Concurrent callers share one fetch.
    pub async fn ensure_loaded(&self) -> String {
        self.version
            .get_or_init(|| async {
                match self.source.latest_version().await {
                    Ok(version) => {
                        info!("Asset version {}", version);
                        version
                    }
                    Err(e) => {
                        warn!("Failed to fetch asset version, using {}: {}", DEFAULT_VERSION, e);
                        DEFAULT_VERSION.to_string()
                    }
                }
            })
            .await
            .clone()
    }

    /// Start the fetch without waiting for it.
    pub fn init_in_background(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        if self.is_loaded() {
            return None;
        }
        let this = Arc::clone(self);
        Some(tokio::spawn(async move {
            this.ensure_loaded().await;
        }))
    }
}

static GLOBAL: OnceLock<Arc<AssetVersion>> = OnceLock::new();

/// Process-wide asset version. The first call inside a runtime starts the fetch.
pub fn global() -> Arc<AssetVersion> {
    let mut created = false;
    let assets = GLOBAL.get_or_init(|| {
        created = true;
        Arc::new(AssetVersion::new(Arc::new(DataDragonSource::new(
            Client::new(),
        ))))
    });
    if created && tokio::runtime::Handle::try_current().is_ok() {
        let _ = assets.init_in_background();
    }
    Arc::clone(assets)
}

/// Normalize a champion name into its asset key.
pub fn normalize_champion_name(name: &str) -> String {
    let name = match name {
        "MonkeyKing" => "Wukong",
        "FiddleSticks" => "Fiddlesticks",
        other => other,
    };
    name.chars()
        .filter(|c| !c.is_whitespace() && *c != '\'' && *c != '.')
        .collect()
}
