//! Driver registry
//!
//! Maps a series URL to the driver serving its site. Matching is done on the
//! URL's network authority (`host` or `host:port`) against each driver's
//! domain list; the first driver that claims the authority wins.

use std::sync::Arc;
use tracing::debug;

use crate::downloader::core::{DownloadError, Result};
use crate::downloader::drivers::{Asurascans, Mangadoom, Manganato, Mangatown, SiteDriver};

/// Registry for managing the available site drivers
#[derive(Clone)]
pub struct DriverRegistry {
    drivers: Vec<Arc<dyn SiteDriver>>,
}

impl std::fmt::Debug for DriverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriverRegistry")
            .field("drivers", &self.drivers.iter().map(|d| d.name()).collect::<Vec<_>>())
            .finish()
    }
}

impl DriverRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            drivers: Vec::new(),
        }
    }

    /// Registry with every built-in driver
    pub fn with_default_drivers() -> Self {
        Self::new()
            .register(Manganato)
            .register(Mangatown)
            .register(Mangadoom)
            .register(Asurascans)
    }

    /// Register a new driver implementation
    ///
    /// Builder style, so registrations can be chained.
    pub fn register<D: SiteDriver + 'static>(mut self, driver: D) -> Self {
        self.drivers.push(Arc::new(driver));
        self
    }

    /// Every domain some driver serves, sorted
    pub fn supported_domains(&self) -> Vec<String> {
        let mut domains: Vec<String> = self
            .drivers
            .iter()
            .flat_map(|driver| driver.domains().into_iter().map(str::to_string).collect::<Vec<_>>())
            .collect();
        domains.sort();
        domains.dedup();
        domains
    }

    /// Find the driver for `url`
    pub fn resolve(&self, url: &str) -> Result<Arc<dyn SiteDriver>> {
        let parsed = url::Url::parse(url).map_err(|e| DownloadError::invalid_url(url, e))?;
        let authority = authority_of(&parsed);

        let driver = self
            .drivers
            .iter()
            .find(|driver| driver.supports_authority(&authority))
            .cloned()
            .ok_or_else(|| DownloadError::UrlWithoutCoverage {
                url: url.to_string(),
                supported_domains: self.supported_domains(),
            })?;

        debug!("Using driver '{}' for {}", driver.name(), authority);
        Ok(driver)
    }
}

impl Default for DriverRegistry {
    fn default() -> Self {
        Self::with_default_drivers()
    }
}

/// `host` or `host:port` when the URL carries an explicit non-default port
fn authority_of(url: &url::Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}
