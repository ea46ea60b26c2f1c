use std::time::Duration;

use reqwest::Url;

use crate::controller::ControllerSettings;
use crate::prelude::*;

/// Book service used when `BOOKHUB_API_URL` is not set
pub const DEFAULT_API_URL: &str = "https://book-hub-5-vjef.onrender.com/api";

/// Resolved client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base, always ending in `/` so endpoint paths join below it
    pub api_base: Url,
    /// Scheme, host and port of the service, used to resolve cover images
    pub media_origin: String,
    pub timeout: Duration,
    pub page_size: usize,
    pub debounce: Duration,
}

impl ClientConfig {
    /// Build the configuration from the global command line flags
    pub fn from_global(global: &crate::Global) -> Result<Self> {
        if global.page_size == 0 {
            return Err(Error::Config("page size must be at least 1".to_string()).into());
        }

        let mut config = Self::new(&global.api_url)?;
        config.timeout = Duration::from_secs(global.timeout_secs);
        config.page_size = global.page_size;
        config.debounce = Duration::from_millis(global.debounce_ms);
        Ok(config)
    }

    /// Configuration for `api_url` with default timing and paging
    pub fn new(api_url: &str) -> Result<Self> {
        let mut api_base = Url::parse(api_url.trim())
            .map_err(|e| Error::Config(f!("invalid API URL {api_url:?}: {e}")))?;

        if !matches!(api_base.scheme(), "http" | "https") {
            return Err(Error::Config(f!("API URL must use http or https: {api_url}")).into());
        }

        if !api_base.path().ends_with('/') {
            let path = f!("{}/", api_base.path());
            api_base.set_path(&path);
        }
        api_base.set_query(None);
        api_base.set_fragment(None);

        let media_origin = api_base.origin().ascii_serialization();
        let defaults = ControllerSettings::default();

        Ok(Self {
            api_base,
            media_origin,
            timeout: Duration::from_secs(30),
            page_size: defaults.page_size,
            debounce: defaults.debounce,
        })
    }

    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            page_size: self.page_size,
            debounce: self.debounce,
        }
    }
}
