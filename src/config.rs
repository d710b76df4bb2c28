use std::env;

use anyhow::{Context, Result, bail};
use reqwest::Url;

pub const BASE_URL_ENV: &str = "NBA_API_BASE_URL";
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: Url,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self> {
        let raw = env::var(BASE_URL_ENV)
            .ok()
            .filter(|val| !val.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self::from_base_url(&raw)
    }

    pub fn from_base_url(raw: &str) -> Result<Self> {
        let cleaned = raw.trim().trim_end_matches('/');
        let base_url =
            Url::parse(cleaned).with_context(|| format!("invalid {BASE_URL_ENV}: {cleaned}"))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            bail!("{BASE_URL_ENV} must be http or https, got {}", base_url.scheme());
        }
        if base_url.cannot_be_a_base() {
            bail!("{BASE_URL_ENV} cannot be used as a base url: {cleaned}");
        }
        Ok(Self { base_url })
    }

    /// Appends path segments, percent-encoding each one.
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}
