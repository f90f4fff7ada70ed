use std::path::PathBuf;

use log::debug;
use reqwest::Url;
use serde_json::Value;

use crate::{CatalogError, CatalogResult, Preferences};

/// Catalog service used unless another base URL is given.
pub const DEFAULT_BASE_URL: &str = "https://thingengine.stanford.edu/thingpedia";

/// Fetches device factories and command examples from the catalog.
///
/// The developer key is read from the preferences file on every request,
/// so changes made elsewhere take effect without rebuilding the client.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    base_url: String,
    preferences: Option<PathBuf>,
}

impl CatalogClient {
    /// A client for [`DEFAULT_BASE_URL`] using the default preferences file.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Http`] if the HTTP client cannot be set up.
    pub fn new() -> CatalogResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("thingkit/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: DEFAULT_BASE_URL.to_owned(),
            preferences: Preferences::default_path(),
        })
    }

    /// Talk to `base_url` instead.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    /// Read the developer key from the preferences file at `path`.
    #[must_use]
    pub fn with_preferences(mut self, path: impl Into<PathBuf>) -> Self {
        self.preferences = Some(path.into());
        self
    }

    /// Base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Device factories of the given device class.
    ///
    /// # Errors
    ///
    /// See [`CatalogError`].
    pub async fn device_factories(&self, class: &str) -> CatalogResult<Vec<Value>> {
        self.get_array(&["api", "devices"], &[("class", class)]).await
    }

    /// Base command examples, in English, for the given kinds.
    ///
    /// `kinds` is a single path segment, typically a comma-separated list.
    ///
    /// # Errors
    ///
    /// See [`CatalogError`].
    pub async fn examples_by_kinds(&self, kinds: &str) -> CatalogResult<Vec<Value>> {
        self.get_array(
            &["api", "examples", "by-kinds", kinds],
            &[("locale", "en_US"), ("base", "1")],
        )
        .await
    }

    fn developer_key(&self) -> CatalogResult<Option<String>> {
        match &self.preferences {
            Some(path) => Preferences::load(path.clone())?.developer_key(),
            None => Ok(None),
        }
    }

    fn url(&self, segments: &[&str], query: &[(&str, &str)]) -> CatalogResult<Url> {
        let invalid = || CatalogError::InvalidUrl(self.base_url.clone());
        let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|()| invalid())?
            .pop_if_empty()
            .extend(segments);

        let key = self.developer_key()?;
        if !query.is_empty() || key.is_some() {
            let mut pairs = url.query_pairs_mut();
            pairs.extend_pairs(query);
            if let Some(key) = &key {
                pairs.append_pair("developerKey", key);
            }
        }
        Ok(url)
    }

    async fn get_array(
        &self,
        segments: &[&str],
        query: &[(&str, &str)],
    ) -> CatalogResult<Vec<Value>> {
        let url = self.url(segments, query)?;
        debug!("catalog GET {}", url.path());
        let body = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        match serde_json::from_str::<Value>(&body)? {
            Value::Array(items) => Ok(items),
            other => Err(CatalogError::UnexpectedShape(kind(&other))),
        }
    }
}

const fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
