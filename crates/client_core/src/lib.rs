//! Client side of the postbox demo: an HTTP client for the record endpoint
//! and a page controller that binds site configuration, form submission and
//! record display into a [`Page`].

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use shared::{
    domain::Record,
    protocol::{MessageResponse, SiteConfig},
};
use tracing::debug;
use url::Url;

pub mod controller;
pub mod error;
mod html;
pub mod page;

pub use controller::PageController;
pub use error::ClientError;
pub use page::{Dialogs, Page, PageDocument};

const CONFIG_FILE: &str = "config.json";

/// Talks to the static site (for `config.json`) and to the record endpoint.
#[derive(Clone)]
pub struct PostsClient {
    http: Client,
    site_url: Url,
}

impl PostsClient {
    pub fn new(site_url: &str) -> Result<Self, ClientError> {
        let mut site_url = parse_url(site_url)?;
        // Relative joins drop the last path segment unless it ends in '/'.
        if !site_url.path().ends_with('/') {
            let path = format!("{}/", site_url.path());
            site_url.set_path(&path);
        }
        Ok(Self {
            http: Client::new(),
            site_url,
        })
    }

    pub fn site_url(&self) -> &Url {
        &self.site_url
    }

    /// Resolves the configured backend URL, which may be relative to the site.
    pub fn endpoint(&self, config: &SiteConfig) -> Result<Url, ClientError> {
        self.site_url
            .join(&config.backend_api_url)
            .map_err(|source| ClientError::InvalidUrl {
                url: config.backend_api_url.clone(),
                source,
            })
    }

    pub async fn fetch_config(&self) -> Result<SiteConfig, ClientError> {
        let url = self
            .site_url
            .join(CONFIG_FILE)
            .map_err(|source| ClientError::InvalidUrl {
                url: CONFIG_FILE.to_string(),
                source,
            })?;
        let res = self.http.get(url).send().await?;
        let config: SiteConfig = read_ok(res).await?;
        debug!(fields = config.form_fields.len(), "site configuration loaded");
        Ok(config)
    }

    pub async fn create(
        &self,
        endpoint: &Url,
        fields: &Map<String, Value>,
    ) -> Result<Record, ClientError> {
        let res = self.http.post(endpoint.clone()).json(fields).send().await?;
        read_backend(res).await
    }

    pub async fn list(&self, endpoint: &Url) -> Result<Vec<Record>, ClientError> {
        let res = self.http.get(endpoint.clone()).send().await?;
        read_ok(res).await
    }

    pub async fn clear(&self, endpoint: &Url) -> Result<MessageResponse, ClientError> {
        let res = self.http.delete(endpoint.clone()).send().await?;
        read_backend(res).await
    }
}

fn parse_url(raw: &str) -> Result<Url, ClientError> {
    Url::parse(raw).map_err(|source| ClientError::InvalidUrl {
        url: raw.to_string(),
        source,
    })
}

/// Reads a JSON body, reporting only the status on failure.
async fn read_ok<T: DeserializeOwned>(res: Response) -> Result<T, ClientError> {
    let status = res.status();
    if !status.is_success() {
        return Err(ClientError::Status { status });
    }
    Ok(res.json().await?)
}

/// Like [`read_ok`], but keeps the error body the backend sent.
async fn read_backend<T: DeserializeOwned>(res: Response) -> Result<T, ClientError> {
    let status = res.status();
    if !status.is_success() {
        let body = res.text().await.unwrap_or_default();
        return Err(ClientError::Backend { status, body });
    }
    Ok(res.json().await?)
}

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
