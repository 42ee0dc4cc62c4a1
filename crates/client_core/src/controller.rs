use chrono::{Datelike, Local};
use serde_json::{Map, Value};
use shared::{domain::Record, protocol::SiteConfig};
use tracing::{error, info, warn};
use url::Url;

use crate::{
    error::ClientError,
    html,
    page::{
        Dialogs, Page, CLEAR_ALL_DATA, CURRENT_YEAR, DISPLAY_CONTENT_CONTAINER, NAV_RECEIVE_TAB,
        PAGE_TITLE, POST_FORM, POST_SECTION_TITLE, RECEIVED_DATA_DISPLAY, RECEIVE_SECTION_TITLE,
        RESPONSE_CONTAINER, RESPONSE_DATA, SITE_HEADER,
    },
    PostsClient,
};

const CLEAR_PROMPT: &str =
    "Are you sure you want to clear all stored data? This action cannot be undone.";
const CLEARED_NOTICE: &str = "All stored data has been cleared!";

/// Drives one page: configuration binding, submission and record display.
pub struct PageController {
    client: PostsClient,
    config: SiteConfig,
    endpoint: Url,
}

impl PageController {
    /// Fetches the site configuration and binds it into `page`. A failure
    /// here is fatal: the body is replaced with an error banner.
    pub async fn load(client: PostsClient, page: &mut impl Page) -> Result<Self, ClientError> {
        let loaded = match client.fetch_config().await {
            Ok(config) => client.endpoint(&config).map(|endpoint| (config, endpoint)),
            Err(err) => Err(err),
        };
        let (config, endpoint) = match loaded {
            Ok(loaded) => loaded,
            Err(err) => {
                error!(%err, site = %client.site_url(), "failed to load site configuration");
                page.replace_body(html::CONFIG_ERROR_BANNER.to_string());
                return Err(err);
            }
        };

        let controller = Self {
            client,
            config,
            endpoint,
        };
        controller.bind_text(page);
        Ok(controller)
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn bind_text(&self, page: &mut impl Page) {
        let bindings = [
            (PAGE_TITLE, &self.config.page_title),
            (SITE_HEADER, &self.config.site_header),
            (POST_SECTION_TITLE, &self.config.post_section_title),
            (RECEIVE_SECTION_TITLE, &self.config.receive_page_title),
        ];
        for (id, text) in bindings {
            page.set_text(id, text);
        }
        page.set_text(CURRENT_YEAR, &Local::now().year().to_string());

        if self.config.receive_tab_hidden() {
            page.hide(NAV_RECEIVE_TAB);
        }
    }

    /// Collects the configured fields that are present in the form.
    pub fn collect_fields(&self, page: &impl Page) -> Map<String, Value> {
        self.config
            .field_names()
            .filter_map(|name| {
                page.form_value(POST_FORM, name)
                    .map(|value| (name.to_string(), Value::String(value)))
            })
            .collect()
    }

    /// Submits the form. Returns `Ok(None)` when the page has no form; on
    /// failure the error is also rendered into the response area.
    pub async fn submit(&self, page: &mut impl Page) -> Result<Option<Record>, ClientError> {
        if !page.has_element(POST_FORM) {
            return Ok(None);
        }

        let fields = self.collect_fields(page);
        let result = self.client.create(&self.endpoint, &fields).await;
        page.reveal(RESPONSE_CONTAINER);
        match result {
            Ok(record) => {
                info!(id = %record.id, "post stored");
                page.set_html(RESPONSE_DATA, html::sent_block(&record));
                page.reset_form(POST_FORM);
                Ok(Some(record))
            }
            Err(err) => {
                error!(%err, "error sending POST request");
                page.set_html(
                    RESPONSE_DATA,
                    html::failure_block("Error", &err.to_string(), self.endpoint.as_str()),
                );
                Err(err)
            }
        }
    }

    /// Renders every stored record, newest first. Returns `Ok(None)` when
    /// the page has no display area, otherwise the number of records shown.
    pub async fn render_received(&self, page: &mut impl Page) -> Result<Option<usize>, ClientError> {
        if !page.has_element(RECEIVED_DATA_DISPLAY) {
            return Ok(None);
        }

        page.set_html(DISPLAY_CONTENT_CONTAINER, String::new());
        let mut records = match self.client.list(&self.endpoint).await {
            Ok(records) => records,
            Err(err) => {
                error!(%err, "error fetching received data");
                page.set_html(
                    DISPLAY_CONTENT_CONTAINER,
                    html::failure_block(
                        "Error loading data",
                        &err.to_string(),
                        self.endpoint.as_str(),
                    ),
                );
                return Err(err);
            }
        };

        if records.is_empty() {
            page.set_html(DISPLAY_CONTENT_CONTAINER, html::empty_block());
            return Ok(Some(0));
        }

        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        for record in &records {
            page.append_html(DISPLAY_CONTENT_CONTAINER, html::record_block(record));
        }
        Ok(Some(records.len()))
    }

    /// Clears the store after the user confirms, then re-renders. Returns
    /// whether a clear request was sent and succeeded.
    pub async fn clear_all(
        &self,
        page: &mut impl Page,
        dialogs: &mut impl Dialogs,
    ) -> Result<bool, ClientError> {
        if !page.has_element(RECEIVED_DATA_DISPLAY) || !page.has_element(CLEAR_ALL_DATA) {
            return Ok(false);
        }
        if !dialogs.confirm(CLEAR_PROMPT) {
            return Ok(false);
        }

        match self.client.clear(&self.endpoint).await {
            Ok(response) => {
                info!(message = %response.message, "stored data cleared");
                dialogs.alert(CLEARED_NOTICE);
                if let Err(err) = self.render_received(page).await {
                    warn!(%err, "refresh after clear failed");
                }
                Ok(true)
            }
            Err(err) => {
                error!(%err, "error clearing data");
                dialogs.alert(&format!("Failed to clear data: {err}"));
                Err(err)
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
