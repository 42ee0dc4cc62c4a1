use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const CLEAR_CONFIRMATION: &str = "All posts cleared successfully.";

pub fn posts_route() -> &'static str {
    "/api/posts"
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Static page configuration fetched by the page controller on load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteConfig {
    #[serde(default)]
    pub page_title: String,
    #[serde(default)]
    pub site_header: String,
    #[serde(default)]
    pub post_section_title: String,
    #[serde(default)]
    pub receive_page_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_receive_tab: Option<bool>,
    #[serde(default)]
    pub form_fields: Vec<FormField>,
    pub backend_api_url: String,
}

impl SiteConfig {
    /// Only an explicit `false` hides the receive tab.
    pub fn receive_tab_hidden(&self) -> bool {
        self.show_receive_tab == Some(false)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.form_fields.iter().map(|field| field.name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormField {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_config_document() {
        let config: SiteConfig = serde_json::from_value(json!({
            "pageTitle": "Postbox",
            "siteHeader": "Send a request",
            "postSectionTitle": "New entry",
            "receivePageTitle": "Received",
            "showReceiveTab": false,
            "formFields": [
                { "name": "name", "label": "Name", "type": "text", "rows": 1 },
                { "name": "message" }
            ],
            "backendApiUrl": "/api/posts"
        }))
        .expect("config");

        assert!(config.receive_tab_hidden());
        assert_eq!(config.field_names().collect::<Vec<_>>(), ["name", "message"]);
        assert_eq!(config.form_fields[0].kind.as_deref(), Some("text"));
        assert_eq!(config.form_fields[0].extra.get("rows"), Some(&json!(1)));
    }

    #[test]
    fn missing_tab_flag_keeps_tab_visible() {
        let config: SiteConfig =
            serde_json::from_value(json!({ "backendApiUrl": "/api/posts" })).expect("config");
        assert!(!config.receive_tab_hidden());
        assert!(config.form_fields.is_empty());
    }
}
