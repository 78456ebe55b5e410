//! Admin API: website management. Always requires credentials.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use sa_core::error::{SaError, SaResult};

use crate::client::Pipeline;
use crate::http::ApiRequest;
use crate::response;

const WEBSITES_PATH: &str = "/api/websites";
const ADD_WEBSITE_PATH: &str = "/api/websites/add";

/// Body of an add-website request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewWebsite {
    pub hostname: String,
    pub timezone: String,
    pub public: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl NewWebsite {
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            timezone: "UTC".to_string(),
            public: false,
            label: None,
        }
    }

    pub fn timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = timezone.into();
        self
    }

    pub fn public(mut self, public: bool) -> Self {
        self.public = public;
        self
    }

    /// Empty labels are not sent.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        let label = label.into();
        self.label = (!label.is_empty()).then_some(label);
        self
    }
}

/// Admin endpoint group.
#[derive(Clone)]
pub struct AdminApi {
    pipeline: Arc<Pipeline>,
}

impl AdminApi {
    pub(crate) fn new(pipeline: Arc<Pipeline>) -> Self {
        Self { pipeline }
    }

    /// All websites in the account.
    pub fn list_websites(&self) -> SaResult<Vec<Value>> {
        let request = ApiRequest::get(WEBSITES_PATH).with_auth();
        match self.pipeline.send_json(request)? {
            Value::Array(sites) => Ok(sites),
            other => Err(SaError::Server {
                message: "expected a list of websites".to_string(),
                status: 200,
                body: response::excerpt(&other.to_string()),
            }),
        }
    }

    /// The website whose hostname matches exactly, or `None`.
    ///
    /// There is no single-website endpoint; this filters `list_websites`.
    pub fn get_website(&self, hostname: &str) -> SaResult<Option<Value>> {
        let sites = self.list_websites()?;
        Ok(sites
            .into_iter()
            .find(|site| site.get("hostname").and_then(Value::as_str) == Some(hostname)))
    }

    /// Add a website. Requires a Business or Enterprise plan.
    pub fn add_website(&self, website: &NewWebsite) -> SaResult<Value> {
        let body = serde_json::to_value(website)?;
        let request = ApiRequest::post(ADD_WEBSITE_PATH, body).with_auth();
        self.pipeline.send_json(request)
    }
}
