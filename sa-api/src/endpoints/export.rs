//! Export API: raw data points. Always requires credentials.

use std::sync::Arc;

use sa_core::error::SaResult;

use crate::client::Pipeline;
use crate::http::{ApiRequest, ResponseFormat};
use crate::params::ExportQuery;
use crate::response::Payload;
use crate::types::{DataType, ExportFormat};

const DATAPOINTS_PATH: &str = "/api/export/datapoints";

/// Export endpoint group.
#[derive(Clone)]
pub struct ExportApi {
    pipeline: Arc<Pipeline>,
}

impl ExportApi {
    pub(crate) fn new(pipeline: Arc<Pipeline>) -> Self {
        Self { pipeline }
    }

    /// Export data points. JSON exports yield `Payload::Json`, CSV exports
    /// yield the body verbatim as `Payload::Text`.
    pub fn datapoints(&self, query: &ExportQuery) -> SaResult<Payload> {
        match query.format {
            ExportFormat::Json => self.pipeline.send_json(request(query)).map(Payload::Json),
            ExportFormat::Csv => self.to_csv(query).map(Payload::Text),
        }
    }

    /// Export pageview data points.
    pub fn pageviews(&self, query: &ExportQuery) -> SaResult<Payload> {
        self.datapoints(&query.clone().data_type(DataType::Pageviews))
    }

    /// Export event data points.
    pub fn events(&self, query: &ExportQuery) -> SaResult<Payload> {
        self.datapoints(&query.clone().data_type(DataType::Events))
    }

    /// Export as CSV and return the raw text.
    pub fn to_csv(&self, query: &ExportQuery) -> SaResult<String> {
        let query = query.clone().format(ExportFormat::Csv);
        self.pipeline
            .send_text(request(&query).with_accept(ResponseFormat::Csv))
    }
}

fn request(query: &ExportQuery) -> ApiRequest {
    ApiRequest::get(DATAPOINTS_PATH)
        .with_query(query.encode())
        .with_timeout(query.timeout)
        .with_auth()
}
