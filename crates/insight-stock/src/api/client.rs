//! HTTP client for the analysis backend
//!
//! Endpoints, relative to the configured base URL:
//!
//! | Operation | Request | Success body |
//! |-----------|---------|--------------|
//! | historical | `GET /api/v1/stocks/data/{SYMBOL}` | `{"historical_data": [rows]}` |
//! | entity info | `GET /api/v1/stocks/info/{SYMBOL}` | `{"company_info": {...}}` |
//! | narrative | `POST /api/v1/stocks/analyze/{SYMBOL}` with `{"model_id": "..."}` | `{"ai_analysis": "..."}` |
//!
//! A 404 on the first two means the symbol is unknown, as does a missing,
//! `null` or empty payload. Error bodies carry a FastAPI-style `detail` field
//! that becomes the error message.

use super::MarketDataApi;
use crate::config::StockConfig;
use crate::domain::{EntityInfo, Symbol, TimeSeries, TimeSeriesRow};
use crate::error::{Result, StockError};
use crate::settings::ModelId;
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use url::Url;

const API_PREFIX: [&str; 3] = ["api", "v1", "stocks"];

#[derive(Debug, Deserialize)]
struct HistoricalEnvelope {
    #[serde(default)]
    historical_data: Option<Vec<TimeSeriesRow>>,
}

#[derive(Debug, Deserialize)]
struct InfoEnvelope {
    #[serde(default)]
    company_info: Option<EntityInfo>,
}

#[derive(Debug, Deserialize)]
struct AnalysisEnvelope {
    #[serde(default)]
    ai_analysis: Option<String>,
}

#[derive(Debug, Serialize)]
struct AnalysisRequest<'a> {
    model_id: &'a str,
}

/// reqwest-backed implementation of [`MarketDataApi`]
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: Client,
    config: StockConfig,
}

impl BackendClient {
    /// Create a client with the given configuration
    pub fn new(config: StockConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { client, config })
    }

    /// Create a client from defaults plus environment overrides
    pub fn from_env() -> Result<Self> {
        Self::new(StockConfig::default().with_env()?)
    }

    pub fn config(&self) -> &StockConfig {
        &self.config
    }

    /// `{base}/api/v1/stocks/{operation}/{symbol}` with the symbol as one encoded segment
    pub fn endpoint(&self, operation: &str, symbol: &Symbol) -> Result<Url> {
        let mut url = self.config.api_base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                StockError::Config(format!(
                    "api_base_url '{}' cannot be used as a base URL",
                    self.config.api_base_url
                ))
            })?
            .pop_if_empty()
            .extend(API_PREFIX)
            .extend([operation, symbol.as_str()]);
        Ok(url)
    }

    async fn read_body(response: Response) -> Result<String> {
        Ok(response.text().await?)
    }
}

#[async_trait]
impl MarketDataApi for BackendClient {
    #[instrument(skip(self, symbol), fields(symbol = %symbol))]
    async fn fetch_historical(&self, symbol: &Symbol) -> Result<Option<TimeSeries>> {
        let url = self.endpoint("data", symbol)?;
        debug!(%url, "Requesting historical data");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = Self::read_body(response).await?;

        let rows = interpret_historical(status, &body)?;
        match &rows {
            Some(rows) => debug!(rows = rows.len(), "Received historical data"),
            None => debug!(%status, "Historical data not found"),
        }
        Ok(rows)
    }

    #[instrument(skip(self, symbol), fields(symbol = %symbol))]
    async fn fetch_entity_info(&self, symbol: &Symbol) -> Result<Option<EntityInfo>> {
        let url = self.endpoint("info", symbol)?;
        debug!(%url, "Requesting entity info");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = Self::read_body(response).await?;

        interpret_entity_info(status, &body)
    }

    #[instrument(skip(self, symbol, model), fields(symbol = %symbol, model = %model))]
    async fn fetch_narrative(&self, symbol: &Symbol, model: ModelId) -> Result<String> {
        let url = self.endpoint("analyze", symbol)?;
        debug!(%url, "Requesting narrative analysis");

        let response = self
            .client
            .post(url)
            .json(&AnalysisRequest {
                model_id: model.as_str(),
            })
            .send()
            .await?;
        let status = response.status();
        let body = Self::read_body(response).await?;

        let text = interpret_narrative(status, &body)?;
        debug!(chars = text.len(), "Received narrative analysis");
        Ok(text)
    }
}

/// Map a non-success response to an error, preferring the body's `detail`
pub fn error_from_body(status: StatusCode, body: &str, operation: &str) -> StockError {
    let detail = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| match json.get("detail") {
            Some(serde_json::Value::String(s)) => Some(s.clone()).filter(|s| !s.trim().is_empty()),
            Some(serde_json::Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        });

    let message = detail.unwrap_or_else(|| {
        format!(
            "backend returned status {} for {operation}",
            status.as_u16()
        )
    });
    StockError::api(status.as_u16(), message)
}

fn interpret_historical(status: StatusCode, body: &str) -> Result<Option<TimeSeries>> {
    if status == StatusCode::NOT_FOUND {
        return Ok(None);
    }
    if !status.is_success() {
        return Err(error_from_body(status, body, "historical data"));
    }
    parse_historical(body)
}

fn interpret_entity_info(status: StatusCode, body: &str) -> Result<Option<EntityInfo>> {
    if status == StatusCode::NOT_FOUND {
        return Ok(None);
    }
    if !status.is_success() {
        return Err(error_from_body(status, body, "entity info"));
    }
    parse_entity_info(body)
}

fn interpret_narrative(status: StatusCode, body: &str) -> Result<String> {
    if !status.is_success() {
        return Err(error_from_body(status, body, "AI analysis"));
    }
    parse_narrative(body)
}

fn malformed(operation: &str, err: &serde_json::Error) -> StockError {
    StockError::UnexpectedResponse(format!("malformed {operation} body: {err}"))
}

/// Rows of a historical envelope; an absent, `null` or empty payload is "not found"
fn parse_historical(body: &str) -> Result<Option<TimeSeries>> {
    let envelope: HistoricalEnvelope =
        serde_json::from_str(body).map_err(|e| malformed("historical data", &e))?;
    Ok(envelope.historical_data.filter(|rows| !rows.is_empty()))
}

fn parse_entity_info(body: &str) -> Result<Option<EntityInfo>> {
    let envelope: InfoEnvelope =
        serde_json::from_str(body).map_err(|e| malformed("entity info", &e))?;
    Ok(envelope.company_info)
}

fn parse_narrative(body: &str) -> Result<String> {
    let envelope: AnalysisEnvelope =
        serde_json::from_str(body).map_err(|e| malformed("AI analysis", &e))?;
    envelope.ai_analysis.ok_or_else(|| {
        StockError::UnexpectedResponse("AI analysis body has no ai_analysis field".to_string())
    })
}
