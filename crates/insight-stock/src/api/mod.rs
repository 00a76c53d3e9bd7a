//! Backend data sources

pub mod client;

pub use client::BackendClient;

use crate::domain::{EntityInfo, Symbol, TimeSeries};
use crate::error::Result;
use crate::settings::ModelId;
use async_trait::async_trait;

/// The three backend operations an analysis run depends on.
///
/// "Not found" is a successful answer (`Ok(None)`), not an error; every
/// other problem is an `Err`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataApi: Send + Sync {
    /// Historical price/volume rows, oldest first
    async fn fetch_historical(&self, symbol: &Symbol) -> Result<Option<TimeSeries>>;

    /// Descriptive attributes of the instrument
    async fn fetch_entity_info(&self, symbol: &Symbol) -> Result<Option<EntityInfo>>;

    /// Markdown narrative generated with `model`
    async fn fetch_narrative(&self, symbol: &Symbol, model: ModelId) -> Result<String>;
}
