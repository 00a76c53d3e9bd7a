//! Symbol analysis core
//!
//! Given an instrument symbol, this crate gathers three independently sourced
//! results from the analysis backend and turns them into display-ready data:
//!
//! - Historical price/volume series (the critical source; its failure aborts the run)
//! - Descriptive entity info (isolated; failure leaves the slot empty)
//! - Narrative analysis from a text-generation model (isolated, gated by settings)
//!
//! Around the orchestration it provides:
//! - Persisted user settings with validation and defaults
//! - Pure chart-config generators (price, candlestick, moving averages, volume)
//! - Prefix suggestions over static ticker pools
//! - Narrative preview truncation
//!
//! # Architecture
//!
//! `AnalysisOrchestrator` spawns one task per fetch through the
//! [`MarketDataApi`] trait (implemented over HTTP by [`BackendClient`]) and
//! awaits them in a fixed order, producing an [`AnalysisOutcome`]. Streaming
//! consumers receive [`AnalysisUpdate`]s as each slot settles and can fold
//! them into an [`AnalysisView`].
//!
//! # Example
//!
//! ```rust,ignore
//! use insight_stock::{AnalysisSession, BackendClient, SettingsResolver, FileStore};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let api = Arc::new(BackendClient::from_env()?);
//!     let settings = SettingsResolver::new(Arc::new(FileStore::new(".insight")));
//!     let mut session = AnalysisSession::new(api, settings);
//!
//!     let outcome = session.submit("AAPL").await;
//!     println!("{:?}", outcome.fatal_error());
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod charts;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod settings;
pub mod suggest;

// Re-export main types for convenience
pub use api::{BackendClient, MarketDataApi};
pub use charts::{ChartConfig, ChartKind, ChartSet, ChartSlot};
pub use config::StockConfig;
pub use domain::{
    EntityInfo, InstrumentClass, Narrative, NarrativeView, Symbol, TimeSeries, TimeSeriesRow,
};
pub use engine::{
    AnalysisOrchestrator, AnalysisOutcome, AnalysisSession, AnalysisUpdate, AnalysisView,
    InfoCard,
};
pub use error::{Result, StockError};
pub use settings::{
    AnalysisSettings, FileStore, KeyValueStore, MemoryStore, ModelId, SettingsResolver,
};
pub use suggest::{SuggestionBox, SuggestionPool, suggest};
pub use uuid::Uuid;
