//! Settled result of one analysis run

use crate::domain::{EntityInfo, Narrative, Symbol, TimeSeries};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Final, read-only outcome of an analysis run.
///
/// Either the run failed fatally (every data slot is empty and
/// `fatal_error` is set) or the primary time series is present and
/// `fatal_error` is empty. Only the two constructors can build one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisOutcome {
    run_id: Uuid,
    symbol: Option<Symbol>,
    time_series: Option<TimeSeries>,
    entity_info: Option<EntityInfo>,
    narrative: Option<Narrative>,
    fatal_error: Option<String>,
    completed_at: DateTime<Utc>,
}

impl AnalysisOutcome {
    /// Aborted run: no data, only the error message
    pub fn fatal(run_id: Uuid, symbol: Option<Symbol>, message: impl Into<String>) -> Self {
        Self {
            run_id,
            symbol,
            time_series: None,
            entity_info: None,
            narrative: None,
            fatal_error: Some(message.into()),
            completed_at: Utc::now(),
        }
    }

    /// Successful run; the secondary slots degrade independently
    pub fn settled(
        run_id: Uuid,
        symbol: Symbol,
        time_series: TimeSeries,
        entity_info: Option<EntityInfo>,
        narrative: Narrative,
    ) -> Self {
        Self {
            run_id,
            symbol: Some(symbol),
            time_series: Some(time_series),
            entity_info,
            narrative: Some(narrative),
            fatal_error: None,
            completed_at: Utc::now(),
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Normalized symbol; absent only when the input was blank
    pub fn symbol(&self) -> Option<&Symbol> {
        self.symbol.as_ref()
    }

    pub fn time_series(&self) -> Option<&TimeSeries> {
        self.time_series.as_ref()
    }

    pub fn entity_info(&self) -> Option<&EntityInfo> {
        self.entity_info.as_ref()
    }

    pub fn narrative(&self) -> Option<&Narrative> {
        self.narrative.as_ref()
    }

    pub fn fatal_error(&self) -> Option<&str> {
        self.fatal_error.as_deref()
    }

    pub fn is_fatal(&self) -> bool {
        self.fatal_error.is_some()
    }

    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }
}
