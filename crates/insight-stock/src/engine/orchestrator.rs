//! Fetch orchestration for an analysis run
//!
//! All fetches are started up front as independent tasks and then awaited in
//! a fixed order: historical series, entity info, narrative. The historical
//! series is the only critical source; when it fails the run aborts and the
//! other tasks are detached with their results discarded.

use crate::api::MarketDataApi;
use crate::domain::{EntityInfo, Narrative, Symbol, TimeSeries};
use crate::engine::outcome::AnalysisOutcome;
use crate::error::StockError;
use crate::settings::AnalysisSettings;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Fatal message for blank input
pub const MISSING_SYMBOL: &str = "missing symbol";

/// Progress of a run, published as each slot settles
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AnalysisUpdate {
    /// A new run began; consumers drop whatever they showed before
    Started { run_id: Uuid, symbol: Option<Symbol> },
    /// Primary series arrived; sent before the other slots settle
    TimeSeries { run_id: Uuid, rows: TimeSeries },
    EntityInfo { run_id: Uuid, info: Option<EntityInfo> },
    Narrative { run_id: Uuid, narrative: Narrative },
    /// The run aborted
    Failed { run_id: Uuid, message: String },
    /// Final state, identical to the value `run_analysis` returns
    Completed { outcome: AnalysisOutcome },
}

impl AnalysisUpdate {
    pub fn run_id(&self) -> Uuid {
        match self {
            Self::Started { run_id, .. }
            | Self::TimeSeries { run_id, .. }
            | Self::EntityInfo { run_id, .. }
            | Self::Narrative { run_id, .. }
            | Self::Failed { run_id, .. } => *run_id,
            Self::Completed { outcome } => outcome.run_id(),
        }
    }
}

/// Optional sink for streaming updates
struct Publisher<'a> {
    sink: Option<&'a UnboundedSender<AnalysisUpdate>>,
}

impl Publisher<'_> {
    fn publish(&self, update: AnalysisUpdate) {
        if let Some(sink) = self.sink {
            if sink.send(update).is_err() {
                debug!("Update receiver dropped");
            }
        }
    }
}

/// Drives the fetches of one analysis run
#[derive(Clone)]
pub struct AnalysisOrchestrator {
    api: Arc<dyn MarketDataApi>,
}

impl std::fmt::Debug for AnalysisOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisOrchestrator").finish_non_exhaustive()
    }
}

impl AnalysisOrchestrator {
    pub fn new(api: Arc<dyn MarketDataApi>) -> Self {
        Self { api }
    }

    /// Run an analysis and return the settled outcome
    #[instrument(skip(self, input, settings), fields(input = %input.trim()))]
    pub async fn run_analysis(&self, input: &str, settings: AnalysisSettings) -> AnalysisOutcome {
        self.execute(input, settings, &Publisher { sink: None }).await
    }

    /// Like [`run_analysis`](Self::run_analysis), also publishing each slot
    /// to `updates` as it settles
    #[instrument(skip(self, input, settings, updates), fields(input = %input.trim()))]
    pub async fn run_analysis_streaming(
        &self,
        input: &str,
        settings: AnalysisSettings,
        updates: &UnboundedSender<AnalysisUpdate>,
    ) -> AnalysisOutcome {
        self.execute(input, settings, &Publisher {
            sink: Some(updates),
        })
        .await
    }

    async fn execute(
        &self,
        input: &str,
        settings: AnalysisSettings,
        publisher: &Publisher<'_>,
    ) -> AnalysisOutcome {
        let run_id = Uuid::new_v4();

        let Ok(symbol) = Symbol::parse(input) else {
            warn!("Analysis requested without a symbol");
            publisher.publish(AnalysisUpdate::Started {
                run_id,
                symbol: None,
            });
            return Self::abort(AnalysisOutcome::fatal(run_id, None, MISSING_SYMBOL), publisher);
        };

        info!(%run_id, %symbol, ai_enabled = settings.ai_enabled, "Starting analysis");
        publisher.publish(AnalysisUpdate::Started {
            run_id,
            symbol: Some(symbol.clone()),
        });

        let historical = tokio::spawn({
            let api = Arc::clone(&self.api);
            let symbol = symbol.clone();
            async move { api.fetch_historical(&symbol).await }
        });

        let entity = tokio::spawn({
            let api = Arc::clone(&self.api);
            let symbol = symbol.clone();
            async move { api.fetch_entity_info(&symbol).await }
        });

        let narrative = settings.narrative_model().map(|model| {
            let api = Arc::clone(&self.api);
            let symbol = symbol.clone();
            tokio::spawn(async move { api.fetch_narrative(&symbol, model).await })
        });
        if narrative.is_none() {
            debug!("Narrative generation disabled");
        }

        // Unawaited handles are dropped on abort; those tasks run detached.
        let rows = match historical.await {
            Ok(Ok(Some(rows))) => rows,
            Ok(Ok(None)) => {
                let message = format!("{symbol} not found");
                return Self::abort(AnalysisOutcome::fatal(run_id, Some(symbol), message), publisher);
            }
            Ok(Err(e)) => {
                return Self::abort(
                    AnalysisOutcome::fatal(run_id, Some(symbol), e.to_string()),
                    publisher,
                );
            }
            Err(e) => {
                let message = StockError::from(e).to_string();
                return Self::abort(AnalysisOutcome::fatal(run_id, Some(symbol), message), publisher);
            }
        };

        debug!(rows = rows.len(), "Historical series ready");
        publisher.publish(AnalysisUpdate::TimeSeries {
            run_id,
            rows: rows.clone(),
        });

        let entity_info = match entity.await {
            Ok(Ok(info)) => {
                if info.is_none() {
                    debug!("No entity info for symbol");
                }
                info
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Entity info unavailable");
                None
            }
            Err(e) => {
                warn!(error = %e, "Entity info task failed");
                None
            }
        };
        publisher.publish(AnalysisUpdate::EntityInfo {
            run_id,
            info: entity_info.clone(),
        });

        let narrative = match narrative {
            None => Narrative::disabled(),
            Some(handle) => match handle.await {
                Ok(Ok(text)) => Narrative::Text(text),
                Ok(Err(e)) => {
                    warn!(error = %e, "Narrative analysis failed");
                    Narrative::failed(e)
                }
                Err(e) => {
                    warn!(error = %e, "Narrative task failed");
                    Narrative::failed(StockError::from(e))
                }
            },
        };
        publisher.publish(AnalysisUpdate::Narrative {
            run_id,
            narrative: narrative.clone(),
        });

        let outcome = AnalysisOutcome::settled(run_id, symbol, rows, entity_info, narrative);
        info!(
            %run_id,
            rows = outcome.time_series().map_or(0, Vec::len),
            entity_info = outcome.entity_info().is_some(),
            narrative_ok = outcome.narrative().is_some_and(Narrative::is_text),
            "Analysis complete"
        );
        publisher.publish(AnalysisUpdate::Completed {
            outcome: outcome.clone(),
        });
        outcome
    }

    fn abort(outcome: AnalysisOutcome, publisher: &Publisher<'_>) -> AnalysisOutcome {
        let message = outcome.fatal_error().unwrap_or_default().to_string();
        warn!(run_id = %outcome.run_id(), error = %message, "Analysis aborted");
        publisher.publish(AnalysisUpdate::Failed {
            run_id: outcome.run_id(),
            message,
        });
        publisher.publish(AnalysisUpdate::Completed {
            outcome: outcome.clone(),
        });
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockMarketDataApi;
    use crate::domain::TimeSeriesRow;
    use crate::error::Result;
    use crate::settings::ModelId;
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::sync::{Notify, mpsc};
    use tokio_test::{assert_err, assert_ok};

    fn rows(n: usize) -> TimeSeries {
        (0..n)
            .map(|i| TimeSeriesRow::with_close(format!("2024-01-{:02}", i + 1), 10.0 + i as f64))
            .collect()
    }

    fn ai_disabled() -> AnalysisSettings {
        AnalysisSettings {
            ai_enabled: false,
            ..AnalysisSettings::default()
        }
    }

    fn orchestrator(api: impl MarketDataApi + 'static) -> AnalysisOrchestrator {
        AnalysisOrchestrator::new(Arc::new(api))
    }

    #[tokio::test]
    async fn test_blank_input_makes_no_calls() {
        let mut api = MockMarketDataApi::new();
        api.expect_fetch_historical().never();
        api.expect_fetch_entity_info().never();
        api.expect_fetch_narrative().never();

        let outcome = orchestrator(api)
            .run_analysis("   ", AnalysisSettings::default())
            .await;

        assert_eq!(outcome.fatal_error(), Some(MISSING_SYMBOL));
        assert!(outcome.time_series().is_none());
        assert!(outcome.symbol().is_none());
    }

    #[tokio::test]
    async fn test_not_found_discards_other_results() {
        let mut api = MockMarketDataApi::new();
        api.expect_fetch_historical().returning(|_| Ok(None));
        api.expect_fetch_entity_info()
            .returning(|_| Ok(Some(EntityInfo::default())));
        api.expect_fetch_narrative()
            .returning(|_, _| Ok("Looks fine.".to_string()));

        let outcome = orchestrator(api)
            .run_analysis("zzzz", AnalysisSettings::default())
            .await;

        assert_eq!(outcome.fatal_error(), Some("ZZZZ not found"));
        assert!(outcome.time_series().is_none());
        assert!(outcome.entity_info().is_none());
        assert!(outcome.narrative().is_none());
    }

    #[tokio::test]
    async fn test_primary_failure_message_is_fatal() {
        let mut api = MockMarketDataApi::new();
        api.expect_fetch_historical()
            .returning(|_| Err(StockError::api(500, "upstream timeout")));
        api.expect_fetch_entity_info().returning(|_| Ok(None));

        let outcome = orchestrator(api).run_analysis("MSFT", ai_disabled()).await;

        assert_eq!(outcome.fatal_error(), Some("upstream timeout"));
        assert!(outcome.entity_info().is_none());
        assert!(outcome.narrative().is_none());
    }

    #[tokio::test]
    async fn test_entity_failure_is_isolated() {
        let mut api = MockMarketDataApi::new();
        api.expect_fetch_historical()
            .withf(|symbol| symbol.as_str() == "ABC")
            .returning(|_| Ok(Some(rows(3))));
        api.expect_fetch_entity_info()
            .returning(|_| Err(StockError::api(502, "bad gateway")));
        api.expect_fetch_narrative().never();

        let outcome = orchestrator(api).run_analysis("abc", ai_disabled()).await;

        assert!(!outcome.is_fatal());
        assert_eq!(outcome.time_series().map(Vec::len), Some(3));
        assert!(outcome.entity_info().is_none());
        assert_eq!(outcome.narrative(), Some(&Narrative::disabled()));
    }

    #[tokio::test]
    async fn test_narrative_uses_selected_model() {
        let mut api = MockMarketDataApi::new();
        api.expect_fetch_historical().returning(|_| Ok(Some(rows(1))));
        api.expect_fetch_entity_info().returning(|_| Ok(None));
        api.expect_fetch_narrative()
            .withf(|_, model| *model == ModelId::DeepseekR1DistillLlama70b)
            .times(1)
            .returning(|_, _| Ok("## Outlook\nSteady.".to_string()));

        let settings = AnalysisSettings {
            ai_enabled: true,
            selected_model: ModelId::DeepseekR1DistillLlama70b,
        };
        let outcome = orchestrator(api).run_analysis("NVDA", settings).await;

        assert_eq!(
            outcome.narrative(),
            Some(&Narrative::Text("## Outlook\nSteady.".to_string()))
        );
        assert!(outcome.entity_info().is_none());
    }

    #[tokio::test]
    async fn test_narrative_failure_is_isolated() {
        let mut api = MockMarketDataApi::new();
        api.expect_fetch_historical().returning(|_| Ok(Some(rows(2))));
        api.expect_fetch_entity_info()
            .returning(|_| Ok(Some(EntityInfo::default())));
        api.expect_fetch_narrative()
            .returning(|_, _| Err(StockError::api(500, "model overloaded")));

        let outcome = orchestrator(api)
            .run_analysis("TSLA", AnalysisSettings::default())
            .await;

        assert!(!outcome.is_fatal());
        assert!(outcome.entity_info().is_some());
        assert_eq!(
            outcome.narrative(),
            Some(&Narrative::Error("AI analysis failed: model overloaded".to_string()))
        );
    }

    /// Hand-rolled fake whose fetches can be held open and inspected
    #[derive(Default)]
    struct GatedApi {
        entity_started: Notify,
        release_entity: Notify,
        hold_entity: bool,
        panic_in_entity: bool,
        wait_for_entity_before_historical: bool,
    }

    #[async_trait]
    impl MarketDataApi for GatedApi {
        async fn fetch_historical(&self, _symbol: &Symbol) -> Result<Option<TimeSeries>> {
            if self.wait_for_entity_before_historical {
                self.entity_started.notified().await;
            }
            Ok(Some(rows(4)))
        }

        async fn fetch_entity_info(&self, _symbol: &Symbol) -> Result<Option<EntityInfo>> {
            self.entity_started.notify_one();
            if self.panic_in_entity {
                panic!("entity source crashed");
            }
            if self.hold_entity {
                self.release_entity.notified().await;
            }
            Ok(Some(EntityInfo::default()))
        }

        async fn fetch_narrative(&self, _symbol: &Symbol, _model: ModelId) -> Result<String> {
            Ok("Fine.".to_string())
        }
    }

    #[tokio::test]
    async fn test_entity_fetch_starts_before_historical_completes() {
        let api = GatedApi {
            wait_for_entity_before_historical: true,
            ..GatedApi::default()
        };

        // Sequential fetching would never release the historical fetch.
        let outcome = tokio::time::timeout(
            Duration::from_secs(5),
            orchestrator(api).run_analysis("AAPL", ai_disabled()),
        )
        .await;

        let outcome = assert_ok!(outcome);
        assert_eq!(outcome.time_series().map(Vec::len), Some(4));
        assert!(outcome.entity_info().is_some());
    }

    #[tokio::test]
    async fn test_time_series_published_before_other_slots_settle() {
        let api = Arc::new(GatedApi {
            hold_entity: true,
            ..GatedApi::default()
        });
        let orchestrator = AnalysisOrchestrator::new(api.clone());
        let (tx, mut rx) = mpsc::unbounded_channel();

        let run = tokio::spawn(async move {
            orchestrator
                .run_analysis_streaming("aapl", AnalysisSettings::default(), &tx)
                .await
        });

        let started = rx.recv().await.unwrap();
        assert!(matches!(started, AnalysisUpdate::Started { symbol: Some(_), .. }));

        let series = rx.recv().await.unwrap();
        match &series {
            AnalysisUpdate::TimeSeries { rows, .. } => assert_eq!(rows.len(), 4),
            other => panic!("Expected time series, got {other:?}"),
        }

        // Entity info is still held open, so nothing else may be published yet.
        tokio::task::yield_now().await;
        assert_err!(rx.try_recv());

        api.release_entity.notify_one();
        let outcome = run.await.unwrap();

        let rest: Vec<AnalysisUpdate> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
        assert_eq!(rest.len(), 3);
        assert!(matches!(rest[0], AnalysisUpdate::EntityInfo { info: Some(_), .. }));
        assert!(matches!(
            rest[1],
            AnalysisUpdate::Narrative {
                narrative: Narrative::Text(_),
                ..
            }
        ));
        match &rest[2] {
            AnalysisUpdate::Completed { outcome: published } => assert_eq!(published, &outcome),
            other => panic!("Expected completion, got {other:?}"),
        }
        assert!(rest.iter().all(|u| u.run_id() == series.run_id()));
    }

    #[tokio::test]
    async fn test_fatal_run_streams_failure() {
        let mut api = MockMarketDataApi::new();
        api.expect_fetch_historical().returning(|_| Ok(None));
        api.expect_fetch_entity_info().returning(|_| Ok(None));

        let (tx, mut rx) = mpsc::unbounded_channel();
        let outcome = orchestrator(api)
            .run_analysis_streaming("QQQQ", ai_disabled(), &tx)
            .await;
        drop(tx);

        let mut updates = Vec::new();
        while let Some(update) = rx.recv().await {
            updates.push(update);
        }

        assert_eq!(updates.len(), 3);
        assert!(matches!(updates[0], AnalysisUpdate::Started { .. }));
        match &updates[1] {
            AnalysisUpdate::Failed { message, .. } => assert_eq!(message, "QQQQ not found"),
            other => panic!("Expected failure, got {other:?}"),
        }
        assert!(matches!(&updates[2], AnalysisUpdate::Completed { outcome: o } if o == &outcome));
    }

    #[tokio::test]
    async fn test_panicking_entity_task_degrades_slot() {
        let api = GatedApi {
            panic_in_entity: true,
            ..GatedApi::default()
        };

        let outcome = orchestrator(api).run_analysis("AMD", ai_disabled()).await;

        assert!(!outcome.is_fatal());
        assert!(outcome.entity_info().is_none());
        assert_eq!(outcome.narrative(), Some(&Narrative::disabled()));
    }
}
