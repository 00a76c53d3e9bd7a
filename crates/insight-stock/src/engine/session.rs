//! Interactive analysis session: one outcome at a time

use crate::api::MarketDataApi;
use crate::engine::orchestrator::{AnalysisOrchestrator, AnalysisUpdate};
use crate::engine::outcome::AnalysisOutcome;
use crate::settings::SettingsResolver;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

/// Holds the latest outcome and re-reads settings on every submission
#[derive(Debug)]
pub struct AnalysisSession {
    orchestrator: AnalysisOrchestrator,
    settings: SettingsResolver,
    current: Option<AnalysisOutcome>,
    runs: u64,
}

impl AnalysisSession {
    pub fn new(api: Arc<dyn MarketDataApi>, settings: SettingsResolver) -> Self {
        Self {
            orchestrator: AnalysisOrchestrator::new(api),
            settings,
            current: None,
            runs: 0,
        }
    }

    /// Analyze `input`, replacing the previous outcome
    pub async fn submit(&mut self, input: &str) -> &AnalysisOutcome {
        self.begin();
        let settings = self.settings.load_settings();
        let outcome = self.orchestrator.run_analysis(input, settings).await;
        self.current.insert(outcome)
    }

    /// Like [`submit`](Self::submit), streaming updates to `updates`
    pub async fn submit_streaming(
        &mut self,
        input: &str,
        updates: &UnboundedSender<AnalysisUpdate>,
    ) -> &AnalysisOutcome {
        self.begin();
        let settings = self.settings.load_settings();
        let outcome = self
            .orchestrator
            .run_analysis_streaming(input, settings, updates)
            .await;
        self.current.insert(outcome)
    }

    fn begin(&mut self) {
        if let Some(previous) = self.current.take() {
            debug!(run_id = %previous.run_id(), "Discarding previous outcome");
        }
        self.runs += 1;
    }

    /// Latest settled outcome
    pub fn current(&self) -> Option<&AnalysisOutcome> {
        self.current.as_ref()
    }

    /// Number of submissions so far
    pub fn runs(&self) -> u64 {
        self.runs
    }

    pub fn settings(&self) -> &SettingsResolver {
        &self.settings
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}
