//! Presentation-side state built from analysis updates

use crate::charts::ChartSet;
use crate::domain::{EntityInfo, InstrumentClass, NarrativeView, Symbol, TimeSeries};
use crate::engine::orchestrator::AnalysisUpdate;
use crate::engine::outcome::AnalysisOutcome;
use uuid::Uuid;

/// What a renderer shows for the current run.
///
/// Fed with [`AnalysisUpdate`]s; a `Started` update wipes the previous run
/// and updates from any other run are ignored.
#[derive(Debug, Clone, Default)]
pub struct AnalysisView {
    class: InstrumentClass,
    run_id: Option<Uuid>,
    symbol: Option<Symbol>,
    loading: bool,
    error: Option<String>,
    time_series: Option<TimeSeries>,
    charts: Option<ChartSet>,
    entity_info: Option<EntityInfo>,
    narrative: Option<NarrativeView>,
}

impl AnalysisView {
    pub fn new(class: InstrumentClass) -> Self {
        Self {
            class,
            ..Self::default()
        }
    }

    /// View of an already settled outcome
    pub fn from_outcome(class: InstrumentClass, outcome: &AnalysisOutcome) -> Self {
        let mut view = Self::new(class);
        view.apply(AnalysisUpdate::Started {
            run_id: outcome.run_id(),
            symbol: outcome.symbol().cloned(),
        });
        view.apply(AnalysisUpdate::Completed {
            outcome: outcome.clone(),
        });
        view
    }

    pub fn apply(&mut self, update: AnalysisUpdate) {
        if let AnalysisUpdate::Started { run_id, symbol } = update {
            *self = Self {
                class: self.class,
                run_id: Some(run_id),
                symbol,
                loading: true,
                ..Self::default()
            };
            return;
        }

        if self.run_id != Some(update.run_id()) {
            return;
        }

        match update {
            AnalysisUpdate::Started { .. } => {}
            AnalysisUpdate::TimeSeries { rows, .. } => self.set_time_series(rows),
            AnalysisUpdate::EntityInfo { info, .. } => self.entity_info = info,
            AnalysisUpdate::Narrative { narrative, .. } => {
                self.narrative = Some(NarrativeView::new(narrative));
            }
            AnalysisUpdate::Failed { message, .. } => {
                self.error = Some(message);
                self.loading = false;
            }
            AnalysisUpdate::Completed { outcome } => self.settle(&outcome),
        }
    }

    fn set_time_series(&mut self, rows: TimeSeries) {
        self.charts = self
            .symbol
            .as_ref()
            .map(|symbol| ChartSet::generate(&rows, symbol));
        self.time_series = Some(rows);
    }

    fn settle(&mut self, outcome: &AnalysisOutcome) {
        self.loading = false;
        self.error = outcome.fatal_error().map(str::to_string);

        if self.time_series.is_none() {
            if let Some(rows) = outcome.time_series() {
                self.set_time_series(rows.clone());
            }
        }
        if self.entity_info.is_none() {
            self.entity_info = outcome.entity_info().cloned();
        }
        if self.narrative.is_none() {
            self.narrative = outcome.narrative().cloned().map(NarrativeView::new);
        }
    }

    pub fn class(&self) -> InstrumentClass {
        self.class
    }

    pub fn symbol(&self) -> Option<&Symbol> {
        self.symbol.as_ref()
    }

    /// A run is in flight
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn time_series(&self) -> Option<&TimeSeries> {
        self.time_series.as_ref()
    }

    pub fn charts(&self) -> Option<&ChartSet> {
        self.charts.as_ref()
    }

    pub fn entity_info(&self) -> Option<&EntityInfo> {
        self.entity_info.as_ref()
    }

    pub fn narrative(&self) -> Option<&NarrativeView> {
        self.narrative.as_ref()
    }

    /// For expand/collapse
    pub fn narrative_mut(&mut self) -> Option<&mut NarrativeView> {
        self.narrative.as_mut()
    }

    /// Heading, optional subtitle and detail rows of the info card
    pub fn info_card(&self) -> Option<InfoCard> {
        let info = self.entity_info.as_ref()?;
        Some(InfoCard {
            title: info.display_name(self.class).to_string(),
            subtitle: info.subtitle(self.class).map(str::to_string),
            rows: info.card_rows(self.class),
        })
    }
}

/// Render-ready info card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoCard {
    pub title: String,
    pub subtitle: Option<String>,
    pub rows: Vec<(&'static str, String)>,
}
