//! Terminal rendering of analysis state

use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use insight_stock::{
    AnalysisSettings, AnalysisUpdate, AnalysisView, ChartSet, ChartSlot, InfoCard, ModelId, Narrative,
};
use std::fmt::Write as _;

/// One-line progress note for a streamed update
pub fn progress_line(update: &AnalysisUpdate) -> Option<String> {
    match update {
        AnalysisUpdate::Started {
            symbol: Some(symbol),
            ..
        } => Some(format!("Analyzing {symbol}...")),
        AnalysisUpdate::Started { symbol: None, .. } => None,
        AnalysisUpdate::TimeSeries { rows, .. } => Some(format!("  historical data: {} rows", rows.len())),
        AnalysisUpdate::EntityInfo { info, .. } => Some(
            if info.is_some() {
                "  entity info: received"
            } else {
                "  entity info: unavailable"
            }
            .to_string(),
        ),
        AnalysisUpdate::Narrative { narrative, .. } => Some(format!(
            "  narrative: {}",
            match narrative {
                Narrative::Text(_) => "received",
                Narrative::Disabled(_) => "disabled",
                Narrative::Error(_) => "failed",
            }
        )),
        AnalysisUpdate::Failed { .. } | AnalysisUpdate::Completed { .. } => None,
    }
}

/// Info card as a two-column table
pub fn info_table(card: &InfoCard) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![card.title.clone(), card.subtitle.clone().unwrap_or_default()]);

    for (label, value) in &card.rows {
        table.add_row(vec![(*label).to_string(), value.clone()]);
    }
    table
}

/// Availability of each chart
pub fn chart_summary(charts: &ChartSet) -> String {
    let mut out = String::new();
    for slot in charts.slots() {
        let kind = slot.kind();
        let _ = match slot {
            ChartSlot::Ready(config) => writeln!(
                out,
                "  {:<16} {} points",
                kind.label(),
                config.point_count()
            ),
            ChartSlot::Absent { .. } => writeln!(
                out,
                "  {:<16} not enough data (needs {})",
                kind.label(),
                kind.required_fields()
            ),
        };
    }
    out
}

/// Full report of a settled view
pub fn report(view: &AnalysisView, expand: bool) -> String {
    let mut out = String::new();

    if let Some(error) = view.error() {
        let _ = writeln!(out, "Error: {error}");
        return out;
    }

    match view.info_card() {
        Some(card) if !card.rows.is_empty() || card.subtitle.is_some() => {
            let _ = writeln!(out, "{}", info_table(&card));
        }
        Some(card) => {
            let _ = writeln!(out, "{}", card.title);
        }
        None => {
            let _ = writeln!(out, "No entity information available.");
        }
    }

    if let Some(charts) = view.charts() {
        let _ = writeln!(out, "\nCharts:");
        out.push_str(&chart_summary(charts));
    }

    if let Some(narrative) = view.narrative() {
        let _ = writeln!(out, "\nAnalysis:");
        let text = if expand {
            narrative.narrative().as_str().to_string()
        } else {
            narrative.visible_text()
        };
        let _ = writeln!(out, "{text}");
        if !expand && narrative.is_truncated() {
            let _ = writeln!(out, "(run with --expand for the full analysis)");
        }
    }

    out
}

pub fn settings_table(settings: &AnalysisSettings) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Setting", "Value"])
        .add_row(vec![
            "AI analysis",
            if settings.ai_enabled { "on" } else { "off" },
        ])
        .add_row(vec!["Model", settings.selected_model.as_str()]);
    table
}

pub fn models_table(selected: ModelId) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["", "Model", "Name"]);
    for model in ModelId::ALL {
        let marker = if model == selected { "*" } else { "" };
        table.add_row(vec![marker, model.as_str(), model.display_name()]);
    }
    table
}
