//! Chart configuration generation from historical rows.
//!
//! Each generator is a pure function from rows to a [`ChartSlot`]: either a
//! Plotly-shaped [`ChartConfig`] (traces + layout, serializable as JSON) or an
//! explicit absence marker when the rows lack the fields that chart needs.
//! Rows are never re-ordered; missing values never become zeros.

use crate::domain::{Symbol, TimeSeriesRow};
use serde::Serialize;
use std::fmt;

/// Theme colour tokens resolved by the renderer's stylesheet
pub mod theme {
    pub const ACCENT: &str = "var(--color-accent)";
    pub const PRIMARY: &str = "var(--color-primary)";
    pub const SECONDARY: &str = "var(--color-secondary)";
    pub const SUCCESS: &str = "var(--color-success)";
    pub const TEXT_MEDIUM: &str = "var(--color-text-medium)";
    pub const TEXT_LIGHT: &str = "var(--color-text-light)";
    pub const BACKGROUND_DARK: &str = "var(--color-background-dark)";
    pub const BORDER: &str = "var(--color-border)";
}

const DATE_AXIS: &str = "Date";
const PRICE_AXIS: &str = "Price (USD)";

/// The four charts derived from a time series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Price,
    Candlestick,
    MovingAverages,
    Volume,
}

impl ChartKind {
    pub const ALL: [ChartKind; 4] = [
        ChartKind::Price,
        ChartKind::Candlestick,
        ChartKind::MovingAverages,
        ChartKind::Volume,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Price => "Closing price",
            Self::Candlestick => "Candlestick",
            Self::MovingAverages => "Moving averages",
            Self::Volume => "Volume",
        }
    }

    /// Chart title for `symbol`
    pub fn title(self, symbol: &Symbol) -> String {
        match self {
            Self::Price => format!("{symbol} Closing Price (Last 6 Months)"),
            Self::Candlestick => format!("{symbol} Candlestick Chart (Last 6 Months)"),
            Self::MovingAverages => format!("{symbol} Moving Averages (SMA 20, EMA 20)"),
            Self::Volume => format!("{symbol} Trading Volume"),
        }
    }

    /// Row fields this chart requires
    pub fn required_fields(self) -> &'static str {
        match self {
            Self::Price => "Date, Close",
            Self::Candlestick => "Date, Open, High, Low, Close",
            Self::MovingAverages => "Date, Close, SMA_20, EMA_20",
            Self::Volume => "Date, Volume",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineStyle {
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandleDirection {
    pub line: LineStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Font {
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoverLabel {
    pub bgcolor: &'static str,
    pub bordercolor: &'static str,
    pub font: Font,
}

/// `scatter` trace rendered as a line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineTrace {
    pub x: Vec<String>,
    pub y: Vec<f64>,
    pub mode: &'static str,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<LineStyle>,
    pub hovertemplate: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandlestickTrace {
    pub x: Vec<String>,
    pub open: Vec<f64>,
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub close: Vec<f64>,
    pub name: String,
    pub increasing: CandleDirection,
    pub decreasing: CandleDirection,
    pub hoverlabel: HoverLabel,
    pub hovertemplate: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarTrace {
    pub x: Vec<String>,
    pub y: Vec<f64>,
    pub name: String,
    pub marker: Marker,
    pub hovertemplate: String,
}

/// One plotted series
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
    Scatter(LineTrace),
    Candlestick(CandlestickTrace),
    Bar(BarTrace),
}

impl Trace {
    pub fn name(&self) -> &str {
        match self {
            Self::Scatter(t) => &t.name,
            Self::Candlestick(t) => &t.name,
            Self::Bar(t) => &t.name,
        }
    }

    /// Shared x-axis values
    pub fn x(&self) -> &[String] {
        match self {
            Self::Scatter(t) => &t.x,
            Self::Candlestick(t) => &t.x,
            Self::Bar(t) => &t.x,
        }
    }

    pub fn len(&self) -> usize {
        self.x().len()
    }

    pub fn is_empty(&self) -> bool {
        self.x().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeSlider {
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub title: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rangeslider: Option<RangeSlider>,
}

impl Axis {
    fn titled(title: &'static str) -> Self {
        Self {
            title,
            rangeslider: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub orientation: &'static str,
    pub yanchor: &'static str,
    pub y: f64,
    pub xanchor: &'static str,
    pub x: f64,
}

impl Legend {
    /// Single row above the plot area, right-aligned
    pub fn horizontal_top() -> Self {
        Self {
            orientation: "h",
            yanchor: "bottom",
            y: 1.02,
            xanchor: "right",
            x: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub title: String,
    pub xaxis: Axis,
    pub yaxis: Axis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend: Option<Legend>,
}

/// Renderer-ready chart: traces plus layout
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartConfig {
    #[serde(skip)]
    pub kind: ChartKind,
    pub data: Vec<Trace>,
    pub layout: Layout,
}

impl ChartConfig {
    /// Number of points in the (shared) x-axis
    pub fn point_count(&self) -> usize {
        self.data.first().map_or(0, Trace::len)
    }
}

/// Generator output: a chart, or the marker that the data cannot support it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ChartSlot {
    Ready(ChartConfig),
    Absent { kind: ChartKind },
}

impl ChartSlot {
    fn absent(kind: ChartKind) -> Self {
        Self::Absent { kind }
    }

    pub fn kind(&self) -> ChartKind {
        match self {
            Self::Ready(config) => config.kind,
            Self::Absent { kind } => *kind,
        }
    }

    pub fn config(&self) -> Option<&ChartConfig> {
        match self {
            Self::Ready(config) => Some(config),
            Self::Absent { .. } => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

/// Closing-price line; needs `Date` and `Close` on every row
pub fn price_chart(rows: &[TimeSeriesRow], symbol: &Symbol) -> ChartSlot {
    let kind = ChartKind::Price;
    let Some(points) = collect_all(rows, |r| Some((r.date.clone()?, r.close?))) else {
        return ChartSlot::absent(kind);
    };
    let (x, y): (Vec<_>, Vec<_>) = points.into_iter().unzip();

    ChartSlot::Ready(ChartConfig {
        kind,
        data: vec![Trace::Scatter(LineTrace {
            x,
            y,
            mode: "lines+markers",
            name: "Closing Price".to_string(),
            marker: Some(Marker {
                color: theme::ACCENT,
            }),
            line: None,
            hovertemplate: "<b>Date:</b> %{x}<br><b>Close:</b> %{y:.2f}<br><extra></extra>"
                .to_string(),
        })],
        layout: Layout {
            title: kind.title(symbol),
            xaxis: Axis::titled(DATE_AXIS),
            yaxis: Axis::titled(PRICE_AXIS),
            legend: None,
        },
    })
}

/// OHLC candlesticks; needs `Date`, `Open`, `High`, `Low`, `Close` on every row
pub fn candlestick_chart(rows: &[TimeSeriesRow], symbol: &Symbol) -> ChartSlot {
    let kind = ChartKind::Candlestick;
    let Some(candles) = collect_all(rows, |r| {
        Some((r.date.clone()?, r.open?, r.high?, r.low?, r.close?))
    }) else {
        return ChartSlot::absent(kind);
    };

    let mut x = Vec::with_capacity(candles.len());
    let mut open = Vec::with_capacity(candles.len());
    let mut high = Vec::with_capacity(candles.len());
    let mut low = Vec::with_capacity(candles.len());
    let mut close = Vec::with_capacity(candles.len());
    for (date, o, h, l, c) in candles {
        x.push(date);
        open.push(o);
        high.push(h);
        low.push(l);
        close.push(c);
    }

    ChartSlot::Ready(ChartConfig {
        kind,
        data: vec![Trace::Candlestick(CandlestickTrace {
            x,
            open,
            high,
            low,
            close,
            name: format!("{symbol} Candlestick"),
            increasing: CandleDirection {
                line: LineStyle {
                    color: theme::SUCCESS,
                },
            },
            decreasing: CandleDirection {
                line: LineStyle {
                    color: theme::SECONDARY,
                },
            },
            hoverlabel: HoverLabel {
                bgcolor: theme::BACKGROUND_DARK,
                bordercolor: theme::BORDER,
                font: Font {
                    color: theme::TEXT_LIGHT,
                },
            },
            hovertemplate: "<b>Date:</b> %{x}<br><b>Open:</b> %{open:.2f}<br>\
                            <b>High:</b> %{high:.2f}<br><b>Low:</b> %{low:.2f}<br>\
                            <b>Close:</b> %{close:.2f}<br><extra></extra>"
                .to_string(),
        })],
        layout: Layout {
            title: kind.title(symbol),
            xaxis: Axis {
                title: DATE_AXIS,
                rangeslider: Some(RangeSlider { visible: false }),
            },
            yaxis: Axis::titled(PRICE_AXIS),
            legend: None,
        },
    })
}

/// Close, SMA 20 and EMA 20 over the rows where both averages exist
pub fn moving_averages_chart(rows: &[TimeSeriesRow], symbol: &Symbol) -> ChartSlot {
    let kind = ChartKind::MovingAverages;
    let with_averages: Vec<&TimeSeriesRow> =
        rows.iter().filter(|r| r.has_moving_averages()).collect();

    let Some(points) = collect_all(with_averages, |r| {
        Some((r.date.clone()?, r.close?, r.sma20?, r.ema20?))
    }) else {
        return ChartSlot::absent(kind);
    };

    let mut dates = Vec::with_capacity(points.len());
    let mut closes = Vec::with_capacity(points.len());
    let mut sma = Vec::with_capacity(points.len());
    let mut ema = Vec::with_capacity(points.len());
    for (date, c, s, e) in points {
        dates.push(date);
        closes.push(c);
        sma.push(s);
        ema.push(e);
    }

    let line = |name: &str, y: Vec<f64>, color: &'static str| {
        Trace::Scatter(LineTrace {
            x: dates.clone(),
            y,
            mode: "lines",
            name: name.to_string(),
            marker: None,
            line: Some(LineStyle { color }),
            hovertemplate: format!("<b>Date:</b> %{{x}}<br><b>{name}:</b> %{{y:.2f}}<extra></extra>"),
        })
    };

    ChartSlot::Ready(ChartConfig {
        kind,
        data: vec![
            line("Close", closes, theme::TEXT_MEDIUM),
            line("SMA 20", sma, theme::PRIMARY),
            line("EMA 20", ema, theme::ACCENT),
        ],
        layout: Layout {
            title: kind.title(symbol),
            xaxis: Axis::titled(DATE_AXIS),
            yaxis: Axis::titled(PRICE_AXIS),
            legend: Some(Legend::horizontal_top()),
        },
    })
}

/// Volume bars; needs `Date` and `Volume` on every row
pub fn volume_chart(rows: &[TimeSeriesRow], symbol: &Symbol) -> ChartSlot {
    let kind = ChartKind::Volume;
    let Some(points) = collect_all(rows, |r| Some((r.date.clone()?, r.volume?))) else {
        return ChartSlot::absent(kind);
    };
    let (x, y): (Vec<_>, Vec<_>) = points.into_iter().unzip();

    ChartSlot::Ready(ChartConfig {
        kind,
        data: vec![Trace::Bar(BarTrace {
            x,
            y,
            name: "Volume".to_string(),
            marker: Marker {
                color: theme::SECONDARY,
            },
            hovertemplate: "<b>Date:</b> %{x}<br><b>Volume:</b> %{y:,}<extra></extra>".to_string(),
        })],
        layout: Layout {
            title: kind.title(symbol),
            xaxis: Axis::titled(DATE_AXIS),
            yaxis: Axis::titled("Volume"),
            legend: None,
        },
    })
}

/// Extract a value from every row; `None` if the input is empty or any row lacks it
fn collect_all<'a, I, T, F>(rows: I, extract: F) -> Option<Vec<T>>
where
    I: IntoIterator<Item = &'a TimeSeriesRow>,
    F: Fn(&TimeSeriesRow) -> Option<T>,
{
    let values: Vec<T> = rows.into_iter().map(extract).collect::<Option<_>>()?;
    (!values.is_empty()).then_some(values)
}

/// All four charts for one series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSet {
    pub price: ChartSlot,
    pub candlestick: ChartSlot,
    pub moving_averages: ChartSlot,
    pub volume: ChartSlot,
}

impl ChartSet {
    pub fn generate(rows: &[TimeSeriesRow], symbol: &Symbol) -> Self {
        Self {
            price: price_chart(rows, symbol),
            candlestick: candlestick_chart(rows, symbol),
            moving_averages: moving_averages_chart(rows, symbol),
            volume: volume_chart(rows, symbol),
        }
    }

    /// Every slot in display order
    pub fn slots(&self) -> [&ChartSlot; 4] {
        [
            &self.price,
            &self.candlestick,
            &self.moving_averages,
            &self.volume,
        ]
    }

    pub fn ready_count(&self) -> usize {
        self.slots().iter().filter(|slot| slot.is_ready()).count()
    }
}
