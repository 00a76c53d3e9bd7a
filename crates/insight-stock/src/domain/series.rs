use serde::{Deserialize, Serialize};

/// One trading period of the historical series.
///
/// Every field is optional: the backend emits `null` (or omits the key) for
/// values it could not compute, e.g. `SMA_20` during the first 19 periods.
/// Unknown keys such as `Dividends` are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesRow {
    #[serde(rename = "Date", default)]
    pub date: Option<String>,
    #[serde(rename = "Open", default)]
    pub open: Option<f64>,
    #[serde(rename = "High", default)]
    pub high: Option<f64>,
    #[serde(rename = "Low", default)]
    pub low: Option<f64>,
    #[serde(rename = "Close", default)]
    pub close: Option<f64>,
    #[serde(rename = "Volume", default)]
    pub volume: Option<f64>,
    #[serde(rename = "SMA_20", default)]
    pub sma20: Option<f64>,
    #[serde(rename = "EMA_20", default)]
    pub ema20: Option<f64>,
}

impl TimeSeriesRow {
    /// Row with only date and close set
    pub fn with_close(date: impl Into<String>, close: f64) -> Self {
        Self {
            date: Some(date.into()),
            close: Some(close),
            ..Self::default()
        }
    }

    /// Both moving averages are present
    pub fn has_moving_averages(&self) -> bool {
        self.sma20.is_some() && self.ema20.is_some()
    }
}

/// Ordered historical series, oldest first as delivered by the backend
pub type TimeSeries = Vec<TimeSeriesRow>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_wire_row() {
        let row: TimeSeriesRow = serde_json::from_str(
            r#"{"Date":"2024-05-01","Open":1.5,"High":2,"Low":1,"Close":1.75,
                "Volume":120000,"SMA_20":null,"EMA_20":1.6,"Dividends":0.0}"#,
        )
        .unwrap();

        assert_eq!(row.date.as_deref(), Some("2024-05-01"));
        assert_eq!(row.high, Some(2.0));
        assert_eq!(row.volume, Some(120_000.0));
        assert_eq!(row.sma20, None);
        assert_eq!(row.ema20, Some(1.6));
        assert!(!row.has_moving_averages());
    }

    #[test]
    fn test_missing_keys_become_none() {
        let row: TimeSeriesRow = serde_json::from_str(r#"{"Close":10}"#).unwrap();
        assert_eq!(row.close, Some(10.0));
        assert!(row.date.is_none());
        assert!(row.volume.is_none());
    }

    #[test]
    fn test_serializes_wire_keys() {
        let json = serde_json::to_value(TimeSeriesRow::with_close("2024-01-02", 3.0)).unwrap();
        assert_eq!(json["Date"], "2024-01-02");
        assert_eq!(json["Close"], 3.0);
        assert!(json["SMA_20"].is_null());
    }
}
