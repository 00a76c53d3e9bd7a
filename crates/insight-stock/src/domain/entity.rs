//! Descriptive metadata about an instrument and its info-card formatting

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Kind of instrument, selects which info card is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstrumentClass {
    #[default]
    Equity,
    Crypto,
}

/// Sparse attribute map returned by the backend.
///
/// Any attribute may be missing; missing means unknown. The accessors only
/// return a value when the key is present with the expected JSON type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityInfo(Map<String, Value>);

impl EntityInfo {
    pub fn new(attributes: Map<String, Value>) -> Self {
        Self(attributes)
    }

    /// Raw attribute lookup
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    /// Non-empty string attribute
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
    }

    /// Numeric attribute
    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_f64)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn symbol(&self) -> Option<&str> {
        self.text("symbol")
    }

    pub fn short_name(&self) -> Option<&str> {
        self.text("shortName")
    }

    pub fn long_name(&self) -> Option<&str> {
        self.text("longName")
    }

    pub fn sector(&self) -> Option<&str> {
        self.text("sector")
    }

    pub fn industry(&self) -> Option<&str> {
        self.text("industry")
    }

    pub fn country(&self) -> Option<&str> {
        self.text("country")
    }

    pub fn website(&self) -> Option<&str> {
        self.text("website")
    }

    pub fn exchange(&self) -> Option<&str> {
        self.text("exchange")
    }

    pub fn quote_type(&self) -> Option<&str> {
        self.text("quoteType")
    }

    pub fn full_time_employees(&self) -> Option<f64> {
        self.number("fullTimeEmployees")
    }

    pub fn market_cap(&self) -> Option<f64> {
        self.number("marketCap")
    }

    pub fn circulating_supply(&self) -> Option<f64> {
        self.number("circulatingSupply")
    }

    pub fn volume_24h(&self) -> Option<f64> {
        self.number("volume24Hr")
    }

    pub fn regular_market_price(&self) -> Option<f64> {
        self.number("regularMarketPrice")
    }

    pub fn fifty_two_week_high(&self) -> Option<f64> {
        self.number("fiftyTwoWeekHigh")
    }

    pub fn fifty_two_week_low(&self) -> Option<f64> {
        self.number("fiftyTwoWeekLow")
    }

    /// Card heading: short name, then long name, then (crypto only) symbol
    pub fn display_name(&self, class: InstrumentClass) -> &str {
        let fallback = match class {
            InstrumentClass::Equity => None,
            InstrumentClass::Crypto => self.symbol(),
        };
        self.short_name()
            .or_else(|| self.long_name())
            .or(fallback)
            .unwrap_or(match class {
                InstrumentClass::Equity => "Unknown company",
                InstrumentClass::Crypto => "Unknown cryptocurrency",
            })
    }

    /// Secondary heading line, when it adds something to `display_name`
    pub fn subtitle(&self, class: InstrumentClass) -> Option<&str> {
        let short = self.short_name();
        match class {
            InstrumentClass::Equity => self.long_name().filter(|long| Some(*long) != short),
            InstrumentClass::Crypto => {
                let symbol = self.symbol();
                let long = self.long_name();
                if symbol == short || long == short {
                    return None;
                }
                symbol.or(long)
            }
        }
    }

    /// Labelled detail rows for the info card; missing attributes are omitted
    pub fn card_rows(&self, class: InstrumentClass) -> Vec<(&'static str, String)> {
        let mut rows = Vec::new();

        match class {
            InstrumentClass::Equity => {
                push_text(&mut rows, "Sector", self.sector());
                push_text(&mut rows, "Industry", self.industry());
                push_text(&mut rows, "Country", self.country());
                if let Some(employees) = self.full_time_employees() {
                    rows.push(("Employees", format_count(employees)));
                }
                if let Some(cap) = self.market_cap() {
                    rows.push(("Market Cap", format_large_currency(cap)));
                }
                if let Some(site) = self.website() {
                    rows.push(("Website", strip_url_scheme(site).to_string()));
                }
            }
            InstrumentClass::Crypto => {
                push_text(&mut rows, "Exchange", self.exchange());
                push_text(&mut rows, "Type", self.quote_type());
                if let Some(price) = self.regular_market_price() {
                    rows.push(("Price", format_currency(price)));
                }
                if let Some(cap) = self.market_cap() {
                    rows.push(("Market Cap", format_large_currency(cap)));
                }
                if let Some(supply) = self.circulating_supply() {
                    rows.push(("Circulating Supply", format_count(supply)));
                }
                if let Some(volume) = self.volume_24h() {
                    rows.push(("Volume 24h", format_large_currency(volume)));
                }
                if let Some(high) = self.fifty_two_week_high() {
                    rows.push(("52 Week High", format_currency(high)));
                }
                if let Some(low) = self.fifty_two_week_low() {
                    rows.push(("52 Week Low", format_currency(low)));
                }
            }
        }

        rows
    }
}

impl From<Map<String, Value>> for EntityInfo {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// `$1.23T`, `$4.56B`, `$7.89M`, else `$12.34`
pub fn format_large_currency(value: f64) -> String {
    if value >= 1e12 {
        format!("${:.2}T", value / 1e12)
    } else if value >= 1e9 {
        format!("${:.2}B", value / 1e9)
    } else if value >= 1e6 {
        format!("${:.2}M", value / 1e6)
    } else {
        format_currency(value)
    }
}

pub fn format_currency(value: f64) -> String {
    format!("${value:.2}")
}

/// Whole number with thousands separators, `164,000`
pub fn format_count(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0.0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn push_text(rows: &mut Vec<(&'static str, String)>, label: &'static str, value: Option<&str>) {
    if let Some(value) = value {
        rows.push((label, value.to_string()));
    }
}

fn strip_url_scheme(url: &str) -> &str {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    rest.strip_prefix("www.").unwrap_or(rest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn info(value: Value) -> EntityInfo {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_large_currency_tiers() {
        assert_eq!(format_large_currency(2.5e12), "$2.50T");
        assert_eq!(format_large_currency(3.456e9), "$3.46B");
        assert_eq!(format_large_currency(7_200_000.0), "$7.20M");
        assert_eq!(format_large_currency(999.0), "$999.00");
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(164_000.0), "164,000");
        assert_eq!(format_count(999.0), "999");
        assert_eq!(format_count(1_234_567.4), "1,234,567");
        assert_eq!(format_count(0.0), "0");
    }

    #[test]
    fn test_accessors_ignore_null_and_wrong_types() {
        let info = info(json!({
            "shortName": "Apple Inc.",
            "sector": null,
            "marketCap": "lots",
            "fullTimeEmployees": 164000
        }));

        assert_eq!(info.short_name(), Some("Apple Inc."));
        assert_eq!(info.sector(), None);
        assert_eq!(info.market_cap(), None);
        assert_eq!(info.full_time_employees(), Some(164_000.0));
    }

    #[test]
    fn test_display_name_fallbacks() {
        let empty = EntityInfo::default();
        assert_eq!(empty.display_name(InstrumentClass::Equity), "Unknown company");

        let crypto = info(json!({"symbol": "BTC-USD"}));
        assert_eq!(crypto.display_name(InstrumentClass::Crypto), "BTC-USD");
        assert_eq!(crypto.display_name(InstrumentClass::Equity), "Unknown company");

        let named = info(json!({"longName": "Microsoft Corporation"}));
        assert_eq!(named.display_name(InstrumentClass::Equity), "Microsoft Corporation");
    }

    #[test]
    fn test_subtitle() {
        let equity = info(json!({"shortName": "Apple", "longName": "Apple Inc."}));
        assert_eq!(equity.subtitle(InstrumentClass::Equity), Some("Apple Inc."));

        let same = info(json!({"shortName": "Apple", "longName": "Apple"}));
        assert_eq!(same.subtitle(InstrumentClass::Equity), None);
    }

    #[test]
    fn test_equity_card_rows() {
        let info = info(json!({
            "sector": "Technology",
            "country": "United States",
            "fullTimeEmployees": 221000,
            "marketCap": 3.1e12,
            "website": "https://www.microsoft.com"
        }));

        let rows = info.card_rows(InstrumentClass::Equity);
        assert_eq!(
            rows,
            vec![
                ("Sector", "Technology".to_string()),
                ("Country", "United States".to_string()),
                ("Employees", "221,000".to_string()),
                ("Market Cap", "$3.10T".to_string()),
                ("Website", "microsoft.com".to_string()),
            ]
        );
    }

    #[test]
    fn test_crypto_card_rows() {
        let info = info(json!({
            "regularMarketPrice": 64250.5,
            "circulatingSupply": 19700000,
            "volume24Hr": 2.8e10,
            "sector": "ignored for crypto"
        }));

        let rows = info.card_rows(InstrumentClass::Crypto);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], ("Price", "$64250.50".to_string()));
        assert_eq!(rows[1], ("Circulating Supply", "19,700,000".to_string()));
        assert_eq!(rows[2], ("Volume 24h", "$28.00B".to_string()));
    }
}
