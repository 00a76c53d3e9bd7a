//! Symbol autocomplete over static ticker pools

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Delay between losing focus and hiding the list, so a click on a
/// suggestion still lands
pub const BLUR_GRACE: Duration = Duration::from_millis(100);

/// Common equity tickers
pub const STOCK_TICKERS: &[&str] = &[
    "AAPL", "MSFT", "GOOG", "AMZN", "TSLA", "NVDA", "FB", "META", // tech
    "BRK-B", "JPM", "V", "MA", "BAC", "WFC", // finance
    "JNJ", "UNH", "PFE", "ABBV", "MRK", // healthcare
    "XOM", "CVX", "SHEL", "BHP", // energy
    "WMT", "HD", "PG", "KO", "PEP", // consumer
    "BABA", "TCEHY", "TM", "SONY", // international
    "NFLX", "ADBE", "CRM", "INTC", "AMD", "QCOM", // more tech
    "VZ", "T", "TMUS", // telecom
];

/// Common crypto pairs quoted in USD
pub const CRYPTO_TICKERS: &[&str] = &[
    "BTC-USD", "ETH-USD", "DOGE-USD", "XRP-USD", "ADA-USD", "SOL-USD", "DOT-USD", "LTC-USD",
    "BCH-USD", "LINK-USD", "XLM-USD", "TRX-USD", "VET-USD", "ETC-USD", "FIL-USD",
];

/// Which static pool to draw suggestions from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionPool {
    #[default]
    Stocks,
    Crypto,
}

impl SuggestionPool {
    pub fn tickers(self) -> &'static [&'static str] {
        match self {
            Self::Stocks => STOCK_TICKERS,
            Self::Crypto => CRYPTO_TICKERS,
        }
    }
}

/// Every pool entry starting with `prefix`, in pool order. Empty prefix matches nothing.
pub fn suggest<'a>(prefix: &str, pool: &[&'a str]) -> Vec<&'a str> {
    if prefix.is_empty() {
        return Vec::new();
    }
    pool.iter()
        .copied()
        .filter(|candidate| candidate.starts_with(prefix))
        .collect()
}

/// Input-box state for symbol autocomplete.
///
/// Time is passed in explicitly so the deferred hide after a blur can be
/// driven by any clock.
#[derive(Debug, Clone)]
pub struct SuggestionBox {
    pool: SuggestionPool,
    input: String,
    suggestions: Vec<&'static str>,
    visible: bool,
    hide_at: Option<Instant>,
}

impl SuggestionBox {
    pub fn new(pool: SuggestionPool) -> Self {
        Self {
            pool,
            input: String::new(),
            suggestions: Vec::new(),
            visible: false,
            hide_at: None,
        }
    }

    /// Current (upper-cased) input text
    pub fn value(&self) -> &str {
        &self.input
    }

    /// Suggestions currently on screen
    pub fn visible_suggestions(&self) -> &[&'static str] {
        if self.visible { &self.suggestions } else { &[] }
    }

    pub fn is_open(&self) -> bool {
        self.visible && !self.suggestions.is_empty()
    }

    /// The user typed; recompute matches
    pub fn input(&mut self, text: &str) {
        self.input = text.to_uppercase();
        self.suggestions = suggest(&self.input, self.pool.tickers());
        self.visible = !self.suggestions.is_empty();
    }

    /// Pick a visible suggestion: it replaces the input and closes the list.
    ///
    /// Returns `false` (and changes nothing) when `choice` is not on screen.
    /// Selection never starts an analysis by itself.
    pub fn select(&mut self, choice: &str) -> bool {
        if !self.visible_suggestions().iter().any(|s| *s == choice) {
            return false;
        }
        self.input = choice.to_string();
        self.suggestions.clear();
        self.visible = false;
        self.hide_at = None;
        true
    }

    /// Focus left the input; schedule the list to hide after the grace window
    pub fn blur(&mut self, now: Instant) {
        if self.visible {
            self.hide_at = Some(now + BLUR_GRACE);
        }
    }

    /// Focus returned; cancel a pending hide and reopen if there are matches
    pub fn focus(&mut self) {
        self.hide_at = None;
        if !self.input.is_empty() && !self.suggestions.is_empty() {
            self.visible = true;
        }
    }

    /// Apply a pending hide whose deadline has passed
    pub fn poll(&mut self, now: Instant) {
        if self.hide_at.is_some_and(|deadline| now >= deadline) {
            self.visible = false;
            self.hide_at = None;
        }
    }
}

impl Default for SuggestionBox {
    fn default() -> Self {
        Self::new(SuggestionPool::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_in_pool_order() {
        assert_eq!(suggest("AA", &["AAPL", "AMZN", "AA"]), vec!["AAPL", "AA"]);
        assert_eq!(suggest("T", STOCK_TICKERS), vec!["TSLA", "TCEHY", "TM", "T", "TMUS"]);
    }

    #[test]
    fn test_empty_prefix_matches_nothing() {
        assert!(suggest("", STOCK_TICKERS).is_empty());
        assert!(suggest("ZZZ", CRYPTO_TICKERS).is_empty());
    }

    #[test]
    fn test_box_uppercases_input() {
        let mut suggestions = SuggestionBox::new(SuggestionPool::Crypto);
        suggestions.input("do");
        assert_eq!(suggestions.value(), "DO");
        assert_eq!(suggestions.visible_suggestions(), ["DOGE-USD", "DOT-USD"]);
        assert!(suggestions.is_open());
    }

    #[test]
    fn test_select_replaces_input_and_closes() {
        let mut suggestions = SuggestionBox::default();
        suggestions.input("ms");

        assert!(suggestions.select("MSFT"));
        assert_eq!(suggestions.value(), "MSFT");
        assert!(suggestions.visible_suggestions().is_empty());
        assert!(!suggestions.is_open());
    }

    #[test]
    fn test_select_unknown_is_ignored() {
        let mut suggestions = SuggestionBox::default();
        suggestions.input("ms");
        assert!(!suggestions.select("AAPL"));
        assert_eq!(suggestions.value(), "MS");
    }

    #[test]
    fn test_selection_inside_grace_window_wins() {
        let start = Instant::now();
        let mut suggestions = SuggestionBox::default();
        suggestions.input("NV");

        suggestions.blur(start);
        suggestions.poll(start + Duration::from_millis(40));
        assert!(suggestions.is_open());

        assert!(suggestions.select("NVDA"));
        assert_eq!(suggestions.value(), "NVDA");
    }

    #[test]
    fn test_list_hides_after_grace_window() {
        let start = Instant::now();
        let mut suggestions = SuggestionBox::default();
        suggestions.input("NV");

        suggestions.blur(start);
        suggestions.poll(start + BLUR_GRACE);
        assert!(!suggestions.is_open());
        assert!(!suggestions.select("NVDA"));
    }

    #[test]
    fn test_focus_cancels_pending_hide() {
        let start = Instant::now();
        let mut suggestions = SuggestionBox::default();
        suggestions.input("AM");

        suggestions.blur(start);
        suggestions.focus();
        suggestions.poll(start + Duration::from_secs(1));
        assert!(suggestions.is_open());
    }
}
