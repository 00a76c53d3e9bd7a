//! Command-line argument definitions
//!
//! | Command | Description |
//! |---------|-------------|
//! | `analyze` | Fetch series, entity info and narrative for a symbol |
//! | `suggest` | List tickers matching a prefix |
//! | `settings` | Show, change or reset the saved analysis settings |
//! | `models` | List the text-generation models |

use clap::{Args, Parser, Subcommand, ValueEnum};
use insight_stock::ModelId;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "insight", version, about = "Symbol analysis from the command line", long_about = None)]
pub struct Cli {
    /// Backend base URL (overrides INSIGHT_API_BASE_URL)
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Directory holding saved settings (overrides INSIGHT_DATA_DIR)
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Analyze a symbol
    Analyze(AnalyzeArgs),
    /// Suggest tickers for a prefix
    Suggest(SuggestArgs),
    /// Manage analysis settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
    /// List available text-generation models
    Models,
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Instrument symbol, e.g. AAPL or BTC-USD
    pub symbol: String,

    /// Render the crypto info card (implied for *-USD pairs)
    #[arg(long)]
    pub crypto: bool,

    /// Print the settled outcome and chart configs as JSON
    #[arg(long)]
    pub json: bool,

    /// Show the full narrative instead of the preview
    #[arg(long)]
    pub expand: bool,
}

#[derive(Debug, Args)]
pub struct SuggestArgs {
    /// Beginning of a ticker
    pub prefix: String,

    /// Search crypto pairs instead of equities
    #[arg(long)]
    pub crypto: bool,
}

#[derive(Debug, Subcommand)]
pub enum SettingsAction {
    /// Print the effective settings
    Show,
    /// Change one or more settings
    Set {
        /// Turn narrative generation on or off
        #[arg(long, value_enum)]
        ai: Option<Toggle>,

        /// Model used for narrative generation
        #[arg(long, value_parser = parse_model)]
        model: Option<ModelId>,
    },
    /// Forget saved settings
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

impl Toggle {
    pub fn enabled(self) -> bool {
        self == Self::On
    }
}

fn parse_model(raw: &str) -> Result<ModelId, String> {
    raw.parse::<ModelId>().map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_analyze() {
        let cli = Cli::try_parse_from(["insight", "analyze", "aapl", "--expand"]).unwrap();
        match cli.command {
            Command::Analyze(args) => {
                assert_eq!(args.symbol, "aapl");
                assert!(args.expand);
                assert!(!args.json);
            }
            other => panic!("Expected analyze, got {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "insight",
            "suggest",
            "BT",
            "--crypto",
            "--api-url",
            "http://10.0.0.2:8000",
            "-v",
        ])
        .unwrap();

        assert!(cli.verbose);
        assert_eq!(cli.api_url.as_deref(), Some("http://10.0.0.2:8000"));
        assert!(matches!(cli.command, Command::Suggest(SuggestArgs { crypto: true, .. })));
    }

    #[test]
    fn test_settings_set() {
        let cli = Cli::try_parse_from([
            "insight",
            "settings",
            "set",
            "--ai",
            "off",
            "--model",
            "llama-3.1-70b-versatile",
        ])
        .unwrap();

        match cli.command {
            Command::Settings {
                action: SettingsAction::Set { ai, model },
            } => {
                assert_eq!(ai, Some(Toggle::Off));
                assert_eq!(model, Some(ModelId::Llama31_70bVersatile));
            }
            other => panic!("Expected settings set, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_model_rejected() {
        let result = Cli::try_parse_from(["insight", "settings", "set", "--model", "gpt-4"]);
        assert!(result.is_err());
    }
}
