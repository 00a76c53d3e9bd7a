//! Command-line interface for symbol-insight

mod cli;
mod render;

use anyhow::Context;
use clap::Parser;
use cli::{AnalyzeArgs, Cli, Command, SettingsAction, SuggestArgs};
use insight_stock::config::parse_base_url;
use insight_stock::{
    AnalysisSession, AnalysisUpdate, AnalysisView, BackendClient, FileStore, InstrumentClass,
    SettingsResolver, StockConfig, SuggestionPool, Symbol, suggest,
};
use insight_utils::Config;
use serde_json::json;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(dir) = &cli.data_dir {
        config = config.with_data_dir(dir);
    }

    insight_utils::init_tracing_for(
        &config,
        if cli.verbose {
            "debug"
        } else {
            insight_utils::logging::DEFAULT_FILTER
        },
    );
    debug!(
        app = %config.app_name,
        environment = %config.environment,
        data_dir = %config.data_dir.display(),
        "Loaded configuration"
    );

    let resolver = SettingsResolver::new(Arc::new(FileStore::new(config.data_dir.clone())));

    match cli.command {
        Command::Analyze(args) => analyze(cli.api_url.as_deref(), resolver, args).await,
        Command::Suggest(args) => {
            run_suggest(&args);
            Ok(ExitCode::SUCCESS)
        }
        Command::Settings { action } => {
            run_settings(&resolver, action)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Models => {
            let selected = resolver.load_settings().selected_model;
            println!("{}", render::models_table(selected));
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn analyze(
    api_url: Option<&str>,
    resolver: SettingsResolver,
    args: AnalyzeArgs,
) -> anyhow::Result<ExitCode> {
    let mut stock_config = StockConfig::default()
        .with_env()
        .context("Invalid backend configuration")?;
    if let Some(raw) = api_url {
        stock_config.api_base_url = parse_base_url(raw)?;
    }
    stock_config.validate()?;
    info!(base_url = %stock_config.api_base_url, "Using analysis backend");

    let client = BackendClient::new(stock_config).context("Failed to build HTTP client")?;
    let mut session = AnalysisSession::new(Arc::new(client), resolver);

    let is_crypto = args.crypto
        || Symbol::parse(&args.symbol).is_ok_and(|symbol| symbol.looks_like_crypto_pair());
    let class = if is_crypto {
        InstrumentClass::Crypto
    } else {
        InstrumentClass::Equity
    };

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut view = AnalysisView::new(class);

    let printer = async {
        while let Some(update) = rx.recv().await {
            if let Some(line) = render::progress_line(&update) {
                eprintln!("{line}");
            }
            let done = matches!(update, AnalysisUpdate::Completed { .. });
            view.apply(update);
            if done {
                break;
            }
        }
    };

    let (outcome, ()) = tokio::join!(session.submit_streaming(&args.symbol, &tx), printer);

    if args.json {
        let document = json!({
            "outcome": outcome,
            "charts": view.charts(),
        });
        println!("{}", serde_json::to_string_pretty(&document)?);
    } else {
        print!("{}", render::report(&view, args.expand));
    }

    Ok(if outcome.is_fatal() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn run_suggest(args: &SuggestArgs) {
    let pool = if args.crypto {
        SuggestionPool::Crypto
    } else {
        SuggestionPool::Stocks
    };
    let prefix = args.prefix.trim().to_uppercase();

    let matches = suggest(&prefix, pool.tickers());
    if matches.is_empty() {
        eprintln!("No tickers match '{prefix}'");
    }
    for ticker in matches {
        println!("{ticker}");
    }
}

fn run_settings(resolver: &SettingsResolver, action: SettingsAction) -> anyhow::Result<()> {
    match action {
        SettingsAction::Show => {
            println!("{}", render::settings_table(&resolver.load_settings()));
        }
        SettingsAction::Set { ai, model } => {
            let mut settings = resolver.load_settings();
            if let Some(toggle) = ai {
                settings.ai_enabled = toggle.enabled();
            }
            if let Some(model) = model {
                settings.selected_model = model;
            }
            resolver
                .save_settings(&settings)
                .context("Failed to save settings")?;
            println!("Settings saved successfully!");
            println!("{}", render::settings_table(&settings));
        }
        SettingsAction::Reset => {
            resolver.reset().context("Failed to reset settings")?;
            println!("Settings reset to defaults.");
        }
    }
    Ok(())
}
