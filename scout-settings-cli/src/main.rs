use clap::{Parser, Subcommand};
use scout_settings::types::load_settings_file;
use scout_settings::{ReconcilerConfig, SettingsReconciler};
use scout_settings_algolia::config::CONFIG_FILE;
use scout_settings_algolia::{AlgoliaClient, AlgoliaConfig};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "scout-settings", version, about = "Inspect and reconcile search index settings")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Directory holding algolia.json and scout-settings.json
    #[arg(long, env = "SCOUT_SETTINGS_CONFIG_DIR", default_value = ".")]
    config_dir: PathBuf,

    #[arg(long, env = "ALGOLIA_APP_ID")]
    app_id: Option<String>,

    #[arg(long, env = "ALGOLIA_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Talk to an Algolia-compatible server instead of algolia.net
    #[arg(long, env = "ALGOLIA_BASE_URL")]
    base_url: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the settings a freshly created index gets
    Defaults,
    /// Print the settings of an index
    Show {
        index: String,
        /// Only print settings that differ from the defaults
        #[arg(long)]
        changed: bool,
    },
    /// List settings that differ from the defaults
    Diff { index: String },
    /// Overlay the settings in a JSON file onto an index and save them
    Apply { index: String, file: PathBuf },
}

/// algolia.json when present, else env; credential and URL flags win over both.
fn resolve_algolia_config(cli: &Cli) -> scout_settings::Result<AlgoliaConfig> {
    let has_file = cli.config_dir.join(CONFIG_FILE).exists();
    let mut config = match (&cli.app_id, &cli.api_key) {
        (Some(app_id), Some(api_key)) if !has_file => {
            AlgoliaConfig::new(app_id.clone(), api_key.clone())
        }
        _ => AlgoliaConfig::load(&cli.config_dir)?,
    };
    if let Some(app_id) = &cli.app_id {
        config.app_id = app_id.clone();
    }
    if let Some(api_key) = &cli.api_key {
        config.api_key = api_key.clone();
    }
    if let Some(base_url) = &cli.base_url {
        config.base_url = Some(base_url.clone());
    }
    config.validate()?;
    Ok(config)
}

fn print_json(value: &impl serde::Serialize) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let algolia = resolve_algolia_config(&cli)?;
    let reconciler_config = ReconcilerConfig::load_or_default(&cli.config_dir);
    let client = AlgoliaClient::new(algolia)?;
    tracing::debug!(
        "app_id={} base_url={} defaults_index={}",
        client.app_id(),
        client.base_url(),
        reconciler_config.defaults_index
    );
    let reconciler = SettingsReconciler::with_config(client, reconciler_config);

    match cli.command {
        Command::Defaults => print_json(reconciler.defaults().await?),
        Command::Show { index, changed } => {
            let settings = reconciler.find(&reconciler.index(&index)).await?;
            if changed {
                print_json(&settings.changed())
            } else {
                print_json(&settings.compiled())
            }
        }
        Command::Diff { index } => {
            let settings = reconciler.find(&reconciler.index(&index)).await?;
            let diff = settings.diff();
            if diff.is_empty() {
                eprintln!("{}: all settings are at their defaults", index);
            }
            for change in diff {
                let default = change
                    .default
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| "(none)".to_string());
                println!("{}: {} -> {}", change.key, default, change.current);
            }
            Ok(())
        }
        Command::Apply { index, file } => {
            let desired = load_settings_file(&file)?;
            let handle = reconciler.index(&index);
            let settings = reconciler.sync(&handle, desired).await?;
            eprintln!(
                "{}: {} setting(s) differ from defaults",
                index,
                settings.changed().len()
            );
            Ok(())
        }
    }
}
