// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Wiretap: transparent call interception
//
//  config   print the resolved configuration
//  demo     run the demo billing client through the interceptor
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

mod billing;

use billing::BillingClient;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use wiretap_core::WiretapConfig;
use wiretap_intercept::{Interceptor, call_args};
use wiretap_sinks::build_sink;

/// Time given to the remote sink's flush task after the last entry.
const REMOTE_DRAIN_GRACE: Duration = Duration::from_millis(500);

#[derive(Parser, Debug)]
#[command(name = "wiretap", version, about = "Wiretap: transparent call interception and outcome logging")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "wiretap.yaml", global = true)]
    config: PathBuf,

    /// Log level
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the resolved configuration as YAML.
    Config,
    /// Run the demo billing client with interception enabled.
    Demo {
        /// Amount to charge
        #[arg(long, default_value_t = 100)]
        amount: u64,

        /// Currency of the charge; anything but USD is rejected
        #[arg(long, default_value = "USD")]
        currency: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum LogFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // ── Tracing ──
    init_tracing(&cli.log_level, cli.log_format);

    // ── Config ──
    if cli.config.exists() {
        info!(path = %cli.config.display(), "Loading config file");
    } else {
        info!(path = %cli.config.display(), "No config file found, using defaults");
    }
    let config = WiretapConfig::load(&cli.config)?;

    match cli.command {
        Command::Config => print!("{}", render_config(&config)?),
        Command::Demo { amount, currency } => {
            run_demo(&config, amount, &currency).await?;
            if config.sinks.remote.enabled {
                tokio::time::sleep(REMOTE_DRAIN_GRACE).await;
            }
        }
    }

    Ok(())
}

fn init_tracing(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// Configuration as YAML, with the source-service name resolved.
fn render_config(config: &WiretapConfig) -> anyhow::Result<String> {
    let mut resolved = config.clone();
    resolved.application.name = Some(config.source_service_name().to_string());
    Ok(serde_yaml::to_string(&resolved)?)
}

async fn run_demo(config: &WiretapConfig, amount: u64, currency: &str) -> anyhow::Result<()> {
    let sink = build_sink(&config.sinks)?;
    let interceptor = Interceptor::from_config(config, sink);
    info!(
        source_service = interceptor.source_service(),
        sink = interceptor.sink().name(),
        "Running demo billing client"
    );

    let client = BillingClient::new(interceptor.clone());

    match client.charge(amount, currency) {
        Ok(receipt) => {
            info!(charge_id = %receipt.charge_id, amount = receipt.amount, "Charge accepted");
            let refunded = client.refund(&receipt.charge_id).await?;
            info!(charge_id = %receipt.charge_id, refunded = refunded.is_some(), "Refund finished");
        }
        Err(e) => warn!(error = %e, "Charge rejected"),
    }

    let missing = client.refund("ch_missing").await?;
    info!(refunded = missing.is_some(), "Refund of unknown charge finished");

    client.ping();

    // Same interception without the attribute.
    let fx = interceptor.target("fx");
    let rate = fx.call("quote", call_args!(from = currency, to = "USD"), || {
        if currency == "USD" {
            Ok(1.0)
        } else {
            Err(format!("no quote for {currency}"))
        }
    });
    match rate {
        Ok(rate) => info!(rate, "Quote received"),
        Err(e) => warn!(error = %e, "Quote unavailable"),
    }

    info!("Demo finished");
    Ok(())
}
