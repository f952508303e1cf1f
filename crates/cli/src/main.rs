use {
    clap::{Parser, Subcommand},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "signalrt", about = "Signal chat-bot runtime")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Custom config file (overrides the default `signalrt.toml` discovery).
    #[arg(long, global = true, env = "SIGNALRT_CONFIG_FILE")]
    config_file: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Dead-letter queue inspection.
    Dlq {
        #[command(subcommand)]
        action: DlqAction,
    },
    /// Start the listener + worker pool bot runtime.
    Run,
}

#[derive(Subcommand)]
enum DlqAction {
    /// Print all DLQ entries as indented JSON.
    Inspect,
}

fn init_telemetry(log_level: &str, json_logs: bool) {
    let env_filter =
        EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);
    if json_logs {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_telemetry(&cli.log_level, cli.json_logs);

    let config = match &cli.config_file {
        Some(path) => signalrt_config::load_config(path)?,
        None => signalrt_config::discover_and_load(),
    };

    match cli.command {
        Commands::Dlq { action } => match action {
            DlqAction::Inspect => dlq_inspect(&config).await?,
        },
        Commands::Run => run(config).await?,
    }

    Ok(())
}

async fn dlq_inspect(config: &signalrt_config::SignalrtConfig) -> anyhow::Result<()> {
    let dlq = build_dlq(config).await?;
    let entries = dlq.inspect().await?;
    println!("{}", serde_json::to_string_pretty(&entries)?);
    Ok(())
}

async fn build_dlq(
    config: &signalrt_config::SignalrtConfig,
) -> anyhow::Result<Box<dyn signalrt_dlq::DeadLetterQueue>> {
    use signalrt_config::StorageType;

    match config.storage.kind {
        StorageType::Sqlite => {
            let dlq = signalrt_dlq::SqliteDlq::connect(&config.storage.sqlite_db).await?;
            Ok(Box::new(dlq))
        },
        StorageType::InMemory | StorageType::Redis => {
            Ok(Box::new(signalrt_dlq::MemoryDlq::new()))
        },
    }
}

async fn run(config: signalrt_config::SignalrtConfig) -> anyhow::Result<()> {
    tracing::info!(phone_number = %config.phone_number, "starting signalrt bot runtime");
    signalrt_gateway::bootstrap(config).await
}
