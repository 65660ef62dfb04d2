use anyhow::Result;
use clap::{Parser, Subcommand};
use fallwatch_classifier::{ArtifactClassifier, Classifier};
use fallwatch_config::AppConfig;
use fallwatch_imu::{HttpSensorSource, MockSensorSource, OrientationFilter, SensorSource};
use fallwatch_pipeline::label::ALERT_MARKER;
use fallwatch_pipeline::{fixed_prediction, PollingPipeline, PredictionResponse};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "fallwatch", about = "Wearable IMU fall detection service")]
struct Cli {
    /// Config file (defaults to the per-user config directory).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Use a simulated sensor at rest instead of the device.
    #[arg(long, global = true)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Poll continuously and print every prediction (default).
    Run,
    /// Poll once and print the prediction.
    Once,
    /// Print the fixed contract-test prediction.
    Fixed,
    /// Write the default config file.
    InitConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "fallwatch=info,fallwatch_imu=info,fallwatch_classifier=info,fallwatch_pipeline=info"
                    .into()
            }),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Run);

    match command {
        Command::Fixed => print(&fixed_prediction()),
        Command::InitConfig => {
            let config = AppConfig::default();
            match &cli.config {
                Some(path) => fallwatch_config::save_config_to(&config, path),
                None => fallwatch_config::save_config(&config),
            }
        }
        Command::Once => {
            let pipeline = build_pipeline(&load_config(cli.config.as_deref()), cli.mock);
            print(&pipeline.get_prediction().await)
        }
        Command::Run => {
            let config = load_config(cli.config.as_deref());
            let pipeline = build_pipeline(&config, cli.mock);
            run(&pipeline, &config).await
        }
    }
}

fn load_config(path: Option<&std::path::Path>) -> AppConfig {
    let loaded = match path {
        Some(path) => fallwatch_config::load_config_from(path),
        None => fallwatch_config::load_config(),
    };
    loaded.unwrap_or_else(|e| {
        warn!(?e, "Failed to load config, using defaults");
        AppConfig::default()
    })
}

fn build_pipeline(config: &AppConfig, mock: bool) -> PollingPipeline {
    let source: Box<dyn SensorSource> = if mock {
        info!("Using mock sensor (device at rest)");
        Box::new(MockSensorSource::at_rest())
    } else {
        match HttpSensorSource::new(&config.sensor.base_url, config.sensor.fetch_timeout()) {
            Ok(source) => Box::new(source),
            Err(e) => {
                warn!(?e, "Sensor client unavailable, using mock (device at rest)");
                Box::new(MockSensorSource::at_rest())
            }
        }
    };

    // Missing artifacts only narrow what we can do; keep serving.
    let classifier: Option<Arc<dyn Classifier>> = match ArtifactClassifier::load(
        &config.classifier.model_path,
        &config.classifier.scaler_path,
    ) {
        Ok(classifier) => Some(Arc::new(classifier)),
        Err(e) => {
            warn!(%e, "Classifier not loaded, serving placeholder labels");
            None
        }
    };

    let filter = OrientationFilter::new(config.filter.beta, config.filter.sample_freq);
    info!(
        beta = config.filter.beta,
        sample_freq = config.filter.sample_freq,
        model_loaded = classifier.is_some(),
        "Pipeline ready"
    );

    PollingPipeline::new(source, classifier, filter)
        .with_fetch_timeout(config.sensor.fetch_timeout())
}

async fn run(pipeline: &PollingPipeline, config: &AppConfig) -> Result<()> {
    let mut ticker = tokio::time::interval(config.poll.interval());
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let mut polls: u64 = 0;

    // Raise fall alerts in the log as soon as a prediction lands in the cache.
    let mut updates = pipeline.cache().subscribe();
    let alerts = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let latest = updates.borrow_and_update().clone();
            if latest.label.starts_with(ALERT_MARKER) {
                warn!(label = %latest.label, timestamp = %latest.timestamp, "Fall detected");
            }
        }
    });

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let outcome = pipeline.poll().await;
                polls += 1;
                print(&outcome.to_response())?;
                if polls % 100 == 0 {
                    tracing::debug!(polls, model_loaded = pipeline.model_loaded(), "Poll heartbeat");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                alerts.abort();
                let last = pipeline.current();
                info!(polls, last = %last.prediction, at = %last.timestamp, "Shutting down");
                return Ok(());
            }
        }
    }
}

fn print(response: &PredictionResponse) -> Result<()> {
    println!("{}", serde_json::to_string(response)?);
    Ok(())
}
