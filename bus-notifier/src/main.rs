use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bus_notifier::app;
use bus_notifier::schedule::stop_channel;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,reqwest=warn".into()),
        )
        .init();

    let (stop, signal) = stop_channel();

    let schedule = match app::from_env(stop.clone()) {
        Ok(schedule) => schedule,
        Err(e) => {
            error!(error = %e, "Failed to start");
            return ExitCode::FAILURE;
        }
    };

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Interrupted, stopping after the current cycle");
                stop.stop();
            }
            Err(e) => error!(error = %e, "Failed to listen for Ctrl-C"),
        }
    });

    let report = schedule.run(signal).await;
    info!(
        cycles = report.cycles,
        failed_cycles = report.failed_cycles,
        "Bus notifier stopped"
    );
    ExitCode::SUCCESS
}
