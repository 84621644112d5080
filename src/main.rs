use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use panecast::app::{self, Outcome, Plan};
use panecast::config::{Config, Settings};
use panecast::tmux::TmuxClient;
use panecast_core::RecordingHost;

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Config::parse_args();

    // Setup logging
    setup_logging(cli.debug);

    // Load settings
    let mut settings = Settings::load(cli.config.as_ref())?;
    settings.merge_cli(&cli);
    settings.validate()?;

    let base_dir = settings.resolve_base_dir()?;
    tracing::debug!(base_dir = %base_dir.display(), "Resolved base directory");

    if cli.dry_run {
        let host = RecordingHost::new();
        let outcome = app::launch(&host, &settings, &base_dir)?;
        let calls = host.calls();
        let plan = Plan {
            calls: &calls,
            layout: match outcome {
                Outcome::Launched(ref layout) => Some(layout),
                Outcome::NoWindow => None,
            },
        };
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&plan)?);
        } else {
            println!("{}", plan.render());
        }
        return Ok(());
    }

    let outcome = app::launch(TmuxClient::new(), &settings, &base_dir)?;
    if let Some(report) = outcome.report(cli.json)? {
        println!("{}", report);
    }

    Ok(())
}

fn setup_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("panecast=debug,panecast_core=debug")
    } else {
        EnvFilter::new("panecast=info,panecast_core=info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}
