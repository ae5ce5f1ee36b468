use anyhow::Context;
use clap::Parser;
use vax_alert::utils::{logger, validation::Validate};
use vax_alert::{
    AlertConfig, AlertEngine, CliArgs, HttpAvailabilityChecker, RunOutcome, ShutdownSignal,
    SmtpNotifier, WatchSettings,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // 初始化日誌
    if args.json_logs {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting vax-alert");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    let mut config = match AlertConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    args.apply_overrides(&mut config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");
    tracing::debug!("Config: {:?}", config);

    let signal = ShutdownSignal::new();
    let engine = AlertEngine::new(
        HttpAvailabilityChecker::new(config.api.clone()),
        SmtpNotifier::new(config.notification.clone()),
        WatchSettings::from_config(&config),
        signal.clone(),
    );

    if args.dry_run {
        return perform_dry_run(&engine).await;
    }

    let listener = signal.listen_for_interrupt();
    let outcome = engine.run().await;
    listener.abort();

    report(&outcome);

    let exit_code = outcome.exit_code();
    if exit_code != 0 {
        std::process::exit(exit_code);
    }

    Ok(())
}

async fn perform_dry_run(
    engine: &AlertEngine<HttpAvailabilityChecker, SmtpNotifier>,
) -> anyhow::Result<()> {
    tracing::info!("🔍 DRY RUN MODE - one check, no email");

    let matches = engine
        .check_once()
        .await
        .context("availability check failed")?;

    if matches.is_empty() {
        println!("No desired provider currently has availability");
        return Ok(());
    }

    println!("Would send:");
    print!("{}", engine.preview_message(&matches));
    Ok(())
}

fn report(outcome: &RunOutcome) {
    match outcome {
        RunOutcome::Notified { body, .. } => {
            print!("{}", body);
        }
        RunOutcome::NoAvailability {
            attempts,
            last_error,
        } => {
            tracing::info!("Stopped after {} poll attempt(s)", attempts);
            if let Some(err) = last_error {
                tracing::debug!("Last poll error: {}", err);
            }
        }
        RunOutcome::NotificationFailed { last_error, .. } => {
            if let Some(err) = last_error {
                tracing::error!("❌ Notification failed: {}", err);
                eprintln!("❌ {}", err.user_friendly_message());
                eprintln!("💡 {}", err.recovery_suggestion());
            }
        }
        RunOutcome::Aborted(err) => {
            tracing::error!(
                "❌ Aborted: {} (Category: {:?})",
                err,
                err.category()
            );
            eprintln!("❌ {}", err.user_friendly_message());
            eprintln!("💡 {}", err.recovery_suggestion());
        }
        RunOutcome::Cancelled => {}
    }

    println!("{}", outcome.status_line());
}
