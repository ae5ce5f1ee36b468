use crate::config::toml_config::AlertConfig;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "vax-alert")]
#[command(about = "Watch the vaccine availability API and email when a desired provider opens up")]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "vax-alert.toml")]
    pub config: String,

    /// Dump raw API responses, composed emails and per-attempt errors
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Override watch.poll_interval_seconds
    #[arg(long)]
    pub interval: Option<u64>,

    /// Override watch.desired_providers (comma separated provider ids)
    #[arg(long, value_delimiter = ',')]
    pub providers: Vec<i64>,

    /// Check availability once and show what would be sent, without emailing
    #[arg(long)]
    pub dry_run: bool,
}

impl CliArgs {
    /// 套用命令列覆蓋設定
    pub fn apply_overrides(&self, config: &mut AlertConfig) {
        if let Some(interval) = self.interval {
            config.watch.poll_interval_seconds = interval;
            tracing::info!("🔧 Poll interval overridden to: {}s", interval);
        }

        if !self.providers.is_empty() {
            config.watch.desired_providers = self.providers.clone();
            tracing::info!("🔧 Desired providers overridden to: {:?}", self.providers);
        }
    }
}
