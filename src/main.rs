use clap::{Parser, Subcommand};
use picflow::caption::CaptionSource;
use picflow::client::{CommandCaptioner, CommandNotifier, CommandUploader, StemCaptioner};
use picflow::config::{self, PipelineConfig};
use picflow::ledger::PostLedger;
use picflow::notify::notify_all;
use picflow::publish::{PublishOutcome, UploadClient, publish_file, publish_next};
use picflow::{output, pipeline, publish};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Poll cadence of the run loop outside the scheduled minute.
const IDLE_SLEEP: Duration = Duration::from_secs(30);
/// Sleep after a due cycle, long enough to pass the scheduled minute.
const AFTER_SLOT_SLEEP: Duration = Duration::from_secs(60);
/// Pause between a confirmed post and the latest-post-URL lookup.
const POST_SETTLE: Duration = Duration::from_secs(10);

#[derive(Parser)]
#[command(name = "picflow")]
#[command(about = "Automated photo publishing pipeline")]
#[command(long_about = "\
Automated photo publishing pipeline

Your filesystem is the queue. Raw photos land in the input directory and
are watermarked, fitted onto a platform canvas, and named from a generated
caption. Processed candidates wait in the output directory; on the weekly
schedule the first unposted one (sorted by filename) is uploaded and its
path recorded in the append-only ledger.

Directory layout:

  input_images/                # Raw photos (.jpg, .jpeg, .png)
  pics/                        # Processed candidates awaiting publish
  pics.txt                     # One published path per line, append-only
  picflow.toml                 # Config (optional, defaults work)
  fonts/display.ttf            # Watermark face (builtin fallback if absent)

External collaborators (upload, DM, captioning) are configured as commands
in [commands]; without a caption command the filename stem becomes the
caption. Run 'picflow gen-config' for a documented picflow.toml.")]
#[command(version)]
struct Cli {
    /// Config file
    #[arg(long, default_value = "picflow.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Process every raw photo in the input directory
    Process,
    /// Publish the next unposted candidate (or a named one)
    Post {
        /// Candidate filename inside the output directory
        filename: Option<String>,
        /// Caption override replacing the stem-derived caption
        #[arg(long)]
        caption: Option<String>,
    },
    /// Show pending candidates and ledger count
    Status,
    /// Poll forever: process each cycle, publish on the weekly slot
    Run,
    /// Print a stock picflow.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let config = PipelineConfig::load_or_default(&cli.config)?;

    match cli.command {
        Command::Process => {
            let captioner = build_captioner(&config);
            let report = pipeline::process_batch(&config, captioner.as_ref())?;
            output::print_batch_report(&report);
        }
        Command::Post { filename, caption } => {
            let mut uploader = require_uploader(&config)?;
            let ledger = PostLedger::new(&config.ledger_file);
            let outcome = match filename {
                Some(name) => publish_file(
                    &mut uploader,
                    &config.output_dir.join(name),
                    caption.as_deref(),
                    &ledger,
                    &config.publish.hashtags,
                )?,
                None => publish_next(
                    &mut uploader,
                    &config.output_dir,
                    &ledger,
                    &config.publish.hashtags,
                )?,
            };
            output::print_publish_outcome(&outcome);
        }
        Command::Status => {
            let ledger = PostLedger::new(&config.ledger_file);
            let status = publish::queue_status(&config.output_dir, &ledger)?;
            output::print_status(&status);
        }
        Command::Run => {
            let mut uploader = require_uploader(&config)?;
            run_loop(&config, &mut uploader);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// The wall-clock orchestration loop: process every cycle, publish when the
/// weekly slot comes around, DM the recipient list after a confirmed post.
/// Every failure degrades to "try again next cycle".
fn run_loop(config: &PipelineConfig, uploader: &mut dyn UploadClient) {
    let captioner = build_captioner(config);
    let ledger = PostLedger::new(&config.ledger_file);
    tracing::info!(
        slot = %format!(
            "{} {:02}:{:02}",
            config.schedule.weekday_name(),
            config.schedule.hour,
            config.schedule.minute
        ),
        "run loop started"
    );

    loop {
        match pipeline::process_batch(config, captioner.as_ref()) {
            Ok(report) if !report.items.is_empty() => {
                tracing::info!(
                    processed = report.processed(),
                    failed = report.failed(),
                    "processing cycle done"
                );
            }
            Ok(_) => {}
            Err(e) => tracing::error!(error = %e, "processing cycle failed"),
        }

        let now = chrono::Local::now();
        if config.schedule.due(&now) {
            tracing::info!("scheduled slot reached, publishing");
            match publish_next(
                uploader,
                &config.output_dir,
                &ledger,
                &config.publish.hashtags,
            ) {
                Ok(outcome @ PublishOutcome::Posted { .. }) => {
                    for line in output::format_publish_outcome(&outcome) {
                        tracing::info!("{line}");
                    }
                    std::thread::sleep(POST_SETTLE);
                    announce(config, uploader);
                }
                Ok(outcome) => {
                    for line in output::format_publish_outcome(&outcome) {
                        tracing::info!("{line}");
                    }
                }
                // Unreadable ledger or failed append: operator attention,
                // do not retry into a duplicate post.
                Err(e) => tracing::error!(error = %e, "publish failed, needs attention"),
            }
            std::thread::sleep(AFTER_SLOT_SLEEP);
        } else {
            tracing::debug!(now = %now.format("%A %H:%M"), "waiting");
            std::thread::sleep(IDLE_SLEEP);
        }
    }
}

/// DM every configured recipient a link to the fresh post.
fn announce(config: &PipelineConfig, uploader: &mut dyn UploadClient) {
    if config.publish.recipients.is_empty() {
        return;
    }
    let Some(mut notifier) = build_notifier(config) else {
        tracing::warn!("recipients configured but no notify command; skipping DMs");
        return;
    };
    let url = match uploader.latest_post_url() {
        Ok(Some(url)) => url,
        Ok(None) => {
            tracing::warn!("no latest post url available; skipping DMs");
            return;
        }
        Err(e) => {
            tracing::warn!(error = %e, "latest post lookup failed; skipping DMs");
            return;
        }
    };
    let message = config.publish.dm_message.replace("{url}", &url);
    let deliveries = notify_all(
        &mut notifier,
        &config.publish.recipients,
        &message,
        Duration::from_secs(config.publish.dm_delay_secs),
    );
    let sent = deliveries.iter().filter(|d| d.result.is_ok()).count();
    tracing::info!(sent, total = deliveries.len(), "DM fan-out done");
}

fn build_captioner(config: &PipelineConfig) -> Box<dyn CaptionSource> {
    match CommandCaptioner::from_argv(&config.commands.caption) {
        Some(captioner) => Box::new(captioner),
        None => Box::new(StemCaptioner),
    }
}

fn build_notifier(config: &PipelineConfig) -> Option<CommandNotifier> {
    CommandNotifier::from_argv(&config.commands.notify)
}

fn require_uploader(config: &PipelineConfig) -> Result<CommandUploader, String> {
    CommandUploader::from_argv(&config.commands.upload)
        .ok_or_else(|| "no [commands] upload command configured".to_string())
}
