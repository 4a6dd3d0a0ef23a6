mod announcer;
mod composer;
mod config;
mod diff;
mod error;
mod manifest;
mod storage;
mod telegram;

use std::process::ExitCode;
use tokio::time::{sleep, Duration};
use tracing::{error, info};

use announcer::RunOutcome;
use config::{Secrets, Settings};
use error::AnnounceError;
use telegram::TelegramClient;

/// Exit status meaning "nothing new, no commit needed" for the CI step.
const EXIT_UP_TO_DATE: u8 = 1;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("build_announcer=info")),
        )
        .init();

    let secrets = match Secrets::from_env() {
        Ok(s) => s,
        Err(e) => {
            info!("{}", e);
            println!("Fill all the configs plox..\nExiting...");
            return exit_code_for(&e);
        }
    };

    let settings = match Settings::load() {
        Ok(s) => s,
        Err(e) => return fail(e),
    };
    let pause = Duration::from_secs(settings.timing.exit_pause_secs);
    let dry_run = config::is_dry_run();
    if dry_run {
        info!("DRY RUN mode: composing only, nothing sent or written");
    }

    let client = match TelegramClient::new(&secrets.bot_token, settings.timing.http_timeout_secs) {
        Ok(c) => c,
        Err(e) => {
            error!("{:#}", e);
            return ExitCode::from(2);
        }
    };

    info!(
        builds_dir = %settings.paths.builds_dir.display(),
        id_file = %settings.paths.id_file.display(),
        send_delay_secs = settings.timing.send_delay_secs,
        "Starting build announcer"
    );

    match announcer::run_cycle(&client, &secrets, &settings, dry_run).await {
        Ok(RunOutcome::UpToDate) => {
            println!("All are Updated\nNothing to do\nExiting...");
            sleep(pause).await;
            ExitCode::from(EXIT_UP_TO_DATE)
        }
        Ok(RunOutcome::Announced(builds)) => {
            info!(count = builds.len(), "Run complete");
            println!("Successful");
            sleep(pause).await;
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}

fn exit_code_for(e: &AnnounceError) -> ExitCode {
    ExitCode::from(e.exit_code())
}

fn fail(e: AnnounceError) -> ExitCode {
    let code = exit_code_for(&e);
    error!("{:#}", anyhow::Error::new(e));
    code
}
