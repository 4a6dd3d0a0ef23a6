use tokio::time::{sleep, Duration};
use tracing::{debug, info};

use crate::composer;
use crate::config::{Secrets, Settings};
use crate::diff::new_identifiers;
use crate::error::AnnounceError;
use crate::manifest::{self, BuildInfo};
use crate::storage;
use crate::telegram::PhotoSender;

#[derive(Debug)]
pub enum RunOutcome {
    /// Every current build was already announced; nothing was sent or written.
    UpToDate,
    /// Builds announced this run, in send order.
    Announced(Vec<BuildInfo>),
}

fn log_build(info: &BuildInfo) {
    info!(
        codename = %info.codename,
        oem = %info.oem,
        device = %info.device_name,
        maintainer = %info.maintainer,
        date = %info.build_date,
        download = %info.download,
        size_gb = %info.size_gb,
        sha256 = %info.sha256,
        gapps = %info.gapps,
        forum = %info.forum,
        telegram = %info.telegram,
        "New build"
    );
}

/// One full pass: scan manifests, diff against the store, announce each new
/// build, then snapshot the store and write the commit note.
///
/// The first failed send aborts the run before anything is persisted, so the
/// next run retries the same builds.
pub async fn run_cycle<S>(
    sender: &S,
    secrets: &Secrets,
    settings: &Settings,
    dry_run: bool,
) -> Result<RunOutcome, AnnounceError>
where
    S: PhotoSender + Sync + ?Sized,
{
    let paths = &settings.paths;
    let manifests = manifest::scan_manifests(&paths.builds_dir)?;
    let current = manifest::checksums(&manifests);
    let previous = storage::load_identifiers(&paths.id_file, settings.store.bootstrap_missing)?;

    let fresh = new_identifiers(&current, &previous);
    if fresh.is_empty() {
        debug!(manifests = manifests.len(), "No new identifiers");
        return Ok(RunOutcome::UpToDate);
    }
    info!(count = fresh.len(), ids = ?fresh, "IDs changed");

    let delay = Duration::from_secs(settings.timing.send_delay_secs);
    let mut announced = Vec::with_capacity(fresh.len());

    for id in &fresh {
        let found = manifest::find_by_checksum(&manifests, id)
            .ok_or_else(|| AnnounceError::UnknownIdentifier(id.clone()))?;
        let build = BuildInfo::from_manifest(found)?;
        log_build(&build);

        let caption = composer::caption(&build, &settings.branding);
        let keyboard = composer::buttons(&build, &settings.branding);

        if dry_run {
            info!(codename = %build.codename, caption = %caption, "DRY RUN: not sending");
        } else {
            sender
                .send_photo(&secrets.chat_id, &secrets.banner_url, Some(&caption), &keyboard)
                .await
                .map_err(|source| AnnounceError::SendFailed {
                    codename: build.codename.clone(),
                    source,
                })?;
            info!(codename = %build.codename, "Announcement sent");
            if !delay.is_zero() {
                sleep(delay).await;
            }
        }
        announced.push(build);
    }

    if dry_run {
        info!(count = announced.len(), "DRY RUN: store and commit note left untouched");
        return Ok(RunOutcome::Announced(announced));
    }

    storage::save_identifiers(&paths.id_file, &current)?;
    storage::write_commit_note(&paths.commit_note, &settings.branding.commit_prefix, &announced)?;
    info!(
        count = announced.len(),
        store = %paths.id_file.display(),
        note = %paths.commit_note.display(),
        "Store updated"
    );

    Ok(RunOutcome::Announced(announced))
}
