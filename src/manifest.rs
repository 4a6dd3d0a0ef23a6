use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, warn};

use crate::error::AnnounceError;

const BYTES_PER_GB: u64 = 1_000_000_000;

// --- On-disk shape ---

/// Wrapper written by the build scripts: `{"response": [ {...} ]}`.
/// Only the first element is meaningful.
#[derive(Debug, Deserialize)]
struct ManifestFile {
    response: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BuildRecord {
    pub oem: String,
    pub device: String,
    pub maintainer: String,
    pub download: String,
    #[serde(deserialize_with = "text_or_flag")]
    pub gapps: String,
    pub forum: String,
    pub telegram: String,
    /// UNIX seconds.
    #[serde(deserialize_with = "int_or_text")]
    pub timestamp: i64,
    pub sha256: String,
    /// Bytes.
    #[serde(deserialize_with = "int_or_text")]
    pub size: u64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IntOrText<T> {
    Int(T),
    Text(String),
}

/// Accept `1700000000` as well as `"1700000000"`.
fn int_or_text<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: std::fmt::Display,
{
    match IntOrText::<T>::deserialize(deserializer)? {
        IntOrText::Int(v) => Ok(v),
        IntOrText::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextOrFlag {
    Text(String),
    Flag(bool),
}

/// Some device trees publish `"gapps": true` instead of a description.
fn text_or_flag<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match TextOrFlag::deserialize(deserializer)? {
        TextOrFlag::Text(s) => s,
        TextOrFlag::Flag(b) => b.to_string(),
    })
}

// --- Scanned manifests ---

#[derive(Debug, Clone)]
pub struct Manifest {
    pub codename: String,
    pub path: PathBuf,
    pub build: BuildRecord,
}

impl Manifest {
    pub fn checksum(&self) -> &str {
        &self.build.sha256
    }
}

/// Codename is the file name up to its first `.`: `pixel7.json` -> `pixel7`.
pub fn codename_from_file_name(file_name: &str) -> &str {
    file_name.split('.').next().unwrap_or(file_name)
}

pub fn parse_manifest(content: &str) -> Result<BuildRecord> {
    let file: ManifestFile =
        serde_json::from_str(content).context("Invalid manifest JSON")?;
    let first = file
        .response
        .into_iter()
        .next()
        .context("`response` list is empty")?;
    serde_json::from_value(first).context("Invalid build record in response[0]")
}

fn read_manifest(path: &Path, file_name: &str) -> Result<Manifest, AnnounceError> {
    let build = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))
        .and_then(|content| parse_manifest(&content))
        .map_err(|source| AnnounceError::ManifestMalformed {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(Manifest {
        codename: codename_from_file_name(file_name).to_string(),
        path: path.to_path_buf(),
        build,
    })
}

/// Parse every `*.json` file directly inside `dir`, in file-name order.
/// Any unreadable or malformed manifest aborts the scan.
pub fn scan_manifests(dir: &Path) -> Result<Vec<Manifest>, AnnounceError> {
    let dir_err = |source: std::io::Error| AnnounceError::BuildsDirUnreadable {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries: Vec<(OsString, String)> = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(dir_err)? {
        let entry = entry.map_err(dir_err)?;
        if entry.file_type().map_err(dir_err)?.is_dir() {
            continue;
        }
        let raw = entry.file_name();
        if !raw.as_encoded_bytes().ends_with(b".json") {
            continue;
        }
        let name = raw.to_string_lossy().into_owned();
        if raw.to_str().is_none() {
            warn!(name = %name, "Manifest file name is not UTF-8, codename taken lossily");
        }
        entries.push((raw, name));
    }
    entries.sort();

    let manifests = entries
        .iter()
        .map(|(raw, name)| read_manifest(&dir.join(raw), name))
        .collect::<Result<Vec<_>, _>>()?;

    warn_duplicate_checksums(&manifests);
    debug!(dir = %dir.display(), count = manifests.len(), "Scanned manifests");
    Ok(manifests)
}

fn warn_duplicate_checksums(manifests: &[Manifest]) {
    let mut seen: HashMap<&str, &Path> = HashMap::new();
    for m in manifests {
        if let Some(first) = seen.get(m.checksum()) {
            warn!(
                sha256 = %m.checksum(),
                kept = %first.display(),
                ignored = %m.path.display(),
                "Duplicate checksum across manifests, first one wins"
            );
        } else {
            seen.insert(m.checksum(), &m.path);
        }
    }
}

/// Checksums in scan order (duplicates kept, as the store snapshot is written verbatim).
pub fn checksums(manifests: &[Manifest]) -> Vec<String> {
    manifests.iter().map(|m| m.build.sha256.clone()).collect()
}

/// First manifest in scan order carrying `checksum`.
pub fn find_by_checksum<'a>(manifests: &'a [Manifest], checksum: &str) -> Option<&'a Manifest> {
    manifests.iter().find(|m| m.checksum() == checksum)
}

// --- Display record ---

#[derive(Debug, Clone, PartialEq)]
pub struct BuildInfo {
    pub oem: String,
    pub device_name: String,
    pub codename: String,
    pub maintainer: String,
    pub build_date: String,
    pub download: String,
    pub sha256: String,
    pub gapps: String,
    pub forum: String,
    pub telegram: String,
    pub size_gb: String,
}

impl BuildInfo {
    pub fn from_manifest(manifest: &Manifest) -> Result<Self, AnnounceError> {
        let b = &manifest.build;
        let build_date = format_build_date(b.timestamp).ok_or_else(|| {
            AnnounceError::ManifestMalformed {
                path: manifest.path.clone(),
                source: anyhow::anyhow!("timestamp {} is out of range", b.timestamp),
            }
        })?;
        Ok(Self {
            oem: b.oem.clone(),
            device_name: b.device.clone(),
            codename: manifest.codename.clone(),
            maintainer: b.maintainer.clone(),
            build_date,
            download: b.download.clone(),
            sha256: b.sha256.clone(),
            gapps: b.gapps.clone(),
            forum: b.forum.clone(),
            telegram: b.telegram.clone(),
            size_gb: format_size_gb(b.size),
        })
    }
}

/// UNIX seconds as `YYYY-MM-DD HH:MM:SS` (UTC).
pub fn format_build_date(timestamp: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp(timestamp, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
}

/// Decimal gigabytes rounded to 2 places (half-to-even).
pub fn size_gb(bytes: u64) -> Decimal {
    (Decimal::from(bytes) / Decimal::from(BYTES_PER_GB))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
        .normalize()
}

/// Always shows at least one decimal: `2.0`, `1.5`, `1.23`.
pub fn format_size_gb(bytes: u64) -> String {
    let gb = size_gb(bytes);
    if gb.scale() == 0 {
        format!("{}.0", gb)
    } else {
        gb.to_string()
    }
}
