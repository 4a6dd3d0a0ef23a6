use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::AnnounceError;

pub const BOT_TOKEN_VAR: &str = "BOT_TOKEN";
pub const CHAT_ID_VAR: &str = "CHAT_ID";
pub const BANNER_URL_VAR: &str = "BANNER_URL";

const SETTINGS_PATH_VAR: &str = "ANNOUNCER_CONFIG";
const DEFAULT_SETTINGS_PATH: &str = "announcer.toml";

/// Secrets supplied by the CI workflow.
#[derive(Debug, Clone)]
pub struct Secrets {
    pub bot_token: String,
    pub chat_id: String,
    pub banner_url: String,
}

impl Secrets {
    pub fn from_env() -> Result<Self, AnnounceError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, AnnounceError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &'static str| match lookup(key) {
            Some(v) if !v.trim().is_empty() => Ok(v),
            _ => Err(AnnounceError::ConfigMissing(key)),
        };
        Ok(Self {
            bot_token: get(BOT_TOKEN_VAR)?,
            chat_id: get(CHAT_ID_VAR)?,
            banner_url: get(BANNER_URL_VAR)?,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub branding: Branding,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_builds_dir")]
    pub builds_dir: PathBuf,
    #[serde(default = "default_id_file")]
    pub id_file: PathBuf,
    #[serde(default = "default_commit_note")]
    pub commit_note: PathBuf,
}

fn default_builds_dir() -> PathBuf { PathBuf::from("builds") }
fn default_id_file() -> PathBuf { PathBuf::from(".github/scripts/file_ids.txt") }
fn default_commit_note() -> PathBuf { PathBuf::from("commit_mesg.txt") }

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            builds_dir: default_builds_dir(),
            id_file: default_id_file(),
            commit_note: default_commit_note(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimingConfig {
    #[serde(default = "default_send_delay_secs")]
    pub send_delay_secs: u64,
    #[serde(default = "default_exit_pause_secs")]
    pub exit_pause_secs: u64,
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

fn default_send_delay_secs() -> u64 { 5 }
fn default_exit_pause_secs() -> u64 { 2 }
fn default_http_timeout_secs() -> u64 { 30 }

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            send_delay_secs: default_send_delay_secs(),
            exit_pause_secs: default_exit_pause_secs(),
            http_timeout_secs: default_http_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreConfig {
    /// Treat a missing identifier file as an empty set instead of failing.
    #[serde(default)]
    pub bootstrap_missing: bool,
}

/// Channel-specific text that ends up in captions, buttons and the commit note.
/// URL templates take a `{codename}` placeholder.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Branding {
    pub rom_name: String,
    pub edition: String,
    pub commit_prefix: String,
    pub android_tag: String,
    pub maintainer_profile_base: String,
    pub screenshots_url: String,
    pub announcements_url: String,
    pub support_group_url: String,
    pub installation_url: String,
    pub changelog_url: String,
    pub release_notes_url: String,
}

impl Default for Branding {
    fn default() -> Self {
        Self {
            rom_name: "DroidX-UI".into(),
            edition: "NewHorizon".into(),
            commit_prefix: "DroidX".into(),
            android_tag: "Android14".into(),
            maintainer_profile_base: "https://t.me/".into(),
            screenshots_url: "https://t.me/droidxui_screenshots".into(),
            announcements_url: "https://t.me/DroidXUI_announcements".into(),
            support_group_url: "https://t.me/DroidXUI_chats".into(),
            installation_url:
                "https://github.com/DroidX-UI-Devices/Official_Devices/blob/14/Installation/{codename}.md"
                    .into(),
            changelog_url:
                "https://github.com/DroidX-UI/Release_changelogs/blob/14/DroidX-Changelogs.mk".into(),
            release_notes_url:
                "https://github.com/DroidX-UI-Devices/Official_Devices/blob/14/changelogs/{codename}.md"
                    .into(),
        }
    }
}

impl Settings {
    /// Load settings from `$ANNOUNCER_CONFIG` or `announcer.toml`.
    /// A missing file yields defaults.
    pub fn load() -> Result<Self, AnnounceError> {
        let path = std::env::var(SETTINGS_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_SETTINGS_PATH));
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self, AnnounceError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let parsed = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))
            .and_then(|content| {
                toml::from_str::<Settings>(&content)
                    .with_context(|| format!("Failed to parse {}", path.display()))
            });
        parsed.map_err(|source| AnnounceError::Settings {
            path: path.to_path_buf(),
            source,
        })
    }
}

pub fn is_dry_run() -> bool {
    std::env::var("DRY_RUN")
        .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_secrets_all_present() {
        let secrets = Secrets::from_lookup(lookup_from(&[
            ("BOT_TOKEN", "123:abc"),
            ("CHAT_ID", "-10042"),
            ("BANNER_URL", "https://example.com/banner.png"),
        ]))
        .unwrap();
        assert_eq!(secrets.bot_token, "123:abc");
        assert_eq!(secrets.chat_id, "-10042");
        assert_eq!(secrets.banner_url, "https://example.com/banner.png");
    }

    #[test]
    fn test_secrets_missing_reports_name() {
        let err = Secrets::from_lookup(lookup_from(&[
            ("BOT_TOKEN", "123:abc"),
            ("BANNER_URL", "https://example.com/banner.png"),
        ]))
        .unwrap_err();
        assert!(matches!(err, AnnounceError::ConfigMissing("CHAT_ID")));
    }

    #[test]
    fn test_secrets_empty_counts_as_missing() {
        let err = Secrets::from_lookup(lookup_from(&[
            ("BOT_TOKEN", ""),
            ("CHAT_ID", "-10042"),
            ("BANNER_URL", "https://example.com/banner.png"),
        ]))
        .unwrap_err();
        assert!(matches!(err, AnnounceError::ConfigMissing("BOT_TOKEN")));
    }

    #[test]
    fn test_missing_settings_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(settings.paths.builds_dir, PathBuf::from("builds"));
        assert_eq!(settings.paths.id_file, PathBuf::from(".github/scripts/file_ids.txt"));
        assert_eq!(settings.paths.commit_note, PathBuf::from("commit_mesg.txt"));
        assert_eq!(settings.timing.send_delay_secs, 5);
        assert_eq!(settings.timing.exit_pause_secs, 2);
        assert!(!settings.store.bootstrap_missing);
        assert_eq!(settings.branding.rom_name, "DroidX-UI");
    }

    #[test]
    fn test_partial_settings_keep_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("announcer.toml");
        std::fs::write(
            &path,
            r#"
[paths]
builds_dir = "out/builds"

[timing]
send_delay_secs = 0

[store]
bootstrap_missing = true

[branding]
rom_name = "TestROM"
"#,
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.paths.builds_dir, PathBuf::from("out/builds"));
        assert_eq!(settings.paths.commit_note, PathBuf::from("commit_mesg.txt"));
        assert_eq!(settings.timing.send_delay_secs, 0);
        assert_eq!(settings.timing.exit_pause_secs, 2);
        assert!(settings.store.bootstrap_missing);
        assert_eq!(settings.branding.rom_name, "TestROM");
        assert_eq!(settings.branding.edition, "NewHorizon");
    }

    #[test]
    fn test_example_settings_match_defaults() {
        let example: Settings = toml::from_str(include_str!("../announcer.example.toml"))
            .expect("example settings should parse");
        let defaults = Settings::default();
        assert_eq!(example.paths.id_file, defaults.paths.id_file);
        assert_eq!(example.timing.send_delay_secs, defaults.timing.send_delay_secs);
        assert_eq!(example.branding.installation_url, defaults.branding.installation_url);
        assert_eq!(example.branding.release_notes_url, defaults.branding.release_notes_url);
    }

    #[test]
    fn test_invalid_settings_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("announcer.toml");
        std::fs::write(&path, "[timing]\nsend_delay_secs = \"soon\"\n").unwrap();
        let err = Settings::load_from(&path).unwrap_err();
        assert!(matches!(err, AnnounceError::Settings { .. }));
    }
}
