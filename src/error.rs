use std::path::PathBuf;
use thiserror::Error;

/// Everything that can stop an announcement run.
#[derive(Debug, Error)]
pub enum AnnounceError {
    /// A required environment value is absent or empty.
    #[error("missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("invalid settings file {path}")]
    Settings {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("cannot list build directory {path}")]
    BuildsDirUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed manifest {path}")]
    ManifestMalformed {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    /// An identifier from the diff has no manifest behind it.
    #[error("no manifest carries checksum {0}")]
    UnknownIdentifier(String),

    #[error("identifier store {path} is unreadable")]
    IdentifierStoreUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}")]
    StoreWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("sending announcement for {codename} failed")]
    SendFailed {
        codename: String,
        #[source]
        source: anyhow::Error,
    },
}

impl AnnounceError {
    /// Process exit status for this failure.
    /// Missing config is "nothing to configure", not a crash.
    pub fn exit_code(&self) -> u8 {
        match self {
            AnnounceError::ConfigMissing(_) => 0,
            _ => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_missing_exits_zero() {
        assert_eq!(AnnounceError::ConfigMissing("BOT_TOKEN").exit_code(), 0);
    }

    #[test]
    fn test_other_failures_exit_two() {
        let err = AnnounceError::UnknownIdentifier("abc".into());
        assert_eq!(err.exit_code(), 2);

        let err = AnnounceError::SendFailed {
            codename: "pixel7".into(),
            source: anyhow::anyhow!("sendPhoto returned 400"),
        };
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_source_chain_is_kept() {
        let err = AnnounceError::ManifestMalformed {
            path: PathBuf::from("builds/a.json"),
            source: anyhow::anyhow!("missing field `sha256`"),
        };
        let rendered = format!("{:#}", anyhow::Error::new(err));
        assert!(rendered.contains("builds/a.json"), "got: {}", rendered);
        assert!(rendered.contains("sha256"), "got: {}", rendered);
    }
}
