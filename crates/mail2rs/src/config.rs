use std::{
    io,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Read(#[from] io::Error),

    #[error("malformed config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Optional on-disk JSON configuration, the lowest-priority settings
/// source. Keys mirror the long flag names. `tls-mode` stays a raw string
/// here; the resolver parses it and ignores unrecognized values with a
/// warning, since a broken config file must never be fatal.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConfigFile {
    pub smtp_server: Option<String>,
    pub smtp_port: Option<u16>,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub no_auth: Option<bool>,
    pub tls_mode: Option<String>,
    pub from_email: Option<String>,
}

impl ConfigFile {
    /// Loads configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Default config file location: `mail2rs/config.json` under the
    /// per-user configuration directory. Returns `None` when the file
    /// does not exist.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("mail2rs").join("config.json"))
            .filter(|path| path.is_file())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use claims::{assert_err, assert_ok};
    use tempfile::NamedTempFile;

    use super::*;

    fn config_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(content.as_bytes()).expect("write config");
        file
    }

    #[test]
    fn loads_full_config() {
        let file = config_file(
            r#"{
                "smtp-server": "smtp.example.com",
                "smtp-port": 2525,
                "smtp-username": "user",
                "smtp-password": "pass",
                "no-auth": false,
                "tls-mode": "tls-skip",
                "from-email": "from@example.com"
            }"#,
        );

        let config = assert_ok!(ConfigFile::load(file.path()));
        assert_eq!(config.smtp_server.as_deref(), Some("smtp.example.com"));
        assert_eq!(config.smtp_port, Some(2525));
        assert_eq!(config.smtp_username.as_deref(), Some("user"));
        assert_eq!(config.smtp_password.as_deref(), Some("pass"));
        assert_eq!(config.no_auth, Some(false));
        assert_eq!(config.tls_mode.as_deref(), Some("tls-skip"));
        assert_eq!(config.from_email.as_deref(), Some("from@example.com"));
    }

    #[test]
    fn partial_config_leaves_other_fields_unset() {
        let file = config_file(r#"{"smtp-server": "smtp.example.com"}"#);

        let config = assert_ok!(ConfigFile::load(file.path()));
        assert_eq!(config.smtp_server.as_deref(), Some("smtp.example.com"));
        assert_eq!(config.smtp_port, None);
        assert_eq!(config.from_email, None);
    }

    #[test]
    fn malformed_json_is_an_error() {
        let file = config_file("{not json");
        assert_err!(ConfigFile::load(file.path()));
    }

    #[test]
    fn missing_file_is_an_error() {
        assert_err!(ConfigFile::load(Path::new("/nonexistent/config.json")));
    }
}
