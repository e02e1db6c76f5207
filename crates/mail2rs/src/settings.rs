use std::{io, path::PathBuf};

use mail2rs_mail::TlsMode;
use thiserror::Error;
use tracing::warn;

use crate::{cli::FlagValues, config::ConfigFile};

pub const DEFAULT_SMTP_PORT: u16 = 587;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("required value missing: {0}")]
    MissingRequiredField(&'static str),

    #[error("email body is required, either directly or through a body file")]
    MissingBody,

    #[error("at least one recipient email address is required")]
    NoRecipients,

    #[error("cannot read body file {path}: {source}")]
    BodyFileUnreadable { path: PathBuf, source: io::Error },
}

/// Fully resolved, validated configuration for one send operation.
///
/// Built once per invocation by [`Settings::resolve`] and immutable
/// afterwards.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Settings {
    pub smtp_server: String,
    pub smtp_port: u16,
    pub username: String,
    pub password: String,
    pub no_auth: bool,
    pub tls_mode: TlsMode,
    pub from_email: String,
    pub to_emails: Vec<String>,
    pub reply_to: Option<String>,
    pub subject: String,
    pub body: String,
    pub body_from_file: bool,
    pub attachment_paths: Vec<PathBuf>,
}

impl Settings {
    /// Merge the three settings sources and validate the result.
    ///
    /// Precedence, lowest to highest: config file < long flag < short flag.
    /// A source contributes a value only when it is non-empty; an unset or
    /// empty value never overwrites one resolved from a lower-priority
    /// source. The port carries an explicit was-set flag per source, so
    /// `--smtp-port 587` overrides a config-file port like any other value
    /// (unlike the sentinel-equals-default behavior this replaces).
    ///
    /// Body-file contents enter the same priority chain below the literal
    /// body flags: a literal `--body`/`-b` wins over the file, the file
    /// wins over nothing. The chosen content type follows the *presence*
    /// of a body-file path, not which content won.
    pub fn resolve(
        config: &ConfigFile,
        long: &FlagValues,
        short: &FlagValues,
    ) -> Result<Self, SettingsError> {
        let smtp_server = priority([
            config.smtp_server.clone(),
            long.smtp_server.clone(),
            short.smtp_server.clone(),
        ])
        .ok_or(SettingsError::MissingRequiredField("smtp-server"))?;

        let smtp_port = short
            .smtp_port
            .or(long.smtp_port)
            .or(config.smtp_port)
            .unwrap_or(DEFAULT_SMTP_PORT);

        let username = priority([
            config.smtp_username.clone(),
            long.username.clone(),
            short.username.clone(),
        ])
        .unwrap_or_default();
        let password = priority([
            config.smtp_password.clone(),
            long.password.clone(),
            short.password.clone(),
        ])
        .unwrap_or_default();
        let no_auth = config.no_auth.unwrap_or_default() || long.no_auth || short.no_auth;

        let config_tls_mode = config
            .tls_mode
            .as_deref()
            .filter(|value| !value.is_empty())
            .and_then(|value| match value.parse::<TlsMode>() {
                Ok(mode) => Some(mode),
                Err(err) => {
                    warn!("Ignoring TLS mode from config file: {err}");
                    None
                }
            });
        let tls_mode = short
            .tls_mode
            .or(long.tls_mode)
            .or(config_tls_mode)
            .unwrap_or_default();

        let from_email = priority([
            config.from_email.clone(),
            long.from_email.clone(),
            short.from_email.clone(),
        ])
        .ok_or(SettingsError::MissingRequiredField("from-email"))?;

        let to_email = priority([long.to_email.clone(), short.to_email.clone()])
            .ok_or(SettingsError::MissingRequiredField("to-email"))?;
        let reply_to = priority([long.reply_to.clone(), short.reply_to.clone()]);
        let subject = priority([long.subject.clone(), short.subject.clone()])
            .ok_or(SettingsError::MissingRequiredField("subject"))?;

        let literal_body = priority([long.body.clone(), short.body.clone()]);
        let body_file = non_empty_path(&short.body_file).or_else(|| non_empty_path(&long.body_file));
        if literal_body.is_none() && body_file.is_none() {
            return Err(SettingsError::MissingBody);
        }

        let body = match &body_file {
            Some(path) => {
                let content = std::fs::read_to_string(path).map_err(|source| {
                    SettingsError::BodyFileUnreadable {
                        path: path.clone(),
                        source,
                    }
                })?;
                // Literal body flags still outrank the file contents.
                priority([Some(content), literal_body]).unwrap_or_default()
            }
            None => literal_body.unwrap_or_default(),
        };

        let to_emails = split_list(&to_email);
        if to_emails.is_empty() {
            return Err(SettingsError::NoRecipients);
        }

        let attachment_paths = priority([long.attachments.clone(), short.attachments.clone()])
            .map(|list| split_list(&list).into_iter().map(PathBuf::from).collect())
            .unwrap_or_default();

        Ok(Self {
            smtp_server,
            smtp_port,
            username,
            password,
            no_auth,
            tls_mode,
            from_email,
            to_emails,
            reply_to,
            subject,
            body,
            body_from_file: body_file.is_some(),
            attachment_paths,
        })
    }
}

/// Returns the highest-priority non-empty value, sources ordered lowest
/// to highest.
fn priority<const N: usize>(values: [Option<String>; N]) -> Option<String> {
    values
        .into_iter()
        .flatten()
        .filter(|value| !value.is_empty())
        .next_back()
}

fn non_empty_path(path: &Option<PathBuf>) -> Option<PathBuf> {
    path.clone().filter(|p| !p.as_os_str().is_empty())
}

/// Split a comma-separated list, dropping empty entries.
fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(String::from)
        .collect()
}
