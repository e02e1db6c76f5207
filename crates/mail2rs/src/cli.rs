use std::path::PathBuf;

use clap::{ArgAction, Parser};
use mail2rs_mail::TlsMode;

/// Command-line flag surface.
///
/// Long and short forms are declared as separate arguments so the resolver
/// can apply its fixed precedence (config file < long flag < short flag)
/// even when both forms appear in one invocation. The auto help/version
/// flags are disabled because `-h` is the subject flag and `-v` prints the
/// version; `-na`, `-af` and `-bf` from the original tool become `--na`,
/// `--af` and `--bf` since short flags are single characters here.
#[derive(Debug, Parser)]
#[command(
    name = "mail2rs",
    about = "Send a single email over SMTP",
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct Cli {
    /// SMTP server for sending emails
    #[arg(long = "smtp-server", value_name = "HOST")]
    pub smtp_server: Option<String>,

    /// SMTP server port (default: 587)
    #[arg(long = "smtp-port", value_name = "PORT")]
    pub smtp_port: Option<u16>,

    /// Username for SMTP authentication
    #[arg(long = "smtp-username", value_name = "USER")]
    pub smtp_username: Option<String>,

    /// Password for SMTP authentication
    #[arg(long = "smtp-password", value_name = "PASSWORD")]
    pub smtp_password: Option<String>,

    /// Use unauthenticated SMTP
    #[arg(long = "no-auth")]
    pub no_auth: bool,

    /// TLS mode (none, tls-skip, tls)
    #[arg(long = "tls-mode", value_name = "MODE", value_parser = tls_mode_value)]
    pub tls_mode: Option<TlsMode>,

    /// Path to the SMTP JSON config file
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Email address to send from
    #[arg(long = "from-email", value_name = "ADDRESS")]
    pub from_email: Option<String>,

    /// Email addresses that will receive the email, comma-separated
    #[arg(long = "to-email", value_name = "ADDRESSES")]
    pub to_email: Option<String>,

    /// Email address to reply to
    #[arg(long = "reply-to", value_name = "ADDRESS")]
    pub reply_to: Option<String>,

    /// Subject of the email
    #[arg(long = "subject", value_name = "SUBJECT")]
    pub subject: Option<String>,

    /// Body of the email
    #[arg(long = "body", value_name = "TEXT")]
    pub body: Option<String>,

    /// File paths for attachments, comma-separated
    #[arg(long = "attachments", value_name = "FILES")]
    pub attachments: Option<String>,

    /// File path for email body
    #[arg(long = "body-file", value_name = "FILE")]
    pub body_file: Option<PathBuf>,

    /// Display application version
    #[arg(long = "version")]
    pub version: bool,

    /// SMTP server for sending emails (short)
    #[arg(short = 's', value_name = "HOST")]
    pub smtp_server_short: Option<String>,

    /// SMTP server port (short)
    #[arg(short = 'p', value_name = "PORT")]
    pub smtp_port_short: Option<u16>,

    /// Username for SMTP authentication (short)
    #[arg(short = 'u', value_name = "USER")]
    pub smtp_username_short: Option<String>,

    /// Password for SMTP authentication (short)
    #[arg(short = 'w', value_name = "PASSWORD")]
    pub smtp_password_short: Option<String>,

    /// Use unauthenticated SMTP (short)
    #[arg(long = "na")]
    pub no_auth_short: bool,

    /// TLS mode (short)
    #[arg(short = 'l', value_name = "MODE", value_parser = tls_mode_value)]
    pub tls_mode_short: Option<TlsMode>,

    /// Path to the SMTP config file (short)
    #[arg(short = 'c', value_name = "FILE")]
    pub config_short: Option<PathBuf>,

    /// Email address to send from (short)
    #[arg(short = 'f', value_name = "ADDRESS")]
    pub from_email_short: Option<String>,

    /// Email addresses that will receive the email, comma-separated (short)
    #[arg(short = 't', value_name = "ADDRESSES")]
    pub to_email_short: Option<String>,

    /// Email address to reply to (short)
    #[arg(short = 'r', value_name = "ADDRESS")]
    pub reply_to_short: Option<String>,

    /// Subject of the email (short)
    #[arg(short = 'h', value_name = "SUBJECT")]
    pub subject_short: Option<String>,

    /// Body of the email (short)
    #[arg(short = 'b', value_name = "TEXT")]
    pub body_short: Option<String>,

    /// File paths for attachments, comma-separated (short)
    #[arg(long = "af", value_name = "FILES")]
    pub attachments_short: Option<String>,

    /// File path for email body (short)
    #[arg(long = "bf", value_name = "FILE")]
    pub body_file_short: Option<PathBuf>,

    /// Display application version (short)
    #[arg(short = 'v')]
    pub version_short: bool,

    /// Print help
    #[arg(long = "help", action = ArgAction::Help)]
    pub help: Option<bool>,
}

/// One source of flag values, as consumed by the resolver.
#[derive(Clone, Debug, Default)]
pub struct FlagValues {
    pub smtp_server: Option<String>,
    pub smtp_port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub no_auth: bool,
    pub tls_mode: Option<TlsMode>,
    pub from_email: Option<String>,
    pub to_email: Option<String>,
    pub reply_to: Option<String>,
    pub subject: Option<String>,
    pub body: Option<String>,
    pub attachments: Option<String>,
    pub body_file: Option<PathBuf>,
}

impl Cli {
    /// Long-form flag values.
    #[must_use]
    pub fn long_values(&self) -> FlagValues {
        FlagValues {
            smtp_server: self.smtp_server.clone(),
            smtp_port: self.smtp_port,
            username: self.smtp_username.clone(),
            password: self.smtp_password.clone(),
            no_auth: self.no_auth,
            tls_mode: self.tls_mode,
            from_email: self.from_email.clone(),
            to_email: self.to_email.clone(),
            reply_to: self.reply_to.clone(),
            subject: self.subject.clone(),
            body: self.body.clone(),
            attachments: self.attachments.clone(),
            body_file: self.body_file.clone(),
        }
    }

    /// Short-form flag values.
    #[must_use]
    pub fn short_values(&self) -> FlagValues {
        FlagValues {
            smtp_server: self.smtp_server_short.clone(),
            smtp_port: self.smtp_port_short,
            username: self.smtp_username_short.clone(),
            password: self.smtp_password_short.clone(),
            no_auth: self.no_auth_short,
            tls_mode: self.tls_mode_short,
            from_email: self.from_email_short.clone(),
            to_email: self.to_email_short.clone(),
            reply_to: self.reply_to_short.clone(),
            subject: self.subject_short.clone(),
            body: self.body_short.clone(),
            attachments: self.attachments_short.clone(),
            body_file: self.body_file_short.clone(),
        }
    }

    /// Explicit config-file path, short form taking precedence.
    #[must_use]
    pub fn config_path(&self) -> Option<PathBuf> {
        self.config_short.clone().or_else(|| self.config.clone())
    }

    /// Whether either version flag was given.
    #[must_use]
    pub fn show_version(&self) -> bool {
        self.version || self.version_short
    }
}

fn tls_mode_value(s: &str) -> Result<TlsMode, String> {
    s.parse().map_err(|err| format!("{err}"))
}
