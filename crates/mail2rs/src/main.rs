use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use mail2rs_mail::{Attachment, Mail, MailError, TransportPolicy};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use crate::{
    cli::Cli,
    config::ConfigFile,
    settings::{Settings, SettingsError},
};

mod cli;
mod config;
mod settings;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    if cli.show_version() {
        println!("mail2rs {VERSION}");
        return ExitCode::SUCCESS;
    }

    run(cli).await
}

async fn run(cli: Cli) -> ExitCode {
    let config = load_config(&cli);

    let settings = match Settings::resolve(&config, &cli.long_values(), &cli.short_values()) {
        Ok(settings) => settings,
        Err(err @ SettingsError::BodyFileUnreadable { .. }) => {
            eprintln!("Error: {err}");
            return ExitCode::FAILURE;
        }
        Err(err) => {
            eprintln!("Error: {err}");
            eprintln!();
            eprintln!("{}", Cli::command().render_help());
            return ExitCode::FAILURE;
        }
    };

    let mail = match build_mail(&settings) {
        Ok(mail) => mail,
        Err(err) => {
            eprintln!("Error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let policy = TransportPolicy::derive(
        settings.no_auth,
        &settings.username,
        &settings.password,
        settings.tls_mode,
    );

    match mail
        .send(&policy, &settings.smtp_server, settings.smtp_port)
        .await
    {
        Ok(()) => {
            println!(
                "Email sent successfully to {} from {}",
                settings.to_emails.join(", "),
                settings.from_email
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error sending email: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Load the config file named on the command line, falling back to the
/// default per-user location. Unreadable or malformed files are reported
/// and treated as empty; resolution continues with flags only.
fn load_config(cli: &Cli) -> ConfigFile {
    let Some(path) = cli.config_path().or_else(ConfigFile::default_path) else {
        return ConfigFile::default();
    };
    match ConfigFile::load(&path) {
        Ok(config) => {
            debug!("Loaded SMTP configuration from {}", path.display());
            config
        }
        Err(err) => {
            warn!("Error loading config file {}: {err}", path.display());
            ConfigFile::default()
        }
    }
}

/// Assemble the outbound message, reading attachment files in the order
/// given. Any unreadable attachment aborts the whole send.
fn build_mail(settings: &Settings) -> Result<Mail, MailError> {
    let mut attachments = Vec::with_capacity(settings.attachment_paths.len());
    for path in &settings.attachment_paths {
        attachments.push(Attachment::read(path)?);
    }

    Ok(Mail::new(
        &settings.from_email,
        settings.to_emails.clone(),
        &settings.subject,
        settings.body.clone(),
    )
    .with_reply_to(settings.reply_to.clone())
    .html(settings.body_from_file)
    .set_attachments(attachments))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use claims::assert_ok;
    use mail2rs_mail::TlsMode;
    use tempfile::NamedTempFile;

    use super::*;

    fn settings() -> Settings {
        Settings {
            smtp_server: "smtp.example.com".to_string(),
            smtp_port: 587,
            username: String::new(),
            password: String::new(),
            no_auth: false,
            tls_mode: TlsMode::Tls,
            from_email: "from@example.com".to_string(),
            to_emails: vec!["to@example.com".to_string()],
            reply_to: None,
            subject: "Subject".to_string(),
            body: "Body".to_string(),
            body_from_file: false,
            attachment_paths: Vec::new(),
        }
    }

    #[test]
    fn builds_mail_without_attachments() {
        let mail = assert_ok!(build_mail(&settings()));
        assert_eq!(mail.to(), ["to@example.com"]);
        assert_eq!(mail.subject(), "Subject");
    }

    #[test]
    fn builds_mail_with_attachments_in_order() {
        let mut first = NamedTempFile::with_suffix(".png").expect("temp file");
        first.write_all(b"png bytes").expect("write");
        let mut second = NamedTempFile::with_suffix(".xyz").expect("temp file");
        second.write_all(b"other bytes").expect("write");

        let mut settings = settings();
        settings.attachment_paths =
            vec![first.path().to_path_buf(), second.path().to_path_buf()];

        let mail = assert_ok!(build_mail(&settings));
        let message = assert_ok!(mail.into_message());
        let raw = String::from_utf8_lossy(&message.formatted()).into_owned();
        assert!(raw.contains("image/png"));
        assert!(raw.contains("application/octet-stream"));
    }

    #[test]
    fn unreadable_attachment_fails_build() {
        let mut settings = settings();
        settings.attachment_paths = vec!["/nonexistent/a.png".into()];

        assert!(matches!(
            build_mail(&settings),
            Err(MailError::AttachmentUnreadable { .. })
        ));
    }
}
