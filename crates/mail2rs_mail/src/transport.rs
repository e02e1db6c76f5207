use std::{fmt, str::FromStr, time::Duration};

use lettre::{
    AsyncSmtpTransport, Tokio1Executor,
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
};
use thiserror::Error;
use tracing::debug;

use crate::mail::MailError;

pub const SMTP_TIMEOUT: Duration = Duration::from_secs(15);

/// TLS behavior for the SMTP connection.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum TlsMode {
    /// No encryption attempted.
    None,
    /// TLS required, but certificate verification disabled.
    TlsSkip,
    /// Mandatory TLS with full certificate verification.
    #[default]
    Tls,
}

#[derive(Debug, Error)]
#[error("unrecognized TLS mode: {0} (expected none, tls-skip or tls)")]
pub struct UnknownTlsMode(String);

impl FromStr for TlsMode {
    type Err = UnknownTlsMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "tls-skip" => Ok(Self::TlsSkip),
            "tls" => Ok(Self::Tls),
            other => Err(UnknownTlsMode(other.to_string())),
        }
    }
}

impl fmt::Display for TlsMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::TlsSkip => write!(f, "tls-skip"),
            Self::Tls => write!(f, "tls"),
        }
    }
}

/// SMTP authentication behavior.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AuthMode {
    /// Unauthenticated SMTP.
    None,
    /// PLAIN/LOGIN authentication with the given credentials.
    Credentials { username: String, password: String },
}

/// Auth and TLS behavior derived from resolved settings.
///
/// Pure derivation; no connection is opened until the policy is turned
/// into a mailer by [`Mail::send`](crate::mail::Mail::send).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TransportPolicy {
    pub auth: AuthMode,
    pub tls: TlsMode,
}

impl TransportPolicy {
    /// Derive transport behavior from resolved settings.
    ///
    /// Credentials are skipped when `no_auth` is set or when both username
    /// and password are empty.
    #[must_use]
    pub fn derive(no_auth: bool, username: &str, password: &str, tls: TlsMode) -> Self {
        let auth = if no_auth || (username.is_empty() && password.is_empty()) {
            AuthMode::None
        } else {
            AuthMode::Credentials {
                username: username.to_string(),
                password: password.to_string(),
            }
        };

        Self { auth, tls }
    }

    /// Builds the mailer for `server:port` according to this policy.
    pub(crate) fn mailer(
        &self,
        server: &str,
        port: u16,
    ) -> Result<AsyncSmtpTransport<Tokio1Executor>, MailError> {
        type Builder = AsyncSmtpTransport<Tokio1Executor>;

        let builder = match self.tls {
            TlsMode::None => Builder::builder_dangerous(server),
            TlsMode::TlsSkip => {
                // Server name is still passed for protocol correctness,
                // even though the certificate is not verified against it.
                let tls = TlsParameters::builder(server.to_string())
                    .dangerous_accept_invalid_certs(true)
                    .build()?;
                Builder::builder_dangerous(server).tls(Tls::Required(tls))
            }
            TlsMode::Tls => Builder::starttls_relay(server)?,
        }
        .port(port)
        .timeout(Some(SMTP_TIMEOUT));

        let builder = match &self.auth {
            AuthMode::None => {
                debug!("SMTP credentials not in use, skipping username/password authentication");
                builder
            }
            AuthMode::Credentials { username, password } => {
                builder.credentials(Credentials::new(username.clone(), password.clone()))
            }
        };

        Ok(builder.build())
    }
}
