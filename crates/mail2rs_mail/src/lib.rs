//! Outbound email assembly and SMTP dispatch.
//!
//! Message structure follows the usual MIME layout: a single body part
//! (plain text or HTML) optionally wrapped in `multipart/mixed` together
//! with file attachments. MIME encoding and the SMTP exchange itself are
//! handled by [`lettre`].

pub use crate::{
    mail::{Attachment, Mail, MailError},
    transport::{AuthMode, SMTP_TIMEOUT, TlsMode, TransportPolicy, UnknownTlsMode},
};

pub mod mail;
pub mod transport;
