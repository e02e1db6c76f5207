use std::{
    io,
    path::{Path, PathBuf},
    str::FromStr,
};

use lettre::{
    AsyncTransport, Message,
    message::{Mailbox, MultiPart, SinglePart, header::ContentType},
};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::transport::TransportPolicy;

#[derive(Debug, Error)]
pub enum MailError {
    #[error(transparent)]
    LettreError(#[from] lettre::error::Error),

    #[error(transparent)]
    AddressError(#[from] lettre::address::AddressError),

    #[error(transparent)]
    SmtpError(#[from] lettre::transport::smtp::Error),

    #[error("cannot read attachment {path}: {source}")]
    AttachmentUnreadable { path: PathBuf, source: io::Error },
}

/// File attachment with MIME type inferred from the file extension.
#[derive(Clone, Debug)]
pub struct Attachment {
    filename: String,
    content: Vec<u8>,
    mime_type: &'static str,
}

impl Attachment {
    /// Reads the whole file at `path` into a new [`Attachment`].
    ///
    /// The disposition filename is the base name of `path`. Any failure to
    /// open or read the file aborts message construction; no partial
    /// message is ever sent.
    pub fn read(path: &Path) -> Result<Self, MailError> {
        let content =
            std::fs::read(path).map_err(|source| MailError::AttachmentUnreadable {
                path: path.to_path_buf(),
                source,
            })?;
        let filename = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |name| {
                name.to_string_lossy().into_owned()
            });

        Ok(Self {
            filename,
            content,
            mime_type: mime_type(path),
        })
    }

    /// Getter for `filename`.
    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Getter for `mime_type`.
    #[must_use]
    pub fn mime_type(&self) -> &'static str {
        self.mime_type
    }
}

impl From<Attachment> for SinglePart {
    fn from(attachment: Attachment) -> Self {
        // The mapping below only emits valid MIME types.
        let content_type = attachment.mime_type.parse::<ContentType>().unwrap();
        lettre::message::Attachment::new(attachment.filename)
            .body(attachment.content, content_type)
    }
}

/// Infer a MIME type from the file extension.
/// Unknown extensions fall back to `application/octet-stream`.
pub(crate) fn mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase());
    match ext.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    }
}

/// A single outbound email message.
///
/// Constructed fresh per invocation from resolved settings and discarded
/// after dispatch, successful or not.
#[derive(Clone, Debug)]
pub struct Mail {
    from: String,
    to: Vec<String>,
    reply_to: Option<String>,
    subject: String,
    body: String,
    // Body came from a file; rendered as text/html.
    html: bool,
    attachments: Vec<Attachment>,
}

impl Mail {
    /// Create new [`Mail`] with a plain-text body.
    #[must_use]
    pub fn new<F, S>(from: F, to: Vec<String>, subject: S, body: String) -> Mail
    where
        F: Into<String>,
        S: Into<String>,
    {
        Self {
            from: from.into(),
            to,
            reply_to: None,
            subject: subject.into(),
            body,
            html: false,
            attachments: Vec::new(),
        }
    }

    /// Setter for `reply_to`.
    #[must_use]
    pub fn with_reply_to(mut self, reply_to: Option<String>) -> Self {
        self.reply_to = reply_to.filter(|addr| !addr.is_empty());
        self
    }

    /// Render the body as `text/html` instead of `text/plain`.
    ///
    /// Selection is based on where the body came from (a body file), never
    /// on sniffing the content itself.
    #[must_use]
    pub fn html(mut self, html: bool) -> Self {
        self.html = html;
        self
    }

    /// Setter for `attachments`.
    #[must_use]
    pub fn set_attachments(mut self, attachments: Vec<Attachment>) -> Self {
        self.attachments = attachments;
        self
    }

    /// Getter for `to`.
    #[must_use]
    pub fn to(&self) -> &[String] {
        &self.to
    }

    /// Getter for `subject`.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Converts Mail to lettre Message.
    /// Message structure should look like this:
    /// - multipart mixed (only when attachments are present)
    ///   - singlepart: plain text or HTML body
    ///   - singlepart: attachment 1
    ///   - singlepart: attachment 2
    pub fn into_message(self) -> Result<Message, MailError> {
        let mut builder = Message::builder()
            .from(Mailbox::from_str(&self.from)?)
            .subject(self.subject);
        for to in &self.to {
            builder = builder.to(Mailbox::from_str(to)?);
        }
        if let Some(reply_to) = &self.reply_to {
            builder = builder.reply_to(Mailbox::from_str(reply_to)?);
        }

        let body = if self.html {
            SinglePart::html(self.body)
        } else {
            SinglePart::plain(self.body)
        };

        if self.attachments.is_empty() {
            Ok(builder.singlepart(body)?)
        } else {
            let mut mixed = MultiPart::mixed().singlepart(body);
            for attachment in self.attachments {
                mixed = mixed.singlepart(attachment.into());
            }
            Ok(builder.multipart(mixed)?)
        }
    }

    /// Sends the message using SMTP. Single attempt, no retry.
    pub async fn send(
        self,
        policy: &TransportPolicy,
        server: &str,
        port: u16,
    ) -> Result<(), MailError> {
        let (from, to) = (self.from.clone(), self.to.join(", "));
        debug!("Sending mail to: {to}, subject: {}", self.subject);

        let message = match self.into_message() {
            Ok(message) => message,
            Err(err) => {
                error!("Failed to build message to: {to}, error: {err}");
                return Err(err);
            }
        };

        let mailer = policy.mailer(server, port)?;
        match mailer.send(message).await {
            Ok(response) => {
                info!("Mail sent to: {to} from: {from}, response: {response:?}");
                Ok(())
            }
            Err(err) => {
                error!("Failed to send mail to: {to}, error: {err}");
                Err(err.into())
            }
        }
    }
}
