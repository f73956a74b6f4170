//! Attachment sources and resolved attachments.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::errors::{MailerError, MailerResult};
use crate::providers::Driver;

/// Whether an attachment is rendered inline or offered as a download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Disposition {
    /// Regular attachment.
    #[default]
    Attachment,
    /// Inline content, referenced from HTML with `cid:`.
    Inline,
}

impl Disposition {
    /// Returns the wire name of the disposition.
    pub fn as_str(&self) -> &'static str {
        match self {
            Disposition::Attachment => "attachment",
            Disposition::Inline => "inline",
        }
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A byte stream registered as an attachment.
///
/// Readers are drained on tokio's blocking pool, so slow or file-backed
/// readers do not stall the runtime.
pub type AttachmentReader = Box<dyn Read + Send>;

/// Where an attachment's bytes come from. Resolved at send time.
pub enum AttachmentSource {
    /// A file on disk.
    File {
        /// Path to the file.
        path: PathBuf,
        /// Disposition of the attachment.
        disposition: Disposition,
    },
    /// A readable stream paired with a logical filename.
    Reader {
        /// Logical filename, used for the MIME type and attachment name.
        filename: String,
        /// The stream to drain. The mutex keeps the source `Sync` for any
        /// `Send` reader.
        reader: Mutex<AttachmentReader>,
        /// Disposition of the attachment.
        disposition: Disposition,
    },
}

impl AttachmentSource {
    /// Creates a reader source.
    pub fn reader(
        filename: impl Into<String>,
        reader: AttachmentReader,
        disposition: Disposition,
    ) -> Self {
        AttachmentSource::Reader {
            filename: filename.into(),
            reader: Mutex::new(reader),
            disposition,
        }
    }

    /// Returns the disposition of the source.
    pub fn disposition(&self) -> Disposition {
        match self {
            AttachmentSource::File { disposition, .. }
            | AttachmentSource::Reader { disposition, .. } => *disposition,
        }
    }
}

impl fmt::Debug for AttachmentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttachmentSource::File { path, disposition } => f
                .debug_struct("File")
                .field("path", path)
                .field("disposition", disposition)
                .finish(),
            AttachmentSource::Reader {
                filename,
                disposition,
                ..
            } => f
                .debug_struct("Reader")
                .field("filename", filename)
                .field("disposition", disposition)
                .finish_non_exhaustive(),
        }
    }
}

/// An attachment loaded into memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// File name (final path segment).
    pub filename: String,
    /// MIME type guessed from the extension; empty when unknown.
    pub content_type: String,
    /// Content ID, defaults to the filename.
    pub content_id: String,
    /// Disposition of the attachment.
    pub disposition: Disposition,
    /// Raw bytes.
    pub data: Vec<u8>,
}

impl Attachment {
    /// Creates an attachment from raw bytes, deriving the filename, MIME type
    /// and content ID from `name`.
    pub fn from_bytes(name: impl AsRef<Path>, data: Vec<u8>, disposition: Disposition) -> Self {
        let name = name.as_ref();
        let filename = name
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default();
        let content_type = mime_guess::from_path(name)
            .first()
            .map(|m| m.to_string())
            .unwrap_or_default();

        Self {
            content_id: filename.clone(),
            filename,
            content_type,
            disposition,
            data,
        }
    }

    /// Reads a file from disk.
    pub async fn from_file(path: impl AsRef<Path>, disposition: Disposition) -> MailerResult<Self> {
        let path = path.as_ref();
        let data = tokio::fs::read(path)
            .await
            .map_err(|e| MailerError::io(path, e))?;
        Ok(Self::from_bytes(path, data, disposition))
    }

    /// Returns the base64 encoded content.
    pub fn content(&self) -> String {
        BASE64.encode(&self.data)
    }

    /// Returns the size in bytes.
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Returns true for inline attachments.
    pub fn is_inline(&self) -> bool {
        self.disposition == Disposition::Inline
    }
}

/// Drains a reader on the blocking pool, reading at most `budget + 1`
/// bytes.
async fn drain_reader(reader: AttachmentReader, budget: u64) -> std::io::Result<Vec<u8>> {
    tokio::task::spawn_blocking(move || {
        let mut data = Vec::new();
        reader
            .take(budget.saturating_add(1))
            .read_to_end(&mut data)?;
        Ok(data)
    })
    .await
    .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?
}

/// Loads every source, enforcing the provider's byte ceiling.
///
/// File sizes come from file metadata and no file content is read until
/// every source fits. Reader sources are drained with the remaining budget,
/// so a reader is never read more than one byte past the ceiling. Output
/// order follows registration order.
pub async fn resolve_attachments(
    sources: Vec<AttachmentSource>,
    provider: Driver,
    max_bytes: u64,
) -> MailerResult<Vec<Attachment>> {
    enum Pending {
        File(PathBuf, Disposition),
        Loaded(Attachment),
    }

    let too_large = |actual: u64| MailerError::AttachmentTooLarge {
        provider,
        limit: max_bytes,
        actual,
    };

    let mut total: u64 = 0;
    let mut pending = Vec::with_capacity(sources.len());

    for source in sources {
        match source {
            AttachmentSource::File { path, disposition } => {
                let metadata = tokio::fs::metadata(&path)
                    .await
                    .map_err(|e| MailerError::io(&path, e))?;
                total += metadata.len();
                pending.push(Pending::File(path, disposition));
            }
            AttachmentSource::Reader {
                filename,
                reader,
                disposition,
            } => {
                let reader = reader.into_inner().unwrap_or_else(PoisonError::into_inner);
                let data = drain_reader(reader, max_bytes.saturating_sub(total))
                    .await
                    .map_err(|e| MailerError::io(&filename, e))?;
                total += data.len() as u64;
                pending.push(Pending::Loaded(Attachment::from_bytes(
                    &filename,
                    data,
                    disposition,
                )));
            }
        }

        if total > max_bytes {
            return Err(too_large(total));
        }
    }

    let mut attachments = Vec::with_capacity(pending.len());
    for item in pending {
        match item {
            Pending::File(path, disposition) => {
                attachments.push(Attachment::from_file(&path, disposition).await?);
            }
            Pending::Loaded(attachment) => attachments.push(attachment),
        }
    }

    tracing::debug!(count = attachments.len(), total_bytes = total, "Resolved attachments");
    Ok(attachments)
}
