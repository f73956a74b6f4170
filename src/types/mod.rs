//! Message model types.

pub mod address;
pub mod attachment;
pub mod message;

pub use address::Address;
pub use attachment::{resolve_attachments, Attachment, AttachmentReader, AttachmentSource, Disposition};
pub use message::Message;
