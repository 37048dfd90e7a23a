//! Message data model for edge-device ↔ transfer-bot exchange.
//!
//! Defines the four low-bandwidth record kinds ([`Status`],
//! [`DataSnippet`], [`Config`], [`General`]), the self-describing tagged
//! parameter codec they share, and the decoded form of the engine's
//! execution status report. Artifact placement, the bot process, and
//! the filesystem live in the `edgelink` crate; this crate is pure data.

mod error;
mod exec;
mod message;
mod param;

pub use error::{Error, ParamPosition, Result};
pub use exec::{CommsStatus, Direction, ExecStatus, HbConnectionStatus, LbConnectionStatus};
pub use message::{
    Config, DataSnippet, General, HeadingRef, SnippetFields, SnippetType, Status, StatusFields,
};
pub use param::{Identifier, TaggedParam, Value, decode, encode};
