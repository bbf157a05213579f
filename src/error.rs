//! Rejection taxonomy for soft-failing operations.
//!
//! Nothing in the engine is fatal. A rejected operation leaves every store
//! exactly as it was; the error only tells the caller *why* it was ignored.

use thiserror::Error;

use crate::models::{NoteId, TagKey, TagKind};

/// Result of an engine operation that may be ignored.
pub type Outcome<T = ()> = Result<T, Rejected>;

/// Reasons an operation had no effect.
#[derive(Debug, Error)]
pub enum Rejected {
    /// Content, name or label was empty or whitespace-only.
    #[error("text cannot be empty")]
    EmptyText,

    /// A time or date label with the same text already exists.
    #[error("{kind} label '{text}' already exists")]
    DuplicateLabel { kind: TagKind, text: String },

    /// No note has the given id.
    #[error("note {0} does not exist")]
    UnknownNote(NoteId),

    /// No tag matches the given key.
    #[error("{kind} tag {key} does not exist")]
    UnknownTag { kind: TagKind, key: TagKey },

    /// A reference was requested to text no live tag of that kind carries.
    #[error("no {kind} tag is named '{text}'")]
    UnregisteredText { kind: TagKind, text: String },

    /// The operation would not change anything.
    #[error("nothing to change")]
    Unchanged,

    /// A dropped drag payload could not be used.
    #[error("drag payload rejected: {0}")]
    Payload(#[from] PayloadError),
}

/// Problems with a drag payload received at drop time.
#[derive(Debug, Error)]
pub enum PayloadError {
    /// The drop carried no data on the expected channel.
    #[error("no payload")]
    Missing,

    /// The payload was not a valid serialized tag reference.
    #[error("malformed payload: {0}")]
    Malformed(#[source] serde_json::Error),
}

/// Errors parsing command-line style values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown tag kind '{0}' (expected character, place, time or date)")]
    UnknownKind(String),

    #[error("invalid tag key '{0}' (expected an id like 3 or a position like @0)")]
    BadKey(String),

    #[error("invalid drop mode '{0}' (expected overwrite or toggle)")]
    BadDropMode(String),
}
