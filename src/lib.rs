pub mod cascade;
pub mod config;
pub mod drag;
pub mod error;
mod models;
pub mod notes;
pub mod registry;
pub mod service;
pub mod session;
pub mod timeline;
pub mod utils;

pub use config::Config;
pub use drag::{DragPayload, DropMode};
pub use error::{Outcome, PayloadError, Rejected};
pub use models::{
    Color, DEFAULT_COLOR, Label, NamedTag, Note, NoteBuilder, NoteId, TagEntry, TagId, TagKey,
    TagKind,
};
pub use service::Workspace;
