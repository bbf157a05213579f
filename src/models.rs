mod color;
mod ids;
mod note;
mod tag;
mod tag_kind;

pub use color::{Color, DEFAULT_COLOR};
pub use ids::{NoteId, TagId};
pub use note::{Note, NoteBuilder};
pub use tag::{Label, NamedTag, TagEntry, TagKey};
pub use tag_kind::TagKind;
