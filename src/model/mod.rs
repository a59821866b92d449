//! In-memory PDF model: documents and pages over lopdf's object types.

mod color;
mod document;
mod page;
pub mod value;

pub use color::Color;
pub use document::{Document, Metadata, Revision, DEFAULT_MEDIA_BOX};
pub use lopdf::content::{Content, Operation};
pub use lopdf::{Dictionary, Object, ObjectId, Stream, StringFormat};
pub use page::{Page, PageSize};
