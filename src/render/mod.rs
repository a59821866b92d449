//! Rendering of analysis results for output.

mod json;
mod text;

pub use json::{to_json, to_json_batch, JsonFormat};
pub use text::to_text;
