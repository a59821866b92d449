//! PDF serialization.

mod serializer;

pub use serializer::{save, write_full, write_incremental, SaveMode};
