//! Generational resource handles.
//!
//! A `Handle` is a claim ticket `{index, generation}` into a `HandleTable`.
//! Handles are plain values: they can be copied, sent across threads and
//! stored anywhere. Every dereference goes through the table, which rejects
//! handles whose slot was freed or recycled since the handle was issued.

mod error;
mod id;
mod table;

pub use error::{HandleError, TableError};
pub use id::{Handle, MeshHandle, TextureHandle};
pub use table::HandleTable;
