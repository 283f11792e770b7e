pub mod document;
pub mod storage;

pub use document::{DocumentFormat, RenderError, ShoppingListEntry, ShoppingListRenderer};
pub use storage::{FilesystemMediaStore, MediaStore, StorageError};
