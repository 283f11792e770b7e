mod error;
mod hash;
mod traits;

pub mod filesystem;

pub use error::StorageError;
pub use filesystem::FilesystemMediaStore;
pub use hash::ContentHash;
pub use traits::{MediaStore, validate_key};
