mod vault;
mod writer;

pub use vault::{StorageError, Vault};
pub use writer::NoteWriter;
