pub mod file;
pub mod memory;

pub use file::{list_records, read_record, FileStorage};
pub use memory::MemoryStorage;
