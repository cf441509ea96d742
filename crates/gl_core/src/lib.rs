pub mod error;
pub mod storage;
pub mod types;
pub mod urls;

pub use error::Error;
pub use storage::PageStorage;
pub use types::*;
pub type Result<T> = std::result::Result<T, Error>;
