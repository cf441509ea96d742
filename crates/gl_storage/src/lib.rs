pub mod backends;
pub mod cleaned;
pub mod layout;

pub use backends::*;
pub use cleaned::CleanedStore;
pub use layout::DataLayout;

pub mod prelude {
    pub use super::backends::*;
    pub use super::cleaned::CleanedStore;
    pub use super::layout::DataLayout;
}
