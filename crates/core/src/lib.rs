pub mod chunk;
pub mod config;
pub mod document;
pub mod error;
pub mod manifest;

pub use chunk::*;
pub use config::Config;
pub use document::*;
pub use error::*;
pub use manifest::*;
