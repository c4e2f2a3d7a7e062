pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::file::FileConfig;
pub use config::storage::LocalStorage;
pub use config::CliConfig;
pub use core::{engine::CheckEngine, pipeline::PortalPipeline};
pub use utils::error::{CheckError, Result};
