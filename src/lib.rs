pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::{ChangelogArgs, CloseWaitArgs};

pub use adapters::{HttpFetcher, SystemProcessSource};
pub use config::ScoutConfig;
pub use crate::core::{changelog::ChangelogScanner, closewait::CloseWaitScanner};
pub use utils::error::{Result, ScoutError};
