pub mod changelog;
pub mod closewait;
pub mod emit;
pub mod release_notes;
pub mod versions;

pub use crate::domain::model::{ConnectionRecord, ProcessRecord, ReleaseNote, VersionSpec};
pub use crate::domain::ports::{MajorVersionResolver, PageFetcher, ProcessSource};
pub use crate::utils::error::Result;
