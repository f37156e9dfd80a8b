// Adapters layer: concrete implementations of the domain ports.

pub mod http;
pub mod process;

pub use http::HttpFetcher;
pub use process::SystemProcessSource;
