pub mod classifier;
pub mod config;
pub mod digest;
pub mod fetcher;
pub mod filter;
pub mod oracle;
pub mod parser;
pub mod pipeline;
pub mod site;
pub mod sources;
pub mod store;
pub mod types;
pub mod utils;

pub use classifier::{classify, Category};
pub use config::PipelineConfig;
pub use digest::{build_digest, category_counts, scam_alerts, summary_fallback};
pub use fetcher::Fetcher;
pub use filter::FilterMode;
pub use oracle::{MockOracle, OpenAiOracle, Oracle};
pub use pipeline::Pipeline;
pub use store::DataStore;
pub use types::*;
