pub mod analysis;
pub mod cache;
pub mod corpus;
pub mod correspondence;
pub mod delta;
pub mod error;
pub mod fingerprint;
pub mod momentum;
pub mod scoring;
pub mod strength;
pub mod versions;

pub use analysis::AnalysisService;
pub use cache::AnalysisCache;
pub use error::AnalysisError;
