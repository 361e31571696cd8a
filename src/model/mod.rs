pub mod analysis;
pub mod config;
pub mod correspondence;
pub mod evidence;
pub mod readiness;
pub mod sources;
pub mod strength;

pub use analysis::*;
pub use config::{AnalysisSettings, Config};
pub use correspondence::*;
pub use evidence::*;
pub use readiness::{DependencyState, Readiness};
pub use sources::*;
pub use strength::*;
