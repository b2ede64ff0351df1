pub mod analysis_traits;

pub use analysis_traits::{BasicAnalysisBackend, FullAnalysisBackend};
