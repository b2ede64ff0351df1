// File: snapgrade-common/src/models/mod.rs
pub mod analysis;
pub mod image;
pub mod user;

pub use analysis::{AnalysisCriteria, AnalysisResult};
pub use image::ImagePayload;
pub use user::{Entitlement, SignedInTier, User, UserTier};
