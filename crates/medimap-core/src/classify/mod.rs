pub mod engine;
pub mod outcome;

pub use engine::classify;
pub use outcome::ClassificationResult;
