pub mod recommendations;

pub use recommendations::{RecommendationKey, RecommendationStore};
