//! Outfit recommendations derived from weather conditions.
//!
//! `engine` turns raw readings into a categorized garment list; `presenter`
//! formats one for display. Both are pure and synchronous.

pub mod engine;
pub mod presenter;

pub use engine::{recommend, OutfitRecommendation};
pub use presenter::{advice, present, OutfitPresentation};
