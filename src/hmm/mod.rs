pub mod counts;
pub mod model;
pub mod smoothing;
pub mod tagger;
pub mod trainer;
mod context;
