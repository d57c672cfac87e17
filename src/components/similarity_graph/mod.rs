mod component;
pub mod model;
mod render;

pub use component::SimilarityGraph;
pub use model::{LabelMode, Mark, SimilarityView};
