mod component;
pub mod engine;
mod hierarchy;
pub mod layout;
mod render;
pub mod scale;
mod scene;
pub mod simulation;
mod state;
mod types;

pub use component::ForceGraphCanvas;
pub use engine::{LayoutEngine, Phase, SimulationHandle};
pub use layout::LayoutKind;
pub use types::{Attributes, Graph, GraphData, GraphLink, GraphNode, Point, Viewport};
