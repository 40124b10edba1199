pub mod config;
pub mod container;
pub mod display;
pub mod entity;
pub mod handle;
pub mod id;
pub mod state;
pub mod transform;

pub use config::StageConfig;
pub use container::{ContainerRegistry, ObjectContainer};
pub use display::{DisplayKind, DisplayNode, DisplayTree, Layer};
pub use entity::{Entity, EntityStore};
pub use handle::{Capabilities, Handle};
pub use id::{EntityId, SceneId};
pub use state::{EngineState, StageMode};
pub use transform::{EntityTransform, ObjectType, RotateMethod, TextAlign};

// Re-export petgraph types so downstream crates don't need a direct dependency
pub use petgraph::graph::NodeIndex;
