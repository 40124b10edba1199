//! Shared stage state handed to every component.

use stage_core::{
    ContainerRegistry, DisplayKind, DisplayTree, EngineState, EntityStore, Layer, StageConfig,
    StageMode,
};
use stage_render::RenderScheduler;

/// Root layers in paint order. The active object container is inserted at
/// `StageConfig::container_index`, between variables and dialogs.
const ROOT_LAYERS: [Layer; 6] = [
    Layer::Background,
    Layer::Variables,
    Layer::Dialogs,
    Layer::Coordinator,
    Layer::Handle,
    Layer::Wall,
];

pub struct StageContext {
    pub config: StageConfig,
    pub mode: StageMode,
    pub engine: EngineState,
    pub display: DisplayTree,
    pub containers: ContainerRegistry,
    pub entities: EntityStore,
    pub scheduler: RenderScheduler,
}

impl StageContext {
    pub fn new(config: StageConfig, mode: StageMode) -> Self {
        let mut display = DisplayTree::new();
        for layer in ROOT_LAYERS {
            let idx = display.add_node(DisplayKind::Layer(layer));
            display.attach(display.root, idx, None);
            // The coordinate grid starts hidden.
            if layer == Layer::Coordinator
                && let Some(node) = display.node_mut(idx)
            {
                node.visible = false;
            }
        }
        let scheduler = RenderScheduler::new(config.frame_interval_ms);

        Self {
            config,
            mode,
            engine: EngineState::Stopped,
            display,
            containers: ContainerRegistry::new(),
            entities: EntityStore::new(),
            scheduler,
        }
    }

    pub fn is_visual(&self) -> bool {
        self.mode == StageMode::Visual
    }
}
