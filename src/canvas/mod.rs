use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::warn;

use crate::geometry::{Vec2, VecExt};
use crate::graph::{Bubble, BubbleGraph, Link, SnapshotStore, load_or_default};
use crate::physics::{SimulationParams, step};
use crate::viewport::Viewport;

mod interaction;
mod mode;

pub use mode::{
    BackgroundMenuAction, BubbleMenuAction, InteractionMode, PointerEvent, PointerTarget,
    SimulationHint,
};

/// Smallest on-screen touch radius, so tiny or far-zoomed bubbles stay hittable.
pub const MIN_TOUCH_RADIUS: f32 = 24.0;

pub type SharedCanvas = Arc<Mutex<Canvas>>;

pub fn lock(shared: &SharedCanvas) -> MutexGuard<'_, Canvas> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Everything the renderer needs for one frame, taken under a single lock.
#[derive(Clone, Debug)]
pub struct CanvasSnapshot {
    pub bubbles: Arc<Vec<Bubble>>,
    pub links: Arc<Vec<Link>>,
    pub viewport: Viewport,
    pub mode: InteractionMode,
    pub selected_content: Option<String>,
    pub revision: u64,
}

impl CanvasSnapshot {
    pub fn bubble(&self, id: &str) -> Option<&Bubble> {
        self.bubbles.iter().find(|bubble| bubble.id == id)
    }
}

#[derive(Clone, Debug, PartialEq)]
enum DragState {
    Bubble(String),
    Pan,
    Ignored,
}

/// Sole owner of the graph, viewport and interaction state.
pub struct Canvas {
    graph: BubbleGraph,
    viewport: Viewport,
    mode: InteractionMode,
    selected_content: Option<String>,
    drag: Option<DragState>,
    params: SimulationParams,
    rng: StdRng,
    store: Box<dyn SnapshotStore>,
    revision: u64,
}

impl Canvas {
    pub fn new(store: impl SnapshotStore + 'static, params: SimulationParams) -> Self {
        let graph = load_or_default(&store);
        Self {
            graph,
            viewport: Viewport::default(),
            mode: InteractionMode::Idle,
            selected_content: None,
            drag: None,
            params,
            rng: StdRng::from_entropy(),
            store: Box::new(store),
            revision: 0,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn into_shared(self) -> SharedCanvas {
        Arc::new(Mutex::new(self))
    }

    pub fn snapshot(&self) -> CanvasSnapshot {
        CanvasSnapshot {
            bubbles: Arc::clone(self.graph.bubbles()),
            links: Arc::clone(self.graph.links()),
            viewport: self.viewport,
            mode: self.mode.clone(),
            selected_content: self.selected_content.clone(),
            revision: self.revision,
        }
    }

    pub fn graph(&self) -> &BubbleGraph {
        &self.graph
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn mode(&self) -> &InteractionMode {
        &self.mode
    }

    pub fn selected_content(&self) -> Option<&str> {
        self.selected_content.as_deref()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_dragging_bubble(&self) -> bool {
        matches!(self.drag, Some(DragState::Bubble(_)))
    }

    /// Scheduled ticks pause while a bubble is dragged or a menu is open.
    pub fn simulation_held(&self) -> bool {
        self.is_dragging_bubble() || self.mode.is_menu_open()
    }

    /// Runs one simulation tick; returns whether the bubble set changed.
    pub fn tick(&mut self) -> bool {
        match step(self.graph.bubbles(), &self.params, &mut self.rng) {
            Some(next) => {
                self.graph.replace_bubbles(next);
                self.bump();
                true
            }
            None => false,
        }
    }

    pub fn scheduled_tick(&mut self) -> bool {
        if self.simulation_held() {
            return false;
        }
        self.tick()
    }

    /// Topmost bubble whose touch circle contains `screen_pos`.
    pub fn hit_test(&self, screen_pos: Vec2) -> PointerTarget {
        let scale = self.viewport.scale();
        self.graph
            .bubbles()
            .iter()
            .rev()
            .find_map(|bubble| {
                let centre = self.viewport.world_to_screen(bubble.position);
                let touch_radius = (bubble.radius * scale).max(MIN_TOUCH_RADIUS);
                let local_offset = screen_pos - centre;
                (local_offset.magnitude_squared() <= touch_radius * touch_radius).then(|| {
                    PointerTarget::Bubble {
                        id: bubble.id.clone(),
                        local_offset,
                    }
                })
            })
            .unwrap_or(PointerTarget::Background)
    }

    /// Writes the current graph to the store, e.g. on shutdown.
    pub fn persist(&self) {
        if let Err(error) = self.store.save(&self.graph) {
            warn!("failed to save bubble graph: {error:#}");
        }
    }

    fn set_mode(&mut self, mode: InteractionMode) {
        if self.mode != mode {
            self.mode = mode;
            self.bump();
        }
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}
