use crate::geometry::Vec2;

/// The single focus the canvas is in. Menus, the rename dialog and linking
/// exclude each other, so only one can ever be active.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum InteractionMode {
    #[default]
    Idle,
    BubbleMenuOpen {
        bubble_id: String,
        screen_pos: Vec2,
    },
    BackgroundMenuOpen {
        world_pos: Vec2,
        screen_pos: Vec2,
    },
    RenameDialog {
        bubble_id: String,
        current_name: String,
    },
    LinkingFrom {
        source_id: String,
    },
}

impl InteractionMode {
    pub fn is_menu_open(&self) -> bool {
        matches!(
            self,
            Self::BubbleMenuOpen { .. } | Self::BackgroundMenuOpen { .. }
        )
    }

    pub fn linking_source(&self) -> Option<&str> {
        match self {
            Self::LinkingFrom { source_id } => Some(source_id),
            _ => None,
        }
    }
}

/// What a pointer gesture landed on, decided by the input layer.
#[derive(Clone, Debug, PartialEq)]
pub enum PointerTarget {
    Bubble { id: String, local_offset: Vec2 },
    Background,
}

/// Already-classified pointer input. Positions are in screen space.
#[derive(Clone, Debug, PartialEq)]
pub enum PointerEvent {
    Tap {
        screen_pos: Vec2,
        target: PointerTarget,
    },
    LongPress {
        screen_pos: Vec2,
        target: PointerTarget,
    },
    DragStart {
        screen_pos: Vec2,
        target: PointerTarget,
    },
    DragMove {
        screen_pos: Vec2,
        delta: Vec2,
    },
    DragEnd,
    Zoom {
        factor: f32,
        centroid: Vec2,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BubbleMenuAction {
    Link,
    Rename,
    UnlinkAll,
    ViewContent,
}

impl BubbleMenuAction {
    pub const ALL: [Self; 4] = [Self::Link, Self::Rename, Self::UnlinkAll, Self::ViewContent];

    pub fn label(self) -> &'static str {
        match self {
            Self::Link => "Link",
            Self::Rename => "Rename",
            Self::UnlinkAll => "Unlink All",
            Self::ViewContent => "View Content",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackgroundMenuAction {
    AddBubble,
}

impl BackgroundMenuAction {
    pub fn label(self) -> &'static str {
        match self {
            Self::AddBubble => "Add Bubble Here",
        }
    }
}

/// Tells the scheduler owner to pause or restart ticking.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimulationHint {
    Suspend,
    Resume,
}
