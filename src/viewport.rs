use crate::geometry::Vec2;

pub const MIN_SCALE: f32 = 0.1;
pub const MAX_SCALE: f32 = 10.0;

/// Pan offset and zoom factor mapping world space onto the screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    scale: f32,
    pan_offset: Vec2,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            scale: 1.0,
            pan_offset: Vec2::ZERO,
        }
    }
}

impl Viewport {
    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn pan_offset(&self) -> Vec2 {
        self.pan_offset
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        world * self.scale + self.pan_offset
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        (screen - self.pan_offset) / self.scale
    }

    pub fn pan(&mut self, delta: Vec2) {
        if delta.is_finite() {
            self.pan_offset += delta;
        }
    }

    /// Zooms by `factor` keeping the world point under `centroid` fixed on
    /// screen. The anchor is resolved with the pre-zoom transform.
    pub fn zoom(&mut self, factor: f32, centroid: Vec2) {
        if !factor.is_finite() || factor <= 0.0 || !centroid.is_finite() {
            return;
        }

        let new_scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        let world_point = self.screen_to_world(centroid);
        self.pan_offset = centroid - world_point * new_scale;
        self.scale = new_scale;
    }
}
