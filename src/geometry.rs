pub use eframe::egui::{Vec2, vec2};

/// Extra vector helpers used by the simulation and the viewport.
pub trait VecExt {
    fn magnitude(self) -> f32;
    /// Skips the square root when only comparing against a squared threshold.
    fn magnitude_squared(self) -> f32;
    /// Unit vector in the same direction, or zero for a zero-length input.
    fn normalized_or_zero(self) -> Vec2;
}

impl VecExt for Vec2 {
    fn magnitude(self) -> f32 {
        self.magnitude_squared().sqrt()
    }

    fn magnitude_squared(self) -> f32 {
        (self.x * self.x) + (self.y * self.y)
    }

    fn normalized_or_zero(self) -> Vec2 {
        let magnitude = self.magnitude();
        if magnitude > 0.0 && magnitude.is_finite() {
            self / magnitude
        } else {
            Vec2::ZERO
        }
    }
}
