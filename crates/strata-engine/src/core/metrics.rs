use crate::coords::Vec2;

/// Screen geometry supplied by the platform layer.
///
/// Read by the view-mapping helpers of the render manager; never written.
pub trait ScreenMetrics: Send + Sync {
    /// Physical pixels per virtual unit.
    fn virtual_to_physical_factor(&self) -> f32;

    /// Top-left corner of the visible virtual screen, in virtual units.
    fn virtual_screen_min(&self) -> Vec2;

    /// Offset of the drawable area inside the framebuffer, in physical pixels.
    fn physical_draw_offset(&self) -> Vec2;
}

/// Plain-value [`ScreenMetrics`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ScreenGeometry {
    pub virtual_to_physical: f32,
    pub virtual_min: Vec2,
    pub physical_offset: Vec2,
}

impl ScreenGeometry {
    /// Virtual units are physical pixels.
    pub const fn identity() -> Self {
        Self {
            virtual_to_physical: 1.0,
            virtual_min: Vec2::zero(),
            physical_offset: Vec2::zero(),
        }
    }

    /// Fits a virtual screen into a physical one, preserving aspect ratio and
    /// centering the result (letterbox / pillarbox).
    pub fn fitted(virtual_size: Vec2, physical_size: Vec2) -> Self {
        if virtual_size.x <= 0.0 || virtual_size.y <= 0.0 {
            return Self::identity();
        }
        let factor = (physical_size.x / virtual_size.x).min(physical_size.y / virtual_size.y);
        let used = virtual_size * factor;
        Self {
            virtual_to_physical: factor,
            virtual_min: Vec2::zero(),
            physical_offset: (physical_size - used) / 2.0,
        }
    }
}

impl Default for ScreenGeometry {
    fn default() -> Self {
        Self::identity()
    }
}

impl ScreenMetrics for ScreenGeometry {
    fn virtual_to_physical_factor(&self) -> f32 {
        self.virtual_to_physical
    }

    fn virtual_screen_min(&self) -> Vec2 {
        self.virtual_min
    }

    fn physical_draw_offset(&self) -> Vec2 {
        self.physical_offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fitted_pillarboxes_wide_screens() {
        let g = ScreenGeometry::fitted(Vec2::new(480.0, 320.0), Vec2::new(1200.0, 640.0));
        assert_eq!(g.virtual_to_physical, 2.0);
        assert_eq!(g.physical_offset, Vec2::new(120.0, 0.0));
    }

    #[test]
    fn degenerate_virtual_size_is_identity() {
        assert_eq!(
            ScreenGeometry::fitted(Vec2::zero(), Vec2::new(10.0, 10.0)),
            ScreenGeometry::identity()
        );
    }
}
