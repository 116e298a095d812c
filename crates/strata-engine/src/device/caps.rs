use super::types::PrimitiveType;

/// Upper bound on texture units tracked by the state cache.
pub const MAX_TEXTURE_UNITS: usize = 4;

/// Hardware capabilities queried once when the device is created.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Caps {
    /// Texture units usable by the state cache, never above [`MAX_TEXTURE_UNITS`].
    pub max_texture_units: usize,
    pub hardware_cursor: bool,
    pub etc2_textures: bool,
    pub bc_textures: bool,
    pub bgra8888: bool,
    pub float16_textures: bool,
    pub float32_filterable: bool,
}

impl Default for Caps {
    fn default() -> Self {
        Self {
            max_texture_units: MAX_TEXTURE_UNITS,
            hardware_cursor: false,
            etc2_textures: false,
            bc_textures: false,
            bgra8888: true,
            float16_textures: false,
            float32_filterable: false,
        }
    }
}

/// Per-frame draw statistics.
///
/// Mutated by draw calls, cleared by `RenderManager::begin_frame`.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Stats {
    pub draw_arrays_calls: u32,
    pub draw_elements_calls: u32,
    pub primitive_count: [u32; PrimitiveType::COUNT],
}

impl Stats {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub(crate) fn record_arrays(&mut self, primitive: PrimitiveType, vertices: u32) {
        self.draw_arrays_calls += 1;
        self.primitive_count[primitive.index()] += primitive.primitive_count(vertices);
    }

    pub(crate) fn record_elements(&mut self, primitive: PrimitiveType, indices: u32) {
        self.draw_elements_calls += 1;
        self.primitive_count[primitive.index()] += primitive.primitive_count(indices);
    }

    /// Primitives submitted for `primitive` this frame.
    #[inline]
    pub fn primitives(&self, primitive: PrimitiveType) -> u32 {
        self.primitive_count[primitive.index()]
    }

    /// Total draw calls of either kind.
    #[inline]
    pub fn draw_calls(&self) -> u32 {
        self.draw_arrays_calls + self.draw_elements_calls
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_and_clears() {
        let mut stats = Stats::default();
        stats.record_arrays(PrimitiveType::TriangleList, 6);
        stats.record_elements(PrimitiveType::TriangleStrip, 4);
        stats.record_elements(PrimitiveType::TriangleList, 3);

        assert_eq!(stats.draw_arrays_calls, 1);
        assert_eq!(stats.draw_elements_calls, 2);
        assert_eq!(stats.primitives(PrimitiveType::TriangleList), 3);
        assert_eq!(stats.primitives(PrimitiveType::TriangleStrip), 2);
        assert_eq!(stats.draw_calls(), 3);

        stats.clear();
        assert_eq!(stats, Stats::default());
    }
}
