use glam::{Mat4, Vec3};

/// Base matrices set by the manager.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MatrixSlot {
    ModelView,
    Projection,
}

impl MatrixSlot {
    pub const COUNT: usize = 2;
}

/// Matrices derived from the base slots and cached until invalidated.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum UniformMatrixSlot {
    /// `model_view * projection`.
    ModelViewProjection,
    /// Inverse of the model-view matrix.
    InverseModelView,
}

impl UniformMatrixSlot {
    pub const COUNT: usize = 2;
}

/// Fixed set of named matrices plus lazily derived uniform matrices.
///
/// Matrices are row-vector (`v' = v * M`), so a product reads left to right
/// in application order.
#[derive(Debug, Clone)]
pub struct MatrixCache {
    matrices: [Mat4; MatrixSlot::COUNT],
    uniforms: [Mat4; UniformMatrixSlot::COUNT],
    valid: [bool; UniformMatrixSlot::COUNT],
    computations: [u64; UniformMatrixSlot::COUNT],
}

impl Default for MatrixCache {
    fn default() -> Self {
        Self {
            matrices: [Mat4::IDENTITY; MatrixSlot::COUNT],
            uniforms: [Mat4::IDENTITY; UniformMatrixSlot::COUNT],
            valid: [false; UniformMatrixSlot::COUNT],
            computations: [0; UniformMatrixSlot::COUNT],
        }
    }
}

impl MatrixCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` and invalidates every uniform matrix.
    pub fn set_matrix(&mut self, slot: MatrixSlot, value: Mat4) {
        self.matrices[slot as usize] = value;
        self.clear_uniform_matrices();
    }

    pub fn matrix(&self, slot: MatrixSlot) -> &Mat4 {
        &self.matrices[slot as usize]
    }

    /// Returns the derived matrix, computing it on the first read after an
    /// invalidation.
    pub fn uniform_matrix(&mut self, slot: UniformMatrixSlot) -> &Mat4 {
        let i = slot as usize;
        if !self.valid[i] {
            let model_view = self.matrices[MatrixSlot::ModelView as usize];
            self.uniforms[i] = match slot {
                UniformMatrixSlot::ModelViewProjection => {
                    model_view * self.matrices[MatrixSlot::Projection as usize]
                }
                UniformMatrixSlot::InverseModelView => model_view.inverse(),
            };
            self.valid[i] = true;
            self.computations[i] += 1;
        }
        &self.uniforms[i]
    }

    pub fn clear_uniform_matrices(&mut self) {
        self.valid = [false; UniformMatrixSlot::COUNT];
    }

    pub fn is_uniform_valid(&self, slot: UniformMatrixSlot) -> bool {
        self.valid[slot as usize]
    }

    /// How many times `slot` has been recomputed since creation.
    pub fn computations(&self, slot: UniformMatrixSlot) -> u64 {
        self.computations[slot as usize]
    }
}

/// Row-vector translation.
pub fn translation(x: f32, y: f32) -> Mat4 {
    Mat4::from_translation(Vec3::new(x, y, 0.0)).transpose()
}

/// Row-vector scale followed by translation.
pub fn scale_translation(scale_x: f32, scale_y: f32, x: f32, y: f32) -> Mat4 {
    Mat4::from_scale(Vec3::new(scale_x, scale_y, 1.0)) * translation(x, y)
}

/// Row-vector orthographic projection mapping `(0,0)..(width,height)` with a
/// top-left origin onto clip space.
pub fn ortho(width: f32, height: f32) -> Mat4 {
    Mat4::orthographic_rh(0.0, width, height, 0.0, -1.0, 1.0).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    fn a() -> Mat4 {
        translation(10.0, 20.0)
    }

    fn b() -> Mat4 {
        Mat4::from_scale(Vec3::new(2.0, 3.0, 1.0))
    }

    // ── caching ───────────────────────────────────────────────────────────

    #[test]
    fn mvp_is_model_view_times_projection() {
        let mut cache = MatrixCache::new();
        cache.set_matrix(MatrixSlot::ModelView, a());
        cache.set_matrix(MatrixSlot::Projection, b());

        assert_eq!(*cache.uniform_matrix(UniformMatrixSlot::ModelViewProjection), a() * b());
    }

    #[test]
    fn uniform_is_computed_once_until_invalidated() {
        let mut cache = MatrixCache::new();
        cache.set_matrix(MatrixSlot::ModelView, a());
        cache.set_matrix(MatrixSlot::Projection, b());

        let slot = UniformMatrixSlot::ModelViewProjection;
        let first = *cache.uniform_matrix(slot);
        let second = *cache.uniform_matrix(slot);
        assert_eq!(first, second);
        assert_eq!(cache.computations(slot), 1);

        cache.clear_uniform_matrices();
        assert!(!cache.is_uniform_valid(slot));
        cache.uniform_matrix(slot);
        assert_eq!(cache.computations(slot), 2);
    }

    #[test]
    fn set_matrix_invalidates_every_uniform() {
        let mut cache = MatrixCache::new();
        cache.uniform_matrix(UniformMatrixSlot::ModelViewProjection);
        cache.uniform_matrix(UniformMatrixSlot::InverseModelView);

        cache.set_matrix(MatrixSlot::Projection, b());

        assert!(!cache.is_uniform_valid(UniformMatrixSlot::ModelViewProjection));
        assert!(!cache.is_uniform_valid(UniformMatrixSlot::InverseModelView));
    }

    #[test]
    fn get_matrix_returns_stored_value() {
        let mut cache = MatrixCache::new();
        cache.set_matrix(MatrixSlot::ModelView, a());
        assert_eq!(*cache.matrix(MatrixSlot::ModelView), a());
        assert_eq!(*cache.matrix(MatrixSlot::Projection), Mat4::IDENTITY);
    }

    // ── conventions ───────────────────────────────────────────────────────

    #[test]
    fn row_vector_translation_moves_points() {
        let p = Vec4::new(1.0, 1.0, 0.0, 1.0);
        let moved = translation(10.0, 20.0).transpose() * p;
        assert_eq!(moved, Vec4::new(11.0, 21.0, 0.0, 1.0));
    }

    #[test]
    fn ortho_maps_corners_to_clip_space() {
        // Row-vector product v * M is M^T * v in glam's column convention.
        let m = ortho(200.0, 100.0).transpose();
        let top_left = m * Vec4::new(0.0, 0.0, 0.0, 1.0);
        let bottom_right = m * Vec4::new(200.0, 100.0, 0.0, 1.0);
        assert!((top_left.x + 1.0).abs() < 1e-6 && (top_left.y - 1.0).abs() < 1e-6);
        assert!((bottom_right.x - 1.0).abs() < 1e-6 && (bottom_right.y + 1.0).abs() < 1e-6);
    }

    #[test]
    fn inverse_model_view_undoes_model_view() {
        let mut cache = MatrixCache::new();
        cache.set_matrix(MatrixSlot::ModelView, scale_translation(2.0, 2.0, 5.0, 5.0));
        let inv = *cache.uniform_matrix(UniformMatrixSlot::InverseModelView);
        let product = *cache.matrix(MatrixSlot::ModelView) * inv;
        assert!(product.abs_diff_eq(Mat4::IDENTITY, 1e-5));
    }
}
