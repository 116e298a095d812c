use std::sync::Arc;

use glam::Mat4;

use crate::device::{IndexFormat, IndexSource, PrimitiveType};

use super::super::effect::RenderEffect;
use super::super::matrix::{MatrixSlot, UniformMatrixSlot};
use super::RenderManager;

impl RenderManager {
    // ── effect ────────────────────────────────────────────────────────────

    /// Replaces the current effect, releasing the previous one. With `None`
    /// bound, draws do nothing.
    pub fn set_render_effect(&mut self, effect: Option<Arc<dyn RenderEffect>>) {
        if self.debug {
            log::debug!(
                "render effect {:?} -> {:?}",
                self.effect.as_ref().map(|e| e.name().to_owned()),
                effect.as_ref().map(|e| e.name().to_owned())
            );
        }
        self.effect = effect;
    }

    pub fn render_effect(&self) -> Option<&Arc<dyn RenderEffect>> {
        self.effect.as_ref()
    }

    pub fn draw_arrays(&mut self, primitive: PrimitiveType, first: u32, count: u32) {
        let Some(effect) = self.effect.clone() else {
            return;
        };
        self.prepare_real_matrix();
        effect.draw_arrays(&mut self.effect_ctx(), primitive, first, count);
    }

    pub fn draw_elements(
        &mut self,
        primitive: PrimitiveType,
        count: u32,
        format: IndexFormat,
        indices: IndexSource<'_>,
    ) {
        let Some(effect) = self.effect.clone() else {
            return;
        };
        self.prepare_real_matrix();
        effect.draw_elements(&mut self.effect_ctx(), primitive, count, format, indices);
    }

    // ── matrices ──────────────────────────────────────────────────────────

    /// Stores `value` in `slot`. Every uniform matrix is recomputed on its
    /// next read.
    pub fn set_matrix(&mut self, slot: MatrixSlot, value: Mat4) {
        self.matrices.set_matrix(slot, value);
        if slot == MatrixSlot::ModelView {
            self.applied_real = None;
        }
    }

    pub fn matrix(&self, slot: MatrixSlot) -> Mat4 {
        *self.matrices.matrix(slot)
    }

    pub fn uniform_matrix(&mut self, slot: UniformMatrixSlot) -> Mat4 {
        *self.matrices.uniform_matrix(slot)
    }

    pub fn clear_uniform_matrices(&mut self) {
        self.matrices.clear_uniform_matrices();
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::coords::{ColorRgba, Vec2};
    use crate::device::{DeviceCall, VertexStream};
    use crate::render::matrix;

    // ── dispatch ──────────────────────────────────────────────────────────

    #[test]
    fn draws_without_an_effect_are_silent() {
        let (mut manager, journal) = manager();
        manager.draw_arrays(PrimitiveType::TriangleList, 0, 3);
        manager.draw_elements(
            PrimitiveType::TriangleList,
            3,
            IndexFormat::U16,
            IndexSource::Client(&[0; 6]),
        );

        assert!(journal.is_empty());
        assert_eq!(manager.stats().draw_calls(), 0);
    }

    #[test]
    fn effect_draw_flushes_then_uploads_then_draws() {
        let (mut manager, journal) = manager();
        let flat = manager.builtin_effects().unwrap().flat_color.clone();
        manager.set_render_effect(Some(flat));
        manager.set_color_rgba(ColorRgba::new(0.0, 1.0, 0.0, 1.0));
        manager.draw_arrays(PrimitiveType::TriangleStrip, 0, 4);

        let calls = journal.calls();
        let color = calls
            .iter()
            .position(|c| *c == DeviceCall::SetColor(ColorRgba::new(0.0, 1.0, 0.0, 1.0)))
            .unwrap();
        let stream = calls
            .iter()
            .position(|c| *c == DeviceCall::SetVertexStream(VertexStream::Position, true))
            .unwrap();
        let upload = calls
            .iter()
            .position(|c| matches!(c, DeviceCall::SetUniformMatrix(_)))
            .unwrap();
        let draw = calls.iter().position(|c| matches!(c, DeviceCall::DrawArrays { .. })).unwrap();
        assert!(color < upload && stream < upload && upload < draw);
        assert_eq!(manager.stats().primitives(PrimitiveType::TriangleStrip), 2);
    }

    #[test]
    fn uploaded_matrix_includes_the_draw_transform() {
        let (mut manager, journal) = manager();
        let flat = manager.builtin_effects().unwrap().flat_color.clone();
        manager.set_render_effect(Some(flat));
        manager.translate(Vec2::new(5.0, 6.0));
        manager.draw_arrays(PrimitiveType::TriangleList, 0, 3);

        let expected = matrix::translation(5.0, 6.0) * manager.matrix(MatrixSlot::Projection);
        assert!(journal.calls().contains(&DeviceCall::SetUniformMatrix(expected)));
    }

    #[test]
    fn replacing_the_effect_releases_it() {
        let (mut manager, _) = manager();
        let flat = manager.builtin_effects().unwrap().flat_color.clone();
        let before = Arc::strong_count(&flat);

        manager.set_render_effect(Some(flat.clone()));
        assert_eq!(Arc::strong_count(&flat), before + 1);
        manager.set_render_effect(None);
        assert_eq!(Arc::strong_count(&flat), before);
    }

    // ── matrices ──────────────────────────────────────────────────────────

    #[test]
    fn uniform_matrix_is_cached_until_cleared() {
        let (mut manager, _) = manager();
        let a = matrix::translation(1.0, 2.0);
        let b = matrix::ortho(100.0, 50.0);
        manager.set_matrix(MatrixSlot::ModelView, a);
        manager.set_matrix(MatrixSlot::Projection, b);

        let computed = manager.matrices.computations(UniformMatrixSlot::ModelViewProjection);
        assert_eq!(manager.uniform_matrix(UniformMatrixSlot::ModelViewProjection), a * b);
        assert_eq!(manager.uniform_matrix(UniformMatrixSlot::ModelViewProjection), a * b);
        assert_eq!(
            manager.matrices.computations(UniformMatrixSlot::ModelViewProjection),
            computed + 1
        );

        manager.clear_uniform_matrices();
        manager.uniform_matrix(UniformMatrixSlot::ModelViewProjection);
        assert_eq!(
            manager.matrices.computations(UniformMatrixSlot::ModelViewProjection),
            computed + 2
        );
    }

    #[test]
    fn external_model_view_is_replaced_on_next_draw() {
        let (mut manager, _) = manager();
        manager.prepare_real_matrix();
        manager.set_matrix(MatrixSlot::ModelView, matrix::translation(9.0, 9.0));
        manager.prepare_real_matrix();
        assert_eq!(manager.matrix(MatrixSlot::ModelView), Mat4::IDENTITY);
    }
}
