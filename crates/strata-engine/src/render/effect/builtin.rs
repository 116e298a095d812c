use std::sync::Arc;

use anyhow::{Context, Result};

use crate::device::{BuiltinShader, Device, IndexFormat, IndexSource, PrimitiveType, ShaderHandle};

use super::{EffectCtx, RenderEffect};

/// Untextured geometry in the current color.
#[derive(Debug)]
pub struct FlatColorEffect {
    shader: ShaderHandle,
}

impl FlatColorEffect {
    pub fn create(device: &mut dyn Device) -> Result<Self> {
        let shader = device
            .builtin_shader(BuiltinShader::FlatColor)
            .context("flat color shader")?;
        Ok(Self { shader })
    }
}

impl RenderEffect for FlatColorEffect {
    fn name(&self) -> &str {
        "flat_color"
    }

    fn prepare(&self, cx: &mut EffectCtx<'_>) {
        let state = cx.state_mut();
        state.shader = Some(self.shader);
        state.texturing = false;
        state.vertex_array = true;
        state.texcoord_array = false;
        state.color_array = false;
    }
}

/// Texture unit 0 modulated by the current color.
#[derive(Debug)]
pub struct TextureMulColorEffect {
    shader: ShaderHandle,
}

impl TextureMulColorEffect {
    pub fn create(device: &mut dyn Device) -> Result<Self> {
        let shader = device
            .builtin_shader(BuiltinShader::TextureMulColor)
            .context("texture mul color shader")?;
        Ok(Self { shader })
    }
}

fn prepare_textured(cx: &mut EffectCtx<'_>, shader: ShaderHandle) {
    let state = cx.state_mut();
    state.shader = Some(shader);
    state.texturing = true;
    state.vertex_array = true;
    state.texcoord_array = true;
    state.color_array = false;
}

impl RenderEffect for TextureMulColorEffect {
    fn name(&self) -> &str {
        "texture_mul_color"
    }

    fn prepare(&self, cx: &mut EffectCtx<'_>) {
        prepare_textured(cx, self.shader);
    }
}

/// [`TextureMulColorEffect`] with the alpha test enabled for the draw.
///
/// The comparison and reference come from the requested state
/// (`RenderManager::set_alpha_func`). The test is requested off again after
/// each draw so later effects do not inherit it.
#[derive(Debug)]
pub struct TextureMulColorAlphaTestEffect {
    shader: ShaderHandle,
}

impl TextureMulColorAlphaTestEffect {
    pub fn create(device: &mut dyn Device) -> Result<Self> {
        let shader = device
            .builtin_shader(BuiltinShader::TextureMulColorAlphaTest)
            .context("texture mul color alpha test shader")?;
        Ok(Self { shader })
    }
}

impl RenderEffect for TextureMulColorAlphaTestEffect {
    fn name(&self) -> &str {
        "texture_mul_color_alpha_test"
    }

    fn prepare(&self, cx: &mut EffectCtx<'_>) {
        prepare_textured(cx, self.shader);
        cx.state_mut().alpha_test = true;
    }

    fn draw_arrays(
        &self,
        cx: &mut EffectCtx<'_>,
        primitive: PrimitiveType,
        first: u32,
        count: u32,
    ) {
        self.prepare(cx);
        cx.draw_arrays(primitive, first, count);
        cx.state_mut().alpha_test = false;
    }

    fn draw_elements(
        &self,
        cx: &mut EffectCtx<'_>,
        primitive: PrimitiveType,
        count: u32,
        format: IndexFormat,
        indices: IndexSource<'_>,
    ) {
        self.prepare(cx);
        cx.draw_elements(primitive, count, format, indices);
        cx.state_mut().alpha_test = false;
    }
}

/// The effects every manager creates at `init`.
#[derive(Clone)]
pub struct BuiltinEffects {
    pub flat_color: Arc<dyn RenderEffect>,
    pub texture_mul_color: Arc<dyn RenderEffect>,
    pub texture_mul_color_alpha_test: Arc<dyn RenderEffect>,
}

impl BuiltinEffects {
    pub fn create(device: &mut dyn Device) -> Result<Self> {
        Ok(Self {
            flat_color: Arc::new(FlatColorEffect::create(device)?),
            texture_mul_color: Arc::new(TextureMulColorEffect::create(device)?),
            texture_mul_color_alpha_test: Arc::new(TextureMulColorAlphaTestEffect::create(device)?),
        })
    }
}

impl std::fmt::Debug for BuiltinEffects {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuiltinEffects")
            .field("flat_color", &self.flat_color.name())
            .field("texture_mul_color", &self.texture_mul_color.name())
            .field("texture_mul_color_alpha_test", &self.texture_mul_color_alpha_test.name())
            .finish()
    }
}
