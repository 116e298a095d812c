use std::sync::Arc;

use anyhow::{Context, Result};
use strata_engine::coords::{ColorRgba, Rect, Vec2};
use strata_engine::core::ScreenGeometry;
use strata_engine::device::{
    BlendFactor, IndexFormat, IndexSource, PrimitiveType, RenderDataHandle, TextureHandle,
    VertexFormat,
};
use strata_engine::logging::{init_logging, LoggingConfig};
use strata_engine::render::RenderTarget;
use strata_engine::{RenderConfig, RenderManager, RendererKind};

const FRAMES: u32 = 8;
const VIRTUAL_SIZE: Vec2 = Vec2::new(480.0, 320.0);

/// GPU resources shared by every frame.
struct Scene {
    quad: RenderDataHandle,
    textured_quad: RenderDataHandle,
    checker: TextureHandle,
    offscreen: RenderTarget,
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let config = RenderConfig {
        framebuffer_width: 960,
        framebuffer_height: 640,
        stats_every_n_frames: Some(4),
        clear_color: ColorRgba::new(0.08, 0.08, 0.1, 1.0),
        ..RenderConfig::default()
    };

    let mut manager = create_manager(&config)?;
    manager.set_screen_metrics(Arc::new(ScreenGeometry::fitted(
        VIRTUAL_SIZE,
        Vec2::new(config.framebuffer_width as f32, config.framebuffer_height as f32),
    )));

    let scene = create_scene(&mut manager)?;
    log::info!("rendering {FRAMES} frames with {:?}", manager.renderer());

    for frame in 0..FRAMES {
        draw_frame(&mut manager, &scene, frame);
    }

    log::info!("done after {} frames", manager.frame_index());
    Ok(())
}

/// Prefers the GPU backend and falls back to the headless one.
fn create_manager(config: &RenderConfig) -> Result<RenderManager> {
    let wanted = match std::env::var("STRATA_RENDERER").as_deref() {
        Ok("headless") => RendererKind::Headless,
        _ => RendererKind::Wgpu,
    };

    match RenderManager::with_renderer(wanted, config) {
        Ok(manager) => Ok(manager),
        Err(err) if wanted == RendererKind::Wgpu => {
            log::warn!("wgpu backend unavailable ({err:#}); using headless");
            RenderManager::with_renderer(RendererKind::Headless, config)
        }
        Err(err) => Err(err),
    }
}

fn create_scene(manager: &mut RenderManager) -> Result<Scene> {
    let device = manager.device_mut();
    let indices: [u16; 6] = [0, 1, 2, 2, 1, 3];

    #[rustfmt::skip]
    let quad: [f32; 12] = [
        0.0, 0.0, 0.0,
        1.0, 0.0, 0.0,
        0.0, 1.0, 0.0,
        1.0, 1.0, 0.0,
    ];
    let quad = device
        .create_render_data(
            VertexFormat::POSITION,
            bytemuck::cast_slice(&quad),
            Some((IndexFormat::U16, bytemuck::cast_slice(&indices))),
        )
        .context("quad vertex data")?;

    #[rustfmt::skip]
    let textured: [f32; 20] = [
        0.0, 0.0, 0.0,  0.0, 0.0,
        1.0, 0.0, 0.0,  1.0, 0.0,
        0.0, 1.0, 0.0,  0.0, 1.0,
        1.0, 1.0, 0.0,  1.0, 1.0,
    ];
    let textured_quad = device
        .create_render_data(VertexFormat::POSITION_TEXCOORD, bytemuck::cast_slice(&textured), None)
        .context("textured quad vertex data")?;

    let checker = device.create_texture(2, 2, &checker_pixels()).context("checker texture")?;

    let offscreen = RenderTarget::new(
        device.create_render_target(128, 128).context("offscreen target")?,
        128,
        128,
    );

    Ok(Scene {
        quad,
        textured_quad,
        checker,
        offscreen,
    })
}

fn checker_pixels() -> Vec<u8> {
    const LIGHT: [u8; 4] = [230, 230, 230, 255];
    const DARK: [u8; 4] = [40, 40, 40, 255];
    [LIGHT, DARK, DARK, LIGHT].concat()
}

fn draw_frame(manager: &mut RenderManager, scene: &Scene, frame: u32) {
    let Some(effects) = manager.builtin_effects().cloned() else {
        log::error!("render manager has no built-in effects");
        return;
    };

    manager.begin_frame();

    // Offscreen pass: a flat quad into the 128x128 target.
    manager.with_render_target(scene.offscreen, |m| {
        m.set_render_effect(Some(effects.flat_color.clone()));
        m.set_render_data(Some(scene.quad));
        m.set_color(0.9, 0.4, 0.1, 1.0);
        m.scale(Vec2::new(128.0, 128.0));
        m.draw_elements(
            PrimitiveType::TriangleList,
            6,
            IndexFormat::U16,
            IndexSource::RenderData { offset: 0 },
        );
    });

    // Flat quad sliding across the virtual screen.
    manager.with_draw_matrix(|m| {
        m.set_render_effect(Some(effects.flat_color.clone()));
        m.set_render_data(Some(scene.quad));
        m.set_color(0.2, 0.6, 0.9, 1.0);
        m.translate(Vec2::new(20.0 + frame as f32 * 10.0, 20.0));
        m.scale(Vec2::new(120.0, 80.0));
        m.draw_elements(
            PrimitiveType::TriangleList,
            6,
            IndexFormat::U16,
            IndexSource::RenderData { offset: 0 },
        );
    });

    // Textured, blended quad inside two nested clips.
    manager.with_clip(Rect::new(200.0, 100.0, 240.0, 180.0), |m| {
        m.with_clip(Rect::new(220.0, 120.0, 120.0, 120.0), |m| {
            m.with_draw_matrix(|m| {
                m.set_render_effect(Some(effects.texture_mul_color.clone()));
                m.set_render_data(Some(scene.textured_quad));
                m.set_texture(0, Some(scene.checker));
                m.enable_blending(true);
                m.set_blend_mode(BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha);
                m.reset_color();
                m.translate(Vec2::new(210.0, 110.0));
                m.scale(Vec2::new(160.0, 160.0));
                m.draw_arrays(PrimitiveType::TriangleStrip, 0, 4);
                m.enable_blending(false);
            });
        });
    });

    manager.set_render_effect(None);
    manager.end_frame();
}

