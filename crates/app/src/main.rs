//! Engine demo: a window, a camera you can fly around, and a few meshes.
//!
//! Controls: WASD move, E/Q up/down, arrow keys or left-drag to look, Esc quits.

use std::sync::Arc;

use anyhow::{Context, Result};
use glam::Vec3;
use tracing::{error, info};

use engine_core::{AssetsConfig, Config, Timer};
use engine_platform::{KeyCode, KeyMappings, PlatformWindow};
use engine_renderer::{Engine, FrameOrchestrator, GameObjectRegistry, RenderSystem};
use engine_resources::{Mesh, MeshData};
use engine_rhi::RhiResult;
use engine_rhi::device::Device;
use engine_scene::{Camera, KeyboardMovementController, MouseLookController, TransformComponent};

/// Distance between neighbouring models along X.
const MODEL_SPACING: f32 = 1.5;

fn load_scene(device: &Arc<Device>, assets: &AssetsConfig) -> Result<GameObjectRegistry> {
    let mut registry = GameObjectRegistry::new();

    if assets.models.is_empty() {
        info!("No models configured, using the built-in cube");
        let cube = Arc::new(Mesh::new(device.clone(), &MeshData::colored_cube())?);
        let object = registry.spawn()?;
        object.mesh = Some(cube);
        object.transform.translation = Vec3::new(0.0, 0.0, 2.5);
        object.transform.scale = Vec3::splat(0.5);
        return Ok(registry);
    }

    let offset = (assets.models.len() - 1) as f32 * MODEL_SPACING / 2.0;
    for (i, path) in assets.models.iter().enumerate() {
        let mesh = Mesh::from_obj_file(device.clone(), path)
            .with_context(|| format!("Failed to load model {}", path.display()))?;

        let object = registry.spawn()?;
        object.mesh = Some(Arc::new(mesh));
        object.color = Vec3::ONE;
        object.transform.translation = Vec3::new(i as f32 * MODEL_SPACING - offset, 0.5, 2.5);
        object.transform.scale = Vec3::splat(1.5);
    }
    Ok(registry)
}

/// Waits for the device to finish all submitted work before anything the
/// main loop used is dropped, whether the loop finished or failed. A loop
/// error takes precedence over a failed wait.
fn settle<T>(outcome: Result<T>, wait_idle: impl FnOnce() -> RhiResult<()>) -> Result<T> {
    let idle = wait_idle();
    match outcome {
        Ok(value) => {
            idle?;
            Ok(value)
        }
        Err(e) => {
            if let Err(idle_error) = idle {
                error!("Failed to wait for device idle after error: {}", idle_error);
            }
            Err(e)
        }
    }
}

fn run(
    window: &mut PlatformWindow,
    orchestrator: &mut FrameOrchestrator,
    render_system: &RenderSystem,
    registry: &GameObjectRegistry,
    config: &Config,
) -> Result<()> {
    let controls = &config.controls;
    let keyboard = KeyboardMovementController::new(controls.move_speed, controls.turn_speed);
    let mut mouse = MouseLookController::new(controls.mouse_sensitivity);
    let key_mappings = KeyMappings::default();
    let mut camera = Camera::new();
    let mut viewer = TransformComponent::new();
    let mut timer = Timer::new();

    while !window.should_close() {
        window.poll_events();
        if window.input().is_key_just_pressed(KeyCode::Escape) {
            window.request_close();
            continue;
        }

        let dt = timer.delta_secs();
        keyboard.move_in_plane_xz(&key_mappings.movement_input(window.input()), dt, &mut viewer);
        let dragging = mouse.update(&window.input().mouse_input(), &mut viewer);
        window.set_cursor_captured(dragging);

        camera.set_view_yxz(viewer.translation, viewer.rotation);
        camera.set_perspective_projection(
            config.camera.fov_y_degrees.to_radians(),
            orchestrator.aspect_ratio(),
            config.camera.near,
            config.camera.far,
        )?;

        if let Some(command_buffer) = orchestrator.begin_frame(window)? {
            orchestrator.begin_swap_chain_render_pass(&command_buffer)?;
            render_system.render_game_objects(&command_buffer, registry, &camera);
            orchestrator.end_swap_chain_render_pass(&command_buffer)?;
            orchestrator.end_frame(window)?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let config = Config::load_default()?;
    engine_core::init_logging(&config.logging.filter);
    info!("Starting engine");

    let mut window = PlatformWindow::new(&config.window)?;
    let engine = Arc::new(Engine::new(&window, &config.renderer)?);
    let mut orchestrator = FrameOrchestrator::new(engine.clone(), &window, &config.renderer)?;

    let vertex_shader = config.assets.vertex_shader_path();
    let fragment_shader = config.assets.fragment_shader_path();
    let render_system = RenderSystem::new(
        engine.device().clone(),
        orchestrator.swap_chain_render_pass(),
        &vertex_shader,
        &fragment_shader,
    )?;

    let registry = load_scene(engine.device(), &config.assets)?;
    info!("Scene ready with {} objects", registry.len());

    let outcome = run(&mut window, &mut orchestrator, &render_system, &registry, &config);
    let outcome = settle(outcome, || engine.device().wait_idle());

    // GPU resources go before the engine that owns the device.
    drop(registry);
    drop(render_system);
    drop(orchestrator);
    drop(engine);

    outcome?;
    info!("Shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use anyhow::anyhow;
    use engine_rhi::RhiError;

    use super::*;

    #[test]
    fn test_settle_waits_when_loop_fails() {
        let waited = Cell::new(false);
        let outcome: Result<()> = Err(anyhow!("present failed"));

        let err = settle(outcome, || {
            waited.set(true);
            Ok(())
        })
        .unwrap_err();

        assert!(waited.get());
        assert_eq!(err.to_string(), "present failed");
    }

    #[test]
    fn test_settle_keeps_loop_error_over_wait_error() {
        let outcome: Result<()> = Err(anyhow!("present failed"));
        let err = settle(outcome, || Err(RhiError::NoSuitableGpu)).unwrap_err();
        assert_eq!(err.to_string(), "present failed");
    }

    #[test]
    fn test_settle_reports_wait_error_after_clean_exit() {
        let waited = Cell::new(false);
        let err = settle(Ok(()), || {
            waited.set(true);
            Err(RhiError::NoSuitableGpu)
        })
        .unwrap_err();

        assert!(waited.get());
        assert!(err.downcast_ref::<RhiError>().is_some());
    }
}
