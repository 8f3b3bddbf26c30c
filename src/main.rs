mod error;
mod renderer;

use glam::Vec2;
use particle_life::constants::*;
use particle_life::{PointerForce, SimulationConfig, SimulationState};
use renderer::Renderer;
use std::{sync::Arc, time::Instant};
use winit::{
    dpi::PhysicalSize,
    event::{ElementState, Event, MouseButton, WindowEvent},
    event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget},
    keyboard::{KeyCode, PhysicalKey},
    window::WindowBuilder,
};

/// Host-side state the kernel doesn't own: pacing, pause and input.
struct Controls {
    is_paused: bool,
    shift_held: bool,
    cursor: Vec2,
    next_spawn_kind: usize,
}

impl Controls {
    fn new() -> Self {
        Self {
            is_paused: false,
            shift_held: false,
            cursor: Vec2::ZERO,
            next_spawn_kind: 0,
        }
    }
}

fn adjust_speed(state: &mut SimulationState, increase: bool) {
    let mut config = state.config().clone();
    let delta = if increase {
        SPEED_ADJUST_STEP
    } else {
        -SPEED_ADJUST_STEP
    };
    config.speed = (config.speed + delta).clamp(MIN_SPEED, MAX_SPEED);
    log::info!("Speed: {:.2}x", config.speed);
    state.update_config(config);
}

fn edit_config(state: &mut SimulationState, edit: impl FnOnce(&mut SimulationConfig)) {
    let mut config = state.config().clone();
    edit(&mut config);
    state.update_config(config);
}

fn handle_key(state: &mut SimulationState, controls: &mut Controls, key: KeyCode) -> bool {
    match key {
        KeyCode::Space => {
            controls.is_paused = !controls.is_paused;
            log::info!("Paused: {}", controls.is_paused);
        }
        KeyCode::ArrowUp => adjust_speed(state, true),
        KeyCode::ArrowDown => adjust_speed(state, false),
        KeyCode::KeyR => {
            state.restart();
            log::info!("Restarted with {} layout", state.layout().name());
        }
        KeyCode::KeyN => {
            state.randomize_rules();
            log::info!("Randomized rules");
        }
        KeyCode::KeyL => {
            let layout = state.layout().next();
            state.initialize_with_layout(layout);
            log::info!("Layout: {}", layout.name());
        }
        KeyCode::KeyM => {
            edit_config(state, |c| c.mutation = !c.mutation);
            log::info!("Mutation: {}", state.config().mutation);
        }
        KeyCode::KeyG => {
            edit_config(state, |c| c.glow = !c.glow);
            log::info!("Glow: {}", state.config().glow);
        }
        KeyCode::KeyC => {
            edit_config(state, |c| c.color_mode = c.color_mode.next());
            log::info!("Color mode: {:?}", state.config().color_mode);
        }
        KeyCode::Escape => return false,
        _ => {}
    }
    true
}

fn handle_mouse(
    state: &mut SimulationState,
    controls: &mut Controls,
    button: MouseButton,
    pressed: bool,
) {
    let strength = match button {
        MouseButton::Left => POINTER_STRENGTH,
        MouseButton::Right => -POINTER_STRENGTH,
        _ => return,
    };
    if pressed && controls.shift_held && button == MouseButton::Left {
        let species = state.config().species_count();
        let kind = controls.next_spawn_kind % species;
        controls.next_spawn_kind = (kind + 1) % species;
        state.spawn_burst(controls.cursor, SPAWN_BURST_COUNT, kind);
        log::info!(
            "Spawned burst of species {} ({} particles total)",
            kind,
            state.particles().len()
        );
        return;
    }
    if pressed {
        state.set_pointer(PointerForce {
            active: true,
            position: controls.cursor,
            radius: POINTER_RADIUS,
            strength,
        });
    } else {
        state.pointer_mut().active = false;
    }
}

fn title(state: &SimulationState, controls: &Controls, fps: f64) -> String {
    let counts = state
        .species_counts()
        .iter()
        .map(|count| count.to_string())
        .collect::<Vec<_>>()
        .join("/");
    let paused_text = if controls.is_paused { " [PAUSED]" } else { "" };
    format!(
        "Particle Life - {} - Speed: {:.2}x - {} - FPS: {:.1}{}",
        counts,
        state.config().speed,
        state.layout().name(),
        fps,
        paused_text
    )
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let event_loop = EventLoop::new().map_err(error::ViewerError::from)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("Particle Life")
            .with_inner_size(PhysicalSize::new(WINDOW_WIDTH, WINDOW_HEIGHT))
            .build(&event_loop)
            .map_err(error::ViewerError::from)?,
    );
    let mut renderer = pollster::block_on(Renderer::new(window.clone()))?;
    let world = Vec2::new(renderer.size.width as f32, renderer.size.height as f32);
    let mut simulation_state = SimulationState::new(world, SimulationConfig::default());
    let mut controls = Controls::new();
    log::info!(
        "Started with {} particles, {} species",
        simulation_state.particles().len(),
        simulation_state.config().species_count()
    );

    let mut last_sim_update_time = Instant::now();
    let mut time_accumulator = 0.0;
    let mut last_fps_update_time = Instant::now();
    let mut frames_since_last_fps_update = 0;
    let mut current_fps = 0.0;

    event_loop.run(move |event, elwt: &EventLoopWindowTarget<()>| {
        elwt.set_control_flow(ControlFlow::Poll);
        match event {
            Event::AboutToWait => {
                let now = Instant::now();
                if !controls.is_paused {
                    time_accumulator += now.duration_since(last_sim_update_time).as_secs_f64();
                    let mut steps = 0;
                    while time_accumulator >= FIXED_TIMESTEP && steps < MAX_STEPS_PER_FRAME {
                        simulation_state.step();
                        time_accumulator -= FIXED_TIMESTEP;
                        steps += 1;
                    }
                    if steps == MAX_STEPS_PER_FRAME {
                        time_accumulator = 0.0;
                    }
                } else {
                    time_accumulator = 0.0;
                }
                last_sim_update_time = now;
                window.request_redraw();
            }
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => elwt.exit(),
                WindowEvent::Resized(physical_size) => {
                    renderer.resize(physical_size);
                    simulation_state
                        .set_dimensions(physical_size.width as f32, physical_size.height as f32);
                }
                WindowEvent::ScaleFactorChanged { .. } => {
                    let new_inner_size = window.inner_size();
                    renderer.resize(new_inner_size);
                    simulation_state
                        .set_dimensions(new_inner_size.width as f32, new_inner_size.height as f32);
                }
                WindowEvent::ModifiersChanged(modifiers) => {
                    controls.shift_held = modifiers.state().shift_key();
                }
                WindowEvent::CursorMoved { position, .. } => {
                    controls.cursor = Vec2::new(position.x as f32, position.y as f32);
                    simulation_state.pointer_mut().position = controls.cursor;
                }
                WindowEvent::MouseInput { state, button, .. } => {
                    handle_mouse(
                        &mut simulation_state,
                        &mut controls,
                        button,
                        state == ElementState::Pressed,
                    );
                }
                WindowEvent::KeyboardInput {
                    event: key_event, ..
                } => {
                    if key_event.state == ElementState::Pressed && !key_event.repeat {
                        if let PhysicalKey::Code(code) = key_event.physical_key {
                            if !handle_key(&mut simulation_state, &mut controls, code) {
                                elwt.exit();
                            }
                        }
                    }
                }
                WindowEvent::RedrawRequested => {
                    frames_since_last_fps_update += 1;
                    let now = Instant::now();
                    let elapsed_secs = now.duration_since(last_fps_update_time).as_secs_f64();
                    if elapsed_secs >= FPS_UPDATE_INTERVAL_SECS {
                        current_fps = frames_since_last_fps_update as f64 / elapsed_secs;
                        last_fps_update_time = now;
                        frames_since_last_fps_update = 0;
                        window.set_title(&title(&simulation_state, &controls, current_fps));
                    }
                    match renderer.render(&simulation_state) {
                        Ok(_) => {}
                        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                            renderer.reconfigure()
                        }
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            log::error!("WGPU Error: OutOfMemory");
                            elwt.exit();
                        }
                        Err(e) => log::warn!("WGPU Error: {:?}", e),
                    }
                }
                _ => {}
            },
            _ => {}
        }
    })?;
    Ok(())
}
