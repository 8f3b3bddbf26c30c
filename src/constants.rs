// --- Global Simulation Constants ---

// Empirical timestep scale: dt = speed * TIMESTEP_SCALE. Not a physical unit.
pub const TIMESTEP_SCALE: f32 = 0.5;
// Velocity is capped at max_radius * this, so nothing skips a whole interaction radius per step.
pub const VELOCITY_CAP_FACTOR: f32 = 0.5;
// Squared distances below this are treated as coincident and ignored.
pub const MIN_DISTANCE_SQ: f32 = 0.01;
pub const BETA_MIN: f32 = 0.01;
pub const BETA_MAX: f32 = 0.99;
// Fallback min_radius ratio when a config arrives with min_radius > max_radius.
pub const MIN_RADIUS_FALLBACK_RATIO: f32 = 0.3;
pub const MIN_CELL_SIZE: f32 = 1.0;
// Hard cap on grid buckets per axis, whatever the world size.
pub const MAX_GRID_AXIS_BUCKETS: usize = 512;

// --- Pointer force ---
pub const POINTER_FORCE_GAIN: f32 = 3.0;

// --- Smoothed max speed (rendering side-channel) ---
pub const MAX_SPEED_DECAY: f32 = 0.95;
pub const MAX_SPEED_BLEND: f32 = 0.05;
pub const MAX_SPEED_FLOOR: f32 = 0.1;

// --- Species mutation ---
pub const MUTATION_INTERVAL: u64 = 8;
pub const MUTATION_RADIUS_FACTOR: f32 = 0.4;
pub const MUTATION_RATE: f32 = 0.12;
// A majority must count strictly more than this many neighbors to convert anyone.
pub const MUTATION_MIN_EVIDENCE: usize = 2;

// --- Energy sampling ---
pub const ENERGY_SAMPLE_INTERVAL: u64 = 6;
pub const ENERGY_HISTORY_CAPACITY: usize = 200;

// --- Population ---
pub const DEFAULT_PARTICLE_COUNT: usize = 1500;
pub const DEFAULT_SPECIES_COUNT: usize = 6;
// Upper bound the viewer uses when spawning bursts.
pub const MAX_PARTICLES: usize = 20_000;
pub const SPAWN_BURST_COUNT: usize = 40;
pub const SPAWN_BURST_RADIUS: f32 = 6.0;
pub const SPAWN_BURST_SPEED: f32 = 2.0;

// --- Viewer ---
pub const WINDOW_WIDTH: u32 = 1280;
pub const WINDOW_HEIGHT: u32 = 800;
pub const FIXED_TIMESTEP: f64 = 1.0 / 60.0;
// Cap on catch-up steps per frame so a stalled window doesn't spiral.
pub const MAX_STEPS_PER_FRAME: u32 = 4;
pub const FPS_UPDATE_INTERVAL_SECS: f64 = 0.5;
pub const MIN_SPEED: f32 = 0.25;
pub const MAX_SPEED: f32 = 3.0;
pub const SPEED_ADJUST_STEP: f32 = 0.25;
pub const POINTER_RADIUS: f32 = 150.0;
pub const POINTER_STRENGTH: f32 = 1.0;
