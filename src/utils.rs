use glam::{Vec2, Vec4};

// --- Helper Functions ---

/// Shortest signed offset from `from` to `to` along one wrapped axis of length `extent`.
#[inline]
pub fn wrapped_delta(from: f32, to: f32, extent: f32) -> f32 {
    let mut delta = to - from;
    let half = extent * 0.5;
    if delta > half {
        delta -= extent;
    } else if delta < -half {
        delta += extent;
    }
    delta
}

#[inline]
pub fn wrapped_offset(from: Vec2, to: Vec2, world: Vec2) -> Vec2 {
    Vec2::new(
        wrapped_delta(from.x, to.x, world.x),
        wrapped_delta(from.y, to.y, world.y),
    )
}

/// Wrap a coordinate into `[0, extent)`. Any finite magnitude is fine.
#[inline]
pub fn wrap_coordinate(value: f32, extent: f32) -> f32 {
    let wrapped = value.rem_euclid(extent);
    // rem_euclid can round up to exactly `extent` for tiny negatives.
    if wrapped >= extent { 0.0 } else { wrapped }
}

/// Evenly spaced hue per species.
pub fn species_color(kind: usize, species: usize) -> Vec4 {
    let hue = kind as f32 / species.max(1) as f32;
    let rgb = hsv_to_rgb(hue, 0.75, 1.0);
    Vec4::new(rgb[0], rgb[1], rgb[2], 1.0)
}

/// `h`, `s`, `v` in `[0, 1]`.
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> [f32; 3] {
    let h = h.rem_euclid(1.0) * 6.0;
    let sector = h.floor();
    let f = h - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    match sector as i32 {
        0 => [v, t, p],
        1 => [q, v, p],
        2 => [p, v, t],
        3 => [p, q, v],
        4 => [t, p, v],
        _ => [v, p, q],
    }
}
