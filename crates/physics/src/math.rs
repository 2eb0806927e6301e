//! Small math helpers shared across the physics core.

use glam::Vec3;

/// Move `current` toward `target` by the given fraction of the remaining
/// distance. `t` is typically `rate * delta_time`; it is clamped to [0, 1]
/// so large frame spikes cannot overshoot.
#[inline]
pub fn lerp_toward(current: f32, target: f32, t: f32) -> f32 {
    current + (target - current) * t.clamp(0.0, 1.0)
}

/// Distance between two points projected onto the XZ plane.
#[inline]
pub fn horizontal_distance(a: Vec3, b: Vec3) -> f32 {
    let dx = b.x - a.x;
    let dz = b.z - a.z;
    (dx * dx + dz * dz).sqrt()
}

/// Critically-damped spring toward `target` (Unity-style SmoothDamp).
///
/// `velocity` is caller-owned state carried between frames. Unlike
/// [`lerp_toward`] this eases both into and out of the motion, which reads
/// better for slow decorative targets like the particle emitter height.
pub fn smooth_damp(
    current: f32,
    target: f32,
    velocity: &mut f32,
    smooth_time: f32,
    delta_time: f32,
) -> f32 {
    let omega = 2.0 / smooth_time.max(1e-4);
    let x = omega * delta_time;
    let exp = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);
    let change = current - target;
    let temp = (*velocity + omega * change) * delta_time;
    *velocity = (*velocity - omega * temp) * exp;
    target + (change + temp) * exp
}
