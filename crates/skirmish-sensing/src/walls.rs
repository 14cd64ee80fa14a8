//! Wall distances along the ship's own axes.

use glam::Vec2;
use skirmish_core::sensing::WallSensing;
use skirmish_core::types::{forward_vector, right_vector, ArenaBounds, ShipView};

/// Direction components smaller than this count as parallel to a wall pair.
const PARALLEL_EPSILON: f32 = 1e-6;

/// Distance from `origin` along the unit direction `dir` to the arena
/// boundary. Wall pairs the ray runs parallel to are ignored; with no
/// intersection at all the diagonal length is returned. The result never
/// exceeds the diagonal.
pub fn raycast_to_bounds(origin: Vec2, dir: Vec2, bounds: &ArenaBounds) -> f32 {
    let half = bounds.half_extents();
    let diagonal = bounds.diagonal();

    let axis_hit = |o: f32, d: f32, half: f32| -> Option<f32> {
        if d.abs() < PARALLEL_EPSILON {
            return None;
        }
        let t = (half.copysign(d) - o) / d;
        (t >= 0.0).then_some(t)
    };

    let hits = [axis_hit(origin.x, dir.x, half.x), axis_hit(origin.y, dir.y, half.y)];
    hits.into_iter().flatten().fold(diagonal, f32::min)
}

/// Front/back/left/right wall distances over the arena diagonal.
pub fn compute_wall_sensing(ship: &ShipView, bounds: &ArenaBounds) -> WallSensing {
    let diagonal = bounds.diagonal();
    if diagonal <= 0.0 {
        return WallSensing::default();
    }
    let forward = forward_vector(ship.rotation);
    let right = right_vector(ship.rotation);
    let cast = |dir: Vec2| raycast_to_bounds(ship.position, dir, bounds) / diagonal;

    WallSensing {
        front: cast(forward),
        back: cast(-forward),
        left: cast(-right),
        right: cast(right),
    }
}
