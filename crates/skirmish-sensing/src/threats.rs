//! Eight-sector threat radar.
//!
//! Each projectile fired by another ship is scored by how close its closest
//! approach will pass (proximity) and how soon that happens (urgency). The
//! score lands in the sector of the projectile's current bearing; sectors
//! keep the maximum score, never a sum.

use glam::Vec2;
use skirmish_core::constants::*;
use skirmish_core::sensing::ThreatRadar;
use skirmish_core::types::{bearing_from_forward, ProjectileView, ShipView};

/// Sector index for a bearing (left positive). Sector 0 is centered on the
/// ship's front and indices proceed clockwise.
pub fn sector_for_bearing(bearing: f32) -> usize {
    let sector = (-bearing / THREAT_SECTOR_ANGLE).round() as i32;
    sector.rem_euclid(THREAT_SECTORS as i32) as usize
}

/// Score of a projectile at relative position `rel_pos` moving with relative
/// velocity `rel_vel` (both projectile minus ship). `None` unless approaching.
pub fn threat_score(rel_pos: Vec2, rel_vel: Vec2) -> Option<f32> {
    let approach = rel_pos.dot(rel_vel);
    let speed_sq = rel_vel.length_squared();
    if approach >= 0.0 || speed_sq <= f32::EPSILON {
        return None;
    }

    let time_to_closest = -approach / speed_sq;
    let miss_distance = (rel_pos + rel_vel * time_to_closest).length();

    let proximity = (1.0 - miss_distance / THREAT_PROXIMITY_RADIUS).clamp(0.0, 1.0);
    let urgency = (1.0 - time_to_closest / THREAT_TIME_HORIZON).clamp(0.0, 1.0);
    Some(proximity * urgency)
}

/// Build the radar for `ship`. Projectiles fired by the ship itself never
/// register.
pub fn compute_threat_radar(ship: &ShipView, projectiles: &[ProjectileView]) -> ThreatRadar {
    let mut radar = ThreatRadar::default();
    for projectile in projectiles.iter().filter(|p| p.shooter != ship.id) {
        let rel_pos = projectile.position - ship.position;
        let rel_vel = projectile.velocity - ship.velocity;
        let Some(score) = threat_score(rel_pos, rel_vel) else {
            continue;
        };
        let sector = sector_for_bearing(bearing_from_forward(ship.rotation, rel_pos));
        let slot = &mut radar.sectors[sector];
        *slot = slot.max(score);
    }
    radar
}
