#[cfg(test)]
mod tests {
    use std::f32::consts::{FRAC_PI_2, PI};

    use glam::Vec2;
    use proptest::prelude::*;
    use skirmish_core::constants::*;
    use skirmish_core::enums::Team;
    use skirmish_core::sensing::SensingState;
    use skirmish_core::types::*;

    use crate::aim::{decode_aim_point, encode_aim_point};
    use crate::contacts::*;
    use crate::encoder::{compute_self_sensing, compute_sensing, SensingContext};
    use crate::threats::*;
    use crate::walls::*;

    fn ship(id: u32, team: Team, position: Vec2, rotation: f32) -> ShipView {
        ShipView {
            id: ShipId(id),
            team,
            is_player: id == 0,
            position,
            velocity: Vec2::ZERO,
            rotation,
            angular_velocity: 0.0,
            health: 1.0,
            radius: 15.0,
            alive: true,
        }
    }

    fn shot(shooter: u32, position: Vec2, velocity: Vec2) -> ProjectileView {
        ProjectileView {
            shooter: ShipId(shooter),
            position,
            velocity,
        }
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    // --- Walls ---

    #[test]
    fn test_center_ship_wall_distances() {
        let bounds = ArenaBounds::new(80.0, 60.0);
        let me = ship(0, Team::Friend, Vec2::ZERO, 0.0);
        let walls = compute_wall_sensing(&me, &bounds);
        assert!(approx(walls.front, 0.30), "front = {}", walls.front);
        assert!(approx(walls.back, 0.30), "back = {}", walls.back);
        assert!(approx(walls.left, 0.40), "left = {}", walls.left);
        assert!(approx(walls.right, 0.40), "right = {}", walls.right);
    }

    #[test]
    fn test_rotated_ship_wall_distances() {
        // A quarter turn counterclockwise: forward is -X, left is -Y.
        let bounds = ArenaBounds::new(80.0, 60.0);
        let me = ship(0, Team::Friend, Vec2::new(10.0, 0.0), FRAC_PI_2);
        let walls = compute_wall_sensing(&me, &bounds);
        assert!(approx(walls.front, 0.50));
        assert!(approx(walls.back, 0.30));
        assert!(approx(walls.left, 0.30));
        assert!(approx(walls.right, 0.30));
    }

    #[test]
    fn test_raycast_outside_arena_uses_sentinel() {
        let bounds = ArenaBounds::new(80.0, 60.0);
        // Beyond the right wall, looking further right: nothing ahead.
        let d = raycast_to_bounds(Vec2::new(100.0, 0.0), Vec2::X, &bounds);
        assert_eq!(d, bounds.diagonal());
    }

    // --- Threats ---

    #[test]
    fn test_sector_mapping_clockwise() {
        assert_eq!(sector_for_bearing(0.0), 0);
        assert_eq!(sector_for_bearing(-FRAC_PI_2), 2); // right
        assert_eq!(sector_for_bearing(PI), 4); // behind
        assert_eq!(sector_for_bearing(FRAC_PI_2), 6); // left
        assert_eq!(sector_for_bearing(-PI / 4.0), 1);
        assert_eq!(sector_for_bearing(PI / 4.0), 7);
    }

    #[test]
    fn test_threat_score_head_on() {
        let score = threat_score(Vec2::new(0.0, 30.0), Vec2::new(0.0, -300.0)).unwrap();
        // Direct hit in 0.1 s.
        assert!(approx(score, 1.0 - 0.1 / THREAT_TIME_HORIZON));
    }

    #[test]
    fn test_receding_projectile_scores_nothing() {
        assert!(threat_score(Vec2::new(0.0, 30.0), Vec2::new(0.0, 300.0)).is_none());
        assert!(threat_score(Vec2::new(0.0, 30.0), Vec2::ZERO).is_none());
    }

    #[test]
    fn test_wide_miss_scores_zero() {
        let score = threat_score(Vec2::new(200.0, 30.0), Vec2::new(0.0, -300.0)).unwrap();
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_friendly_fire_excluded_from_radar() {
        let me = ship(0, Team::Friend, Vec2::ZERO, 0.0);
        let own = shot(0, Vec2::new(0.0, 40.0), Vec2::new(0.0, -300.0));
        let radar = compute_threat_radar(&me, &[own]);
        assert!(radar.sectors.iter().all(|&s| s == 0.0));

        let hostile = shot(7, Vec2::new(0.0, 40.0), Vec2::new(0.0, -300.0));
        let radar = compute_threat_radar(&me, &[own, hostile]);
        assert!(radar.sectors[0] > 0.5);
    }

    #[test]
    fn test_radar_places_left_threat_in_sector_six() {
        let me = ship(0, Team::Friend, Vec2::ZERO, 0.0);
        let from_left = shot(1, Vec2::new(-50.0, 0.0), Vec2::new(300.0, 0.0));
        let radar = compute_threat_radar(&me, &[from_left]);
        assert!(radar.sectors[6] > 0.0);
        assert_eq!(radar.sectors.iter().filter(|&&s| s > 0.0).count(), 1);
    }

    #[test]
    fn test_radar_keeps_max_not_sum() {
        let me = ship(0, Team::Friend, Vec2::ZERO, 0.0);
        let near = shot(1, Vec2::new(0.0, 30.0), Vec2::new(0.0, -300.0));
        let far = shot(1, Vec2::new(0.0, 300.0), Vec2::new(0.0, -300.0));
        let both = compute_threat_radar(&me, &[near, far]);
        let alone = compute_threat_radar(&me, &[near]);
        assert_eq!(both.sectors[0], alone.sectors[0]);
        assert!(both.sectors[0] <= 1.0);
    }

    #[test]
    fn test_radar_uses_relative_velocity() {
        // A slow shot the ship is racing toward is still a threat.
        let mut me = ship(0, Team::Friend, Vec2::ZERO, 0.0);
        me.velocity = Vec2::new(0.0, 200.0);
        let drifting = shot(1, Vec2::new(0.0, 60.0), Vec2::ZERO);
        let radar = compute_threat_radar(&me, &[drifting]);
        assert!(radar.sectors[0] > 0.0);
    }

    // --- Contacts ---

    #[test]
    fn test_empty_enemy_list_pads_all_slots() {
        let bounds = ArenaBounds::new(80.0, 60.0);
        let me = ship(0, Team::Friend, Vec2::ZERO, 0.0);
        let (slots, world) = compute_enemies_sensing(&me, &[me], &bounds);
        assert_eq!(slots.len(), 4);
        assert_eq!(world.len(), 4);
        assert!(slots.iter().all(|s| !s.contact.present));
        assert!(world.iter().all(|w| !w.present));
        assert!(slots.iter().all(|s| s.values().iter().all(|&v| v == 0.0)));
    }

    #[test]
    fn test_enemies_sorted_and_filtered() {
        let bounds = ArenaBounds::default();
        let me = ship(0, Team::Friend, Vec2::ZERO, 0.0);
        let wingman = ship(1, Team::Friend, Vec2::new(5.0, 0.0), 0.0);
        let far = ship(2, Team::Foe, Vec2::new(0.0, 300.0), 0.0);
        let near = ship(3, Team::Foe, Vec2::new(-100.0, 0.0), 0.0);
        let mut dead = ship(4, Team::Foe, Vec2::new(10.0, 10.0), 0.0);
        dead.alive = false;

        let (slots, world) =
            compute_enemies_sensing(&me, &[me, wingman, far, near, dead], &bounds);
        assert!(slots[0].contact.present && slots[1].contact.present);
        assert!(!slots[2].contact.present);
        assert_eq!(world[0].position, near.position);
        assert_eq!(world[1].position, far.position);
        assert!(approx(slots[0].contact.distance, 100.0 / bounds.diagonal()));
        // -X is on the left of a ship facing +Y.
        assert!(approx(slots[0].contact.bearing, 0.5));
        assert!(approx(world[1].forward_angle, FRAC_PI_2));
    }

    #[test]
    fn test_enemies_truncate_to_slot_count() {
        let bounds = ArenaBounds::default();
        let me = ship(0, Team::Friend, Vec2::ZERO, 0.0);
        let mut ships = vec![me];
        for i in 1..=6 {
            ships.push(ship(i, Team::Foe, Vec2::new(0.0, 20.0 * i as f32), 0.0));
        }
        let (slots, world) = compute_enemies_sensing(&me, &ships, &bounds);
        assert!(slots.iter().all(|s| s.contact.present));
        assert_eq!(world[3].position, Vec2::new(0.0, 80.0));
    }

    #[test]
    fn test_enemy_motion_components() {
        let bounds = ArenaBounds::default();
        let me = ship(0, Team::Friend, Vec2::ZERO, 0.0);
        // Enemy ahead, flying toward us and pointing at us.
        let mut enemy = ship(1, Team::Foe, Vec2::new(0.0, 150.0), PI);
        enemy.velocity = Vec2::new(0.0, -150.0);
        enemy.health = 0.25;

        let (slots, _) = compute_enemies_sensing(&me, &[enemy], &bounds);
        let e = slots[0];
        assert!(approx(e.closing_speed, 0.5));
        assert!(approx(e.lateral_speed, 0.0));
        assert!(approx(e.facing, 1.0));
        assert!(approx(e.health, 0.25));
    }

    #[test]
    fn test_lead_values_sign() {
        let target_pos = Vec2::new(0.0, 100.0);
        let mut enemy = ship(1, Team::Foe, target_pos, -FRAC_PI_2); // facing +X
        enemy.velocity = Vec2::new(100.0, 0.0); // moving to our right

        // Aimed straight at it: no lead.
        let me = ship(0, Team::Friend, Vec2::ZERO, 0.0);
        let (v, f) = lead_values(&me, &enemy, target_pos);
        assert!(approx(v, 0.0) && approx(f, 0.0));

        // Aimed to the right of it: leading.
        let me = ship(0, Team::Friend, Vec2::ZERO, -0.3);
        let (v, f) = lead_values(&me, &enemy, target_pos);
        assert!(v > 0.0 && f > 0.0);
        assert!(approx(v, 0.3f32.sin()));

        // Aimed to the left of it: trailing.
        let me = ship(0, Team::Friend, Vec2::ZERO, 0.3);
        let (v, _) = lead_values(&me, &enemy, target_pos);
        assert!(v < 0.0);

        // Stationary target: no velocity lead.
        enemy.velocity = Vec2::ZERO;
        let (v, _) = lead_values(&me, &enemy, target_pos);
        assert_eq!(v, 0.0);
    }

    #[test]
    fn test_blocker_distance_to_surface() {
        let bounds = ArenaBounds::new(80.0, 60.0);
        let me = ship(0, Team::Friend, Vec2::ZERO, 0.0);
        let blockers = [
            BlockerView {
                position: Vec2::new(30.0, 0.0),
                radius: 5.0,
            },
            BlockerView {
                position: Vec2::new(0.0, 20.0),
                radius: 15.0,
            },
        ];
        let slots = compute_blockers_sensing(&me, &blockers, &bounds);
        // Surface distances 25 and 5: the big blocker is nearer.
        assert!(approx(slots[0].contact.distance, 0.05));
        assert!(approx(slots[0].radius, 0.15));
        assert!(approx(slots[1].contact.distance, 0.25));
        assert!(approx(slots[1].contact.bearing, -0.5));
        assert!(!slots[2].contact.present);
    }

    #[test]
    fn test_hazard_closing() {
        let bounds = ArenaBounds::default();
        let me = ship(0, Team::Friend, Vec2::ZERO, 0.0);
        let hazard = HazardView {
            position: Vec2::new(60.0, 0.0),
            velocity: Vec2::new(-30.0, 30.0),
            radius: 10.0,
        };
        let slots = compute_hazards_sensing(&me, &[hazard], &bounds);
        assert!(slots[0].contact.present);
        assert!(approx(slots[0].closing_speed, 0.1));
        // Line of sight points +X, so +Y motion is to its left.
        assert!(approx(slots[0].lateral_speed, 0.1));
    }

    // --- Self & full state ---

    #[test]
    fn test_self_sensing_ship_frame() {
        let bounds = ArenaBounds::new(80.0, 60.0);
        // Facing -X and moving -X at 150: pure forward velocity.
        let mut me = ship(0, Team::Friend, Vec2::new(20.0, -30.0), FRAC_PI_2);
        me.velocity = Vec2::new(-150.0, 0.0);
        me.angular_velocity = -100.0;
        let s = compute_self_sensing(&me, &bounds);
        assert!(approx(s.forward_velocity, 0.5));
        assert!(approx(s.lateral_velocity, 0.0));
        assert_eq!(s.angular_velocity, -1.0);
        assert!(approx(s.x, 0.5) && approx(s.y, -1.0));
    }

    #[test]
    fn test_compute_sensing_is_deterministic() {
        let bounds = ArenaBounds::default();
        let me = ship(0, Team::Friend, Vec2::new(10.0, 5.0), 0.4);
        let foe = ship(1, Team::Foe, Vec2::new(-120.0, 80.0), 2.0);
        let projectiles = [shot(1, Vec2::new(-60.0, 40.0), Vec2::new(200.0, -120.0))];
        let ctx = SensingContext {
            bounds,
            ships: &[me, foe],
            projectiles: &projectiles,
            hazards: &[],
            blockers: &[],
        };
        let a = compute_sensing(&me, &ctx);
        let b = compute_sensing(&me, &ctx);
        assert_eq!(a, b);
        assert!(a.enemies[0].contact.present);
    }

    #[test]
    fn test_aim_point_round_trip() {
        let bounds = ArenaBounds::default();
        let me = ship(0, Team::Friend, Vec2::new(40.0, -20.0), 1.1);
        let target = Vec2::new(-130.0, 75.0);
        let encoded = encode_aim_point(&me, target, &bounds);
        assert!(encoded.length() <= 1.0);
        assert!(decode_aim_point(&me, encoded, &bounds).abs_diff_eq(target, 1e-3));
    }

    // --- Properties ---

    fn arb_point(half_w: f32, half_h: f32) -> impl Strategy<Value = Vec2> {
        (-half_w..half_w, -half_h..half_h).prop_map(|(x, y)| Vec2::new(x, y))
    }

    proptest! {
        #[test]
        fn prop_fixed_vector_shape(
            enemies in prop::collection::vec(arb_point(390.0, 290.0), 0..8),
            hazards in prop::collection::vec(arb_point(390.0, 290.0), 0..8),
            blockers in prop::collection::vec(arb_point(390.0, 290.0), 0..8),
            rotation in -PI..PI,
        ) {
            let bounds = ArenaBounds::default();
            let me = ship(0, Team::Friend, Vec2::ZERO, rotation);
            let mut ships = vec![me];
            ships.extend(
                enemies.iter().enumerate().map(|(i, &p)| ship(i as u32 + 1, Team::Foe, p, 0.0)),
            );
            let hazards: Vec<HazardView> = hazards
                .iter()
                .map(|&position| HazardView { position, velocity: Vec2::X, radius: 8.0 })
                .collect();
            let blockers: Vec<BlockerView> = blockers
                .iter()
                .map(|&position| BlockerView { position, radius: 12.0 })
                .collect();
            let ctx = SensingContext {
                bounds,
                ships: &ships,
                projectiles: &[],
                hazards: &hazards,
                blockers: &blockers,
            };
            let state = compute_sensing(&me, &ctx);
            let flat = state.flatten();
            prop_assert_eq!(flat.len(), SENSING_VECTOR_LEN);

            let offsets = SensingState::section_offsets();
            let check_padding = |start: usize, fields: usize, slots: usize, real: usize| {
                for slot in real.min(slots)..slots {
                    let base = start + slot * fields;
                    if flat[base..base + fields].iter().any(|&v| v != 0.0) {
                        return false;
                    }
                }
                for slot in 0..real.min(slots) {
                    if flat[start + slot * fields] != 1.0 {
                        return false;
                    }
                }
                true
            };
            prop_assert!(check_padding(offsets.enemies, ENEMY_FIELDS, ENEMY_SLOTS, enemies.len()));
            prop_assert!(check_padding(offsets.hazards, HAZARD_FIELDS, HAZARD_SLOTS, hazards.len()));
            prop_assert!(check_padding(offsets.blockers, BLOCKER_FIELDS, BLOCKER_SLOTS, blockers.len()));
            prop_assert!(flat.iter().all(|v| v.is_finite() && v.abs() <= 1.0));
        }

        #[test]
        fn prop_wall_raycast_bounded_inside_arena(
            position in arb_point(399.0, 299.0),
            rotation in -10.0f32..10.0,
        ) {
            let bounds = ArenaBounds::default();
            let me = ship(0, Team::Friend, position, rotation);
            let walls = compute_wall_sensing(&me, &bounds);
            for d in [walls.front, walls.back, walls.left, walls.right] {
                prop_assert!(d.is_finite());
                prop_assert!(d > 0.0);
                prop_assert!(d < 1.0);
            }
        }
    }
}
