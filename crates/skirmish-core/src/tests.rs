#[cfg(test)]
mod tests {
    use std::f32::consts::{FRAC_PI_2, PI};

    use glam::Vec2;
    use proptest::prelude::*;

    use crate::catalog::{PieceCatalog, PlacedPiece, ShipLayout, WeaponSpec};
    use crate::constants::*;
    use crate::enums::*;
    use crate::error::{CatalogError, LayoutError};
    use crate::events::ArenaEvent;
    use crate::input::{Input, Intent};
    use crate::sensing::*;
    use crate::types::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_sensing_vector_len_is_ninety() {
        assert_eq!(SENSING_VECTOR_LEN, 90);
        assert_eq!(SensingState::default().flatten().len(), 90);
    }

    #[test]
    fn test_default_sensing_state_is_all_zero() {
        let flat = SensingState::default().flatten();
        assert!(flat.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_flatten_section_order() {
        let mut state = SensingState::default();
        state.self_state.health = 0.75;
        state.walls.front = 0.3;
        state.threats.sectors[2] = 0.5;
        state.enemies[1] = EnemySensing {
            contact: ContactSensing {
                present: true,
                distance: 0.2,
                bearing: -0.5,
            },
            lead_facing: 0.9,
            ..Default::default()
        };
        state.hazards[0].contact.present = true;
        state.blockers[3].radius = 0.05;

        let flat = state.flatten();
        let offsets = SensingState::section_offsets();
        assert_eq!(flat[3], 0.75);
        assert_eq!(flat[offsets.walls], 0.3);
        assert_eq!(flat[offsets.threats + 2], 0.5);

        let enemy = offsets.enemies + ENEMY_FIELDS;
        assert_eq!(flat[enemy], 1.0);
        assert_eq!(flat[enemy + 1], 0.2);
        assert_eq!(flat[enemy + 2], -0.5);
        assert_eq!(flat[enemy + 8], 0.9);

        assert_eq!(flat[offsets.hazards], 1.0);
        assert_eq!(flat[offsets.blockers + 3 * BLOCKER_FIELDS + 3], 0.05);
        assert_eq!(offsets.blockers + BLOCKER_SLOTS * BLOCKER_FIELDS, 90);
    }

    #[test]
    fn test_sensing_state_serde() {
        let mut state = SensingState::default();
        state.enemy_world[0] = EnemyWorldData {
            present: true,
            position: Vec2::new(10.0, -4.0),
            velocity: Vec2::X,
            forward_angle: 1.0,
        };
        let json = serde_json::to_string(&state).unwrap();
        let back: SensingState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, back);
    }

    #[test]
    fn test_normalize_angle_range() {
        assert!(approx(normalize_angle(2.5 * PI), FRAC_PI_2));
        assert!(approx(normalize_angle(-PI), PI));
        assert!(approx(normalize_angle(-FRAC_PI_2), -FRAC_PI_2));
        assert!(approx(normalize_angle(0.0), 0.0));
    }

    #[test]
    fn test_forward_axis_conventions() {
        // Rotation 0 faces +Y.
        assert!(forward_vector(0.0).abs_diff_eq(Vec2::Y, 1e-6));
        assert!(right_vector(0.0).abs_diff_eq(Vec2::X, 1e-6));
        assert!(approx(forward_angle(0.0), FRAC_PI_2));

        // A quarter turn counterclockwise faces -X.
        assert!(forward_vector(FRAC_PI_2).abs_diff_eq(Vec2::NEG_X, 1e-6));
        assert!(local_to_world(Vec2::Y, FRAC_PI_2).abs_diff_eq(Vec2::NEG_X, 1e-6));
    }

    #[test]
    fn test_bearing_left_positive() {
        // Facing +Y: something at -X is on the left.
        assert!(approx(bearing_from_forward(0.0, Vec2::NEG_X), FRAC_PI_2));
        assert!(approx(bearing_from_forward(0.0, Vec2::X), -FRAC_PI_2));
        assert!(approx(bearing_from_forward(0.0, Vec2::Y), 0.0));
    }

    #[test]
    fn test_arena_bounds() {
        let bounds = ArenaBounds::new(80.0, 60.0);
        assert!(approx(bounds.diagonal(), 100.0));
        assert!(bounds.contains(Vec2::new(39.0, -29.0)));
        assert!(!bounds.contains(Vec2::new(40.0, 0.0)));
        assert_eq!(
            bounds.normalize_position(Vec2::new(20.0, -60.0)),
            Vec2::new(0.5, -1.0)
        );
    }

    #[test]
    fn test_builtin_catalog_is_valid() {
        let catalog = PieceCatalog::builtin();
        catalog.validate().unwrap();
        for preset in ["drone", "fighter", "gunship"] {
            let layout = ShipLayout::preset(preset).unwrap();
            assert_eq!(catalog.validate_layout(&layout), Ok(()));
        }
    }

    #[test]
    fn test_layout_validation_errors() {
        let catalog = PieceCatalog::builtin();
        assert_eq!(
            catalog.validate_layout(&ShipLayout::default()),
            Err(LayoutError::Empty)
        );

        let no_core = ShipLayout {
            pieces: vec![PlacedPiece::at_cell("armor", 0, 0)],
        };
        assert_eq!(
            catalog.validate_layout(&no_core),
            Err(LayoutError::MissingCore)
        );

        let two_cores = ShipLayout {
            pieces: vec![
                PlacedPiece::at_cell("core", 0, 0),
                PlacedPiece::at_cell("core", 0, 1),
            ],
        };
        assert_eq!(
            catalog.validate_layout(&two_cores),
            Err(LayoutError::MultipleCores(2))
        );

        let unknown = ShipLayout {
            pieces: vec![PlacedPiece::at_cell("laser", 0, 0)],
        };
        assert_eq!(
            catalog.validate_layout(&unknown),
            Err(LayoutError::UnknownPiece("laser".into()))
        );
    }

    #[test]
    fn test_unknown_preset() {
        assert!(matches!(
            ShipLayout::preset("battleship"),
            Err(CatalogError::UnknownPreset(_))
        ));
    }

    #[test]
    fn test_catalog_from_json() {
        let json = r#"{
            "core": { "category": "core", "width": 10, "height": 10, "mass": 3, "hp": 40 },
            "rail": {
                "category": "equipment", "width": 10, "height": 20, "mass": 2, "hp": 10,
                "weapon": {
                    "reload_secs": 2.0, "damage": 30, "projectile_speed": 900,
                    "projectile_lifetime_secs": 1.0, "aim_arc": 0.2, "fire_arc": 0.3,
                    "turn_rate": 2.0
                }
            }
        }"#;
        let catalog = PieceCatalog::from_json(json).unwrap();
        assert_eq!(catalog.len(), 2);
        let weapon = catalog.get("rail").unwrap().weapon.unwrap();
        assert_eq!(weapon.burst_count, 1);
        assert!(weapon.heat.is_none());
    }

    #[test]
    fn test_catalog_rejects_bad_values() {
        let json = r#"{ "core": { "category": "core", "width": 10, "height": 10, "mass": 0, "hp": 40 } }"#;
        match PieceCatalog::from_json(json) {
            Err(CatalogError::InvalidValue { field, .. }) => assert_eq!(field, "mass"),
            other => panic!("expected InvalidValue, got {other:?}"),
        }
        assert!(matches!(
            PieceCatalog::from_json("not json"),
            Err(CatalogError::Parse(_))
        ));

        let gatling = *PieceCatalog::builtin().get("gatling").unwrap();
        let cases: [(&str, fn(&mut WeaponSpec)); 16] = [
            ("turn_rate", |w| w.turn_rate = -1.0),
            ("reload_secs", |w| w.reload_secs = f32::NAN),
            ("damage", |w| w.damage = -5.0),
            ("projectile_speed", |w| w.projectile_speed = -100.0),
            ("projectile_lifetime_secs", |w| w.projectile_lifetime_secs = 0.0),
            ("projectile_radius", |w| w.projectile_radius = -1.0),
            ("aim_arc", |w| {
                w.aim_arc = -0.5;
                w.fire_arc = -0.5;
            }),
            ("fire_arc", |w| w.fire_arc = w.aim_arc * 0.5),
            ("burst_count", |w| w.burst_count = 0),
            ("burst_delay_secs", |w| w.burst_delay_secs = -0.1),
            ("spread", |w| w.spread = f32::INFINITY),
            ("spin_up_secs", |w| {
                if let Some(spin) = w.spin_up.as_mut() {
                    spin.spin_up_secs = -1.0;
                }
            }),
            ("min_reload_factor", |w| {
                if let Some(spin) = w.spin_up.as_mut() {
                    spin.min_reload_factor = 1.5;
                }
            }),
            ("min_reload_factor", |w| {
                if let Some(spin) = w.spin_up.as_mut() {
                    spin.min_reload_factor = 0.0;
                }
            }),
            ("capacity", |w| {
                if let Some(heat) = w.heat.as_mut() {
                    heat.capacity = 0.0;
                }
            }),
            ("cool_rate", |w| {
                if let Some(heat) = w.heat.as_mut() {
                    heat.cool_rate = -2.0;
                }
            }),
        ];
        for (expected, mutate) in cases {
            let mut spec = gatling;
            let Some(weapon) = spec.weapon.as_mut() else {
                panic!("gatling has no weapon");
            };
            mutate(weapon);
            let mut catalog = PieceCatalog::default();
            catalog.insert("bad_gun", spec);
            match catalog.validate() {
                Err(CatalogError::InvalidValue { field, .. }) => assert_eq!(field, expected),
                other => panic!("{expected}: expected InvalidValue, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_negative_turn_rate_rejected_from_json() {
        let json = r#"{
            "bad_gun": {
                "category": "equipment", "width": 10, "height": 20, "mass": 2, "hp": 10,
                "weapon": {
                    "reload_secs": 1.0, "damage": 5, "projectile_speed": 400,
                    "projectile_lifetime_secs": 1.0, "aim_arc": 0.5, "fire_arc": 0.6,
                    "turn_rate": -1.0
                }
            }
        }"#;
        assert!(matches!(
            PieceCatalog::from_json(json),
            Err(CatalogError::InvalidValue { field: "turn_rate", .. })
        ));
        assert!(PieceCatalog::builtin().validate().is_ok());
    }

    #[test]
    fn test_input_partial_json() {
        let input: Input = serde_json::from_str(r#"{ "forward": true, "fire": true }"#).unwrap();
        assert!(input.forward && input.fire);
        assert!(!input.turn_toward);
        assert_eq!(input.intent_activations(), [1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_input_from_activations() {
        let input = Input::from_activations(&[0.9, 0.1, 0.5, 0.51, 0.0, 1.0, 0.7], ACTION_THRESHOLD);
        assert!(input.forward && !input.back);
        // Exactly at the threshold is not pressed.
        assert!(!input.left && input.right);
        assert!(!input.turn_left && input.turn_right && input.fire);
        assert_eq!(input.intent_activations(), [1.0, 0.0, 0.0, 1.0, 0.0, 1.0, 1.0]);

        let mut input = Input::idle();
        input.set(Intent::TurnLeft, true);
        assert!(input.turn_left);
    }

    #[test]
    fn test_event_serde() {
        let events = vec![
            ArenaEvent::ShipDestroyed {
                ship: ShipId(3),
                cause: DestructionCause::Projectile { shooter: ShipId(1) },
            },
            ArenaEvent::OutcomeResolved {
                outcome: Outcome::Won,
            },
            ArenaEvent::SpawnFailed {
                name: "raider".into(),
                reason: "ship layout has no core piece".into(),
            },
        ];
        for event in events {
            let json = serde_json::to_string(&event).unwrap();
            let back: ArenaEvent = serde_json::from_str(&json).unwrap();
            assert_eq!(event, back);
        }
    }

    #[test]
    fn test_team_opposing() {
        assert_eq!(Team::Friend.opposing(), Team::Foe);
        assert_eq!(Team::Foe.opposing(), Team::Friend);
    }

    proptest! {
        #[test]
        fn prop_normalize_angle_in_range(a in -100.0f32..100.0) {
            let n = normalize_angle(a);
            prop_assert!(n > -PI - 1e-5 && n <= PI + 1e-5);
            prop_assert!((n.sin() - a.sin()).abs() < 1e-3);
            prop_assert!((n.cos() - a.cos()).abs() < 1e-3);
        }

        #[test]
        fn prop_local_world_round_trip(
            x in -500.0f32..500.0,
            y in -500.0f32..500.0,
            rot in -10.0f32..10.0,
        ) {
            let v = Vec2::new(x, y);
            let back = world_to_local(local_to_world(v, rot), rot);
            prop_assert!(back.abs_diff_eq(v, 1e-2));
        }
    }
}
