//! Piece catalog and ship layouts.
//!
//! The catalog supplies the static parameters of every piece type. The core
//! reads these values but does not own their balance; callers may load a
//! catalog from JSON or start from [`PieceCatalog::builtin`].

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::constants::PIECE_UNIT;
use crate::enums::PieceCategory;
use crate::error::{CatalogError, LayoutError};

/// Ramp-up behavior: reload shrinks while the trigger is held.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpinUpSpec {
    /// Seconds of held trigger to reach full spin.
    pub spin_up_secs: f32,
    /// Reload multiplier at full spin (0 < factor <= 1).
    pub min_reload_factor: f32,
}

/// Overheat behavior: shots add heat; at capacity the weapon locks until cool.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeatSpec {
    pub heat_per_shot: f32,
    pub capacity: f32,
    /// Heat removed per second.
    pub cool_rate: f32,
}

fn default_burst_count() -> u32 {
    1
}

/// Weapon parameters of an equipment piece.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeaponSpec {
    pub reload_secs: f32,
    pub damage: f32,
    pub projectile_speed: f32,
    pub projectile_lifetime_secs: f32,
    #[serde(default)]
    pub projectile_radius: f32,
    /// Half-angle the turret may slew away from the ship's forward axis.
    pub aim_arc: f32,
    /// Half-angle within which a target may be engaged (>= `aim_arc`).
    pub fire_arc: f32,
    /// Turret slew rate (rad/s).
    pub turn_rate: f32,
    #[serde(default = "default_burst_count")]
    pub burst_count: u32,
    #[serde(default)]
    pub burst_delay_secs: f32,
    /// Maximum random angular jitter per shot.
    #[serde(default)]
    pub spread: f32,
    #[serde(default)]
    pub spin_up: Option<SpinUpSpec>,
    #[serde(default)]
    pub heat: Option<HeatSpec>,
}

/// Static parameters of one piece type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PieceSpec {
    pub category: PieceCategory,
    pub width: f32,
    pub height: f32,
    pub mass: f32,
    pub hp: f32,
    /// Thrust force contributed while the piece is intact.
    #[serde(default)]
    pub thrust: Option<f32>,
    #[serde(default)]
    pub weapon: Option<WeaponSpec>,
}

/// Piece types keyed by name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PieceCatalog {
    pieces: BTreeMap<String, PieceSpec>,
}

impl PieceCatalog {
    /// The catalog shipped with the game.
    pub fn builtin() -> Self {
        let block = |category, mass, hp| PieceSpec {
            category,
            width: PIECE_UNIT,
            height: PIECE_UNIT,
            mass,
            hp,
            thrust: None,
            weapon: None,
        };
        let cannon = WeaponSpec {
            reload_secs: 0.8,
            damage: 10.0,
            projectile_speed: 420.0,
            projectile_lifetime_secs: 1.6,
            projectile_radius: 2.0,
            aim_arc: 60f32.to_radians(),
            fire_arc: 75f32.to_radians(),
            turn_rate: 4.0,
            burst_count: 1,
            burst_delay_secs: 0.0,
            spread: 0.01,
            spin_up: None,
            heat: None,
        };
        let burst_cannon = WeaponSpec {
            reload_secs: 1.4,
            damage: 6.0,
            burst_count: 3,
            burst_delay_secs: 0.08,
            spread: 0.05,
            ..cannon
        };
        let gatling = WeaponSpec {
            reload_secs: 0.3,
            damage: 3.0,
            projectile_speed: 480.0,
            projectile_lifetime_secs: 1.0,
            projectile_radius: 1.5,
            aim_arc: 30f32.to_radians(),
            fire_arc: 40f32.to_radians(),
            turn_rate: 6.0,
            spread: 0.08,
            spin_up: Some(SpinUpSpec {
                spin_up_secs: 1.5,
                min_reload_factor: 0.3,
            }),
            heat: Some(HeatSpec {
                heat_per_shot: 1.0,
                capacity: 30.0,
                cool_rate: 10.0,
            }),
            ..cannon
        };

        let mut catalog = Self::default();
        catalog.insert("core", block(PieceCategory::Core, 3.0, 40.0));
        catalog.insert("armor", block(PieceCategory::Structure, 2.0, 30.0));
        catalog.insert("light_armor", block(PieceCategory::Structure, 1.0, 15.0));
        catalog.insert(
            "thruster",
            PieceSpec {
                thrust: Some(900.0),
                ..block(PieceCategory::Equipment, 1.0, 12.0)
            },
        );
        catalog.insert(
            "cannon",
            PieceSpec {
                weapon: Some(cannon),
                ..block(PieceCategory::Equipment, 1.5, 15.0)
            },
        );
        catalog.insert(
            "burst_cannon",
            PieceSpec {
                weapon: Some(burst_cannon),
                ..block(PieceCategory::Equipment, 1.5, 15.0)
            },
        );
        catalog.insert(
            "gatling",
            PieceSpec {
                weapon: Some(gatling),
                ..block(PieceCategory::Equipment, 2.0, 15.0)
            },
        );
        catalog
    }

    /// Parse and validate a catalog from JSON.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let catalog: Self = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn get(&self, kind: &str) -> Option<&PieceSpec> {
        self.pieces.get(kind)
    }

    pub fn insert(&mut self, kind: impl Into<String>, spec: PieceSpec) {
        self.pieces.insert(kind.into(), spec);
    }

    /// Overlay another catalog; its entries win.
    pub fn extend(&mut self, other: PieceCatalog) {
        self.pieces.extend(other.pieces);
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// Reject non-physical piece parameters.
    pub fn validate(&self) -> Result<(), CatalogError> {
        for (kind, spec) in &self.pieces {
            let invalid = |field: &'static str, value: f32| CatalogError::InvalidValue {
                kind: kind.clone(),
                field,
                value,
            };
            let positive = [
                ("width", spec.width),
                ("height", spec.height),
                ("mass", spec.mass),
                ("hp", spec.hp),
            ];
            for (field, value) in positive {
                if !(value.is_finite() && value > 0.0) {
                    return Err(invalid(field, value));
                }
            }
            if let Some(thrust) = spec.thrust {
                if !(thrust.is_finite() && thrust >= 0.0) {
                    return Err(invalid("thrust", thrust));
                }
            }
            if let Some(weapon) = &spec.weapon {
                validate_weapon(weapon).map_err(|(field, value)| invalid(field, value))?;
            }
        }
        Ok(())
    }

    /// Check that a layout can become a ship: non-empty, known pieces,
    /// exactly one core.
    pub fn validate_layout(&self, layout: &ShipLayout) -> Result<(), LayoutError> {
        if layout.pieces.is_empty() {
            return Err(LayoutError::Empty);
        }
        let mut cores = 0;
        for placed in &layout.pieces {
            let spec = self
                .get(&placed.kind)
                .ok_or_else(|| LayoutError::UnknownPiece(placed.kind.clone()))?;
            if spec.category == PieceCategory::Core {
                cores += 1;
            }
        }
        match cores {
            0 => Err(LayoutError::MissingCore),
            1 => Ok(()),
            n => Err(LayoutError::MultipleCores(n)),
        }
    }
}

/// First out-of-range weapon field, if any.
fn validate_weapon(weapon: &WeaponSpec) -> Result<(), (&'static str, f32)> {
    let check = |field: &'static str, value: f32, ok: bool| {
        if value.is_finite() && ok {
            Ok(())
        } else {
            Err((field, value))
        }
    };
    check("reload_secs", weapon.reload_secs, weapon.reload_secs >= 0.0)?;
    check("damage", weapon.damage, weapon.damage >= 0.0)?;
    check("projectile_speed", weapon.projectile_speed, weapon.projectile_speed >= 0.0)?;
    check(
        "projectile_lifetime_secs",
        weapon.projectile_lifetime_secs,
        weapon.projectile_lifetime_secs > 0.0,
    )?;
    check("projectile_radius", weapon.projectile_radius, weapon.projectile_radius >= 0.0)?;
    check("aim_arc", weapon.aim_arc, weapon.aim_arc >= 0.0)?;
    check("fire_arc", weapon.fire_arc, weapon.fire_arc >= weapon.aim_arc)?;
    check("turn_rate", weapon.turn_rate, weapon.turn_rate >= 0.0)?;
    check("burst_count", weapon.burst_count as f32, weapon.burst_count > 0)?;
    check("burst_delay_secs", weapon.burst_delay_secs, weapon.burst_delay_secs >= 0.0)?;
    check("spread", weapon.spread, weapon.spread >= 0.0)?;
    if let Some(spin) = &weapon.spin_up {
        check("spin_up_secs", spin.spin_up_secs, spin.spin_up_secs >= 0.0)?;
        check(
            "min_reload_factor",
            spin.min_reload_factor,
            spin.min_reload_factor > 0.0 && spin.min_reload_factor <= 1.0,
        )?;
    }
    if let Some(heat) = &weapon.heat {
        check("heat_per_shot", heat.heat_per_shot, heat.heat_per_shot >= 0.0)?;
        check("capacity", heat.capacity, heat.capacity > 0.0)?;
        check("cool_rate", heat.cool_rate, heat.cool_rate > 0.0)?;
    }
    Ok(())
}

/// One piece placed in a ship layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedPiece {
    pub kind: String,
    /// Offset from the ship origin in the ship-local frame (world units).
    pub offset: Vec2,
    #[serde(default)]
    pub rotation: f32,
}

impl PlacedPiece {
    /// Place a piece on the layout grid.
    pub fn at_cell(kind: &str, col: i32, row: i32) -> Self {
        Self {
            kind: kind.to_owned(),
            offset: Vec2::new(col as f32, row as f32) * PIECE_UNIT,
            rotation: 0.0,
        }
    }
}

/// An assembled ship design, produced by the external editor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShipLayout {
    pub pieces: Vec<PlacedPiece>,
}

impl ShipLayout {
    /// Built-in designs used by scripted opponents and the headless runner.
    pub fn preset(name: &str) -> Result<Self, CatalogError> {
        let cells: &[(&str, i32, i32)] = match name {
            "drone" => &[("core", 0, 0), ("cannon", 0, 1), ("thruster", 0, -1)],
            "fighter" => &[
                ("core", 0, 0),
                ("cannon", 0, 1),
                ("light_armor", -1, 0),
                ("light_armor", 1, 0),
                ("thruster", -1, -1),
                ("thruster", 1, -1),
            ],
            "gunship" => &[
                ("core", 0, 0),
                ("gatling", 0, 1),
                ("burst_cannon", -1, 1),
                ("burst_cannon", 1, 1),
                ("armor", -1, 0),
                ("armor", 1, 0),
                ("armor", 0, -1),
                ("thruster", -1, -2),
                ("thruster", 0, -2),
                ("thruster", 1, -2),
            ],
            other => return Err(CatalogError::UnknownPreset(other.to_owned())),
        };
        Ok(Self {
            pieces: cells
                .iter()
                .map(|&(kind, col, row)| PlacedPiece::at_cell(kind, col, row))
                .collect(),
        })
    }
}
