//! Air and naval combat
//!
//! Every participant rolls for damage and then for outright elimination.
//! Afterwards the defender either retreats (when attacked by ships) or has
//! its mission canceled (when attacked from the air).

use std::collections::BTreeSet;

use rand::Rng;
use tracing::{debug, info};

use crate::combat::probability::{
    cancel_or_retreat_probability, combat_ratio, damage_or_elimination_probability,
};
use crate::combat::result::{AirNavalCombatResult, CombatResult};
use crate::combat::retreat::{enumerate_retreats, RetreatAssignment};
use crate::combat::{common_hex, require_alive};
use crate::core::error::{CombatError, Result};
use crate::core::types::{Domain, UnitId};
use crate::map::HexCoord;
use crate::units::{Unit, UnitKind};
use crate::world::{World, ZoneKind};

#[derive(Debug, Clone)]
pub struct AirNavalCombat {
    attackers: Vec<UnitId>,
    /// Either a single air unit or any number of naval units
    defenders: Vec<UnitId>,
    combat_hex: HexCoord,
    pub kamikaze: bool,
    resolved: bool,
}

impl AirNavalCombat {
    pub fn new(world: &World, attackers: Vec<UnitId>, defenders: Vec<UnitId>) -> Result<Self> {
        if attackers.is_empty() {
            return Err(CombatError::NoAttackers);
        }
        if defenders.is_empty() {
            return Err(CombatError::NoDefenders);
        }
        require_alive(world, &attackers)?;
        require_alive(world, &defenders)?;
        for id in &attackers {
            if world.unit(*id)?.is_land() {
                return Err(CombatError::WrongDomain {
                    unit: *id,
                    expected: Domain::Naval,
                });
            }
        }

        let air_defense = world.unit(defenders[0])?.is_air();
        if air_defense && defenders.len() > 1 {
            return Err(CombatError::WrongDomain {
                unit: defenders[1],
                expected: Domain::Air,
            });
        }
        if !air_defense {
            for id in &defenders {
                if !world.unit(*id)?.is_naval() {
                    return Err(CombatError::WrongDomain {
                        unit: *id,
                        expected: Domain::Naval,
                    });
                }
            }
        }
        let combat_hex = common_hex(world, &defenders)?;

        Ok(Self {
            attackers,
            defenders,
            combat_hex,
            kamikaze: false,
            resolved: false,
        })
    }

    pub fn attackers(&self) -> &[UnitId] {
        &self.attackers
    }

    pub fn defenders(&self) -> &[UnitId] {
        &self.defenders
    }

    pub fn combat_hex(&self) -> HexCoord {
        self.combat_hex
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    fn is_attacker(&self, id: UnitId) -> bool {
        self.attackers.contains(&id)
    }

    /// Unmodified strength of `attacker` against the kind of unit `target` is
    fn strength_against(&self, world: &World, attacker: &Unit, target: UnitId) -> f64 {
        let Ok(target) = world.unit(target) else {
            return 0.0;
        };
        match (&attacker.kind, &target.kind) {
            (UnitKind::Air(air), UnitKind::Air(_)) => air.fighter_strength as f64,
            (_, UnitKind::Air(_)) => 0.0,
            (UnitKind::Air(air), _) => {
                if self.kamikaze && self.is_attacker(attacker.id) {
                    let base = if air.bomber_strength > 0 {
                        air.bomber_strength
                    } else {
                        air.kamikaze_base_strength
                    };
                    base as f64 * world.rules.kamikaze_multiplier
                } else {
                    air.bomber_strength as f64
                }
            }
            (UnitKind::Naval(naval), _) if target.is_submarine() => naval.submarine_attack as f64,
            (UnitKind::Naval(naval), _) => naval.attack as f64,
            (UnitKind::Land(_), _) => 0.0,
        }
    }

    fn total_strength(&self, world: &World, units: &[UnitId], target: UnitId, modified: bool) -> f64 {
        units
            .iter()
            .filter_map(|id| world.unit(*id).ok())
            .map(|unit| {
                let divisor = if modified { unit.damage_divisor() } else { 1.0 };
                self.strength_against(world, unit, target) / divisor
            })
            .sum()
    }

    fn total_defense(world: &World, units: &[UnitId], modified: bool) -> f64 {
        units
            .iter()
            .filter_map(|id| world.unit(*id).ok())
            .map(|unit| {
                let divisor = if modified { unit.damage_divisor() } else { 1.0 };
                unit.defense() as f64 / divisor
            })
            .sum()
    }

    pub fn modified_attack_strength(&self, world: &World) -> f64 {
        self.total_strength(world, &self.attackers, self.defenders[0], true)
    }

    pub fn unmodified_attack_strength(&self, world: &World) -> f64 {
        self.total_strength(world, &self.attackers, self.defenders[0], false)
    }

    pub fn modified_defense_strength(&self, world: &World) -> f64 {
        Self::total_defense(world, &self.defenders, true)
    }

    pub fn unmodified_defense_strength(&self, world: &World) -> f64 {
        Self::total_defense(world, &self.defenders, false)
    }

    /// Strength of the defenders striking back at the attackers
    pub fn modified_counter_attack_strength(&self, world: &World) -> f64 {
        self.total_strength(world, &self.defenders, self.attackers[0], true)
    }

    pub fn unmodified_counter_attack_strength(&self, world: &World) -> f64 {
        self.total_strength(world, &self.defenders, self.attackers[0], false)
    }

    pub fn modified_counter_defense_strength(&self, world: &World) -> f64 {
        Self::total_defense(world, &self.attackers, true)
    }

    pub fn unmodified_counter_defense_strength(&self, world: &World) -> f64 {
        Self::total_defense(world, &self.attackers, false)
    }

    /// Probability of the defender retreating, or its mission being canceled
    pub fn defender_cancel_or_retreat_probability(&self, world: &World) -> f64 {
        let ratio = combat_ratio(self.modified_attack_strength(world), self.modified_defense_strength(world));
        cancel_or_retreat_probability(ratio, world.rules.cancel_or_retreat_probability_at_ratio_1)
    }

    fn unit_probability(&self, world: &World, id: UnitId, p1: f64) -> f64 {
        let Ok(unit) = world.unit(id) else {
            return 0.0;
        };
        let (enemy_strength, unit_count) = if self.is_attacker(id) {
            (self.modified_counter_attack_strength(world), self.attackers.len())
        } else {
            (self.modified_attack_strength(world), self.defenders.len())
        };
        damage_or_elimination_probability(enemy_strength, unit.defense() as f64, unit_count, p1)
    }

    /// Kamikaze attackers are never merely damaged
    pub fn damage_probability(&self, world: &World, id: UnitId) -> f64 {
        if self.kamikaze && self.is_attacker(id) {
            return 0.0;
        }
        self.unit_probability(world, id, world.rules.damage_probability_at_ratio_1)
    }

    /// Probability of outright elimination; does not count a second hit on a damaged unit
    pub fn elimination_probability(&self, world: &World, id: UnitId) -> f64 {
        if self.kamikaze && self.is_attacker(id) {
            return 1.0;
        }
        self.unit_probability(world, id, world.rules.elimination_probability_at_ratio_1)
    }

    fn has_naval_attackers(&self, world: &World) -> bool {
        self.attackers
            .iter()
            .any(|id| world.unit(*id).is_ok_and(|unit| unit.is_naval()))
    }

    /// Every legal retreat for the surviving defenders
    pub fn retreatable_hexes(&self, world: &World) -> Result<Vec<RetreatAssignment>> {
        let alive: Vec<UnitId> = self
            .defenders
            .iter()
            .copied()
            .filter(|id| world.is_alive(*id))
            .collect();
        let against_submarines = world.unit(self.defenders[0])?.is_submarine();
        enumerate_retreats(world, &alive, ZoneKind::Naval { against_submarines })
    }

    /// Resolve the combat
    ///
    /// Fire is simultaneous: every probability is taken from the state before
    /// any unit is hit.
    pub fn inflict_damages<R: Rng + ?Sized>(&mut self, world: &mut World, rng: &mut R) -> Result<CombatResult> {
        if self.resolved {
            return Err(CombatError::AlreadyResolved);
        }
        self.resolved = true;

        let naval_attack = self.has_naval_attackers(world);
        let possible_retreats = if naval_attack {
            self.retreatable_hexes(world)?
        } else {
            Vec::new()
        };
        let cancel_or_retreat = self.defender_cancel_or_retreat_probability(world);
        let odds: Vec<(UnitId, f64, f64)> = self
            .attackers
            .iter()
            .chain(&self.defenders)
            .map(|id| {
                (
                    *id,
                    self.damage_probability(world, *id),
                    self.elimination_probability(world, *id),
                )
            })
            .collect();

        let mut hit = BTreeSet::new();
        for (id, damage, elimination) in odds {
            if rng.gen::<f64>() < damage {
                world.damage(id)?;
                hit.insert(id);
            }
            if rng.gen::<f64>() < elimination {
                if world.is_alive(id) {
                    world.die(id)?;
                }
                hit.insert(id);
            }
        }
        let (eliminated_units, damaged_units): (BTreeSet<UnitId>, BTreeSet<UnitId>) =
            hit.into_iter().partition(|id| !world.is_alive(*id));
        debug!(damaged = damaged_units.len(), eliminated = eliminated_units.len(), "air/naval hits applied");

        let rolled = rng.gen::<f64>() < cancel_or_retreat;
        let mut retreat = None;
        let mut mission_canceled = None;
        if naval_attack {
            if rolled && !possible_retreats.is_empty() {
                let index = rng.gen_range(0..possible_retreats.len());
                retreat = possible_retreats.into_iter().nth(index);
            }
            if let Some(retreat) = &retreat {
                for (unit, hex) in retreat.moves() {
                    if world.is_alive(*unit) {
                        world.set_hex(*unit, *hex)?;
                    }
                }
            }
        } else {
            let all_down = self.defenders.iter().all(|id| !world.is_alive(*id));
            mission_canceled = Some(rolled || all_down);
        }

        info!(
            hex = ?self.combat_hex,
            damaged = damaged_units.len(),
            eliminated = eliminated_units.len(),
            retreated = retreat.is_some(),
            mission_canceled = ?mission_canceled,
            "air/naval combat resolved"
        );

        Ok(CombatResult::AirNaval(AirNavalCombatResult {
            damaged_units,
            eliminated_units,
            mission_canceled,
            retreat,
        }))
    }
}
