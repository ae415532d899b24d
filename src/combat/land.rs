//! Land combat
//!
//! Losses on both sides are drawn from survival curves, the defender then
//! either retreats or doubles its losses, and an attacker that landed on the
//! combat hex must clear it or be wiped out.

use rand::Rng;
use tracing::{debug, info};

use crate::combat::losses::distribute_losses;
use crate::combat::probability::{
    combat_ratio, land_attacker_elimination_probability, land_attacker_loss_probability,
    land_defender_loss_probability, sample_threshold,
};
use crate::combat::result::{CombatResult, LandCombatResult};
use crate::combat::retreat::{enumerate_retreats, RetreatAssignment};
use crate::combat::{common_hex, require_alive, require_domain};
use crate::core::error::{CombatError, Result};
use crate::core::types::{Domain, UnitId};
use crate::map::HexCoord;
use crate::world::{World, ZoneKind};

#[derive(Debug, Clone)]
pub struct LandCombat {
    attackers: Vec<UnitId>,
    defenders: Vec<UnitId>,
    combat_hex: HexCoord,
    is_amphibious: bool,
    pub willing_to_retreat: bool,
    resolved: bool,
}

impl LandCombat {
    /// Attackers may be of any domain; defenders must be land units sharing a hex
    pub fn new(world: &World, attackers: Vec<UnitId>, defenders: Vec<UnitId>) -> Result<Self> {
        if attackers.is_empty() {
            return Err(CombatError::NoAttackers);
        }
        if defenders.is_empty() {
            return Err(CombatError::NoDefenders);
        }
        require_alive(world, &attackers)?;
        require_domain(world, &defenders, Domain::Land)?;
        let combat_hex = common_hex(world, &defenders)?;

        let is_amphibious = attackers.iter().any(|id| {
            world.unit(*id).is_ok_and(|unit| unit.is_land()) && world.hex_of(*id) == Some(combat_hex)
        });

        Ok(Self {
            attackers,
            defenders,
            combat_hex,
            is_amphibious,
            willing_to_retreat: true,
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

    /// Some land attackers already stand on the combat hex (landing or paradrop)
    pub fn is_amphibious(&self) -> bool {
        self.is_amphibious
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    fn alive<'a>(world: &'a World, units: &'a [UnitId]) -> impl Iterator<Item = UnitId> + 'a {
        units.iter().copied().filter(|id| world.is_alive(*id))
    }

    fn land_attackers(&self, world: &World) -> Vec<UnitId> {
        self.attackers
            .iter()
            .copied()
            .filter(|id| world.unit(*id).is_ok_and(|unit| unit.is_land()))
            .collect()
    }

    pub fn modified_attack_strength(&self, world: &World) -> f64 {
        Self::alive(world, &self.attackers)
            .map(|id| world.modified_land_attack(id))
            .sum()
    }

    pub fn modified_defense_strength(&self, world: &World) -> f64 {
        Self::alive(world, &self.defenders)
            .map(|id| world.modified_land_defense(id))
            .sum()
    }

    /// Strength of the attacking land units only
    pub fn unmodified_attack_strength(&self, world: &World) -> u32 {
        Self::alive(world, &self.attackers)
            .filter_map(|id| world.unit(id).ok())
            .filter(|unit| unit.is_land())
            .map(|unit| unit.strength())
            .sum()
    }

    pub fn unmodified_defense_strength(&self, world: &World) -> u32 {
        Self::alive(world, &self.defenders)
            .filter_map(|id| world.unit(id).ok())
            .map(|unit| unit.strength())
            .sum()
    }

    pub fn ratio(&self, world: &World) -> f64 {
        combat_ratio(self.modified_attack_strength(world), self.modified_defense_strength(world))
    }

    /// Probability of the defender losing at least `strength_points`, ignoring retreat
    pub fn defender_loss_probability(&self, world: &World, strength_points: u32) -> f64 {
        land_defender_loss_probability(self.ratio(world), strength_points, world.rules.land_loss_coefficient)
    }

    pub fn attacker_loss_probability(&self, world: &World, strength_points: u32) -> f64 {
        land_attacker_loss_probability(
            strength_points,
            world.rules.max_attacker_loss,
            self.modified_defense_strength(world),
        )
    }

    pub fn attacker_elimination_probability(&self, world: &World) -> f64 {
        land_attacker_elimination_probability(self.ratio(world), self.modified_defense_strength(world))
    }

    /// Probability of the defender losing everything
    ///
    /// A defender that cannot retreat has its losses doubled, so it only
    /// needs to lose half its strength.
    pub fn defender_elimination_probability(&self, world: &World) -> Result<f64> {
        let can_retreat = self.willing_to_retreat && !self.retreatable_hexes(world)?.is_empty();
        let divisor = if can_retreat { 1 } else { 2 };
        let needed = self.unmodified_defense_strength(world).div_ceil(divisor);
        Ok(self.defender_loss_probability(world, needed))
    }

    /// Every legal retreat for the surviving defenders, willing or not
    pub fn retreatable_hexes(&self, world: &World) -> Result<Vec<RetreatAssignment>> {
        let alive: Vec<UnitId> = Self::alive(world, &self.defenders).collect();
        enumerate_retreats(world, &alive, ZoneKind::Land)
    }

    pub fn inflict_damages<R: Rng + ?Sized>(&mut self, world: &mut World, rng: &mut R) -> Result<CombatResult> {
        if self.resolved {
            return Err(CombatError::AlreadyResolved);
        }
        self.resolved = true;

        // Losses
        let attacker_draw: f64 = rng.gen();
        let defender_draw: f64 = rng.gen();
        let (mut attacker_losses, mut defender_losses) = {
            let world: &World = world;
            let unmodified_attack = self.unmodified_attack_strength(world);
            let attacker_losses = if attacker_draw < self.attacker_elimination_probability(world) {
                unmodified_attack
            } else {
                sample_threshold(attacker_draw, unmodified_attack, |s| {
                    self.attacker_loss_probability(world, s)
                })
            };
            let defender_losses = sample_threshold(
                defender_draw,
                self.unmodified_defense_strength(world),
                |s| self.defender_loss_probability(world, s),
            );
            (attacker_losses, defender_losses)
        };
        debug!(attacker_draw, defender_draw, attacker_losses, defender_losses, "land combat losses drawn");

        // Retreat
        let possible_retreats = self.retreatable_hexes(world)?;
        let retreat = if defender_losses > 0 && self.willing_to_retreat && !possible_retreats.is_empty() {
            let index = rng.gen_range(0..possible_retreats.len());
            possible_retreats.into_iter().nth(index)
        } else {
            None
        };
        if retreat.is_none() {
            defender_losses *= 2;
        }

        let land_attackers = self.land_attackers(world);
        distribute_losses(world, rng, attacker_losses, &land_attackers)?;
        distribute_losses(world, rng, defender_losses, &self.defenders)?;

        // Supply units cannot hold a hex alone
        let defenders_broken = self.defenders.iter().all(|id| {
            !world.is_alive(*id) || world.unit(*id).is_ok_and(|unit| unit.is_supply())
        });
        if defenders_broken {
            for id in &self.defenders {
                if world.is_alive(*id) {
                    world.die(*id)?;
                }
            }
        }

        if let Some(retreat) = &retreat {
            for (unit, hex) in retreat.moves() {
                if world.is_alive(*unit) {
                    world.set_hex(*unit, *hex)?;
                    let owner = world.unit(*unit)?.owner;
                    world.set_controller(*hex, owner)?;
                }
            }
            debug!(moves = retreat.len(), "defenders retreated");
        }

        attacker_losses += self.resolve_landing(world)?;

        info!(
            hex = ?self.combat_hex,
            attacker_losses,
            defender_losses,
            retreated = retreat.is_some(),
            "land combat resolved"
        );

        Ok(CombatResult::Land(LandCombatResult {
            attacker_losses,
            defender_losses,
            retreat,
        }))
    }

    /// Attackers standing on the combat hex either take it or are wiped out
    ///
    /// Returns the extra strength lost by the attacker.
    fn resolve_landing(&self, world: &mut World) -> Result<u32> {
        let landed: Vec<UnitId> = self
            .land_attackers(world)
            .into_iter()
            .filter(|id| world.hex_of(*id) == Some(self.combat_hex))
            .collect();
        let Some(first) = landed.first() else {
            return Ok(0);
        };
        let attacker_owner = world.unit(*first)?.owner;

        let defenders_hold = self
            .defenders
            .iter()
            .any(|id| world.hex_of(*id) == Some(self.combat_hex));
        if !defenders_hold {
            world.set_controller(self.combat_hex, attacker_owner)?;
            return Ok(0);
        }

        let attacker_partnership = world.partnership_of(attacker_owner);
        let mut lost = 0;
        for id in world.land_units_in(&self.combat_hex) {
            if world.unit_partnership(id) == attacker_partnership {
                lost += world.unit(id)?.strength();
                world.die(id)?;
            }
        }
        debug!(lost, "landing force wiped out");
        Ok(lost)
    }
}
