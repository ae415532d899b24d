//! Combat resolution
//!
//! A `Combat` is built from attacker and defender lists, may be queried for
//! strengths and probabilities any number of times, and is resolved exactly
//! once with `inflict_damages`.

pub mod air_naval;
pub mod amphibious;
pub mod bombing;
pub mod land;
pub mod losses;
pub mod probability;
pub mod result;
pub mod retreat;

use rand::Rng;

use crate::core::error::{CombatError, Result};
use crate::core::types::{Domain, UnitId};
use crate::map::HexCoord;
use crate::world::World;

pub use air_naval::AirNavalCombat;
pub use amphibious::{amphibious_paradrop_success_probability, run_amphibious_paradrop};
pub use bombing::{Bombing, BombingKind};
pub use land::LandCombat;
pub use losses::distribute_losses;
pub use result::{AirNavalCombatResult, BombingResult, CombatResult, LandCombatResult};
pub use retreat::{enumerate_retreats, hex_is_retreatable, RetreatAssignment};

/// Every kind of engagement the engine resolves
#[derive(Debug, Clone)]
pub enum Combat {
    Land(LandCombat),
    AirNaval(AirNavalCombat),
    Bombing(Bombing),
}

impl Combat {
    pub fn land(world: &World, attackers: Vec<UnitId>, defenders: Vec<UnitId>) -> Result<Self> {
        LandCombat::new(world, attackers, defenders).map(Combat::Land)
    }

    pub fn air_naval(world: &World, attackers: Vec<UnitId>, defenders: Vec<UnitId>) -> Result<Self> {
        AirNavalCombat::new(world, attackers, defenders).map(Combat::AirNaval)
    }

    pub fn strategic_bombing(world: &World, attackers: Vec<UnitId>) -> Result<Self> {
        Bombing::new(world, BombingKind::Strategic, attackers).map(Combat::Bombing)
    }

    pub fn installation_bombing(world: &World, attackers: Vec<UnitId>) -> Result<Self> {
        Bombing::new(world, BombingKind::Installation, attackers).map(Combat::Bombing)
    }

    pub fn atomic_bombing(world: &World, attackers: Vec<UnitId>) -> Result<Self> {
        Bombing::new(world, BombingKind::Atomic, attackers).map(Combat::Bombing)
    }

    pub fn attackers(&self) -> &[UnitId] {
        match self {
            Combat::Land(combat) => combat.attackers(),
            Combat::AirNaval(combat) => combat.attackers(),
            Combat::Bombing(combat) => combat.attackers(),
        }
    }

    /// Bombing has no defenders
    pub fn defenders(&self) -> &[UnitId] {
        match self {
            Combat::Land(combat) => combat.defenders(),
            Combat::AirNaval(combat) => combat.defenders(),
            Combat::Bombing(_) => &[],
        }
    }

    pub fn combat_hex(&self) -> HexCoord {
        match self {
            Combat::Land(combat) => combat.combat_hex(),
            Combat::AirNaval(combat) => combat.combat_hex(),
            Combat::Bombing(combat) => combat.combat_hex(),
        }
    }

    pub fn modified_attack_strength(&self, world: &World) -> f64 {
        match self {
            Combat::Land(combat) => combat.modified_attack_strength(world),
            Combat::AirNaval(combat) => combat.modified_attack_strength(world),
            Combat::Bombing(combat) => combat.modified_attack_strength(world),
        }
    }

    /// For land combat, only land units count
    pub fn unmodified_attack_strength(&self, world: &World) -> f64 {
        match self {
            Combat::Land(combat) => combat.unmodified_attack_strength(world) as f64,
            Combat::AirNaval(combat) => combat.unmodified_attack_strength(world),
            Combat::Bombing(combat) => combat.unmodified_attack_strength(world),
        }
    }

    pub fn is_resolved(&self) -> bool {
        match self {
            Combat::Land(combat) => combat.is_resolved(),
            Combat::AirNaval(combat) => combat.is_resolved(),
            Combat::Bombing(combat) => combat.is_resolved(),
        }
    }

    pub fn inflict_damages<R: Rng + ?Sized>(&mut self, world: &mut World, rng: &mut R) -> Result<CombatResult> {
        match self {
            Combat::Land(combat) => combat.inflict_damages(world, rng),
            Combat::AirNaval(combat) => combat.inflict_damages(world, rng),
            Combat::Bombing(combat) => combat.inflict_damages(world, rng),
        }
    }
}

pub(crate) fn require_alive(world: &World, units: &[UnitId]) -> Result<()> {
    for id in units {
        world.unit(*id)?;
        if !world.is_alive(*id) {
            return Err(CombatError::UnitNotAlive(*id));
        }
    }
    Ok(())
}

pub(crate) fn require_domain(world: &World, units: &[UnitId], domain: Domain) -> Result<()> {
    require_alive(world, units)?;
    for id in units {
        if world.unit(*id)?.domain() != domain {
            return Err(CombatError::WrongDomain {
                unit: *id,
                expected: domain,
            });
        }
    }
    Ok(())
}

/// The hex shared by all `units`, which must be alive
pub(crate) fn common_hex(world: &World, units: &[UnitId]) -> Result<HexCoord> {
    let (first, rest) = units.split_first().ok_or(CombatError::NoDefenders)?;
    let expected = world.hex_of(*first).ok_or(CombatError::UnitNotAlive(*first))?;
    for id in rest {
        let found = world.hex_of(*id).ok_or(CombatError::UnitNotAlive(*id))?;
        if found != expected {
            return Err(CombatError::InconsistentCombatHex {
                unit: *id,
                expected,
                found,
            });
        }
    }
    Ok(expected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Partnership;
    use crate::map::MapSheet;
    use crate::units::UnitKind;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_combat_enum_dispatch() {
        let mut world = World::new(MapSheet::parse(". . ."));
        let germany = world.add_country("Germany", Some(Partnership::Axis));
        let uk = world.add_country("United Kingdom", Some(Partnership::Allies));
        let a = world.place(germany, UnitKind::infantry(4), HexCoord::new(0, 0)).unwrap();
        let d = world.place(uk, UnitKind::infantry(2), HexCoord::new(1, 0)).unwrap();
        let bomber = world.place(uk, UnitKind::air("Lancaster", 0, 4, 3), HexCoord::new(0, 0)).unwrap();

        let mut land = Combat::land(&world, vec![a], vec![d]).unwrap();
        assert_eq!(land.combat_hex(), HexCoord::new(1, 0));
        assert_eq!(land.defenders(), &[d]);
        assert_eq!(land.unmodified_attack_strength(&world), 4.0);

        let raid = Combat::strategic_bombing(&world, vec![bomber]).unwrap();
        assert!(raid.defenders().is_empty());
        assert_eq!(raid.combat_hex(), HexCoord::new(0, 0));

        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let result = land.inflict_damages(&mut world, &mut rng).unwrap();
        assert!(result.attacker_losses().is_some());
        assert!(result.damaged_units().is_none());
        assert!(land.is_resolved());
    }

    #[test]
    fn test_bombing_needs_attackers() {
        let world = World::new(MapSheet::parse(". . ."));
        assert!(matches!(Combat::atomic_bombing(&world, vec![]), Err(CombatError::NoAttackers)));
    }
}
