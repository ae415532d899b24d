//! Bombing - strategic, installation and atomic strikes on a hex
//!
//! Bombers have no defenders to fight. The strike either succeeds or not,
//! and flak may damage one of the bombers.

use std::collections::BTreeSet;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::combat::probability::{atomic_surrender_probability, bombing_success_probability};
use crate::combat::result::{BombingResult, CombatResult};
use crate::combat::{common_hex, require_domain};
use crate::core::error::{CombatError, Result};
use crate::core::types::{Domain, UnitId};
use crate::map::HexCoord;
use crate::units::UnitKind;
use crate::world::World;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BombingKind {
    /// Knocks out a resource hex
    Strategic,
    /// Destroys fortifications, airfields and port facilities
    Installation,
    Atomic,
}

#[derive(Debug, Clone)]
pub struct Bombing {
    kind: BombingKind,
    attackers: Vec<UnitId>,
    combat_hex: HexCoord,
    resolved: bool,
}

impl Bombing {
    /// All attackers must be air units over the same hex
    pub fn new(world: &World, kind: BombingKind, attackers: Vec<UnitId>) -> Result<Self> {
        if attackers.is_empty() {
            return Err(CombatError::NoAttackers);
        }
        require_domain(world, &attackers, Domain::Air)?;
        let combat_hex = common_hex(world, &attackers)?;
        Ok(Self {
            kind,
            attackers,
            combat_hex,
            resolved: false,
        })
    }

    pub fn kind(&self) -> BombingKind {
        self.kind
    }

    pub fn attackers(&self) -> &[UnitId] {
        &self.attackers
    }

    pub fn combat_hex(&self) -> HexCoord {
        self.combat_hex
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    fn bomber_strength(&self, world: &World, modified: bool) -> f64 {
        self.attackers
            .iter()
            .filter_map(|id| world.unit(*id).ok())
            .filter_map(|unit| {
                let divisor = if modified { unit.damage_divisor() } else { 1.0 };
                unit.as_air().map(|air| air.bomber_strength as f64 / divisor)
            })
            .sum()
    }

    pub fn modified_attack_strength(&self, world: &World) -> f64 {
        self.bomber_strength(world, true)
    }

    pub fn unmodified_attack_strength(&self, world: &World) -> f64 {
        self.bomber_strength(world, false)
    }

    pub fn success_probability(&self, world: &World) -> f64 {
        match self.kind {
            BombingKind::Atomic => 1.0,
            BombingKind::Strategic | BombingKind::Installation => bombing_success_probability(
                self.modified_attack_strength(world),
                world.rules.bombing_even_odds_strength,
            ),
        }
    }

    /// Probability that flak damages one of the bombers
    pub fn attacker_damage_probability(&self, world: &World) -> f64 {
        match self.kind {
            BombingKind::Atomic => 0.0,
            BombingKind::Strategic | BombingKind::Installation => {
                world.rules.bombing_attacker_damage_probability
            }
        }
    }

    /// Probability that the country owning the hex surrenders after an atomic strike
    ///
    /// Colonies never cause a surrender. Occupation doubles the modifier, and
    /// so does every bomb already dropped on the country.
    pub fn surrender_probability(&self, world: &World) -> f64 {
        let Some(hex) = world.map.get(&self.combat_hex) else {
            return 0.0;
        };
        if hex.is_colony {
            return 0.0;
        }
        let Some(country) = hex.country.and_then(|id| world.country(id)) else {
            return 0.0;
        };

        let occupied = world.map.hexes().any(|other| {
            other.country == Some(country.id)
                && other.city.is_some()
                && !other.is_colony
                && other.controller != Some(country.id)
        });
        let occupied_modifier = if occupied { 2.0 } else { 1.0 };

        atomic_surrender_probability(
            country.surrender_disposition.modifier(),
            occupied_modifier,
            country.atomic_bomb_count,
        )
    }

    /// Units an atomic strike wipes out: land units, based aircraft and ships in port
    pub fn units_to_eliminate(&self, world: &World) -> BTreeSet<UnitId> {
        world
            .units_in_hex(&self.combat_hex)
            .into_iter()
            .filter(|id| {
                world.unit(*id).is_ok_and(|unit| match &unit.kind {
                    UnitKind::Land(_) => true,
                    UnitKind::Air(air) => air.based,
                    UnitKind::Naval(naval) => naval.in_port,
                })
            })
            .collect()
    }

    pub fn inflict_damages<R: Rng + ?Sized>(&mut self, world: &mut World, rng: &mut R) -> Result<CombatResult> {
        if self.resolved {
            return Err(CombatError::AlreadyResolved);
        }
        self.resolved = true;

        let eliminated_units = match self.kind {
            BombingKind::Atomic => Some(self.units_to_eliminate(world)),
            BombingKind::Strategic | BombingKind::Installation => None,
        };

        let success = rng.gen::<f64>() < self.success_probability(world);
        if success {
            self.damage_on_success(world, rng)?;
        }

        let mut damaged_units = BTreeSet::new();
        if rng.gen::<f64>() < self.attacker_damage_probability(world) {
            let damaged = self.attackers[rng.gen_range(0..self.attackers.len())];
            world.damage(damaged)?;
            damaged_units.insert(damaged);
        }

        info!(
            kind = ?self.kind,
            hex = ?self.combat_hex,
            success,
            damaged = damaged_units.len(),
            "bombing resolved"
        );

        Ok(CombatResult::Bombing(BombingResult {
            success,
            damaged_units,
            eliminated_units,
        }))
    }

    fn damage_on_success<R: Rng + ?Sized>(&self, world: &mut World, rng: &mut R) -> Result<()> {
        match self.kind {
            BombingKind::Strategic => {
                world.map.hex_mut(&self.combat_hex)?.resource_hex_destroyed = true;
            }
            BombingKind::Installation => {
                world.destroy_installations(self.combat_hex)?;
            }
            BombingKind::Atomic => self.detonate(world, rng)?,
        }
        Ok(())
    }

    fn detonate<R: Rng + ?Sized>(&self, world: &mut World, rng: &mut R) -> Result<()> {
        world.map.hex_mut(&self.combat_hex)?.destroyed_by_atomic_bomb = true;
        for id in &self.attackers {
            let owner = world.unit(*id)?.owner;
            if let Some(country) = world.country_mut(owner) {
                country.has_used_atomic_bomb_this_turn = true;
            }
        }
        for id in self.units_to_eliminate(world) {
            world.delete(id)?;
        }

        let hex = world.map.hex(&self.combat_hex)?;
        if hex.is_colony {
            return Ok(());
        }
        let Some(target) = hex.country else {
            return Ok(());
        };
        let surrender = self.surrender_probability(world);
        let bomber_owner = world.unit(self.attackers[0])?.owner;
        let draw: f64 = rng.gen();
        debug!(draw, surrender, "atomic surrender roll");
        if let Some(country) = world.country_mut(target) {
            if draw < surrender {
                warn!(country = %country.name, "country surrenders after atomic strike");
                country.surrendered_from_atomic_bomb = Some(bomber_owner);
            }
            country.atomic_bomb_count += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{CountryId, Partnership};
    use crate::map::{Hex, MapSheet, Terrain};
    use crate::units::NavalClass;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const EPSILON: f64 = 1e-9;

    struct Scenario {
        world: World,
        japan: CountryId,
        usa: CountryId,
        hiroshima: HexCoord,
    }

    fn scenario() -> Scenario {
        let mut world = World::new(MapSheet::new());
        let japan = world.add_country("Japan", Some(Partnership::Axis));
        let usa = world.add_country("USA", Some(Partnership::Allies));
        let hiroshima = HexCoord::new(0, 0);
        world
            .map
            .insert(Hex::new(hiroshima, Terrain::Clear).with_country(japan).with_city("Hiroshima"));
        world
            .map
            .insert(Hex::new(HexCoord::new(1, 0), Terrain::Clear).with_country(japan).with_city("Tokyo"));
        world.map.insert(Hex::new(HexCoord::new(0, 1), Terrain::Sea));
        world.map.update_coastal_flags();
        Scenario {
            world,
            japan,
            usa,
            hiroshima,
        }
    }

    fn bomber(world: &mut World, owner: CountryId, hex: HexCoord, strength: u32) -> UnitId {
        world.place(owner, UnitKind::air("B-29", 0, strength, 4), hex).unwrap()
    }

    #[test]
    fn test_conventional_probabilities() {
        let Scenario { mut world, usa, hiroshima, .. } = scenario();
        let a = bomber(&mut world, usa, hiroshima, 3);
        let b = bomber(&mut world, usa, hiroshima, 2);
        let strategic = Bombing::new(&world, BombingKind::Strategic, vec![a, b]).unwrap();

        assert!((strategic.success_probability(&world) - 0.5).abs() < EPSILON);
        assert!((strategic.attacker_damage_probability(&world) - 0.2).abs() < EPSILON);

        world.damage(a).unwrap();
        assert_eq!(strategic.modified_attack_strength(&world), 3.5);
        assert_eq!(strategic.unmodified_attack_strength(&world), 5.0);
    }

    #[test]
    fn test_atomic_probabilities() {
        let Scenario { mut world, usa, hiroshima, .. } = scenario();
        let enola_gay = bomber(&mut world, usa, hiroshima, 1);
        let atomic = Bombing::new(&world, BombingKind::Atomic, vec![enola_gay]).unwrap();

        assert_eq!(atomic.success_probability(&world), 1.0);
        assert_eq!(atomic.attacker_damage_probability(&world), 0.0);
        // Japan halves the base modifier
        assert!((atomic.surrender_probability(&world) - (1.0 - 2f64.powf(-0.5))).abs() < EPSILON);
    }

    #[test]
    fn test_surrender_doubles_when_occupied() {
        let Scenario { mut world, japan, usa, hiroshima } = scenario();
        world.country_mut(japan).unwrap().surrender_disposition = Default::default();
        let enola_gay = bomber(&mut world, usa, hiroshima, 1);
        let atomic = Bombing::new(&world, BombingKind::Atomic, vec![enola_gay]).unwrap();
        assert!((atomic.surrender_probability(&world) - 0.5).abs() < EPSILON);

        world.set_controller(HexCoord::new(1, 0), usa).unwrap();
        assert!((atomic.surrender_probability(&world) - 0.75).abs() < EPSILON);
    }

    #[test]
    fn test_colony_never_surrenders() {
        let Scenario { mut world, usa, hiroshima, .. } = scenario();
        world.map.hex_mut(&hiroshima).unwrap().is_colony = true;
        let enola_gay = bomber(&mut world, usa, hiroshima, 1);
        let atomic = Bombing::new(&world, BombingKind::Atomic, vec![enola_gay]).unwrap();
        assert_eq!(atomic.surrender_probability(&world), 0.0);
    }

    #[test]
    fn test_atomic_strike_effects() {
        let Scenario { mut world, japan, usa, hiroshima } = scenario();
        let garrison = world.place(japan, UnitKind::infantry(4), hiroshima).unwrap();
        let flying = world.place(japan, UnitKind::air("Ki-84", 4, 1, 4), hiroshima).unwrap();
        let ship = world
            .place(japan, UnitKind::naval("Nagato", NavalClass::Battleship, 8, 4, 30), hiroshima)
            .unwrap();
        if let UnitKind::Naval(naval) = &mut world.unit_mut(ship).unwrap().kind {
            naval.in_port = true;
        }
        let enola_gay = bomber(&mut world, usa, hiroshima, 1);
        let mut atomic = Bombing::new(&world, BombingKind::Atomic, vec![enola_gay]).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1945);

        let result = atomic.inflict_damages(&mut world, &mut rng).unwrap();

        assert_eq!(result.success(), Some(true));
        assert!(result.damaged_units().unwrap().is_empty());
        let eliminated = result.eliminated_units().unwrap();
        assert!(eliminated.contains(&garrison));
        assert!(eliminated.contains(&ship));
        assert!(!eliminated.contains(&flying));
        assert!(!world.is_alive(garrison));
        assert!(!world.is_alive(ship));
        assert!(world.is_alive(flying));
        // Deleted, not killed: nothing comes back to the pool
        assert!(world.country(japan).unwrap().available_units.is_empty());

        assert!(world.map.hex(&hiroshima).unwrap().destroyed_by_atomic_bomb);
        assert!(world.country(usa).unwrap().has_used_atomic_bomb_this_turn);
        assert_eq!(world.country(japan).unwrap().atomic_bomb_count, 1);
        let surrendered = world.country(japan).unwrap().surrendered_from_atomic_bomb;
        assert!(surrendered.is_none() || surrendered == Some(usa));
    }

    #[test]
    fn test_installation_bombing_on_success() {
        let Scenario { mut world, usa, hiroshima, .. } = scenario();
        world.map.hex_mut(&hiroshima).unwrap().fortified = true;
        let bombers: Vec<_> = (0..4).map(|_| bomber(&mut world, usa, hiroshima, 10)).collect();
        let mut raid = Bombing::new(&world, BombingKind::Installation, bombers).unwrap();
        // 40 strength points: success is all but certain
        assert!(raid.success_probability(&world) > 0.99);

        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let result = raid.inflict_damages(&mut world, &mut rng).unwrap();
        if result.success() == Some(true) {
            let hex = world.map.hex(&hiroshima).unwrap();
            assert!(!hex.fortified);
            assert!(hex.installations_destroyed);
        }
        assert!(result.eliminated_units().is_none());
    }

    #[test]
    fn test_bombers_must_share_hex() {
        let Scenario { mut world, usa, hiroshima, .. } = scenario();
        let a = bomber(&mut world, usa, hiroshima, 3);
        let b = bomber(&mut world, usa, HexCoord::new(1, 0), 3);
        assert!(matches!(
            Bombing::new(&world, BombingKind::Strategic, vec![a, b]),
            Err(CombatError::InconsistentCombatHex { .. })
        ));
        let infantry = world.place(usa, UnitKind::infantry(2), hiroshima).unwrap();
        assert!(matches!(
            Bombing::new(&world, BombingKind::Strategic, vec![infantry]),
            Err(CombatError::WrongDomain { .. })
        ));
    }
}
