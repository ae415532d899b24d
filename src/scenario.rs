//! Ready-made land battles for the command line and benchmarks

use serde::{Deserialize, Serialize};

use crate::combat::LandCombat;
use crate::core::config::RulesConfig;
use crate::core::error::Result;
use crate::core::types::{CountryId, Partnership, UnitId};
use crate::map::{Hex, HexCoord, MapSheet, Terrain};
use crate::units::UnitKind;
use crate::world::World;

/// Largest strength of a single generated unit
const UNIT_STRENGTH: u32 = 5;

/// A single attack across one hexside onto a defended hex
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandScenario {
    pub attack: u32,
    pub defense: u32,
    pub terrain: Terrain,
    pub fortified: bool,
    pub willing_to_retreat: bool,
}

impl Default for LandScenario {
    fn default() -> Self {
        Self {
            attack: 6,
            defense: 3,
            terrain: Terrain::Clear,
            fortified: false,
            willing_to_retreat: true,
        }
    }
}

/// The defended hex, in the middle of a 5x5 land map
pub const DEFENDED_HEX: HexCoord = HexCoord { q: 2, r: 2 };

/// The hex the attack comes from
pub const STAGING_HEX: HexCoord = HexCoord { q: 1, r: 2 };

pub struct BuiltScenario {
    pub world: World,
    pub combat: LandCombat,
    pub attacker: CountryId,
    pub defender: CountryId,
    pub defenders: Vec<UnitId>,
}

/// Strength split into infantry units no larger than `UNIT_STRENGTH`
fn split_strength(total: u32) -> Vec<u32> {
    let mut remaining = total;
    let mut parts = Vec::new();
    while remaining > 0 {
        let part = remaining.min(UNIT_STRENGTH);
        parts.push(part);
        remaining -= part;
    }
    parts
}

impl LandScenario {
    pub fn build(&self, rules: RulesConfig) -> Result<BuiltScenario> {
        let mut map = MapSheet::new();
        for r in 0..5 {
            for q in 0..5 {
                map.insert(Hex::new(HexCoord::new(q, r), Terrain::Clear));
            }
        }
        let mut world = World::with_rules(map, rules);
        let attacker = world.add_country("Germany", Some(Partnership::Axis));
        let defender = world.add_country("Soviet Union", Some(Partnership::Allies));

        let hex = world.map.hex_mut(&DEFENDED_HEX)?;
        hex.terrain = self.terrain;
        hex.fortified = self.fortified;
        world.set_controller(DEFENDED_HEX, defender)?;
        world.set_controller(STAGING_HEX, attacker)?;

        let mut attackers = Vec::new();
        for strength in split_strength(self.attack) {
            attackers.push(world.place(attacker, UnitKind::infantry(strength), STAGING_HEX)?);
        }
        let mut defenders = Vec::new();
        for strength in split_strength(self.defense) {
            defenders.push(world.place(defender, UnitKind::infantry(strength), DEFENDED_HEX)?);
        }

        let mut combat = LandCombat::new(&world, attackers, defenders.clone())?;
        combat.willing_to_retreat = self.willing_to_retreat;

        Ok(BuiltScenario {
            world,
            combat,
            attacker,
            defender,
            defenders,
        })
    }
}
