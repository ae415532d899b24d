//! Units - land, air and naval units as the combat engine sees them

use serde::{Deserialize, Serialize};

use crate::core::types::{CountryId, Domain, UnitId};
use crate::map::HexCoord;

/// Land unit classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LandClass {
    Infantry,
    Armor,
    Marine,
    Paratrooper,
    /// Zero-strength unit that extends supply lines. Cannot hold ground alone.
    Supply,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandUnit {
    pub class: LandClass,
    pub strength: u32,
    pub max_strength: u32,
    pub movement_allowance: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirUnit {
    pub model: String,
    pub fighter_strength: u32,
    pub bomber_strength: u32,
    /// Strength before tripling for kamikaze-only aircraft, zero for everything else
    pub kamikaze_base_strength: u32,
    pub defense: u32,
    pub damaged: bool,
    /// Based at an airfield or on a carrier, as opposed to flying a mission
    pub based: bool,
    /// Eliminated instead of damaged (jets, rocket planes)
    pub fragile: bool,
}

/// Naval unit classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NavalClass {
    Battleship,
    Battlecruiser,
    HeavyCruiser,
    LightCruiser,
    Destroyer,
    DestroyerEscort,
    Carrier,
    Submarine,
    TransportShip,
    Convoy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavalUnit {
    pub name: String,
    pub class: NavalClass,
    pub attack: u32,
    pub submarine_attack: u32,
    pub defense: u32,
    pub damaged: bool,
    pub in_port: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum UnitKind {
    Land(LandUnit),
    Air(AirUnit),
    Naval(NavalUnit),
}

impl UnitKind {
    /// A land unit at the given strength. Supply units are always strength 0.
    pub fn land(class: LandClass, strength: u32) -> Self {
        let (strength, max_strength) = match class {
            LandClass::Supply => (0, 0),
            LandClass::Paratrooper => (strength.min(1), 1),
            _ => (strength, strength.max(5)),
        };
        UnitKind::Land(LandUnit {
            class,
            strength,
            max_strength,
            movement_allowance: 3,
        })
    }

    pub fn infantry(strength: u32) -> Self {
        Self::land(LandClass::Infantry, strength)
    }

    pub fn armor(strength: u32) -> Self {
        Self::land(LandClass::Armor, strength)
    }

    pub fn supply() -> Self {
        Self::land(LandClass::Supply, 0)
    }

    pub fn air(model: &str, fighter_strength: u32, bomber_strength: u32, defense: u32) -> Self {
        UnitKind::Air(AirUnit {
            model: model.to_string(),
            fighter_strength,
            bomber_strength,
            kamikaze_base_strength: 0,
            defense,
            damaged: false,
            based: false,
            fragile: false,
        })
    }

    pub fn naval(name: &str, class: NavalClass, attack: u32, submarine_attack: u32, defense: u32) -> Self {
        UnitKind::Naval(NavalUnit {
            name: name.to_string(),
            class,
            attack,
            submarine_attack,
            defense,
            damaged: false,
            in_port: false,
        })
    }
}

/// Where a unit currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Location {
    Hex(HexCoord),
    /// Carried by another unit; its hex is the carrier's hex
    Embarked(UnitId),
    /// In the owner's pool of units that can be placed again
    Available,
    /// Gone for good
    Removed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub owner: CountryId,
    pub kind: UnitKind,
    pub location: Location,
    pub has_attacked: bool,
    /// Maintained by the supply-line pathfinder
    pub out_of_supply: bool,
}

impl Unit {
    pub fn new(id: UnitId, owner: CountryId, kind: UnitKind, location: Location) -> Self {
        Self {
            id,
            owner,
            kind,
            location,
            has_attacked: false,
            out_of_supply: false,
        }
    }

    pub fn domain(&self) -> Domain {
        match self.kind {
            UnitKind::Land(_) => Domain::Land,
            UnitKind::Air(_) => Domain::Air,
            UnitKind::Naval(_) => Domain::Naval,
        }
    }

    pub fn as_land(&self) -> Option<&LandUnit> {
        match &self.kind {
            UnitKind::Land(land) => Some(land),
            _ => None,
        }
    }

    pub fn as_air(&self) -> Option<&AirUnit> {
        match &self.kind {
            UnitKind::Air(air) => Some(air),
            _ => None,
        }
    }

    pub fn as_naval(&self) -> Option<&NavalUnit> {
        match &self.kind {
            UnitKind::Naval(naval) => Some(naval),
            _ => None,
        }
    }

    pub fn is_land(&self) -> bool {
        matches!(self.kind, UnitKind::Land(_))
    }

    pub fn is_air(&self) -> bool {
        matches!(self.kind, UnitKind::Air(_))
    }

    pub fn is_naval(&self) -> bool {
        matches!(self.kind, UnitKind::Naval(_))
    }

    pub fn land_class(&self) -> Option<LandClass> {
        self.as_land().map(|land| land.class)
    }

    pub fn is_supply(&self) -> bool {
        self.land_class() == Some(LandClass::Supply)
    }

    pub fn is_paratrooper(&self) -> bool {
        self.land_class() == Some(LandClass::Paratrooper)
    }

    pub fn is_marine(&self) -> bool {
        self.land_class() == Some(LandClass::Marine)
    }

    pub fn is_submarine(&self) -> bool {
        self.as_naval().is_some_and(|naval| naval.class == NavalClass::Submarine)
    }

    /// Land strength; zero for air and naval units
    pub fn strength(&self) -> u32 {
        self.as_land().map_or(0, |land| land.strength)
    }

    /// Air and naval defense strength; land units defend with their strength
    pub fn defense(&self) -> u32 {
        match &self.kind {
            UnitKind::Land(land) => land.strength,
            UnitKind::Air(air) => air.defense,
            UnitKind::Naval(naval) => naval.defense,
        }
    }

    pub fn damaged(&self) -> bool {
        match &self.kind {
            UnitKind::Land(_) => false,
            UnitKind::Air(air) => air.damaged,
            UnitKind::Naval(naval) => naval.damaged,
        }
    }

    /// Whether damage leaves the unit damaged rather than eliminating it
    pub fn can_take_damage(&self) -> bool {
        match &self.kind {
            UnitKind::Land(_) => false,
            UnitKind::Air(air) => !air.damaged && !air.fragile,
            UnitKind::Naval(naval) => !naval.damaged && naval.class != NavalClass::Convoy,
        }
    }

    /// Damaged units fight at half strength
    pub fn damage_divisor(&self) -> f64 {
        if self.damaged() {
            2.0
        } else {
            1.0
        }
    }

    /// Attack strength against land units before terrain is taken into account
    pub fn modified_land_attack(&self) -> f64 {
        match &self.kind {
            UnitKind::Land(land) => land.strength as f64,
            UnitKind::Air(air) => air.bomber_strength as f64 / self.damage_divisor(),
            UnitKind::Naval(naval) => {
                naval.attack as f64 / if naval.damaged { 10.0 } else { 5.0 }
            }
        }
    }

    /// Strength-1 copy of a land unit, used for fragments returned to the pool
    pub fn fragment_kind(&self) -> Option<UnitKind> {
        self.as_land().map(|land| {
            let strength = if land.class == LandClass::Supply { 0 } else { 1 };
            UnitKind::Land(LandUnit {
                strength,
                ..land.clone()
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(kind: UnitKind) -> Unit {
        Unit::new(UnitId(0), CountryId(0), kind, Location::Available)
    }

    #[test]
    fn test_supply_unit_has_zero_strength() {
        let supply = unit(UnitKind::supply());
        assert!(supply.is_supply());
        assert_eq!(supply.strength(), 0);
        assert_eq!(supply.as_land().unwrap().max_strength, 0);
    }

    #[test]
    fn test_convoy_and_fragile_air_cannot_take_damage() {
        let convoy = unit(UnitKind::naval("Convoy", NavalClass::Convoy, 0, 0, 1));
        assert!(!convoy.can_take_damage());

        let mut jet = unit(UnitKind::air("ME-262", 5, 0, 5));
        assert!(jet.can_take_damage());
        if let UnitKind::Air(air) = &mut jet.kind {
            air.fragile = true;
        }
        assert!(!jet.can_take_damage());
    }

    #[test]
    fn test_damaged_unit_cannot_take_more_damage() {
        let mut ship = unit(UnitKind::naval("Rodney", NavalClass::Battleship, 8, 7, 33));
        assert!(ship.can_take_damage());
        if let UnitKind::Naval(naval) = &mut ship.kind {
            naval.damaged = true;
        }
        assert!(!ship.can_take_damage());
        assert_eq!(ship.damage_divisor(), 2.0);
    }

    #[test]
    fn test_naval_land_attack_is_fraction_of_attack() {
        let mut ship = unit(UnitKind::naval("Nevada", NavalClass::Battleship, 10, 5, 29));
        assert_eq!(ship.modified_land_attack(), 2.0);
        if let UnitKind::Naval(naval) = &mut ship.kind {
            naval.damaged = true;
        }
        assert_eq!(ship.modified_land_attack(), 1.0);
    }

    #[test]
    fn test_fragment_keeps_type() {
        let armor = unit(UnitKind::armor(4));
        let fragment = armor.fragment_kind().unwrap();
        match fragment {
            UnitKind::Land(land) => {
                assert_eq!(land.class, LandClass::Armor);
                assert_eq!(land.strength, 1);
                assert_eq!(land.max_strength, 5);
            }
            _ => panic!("fragment of a land unit must be a land unit"),
        }
        let ship = unit(UnitKind::naval("Nevada", NavalClass::Battleship, 4, 5, 29));
        assert!(ship.fragment_kind().is_none());
    }
}
