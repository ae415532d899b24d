//! World - the unit arena, hex occupancy and countries
//!
//! Units are stored in a `Vec` indexed by `UnitId` and never removed, so ids
//! stay valid after a unit dies. Occupancy only tracks units placed directly
//! on a hex; embarked units follow their carrier.

pub mod country;
pub mod strength;
pub mod zones;

use ahash::AHashMap;
use tracing::debug;

use crate::core::config::RulesConfig;
use crate::core::error::{CombatError, Result};
use crate::core::types::{CountryId, Domain, Partnership, UnitId};
use crate::map::{HexCoord, MapSheet};
use crate::units::{LandClass, Location, NavalClass, Unit, UnitKind};

pub use country::{Country, SurrenderDisposition};
pub use zones::ZoneKind;

/// The game state the combat engine reads and mutates
pub struct World {
    pub map: MapSheet,
    pub rules: RulesConfig,
    countries: Vec<Country>,
    units: Vec<Unit>,
    occupants: AHashMap<HexCoord, Vec<UnitId>>,
}

impl World {
    pub fn new(map: MapSheet) -> Self {
        Self::with_rules(map, RulesConfig::default())
    }

    pub fn with_rules(map: MapSheet, rules: RulesConfig) -> Self {
        Self {
            map,
            rules,
            countries: Vec::new(),
            units: Vec::new(),
            occupants: AHashMap::new(),
        }
    }

    // === COUNTRIES ===

    pub fn add_country(&mut self, name: &str, partnership: Option<Partnership>) -> CountryId {
        let id = CountryId::new(self.countries.len() as u32);
        self.countries.push(Country::new(id, name, partnership));
        id
    }

    pub fn country(&self, id: CountryId) -> Option<&Country> {
        self.countries.get(id.index())
    }

    pub fn country_mut(&mut self, id: CountryId) -> Option<&mut Country> {
        self.countries.get_mut(id.index())
    }

    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    pub fn partnership_of(&self, country: CountryId) -> Option<Partnership> {
        self.country(country).and_then(|c| c.partnership)
    }

    // === UNITS ===

    pub fn unit(&self, id: UnitId) -> Result<&Unit> {
        self.units.get(id.index()).ok_or(CombatError::UnitNotFound(id))
    }

    pub fn unit_mut(&mut self, id: UnitId) -> Result<&mut Unit> {
        self.units.get_mut(id.index()).ok_or(CombatError::UnitNotFound(id))
    }

    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.iter()
    }

    fn push_unit(&mut self, owner: CountryId, kind: UnitKind, location: Location) -> UnitId {
        let id = UnitId::new(self.units.len() as u32);
        self.units.push(Unit::new(id, owner, kind, location));
        id
    }

    /// Put a new unit on the map
    pub fn place(&mut self, owner: CountryId, kind: UnitKind, coord: HexCoord) -> Result<UnitId> {
        if !self.map.contains(&coord) {
            return Err(CombatError::HexNotFound(coord));
        }
        let id = self.push_unit(owner, kind, Location::Hex(coord));
        self.occupants.entry(coord).or_default().push(id);
        Ok(id)
    }

    /// Put a new unit in the owner's pool of available units
    pub fn add_available(&mut self, owner: CountryId, kind: UnitKind) -> UnitId {
        let id = self.push_unit(owner, kind, Location::Available);
        if let Some(country) = self.country_mut(owner) {
            country.available_units.push(id);
        }
        id
    }

    /// The hex a unit is on, following embarkation to the carrier
    pub fn hex_of(&self, id: UnitId) -> Option<HexCoord> {
        let mut current = id;
        // Bounded walk, a carrier chain can never be longer than the arena
        for _ in 0..=self.units.len() {
            match self.units.get(current.index())?.location {
                Location::Hex(coord) => return Some(coord),
                Location::Embarked(carrier) => current = carrier,
                Location::Available | Location::Removed => return None,
            }
        }
        None
    }

    /// Alive means on the map, directly or embarked
    pub fn is_alive(&self, id: UnitId) -> bool {
        self.hex_of(id).is_some()
    }

    pub fn unit_partnership(&self, id: UnitId) -> Option<Partnership> {
        self.units
            .get(id.index())
            .and_then(|unit| self.partnership_of(unit.owner))
    }

    /// Units placed directly on a hex, embarked units excluded
    pub fn units_in_hex(&self, coord: &HexCoord) -> Vec<UnitId> {
        self.occupants.get(coord).cloned().unwrap_or_default()
    }

    /// Units of one domain placed directly on a hex
    pub fn units_in_hex_of_domain(&self, coord: &HexCoord, domain: Domain) -> Vec<UnitId> {
        self.units_in_hex(coord)
            .into_iter()
            .filter(|id| self.units[id.index()].domain() == domain)
            .collect()
    }

    pub fn land_units_in(&self, coord: &HexCoord) -> Vec<UnitId> {
        self.units_in_hex_of_domain(coord, Domain::Land)
    }

    pub fn air_units_in(&self, coord: &HexCoord) -> Vec<UnitId> {
        self.units_in_hex_of_domain(coord, Domain::Air)
    }

    pub fn naval_units_in(&self, coord: &HexCoord) -> Vec<UnitId> {
        self.units_in_hex_of_domain(coord, Domain::Naval)
    }

    pub fn embarked_units(&self, carrier: UnitId) -> Vec<UnitId> {
        self.units
            .iter()
            .filter(|unit| unit.location == Location::Embarked(carrier))
            .map(|unit| unit.id)
            .collect()
    }

    // === HEXES ===

    /// Partnership of the hex's controller, `None` when uncontrolled or neutral
    pub fn controlling_partnership(&self, coord: &HexCoord) -> Option<Partnership> {
        self.map
            .get(coord)
            .and_then(|hex| hex.controller)
            .and_then(|controller| self.partnership_of(controller))
    }

    /// Controlled by a country outside both partnerships
    pub fn is_neutral_controlled(&self, coord: &HexCoord) -> bool {
        self.map
            .get(coord)
            .and_then(|hex| hex.controller)
            .is_some_and(|controller| self.partnership_of(controller).is_none())
    }

    pub fn set_controller(&mut self, coord: HexCoord, country: CountryId) -> Result<()> {
        self.map.hex_mut(&coord)?.controller = Some(country);
        Ok(())
    }

    /// Destroy a hex's installations; air units based there are grounded
    pub fn destroy_installations(&mut self, coord: HexCoord) -> Result<()> {
        self.map.hex_mut(&coord)?.destroy_installations();
        for id in self.air_units_in(&coord) {
            if let UnitKind::Air(air) = &mut self.units[id.index()].kind {
                air.based = false;
            }
        }
        Ok(())
    }

    // === LIFECYCLE ===

    fn detach(&mut self, id: UnitId) {
        if let Some(Location::Hex(coord)) = self.units.get(id.index()).map(|unit| unit.location) {
            if let Some(list) = self.occupants.get_mut(&coord) {
                list.retain(|other| *other != id);
            }
        }
    }

    /// Move a unit onto a hex, disembarking it if needed
    pub fn set_hex(&mut self, id: UnitId, coord: HexCoord) -> Result<()> {
        self.unit(id)?;
        if !self.map.contains(&coord) {
            return Err(CombatError::HexNotFound(coord));
        }
        self.detach(id);
        self.units[id.index()].location = Location::Hex(coord);
        self.occupants.entry(coord).or_default().push(id);
        Ok(())
    }

    pub fn embark(&mut self, id: UnitId, carrier: UnitId) -> Result<()> {
        self.unit(id)?;
        if !self.is_alive(carrier) {
            return Err(CombatError::UnitNotAlive(carrier));
        }
        self.detach(id);
        self.units[id.index()].location = Location::Embarked(carrier);
        Ok(())
    }

    /// Take a unit off the map for good, along with everything it carries
    pub fn delete(&mut self, id: UnitId) -> Result<()> {
        self.unit(id)?;
        let cargo = self.embarked_units(id);
        self.detach(id);
        let unit = &mut self.units[id.index()];
        unit.location = Location::Removed;
        match &mut unit.kind {
            UnitKind::Air(air) => air.damaged = false,
            UnitKind::Naval(naval) => naval.damaged = false,
            UnitKind::Land(_) => {}
        }
        for embarked in cargo {
            self.delete(embarked)?;
        }
        Ok(())
    }

    fn return_to_pool(&mut self, id: UnitId) {
        let unit = &mut self.units[id.index()];
        unit.location = Location::Available;
        let owner = unit.owner;
        if let Some(country) = self.country_mut(owner) {
            country.available_units.push(id);
        }
    }

    /// Eliminate a unit, returning whatever can be salvaged to its owner
    ///
    /// Land units come back as strength-1 fragments, supply units come back
    /// whole, based aircraft and ships in port (and all convoys and
    /// transports) return to the pool repaired. A sunk carrier's aircraft
    /// return to the pool; a sunk transport's cargo dies with it.
    pub fn die(&mut self, id: UnitId) -> Result<()> {
        let kind = self.unit(id)?.kind.clone();
        debug!(unit = %id, "unit eliminated");
        match kind {
            UnitKind::Land(land) if land.class == LandClass::Supply => {
                self.delete(id)?;
                self.return_to_pool(id);
            }
            UnitKind::Land(land) => {
                let fragments = land.strength;
                for _ in 0..fragments {
                    self.clone_fragment(id)?;
                }
                self.delete(id)?;
            }
            UnitKind::Air(air) => {
                let based = air.based;
                for embarked in self.embarked_units(id) {
                    self.die(embarked)?;
                }
                self.delete(id)?;
                if based {
                    self.return_to_pool(id);
                }
            }
            UnitKind::Naval(naval) if naval.class == NavalClass::Carrier => {
                // Aircraft on board fly off to the pool
                for embarked in self.embarked_units(id) {
                    self.delete(embarked)?;
                    self.return_to_pool(embarked);
                }
                self.delete(id)?;
                if naval.in_port {
                    self.return_to_pool(id);
                }
            }
            UnitKind::Naval(naval) if naval.class == NavalClass::TransportShip => {
                for embarked in self.embarked_units(id) {
                    self.die(embarked)?;
                }
                self.delete(id)?;
                self.return_to_pool(id);
            }
            UnitKind::Naval(naval) => {
                let salvaged = naval.in_port || naval.class == NavalClass::Convoy;
                self.delete(id)?;
                if salvaged {
                    self.return_to_pool(id);
                }
            }
        }
        Ok(())
    }

    /// Damage an air or naval unit. Returns true when the hit eliminated it.
    pub fn damage(&mut self, id: UnitId) -> Result<bool> {
        if !self.unit(id)?.can_take_damage() {
            self.die(id)?;
            return Ok(true);
        }
        match &mut self.units[id.index()].kind {
            UnitKind::Air(air) => air.damaged = true,
            UnitKind::Naval(naval) => naval.damaged = true,
            UnitKind::Land(_) => {}
        }
        Ok(false)
    }

    pub fn repair(&mut self, id: UnitId) -> Result<()> {
        match &mut self.unit_mut(id)?.kind {
            UnitKind::Air(air) => air.damaged = false,
            UnitKind::Naval(naval) => naval.damaged = false,
            UnitKind::Land(_) => {}
        }
        Ok(())
    }

    /// Strength-1 copy of a land unit added to the owner's available pool
    pub fn clone_fragment(&mut self, id: UnitId) -> Result<UnitId> {
        let unit = self.unit(id)?;
        let owner = unit.owner;
        let kind = unit.fragment_kind().ok_or(CombatError::WrongDomain {
            unit: id,
            expected: Domain::Land,
        })?;
        Ok(self.add_available(owner, kind))
    }

    pub fn set_strength(&mut self, id: UnitId, strength: u32) -> Result<()> {
        match &mut self.unit_mut(id)?.kind {
            UnitKind::Land(land) => {
                if strength > land.max_strength {
                    return Err(CombatError::InvalidStrength {
                        unit: id,
                        strength,
                        max: land.max_strength,
                    });
                }
                land.strength = strength;
                Ok(())
            }
            _ => Err(CombatError::WrongDomain {
                unit: id,
                expected: Domain::Land,
            }),
        }
    }
}
