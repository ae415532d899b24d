//! Control zones and stacking limits

use serde::{Deserialize, Serialize};

use crate::core::types::{Partnership, UnitId};
use crate::map::HexCoord;
use crate::units::UnitKind;
use crate::world::World;

/// Which kind of control zone a query is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoneKind {
    Land,
    /// Submarines are only held back by ships that can hunt them
    Naval { against_submarines: bool },
}

impl World {
    pub fn is_in_control_zone(&self, coord: &HexCoord, partnership: Partnership, kind: ZoneKind) -> bool {
        match kind {
            ZoneKind::Land => self.is_in_land_control_zone(coord, partnership),
            ZoneKind::Naval { against_submarines } => {
                self.is_in_naval_control_zone(coord, partnership, against_submarines)
            }
        }
    }

    /// Non-supply land units project a control zone into their own hex and
    /// into adjacent land hexes, except fortified hexes held by the other side
    pub fn is_in_land_control_zone(&self, coord: &HexCoord, partnership: Partnership) -> bool {
        let Some(hex) = self.map.get(coord) else {
            return false;
        };
        if hex.fortified && self.controlling_partnership(coord) != Some(partnership) {
            return false;
        }

        self.has_combat_land_units(coord, partnership)
            || self.map.adjacent_land_hexes(coord).iter().any(|neighbor| {
                self.controlling_partnership(neighbor) == Some(partnership)
                    && self.has_combat_land_units(neighbor, partnership)
            })
    }

    fn has_combat_land_units(&self, coord: &HexCoord, partnership: Partnership) -> bool {
        self.land_units_in(coord).into_iter().any(|id| {
            self.unit(id).is_ok_and(|unit| !unit.is_supply())
                && self.unit_partnership(id) == Some(partnership)
        })
    }

    /// Armed ships control their hex and every hex a ship could sail to from it
    pub fn is_in_naval_control_zone(
        &self,
        coord: &HexCoord,
        partnership: Partnership,
        against_submarines: bool,
    ) -> bool {
        self.has_armed_ships(coord, partnership, against_submarines)
            || self
                .map
                .adjacent_sea_hexes(coord)
                .iter()
                .any(|neighbor| self.has_armed_ships(neighbor, partnership, against_submarines))
    }

    fn has_armed_ships(&self, coord: &HexCoord, partnership: Partnership, against_submarines: bool) -> bool {
        self.naval_units_in(coord).into_iter().any(|id| {
            let armed = self.unit(id).ok().and_then(|unit| unit.as_naval()).is_some_and(|naval| {
                if against_submarines {
                    naval.submarine_attack > 0
                } else {
                    naval.attack > 0
                }
            });
            armed && self.unit_partnership(id) == Some(partnership)
        })
    }

    /// Whether `id` may join `others` in `coord`
    ///
    /// `others` are the units that will share the hex: usually its current
    /// occupants, plus units already planned to move there. The unit itself
    /// is ignored if it appears in the list.
    pub fn can_enter_within_stacking_limits(&self, id: UnitId, coord: &HexCoord, others: &[UnitId]) -> bool {
        let Ok(unit) = self.unit(id) else {
            return false;
        };
        let others: Vec<_> = others
            .iter()
            .filter(|other| **other != id)
            .filter_map(|other| self.unit(*other).ok())
            .collect();
        let rules = &self.rules;

        match &unit.kind {
            UnitKind::Land(_) => {
                let land: Vec<_> = others.iter().filter(|other| other.is_land()).collect();
                let paratrooper = usize::from(land.iter().any(|other| other.is_paratrooper()));
                if unit.is_supply() {
                    land.len().saturating_sub(paratrooper) < rules.supply_stacking_limit
                } else {
                    let supply = usize::from(land.iter().any(|other| other.is_supply()));
                    land.len().saturating_sub(supply + paratrooper) < rules.land_stacking_limit
                }
            }
            UnitKind::Naval(_) => {
                others.iter().filter(|other| other.is_naval()).count() < rules.naval_stacking_limit
            }
            UnitKind::Air(_) => {
                let capacity = self.map.get(coord).map_or(0, |hex| hex.airbase_capacity());
                // Aircraft flying over the hex do not use its airbase. Planned
                // arrivals and shot-down aircraft in the list still hold a slot.
                let based = others
                    .iter()
                    .filter(|other| {
                        other.as_air().is_some_and(|air| air.based)
                            || (other.is_air() && !self.is_alive(other.id))
                            || (other.is_air() && self.hex_of(other.id) != Some(*coord))
                    })
                    .count();
                based < capacity
            }
        }
    }
}
