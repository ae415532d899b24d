//! Modified strengths - unit strengths after terrain, weather and supply

use crate::core::types::UnitId;
use crate::world::World;

impl World {
    /// Land defense strength of a unit where it stands
    ///
    /// Terrain, fortification and mud multiply the strength; being out of
    /// supply halves it.
    pub fn modified_land_defense(&self, id: UnitId) -> f64 {
        let Ok(unit) = self.unit(id) else {
            return 0.0;
        };
        let multiplier = self
            .hex_of(id)
            .and_then(|coord| self.map.get(&coord))
            .map_or(1.0, |hex| hex.land_defense_multiplier());
        let supply = if unit.out_of_supply { 0.5 } else { 1.0 };
        unit.strength() as f64 * multiplier * supply
    }

    /// Contribution of a unit to an attack on land units
    pub fn modified_land_attack(&self, id: UnitId) -> f64 {
        self.unit(id).map_or(0.0, |unit| unit.modified_land_attack())
    }
}

#[cfg(test)]
mod tests {
    use crate::core::types::Partnership;
    use crate::map::{HexCoord, MapSheet, WeatherCondition};
    use crate::units::UnitKind;
    use crate::world::World;

    #[test]
    fn test_forest_and_fortification_multiply() {
        let mut world = World::new(MapSheet::parse(". f ."));
        let germany = world.add_country("Germany", Some(Partnership::Axis));
        let forest = HexCoord::new(1, 0);
        let id = world.place(germany, UnitKind::infantry(2), forest).unwrap();

        assert_eq!(world.modified_land_defense(id), 3.0);
        world.map.hex_mut(&forest).unwrap().fortified = true;
        assert_eq!(world.modified_land_defense(id), 6.0);
        world.map.hex_mut(&forest).unwrap().weather = WeatherCondition::Spring;
        assert_eq!(world.modified_land_defense(id), 12.0);
    }

    #[test]
    fn test_out_of_supply_halves_defense() {
        let mut world = World::new(MapSheet::parse(". . ."));
        let germany = world.add_country("Germany", Some(Partnership::Axis));
        let id = world.place(germany, UnitKind::infantry(3), HexCoord::new(0, 0)).unwrap();
        world.unit_mut(id).unwrap().out_of_supply = true;
        assert_eq!(world.modified_land_defense(id), 1.5);
        assert_eq!(world.modified_land_attack(id), 3.0);
    }
}
