//! Map sheet - the hex grid the combat engine consults for topology

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use super::hex::{Hex, HexCoord, Terrain};
use crate::core::error::{CombatError, Result};

/// The map sheet containing all hex tiles
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MapSheet {
    hexes: AHashMap<HexCoord, Hex>,
}

impl MapSheet {
    /// Create a new empty map sheet
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map from rows of terrain characters
    ///
    /// Row index is `r`, column index is `q`. `~` is sea, `.` clear, `f` forest,
    /// `m` mountain, `M` tall mountain and spaces are skipped.
    /// Coastal flags are derived once all hexes are placed.
    pub fn parse(layout: &str) -> Self {
        let mut map = Self::new();
        for (r, line) in layout.lines().enumerate() {
            for (q, c) in line.chars().filter(|c| !c.is_whitespace()).enumerate() {
                let terrain = match c {
                    '~' => Terrain::Sea,
                    'f' => Terrain::Forest,
                    'm' => Terrain::Mountain,
                    'M' => Terrain::TallMountain,
                    _ => Terrain::Clear,
                };
                map.insert(Hex::new(HexCoord::new(q as i32, r as i32), terrain));
            }
        }
        map.update_coastal_flags();
        map
    }

    pub fn insert(&mut self, hex: Hex) {
        self.hexes.insert(hex.coord, hex);
    }

    /// Recompute which land hexes border the sea
    pub fn update_coastal_flags(&mut self) {
        let coastal: Vec<HexCoord> = self
            .hexes
            .values()
            .filter(|hex| !hex.is_sea())
            .filter(|hex| {
                hex.coord
                    .neighbors()
                    .iter()
                    .any(|n| self.hexes.get(n).is_some_and(|h| h.is_sea()))
            })
            .map(|hex| hex.coord)
            .collect();
        for hex in self.hexes.values_mut() {
            hex.coastal = false;
        }
        for coord in coastal {
            if let Some(hex) = self.hexes.get_mut(&coord) {
                hex.coastal = true;
            }
        }
    }

    pub fn get(&self, coord: &HexCoord) -> Option<&Hex> {
        self.hexes.get(coord)
    }

    pub fn get_mut(&mut self, coord: &HexCoord) -> Option<&mut Hex> {
        self.hexes.get_mut(coord)
    }

    /// Like `get`, but a missing hex is an error
    pub fn hex(&self, coord: &HexCoord) -> Result<&Hex> {
        self.hexes.get(coord).ok_or(CombatError::HexNotFound(*coord))
    }

    pub fn hex_mut(&mut self, coord: &HexCoord) -> Result<&mut Hex> {
        self.hexes.get_mut(coord).ok_or(CombatError::HexNotFound(*coord))
    }

    pub fn contains(&self, coord: &HexCoord) -> bool {
        self.hexes.contains_key(coord)
    }

    pub fn len(&self) -> usize {
        self.hexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hexes.is_empty()
    }

    pub fn hexes(&self) -> impl Iterator<Item = &Hex> {
        self.hexes.values()
    }

    /// Neighbours present on the map, in a fixed direction order
    pub fn adjacent_hexes(&self, coord: &HexCoord) -> Vec<HexCoord> {
        coord
            .neighbors()
            .into_iter()
            .filter(|n| self.contains(n))
            .collect()
    }

    /// Neighbours a land unit can step to
    pub fn adjacent_land_hexes(&self, coord: &HexCoord) -> Vec<HexCoord> {
        if self.get(coord).map_or(true, |hex| hex.is_sea()) {
            return Vec::new();
        }
        coord
            .neighbors()
            .into_iter()
            .filter(|n| self.get(n).is_some_and(|hex| !hex.is_sea()))
            .collect()
    }

    /// Neighbours a ship can sail to
    ///
    /// Both hexes must be navigable and at least one of them open sea, so
    /// two neighbouring ports are not connected by sea.
    pub fn adjacent_sea_hexes(&self, coord: &HexCoord) -> Vec<HexCoord> {
        let Some(origin) = self.get(coord) else {
            return Vec::new();
        };
        if !origin.is_navigable() {
            return Vec::new();
        }
        coord
            .neighbors()
            .into_iter()
            .filter(|n| {
                self.get(n)
                    .is_some_and(|hex| hex.is_navigable() && (hex.is_sea() || origin.is_sea()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAYOUT: &str = "
        ~ ~ ~
        . . ~
        . f .
    ";

    #[test]
    fn test_parse_layout() {
        let map = MapSheet::parse(LAYOUT);
        assert_eq!(map.len(), 9);
        assert!(map.get(&HexCoord::new(0, 0)).unwrap().is_sea());
        assert_eq!(map.get(&HexCoord::new(1, 2)).unwrap().terrain, Terrain::Forest);
    }

    #[test]
    fn test_coastal_flags() {
        let map = MapSheet::parse(LAYOUT);
        assert!(map.get(&HexCoord::new(0, 1)).unwrap().coastal);
        assert!(map.get(&HexCoord::new(2, 2)).unwrap().coastal);
        // (0, 2) only touches land
        assert!(!map.get(&HexCoord::new(0, 2)).unwrap().coastal);
    }

    #[test]
    fn test_land_adjacency_excludes_sea() {
        let map = MapSheet::parse(LAYOUT);
        let adjacent = map.adjacent_land_hexes(&HexCoord::new(1, 1));
        assert!(adjacent.iter().all(|c| !map.get(c).unwrap().is_sea()));
        assert!(adjacent.contains(&HexCoord::new(0, 1)));
        assert!(adjacent.contains(&HexCoord::new(1, 2)));
        assert!(map.adjacent_land_hexes(&HexCoord::new(0, 0)).is_empty());
    }

    #[test]
    fn test_sea_adjacency_needs_open_sea() {
        let map = MapSheet::parse(LAYOUT);
        // Coastal (0, 1) reaches the sea at (0, 0) and (1, 0)
        let from_coast = map.adjacent_sea_hexes(&HexCoord::new(0, 1));
        assert!(from_coast.contains(&HexCoord::new(0, 0)));
        assert!(from_coast.contains(&HexCoord::new(1, 0)));
        // but not the neighbouring coastal hex (1, 1)
        assert!(!from_coast.contains(&HexCoord::new(1, 1)));
        // Inland hexes have no sea neighbours
        assert!(map.adjacent_sea_hexes(&HexCoord::new(0, 2)).is_empty());
    }

    #[test]
    fn test_missing_hex_is_error() {
        let map = MapSheet::parse(LAYOUT);
        assert!(matches!(
            map.hex(&HexCoord::new(9, 9)),
            Err(CombatError::HexNotFound(_))
        ));
    }
}
