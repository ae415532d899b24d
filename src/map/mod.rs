//! Hex map - the strategic layer the combat engine reads topology from

pub mod hex;
pub mod sheet;

pub use hex::{Hex, HexCoord, Terrain, WeatherCondition};
pub use sheet::MapSheet;
