pub mod unit;

pub use unit::{AirUnit, LandClass, LandUnit, Location, NavalClass, NavalUnit, Unit, UnitKind};
