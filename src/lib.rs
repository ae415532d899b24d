//! Hexfront - combat resolution engine for a turn-based hex-grid wargame

pub mod combat;
pub mod core;
pub mod map;
pub mod scenario;
pub mod units;
pub mod world;
