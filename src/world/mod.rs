//! Map entities the decision engine and combat model operate on

pub mod army;
pub mod building;
pub mod unit;

pub use army::{Army, UnitCounts};
pub use building::{Building, BuildingState, BuildingType, DESTROYED_DEFENSIVE_VALUE};
pub use unit::{Unit, UnitStats, UnitType};
