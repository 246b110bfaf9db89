//! Strategos - utility-scoring faction AI and combat resolution for a hex strategy game

pub mod ai;
pub mod combat;
pub mod core;
pub mod skirmish;
pub mod world;
