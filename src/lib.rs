pub mod config;
pub mod error;
pub mod normalize;
pub mod report;
pub mod roster;
