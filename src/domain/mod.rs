pub mod ai;
pub mod cadence;
pub mod entity;
pub mod grid;
pub mod input;
pub mod pose;
pub mod rules;
pub mod tile;
