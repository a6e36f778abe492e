pub mod enemy;
pub mod event;
pub mod level;
pub mod motion;
pub mod play;
pub mod player;
pub mod session;
pub mod stage;
