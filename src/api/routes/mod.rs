pub mod assets;
pub mod matches;
pub mod player;
pub mod session;
