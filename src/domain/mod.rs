pub mod body;
pub mod perception;
pub mod physics;
pub mod policy;
pub mod tile;
