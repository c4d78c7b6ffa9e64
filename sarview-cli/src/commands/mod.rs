pub mod describe;
pub mod tile;
