pub mod config;
pub mod constants;
pub mod meter;
pub mod position;
pub mod render;
pub mod source;
pub mod transport;
