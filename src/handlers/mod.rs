// handlers/mod.rs - HTTP handlers
//
// data:   generic CRUD over any collection named in the path (/:entity[/:id])
// system: service description and health (/, /health)
pub mod data;
pub mod system;

pub use data::*;
pub use system::{health, root};
