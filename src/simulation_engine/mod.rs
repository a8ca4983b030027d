// simulation_engine/mod.rs
pub mod density;
pub mod intersections;
