pub mod resolution;

#[cfg(test)]
mod resolution_test;

pub use resolution::{resolve_bus_state, BoundingBox, BusStateView, ResolutionService};
