// Adapters layer: concrete implementations for external systems.
// Storage and configuration providers live under src/config.

pub mod chart;
