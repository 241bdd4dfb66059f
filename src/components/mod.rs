//! UI components.

pub mod network_map;
