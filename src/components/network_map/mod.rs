//! Interactive network map of a radio mesh.
//!
//! Devices are laid out by a force simulation and drawn as SVG markers:
//! - The coordinator as a star, every other device as its model icon
//! - Icons that fail to load are replaced by a generic device picture
//! - Devices not heard from for two hours are styled as offline
//! - Markers can be dragged; a dragged node is pinned while held
//!
//! Everything except [`NetworkMap`] is independent of the browser and can be
//! driven directly, e.g. from tests.
//!
//! # Example
//!
//! ```ignore
//! use mesh_map::{MapData, NetworkMap, TimeInfo};
//!
//! let data = MapData::from_json(r#"{ "nodes": [], "links": [] }"#)?;
//! let time = RwSignal::new(Some(TimeInfo { ts: 1_700_000_000.0 }));
//!
//! view! { <NetworkMap data=Signal::derive(move || data.clone()) time=time /> }
//! ```

mod component;
pub mod config;
pub mod drag;
mod error;
pub mod icon;
pub mod layer;
pub mod node;
pub mod simulation;
pub mod star;
pub mod status;
mod types;

pub use component::NetworkMap;
pub use config::MapConfig;
pub use error::MapDataError;
pub use simulation::{MapNode, NodeId, Simulation};
pub use status::is_online;
pub use types::{Device, DeviceType, LinkData, MapData, TimeInfo};
