//! Tunables for the force layout and drag interaction.

use force_graph::SimulationParameters;
use serde::Deserialize;

use super::error::MapDataError;

/// Layout and interaction settings. Every field has a default, so a partial
/// JSON object is enough to override single values.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct MapConfig {
	/// Repulsion between every pair of nodes.
	pub force_charge: f32,
	/// Spring strength of links.
	pub force_spring: f32,
	/// Upper bound on the force applied to a node in one step.
	pub force_max: f32,
	/// Scale from force to velocity.
	pub node_speed: f32,
	/// Velocity kept from one step to the next.
	pub damping_factor: f32,
	/// Mass given to every node.
	pub node_mass: f32,
	/// Fraction of the gap to `alpha_target` closed on every tick.
	pub alpha_decay: f64,
	/// The simulation stops ticking once alpha drops below this.
	pub alpha_min: f64,
	/// Alpha target while at least one node is being dragged.
	pub drag_alpha_target: f64,
	/// Radius of the circle new nodes are placed on.
	pub initial_radius: f64,
}

impl Default for MapConfig {
	fn default() -> Self {
		let alpha_min: f64 = 0.001;
		Self {
			force_charge: 150.0,
			force_spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
			node_mass: 10.0,
			// Cools from 1 to alpha_min in ~300 ticks.
			alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
			alpha_min,
			drag_alpha_target: 0.3,
			initial_radius: 100.0,
		}
	}
}

impl MapConfig {
	/// Parse a (possibly partial) JSON config.
	pub fn from_json(text: &str) -> Result<Self, MapDataError> {
		Ok(serde_json::from_str(text)?)
	}

	/// Force parameters for the layout engine.
	pub fn parameters(&self) -> SimulationParameters {
		SimulationParameters {
			force_charge: self.force_charge,
			force_spring: self.force_spring,
			force_max: self.force_max,
			node_speed: self.node_speed,
			damping_factor: self.damping_factor,
		}
	}
}
