//! Pointer drag gestures pinning nodes in the simulation.
//!
//! The coordinator keeps a binding table from rendered marker elements to the
//! nodes they draw. The table is rebuilt after every render, so markers that
//! went away stop reacting and new ones become draggable without any extra
//! registration. Gestures are tracked per pointer: several touches can drag
//! different nodes at once, and only the first gesture heats the simulation
//! while only the last one to end cools it again.

use std::collections::HashMap;

use log::debug;

use super::simulation::{NodeId, Simulation};

/// Identifies one rendered marker element.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementHandle(pub u32);

/// Browser pointer id (`PointerEvent.pointerId`).
pub type PointerId = i32;

/// Binding table plus the gestures currently in flight.
#[derive(Clone, Debug)]
pub struct DragCoordinator {
	bindings: HashMap<ElementHandle, NodeId>,
	gestures: HashMap<PointerId, NodeId>,
	heat: f64,
}

impl DragCoordinator {
	/// `heat` is the alpha target applied while a drag is in progress.
	pub fn new(heat: f64) -> Self {
		Self {
			bindings: HashMap::new(),
			gestures: HashMap::new(),
			heat,
		}
	}

	/// Replace the binding table with the currently rendered markers.
	pub fn rebind(&mut self, bindings: impl IntoIterator<Item = (ElementHandle, NodeId)>) {
		self.bindings.clear();
		self.bindings.extend(bindings);
	}

	/// Node drawn by `handle`, if it is still rendered.
	pub fn bound_node(&self, handle: ElementHandle) -> Option<NodeId> {
		self.bindings.get(&handle).copied()
	}

	/// Number of gestures in flight.
	pub fn active(&self) -> usize {
		self.gestures.len()
	}

	/// Node held by `pointer`.
	pub fn dragged_node(&self, pointer: PointerId) -> Option<NodeId> {
		self.gestures.get(&pointer).copied()
	}

	/// Start dragging the node drawn by `handle`. Returns whether a gesture began.
	pub fn start(&mut self, pointer: PointerId, handle: ElementHandle, simulation: &mut Simulation) -> bool {
		if self.gestures.contains_key(&pointer) {
			return false;
		}
		let Some(id) = self.bound_node(handle) else {
			debug!("mesh-map: drag on unbound element {:?} ignored", handle);
			return false;
		};
		let Some((x, y)) = simulation.node(id).map(|node| (node.x(), node.y())) else {
			return false;
		};

		if self.gestures.is_empty() {
			simulation.alpha_target(self.heat).restart();
		}
		simulation.fix(id, x, y);
		self.gestures.insert(pointer, id);
		debug!("mesh-map: drag start {:?} at ({x:.1}, {y:.1})", id);
		true
	}

	/// Move the node held by `pointer` to `(x, y)` in simulation space.
	pub fn drag(&mut self, pointer: PointerId, x: f64, y: f64, simulation: &mut Simulation) -> bool {
		let Some(&id) = self.gestures.get(&pointer) else {
			return false;
		};
		simulation.fix(id, x, y);
		true
	}

	/// Finish the gesture of `pointer`, releasing its node.
	pub fn end(&mut self, pointer: PointerId, simulation: &mut Simulation) -> bool {
		let Some(id) = self.gestures.remove(&pointer) else {
			return false;
		};
		if self.gestures.is_empty() {
			simulation.alpha_target(0.0);
		}
		simulation.release(id);
		debug!("mesh-map: drag end {:?}", id);
		true
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::network_map::config::MapConfig;
	use crate::components::network_map::types::{Device, DeviceType, MapData};

	fn simulation(addrs: &[&str]) -> Simulation {
		let data = MapData {
			nodes: addrs
				.iter()
				.map(|a| Device {
					ieee_addr: a.to_string(),
					friendly_name: None,
					kind: DeviceType::EndDevice,
					model_id: None,
					last_seen: None,
				})
				.collect(),
			links: Vec::new(),
		};
		Simulation::new(&data, 400.0, 400.0, MapConfig::default())
	}

	fn bound(sim: &Simulation) -> DragCoordinator {
		let mut drag = DragCoordinator::new(0.3);
		drag.rebind(
			sim.nodes()
				.enumerate()
				.map(|(i, (id, _))| (ElementHandle(i as u32), id)),
		);
		drag
	}

	#[test]
	fn drag_pins_moves_and_releases() {
		let mut sim = simulation(&["a", "b"]);
		let mut drag = bound(&sim);
		let a = sim.id_of("a").unwrap();
		let b = sim.id_of("b").unwrap();
		let (x, y) = (sim.node(a).unwrap().x(), sim.node(a).unwrap().y());

		assert!(drag.start(1, ElementHandle(0), &mut sim));
		assert_eq!(sim.node(a).unwrap().fx(), Some(x));
		assert_eq!(sim.node(a).unwrap().fy(), Some(y));
		assert_eq!(sim.target(), 0.3);

		assert!(drag.drag(1, 50.0, 60.0, &mut sim));
		assert_eq!(sim.node(a).unwrap().fx(), Some(50.0));
		assert_eq!(sim.node(a).unwrap().fy(), Some(60.0));
		assert!(!sim.node(b).unwrap().is_fixed());

		assert!(drag.end(1, &mut sim));
		assert!(!sim.node(a).unwrap().is_fixed());
		assert_eq!(sim.target(), 0.0);
		assert_eq!(drag.active(), 0);
	}

	#[test]
	fn start_never_moves_the_node() {
		let mut sim = simulation(&["a"]);
		let mut drag = bound(&sim);
		let before = sim.node(sim.id_of("a").unwrap()).unwrap().clone();
		drag.start(1, ElementHandle(0), &mut sim);
		let after = sim.node(sim.id_of("a").unwrap()).unwrap();
		assert_eq!((before.x(), before.y()), (after.x(), after.y()));
	}

	#[test]
	fn settled_simulation_restarts_on_drag() {
		let mut sim = simulation(&["a"]);
		for _ in 0..1000 {
			sim.tick(0.016);
		}
		assert!(!sim.is_running());
		let mut drag = bound(&sim);
		drag.start(7, ElementHandle(0), &mut sim);
		assert!(sim.is_running());
	}

	#[test]
	fn only_last_gesture_cools() {
		let mut sim = simulation(&["a", "b"]);
		let mut drag = bound(&sim);
		drag.start(1, ElementHandle(0), &mut sim);
		drag.start(2, ElementHandle(1), &mut sim);
		assert_eq!(drag.active(), 2);

		sim.alpha_target(0.5);
		drag.start(3, ElementHandle(0), &mut sim);
		assert_eq!(sim.target(), 0.5, "second gesture must not reheat");

		drag.drag(2, 5.0, 5.0, &mut sim);
		let a = sim.id_of("a").unwrap();
		let b = sim.id_of("b").unwrap();
		assert_ne!(sim.node(a).unwrap().fx(), Some(5.0));
		assert_eq!(sim.node(b).unwrap().fx(), Some(5.0));

		drag.end(1, &mut sim);
		assert_eq!(sim.target(), 0.5);
		assert!(!sim.node(a).unwrap().is_fixed());
		assert!(sim.node(b).unwrap().is_fixed());

		drag.end(3, &mut sim);
		drag.end(2, &mut sim);
		assert_eq!(sim.target(), 0.0);
	}

	#[test]
	fn unbound_element_is_not_draggable() {
		let mut sim = simulation(&["a"]);
		let mut drag = bound(&sim);
		assert!(!drag.start(1, ElementHandle(99), &mut sim));
		drag.rebind(Vec::new());
		assert!(!drag.start(1, ElementHandle(0), &mut sim));
		assert!(!drag.drag(1, 1.0, 1.0, &mut sim));
		assert!(!drag.end(1, &mut sim));
		assert_eq!(sim.target(), 0.0);
	}

	#[test]
	fn one_gesture_per_pointer() {
		let mut sim = simulation(&["a", "b"]);
		let mut drag = bound(&sim);
		assert!(drag.start(1, ElementHandle(0), &mut sim));
		assert!(!drag.start(1, ElementHandle(1), &mut sim));
		assert_eq!(drag.dragged_node(1), sim.id_of("a"));
	}
}
