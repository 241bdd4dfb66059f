//! Force simulation driving node positions.
//!
//! Wraps the `force_graph` physics with an arena of [`MapNode`] records and a
//! cooling schedule. `alpha` is the simulation's energy: every tick it moves a
//! fraction of the way towards `alpha_target`, scales how far nodes travel,
//! and stops the simulation once it falls below `alpha_min`.
//!
//! Positions (`x`, `y`) are written only by [`Simulation::tick`]. Pins (`fx`,
//! `fy`) are written only through [`Simulation::fix`] and [`Simulation::release`].

use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData};
use log::{debug, warn};

use super::config::MapConfig;
use super::types::{Device, MapData};

/// Handle of a node in the arena.
///
/// Slots are reused once a device leaves, but every reuse bumps the slot's
/// generation, so a stale id never resolves to the device that took its place.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
	slot: usize,
	generation: u32,
}

impl NodeId {
	/// Arena slot. Shared by every node that ever lived there.
	pub fn index(self) -> usize {
		self.slot
	}
}

/// A device taking part in the layout.
#[derive(Clone, Debug, PartialEq)]
pub struct MapNode {
	/// Device drawn by this node, refreshed on every data update.
	pub device: Device,
	x: f64,
	y: f64,
	fx: Option<f64>,
	fy: Option<f64>,
}

impl MapNode {
	fn new(device: Device, x: f64, y: f64) -> Self {
		Self {
			device,
			x,
			y,
			fx: None,
			fy: None,
		}
	}

	/// Current horizontal position.
	pub fn x(&self) -> f64 {
		self.x
	}

	/// Current vertical position.
	pub fn y(&self) -> f64 {
		self.y
	}

	/// Pinned horizontal position, if any.
	pub fn fx(&self) -> Option<f64> {
		self.fx
	}

	/// Pinned vertical position, if any.
	pub fn fy(&self) -> Option<f64> {
		self.fy
	}

	/// Whether the node is pinned on either axis.
	pub fn is_fixed(&self) -> bool {
		self.fx.is_some() || self.fy.is_some()
	}
}

#[derive(Clone, Debug, Default)]
struct Slot {
	generation: u32,
	node: Option<MapNode>,
}

/// Node storage with slot reuse.
#[derive(Clone, Debug, Default)]
struct Arena {
	slots: Vec<Slot>,
	free: Vec<usize>,
}

impl Arena {
	fn get(&self, id: NodeId) -> Option<&MapNode> {
		self.slots
			.get(id.slot)
			.filter(|s| s.generation == id.generation)
			.and_then(|s| s.node.as_ref())
	}

	fn get_mut(&mut self, id: NodeId) -> Option<&mut MapNode> {
		self.slots
			.get_mut(id.slot)
			.filter(|s| s.generation == id.generation)
			.and_then(|s| s.node.as_mut())
	}

	fn insert(&mut self, node: MapNode) -> NodeId {
		match self.free.pop() {
			Some(slot) => {
				let entry = &mut self.slots[slot];
				entry.node = Some(node);
				NodeId {
					slot,
					generation: entry.generation,
				}
			}
			None => {
				self.slots.push(Slot {
					generation: 0,
					node: Some(node),
				});
				NodeId {
					slot: self.slots.len() - 1,
					generation: 0,
				}
			}
		}
	}

	fn remove(&mut self, id: NodeId) -> Option<MapNode> {
		let entry = self.slots.get_mut(id.slot).filter(|s| s.generation == id.generation)?;
		let node = entry.node.take()?;
		entry.generation = entry.generation.wrapping_add(1);
		self.free.push(id.slot);
		Some(node)
	}
}

/// Force layout of the current devices, with d3-style cooling.
pub struct Simulation {
	graph: ForceGraph<NodeId, ()>,
	arena: Arena,
	/// Current nodes in input order.
	order: Vec<NodeId>,
	ids: HashMap<String, NodeId>,
	config: MapConfig,
	center: (f64, f64),
	alpha: f64,
	alpha_target: f64,
	running: bool,
}

impl Simulation {
	/// Lay out `data` around the centre of a `width` x `height` surface.
	pub fn new(data: &MapData, width: f64, height: f64, config: MapConfig) -> Self {
		let mut simulation = Self {
			graph: ForceGraph::new(config.parameters()),
			arena: Arena::default(),
			order: Vec::new(),
			ids: HashMap::new(),
			config,
			center: (width / 2.0, height / 2.0),
			alpha: 1.0,
			alpha_target: 0.0,
			running: true,
		};
		simulation.set_data(data);
		simulation
	}

	/// Replace the node and link set.
	///
	/// Devices already present (by IEEE address) keep their id, position and
	/// pin. New devices are placed on a circle around the centre. Adding or
	/// removing devices reheats the simulation.
	pub fn set_data(&mut self, data: &MapData) {
		let present: HashSet<&str> = data.nodes.iter().map(|d| d.ieee_addr.as_str()).collect();
		let mut removed = 0;
		for (addr, &id) in &self.ids {
			if !present.contains(addr.as_str()) && self.arena.remove(id).is_some() {
				removed += 1;
			}
		}
		self.ids.retain(|addr, _| present.contains(addr.as_str()));

		let mut graph = ForceGraph::new(self.config.parameters());
		let mut ids = HashMap::with_capacity(data.nodes.len());
		let mut order = Vec::with_capacity(data.nodes.len());
		let mut graph_idx: HashMap<NodeId, DefaultNodeIdx> = HashMap::new();
		let mut added = 0;

		for (i, device) in data.nodes.iter().enumerate() {
			if ids.contains_key(&device.ieee_addr) {
				warn!("mesh-map: duplicate device {}, skipped", device.ieee_addr);
				continue;
			}
			let id = match self.ids.get(&device.ieee_addr) {
				Some(&id) => id,
				None => {
					let angle = (i as f64) * 2.0 * PI / data.nodes.len() as f64;
					let (x, y) = (
						self.center.0 + self.config.initial_radius * angle.cos(),
						self.center.1 + self.config.initial_radius * angle.sin(),
					);
					added += 1;
					self.arena.insert(MapNode::new(device.clone(), x, y))
				}
			};
			let Some(node) = self.arena.get_mut(id) else {
				continue;
			};
			node.device = device.clone();
			let idx = graph.add_node(NodeData {
				x: node.x as f32,
				y: node.y as f32,
				mass: self.config.node_mass,
				is_anchor: node.is_fixed(),
				user_data: id,
			});
			graph_idx.insert(id, idx);
			ids.insert(device.ieee_addr.clone(), id);
			order.push(id);
		}

		for link in &data.links {
			let src = ids.get(&link.source).and_then(|id| graph_idx.get(id));
			let tgt = ids.get(&link.target).and_then(|id| graph_idx.get(id));
			if let (Some(&src), Some(&tgt)) = (src, tgt) {
				if src != tgt {
					graph.add_edge(src, tgt, EdgeData::default());
				}
			}
		}

		debug!(
			"mesh-map: {} nodes ({} added, {} removed), {} links",
			order.len(),
			added,
			removed,
			data.links.len()
		);

		self.graph = graph;
		self.ids = ids;
		self.order = order;
		if added > 0 || removed > 0 {
			self.alpha = 1.0;
			self.running = true;
		}
	}

	/// Move the layout centre to the middle of a `width` x `height` surface.
	///
	/// Only devices added afterwards are placed around the new centre; the
	/// simulation is reheated so the existing layout drifts along.
	pub fn resize(&mut self, width: f64, height: f64) {
		let center = (width / 2.0, height / 2.0);
		if center == self.center {
			return;
		}
		debug!("mesh-map: resized to {width}x{height}");
		self.center = center;
		self.alpha = self.alpha.max(self.config.drag_alpha_target);
		self.running = true;
	}

	/// Current nodes in input order.
	pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &MapNode)> + '_ {
		self.order
			.iter()
			.filter_map(|&id| self.node(id).map(|node| (id, node)))
	}

	/// Node behind `id`, unless its device has left.
	pub fn node(&self, id: NodeId) -> Option<&MapNode> {
		self.arena.get(id)
	}

	/// Id of the device with this address.
	pub fn id_of(&self, ieee_addr: &str) -> Option<NodeId> {
		self.ids.get(ieee_addr).copied()
	}

	/// Number of current nodes.
	pub fn len(&self) -> usize {
		self.order.len()
	}

	/// Whether there are no nodes.
	pub fn is_empty(&self) -> bool {
		self.order.is_empty()
	}

	/// Current energy.
	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	/// Energy the simulation is moving towards.
	pub fn target(&self) -> f64 {
		self.alpha_target
	}

	/// Set the energy the simulation moves towards.
	pub fn alpha_target(&mut self, value: f64) -> &mut Self {
		self.alpha_target = value;
		self
	}

	/// Resume ticking after the simulation has settled.
	pub fn restart(&mut self) -> &mut Self {
		self.running = true;
		self
	}

	/// Whether [`Simulation::tick`] still moves nodes.
	pub fn is_running(&self) -> bool {
		self.running
	}

	/// Pin a node at `(x, y)`. Pinned nodes still pull on their neighbours.
	pub fn fix(&mut self, id: NodeId, x: f64, y: f64) {
		if let Some(node) = self.arena.get_mut(id) {
			node.fx = Some(x);
			node.fy = Some(y);
		}
	}

	/// Release a pinned node back to the simulation.
	pub fn release(&mut self, id: NodeId) {
		if let Some(node) = self.arena.get_mut(id) {
			node.fx = None;
			node.fy = None;
		}
	}

	/// Advance one step of `dt` seconds.
	pub fn tick(&mut self, dt: f32) {
		if !self.running {
			return;
		}
		self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;

		let arena = &self.arena;
		self.graph.visit_nodes_mut(|node| {
			let Some(record) = arena.get(node.data.user_data) else {
				return;
			};
			if let Some(fx) = record.fx {
				node.data.x = fx as f32;
			}
			if let Some(fy) = record.fy {
				node.data.y = fy as f32;
			}
			node.data.is_anchor = record.is_fixed();
		});

		self.graph.update(dt * self.alpha as f32);

		let arena = &mut self.arena;
		self.graph.visit_nodes(|node| {
			if let Some(record) = arena.get_mut(node.data.user_data) {
				record.x = node.x() as f64;
				record.y = node.y() as f64;
			}
		});

		if self.alpha < self.config.alpha_min {
			self.running = false;
			debug!("mesh-map: simulation settled");
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::network_map::types::{DeviceType, LinkData};

	fn device(addr: &str, kind: DeviceType) -> Device {
		Device {
			ieee_addr: addr.into(),
			friendly_name: None,
			kind,
			model_id: None,
			last_seen: None,
		}
	}

	fn data(addrs: &[&str]) -> MapData {
		MapData {
			nodes: addrs
				.iter()
				.map(|a| device(a, DeviceType::Router))
				.collect(),
			links: addrs
				.windows(2)
				.map(|w| LinkData {
					source: w[0].into(),
					target: w[1].into(),
				})
				.collect(),
		}
	}

	#[test]
	fn places_nodes_on_circle_in_input_order() {
		let sim = Simulation::new(&data(&["a", "b", "c", "d"]), 400.0, 200.0, MapConfig::default());
		let nodes: Vec<_> = sim.nodes().collect();
		assert_eq!(nodes.len(), 4);
		assert_eq!(nodes[0].1.device.ieee_addr, "a");
		assert!((nodes[0].1.x() - 300.0).abs() < 1e-9);
		assert!((nodes[0].1.y() - 100.0).abs() < 1e-9);
		assert!(nodes.iter().all(|(_, n)| n.fx().is_none() && n.fy().is_none()));
	}

	#[test]
	fn pinned_node_stays_put() {
		let mut sim = Simulation::new(&data(&["a", "b", "c"]), 400.0, 400.0, MapConfig::default());
		let a = sim.id_of("a").unwrap();
		sim.fix(a, 10.0, 20.0);
		for _ in 0..20 {
			sim.tick(0.016);
		}
		let node = sim.node(a).unwrap();
		assert_eq!((node.x(), node.y()), (10.0, 20.0));

		sim.release(a);
		assert!(!sim.node(a).unwrap().is_fixed());
	}

	#[test]
	fn cools_down_and_restarts() {
		let mut sim = Simulation::new(&data(&["a", "b"]), 400.0, 400.0, MapConfig::default());
		for _ in 0..1000 {
			sim.tick(0.016);
		}
		assert!(!sim.is_running());
		let alpha = sim.alpha();
		sim.tick(0.016);
		assert_eq!(sim.alpha(), alpha);

		sim.alpha_target(0.3).restart();
		assert!(sim.is_running());
		sim.tick(0.016);
		assert!(sim.alpha() > alpha);
		assert_eq!(sim.target(), 0.3);
	}

	#[test]
	fn set_data_keeps_surviving_nodes() {
		let mut sim = Simulation::new(&data(&["a", "b"]), 400.0, 400.0, MapConfig::default());
		let b = sim.id_of("b").unwrap();
		sim.fix(b, 1.0, 2.0);
		sim.tick(0.016);
		let before = sim.node(b).unwrap().clone();

		sim.set_data(&data(&["b", "c"]));
		assert_eq!(sim.id_of("b"), Some(b));
		assert_eq!(sim.node(b), Some(&before));
		assert!(sim.id_of("a").is_none());
		assert_eq!(sim.len(), 2);

		let c = sim.id_of("c").unwrap();
		assert_ne!(c, b);
		assert_eq!(sim.nodes().map(|(id, _)| id).collect::<Vec<_>>(), vec![b, c]);
		assert!(sim.is_running());
	}

	#[test]
	fn duplicate_addresses_render_once() {
		let sim = Simulation::new(&data(&["a", "a", "b"]), 400.0, 400.0, MapConfig::default());
		assert_eq!(sim.len(), 2);
	}

	#[test]
	fn links_to_unknown_devices_are_ignored() {
		let mut input = data(&["a"]);
		input.links.push(LinkData {
			source: "a".into(),
			target: "ghost".into(),
		});
		let mut sim = Simulation::new(&input, 400.0, 400.0, MapConfig::default());
		sim.tick(0.016);
		assert_eq!(sim.len(), 1);
	}

	#[test]
	fn returning_devices_reuse_slots() {
		let mut sim = Simulation::new(&data(&["a", "b"]), 400.0, 400.0, MapConfig::default());
		let first = sim.id_of("a").unwrap();
		for _ in 0..1000 {
			sim.set_data(&data(&["b"]));
			sim.set_data(&data(&["a", "b"]));
		}
		assert_eq!(sim.arena.slots.len(), 2);
		assert_eq!(sim.len(), 2);

		let a = sim.id_of("a").unwrap();
		assert_eq!(a.index(), first.index());
		assert_ne!(a, first);
		assert!(sim.node(first).is_none());
		sim.fix(first, 1.0, 1.0);
		assert!(!sim.node(a).unwrap().is_fixed());
	}

	#[test]
	fn resize_moves_placement_centre() {
		let mut sim = Simulation::new(&data(&["a"]), 400.0, 400.0, MapConfig::default());
		for _ in 0..1000 {
			sim.tick(0.016);
		}
		assert!(!sim.is_running());

		sim.resize(1000.0, 600.0);
		assert!(sim.is_running());
		sim.set_data(&data(&["b"]));
		let b = sim.node(sim.id_of("b").unwrap()).unwrap();
		assert!((b.x() - 600.0).abs() < 1e-9);
		assert!((b.y() - 300.0).abs() < 1e-9);
	}

	#[test]
	fn empty_map_ticks() {
		let mut sim = Simulation::new(&MapData::default(), 400.0, 400.0, MapConfig::default());
		assert!(sim.is_empty());
		sim.tick(0.016);
	}
}
