//! The node collection: one visual per device, plus the drag binding over all of them.

use std::collections::HashMap;

use log::debug;

use super::drag::{DragCoordinator, ElementHandle, PointerId};
use super::icon::IconUrlFn;
use super::node::{Marker, NodeHandlers, NodeVisual};
use super::simulation::{MapNode, NodeId, Simulation};
use super::types::TimeInfo;

/// Everything the rendering surface needs to draw one marker.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeView {
	/// Element to draw into. Stable for as long as the device stays.
	pub handle: ElementHandle,
	/// Simulation node being drawn.
	pub node: NodeId,
	/// Shape and its content.
	pub marker: Marker,
	/// Full class attribute.
	pub class: String,
	/// Horizontal position of the node centre.
	pub x: f64,
	/// Vertical position of the node centre.
	pub y: f64,
}

/// Visuals of every rendered device plus the drag coordinator bound to them.
pub struct NodeLayer {
	/// Keyed by IEEE address so visual state follows the device, not its list slot.
	visuals: HashMap<String, NodeVisual>,
	next_handle: u32,
	drag: DragCoordinator,
	handlers: NodeHandlers,
	icon_url: IconUrlFn,
}

impl NodeLayer {
	/// Empty layer. Nothing is mounted before the first [`NodeLayer::render`].
	pub fn new(handlers: NodeHandlers, icon_url: IconUrlFn, drag_alpha_target: f64) -> Self {
		Self {
			visuals: HashMap::new(),
			next_handle: 0,
			drag: DragCoordinator::new(drag_alpha_target),
			handlers,
			icon_url,
		}
	}

	/// Render every simulation node in input order.
	///
	/// Devices seen for the first time mount a new visual, devices that left
	/// drop theirs, and the drag binding is rebuilt from the result.
	pub fn render(&mut self, simulation: &Simulation, time: Option<&TimeInfo>) -> Vec<NodeView> {
		self.visuals.retain(|addr, _| simulation.id_of(addr).is_some());

		let mut views = Vec::with_capacity(simulation.len());
		for (id, node) in simulation.nodes() {
			let addr = &node.device.ieee_addr;
			if !self.visuals.contains_key(addr) {
				let handle = ElementHandle(self.next_handle);
				self.next_handle = self.next_handle.wrapping_add(1);
				let mut visual = NodeVisual::new(handle, id);
				visual.mount(&node.device, &self.icon_url);
				debug!("mesh-map: mounted {} as {:?}", addr, handle);
				self.visuals.insert(addr.clone(), visual);
			}
			let Some(visual) = self.visuals.get_mut(addr) else {
				continue;
			};
			visual.set_node(id);
			let marker = visual.marker(&node.device);
			views.push(NodeView {
				handle: visual.handle(),
				node: id,
				class: visual.class(&node.device, &marker, time),
				marker,
				x: node.x(),
				y: node.y(),
			});
		}

		self.drag.rebind(self.visuals.values().map(NodeVisual::binding));
		views
	}

	fn visual_mut(&mut self, handle: ElementHandle) -> Option<&mut NodeVisual> {
		self.visuals.values_mut().find(|v| v.handle() == handle)
	}

	fn node<'a>(&self, handle: ElementHandle, simulation: &'a Simulation) -> Option<&'a MapNode> {
		self.drag.bound_node(handle).and_then(|id| simulation.node(id))
	}

	/// The marker's image failed to load. Returns whether its icon changed.
	pub fn image_failed(&mut self, handle: ElementHandle) -> bool {
		self.visual_mut(handle).is_some_and(NodeVisual::image_failed)
	}

	/// Pointer entered the marker `handle`.
	pub fn mouse_over(&self, handle: ElementHandle, simulation: &Simulation) {
		if let Some(node) = self.node(handle, simulation) {
			self.handlers.mouse_over(node);
		}
	}

	/// Pointer left the marker `handle`.
	pub fn mouse_out(&self, handle: ElementHandle, simulation: &Simulation) {
		if let Some(node) = self.node(handle, simulation) {
			self.handlers.mouse_out(node);
		}
	}

	/// The marker `handle` was double-clicked.
	pub fn dbl_click(&self, handle: ElementHandle, simulation: &Simulation) {
		if let Some(node) = self.node(handle, simulation) {
			self.handlers.dbl_click(node);
		}
	}

	/// Pointer went down on the marker `handle`.
	pub fn drag_start(&mut self, pointer: PointerId, handle: ElementHandle, simulation: &mut Simulation) -> bool {
		self.drag.start(pointer, handle, simulation)
	}

	/// Pointer moved to `(x, y)` in map space.
	pub fn drag_move(&mut self, pointer: PointerId, x: f64, y: f64, simulation: &mut Simulation) -> bool {
		self.drag.drag(pointer, x, y, simulation)
	}

	/// Pointer was lifted, cancelled or left the map. Other pointers keep dragging.
	pub fn drag_end(&mut self, pointer: PointerId, simulation: &mut Simulation) -> bool {
		self.drag.end(pointer, simulation)
	}

	/// Drag state, for inspection.
	pub fn drag(&self) -> &DragCoordinator {
		&self.drag
	}
}
