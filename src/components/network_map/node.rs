//! A single device marker: shape choice, CSS classes, icon state and event forwarding.

use std::rc::Rc;

use super::drag::ElementHandle;
use super::icon::{IconState, IconUrlFn};
use super::simulation::{MapNode, NodeId};
use super::star::star_shape;
use super::status::is_online;
use super::types::{Device, DeviceType, TimeInfo};

/// Class carried by every node marker. Drag binding targets these elements.
pub const NODE_CLASS: &str = "node";
/// Extra class for image markers.
pub const IMAGE_CLASS: &str = "img";
/// Added when the device has not been heard from in time.
pub const OFFLINE_CLASS: &str = "offline";

const STAR_ARMS: usize = 5;
const STAR_INNER_RADIUS: f64 = 5.0;
const STAR_OUTER_RADIUS: f64 = 14.0;

/// What to draw for a node.
#[derive(Clone, Debug, PartialEq)]
pub enum Marker {
	/// Polygon outline, as an SVG `points` attribute.
	Star {
		/// Vertex list.
		points: String,
	},
	/// Device icon.
	Image {
		/// Icon URL.
		href: String,
	},
}

impl Marker {
	/// Whether this is the coordinator star.
	pub fn is_star(&self) -> bool {
		matches!(self, Marker::Star { .. })
	}
}

/// Callback receiving the node an event happened on.
pub type NodeHandler = Rc<dyn Fn(&MapNode)>;

/// Optional interaction callbacks. A missing handler is a no-op.
#[derive(Clone, Default)]
pub struct NodeHandlers {
	/// Pointer entered a marker.
	pub on_mouse_over: Option<NodeHandler>,
	/// Pointer left a marker.
	pub on_mouse_out: Option<NodeHandler>,
	/// Marker was double-clicked.
	pub on_dbl_click: Option<NodeHandler>,
}

impl NodeHandlers {
	/// Forward a mouse-over.
	pub fn mouse_over(&self, node: &MapNode) {
		if let Some(handler) = &self.on_mouse_over {
			handler(node);
		}
	}

	/// Forward a mouse-out.
	pub fn mouse_out(&self, node: &MapNode) {
		if let Some(handler) = &self.on_mouse_out {
			handler(node);
		}
	}

	/// Forward a double-click.
	pub fn dbl_click(&self, node: &MapNode) {
		if let Some(handler) = &self.on_dbl_click {
			handler(node);
		}
	}
}

/// CSS classes of a marker. Online status is evaluated on every call.
pub fn class_names(device: &Device, time: Option<&TimeInfo>) -> String {
	let mut classes = format!("{NODE_CLASS} {}", device.kind.as_str());
	if !is_online(device, time) {
		classes.push(' ');
		classes.push_str(OFFLINE_CLASS);
	}
	classes
}

/// Per-instance visual state of one rendered node.
#[derive(Clone, Debug)]
pub struct NodeVisual {
	handle: ElementHandle,
	node: NodeId,
	icon: IconState,
}

impl NodeVisual {
	/// Unmounted visual for `node`, drawn into the element `handle`.
	pub fn new(handle: ElementHandle, node: NodeId) -> Self {
		Self {
			handle,
			node,
			icon: IconState::default(),
		}
	}

	/// Resolve the icon and return the element binding the drag coordinator needs.
	pub fn mount(&mut self, device: &Device, icon_url: &IconUrlFn) -> (ElementHandle, NodeId) {
		self.icon.resolve(icon_url(device));
		self.binding()
	}

	/// Element and the node it draws.
	pub fn binding(&self) -> (ElementHandle, NodeId) {
		(self.handle, self.node)
	}

	/// Element this visual is drawn into.
	pub fn handle(&self) -> ElementHandle {
		self.handle
	}

	/// Simulation node drawn by this visual.
	pub fn node(&self) -> NodeId {
		self.node
	}

	pub(super) fn set_node(&mut self, node: NodeId) {
		self.node = node;
	}

	/// Current icon state.
	pub fn icon(&self) -> &IconState {
		&self.icon
	}

	/// The image failed to load. Returns whether the icon changed.
	pub fn image_failed(&mut self) -> bool {
		self.icon.fail()
	}

	/// Star for the coordinator, icon for everything else.
	pub fn marker(&self, device: &Device) -> Marker {
		if device.kind == DeviceType::Coordinator {
			Marker::Star {
				points: star_shape(STAR_ARMS, STAR_INNER_RADIUS, STAR_OUTER_RADIUS),
			}
		} else {
			Marker::Image {
				href: self.icon.url().to_string(),
			}
		}
	}

	/// Full class attribute for `marker`.
	pub fn class(&self, device: &Device, marker: &Marker, time: Option<&TimeInfo>) -> String {
		let classes = class_names(device, time);
		match marker {
			Marker::Star { .. } => classes,
			Marker::Image { .. } => format!("{IMAGE_CLASS} {classes}"),
		}
	}
}

#[cfg(test)]
mod tests {
	use std::cell::RefCell;

	use super::*;
	use crate::components::network_map::config::MapConfig;
	use crate::components::network_map::icon::FALLBACK_ICON_URL;
	use crate::components::network_map::simulation::Simulation;
	use crate::components::network_map::types::MapData;

	fn device(kind: DeviceType, last_seen: Option<&str>) -> Device {
		Device {
			ieee_addr: "0x10".into(),
			friendly_name: Some("lamp".into()),
			kind,
			model_id: Some("lumi.light".into()),
			last_seen: last_seen.map(str::to_string),
		}
	}

	fn icon_url() -> IconUrlFn {
		Rc::new(|d: &Device| format!("/icons/{}.png", d.model_id.as_deref().unwrap_or("none")))
	}

	fn mounted(d: &Device) -> NodeVisual {
		let mut visual = NodeVisual::new(ElementHandle(3), NodeId::default());
		visual.mount(d, &icon_url());
		visual
	}

	#[test]
	fn coordinator_is_a_star() {
		let d = device(DeviceType::Coordinator, None);
		let marker = mounted(&d).marker(&d);
		assert!(marker.is_star());
		assert_eq!(
			marker,
			Marker::Star {
				points: star_shape(5, 5.0, 14.0)
			}
		);
	}

	#[test]
	fn other_roles_are_images() {
		for kind in [
			DeviceType::Router,
			DeviceType::EndDevice,
			DeviceType::Other("GreenPower".into()),
		] {
			let d = device(kind, None);
			assert_eq!(
				mounted(&d).marker(&d),
				Marker::Image {
					href: "/icons/lumi.light.png".into()
				}
			);
		}
	}

	#[test]
	fn mount_returns_binding() {
		let d = device(DeviceType::Router, None);
		let mut visual = NodeVisual::new(ElementHandle(9), NodeId::default());
		assert_eq!(visual.icon(), &IconState::Initializing);
		assert_eq!(visual.mount(&d, &icon_url()), (ElementHandle(9), NodeId::default()));
		assert_eq!(visual.icon(), &IconState::Ready("/icons/lumi.light.png".into()));
	}

	#[test]
	fn image_failure_falls_back_once() {
		let d = device(DeviceType::Router, None);
		let mut visual = mounted(&d);
		assert!(visual.image_failed());
		assert_eq!(
			visual.marker(&d),
			Marker::Image {
				href: FALLBACK_ICON_URL.into()
			}
		);
		assert!(!visual.image_failed());
		assert_eq!(visual.icon(), &IconState::Fallback);
	}

	#[test]
	fn classes_follow_role_and_status() {
		let now = TimeInfo { ts: 10_000.0 };
		let d = device(DeviceType::Router, Some("9000"));
		let visual = mounted(&d);
		let marker = visual.marker(&d);
		assert_eq!(visual.class(&d, &marker, Some(&now)), "img node Router");

		let stale = TimeInfo { ts: 9000.0 + 7200.0 };
		assert_eq!(visual.class(&d, &marker, Some(&stale)), "img node Router offline");

		let c = device(DeviceType::Coordinator, Some("0"));
		let star = visual.marker(&c);
		assert_eq!(visual.class(&c, &star, Some(&stale)), "node Coordinator offline");
		assert_eq!(visual.class(&c, &star, None), "node Coordinator");
	}

	#[test]
	fn unknown_role_keeps_its_name() {
		let d = device(DeviceType::Other("Repeater".into()), None);
		assert_eq!(class_names(&d, None), "node Repeater");
	}

	#[test]
	fn handlers_receive_the_node() {
		let data = MapData {
			nodes: vec![device(DeviceType::Router, None)],
			links: Vec::new(),
		};
		let sim = Simulation::new(&data, 100.0, 100.0, MapConfig::default());
		let (_, node) = sim.nodes().next().unwrap();

		let seen = Rc::new(RefCell::new(Vec::new()));
		let log = seen.clone();
		let handlers = NodeHandlers {
			on_dbl_click: Some(Rc::new(move |n: &MapNode| {
				log.borrow_mut().push(n.device.ieee_addr.clone())
			})),
			..Default::default()
		};

		handlers.mouse_over(node);
		handlers.mouse_out(node);
		handlers.dbl_click(node);
		assert_eq!(*seen.borrow(), vec!["0x10".to_string()]);
	}
}
