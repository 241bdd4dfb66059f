//! Leptos component drawing the network map as SVG.
//!
//! The component owns the simulation and the node layer. An animation loop
//! runs via `requestAnimationFrame`, ticking the simulation and re-rendering
//! node views each frame. Node markers are keyed by their element handle, so
//! a device keeps its DOM element (and loaded image) across frames.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use web_sys::{MouseEvent, PointerEvent, Window};

use super::config::MapConfig;
use super::icon::device_image_url;
use super::layer::{NodeLayer, NodeView};
use super::node::{Marker, NodeHandler, NodeHandlers};
use super::simulation::{MapNode, Simulation};
use super::types::{MapData, TimeInfo};

const FRAME_DT: f32 = 0.016;
/// Markers are drawn in a square of this size centred on the node.
const MARKER_SIZE: f64 = 30.0;

struct MapContext {
	simulation: Simulation,
	layer: NodeLayer,
}

type Context = StoredValue<MapContext, LocalStorage>;

/// Renders devices of a mesh network as draggable markers.
///
/// `data` is the authoritative device and link list; changes are applied to
/// the running simulation. `time` is "now" in seconds and drives the offline
/// styling; without it every device is shown online. Hover and double-click
/// callbacks receive the node under the pointer. Without explicit `width` and
/// `height` the map fills the window and follows it when it is resized.
#[component]
pub fn NetworkMap(
	#[prop(into)] data: Signal<MapData>,
	#[prop(into)] time: Signal<Option<TimeInfo>>,
	#[prop(optional)] config: MapConfig,
	#[prop(optional)] on_mouse_over: Option<Callback<MapNode>>,
	#[prop(optional)] on_mouse_out: Option<Callback<MapNode>>,
	#[prop(optional)] on_dbl_click: Option<Callback<MapNode>>,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let (w, h) = viewport_size(width, height);
	let handlers = NodeHandlers {
		on_mouse_over: on_mouse_over.map(forward),
		on_mouse_out: on_mouse_out.map(forward),
		on_dbl_click: on_dbl_click.map(forward),
	};
	let context: Context = StoredValue::new_local(MapContext {
		simulation: Simulation::new(&data.get_untracked(), w, h, config.clone()),
		layer: NodeLayer::new(handlers, Rc::new(device_image_url), config.drag_alpha_target),
	});
	let views = RwSignal::new(Vec::<NodeView>::new());
	let size = RwSignal::new((w, h));

	if width.is_none() || height.is_none() {
		let on_resize: StoredValue<Option<Closure<dyn FnMut()>>, LocalStorage> = StoredValue::new_local(None);
		on_resize.set_value(Some(Closure::new(move || {
			let (nw, nh) = viewport_size(width, height);
			size.set((nw, nh));
			context.update_value(|c| c.simulation.resize(nw, nh));
		})));
		if let Some(window) = web_sys::window() {
			on_resize.with_value(|cb| {
				if let Some(cb) = cb {
					let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
				}
			});
		}
		on_cleanup(move || {
			let Some(window) = web_sys::window() else {
				return;
			};
			on_resize.with_value(|cb| {
				if let Some(cb) = cb {
					let _ = window.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
				}
			});
		});
	}

	Effect::new(move |_| {
		let map = data.get();
		context.update_value(|c| c.simulation.set_data(&map));
	});

	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	Effect::new(move |_| {
		if animate.borrow().is_some() {
			return;
		}
		let animate_inner = animate.clone();
		*animate.borrow_mut() = Some(Closure::new(move || {
			context.update_value(|c| {
				c.simulation.tick(FRAME_DT);
				views.set(c.layer.render(&c.simulation, time.get_untracked().as_ref()));
			});
			if let (Some(window), Some(cb)) = (web_sys::window(), animate_inner.borrow().as_ref()) {
				let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let (Some(window), Some(cb)) = (web_sys::window(), animate.borrow().as_ref()) {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let on_pointermove = move |ev: PointerEvent| {
		let Some((x, y)) = local_point(&ev) else {
			return;
		};
		context.update_value(|c| {
			c.layer.drag_move(ev.pointer_id(), x, y, &mut c.simulation);
		});
	};

	let on_pointerup = move |ev: PointerEvent| {
		context.update_value(|c| {
			c.layer.drag_end(ev.pointer_id(), &mut c.simulation);
		});
	};


	view! {
		<svg
			class="network-map"
			width=move || size.get().0.to_string()
			height=move || size.get().1.to_string()
			on:pointermove=on_pointermove
			on:pointerup=on_pointerup
			on:pointercancel=on_pointerup
			on:pointerleave=on_pointerup
			style="display: block; touch-action: none;"
		>
			<g class="nodes">
				<For
					each=move || views.get()
					key=|node| (node.handle, node.marker.is_star())
					children=move |node| node_marker(node, views, context)
				/>
			</g>
		</svg>
	}
}

fn node_marker(node: NodeView, views: RwSignal<Vec<NodeView>>, context: Context) -> AnyView {
	let handle = node.handle;
	let current = move |f: fn(&NodeView) -> String| {
		views.with(|vs| {
			vs.iter()
				.find(|v| v.handle == handle)
				.map(f)
				.unwrap_or_default()
		})
	};
	let transform = move || {
		current(|v| {
			format!(
				"translate({}, {})",
				v.x - MARKER_SIZE / 2.0,
				v.y - MARKER_SIZE / 2.0
			)
		})
	};
	let class = move || current(|v| v.class.clone());

	let on_mouseover = move |_: MouseEvent| context.with_value(|c| c.layer.mouse_over(handle, &c.simulation));
	let on_mouseout = move |_: MouseEvent| context.with_value(|c| c.layer.mouse_out(handle, &c.simulation));
	let on_dblclick = move |_: MouseEvent| context.with_value(|c| c.layer.dbl_click(handle, &c.simulation));
	let on_pointerdown = move |ev: PointerEvent| {
		ev.prevent_default();
		context.update_value(|c| {
			c.layer.drag_start(ev.pointer_id(), handle, &mut c.simulation);
		});
	};

	match node.marker {
		Marker::Star { points } => view! {
			<polygon
				class=class
				transform=transform
				points=points
				on:mouseover=on_mouseover
				on:mouseout=on_mouseout
				on:dblclick=on_dblclick
				on:pointerdown=on_pointerdown
			/>
		}
		.into_any(),
		Marker::Image { .. } => {
			let href = move || {
				current(|v| match &v.marker {
					Marker::Image { href } => href.clone(),
					Marker::Star { .. } => String::new(),
				})
			};
			let on_error = move |_| {
				context.update_value(|c| {
					c.layer.image_failed(handle);
				});
			};
			view! {
				<image
					class=class
					transform=transform
					href=href
					width=MARKER_SIZE.to_string()
					height=MARKER_SIZE.to_string()
					on:error=on_error
					on:mouseover=on_mouseover
					on:mouseout=on_mouseout
					on:dblclick=on_dblclick
					on:pointerdown=on_pointerdown
				/>
			}
			.into_any()
		}
	}
}

fn forward(callback: Callback<MapNode>) -> NodeHandler {
	Rc::new(move |node: &MapNode| callback.run(node.clone()))
}

/// Explicit size, or the window's inner size.
fn viewport_size(width: Option<f64>, height: Option<f64>) -> (f64, f64) {
	let window = web_sys::window();
	let inner = |f: fn(&Window) -> Result<JsValue, JsValue>| {
		window
			.as_ref()
			.and_then(|w| f(w).ok())
			.and_then(|v| v.as_f64())
	};
	(
		width.or_else(|| inner(Window::inner_width)).unwrap_or(800.0),
		height.or_else(|| inner(Window::inner_height)).unwrap_or(600.0),
	)
}

/// Pointer position relative to the element the listener is attached to.
fn local_point(ev: &PointerEvent) -> Option<(f64, f64)> {
	let surface: web_sys::Element = ev.current_target()?.dyn_into().ok()?;
	let rect = surface.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}
