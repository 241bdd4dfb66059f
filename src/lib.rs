//! mesh-map: Interactive network map for radio mesh gateways.
//!
//! This crate provides a WASM-based map component that renders mesh devices
//! with physics-based layout, draggable nodes, per-model icons and offline
//! highlighting.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use serde::de::DeserializeOwned;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::Closure;
use web_sys::HtmlScriptElement;

pub mod components;

pub use components::network_map::{
	Device, DeviceType, MapConfig, MapData, MapDataError, MapNode, NetworkMap, TimeInfo,
};

/// Interval between updates of the current time, in milliseconds.
const CLOCK_INTERVAL_MS: i32 = 1000;

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("mesh-map: logging initialized");
}

/// Parse the JSON body of the `<script>` element with the given id.
fn read_script_json<T: DeserializeOwned>(id: &'static str) -> Result<T, MapDataError> {
	let element = web_sys::window()
		.and_then(|w| w.document())
		.and_then(|d| d.get_element_by_id(id))
		.ok_or(MapDataError::MissingElement(id))?;
	let script: HtmlScriptElement = element
		.dyn_into()
		.map_err(|_| MapDataError::NotAScript(id))?;
	let text = script.text().map_err(|_| MapDataError::Unreadable(id))?;
	Ok(serde_json::from_str(&text)?)
}

/// Load map data from a script element with id="map-data".
/// Expected format: JSON with { nodes: [...], links: [...] }
fn load_map_data() -> MapData {
	match read_script_json::<MapData>("map-data") {
		Ok(data) => {
			info!(
				"mesh-map: loaded {} devices, {} links",
				data.nodes.len(),
				data.links.len()
			);
			data
		}
		Err(e) => {
			warn!("mesh-map: failed to load map data: {}", e);
			MapData::default()
		}
	}
}

/// Optional layout overrides from a script element with id="map-config".
fn load_map_config() -> MapConfig {
	match read_script_json::<MapConfig>("map-config") {
		Ok(config) => config,
		Err(MapDataError::MissingElement(_)) => MapConfig::default(),
		Err(e) => {
			warn!("mesh-map: ignoring map config: {}", e);
			MapConfig::default()
		}
	}
}

/// Wall clock in seconds, the unit devices report `last_seen` in.
fn current_time() -> TimeInfo {
	TimeInfo {
		ts: (js_sys::Date::now() / 1000.0).floor(),
	}
}

/// Keep `time` at the current wall clock, refreshed every second.
fn start_clock(time: RwSignal<Option<TimeInfo>>) {
	let Some(window) = web_sys::window() else {
		return;
	};
	let tick = Closure::<dyn FnMut()>::new(move || time.set(Some(current_time())));
	let _ = window.set_interval_with_callback_and_timeout_and_arguments_0(
		tick.as_ref().unchecked_ref(),
		CLOCK_INTERVAL_MS,
	);
	tick.forget();
}

/// Main application component.
/// Loads map data from DOM and renders the network map.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let map_data = load_map_data();
	let data = Signal::derive(move || map_data.clone());
	let time = RwSignal::new(Some(current_time()));
	start_clock(time);

	let hovered = RwSignal::new(None::<String>);
	let on_mouse_over = Callback::new(move |node: MapNode| {
		hovered.set(Some(node.device.display_name().to_string()))
	});
	let on_mouse_out = Callback::new(move |_: MapNode| hovered.set(None));
	let on_dbl_click = Callback::new(move |node: MapNode| {
		info!(
			"mesh-map: {} ({}) at ({:.0}, {:.0})",
			node.device.display_name(),
			node.device.kind.as_str(),
			node.x(),
			node.y()
		)
	});

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Mesh Network Map" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="fullscreen-map">
			<NetworkMap
				data=data
				time=time
				config=load_map_config()
				on_mouse_over=on_mouse_over
				on_mouse_out=on_mouse_out
				on_dbl_click=on_dbl_click
			/>
			<div class="map-overlay">
				<h1>"Network map"</h1>
				<p class="subtitle">
					{move || hovered.get().unwrap_or_else(|| "Drag devices to rearrange them.".to_string())}
				</p>
			</div>
		</div>
	}
}
