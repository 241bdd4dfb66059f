//! Device and map data structures fed into the network map.

use serde::Deserialize;

use super::error::MapDataError;

/// Role of a device in the mesh.
///
/// The set is open: roles the map does not know about are kept verbatim in
/// [`DeviceType::Other`] and still get their own CSS class.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum DeviceType {
	/// The network coordinator. Drawn as a star instead of an icon.
	Coordinator,
	/// Routes traffic for other devices.
	Router,
	/// Leaf device, usually battery powered.
	EndDevice,
	/// Any role reported under another name.
	Other(String),
}

impl DeviceType {
	/// Name as sent by the gateway. Also used as the CSS class.
	pub fn as_str(&self) -> &str {
		match self {
			DeviceType::Coordinator => "Coordinator",
			DeviceType::Router => "Router",
			DeviceType::EndDevice => "EndDevice",
			DeviceType::Other(name) => name,
		}
	}
}

impl From<String> for DeviceType {
	fn from(value: String) -> Self {
		match value.as_str() {
			"Coordinator" => DeviceType::Coordinator,
			"Router" => DeviceType::Router,
			"EndDevice" => DeviceType::EndDevice,
			_ => DeviceType::Other(value),
		}
	}
}

/// A physical radio device as reported by the gateway.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Device {
	/// IEEE address. Stable identity of the device across updates.
	#[serde(rename = "ieeeAddr")]
	pub ieee_addr: String,
	/// Name given by the user, if any.
	#[serde(default)]
	pub friendly_name: Option<String>,
	/// Role in the mesh.
	#[serde(rename = "type")]
	pub kind: DeviceType,
	/// Model identifier, used to pick the device icon.
	#[serde(rename = "ModelId", default)]
	pub model_id: Option<String>,
	/// Last time the device was heard from, in seconds, as sent by the device clock.
	#[serde(default)]
	pub last_seen: Option<String>,
}

impl Device {
	/// Name shown to the user: friendly name if set, address otherwise.
	pub fn display_name(&self) -> &str {
		self.friendly_name.as_deref().unwrap_or(&self.ieee_addr)
	}
}

/// A radio link between two devices, by IEEE address.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct LinkData {
	/// Address of one end.
	pub source: String,
	/// Address of the other end.
	pub target: String,
}

/// Complete map input: devices and links.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct MapData {
	/// Devices, in render order.
	#[serde(default)]
	pub nodes: Vec<Device>,
	/// Links between devices. Links naming unknown devices are ignored.
	#[serde(default)]
	pub links: Vec<LinkData>,
}

impl MapData {
	/// Parse the gateway's JSON map.
	pub fn from_json(text: &str) -> Result<Self, MapDataError> {
		Ok(serde_json::from_str(text)?)
	}
}

/// Snapshot of "now", in the same unit as [`Device::last_seen`] (seconds).
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct TimeInfo {
	/// Seconds.
	pub ts: f64,
}
