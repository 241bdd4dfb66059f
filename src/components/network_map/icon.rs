//! Device icon resolution with a one-way fallback.

use std::rc::Rc;

use super::types::Device;

/// Placeholder shown when a device icon cannot be loaded.
pub const FALLBACK_ICON_URL: &str =
	"https://raw.githubusercontent.com/slsys/Gateway/master/devices/png/generic-zigbee-device.png";

const ICON_BASE_URL: &str = "https://raw.githubusercontent.com/slsys/Gateway/master/devices/png";

/// Pure function mapping a device to its icon URL.
pub type IconUrlFn = Rc<dyn Fn(&Device) -> String>;

/// Default icon URL generator: one png per model in the gateway device catalogue.
pub fn device_image_url(device: &Device) -> String {
	match device.model_id.as_deref().map(str::trim) {
		Some(model) if !model.is_empty() => {
			format!("{ICON_BASE_URL}/{}.png", model.replace(['/', ' '], "_"))
		}
		_ => FALLBACK_ICON_URL.to_string(),
	}
}

/// Icon of one mounted node marker.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum IconState {
	/// Not mounted yet; no URL resolved.
	#[default]
	Initializing,
	/// Mounted with the device's own icon URL.
	Ready(String),
	/// The image failed to load. Terminal: the original URL is never retried.
	Fallback,
}

impl IconState {
	/// Store the resolved URL. Only the first resolution counts.
	pub fn resolve(&mut self, url: String) {
		if *self == IconState::Initializing {
			*self = IconState::Ready(url);
		}
	}

	/// Switch to the fallback icon. Returns `false` if already there.
	pub fn fail(&mut self) -> bool {
		if *self == IconState::Fallback {
			return false;
		}
		*self = IconState::Fallback;
		true
	}

	/// URL to draw. Empty before the icon is resolved.
	pub fn url(&self) -> &str {
		match self {
			IconState::Initializing => "",
			IconState::Ready(url) => url,
			IconState::Fallback => FALLBACK_ICON_URL,
		}
	}
}
