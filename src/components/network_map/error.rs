//! Errors raised while loading map input from the page.

use thiserror::Error;

/// Failure to load map data or config embedded in the page.
#[derive(Debug, Error)]
pub enum MapDataError {
	/// No element carries the id.
	#[error("no element with id \"{0}\"")]
	MissingElement(&'static str),
	/// The element is not a `<script>`.
	#[error("element \"{0}\" is not a <script>")]
	NotAScript(&'static str),
	/// The element has no text.
	#[error("could not read text of \"{0}\"")]
	Unreadable(&'static str),
	/// The text is not valid JSON for the expected type.
	#[error("invalid map JSON: {0}")]
	Parse(#[from] serde_json::Error),
}
