//! Star polygon geometry for the coordinator marker.

use std::f64::consts::PI;
use std::fmt::Write;

/// Centre of the marker's local coordinate space (markers are 30x30).
pub const MARKER_CENTER: Point = Point { x: 15.0, y: 15.0 };

/// Rotation added to every vertex angle. Applied as-is in radians.
const ANGLE_OFFSET: f64 = 60.0;

/// A vertex in marker space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
	/// Horizontal coordinate.
	pub x: f64,
	/// Vertical coordinate, growing downwards.
	pub y: f64,
}

/// Vertices of a star with `arms` outer tips, alternating outer and inner radius.
///
/// Returns `2 * arms` points. Zero arms yields no points; equal radii yield a
/// regular polygon.
pub fn star_points(center: Point, arms: usize, inner_radius: f64, outer_radius: f64) -> Vec<Point> {
	let step = PI / arms as f64;
	(0..arms * 2)
		.map(|i| {
			let r = if i % 2 == 0 { outer_radius } else { inner_radius };
			let angle = i as f64 * step + ANGLE_OFFSET;
			Point {
				x: center.x + angle.cos() * r,
				y: center.y + angle.sin() * r,
			}
		})
		.collect()
}

/// Formats points for an SVG `points` attribute: `"x, y "` per vertex.
pub fn format_points(points: &[Point]) -> String {
	let mut out = String::with_capacity(points.len() * 24);
	for p in points {
		let _ = write!(out, "{}, {} ", p.x, p.y);
	}
	out
}

/// `points` attribute of a star centred in marker space.
pub fn star_shape(arms: usize, inner_radius: f64, outer_radius: f64) -> String {
	format_points(&star_points(MARKER_CENTER, arms, inner_radius, outer_radius))
}
