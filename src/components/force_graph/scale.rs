//! Linear scales for edge encoding and the categorical node palette.

const COLORS: &[&str] = &[
	"#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
	"#bcbd22", "#17becf",
];

const LOW: (f64, f64, f64) = (255.0, 0.0, 0.0);
const HIGH: (f64, f64, f64) = (0.0, 0.0, 255.0);

/// Palette entry for a node group.
pub fn group_color(group: f64) -> &'static str {
	let slot = if group.is_finite() { group.abs() as usize } else { 0 };
	COLORS[slot % COLORS.len()]
}

/// Maps a numeric domain onto a numeric range. A degenerate domain maps
/// everything to the middle of the range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Linear {
	domain: (f64, f64),
	range: (f64, f64),
}

impl Linear {
	pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
		Self { domain, range }
	}

	fn normalize(&self, v: f64) -> f64 {
		let span = self.domain.1 - self.domain.0;
		if span == 0.0 || !span.is_finite() || !v.is_finite() {
			return 0.5;
		}
		(v - self.domain.0) / span
	}

	pub fn scale(&self, v: f64) -> f64 {
		self.range.0 + (self.range.1 - self.range.0) * self.normalize(v)
	}
}

/// Colour (red to blue) and stroke width (1 to 4) scales over the extent of
/// the edge similarities.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeScales {
	width: Linear,
	color: Linear,
}

impl EdgeScales {
	pub fn from_similarities(values: impl IntoIterator<Item = f64>) -> Self {
		let extent = values
			.into_iter()
			.filter(|v| v.is_finite())
			.fold(None, |acc: Option<(f64, f64)>, v| match acc {
				None => Some((v, v)),
				Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
			})
			.unwrap_or((0.0, 1.0));

		Self {
			width: Linear::new(extent, (1.0, 4.0)),
			color: Linear::new(extent, (0.0, 1.0)),
		}
	}

	pub fn width(&self, similarity: f64) -> f64 {
		self.width.scale(similarity).max(0.0)
	}

	pub fn color(&self, similarity: f64) -> String {
		let t = self.color.scale(similarity);
		let channel = |a: f64, b: f64| (a + (b - a) * t).round().clamp(0.0, 255.0) as u8;
		format!(
			"rgb({}, {}, {})",
			channel(LOW.0, HIGH.0),
			channel(LOW.1, HIGH.1),
			channel(LOW.2, HIGH.2)
		)
	}
}

impl Default for EdgeScales {
	fn default() -> Self {
		Self::from_similarities(std::iter::empty())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn extent_ends_map_to_range_ends() {
		let scales = EdgeScales::from_similarities([0.0, 0.5, 1.0]);
		assert_eq!(scales.width(0.0), 1.0);
		assert_eq!(scales.width(1.0), 4.0);
		assert_eq!(scales.color(0.0), "rgb(255, 0, 0)");
		assert_eq!(scales.color(1.0), "rgb(0, 0, 255)");
		assert_eq!(scales.color(0.5), "rgb(128, 0, 128)");
	}

	#[test]
	fn degenerate_domain_uses_midpoint() {
		let scales = EdgeScales::from_similarities([1.0, 1.0]);
		assert_eq!(scales.width(1.0), 2.5);
		assert_eq!(scales.color(1.0), "rgb(128, 0, 128)");
	}

	#[test]
	fn non_finite_input_never_leaks() {
		let scales = EdgeScales::from_similarities([f64::NAN, 0.5, 2.0]);
		assert!(scales.width(f64::NAN).is_finite());
		assert!(!scales.color(f64::INFINITY).contains("NaN"));
	}

	#[test]
	fn palette_wraps_around() {
		assert_eq!(group_color(1.0), group_color(11.0));
		assert_eq!(group_color(f64::NAN), COLORS[0]);
	}
}
