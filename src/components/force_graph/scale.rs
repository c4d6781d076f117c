//! Ordinal color assignment for nodes without an explicit kind class.

use std::collections::HashMap;

const PALETTE: &[&str] = &[
	"#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
	"#bcbd22", "#17becf",
];

/// Maps arbitrary keys to stable palette colors, first come first served.
#[derive(Debug, Default)]
pub struct OrdinalScale {
	assigned: HashMap<String, usize>,
}

impl OrdinalScale {
	/// An empty scale; no colors assigned yet.
	pub fn new() -> Self {
		Self::default()
	}

	/// Color for `key`, assigning the next palette slot on first sight.
	pub fn color(&mut self, key: &str) -> &'static str {
		let next = self.assigned.len();
		let slot = *self.assigned.entry(key.to_owned()).or_insert(next);
		PALETTE[slot % PALETTE.len()]
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn same_key_always_gets_the_same_color() {
		let mut scale = OrdinalScale::new();
		let first = scale.color("tweet");
		scale.color("hashtag");
		assert_eq!(scale.color("tweet"), first);
	}

	#[test]
	fn distinct_keys_get_distinct_colors_until_the_palette_wraps() {
		let mut scale = OrdinalScale::new();
		let a = scale.color("0");
		let b = scale.color("1");
		assert_ne!(a, b);
		// Eleventh key wraps around to the first color.
		for key in 2..10 {
			scale.color(&key.to_string());
		}
		assert_eq!(scale.color("10"), a);
	}
}
