//! Selection set and neighborhood queries.
//!
//! Links are treated as undirected for connectivity: a node is "connected"
//! when any link joins it to a selected node.

use std::collections::{BTreeSet, HashSet};

use super::types::GraphLink;

/// The set of selected node ids. Iterates in sorted order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
	ids: BTreeSet<String>,
}

impl Selection {
	/// An empty selection.
	pub fn new() -> Self {
		Self::default()
	}

	/// A selection holding exactly `ids`.
	pub fn from_ids<I, S>(ids: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			ids: ids.into_iter().map(Into::into).collect(),
		}
	}

	/// Applies a click on `id`. Returns whether the selection changed.
	///
	/// Without a modifier the click selects only `id`, or clears the
	/// selection when `id` is already the sole selected node. With a modifier
	/// it toggles `id` and leaves the rest alone.
	pub fn click(&mut self, id: &str, modifier: bool) -> bool {
		if modifier {
			if !self.ids.remove(id) {
				self.ids.insert(id.to_string());
			}
			return true;
		}
		if self.ids.len() == 1 && self.ids.contains(id) {
			self.ids.clear();
		} else {
			self.ids.clear();
			self.ids.insert(id.to_string());
		}
		true
	}

	/// Empties the selection. Returns whether anything was selected.
	pub fn clear(&mut self) -> bool {
		let had_any = !self.ids.is_empty();
		self.ids.clear();
		had_any
	}

	/// Drops ids for which `keep` is false. Returns whether any were dropped.
	pub fn retain(&mut self, keep: impl Fn(&str) -> bool) -> bool {
		let before = self.ids.len();
		self.ids.retain(|id| keep(id));
		self.ids.len() != before
	}

	/// Whether `id` is selected.
	pub fn contains(&self, id: &str) -> bool {
		self.ids.contains(id)
	}

	/// Whether nothing is selected.
	pub fn is_empty(&self) -> bool {
		self.ids.is_empty()
	}

	/// Number of selected ids.
	pub fn len(&self) -> usize {
		self.ids.len()
	}

	/// Selected ids in sorted order.
	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.ids.iter().map(String::as_str)
	}

	/// Selected ids as an owned, sorted list for callbacks.
	pub fn to_vec(&self) -> Vec<String> {
		self.ids.iter().cloned().collect()
	}
}

/// Whether `id` is in `selection`.
pub fn is_selected(id: &str, selection: &Selection) -> bool {
	selection.contains(id)
}

/// Whether either end of `link` is selected.
pub fn is_link_touching_selection(link: &GraphLink, selection: &Selection) -> bool {
	selection.contains(&link.source) || selection.contains(&link.target)
}

/// The selected ids plus every id one link away from any of them.
pub fn connected_node_ids<'a, I>(links: &[GraphLink], selected: I) -> HashSet<String>
where
	I: IntoIterator<Item = &'a str>,
{
	let mut out: HashSet<String> = selected.into_iter().map(str::to_string).collect();
	let seeds = out.clone();
	for link in links {
		if seeds.contains(&link.source) {
			out.insert(link.target.clone());
		}
		if seeds.contains(&link.target) {
			out.insert(link.source.clone());
		}
	}
	out
}

/// Nodes exactly two hops from the selection.
pub fn second_hop_ids(links: &[GraphLink], selection: &Selection) -> HashSet<String> {
	let first = connected_node_ids(links, selection.iter());
	let second = connected_node_ids(links, first.iter().map(String::as_str));
	second.difference(&first).cloned().collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::types::LinkType;
	use proptest::prelude::*;

	fn chain() -> Vec<GraphLink> {
		vec![
			GraphLink::new("a", "b", LinkType::Does),
			GraphLink::new("b", "c", LinkType::DependsOn),
			GraphLink::new("c", "d", LinkType::Reads),
			GraphLink::new("e", "a", LinkType::Does),
		]
	}

	#[test]
	fn click_semantics() {
		let mut sel = Selection::new();
		sel.click("A", false);
		assert_eq!(sel.to_vec(), ["A"]);
		sel.click("A", false);
		assert!(sel.is_empty());

		sel.click("A", false);
		sel.click("B", true);
		assert_eq!(sel.to_vec(), ["A", "B"]);
		sel.click("A", true);
		assert_eq!(sel.to_vec(), ["B"]);
	}

	#[test]
	fn plain_click_replaces_multi_selection() {
		let mut sel = Selection::from_ids(["A", "B"]);
		sel.click("A", false);
		assert_eq!(sel.to_vec(), ["A"]);
		sel.click("C", false);
		assert_eq!(sel.to_vec(), ["C"]);
	}

	#[test]
	fn clear_reports_change() {
		let mut sel = Selection::from_ids(["x"]);
		assert!(sel.clear());
		assert!(!sel.clear());
	}

	#[test]
	fn one_hop_is_directionless() {
		let links = chain();
		let got = connected_node_ids(&links, ["a"]);
		let want: HashSet<String> = ["a", "b", "e"].into_iter().map(String::from).collect();
		assert_eq!(got, want);
	}

	#[test]
	fn second_hop_excludes_first() {
		let links = chain();
		let sel = Selection::from_ids(["a"]);
		let got = second_hop_ids(&links, &sel);
		assert_eq!(got, HashSet::from(["c".to_string()]));
	}

	#[test]
	fn link_touching() {
		let sel = Selection::from_ids(["c"]);
		let links = chain();
		let touching: Vec<bool> = links
			.iter()
			.map(|l| is_link_touching_selection(l, &sel))
			.collect();
		assert_eq!(touching, [false, true, true, false]);
		assert!(is_selected("c", &sel));
	}

	fn arb_links() -> impl Strategy<Value = Vec<GraphLink>> {
		prop::collection::vec((0u8..12, 0u8..12), 0..30).prop_map(|pairs| {
			pairs
				.into_iter()
				.map(|(s, t)| GraphLink::new(s.to_string(), t.to_string(), LinkType::Does))
				.collect()
		})
	}

	proptest! {
		#[test]
		fn neighborhood_contains_selection_and_grows(
			links in arb_links(),
			picked in prop::collection::btree_set(0u8..12, 0..5),
		) {
			let sel = Selection::from_ids(picked.iter().map(|n| n.to_string()));
			let once = connected_node_ids(&links, sel.iter());
			for id in sel.iter() {
				prop_assert!(once.contains(id));
			}
			let twice = connected_node_ids(&links, once.iter().map(String::as_str));
			prop_assert!(twice.is_superset(&once));
		}
	}
}
