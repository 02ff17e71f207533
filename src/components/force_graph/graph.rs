//! Snapshot ingestion: sizes every node and resolves link endpoints to node
//! indices once, so nothing downstream looks ids up again.

use std::collections::{HashMap, HashSet};

use log::warn;

use super::geometry::node_radius;
use super::selection::{Selection, connected_node_ids, second_hop_ids};
use super::sizing::assign_sizes;
use super::types::{GraphData, GraphLink, GraphNode};

/// A link with its endpoints resolved against the node list.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedLink {
	pub link: GraphLink,
	/// `None` when the id doesn't name a node in the snapshot.
	pub source: Option<usize>,
	pub target: Option<usize>,
}

impl ResolvedLink {
	pub fn endpoints(&self) -> Option<(usize, usize)> {
		Some((self.source?, self.target?))
	}
}

/// Where a node stands relative to the current selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tier {
	Selected,
	/// One hop from a selected node.
	Connected,
	/// Exactly two hops from the selection.
	SecondHop,
	Context,
}

/// A snapshot ready for layout and drawing.
#[derive(Clone, Debug, Default)]
pub struct ResolvedGraph {
	pub nodes: Vec<GraphNode>,
	pub links: Vec<ResolvedLink>,
	pub radii: Vec<f64>,
	index: HashMap<String, usize>,
	raw_links: Vec<GraphLink>,
}

impl ResolvedGraph {
	pub fn from_data(data: &GraphData) -> Self {
		let mut nodes = Vec::with_capacity(data.nodes.len());
		let mut index = HashMap::with_capacity(data.nodes.len());
		for node in &data.nodes {
			if index.contains_key(&node.id) {
				warn!("jtbd-graph: duplicate node id {:?} ignored", node.id);
				continue;
			}
			index.insert(node.id.clone(), nodes.len());
			nodes.push(node.clone());
		}
		assign_sizes(&mut nodes);
		let radii = nodes.iter().map(node_radius).collect();

		let links: Vec<ResolvedLink> = data
			.links
			.iter()
			.map(|link| ResolvedLink {
				source: index.get(&link.source).copied(),
				target: index.get(&link.target).copied(),
				link: link.clone(),
			})
			.collect();
		let dangling = links.iter().filter(|l| l.endpoints().is_none()).count();
		if dangling > 0 {
			warn!("jtbd-graph: {} link(s) reference unknown nodes", dangling);
		}

		Self {
			nodes,
			radii,
			index,
			raw_links: data.links.clone(),
			links,
		}
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	#[cfg(test)]
	pub fn index_of(&self, id: &str) -> Option<usize> {
		self.index.get(id).copied()
	}

	pub fn contains(&self, id: &str) -> bool {
		self.index.contains_key(id)
	}

	/// Index pairs of every fully resolved link, in link order.
	pub fn edges(&self) -> Vec<(usize, usize)> {
		self.links.iter().filter_map(ResolvedLink::endpoints).collect()
	}

	/// Tier of every node, indexed like `nodes`.
	pub fn tiers(&self, selection: &Selection) -> Vec<Tier> {
		if selection.is_empty() {
			return vec![Tier::Context; self.nodes.len()];
		}
		let connected = connected_node_ids(&self.raw_links, selection.iter());
		let second: HashSet<String> = second_hop_ids(&self.raw_links, selection);
		self.nodes
			.iter()
			.map(|node| {
				if selection.contains(&node.id) {
					Tier::Selected
				} else if connected.contains(&node.id) {
					Tier::Connected
				} else if second.contains(&node.id) {
					Tier::SecondHop
				} else {
					Tier::Context
				}
			})
			.collect()
	}
}
