//! Graph data structures for input to the force graph component.
//!
//! Nodes arrive with their derived metrics (complexity, importance,
//! dependants, NPS) already computed by the data layer. Unknown node kinds,
//! link types and demand levels deserialize to a catch-all variant instead of
//! failing the whole snapshot.

use std::fmt;

use serde::{Deserialize, Deserializer};

/// The closed set of node types in the domain model.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
pub enum NodeKind {
	/// A goal / job-to-be-done.
	Goal,
	/// A user persona performing goals.
	User,
	/// A service that goals depend on.
	Service,
	/// Anything else. Rendered with default geometry.
	#[default]
	#[serde(other)]
	Unknown,
}

impl NodeKind {
	/// Display name used in tooltips.
	pub fn as_str(self) -> &'static str {
		match self {
			NodeKind::Goal => "Goal",
			NodeKind::User => "User",
			NodeKind::Service => "Service",
			NodeKind::Unknown => "Unknown",
		}
	}
}

/// Delivery status of a service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
	/// Live.
	Active,
	/// Being built; gets a badge.
	InDevelopment,
	/// Committed to but not started.
	Planned,
	/// Talked about only.
	Vapour,
	/// Unrecognized status string.
	#[serde(other)]
	Unknown,
}

impl ServiceStatus {
	/// Wire name, as shown in tooltips.
	pub fn as_str(self) -> &'static str {
		match self {
			ServiceStatus::Active => "active",
			ServiceStatus::InDevelopment => "in_development",
			ServiceStatus::Planned => "planned",
			ServiceStatus::Vapour => "vapour",
			ServiceStatus::Unknown => "unknown",
		}
	}
}

/// Relationship type carried by a link.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LinkType {
	/// User performs goal.
	Does,
	/// Goal needs service.
	DependsOn,
	/// Service reads from service.
	Reads,
	/// Service writes to service.
	Writes,
	/// Service updates service.
	Updates,
	/// Unrecognized type string.
	#[default]
	#[serde(other)]
	Other,
}

impl LinkType {
	/// Wire name.
	pub fn as_str(self) -> &'static str {
		match self {
			LinkType::Does => "DOES",
			LinkType::DependsOn => "DEPENDS_ON",
			LinkType::Reads => "READS",
			LinkType::Writes => "WRITES",
			LinkType::Updates => "UPDATES",
			LinkType::Other => "OTHER",
		}
	}
}

/// Demand level attached to a `DOES` link.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Demand {
	/// Needed often.
	High,
	/// Needed sometimes.
	Med,
	/// Needed rarely.
	Low,
	/// Recorded as not needed.
	None,
	/// Unrecognized demand string.
	#[serde(other)]
	Unknown,
}

/// A node in the graph.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
	/// Unique identifier for this node. Used to reference nodes in links.
	pub id: String,
	/// Node type. Serialized as `label` by the data layer.
	#[serde(rename = "label", default)]
	pub kind: NodeKind,
	/// Display name.
	#[serde(default)]
	pub name: String,
	/// Goal: derived from its dependency count.
	#[serde(default)]
	pub complexity: Option<f64>,
	/// Goal/User: net promoter score in [-100, 100].
	#[serde(default)]
	pub nps_score: Option<f64>,
	/// Service: number of goals depending on it.
	#[serde(default)]
	pub dependants: Option<f64>,
	/// Service: delivery status.
	#[serde(default)]
	pub status: Option<ServiceStatus>,
	/// User: number of distinct goals performed.
	#[serde(default)]
	pub importance: Option<f64>,
	/// Bucketed visual radius. Filled in at ingestion; a supplied value wins.
	#[serde(default)]
	pub size: Option<f64>,
}

impl GraphNode {
	/// A node with no metrics.
	pub fn new(id: impl Into<String>, kind: NodeKind, name: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			kind,
			name: name.into(),
			..Default::default()
		}
	}

	/// The raw metric this node's size is derived from.
	pub fn size_metric(&self) -> Option<f64> {
		match self.kind {
			NodeKind::Goal => self.complexity,
			NodeKind::User => self.importance,
			NodeKind::Service => self.dependants,
			NodeKind::Unknown => None,
		}
	}
}

/// A link endpoint as the data layer sends it: a bare id, or a node object
/// carrying one.
#[derive(Deserialize)]
#[serde(untagged)]
enum Endpoint {
	Id(String),
	Node { id: String },
}

fn endpoint_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
	D: Deserializer<'de>,
{
	Ok(match Endpoint::deserialize(deserializer)? {
		Endpoint::Id(id) | Endpoint::Node { id } => id,
	})
}

/// A directed edge between two nodes, referencing them by id.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct GraphLink {
	/// Source node ID. Also accepted as `{ "id": .. }`.
	#[serde(deserialize_with = "endpoint_id")]
	pub source: String,
	/// Target node ID. Also accepted as `{ "id": .. }`.
	#[serde(deserialize_with = "endpoint_id")]
	pub target: String,
	/// Relationship type.
	#[serde(rename = "type", default)]
	pub link_type: LinkType,
	/// `DOES`: the user's NPS for the goal.
	#[serde(default)]
	pub nps: Option<f64>,
	/// `DOES`: how much the user needs the goal.
	#[serde(default)]
	pub demand: Option<Demand>,
}

impl GraphLink {
	/// A link with no NPS or demand attached.
	pub fn new(source: impl Into<String>, target: impl Into<String>, link_type: LinkType) -> Self {
		Self {
			source: source.into(),
			target: target.into(),
			link_type,
			nps: None,
			demand: None,
		}
	}

	/// Identity key used to diff snapshots.
	pub fn key(&self) -> LinkKey {
		LinkKey {
			source: self.source.clone(),
			target: self.target.clone(),
			link_type: self.link_type,
		}
	}

	/// Whether either end is `id`.
	pub fn touches(&self, id: &str) -> bool {
		self.source == id || self.target == id
	}
}

/// `source-target-type` composite identity of a link.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LinkKey {
	/// Source node ID.
	pub source: String,
	/// Target node ID.
	pub target: String,
	/// Relationship type.
	pub link_type: LinkType,
}

impl fmt::Display for LinkKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}-{}-{}", self.source, self.target, self.link_type.as_str())
	}
}

/// Complete graph data: nodes and links.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct GraphData {
	/// All nodes, in draw order.
	#[serde(default)]
	pub nodes: Vec<GraphNode>,
	/// Links may name ids missing from `nodes`; those are kept but not drawn.
	#[serde(default)]
	pub links: Vec<GraphLink>,
}

impl GraphData {
	/// A snapshot without nodes has nothing to draw.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}
}
