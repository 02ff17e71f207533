//! Focus+context force-directed graph of goals, users and services.
//!
//! Renders an interactive graph on an HTML canvas with:
//! - A force simulation that switches between a centered context layout and
//!   a focus layout that pins and separates the selected nodes
//! - Click and modifier-click selection, Escape to clear, "S" held to reveal
//!   the second hop
//! - Node dragging, pan and zoom, hover tooltips
//! - Snapshot updates that fade out removed elements before rebuilding
//!
//! # Example
//!
//! ```ignore
//! use jtbd_graph::{ForceGraphCanvas, GraphData, GraphLink, GraphNode, LinkType, NodeKind};
//!
//! let data = GraphData {
//!     nodes: vec![
//!         GraphNode::new("u1", NodeKind::User, "Claims clerk"),
//!         GraphNode::new("g1", NodeKind::Goal, "File a claim"),
//!     ],
//!     links: vec![GraphLink::new("u1", "g1", LinkType::Does)],
//! };
//!
//! view! { <ForceGraphCanvas data=data fullscreen=true /> }
//! ```

mod component;
pub mod config;
mod controller;
mod geometry;
mod graph;
mod pipeline;
mod render;
mod scene;
mod selection;
mod simulation;
mod sizing;
mod state;
pub mod style;
mod tooltip;
mod types;

pub use component::ForceGraphCanvas;
pub use config::{ForceConfig, GraphConfig, InteractionConfig, TooltipConfig};
pub use geometry::{EdgePoints, NodeGeometry, Point, edge_points, node_radius};
pub use selection::{Selection, connected_node_ids, is_link_touching_selection, is_selected};
pub use sizing::{NodeSizes, bucketed_size};
pub use style::Theme;
pub use tooltip::describe;
pub use types::{Demand, GraphData, GraphLink, GraphNode, LinkType, NodeKind, ServiceStatus};
