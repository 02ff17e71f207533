//! jtbd-graph: Interactive focus+context graph of goals, users and services.
//!
//! This crate provides a WASM-based graph visualization component that lays
//! out a jobs-to-be-done graph with a force simulation, lets the user select
//! nodes to bring their neighborhood into focus, and reports the selection
//! back to the host page.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use serde::de::DeserializeOwned;
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;

pub use components::force_graph::{
	ForceGraphCanvas, GraphConfig, GraphData, GraphLink, GraphNode, LinkType, NodeKind,
};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("jtbd-graph: logging initialized");
}

/// Text of the script element with the given id, if there is one.
fn script_text(id: &str) -> Option<String> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id(id)?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	script.text().ok()
}

fn parse_json<T: DeserializeOwned>(what: &str, json_text: &str) -> Option<T> {
	match serde_json::from_str::<T>(json_text) {
		Ok(value) => Some(value),
		Err(e) => {
			warn!("jtbd-graph: failed to parse {}: {}", what, e);
			None
		}
	}
}

/// Load graph data from a script element with id="graph-data".
/// Expected format: JSON with { nodes: [...], links: [...] }
fn load_graph_data() -> Option<GraphData> {
	let data: GraphData = parse_json("graph data", &script_text("graph-data")?)?;
	info!(
		"jtbd-graph: loaded {} nodes, {} links",
		data.nodes.len(),
		data.links.len()
	);
	Some(data)
}

/// Load tuning overrides from a script element with id="graph-config".
/// Any field left out keeps its default.
fn load_graph_config() -> GraphConfig {
	script_text("graph-config")
		.and_then(|text| parse_json("graph config", &text))
		.unwrap_or_default()
}

/// Main application component.
/// Loads graph data and config from the DOM and renders the visualization.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let graph_data = load_graph_data().unwrap_or_default();
	let graph_signal = Signal::derive(move || graph_data.clone());
	let config = load_graph_config();
	let (selected, set_selected) = signal(Vec::<String>::new());

	let on_selection_change = Callback::new(move |(ids, modifier): (Vec<String>, bool)| {
		info!("jtbd-graph: host saw selection {:?} (modifier: {})", ids, modifier);
		set_selected.set(ids);
	});

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Jobs To Be Done" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="fullscreen-graph">
			<ForceGraphCanvas
				data=graph_signal
				config=config
				fullscreen=true
				on_selection_change=on_selection_change
			/>
			<div class="graph-overlay">
				<h1>"Jobs To Be Done"</h1>
				<p class="subtitle">
					"Click to focus, Ctrl-click to add. Hold S to reveal the next hop. Esc clears."
				</p>
				<p class="selection">
					{move || {
						let ids = selected.get();
						if ids.is_empty() { "Nothing selected".to_string() } else { ids.join(", ") }
					}}
				</p>
			</div>
		</div>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn bad_json_is_absorbed() {
		assert!(parse_json::<GraphData>("graph data", "{not json").is_none());
	}

	#[test]
	fn snapshot_json_shape() {
		let data: GraphData = parse_json(
			"graph data",
			r#"{"nodes":[{"id":"g1","label":"Goal","name":"File claim","npsScore":12}],
			"links":[{"source":"u1","target":"g1","type":"DOES"}]}"#,
		)
		.unwrap();
		assert_eq!(data.nodes[0].kind, NodeKind::Goal);
		assert_eq!(data.nodes[0].nps_score, Some(12.0));
		assert_eq!(data.links[0].link_type, LinkType::Does);
	}
}
