//! Leptos component wrapping the force-directed graph canvas.
//!
//! The component creates an HTML canvas plus a tooltip element and wires up
//! mouse, wheel and keyboard handlers. An animation loop runs via
//! `requestAnimationFrame`, polling the render pipeline, stepping the
//! simulation and redrawing each frame. Selection changes are reported
//! through `on_selection_change` once the state borrow is released.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use leptos::prelude::*;
use log::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlElement, KeyboardEvent, MouseEvent, WheelEvent, Window};

use super::config::GraphConfig;
use super::geometry::Point;
use super::render::{self, IconCache};
use super::state::GraphState;
use super::style::Theme;
use super::types::GraphData;

/// Bundles graph state with what drawing needs.
struct GraphContext {
	state: GraphState,
	ctx: CanvasRenderingContext2d,
	theme: Theme,
	icons: IconCache,
}

type SharedContext = Rc<RefCell<Option<GraphContext>>>;
type SelectionCallback = Option<Callback<(Vec<String>, bool)>>;
type ResizeListener = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;
type KeyListeners = Rc<RefCell<Vec<(&'static str, Closure<dyn FnMut(KeyboardEvent)>)>>>;

fn now_ms() -> f64 {
	js_sys::Date::now()
}

fn window_size(window: &Window) -> (f64, f64) {
	(
		window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(800.0),
		window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(600.0),
	)
}

/// Pointer position relative to the canvas.
fn canvas_point(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<Point> {
	let canvas: HtmlCanvasElement = canvas_ref.get_untracked()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some(Point::new(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

fn set_cursor(canvas_ref: NodeRef<leptos::html::Canvas>, cursor: &str) {
	if let Some(canvas) = canvas_ref.get_untracked() {
		let canvas: HtmlCanvasElement = canvas.into();
		let _ = HtmlElement::style(&canvas).set_property("cursor", cursor);
	}
}

/// Hands queued selection events to the callback outside the state borrow.
fn flush_events(context: &SharedContext, on_selection_change: SelectionCallback) {
	let events = match context.borrow_mut().as_mut() {
		Some(c) => c.state.take_events(),
		None => return,
	};
	let Some(callback) = on_selection_change else {
		return;
	};
	for event in events {
		callback.run((event.ids, event.modifier));
	}
}

/// Removes the window listeners installed at mount.
fn detach_listeners(window: &Window, resize_cb: &ResizeListener, key_cbs: &KeyListeners) {
	if let Some(cb) = resize_cb.borrow_mut().take() {
		let _ = window.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
	}
	for (event, cb) in key_cbs.borrow_mut().drain(..) {
		let _ = window.remove_event_listener_with_callback(event, cb.as_ref().unchecked_ref());
	}
}

/// Renders an interactive focus+context graph of goals, users and services.
///
/// Pass graph data via the reactive `data` signal; each new snapshot fades
/// out removed elements and rebuilds after a short delay. The component sizes
/// itself to its parent container by default; set `fullscreen = true` to fill
/// the viewport and resize with the window. Explicit `width`/`height`
/// override automatic sizing.
#[component]
pub fn ForceGraphCanvas(
	#[prop(into)] data: Signal<GraphData>,
	#[prop(optional)] config: GraphConfig,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
	/// Called with the selected ids and whether the modifier was held.
	#[prop(optional)]
	on_selection_change: Option<Callback<(Vec<String>, bool)>>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let tooltip_ref = NodeRef::<leptos::html::Div>::new();
	let context: SharedContext = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: ResizeListener = Rc::new(RefCell::new(None));
	let key_cbs: KeyListeners = Rc::new(RefCell::new(Vec::new()));
	let (context_init, animate_init, resize_cb_init) =
		(context.clone(), animate.clone(), resize_cb.clone());

	// Cleanup must be Send, so it only lowers the flag; the next animation
	// frame does the teardown on the UI thread.
	let alive = Arc::new(AtomicBool::new(true));
	let alive_cleanup = alive.clone();
	on_cleanup(move || alive_cleanup.store(false, Ordering::Relaxed));

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = if fullscreen {
			window_size(&window)
		} else {
			(
				width.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_width() as f64)
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_height() as f64)
						.unwrap_or(600.0)
				}),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			warn!("jtbd-graph: canvas 2d context unavailable");
			return;
		};

		let mut state = GraphState::new(config.clone(), w, h);
		state.set_data(data.get_untracked(), now_ms());
		*context_init.borrow_mut() = Some(GraphContext {
			state,
			ctx,
			theme: Theme::default(),
			icons: IconCache::default(),
		});

		if fullscreen {
			let (context_resize, canvas_resize) = (context_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some(win) = web_sys::window() else {
					return;
				};
				let (nw, nh) = window_size(&win);
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut c) = *context_resize.borrow_mut() {
					c.state.resize(nw, nh);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		// Keys are global: the canvas never holds focus.
		let (context_kd, context_ku) = (context_init.clone(), context_init.clone());
		let on_keydown = Closure::<dyn FnMut(KeyboardEvent)>::new(move |ev: KeyboardEvent| {
			if let Some(ref mut c) = *context_kd.borrow_mut() {
				c.state.key_down(&ev.key());
			}
			flush_events(&context_kd, on_selection_change);
		});
		let on_keyup = Closure::<dyn FnMut(KeyboardEvent)>::new(move |ev: KeyboardEvent| {
			if let Some(ref mut c) = *context_ku.borrow_mut() {
				c.state.key_up(&ev.key());
			}
		});
		let _ = window.add_event_listener_with_callback("keydown", on_keydown.as_ref().unchecked_ref());
		let _ = window.add_event_listener_with_callback("keyup", on_keyup.as_ref().unchecked_ref());
		key_cbs
			.borrow_mut()
			.extend([("keydown", on_keydown), ("keyup", on_keyup)]);

		let tooltip: Option<HtmlElement> = tooltip_ref.get_untracked().map(Into::into);
		let (context_anim, animate_inner) = (context_init.clone(), animate_init.clone());
		let (alive_anim, resize_cb_anim, key_cbs_anim) = (alive.clone(), resize_cb_init.clone(), key_cbs.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if !alive_anim.load(Ordering::Relaxed) {
				if let Some(win) = web_sys::window() {
					detach_listeners(&win, &resize_cb_anim, &key_cbs_anim);
				}
				context_anim.borrow_mut().take();
				// wasm-bindgen frees a running closure once the call returns.
				animate_inner.borrow_mut().take();
				debug!("jtbd-graph: unmounted, animation loop stopped");
				return;
			}
			let now = now_ms();
			if let Some(ref mut c) = *context_anim.borrow_mut() {
				c.state.frame(now);
				render::render(&c.state, &c.ctx, &c.theme, &mut c.icons, now);
				if let Some(el) = &tooltip {
					c.state.tooltip.apply(el);
				}
			}
			flush_events(&context_anim, on_selection_change);
			if let (Some(win), Some(cb)) = (web_sys::window(), animate_inner.borrow().as_ref()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	// Later snapshots go through the pipeline's fade and delayed rebuild.
	let context_data = context.clone();
	Effect::new(move |prev: Option<()>| {
		let snapshot = data.get();
		if prev.is_none() {
			return;
		}
		if let Some(ref mut c) = *context_data.borrow_mut() {
			c.state.set_data(snapshot, now_ms());
		}
	});

	let context_md = context.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some(p) = canvas_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut c) = *context_md.borrow_mut() {
			c.state.pointer_down(p, ev.ctrl_key() || ev.meta_key());
			set_cursor(canvas_ref, c.state.cursor());
		}
	};

	let context_mm = context.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some(p) = canvas_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut c) = *context_mm.borrow_mut() {
			c.state.pointer_move(p, now_ms());
			set_cursor(canvas_ref, c.state.cursor());
		}
	};

	let context_mu = context.clone();
	let on_mouseup = move |_: MouseEvent| {
		if let Some(ref mut c) = *context_mu.borrow_mut() {
			c.state.pointer_up();
			set_cursor(canvas_ref, c.state.cursor());
		}
		flush_events(&context_mu, on_selection_change);
	};

	let context_ml = context.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut c) = *context_ml.borrow_mut() {
			c.state.pointer_leave(now_ms());
			set_cursor(canvas_ref, c.state.cursor());
		}
	};

	let context_wh = context.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some(p) = canvas_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut c) = *context_wh.borrow_mut() {
			c.state.wheel(p, ev.delta_y());
		}
	};

	view! {
		<div class="force-graph" style="position: relative;">
			<canvas
				node_ref=canvas_ref
				class="force-graph-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				style="display: block; cursor: grab;"
			/>
			<div
				node_ref=tooltip_ref
				class="force-graph-tooltip"
				style="position: absolute; pointer-events: none; opacity: 0; visibility: hidden;"
			/>
		</div>
	}
}
