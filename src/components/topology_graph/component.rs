//! Leptos component wrapping the topology canvas.
//!
//! The component creates an HTML canvas sized to its parent and wires mouse
//! handlers for dragging, unpinning and hover. An animation loop runs via
//! `requestAnimationFrame`, stepping the simulation and repainting each
//! frame. Parent resizes are observed and debounced before they reach the
//! simulation, and pinned positions are saved to `localStorage` when the page
//! is hidden.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use log::warn;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, ResizeObserver};

use super::config::DisplayConfig;
use super::persistence::LocalStorageLayoutStore;
use super::render;
use super::state::ZigzagGraph;
use super::types::TopologyData;

/// Quiesce window for container resizes.
const RESIZE_DEBOUNCE_MS: i32 = 250;

/// Longest frame step fed to the dim easing, in seconds.
const MAX_FRAME_DT: f64 = 0.1;

type SharedClosure = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

fn parent_size(canvas: &HtmlCanvasElement) -> (f64, f64) {
	canvas
		.parent_element()
		.map(|p| (p.client_width() as f64, p.client_height() as f64))
		.filter(|&(w, h)| w > 0.0 && h > 0.0)
		.unwrap_or((800.0, 600.0))
}

fn pointer_position(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

/// Renders an interactive Zigbee topology on a canvas element.
///
/// Pass topology data via the reactive `data` signal; every change replaces
/// the topology while keeping device positions and pins. The canvas fills its
/// parent container and follows it when it is resized.
#[component]
pub fn TopologyCanvas(
	/// Topology to show; every change is a refresh.
	#[prop(into)]
	data: Signal<TopologyData>,
	/// Display config; defaults when omitted.
	#[prop(optional)]
	config: Option<DisplayConfig>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let context: Rc<RefCell<Option<ZigzagGraph>>> = Rc::new(RefCell::new(None));
	let animate: SharedClosure = Rc::new(RefCell::new(None));
	let on_resize: SharedClosure = Rc::new(RefCell::new(None));
	let apply_resize: SharedClosure = Rc::new(RefCell::new(None));
	let on_pagehide: SharedClosure = Rc::new(RefCell::new(None));
	let observer: Rc<RefCell<Option<ResizeObserver>>> = Rc::new(RefCell::new(None));
	let (context_init, animate_init) = (context.clone(), animate.clone());

	Effect::new(move |_| {
		let topology = data.get();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if let Some(graph) = context_init.borrow_mut().as_mut() {
			graph.set_data(topology);
			return;
		}

		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};
		let (w, h) = parent_size(&canvas);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let ctx: CanvasRenderingContext2d = match canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into().ok())
		{
			Some(ctx) => ctx,
			None => {
				warn!("zigzag: canvas 2d context unavailable");
				return;
			}
		};

		let mut graph = ZigzagGraph::new(config.clone().unwrap_or_default(), w, h);
		graph.restore_layout(&LocalStorageLayoutStore::default());
		graph.set_data(topology);
		*context_init.borrow_mut() = Some(graph);

		// Debounced parent resize.
		let pending_timeout: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));
		let (context_resize, canvas_resize) = (context_init.clone(), canvas.clone());
		*apply_resize.borrow_mut() = Some(Closure::new(move || {
			let (nw, nh) = parent_size(&canvas_resize);
			canvas_resize.set_width(nw as u32);
			canvas_resize.set_height(nh as u32);
			if let Some(graph) = context_resize.borrow_mut().as_mut() {
				graph.resize(nw, nh);
			}
		}));
		let (apply_debounced, timeout_slot) = (apply_resize.clone(), pending_timeout.clone());
		*on_resize.borrow_mut() = Some(Closure::new(move || {
			let Some(win) = web_sys::window() else {
				return;
			};
			if let Some(handle) = timeout_slot.take() {
				win.clear_timeout_with_handle(handle);
			}
			if let Some(ref cb) = *apply_debounced.borrow() {
				if let Ok(handle) = win.set_timeout_with_callback_and_timeout_and_arguments_0(
					cb.as_ref().unchecked_ref(),
					RESIZE_DEBOUNCE_MS,
				) {
					timeout_slot.set(Some(handle));
				}
			}
		}));
		if let (Some(cb), Some(parent)) = (on_resize.borrow().as_ref(), canvas.parent_element()) {
			match ResizeObserver::new(cb.as_ref().unchecked_ref()) {
				Ok(ro) => {
					ro.observe(&parent);
					*observer.borrow_mut() = Some(ro);
				}
				Err(e) => warn!("zigzag: resize observer unavailable: {e:?}"),
			}
		}

		// Save pinned positions when the page goes away.
		let context_save = context_init.clone();
		*on_pagehide.borrow_mut() = Some(Closure::new(move || {
			if let Some(graph) = context_save.borrow().as_ref() {
				graph.save_layout(&LocalStorageLayoutStore::default());
			}
		}));
		if let Some(ref cb) = *on_pagehide.borrow() {
			let _ = window.add_event_listener_with_callback("pagehide", cb.as_ref().unchecked_ref());
		}

		let (context_anim, animate_inner) = (context_init.clone(), animate_init.clone());
		let mut last_frame = js_sys::Date::now();
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			let now = js_sys::Date::now();
			let dt = ((now - last_frame) / 1000.0).clamp(0.0, MAX_FRAME_DT);
			last_frame = now;
			if let Some(graph) = context_anim.borrow_mut().as_mut() {
				graph.step(dt);
				render::render(graph, &ctx);
			}
			if let (Some(cb), Some(win)) = (animate_inner.borrow().as_ref(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let context_md = context.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = pointer_position(canvas_ref, &ev) else {
			return;
		};
		if let Some(graph) = context_md.borrow_mut().as_mut() {
			graph.pointer_down(x, y);
		}
	};

	let context_mm = context.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = pointer_position(canvas_ref, &ev) else {
			return;
		};
		if let Some(graph) = context_mm.borrow_mut().as_mut() {
			graph.pointer_move(x, y);
		}
	};

	let context_mu = context.clone();
	let on_mouseup = move |_: MouseEvent| {
		if let Some(graph) = context_mu.borrow_mut().as_mut() {
			graph.pointer_up();
		}
	};

	let context_ml = context.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(graph) = context_ml.borrow_mut().as_mut() {
			graph.pointer_leave();
		}
	};

	let context_dc = context.clone();
	let on_dblclick = move |ev: MouseEvent| {
		let Some((x, y)) = pointer_position(canvas_ref, &ev) else {
			return;
		};
		if let Some(graph) = context_dc.borrow_mut().as_mut() {
			graph.double_click(x, y);
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="topology-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:dblclick=on_dblclick
			style="display: block; cursor: grab;"
		/>
	}
}
