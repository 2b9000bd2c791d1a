//! Biscuit Slicer entry point
//!
//! Handles platform-specific initialization and runs the frame loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Piece model shipped with the app; a page may override it with a
/// `<script id="biscuit-model" type="application/json">` element
const BUNDLED_MODEL: &str = include_str!("../assets/biscuit.json");

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, MouseEvent, TouchEvent};

    use biscuit_slicer::renderer::OverlayRenderState;
    use biscuit_slicer::sim::ImpactEvent;
    use biscuit_slicer::{App, Settings};

    /// App instance plus browser-side state
    struct Runner {
        app: App,
        render_state: Option<OverlayRenderState>,
        canvas: HtmlCanvasElement,
        /// Last CSS filter written to the canvas
        filter: String,
        last_time: f64,
    }

    impl Runner {
        fn frame(&mut self, time: f64) {
            let dt = if self.last_time > 0.0 {
                ((time - self.last_time) / 1000.0) as f32
            } else {
                0.0
            };
            self.last_time = time;

            self.app.frame(dt);
            for event in self.app.drain_events() {
                match event {
                    ImpactEvent::Explode { hit_count, .. } => {
                        log::info!("Biscuit exploded after {hit_count} hits");
                    }
                    other => log::debug!("Impact event: {other:?}"),
                }
            }
            self.apply_post_fx();
            self.render();
        }

        /// Blur and rgb-shift as a CSS filter on the overlay canvas
        fn apply_post_fx(&mut self) {
            let filter = self.app.post_fx().css_filter();
            if filter == self.filter {
                return;
            }
            if let Err(e) = self.canvas.style().set_property("filter", &filter) {
                log::warn!("Failed to set canvas filter: {e:?}");
            }
            self.filter = filter;
        }

        fn render(&mut self) {
            let ribbon = self.app.slicer().mesh().visible_vertices().to_vec();
            let lines = self.app.debug_lines();
            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&ribbon, &lines) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        render_state.resize(render_state.size.0, render_state.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }
    }

    fn model_json(document: &web_sys::Document) -> String {
        document
            .get_element_by_id("biscuit-model")
            .and_then(|el| el.text_content())
            .unwrap_or_else(|| super::BUNDLED_MODEL.to_string())
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("Failed to init logger: {e}").into());
        }

        log::info!("Biscuit Slicer starting...");

        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            log::error!("No document");
            return;
        };
        let Some(canvas) = document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        else {
            log::error!("No #canvas element");
            return;
        };

        let dpr = window.device_pixel_ratio();
        let client_w = canvas.client_width();
        let client_h = canvas.client_height();
        let width = (client_w as f64 * dpr) as u32;
        let height = (client_h as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let seed = js_sys::Date::now() as u64;
        let settings = Settings::load();
        // Write back so clamped values and new fields are persisted
        settings.save();
        let app = App::new(
            settings,
            client_w as f32,
            client_h as f32,
            seed,
            &model_json(&document),
        );
        let runner = Rc::new(RefCell::new(Runner {
            app,
            render_state: None,
            canvas: canvas.clone(),
            filter: "none".to_string(),
            last_time: 0.0,
        }));

        log::info!("App initialized with seed: {}", seed);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });

        match instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone())) {
            Ok(surface) => {
                match instance
                    .request_adapter(&wgpu::RequestAdapterOptions {
                        power_preference: wgpu::PowerPreference::HighPerformance,
                        compatible_surface: Some(&surface),
                        force_fallback_adapter: false,
                    })
                    .await
                {
                    Ok(adapter) => {
                        log::info!("Using adapter: {:?}", adapter.get_info().name);
                        match OverlayRenderState::new(surface, &adapter, width, height).await {
                            Ok(state) => runner.borrow_mut().render_state = Some(state),
                            Err(e) => log::error!("Failed to create device: {e}"),
                        }
                    }
                    Err(e) => log::error!("Failed to get adapter: {e}"),
                }
            }
            Err(e) => log::error!("Failed to create surface: {e}"),
        }

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        setup_input_handlers(&canvas, runner.clone());
        setup_resize_handler(&canvas, runner.clone());

        request_animation_frame(runner);

        log::info!("Biscuit Slicer running!");
    }

    /// Pointer position relative to the canvas
    fn touch_position(canvas: &HtmlCanvasElement, event: &TouchEvent) -> Option<(f32, f32)> {
        let touch = event.touches().get(0)?;
        let rect = canvas.get_bounding_client_rect();
        Some((
            touch.client_x() as f32 - rect.left() as f32,
            touch.client_y() as f32 - rect.top() as f32,
        ))
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, runner: Rc<RefCell<Runner>>) {
        // Mouse down
        {
            let runner = runner.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                runner
                    .borrow_mut()
                    .app
                    .pointer_down(event.offset_x() as f32, event.offset_y() as f32);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse move
        {
            let runner = runner.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                runner
                    .borrow_mut()
                    .app
                    .pointer_move(event.offset_x() as f32, event.offset_y() as f32);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse up anywhere ends the gesture
        if let Some(window) = web_sys::window() {
            let runner = runner.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                runner.borrow_mut().app.pointer_up();
            });
            let _ = window
                .add_event_listener_with_callback("mouseup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch start
        {
            let runner = runner.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some((x, y)) = touch_position(&canvas_clone, &event) {
                    runner.borrow_mut().app.pointer_down(x, y);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch move
        {
            let runner = runner.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some((x, y)) = touch_position(&canvas_clone, &event) {
                    runner.borrow_mut().app.pointer_move(x, y);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch end
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                runner.borrow_mut().app.pointer_up();
            });
            let _ = canvas
                .add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize_handler(canvas: &HtmlCanvasElement, runner: Rc<RefCell<Runner>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let canvas = canvas.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let Some(window) = web_sys::window() else {
                return;
            };
            let dpr = window.device_pixel_ratio();
            let client_w = canvas.client_width();
            let client_h = canvas.client_height();
            let width = (client_w as f64 * dpr) as u32;
            let height = (client_h as f64 * dpr) as u32;
            canvas.set_width(width);
            canvas.set_height(height);

            let mut r = runner.borrow_mut();
            r.app.resize(client_w as f32, client_h as f32);
            if let Some(ref mut render_state) = r.render_state {
                render_state.resize(width, height);
            }
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(runner: Rc<RefCell<Runner>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            runner.borrow_mut().frame(time);
            request_animation_frame(runner);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_app::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Biscuit Slicer (native) starting...");
    log::info!("Native mode runs a scripted slicing session - serve the wasm build for the interactive version");

    run_scripted_session();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Swipe across the biscuit until it explodes
#[cfg(not(target_arch = "wasm32"))]
fn run_scripted_session() {
    use biscuit_slicer::sim::ImpactEvent;
    use biscuit_slicer::{App, Settings};

    const WIDTH: f32 = 1280.0;
    const HEIGHT: f32 = 720.0;
    const DT: f32 = 1.0 / 60.0;
    const MAX_GESTURES: usize = 40;

    let seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    let mut app = App::new(Settings::load(), WIDTH, HEIGHT, seed, BUNDLED_MODEL);
    let thresholds = app.resolver().thresholds();
    println!(
        "Seed {seed}: {} bounces, {} breaks before the explosion",
        thresholds.hits, thresholds.break_hits
    );

    for gesture in 1..=MAX_GESTURES {
        // Let the biscuit land and the previous blade fade
        for _ in 0..120 {
            app.frame(DT);
        }

        let center = app.biscuit().transform(app.world()).position;
        let Some(ndc) = app.camera().project(center) else {
            break;
        };
        let x = (ndc.x + 1.0) * 0.5 * WIDTH;
        let y = (1.0 - ndc.y) * 0.5 * HEIGHT;

        app.pointer_down(x - 200.0, y);
        for step in 1..=6 {
            app.pointer_move(x - 200.0 + step as f32 * 70.0, y);
            app.frame(DT);
        }
        app.pointer_up();

        for event in app.drain_events() {
            match event {
                ImpactEvent::Break { piece } => println!("  gesture {gesture}: piece {piece} broke off"),
                ImpactEvent::PhaseChanged(phase) => println!("  gesture {gesture}: phase {phase:?}"),
                ImpactEvent::Explode { hit_count, .. } => {
                    println!("  gesture {gesture}: exploded after {hit_count} hits")
                }
                _ => {}
            }
        }

        if app.resolver().is_biscuit_exploded() {
            println!("✓ Biscuit exploded after {gesture} gestures");
            return;
        }
    }

    println!("Biscuit survived {MAX_GESTURES} gestures ({} hits)", app.resolver().hit_count());
}
