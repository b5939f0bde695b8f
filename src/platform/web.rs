//! Browser bindings
//!
//! DOM listeners as an [`EventSource`], `requestAnimationFrame` as a
//! [`FrameClock`], a WebGPU-backed [`Surface`] and the JS-facing `mount`.

use std::rc::Rc;

use glam::Vec2;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    CanvasRenderingContext2d, EventTarget, HtmlCanvasElement, MouseEvent, TouchEvent, Window,
};

use super::input::HostEvent;
use super::subscription::{Disposer, EventSource, Listener};
use super::time::{FrameCallback, FrameClock, FrameHandle};
use crate::config::{EngineConfig, ScenePreset};
use crate::engine::Engine;
use crate::error::{EngineError, SurfaceError};
use crate::palette::Color;
use crate::renderer::{RenderState, ShapeBatch, Surface};

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn css_color(c: Color) -> String {
    format!(
        "rgba({}, {}, {}, {})",
        (c[0].clamp(0.0, 1.0) * 255.0).round() as u8,
        (c[1].clamp(0.0, 1.0) * 255.0).round() as u8,
        (c[2].clamp(0.0, 1.0) * 255.0).round() as u8,
        c[3].clamp(0.0, 1.0)
    )
}

/// Register `handler` on `target`; the disposer removes it again
fn listen(
    target: &EventTarget,
    kind: &'static str,
    handler: impl FnMut(web_sys::Event) + 'static,
) -> Disposer {
    let closure = Closure::<dyn FnMut(web_sys::Event)>::new(handler);
    if let Err(e) = target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())
    {
        log::warn!("addEventListener({}) failed: {:?}", kind, e);
    }
    let target = target.clone();
    Box::new(move || {
        let _ = target.remove_event_listener_with_callback(kind, closure.as_ref().unchecked_ref());
        drop(closure);
    })
}

/// Pointer, touch, resize and scroll events for one canvas
pub struct DomEvents {
    window: Window,
    canvas: HtmlCanvasElement,
}

impl DomEvents {
    pub fn new(window: Window, canvas: HtmlCanvasElement) -> Self {
        Self { window, canvas }
    }
}

/// Client coordinates relative to the canvas' top-left corner
fn local(canvas: &HtmlCanvasElement, client_x: i32, client_y: i32) -> (f32, f32) {
    let rect = canvas.get_bounding_client_rect();
    (
        client_x as f32 - rect.left() as f32,
        client_y as f32 - rect.top() as f32,
    )
}

fn first_touch(canvas: &HtmlCanvasElement, event: &TouchEvent) -> Option<(f32, f32)> {
    event
        .touches()
        .get(0)
        .map(|t| local(canvas, t.client_x(), t.client_y()))
}

impl EventSource for DomEvents {
    fn subscribe(&self, listener: Listener) -> Disposer {
        let window: &EventTarget = &self.window;
        let mut disposers: Vec<Disposer> = Vec::new();

        {
            let (canvas, emit) = (self.canvas.clone(), Rc::clone(&listener));
            disposers.push(listen(window, "mousemove", move |event| {
                if let Some(e) = event.dyn_ref::<MouseEvent>() {
                    let (x, y) = local(&canvas, e.client_x(), e.client_y());
                    emit(HostEvent::PointerMove { x, y });
                }
            }));
        }
        {
            let emit = Rc::clone(&listener);
            disposers.push(listen(window, "mouseout", move |event| {
                let left_page = event
                    .dyn_ref::<MouseEvent>()
                    .is_some_and(|e| e.related_target().is_none());
                if left_page {
                    emit(HostEvent::PointerLeave);
                }
            }));
        }
        {
            let emit = Rc::clone(&listener);
            disposers.push(listen(window, "mousedown", move |_| emit(HostEvent::PointerDown)));
        }
        {
            let emit = Rc::clone(&listener);
            disposers.push(listen(window, "mouseup", move |_| emit(HostEvent::PointerUp)));
        }
        {
            let (canvas, emit) = (self.canvas.clone(), Rc::clone(&listener));
            disposers.push(listen(window, "click", move |event| {
                if let Some(e) = event.dyn_ref::<MouseEvent>() {
                    let (x, y) = local(&canvas, e.client_x(), e.client_y());
                    emit(HostEvent::Click { x, y });
                }
            }));
        }
        {
            let (canvas, emit) = (self.canvas.clone(), Rc::clone(&listener));
            disposers.push(listen(window, "touchstart", move |event| {
                if let Some(e) = event.dyn_ref::<TouchEvent>() {
                    emit(HostEvent::PointerDown);
                    if let Some((x, y)) = first_touch(&canvas, e) {
                        emit(HostEvent::PointerMove { x, y });
                    }
                }
            }));
        }
        {
            let (canvas, emit) = (self.canvas.clone(), Rc::clone(&listener));
            disposers.push(listen(window, "touchmove", move |event| {
                if let Some((x, y)) = event
                    .dyn_ref::<TouchEvent>()
                    .and_then(|e| first_touch(&canvas, e))
                {
                    emit(HostEvent::PointerMove { x, y });
                }
            }));
        }
        {
            let emit = Rc::clone(&listener);
            disposers.push(listen(window, "touchend", move |_| {
                emit(HostEvent::PointerUp);
                emit(HostEvent::PointerLeave);
            }));
        }
        {
            let (canvas, emit) = (self.canvas.clone(), Rc::clone(&listener));
            disposers.push(listen(window, "resize", move |_| {
                emit(HostEvent::Resize {
                    width: canvas.client_width() as f32,
                    height: canvas.client_height() as f32,
                });
            }));
        }
        {
            let (win, emit) = (self.window.clone(), Rc::clone(&listener));
            disposers.push(listen(window, "scroll", move |_| {
                if let Ok(y) = win.scroll_y() {
                    emit(HostEvent::Scroll { y: y as f32 });
                }
            }));
        }

        Box::new(move || {
            for dispose in disposers {
                dispose();
            }
        })
    }
}

/// `requestAnimationFrame`-driven clock
pub struct AnimationFrameClock {
    window: Window,
}

impl AnimationFrameClock {
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

impl FrameClock for AnimationFrameClock {
    fn request_frame(&self, callback: FrameCallback) -> Result<FrameHandle, EngineError> {
        // Freed when it fires; a cancelled frame leaks its closure
        let closure = Closure::once_into_js(move |timestamp: f64| callback(timestamp));
        self.window
            .request_animation_frame(closure.unchecked_ref())
            .map(FrameHandle)
            .map_err(|e| EngineError::Schedule(format!("requestAnimationFrame: {:?}", e)))
    }

    fn cancel_frame(&self, handle: FrameHandle) {
        let _ = self.window.cancel_animation_frame(handle.0);
    }
}

/// Presents a [`ShapeBatch`] through WebGPU, with text on a 2D overlay canvas
pub struct GpuSurface {
    batch: ShapeBatch,
    gpu: RenderState,
    window: Window,
    canvas: HtmlCanvasElement,
    overlay: Option<(HtmlCanvasElement, CanvasRenderingContext2d)>,
    dpr: f64,
}

impl GpuSurface {
    pub async fn new(window: &Window, canvas: HtmlCanvasElement) -> Result<Self, EngineError> {
        let dpr = window.device_pixel_ratio();
        let (css_w, css_h) = (canvas.client_width().max(1), canvas.client_height().max(1));
        let (width, height) = ((css_w as f64 * dpr) as u32, (css_h as f64 * dpr) as u32);
        canvas.set_width(width);
        canvas.set_height(height);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });
        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| SurfaceError::Unavailable(format!("create_surface: {e}")))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| SurfaceError::Unavailable(format!("request_adapter: {e}")))?;
        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let mut gpu = RenderState::new(surface, &adapter, width, height).await?;
        gpu.set_view(css_w as f32, css_h as f32);

        let overlay = Self::create_overlay(window, width, height);
        let surface = Self {
            batch: ShapeBatch::new(css_w as f32, css_h as f32),
            gpu,
            window: window.clone(),
            canvas,
            overlay,
            dpr,
        };
        surface.place_overlay();
        Ok(surface)
    }

    /// 2D canvas stacked over the GPU canvas; text is skipped without one
    fn create_overlay(
        window: &Window,
        width: u32,
        height: u32,
    ) -> Option<(HtmlCanvasElement, CanvasRenderingContext2d)> {
        let document = window.document()?;
        let body = document.body()?;
        let overlay: HtmlCanvasElement = document.create_element("canvas").ok()?.dyn_into().ok()?;
        overlay.set_width(width);
        overlay.set_height(height);
        body.append_child(&overlay).ok()?;
        let ctx: CanvasRenderingContext2d = overlay.get_context("2d").ok()??.dyn_into().ok()?;
        Some((overlay, ctx))
    }

    /// Pin the overlay to the GPU canvas' page box, however the canvas is laid out
    fn place_overlay(&self) {
        let Some((overlay, _)) = &self.overlay else {
            return;
        };
        let rect = self.canvas.get_bounding_client_rect();
        let scroll_x = self.window.scroll_x().unwrap_or(0.0);
        let scroll_y = self.window.scroll_y().unwrap_or(0.0);
        let style = format!(
            "position:absolute;left:{}px;top:{}px;width:{}px;height:{}px;pointer-events:none;",
            rect.left() + scroll_x,
            rect.top() + scroll_y,
            rect.width(),
            rect.height()
        );
        let _ = overlay.set_attribute("style", &style);
    }

    fn draw_text(&self) {
        let Some((overlay, ctx)) = &self.overlay else {
            return;
        };
        let _ = ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
        ctx.clear_rect(0.0, 0.0, overlay.width() as f64, overlay.height() as f64);
        let _ = ctx.set_transform(self.dpr, 0.0, 0.0, self.dpr, 0.0, 0.0);
        ctx.set_text_align("center");
        for run in self.batch.texts() {
            ctx.save();
            ctx.set_font(&format!("bold {}px Impact, sans-serif", run.size.round()));
            ctx.set_fill_style_str(&css_color(run.color));
            let _ = ctx.translate(run.at.x as f64, run.at.y as f64);
            let _ = ctx.rotate(run.rotation as f64);
            let _ = ctx.fill_text(&run.text, 0.0, 0.0);
            ctx.restore();
        }
    }
}

impl Surface for GpuSurface {
    fn begin_frame(&mut self) -> Result<(), SurfaceError> {
        self.batch.begin_frame()
    }

    fn end_frame(&mut self) -> Result<(), SurfaceError> {
        self.batch.end_frame()?;
        self.draw_text();
        self.gpu
            .render(self.batch.vertices(), self.batch.clear_color())
    }

    fn size(&self) -> Vec2 {
        self.batch.size()
    }

    fn resize(&mut self, width: f32, height: f32) {
        let (w, h) = (
            (width as f64 * self.dpr).max(1.0) as u32,
            (height as f64 * self.dpr).max(1.0) as u32,
        );
        self.canvas.set_width(w);
        self.canvas.set_height(h);
        if let Some((overlay, _)) = &self.overlay {
            overlay.set_width(w);
            overlay.set_height(h);
        }
        self.gpu.resize(w, h);
        self.gpu.set_view(width, height);
        self.batch.resize(width, height);
        self.place_overlay();
    }

    fn clear(&mut self, color: Color) {
        self.batch.clear(color);
    }

    fn fade(&mut self, color: Color) {
        self.batch.fade(color);
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.batch.fill_circle(center, radius, color);
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, color: Color) {
        self.batch.stroke_circle(center, radius, width, color);
    }

    fn glow(&mut self, center: Vec2, radius: f32, inner: Color, outer: Color) {
        self.batch.glow(center, radius, inner, outer);
    }

    fn line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color) {
        self.batch.line(from, to, width, color);
    }

    fn fill_polygon(&mut self, points: &[Vec2], color: Color) {
        self.batch.fill_polygon(points, color);
    }

    fn text(&mut self, text: &str, at: Vec2, size: f32, rotation: f32, color: Color) {
        self.batch.text(text, at, size, rotation, color);
    }
}

impl Drop for GpuSurface {
    fn drop(&mut self) {
        if let Some((overlay, _)) = self.overlay.take() {
            overlay.remove();
        }
    }
}

/// Accepts a scene name (`"starfield"`, `"gotham-rain"`, ...) or a JSON config
pub fn parse_config(config: Option<String>) -> Result<EngineConfig, EngineError> {
    match config.as_deref().map(str::trim) {
        None | Some("") => Ok(EngineConfig::default()),
        Some(text) => match ScenePreset::parse(text) {
            Some(scene) => Ok(EngineConfig::preset(scene)),
            None => Ok(EngineConfig::from_json(text)?),
        },
    }
}

/// Handle returned to JavaScript; dropping it stops the engine
#[wasm_bindgen]
pub struct EngineHandle {
    engine: Engine,
}

#[wasm_bindgen]
impl EngineHandle {
    pub fn stop(&mut self) -> Result<(), JsValue> {
        self.engine.stop().map_err(js_error)
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.engine.is_running()
    }

    pub fn frames(&self) -> f64 {
        self.engine.frames() as f64
    }
}

/// Route `log` to the browser console and panics to `console.error`
pub fn init_logging() {
    console_error_panic_hook::set_once();
    // Already initialized when several engines mount on one page
    let _ = console_log::init_with_level(log::Level::Info);
}

/// Mount an engine on the canvas with id `canvas_id`
#[wasm_bindgen]
pub async fn mount(canvas_id: String, config: Option<String>) -> Result<EngineHandle, JsValue> {
    init_logging();
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let canvas: HtmlCanvasElement = document
        .get_element_by_id(&canvas_id)
        .ok_or_else(|| JsValue::from_str(&format!("no element #{canvas_id}")))?
        .dyn_into()
        .map_err(|_| JsValue::from_str(&format!("#{canvas_id} is not a canvas")))?;

    let mut engine = Engine::new(parse_config(config).map_err(js_error)?).map_err(js_error)?;
    let surface = GpuSurface::new(&window, canvas.clone())
        .await
        .map_err(js_error)?;
    let clock = Rc::new(AnimationFrameClock::new(window.clone()));
    let events = DomEvents::new(window, canvas);
    engine
        .start(Box::new(surface), clock, &events)
        .map_err(js_error)?;

    log::info!("Mounted on #{}", canvas_id);
    Ok(EngineHandle { engine })
}
