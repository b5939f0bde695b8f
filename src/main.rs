//! Ambient Field entry point
//!
//! On the web this mounts the engine on `#canvas`, picking the scene from the
//! canvas' `data-scene` attribute. Natively it runs a headless demo of the
//! same engine against a CPU shape batch.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod web_app {
    use std::cell::RefCell;

    use ambient_field::platform::web::{EngineHandle, mount};
    use wasm_bindgen::prelude::*;

    thread_local! {
        static HANDLE: RefCell<Option<EngineHandle>> = const { RefCell::new(None) };
    }

    pub async fn run() -> Result<(), JsValue> {
        let scene = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("canvas"))
            .and_then(|c| c.get_attribute("data-scene"));

        let handle = mount("canvas".to_string(), scene).await?;

        if let Some(loading) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("loading"))
        {
            let _ = loading.set_attribute("class", "hidden");
        }

        HANDLE.with(|slot| *slot.borrow_mut() = Some(handle));
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() -> Result<(), JsValue> {
    web_app::run().await
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let scene = std::env::args().nth(1).unwrap_or_else(|| "starfield".to_string());
    let frames: u32 = std::env::args()
        .nth(2)
        .and_then(|n| n.parse().ok())
        .unwrap_or(600);

    if let Err(e) = headless::run(&scene, frames) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::rc::Rc;

    use ambient_field::config::{EngineConfig, ScenePreset};
    use ambient_field::platform::{HostEvent, LocalEventBus, ManualClock};
    use ambient_field::renderer::ShapeBatch;
    use ambient_field::{Engine, EngineError};

    const WIDTH: f32 = 1280.0;
    const HEIGHT: f32 = 720.0;
    const FRAME_MS: f64 = 1000.0 / 60.0;

    /// Sweep a synthetic pointer across the surface, clicking now and then
    pub fn run(scene: &str, frames: u32) -> Result<(), EngineError> {
        let config = match ScenePreset::parse(scene) {
            Some(preset) => EngineConfig::preset(preset),
            None => {
                let json = std::fs::read_to_string(scene)
                    .map_err(|e| EngineError::Schedule(format!("{scene}: {e}")))?;
                EngineConfig::from_json(&json)?
            }
        };
        log::info!("Ambient Field (headless) running '{}' for {} frames", scene, frames);

        let mut engine = Engine::new(config)?;
        let clock = ManualClock::new();
        let bus = LocalEventBus::new();
        engine.start(
            Box::new(ShapeBatch::new(WIDTH, HEIGHT)),
            Rc::new(clock.clone()),
            &bus,
        )?;

        for frame in 0..frames {
            let t = frame as f32 / frames.max(1) as f32;
            bus.emit(HostEvent::PointerMove {
                x: WIDTH * t,
                y: HEIGHT * 0.5 + (t * std::f32::consts::TAU * 2.0).sin() * HEIGHT * 0.3,
            });
            if frame % 90 == 45 {
                bus.emit(HostEvent::PointerDown);
                bus.emit(HostEvent::Click {
                    x: WIDTH * t,
                    y: HEIGHT * 0.5,
                });
            }
            if frame % 90 == 50 {
                bus.emit(HostEvent::PointerUp);
            }
            if frame == frames / 2 {
                bus.emit(HostEvent::Resize {
                    width: WIDTH * 0.75,
                    height: HEIGHT * 0.75,
                });
            }

            clock.advance(frame as f64 * FRAME_MS);

            if frame % 60 == 0 {
                let stats = engine.last_stats();
                let effects = engine.with_world(|w| w.effects().len());
                log::info!(
                    "frame {:>4}: {} connections, {} effects live, {} recycled",
                    frame,
                    stats.connections,
                    effects,
                    stats.recycled
                );
            }
        }

        engine.stop()?;
        log::info!("Done after {} frames", engine.frames());
        Ok(())
    }
}
