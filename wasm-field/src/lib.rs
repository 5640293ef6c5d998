//! Radial event field scene for browser renderers
//!
//! WebAssembly bindings to field_core for browser use.  The canvas
//! painting itself stays in JavaScript; this crate only runs the
//! deterministic per-frame computation and hands back frame objects.

use wasm_bindgen::prelude::*;
use serde::Serialize;

use field_core::cluster::{DEFAULT_MAX_ACTIVE_CLUSTERS, DEFAULT_MIN_ACTIVE_CLUSTERS};
use field_core::event::FieldEvent;
use field_core::layout::DEFAULT_MIN_TIME_SPAN_RATIO;
use field_core::pulse::{DEFAULT_MAX_ACTIVE_PULSES, DEFAULT_PULSE_LIFETIME_MS};
use field_core::rng::hash_seed_text;
use field_core::scene::{FieldScene, SceneConfig, DEFAULT_ENTRANCE_MS};

/// Shared constants exposed to JavaScript
#[wasm_bindgen]
pub fn constants() -> JsValue {
    #[derive(Serialize)]
    struct Constants {
        default_min_time_span_ratio: f64,
        default_max_active_pulses: usize,
        default_pulse_lifetime_ms: i64,
        default_min_active_clusters: usize,
        default_max_active_clusters: usize,
        default_entrance_ms: f64,
    }

    let c = Constants {
        default_min_time_span_ratio: DEFAULT_MIN_TIME_SPAN_RATIO,
        default_max_active_pulses: DEFAULT_MAX_ACTIVE_PULSES,
        default_pulse_lifetime_ms: DEFAULT_PULSE_LIFETIME_MS,
        default_min_active_clusters: DEFAULT_MIN_ACTIVE_CLUSTERS,
        default_max_active_clusters: DEFAULT_MAX_ACTIVE_CLUSTERS,
        default_entrance_ms: DEFAULT_ENTRANCE_MS,
    };

    serde_wasm_bindgen::to_value(&c).unwrap_or_else(|_| JsValue::NULL)
}

/// Hash a scene name to a numeric seed (FNV-1a), for callers that want a
/// stable seed from user-facing text.
#[wasm_bindgen(js_name = "hashSeed")]
pub fn hash_seed(text: &str) -> u32 {
    hash_seed_text(text)
}

/// Scene wrapper for WASM
#[wasm_bindgen]
pub struct Scene {
    inner: FieldScene,
}

#[wasm_bindgen]
impl Scene {
    /// Create a scene with default configuration and optional seed
    ///
    /// Omitting the seed draws one from entropy; pass a seed for
    /// bit-for-bit replay across page loads.
    #[wasm_bindgen(constructor)]
    pub fn new(seed: Option<u32>) -> Scene {
        let config = SceneConfig::default();
        let inner = match seed {
            Some(seed) => FieldScene::new_with_seed(config, seed),
            None => FieldScene::new(config),
        };
        Scene { inner }
    }

    /// Create a scene with a configuration object
    ///
    /// `config` is a JS object matching `SceneConfig`; missing fields are
    /// an error, so callers should start from `constants()` defaults.
    #[wasm_bindgen(js_name = "withConfig")]
    pub fn with_config(config: JsValue, seed: Option<u32>) -> Result<Scene, JsValue> {
        let config: SceneConfig = serde_wasm_bindgen::from_value(config)
            .map_err(|err| JsValue::from_str(&format!("invalid scene config: {err}")))?;
        let inner = match seed {
            Some(seed) => FieldScene::new_with_seed(config, seed),
            None => FieldScene::new(config),
        };
        Ok(Scene { inner })
    }

    /// Advance the scene to `time_ms` and return the frame as a JS object
    ///
    /// `events` is a JS array of event objects (snake_case fields, as
    /// produced by the ingestion pipeline).
    pub fn tick(&mut self, events: JsValue, time_ms: f64) -> Result<JsValue, JsValue> {
        let events: Vec<FieldEvent> = serde_wasm_bindgen::from_value(events)
            .map_err(|err| JsValue::from_str(&format!("invalid events: {err}")))?;
        let frame = self.inner.tick(&events, time_ms as i64);
        serde_wasm_bindgen::to_value(&frame)
            .map_err(|err| JsValue::from_str(&format!("frame serialization: {err}")))
    }

    /// Advance the scene and return the frame as a JSON string
    #[wasm_bindgen(js_name = "tickJson")]
    pub fn tick_json(&mut self, events: JsValue, time_ms: f64) -> Result<String, JsValue> {
        let events: Vec<FieldEvent> = serde_wasm_bindgen::from_value(events)
            .map_err(|err| JsValue::from_str(&format!("invalid events: {err}")))?;
        self.inner
            .tick_json(&events, time_ms as i64)
            .map_err(|err| JsValue::from_str(&format!("frame serialization: {err}")))
    }

    /// Restart the cluster lifecycle and entrance ramp
    pub fn reset(&mut self) {
        self.inner.reset();
    }
}
