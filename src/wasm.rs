//! WebAssembly bindings for the campaign engine.
//!
//! The browser owns the event loop: JavaScript calls [`WasmCampaign::advance`]
//! from `requestAnimationFrame` (or a timer) and renders progress between
//! calls, the same cooperative stepping the terminal monitor uses.

use wasm_bindgen::prelude::*;
use crate::campaign::{store, CampaignSession, Progress};
use crate::config::EngineConfig;
use crate::machine::Machine;
use crate::unit::{ExecutionUnit, ProgramImage};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// A campaign running against the reference machine.
#[wasm_bindgen]
pub struct WasmCampaign {
    session: CampaignSession<Machine>,
}

#[wasm_bindgen]
impl WasmCampaign {
    /// Build a campaign from campaign-file JSON and the program bytes.
    ///
    /// The `program` path inside the JSON is informational here.
    #[wasm_bindgen(constructor)]
    pub fn new(campaign_json: &str, program: &[u8]) -> Result<WasmCampaign, JsError> {
        let machine = Machine::new();
        let definition = store::parse(campaign_json, &machine.geometry())
            .map_err(|e| JsError::new(&e.to_string()))?;
        let session = CampaignSession::new(
            machine,
            definition,
            ProgramImage::new(program.to_vec()),
            EngineConfig::default(),
        )
        .map_err(|e| JsError::new(&e.to_string()))?;

        Ok(Self { session })
    }

    /// Run the golden execution if needed. Returns the golden cycle count.
    #[wasm_bindgen]
    pub fn calibrate(&mut self) -> Result<u64, JsError> {
        let baseline = self.session.calibrate()
            .map_err(|e| JsError::new(&e.to_string()))?;
        Ok(baseline.expected_instructions)
    }

    /// Advance up to `max_cycles` cycles. Returns `true` once every
    /// injection has an outcome.
    #[wasm_bindgen]
    pub fn advance(&mut self, max_cycles: u32) -> Result<bool, JsError> {
        for _ in 0..max_cycles {
            match self.session.step().map_err(|e| JsError::new(&e.to_string()))? {
                Progress::Finished => return Ok(true),
                Progress::Stepped | Progress::InjectionComplete { .. } => {}
            }
        }
        Ok(self.session.is_complete())
    }

    /// Abandon the injection in flight; it restarts on the next `advance`.
    #[wasm_bindgen]
    pub fn pause(&mut self) {
        self.session.abort_current();
    }

    #[wasm_bindgen]
    pub fn completed(&self) -> usize {
        self.session.completed()
    }

    #[wasm_bindgen]
    pub fn total(&self) -> usize {
        self.session.total()
    }

    /// Outcome labels in injection order.
    #[wasm_bindgen]
    pub fn outcomes(&self) -> js_sys::Array {
        self.session
            .results()
            .iter()
            .map(|outcome| JsValue::from_str(outcome.label()))
            .collect()
    }

    /// Campaign statistics as a JSON string.
    #[wasm_bindgen]
    pub fn summary_json(&self) -> Result<String, JsError> {
        let summary = self.session.summary()
            .map_err(|e| JsError::new(&e.to_string()))?;
        serde_json::to_string(&summary).map_err(|e| JsError::new(&e.to_string()))
    }

    /// The campaign definition, with golden values once calibrated.
    #[wasm_bindgen]
    pub fn campaign_json(&self) -> Result<String, JsError> {
        store::to_json(self.session.definition())
            .map_err(|e| JsError::new(&e.to_string()))
    }
}
