//! WebAssembly bindings for the CogniSpy engine.
//!
//! This module exposes activities to JavaScript through wasm-bindgen. All
//! structured values cross the boundary as JSON strings.

use wasm_bindgen::prelude::*;

use crate::actions::SessionAction;
use crate::activity::Activity;
use crate::advisory::{Locale, RoundToken};
use crate::feedback::FeedbackKind;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// WASM-exposed activity wrapper
#[wasm_bindgen]
pub struct WasmSession {
    activity: Activity,
}

#[wasm_bindgen]
impl WasmSession {
    /// Create an activity from its route name (e.g. "numbers", "keys")
    #[wasm_bindgen(constructor)]
    pub fn new(game: &str) -> Result<WasmSession, JsValue> {
        let activity = Activity::from_name(game, None)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(WasmSession { activity })
    }

    /// Create an activity with reproducible layouts
    #[wasm_bindgen(js_name = withSeed)]
    pub fn with_seed(game: &str, seed: u32) -> Result<WasmSession, JsValue> {
        let activity = Activity::from_name(game, Some(seed as u64))
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(WasmSession { activity })
    }

    /// Get the current state as JSON
    #[wasm_bindgen(js_name = getState)]
    pub fn get_state(&self) -> String {
        self.activity.state_json().to_string()
    }

    /// Apply an action from JSON, returns events JSON or error
    #[wasm_bindgen(js_name = applyAction)]
    pub fn apply_action(&mut self, action_json: &str) -> Result<String, JsValue> {
        let action: SessionAction = serde_json::from_str(action_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid action JSON: {}", e)))?;

        match self.activity.apply(action) {
            Ok(events) => Ok(serde_json::to_string(&events).unwrap_or_else(|_| "[]".to_string())),
            Err(e) => Err(JsValue::from_str(&format!("Action failed: {}", e))),
        }
    }

    /// Click an item by id, returns events JSON
    #[wasm_bindgen]
    pub fn click(&mut self, item_id: &str) -> String {
        let action = SessionAction::Click {
            item_id: item_id.to_string(),
        };
        match self.activity.apply(action) {
            Ok(events) => serde_json::to_string(&events).unwrap_or_else(|_| "[]".to_string()),
            Err(_) => "[]".to_string(),
        }
    }

    /// Feedback kinds for an events JSON array, for the tone player
    #[wasm_bindgen(js_name = feedbackFor)]
    pub fn feedback_for(&self, events_json: &str) -> String {
        let events: Vec<crate::actions::SessionEvent> =
            serde_json::from_str(events_json).unwrap_or_default();
        let kinds: Vec<FeedbackKind> = events.iter().filter_map(FeedbackKind::from_event).collect();
        serde_json::to_string(&kinds).unwrap_or_else(|_| "[]".to_string())
    }

    /// Advisory request for the finished round as `{token, request}` JSON, or "null"
    #[wasm_bindgen(js_name = advisoryRequest)]
    pub fn advisory_request(&self, username: &str, locale: &str) -> String {
        let locale = locale.parse::<Locale>().unwrap_or_default();
        match self.activity.advisory_request(username, locale) {
            Some((token, request)) => serde_json::json!({ "token": token.0, "request": request })
                .to_string(),
            None => "null".to_string(),
        }
    }

    /// Hand back remote text; returns false if the round has moved on
    #[wasm_bindgen(js_name = acceptAdvisory)]
    pub fn accept_advisory(&mut self, token: f64, text: &str) -> bool {
        self.activity.accept_advisory(RoundToken(token as u64), text)
    }

    /// Message for the completion screen
    #[wasm_bindgen(js_name = completionMessage)]
    pub fn completion_message(&self, username: &str, locale: &str) -> String {
        let locale = locale.parse::<Locale>().unwrap_or_default();
        self.activity.completion_message(username, locale)
    }

    #[wasm_bindgen(js_name = getScore)]
    pub fn get_score(&self) -> u32 {
        self.activity.progress().score
    }

    #[wasm_bindgen(js_name = getStage)]
    pub fn get_stage(&self) -> u32 {
        self.activity.progress().stage
    }

    #[wasm_bindgen(js_name = isComplete)]
    pub fn is_complete(&self) -> bool {
        self.activity.progress().is_complete()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_message_keeps_accepted_text_for_unknown_locale() {
        let mut session = WasmSession::new("bears").unwrap();
        session
            .apply_action(r#"{"type":"start","stage":1}"#)
            .unwrap();
        for spot in ["hat", "star", "drum"] {
            session.click(spot);
        }
        assert!(session.is_complete());

        let pending: serde_json::Value =
            serde_json::from_str(&session.advisory_request("Ann", "en")).unwrap();
        let token = pending["token"].as_f64().unwrap();
        assert!(session.accept_advisory(token, "Sharp eyes, Ann!"));

        assert_eq!(session.completion_message("Ann", "xx"), "Sharp eyes, Ann!");
    }
}
