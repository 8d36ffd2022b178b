//! Browser bindings
//!
//! The page owns the canvas, the animation loop and the settings widgets. It
//! calls [`PlinkoBoard::tick`] once per frame and draws from
//! [`PlinkoBoard::snapshot_json`].

use glam::Vec2;
use wasm_bindgen::prelude::*;

use crate::audio::WoodKnock;
use crate::board::{BoardController, Direction, ReleaseOutcome};
use crate::physics::World;
use crate::{BackgroundPreset, Settings, board_dimensions};

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        // Already initialised by an earlier module instance
        return;
    }
    log::info!("Plinko Decider starting...");
}

/// One board on the page
#[wasm_bindgen]
pub struct PlinkoBoard {
    controller: BoardController<World, WoodKnock>,
    settings: Settings,
}

#[wasm_bindgen]
impl PlinkoBoard {
    #[wasm_bindgen(constructor)]
    pub fn new(container_width: f32, slot_count: u32) -> Result<PlinkoBoard, JsValue> {
        let settings = Settings::default();
        let (width, height) = board_dimensions(container_width);
        let config = settings.board_config(width, height, slot_count);

        let mut audio = WoodKnock::new(settings.seed);
        audio.volume = settings.volume();
        let mut controller =
            BoardController::new(World::new(config.gravity), audio, config, settings.seed)
                .map_err(to_js)?;
        controller.attach();
        Ok(Self {
            controller,
            settings,
        })
    }

    /// Advance one frame
    pub fn tick(&mut self) {
        self.controller.tick();
    }

    /// Keyboard input. Returns true if the key was used.
    pub fn key_down(&mut self, key: &str) -> bool {
        match key {
            "ArrowLeft" => {
                self.controller.nudge(Direction::Left);
                true
            }
            "ArrowRight" => {
                self.controller.nudge(Direction::Right);
                true
            }
            " " | "Enter" => {
                self.release();
                true
            }
            _ => false,
        }
    }

    /// Drop the active ball. False if it stayed pinned.
    pub fn release(&mut self) -> bool {
        // Audio can only start after a user gesture
        self.controller.audio_mut().resume();
        matches!(self.controller.release(), ReleaseOutcome::Dropped(_))
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) -> bool {
        self.controller.audio_mut().resume();
        self.controller.pointer_down(Vec2::new(x, y)).is_some()
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        self.controller.pointer_move(Vec2::new(x, y));
    }

    pub fn pointer_up(&mut self) -> bool {
        matches!(self.controller.pointer_up(), ReleaseOutcome::Dropped(_))
    }

    pub fn add_ball(&mut self) {
        self.controller.add_ball();
    }

    pub fn reset_balls(&mut self) {
        self.controller.reset_balls();
    }

    /// Board state for drawing
    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.controller.snapshot()).map_err(to_js)
    }

    /// `callback(slotIndex)` runs each time a ball lands
    pub fn set_on_win(&mut self, callback: js_sys::Function) {
        self.controller.set_on_win(move |slot| {
            if let Err(err) = callback.call1(&JsValue::NULL, &JsValue::from(slot as u32)) {
                log::warn!("onWin callback failed: {err:?}");
            }
        });
    }

    pub fn set_label(&mut self, index: usize, text: &str) -> bool {
        let mut labels = self.controller.labels().clone();
        let changed = labels.set(index, text);
        self.controller.set_labels(labels);
        changed
    }

    pub fn labels_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.controller.labels()).map_err(to_js)
    }

    pub fn winning_label(&self) -> Option<String> {
        self.controller.winning_label().map(str::to_string)
    }

    /// Re-fit the board to its container
    pub fn resize(&mut self, container_width: f32) -> Result<(), JsValue> {
        let (width, height) = board_dimensions(container_width);
        self.apply(width, height, self.controller.config().slot_count)
    }

    pub fn set_slot_count(&mut self, slot_count: u32) -> Result<(), JsValue> {
        let config = *self.controller.config();
        self.apply(config.width, config.height, slot_count)
    }

    pub fn set_gravity(&mut self, value: f32) -> Result<(), JsValue> {
        self.settings.set_gravity(value);
        self.reapply()
    }

    pub fn set_bounciness(&mut self, value: f32) -> Result<(), JsValue> {
        self.settings.set_bounciness(value);
        self.reapply()
    }

    pub fn set_friction(&mut self, value: f32) -> Result<(), JsValue> {
        self.settings.set_friction(value);
        self.reapply()
    }

    pub fn set_volume(&mut self, value: f32) {
        self.settings.set_master_volume(value);
        self.controller.audio_mut().volume = self.settings.volume();
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.settings.muted = muted;
        self.controller.audio_mut().volume = self.settings.volume();
    }

    /// Select a background preset by name; returns its CSS colour
    pub fn set_background(&mut self, name: &str) -> Option<String> {
        let preset = BackgroundPreset::from_name(name)?;
        self.settings.background = preset;
        Some(preset.hex().to_string())
    }

    pub fn background(&self) -> String {
        self.settings.background.hex().to_string()
    }

    pub fn settings_json(&self) -> Result<String, JsValue> {
        self.settings.to_json().map_err(to_js)
    }

    fn reapply(&mut self) -> Result<(), JsValue> {
        let config = *self.controller.config();
        self.apply(config.width, config.height, config.slot_count)
    }

    fn apply(&mut self, width: f32, height: f32, slot_count: u32) -> Result<(), JsValue> {
        let config = self.settings.board_config(width, height, slot_count);
        self.controller.set_config(config).map_err(to_js)
    }
}
