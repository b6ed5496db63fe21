//! Game tuning resolved per device class
//!
//! Every tunable is compiled in (see `consts`); a host may override
//! individual fields from JSON, which is validated before use.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Device class the tuning is resolved for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    Mobile,
    #[default]
    Desktop,
}

impl DeviceClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceClass::Mobile => "mobile",
            DeviceClass::Desktop => "desktop",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "mobile" | "phone" => Some(DeviceClass::Mobile),
            "desktop" => Some(DeviceClass::Desktop),
            _ => None,
        }
    }

    /// Same breakpoint the page layout uses
    pub fn from_screen_width(width: f32) -> Self {
        if width < 600.0 {
            DeviceClass::Mobile
        } else {
            DeviceClass::Desktop
        }
    }
}

/// Screen-space bounds of the playfield
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Playfield {
    pub width: f32,
    pub height: f32,
    /// Left wall: the calendar's time column
    pub time_column_width: f32,
    /// Ceiling: the calendar's day header
    pub header_height: f32,
}

impl Playfield {
    /// Playfield with the calendar chrome sized for `device`
    pub fn new(width: f32, height: f32, device: DeviceClass) -> Self {
        let (time_column_width, header_height) = match device {
            DeviceClass::Mobile => (TIME_COLUMN_WIDTH_MOBILE, HEADER_HEIGHT_MOBILE),
            DeviceClass::Desktop => (TIME_COLUMN_WIDTH_DESKTOP, HEADER_HEIGHT_DESKTOP),
        };
        Self {
            width,
            height,
            time_column_width,
            header_height,
        }
    }
}

impl Default for Playfield {
    fn default() -> Self {
        Self::new(1280.0, 800.0, DeviceClass::Desktop)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Resolved tuning for one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub device: DeviceClass,
    pub playfield: Playfield,

    // === Lives & scoring ===
    pub initial_lives: u8,
    pub max_lives: u8,
    pub base_score: u64,
    pub combo_multiplier: f32,
    pub victory_life_bonus: u64,

    // === Ball ===
    pub ball_radius: f32,
    /// Launch speed per axis (pixels per reference frame)
    pub ball_speed: f32,
    /// Per-axis cap (pixels per reference frame)
    pub max_speed: f32,
    /// Speed magnitude floor for a moving ball
    pub min_speed: f32,

    // === Paddle ===
    pub paddle_width: f32,
    pub paddle_height: f32,
    pub paddle_speed: f32,
    pub paddle_bottom_offset: f32,
    pub paddle_hit_tolerance: f32,

    // === Power-ups ===
    pub powerup_drop_chance: f32,
    pub powerup_fall_speed: f32,
    pub powerup_pickup_margin: f32,
    pub widen_multiplier: f32,
    pub widen_duration_ms: f64,
    pub slow_multiplier: f32,
    pub slow_duration_ms: f64,

    // === Loop ===
    pub target_fps: u32,
    pub max_steps_per_frame: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::for_device(DeviceClass::Desktop, Playfield::default())
    }
}

impl GameConfig {
    /// Resolve the compiled-in tuning for a device class
    pub fn for_device(device: DeviceClass, playfield: Playfield) -> Self {
        let mobile = device == DeviceClass::Mobile;
        let pick = |m: f32, d: f32| if mobile { m } else { d };
        let ball_speed = pick(BALL_SPEED_MOBILE, BALL_SPEED_DESKTOP);

        Self {
            device,
            playfield,

            initial_lives: INITIAL_LIVES,
            max_lives: MAX_LIVES,
            base_score: BASE_SCORE,
            combo_multiplier: COMBO_MULTIPLIER,
            victory_life_bonus: VICTORY_LIFE_BONUS,

            ball_radius: pick(BALL_RADIUS_MOBILE, BALL_RADIUS_DESKTOP),
            ball_speed,
            max_speed: pick(BALL_MAX_SPEED_MOBILE, BALL_MAX_SPEED_DESKTOP),
            min_speed: ball_speed * SLOW_BALL_MULTIPLIER,

            paddle_width: pick(PADDLE_WIDTH_MOBILE, PADDLE_WIDTH_DESKTOP),
            paddle_height: pick(PADDLE_HEIGHT_MOBILE, PADDLE_HEIGHT_DESKTOP),
            paddle_speed: PADDLE_SPEED,
            paddle_bottom_offset: PADDLE_BOTTOM_OFFSET,
            paddle_hit_tolerance: PADDLE_HIT_TOLERANCE,

            powerup_drop_chance: POWERUP_DROP_CHANCE,
            powerup_fall_speed: pick(POWERUP_FALL_SPEED_MOBILE, POWERUP_FALL_SPEED_DESKTOP),
            powerup_pickup_margin: POWERUP_PICKUP_MARGIN,
            widen_multiplier: WIDEN_MULTIPLIER,
            widen_duration_ms: WIDEN_DURATION_MS,
            slow_multiplier: SLOW_BALL_MULTIPLIER,
            slow_duration_ms: SLOW_BALL_DURATION_MS,

            target_fps: TARGET_FPS,
            max_steps_per_frame: MAX_STEPS_PER_FRAME,
        }
    }

    /// Parse a (possibly partial) JSON config
    ///
    /// Missing fields take the compiled-in tuning for the `device` named in
    /// the JSON (desktop when absent) on a default-sized playfield.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let overrides: serde_json::Value = serde_json::from_str(json)?;
        let device = match overrides.get("device") {
            Some(value) => DeviceClass::deserialize(value)?,
            None => DeviceClass::default(),
        };
        let size = Playfield::default();
        Self::for_device(device, Playfield::new(size.width, size.height, device)).with_overrides(overrides)
    }

    /// Apply JSON overrides field by field on top of this config
    ///
    /// Fields the JSON does not name keep their current values, including
    /// the device tuning; naming `device` alone only relabels it.
    pub fn merge_json(&self, json: &str) -> Result<Self, ConfigError> {
        let overrides: serde_json::Value = serde_json::from_str(json)?;
        self.with_overrides(overrides)
    }

    fn with_overrides(&self, overrides: serde_json::Value) -> Result<Self, ConfigError> {
        let serde_json::Value::Object(fields) = overrides else {
            return Err(ConfigError::Invalid("config must be a JSON object".to_string()));
        };
        let mut merged = serde_json::to_value(self)?;
        if let Some(target) = merged.as_object_mut() {
            target.extend(fields);
        }
        let config: Self = serde_json::from_value(merged)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject tunings the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        let pf = &self.playfield;
        if pf.width <= pf.time_column_width || pf.height <= pf.header_height {
            return invalid("playfield must be larger than the calendar chrome");
        }
        if self.initial_lives == 0 || self.initial_lives > self.max_lives {
            return invalid("initial_lives must be in 1..=max_lives");
        }
        if self.ball_radius <= 0.0 || self.ball_speed <= 0.0 {
            return invalid("ball radius and speed must be positive");
        }
        if self.max_speed < self.ball_speed || self.min_speed < 0.0 || self.min_speed > self.max_speed {
            return invalid("speed limits must satisfy 0 <= min_speed <= max_speed and ball_speed <= max_speed");
        }
        if self.paddle_width <= 0.0 || self.paddle_height <= 0.0 {
            return invalid("paddle dimensions must be positive");
        }
        if !(0.0..=1.0).contains(&self.powerup_drop_chance) {
            return invalid("powerup_drop_chance must be in [0, 1]");
        }
        if self.slow_multiplier <= 0.0 || self.widen_multiplier <= 0.0 {
            return invalid("effect multipliers must be positive");
        }
        if self.target_fps == 0 || self.max_steps_per_frame == 0 {
            return invalid("target_fps and max_steps_per_frame must be positive");
        }
        Ok(())
    }

    /// Fixed simulation step in milliseconds
    pub fn fixed_step_ms(&self) -> f64 {
        1000.0 / self.target_fps as f64
    }

    /// Top edge of the paddle (the paddle never moves vertically)
    pub fn paddle_y(&self) -> f32 {
        self.playfield.height - self.paddle_bottom_offset - self.paddle_height
    }
}
