//! Overlay configuration and the store that owns it
//!
//! `OverlayConfig` is a flat record: every field has a default, unknown keys
//! are ignored, and malformed values are dropped key by key when a patch is
//! merged. `ConfigStore` keeps the configuration the host supplied apart from
//! the temporary fidelity overrides applied by the performance governor.

use crate::types::SurfaceSize;
use crate::{DrizzleError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Horizontal wind direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindDirection {
    /// Slow bounded random walk between left and right
    Auto,
    Left,
    Right,
}

/// Static color theme applied to every particle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[serde(alias = "none")]
    Off,
    Warm,
    Cool,
    Neon,
    Pastel,
}

/// The full tunable parameter set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub enabled: bool,

    // Surface
    pub width: f32,
    pub height: f32,

    // Appearance
    pub emoji_set: Vec<String>,
    pub use_custom_images: bool,
    pub image_urls: Vec<String>,
    pub emoji_min_size_px: f32,
    pub emoji_max_size_px: f32,
    pub emoji_rotation_speed: f32,
    pub emoji_lifetime_ms: u64,
    pub emoji_fade_duration_ms: u64,
    pub max_emojis_on_screen: usize,

    // Physics
    pub physics_gravity_y: f32,
    pub physics_air: f32,
    pub physics_friction: f32,
    pub physics_restitution: f32,
    pub physics_damping: f32,
    pub floor_enabled: bool,
    pub bounce_effect_enabled: bool,

    // Environment
    pub wind_enabled: bool,
    pub wind_strength: f32,
    pub wind_direction: WindDirection,

    // Visual themes
    pub color_mode: ColorMode,
    pub color_intensity: f32,
    pub rainbow_enabled: bool,
    pub rainbow_speed: f32,
    pub pixel_enabled: bool,
    pub pixel_size: u32,

    // Performance
    pub fps_optimization_enabled: bool,
    pub fps_sensitivity: f32,
    pub target_fps: f32,

    // Scaling rules
    pub like_count_divisor: f32,
    pub like_min_emojis: u32,
    pub like_max_emojis: u32,
    pub gift_coin_multiplier: f32,
    pub gift_min_emojis: u32,
    pub gift_max_emojis: u32,
    pub superfan_burst_intensity: f32,
}

fn default_emoji_set() -> Vec<String> {
    [
        "💧", "💙", "💚", "💜", "❤️", "🧡", "💛", "✨", "🌟", "⭐", "🎉", "🎊",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            width: 1280.0,
            height: 720.0,
            emoji_set: default_emoji_set(),
            use_custom_images: false,
            image_urls: Vec::new(),
            emoji_min_size_px: 40.0,
            emoji_max_size_px: 80.0,
            emoji_rotation_speed: 0.05,
            emoji_lifetime_ms: 8000,
            emoji_fade_duration_ms: 1000,
            max_emojis_on_screen: 200,
            physics_gravity_y: 1.0,
            physics_air: 0.02,
            physics_friction: 0.1,
            physics_restitution: 0.6,
            physics_damping: 0.0,
            floor_enabled: true,
            bounce_effect_enabled: true,
            wind_enabled: false,
            wind_strength: 50.0,
            wind_direction: WindDirection::Auto,
            color_mode: ColorMode::Off,
            color_intensity: 0.5,
            rainbow_enabled: false,
            rainbow_speed: 1.0,
            pixel_enabled: false,
            pixel_size: 4,
            fps_optimization_enabled: true,
            fps_sensitivity: 0.2,
            target_fps: 60.0,
            like_count_divisor: 10.0,
            like_min_emojis: 1,
            like_max_emojis: 20,
            gift_coin_multiplier: 0.1,
            gift_min_emojis: 2,
            gift_max_emojis: 50,
            superfan_burst_intensity: 3.0,
        }
    }
}

/// Replace a non-finite or out-of-range value with its default
fn finite_or(value: f32, default: f32, min: f32, max: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        default
    }
}

impl OverlayConfig {
    /// Parse a full configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let value: toml::Value = toml::from_str(text)?;
        let json = serde_json::to_value(value)?;
        Ok(Self::from_json_lenient(&json).0)
    }

    /// Parse a full configuration from a JSON value, starting from defaults.
    ///
    /// Returns the keys that were dropped because their values were malformed.
    pub fn from_json_lenient(value: &Value) -> (Self, Vec<String>) {
        Self::default().merged(value)
    }

    /// Serialize to pretty TOML
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Merge a (partial) JSON object over this configuration.
    ///
    /// Each key is applied on its own; a key whose value does not
    /// deserialize is dropped and reported, the rest still apply.
    pub fn merged(&self, patch: &Value) -> (Self, Vec<String>) {
        let Some(patch) = patch.as_object() else {
            return (self.clone(), vec!["<root>".to_string()]);
        };
        let Ok(Value::Object(mut base)) = serde_json::to_value(self) else {
            return (self.clone(), patch.keys().cloned().collect());
        };

        let mut dropped = Vec::new();
        for (key, value) in patch {
            let previous = base.insert(key.clone(), value.clone());
            if serde_json::from_value::<OverlayConfig>(Value::Object(base.clone())).is_err() {
                match previous {
                    Some(previous) => base.insert(key.clone(), previous),
                    None => base.remove(key),
                };
                dropped.push(key.clone());
            }
        }

        let merged = serde_json::from_value::<OverlayConfig>(Value::Object(base))
            .unwrap_or_else(|_| self.clone());
        (merged.sanitized(), dropped)
    }

    /// Clamp every numeric field into a range the simulation can run with
    pub fn sanitized(mut self) -> Self {
        let d = Self::default();

        self.width = finite_or(self.width, d.width, 1.0, 16384.0);
        self.height = finite_or(self.height, d.height, 1.0, 16384.0);
        if self.emoji_set.is_empty() {
            self.emoji_set = d.emoji_set;
        }
        self.emoji_min_size_px = finite_or(self.emoji_min_size_px, d.emoji_min_size_px, 1.0, 1024.0);
        self.emoji_max_size_px = finite_or(self.emoji_max_size_px, d.emoji_max_size_px, 1.0, 1024.0);
        if self.emoji_max_size_px < self.emoji_min_size_px {
            std::mem::swap(&mut self.emoji_min_size_px, &mut self.emoji_max_size_px);
        }
        self.emoji_rotation_speed =
            finite_or(self.emoji_rotation_speed, d.emoji_rotation_speed, -10.0, 10.0);
        self.max_emojis_on_screen = self.max_emojis_on_screen.max(1);

        self.physics_gravity_y = finite_or(self.physics_gravity_y, d.physics_gravity_y, -10.0, 10.0);
        self.physics_air = finite_or(self.physics_air, d.physics_air, 0.0, 1.0);
        self.physics_friction = finite_or(self.physics_friction, d.physics_friction, 0.0, 10.0);
        self.physics_restitution =
            finite_or(self.physics_restitution, d.physics_restitution, 0.0, 2.0);
        self.physics_damping = finite_or(self.physics_damping, d.physics_damping, 0.0, 1.0);

        self.wind_strength = finite_or(self.wind_strength, d.wind_strength, 0.0, 1000.0);
        self.color_intensity = finite_or(self.color_intensity, d.color_intensity, 0.0, 1.0);
        self.rainbow_speed = finite_or(self.rainbow_speed, d.rainbow_speed, 0.0, 100.0);
        self.pixel_size = self.pixel_size.max(1);

        self.fps_sensitivity = finite_or(self.fps_sensitivity, d.fps_sensitivity, 0.0, 0.95);
        self.target_fps = finite_or(self.target_fps, d.target_fps, 1.0, 480.0);

        self.like_count_divisor = finite_or(self.like_count_divisor, d.like_count_divisor, 1.0, 1e9);
        self.gift_coin_multiplier =
            finite_or(self.gift_coin_multiplier, d.gift_coin_multiplier, 0.0, 1e6);
        if self.like_max_emojis < self.like_min_emojis {
            self.like_max_emojis = self.like_min_emojis;
        }
        if self.gift_max_emojis < self.gift_min_emojis {
            self.gift_max_emojis = self.gift_min_emojis;
        }
        self.superfan_burst_intensity =
            finite_or(self.superfan_burst_intensity, d.superfan_burst_intensity, 0.0, 100.0);
        self
    }

    /// Surface size described by `width` / `height`
    pub fn surface_size(&self) -> SurfaceSize {
        SurfaceSize::new(self.width, self.height)
    }

    /// Longest time slice a single frame may advance the simulation, in seconds
    pub fn target_frame_interval(&self) -> f32 {
        if self.target_fps > 0.0 {
            1.0 / self.target_fps
        } else {
            1.0 / 60.0
        }
    }

    /// Symbols (or image URLs) new particles are drawn from
    pub fn active_symbols(&self) -> &[String] {
        if self.use_custom_images && !self.image_urls.is_empty() {
            &self.image_urls
        } else {
            &self.emoji_set
        }
    }
}

/// Which live physics properties changed between two configurations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfigDiff {
    pub gravity_changed: bool,
    pub floor_changed: bool,
    pub material_changed: bool,
    pub surface_changed: bool,
    pub cap_changed: bool,
}

impl ConfigDiff {
    pub fn between(old: &OverlayConfig, new: &OverlayConfig) -> Self {
        Self {
            gravity_changed: old.physics_gravity_y != new.physics_gravity_y,
            floor_changed: old.floor_enabled != new.floor_enabled,
            material_changed: old.physics_restitution != new.physics_restitution
                || old.physics_friction != new.physics_friction,
            surface_changed: old.width != new.width || old.height != new.height,
            cap_changed: old.max_emojis_on_screen != new.max_emojis_on_screen,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Temporary overrides the performance governor layers over the stored config
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FidelityOverrides {
    /// Multiplier applied to `max_emojis_on_screen`
    pub max_emojis_scale: Option<f32>,
    pub pixel_enabled: Option<bool>,
    pub rainbow_enabled: Option<bool>,
    pub wind_enabled: Option<bool>,
    pub color_mode: Option<ColorMode>,
}

impl FidelityOverrides {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Produce the effective configuration for `base`
    pub fn apply_to(&self, base: &OverlayConfig) -> OverlayConfig {
        let mut config = base.clone();
        if let Some(scale) = self.max_emojis_scale {
            config.max_emojis_on_screen =
                ((base.max_emojis_on_screen as f32 * scale).floor() as usize).max(1);
        }
        if let Some(v) = self.pixel_enabled {
            config.pixel_enabled = v;
        }
        if let Some(v) = self.rainbow_enabled {
            config.rainbow_enabled = v;
        }
        if let Some(v) = self.wind_enabled {
            config.wind_enabled = v;
        }
        if let Some(v) = self.color_mode {
            config.color_mode = v;
        }
        config
    }
}

/// Owns the stored configuration and the effective (overridden) view of it.
///
/// Every mutation recomputes the effective configuration in one step, so a
/// reader never observes a half-applied update.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    stored: OverlayConfig,
    overrides: FidelityOverrides,
    effective: OverlayConfig,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(OverlayConfig::default())
    }
}

impl ConfigStore {
    pub fn new(config: OverlayConfig) -> Self {
        let stored = config.sanitized();
        Self {
            effective: stored.clone(),
            stored,
            overrides: FidelityOverrides::default(),
        }
    }

    /// Configuration as supplied by the host
    pub fn stored(&self) -> &OverlayConfig {
        &self.stored
    }

    /// Configuration the frame loop runs with
    pub fn effective(&self) -> &OverlayConfig {
        &self.effective
    }

    pub fn overrides(&self) -> &FidelityOverrides {
        &self.overrides
    }

    /// Replace the stored configuration wholesale
    pub fn replace(&mut self, config: OverlayConfig) -> ConfigDiff {
        self.stored = config.sanitized();
        tracing::info!("configuration replaced");
        self.recompute()
    }

    /// Merge a partial JSON configuration into the stored configuration
    pub fn apply_patch(&mut self, patch: &Value) -> Result<ConfigDiff> {
        if !patch.is_object() {
            return Err(DrizzleError::ConfigError(
                "configuration update must be a JSON object".to_string(),
            ));
        }
        let (merged, dropped) = self.stored.merged(patch);
        for key in &dropped {
            tracing::warn!(key = %key, "ignoring malformed configuration value");
        }
        self.stored = merged;
        Ok(self.recompute())
    }

    /// Set the master enable flag
    pub fn set_enabled(&mut self, enabled: bool) {
        self.stored.enabled = enabled;
        self.effective.enabled = enabled;
    }

    /// Install governor overrides
    pub fn set_overrides(&mut self, overrides: FidelityOverrides) -> ConfigDiff {
        self.overrides = overrides;
        self.recompute()
    }

    /// Drop all governor overrides, restoring the stored configuration
    pub fn clear_overrides(&mut self) -> ConfigDiff {
        self.set_overrides(FidelityOverrides::default())
    }

    fn recompute(&mut self) -> ConfigDiff {
        let effective = self.overrides.apply_to(&self.stored);
        let diff = ConfigDiff::between(&self.effective, &effective);
        self.effective = effective;
        diff
    }
}
