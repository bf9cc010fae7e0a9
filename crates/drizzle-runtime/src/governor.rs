//! Performance governor
//!
//! Watches the frame rate over a rolling window and steps visual fidelity
//! down when the host cannot keep up. Degradation is expressed as
//! `FidelityOverrides` on the config store's effective layer, so the stored
//! configuration is never modified and recovery is a single `clear_overrides`.

use drizzle_core::{ColorMode, ConfigDiff, ConfigStore, FidelityOverrides, OverlayConfig};
use serde::Serialize;
use std::collections::VecDeque;
use tracing::info;

/// Frame-rate samples kept in the rolling window
pub const SAMPLE_CAPACITY: usize = 60;
/// No decision is made on fewer samples than this
pub const MIN_SAMPLES: usize = 10;
/// Minimum time between evaluations
pub const EVALUATION_INTERVAL_MS: f64 = 1000.0;
/// Minimal is entered below this fraction of the reduced threshold
const MINIMAL_FRACTION: f32 = 0.7;
/// Recovery to normal at or above this fraction of the target
const RECOVERY_FRACTION: f32 = 0.95;

/// Visual fidelity tiers, best first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FidelityLevel {
    Normal,
    Reduced,
    Minimal,
}

impl FidelityLevel {
    /// Overrides this level applies on top of `stored`
    pub fn overrides(self, stored: &OverlayConfig) -> FidelityOverrides {
        match self {
            Self::Normal => FidelityOverrides::default(),
            Self::Reduced => FidelityOverrides {
                max_emojis_scale: Some(0.6),
                pixel_enabled: Some(false),
                rainbow_enabled: (stored.color_mode != ColorMode::Off).then_some(false),
                ..Default::default()
            },
            Self::Minimal => FidelityOverrides {
                max_emojis_scale: Some(0.3),
                pixel_enabled: Some(false),
                rainbow_enabled: Some(false),
                wind_enabled: Some(false),
                color_mode: Some(ColorMode::Off),
            },
        }
    }
}

/// A level change made by the governor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub from: FidelityLevel,
    pub to: FidelityLevel,
    /// Average fps that triggered the change; None when forced by configuration
    pub average_fps: Option<f32>,
    pub diff: ConfigDiff,
}

pub struct PerformanceGovernor {
    level: FidelityLevel,
    samples: VecDeque<f32>,
    last_evaluation_ms: Option<f64>,
}

impl Default for PerformanceGovernor {
    fn default() -> Self {
        Self::new()
    }
}

impl PerformanceGovernor {
    pub fn new() -> Self {
        Self {
            level: FidelityLevel::Normal,
            samples: VecDeque::with_capacity(SAMPLE_CAPACITY),
            last_evaluation_ms: None,
        }
    }

    pub fn level(&self) -> FidelityLevel {
        self.level
    }

    /// Record one frame-rate sample, evicting the oldest when full
    pub fn record(&mut self, fps: f32) {
        if !fps.is_finite() || fps < 0.0 {
            return;
        }
        if self.samples.len() == SAMPLE_CAPACITY {
            self.samples.pop_front();
        }
        self.samples.push_back(fps);
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    pub fn average_fps(&self) -> Option<f32> {
        if self.samples.is_empty() {
            return None;
        }
        Some(self.samples.iter().sum::<f32>() / self.samples.len() as f32)
    }

    /// Evaluate the window and change level if warranted.
    ///
    /// Runs at most once per `EVALUATION_INTERVAL_MS`. Turning
    /// `fps_optimization_enabled` off restores `Normal` immediately.
    pub fn evaluate(&mut self, store: &mut ConfigStore, now_ms: f64) -> Option<Transition> {
        if !store.stored().fps_optimization_enabled {
            if self.level == FidelityLevel::Normal {
                return None;
            }
            return Some(self.transition(store, FidelityLevel::Normal, None));
        }

        match self.last_evaluation_ms {
            None => {
                self.last_evaluation_ms = Some(now_ms);
                return None;
            }
            Some(last) if now_ms - last < EVALUATION_INTERVAL_MS => return None,
            Some(_) => self.last_evaluation_ms = Some(now_ms),
        }

        if self.samples.len() < MIN_SAMPLES {
            return None;
        }
        let average = self.average_fps()?;

        let stored = store.stored();
        let reduced_threshold = stored.target_fps * (1.0 - stored.fps_sensitivity);
        let minimal_threshold = reduced_threshold * MINIMAL_FRACTION;
        let recovery_threshold = stored.target_fps * RECOVERY_FRACTION;

        let next = match self.level {
            FidelityLevel::Normal if average < reduced_threshold => FidelityLevel::Reduced,
            FidelityLevel::Reduced if average < minimal_threshold => FidelityLevel::Minimal,
            FidelityLevel::Reduced | FidelityLevel::Minimal if average >= recovery_threshold => {
                FidelityLevel::Normal
            }
            level => level,
        };
        if next == self.level {
            return None;
        }
        Some(self.transition(store, next, Some(average)))
    }

    fn transition(
        &mut self,
        store: &mut ConfigStore,
        to: FidelityLevel,
        average_fps: Option<f32>,
    ) -> Transition {
        let from = self.level;
        let diff = match to {
            FidelityLevel::Normal => store.clear_overrides(),
            _ => {
                let overrides = to.overrides(store.stored());
                store.set_overrides(overrides)
            }
        };
        self.level = to;
        // Judge the new level on fresh frames only
        self.samples.clear();

        match average_fps {
            Some(fps) => info!("Fidelity {:?} -> {:?} (avg {:.1} fps)", from, to, fps),
            None => info!("Fidelity {:?} -> {:?} (optimization disabled)", from, to),
        }
        Transition {
            from,
            to,
            average_fps,
            diff,
        }
    }

    /// Forget all samples and return to `Normal`
    pub fn reset(&mut self, store: &mut ConfigStore) {
        self.samples.clear();
        self.last_evaluation_ms = None;
        if self.level != FidelityLevel::Normal {
            store.clear_overrides();
            self.level = FidelityLevel::Normal;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(governor: &mut PerformanceGovernor, fps: f32, count: usize) {
        for _ in 0..count {
            governor.record(fps);
        }
    }

    /// Prime the evaluation clock at t=0 and return the next eligible time
    fn prime(governor: &mut PerformanceGovernor, store: &mut ConfigStore) -> f64 {
        assert!(governor.evaluate(store, 0.0).is_none());
        EVALUATION_INTERVAL_MS
    }

    #[test]
    fn test_window_is_bounded() {
        let mut governor = PerformanceGovernor::new();
        feed(&mut governor, 10.0, 100);
        assert_eq!(governor.sample_count(), SAMPLE_CAPACITY);
        governor.record(f32::NAN);
        assert_eq!(governor.sample_count(), SAMPLE_CAPACITY);
    }

    #[test]
    fn test_needs_min_samples_and_interval() {
        let mut store = ConfigStore::default();
        let mut governor = PerformanceGovernor::new();
        let t = prime(&mut governor, &mut store);

        feed(&mut governor, 10.0, MIN_SAMPLES - 1);
        assert!(governor.evaluate(&mut store, t).is_none());

        feed(&mut governor, 10.0, 1);
        assert!(governor.evaluate(&mut store, t + 500.0).is_none());
        let transition = governor.evaluate(&mut store, t + 1000.0).unwrap();
        assert_eq!(transition.to, FidelityLevel::Reduced);
    }

    #[test]
    fn test_reduce_then_recover() {
        let mut store = ConfigStore::new(OverlayConfig {
            pixel_enabled: true,
            rainbow_enabled: true,
            color_mode: ColorMode::Warm,
            ..Default::default()
        });
        let mut governor = PerformanceGovernor::new();
        let t = prime(&mut governor, &mut store);

        // 60 * (1 - 0.2) = 48 is the reduced threshold
        feed(&mut governor, 40.0, 20);
        let transition = governor.evaluate(&mut store, t).unwrap();
        assert_eq!(transition.from, FidelityLevel::Normal);
        assert_eq!(transition.to, FidelityLevel::Reduced);
        assert!(transition.diff.cap_changed);
        assert_eq!(store.effective().max_emojis_on_screen, 120);
        assert!(!store.effective().pixel_enabled);
        assert!(!store.effective().rainbow_enabled);
        assert_eq!(store.effective().color_mode, ColorMode::Warm);
        assert!(store.stored().pixel_enabled);

        feed(&mut governor, 58.0, 20);
        let transition = governor.evaluate(&mut store, t + 1000.0).unwrap();
        assert_eq!(transition.to, FidelityLevel::Normal);
        assert_eq!(store.effective(), store.stored());
        assert!(store.effective().pixel_enabled);
        assert!(store.effective().rainbow_enabled);
    }

    #[test]
    fn test_rainbow_kept_without_theme() {
        let stored = OverlayConfig {
            rainbow_enabled: true,
            ..Default::default()
        };
        let overrides = FidelityLevel::Reduced.overrides(&stored);
        assert_eq!(overrides.rainbow_enabled, None);
        assert!(overrides.apply_to(&stored).rainbow_enabled);
    }

    #[test]
    fn test_minimal_after_reduced() {
        let mut store = ConfigStore::new(OverlayConfig {
            wind_enabled: true,
            color_mode: ColorMode::Neon,
            ..Default::default()
        });
        let mut governor = PerformanceGovernor::new();
        let t = prime(&mut governor, &mut store);

        feed(&mut governor, 20.0, 20);
        assert_eq!(governor.evaluate(&mut store, t).unwrap().to, FidelityLevel::Reduced);

        // 48 * 0.7 = 33.6
        feed(&mut governor, 20.0, 20);
        let transition = governor.evaluate(&mut store, t + 1000.0).unwrap();
        assert_eq!(transition.to, FidelityLevel::Minimal);
        let effective = store.effective();
        assert_eq!(effective.max_emojis_on_screen, 60);
        assert!(!effective.wind_enabled);
        assert!(!effective.rainbow_enabled);
        assert_eq!(effective.color_mode, ColorMode::Off);
        assert_eq!(store.stored().color_mode, ColorMode::Neon);
    }

    #[test]
    fn test_middling_fps_holds_level() {
        let mut store = ConfigStore::default();
        let mut governor = PerformanceGovernor::new();
        let t = prime(&mut governor, &mut store);

        feed(&mut governor, 40.0, 20);
        governor.evaluate(&mut store, t).unwrap();
        feed(&mut governor, 50.0, 20);
        assert!(governor.evaluate(&mut store, t + 1000.0).is_none());
        assert_eq!(governor.level(), FidelityLevel::Reduced);
    }

    #[test]
    fn test_disabling_optimization_restores_normal() {
        let mut store = ConfigStore::default();
        let mut governor = PerformanceGovernor::new();
        let t = prime(&mut governor, &mut store);
        feed(&mut governor, 10.0, 20);
        governor.evaluate(&mut store, t).unwrap();
        assert!(!store.overrides().is_empty());

        store
            .apply_patch(&serde_json::json!({ "fps_optimization_enabled": false }))
            .unwrap();
        let transition = governor.evaluate(&mut store, t + 10.0).unwrap();
        assert_eq!(transition.to, FidelityLevel::Normal);
        assert!(transition.average_fps.is_none());
        assert!(store.overrides().is_empty());

        feed(&mut governor, 10.0, 20);
        assert!(governor.evaluate(&mut store, t + 5000.0).is_none());
    }
}
