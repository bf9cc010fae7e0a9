//! Headless overlay run

use anyhow::{bail, Context, Result};
use drizzle_core::{OverlayConfig, SurfaceSize};
use drizzle_overlay::{ConfigSource, FileSource, HttpSource, OverlayEngine};
use drizzle_particles::{HeadlessSurface, SpawnEvent};
use drizzle_runtime::OverlayEvent;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tracing::warn;

pub struct RunArgs {
    pub config: Option<String>,
    pub user_symbols: Option<String>,
    pub url: Option<String>,
    pub frames: u64,
    pub fps: f64,
    pub spawn: u32,
    pub burst: Option<u32>,
    pub likes: Option<u32>,
    pub gift: Option<u32>,
    pub events: Option<String>,
    pub size: Option<(f32, f32)>,
    pub seed: Option<u32>,
    pub realtime: bool,
    pub readout_every: Option<u64>,
}

pub fn run(args: RunArgs) -> Result<()> {
    if !args.fps.is_finite() || args.fps <= 0.0 {
        bail!("--fps must be positive");
    }

    let source: Option<Box<dyn ConfigSource>> = match (&args.config, &args.url) {
        (_, Some(url)) => Some(Box::new(HttpSource::new(url.clone()))),
        (Some(path), None) => {
            let mut source = FileSource::new(path);
            if let Some(symbols) = &args.user_symbols {
                source = source.with_user_symbols(symbols);
            }
            Some(Box::new(source))
        }
        (None, None) => None,
    };

    // A configured source must work at startup; later refreshes may fail
    let initial = match &source {
        Some(source) => source
            .fetch_config()
            .with_context(|| format!("Failed to load configuration from {}", source.name()))?,
        None => OverlayConfig::default(),
    };

    let mut engine = match args.seed {
        Some(seed) => OverlayEngine::with_seed(initial, HeadlessSurface::new(), seed),
        None => OverlayEngine::new(initial, HeadlessSurface::new()),
    };
    if let Some(source) = &source {
        match source.fetch_user_symbols() {
            Ok(symbols) => engine.push(OverlayEvent::UserSymbols(symbols)),
            Err(e) => warn!("No user symbol map from {}: {}", source.name(), e),
        }
    }
    if let Some((width, height)) = args.size {
        engine.resize(SurfaceSize::new(width, height));
    }

    let mut scheduled = match &args.events {
        Some(path) => load_event_script(path)?,
        None => BTreeMap::new(),
    };
    let first = scheduled.entry(0).or_default();
    if args.spawn > 0 {
        first.push(OverlayEvent::Spawn(SpawnEvent::new(args.spawn)));
    }
    if let Some(count) = args.burst {
        first.push(OverlayEvent::Spawn(SpawnEvent::new(count).burst()));
    }
    if let Some(count) = args.likes {
        first.push(OverlayEvent::Likes {
            count,
            username: None,
        });
    }
    if let Some(coins) = args.gift {
        first.push(OverlayEvent::Gift {
            coins,
            username: None,
            symbol: None,
        });
    }

    let frame_interval = Duration::from_secs_f64(1.0 / args.fps);
    for frame in 0..args.frames {
        if let Some(events) = scheduled.remove(&frame) {
            for event in events {
                engine.push(event);
            }
        }

        let started = Instant::now();
        let report = if args.realtime {
            engine.frame_realtime()
        } else {
            engine.frame(1.0 / args.fps)
        };
        if report.is_err() {
            // Torn down by a scripted event
            break;
        }

        if let Some(every) = args.readout_every.filter(|n| *n > 0) {
            if (frame + 1) % every == 0 {
                println!("{}", serde_json::to_string(&engine.readout())?);
            }
        }
        if args.realtime {
            if let Some(rest) = frame_interval.checked_sub(started.elapsed()) {
                std::thread::sleep(rest);
            }
        }
    }

    println!("{}", serde_json::to_string_pretty(&engine.readout())?);
    engine.teardown();
    Ok(())
}

/// Read a JSON-lines event script into per-frame buckets
fn load_event_script(path: &str) -> Result<BTreeMap<u64, Vec<OverlayEvent>>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read event script {}", path))?;

    let mut scheduled: BTreeMap<u64, Vec<OverlayEvent>> = BTreeMap::new();
    for (n, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let value: Value = serde_json::from_str(line)
            .with_context(|| format!("{}:{}: invalid JSON", path, n + 1))?;
        let event = OverlayEvent::from_json(&value)
            .with_context(|| format!("{}:{}: invalid event", path, n + 1))?;
        let frame = value.get("frame").and_then(Value::as_u64).unwrap_or(0);
        scheduled.entry(frame).or_default().push(event);
    }
    Ok(scheduled)
}
