//! Inbound notifications and lenient payload parsing
//!
//! Payloads arrive as loosely-typed JSON from upstream glue. Individual
//! fields that are missing or of the wrong type fall back to defaults
//! instead of rejecting the whole notification.

use drizzle_core::{DrizzleError, OverlayConfig, Result, SurfaceSize, UserSymbolMap};
use drizzle_particles::SpawnEvent;
use serde_json::Value;

/// Everything the engine can be told between frames
#[derive(Debug, Clone)]
pub enum OverlayEvent {
    Spawn(SpawnEvent),
    /// A batch of likes, converted through the like scaling rule
    Likes {
        count: u32,
        username: Option<String>,
    },
    /// A gift worth `coins`, converted through the gift scaling rule
    Gift {
        coins: u32,
        username: Option<String>,
        symbol: Option<String>,
    },
    /// Partial configuration, merged key by key
    ConfigUpdate(Value),
    /// Full configuration snapshot
    ConfigReplace(Box<OverlayConfig>),
    Toggle {
        enabled: bool,
    },
    UserSymbols(UserSymbolMap),
    Resize(SurfaceSize),
    Teardown,
}

impl OverlayEvent {
    /// Short name used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            OverlayEvent::Spawn(_) => "spawn",
            OverlayEvent::Likes { .. } => "likes",
            OverlayEvent::Gift { .. } => "gift",
            OverlayEvent::ConfigUpdate(_) => "config",
            OverlayEvent::ConfigReplace(_) => "config_replace",
            OverlayEvent::Toggle { .. } => "toggle",
            OverlayEvent::UserSymbols(_) => "user_symbols",
            OverlayEvent::Resize(_) => "resize",
            OverlayEvent::Teardown => "teardown",
        }
    }

    /// Parse a `{"type": ..., ...}` notification.
    ///
    /// Only an unknown or missing `type` is an error; everything else is
    /// parsed leniently.
    pub fn from_json(value: &Value) -> Result<Self> {
        let Some(obj) = value.as_object() else {
            return Err(DrizzleError::ParseError(
                "event must be a JSON object".to_string(),
            ));
        };
        let kind = obj
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| DrizzleError::ParseError("event has no 'type'".to_string()))?;

        let event = match kind {
            "spawn" => OverlayEvent::Spawn(parse_spawn(value)),
            "likes" => OverlayEvent::Likes {
                count: json_u32(obj.get("count"), 0),
                username: json_string(obj.get("username")),
            },
            "gift" => OverlayEvent::Gift {
                coins: json_u32(obj.get("coins"), 0),
                username: json_string(obj.get("username")),
                symbol: json_string(obj.get("symbol")),
            },
            "config" => {
                OverlayEvent::ConfigUpdate(obj.get("config").cloned().unwrap_or(Value::Null))
            }
            "config_replace" => {
                let payload = obj.get("config").cloned().unwrap_or(Value::Null);
                let (config, _) = OverlayConfig::from_json_lenient(&payload);
                OverlayEvent::ConfigReplace(Box::new(config))
            }
            "toggle" => OverlayEvent::Toggle {
                enabled: obj.get("enabled").and_then(Value::as_bool).unwrap_or(true),
            },
            "user_symbols" => {
                let mappings = obj.get("mappings").cloned().unwrap_or(Value::Null);
                OverlayEvent::UserSymbols(parse_user_symbols(&mappings))
            }
            "resize" => {
                let d = SurfaceSize::default();
                OverlayEvent::Resize(SurfaceSize::new(
                    json_f32(obj.get("width")).unwrap_or(d.width),
                    json_f32(obj.get("height")).unwrap_or(d.height),
                ))
            }
            "teardown" => OverlayEvent::Teardown,
            other => {
                return Err(DrizzleError::ParseError(format!(
                    "unknown event type '{other}'"
                )))
            }
        };
        Ok(event)
    }
}

/// Parse a spawn payload field by field, defaulting anything malformed
pub fn parse_spawn(value: &Value) -> SpawnEvent {
    let mut event = SpawnEvent::default();
    let Some(obj) = value.as_object() else {
        return event;
    };

    if let Some(v) = obj.get("count") {
        event.count = json_u32(Some(v), event.count);
    }
    event.symbol = json_string(obj.get("symbol")).or_else(|| json_string(obj.get("emoji")));
    event.x = json_f32(obj.get("x"));
    event.y = json_f32(obj.get("y"));
    event.username = json_string(obj.get("username"));
    event.color = json_string(obj.get("color"));
    if let Some(v) = obj.get("burst").and_then(Value::as_bool) {
        event.burst = v;
    }
    event
}

/// Parse a username -> symbol object, skipping non-string values
pub fn parse_user_symbols(value: &Value) -> UserSymbolMap {
    let map: std::collections::HashMap<String, String> = value
        .as_object()
        .map(|obj| {
            obj.iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                .collect()
        })
        .unwrap_or_default();
    UserSymbolMap::from(map)
}

fn json_f32(value: Option<&Value>) -> Option<f32> {
    let v = match value? {
        Value::Number(n) => n.as_f64()? as f32,
        Value::String(s) => s.trim().parse::<f32>().ok()?,
        _ => return None,
    };
    v.is_finite().then_some(v)
}

fn json_u32(value: Option<&Value>, default: u32) -> u32 {
    match json_f32(value) {
        Some(v) if v >= 0.0 => v.floor().min(u32::MAX as f32) as u32,
        _ => default,
    }
}

fn json_string(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
