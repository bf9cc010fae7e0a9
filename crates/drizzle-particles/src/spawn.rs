//! Spawn notifications and single-particle spawn requests

/// A request to spawn one or more particles
///
/// Every field except `count` is optional; unset fields get defaults at
/// spawn time (random symbol, random x, top of the surface for y).
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnEvent {
    pub count: u32,
    pub symbol: Option<String>,
    /// Pixels, or a surface fraction when within `[0, 1]`
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub username: Option<String>,
    /// Multiply `count` by the configured burst intensity
    pub burst: bool,
    /// Per-user color override
    pub color: Option<String>,
}

impl Default for SpawnEvent {
    fn default() -> Self {
        Self {
            count: 1,
            symbol: None,
            x: None,
            y: None,
            username: None,
            burst: false,
            color: None,
        }
    }
}

impl SpawnEvent {
    pub fn new(count: u32) -> Self {
        Self {
            count,
            ..Default::default()
        }
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn burst(mut self) -> Self {
        self.burst = true;
        self
    }
}

/// Fully resolved parameters for one particle
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnRequest {
    /// Used unless the username maps to a preferred symbol
    pub symbol_hint: String,
    /// Surface pixels
    pub x: f32,
    pub y: f32,
    /// Diameter; random within the configured range when None
    pub size: Option<f32>,
    pub username: Option<String>,
    pub color: Option<String>,
}

impl SpawnRequest {
    pub fn at(symbol_hint: impl Into<String>, x: f32, y: f32) -> Self {
        Self {
            symbol_hint: symbol_hint.into(),
            x,
            y,
            size: None,
            username: None,
            color: None,
        }
    }
}
