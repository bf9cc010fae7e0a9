//! Rendering surface seam
//!
//! The lifecycle layer never touches a concrete renderer. It talks to a
//! `RenderSurface`, which hands out opaque `SpriteHandle`s. `HeadlessSurface`
//! is an arena-backed implementation used by the CLI and by tests.

/// Opaque handle to one renderable element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpriteHandle(pub u64);

/// Everything a renderer needs to draw one particle
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteAttributes {
    /// Top-left corner in surface pixels
    pub x: f32,
    pub y: f32,
    /// Width and height in pixels
    pub size: f32,
    /// Radians, clockwise on screen
    pub rotation: f32,
    pub opacity: f32,
    /// Composed CSS-style filter chain; empty when no effect applies
    pub filter: String,
    /// Pixelation granularity when pixelation is active
    pub pixel_size: Option<u32>,
    /// The one-shot bounce effect is showing
    pub bouncing: bool,
}

/// A surface particles can be drawn on
pub trait RenderSurface {
    /// Create a sprite that is already positioned at `initial`.
    ///
    /// Implementations must apply `initial` before the sprite can be drawn,
    /// so it never flashes at the surface origin. Returns None if the
    /// surface cannot allocate a sprite.
    fn create_sprite(&mut self, symbol: &str, initial: &SpriteAttributes) -> Option<SpriteHandle>;

    /// Update a sprite. Returns false if the handle is unknown.
    fn update_sprite(&mut self, handle: SpriteHandle, attributes: &SpriteAttributes) -> bool;

    /// Release a sprite. Returns false if the handle is unknown.
    fn release_sprite(&mut self, handle: SpriteHandle) -> bool;

    /// Number of sprites currently allocated
    fn sprite_count(&self) -> usize;
}

/// Sprite state kept by `HeadlessSurface`
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessSprite {
    pub symbol: String,
    /// Attributes the sprite was created with
    pub initial: SpriteAttributes,
    pub current: SpriteAttributes,
    pub updates: u32,
}

/// In-memory surface backed by an ECS arena
pub struct HeadlessSurface {
    sprites: hecs::World,
    created: u64,
    released: u64,
}

impl Default for HeadlessSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self {
            sprites: hecs::World::new(),
            created: 0,
            released: 0,
        }
    }

    pub fn sprite(&self, handle: SpriteHandle) -> Option<HeadlessSprite> {
        let entity = hecs::Entity::from_bits(handle.0)?;
        self.sprites
            .get::<&HeadlessSprite>(entity)
            .ok()
            .map(|s| (*s).clone())
    }

    /// All live sprites, in no particular order
    pub fn sprites(&self) -> Vec<(SpriteHandle, HeadlessSprite)> {
        self.sprites
            .query::<&HeadlessSprite>()
            .iter()
            .map(|(entity, sprite)| (SpriteHandle(entity.to_bits().get()), sprite.clone()))
            .collect()
    }

    /// Total sprites ever created
    pub fn created(&self) -> u64 {
        self.created
    }

    /// Total sprites ever released
    pub fn released(&self) -> u64 {
        self.released
    }
}

impl RenderSurface for HeadlessSurface {
    fn create_sprite(&mut self, symbol: &str, initial: &SpriteAttributes) -> Option<SpriteHandle> {
        let entity = self.sprites.spawn((HeadlessSprite {
            symbol: symbol.to_string(),
            initial: initial.clone(),
            current: initial.clone(),
            updates: 0,
        },));
        self.created += 1;
        Some(SpriteHandle(entity.to_bits().get()))
    }

    fn update_sprite(&mut self, handle: SpriteHandle, attributes: &SpriteAttributes) -> bool {
        let Some(entity) = hecs::Entity::from_bits(handle.0) else {
            return false;
        };
        match self.sprites.get::<&mut HeadlessSprite>(entity) {
            Ok(mut sprite) => {
                sprite.current = attributes.clone();
                sprite.updates += 1;
                true
            }
            Err(_) => false,
        }
    }

    fn release_sprite(&mut self, handle: SpriteHandle) -> bool {
        let Some(entity) = hecs::Entity::from_bits(handle.0) else {
            return false;
        };
        let released = self.sprites.despawn(entity).is_ok();
        if released {
            self.released += 1;
        }
        released
    }

    fn sprite_count(&self) -> usize {
        self.sprites.len() as usize
    }
}
