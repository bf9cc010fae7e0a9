//! Static floor and side walls sized to the rendering surface

use crate::world::PhysicsWorld;
use drizzle_core::{OverlayConfig, SurfaceSize};
use rapier2d::prelude::*;

/// Thickness of every boundary slab in pixels
pub const WALL_THICKNESS: f32 = 60.0;
/// Extra length added past each end of a slab so small resizes stay covered
pub const WALL_OVERHANG: f32 = 200.0;
/// Collider shapes are only rebuilt when the surface changes by more than this
pub const RESHAPE_THRESHOLD: f32 = WALL_OVERHANG / 2.0;

/// One static slab: a fixed body with a single cuboid collider
#[derive(Debug, Clone, Copy)]
struct Slab {
    body: RigidBodyHandle,
    collider: ColliderHandle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlabKind {
    Floor,
    LeftWall,
    RightWall,
}

impl SlabKind {
    fn center(self, size: SurfaceSize) -> Vector<Real> {
        let half = WALL_THICKNESS / 2.0;
        match self {
            SlabKind::Floor => Vector::new(size.width / 2.0, size.height + half),
            SlabKind::LeftWall => Vector::new(-half, size.height / 2.0),
            SlabKind::RightWall => Vector::new(size.width + half, size.height / 2.0),
        }
    }

    fn half_extents(self, size: SurfaceSize) -> (f32, f32) {
        let half = WALL_THICKNESS / 2.0;
        match self {
            SlabKind::Floor => (size.width / 2.0 + WALL_OVERHANG, half),
            // Walls reach well above the top edge, where particles are spawned
            SlabKind::LeftWall | SlabKind::RightWall => (half, size.height + WALL_OVERHANG),
        }
    }
}

/// Owns the collidable floor and walls.
///
/// The floor is physically absent from the simulation while disabled; it is
/// not kept around as a sensor or a flagged body.
pub struct BoundaryManager {
    size: SurfaceSize,
    /// Size the collider shapes were last built for
    shaped_for: SurfaceSize,
    floor: Option<Slab>,
    left: Slab,
    right: Slab,
    restitution: f32,
    friction: f32,
}

impl BoundaryManager {
    /// Build boundaries for the configured surface
    pub fn new(world: &mut PhysicsWorld, config: &OverlayConfig) -> Self {
        let size = config.surface_size();
        let restitution = config.physics_restitution;
        let friction = config.physics_friction;

        let left = insert_slab(world, SlabKind::LeftWall, size, restitution, friction);
        let right = insert_slab(world, SlabKind::RightWall, size, restitution, friction);
        let floor = config
            .floor_enabled
            .then(|| insert_slab(world, SlabKind::Floor, size, restitution, friction));

        Self {
            size,
            shaped_for: size,
            floor,
            left,
            right,
            restitution,
            friction,
        }
    }

    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    pub fn floor_enabled(&self) -> bool {
        self.floor.is_some()
    }

    /// Collider handle of the floor, if it is in the simulation
    pub fn floor_collider(&self) -> Option<ColliderHandle> {
        self.floor.map(|f| f.collider)
    }

    pub fn is_floor(&self, collider: ColliderHandle) -> bool {
        self.floor_collider() == Some(collider)
    }

    /// Floor top edge in surface coordinates
    pub fn floor_top(&self) -> f32 {
        self.size.height
    }

    /// Move the boundaries to fit a new surface size.
    ///
    /// Bodies are repositioned in place; collider shapes are rebuilt only when
    /// the change since the last rebuild exceeds `RESHAPE_THRESHOLD`.
    pub fn resize(&mut self, world: &mut PhysicsWorld, size: SurfaceSize) {
        if size == self.size {
            return;
        }
        self.size = size;
        let reshape = self.shaped_for.max_delta(&size) > RESHAPE_THRESHOLD;
        if reshape {
            self.shaped_for = size;
        }

        for (kind, slab) in self.slabs() {
            if let Some(body) = world.get_rigid_body_mut(slab.body) {
                body.set_translation(kind.center(size), true);
            }
            if reshape {
                if let Some(collider) = world.collider_set.get_mut(slab.collider) {
                    let (hx, hy) = kind.half_extents(size);
                    collider.set_shape(SharedShape::cuboid(hx, hy));
                }
            }
        }
        tracing::debug!(
            width = size.width,
            height = size.height,
            reshape,
            "boundaries resized"
        );
    }

    /// Add or remove the floor from the simulation.
    ///
    /// Returns true when the floor's presence changed.
    pub fn set_floor_enabled(&mut self, world: &mut PhysicsWorld, enabled: bool) -> bool {
        match (enabled, self.floor) {
            (true, None) => {
                self.floor = Some(insert_slab(
                    world,
                    SlabKind::Floor,
                    self.size,
                    self.restitution,
                    self.friction,
                ));
                true
            }
            (false, Some(floor)) => {
                world.remove_rigid_body(floor.body);
                self.floor = None;
                // Particles resting on the floor must start falling next step
                world.wake_dynamic_bodies();
                true
            }
            _ => false,
        }
    }

    /// Mirror the configured restitution and friction onto every boundary
    pub fn apply_material(&mut self, world: &mut PhysicsWorld, restitution: f32, friction: f32) {
        self.restitution = restitution;
        self.friction = friction;
        for (_, slab) in self.slabs() {
            if let Some(collider) = world.collider_set.get_mut(slab.collider) {
                collider.set_restitution(restitution);
                collider.set_friction(friction);
            }
        }
    }

    fn slabs(&self) -> Vec<(SlabKind, Slab)> {
        let mut slabs = vec![(SlabKind::LeftWall, self.left), (SlabKind::RightWall, self.right)];
        if let Some(floor) = self.floor {
            slabs.push((SlabKind::Floor, floor));
        }
        slabs
    }
}

fn insert_slab(
    world: &mut PhysicsWorld,
    kind: SlabKind,
    size: SurfaceSize,
    restitution: f32,
    friction: f32,
) -> Slab {
    let body = world.insert_rigid_body(
        RigidBodyBuilder::fixed()
            .translation(kind.center(size))
            .build(),
    );
    let (hx, hy) = kind.half_extents(size);
    let collider = world.insert_collider_with_parent(
        ColliderBuilder::cuboid(hx, hy)
            .restitution(restitution)
            .friction(friction)
            .build(),
        body,
    );
    Slab { body, collider }
}
