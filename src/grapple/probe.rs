//! Grapple domain: collision query adapter.
//!
//! The simulation core in [`super::sim`] never touches the physics engine
//! directly; it goes through [`CollisionProbe`], so the whole pendulum model
//! can be exercised headlessly in tests with stub worlds.

use avian2d::prelude::*;
use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeHit {
    pub point: Vec2,
    pub normal: Vec2,
    pub distance: f32,
}

pub trait CollisionProbe {
    /// Cast a ray; `dir` need not be normalized. Degenerate directions miss.
    fn ray_cast(&self, origin: Vec2, dir: Vec2, max_dist: f32) -> Option<ProbeHit>;

    /// Sweep an axis-aligned box of the given half extents along `dir`.
    fn sweep_box(
        &self,
        origin: Vec2,
        half_extents: Vec2,
        dir: Vec2,
        max_dist: f32,
    ) -> Option<ProbeHit>;
}

/// The live probe: avian's `SpatialQuery` restricted to a layer filter.
pub struct SpatialProbe<'a, 'w, 's> {
    pub query: &'a SpatialQuery<'w, 's>,
    pub filter: SpatialQueryFilter,
}

impl<'a, 'w, 's> SpatialProbe<'a, 'w, 's> {
    pub fn new(query: &'a SpatialQuery<'w, 's>, filter: SpatialQueryFilter) -> Self {
        Self { query, filter }
    }
}

impl CollisionProbe for SpatialProbe<'_, '_, '_> {
    fn ray_cast(&self, origin: Vec2, dir: Vec2, max_dist: f32) -> Option<ProbeHit> {
        let dir = Dir2::new(dir).ok()?;
        let hit = self
            .query
            .cast_ray(origin, dir, max_dist, true, &self.filter)?;
        Some(ProbeHit {
            point: origin + *dir * hit.distance,
            normal: hit.normal,
            distance: hit.distance,
        })
    }

    fn sweep_box(
        &self,
        origin: Vec2,
        half_extents: Vec2,
        dir: Vec2,
        max_dist: f32,
    ) -> Option<ProbeHit> {
        let dir = Dir2::new(dir).ok()?;
        let shape = Collider::rectangle(half_extents.x * 2.0, half_extents.y * 2.0);
        let hit = self.query.cast_shape(
            &shape,
            origin,
            0.0,
            dir,
            &ShapeCastConfig::from_max_distance(max_dist),
            &self.filter,
        )?;
        Some(ProbeHit {
            point: hit.point1,
            normal: hit.normal1,
            distance: hit.distance,
        })
    }
}
