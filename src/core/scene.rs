use super::error::ConfigError;
use super::geometry::{Ray, Vector3f};
use super::interaction::SurfaceInteraction;
use super::light::Light;
use super::primitive::Primitive;
use super::stats_accumulator::StatsAccumulator;
use std::sync::Arc;

/// A capture scene: a handful of primitives (one of which must be the
/// relay wall), and the laser. Scenes this small are traced with a linear
/// aggregate; acceleration structures live in the host framework.
pub struct Scene {
    pub primitives: Vec<Arc<Primitive>>,
    pub light: Arc<dyn Light>,
    relay_wall: Arc<Primitive>,
}

impl Scene {
    pub fn new(
        primitives: Vec<Arc<Primitive>>,
        light: Arc<dyn Light>,
    ) -> Result<Scene, ConfigError> {
        let relay_wall = primitives
            .iter()
            .find(|p| p.is_relay_wall())
            .cloned()
            .ok_or(ConfigError::NoRelayWall)?;
        info!(
            "Created scene with {} primitives, light {}",
            primitives.len(),
            light
        );
        Ok(Scene {
            primitives,
            light,
            relay_wall,
        })
    }

    pub fn relay_wall(&self) -> &Arc<Primitive> {
        &self.relay_wall
    }

    /// Primitives flagged as hidden geometry.
    pub fn hidden_primitives(&self) -> Vec<Arc<Primitive>> {
        self.primitives
            .iter()
            .filter(|p| !p.is_relay_wall())
            .cloned()
            .collect()
    }

    pub fn intersect(&self, ray: &Ray) -> Option<SurfaceInteraction> {
        StatsAccumulator::instance().report_counter("Intersections/Ray intersection tests", 1);
        debug_assert!(ray.d != Vector3f::default());
        let mut closest: Option<SurfaceInteraction> = None;
        let mut pruned = *ray;
        for prim in &self.primitives {
            if let Some(hit) = prim.shape.intersect(&pruned) {
                pruned.t_max = hit.t;
                closest = Some(SurfaceInteraction {
                    p: hit.p,
                    n: hit.n,
                    wo: -ray.d,
                    uv: hit.uv,
                    t: hit.t,
                    primitive: prim.clone(),
                });
            }
        }
        closest
    }

    pub fn intersect_p(&self, ray: &Ray) -> bool {
        StatsAccumulator::instance().report_counter("Intersections/Shadow ray intersection tests", 1);
        debug_assert!(ray.d != Vector3f::default());
        self.primitives.iter().any(|p| p.shape.intersect_p(ray))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::{Point3f, Vector3f};
    use crate::core::light::ProjectorLight;
    use crate::core::pbrt::Spectrum;
    use crate::core::primitive::SurfaceCategory;
    use crate::core::reflection::LambertianReflection;
    use crate::core::shape::Rectangle;

    fn test_light() -> Arc<dyn Light> {
        Arc::new(
            ProjectorLight::new(
                Point3f::new(0.0, 0.0, 1.0),
                Point3f::zero(),
                5.0,
                Spectrum::new(1.0),
            )
            .unwrap(),
        )
    }

    fn wall() -> Arc<Primitive> {
        Arc::new(Primitive::new(
            Arc::new(
                Rectangle::new(
                    Point3f::new(-1.0, -1.0, 0.0),
                    Vector3f::new(2.0, 0.0, 0.0),
                    Vector3f::new(0.0, 2.0, 0.0),
                )
                .unwrap(),
            ),
            Arc::new(LambertianReflection::new(Spectrum::new(0.7))),
            SurfaceCategory::RelayWall,
            "wall",
        ))
    }

    #[test]
    fn requires_a_relay_wall() {
        let scene = Scene::new(Vec::new(), test_light());
        assert!(scene.is_err());
    }

    #[test]
    fn closest_hit_wins() {
        let near = Arc::new(Primitive::new(
            Arc::new(
                Rectangle::new(
                    Point3f::new(-1.0, -1.0, 0.5),
                    Vector3f::new(2.0, 0.0, 0.0),
                    Vector3f::new(0.0, 2.0, 0.0),
                )
                .unwrap(),
            ),
            Arc::new(LambertianReflection::new(Spectrum::new(0.5))),
            SurfaceCategory::HiddenGeometry,
            "occluder",
        ));
        let scene = Scene::new(vec![wall(), near], test_light()).unwrap();
        let ray = Ray::new(Point3f::new(0.0, 0.0, 2.0), Vector3f::new(0.0, 0.0, -1.0));
        let isect = scene.intersect(&ray).unwrap();
        assert_eq!(isect.primitive.name, "occluder");
        assert!((isect.t - 1.5).abs() < 1e-5);
        assert!(scene.intersect_p(&ray));
    }
}
