use crate::vec3::{Point3, Vec3};

/// A parametric ray `R(t) = origin + t·direction` with an inclusive
/// parametric interval `[t_min, t_max]`.
///
/// `direction` is deliberately NOT required to be unit length — both the
/// Möller–Trumbore intersection and the grid DDA traversal depend on the
/// un-normalized direction (§9 open question 4). Rays are created, read, and
/// discarded; nothing past construction mutates them (§5, §9 "Global
/// mutable ray state" — the brute-force scene path tracks bounds in locals
/// instead of aliasing into the ray).
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Point3,
    pub direction: Vec3,
    pub t_min: f64,
    pub t_max: f64,
}

impl Ray {
    pub const fn new(origin: Point3, direction: Vec3, t_min: f64, t_max: f64) -> Self {
        Self {
            origin,
            direction,
            t_min,
            t_max,
        }
    }

    /// A primary ray, using the default `t_min = 0.1` the camera casts with.
    pub const fn primary(origin: Point3, direction: Vec3) -> Self {
        Self::new(origin, direction, 0.1, f64::INFINITY)
    }

    /// A spawned ray (reflection, diffuse bounce) that guards against
    /// self-intersection by widening `t_min` rather than offsetting the
    /// origin. Shadow rays and dielectric reflect/refract rays need the
    /// origin offset instead (§4.9) and are constructed directly with
    /// [`Ray::new`] at their call sites.
    pub const fn spawned(origin: Point3, direction: Vec3) -> Self {
        Self::new(origin, direction, 1e-3, f64::INFINITY)
    }

    #[inline(always)]
    pub fn point_at(&self, t: f64) -> Point3 {
        self.origin + self.direction * t
    }
}
