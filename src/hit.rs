use crate::triangle::Triangle;
use crate::vec3::Point3;

/// The `(t, hit_point, triangle)` tuple every acceleration structure and
/// `Scene::hit` return on a successful intersection (§4.7).
#[derive(Debug, Clone, Copy)]
pub struct Hit<'a> {
    pub t: f64,
    pub point: Point3,
    pub triangle: &'a Triangle,
}

impl<'a> Hit<'a> {
    pub fn new(t: f64, point: Point3, triangle: &'a Triangle) -> Self {
        Self { t, point, triangle }
    }

    /// Keeps `self` unless `other` is closer, returning whichever hit has
    /// the smaller `t`. Used by every accelerator to merge child results.
    pub fn closer(self, other: Option<Hit<'a>>) -> Hit<'a> {
        match other {
            Some(o) if o.t < self.t => o,
            _ => self,
        }
    }
}

/// Picks the closer of two optional hits.
pub fn closer_of<'a>(a: Option<Hit<'a>>, b: Option<Hit<'a>>) -> Option<Hit<'a>> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.closer(Some(b))),
        (Some(a), None) => Some(a),
        (None, b) => b,
    }
}
