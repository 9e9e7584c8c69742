use std::iter::FromIterator;

use nalgebra::{Point3, Vector3};
use serde::Serialize;

use crate::point::Point;

/// Axis aligned bounds of a set of loaded points
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BoundingBox {
    min: Point3<f64>,
    max: Point3<f64>,
}

impl Default for BoundingBox {
    /// inverted box that any extension overwrites
    fn default() -> Self {
        Self {
            min: Point3::from(Vector3::from_element(f64::MAX)),
            max: Point3::from(Vector3::from_element(f64::MIN)),
        }
    }
}

impl BoundingBox {
    pub fn min(&self) -> &Point3<f64> {
        &self.min
    }

    pub fn max(&self) -> &Point3<f64> {
        &self.max
    }

    /// true until at least one point has been added
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn size(&self) -> Vector3<f64> {
        self.max - self.min
    }

    pub fn center(&self) -> Point3<f64> {
        let p = (self.max.coords + self.min.coords) * 0.5;
        Point3::from(p)
    }

    pub fn extend(&mut self, p: &Point3<f64>) {
        self.min = self.min.inf(p);
        self.max = self.max.sup(p);
    }
}

impl<'a> FromIterator<&'a Point> for BoundingBox {
    fn from_iter<I: IntoIterator<Item = &'a Point>>(iter: I) -> Self {
        let mut b = Self::default();
        for p in iter {
            b.extend(p.position());
        }
        b
    }
}
