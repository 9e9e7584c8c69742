use std::num::ParseFloatError;

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// Point struct that holds a vertex position read from a point cloud file
#[derive(Clone, Copy, PartialEq, Serialize, Deserialize, Debug)]
pub struct Point {
    position: Point3<f64>,
}

/// Classification of a single data line
#[derive(Debug, PartialEq)]
pub enum Fields {
    /// less than three space separated fields
    TooFew,
    Point(Point),
    /// one of the first three fields is not a real number
    Malformed(ParseFloatError),
}

impl Point {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            position: Point3::new(x, y, z),
        }
    }

    pub fn position(&self) -> &Point3<f64> {
        &self.position
    }

    pub fn x(&self) -> f64 {
        self.position.x
    }

    pub fn y(&self) -> f64 {
        self.position.y
    }

    pub fn z(&self) -> f64 {
        self.position.z
    }

    /// Splits the line on single spaces and reads the first three fields as x, y, z.
    /// Fields after the third are ignored.
    pub fn try_parse_fields(line: &str) -> Fields {
        let mut split = line.split(' ');
        let (x, y, z) = match (split.next(), split.next(), split.next()) {
            (Some(x), Some(y), Some(z)) => (x, y, z),
            _ => return Fields::TooFew,
        };
        let parsed = x
            .parse::<f64>()
            .and_then(|x| y.parse::<f64>().map(|y| (x, y)))
            .and_then(|(x, y)| z.parse::<f64>().map(|z| (x, y, z)));
        match parsed {
            Ok((x, y, z)) => Fields::Point(Point::new(x, y, z)),
            Err(e) => Fields::Malformed(e),
        }
    }
}

impl From<Point3<f64>> for Point {
    fn from(position: Point3<f64>) -> Self {
        Self { position }
    }
}

impl From<Point> for Point3<f64> {
    fn from(point: Point) -> Self {
        point.position
    }
}
