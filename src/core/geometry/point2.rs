use super::super::pbrt::Float;
use std::fmt;
use std::ops::{Add, Sub};

/// Representation of a 2D point with floating point components.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
#[repr(C)]
pub struct Point2f {
    pub x: Float,
    pub y: Float,
}

impl Point2f {
    #[inline]
    pub fn new(x: Float, y: Float) -> Point2f {
        Point2f { x, y }
    }

    #[inline]
    pub fn has_nans(&self) -> bool {
        self.x.is_nan() || self.y.is_nan()
    }
}

impl Add for Point2f {
    type Output = Point2f;
    fn add(self, o: Point2f) -> Point2f {
        Point2f::new(self.x + o.x, self.y + o.y)
    }
}

impl Sub for Point2f {
    type Output = Point2f;
    fn sub(self, o: Point2f) -> Point2f {
        Point2f::new(self.x - o.x, self.y - o.y)
    }
}

impl fmt::Display for Point2f {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.x, self.y)
    }
}

/// Representation of a 2D point with integer components.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(C)]
pub struct Point2i {
    pub x: i32,
    pub y: i32,
}

impl Point2i {
    #[inline]
    pub fn new(x: i32, y: i32) -> Point2i {
        Point2i { x, y }
    }
}

impl Add for Point2i {
    type Output = Point2i;
    fn add(self, o: Point2i) -> Point2i {
        Point2i::new(self.x + o.x, self.y + o.y)
    }
}

impl Sub for Point2i {
    type Output = Point2i;
    fn sub(self, o: Point2i) -> Point2i {
        Point2i::new(self.x - o.x, self.y - o.y)
    }
}

impl fmt::Display for Point2i {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.x, self.y)
    }
}
