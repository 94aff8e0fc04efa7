//! Particle shapes and their digitization predicate.

use std::f64::consts::PI;

/// Geometry of one particle kind. Lengths are in cells, angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// Axis-aligned rectangle
    Rectangle { width: f64, height: f64 },
    /// Rectangle rotated counter-clockwise by `angle`
    SlopedRectangle { width: f64, height: f64, angle: f64 },
    /// Disc
    Circle { radius: f64 },
    /// Ellipse with its major axis rotated by `angle`
    Ellipse {
        semi_major: f64,
        semi_minor: f64,
        angle: f64,
    },
}

impl Shape {
    /// Check whether the offset `(dx, dy)` from the particle centre lies
    /// inside the shape inflated by `grow` cells on every side.
    pub fn contains(&self, dx: f64, dy: f64, grow: f64) -> bool {
        match *self {
            Shape::Rectangle { width, height } => {
                dx.abs() <= width / 2.0 + grow && dy.abs() <= height / 2.0 + grow
            }
            Shape::SlopedRectangle {
                width,
                height,
                angle,
            } => {
                let (u, v) = rotate(dx, dy, -angle);
                u.abs() <= width / 2.0 + grow && v.abs() <= height / 2.0 + grow
            }
            Shape::Circle { radius } => {
                let r = radius + grow;
                dx * dx + dy * dy <= r * r
            }
            Shape::Ellipse {
                semi_major,
                semi_minor,
                angle,
            } => {
                let (u, v) = rotate(dx, dy, -angle);
                let a = semi_major + grow;
                let b = semi_minor + grow;
                if a <= 0.0 || b <= 0.0 {
                    return false;
                }
                (u / a).powi(2) + (v / b).powi(2) <= 1.0
            }
        }
    }

    /// Radius of a circle around the centre enclosing the inflated shape.
    pub fn bounding_radius(&self, grow: f64) -> f64 {
        match *self {
            Shape::Rectangle { width, height } | Shape::SlopedRectangle { width, height, .. } => {
                (width / 2.0 + grow).hypot(height / 2.0 + grow)
            }
            Shape::Circle { radius } => radius + grow,
            Shape::Ellipse {
                semi_major,
                semi_minor,
                ..
            } => semi_major.max(semi_minor) + grow,
        }
    }

    /// True when every length is finite and positive and every angle finite.
    pub fn is_well_formed(&self) -> bool {
        let length = |v: f64| v.is_finite() && v > 0.0;
        match *self {
            Shape::Rectangle { width, height } => length(width) && length(height),
            Shape::SlopedRectangle {
                width,
                height,
                angle,
            } => length(width) && length(height) && angle.is_finite(),
            Shape::Circle { radius } => length(radius),
            Shape::Ellipse {
                semi_major,
                semi_minor,
                angle,
            } => length(semi_major) && length(semi_minor) && angle.is_finite(),
        }
    }

    /// Copy of this shape with its orientation replaced.
    ///
    /// Rectangles become sloped rectangles; circles have no orientation.
    pub fn oriented(&self, degrees: f64) -> Shape {
        match *self {
            Shape::Rectangle { width, height } | Shape::SlopedRectangle { width, height, .. } => {
                Shape::SlopedRectangle {
                    width,
                    height,
                    angle: degrees,
                }
            }
            Shape::Circle { radius } => Shape::Circle { radius },
            Shape::Ellipse {
                semi_major,
                semi_minor,
                ..
            } => Shape::Ellipse {
                semi_major,
                semi_minor,
                angle: degrees,
            },
        }
    }

    /// Continuum area of the uninflated shape.
    pub fn area(&self) -> f64 {
        match *self {
            Shape::Rectangle { width, height } | Shape::SlopedRectangle { width, height, .. } => {
                width * height
            }
            Shape::Circle { radius } => PI * radius * radius,
            Shape::Ellipse {
                semi_major,
                semi_minor,
                ..
            } => PI * semi_major * semi_minor,
        }
    }

    /// Shape keyword used in settings files.
    pub fn keyword(&self) -> &'static str {
        match self {
            Shape::Rectangle { .. } => "rectangle",
            Shape::SlopedRectangle { .. } => "sloped_rectangle",
            Shape::Circle { .. } => "circle",
            Shape::Ellipse { .. } => "ellipse",
        }
    }
}

fn rotate(x: f64, y: f64, degrees: f64) -> (f64, f64) {
    let (sin, cos) = degrees.to_radians().sin_cos();
    (x * cos - y * sin, x * sin + y * cos)
}
