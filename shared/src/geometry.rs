//! Plane geometry and the circle physics shared by every body on the pitch
//!
//! All simulation happens in a fixed canonical coordinate space with the y
//! axis pointing down. Velocities are expressed in "speed units": a velocity
//! of magnitude 1 moves a circle [`SPEED_FACTOR`] distance units per tick.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

/// Distance units travelled per tick by a circle with unit velocity.
pub const SPEED_FACTOR: f32 = 5.5;

/// Squared speed under which a circle is snapped to rest.
pub const REST_EPSILON: f32 = 0.001;

/// A vector in 2D space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    /// Value along the x-axis. Positive direction is to the right.
    pub x: f32,
    /// Value along the y-axis. Positive direction is down.
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length_squared(self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    pub fn dot(self, other: Vec2) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// Returns the unit vector pointing the same way, or zero for the zero vector.
    pub fn normalize(self) -> Vec2 {
        let length = self.length();
        if length == 0.0 {
            Vec2::ZERO
        } else {
            self / length
        }
    }

    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x + other.x, self.y + other.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, other: Vec2) {
        self.x += other.x;
        self.y += other.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x - other.x, self.y - other.y)
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, other: Vec2) {
        self.x -= other.x;
        self.y -= other.y;
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;

    fn mul(self, scalar: f32) -> Vec2 {
        Vec2::new(self.x * scalar, self.y * scalar)
    }
}

impl Div<f32> for Vec2 {
    type Output = Vec2;

    fn div(self, scalar: f32) -> Vec2 {
        Vec2::new(self.x / scalar, self.y / scalar)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;

    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

/// Axis-aligned rectangle given by its edges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Rect {
    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(
            (self.left + self.right) / 2.0,
            (self.top + self.bottom) / 2.0,
        )
    }
}

/// Shape and kinematics of any body on the pitch.
///
/// Radius, mass and drag are fixed at construction; only position and
/// velocity change during the simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct Circle {
    pub position: Vec2,
    pub velocity: Vec2,
    radius: f32,
    mass: f32,
    drag: f32,
}

impl Circle {
    pub fn new(position: Vec2, radius: f32, mass: f32, drag: f32) -> Self {
        debug_assert!(radius > 0.0 && mass > 0.0);
        debug_assert!(drag > 0.0 && drag <= 1.0);
        Self {
            position,
            velocity: Vec2::ZERO,
            radius,
            mass,
            drag,
        }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn drag(&self) -> f32 {
        self.drag
    }

    /// Places the circle at `position` and stops it.
    pub fn reset_to(&mut self, position: Vec2) {
        self.position = position;
        self.velocity = Vec2::ZERO;
    }
}

/// Advances a circle by one tick: move, apply drag, snap to rest when slow.
pub fn integrate(circle: &mut Circle) {
    circle.position += circle.velocity * SPEED_FACTOR;
    circle.velocity = circle.velocity * circle.drag;

    if circle.velocity.length_squared() < REST_EPSILON {
        circle.velocity = Vec2::ZERO;
    }
}

/// Separates two overlapping moving circles and exchanges momentum elastically.
///
/// Touching circles (distance equal to the radius sum) and circles sharing a
/// center are left untouched. Returns whether a collision was resolved.
pub fn resolve_pair_collision(a: &mut Circle, b: &mut Circle) -> bool {
    let delta = b.position - a.position;
    let distance_squared = delta.length_squared();
    let radius_sum = a.radius + b.radius;

    if distance_squared >= radius_sum * radius_sum || distance_squared == 0.0 {
        return false;
    }

    let distance = distance_squared.sqrt();
    let normal = delta / distance;

    // Geometric separation, split evenly regardless of mass
    let overlap = 0.5 * (radius_sum - distance);
    a.position -= normal * overlap;
    b.position += normal * overlap;

    let relative = a.velocity - b.velocity;
    let impulse = 2.0 * normal.dot(relative) / (a.mass + b.mass);
    a.velocity -= normal * (impulse * b.mass);
    b.velocity += normal * (impulse * a.mass);

    true
}

/// Keeps a circle inside `area`, bouncing it off whichever walls it crossed.
///
/// Returns whether the circle had to be clamped.
pub fn resolve_boundary_collision(circle: &mut Circle, area: &Rect) -> bool {
    let radius = circle.radius;
    let mut clamped = false;

    if circle.position.x < area.left + radius {
        circle.position.x = area.left + radius;
        circle.velocity.x = -circle.velocity.x;
        clamped = true;
    } else if circle.position.x > area.right - radius {
        circle.position.x = area.right - radius;
        circle.velocity.x = -circle.velocity.x;
        clamped = true;
    }

    if circle.position.y < area.top + radius {
        circle.position.y = area.top + radius;
        circle.velocity.y = -circle.velocity.y;
        clamped = true;
    } else if circle.position.y > area.bottom - radius {
        circle.position.y = area.bottom - radius;
        circle.velocity.y = -circle.velocity.y;
        clamped = true;
    }

    clamped
}

/// Pushes a moving circle out of a fixed post and reflects its velocity.
///
/// The post behaves as if it had infinite mass and is never modified.
pub fn resolve_post_collision(circle: &mut Circle, post: &Circle) -> bool {
    let delta = post.position - circle.position;
    let distance_squared = delta.length_squared();
    let radius_sum = circle.radius + post.radius;

    if distance_squared >= radius_sum * radius_sum || distance_squared == 0.0 {
        return false;
    }

    let distance = distance_squared.sqrt();
    let normal = delta / distance;
    circle.position -= normal * (radius_sum - distance);

    let reflected = 2.0 * normal.dot(circle.velocity);
    circle.velocity -= normal * reflected;

    true
}
