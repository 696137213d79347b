//! Axis-aligned bounding boxes in world units.

use glam::Vec2;

/// One of the two world axes. Collision always resolves `X` before `Y`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Horizontal.
    X,
    /// Vertical.
    Y,
}

impl Axis {
    /// Both axes in resolution order.
    pub const ORDER: [Axis; 2] = [Axis::X, Axis::Y];

    /// The component of `v` along this axis.
    pub fn of(self, v: Vec2) -> f32 {
        match self {
            Axis::X => v.x,
            Axis::Y => v.y,
        }
    }

    /// Mutable access to the component of `v` along this axis.
    pub fn of_mut(self, v: &mut Vec2) -> &mut f32 {
        match self {
            Axis::X => &mut v.x,
            Axis::Y => &mut v.y,
        }
    }

    /// A vector of length `amount` along this axis.
    pub fn unit(self, amount: f32) -> Vec2 {
        match self {
            Axis::X => Vec2::new(amount, 0.0),
            Axis::Y => Vec2::new(0.0, amount),
        }
    }
}

/// An axis-aligned box anchored at its minimum corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    /// Minimum (top-left) corner.
    pub min: Vec2,
    /// Extent along each axis. Never negative.
    pub size: Vec2,
}

impl Aabb {
    /// Construct a box from its minimum corner and size.
    ///
    /// Negative sizes are clamped to zero.
    pub fn new(min: Vec2, size: Vec2) -> Self {
        Self {
            min,
            size: size.max(Vec2::ZERO),
        }
    }

    /// Construct a box of `size` centred on `center`.
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        let size = size.max(Vec2::ZERO);
        Self {
            min: center - size * 0.5,
            size,
        }
    }

    /// Maximum (bottom-right) corner.
    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    /// Centre point.
    pub fn center(&self) -> Vec2 {
        self.min + self.size * 0.5
    }

    /// The same box moved by `delta`.
    pub fn translated(&self, delta: Vec2) -> Self {
        Self {
            min: self.min + delta,
            size: self.size,
        }
    }

    /// Strict overlap test: boxes that merely touch do not overlap.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        let a_max = self.max();
        let b_max = other.max();
        self.min.x < b_max.x
            && other.min.x < a_max.x
            && self.min.y < b_max.y
            && other.min.y < a_max.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_boxes_do_not_overlap() {
        let a = Aabb::new(Vec2::ZERO, Vec2::ONE);
        let b = Aabb::new(Vec2::new(1.0, 0.0), Vec2::ONE);
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn nested_boxes_overlap() {
        let outer = Aabb::new(Vec2::ZERO, Vec2::splat(4.0));
        let inner = Aabb::from_center(Vec2::splat(2.0), Vec2::splat(0.5));
        assert!(outer.overlaps(&inner));
        assert!(inner.overlaps(&outer));
    }

    #[test]
    fn from_center_round_trips_center() {
        let b = Aabb::from_center(Vec2::new(3.0, -2.0), Vec2::new(2.0, 1.0));
        assert_eq!(b.center(), Vec2::new(3.0, -2.0));
        assert_eq!(b.min, Vec2::new(2.0, -2.5));
    }

    #[test]
    fn negative_size_is_clamped() {
        let b = Aabb::new(Vec2::ZERO, Vec2::new(-1.0, 2.0));
        assert_eq!(b.size, Vec2::new(0.0, 2.0));
    }

    #[test]
    fn axis_helpers_select_components() {
        let mut v = Vec2::new(1.0, 2.0);
        assert_eq!(Axis::X.of(v), 1.0);
        assert_eq!(Axis::Y.of(v), 2.0);
        *Axis::Y.of_mut(&mut v) = 5.0;
        assert_eq!(v, Vec2::new(1.0, 5.0));
        assert_eq!(Axis::X.unit(3.0), Vec2::new(3.0, 0.0));
    }
}
