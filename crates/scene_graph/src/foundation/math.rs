//! 2D math types and transform helpers
//!
//! Provides the 2D math types used by the scene graph. All transforms are
//! homogeneous 3x3 matrices operating on points in the XY plane.

pub use nalgebra::{Matrix3, Vector2};

use serde::{Deserialize, Serialize};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3x3 matrix type (2D affine transform in homogeneous coordinates)
pub type Mat3 = Matrix3<f32>;

/// 2D point type
pub type Point2 = nalgebra::Point2<f32>;

/// Transform representing position, rotation, and scale in 2D
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform2D {
    /// Position in the parent space
    pub position: Vec2,

    /// Rotation around the Z axis in radians
    pub rotation: f32,

    /// Scale factors
    pub scale: Vec2,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self {
            position: Vec2::zeros(),
            rotation: 0.0,
            scale: Vec2::new(1.0, 1.0),
        }
    }
}

impl Transform2D {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec2) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Convert to a transformation matrix.
    ///
    /// The scale is applied first, then the rotation and finally the
    /// translation, i.e. `T * R * S`.
    pub fn to_matrix(&self) -> Mat3 {
        Mat3::new_translation(&self.position)
            * Mat3::new_rotation(self.rotation)
            * Mat3::new_nonuniform_scaling(&self.scale)
    }

    /// Create a transform from a transformation matrix
    ///
    /// Shear cannot be represented and is lost. A negative determinant is
    /// expressed as a negative Y scale.
    pub fn from_matrix(matrix: &Mat3) -> Self {
        let position = Vec2::new(matrix[(0, 2)], matrix[(1, 2)]);

        let axis_x = Vec2::new(matrix[(0, 0)], matrix[(1, 0)]);
        let axis_y = Vec2::new(matrix[(0, 1)], matrix[(1, 1)]);
        let determinant = axis_x.x * axis_y.y - axis_y.x * axis_x.y;

        let scale_x = axis_x.magnitude();
        let scale_y = if determinant < 0.0 {
            -axis_y.magnitude()
        } else {
            axis_y.magnitude()
        };
        let rotation = axis_x.y.atan2(axis_x.x);

        Self {
            position,
            rotation,
            scale: Vec2::new(scale_x, scale_y),
        }
    }

    /// Apply this transform to a point
    pub fn transform_point(&self, point: Point2) -> Point2 {
        self.to_matrix().transform_point(&point)
    }
}

/// Stack of transformation scopes.
///
/// Each scope holds a local matrix; the current transform is the product of
/// all scopes from the bottom of the stack to the top. Traversals push a
/// scope when entering a node and pop it when leaving.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformStack {
    scopes: Vec<Mat3>,
}

impl TransformStack {
    /// Create an empty stack. The current transform is the identity.
    pub fn new() -> Self {
        Self { scopes: Vec::new() }
    }

    /// Create a stack with a single initial scope
    pub fn from_matrix(matrix: Mat3) -> Self {
        Self {
            scopes: vec![matrix],
        }
    }

    /// Begin a new scope with the given local matrix
    pub fn push(&mut self, matrix: Mat3) {
        self.scopes.push(matrix);
    }

    /// Begin a new identity scope
    pub fn push_identity(&mut self) {
        self.scopes.push(Mat3::identity());
    }

    /// End the topmost scope
    pub fn pop(&mut self) -> Option<Mat3> {
        self.scopes.pop()
    }

    /// Number of open scopes
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Scale the topmost scope. Opens an identity scope if none exists.
    pub fn scale(&mut self, sx: f32, sy: f32) {
        self.apply(Mat3::new_nonuniform_scaling(&Vec2::new(sx, sy)));
    }

    /// Rotate the topmost scope by `angle` radians
    pub fn rotate(&mut self, angle: f32) {
        self.apply(Mat3::new_rotation(angle));
    }

    /// Translate the topmost scope
    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.apply(Mat3::new_translation(&Vec2::new(dx, dy)));
    }

    /// The combined transform of all scopes
    pub fn matrix(&self) -> Mat3 {
        self.scopes
            .iter()
            .fold(Mat3::identity(), |composed, local| composed * local)
    }

    fn apply(&mut self, operation: Mat3) {
        match self.scopes.last_mut() {
            Some(top) => *top = operation * *top,
            None => self.scopes.push(operation),
        }
    }
}

impl Default for TransformStack {
    fn default() -> Self {
        Self::new()
    }
}

/// Axis aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FRect {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width of the rectangle
    pub width: f32,
    /// Height of the rectangle
    pub height: f32,
}

impl FRect {
    /// Create a new rectangle
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Create the smallest rectangle that contains all the given points
    pub fn from_points(points: &[Point2]) -> Self {
        let Some(first) = points.first() else {
            return Self::default();
        };
        let (mut left, mut top) = (first.x, first.y);
        let (mut right, mut bottom) = (first.x, first.y);
        for point in &points[1..] {
            left = left.min(point.x);
            right = right.max(point.x);
            top = top.min(point.y);
            bottom = bottom.max(point.y);
        }
        Self::new(left, top, right - left, bottom - top)
    }

    /// A rectangle with no area is empty
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Right edge
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Check whether the point lies inside the rectangle
    pub fn contains(&self, point: Point2) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    /// Smallest rectangle containing both rectangles. Empty rectangles
    /// don't contribute.
    pub fn union(&self, other: &Self) -> Self {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let left = self.x.min(other.x);
        let top = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Self::new(left, top, right - left, bottom - top)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_transform_order_is_scale_rotate_translate() {
        let transform = Transform2D {
            position: Vec2::new(10.0, 0.0),
            rotation: FRAC_PI_2,
            scale: Vec2::new(2.0, 1.0),
        };
        // (1, 0) -> scale (2, 0) -> rotate (0, 2) -> translate (10, 2)
        let point = transform.transform_point(Point2::new(1.0, 0.0));
        assert_relative_eq!(point.x, 10.0, epsilon = 1e-5);
        assert_relative_eq!(point.y, 2.0, epsilon = 1e-5);
    }

    #[test]
    fn test_matrix_decomposition() {
        let transform = Transform2D {
            position: Vec2::new(-3.0, 7.5),
            rotation: 0.6,
            scale: Vec2::new(1.5, 0.25),
        };
        let decomposed = Transform2D::from_matrix(&transform.to_matrix());
        assert_relative_eq!(decomposed.position, transform.position, epsilon = 1e-5);
        assert_relative_eq!(decomposed.rotation, transform.rotation, epsilon = 1e-5);
        assert_relative_eq!(decomposed.scale, transform.scale, epsilon = 1e-5);
    }

    #[test]
    fn test_transform_stack_scopes() {
        let mut stack = TransformStack::new();
        assert_eq!(stack.matrix(), Mat3::identity());

        stack.push(Mat3::new_translation(&Vec2::new(5.0, 5.0)));
        stack.push_identity();
        stack.scale(2.0, 2.0);
        stack.translate(1.0, 0.0);

        let point = stack.matrix().transform_point(&Point2::new(1.0, 1.0));
        assert_relative_eq!(point.x, 8.0);
        assert_relative_eq!(point.y, 7.0);

        stack.pop();
        let point = stack.matrix().transform_point(&Point2::new(1.0, 1.0));
        assert_relative_eq!(point.x, 6.0);
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn test_rect_union_skips_empty() {
        let a = FRect::new(0.0, 0.0, 2.0, 2.0);
        let b = FRect::new(5.0, -1.0, 1.0, 1.0);
        assert_eq!(a.union(&b), FRect::new(0.0, -1.0, 6.0, 3.0));
        assert_eq!(FRect::default().union(&b), b);
        assert!(a.contains(Point2::new(1.0, 1.0)));
        assert!(!a.contains(Point2::new(2.0, 1.0)));
    }
}
