//! Painter interface

use super::{Drawable, Material};
use crate::foundation::math::{FRect, Mat3};

/// Shape drawn with a material
pub struct DrawShape<'a> {
    /// Transform from the unit square to view space
    pub transform: &'a Mat3,
    /// Shape
    pub drawable: &'a dyn Drawable,
    /// Material
    pub material: &'a dyn Material,
}

/// Shape only written to the stencil
pub struct MaskShape<'a> {
    /// Transform from the unit square to view space
    pub transform: &'a Mat3,
    /// Shape
    pub drawable: &'a dyn Drawable,
}

/// Draws lists of shapes
pub trait Painter {
    /// Set the view matrix
    fn set_view_matrix(&mut self, matrix: Mat3);

    /// Set the projection matrix
    fn set_projection_matrix(&mut self, matrix: Mat3);

    /// Set the viewport in window coordinates
    fn set_viewport(&mut self, viewport: FRect);

    /// Draw shapes
    fn draw(&mut self, shapes: &[DrawShape<'_>]);

    /// Draw shapes clipped to the union of the mask shapes
    fn draw_masked(&mut self, shapes: &[DrawShape<'_>], masks: &[MaskShape<'_>]);
}
