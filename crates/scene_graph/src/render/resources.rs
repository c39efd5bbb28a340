//! Paint resources provided by the graphics layer
//!
//! The renderer never knows how materials or drawables produce pixels. It
//! looks up classes by id through a [`ClassLibrary`], creates instances and
//! drives them through these traits. Instances are shared with the draw
//! packets, so the methods take `&self` and implementations use interior
//! mutability for their per-frame state.

use std::sync::Arc;

use crate::scene::RenderStyle;

/// Material instance
pub trait Material: Send + Sync {
    /// Advance the material animation
    fn update(&self, dt: f32);

    /// Override the material alpha
    fn set_alpha(&self, alpha: f32);

    /// Restore the class alpha
    fn reset_alpha(&self);
}

/// Which polygon faces the rasterizer discards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Culling {
    /// Discard front facing polygons
    Front,
    /// Discard back facing polygons
    #[default]
    Back,
}

/// Drawable shape instance
pub trait Drawable: Send + Sync {
    /// Advance the drawable simulation, e.g. a particle engine
    fn update(&self, dt: f32);

    /// Set the rasterization style
    fn set_style(&self, style: RenderStyle);

    /// Set the line width used by the line styles
    fn set_line_width(&self, width: f32);

    /// Set the face culling. Only applies to polygons.
    fn set_culling(&self, _culling: Culling) {}

    /// Whether the drawable still has something to draw
    fn is_alive(&self) -> bool {
        true
    }

    /// Start the drawable over
    fn restart(&self) {}
}

/// Material class that instances are created from
pub trait MaterialClass: Send + Sync {
    /// Class id
    fn id(&self) -> &str;

    /// Create a new instance
    fn create_instance(&self) -> Arc<dyn Material>;
}

/// Drawable class that instances are created from
pub trait DrawableClass: Send + Sync {
    /// Class id
    fn id(&self) -> &str;

    /// Create a new instance
    fn create_instance(&self) -> Arc<dyn Drawable>;
}

/// Lookup of material and drawable classes by id
pub trait ClassLibrary: Send + Sync {
    /// Find a material class
    fn find_material_class_by_id(&self, id: &str) -> Option<Arc<dyn MaterialClass>>;

    /// Find a drawable class
    fn find_drawable_class_by_id(&self, id: &str) -> Option<Arc<dyn DrawableClass>>;
}
