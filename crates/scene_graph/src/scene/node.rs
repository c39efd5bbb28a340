//! Node capability contract shared by every content kind
//!
//! Tree algorithms and the renderer are written once against [`SceneNode`].
//! Each content kind (animation, entity, scene) provides a class-level and
//! an instance-level node type that implement it.

use serde::{Deserialize, Serialize};

use crate::foundation::math::{Mat3, Transform2D, Vec2};

/// Read access to the properties the tree algorithms and the renderer need
pub trait SceneNode {
    /// Unique node id. Paint state in the renderer is keyed by this id.
    fn id(&self) -> &str;

    /// Human readable name, used in log messages
    fn name(&self) -> &str;

    /// Placement relative to the parent node
    fn node_transform(&self) -> Mat3;

    /// Maps the unit square of the node's drawable space into node space
    fn model_transform(&self) -> Mat3;

    /// Size of the node in node space
    fn size(&self) -> Vec2;

    /// The drawable item attached to this node, if any
    fn drawable(&self) -> Option<&DrawableItem> {
        None
    }

    /// Render layer of the node
    fn layer(&self) -> i32 {
        self.drawable().map_or(0, |item| item.layer)
    }

    /// Render pass of the node
    fn render_pass(&self) -> RenderPass {
        self.drawable().map_or(RenderPass::Draw, |item| item.render_pass)
    }
}

/// Write access to the local placement, used when reparenting
pub trait SceneNodeMut: SceneNode {
    /// Set the translation relative to the parent
    fn set_translation(&mut self, translation: Vec2);

    /// Set the rotation in radians
    fn set_rotation(&mut self, rotation: f32);

    /// Set the scale factors
    fn set_scale(&mut self, scale: Vec2);
}

/// Nodes that can be copied under a new identity
pub trait DuplicateNode {
    /// Create a copy with identical properties but a fresh id
    #[must_use]
    fn duplicate(&self) -> Self;
}

// Implements the capability traits for a node type with `id`, `name`,
// `placement` and `drawable: Option<DrawableItem>` fields.
macro_rules! impl_placed_node {
    ($node:ty) => {
        impl $crate::scene::SceneNode for $node {
            fn id(&self) -> &str {
                &self.id
            }
            fn name(&self) -> &str {
                &self.name
            }
            fn node_transform(&self) -> $crate::foundation::math::Mat3 {
                self.placement.node_transform()
            }
            fn model_transform(&self) -> $crate::foundation::math::Mat3 {
                self.placement.model_transform()
            }
            fn size(&self) -> $crate::foundation::math::Vec2 {
                self.placement.size
            }
            fn drawable(&self) -> Option<&$crate::scene::DrawableItem> {
                self.drawable.as_ref()
            }
        }

        impl $crate::scene::SceneNodeMut for $node {
            fn set_translation(&mut self, translation: $crate::foundation::math::Vec2) {
                self.placement.translation = translation;
            }
            fn set_rotation(&mut self, rotation: f32) {
                self.placement.rotation = rotation;
            }
            fn set_scale(&mut self, scale: $crate::foundation::math::Vec2) {
                self.placement.scale = scale;
            }
        }
    };
}
pub(crate) use impl_placed_node;

/// Node placement shared by all node kinds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodePlacement {
    /// Translation relative to the parent node
    pub translation: Vec2,
    /// Scale factors
    pub scale: Vec2,
    /// Size of the node's box
    pub size: Vec2,
    /// Rotation in radians
    pub rotation: f32,
}

impl Default for NodePlacement {
    fn default() -> Self {
        Self {
            translation: Vec2::zeros(),
            scale: Vec2::new(1.0, 1.0),
            size: Vec2::new(1.0, 1.0),
            rotation: 0.0,
        }
    }
}

impl NodePlacement {
    /// Create a placement with the given translation and size
    pub fn new(translation: Vec2, size: Vec2) -> Self {
        Self {
            translation,
            size,
            ..Default::default()
        }
    }

    /// Set the scale
    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.scale = scale;
        self
    }

    /// Set the rotation
    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    /// Scale, then rotate, then translate
    pub fn node_transform(&self) -> Mat3 {
        Transform2D {
            position: self.translation,
            rotation: self.rotation,
            scale: self.scale,
        }
        .to_matrix()
    }

    /// Scale the unit square to the node size and center it on the origin
    pub fn model_transform(&self) -> Mat3 {
        Mat3::new_translation(&(-self.size * 0.5)) * Mat3::new_nonuniform_scaling(&self.size)
    }
}

/// Render pass a drawable item belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RenderPass {
    /// Regular composited drawing
    #[default]
    Draw,
    /// Stencil only drawing that clips the draw pass of the same layer
    Mask,
}

/// Rasterization style of a drawable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RenderStyle {
    /// Filled shape
    #[default]
    Solid,
    /// Triangle edges
    Wireframe,
    /// Outline only
    Outline,
    /// Vertices only
    Points,
}

bitflags::bitflags! {
    /// Per-item drawing and update flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct DrawableFlags: u32 {
        /// Update the material every frame
        const UPDATE_MATERIAL  = 1 << 0;
        /// Update the drawable every frame
        const UPDATE_DRAWABLE  = 1 << 1;
        /// Restart the drawable once it reports it is no longer alive
        const RESTART_DRAWABLE = 1 << 2;
        /// Override the material alpha with the item alpha
        const OVERRIDE_ALPHA   = 1 << 3;
        /// Item is visible in the game
        const VISIBLE_IN_GAME  = 1 << 4;
        /// Mirror the item about the vertical axis of its model box
        const FLIP_VERTICALLY  = 1 << 5;
    }
}

impl Default for DrawableFlags {
    fn default() -> Self {
        Self::UPDATE_MATERIAL
            | Self::UPDATE_DRAWABLE
            | Self::RESTART_DRAWABLE
            | Self::VISIBLE_IN_GAME
    }
}

/// Drawable attachment of a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawableItem {
    /// Class id of the material
    pub material_id: String,
    /// Class id of the drawable shape
    pub drawable_id: String,
    /// Render layer, may be negative
    pub layer: i32,
    /// Render pass
    pub render_pass: RenderPass,
    /// Rasterization style
    pub style: RenderStyle,
    /// Line width for outline and wireframe styles
    pub line_width: f32,
    /// Alpha used when `OVERRIDE_ALPHA` is set
    pub alpha: f32,
    /// Scaling factor applied to the update time step
    pub time_scale: f32,
    /// Item flags
    pub flags: DrawableFlags,
}

impl Default for DrawableItem {
    fn default() -> Self {
        Self {
            material_id: String::new(),
            drawable_id: String::new(),
            layer: 0,
            render_pass: RenderPass::Draw,
            style: RenderStyle::Solid,
            line_width: 1.0,
            alpha: 1.0,
            time_scale: 1.0,
            flags: DrawableFlags::default(),
        }
    }
}

impl DrawableItem {
    /// Create an item drawing `drawable_id` with `material_id`
    pub fn new(material_id: impl Into<String>, drawable_id: impl Into<String>) -> Self {
        Self {
            material_id: material_id.into(),
            drawable_id: drawable_id.into(),
            ..Default::default()
        }
    }

    /// Set the layer
    pub fn with_layer(mut self, layer: i32) -> Self {
        self.layer = layer;
        self
    }

    /// Set the render pass
    pub fn with_render_pass(mut self, pass: RenderPass) -> Self {
        self.render_pass = pass;
        self
    }

    /// Set the style
    pub fn with_style(mut self, style: RenderStyle) -> Self {
        self.style = style;
        self
    }

    /// Set the line width
    pub fn with_line_width(mut self, width: f32) -> Self {
        self.line_width = width;
        self
    }

    /// Set the alpha value and enable the alpha override
    pub fn with_alpha_override(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self.flags.insert(DrawableFlags::OVERRIDE_ALPHA);
        self
    }

    /// Set the time scale
    pub fn with_time_scale(mut self, scale: f32) -> Self {
        self.time_scale = scale;
        self
    }

    /// Replace the flags
    pub fn with_flags(mut self, flags: DrawableFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Check a flag
    pub fn test_flag(&self, flag: DrawableFlags) -> bool {
        self.flags.contains(flag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Point2;
    use approx::assert_relative_eq;

    #[test]
    fn test_model_transform_centers_unit_square() {
        let placement = NodePlacement::new(Vec2::zeros(), Vec2::new(10.0, 4.0));
        let model = placement.model_transform();
        let top_left = model.transform_point(&Point2::new(0.0, 0.0));
        let bottom_right = model.transform_point(&Point2::new(1.0, 1.0));
        assert_relative_eq!(top_left, Point2::new(-5.0, -2.0));
        assert_relative_eq!(bottom_right, Point2::new(5.0, 2.0));
    }

    #[test]
    fn test_node_transform_applies_scale_first() {
        let placement = NodePlacement::new(Vec2::new(3.0, 0.0), Vec2::new(1.0, 1.0))
            .with_scale(Vec2::new(2.0, 2.0));
        let point = placement.node_transform().transform_point(&Point2::new(1.0, 1.0));
        assert_relative_eq!(point, Point2::new(5.0, 2.0));
    }

    #[test]
    fn test_default_flags() {
        let item = DrawableItem::new("mat", "shape");
        assert!(item.test_flag(DrawableFlags::VISIBLE_IN_GAME));
        assert!(item.test_flag(DrawableFlags::UPDATE_DRAWABLE));
        assert!(!item.test_flag(DrawableFlags::OVERRIDE_ALPHA));

        let item = item.with_alpha_override(0.5);
        assert!(item.test_flag(DrawableFlags::OVERRIDE_ALPHA));
        assert_relative_eq!(item.alpha, 0.5);
    }

    #[test]
    fn test_item_serde() {
        let item = DrawableItem::new("mat", "shape")
            .with_layer(-2)
            .with_render_pass(RenderPass::Mask);
        let json = serde_json::to_value(&item).unwrap();
        let restored: DrawableItem = serde_json::from_value(json).unwrap();
        assert_eq!(restored, item);
    }
}
