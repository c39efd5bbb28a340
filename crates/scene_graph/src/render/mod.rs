//! Rendering
//!
//! The renderer turns node graphs into layer ordered batches of draw
//! packets and hands them to a [`Painter`]. Materials and drawables are
//! created through a [`ClassLibrary`] and cached per node; the graphics
//! backend behind these traits is up to the application.
//!
//! ```text
//! node graph --DrawVisitor--> packets --RenderQueue--> LayerBatch --> Painter
//!                  |
//!            paint state cache (per node id)
//! ```

mod hooks;
mod packet;
mod painter;
mod renderer;
mod resources;

#[cfg(test)]
pub(crate) mod testing;

pub use hooks::{EntityDrawHook, SceneDrawHook};
pub use packet::{DrawPacket, LayerBatch, RenderQueue};
pub use painter::{DrawShape, MaskShape, Painter};
pub use renderer::{PlacedNode, Renderer};
pub use resources::{ClassLibrary, Culling, Drawable, DrawableClass, Material, MaterialClass};
