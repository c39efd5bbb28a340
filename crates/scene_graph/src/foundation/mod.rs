//! Foundation types shared by the tree, scene and render modules
//!
//! - [`math`]: 2D transforms, the transform scope stack and rectangles
//! - [`collections`]: node arenas, key types and id generation
//! - [`logging`]: logger setup

pub mod collections;
pub mod logging;
pub mod math;
