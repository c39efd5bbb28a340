//! Draw hooks
//!
//! Hooks let the caller inspect, drop or add packets and wrap entity draws,
//! e.g. an editor that highlights the selected node. A hook is borrowed for
//! the duration of a single draw call.

use super::{DrawPacket, Painter};
use crate::foundation::math::TransformStack;

/// Hook into the draw of a single node graph
pub trait EntityDrawHook<N> {
    /// Inspect or modify the packet built for `node`. Returning false
    /// drops the packet.
    fn inspect_packet(&mut self, _node: &N, _packet: &mut DrawPacket) -> bool {
        true
    }

    /// Add packets for `node`. The transform holds the node transform but
    /// not the model transform.
    fn append_packets(&mut self, _node: &N, _transform: &TransformStack, _packets: &mut Vec<DrawPacket>) {}
}

/// Hook into the draw of a container of entities
pub trait SceneDrawHook<O> {
    /// Returning false skips the entity
    fn filter_entity(&mut self, _entity: &O) -> bool {
        true
    }

    /// Called before the entity is drawn, with the entity's transform pushed
    fn begin_draw_entity(&mut self, _entity: &O, _painter: &mut dyn Painter, _transform: &mut TransformStack) {}

    /// Called after the entity has been drawn
    fn end_draw_entity(&mut self, _entity: &O, _painter: &mut dyn Painter, _transform: &mut TransformStack) {}
}
