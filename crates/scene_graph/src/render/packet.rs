//! Draw packets and per-layer batching
//!
//! Packets collected during a tree traversal are organized into layer
//! batches. Layers are shifted so the lowest layer seen becomes layer 0,
//! authored content is free to use negative layers.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::{DrawShape, Drawable, MaskShape, Material, Painter};
use crate::foundation::math::Mat3;
use crate::scene::RenderPass;

/// A single draw operation
#[derive(Clone)]
pub struct DrawPacket {
    /// Material, None if it failed to resolve
    pub material: Option<Arc<dyn Material>>,
    /// Drawable, None if it failed to resolve
    pub drawable: Option<Arc<dyn Drawable>>,
    /// Transform from the unit square of the node to view space
    pub transform: Mat3,
    /// Layer as authored
    pub layer: i32,
    /// Render pass
    pub pass: RenderPass,
}

impl DrawPacket {
    /// Mask packets need only a drawable, draw packets need both a
    /// drawable and a material
    pub fn is_resolved(&self) -> bool {
        match self.pass {
            RenderPass::Draw => self.material.is_some() && self.drawable.is_some(),
            RenderPass::Mask => self.drawable.is_some(),
        }
    }
}

impl std::fmt::Debug for DrawPacket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrawPacket")
            .field("material", &self.material.is_some())
            .field("drawable", &self.drawable.is_some())
            .field("layer", &self.layer)
            .field("pass", &self.pass)
            .finish_non_exhaustive()
    }
}

/// Packets of one layer, split by render pass
#[derive(Debug, Clone, Default)]
pub struct LayerBatch {
    /// Shifted layer index
    pub layer: u32,
    /// Draw pass packets in visit order
    pub draw_list: Vec<DrawPacket>,
    /// Mask pass packets in visit order
    pub mask_list: Vec<DrawPacket>,
}

impl LayerBatch {
    /// Create an empty batch
    pub fn new(layer: u32) -> Self {
        Self {
            layer,
            ..Default::default()
        }
    }

    /// Add a packet to the list of its render pass
    pub fn add_packet(&mut self, packet: DrawPacket) {
        match packet.pass {
            RenderPass::Draw => self.draw_list.push(packet),
            RenderPass::Mask => self.mask_list.push(packet),
        }
    }

    /// Get the number of packets in this batch
    pub fn packet_count(&self) -> usize {
        self.draw_list.len() + self.mask_list.len()
    }
}

/// Layer ordered render queue for one draw call
#[derive(Debug, Default)]
pub struct RenderQueue {
    // non-empty batches in ascending layer order
    batches: Vec<LayerBatch>,
    dropped: usize,
}

impl RenderQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the queue from packets in visit order. Packets that are not
    /// resolved are dropped.
    pub fn from_packets(packets: Vec<DrawPacket>) -> Self {
        let Some(min_layer) = packets.iter().map(|packet| packet.layer).min() else {
            return Self::new();
        };

        let mut layers: BTreeMap<u32, LayerBatch> = BTreeMap::new();
        let mut dropped = 0;
        for packet in packets {
            if !packet.is_resolved() {
                dropped += 1;
                continue;
            }
            let layer = packet.layer.abs_diff(min_layer);
            layers
                .entry(layer)
                .or_insert_with(|| LayerBatch::new(layer))
                .add_packet(packet);
        }

        Self {
            batches: layers.into_values().collect(),
            dropped,
        }
    }

    /// Non-empty batches in ascending layer order
    pub fn batches(&self) -> &[LayerBatch] {
        &self.batches
    }

    /// Number of packets dropped because they were not resolved
    pub fn dropped_count(&self) -> usize {
        self.dropped
    }

    /// Get total number of packets in the queue
    pub fn packet_count(&self) -> usize {
        self.batches.iter().map(LayerBatch::packet_count).sum()
    }

    /// Hand the batches to the painter in layer order. Layers with mask
    /// shapes use the masked draw.
    pub fn submit(&self, painter: &mut dyn Painter) {
        for batch in &self.batches {
            let shapes: Vec<DrawShape<'_>> = batch
                .draw_list
                .iter()
                .filter_map(|packet| {
                    Some(DrawShape {
                        transform: &packet.transform,
                        drawable: packet.drawable.as_deref()?,
                        material: packet.material.as_deref()?,
                    })
                })
                .collect();

            if batch.mask_list.is_empty() {
                painter.draw(&shapes);
                continue;
            }
            let masks: Vec<MaskShape<'_>> = batch
                .mask_list
                .iter()
                .filter_map(|packet| {
                    Some(MaskShape {
                        transform: &packet.transform,
                        drawable: packet.drawable.as_deref()?,
                    })
                })
                .collect();
            painter.draw_masked(&shapes, &masks);
        }
    }
}
