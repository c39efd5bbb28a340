//! Test doubles for the graphics layer

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::{
    ClassLibrary, Culling, DrawShape, Drawable, DrawableClass, MaskShape, Material, MaterialClass, Painter,
};
use crate::foundation::math::{FRect, Mat3};
use crate::scene::RenderStyle;

pub struct FakeMaterial {
    pub class_id: String,
    pub updates: Mutex<Vec<f32>>,
    pub alpha: Mutex<Option<f32>>,
}

impl FakeMaterial {
    pub fn new(class_id: &str) -> Arc<Self> {
        Arc::new(Self {
            class_id: class_id.to_string(),
            updates: Mutex::new(Vec::new()),
            alpha: Mutex::new(None),
        })
    }

    pub fn updates(&self) -> Vec<f32> {
        self.updates.lock().unwrap().clone()
    }
}

impl Material for FakeMaterial {
    fn update(&self, dt: f32) {
        self.updates.lock().unwrap().push(dt);
    }
    fn set_alpha(&self, alpha: f32) {
        *self.alpha.lock().unwrap() = Some(alpha);
    }
    fn reset_alpha(&self) {
        *self.alpha.lock().unwrap() = None;
    }
}

pub struct FakeDrawable {
    pub class_id: String,
    pub updates: Mutex<Vec<f32>>,
    pub style: Mutex<Option<RenderStyle>>,
    pub line_width: Mutex<f32>,
    pub culling: Mutex<Option<Culling>>,
    pub alive: AtomicBool,
    pub restarts: AtomicUsize,
}

impl FakeDrawable {
    pub fn new(class_id: &str) -> Arc<Self> {
        Arc::new(Self {
            class_id: class_id.to_string(),
            updates: Mutex::new(Vec::new()),
            style: Mutex::new(None),
            line_width: Mutex::new(0.0),
            culling: Mutex::new(None),
            alive: AtomicBool::new(true),
            restarts: AtomicUsize::new(0),
        })
    }

    pub fn updates(&self) -> Vec<f32> {
        self.updates.lock().unwrap().clone()
    }

    pub fn restart_count(&self) -> usize {
        self.restarts.load(Ordering::SeqCst)
    }
}

impl Drawable for FakeDrawable {
    fn update(&self, dt: f32) {
        self.updates.lock().unwrap().push(dt);
    }
    fn set_style(&self, style: RenderStyle) {
        *self.style.lock().unwrap() = Some(style);
    }
    fn set_line_width(&self, width: f32) {
        *self.line_width.lock().unwrap() = width;
    }
    fn set_culling(&self, culling: Culling) {
        *self.culling.lock().unwrap() = Some(culling);
    }
    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }
    fn restart(&self) {
        self.restarts.fetch_add(1, Ordering::SeqCst);
        self.alive.store(true, Ordering::SeqCst);
    }
}

pub struct FakeMaterialClass {
    id: String,
    pub instances: Mutex<Vec<Arc<FakeMaterial>>>,
}

impl MaterialClass for FakeMaterialClass {
    fn id(&self) -> &str {
        &self.id
    }
    fn create_instance(&self) -> Arc<dyn Material> {
        let instance = FakeMaterial::new(&self.id);
        self.instances.lock().unwrap().push(Arc::clone(&instance));
        instance
    }
}

pub struct FakeDrawableClass {
    id: String,
    pub instances: Mutex<Vec<Arc<FakeDrawable>>>,
}

impl DrawableClass for FakeDrawableClass {
    fn id(&self) -> &str {
        &self.id
    }
    fn create_instance(&self) -> Arc<dyn Drawable> {
        let instance = FakeDrawable::new(&self.id);
        self.instances.lock().unwrap().push(Arc::clone(&instance));
        instance
    }
}

/// Class library whose contents can change between frames
#[derive(Default)]
pub struct FakeLibrary {
    materials: Mutex<HashMap<String, Arc<FakeMaterialClass>>>,
    drawables: Mutex<HashMap<String, Arc<FakeDrawableClass>>>,
}

impl FakeLibrary {
    pub fn with_material(self, id: &str) -> Self {
        self.add_material(id);
        self
    }

    pub fn with_drawable(self, id: &str) -> Self {
        self.add_drawable(id);
        self
    }

    pub fn add_material(&self, id: &str) {
        self.materials.lock().unwrap().insert(
            id.to_string(),
            Arc::new(FakeMaterialClass {
                id: id.to_string(),
                instances: Mutex::new(Vec::new()),
            }),
        );
    }

    pub fn add_drawable(&self, id: &str) {
        self.drawables.lock().unwrap().insert(
            id.to_string(),
            Arc::new(FakeDrawableClass {
                id: id.to_string(),
                instances: Mutex::new(Vec::new()),
            }),
        );
    }

    pub fn material_instances(&self, id: &str) -> Vec<Arc<FakeMaterial>> {
        self.materials
            .lock()
            .unwrap()
            .get(id)
            .map(|class| class.instances.lock().unwrap().clone())
            .unwrap_or_default()
    }

    pub fn drawable_instances(&self, id: &str) -> Vec<Arc<FakeDrawable>> {
        self.drawables
            .lock()
            .unwrap()
            .get(id)
            .map(|class| class.instances.lock().unwrap().clone())
            .unwrap_or_default()
    }
}

impl ClassLibrary for FakeLibrary {
    fn find_material_class_by_id(&self, id: &str) -> Option<Arc<dyn MaterialClass>> {
        let class = self.materials.lock().unwrap().get(id).cloned()?;
        Some(class)
    }

    fn find_drawable_class_by_id(&self, id: &str) -> Option<Arc<dyn DrawableClass>> {
        let class = self.drawables.lock().unwrap().get(id).cloned()?;
        Some(class)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PainterCall {
    pub shape_count: usize,
    pub mask_count: Option<usize>,
    pub transforms: Vec<Mat3>,
}

/// Painter recording every draw call
#[derive(Debug, Default)]
pub struct RecordingPainter {
    pub calls: Vec<PainterCall>,
}

impl Painter for RecordingPainter {
    fn set_view_matrix(&mut self, _matrix: Mat3) {}
    fn set_projection_matrix(&mut self, _matrix: Mat3) {}
    fn set_viewport(&mut self, _viewport: FRect) {}

    fn draw(&mut self, shapes: &[DrawShape<'_>]) {
        self.calls.push(PainterCall {
            shape_count: shapes.len(),
            mask_count: None,
            transforms: shapes.iter().map(|shape| *shape.transform).collect(),
        });
    }

    fn draw_masked(&mut self, shapes: &[DrawShape<'_>], masks: &[MaskShape<'_>]) {
        self.calls.push(PainterCall {
            shape_count: shapes.len(),
            mask_count: Some(masks.len()),
            transforms: shapes.iter().map(|shape| *shape.transform).collect(),
        });
    }
}
