//! Geometry/text factory seam and the slab store shipped with the crate.

use crate::geo::Position;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShapeKind {
    Line,
    Text,
}

/// Opaque handle to a renderable created by a [`ShapeFactory`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderableHandle {
    pub id: u32,
    pub kind: ShapeKind,
}

/// How a renderer should interpolate between consecutive line positions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PathType {
    GreatCircle,
    /// Straight in lat/lon, so parallels stay on their latitude.
    Linear,
}

pub trait ShapeFactory {
    fn create_line(&mut self, positions: Vec<Position>, path_type: PathType) -> RenderableHandle;

    fn create_text(&mut self, position: Position, text: String, priority: f64) -> RenderableHandle;

    /// The handle is not used again by its owner after this call.
    fn release(&mut self, _handle: RenderableHandle) {}
}

#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    Line {
        positions: Vec<Position>,
        path_type: PathType,
    },
    Text {
        position: Position,
        text: String,
        priority: f64,
    },
}

/// Slab of shapes with id reuse after release.
#[derive(Debug, Default)]
pub struct ShapeStore {
    slots: Vec<Option<Shape>>,
    free: Vec<u32>,
    live: usize,
}

impl ShapeStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, shape: Shape) -> u32 {
        self.live += 1;
        match self.free.pop() {
            Some(id) => {
                self.slots[id as usize] = Some(shape);
                id
            }
            None => {
                self.slots.push(Some(shape));
                (self.slots.len() - 1) as u32
            }
        }
    }

    #[inline(always)]
    pub fn get(&self, handle: RenderableHandle) -> Option<&Shape> {
        self.slots.get(handle.id as usize).and_then(Option::as_ref)
    }

    /// Number of live shapes
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.live
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }
}

impl ShapeFactory for ShapeStore {
    fn create_line(&mut self, positions: Vec<Position>, path_type: PathType) -> RenderableHandle {
        let id = self.insert(Shape::Line {
            positions,
            path_type,
        });
        RenderableHandle {
            id,
            kind: ShapeKind::Line,
        }
    }

    fn create_text(&mut self, position: Position, text: String, priority: f64) -> RenderableHandle {
        let id = self.insert(Shape::Text {
            position,
            text,
            priority,
        });
        RenderableHandle {
            id,
            kind: ShapeKind::Text,
        }
    }

    fn release(&mut self, handle: RenderableHandle) {
        if let Some(slot) = self.slots.get_mut(handle.id as usize) {
            if slot.take().is_some() {
                self.live -= 1;
                self.free.push(handle.id);
            }
        }
    }
}
