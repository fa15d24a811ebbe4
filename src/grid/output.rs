use std::collections::HashSet;

use crate::grid::params::GraticuleType;
use crate::shapes::{RenderableHandle, ShapeFactory};

/// Renderables selected by the current pass, tagged with their style type.
///
/// Handles owned by grid elements live across passes; transient ones (ruler
/// labels made for a single pass) are released when the set is cleared.
#[derive(Debug, Default)]
pub struct RenderableSet {
    entries: Vec<(RenderableHandle, GraticuleType)>,
    seen: HashSet<RenderableHandle>,
    transient: Vec<RenderableHandle>,
}

impl RenderableSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add once; a handle selected twice in a pass keeps its first tag.
    pub fn add(&mut self, handle: RenderableHandle, ty: GraticuleType) {
        if self.seen.insert(handle) {
            self.entries.push((handle, ty));
        }
    }

    /// Add a renderable that lives for this pass only.
    pub fn add_transient(&mut self, handle: RenderableHandle, ty: GraticuleType) {
        self.transient.push(handle);
        self.add(handle, ty);
    }

    pub fn clear(&mut self, factory: &mut dyn ShapeFactory) {
        for handle in self.transient.drain(..) {
            factory.release(handle);
        }
        self.entries.clear();
        self.seen.clear();
    }

    pub fn contains(&self, handle: RenderableHandle) -> bool {
        self.seen.contains(&handle)
    }

    pub fn iter(&self) -> impl Iterator<Item = (RenderableHandle, GraticuleType)> + '_ {
        self.entries.iter().copied()
    }

    /// Number of entries tagged `ty`
    pub fn count(&self, ty: GraticuleType) -> usize {
        self.entries.iter().filter(|(_, t)| *t == ty).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Position;
    use crate::shapes::ShapeStore;

    #[test]
    fn clear_releases_transients_only() {
        let mut store = ShapeStore::new();
        let mut set = RenderableSet::new();
        let kept = store.create_text(Position::default(), "kept".into(), 1.0);
        let once = store.create_text(Position::default(), "once".into(), 1.0);
        set.add(kept, GraticuleType::Utm1Km);
        set.add_transient(once, GraticuleType::Utm1Km);
        assert_eq!(set.count(GraticuleType::Utm1Km), 2);

        set.clear(&mut store);
        assert!(set.is_empty());
        assert!(store.get(kept).is_some());
        assert!(store.get(once).is_none());
    }

    #[test]
    fn duplicate_handles_are_added_once() {
        let mut store = ShapeStore::new();
        let mut set = RenderableSet::new();
        let h = store.create_text(Position::default(), "a".into(), 1.0);
        set.add(h, GraticuleType::LatLon1Deg);
        set.add(h, GraticuleType::LatLon10Deg);
        assert_eq!(set.len(), 1);
        assert_eq!(set.iter().next(), Some((h, GraticuleType::LatLon1Deg)));
    }
}
