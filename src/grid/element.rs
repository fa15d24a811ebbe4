use crate::grid::labels::Axis;
use crate::grid::params::GraticuleType;
use crate::sector::Sector;
use crate::shapes::RenderableHandle;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Line,
    LineNorth,
    LineSouth,
    LineEast,
    LineWest,
    LineEasting,
    LineNorthing,
    GridZoneLabel,
    LatitudeLabel,
    LongitudeLabel,
}

impl ElementKind {
    /// Lines inside a tile, as opposed to its boundary edges.
    pub fn is_interior_line(self) -> bool {
        matches!(self, ElementKind::Line | ElementKind::LineEasting | ElementKind::LineNorthing)
    }

    pub fn is_label(self) -> bool {
        matches!(
            self,
            ElementKind::GridZoneLabel | ElementKind::LatitudeLabel | ElementKind::LongitudeLabel
        )
    }
}

/// One renderable of a tile with the sector used to cull it.
#[derive(Clone, Debug, PartialEq)]
pub struct GridElement {
    pub sector: Sector,
    pub renderable: RenderableHandle,
    pub kind: ElementKind,
    pub ty: GraticuleType,
    /// The meridian, parallel, easting or northing drawn; 0 for labels.
    pub value: f64,
}

impl GridElement {
    pub fn new(sector: Sector, renderable: RenderableHandle, kind: ElementKind, ty: GraticuleType, value: f64) -> Self {
        Self {
            sector,
            renderable,
            kind,
            ty,
            value,
        }
    }

    #[inline(always)]
    pub fn is_in_view(&self, visible: &Sector) -> bool {
        visible.intersects(&self.sector)
    }

    /// For geographic lines: a parallel has no latitude extent, a meridian no
    /// longitude extent.
    pub fn axis(&self) -> Option<Axis> {
        if self.kind.is_label() || matches!(self.kind, ElementKind::LineEasting | ElementKind::LineNorthing) {
            return None;
        }
        if self.sector.delta_lat == 0.0 {
            Some(Axis::Latitude)
        } else if self.sector.delta_lon == 0.0 {
            Some(Axis::Longitude)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::ShapeKind;

    fn handle() -> RenderableHandle {
        RenderableHandle { id: 0, kind: ShapeKind::Line }
    }

    #[test]
    fn axis_from_degenerate_sector() {
        let parallel = GridElement::new(
            Sector::from_bounds(20.0, 20.0, 0.0, 10.0),
            handle(),
            ElementKind::Line,
            GraticuleType::LatLon1Deg,
            20.0,
        );
        assert_eq!(parallel.axis(), Some(Axis::Latitude));
        let meridian = GridElement { sector: Sector::from_bounds(0.0, 10.0, 5.0, 5.0), ..parallel.clone() };
        assert_eq!(meridian.axis(), Some(Axis::Longitude));
        let easting = GridElement { kind: ElementKind::LineEasting, ..meridian };
        assert_eq!(easting.axis(), None);
    }

    #[test]
    fn view_test_uses_sector() {
        let e = GridElement::new(
            Sector::from_bounds(0.0, 10.0, 5.0, 5.0),
            handle(),
            ElementKind::LineWest,
            GraticuleType::LatLon10Deg,
            5.0,
        );
        assert!(e.is_in_view(&Sector::from_bounds(-5.0, 5.0, 0.0, 10.0)));
        assert!(!e.is_in_view(&Sector::from_bounds(20.0, 30.0, 0.0, 10.0)));
    }
}
