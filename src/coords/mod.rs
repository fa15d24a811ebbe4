//! Geodetic to projected conversions (UTM, UPS, MGRS).
//!
//! The grid engine talks to this module only through [`CoordinateService`];
//! [`Wgs84Coordinates`] is the implementation shipped with the crate.

pub mod mgrs;
pub mod ups;
pub mod utm;

pub use mgrs::MgrsCoord;

use crate::geo::LatLon;
use crate::sector::Sector;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Hemisphere {
    North,
    South,
}

impl Hemisphere {
    /// The equator belongs to the north.
    #[inline(always)]
    pub fn of(lat: f64) -> Self {
        if lat >= 0.0 {
            Hemisphere::North
        } else {
            Hemisphere::South
        }
    }

    pub fn letter(self) -> char {
        match self {
            Hemisphere::North => 'N',
            Hemisphere::South => 'S',
        }
    }
}

/// The four UPS polar caps. A/B cover the south pole west/east of Greenwich,
/// Y/Z the north pole.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PolarCap {
    A,
    B,
    Y,
    Z,
}

impl PolarCap {
    pub const ALL: [PolarCap; 4] = [PolarCap::A, PolarCap::B, PolarCap::Y, PolarCap::Z];

    /// Cap for a location outside the UTM latitude band, `None` inside it.
    pub fn of(lat: f64, lon: f64) -> Option<Self> {
        let west = crate::geo::normalize_lon(lon) < 0.0;
        if lat > utm::MAX_LAT {
            Some(if west { PolarCap::Y } else { PolarCap::Z })
        } else if lat < utm::MIN_LAT {
            Some(if west { PolarCap::A } else { PolarCap::B })
        } else {
            None
        }
    }

    pub fn hemisphere(self) -> Hemisphere {
        match self {
            PolarCap::A | PolarCap::B => Hemisphere::South,
            PolarCap::Y | PolarCap::Z => Hemisphere::North,
        }
    }

    pub fn letter(self) -> char {
        match self {
            PolarCap::A => 'A',
            PolarCap::B => 'B',
            PolarCap::Y => 'Y',
            PolarCap::Z => 'Z',
        }
    }

    pub fn sector(self) -> Sector {
        match self {
            PolarCap::A => Sector::from_bounds(-90.0, utm::MIN_LAT, -180.0, 0.0),
            PolarCap::B => Sector::from_bounds(-90.0, utm::MIN_LAT, 0.0, 180.0),
            PolarCap::Y => Sector::from_bounds(utm::MAX_LAT, 90.0, -180.0, 0.0),
            PolarCap::Z => Sector::from_bounds(utm::MAX_LAT, 90.0, 0.0, 180.0),
        }
    }
}

/// Identity of a projected zone: a UTM zone in one hemisphere or a UPS cap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ZoneId {
    Utm { zone: u8, hemisphere: Hemisphere },
    Ups(PolarCap),
}

impl ZoneId {
    pub fn hemisphere(self) -> Hemisphere {
        match self {
            ZoneId::Utm { hemisphere, .. } => hemisphere,
            ZoneId::Ups(cap) => cap.hemisphere(),
        }
    }

    /// Standard geographic extent of the zone, without MGRS exceptions.
    pub fn sector(self) -> Sector {
        match self {
            ZoneId::Utm { zone, hemisphere } => {
                let min_lon = -180.0 + 6.0 * (zone as f64 - 1.0);
                match hemisphere {
                    Hemisphere::North => Sector::from_bounds(0.0, utm::MAX_LAT, min_lon, min_lon + 6.0),
                    Hemisphere::South => Sector::from_bounds(utm::MIN_LAT, 0.0, min_lon, min_lon + 6.0),
                }
            }
            ZoneId::Ups(cap) => cap.sector(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UtmCoord {
    pub zone: u8,
    pub hemisphere: Hemisphere,
    pub easting: f64,
    pub northing: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UpsCoord {
    pub hemisphere: Hemisphere,
    pub easting: f64,
    pub northing: f64,
}

/// Geographic to projected conversions. Every conversion answers `None`
/// outside its latitude band instead of failing.
pub trait CoordinateService {
    /// UTM in the natural zone (with Norway/Svalbard exceptions), −80..=84.
    fn geo_to_utm(&self, lat: f64, lon: f64) -> Option<UtmCoord>;

    /// UTM in a caller-chosen zone, for drawing lines that extend past the
    /// zone edge.
    fn geo_to_utm_zone(&self, lat: f64, lon: f64, zone: u8) -> Option<UtmCoord>;

    fn utm_to_geo(&self, utm: &UtmCoord) -> Option<LatLon>;

    /// UPS, north of 83.5° or south of −79.5°.
    fn geo_to_ups(&self, lat: f64, lon: f64) -> Option<UpsCoord>;

    fn ups_to_geo(&self, ups: &UpsCoord) -> Option<LatLon>;

    fn geo_to_mgrs(&self, lat: f64, lon: f64) -> Option<MgrsCoord>;

    fn mgrs_to_geo(&self, mgrs: &str) -> Option<LatLon>;

    /// Two-letter 100 km square id at a projected position.
    fn mgrs_square_id(&self, zone: ZoneId, easting: f64, northing: f64) -> Option<String>;

    /// Project into `zone` regardless of the natural zone of the point.
    /// Northings stay in the zone's hemisphere: a southern zone keeps its
    /// false northing for points on the equator.
    fn zone_forward(&self, zone: ZoneId, p: LatLon) -> Option<(f64, f64)> {
        match zone {
            ZoneId::Utm { zone, hemisphere } => {
                let c = self.geo_to_utm_zone(p.lat, p.lon, zone)?;
                let northing = match (c.hemisphere, hemisphere) {
                    (Hemisphere::North, Hemisphere::South) => c.northing + utm::FALSE_NORTHING_SOUTH,
                    (Hemisphere::South, Hemisphere::North) => c.northing - utm::FALSE_NORTHING_SOUTH,
                    _ => c.northing,
                };
                Some((c.easting, northing))
            }
            ZoneId::Ups(cap) => {
                let c = self.geo_to_ups(p.lat, p.lon)?;
                (c.hemisphere == cap.hemisphere()).then_some((c.easting, c.northing))
            }
        }
    }

    fn zone_inverse(&self, zone: ZoneId, easting: f64, northing: f64) -> Option<LatLon> {
        match zone {
            ZoneId::Utm { zone, hemisphere } => self.utm_to_geo(&UtmCoord {
                zone,
                hemisphere,
                easting,
                northing,
            }),
            ZoneId::Ups(cap) => self.ups_to_geo(&UpsCoord {
                hemisphere: cap.hemisphere(),
                easting,
                northing,
            }),
        }
    }
}

/// WGS84 conversions.
#[derive(Clone, Copy, Debug, Default)]
pub struct Wgs84Coordinates;

impl CoordinateService for Wgs84Coordinates {
    fn geo_to_utm(&self, lat: f64, lon: f64) -> Option<UtmCoord> {
        if !(utm::MIN_LAT..=utm::MAX_LAT).contains(&lat) {
            return None;
        }
        self.geo_to_utm_zone(lat, lon, utm::zone_for(lat, lon))
    }

    fn geo_to_utm_zone(&self, lat: f64, lon: f64, zone: u8) -> Option<UtmCoord> {
        if !(utm::MIN_LAT..=utm::MAX_LAT).contains(&lat) || !(1..=60).contains(&zone) {
            return None;
        }
        let hemisphere = Hemisphere::of(lat);
        let (easting, northing) = utm::forward(lat, lon, zone, hemisphere);
        if !easting.is_finite() || !northing.is_finite() {
            return None;
        }
        Some(UtmCoord {
            zone,
            hemisphere,
            easting,
            northing,
        })
    }

    fn utm_to_geo(&self, c: &UtmCoord) -> Option<LatLon> {
        if !(1..=60).contains(&c.zone) {
            return None;
        }
        let p = utm::inverse(c.zone, c.hemisphere, c.easting, c.northing);
        (p.lat.is_finite() && p.lon.is_finite()).then_some(p)
    }

    fn geo_to_ups(&self, lat: f64, lon: f64) -> Option<UpsCoord> {
        let hemisphere = if lat >= ups::NORTH_MIN_LAT {
            Hemisphere::North
        } else if lat <= ups::SOUTH_MAX_LAT {
            Hemisphere::South
        } else {
            return None;
        };
        let (easting, northing) = ups::forward(lat, lon, hemisphere);
        Some(UpsCoord {
            hemisphere,
            easting,
            northing,
        })
    }

    fn ups_to_geo(&self, c: &UpsCoord) -> Option<LatLon> {
        let p = ups::inverse(c.hemisphere, c.easting, c.northing);
        (p.lat.is_finite() && p.lon.is_finite()).then_some(p)
    }

    fn geo_to_mgrs(&self, lat: f64, lon: f64) -> Option<MgrsCoord> {
        if !(-90.0..=90.0).contains(&lat) {
            return None;
        }
        mgrs::from_geo(lat, lon)
    }

    fn mgrs_to_geo(&self, text: &str) -> Option<LatLon> {
        mgrs::to_geo(text)
    }

    fn mgrs_square_id(&self, zone: ZoneId, easting: f64, northing: f64) -> Option<String> {
        mgrs::square_id(zone, easting, northing).map(|[a, b]| [a, b].iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utm_outside_band_is_none() {
        let svc = Wgs84Coordinates;
        assert!(svc.geo_to_utm(84.5, 10.0).is_none());
        assert!(svc.geo_to_utm(-80.5, 10.0).is_none());
        assert!(svc.geo_to_utm(84.0, 10.0).is_some());
    }

    #[test]
    fn ups_outside_caps_is_none() {
        let svc = Wgs84Coordinates;
        assert!(svc.geo_to_ups(45.0, 0.0).is_none());
        assert!(svc.geo_to_ups(83.5, 0.0).is_some());
        assert!(svc.geo_to_ups(-79.5, 0.0).is_some());
    }

    #[test]
    fn forced_zone_extends_past_edge() {
        let svc = Wgs84Coordinates;
        let natural = svc.geo_to_utm(10.0, 6.5).unwrap();
        assert_eq!(natural.zone, 32);
        let forced = svc.geo_to_utm_zone(10.0, 6.5, 31).unwrap();
        assert!(forced.easting > 800_000.0);
    }

    #[test]
    fn utm_round_trip_through_service() {
        let svc = Wgs84Coordinates;
        let c = svc.geo_to_utm(-12.5, -77.0).unwrap();
        assert_eq!(c.hemisphere, Hemisphere::South);
        let back = svc.utm_to_geo(&c).unwrap();
        assert!((back.lat + 12.5).abs() < 1e-8);
        assert!((back.lon + 77.0).abs() < 1e-8);
    }

    #[test]
    fn polar_caps() {
        assert_eq!(PolarCap::of(85.0, -1.0), Some(PolarCap::Y));
        assert_eq!(PolarCap::of(85.0, 1.0), Some(PolarCap::Z));
        assert_eq!(PolarCap::of(-81.0, -1.0), Some(PolarCap::A));
        assert_eq!(PolarCap::of(-81.0, 1.0), Some(PolarCap::B));
        assert_eq!(PolarCap::of(0.0, 0.0), None);
    }

    #[test]
    fn zone_projection_keeps_the_zone_hemisphere() {
        let svc = Wgs84Coordinates;
        let south = ZoneId::Utm { zone: 31, hemisphere: Hemisphere::South };
        let (e, n) = svc.zone_forward(south, LatLon::new(0.0, 3.0)).unwrap();
        assert!((e - 500_000.0).abs() < 1e-6);
        assert!((n - utm::FALSE_NORTHING_SOUTH).abs() < 1e-6);
        let back = svc.zone_inverse(south, e, n).unwrap();
        assert!(back.lat.abs() < 1e-9 && (back.lon - 3.0).abs() < 1e-9);

        // Forced into the western neighbour's projection.
        let west = ZoneId::Utm { zone: 30, hemisphere: Hemisphere::North };
        let (e, _) = svc.zone_forward(west, LatLon::new(45.0, 1.0)).unwrap();
        assert!(e > 700_000.0);
    }

    #[test]
    fn caps_project_only_their_own_pole() {
        let svc = Wgs84Coordinates;
        assert!(svc.zone_forward(ZoneId::Ups(PolarCap::Z), LatLon::new(86.0, 10.0)).is_some());
        assert!(svc.zone_forward(ZoneId::Ups(PolarCap::B), LatLon::new(86.0, 10.0)).is_none());
        let pole = svc.zone_inverse(ZoneId::Ups(PolarCap::Y), 2_000_000.0, 2_000_000.0).unwrap();
        assert!((pole.lat - 90.0).abs() < 1e-9);
    }

    #[test]
    fn square_id_as_string() {
        let svc = Wgs84Coordinates;
        let zone = ZoneId::Utm {
            zone: 31,
            hemisphere: Hemisphere::North,
        };
        assert_eq!(svc.mgrs_square_id(zone, 166_021.0, 0.0).as_deref(), Some("AA"));
        assert_eq!(svc.mgrs_square_id(zone, 50_000.0, 0.0), None);
    }
}
