//! MGRS lettering on top of UTM/UPS.

use std::fmt;

use crate::coords::{utm, Hemisphere, PolarCap, ZoneId};
use crate::geo::LatLon;

/// Latitude band letters, 8° each from 80°S; X spans 72°N..84°N.
pub const BANDS: [char; 20] = [
    'C', 'D', 'E', 'F', 'G', 'H', 'J', 'K', 'L', 'M', 'N', 'P', 'Q', 'R', 'S', 'T', 'U', 'V',
    'W', 'X',
];

const UTM_COLUMNS: [&[u8; 8]; 3] = [b"ABCDEFGH", b"JKLMNPQR", b"STUVWXYZ"];
const UTM_ROWS: &[u8; 20] = b"ABCDEFGHJKLMNPQRSTUV";

const UPS_NORTH_ROWS: &[u8] = b"ABCDEFGHJKLMNP";
const UPS_SOUTH_ROWS: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ";
const UPS_Y_COLUMNS: &[u8] = b"RSTUXYZ";
const UPS_Z_COLUMNS: &[u8] = b"ABCFGHJ";
const UPS_A_COLUMNS: &[u8] = b"JKLPQRSTUXYZ";
const UPS_B_COLUMNS: &[u8] = b"ABCFGHJKLPQR";

/// Band index (0 = C) for a latitude inside the UTM domain.
pub fn band_index(lat: f64) -> Option<usize> {
    if !(utm::MIN_LAT..=utm::MAX_LAT).contains(&lat) {
        return None;
    }
    Some((((lat + 80.0) / 8.0).floor() as usize).min(19))
}

pub fn band_letter(lat: f64) -> Option<char> {
    band_index(lat).map(|i| BANDS[i])
}

/// Southern edge and height of a band in degrees.
pub fn band_extent(index: usize) -> (f64, f64) {
    let min = -80.0 + 8.0 * index as f64;
    let height = if index == 19 { 12.0 } else { 8.0 };
    (min, height)
}

/// Western edge and width of grid zone `zone` in band `band`, or `None` for
/// the zones that do not exist (32X, 34X, 36X).
pub fn grid_zone_lon_extent(zone: u8, band: usize) -> Option<(f64, f64)> {
    if !(1..=60).contains(&zone) || band > 19 {
        return None;
    }
    let standard = (-180.0 + 6.0 * (zone as f64 - 1.0), 6.0);
    match (band, zone) {
        (17, 31) => Some((0.0, 3.0)),
        (17, 32) => Some((3.0, 9.0)),
        (19, 31) => Some((0.0, 9.0)),
        (19, 33) => Some((9.0, 12.0)),
        (19, 35) => Some((21.0, 12.0)),
        (19, 37) => Some((33.0, 9.0)),
        (19, 32) | (19, 34) | (19, 36) => None,
        _ => Some(standard),
    }
}

/// Two-letter 100 km square identifier for a projected coordinate.
pub fn square_id(zone: ZoneId, easting: f64, northing: f64) -> Option<[char; 2]> {
    let col = (easting / 100_000.0).floor() as i64;
    let row = (northing / 100_000.0).floor() as i64;
    match zone {
        ZoneId::Utm { zone, .. } => {
            if !(1..=60).contains(&zone) || !(1..=8).contains(&col) {
                return None;
            }
            let set = (zone as usize - 1) % 6;
            let columns = UTM_COLUMNS[set % 3];
            let offset = if set % 2 == 0 { 0 } else { 5 };
            let row_index = (row + offset).rem_euclid(20) as usize;
            Some([
                columns[(col - 1) as usize] as char,
                UTM_ROWS[row_index] as char,
            ])
        }
        ZoneId::Ups(cap) => {
            let (columns, col_base, rows, row_base): (&[u8], i64, &[u8], i64) = match cap {
                PolarCap::Y => (UPS_Y_COLUMNS, 13, UPS_NORTH_ROWS, 13),
                PolarCap::Z => (UPS_Z_COLUMNS, 20, UPS_NORTH_ROWS, 13),
                PolarCap::A => (UPS_A_COLUMNS, 8, UPS_SOUTH_ROWS, 8),
                PolarCap::B => (UPS_B_COLUMNS, 20, UPS_SOUTH_ROWS, 8),
            };
            let c = columns.get(usize::try_from(col - col_base).ok()?)?;
            let r = rows.get(usize::try_from(row - row_base).ok()?)?;
            Some([*c as char, *r as char])
        }
    }
}

/// An MGRS coordinate at one-meter precision.
#[derive(Clone, Debug, PartialEq)]
pub struct MgrsCoord {
    /// UTM zone number, `None` in the polar regions.
    pub zone: Option<u8>,
    pub band: char,
    pub square: [char; 2],
    /// Easting within the 100 km square.
    pub easting: u32,
    /// Northing within the 100 km square.
    pub northing: u32,
}

impl fmt::Display for MgrsCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(zone) = self.zone {
            write!(f, "{zone:02}")?;
        }
        write!(
            f,
            "{}{}{}{:05}{:05}",
            self.band, self.square[0], self.square[1], self.easting, self.northing
        )
    }
}

pub fn from_geo(lat: f64, lon: f64) -> Option<MgrsCoord> {
    if let Some(band) = band_letter(lat) {
        let zone = utm::zone_for(lat, lon);
        let hemisphere = Hemisphere::of(lat);
        let (e, n) = utm::forward(lat, lon, zone, hemisphere);
        let square = square_id(ZoneId::Utm { zone, hemisphere }, e, n)?;
        return Some(MgrsCoord {
            zone: Some(zone),
            band,
            square,
            easting: (e.floor() as i64).rem_euclid(100_000) as u32,
            northing: (n.floor() as i64).rem_euclid(100_000) as u32,
        });
    }
    let cap = PolarCap::of(lat, lon)?;
    let (e, n) = crate::coords::ups::forward(lat, lon, cap.hemisphere());
    let square = square_id(ZoneId::Ups(cap), e, n)?;
    Some(MgrsCoord {
        zone: None,
        band: cap.letter(),
        square,
        easting: (e.floor() as i64).rem_euclid(100_000) as u32,
        northing: (n.floor() as i64).rem_euclid(100_000) as u32,
    })
}

/// Parse an MGRS string (any even-digit precision) to the south-west
/// corner of the referenced cell.
pub fn to_geo(text: &str) -> Option<LatLon> {
    let text: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let text = text.to_ascii_uppercase();
    let digits_end = text.find(|c: char| !c.is_ascii_digit())?;
    let zone: Option<u8> = if digits_end == 0 {
        None
    } else {
        Some(text[..digits_end].parse().ok()?)
    };
    let mut chars = text[digits_end..].chars();
    let band = chars.next()?;
    let sq = [chars.next()?, chars.next()?];
    let rest: String = chars.collect();
    if rest.len() % 2 != 0 || rest.len() > 10 || !rest.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let half = rest.len() / 2;
    let scale = 10f64.powi(5 - half as i32);
    let e_in: f64 = if half == 0 { 0.0 } else { rest[..half].parse::<f64>().ok()? * scale };
    let n_in: f64 = if half == 0 { 0.0 } else { rest[half..].parse::<f64>().ok()? * scale };

    match zone {
        Some(zone) => {
            let band_idx = BANDS.iter().position(|&b| b == band)?;
            let set = (zone as usize).checked_sub(1)? % 6;
            let col = UTM_COLUMNS[set % 3].iter().position(|&c| c as char == sq[0])? as f64 + 1.0;
            let offset = if set % 2 == 0 { 0 } else { 5 };
            let row_letter = UTM_ROWS.iter().position(|&c| c as char == sq[1])? as i64;
            let row = (row_letter - offset).rem_euclid(20) as f64;

            let hemisphere = if band_idx >= 10 { Hemisphere::North } else { Hemisphere::South };
            let easting = col * 100_000.0 + e_in;
            let (band_min, _) = band_extent(band_idx);
            let (_, band_min_northing) =
                utm::forward(band_min, utm::central_meridian(zone), zone, hemisphere);

            // Northing letters repeat every 2000 km; pick the cycle that lands
            // at or above the southern edge of the band.
            let mut northing = row * 100_000.0 + n_in;
            let cycle = 2_000_000.0;
            let base = ((band_min_northing - 100_000.0) / cycle).floor() * cycle;
            northing += base.max(0.0);
            while northing < band_min_northing - 100_000.0 {
                northing += cycle;
            }
            Some(utm::inverse(zone, hemisphere, easting, northing))
        }
        None => {
            let cap = match band {
                'A' => PolarCap::A,
                'B' => PolarCap::B,
                'Y' => PolarCap::Y,
                'Z' => PolarCap::Z,
                _ => return None,
            };
            let (columns, col_base, rows, row_base): (&[u8], f64, &[u8], f64) = match cap {
                PolarCap::Y => (UPS_Y_COLUMNS, 13.0, UPS_NORTH_ROWS, 13.0),
                PolarCap::Z => (UPS_Z_COLUMNS, 20.0, UPS_NORTH_ROWS, 13.0),
                PolarCap::A => (UPS_A_COLUMNS, 8.0, UPS_SOUTH_ROWS, 8.0),
                PolarCap::B => (UPS_B_COLUMNS, 20.0, UPS_SOUTH_ROWS, 8.0),
            };
            let col = columns.iter().position(|&c| c as char == sq[0])? as f64 + col_base;
            let row = rows.iter().position(|&c| c as char == sq[1])? as f64 + row_base;
            Some(crate::coords::ups::inverse(
                cap.hemisphere(),
                col * 100_000.0 + e_in,
                row * 100_000.0 + n_in,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_island_designator() {
        let m = from_geo(0.0, 0.0).unwrap();
        assert_eq!(m.to_string(), "31NAA6602100000");
    }

    #[test]
    fn poles() {
        assert_eq!(from_geo(90.0, 0.0).unwrap().to_string(), "ZAH0000000000");
        assert_eq!(from_geo(-90.0, 0.0).unwrap().to_string(), "BAN0000000000");
    }

    #[test]
    fn parse_recovers_location() {
        for &(lat, lon) in &[(48.8583, 2.2945), (-33.8568, 151.2153), (40.6892, -74.0445)] {
            let m = from_geo(lat, lon).unwrap();
            let back = to_geo(&m.to_string()).unwrap();
            // One-meter truncation.
            assert!((back.lat - lat).abs() < 5e-5, "{m} {back:?}");
            assert!((back.lon - lon).abs() < 5e-5, "{m} {back:?}");
        }
    }

    #[test]
    fn missing_svalbard_zones() {
        assert!(grid_zone_lon_extent(32, 19).is_none());
        assert_eq!(grid_zone_lon_extent(33, 19), Some((9.0, 12.0)));
        assert_eq!(grid_zone_lon_extent(32, 17), Some((3.0, 9.0)));
        assert_eq!(grid_zone_lon_extent(33, 17), Some((12.0, 6.0)));
    }

    #[test]
    fn band_lookup() {
        assert_eq!(band_letter(0.0), Some('N'));
        assert_eq!(band_letter(-0.1), Some('M'));
        assert_eq!(band_letter(84.0), Some('X'));
        assert_eq!(band_letter(-80.0), Some('C'));
        assert_eq!(band_letter(85.0), None);
    }
}
