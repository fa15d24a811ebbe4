//! Universal Polar Stereographic on the WGS84 ellipsoid.

use crate::coords::utm::{FLATTENING, SEMI_MAJOR};
use crate::coords::Hemisphere;
use crate::geo::LatLon;

pub const SCALE: f64 = 0.994;
pub const FALSE_ORIGIN: f64 = 2_000_000.0;

/// UPS accepts latitudes poleward of these (half a degree of overlap with UTM).
pub const NORTH_MIN_LAT: f64 = 83.5;
pub const SOUTH_MAX_LAT: f64 = -79.5;

fn eccentricity() -> f64 {
    (FLATTENING * (2.0 - FLATTENING)).sqrt()
}

fn rho_factor(e: f64) -> f64 {
    2.0 * SEMI_MAJOR * SCALE / ((1.0 + e).powf(1.0 + e) * (1.0 - e).powf(1.0 - e)).sqrt()
}

pub fn forward(lat: f64, lon: f64, hemisphere: Hemisphere) -> (f64, f64) {
    let e = eccentricity();
    let phi = match hemisphere {
        Hemisphere::North => lat.to_radians(),
        Hemisphere::South => -lat.to_radians(),
    };
    let lambda = lon.to_radians();

    let sin_phi = phi.sin();
    let t = (std::f64::consts::FRAC_PI_4 - phi / 2.0).tan()
        / ((1.0 - e * sin_phi) / (1.0 + e * sin_phi)).powf(e / 2.0);
    let rho = rho_factor(e) * t;

    let easting = FALSE_ORIGIN + rho * lambda.sin();
    let northing = match hemisphere {
        Hemisphere::North => FALSE_ORIGIN - rho * lambda.cos(),
        Hemisphere::South => FALSE_ORIGIN + rho * lambda.cos(),
    };
    (easting, northing)
}

pub fn inverse(hemisphere: Hemisphere, easting: f64, northing: f64) -> LatLon {
    let e = eccentricity();
    let dx = easting - FALSE_ORIGIN;
    let dy = northing - FALSE_ORIGIN;
    let rho = (dx * dx + dy * dy).sqrt();
    let t = rho / rho_factor(e);
    let chi = std::f64::consts::FRAC_PI_2 - 2.0 * t.atan();

    let e2 = e * e;
    let e4 = e2 * e2;
    let e6 = e4 * e2;
    let e8 = e4 * e4;
    let phi = chi
        + (e2 / 2.0 + 5.0 * e4 / 24.0 + e6 / 12.0 + 13.0 * e8 / 360.0) * (2.0 * chi).sin()
        + (7.0 * e4 / 48.0 + 29.0 * e6 / 240.0 + 811.0 * e8 / 11520.0) * (4.0 * chi).sin()
        + (7.0 * e6 / 120.0 + 81.0 * e8 / 1120.0) * (6.0 * chi).sin()
        + (4279.0 * e8 / 161_280.0) * (8.0 * chi).sin();

    match hemisphere {
        Hemisphere::North => {
            let lon = if rho == 0.0 { 0.0 } else { dx.atan2(-dy).to_degrees() };
            LatLon::new(phi.to_degrees(), lon)
        }
        Hemisphere::South => {
            let lon = if rho == 0.0 { 0.0 } else { dx.atan2(dy).to_degrees() };
            LatLon::new(-phi.to_degrees(), lon)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poles_map_to_false_origin() {
        let (e, n) = forward(90.0, 0.0, Hemisphere::North);
        assert!((e - FALSE_ORIGIN).abs() < 1e-6);
        assert!((n - FALSE_ORIGIN).abs() < 1e-6);
        let (e, n) = forward(-90.0, 45.0, Hemisphere::South);
        assert!((e - FALSE_ORIGIN).abs() < 1e-6);
        assert!((n - FALSE_ORIGIN).abs() < 1e-6);
    }

    #[test]
    fn greenwich_points_down_in_the_north() {
        let (e, n) = forward(85.0, 0.0, Hemisphere::North);
        assert!((e - FALSE_ORIGIN).abs() < 1e-6);
        assert!(n < FALSE_ORIGIN);
    }

    #[test]
    fn inverse_recovers_position() {
        for &(lat, lon, hemi) in &[
            (86.0, 45.0, Hemisphere::North),
            (84.5, -120.0, Hemisphere::North),
            (-82.0, 170.0, Hemisphere::South),
            (-88.0, -10.0, Hemisphere::South),
        ] {
            let (e, n) = forward(lat, lon, hemi);
            let back = inverse(hemi, e, n);
            assert!((back.lat - lat).abs() < 1e-8, "{back:?}");
            assert!((back.lon - lon).abs() < 1e-8, "{back:?}");
        }
    }
}
