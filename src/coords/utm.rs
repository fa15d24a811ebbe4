//! Transverse Mercator on the WGS84 ellipsoid (Krüger series, third order).

use crate::coords::Hemisphere;
use crate::geo::LatLon;

pub const SEMI_MAJOR: f64 = 6_378_137.0;
pub const FLATTENING: f64 = 1.0 / 298.257_223_563;
pub const SCALE: f64 = 0.9996;
pub const FALSE_EASTING: f64 = 500_000.0;
pub const FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

/// Valid UTM latitude band.
pub const MIN_LAT: f64 = -80.0;
pub const MAX_LAT: f64 = 84.0;

struct Series {
    a_hat: f64,
    alpha: [f64; 3],
    beta: [f64; 3],
    delta: [f64; 3],
    n: f64,
}

fn series() -> Series {
    let n = FLATTENING / (2.0 - FLATTENING);
    let n2 = n * n;
    let n3 = n2 * n;
    Series {
        a_hat: SEMI_MAJOR / (1.0 + n) * (1.0 + n2 / 4.0 + n2 * n2 / 64.0),
        alpha: [
            n / 2.0 - 2.0 / 3.0 * n2 + 5.0 / 16.0 * n3,
            13.0 / 48.0 * n2 - 3.0 / 5.0 * n3,
            61.0 / 240.0 * n3,
        ],
        beta: [
            n / 2.0 - 2.0 / 3.0 * n2 + 37.0 / 96.0 * n3,
            n2 / 48.0 + n3 / 15.0,
            17.0 / 480.0 * n3,
        ],
        delta: [
            2.0 * n - 2.0 / 3.0 * n2 - 2.0 * n3,
            7.0 / 3.0 * n2 - 8.0 / 5.0 * n3,
            56.0 / 15.0 * n3,
        ],
        n,
    }
}

/// Central meridian of a zone in degrees.
#[inline]
pub fn central_meridian(zone: u8) -> f64 {
    zone as f64 * 6.0 - 183.0
}

/// Natural zone for a location, including the Norway and Svalbard exceptions.
pub fn zone_for(lat: f64, lon: f64) -> u8 {
    let lon = crate::geo::normalize_lon(lon);
    if (56.0..64.0).contains(&lat) && (3.0..12.0).contains(&lon) {
        return 32;
    }
    if (72.0..=84.0).contains(&lat) && (0.0..42.0).contains(&lon) {
        return match lon {
            l if l < 9.0 => 31,
            l if l < 21.0 => 33,
            l if l < 33.0 => 35,
            _ => 37,
        };
    }
    (((lon + 180.0) / 6.0).floor() as i32 + 1).clamp(1, 60) as u8
}

/// Project into the given zone. No latitude check; callers gate the domain.
pub fn forward(lat: f64, lon: f64, zone: u8, hemisphere: Hemisphere) -> (f64, f64) {
    let s = series();
    let phi = lat.to_radians();
    let mut dlon = lon - central_meridian(zone);
    if dlon > 180.0 {
        dlon -= 360.0;
    } else if dlon < -180.0 {
        dlon += 360.0;
    }
    let lambda = dlon.to_radians();

    let k = 2.0 * s.n.sqrt() / (1.0 + s.n);
    let sin_phi = phi.sin();
    let t = (sin_phi.atanh() - k * (k * sin_phi).atanh()).sinh();
    let xi_p = t.atan2(lambda.cos());
    let eta_p = (lambda.sin() / (1.0 + t * t).sqrt()).atanh();

    let mut xi = xi_p;
    let mut eta = eta_p;
    for (j, a) in s.alpha.iter().enumerate() {
        let j2 = 2.0 * (j + 1) as f64;
        xi += a * (j2 * xi_p).sin() * (j2 * eta_p).cosh();
        eta += a * (j2 * xi_p).cos() * (j2 * eta_p).sinh();
    }

    let easting = FALSE_EASTING + SCALE * s.a_hat * eta;
    let mut northing = SCALE * s.a_hat * xi;
    if hemisphere == Hemisphere::South {
        northing += FALSE_NORTHING_SOUTH;
    }
    (easting, northing)
}

/// Inverse projection from the given zone.
pub fn inverse(zone: u8, hemisphere: Hemisphere, easting: f64, northing: f64) -> LatLon {
    let s = series();
    let n0 = match hemisphere {
        Hemisphere::North => 0.0,
        Hemisphere::South => FALSE_NORTHING_SOUTH,
    };
    let xi = (northing - n0) / (SCALE * s.a_hat);
    let eta = (easting - FALSE_EASTING) / (SCALE * s.a_hat);

    let mut xi_p = xi;
    let mut eta_p = eta;
    for (j, b) in s.beta.iter().enumerate() {
        let j2 = 2.0 * (j + 1) as f64;
        xi_p -= b * (j2 * xi).sin() * (j2 * eta).cosh();
        eta_p -= b * (j2 * xi).cos() * (j2 * eta).sinh();
    }

    let chi = (xi_p.sin() / eta_p.cosh()).clamp(-1.0, 1.0).asin();
    let mut phi = chi;
    for (j, d) in s.delta.iter().enumerate() {
        let j2 = 2.0 * (j + 1) as f64;
        phi += d * (j2 * chi).sin();
    }
    let lambda = eta_p.sinh().atan2(xi_p.cos());

    LatLon::new(
        phi.to_degrees(),
        crate::geo::normalize_lon(central_meridian(zone) + lambda.to_degrees()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn central_meridian_on_equator() {
        let (e, n) = forward(0.0, 3.0, 31, Hemisphere::North);
        assert!((e - 500_000.0).abs() < 1e-6);
        assert!(n.abs() < 1e-6);
    }

    #[test]
    fn null_island() {
        let (e, n) = forward(0.0, 0.0, 31, Hemisphere::North);
        assert!((e - 166_021.44).abs() < 0.01, "{e}");
        assert!(n.abs() < 1e-6);
    }

    #[test]
    fn inverse_recovers_position() {
        for &(lat, lon) in &[(47.3, 8.5), (-33.9, 151.2), (83.9, 17.0), (-79.9, -70.1)] {
            let zone = zone_for(lat, lon);
            let hemi = Hemisphere::of(lat);
            let (e, n) = forward(lat, lon, zone, hemi);
            let back = inverse(zone, hemi, e, n);
            assert!((back.lat - lat).abs() < 1e-8, "{lat} {lon}: {back:?}");
            assert!((back.lon - lon).abs() < 1e-8, "{lat} {lon}: {back:?}");
        }
    }

    #[test]
    fn zone_exceptions() {
        assert_eq!(zone_for(60.0, 5.0), 32);
        assert_eq!(zone_for(60.0, 2.0), 31);
        assert_eq!(zone_for(78.0, 8.9), 31);
        assert_eq!(zone_for(78.0, 9.0), 33);
        assert_eq!(zone_for(78.0, 40.0), 37);
        assert_eq!(zone_for(0.0, 180.0), 60);
        assert_eq!(zone_for(0.0, -180.0), 1);
    }
}
