//! WGS84 geographic → UTM conversion.
//!
//! Forward transverse Mercator using the series expansion in Snyder, *Map
//! Projections: A Working Manual* (USGS PP 1395), eqs. 8-9 to 8-10. Accuracy is
//! sub-meter within a few degrees of the central meridian.
//!
//! All outputs are in kilometers so that distances feed directly into the
//! forward model alongside locking depths in km.

use crate::domain::{GeoPoint, PlanarPoint};
use crate::error::{FaultError, FaultResult};

const WGS84_A: f64 = 6_378_137.0;
const WGS84_F: f64 = 1.0 / 298.257_223_563;
const K0: f64 = 0.9996;
const FALSE_EASTING_M: f64 = 500_000.0;
const FALSE_NORTHING_SOUTH_M: f64 = 10_000_000.0;

/// UTM latitude band limits (outside this range UPS applies).
const LAT_MIN: f64 = -80.0;
const LAT_MAX: f64 = 84.0;

/// Maximum distance from the central meridian accepted by a projector.
///
/// A nominal zone spans ±3°; we accept one further zone-width of overlap so a
/// network straddling a zone boundary still projects into one frame.
pub const MAX_MERIDIAN_OFFSET_DEG: f64 = 6.0;

/// Wrap a longitude into `[-180, 180)`.
pub fn wrap_longitude(lon: f64) -> f64 {
    (lon + 180.0).rem_euclid(360.0) - 180.0
}

/// UTM zone number (1..=60) containing the given longitude.
pub fn utm_zone(lon: f64) -> u8 {
    let wrapped = wrap_longitude(lon);
    let zone = ((wrapped + 180.0) / 6.0).floor() as i64 + 1;
    zone.clamp(1, 60) as u8
}

/// Central meridian (degrees) of a UTM zone.
pub fn central_meridian(zone: u8) -> f64 {
    f64::from(zone) * 6.0 - 183.0
}

/// Projects geographic points into a single UTM zone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UtmProjector {
    zone: u8,
    south: bool,
}

impl UtmProjector {
    /// Build a projector for an explicit zone and hemisphere.
    pub fn for_zone(zone: u8, south: bool) -> FaultResult<Self> {
        if !(1..=60).contains(&zone) {
            return Err(FaultError::configuration(format!(
                "UTM zone must be in 1..=60, got {zone}"
            )));
        }
        Ok(Self { zone, south })
    }

    /// Build a projector whose zone and hemisphere contain `reference`.
    pub fn for_point(reference: GeoPoint) -> FaultResult<Self> {
        validate_geo(reference)?;
        Self::for_zone(utm_zone(reference.lon), reference.lat < 0.0)
    }

    pub fn zone(&self) -> u8 {
        self.zone
    }

    pub fn is_south(&self) -> bool {
        self.south
    }

    /// Convert a geographic point to easting/northing (km).
    ///
    /// Fails if the point is not finite, lies outside the UTM latitude band, or
    /// is too far from this zone's central meridian.
    pub fn project(&self, p: GeoPoint) -> FaultResult<PlanarPoint> {
        validate_geo(p)?;

        let lon0 = central_meridian(self.zone);
        let dlon = wrap_longitude(p.lon - lon0);
        if dlon.abs() > MAX_MERIDIAN_OFFSET_DEG {
            return Err(FaultError::domain(format!(
                "longitude {:.6} is {:.3}° from the central meridian of UTM zone {} (limit {MAX_MERIDIAN_OFFSET_DEG}°)",
                p.lon,
                dlon.abs(),
                self.zone
            )));
        }

        let (x, y) = transverse_mercator(p.lat.to_radians(), dlon.to_radians());
        let northing = if self.south {
            y + FALSE_NORTHING_SOUTH_M
        } else {
            y
        };

        Ok(PlanarPoint {
            easting: (x + FALSE_EASTING_M) / 1000.0,
            northing: northing / 1000.0,
        })
    }
}

fn validate_geo(p: GeoPoint) -> FaultResult<()> {
    if !(p.lon.is_finite() && p.lat.is_finite()) {
        return Err(FaultError::domain(format!(
            "non-finite coordinate: lon={}, lat={}",
            p.lon, p.lat
        )));
    }
    if !(LAT_MIN..=LAT_MAX).contains(&p.lat) {
        return Err(FaultError::domain(format!(
            "latitude {} outside the UTM range [{LAT_MIN}, {LAT_MAX}]",
            p.lat
        )));
    }
    Ok(())
}

/// Transverse Mercator (meters, before false easting/northing).
///
/// `phi` is latitude and `dlam` is longitude relative to the central meridian,
/// both in radians.
fn transverse_mercator(phi: f64, dlam: f64) -> (f64, f64) {
    let e2 = WGS84_F * (2.0 - WGS84_F);
    let e4 = e2 * e2;
    let e6 = e4 * e2;
    let ep2 = e2 / (1.0 - e2);

    let (sin_phi, cos_phi) = phi.sin_cos();
    let tan_phi = sin_phi / cos_phi;

    let n = WGS84_A / (1.0 - e2 * sin_phi * sin_phi).sqrt();
    let t = tan_phi * tan_phi;
    let c = ep2 * cos_phi * cos_phi;
    let a = cos_phi * dlam;

    let m = WGS84_A
        * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * phi
            - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * phi).sin()
            + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * phi).sin()
            - (35.0 * e6 / 3072.0) * (6.0 * phi).sin());

    let a2 = a * a;
    let a3 = a2 * a;
    let a4 = a3 * a;
    let a5 = a4 * a;
    let a6 = a5 * a;

    let x = K0
        * n
        * (a + (1.0 - t + c) * a3 / 6.0
            + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * ep2) * a5 / 120.0);

    let y = K0
        * (m + n
            * tan_phi
            * (a2 / 2.0
                + (5.0 - t + 9.0 * c + 4.0 * c * c) * a4 / 24.0
                + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * ep2) * a6 / 720.0));

    (x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_longitude_into_half_open_range() {
        assert!((wrap_longitude(190.0) - (-170.0)).abs() < 1e-12);
        assert!((wrap_longitude(-190.0) - 170.0).abs() < 1e-12);
        assert!((wrap_longitude(180.0) - (-180.0)).abs() < 1e-12);
        assert!((wrap_longitude(-117.5) - (-117.5)).abs() < 1e-12);
    }

    #[test]
    fn zone_and_central_meridian() {
        assert_eq!(utm_zone(-180.0), 1);
        assert_eq!(utm_zone(3.0), 31);
        assert_eq!(utm_zone(-117.0), 11);
        assert_eq!(utm_zone(179.9), 60);
        assert_eq!(utm_zone(243.0), 11);
        assert!((central_meridian(31) - 3.0).abs() < 1e-12);
        assert!((central_meridian(11) - (-117.0)).abs() < 1e-12);
    }

    #[test]
    fn equator_on_central_meridian_is_false_origin() {
        let proj = UtmProjector::for_zone(31, false).unwrap();
        let p = proj.project(GeoPoint::new(3.0, 0.0)).unwrap();
        assert!((p.easting - 500.0).abs() < 1e-9);
        assert!(p.northing.abs() < 1e-9);
    }

    #[test]
    fn northing_on_central_meridian_matches_meridian_arc() {
        // WGS84 meridian arc to 45°N is 4 984 944.378 m; scaled by k0.
        let proj = UtmProjector::for_zone(31, false).unwrap();
        let p = proj.project(GeoPoint::new(3.0, 45.0)).unwrap();
        assert!((p.northing - 4_984.944_378 * K0).abs() < 0.01, "northing={}", p.northing);
        assert!((p.easting - 500.0).abs() < 1e-9);
    }

    #[test]
    fn easting_is_symmetric_about_central_meridian() {
        let proj = UtmProjector::for_zone(11, false).unwrap();
        let east = proj.project(GeoPoint::new(-116.0, 34.0)).unwrap();
        let west = proj.project(GeoPoint::new(-118.0, 34.0)).unwrap();
        assert!(((east.easting - 500.0) + (west.easting - 500.0)).abs() < 1e-9);
        assert!((east.northing - west.northing).abs() < 1e-9);
        // One degree of longitude at 34°N is roughly 92 km.
        assert!((east.easting - 500.0 - 92.4).abs() < 1.0, "easting={}", east.easting);
    }

    #[test]
    fn longitudes_are_wrapped_before_projection() {
        let proj = UtmProjector::for_zone(11, false).unwrap();
        let a = proj.project(GeoPoint::new(-117.2, 34.0)).unwrap();
        let b = proj.project(GeoPoint::new(242.8, 34.0)).unwrap();
        assert!((a.easting - b.easting).abs() < 1e-9);
        assert!((a.northing - b.northing).abs() < 1e-9);
    }

    #[test]
    fn out_of_zone_longitude_is_rejected() {
        let proj = UtmProjector::for_zone(11, false).unwrap();
        let err = proj.project(GeoPoint::new(-100.0, 34.0)).unwrap_err();
        assert!(matches!(err, FaultError::Domain(_)));
    }

    #[test]
    fn invalid_latitude_and_zone_are_rejected() {
        let proj = UtmProjector::for_zone(11, false).unwrap();
        assert!(matches!(
            proj.project(GeoPoint::new(-117.0, 88.0)),
            Err(FaultError::Domain(_))
        ));
        assert!(matches!(
            proj.project(GeoPoint::new(f64::NAN, 10.0)),
            Err(FaultError::Domain(_))
        ));
        assert!(matches!(
            UtmProjector::for_zone(0, false),
            Err(FaultError::Configuration(_))
        ));
    }

    #[test]
    fn southern_hemisphere_uses_false_northing() {
        let proj = UtmProjector::for_point(GeoPoint::new(174.8, -41.3)).unwrap();
        assert!(proj.is_south());
        assert_eq!(proj.zone(), 60);
        let p = proj.project(GeoPoint::new(174.8, -41.3)).unwrap();
        assert!(p.northing > 5_000.0 && p.northing < 10_000.0);
    }
}
