//! Fault geometry and profile projection.
//!
//! The fault is given by two geographic endpoints. Everything downstream works in
//! one UTM frame (km):
//!
//! - strike: `atan2(dn, de)` of the endpoint difference (counter-clockwise from east)
//! - fault-parallel unit vector `u`, fault-normal unit vector `n = rot90(u)`
//! - profile origin at the fault midpoint, along `u`
//!
//! A station's profile distance is `(p - origin) · u`.

use nalgebra::Vector2;
use tracing::debug;

use crate::domain::{GeoPoint, ObservationSet, PlanarPoint, Station};
use crate::error::{FaultError, FaultResult};
use crate::geo::utm::UtmProjector;
use crate::geo::velocity::project_velocity;

/// Endpoints closer than this (km) are treated as a degenerate fault.
const MIN_FAULT_LENGTH_KM: f64 = 1e-9;

/// Fault segment geometry in a single UTM frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FaultGeometry {
    pub start: GeoPoint,
    pub end: GeoPoint,
    pub start_xy: PlanarPoint,
    pub end_xy: PlanarPoint,
    /// Strike angle (radians), counter-clockwise from the easting axis.
    pub strike: f64,
    /// Unit fault-parallel vector (east, north).
    pub parallel: Vector2<f64>,
    /// Unit fault-normal vector: `parallel` rotated by +90°.
    pub normal: Vector2<f64>,
    pub length_km: f64,
    projector: UtmProjector,
}

impl FaultGeometry {
    /// Build the geometry, choosing the UTM zone from the fault midpoint.
    pub fn new(start: GeoPoint, end: GeoPoint) -> FaultResult<Self> {
        let mid = GeoPoint::new(
            start.lon + crate::geo::utm::wrap_longitude(end.lon - start.lon) / 2.0,
            (start.lat + end.lat) / 2.0,
        );
        let projector = UtmProjector::for_point(mid)?;
        Self::with_projector(start, end, projector)
    }

    /// Build the geometry in an explicit UTM frame.
    pub fn with_projector(start: GeoPoint, end: GeoPoint, projector: UtmProjector) -> FaultResult<Self> {
        let start_xy = projector.project(start)?;
        let end_xy = projector.project(end)?;

        let delta = Vector2::new(end_xy.easting - start_xy.easting, end_xy.northing - start_xy.northing);
        let length_km = delta.norm();
        if !(length_km.is_finite() && length_km > MIN_FAULT_LENGTH_KM) {
            return Err(FaultError::insufficient_data(format!(
                "fault endpoints ({}, {}) and ({}, {}) do not define a segment",
                start.lon, start.lat, end.lon, end.lat
            )));
        }

        let strike = delta.y.atan2(delta.x);
        let parallel = Vector2::new(strike.cos(), strike.sin());
        let normal = Vector2::new(-parallel.y, parallel.x);

        debug!(
            zone = projector.zone(),
            strike_deg = strike.to_degrees(),
            length_km,
            "fault geometry"
        );

        Ok(Self {
            start,
            end,
            start_xy,
            end_xy,
            strike,
            parallel,
            normal,
            length_km,
            projector,
        })
    }

    pub fn projector(&self) -> &UtmProjector {
        &self.projector
    }

    /// The profile running along the fault, centred on its midpoint.
    pub fn profile(&self) -> Profile {
        Profile {
            origin: PlanarPoint {
                easting: (self.start_xy.easting + self.end_xy.easting) / 2.0,
                northing: (self.start_xy.northing + self.end_xy.northing) / 2.0,
            },
            direction: self.parallel,
            half_length_km: self.length_km / 2.0,
        }
    }

    /// Signed offset of a planar point from the fault line, along the normal.
    pub fn normal_offset(&self, p: PlanarPoint) -> f64 {
        let profile = self.profile();
        profile.relative(p).dot(&self.normal)
    }
}

/// A 1D profile: origin, unit direction, half-length (km).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Profile {
    pub origin: PlanarPoint,
    pub direction: Vector2<f64>,
    pub half_length_km: f64,
}

impl Profile {
    fn relative(&self, p: PlanarPoint) -> Vector2<f64> {
        Vector2::new(p.easting - self.origin.easting, p.northing - self.origin.northing)
    }

    /// Signed distance of `p` along the profile from its origin.
    pub fn distance(&self, p: PlanarPoint) -> f64 {
        self.relative(p).dot(&self.direction)
    }
}

/// Project station positions onto the fault profile (km).
pub fn project_distances(geometry: &FaultGeometry, positions: &[GeoPoint]) -> FaultResult<Vec<f64>> {
    let profile = geometry.profile();
    positions
        .iter()
        .map(|&p| Ok(profile.distance(geometry.projector().project(p)?)))
        .collect()
}

/// Build the observation set for a station list.
///
/// Station order is preserved. Any projection or error-propagation failure is
/// reported with the offending station id.
pub fn build_observations(geometry: &FaultGeometry, stations: &[Station]) -> FaultResult<ObservationSet> {
    if stations.is_empty() {
        return Err(FaultError::insufficient_data("no stations to project"));
    }

    let profile = geometry.profile();
    let mut obs = ObservationSet {
        station_ids: Vec::with_capacity(stations.len()),
        distance_km: Vec::with_capacity(stations.len()),
        velocity: Vec::with_capacity(stations.len()),
        sigma: Vec::with_capacity(stations.len()),
    };

    for station in stations {
        let xy = geometry
            .projector()
            .project(station.position())
            .map_err(|e| with_station(e, &station.id))?;
        let (v, sigma) = project_velocity(
            [station.ve, station.vn],
            [station.se, station.sn],
            geometry.parallel,
        )
        .map_err(|e| with_station(e, &station.id))?;

        obs.station_ids.push(station.id.clone());
        obs.distance_km.push(profile.distance(xy));
        obs.velocity.push(v);
        obs.sigma.push(sigma);
    }

    Ok(obs)
}

fn with_station(err: FaultError, id: &str) -> FaultError {
    match err {
        FaultError::Configuration(m) => FaultError::Configuration(format!("station {id}: {m}")),
        FaultError::InsufficientData(m) => FaultError::InsufficientData(format!("station {id}: {m}")),
        FaultError::Domain(m) => FaultError::Domain(format!("station {id}: {m}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station(id: &str, lon: f64, lat: f64) -> Station {
        Station {
            id: id.to_string(),
            lon,
            lat,
            ve: 1.0,
            vn: 2.0,
            se: 0.5,
            sn: 0.5,
            corr: 0.0,
        }
    }

    fn san_andreas_like() -> FaultGeometry {
        FaultGeometry::new(GeoPoint::new(-117.6, 34.0), GeoPoint::new(-116.4, 33.4)).unwrap()
    }

    #[test]
    fn endpoints_project_to_half_length() {
        let g = san_andreas_like();
        let d = project_distances(&g, &[g.start, g.end]).unwrap();
        let half = g.length_km / 2.0;
        assert!((d[0] + half).abs() < 1e-9, "start={}, half={half}", d[0]);
        assert!((d[1] - half).abs() < 1e-9, "end={}, half={half}", d[1]);
    }

    #[test]
    fn unit_vectors_are_orthonormal() {
        let g = san_andreas_like();
        assert!((g.parallel.norm() - 1.0).abs() < 1e-12);
        assert!((g.normal.norm() - 1.0).abs() < 1e-12);
        assert!(g.parallel.dot(&g.normal).abs() < 1e-12);
        // Heading east-southeast: strike in (-90°, 0°).
        assert!(g.strike < 0.0 && g.strike > -std::f64::consts::FRAC_PI_2);
    }

    #[test]
    fn midpoint_projects_to_zero() {
        let g = san_andreas_like();
        let profile = g.profile();
        assert!(profile.distance(profile.origin).abs() < 1e-12);
        assert!(g.normal_offset(profile.origin).abs() < 1e-12);
    }

    #[test]
    fn normal_offset_sign_follows_left_of_strike() {
        // East-pointing fault along the equator: north of it is +normal.
        let g = FaultGeometry::new(GeoPoint::new(2.0, 10.0), GeoPoint::new(4.0, 10.0)).unwrap();
        let north = g.projector().project(GeoPoint::new(3.0, 10.5)).unwrap();
        let south = g.projector().project(GeoPoint::new(3.0, 9.5)).unwrap();
        assert!(g.normal_offset(north) > 0.0);
        assert!(g.normal_offset(south) < 0.0);
    }

    #[test]
    fn degenerate_fault_is_rejected() {
        let p = GeoPoint::new(-117.0, 34.0);
        let err = FaultGeometry::new(p, p).unwrap_err();
        assert!(matches!(err, FaultError::InsufficientData(_)));
    }

    #[test]
    fn observations_preserve_station_order() {
        let g = san_andreas_like();
        let stations = vec![
            station("P001", -117.0, 33.7),
            station("P002", -117.5, 33.9),
            station("P003", -116.5, 33.5),
        ];
        let obs = build_observations(&g, &stations).unwrap();
        assert_eq!(obs.len(), 3);
        assert_eq!(obs.station_ids, vec!["P001", "P002", "P003"]);
        assert_eq!(obs.velocity.len(), obs.sigma.len());
        assert!(obs.distance_km[1] < obs.distance_km[0]);
        assert!(obs.distance_km[0] < obs.distance_km[2]);
    }

    #[test]
    fn out_of_zone_station_names_the_station() {
        let g = san_andreas_like();
        let stations = vec![station("FAR1", -100.0, 34.0)];
        let err = build_observations(&g, &stations).unwrap_err();
        match err {
            FaultError::Domain(m) => assert!(m.contains("FAR1")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_station_list_is_insufficient() {
        let g = san_andreas_like();
        assert!(matches!(
            build_observations(&g, &[]),
            Err(FaultError::InsufficientData(_))
        ));
    }
}
