//! Great-circle geodesy on a spherical earth.
//!
//! Positions are converted to unit n-vectors for all computations,
//! which keeps intersections and cross-track queries free of the pole singularities
//! that plague the latitude/longitude formulas.

use std::fmt;

use bevy_math::DVec3;

use crate::{Angle, Heading, Length};


/// Mean earth radius used for all spherical computations.
pub const EARTH_RADIUS: Length = Length::from_nm(3440.065);

/// A position on the earth surface, in degrees.
#[derive(Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct LatLong {
    /// Latitude in degrees, positive northwards.
    pub lat:  f64,
    /// Longitude in degrees, positive eastwards.
    pub long: f64,
}

impl LatLong {
    #[must_use]
    pub const fn new(lat: f64, long: f64) -> Self { Self { lat, long } }

    #[must_use]
    pub fn is_finite(self) -> bool { self.lat.is_finite() && self.long.is_finite() }

    fn to_nvector(self) -> DVec3 {
        let (lat_sin, lat_cos) = self.lat.to_radians().sin_cos();
        let (long_sin, long_cos) = self.long.to_radians().sin_cos();
        DVec3::new(lat_cos * long_cos, lat_cos * long_sin, lat_sin)
    }

    fn from_nvector(v: DVec3) -> Self {
        let lat = v.z.atan2(v.x.hypot(v.y));
        let long = v.y.atan2(v.x);
        Self { lat: lat.to_degrees(), long: long.to_degrees() }
    }

    /// Unit vector tangent to the surface at `self`, pointing along `bearing`.
    fn direction(self, bearing: Heading) -> DVec3 {
        let (lat_sin, lat_cos) = self.lat.to_radians().sin_cos();
        let (long_sin, long_cos) = self.long.to_radians().sin_cos();
        let east = DVec3::new(-long_sin, long_cos, 0.);
        let north = DVec3::new(-lat_sin * long_cos, -lat_sin * long_sin, lat_cos);
        let bearing = bearing.radians();
        north * bearing.cos() + east * bearing.sin()
    }

    /// Great-circle distance to `other`.
    #[must_use]
    pub fn distance_to(self, other: LatLong) -> Length {
        let (a, b) = (self.to_nvector(), other.to_nvector());
        EARTH_RADIUS * a.cross(b).length().atan2(a.dot(b))
    }

    /// Initial great-circle bearing from `self` towards `other`.
    ///
    /// The result is unspecified if the two positions coincide.
    #[must_use]
    pub fn bearing_to(self, other: LatLong) -> Heading {
        let (lat1, lat2) = (self.lat.to_radians(), other.lat.to_radians());
        let delta_long = (other.long - self.long).to_radians();
        let y = delta_long.sin() * lat2.cos();
        let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * delta_long.cos();
        Heading::from_radians(Angle::atan2(y, x))
    }

    /// Great-circle bearing with which a path from `self` arrives at `other`.
    #[must_use]
    pub fn final_bearing_to(self, other: LatLong) -> Heading { other.bearing_to(self).opposite() }

    /// Position reached by travelling `distance` along the great circle with initial `bearing`.
    #[must_use]
    pub fn destination(self, bearing: Heading, distance: Length) -> LatLong {
        let delta = distance / EARTH_RADIUS;
        let a = self.to_nvector();
        let d = self.direction(bearing);
        Self::from_nvector(a * delta.cos() + d * delta.sin())
    }

    /// Signed distance of `self` from the great circle through `path_start` with `path_course`.
    ///
    /// Positive when `self` lies to the right of the path.
    #[must_use]
    pub fn cross_track_distance(self, path_start: LatLong, path_course: Heading) -> Length {
        let normal = path_start.direction(path_course).cross(path_start.to_nvector());
        EARTH_RADIUS * normal.dot(self.to_nvector()).clamp(-1., 1.).asin()
    }

    /// Signed distance from `path_start` to the projection of `self`
    /// onto the great circle through `path_start` with `path_course`.
    ///
    /// Positive when the projection is ahead of `path_start`.
    #[must_use]
    pub fn along_track_distance(self, path_start: LatLong, path_course: Heading) -> Length {
        let a = path_start.to_nvector();
        let d = path_start.direction(path_course);
        let normal = d.cross(a);
        let p = self.to_nvector();
        let projected = p - normal * normal.dot(p);
        EARTH_RADIUS * d.dot(projected).atan2(a.dot(projected))
    }

    /// Intersection of the great circles through `(self, course)` and `(other, other_course)`.
    ///
    /// Of the two antipodal intersections, returns the one ahead of `self`.
    /// Returns `None` if the two great circles coincide.
    #[must_use]
    pub fn intersection(
        self,
        course: Heading,
        other: LatLong,
        other_course: Heading,
    ) -> Option<LatLong> {
        let (a1, a2) = (self.to_nvector(), other.to_nvector());
        let normal1 = a1.cross(self.direction(course));
        let normal2 = a2.cross(other.direction(other_course));
        let candidate = normal1.cross(normal2);
        if candidate.length() < 1e-12 {
            return None;
        }
        let candidate = candidate.normalize();

        let ahead = if self.direction(course).dot(candidate) >= 0. { candidate } else { -candidate };
        Some(Self::from_nvector(ahead))
    }
}

impl fmt::Debug for LatLong {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LatLong").field("lat", &self.lat).field("long", &self.long).finish()
    }
}
