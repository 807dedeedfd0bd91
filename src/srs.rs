use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::result::Error;

/// Projection name given to records parsed from a bare geographic CRS.
pub const LONGLAT: &str = "longlat";
/// Projection name given to records parsed from a local, non-georeferenced CS.
pub const IDENTITY: &str = "identity";

/// A spatial reference system as described by a WKT definition, ready to be
/// handed to a projection engine.
///
/// Angles are stored in radians and false origin offsets in meters. Values the
/// definition never mentions are left as `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialReference {
    /// Name of the outermost projected CRS
    pub code: String,
    /// Projection method, or [`LONGLAT`] / [`IDENTITY`]
    pub projection_name: String,
    pub datum_code: String,
    pub ellipsoid_name: String,
    pub semi_major_axis: Option<f64>,
    pub inverse_flattening: Option<f64>,
    pub semi_minor_axis: Option<f64>,
    pub latitude_of_origin: Option<f64>,
    pub standard_parallel_1: Option<f64>,
    pub standard_parallel_2: Option<f64>,
    pub longitude_of_center: Option<f64>,
    pub central_meridian: Option<f64>,
    pub azimuth: Option<f64>,
    pub scale_factor: Option<f64>,
    pub false_easting: Option<f64>,
    pub false_northing: Option<f64>,
    pub units: String,
    /// Multiplier from the declared unit to meters. For geographic records
    /// this is the angular unit scaled by the semi-major axis.
    pub unit_to_meter: f64,
    /// WGS 84 on the auxiliary sphere
    pub is_sphere: bool,
    pub is_local: bool,
}

impl Default for SpatialReference {
    fn default() -> Self {
        SpatialReference {
            code: String::new(),
            projection_name: String::new(),
            datum_code: String::new(),
            ellipsoid_name: String::new(),
            semi_major_axis: None,
            inverse_flattening: None,
            semi_minor_axis: None,
            latitude_of_origin: None,
            standard_parallel_1: None,
            standard_parallel_2: None,
            longitude_of_center: None,
            central_meridian: None,
            azimuth: None,
            scale_factor: None,
            false_easting: None,
            false_northing: None,
            units: String::new(),
            unit_to_meter: 1.0,
            is_sphere: false,
            is_local: false,
        }
    }
}

impl SpatialReference {
    /// True for records parsed from a geographic CRS with no projection.
    pub fn is_geographic(&self) -> bool {
        self.projection_name == LONGLAT
    }

    /// Convert a length in the declared unit to meters.
    pub fn to_meter(&self, value: f64) -> f64 {
        self.unit_to_meter * value
    }
}

impl FromStr for SpatialReference {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::wkt::parse(s)
    }
}
