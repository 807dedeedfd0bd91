//! Parse Well-Known-Text spatial reference system definitions into a
//! [`SpatialReference`] that a projection engine can consume.
//!
//! ```
//! let srs: wkt_srs::SpatialReference = r#"PROJCS["NAD83 / UTM",GEOGCS["NAD83",DATUM["D_North_American_1983",SPHEROID["GRS_1980",6378137,298.257222101]]],PROJECTION["Transverse_Mercator"],PARAMETER["central_meridian",-75],PARAMETER["false_easting",500000],UNIT["metre",1]]"#
//!     .parse()
//!     .unwrap();
//! assert_eq!(srs.datum_code, "north_american_1983");
//! assert_eq!(srs.units, "meter");
//! ```
#[cfg(feature = "gpkg")]
pub mod gpkg;
pub mod normalize;
mod result;
pub mod srs;
pub mod wkt;

pub use crate::result::{Error, Result};
pub use crate::srs::{SpatialReference, IDENTITY, LONGLAT};
pub use crate::wkt::parse;
