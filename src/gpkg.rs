//! Spatial reference systems stored in a GeoPackage.
//!
//! Every GeoPackage keeps its CRS definitions as WKT in the
//! [gpkg_spatial_ref_sys](https://www.geopackage.org/spec130/#gpkg_spatial_ref_sys_cols)
//! table. This module reads rows from that table and parses their definitions.

use rusqlite::{params, Connection, DatabaseName, OpenFlags, OptionalExtension};
use std::path::Path;
use tracing::debug;

use crate::result::{Error, Result};
use crate::srs::SpatialReference;

const APPLICATION_ID: u32 = 0x47504B47;
const USER_VERSION: u32 = 10300;

const CREATE_SPATIAL_REF_SYS_TABLE: &str = "CREATE TABLE gpkg_spatial_ref_sys (
        srs_name TEXT NOT NULL,
        srs_id INTEGER NOT NULL PRIMARY KEY,
        organization TEXT NOT NULL,
        organization_coordsys_id INTEGER NOT NULL,
        definition TEXT NOT NULL,
        description TEXT
    )";

/// Represents a spatial reference system as it appears in the GeoPackage [specification](https://www.geopackage.org/spec130/#gpkg_spatial_ref_sys_cols)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpatialRefSys {
    pub name: String,
    pub id: i64,
    pub organization: String,
    pub organization_coordsys_id: i64,
    /// WKT definition of the system
    pub definition: String,
    pub description: Option<String>,
}

impl SpatialRefSys {
    /// Parse the WKT definition of this system.
    ///
    /// EPSG style definitions with `PRIMEM`, `UNIT` or `AUTHORITY` sections
    /// inside `GEOGCS`, such as [`defaults::WGS84_DEFINITION`], are rejected
    /// with [`Error::UnknownSectionError`].
    pub fn spatial_reference(&self) -> Result<SpatialReference> {
        crate::wkt::parse(&self.definition)
    }
}

pub mod defaults {
    use super::SpatialRefSys;

    pub const WGS84_DEFINITION: &str = "GEOGCS[\"WGS 84\",DATUM[\"WGS_1984\",SPHEROID[\"WGS 84\",6378137,298.257223563,AUTHORITY[\"EPSG\",\"7030\"]],AUTHORITY[\"EPSG\",\"6326\"]],PRIMEM[\"Greenwich\",0,AUTHORITY[\"EPSG\",\"8901\"]],UNIT[\"degree\",0.0174532925199433,AUTHORITY[\"EPSG\",\"9122\"]],AUTHORITY[\"EPSG\",\"4326\"]]";

    /// The rows every GeoPackage must contain: WGS 84 and the undefined
    /// cartesian and geographic systems.
    pub fn required() -> [SpatialRefSys; 3] {
        [
            SpatialRefSys {
                name: "WGS 84 geodetic".to_string(),
                id: 4326,
                organization: "EPSG".to_string(),
                organization_coordsys_id: 4326,
                definition: WGS84_DEFINITION.to_string(),
                description: Some(
                    "longitude/latitude coordinates in decimal degrees on the WGS 84 spheroid"
                        .to_string(),
                ),
            },
            SpatialRefSys {
                name: "undefined cartesian SRS".to_string(),
                id: -1,
                organization: "NONE".to_string(),
                organization_coordsys_id: -1,
                definition: "undefined".to_string(),
                description: Some("undefined cartesian coordinate reference system".to_string()),
            },
            SpatialRefSys {
                name: "undefined geographic SRS".to_string(),
                id: 0,
                organization: "NONE".to_string(),
                organization_coordsys_id: 0,
                definition: "undefined".to_string(),
                description: Some("undefined geographic coordinate reference system".to_string()),
            },
        ]
    }
}

/// A GeoPackage opened for its spatial reference systems.
pub struct GeoPackage {
    /// The underlying rusqlite connection for the GeoPackage
    pub conn: Connection,
}

impl GeoPackage {
    /// Creates an empty geopackage holding a `gpkg_spatial_ref_sys` table
    /// with the required default rows.
    ///
    /// # Examples
    /// ```ignore
    /// # use std::path::Path;
    /// let path = Path::new("./test.gpkg");
    /// let gp = GeoPackage::create(path).unwrap();
    /// ```
    pub fn create<P: AsRef<Path>>(path: P) -> Result<GeoPackage> {
        let conn = Connection::open(path)?;
        let gpkg = GeoPackage { conn };
        gpkg.conn
            .pragma_update(Some(DatabaseName::Main), "application_id", APPLICATION_ID)?;
        gpkg.conn
            .pragma_update(Some(DatabaseName::Main), "user_version", USER_VERSION)?;
        gpkg.conn.execute(CREATE_SPATIAL_REF_SYS_TABLE, [])?;
        for srs in defaults::required() {
            gpkg.new_srs(&srs)?;
        }
        Ok(gpkg)
    }

    /// Open a geopackage, checking the application id and the integrity of the file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<GeoPackage> {
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_WRITE)?;
        let application_id: u32 =
            conn.query_row("SELECT * FROM pragma_application_id()", [], |row| {
                row.get(0)
            })?;
        if application_id != APPLICATION_ID {
            debug!("Unexpected GeoPackage application id {:#x}", application_id);
            return Err(Error::ValidationError);
        }
        let integrity_check: String =
            conn.query_row("SELECT * FROM pragma_integrity_check()", [], |row| {
                row.get(0)
            })?;
        if integrity_check != "ok" {
            debug!("GeoPackage integrity check failed: {}", integrity_check);
            return Err(Error::ValidationError);
        }
        Ok(GeoPackage { conn })
    }

    pub fn new_srs(&self, srs: &SpatialRefSys) -> Result<()> {
        const STMT: &str = "INSERT INTO gpkg_spatial_ref_sys VALUES (?1, ?2, ?3, ?4, ?5, ?6)";
        self.conn.execute(
            STMT,
            params![
                srs.name,
                srs.id,
                srs.organization,
                srs.organization_coordsys_id,
                srs.definition,
                srs.description,
            ],
        )?;
        Ok(())
    }

    /// Fetch the `gpkg_spatial_ref_sys` row with the given id.
    pub fn srs(&self, srs_id: i64) -> Result<SpatialRefSys> {
        const STMT: &str = "SELECT srs_name, srs_id, organization, organization_coordsys_id, definition, description
            FROM gpkg_spatial_ref_sys WHERE srs_id = ?1";
        self.conn
            .query_row(STMT, [srs_id], |row| {
                Ok(SpatialRefSys {
                    name: row.get(0)?,
                    id: row.get(1)?,
                    organization: row.get(2)?,
                    organization_coordsys_id: row.get(3)?,
                    definition: row.get(4)?,
                    description: row.get(5)?,
                })
            })
            .optional()?
            .ok_or(Error::UnknownSrsError(srs_id))
    }

    /// Fetch the system with the given id and parse its WKT definition.
    pub fn spatial_reference(&self, srs_id: i64) -> Result<SpatialReference> {
        self.srs(srs_id)?.spatial_reference()
    }

    /// Close the geopackage
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| Error::SQLiteError(e))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use tempfile::tempdir;

    use super::*;

    const NAD83_UTM_18N: &str = r#"PROJCS["NAD83 / UTM zone 18N",GEOGCS["NAD83",DATUM["D_North_American_1983",SPHEROID["GRS_1980",6378137,298.257222101]]],PROJECTION["Transverse_Mercator"],PARAMETER["latitude_of_origin",0],PARAMETER["central_meridian",-75],PARAMETER["scale_factor",0.9996],PARAMETER["false_easting",500000],PARAMETER["false_northing",0],UNIT["metre",1]]"#;

    fn utm_18n() -> SpatialRefSys {
        SpatialRefSys {
            name: "NAD83 / UTM zone 18N".to_string(),
            id: 26918,
            organization: "EPSG".to_string(),
            organization_coordsys_id: 26918,
            definition: NAD83_UTM_18N.to_string(),
            description: None,
        }
    }

    #[test]
    fn create_and_reopen() {
        let dir = tempdir().unwrap();
        let filename = dir.path().join("create.gpkg");

        let gp = GeoPackage::create(&filename).unwrap();
        gp.new_srs(&utm_18n()).unwrap();
        gp.close().unwrap();

        let gp = GeoPackage::open(&filename).unwrap();
        assert_eq!(gp.srs(26918).unwrap(), utm_18n());
        assert_eq!(gp.srs(4326).unwrap().organization, "EPSG");
        gp.close().unwrap();
    }

    #[test]
    fn parse_stored_definition() {
        let dir = tempdir().unwrap();
        let gp = GeoPackage::create(dir.path().join("parse.gpkg")).unwrap();
        gp.new_srs(&utm_18n()).unwrap();

        let srs = gp.spatial_reference(26918).unwrap();
        assert_eq!(srs.code, "NAD83 / UTM zone 18N");
        assert_eq!(srs.datum_code, "north_american_1983");
        assert_eq!(srs.projection_name, "Transverse_Mercator");
        assert_abs_diff_eq!(srs.central_meridian.unwrap(), -1.3090, epsilon = 1e-4);
        assert_eq!(srs.false_easting, Some(500000.0));
    }

    #[test]
    fn missing_srs() {
        let dir = tempdir().unwrap();
        let gp = GeoPackage::create(dir.path().join("missing.gpkg")).unwrap();
        assert!(matches!(gp.srs(3857), Err(Error::UnknownSrsError(3857))));
        assert!(matches!(
            gp.spatial_reference(3857),
            Err(Error::UnknownSrsError(3857))
        ));
    }

    #[test]
    fn required_rows_are_not_parseable() {
        let dir = tempdir().unwrap();
        let gp = GeoPackage::create(dir.path().join("defaults.gpkg")).unwrap();
        // EPSG style definitions carry AUTHORITY blocks
        assert!(matches!(
            gp.spatial_reference(4326),
            Err(Error::UnknownSectionError { .. })
        ));
        assert!(matches!(
            gp.spatial_reference(-1),
            Err(Error::StructuralError(_))
        ));
        assert!(matches!(
            gp.spatial_reference(0),
            Err(Error::StructuralError(_))
        ));
    }

    #[test]
    fn open_rejects_other_databases() {
        let dir = tempdir().unwrap();
        let filename = dir.path().join("plain.sqlite");
        let conn = Connection::open(&filename).unwrap();
        conn.execute("CREATE TABLE t (x INTEGER)", []).unwrap();
        conn.close().unwrap();

        assert!(matches!(
            GeoPackage::open(&filename),
            Err(Error::ValidationError)
        ));
    }
}
