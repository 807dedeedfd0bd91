use std::num::ParseFloatError;

/// The result returned by many methods within the crate
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Malformed WKT section '{0}'")]
    StructuralError(String),
    #[error("Unknown WKT section {}", .path.join("/"))]
    UnknownSectionError { path: Vec<String> },
    #[error("Unsupported {field} '{value}'")]
    UnsupportedValueError { field: &'static str, value: String },
    #[error("Could not parse {field} from '{value}'")]
    FieldParseError {
        field: String,
        value: String,
        #[source]
        source: Option<ParseFloatError>,
    },
    #[error("Unknown projection parameter '{0}'")]
    UnknownParameterError(String),
    #[cfg(feature = "gpkg")]
    #[error("Error when accessing the SQLite database")]
    SQLiteError(#[from] rusqlite::Error),
    #[cfg(feature = "gpkg")]
    #[error("No spatial reference system with id {0}")]
    UnknownSrsError(i64),
    #[cfg(feature = "gpkg")]
    #[error("GeoPackage failed validation check when opening")]
    ValidationError,
}

impl Error {
    pub(crate) fn unknown_section(path: &[&str]) -> Self {
        Error::UnknownSectionError {
            path: path.iter().map(|s| s.to_string()).collect(),
        }
    }
}
