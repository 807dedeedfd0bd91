//! Canonical names and unit conversions applied to raw WKT values.

use std::f64::consts::PI;

const DEG_TO_RAD: f64 = PI / 180.0;

/// Convert an angle in degrees to radians.
pub fn d2r(degrees: f64) -> f64 {
    degrees * DEG_TO_RAD
}

/// The outcome of renaming a lower-cased datum code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatumCode {
    pub code: String,
    /// Set when the code was rewritten from `wgs_1984`, the only rename
    /// that can mark a record as lying on the auxiliary sphere.
    pub from_wgs_1984: bool,
}

/// Rename a lower-cased datum code to the short form projection engines
/// expect, e.g. `d_new_zealand_1949` becomes `nzgd49`.
pub fn datum_code(code: &str) -> DatumCode {
    let mut code = code.strip_prefix("d_").unwrap_or(code).to_string();
    if code == "new_zealand_geodetic_datum_1949" || code == "new_zealand_1949" {
        code = "nzgd49".to_string();
    }
    let from_wgs_1984 = code == "wgs_1984";
    if from_wgs_1984 {
        code = "wgs84".to_string();
    }
    if let Some(stripped) = code.strip_suffix("_ferro") {
        code = stripped.to_string();
    }
    if let Some(stripped) = code.strip_suffix("_jakarta") {
        code = stripped.to_string();
    }
    if code.contains("belge") {
        code = "rnb72".to_string();
    }
    DatumCode {
        code,
        from_wgs_1984,
    }
}

/// Abbreviate an ellipsoid name, e.g. `Clarke_1866` becomes `clrk66`.
pub fn ellipsoid_name(name: &str) -> String {
    let name = name
        .replace("_19", "")
        .replace("clarke_18", "clrk")
        .replace("Clarke_18", "clrk");
    match name.get(..13) {
        Some(prefix) if prefix.eq_ignore_ascii_case("international") => "intl".to_string(),
        _ => name,
    }
}

/// Lower-case a unit name, spelling `metre` the way proj does.
pub fn unit_name(name: &str) -> String {
    let name = name.to_lowercase();
    if name == "metre" {
        "meter".to_string()
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn degrees_to_radians() {
        assert_relative_eq!(d2r(180.0), PI);
        assert_relative_eq!(d2r(-75.0), -1.308996938995747, epsilon = 1e-12);
        assert_eq!(d2r(0.0), 0.0);
    }

    #[test]
    fn datum_renames() {
        let cases = [
            ("d_north_american_1983", "north_american_1983"),
            ("new_zealand_geodetic_datum_1949", "nzgd49"),
            ("d_new_zealand_1949", "nzgd49"),
            ("d_wgs_1984", "wgs84"),
            ("monte_mario_ferro", "monte_mario"),
            ("batavia_jakarta", "batavia"),
            ("reseau_national_belge_1972", "rnb72"),
            ("d_belge_1950", "rnb72"),
            ("osgb_1936", "osgb_1936"),
        ];
        for (raw, expected) in cases {
            assert_eq!(datum_code(raw).code, expected, "renaming {}", raw);
        }
    }

    #[test]
    fn wgs_1984_flagged() {
        assert!(datum_code("d_wgs_1984").from_wgs_1984);
        assert!(datum_code("wgs_1984").from_wgs_1984);
        assert!(!datum_code("wgs84").from_wgs_1984);
        assert!(!datum_code("wgs_1972").from_wgs_1984);
    }

    #[test]
    fn datum_rename_is_idempotent() {
        let raw = [
            "d_north_american_1983",
            "new_zealand_1949",
            "wgs_1984",
            "monte_mario_ferro",
            "batavia_jakarta",
            "reseau_national_belge_1972",
            "european_1950",
        ];
        for code in raw {
            let once = datum_code(code).code;
            let twice = datum_code(&once).code;
            assert_eq!(once, twice, "renaming {} twice", code);
        }
    }

    #[test]
    fn ellipsoid_abbreviations() {
        assert_eq!(ellipsoid_name("International_1924"), "intl");
        assert_eq!(ellipsoid_name("international_1967"), "intl");
        assert_eq!(ellipsoid_name("Clarke_1880"), "clrk80");
        assert_eq!(ellipsoid_name("clarke_1866"), "clrk66");
        assert_eq!(ellipsoid_name("GRS_1980"), "GRS80");
        assert_eq!(ellipsoid_name("WGS_1984"), "WGS84");
        assert_eq!(ellipsoid_name("Airy 1830"), "Airy 1830");
        assert_eq!(ellipsoid_name("Intl"), "Intl");
    }

    #[test]
    fn unit_names() {
        assert_eq!(unit_name("Metre"), "meter");
        assert_eq!(unit_name("metre"), "meter");
        assert_eq!(unit_name("US survey foot"), "us survey foot");
        assert_eq!(unit_name("Degree"), "degree");
    }
}
