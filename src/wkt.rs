//! Parsing of WKT spatial reference definitions such as
//! `PROJCS["NAD83 / UTM",GEOGCS[...],PROJECTION[...],PARAMETER[...],UNIT[...]]`.
//!
//! The definition is walked depth first. Every bracketed section is handed to
//! the extractor for its path of enclosing keywords, and each extractor writes
//! straight into the [`SpatialReference`] being built. The first malformed or
//! unsupported section aborts the parse.

use tracing::{debug, trace};

use crate::normalize::{self, d2r};
use crate::result::{Error, Result};
use crate::srs::{SpatialReference, IDENTITY, LONGLAT};

const MERCATOR_AUXILIARY_SPHERE: &str = "Mercator_Auxiliary_Sphere";

/// The section keywords this grammar knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Keyword {
    ProjCs,
    GeogCs,
    LocalCs,
    Datum,
    Spheroid,
    PrimeM,
    Projection,
    Parameter,
    Unit,
}

impl Keyword {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "PROJCS" => Some(Keyword::ProjCs),
            "GEOGCS" => Some(Keyword::GeogCs),
            "LOCAL_CS" => Some(Keyword::LocalCs),
            "DATUM" => Some(Keyword::Datum),
            "SPHEROID" => Some(Keyword::Spheroid),
            "PRIMEM" => Some(Keyword::PrimeM),
            "PROJECTION" => Some(Keyword::Projection),
            "PARAMETER" => Some(Keyword::Parameter),
            "UNIT" => Some(Keyword::Unit),
            _ => None,
        }
    }
}

fn keyword_at(path: &[&str], index: usize) -> Option<Keyword> {
    path.get(index).copied().and_then(Keyword::from_name)
}

fn last_keyword(path: &[&str]) -> Option<Keyword> {
    path.last().copied().and_then(Keyword::from_name)
}

/// Parse a WKT spatial reference definition.
///
/// # Examples
/// ```
/// let srs = wkt_srs::parse(
///     r#"GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS_1984",6378137,298.257223563]]]"#,
/// )
/// .unwrap();
/// assert_eq!(srs.projection_name, "longlat");
/// assert_eq!(srs.datum_code, "wgs84");
/// ```
pub fn parse(wkt: &str) -> Result<SpatialReference> {
    let sections = find_sections(wkt)?;
    // one PROJCS, GEOGCS or LOCAL_CS per definition
    if sections.len() != 1 {
        return Err(Error::StructuralError(wkt.to_string()));
    }
    let mut srs = SpatialReference::default();
    parse_children(&mut srs, &[], wkt, &sections)?;
    debug!(
        "Parsed WKT spatial reference '{}' ({}, datum {})",
        srs.code, srs.projection_name, srs.datum_code
    );
    Ok(srs)
}

/// Find the outermost bracketed sections of `data`, returning the byte
/// offsets of each opening bracket and its matching closing bracket.
pub fn find_sections(data: &str) -> Result<Vec<(usize, usize)>> {
    let mut sections = Vec::new();
    let mut open = 0;
    let mut nest = 0usize;
    for (i, b) in data.bytes().enumerate() {
        match b {
            b'[' => {
                if nest == 0 {
                    open = i;
                }
                nest += 1;
            }
            b']' => {
                nest = nest
                    .checked_sub(1)
                    .ok_or_else(|| Error::StructuralError(data.to_string()))?;
                if nest == 0 {
                    sections.push((open, i));
                }
            }
            _ => {}
        }
    }
    if nest != 0 {
        return Err(Error::StructuralError(data.to_string()));
    }
    Ok(sections)
}

// Parse every child section of `data`, which sits inside the sections named by `path`.
fn parse_section<'a>(srs: &mut SpatialReference, path: &[&'a str], data: &'a str) -> Result<()> {
    let sections = find_sections(data)?;
    parse_children(srs, path, data, &sections)
}

fn parse_children<'a>(
    srs: &mut SpatialReference,
    path: &[&'a str],
    data: &'a str,
    sections: &[(usize, usize)],
) -> Result<()> {
    let mut start = 0;
    for &(open, close) in sections {
        let name = section_name(&data[start..open]);
        let mut child_path = path.to_vec();
        child_path.push(name);
        // no keyword nests inside itself, which also bounds the recursion depth
        if path.contains(&name) {
            return Err(Error::unknown_section(&child_path));
        }
        trace!("Parsing WKT section {}", child_path.join("/"));
        dispatch(srs, &child_path, &data[open + 1..close])?;
        start = close + 1;
    }
    Ok(())
}

/// The keyword in front of a bracket is the last comma separated token
/// between the previous section and the bracket.
fn section_name(prefix: &str) -> &str {
    let name = prefix.trim_matches(|c: char| c == ',' || c.is_whitespace());
    match name.rfind(',') {
        Some(comma) => name[comma + 1..].trim(),
        None => name,
    }
}

fn dispatch(srs: &mut SpatialReference, path: &[&str], data: &str) -> Result<()> {
    match keyword_at(path, 0) {
        Some(Keyword::ProjCs) => parse_projcs(srs, path, data),
        Some(Keyword::GeogCs) => {
            // only reached when there is no PROJCS around it
            srs.projection_name = LONGLAT.to_string();
            parse_geogcs(srs, path, data)
        }
        Some(Keyword::LocalCs) => {
            srs.projection_name = IDENTITY.to_string();
            srs.is_local = true;
            Ok(())
        }
        _ => Err(Error::unknown_section(path)),
    }
}

fn split_name(data: &str) -> (&str, &str) {
    data.split_once(',').unwrap_or((data, ""))
}

fn unquote(value: &str) -> &str {
    value.trim().trim_matches('"')
}

fn parse_number(field: &str, value: &str) -> Result<f64> {
    let value = value.trim();
    let error = |source| Error::FieldParseError {
        field: field.to_string(),
        value: value.to_string(),
        source,
    };
    let number: f64 = value.parse().map_err(|e| error(Some(e)))?;
    if !number.is_finite() {
        return Err(error(None));
    }
    Ok(number)
}

fn parse_projcs<'a>(srs: &mut SpatialReference, path: &[&'a str], data: &'a str) -> Result<()> {
    if path.len() == 1 {
        let (name, data) = split_name(data);
        srs.code = unquote(name).to_string();
        return parse_section(srs, path, data);
    }
    match keyword_at(path, 1) {
        Some(Keyword::GeogCs) => parse_geogcs(srs, path, data),
        Some(Keyword::PrimeM) => parse_primem(data),
        Some(Keyword::Projection) => {
            parse_projection(srs, data);
            Ok(())
        }
        Some(Keyword::Parameter) => parse_parameter(srs, data),
        Some(Keyword::Unit) => parse_unit(srs, data),
        _ => Err(Error::unknown_section(path)),
    }
}

fn parse_geogcs<'a>(srs: &mut SpatialReference, path: &[&'a str], data: &'a str) -> Result<()> {
    if last_keyword(path) == Some(Keyword::GeogCs) {
        let (name, data) = split_name(data);
        // stands in for the datum name in case there is no DATUM section
        set_datum_code(srs, name);
        parse_section(srs, path, data)
    } else if path
        .iter()
        .any(|name| Keyword::from_name(name) == Some(Keyword::Datum))
    {
        parse_datum(srs, path, data)
    } else {
        Err(Error::unknown_section(path))
    }
}

fn parse_datum<'a>(srs: &mut SpatialReference, path: &[&'a str], data: &'a str) -> Result<()> {
    match last_keyword(path) {
        Some(Keyword::Datum) => {
            let (name, data) = split_name(data);
            set_datum_code(srs, name);
            parse_section(srs, path, data)
        }
        Some(Keyword::Spheroid) => parse_spheroid(srs, data),
        _ => Err(Error::unknown_section(path)),
    }
}

fn set_datum_code(srs: &mut SpatialReference, name: &str) {
    let renamed = normalize::datum_code(&unquote(name).to_lowercase());
    if renamed.from_wgs_1984 && srs.projection_name == MERCATOR_AUXILIARY_SPHERE {
        srs.is_sphere = true;
    }
    srs.datum_code = renamed.code;
}

fn parse_spheroid(srs: &mut SpatialReference, data: &str) -> Result<()> {
    let mut fields = data.split(',');
    srs.ellipsoid_name = normalize::ellipsoid_name(unquote(fields.next().unwrap_or_default()));
    let a = parse_number("semi-major axis", fields.next().unwrap_or_default())?;
    let rf = parse_number("inverse flattening", fields.next().unwrap_or_default())?;
    srs.semi_major_axis = Some(a);
    srs.inverse_flattening = Some(rf);
    if srs.datum_code.contains("osgb_1936") {
        srs.datum_code = "osgb36".to_string();
    }
    if srs.semi_minor_axis.is_none() {
        srs.semi_minor_axis = Some(a);
    }
    Ok(())
}

fn parse_projection(srs: &mut SpatialReference, data: &str) {
    srs.projection_name = unquote(data).to_string();
}

fn parse_parameter(srs: &mut SpatialReference, data: &str) -> Result<()> {
    let mut fields = data.split(',');
    let name = unquote(fields.next().unwrap_or_default()).to_lowercase();
    let value = parse_number(&name, fields.next().unwrap_or_default())?;
    match name.as_str() {
        "standard_parallel_1" => {
            srs.latitude_of_origin = Some(d2r(value));
            srs.standard_parallel_1 = Some(d2r(value));
        }
        "standard_parallel_2" => srs.standard_parallel_2 = Some(d2r(value)),
        "false_easting" => srs.false_easting = Some(srs.to_meter(value)),
        "false_northing" => srs.false_northing = Some(srs.to_meter(value)),
        "latitude_of_origin" | "central_parallel" | "latitude_of_center" => {
            srs.latitude_of_origin = Some(d2r(value))
        }
        "scale_factor" => srs.scale_factor = Some(value),
        "longitude_of_center" => srs.longitude_of_center = Some(d2r(value)),
        "central_meridian" => srs.central_meridian = Some(d2r(value)),
        "azimuth" => srs.azimuth = Some(d2r(value)),
        "auxiliary_sphere_type" => {}
        _ => return Err(Error::UnknownParameterError(name)),
    }
    Ok(())
}

fn parse_primem(data: &str) -> Result<()> {
    let name = unquote(data.split(',').next().unwrap_or_default()).to_lowercase();
    if name != "greenwich" {
        return Err(Error::UnsupportedValueError {
            field: "prime meridian",
            value: name,
        });
    }
    Ok(())
}

fn parse_unit(srs: &mut SpatialReference, data: &str) -> Result<()> {
    let mut fields = data.split(',');
    srs.units = normalize::unit_name(unquote(fields.next().unwrap_or_default()));
    if let Some(factor) = fields.next() {
        let factor = parse_number("unit conversion factor", factor)?;
        srs.unit_to_meter = match srs.semi_major_axis {
            Some(a) if srs.is_geographic() => factor * a,
            _ => factor,
        };
    }
    Ok(())
}
