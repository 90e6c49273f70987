//! # STL Export
//!
//! Binary and ASCII STL writers for assembled meshes, plus a reader that
//! returns the triangle soup of either flavour.
//!
//! ## Binary Layout
//!
//! ```text
//! UINT8[80]     header
//! UINT32        triangle count
//! per triangle  REAL32[3] normal, REAL32[3] × 3 vertices, UINT16 attribute
//! ```
//!
//! Facet normals are computed from winding, so they agree with the mesh's
//! outward orientation. Binary files store f32; ASCII files keep the full
//! f64 value.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use config::constants::{EPSILON_TOLERANCE, STL_HEADER_SIZE, STL_SOLID_NAME, STL_TRIANGLE_RECORD_SIZE};
use glam::DVec3;

use crate::error::{TerrainError, TerrainResult};
use crate::mesh::Mesh;

/// STL flavour to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StlFormat {
    /// Compact little-endian f32 records.
    #[default]
    Binary,
    /// Human-readable `solid … endsolid` text.
    Ascii,
}

// =============================================================================
// WRITING
// =============================================================================

/// Writes `mesh` to `writer` in the given format.
///
/// # Errors
///
/// Returns [`TerrainError::Io`] if writing fails and [`TerrainError::Stl`] if
/// the mesh has more triangles than a binary STL can count.
///
/// # Example
///
/// ```rust
/// use terrain_mesh::{build_solid, stl::{read_stl, write_stl, StlFormat}};
/// use config::constants::TerrainConfig;
///
/// let mesh = build_solid(vec![vec![0.0; 2]; 2], &TerrainConfig::default()).unwrap();
/// let mut bytes = Vec::new();
/// write_stl(&mesh, &mut bytes, StlFormat::Binary).unwrap();
/// assert_eq!(bytes.len(), 84 + 12 * 50);
/// assert_eq!(read_stl(bytes.as_slice()).unwrap().len(), 12);
/// ```
pub fn write_stl<W: Write>(mesh: &Mesh, writer: W, format: StlFormat) -> TerrainResult<()> {
    match format {
        StlFormat::Binary => write_binary(mesh, writer),
        StlFormat::Ascii => write_ascii(mesh, writer),
    }
}

/// Writes `mesh` to a file.
///
/// # Errors
///
/// Same as [`write_stl`], plus failures creating the file.
pub fn save_stl<P: AsRef<Path>>(mesh: &Mesh, path: P, format: StlFormat) -> TerrainResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_stl(mesh, &mut writer, format)?;
    writer.flush()?;
    Ok(())
}

/// Unit facet normal, or zero for a degenerate triangle.
fn facet_normal(mesh: &Mesh, index: usize) -> DVec3 {
    let normal = mesh.face_normal(index);
    let length = normal.length();
    if length > EPSILON_TOLERANCE {
        normal / length
    } else {
        DVec3::ZERO
    }
}

fn write_binary<W: Write>(mesh: &Mesh, mut writer: W) -> TerrainResult<()> {
    let count = u32::try_from(mesh.triangle_count())
        .map_err(|_| TerrainError::stl(format!("{} triangles exceed the binary STL limit", mesh.triangle_count())))?;

    let mut header = [b' '; STL_HEADER_SIZE];
    let text = format!("binary STL {STL_SOLID_NAME}");
    header[..text.len()].copy_from_slice(text.as_bytes());
    writer.write_all(&header)?;
    writer.write_all(&count.to_le_bytes())?;

    let mut record = [0u8; STL_TRIANGLE_RECORD_SIZE];
    for index in 0..mesh.triangle_count() {
        let [v0, v1, v2] = mesh.triangle_positions(index);
        for (slot, point) in [facet_normal(mesh, index), v0, v1, v2].iter().enumerate() {
            let offset = slot * 12;
            record[offset..offset + 4].copy_from_slice(&(point.x as f32).to_le_bytes());
            record[offset + 4..offset + 8].copy_from_slice(&(point.y as f32).to_le_bytes());
            record[offset + 8..offset + 12].copy_from_slice(&(point.z as f32).to_le_bytes());
        }
        // Attribute byte count stays zero
        writer.write_all(&record)?;
    }
    Ok(())
}

fn write_ascii<W: Write>(mesh: &Mesh, mut writer: W) -> TerrainResult<()> {
    writeln!(writer, "solid {STL_SOLID_NAME}")?;
    for index in 0..mesh.triangle_count() {
        let n = facet_normal(mesh, index);
        writeln!(writer, "  facet normal {:e} {:e} {:e}", n.x, n.y, n.z)?;
        writeln!(writer, "    outer loop")?;
        for v in mesh.triangle_positions(index) {
            writeln!(writer, "      vertex {:e} {:e} {:e}", v.x, v.y, v.z)?;
        }
        writeln!(writer, "    endloop")?;
        writeln!(writer, "  endfacet")?;
    }
    writeln!(writer, "endsolid {STL_SOLID_NAME}")?;
    Ok(())
}

// =============================================================================
// READING
// =============================================================================

/// Reads an STL stream into a triangle soup, detecting the format.
///
/// A stream whose length matches the binary layout for its declared
/// triangle count is read as binary, even if its header starts with
/// `solid`. Anything else must be ASCII.
///
/// # Errors
///
/// Returns [`TerrainError::Stl`] for malformed content, including ASCII text
/// cut off inside a facet or before `endsolid`, and [`TerrainError::Io`] if
/// reading fails.
pub fn read_stl<R: Read>(mut reader: R) -> TerrainResult<Vec<[DVec3; 3]>> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;

    if is_binary(&bytes) {
        return Ok(read_binary(&bytes));
    }
    let text = String::from_utf8_lossy(&bytes);
    if text.trim_start().starts_with("solid") {
        read_ascii(text.as_bytes())
    } else if bytes.len() >= STL_HEADER_SIZE + 4 {
        Err(TerrainError::stl(format!(
            "binary STL declares {} triangles but holds {} bytes",
            declared_count(&bytes),
            bytes.len()
        )))
    } else {
        Err(TerrainError::stl("stream is too short to be STL"))
    }
}

/// Reads an STL file into a triangle soup.
///
/// # Errors
///
/// Same as [`read_stl`], plus failures opening the file.
pub fn load_stl<P: AsRef<Path>>(path: P) -> TerrainResult<Vec<[DVec3; 3]>> {
    read_stl(BufReader::new(File::open(path)?))
}

fn declared_count(bytes: &[u8]) -> usize {
    let mut count = [0u8; 4];
    count.copy_from_slice(&bytes[STL_HEADER_SIZE..STL_HEADER_SIZE + 4]);
    u32::from_le_bytes(count) as usize
}

fn is_binary(bytes: &[u8]) -> bool {
    bytes.len() >= STL_HEADER_SIZE + 4
        && bytes.len() == STL_HEADER_SIZE + 4 + declared_count(bytes) * STL_TRIANGLE_RECORD_SIZE
}

fn read_binary(bytes: &[u8]) -> Vec<[DVec3; 3]> {
    let read_point = |chunk: &[u8]| {
        let f = |at: usize| {
            let mut raw = [0u8; 4];
            raw.copy_from_slice(&chunk[at..at + 4]);
            f64::from(f32::from_le_bytes(raw))
        };
        DVec3::new(f(0), f(4), f(8))
    };

    bytes[STL_HEADER_SIZE + 4..]
        .chunks_exact(STL_TRIANGLE_RECORD_SIZE)
        .map(|record| {
            // Skip the stored normal
            [
                read_point(&record[12..24]),
                read_point(&record[24..36]),
                read_point(&record[36..48]),
            ]
        })
        .collect()
}

fn read_ascii<R: BufRead>(reader: R) -> TerrainResult<Vec<[DVec3; 3]>> {
    let mut triangles = Vec::new();
    let mut corners: Vec<DVec3> = Vec::with_capacity(3);
    let mut open_facet: Option<usize> = None;
    let mut closed = false;

    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("facet") => {
                if let Some(opened) = open_facet {
                    return Err(TerrainError::stl(format!(
                        "line {}: facet opened on line {opened} is missing endfacet",
                        number + 1
                    )));
                }
                open_facet = Some(number + 1);
                corners.clear();
            }
            Some("vertex") => {
                if open_facet.is_none() {
                    return Err(TerrainError::stl(format!("line {}: vertex outside a facet", number + 1)));
                }
                let mut coordinate = || -> TerrainResult<f64> {
                    let token = tokens
                        .next()
                        .ok_or_else(|| TerrainError::stl(format!("line {}: vertex needs 3 coordinates", number + 1)))?;
                    token
                        .parse::<f64>()
                        .map_err(|_| TerrainError::stl(format!("line {}: invalid coordinate '{token}'", number + 1)))
                };
                let (x, y, z) = (coordinate()?, coordinate()?, coordinate()?);
                corners.push(DVec3::new(x, y, z));
            }
            Some("endfacet") => {
                let [a, b, c] = corners[..] else {
                    return Err(TerrainError::stl(format!(
                        "line {}: facet has {} vertices, expected 3",
                        number + 1,
                        corners.len()
                    )));
                };
                triangles.push([a, b, c]);
                corners.clear();
                open_facet = None;
            }
            Some("endsolid") => {
                if let Some(opened) = open_facet {
                    return Err(TerrainError::stl(format!(
                        "line {}: facet opened on line {opened} is missing endfacet",
                        number + 1
                    )));
                }
                closed = true;
                break;
            }
            _ => {}
        }
    }

    if let Some(opened) = open_facet {
        return Err(TerrainError::stl(format!(
            "stream ends inside the facet opened on line {opened}"
        )));
    }
    if !closed {
        return Err(TerrainError::stl("stream ends without endsolid"));
    }
    Ok(triangles)
}

// =============================================================================
// TESTS
// =============================================================================
