//! STL (Stereolithography) file format support.
//!
//! Supports both ASCII and binary STL formats.
//!
//! # Format Detection
//!
//! The first [`SNIFF_LEN`] bytes are inspected. The file is read as ASCII
//! when that window is pure 7-bit text and mentions both `solid` and
//! `facet` (case-insensitive). Anything else is parsed as binary, which is
//! also how binary files whose free-form header happens to begin with
//! `solid` are handled correctly.
//!
//! # Binary Format
//!
//! ```text
//! UINT8[80]    – Header (ignored, free-form)
//! UINT32       – Number of triangles (little-endian)
//! foreach triangle
//!     REAL32[3] – Normal vector (ignored, recomputed when needed)
//!     REAL32[3] – Vertex 1
//!     REAL32[3] – Vertex 2
//!     REAL32[3] – Vertex 3
//!     UINT16    – Attribute byte count (ignored)
//! end
//! ```
//!
//! # ASCII Format
//!
//! ```text
//! solid name
//!   facet normal ni nj nk
//!     outer loop
//!       vertex v1x v1y v1z
//!       vertex v2x v2y v2z
//!       vertex v3x v3y v3z
//!     endloop
//!   endfacet
//!   ...
//! endsolid name
//! ```
//!
//! A facet is kept only when exactly three `vertex` lines appear between
//! `facet` and `endfacet`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use mesh_types::{Mesh, Point3, Triangle};
use tracing::{debug, info};

use crate::error::{IoError, IoResult};

/// STL binary header size in bytes.
const HEADER_SIZE: usize = 80;

/// Size of the header plus the triangle count.
const PREAMBLE_SIZE: usize = HEADER_SIZE + 4;

/// Size of one triangle in binary STL (normal + 3 vertices + attribute).
const TRIANGLE_SIZE: usize = 50;

/// Number of leading bytes inspected when sniffing for the ASCII variant.
pub const SNIFF_LEN: usize = 512;

/// The two STL encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StlFormat {
    /// Line-oriented text STL.
    Ascii,
    /// Little-endian binary STL.
    Binary,
}

/// Decide which STL variant a byte buffer holds.
///
/// # Example
///
/// ```
/// use mesh_io::{detect_format, StlFormat};
///
/// let text = b"solid cube\n  facet normal 0 0 1\n";
/// assert_eq!(detect_format(text), StlFormat::Ascii);
///
/// let binary = [0u8; 84];
/// assert_eq!(detect_format(&binary), StlFormat::Binary);
/// ```
#[must_use]
pub fn detect_format(bytes: &[u8]) -> StlFormat {
    let window = &bytes[..bytes.len().min(SNIFF_LEN)];
    if !window.is_ascii() {
        return StlFormat::Binary;
    }

    let lowered = window.to_ascii_lowercase();
    if contains_token(&lowered, b"solid") && contains_token(&lowered, b"facet") {
        StlFormat::Ascii
    } else {
        StlFormat::Binary
    }
}

fn contains_token(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

/// Load a mesh from an STL file.
///
/// Automatically detects ASCII vs binary format.
///
/// # Errors
///
/// Returns an error if:
/// - The file cannot be read ([`IoError::FileNotFound`], [`IoError::Io`])
/// - The content is neither STL variant, or a coordinate is not finite
///   ([`IoError::Format`])
/// - A binary file declares more triangles than it holds ([`IoError::Truncated`])
///
/// # Example
///
/// ```no_run
/// use mesh_io::load_stl;
///
/// let mesh = load_stl("model.stl").unwrap();
/// println!("Loaded {} triangles", mesh.triangle_count());
/// ```
pub fn load_stl<P: AsRef<Path>>(path: P) -> IoResult<Mesh> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IoError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IoError::Io(e)
        }
    })?;

    let mesh = parse_stl(&bytes)?;
    info!(
        path = %path.display(),
        triangles = mesh.triangle_count(),
        "Loaded STL"
    );
    Ok(mesh)
}

/// Parse an in-memory STL buffer.
///
/// # Errors
///
/// Same as [`load_stl`], minus the filesystem failures.
pub fn parse_stl(bytes: &[u8]) -> IoResult<Mesh> {
    let format = detect_format(bytes);
    debug!(?format, size = bytes.len(), "Detected STL variant");

    match format {
        StlFormat::Ascii => parse_ascii(bytes),
        StlFormat::Binary => parse_binary(bytes),
    }
}

/// Parse a binary STL buffer.
fn parse_binary(bytes: &[u8]) -> IoResult<Mesh> {
    if bytes.len() < PREAMBLE_SIZE {
        return Err(IoError::format(format!(
            "{} bytes is too small for a binary STL and the content is not ASCII STL",
            bytes.len()
        )));
    }

    // Face count is stored after the 80-byte header
    let face_count = u32::from_le_bytes([
        bytes[HEADER_SIZE],
        bytes[HEADER_SIZE + 1],
        bytes[HEADER_SIZE + 2],
        bytes[HEADER_SIZE + 3],
    ]);

    let body = &bytes[PREAMBLE_SIZE..];
    let available = (body.len() / TRIANGLE_SIZE) as u64;
    if u64::from(face_count) > available {
        // Plain text without STL markers lands here with a count decoded
        // from characters, not a cut-off binary file.
        if bytes[..bytes.len().min(SNIFF_LEN)].is_ascii() {
            return Err(IoError::format(format!(
                "text content without solid/facet markers (header count {face_count}, {} body bytes)",
                body.len()
            )));
        }
        return Err(IoError::Truncated {
            expected: face_count,
            available,
        });
    }

    let triangles = body
        .chunks_exact(TRIANGLE_SIZE)
        .take(face_count as usize)
        .enumerate()
        .map(|(index, record)| {
            // Skip normal (12 bytes), read 3 vertices (36 bytes total)
            Ok(Triangle::new(
                read_vertex(&record[12..24], index)?,
                read_vertex(&record[24..36], index)?,
                read_vertex(&record[36..48], index)?,
            ))
        })
        .collect::<IoResult<Vec<_>>>()?;

    Ok(Mesh::new(triangles))
}

/// Read a vertex from 12 bytes (3 f32s).
fn read_vertex(buf: &[u8], triangle: usize) -> IoResult<Point3<f64>> {
    let x = f32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
    let y = f32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]);
    let z = f32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]);
    if !(x.is_finite() && y.is_finite() && z.is_finite()) {
        return Err(IoError::format(format!(
            "triangle {triangle}: non-finite vertex ({x}, {y}, {z})"
        )));
    }
    Ok(Point3::new(f64::from(x), f64::from(y), f64::from(z)))
}

/// Parse an ASCII STL buffer.
fn parse_ascii(bytes: &[u8]) -> IoResult<Mesh> {
    let text = String::from_utf8_lossy(bytes);
    let mut triangles = Vec::new();
    let mut vertices_in_face: Vec<Point3<f64>> = Vec::with_capacity(3);
    let mut skipped = 0usize;

    for (line_no, line) in text.lines().enumerate() {
        let mut parts = line.split_whitespace();
        let Some(keyword) = parts.next() else {
            continue;
        };

        if keyword.eq_ignore_ascii_case("facet") {
            // Normal follows but is never trusted
            vertices_in_face.clear();
        } else if keyword.eq_ignore_ascii_case("vertex") {
            vertices_in_face.push(parse_vertex(parts, line_no + 1)?);
        } else if keyword.eq_ignore_ascii_case("endfacet") {
            if let [v0, v1, v2] = vertices_in_face[..] {
                triangles.push(Triangle::new(v0, v1, v2));
            } else {
                skipped += 1;
            }
            vertices_in_face.clear();
        }
    }

    if skipped > 0 {
        debug!(skipped, "Skipped ASCII facets without exactly three vertices");
    }

    Ok(Mesh::new(triangles))
}

fn parse_vertex<'a>(mut parts: impl Iterator<Item = &'a str>, line: usize) -> IoResult<Point3<f64>> {
    let mut coords = [0.0f64; 3];
    for coord in &mut coords {
        let token = parts
            .next()
            .ok_or_else(|| IoError::format(format!("line {line}: vertex needs 3 coordinates")))?;
        *coord = token
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| {
                IoError::format(format!("line {line}: invalid vertex coordinate {token:?}"))
            })?;
    }
    Ok(Point3::new(coords[0], coords[1], coords[2]))
}

/// Save a mesh to an STL file.
///
/// # Arguments
///
/// * `mesh` - The mesh to save
/// * `path` - Output file path
/// * `binary` - If true, save as binary STL; if false, save as ASCII
///
/// # Errors
///
/// Returns an error if the file cannot be written.
///
/// # Example
///
/// ```no_run
/// use mesh_io::save_stl;
/// use mesh_types::unit_cube;
///
/// save_stl(&unit_cube(), "cube.stl", true).unwrap();
/// ```
pub fn save_stl<P: AsRef<Path>>(mesh: &Mesh, path: P, binary: bool) -> IoResult<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_stl(mesh, &mut writer, binary)?;
    writer.flush()?;
    Ok(())
}

/// Write a mesh as STL into any writer.
///
/// # Errors
///
/// Returns an error if the writer fails.
pub fn write_stl<W: Write>(mesh: &Mesh, writer: W, binary: bool) -> IoResult<()> {
    if binary {
        write_stl_binary(mesh, writer)
    } else {
        write_stl_ascii(mesh, writer)
    }
}

/// Unit normal as f32 components, zero for degenerate facets.
#[allow(clippy::cast_possible_truncation)]
// Truncation: f64 to f32 is intentional for STL format which uses f32
fn facet_normal(triangle: &Triangle) -> [f32; 3] {
    triangle
        .normal()
        .map_or([0.0; 3], |n| [n.x as f32, n.y as f32, n.z as f32])
}

/// Save mesh as binary STL.
fn write_stl_binary<W: Write>(mesh: &Mesh, mut writer: W) -> IoResult<()> {
    // Write 80-byte header (padded with spaces)
    let mut header = [b' '; HEADER_SIZE];
    let text = b"Binary STL generated by mesh-io";
    header[..text.len()].copy_from_slice(text);
    writer.write_all(&header)?;

    let face_count = u32::try_from(mesh.triangle_count())
        .map_err(|_| IoError::format("binary STL cannot hold more than u32::MAX triangles"))?;
    writer.write_all(&face_count.to_le_bytes())?;

    for triangle in mesh.triangles() {
        for component in facet_normal(triangle) {
            writer.write_all(&component.to_le_bytes())?;
        }
        for v in triangle.vertices() {
            write_vertex_binary(&mut writer, &v)?;
        }

        // Write attribute byte count (0)
        writer.write_all(&0u16.to_le_bytes())?;
    }

    Ok(())
}

/// Write a vertex as 3 f32s in little-endian.
fn write_vertex_binary<W: Write>(writer: &mut W, v: &Point3<f64>) -> IoResult<()> {
    #[allow(clippy::cast_possible_truncation)]
    // Truncation: f64 to f32 is intentional for STL format
    {
        writer.write_all(&(v.x as f32).to_le_bytes())?;
        writer.write_all(&(v.y as f32).to_le_bytes())?;
        writer.write_all(&(v.z as f32).to_le_bytes())?;
    }
    Ok(())
}

/// Save mesh as ASCII STL.
fn write_stl_ascii<W: Write>(mesh: &Mesh, mut writer: W) -> IoResult<()> {
    writeln!(writer, "solid mesh")?;

    for triangle in mesh.triangles() {
        let [nx, ny, nz] = facet_normal(triangle);
        writeln!(writer, "  facet normal {nx:.6e} {ny:.6e} {nz:.6e}")?;
        writeln!(writer, "    outer loop")?;
        for v in triangle.vertices() {
            writeln!(writer, "      vertex {:.6e} {:.6e} {:.6e}", v.x, v.y, v.z)?;
        }
        writeln!(writer, "    endloop")?;
        writeln!(writer, "  endfacet")?;
    }

    writeln!(writer, "endsolid mesh")?;

    Ok(())
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::float_cmp,
    clippy::unnecessary_raw_string_hashes
)]
mod tests {
    use super::*;
    use mesh_types::unit_cube;

    fn create_test_triangle() -> Mesh {
        Mesh::new(vec![Triangle::from_arrays(
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
        )])
    }

    fn binary_bytes(mesh: &Mesh) -> Vec<u8> {
        let mut buf = Vec::new();
        write_stl(mesh, &mut buf, true).unwrap();
        buf
    }

    #[test]
    fn binary_layout_is_exact() {
        let bytes = binary_bytes(&create_test_triangle());
        assert_eq!(bytes.len(), PREAMBLE_SIZE + TRIANGLE_SIZE);
        assert_eq!(&bytes[80..84], &1u32.to_le_bytes());
        // Second vertex x lives after the normal and the first vertex
        assert_eq!(&bytes[84 + 24..84 + 28], &1.0f32.to_le_bytes());
        assert_eq!(&bytes[132..134], &[0, 0]);
    }

    #[test]
    fn binary_roundtrip_in_memory() {
        let cube = unit_cube();
        let loaded = parse_stl(&binary_bytes(&cube)).unwrap();
        assert_eq!(loaded.triangle_count(), 12);
        assert_eq!(loaded.triangles(), cube.triangles());
    }

    #[test]
    fn binary_header_starting_with_solid_is_still_binary() {
        let mut bytes = binary_bytes(&unit_cube());
        bytes[..5].copy_from_slice(b"solid");
        assert_eq!(detect_format(&bytes), StlFormat::Binary);
        assert_eq!(parse_stl(&bytes).unwrap().triangle_count(), 12);
    }

    #[test]
    fn truncated_binary_is_rejected() {
        let mut bytes = binary_bytes(&unit_cube());
        bytes.truncate(PREAMBLE_SIZE + TRIANGLE_SIZE * 5 + 10);
        match parse_stl(&bytes) {
            Err(IoError::Truncated {
                expected,
                available,
            }) => {
                assert_eq!(expected, 12);
                assert_eq!(available, 5);
            }
            other => panic!("expected truncation error, got {other:?}"),
        }
    }

    #[test]
    fn tiny_non_stl_is_a_format_error() {
        let result = parse_stl(&[0xff, 0xfe, 0x00, 0x01]);
        assert!(matches!(result, Err(IoError::Format { .. })));

        let result = parse_stl(b"hello");
        assert!(matches!(result, Err(IoError::Format { .. })));
    }

    #[test]
    fn ascii_stl_parsing() {
        let ascii_stl = br#"solid test
  facet normal 0 0 1
    outer loop
      vertex 0 0 0
      vertex 1 0 0
      vertex 0 1 0
    endloop
  endfacet
endsolid test"#;

        assert_eq!(detect_format(ascii_stl), StlFormat::Ascii);
        let mesh = parse_stl(ascii_stl).unwrap();
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.triangles()[0].v1, Point3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn ascii_is_case_insensitive_and_skips_bad_facets() {
        let ascii_stl = br#"SOLID shouty
FACET NORMAL 0 0 1
OUTER LOOP
VERTEX 0 0 0
VERTEX 1 0 0
ENDLOOP
ENDFACET
FACET NORMAL 0 0 1
OUTER LOOP
VERTEX 0 0 1
VERTEX 1 0 1
VERTEX 0 1 1.5e0
ENDLOOP
ENDFACET
ENDSOLID"#;

        let mesh = parse_stl(ascii_stl).unwrap();
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.triangles()[0].v2.z, 1.5);
    }

    #[test]
    fn ascii_bad_number_is_a_format_error() {
        let ascii_stl = b"solid x\nfacet normal 0 0 1\nouter loop\nvertex 0 zero 0\n";
        let err = parse_stl(ascii_stl).unwrap_err();
        assert!(matches!(err, IoError::Format { .. }));
        assert!(err.to_string().contains("line 4"));
    }

    #[test]
    fn ascii_non_finite_coordinate_is_a_format_error() {
        for token in ["inf", "-inf", "NaN"] {
            let ascii_stl = format!(
                "solid x\nfacet normal 0 0 1\nouter loop\nvertex 0 0 0\nvertex 1 0 0\nvertex 0 1 {token}\nendloop\nendfacet\nendsolid\n"
            );
            let err = parse_stl(ascii_stl.as_bytes()).unwrap_err();
            assert!(matches!(err, IoError::Format { .. }), "{token}: {err}");
            assert!(err.to_string().contains("line 6"));
        }
    }

    #[test]
    fn binary_non_finite_coordinate_is_a_format_error() {
        let mut bytes = binary_bytes(&create_test_triangle());
        // z of the third vertex
        bytes[84 + 44..84 + 48].copy_from_slice(&f32::INFINITY.to_le_bytes());
        assert!(matches!(parse_stl(&bytes), Err(IoError::Format { .. })));

        bytes[84 + 44..84 + 48].copy_from_slice(&f32::NAN.to_le_bytes());
        assert!(matches!(parse_stl(&bytes), Err(IoError::Format { .. })));
    }

    #[test]
    fn plain_text_is_a_format_error() {
        let readme = b"# Project notes\n\nThis directory holds sample models used by the slicer.\nRun the tool on any of them to see layer output.\n";
        assert!(readme.len() >= PREAMBLE_SIZE);
        assert_eq!(detect_format(readme), StlFormat::Binary);
        assert!(matches!(parse_stl(readme), Err(IoError::Format { .. })));
    }

    #[test]
    fn roundtrip_ascii() {
        let original = create_test_triangle();
        let mut buf = Vec::new();
        write_stl(&original, &mut buf, false).unwrap();

        let loaded = parse_stl(&buf).unwrap();
        assert_eq!(loaded.triangle_count(), 1);
        let v1 = loaded.triangles()[0].v1;
        assert!((v1.x - 1.0).abs() < 1e-5);
        assert!(v1.y.abs() < 1e-5);
    }

    #[test]
    fn load_nonexistent_file() {
        let result = load_stl("nonexistent_file_12345.stl");
        assert!(result.is_err());
        if let Err(IoError::FileNotFound { path }) = result {
            assert!(path.to_string_lossy().contains("nonexistent"));
        }
    }
}
