// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph file format parser.
//!
//! The format is line-oriented plain text with whitespace-separated fields,
//! in a fixed order:
//!
//! 1. description line: free-form tag tokens
//! 2. generator line: `name [param...]` (only `uniform` takes a parameter)
//! 3. flags line: 1 to 4 booleans (older files wrote only the first)
//! 4. meta line: 4 integers (shared id counter) or 6 (split counters),
//!    followed by the vertex/edge/path counts
//! 5. vertex lines: `id x y z [type] [lighting]`
//! 6. edge lines: `id from to [t0 t1 t2 t3 weighted samples]`
//! 7. path lines: `id edge_count e_1 .. e_n`
//!
//! The flags act as the schema-versioning mechanism: optional columns only
//! exist when the corresponding flag is set, so one parser reads every
//! on-disk generation. Any malformed field is a fatal error; there is no
//! partial or recovered state.

use crate::math::Vec3;
use std::path::Path;
use std::str::FromStr;
use std::time::Instant;
use thiserror::Error;

/// Parse and I/O errors for graph files
#[derive(Debug, Error)]
pub enum ParseError {
    /// File could not be read
    #[error("failed to read graph file: {0}")]
    Io(#[from] std::io::Error),

    /// Input ended before the expected line
    #[error("unexpected end of file, expected {expected}")]
    UnexpectedEnd {
        /// What the parser was looking for
        expected: &'static str,
    },

    /// A line had the wrong number of fields
    #[error("line {line}: expected {expected}, found {found} fields")]
    MalformedLine {
        /// 1-based line number
        line: usize,
        /// What the line should contain
        expected: &'static str,
        /// Number of fields actually present
        found: usize,
    },

    /// A field failed numeric/boolean conversion
    #[error("line {line}: invalid {field} value {value:?}")]
    InvalidField {
        /// 1-based line number
        line: usize,
        /// Name of the offending field
        field: &'static str,
        /// The raw token
        value: String,
    },

    /// A vertex type code outside the known catalog
    #[error("line {line}: unknown ray vertex type code {code}")]
    UnknownVertexType {
        /// 1-based line number
        line: usize,
        /// The unrecognized code
        code: u32,
    },
}

/// Semantic tags from the description line.
///
/// Order is irrelevant; rules test membership by exact token match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet(Vec<String>);

impl TagSet {
    /// Parse the whitespace-separated description line
    pub fn from_line(line: &str) -> Self {
        Self(line.split_whitespace().map(str::to_owned).collect())
    }

    /// Whether the tag is present
    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|t| t == tag)
    }

    /// Whether any of the given tags is present
    pub fn contains_any(&self, tags: &[&str]) -> bool {
        tags.iter().any(|t| self.contains(t))
    }

    /// All tags in file order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Number of tags
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the description line was empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Feature flags from the flags line.
///
/// Older files carry only `use_coordinates`; missing flags default to off.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphFlags {
    /// Vertex positions are meaningful coordinates
    pub use_coordinates: bool,
    /// Edges carry throughput samples
    pub use_throughput: bool,
    /// Vertices carry a ray vertex type column
    pub use_ray_vertex_type: bool,
    /// Vertices carry a lighting column
    pub use_lighting: bool,
}

/// Generator that produced the file, with its parameter if any
#[derive(Debug, Clone, PartialEq)]
pub struct Generator {
    /// Generator name token
    pub name: String,
    /// Grid spacing, present for the `uniform` generator
    pub spacing: Option<f32>,
}

/// Next-id counters from the meta line.
///
/// The earliest format kept a single shared counter; it is mirrored into
/// all three fields here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdCounters {
    /// Next vertex id
    pub vertex: u32,
    /// Next edge id
    pub edge: u32,
    /// Next path id
    pub path: u32,
}

/// Categorical type of a path-tracing vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum RayVertexType {
    /// Ray was absorbed
    Absorption,
    /// Intermediate scatter event
    Scatter,
    /// Null collision
    Null,
    /// Ray entry point
    Entry,
    /// Final scatter before termination
    ScatterFinal,
}

impl RayVertexType {
    /// Decode the integer code used on disk
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(Self::Absorption),
            1 => Some(Self::Scatter),
            2 => Some(Self::Null),
            3 => Some(Self::Entry),
            4 => Some(Self::ScatterFinal),
            _ => None,
        }
    }
}

/// One vertex line
#[derive(Debug, Clone, PartialEq)]
pub struct VertexRecord {
    /// Vertex id, unique within the file
    pub id: u32,
    /// Declared 3D position
    pub position: Vec3,
    /// Ray vertex type, present iff `use_ray_vertex_type`
    pub vertex_type: Option<RayVertexType>,
    /// Lighting scalar, present iff `use_lighting`
    pub lighting: Option<f32>,
}

/// Per-edge throughput payload
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ThroughputData {
    /// The four throughput samples
    pub samples: [f32; 4],
    /// Aggregate weighted throughput
    pub weighted: f32,
    /// Number of samples the aggregate was computed from
    pub sample_count: u32,
}

/// One edge line
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeRecord {
    /// Edge id, unique within the file
    pub id: u32,
    /// Source vertex id
    pub from: u32,
    /// Target vertex id
    pub to: u32,
    /// Throughput payload, present iff `use_throughput`
    pub throughput: Option<ThroughputData>,
}

/// One path line: an ordered sequence of edge ids
#[derive(Debug, Clone, PartialEq)]
pub struct PathRecord {
    /// Path id
    pub id: u32,
    /// Referenced edge ids in file order
    pub edges: Vec<u32>,
}

/// A fully parsed graph file
#[derive(Debug, Clone)]
pub struct GraphFile {
    /// Description line tags
    pub tags: TagSet,
    /// Generator line
    pub generator: Generator,
    /// Feature flags
    pub flags: GraphFlags,
    /// Next-id counters
    pub counters: IdCounters,
    /// Vertex records in file order
    pub vertices: Vec<VertexRecord>,
    /// Edge records in file order
    pub edges: Vec<EdgeRecord>,
    /// Path records in file order
    pub paths: Vec<PathRecord>,
}

/// Line cursor tracking 1-based line numbers for error reporting
struct Cursor<'a> {
    lines: std::str::Lines<'a>,
    line_no: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self { lines: input.lines(), line_no: 0 }
    }

    fn next(&mut self, expected: &'static str) -> Result<(usize, &'a str), ParseError> {
        match self.lines.next() {
            Some(line) => {
                self.line_no += 1;
                Ok((self.line_no, line))
            }
            None => Err(ParseError::UnexpectedEnd { expected }),
        }
    }
}

fn parse_field<T: FromStr>(
    line: usize,
    field: &'static str,
    value: &str,
) -> Result<T, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidField {
        line,
        field,
        value: value.to_owned(),
    })
}

/// Existing writers emit C#-style `True`/`False`; accept both spellings.
fn parse_bool(line: usize, field: &'static str, value: &str) -> Result<bool, ParseError> {
    match value.to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParseError::InvalidField {
            line,
            field,
            value: value.to_owned(),
        }),
    }
}

impl GraphFile {
    /// Read and parse `{path}`, logging elapsed time for both phases.
    pub fn read(path: &Path) -> Result<Self, ParseError> {
        let read_start = Instant::now();
        let contents = std::fs::read_to_string(path)?;
        tracing::info!(
            "Read {} ({} bytes) in {:.2?}",
            path.display(),
            contents.len(),
            read_start.elapsed()
        );

        let parse_start = Instant::now();
        let file = Self::parse(&contents)?;
        tracing::info!(
            "Parsed {} vertices, {} edges, {} paths in {:.2?}",
            file.vertices.len(),
            file.edges.len(),
            file.paths.len(),
            parse_start.elapsed()
        );
        Ok(file)
    }

    /// Parse graph file contents.
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let mut cursor = Cursor::new(input);

        let (_, desc) = cursor.next("description line")?;
        let tags = TagSet::from_line(desc);

        let generator = Self::parse_generator(&mut cursor)?;
        let flags = Self::parse_flags(&mut cursor)?;
        let (counters, num_vertices, num_edges, num_paths) = Self::parse_meta(&mut cursor)?;

        let mut vertices = Vec::with_capacity(num_vertices);
        for _ in 0..num_vertices {
            vertices.push(Self::parse_vertex(&mut cursor, flags)?);
        }

        let mut edges = Vec::with_capacity(num_edges);
        for _ in 0..num_edges {
            edges.push(Self::parse_edge(&mut cursor, flags)?);
        }

        let mut paths = Vec::with_capacity(num_paths);
        for _ in 0..num_paths {
            paths.push(Self::parse_path(&mut cursor)?);
        }

        Ok(Self {
            tags,
            generator,
            flags,
            counters,
            vertices,
            edges,
            paths,
        })
    }

    fn parse_generator(cursor: &mut Cursor) -> Result<Generator, ParseError> {
        let (line, text) = cursor.next("generator line")?;
        let mut fields = text.split_whitespace();
        let Some(name) = fields.next() else {
            return Err(ParseError::MalformedLine {
                line,
                expected: "generator name",
                found: 0,
            });
        };

        // Only the uniform generator consumes a parameter; unknown
        // generators ignore any extra fields.
        let spacing = if name == "uniform" {
            let value = fields.next().ok_or(ParseError::MalformedLine {
                line,
                expected: "uniform generator spacing",
                found: 1,
            })?;
            Some(parse_field(line, "spacing", value)?)
        } else {
            None
        };

        Ok(Generator { name: name.to_owned(), spacing })
    }

    fn parse_flags(cursor: &mut Cursor) -> Result<GraphFlags, ParseError> {
        let (line, text) = cursor.next("flags line")?;
        let fields: Vec<&str> = text.split_whitespace().collect();
        if fields.is_empty() || fields.len() > 4 {
            return Err(ParseError::MalformedLine {
                line,
                expected: "1 to 4 boolean flags",
                found: fields.len(),
            });
        }

        let get = |idx: usize, field: &'static str| -> Result<bool, ParseError> {
            match fields.get(idx) {
                Some(value) => parse_bool(line, field, value),
                None => Ok(false),
            }
        };

        Ok(GraphFlags {
            use_coordinates: get(0, "use_coordinates")?,
            use_throughput: get(1, "use_throughput")?,
            use_ray_vertex_type: get(2, "use_ray_vertex_type")?,
            use_lighting: get(3, "use_lighting")?,
        })
    }

    fn parse_meta(cursor: &mut Cursor) -> Result<(IdCounters, usize, usize, usize), ParseError> {
        let (line, text) = cursor.next("meta line")?;
        let fields: Vec<&str> = text.split_whitespace().collect();

        let (counters, counts) = match fields.len() {
            // Early format: one shared id counter
            4 => {
                let cur: u32 = parse_field(line, "id counter", fields[0])?;
                (IdCounters { vertex: cur, edge: cur, path: cur }, &fields[1..])
            }
            // Later format: per-kind counters
            6 => (
                IdCounters {
                    vertex: parse_field(line, "vertex id counter", fields[0])?,
                    edge: parse_field(line, "edge id counter", fields[1])?,
                    path: parse_field(line, "path id counter", fields[2])?,
                },
                &fields[3..],
            ),
            found => {
                return Err(ParseError::MalformedLine {
                    line,
                    expected: "4 or 6 meta integers",
                    found,
                })
            }
        };

        let num_vertices: usize = parse_field(line, "vertex count", counts[0])?;
        let num_edges: usize = parse_field(line, "edge count", counts[1])?;
        let num_paths: usize = parse_field(line, "path count", counts[2])?;
        Ok((counters, num_vertices, num_edges, num_paths))
    }

    fn parse_vertex(cursor: &mut Cursor, flags: GraphFlags) -> Result<VertexRecord, ParseError> {
        let (line, text) = cursor.next("vertex line")?;
        let fields: Vec<&str> = text.split_whitespace().collect();

        let mut expected = 4;
        if flags.use_ray_vertex_type {
            expected += 1;
        }
        if flags.use_lighting {
            expected += 1;
        }
        if fields.len() != expected {
            return Err(ParseError::MalformedLine {
                line,
                expected: "vertex fields (id x y z [type] [lighting])",
                found: fields.len(),
            });
        }

        let id = parse_field(line, "vertex id", fields[0])?;
        let position = Vec3::new(
            parse_field(line, "x", fields[1])?,
            parse_field(line, "y", fields[2])?,
            parse_field(line, "z", fields[3])?,
        );

        // The lighting column shifts right by one when the type column exists.
        let mut next = 4;
        let vertex_type = if flags.use_ray_vertex_type {
            let code: u32 = parse_field(line, "vertex type", fields[next])?;
            next += 1;
            Some(RayVertexType::from_code(code).ok_or(ParseError::UnknownVertexType { line, code })?)
        } else {
            None
        };

        let lighting = if flags.use_lighting {
            Some(parse_field(line, "lighting", fields[next])?)
        } else {
            None
        };

        Ok(VertexRecord { id, position, vertex_type, lighting })
    }

    fn parse_edge(cursor: &mut Cursor, flags: GraphFlags) -> Result<EdgeRecord, ParseError> {
        let (line, text) = cursor.next("edge line")?;
        let fields: Vec<&str> = text.split_whitespace().collect();

        let expected = if flags.use_throughput { 9 } else { 3 };
        if fields.len() != expected {
            return Err(ParseError::MalformedLine {
                line,
                expected: "edge fields (id from to [throughput])",
                found: fields.len(),
            });
        }

        let id = parse_field(line, "edge id", fields[0])?;
        let from = parse_field(line, "edge from id", fields[1])?;
        let to = parse_field(line, "edge to id", fields[2])?;

        let throughput = if flags.use_throughput {
            Some(ThroughputData {
                samples: [
                    parse_field(line, "throughput sample", fields[3])?,
                    parse_field(line, "throughput sample", fields[4])?,
                    parse_field(line, "throughput sample", fields[5])?,
                    parse_field(line, "throughput sample", fields[6])?,
                ],
                weighted: parse_field(line, "weighted throughput", fields[7])?,
                sample_count: parse_field(line, "sample count", fields[8])?,
            })
        } else {
            None
        };

        Ok(EdgeRecord { id, from, to, throughput })
    }

    fn parse_path(cursor: &mut Cursor) -> Result<PathRecord, ParseError> {
        let (line, text) = cursor.next("path line")?;
        let fields: Vec<&str> = text.split_whitespace().collect();
        if fields.len() < 2 {
            return Err(ParseError::MalformedLine {
                line,
                expected: "path fields (id edge_count edges...)",
                found: fields.len(),
            });
        }

        let id = parse_field(line, "path id", fields[0])?;
        let edge_count: usize = parse_field(line, "path edge count", fields[1])?;
        if fields.len() != edge_count + 2 {
            return Err(ParseError::MalformedLine {
                line,
                expected: "path edge ids matching the declared count",
                found: fields.len(),
            });
        }

        let mut edges = Vec::with_capacity(edge_count);
        for value in &fields[2..] {
            edges.push(parse_field(line, "path edge id", value)?);
        }

        Ok(PathRecord { id, edges })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EARLY_FORMAT: &str = "\
grid
uniform 0.5
True
6 2 1 0
0 0 0 0
1 2 0 0
0 0 1
";

    const LATE_FORMAT: &str = "\
full_paths transmittance
handcrafted
true true true true
3 2 1 2 1 1
0 0 0 0 3 0.8
1 1 0 2 4 0.2
0 0 1 0.9 0.8 0.7 0.6 0.75 16
1 1 0
";

    #[test]
    fn test_parse_early_format() {
        let file = GraphFile::parse(EARLY_FORMAT).unwrap();

        assert!(file.tags.contains("grid"));
        assert_eq!(file.generator.name, "uniform");
        assert_eq!(file.generator.spacing, Some(0.5));
        assert!(file.flags.use_coordinates);
        assert!(!file.flags.use_throughput);
        // Shared counter mirrored into all three
        assert_eq!(file.counters, IdCounters { vertex: 6, edge: 6, path: 6 });

        assert_eq!(file.vertices.len(), 2);
        assert_eq!(file.edges.len(), 1);
        assert_eq!(file.paths.len(), 0);
        assert_eq!(file.vertices[1].position, Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(file.edges[0].from, 0);
        assert_eq!(file.edges[0].to, 1);
        assert!(file.edges[0].throughput.is_none());
    }

    #[test]
    fn test_parse_late_format() {
        let file = GraphFile::parse(LATE_FORMAT).unwrap();

        assert!(file.tags.contains("full_paths"));
        assert!(file.tags.contains("transmittance"));
        assert_eq!(file.generator.spacing, None);
        assert!(file.flags.use_throughput);
        assert!(file.flags.use_ray_vertex_type);
        assert!(file.flags.use_lighting);
        assert_eq!(file.counters, IdCounters { vertex: 3, edge: 2, path: 1 });

        assert_eq!(file.vertices[0].vertex_type, Some(RayVertexType::Entry));
        assert_eq!(file.vertices[0].lighting, Some(0.8));
        assert_eq!(file.vertices[1].vertex_type, Some(RayVertexType::ScatterFinal));

        let throughput = file.edges[0].throughput.unwrap();
        assert_eq!(throughput.samples, [0.9, 0.8, 0.7, 0.6]);
        assert_eq!(throughput.weighted, 0.75);
        assert_eq!(throughput.sample_count, 16);

        assert_eq!(file.paths[0].edges, vec![0]);
    }

    #[test]
    fn test_lighting_column_without_vertex_type() {
        // use_lighting set but not use_ray_vertex_type: lighting sits
        // directly after the position columns.
        let input = "\
outline
handcrafted
true false false true
1 1 0 0
0 1 2 3 0.5
";
        let file = GraphFile::parse(input).unwrap();
        assert_eq!(file.vertices[0].vertex_type, None);
        assert_eq!(file.vertices[0].lighting, Some(0.5));
    }

    #[test]
    fn test_empty_path_is_valid() {
        let input = "\
paths
handcrafted
true
0 0 0 1
7 0
";
        let file = GraphFile::parse(input).unwrap();
        assert_eq!(file.paths[0].id, 7);
        assert!(file.paths[0].edges.is_empty());
    }

    #[test]
    fn test_truncated_file_fails() {
        let input = "\
grid
uniform 1.0
true
0 2 0 0
0 0 0 0
";
        let err = GraphFile::parse(input).unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEnd { .. }));
    }

    #[test]
    fn test_bad_number_fails_with_line() {
        let input = "\
grid
uniform 1.0
true
0 1 0 0
0 zero 0 0
";
        match GraphFile::parse(input).unwrap_err() {
            ParseError::InvalidField { line, field, value } => {
                assert_eq!(line, 5);
                assert_eq!(field, "x");
                assert_eq!(value, "zero");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_csharp_style_booleans() {
        let file = GraphFile::parse("g\nhandcrafted\nTrue False True False\n0 0 0 0 0 0\n").unwrap();
        assert!(file.flags.use_coordinates);
        assert!(!file.flags.use_throughput);
        assert!(file.flags.use_ray_vertex_type);
    }

    #[test]
    fn test_unknown_vertex_type_code_fails() {
        let input = "\
g
handcrafted
true false true
0 1 0 0
0 0 0 0 9
";
        assert!(matches!(
            GraphFile::parse(input).unwrap_err(),
            ParseError::UnknownVertexType { code: 9, .. }
        ));
    }

    #[test]
    fn test_path_count_mismatch_fails() {
        let input = "\
g
handcrafted
true
0 0 0 1
0 3 1 2
";
        assert!(matches!(
            GraphFile::parse(input).unwrap_err(),
            ParseError::MalformedLine { .. }
        ));
    }

    #[test]
    fn test_meta_field_count_enforced() {
        let input = "g\nhandcrafted\ntrue\n1 2 3 4 5\n";
        assert!(matches!(
            GraphFile::parse(input).unwrap_err(),
            ParseError::MalformedLine { found: 5, .. }
        ));
    }
}
