//! TSPLIB-subset graph loader.
//!
//! Accepted format: a header line containing `DIMENSION` and a positive
//! integer, a `NODE_COORD_SECTION` line, then one `index x y` line per
//! city (1-based index), optionally terminated by `EOF`. Distances are
//! rounded Euclidean integers; the matrix is symmetric with a zero
//! diagonal.

use std::error::Error;
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Errors from reading or parsing a TSP file.
///
/// All variants are terminal: a graph either loads completely or not at
/// all, before any task runs.
#[derive(Debug)]
#[non_exhaustive]
pub enum GraphError {
    /// I/O error while reading the source.
    Io(io::Error),
    /// No `DIMENSION` header before the coordinate section.
    MissingDimension,
    /// The `DIMENSION` header did not carry a positive integer.
    InvalidDimension,
    /// The file ended without a `NODE_COORD_SECTION` line.
    MissingCoordSection,
    /// A coordinate line used an index outside `1..=dimension`.
    InvalidCityIndex { index: i64, dimension: usize },
    /// Fewer (or more) coordinate lines than the header promised.
    CoordCountMismatch { got: usize, expected: usize },
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "I/O error: {err}"),
            Self::MissingDimension => write!(f, "missing DIMENSION header"),
            Self::InvalidDimension => write!(f, "DIMENSION must be a positive integer"),
            Self::MissingCoordSection => write!(f, "missing NODE_COORD_SECTION"),
            Self::InvalidCityIndex { index, dimension } => {
                write!(f, "city index {index} outside 1..={dimension}")
            }
            Self::CoordCountMismatch { got, expected } => {
                write!(f, "expected {expected} coordinate lines, found {got}")
            }
        }
    }
}

impl Error for GraphError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for GraphError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

/// Immutable symmetric distance matrix over the cities of one instance.
///
/// The matrix is computed once at load time over the full parsed
/// dimension; [`TspGraph::resize`] shrinks only the effective city
/// count, leaving the matrix intact, so a large instance can be cut
/// down for cheaper runs without reloading.
#[derive(Clone, Debug)]
pub struct TspGraph {
    coords: Vec<(f64, f64)>,
    /// Row-major distances, `stride * stride` entries.
    dist: Vec<u32>,
    /// Row length of `dist`: the dimension at parse time.
    stride: usize,
    /// Effective city count, `<= stride` after a resize.
    size: usize,
    /// Column width for pretty-printing the matrix.
    width: usize,
    source: String,
}

impl TspGraph {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, GraphError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        Self::parse(BufReader::new(file), &path.to_string_lossy())
    }

    /// Parse from any buffered reader; `source` labels the graph in
    /// printouts and has no semantic meaning.
    pub fn parse<R: BufRead>(reader: R, source: &str) -> Result<Self, GraphError> {
        let mut lines = reader.lines();

        let mut dimension: Option<usize> = None;
        let mut in_coord_section = false;
        for line in lines.by_ref() {
            let line = line?;
            if line.contains("DIMENSION") {
                dimension = Some(parse_dimension(&line)?);
            }
            if line.contains("NODE_COORD_SECTION") {
                in_coord_section = true;
                break;
            }
        }
        let dimension = dimension.ok_or(GraphError::MissingDimension)?;
        if !in_coord_section {
            return Err(GraphError::MissingCoordSection);
        }

        let mut coords = vec![(0.0, 0.0); dimension];
        let mut count = 0usize;
        for line in lines {
            let line = line?;
            if line.trim() == "EOF" {
                break;
            }
            let mut fields = line.split_whitespace();
            let (Some(index), Some(x), Some(y)) = (fields.next(), fields.next(), fields.next())
            else {
                continue;
            };
            let (Ok(index), Ok(x), Ok(y)) =
                (index.parse::<i64>(), x.parse::<f64>(), y.parse::<f64>())
            else {
                continue;
            };
            if index < 1 || index as usize > dimension {
                return Err(GraphError::InvalidCityIndex { index, dimension });
            }
            coords[index as usize - 1] = (x, y);
            count += 1;
        }
        if count != dimension {
            return Err(GraphError::CoordCountMismatch {
                got: count,
                expected: dimension,
            });
        }

        Ok(Self::from_coords(coords, source))
    }

    /// Build a graph directly from coordinates.
    pub fn from_coords(coords: Vec<(f64, f64)>, source: &str) -> Self {
        let n = coords.len();
        let mut dist = vec![0u32; n * n];
        let mut max = 0u32;
        for i in 0..n {
            for j in (i + 1)..n {
                let d = euc2d(coords[i], coords[j]);
                dist[i * n + j] = d;
                dist[j * n + i] = d;
                if d > max {
                    max = d;
                }
            }
        }
        let mut digits = 1;
        while max >= 10 {
            max /= 10;
            digits += 1;
        }
        Self {
            coords,
            dist,
            stride: n,
            size: n,
            width: digits + 1,
            source: source.to_string(),
        }
    }

    /// Effective number of cities.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Distance between cities `a` and `b`.
    ///
    /// # Panics
    /// If either index is out of bounds.
    #[inline]
    pub fn distance(&self, a: usize, b: usize) -> u32 {
        debug_assert!(a < self.size && b < self.size, "city index out of bounds");
        self.dist[a * self.stride + b]
    }

    /// Shrink the effective city count to `n`. The distance matrix is
    /// untouched, so the first `n` cities keep their distances.
    ///
    /// # Panics
    /// If `n` is zero or larger than the loaded dimension.
    pub fn resize(&mut self, n: usize) {
        assert!(
            n >= 1 && n <= self.stride,
            "resize to {} outside 1..={}",
            n,
            self.stride
        );
        self.size = n;
    }
}

impl fmt::Display for TspGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "TSP graph from {}", self.source)?;
        let n = self.size;
        for (i, (x, y)) in self.coords.iter().take(n).enumerate() {
            writeln!(f, " point {i} {{ x: {x}, y: {y} }}")?;
        }
        // Upper triangle, highest column first, matching the loader's
        // symmetric storage.
        let w = self.width;
        write!(f, "  ")?;
        for j in (1..n).rev() {
            write!(f, "{j:>w$}")?;
        }
        writeln!(f)?;
        for i in 0..n.saturating_sub(1) {
            write!(f, "{i:>3}")?;
            for j in ((i + 1)..n).rev() {
                write!(f, "{:>w$}", self.distance(i, j))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

fn parse_dimension(line: &str) -> Result<usize, GraphError> {
    let digits: String = line
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    let value: usize = digits
        .parse()
        .map_err(|_| GraphError::InvalidDimension)?;
    if value == 0 {
        return Err(GraphError::InvalidDimension);
    }
    Ok(value)
}

fn euc2d(a: (f64, f64), b: (f64, f64)) -> u32 {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    (dx * dx + dy * dy).sqrt().round() as u32
}

#[cfg(all(test, not(loom)))]
mod tests {
    use super::*;
    use std::io::Cursor;

    const UNIT_SQUARE: &str = "\
NAME: square4
DIMENSION: 4
NODE_COORD_SECTION
1 0.0 0.0
2 1.0 0.0
3 1.0 1.0
4 0.0 1.0
EOF
";

    fn square() -> TspGraph {
        TspGraph::parse(Cursor::new(UNIT_SQUARE), "square4").expect("valid instance")
    }

    #[test]
    fn parses_unit_square() {
        let graph = square();
        assert_eq!(graph.size(), 4);
        assert_eq!(graph.distance(0, 1), 1);
        assert_eq!(graph.distance(1, 2), 1);
        assert_eq!(graph.distance(0, 2), 1); // sqrt(2) rounds to 1
        assert_eq!(graph.distance(0, 0), 0);
    }

    #[test]
    fn matrix_is_symmetric() {
        let graph = square();
        for a in 0..graph.size() {
            for b in 0..graph.size() {
                assert_eq!(graph.distance(a, b), graph.distance(b, a));
            }
        }
    }

    #[test]
    fn resize_keeps_distances() {
        let mut graph = square();
        graph.resize(3);
        assert_eq!(graph.size(), 3);
        assert_eq!(graph.distance(0, 2), 1);
    }

    #[test]
    fn dimension_with_separator_variants() {
        for header in ["DIMENSION: 2", "DIMENSION : 2", "DIMENSION 2"] {
            let text = format!("{header}\nNODE_COORD_SECTION\n1 0 0\n2 3 4\n");
            let graph = TspGraph::parse(Cursor::new(text), "inline").expect("valid header");
            assert_eq!(graph.size(), 2);
            assert_eq!(graph.distance(0, 1), 5);
        }
    }

    #[test]
    fn unparsable_coordinate_lines_are_skipped() {
        let text = "DIMENSION: 2\nNODE_COORD_SECTION\n# comment\n1 0 0\n2 3 4\n";
        let graph = TspGraph::parse(Cursor::new(text), "inline").expect("valid instance");
        assert_eq!(graph.size(), 2);
    }

    #[test]
    fn missing_dimension_is_rejected() {
        let text = "NODE_COORD_SECTION\n1 0 0\n";
        match TspGraph::parse(Cursor::new(text), "inline") {
            Err(GraphError::MissingDimension) => {}
            other => panic!("expected MissingDimension, got {other:?}"),
        }
    }

    #[test]
    fn missing_coord_section_is_rejected() {
        let text = "DIMENSION: 2\n";
        match TspGraph::parse(Cursor::new(text), "inline") {
            Err(GraphError::MissingCoordSection) => {}
            other => panic!("expected MissingCoordSection, got {other:?}"),
        }
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let text = "DIMENSION: 2\nNODE_COORD_SECTION\n3 0 0\n";
        match TspGraph::parse(Cursor::new(text), "inline") {
            Err(GraphError::InvalidCityIndex { index: 3, .. }) => {}
            other => panic!("expected InvalidCityIndex, got {other:?}"),
        }
    }

    #[test]
    fn short_coordinate_count_is_rejected() {
        let text = "DIMENSION: 3\nNODE_COORD_SECTION\n1 0 0\n2 1 1\nEOF\n";
        match TspGraph::parse(Cursor::new(text), "inline") {
            Err(GraphError::CoordCountMismatch {
                got: 2,
                expected: 3,
            }) => {}
            other => panic!("expected CoordCountMismatch, got {other:?}"),
        }
    }

    #[test]
    fn display_lists_points_and_matrix() {
        let rendered = square().to_string();
        assert!(rendered.contains("TSP graph from square4"));
        assert!(rendered.contains("point 0 { x: 0, y: 0 }"));
        // Four points and a 3-row triangle.
        assert_eq!(rendered.lines().count(), 9);
    }
}
