use crate::{Float, Point, Triangulation, TriangulationError};

#[derive(thiserror::Error, Debug)]
pub enum LoaderError {
    #[error("IO error")]
    Io(#[from] std::io::Error),
    #[error("malformed line {0:?}")]
    Parse(String),
}

/// A point set and its boundary segments, the load input a
/// [`Triangulation`] needs. Constraint segments are applied before loose
/// sites, matching the file layout.
#[derive(Debug, Default, Clone)]
pub struct MeshFile {
    pub segments: Vec<(Point, Point)>,
    pub sites: Vec<Point>,
}

impl MeshFile {
    /// Feed the contents into a triangulation. Duplicate sites are no-ops
    /// there, so segment endpoints may also appear in the site list.
    pub fn apply(&self, triangulation: &mut Triangulation) -> Result<(), TriangulationError> {
        for (a, b) in &self.segments {
            triangulation.place_constrained(*a, *b)?;
        }
        for site in &self.sites {
            triangulation.place(*site)?;
        }
        Ok(())
    }
}

/// Loader loads a source into a [`MeshFile`].
/// e.g: `PlainFileLoader` loads from a file path in the plain line format.
pub trait Loader {
    fn load(&mut self, source: &str) -> Result<MeshFile, LoaderError>;
}

/// Line-oriented text format: a `BOUNDARY` section with one `x1 y1 x2 y2`
/// segment per line, then a `SITES` section with one `x y` point per line.
/// Blank lines are skipped; either section may be missing.
#[derive(Default)]
pub struct PlainFileLoader {}

#[derive(Default)]
enum ParseState {
    #[default]
    Boundary,
    Sites,
}

impl Loader for PlainFileLoader {
    fn load(&mut self, path: &str) -> Result<MeshFile, LoaderError> {
        let value = std::fs::read_to_string(path)?;

        let mut state = ParseState::default();
        let mut mesh = MeshFile::default();
        for line in value.lines() {
            if line.eq("BOUNDARY") {
                state = ParseState::Boundary;
                continue;
            } else if line.eq("SITES") {
                state = ParseState::Sites;
                continue;
            } else if line.is_empty() {
                continue;
            }

            let numbers = parse_numbers(line)?;
            match state {
                ParseState::Boundary => match numbers.as_slice() {
                    [x1, y1, x2, y2] => mesh
                        .segments
                        .push((Point::new(*x1, *y1), Point::new(*x2, *y2))),
                    _ => return Err(LoaderError::Parse(line.to_string())),
                },
                ParseState::Sites => match numbers.as_slice() {
                    [x, y] => mesh.sites.push(Point::new(*x, *y)),
                    _ => return Err(LoaderError::Parse(line.to_string())),
                },
            }
        }
        Ok(mesh)
    }
}

/// Export the current boundary and site sets in the same plain line format.
pub fn save_to_string(triangulation: &Triangulation) -> String {
    use std::fmt::Write;

    let mut value = "BOUNDARY\n".to_string();
    for segment in triangulation.constraints() {
        let [a, b] = segment.endpoints();
        let _ = writeln!(value, "{} {} {} {}", a.x, a.y, b.x, b.y);
    }
    value.push_str("SITES\n");
    for site in triangulation.sites() {
        let _ = writeln!(value, "{} {}", site.x, site.y);
    }
    value
}

fn parse_numbers(line: &str) -> Result<Vec<Float>, LoaderError> {
    line.split_whitespace()
        .map(|token| {
            token
                .parse::<Float>()
                .map_err(|_| LoaderError::Parse(line.to_string()))
        })
        .collect()
}
