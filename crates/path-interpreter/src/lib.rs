//! Path Interpreter: path command strings to closed planar polygons.
//!
//! The pipeline is lexer → parser (absolute segments) → flattener
//! (polygons). Output polygons keep the winding of the input; deciding
//! which rings are holes is left to the profile builder.

pub mod error;
pub mod flatten;
pub mod lexer;
pub mod parser;
pub mod shapes;

pub use error::MalformedPathError;
pub use flatten::{flatten, FlattenOptions};
pub use lexer::{tokenize, Token};
pub use parser::{parse, Segment};
pub use shapes::shape_to_polygon;

use plate_types::Polygon;
use tracing::trace;

/// Interpret path data into closed polygons.
pub fn interpret(src: &str, options: &FlattenOptions) -> Result<Vec<Polygon>, MalformedPathError> {
    let segments = parse(src)?;
    let polygons = flatten(&segments, options);
    trace!(
        segments = segments.len(),
        polygons = polygons.len(),
        "interpreted path"
    );
    Ok(polygons)
}
