pub mod lexer;
pub mod grammar;

use crate::error::ShapeError;
use crate::shape::Shape;

/// Parse a shape descriptor such as `Item { id: int, name: [u8; 5] }`.
///
/// This is the main entry point for the parser module; `Shape::from_str`
/// delegates here.
pub fn parse(descriptor: &str) -> Result<Shape, ShapeError> {
    grammar::parse_descriptor(descriptor)
}
