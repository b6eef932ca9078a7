use crate::error::ShapeError;
use crate::shape::{FieldShape, IntWidth, RecordShape, Shape};

use super::lexer::{Lexer, Token};

/// Deepest nesting accepted before the parser gives up.
const MAX_DEPTH: usize = 64;

/// Parse a complete descriptor; trailing tokens are an error.
pub fn parse_descriptor(input: &str) -> Result<Shape, ShapeError> {
    let mut lexer = Lexer::new(input);
    let shape = parse_shape(&mut lexer, 0)?;

    let tok = lexer.next_token();
    if tok.token != Token::Eof {
        return Err(syntax(
            tok.offset,
            format!("unexpected {:?} after shape", tok.token),
        ));
    }
    Ok(shape)
}

fn parse_shape(lexer: &mut Lexer, depth: usize) -> Result<Shape, ShapeError> {
    let tok = lexer.next_token();
    if depth >= MAX_DEPTH {
        return Err(syntax(tok.offset, "shape nested too deeply".into()));
    }

    match tok.token {
        Token::Question => Ok(Shape::optional(parse_shape(lexer, depth + 1)?)),
        Token::LBracket => parse_brackets(lexer, depth),
        Token::LBrace => parse_record_body(lexer, String::new(), depth),
        Token::Name(name) => {
            if lexer.peek_token().token == Token::LBrace {
                lexer.next_token();
                return parse_record_body(lexer, name, depth);
            }
            scalar(&name).ok_or(ShapeError::Unsupported(name))
        }
        other => Err(syntax(
            tok.offset,
            format!("expected shape, found {:?}", other),
        )),
    }
}

/// `[elem]` or `[elem; N]`, with the opening bracket already consumed.
fn parse_brackets(lexer: &mut Lexer, depth: usize) -> Result<Shape, ShapeError> {
    let elem = parse_shape(lexer, depth + 1)?;

    let tok = lexer.next_token();
    match tok.token {
        Token::RBracket => Ok(Shape::sequence(elem)),
        Token::Semicolon => {
            let len_tok = lexer.next_token();
            let len = match len_tok.token {
                Token::Number(n) => usize::try_from(n).map_err(|_| {
                    syntax(len_tok.offset, format!("array length {} too large", n))
                })?,
                other => {
                    return Err(syntax(
                        len_tok.offset,
                        format!("expected array length, found {:?}", other),
                    ));
                }
            };
            expect_token(lexer, Token::RBracket)?;
            Ok(Shape::array(elem, len))
        }
        other => Err(syntax(
            tok.offset,
            format!("expected ']' or ';', found {:?}", other),
        )),
    }
}

/// Record fields up to the closing brace, with the opening brace already consumed.
fn parse_record_body(
    lexer: &mut Lexer,
    name: String,
    depth: usize,
) -> Result<Shape, ShapeError> {
    let mut fields: Vec<FieldShape> = Vec::new();

    loop {
        let tok = lexer.next_token();
        let field_name = match tok.token {
            Token::RBrace => break,
            Token::Name(field_name) => field_name,
            other => {
                return Err(syntax(
                    tok.offset,
                    format!("expected field name or '}}', found {:?}", other),
                ));
            }
        };

        expect_token(lexer, Token::Colon)?;
        let shape = parse_shape(lexer, depth + 1)?;

        if fields.iter().any(|f| f.name == field_name) {
            return Err(ShapeError::DuplicateField {
                record: name,
                field_name,
            });
        }
        fields.push(FieldShape {
            name: field_name,
            shape,
        });

        let sep = lexer.next_token();
        match sep.token {
            Token::Comma => {}
            Token::RBrace => break,
            other => {
                return Err(syntax(
                    sep.offset,
                    format!("expected ',' or '}}', found {:?}", other),
                ));
            }
        }
    }

    Ok(Shape::Record(RecordShape { name, fields }))
}

fn scalar(name: &str) -> Option<Shape> {
    let shape = match name {
        "bool" => Shape::Bool,
        "i8" => Shape::Int(IntWidth::W8),
        "i16" => Shape::Int(IntWidth::W16),
        "i32" => Shape::Int(IntWidth::W32),
        "i64" => Shape::Int(IntWidth::W64),
        "int" => Shape::Int(IntWidth::Native),
        "u8" => Shape::Uint(IntWidth::W8),
        "u16" => Shape::Uint(IntWidth::W16),
        "u32" => Shape::Uint(IntWidth::W32),
        "u64" => Shape::Uint(IntWidth::W64),
        "uint" => Shape::Uint(IntWidth::Native),
        "f32" => Shape::F32,
        "f64" => Shape::F64,
        "text" => Shape::Text,
        "timestamp" => Shape::Timestamp,
        _ => return None,
    };
    Some(shape)
}

fn expect_token(lexer: &mut Lexer, expected: Token) -> Result<(), ShapeError> {
    let tok = lexer.next_token();
    if tok.token == expected {
        Ok(())
    } else {
        Err(syntax(
            tok.offset,
            format!("expected {:?}, found {:?}", expected, tok.token),
        ))
    }
}

fn syntax(offset: usize, message: String) -> ShapeError {
    ShapeError::Syntax { offset, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalars() {
        assert_eq!(parse_descriptor("bool").unwrap(), Shape::Bool);
        assert_eq!(
            parse_descriptor("int").unwrap(),
            Shape::Int(IntWidth::Native)
        );
        assert_eq!(
            parse_descriptor("u16").unwrap(),
            Shape::Uint(IntWidth::W16)
        );
        assert_eq!(parse_descriptor(" timestamp ").unwrap(), Shape::Timestamp);
    }

    #[test]
    fn test_containers() {
        assert_eq!(
            parse_descriptor("[u8; 5]").unwrap(),
            Shape::array(Shape::Uint(IntWidth::W8), 5)
        );
        assert_eq!(
            parse_descriptor("[?text]").unwrap(),
            Shape::sequence(Shape::optional(Shape::Text))
        );
    }

    #[test]
    fn test_record() {
        let shape = parse_descriptor(
            r#"
            Item {
                id: int,        # native width
                name: [u8; 5],
                tags: [text],   # trailing comma below
            }
        "#,
        )
        .unwrap();
        assert_eq!(
            shape,
            Shape::record(
                "Item",
                vec![
                    ("id", Shape::Int(IntWidth::Native)),
                    ("name", Shape::array(Shape::Uint(IntWidth::W8), 5)),
                    ("tags", Shape::sequence(Shape::Text)),
                ]
            )
        );
    }

    #[test]
    fn test_anonymous_and_empty_records() {
        assert_eq!(parse_descriptor("{}").unwrap(), Shape::record("", vec![]));
        assert_eq!(
            parse_descriptor("{ a: f64 }").unwrap(),
            Shape::record("", vec![("a", Shape::F64)])
        );
        assert_eq!(parse_descriptor("Unit {}").unwrap(), Shape::record("Unit", vec![]));
    }

    #[test]
    fn test_unsupported() {
        match parse_descriptor("{ lookup: map }") {
            Err(ShapeError::Unsupported(name)) => assert_eq!(name, "map"),
            other => panic!("expected unsupported, got {:?}", other),
        }
    }

    #[test]
    fn test_syntax_errors() {
        assert!(matches!(
            parse_descriptor("[u8; x]"),
            Err(ShapeError::Syntax { offset: 5, .. })
        ));
        assert!(matches!(
            parse_descriptor("{ a i32 }"),
            Err(ShapeError::Syntax { offset: 4, .. })
        ));
        assert!(matches!(
            parse_descriptor("i32 i32"),
            Err(ShapeError::Syntax { offset: 4, .. })
        ));
        assert!(matches!(
            parse_descriptor(""),
            Err(ShapeError::Syntax { offset: 0, .. })
        ));
    }

    #[test]
    fn test_duplicate_field() {
        assert!(matches!(
            parse_descriptor("R { a: i8, a: i16 }"),
            Err(ShapeError::DuplicateField { .. })
        ));
    }

    #[test]
    fn test_depth_limit() {
        let deep = "?".repeat(MAX_DEPTH + 1) + "i8";
        assert!(matches!(
            parse_descriptor(&deep),
            Err(ShapeError::Syntax { .. })
        ));
        let fine = "?".repeat(MAX_DEPTH - 1) + "i8";
        assert!(parse_descriptor(&fine).is_ok());
    }
}
