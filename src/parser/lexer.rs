/// Token types produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `?` optional prefix
    Question,
    /// `:`
    Colon,
    /// `;`
    Semicolon,
    /// `,`
    Comma,
    /// An identifier (field name, record name, scalar keyword)
    Name(String),
    /// A numeric literal (fixed array length)
    Number(u64),
    /// A byte that starts no token
    Invalid(char),
    /// End of input
    Eof,
}

/// A token with the byte offset it starts at.
#[derive(Debug, Clone)]
pub struct Located {
    pub token: Token,
    pub offset: usize,
}

/// Tokenizer for shape descriptors.
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    peeked: Option<Located>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input,
            pos: 0,
            peeked: None,
        }
    }

    fn peek_byte(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn skip_whitespace_and_comments(&mut self) {
        while let Some(b) = self.peek_byte() {
            match b {
                b' ' | b'\t' | b'\r' | b'\n' => self.pos += 1,
                b'#' => {
                    // Line comment: skip to end of line
                    while let Some(b) = self.peek_byte() {
                        self.pos += 1;
                        if b == b'\n' {
                            break;
                        }
                    }
                }
                _ => break,
            }
        }
    }

    fn take_while(&mut self, pred: impl Fn(u8) -> bool) -> &'a str {
        let input = self.input;
        let start = self.pos;
        while self.peek_byte().is_some_and(&pred) {
            self.pos += 1;
        }
        &input[start..self.pos]
    }

    fn lex(&mut self) -> Located {
        self.skip_whitespace_and_comments();
        let offset = self.pos;

        let b = match self.peek_byte() {
            Some(b) => b,
            None => {
                return Located {
                    token: Token::Eof,
                    offset,
                }
            }
        };

        let token = match b {
            b'{' | b'}' | b'[' | b']' | b'?' | b':' | b';' | b',' => {
                self.pos += 1;
                match b {
                    b'{' => Token::LBrace,
                    b'}' => Token::RBrace,
                    b'[' => Token::LBracket,
                    b']' => Token::RBracket,
                    b'?' => Token::Question,
                    b':' => Token::Colon,
                    b';' => Token::Semicolon,
                    _ => Token::Comma,
                }
            }
            b'0'..=b'9' => {
                let digits = self.take_while(|b| b.is_ascii_digit());
                match digits.parse() {
                    Ok(n) => Token::Number(n),
                    // Longer than u64: report the first digit as invalid.
                    Err(_) => Token::Invalid(b as char),
                }
            }
            b if b.is_ascii_alphabetic() || b == b'_' => {
                let name = self.take_while(|b| b.is_ascii_alphanumeric() || b == b'_');
                Token::Name(name.to_string())
            }
            _ => {
                let c = self.input[offset..].chars().next().unwrap_or('\u{FFFD}');
                self.pos += c.len_utf8();
                Token::Invalid(c)
            }
        };

        Located { token, offset }
    }

    /// Read the next token.
    pub fn next_token(&mut self) -> Located {
        match self.peeked.take() {
            Some(tok) => tok,
            None => self.lex(),
        }
    }

    /// Look at the next token without consuming it.
    pub fn peek_token(&mut self) -> Located {
        if self.peeked.is_none() {
            self.peeked = Some(self.lex());
        }
        self.peeked.clone().unwrap_or(Located {
            token: Token::Eof,
            offset: self.pos,
        })
    }
}
