use crate::error::ParseError;

// ── Token ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    Ident(String),
    Int(u32),
    /// Preprocessor directive captured as one trimmed line, `#` stripped:
    /// `"version 450"`, `"extension GL_EXT_foo : enable"`, ...
    Directive(String),
    // Punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Semi,
    Comma,
    Eq,
    /// Any other character (operators, dots, ...). These only appear inside
    /// initializers and function bodies, which the parser skips wholesale.
    Other(char),
    // Sentinel
    Eof,
}

/// A token plus its 1-based source position.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenWithPos {
    pub token: Token,
    pub line: usize,
    pub col: usize,
}

// ── Lexer ─────────────────────────────────────────────────────────────────

pub struct Lexer<'s> {
    src: &'s str,
    pos: usize,
    line: usize,
    col: usize,
}

impl<'s> Lexer<'s> {
    pub fn new(src: &'s str) -> Self {
        Self { src, pos: 0, line: 1, col: 1 }
    }

    pub fn tokenize(mut self) -> Result<Vec<TokenWithPos>, ParseError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace_and_comments()?;
            let (line, col) = (self.line, self.col);
            let tok = self.next_token()?;
            let eof = tok == Token::Eof;
            tokens.push(TokenWithPos { token: tok, line, col });
            if eof {
                break;
            }
        }
        Ok(tokens)
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.src[self.pos..].chars().next()?;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn err(&self, msg: impl Into<String>) -> ParseError {
        ParseError::new(msg, self.line, self.col)
    }

    fn skip_whitespace_and_comments(&mut self) -> Result<(), ParseError> {
        loop {
            while matches!(self.peek(), Some(c) if c.is_whitespace()) {
                self.advance();
            }
            // `//` line comments
            if self.src[self.pos..].starts_with("//") {
                while !matches!(self.peek(), None | Some('\n')) {
                    self.advance();
                }
            // `/* */` block comments
            } else if self.src[self.pos..].starts_with("/*") {
                let (line, col) = (self.line, self.col);
                self.advance();
                self.advance();
                loop {
                    if self.src[self.pos..].starts_with("*/") {
                        self.advance();
                        self.advance();
                        break;
                    }
                    if self.advance().is_none() {
                        return Err(ParseError::new("unterminated block comment", line, col));
                    }
                }
            } else {
                return Ok(());
            }
        }
    }

    fn next_token(&mut self) -> Result<Token, ParseError> {
        let ch = match self.peek() {
            None => return Ok(Token::Eof),
            Some(c) => c,
        };

        match ch {
            '(' => { self.advance(); Ok(Token::LParen) }
            ')' => { self.advance(); Ok(Token::RParen) }
            '{' => { self.advance(); Ok(Token::LBrace) }
            '}' => { self.advance(); Ok(Token::RBrace) }
            '[' => { self.advance(); Ok(Token::LBracket) }
            ']' => { self.advance(); Ok(Token::RBracket) }
            ';' => { self.advance(); Ok(Token::Semi) }
            ',' => { self.advance(); Ok(Token::Comma) }
            '=' => { self.advance(); Ok(Token::Eq) }
            '#' => self.lex_directive(),
            c if c.is_ascii_digit() => self.lex_int(),
            c if c.is_alphabetic() || c == '_' => Ok(self.lex_ident()),
            other => { self.advance(); Ok(Token::Other(other)) }
        }
    }

    /// Lex a `#...` directive as one line. GLSL directives do not span lines
    /// (we do not support `\` continuations; the engine's shaders never use
    /// them).
    fn lex_directive(&mut self) -> Result<Token, ParseError> {
        self.advance(); // consume `#`
        let start = self.pos;
        while !matches!(self.peek(), None | Some('\n')) {
            self.advance();
        }
        let text = self.src[start..self.pos].trim();
        if text.is_empty() {
            return Err(self.err("empty preprocessor directive"));
        }
        Ok(Token::Directive(text.to_string()))
    }

    fn lex_int(&mut self) -> Result<Token, ParseError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.advance();
        }
        // `3.14` lexes as Int(3) Other('.') Int(14); that only ever happens
        // inside skipped initializers and bodies, so precision is irrelevant.
        // Trailing type suffixes (`u`, `U`) are consumed and ignored.
        if matches!(self.peek(), Some('u') | Some('U')) {
            self.advance();
        }
        let s = &self.src[start..self.pos];
        let digits = s.trim_end_matches(['u', 'U']);
        digits
            .parse::<u32>()
            .map(Token::Int)
            .map_err(|_| self.err(format!("integer literal out of range: {:?}", digits)))
    }

    fn lex_ident(&mut self) -> Token {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
            self.advance();
        }
        Token::Ident(self.src[start..self.pos].to_string())
    }
}
