use crate::ast::{
    BlockDecl, BlockField, Decl, Extension, Layout, Storage, TranslationUnit, TypeName, VarDecl,
    Version,
};
use crate::error::ParseError;
use crate::lexer::{Lexer, Token, TokenWithPos};

// ── Parser ────────────────────────────────────────────────────────────────

pub struct Parser {
    tokens: Vec<TokenWithPos>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<TokenWithPos>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn current_pos(&self) -> (usize, usize) {
        self.tokens
            .get(self.pos)
            .map(|t| (t.line, t.col))
            .or_else(|| self.tokens.last().map(|t| (t.line, t.col)))
            .unwrap_or((1, 1))
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).map(|t| &t.token).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens.get(self.pos).map(|t| t.token.clone()).unwrap_or(Token::Eof);
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn err(&self, msg: impl Into<String>) -> ParseError {
        let (line, col) = self.current_pos();
        ParseError::new(msg, line, col)
    }

    fn expect_ident(&mut self) -> Result<String, ParseError> {
        match self.advance() {
            Token::Ident(s) => Ok(s),
            tok => Err(self.err(format!("expected identifier, got {:?}", tok))),
        }
    }

    fn expect_int(&mut self) -> Result<u32, ParseError> {
        match self.advance() {
            Token::Int(n) => Ok(n),
            tok => Err(self.err(format!("expected integer literal, got {:?}", tok))),
        }
    }

    fn expect_token(&mut self, expected: &Token) -> Result<(), ParseError> {
        let got = self.advance();
        if &got == expected {
            Ok(())
        } else {
            Err(self.err(format!("expected {:?}, got {:?}", expected, got)))
        }
    }

    // ── Translation unit ──────────────────────────────────────────────────

    pub fn parse_unit(&mut self) -> Result<TranslationUnit, ParseError> {
        let mut version: Option<Version> = None;
        let mut extensions = Vec::new();
        let mut decls = Vec::new();

        loop {
            match self.peek().clone() {
                Token::Eof => break,
                // Stray semicolons are legal at global scope.
                Token::Semi => {
                    self.advance();
                }
                Token::Directive(text) => {
                    self.advance();
                    self.handle_directive(&text, &mut version, &mut extensions)?;
                }
                Token::Ident(_) => {
                    if version.is_none() {
                        return Err(self.err("missing #version directive before declarations"));
                    }
                    self.parse_external_decl(&mut decls)?;
                }
                tok => return Err(self.err(format!("unexpected {:?} at top level", tok))),
            }
        }

        match version {
            Some(version) => Ok(TranslationUnit { version, extensions, decls }),
            None => Err(ParseError::new("missing #version directive", 1, 1)),
        }
    }

    // ── Directives ────────────────────────────────────────────────────────

    fn handle_directive(
        &self,
        text: &str,
        version: &mut Option<Version>,
        extensions: &mut Vec<Extension>,
    ) -> Result<(), ParseError> {
        let mut parts = text.split_whitespace();
        match parts.next() {
            Some("version") => {
                if version.is_some() {
                    return Err(self.err("duplicate #version directive"));
                }
                let number = parts
                    .next()
                    .and_then(|w| w.parse::<u32>().ok())
                    .ok_or_else(|| self.err(format!("malformed #version directive: {:?}", text)))?;
                let core = parts.next() == Some("core");
                *version = Some(Version { number, core });
                Ok(())
            }
            Some("extension") => {
                if version.is_none() {
                    return Err(self.err("#version must precede all other directives"));
                }
                let rest = text["extension".len()..].trim();
                let (name, behavior) = rest
                    .split_once(':')
                    .ok_or_else(|| self.err(format!("malformed #extension directive: {:?}", text)))?;
                extensions.push(Extension {
                    name: name.trim().to_string(),
                    behavior: behavior.trim().to_string(),
                });
                Ok(())
            }
            // #pragma, #define, #ifdef, ... — preprocessor noise for our
            // purposes, but still illegal ahead of #version.
            Some(_) => {
                if version.is_none() {
                    return Err(self.err("#version must precede all other directives"));
                }
                Ok(())
            }
            None => Err(self.err("empty preprocessor directive")),
        }
    }

    // ── External declarations ─────────────────────────────────────────────

    /// Parse one top-level item. Interface declarations land in `decls`;
    /// functions, structs, `const` globals, and `precision` statements are
    /// skipped.
    fn parse_external_decl(&mut self, decls: &mut Vec<Decl>) -> Result<(), ParseError> {
        let (line, col) = self.current_pos();
        let mut layout = Layout::default();

        // Leading qualifiers, in the orders GLSL accepts for this subset.
        loop {
            let word = match self.peek() {
                Token::Ident(s) => s.clone(),
                _ => break,
            };
            match word.as_str() {
                "layout" => {
                    self.advance();
                    self.parse_layout(&mut layout)?;
                }
                "flat" | "smooth" | "noperspective" | "centroid" | "invariant" | "precise"
                | "highp" | "mediump" | "lowp" => {
                    self.advance();
                }
                _ => break,
            }
        }

        let word = match self.peek() {
            Token::Ident(s) => s.clone(),
            tok => return Err(self.err(format!("expected declaration, got {:?}", tok))),
        };

        let storage = match word.as_str() {
            "in" => Storage::In,
            "out" => Storage::Out,
            "uniform" => Storage::Uniform,
            "precision" | "const" => {
                self.skip_to_semi()?;
                return Ok(());
            }
            "struct" => {
                self.skip_struct()?;
                return Ok(());
            }
            // Function definition or a plain global of some type.
            _ => {
                self.skip_function_or_global()?;
                return Ok(());
            }
        };
        self.advance(); // consume the storage keyword

        // Interpolation qualifiers may also follow the storage keyword.
        while matches!(self.peek(), Token::Ident(s)
            if matches!(s.as_str(), "flat" | "smooth" | "noperspective" | "highp" | "mediump" | "lowp"))
        {
            self.advance();
        }

        // `layout(...) in;` style stage statements carry no declaration.
        if self.peek() == &Token::Semi {
            self.advance();
            return Ok(());
        }

        let ty_word = self.expect_ident()?;

        // Block form: `uniform Name { fields } [instance];`
        if self.peek() == &Token::LBrace {
            if storage != Storage::Uniform {
                return Err(self.err("interface blocks are only supported for uniforms"));
            }
            let block = self.parse_block_body(layout, ty_word, line, col)?;
            decls.push(Decl::Block(block));
            return Ok(());
        }

        // Variable form, possibly with a comma declarator list.
        let ty = TypeName::parse(&ty_word);
        loop {
            let name = self.expect_ident()?;
            let array = self.parse_array_suffix()?;
            if self.peek() == &Token::Eq {
                self.skip_initializer()?;
            }
            decls.push(Decl::Variable(VarDecl {
                layout: layout.clone(),
                storage,
                ty: ty.clone(),
                name,
                array,
                line,
                col,
            }));
            match self.advance() {
                Token::Comma => continue,
                Token::Semi => break,
                tok => return Err(self.err(format!("expected ',' or ';', got {:?}", tok))),
            }
        }
        Ok(())
    }

    // ── Layout qualifier ──────────────────────────────────────────────────

    fn parse_layout(&mut self, layout: &mut Layout) -> Result<(), ParseError> {
        self.expect_token(&Token::LParen)?;
        loop {
            let key = self.expect_ident()?;
            let value = if self.peek() == &Token::Eq {
                self.advance();
                Some(self.expect_int()?)
            } else {
                None
            };
            match (key.as_str(), value) {
                ("location", Some(v)) => layout.location = Some(v),
                ("set", Some(v)) => layout.set = Some(v),
                ("binding", Some(v)) => layout.binding = Some(v),
                ("location" | "set" | "binding", None) => {
                    return Err(self.err(format!("layout key {:?} requires a value", key)));
                }
                (_, Some(v)) => layout.flags.push(format!("{}={}", key, v)),
                (_, None) => layout.flags.push(key),
            }
            match self.advance() {
                Token::Comma => continue,
                Token::RParen => break,
                tok => return Err(self.err(format!("expected ',' or ')', got {:?}", tok))),
            }
        }
        Ok(())
    }

    // ── Uniform blocks ────────────────────────────────────────────────────

    fn parse_block_body(
        &mut self,
        layout: Layout,
        name: String,
        line: usize,
        col: usize,
    ) -> Result<BlockDecl, ParseError> {
        self.advance(); // consume `{`
        let mut fields = Vec::new();
        loop {
            match self.peek() {
                Token::RBrace => {
                    self.advance();
                    break;
                }
                Token::Eof => return Err(self.err(format!("unclosed uniform block {:?}", name))),
                _ => {
                    while matches!(self.peek(), Token::Ident(s)
                        if matches!(s.as_str(), "highp" | "mediump" | "lowp"))
                    {
                        self.advance();
                    }
                    let ty = TypeName::parse(&self.expect_ident()?);
                    let field_name = self.expect_ident()?;
                    let array = self.parse_array_suffix()?;
                    self.expect_token(&Token::Semi)?;
                    fields.push(BlockField { ty, name: field_name, array });
                }
            }
        }
        let instance = match self.peek() {
            Token::Ident(s) => {
                let s = s.clone();
                self.advance();
                Some(s)
            }
            _ => None,
        };
        self.expect_token(&Token::Semi)?;
        Ok(BlockDecl { layout, name, fields, instance, line, col })
    }

    // ── Skipping ──────────────────────────────────────────────────────────

    fn parse_array_suffix(&mut self) -> Result<Option<u32>, ParseError> {
        if self.peek() != &Token::LBracket {
            return Ok(None);
        }
        self.advance();
        let n = match self.advance() {
            Token::Int(n) => n,
            tok => {
                return Err(self.err(format!(
                    "array size must be an integer literal, got {:?}",
                    tok
                )));
            }
        };
        self.expect_token(&Token::RBracket)?;
        Ok(Some(n))
    }

    /// Skip `= <expr>` up to (not including) the terminating `,` or `;`.
    fn skip_initializer(&mut self) -> Result<(), ParseError> {
        self.advance(); // consume `=`
        let mut depth: i32 = 0;
        loop {
            match self.peek() {
                Token::Eof => return Err(self.err("unterminated initializer")),
                Token::Semi | Token::Comma if depth == 0 => return Ok(()),
                Token::LParen | Token::LBrace | Token::LBracket => {
                    depth += 1;
                    self.advance();
                }
                Token::RParen | Token::RBrace | Token::RBracket => {
                    depth -= 1;
                    self.advance();
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// Skip everything up to and including the next `;` at depth zero.
    fn skip_to_semi(&mut self) -> Result<(), ParseError> {
        let mut depth: i32 = 0;
        loop {
            match self.advance() {
                Token::Eof => return Err(self.err("unexpected end of file")),
                Token::Semi if depth == 0 => return Ok(()),
                Token::LParen | Token::LBrace | Token::LBracket => depth += 1,
                Token::RParen | Token::RBrace | Token::RBracket => depth -= 1,
                _ => {}
            }
        }
    }

    fn skip_struct(&mut self) -> Result<(), ParseError> {
        self.advance(); // consume `struct`
        self.skip_to_semi()
    }

    /// Skip a function definition (through its balanced body) or a plain
    /// global declaration (through its `;`).
    fn skip_function_or_global(&mut self) -> Result<(), ParseError> {
        let mut depth: i32 = 0;
        loop {
            match self.advance() {
                Token::Eof => return Err(self.err("unexpected end of file")),
                Token::Semi if depth == 0 => return Ok(()),
                Token::LBrace if depth == 0 => {
                    // Function body. Skip to its matching `}` and stop.
                    let mut body: i32 = 1;
                    while body > 0 {
                        match self.advance() {
                            Token::Eof => return Err(self.err("unclosed '{' block")),
                            Token::LBrace => body += 1,
                            Token::RBrace => body -= 1,
                            _ => {}
                        }
                    }
                    return Ok(());
                }
                Token::LParen | Token::LBracket => depth += 1,
                Token::RParen | Token::RBracket => depth -= 1,
                _ => {}
            }
        }
    }
}

// ── Public parse entry point ──────────────────────────────────────────────

/// Parse a GLSL source string into a [`TranslationUnit`].
pub fn parse_str(src: &str) -> Result<TranslationUnit, ParseError> {
    let tokens = Lexer::new(src).tokenize()?;
    Parser::new(tokens).parse_unit()
}
