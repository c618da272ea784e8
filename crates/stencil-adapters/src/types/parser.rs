//! Declaration extraction from PHP source text.
//!
//! This is not a PHP parser. It recognizes class and interface declarations,
//! their headers, constants, properties and method signatures, and skips
//! everything else (method bodies, statements, strings, comments).

use std::path::Path;

use thiserror::Error;

use stencil_core::domain::{
    ConstantDefinition, Literal, MethodDefinition, ParamDefinition, PropertyDefinition,
    TypeDefinition, TypeKind, parse_prefix,
};

/// A declaration the scanner could not make sense of.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {reason}")]
pub struct ParseError {
    pub line: usize,
    pub reason: String,
}

/// Extract every type declared in `src`.
pub fn parse_source(src: &str, file: Option<&Path>) -> Result<Vec<TypeDefinition>, ParseError> {
    let mut scanner = Scanner { src, pos: 0 };
    let mut types = scanner.declarations()?;
    if let Some(file) = file {
        for def in &mut types {
            def.file = Some(file.to_path_buf());
        }
    }
    Ok(types)
}

const MEMBER_MODIFIERS: [&str; 7] = [
    "public",
    "protected",
    "private",
    "static",
    "abstract",
    "final",
    "readonly",
];

struct Scanner<'a> {
    src: &'a str,
    pos: usize,
}

fn is_word_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_' || c == b'\\' || c >= 0x80
}

fn is_word_char(c: u8) -> bool {
    is_word_start(c) || c.is_ascii_digit()
}

impl<'a> Scanner<'a> {
    fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.src.as_bytes().get(self.pos + offset).copied()
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn error(&self, reason: &str) -> ParseError {
        ParseError {
            line: self.src[..self.pos].matches('\n').count() + 1,
            reason: reason.to_string(),
        }
    }

    // -------------------------------------------------------------------------
    // Lexical helpers
    // -------------------------------------------------------------------------

    /// Skip whitespace, comments and attributes. Returns the last doc
    /// comment passed over.
    fn skip_trivia(&mut self) -> Option<String> {
        let mut doc = None;
        loop {
            match self.peek() {
                Some(c) if c.is_ascii_whitespace() => self.pos += 1,
                Some(b'#') if self.peek_at(1) == Some(b'[') => {
                    self.pos += 1;
                    self.skip_balanced(b'[', b']');
                }
                Some(b'#') => self.skip_line(),
                Some(b'/') if self.peek_at(1) == Some(b'/') => self.skip_line(),
                Some(b'/') if self.peek_at(1) == Some(b'*') => {
                    let start = self.pos;
                    let end = self.rest()[2..]
                        .find("*/")
                        .map_or(self.src.len(), |i| self.pos + 2 + i + 2);
                    self.pos = end;
                    let comment = &self.src[start..end];
                    if comment.starts_with("/**") {
                        doc = Some(comment.to_string());
                    }
                }
                _ => return doc,
            }
        }
    }

    fn skip_line(&mut self) {
        self.pos = self
            .rest()
            .find('\n')
            .map_or(self.src.len(), |i| self.pos + i + 1);
    }

    fn skip_string(&mut self) {
        let Some(quote) = self.peek() else { return };
        self.pos += 1;
        while let Some(c) = self.peek() {
            self.pos += 1;
            if c == b'\\' {
                self.pos += 1;
            } else if c == quote {
                return;
            }
        }
        self.pos = self.pos.min(self.src.len());
    }

    fn word(&mut self) -> Option<&'a str> {
        let start = self.pos;
        while self.peek().is_some_and(is_word_char) {
            self.pos += 1;
        }
        (self.pos > start).then(|| &self.src[start..self.pos])
    }

    /// From an opening delimiter, skip past its matching close. Returns
    /// `false` when the input ends first.
    fn skip_balanced(&mut self, open: u8, close: u8) -> bool {
        let mut depth = 0usize;
        while let Some(c) = self.peek() {
            match c {
                b'\'' | b'"' => {
                    self.skip_string();
                    continue;
                }
                b'/' | b'#' => {
                    let before = self.pos;
                    self.skip_trivia();
                    if self.pos > before {
                        continue;
                    }
                }
                _ if c == open => depth += 1,
                _ if c == close => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        self.pos += 1;
                        return true;
                    }
                }
                _ => {}
            }
            self.pos += 1;
        }
        false
    }

    /// Text up to (not including) the next `,`, `;` or `)` outside brackets.
    fn expression(&mut self) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            match c {
                b',' | b';' | b')' => break,
                b'(' => {
                    self.skip_balanced(b'(', b')');
                    continue;
                }
                b'[' => {
                    self.skip_balanced(b'[', b']');
                    continue;
                }
                b'\'' | b'"' => {
                    self.skip_string();
                    continue;
                }
                _ => self.pos += 1,
            }
        }
        self.src[start..self.pos].trim()
    }

    /// A default value: a literal when the whole expression is one,
    /// otherwise the expression text as a constant.
    fn default_value(&mut self) -> Literal {
        self.skip_trivia();
        let start = self.pos;
        if let Ok((value, used)) = parse_prefix(self.rest()) {
            self.pos += used;
            self.skip_trivia();
            if matches!(self.peek(), Some(b',' | b';' | b')') | None) {
                return value;
            }
            self.pos = start;
        }
        Literal::Constant(self.expression().to_string())
    }

    fn skip_statement(&mut self) {
        while let Some(c) = self.peek() {
            match c {
                b';' => {
                    self.pos += 1;
                    return;
                }
                b'{' => {
                    self.skip_balanced(b'{', b'}');
                    return;
                }
                b'}' => return,
                b'(' => {
                    self.skip_balanced(b'(', b')');
                    continue;
                }
                b'\'' | b'"' => {
                    self.skip_string();
                    continue;
                }
                _ => self.pos += 1,
            }
        }
    }

    fn name_list(&mut self) -> Vec<String> {
        let mut names = Vec::new();
        loop {
            self.skip_trivia();
            match self.word() {
                Some(name) => names.push(name.trim_start_matches('\\').to_string()),
                None => return names,
            }
            self.skip_trivia();
            if self.peek() == Some(b',') {
                self.pos += 1;
            } else {
                return names;
            }
        }
    }

    // -------------------------------------------------------------------------
    // Declarations
    // -------------------------------------------------------------------------

    fn declarations(&mut self) -> Result<Vec<TypeDefinition>, ParseError> {
        let mut types = Vec::new();
        let mut modifiers: Vec<String> = Vec::new();
        let mut doc = None;

        loop {
            if let Some(comment) = self.skip_trivia() {
                doc = Some(comment);
            }
            let Some(c) = self.peek() else { break };

            if is_word_start(c) {
                let word = self.word().unwrap_or_default().to_ascii_lowercase();
                match word.as_str() {
                    "abstract" | "final" | "readonly" => modifiers.push(word),
                    "class" | "interface" => {
                        let kind = if word == "class" {
                            TypeKind::Class
                        } else {
                            TypeKind::Interface
                        };
                        let def =
                            self.type_declaration(kind, std::mem::take(&mut modifiers), doc.take())?;
                        types.push(def);
                    }
                    _ => {
                        modifiers.clear();
                        doc = None;
                    }
                }
            } else if c == b':' && self.peek_at(1) == Some(b':') {
                // `Foo::class` is not a declaration
                self.pos += 2;
                self.word();
            } else if c == b'\'' || c == b'"' {
                self.skip_string();
            } else if c == b'{' {
                self.skip_balanced(b'{', b'}');
                modifiers.clear();
                doc = None;
            } else {
                self.pos += 1;
            }
        }
        Ok(types)
    }

    fn type_declaration(
        &mut self,
        kind: TypeKind,
        modifiers: Vec<String>,
        doc_comment: Option<String>,
    ) -> Result<TypeDefinition, ParseError> {
        self.skip_trivia();
        let name = self
            .word()
            .ok_or_else(|| self.error("expected a type name"))?;

        let mut def = TypeDefinition::new(name, kind);
        def.modifiers = modifiers;
        def.doc_comment = doc_comment;

        loop {
            self.skip_trivia();
            match self.peek() {
                Some(b'{') => break,
                None => return Err(self.error("unterminated declaration header")),
                Some(c) if is_word_start(c) => {
                    let word = self.word().unwrap_or_default().to_ascii_lowercase();
                    match (word.as_str(), kind) {
                        ("extends", TypeKind::Class) => def.parent = self.name_list().into_iter().next(),
                        ("extends", TypeKind::Interface) | ("implements", _) => {
                            def.interfaces.extend(self.name_list())
                        }
                        _ => {}
                    }
                }
                Some(_) => self.pos += 1,
            }
        }

        self.pos += 1;
        self.type_body(&mut def)?;
        Ok(def)
    }

    fn type_body(&mut self, def: &mut TypeDefinition) -> Result<(), ParseError> {
        let mut modifiers: Vec<String> = Vec::new();
        let mut doc = None;

        loop {
            if let Some(comment) = self.skip_trivia() {
                doc = Some(comment);
            }
            match self.peek() {
                None => return Err(self.error(&format!("unterminated body of {}", def.name))),
                Some(b'}') => {
                    self.pos += 1;
                    return Ok(());
                }
                Some(b'$') => {
                    self.pos += 1;
                    self.properties(def, std::mem::take(&mut modifiers), doc.take())?;
                }
                Some(b';') => {
                    self.pos += 1;
                    modifiers.clear();
                    doc = None;
                }
                Some(b'{') => {
                    self.skip_balanced(b'{', b'}');
                }
                Some(c) if is_word_start(c) => {
                    let word = self.word().unwrap_or_default().to_ascii_lowercase();
                    match word.as_str() {
                        w if MEMBER_MODIFIERS.contains(&w) => modifiers.push(word),
                        "var" => modifiers.push("public".into()),
                        "const" => {
                            self.constants(def)?;
                            modifiers.clear();
                            doc = None;
                        }
                        "function" => {
                            let method = self.method(std::mem::take(&mut modifiers), doc.take())?;
                            def.methods.push(method);
                        }
                        "use" | "case" => {
                            self.skip_statement();
                            modifiers.clear();
                            doc = None;
                        }
                        // property type
                        _ => {}
                    }
                }
                Some(_) => self.pos += 1,
            }
        }
    }

    fn constants(&mut self, def: &mut TypeDefinition) -> Result<(), ParseError> {
        loop {
            let mut name = None;
            loop {
                self.skip_trivia();
                match self.word() {
                    // the last word before `=` is the name; earlier ones are a type
                    Some(word) => name = Some(word),
                    None => break,
                }
            }
            let name = name.ok_or_else(|| self.error("expected a constant name"))?;

            self.skip_trivia();
            if self.peek() != Some(b'=') {
                return Err(self.error(&format!("expected '=' after constant {name}")));
            }
            self.pos += 1;
            let value = self.default_value();
            def.constants.push(ConstantDefinition {
                name: name.to_string(),
                value,
            });

            self.skip_trivia();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b';') => {
                    self.pos += 1;
                    return Ok(());
                }
                _ => return Err(self.error(&format!("expected ';' after constant {name}"))),
            }
        }
    }

    /// Properties after the first `$`, which has been consumed.
    fn properties(
        &mut self,
        def: &mut TypeDefinition,
        modifiers: Vec<String>,
        doc_comment: Option<String>,
    ) -> Result<(), ParseError> {
        let modifiers = if modifiers.is_empty() {
            vec!["public".to_string()]
        } else {
            modifiers
        };

        loop {
            let name = self
                .word()
                .ok_or_else(|| self.error("expected a property name"))?;
            self.skip_trivia();

            let default = if self.peek() == Some(b'=') {
                self.pos += 1;
                Some(self.default_value())
            } else {
                None
            };
            def.properties.push(PropertyDefinition {
                name: name.to_string(),
                modifiers: modifiers.clone(),
                default,
                doc_comment: doc_comment.clone(),
            });

            self.skip_trivia();
            match self.peek() {
                Some(b',') => {
                    self.pos += 1;
                    self.skip_trivia();
                    if self.peek() == Some(b'$') {
                        self.pos += 1;
                    }
                }
                Some(b';') => {
                    self.pos += 1;
                    return Ok(());
                }
                _ => return Err(self.error(&format!("expected ';' after property ${name}"))),
            }
        }
    }

    /// A method after `function`, including its body if present.
    fn method(
        &mut self,
        modifiers: Vec<String>,
        doc_comment: Option<String>,
    ) -> Result<MethodDefinition, ParseError> {
        self.skip_trivia();
        let by_ref = self.peek() == Some(b'&');
        if by_ref {
            self.pos += 1;
            self.skip_trivia();
        }
        let name = self
            .word()
            .ok_or_else(|| self.error("expected a method name"))?;

        self.skip_trivia();
        if self.peek() != Some(b'(') {
            return Err(self.error(&format!("expected '(' after method {name}")));
        }
        let params_start = self.pos + 1;
        if !self.skip_balanced(b'(', b')') {
            return Err(self.error(&format!("unterminated parameter list of {name}")));
        }
        let params_src = &self.src[params_start..self.pos - 1];
        let params = parse_params(params_src).map_err(|e| self.error(&e))?;

        // return type, then body or `;`
        self.skip_statement();

        Ok(MethodDefinition {
            name: name.to_string(),
            modifiers,
            by_ref,
            params,
            doc_comment,
        })
    }
}

fn parse_params(src: &str) -> Result<Vec<ParamDefinition>, String> {
    let mut scanner = Scanner { src, pos: 0 };
    let mut params = Vec::new();

    loop {
        scanner.skip_trivia();
        if scanner.peek().is_none() {
            return Ok(params);
        }

        let mut hint: Option<String> = None;
        let mut by_ref = false;
        let name = loop {
            scanner.skip_trivia();
            match scanner.peek() {
                Some(b'&') => {
                    by_ref = true;
                    scanner.pos += 1;
                }
                Some(b'.') => scanner.pos += 1,
                Some(b'$') => {
                    scanner.pos += 1;
                    break scanner
                        .word()
                        .ok_or_else(|| "expected a parameter name".to_string())?;
                }
                Some(b'?' | b'|') => {
                    let c = scanner.src.as_bytes()[scanner.pos] as char;
                    hint.get_or_insert_with(String::new).push(c);
                    scanner.pos += 1;
                }
                Some(c) if is_word_start(c) => {
                    let word = scanner.word().unwrap_or_default();
                    let lower = word.to_ascii_lowercase();
                    // constructor promotion
                    if MEMBER_MODIFIERS.contains(&lower.as_str()) {
                        continue;
                    }
                    hint.get_or_insert_with(String::new).push_str(word);
                }
                _ => return Err(format!("unexpected input in parameters: {}", scanner.rest())),
            }
        };

        scanner.skip_trivia();
        let default = if scanner.peek() == Some(b'=') {
            scanner.pos += 1;
            Some(scanner.default_value())
        } else {
            None
        };

        params.push(ParamDefinition {
            name: name.to_string(),
            hint,
            default,
            by_ref,
        });

        scanner.skip_trivia();
        match scanner.peek() {
            Some(b',') => scanner.pos += 1,
            None => return Ok(params),
            _ => return Err(format!("unexpected input in parameters: {}", scanner.rest())),
        }
    }
}
