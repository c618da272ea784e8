//! Source literals: the dynamic values that appear as constant values,
//! property and parameter defaults, and generator arguments.
//!
//! [`export_value`] renders a [`Literal`] as parsable PHP source text and
//! [`parse_literal`] reads that text back.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::DomainError;

/// A value with a source-literal form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// Ordered key/value entries. Integer keys render positionally.
    Array(Vec<(ArrayKey, Literal)>),
    /// An unevaluated constant expression such as `self::LIMIT` or `PHP_EOL`.
    Constant(String),
    /// An object instance of the named class. Objects have no literal form.
    Object(String),
}

/// Key of an array entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArrayKey {
    Index(i64),
    Name(String),
}

impl fmt::Display for ArrayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "{i}"),
            Self::Name(n) => f.write_str(n),
        }
    }
}

impl From<&str> for ArrayKey {
    fn from(key: &str) -> Self {
        normalize_key(key)
    }
}

impl From<i64> for ArrayKey {
    fn from(index: i64) -> Self {
        Self::Index(index)
    }
}

/// Decimal strings without leading zeros become integer keys.
fn normalize_key(key: &str) -> ArrayKey {
    match key.parse::<i64>() {
        Ok(i) if i.to_string() == key => ArrayKey::Index(i),
        _ => ArrayKey::Name(key.to_string()),
    }
}

impl Literal {
    /// An empty array.
    pub fn array() -> Self {
        Self::Array(Vec::new())
    }

    /// A sequential array of the given values.
    pub fn list<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Literal>,
    {
        let mut array = Self::array();
        for value in values {
            array.push(value.into());
        }
        array
    }

    /// An associative array of the given entries, in order.
    pub fn map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<ArrayKey>,
        V: Into<Literal>,
    {
        let mut array = Self::array();
        for (key, value) in entries {
            array.insert(key.into(), value.into());
        }
        array
    }

    /// Append with the next free integer key. Non-arrays become arrays first.
    pub fn push(&mut self, value: Literal) {
        let entries = self.entries_mut();
        let next = next_index(entries);
        entries.push((ArrayKey::Index(next), value));
    }

    /// Insert or replace the entry for `key`, keeping its position when it exists.
    pub fn insert(&mut self, key: ArrayKey, value: Literal) {
        let entries = self.entries_mut();
        match entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => entries.push((key, value)),
        }
    }

    /// Set a nested value addressed by `path`, creating intermediate arrays
    /// and replacing scalars that stand in the way.
    pub fn set_path(&mut self, path: &[&str], value: Literal) {
        match path {
            [] => *self = value,
            [key] => self.insert(ArrayKey::from(*key), value),
            [key, rest @ ..] => {
                let key = ArrayKey::from(*key);
                let entries = self.entries_mut();
                let position = match entries.iter().position(|(k, _)| *k == key) {
                    Some(position) => position,
                    None => {
                        entries.push((key, Literal::array()));
                        entries.len() - 1
                    }
                };
                entries[position].1.set_path(rest, value);
            }
        }
    }

    /// Look up a direct entry of an array.
    pub fn get(&self, key: &str) -> Option<&Literal> {
        let key = ArrayKey::from(key);
        match self {
            Self::Array(entries) => entries.iter().find(|(k, _)| *k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Look up a nested value by dot-separated path.
    pub fn get_path(&self, path: &str) -> Option<&Literal> {
        path.split('.')
            .try_fold(self, |current, segment| current.get(segment))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Int(i) => Some(*i != 0),
            Self::Str(s) if s.eq_ignore_ascii_case("true") => Some(true),
            Self::Str(s) if s.eq_ignore_ascii_case("false") => Some(false),
            _ => None,
        }
    }

    /// Textual form of a scalar argument: strings as-is, numbers and
    /// constant names formatted. Arrays, null and objects have none.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Str(s) | Self::Constant(s) => Some(s.clone()),
            Self::Int(i) => Some(i.to_string()),
            Self::Float(f) => Some(f.to_string()),
            Self::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Entries of an array literal; empty for anything else.
    pub fn entries(&self) -> &[(ArrayKey, Literal)] {
        match self {
            Self::Array(entries) => entries,
            _ => &[],
        }
    }

    fn entries_mut(&mut self) -> &mut Vec<(ArrayKey, Literal)> {
        if !self.is_array() {
            *self = Self::array();
        }
        match self {
            Self::Array(entries) => entries,
            _ => unreachable!("converted to an array above"),
        }
    }

    /// Export without indentation.
    pub fn export(&self) -> String {
        export_value(self, false, 1)
    }

    /// Normalized type name of this value.
    pub fn infer_type(&self) -> &'static str {
        infer_type(self)
    }

    /// Convert into a JSON value for template parameters.
    ///
    /// Arrays whose keys are exactly `0..n` become JSON arrays; all other
    /// arrays become objects. Constants export as their expression text.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;
        match self {
            Self::Null | Self::Object(_) => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Int(i) => Value::from(*i),
            Self::Float(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Self::Str(s) | Self::Constant(s) => Value::String(s.clone()),
            Self::Array(entries) => {
                let sequential = entries
                    .iter()
                    .enumerate()
                    .all(|(i, (k, _))| *k == ArrayKey::Index(i as i64));
                if sequential {
                    Value::Array(entries.iter().map(|(_, v)| v.to_json()).collect())
                } else {
                    Value::Object(
                        entries
                            .iter()
                            .map(|(k, v)| (k.to_string(), v.to_json()))
                            .collect(),
                    )
                }
            }
        }
    }

    /// Build a literal from a JSON value. Object key order is preserved as
    /// iterated.
    pub fn from_json(value: &serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => n
                .as_i64()
                .map(Self::Int)
                .or_else(|| n.as_f64().map(Self::Float))
                .unwrap_or(Self::Null),
            Value::String(s) => Self::Str(s.clone()),
            Value::Array(items) => Self::list(items.iter().map(Self::from_json)),
            Value::Object(map) => {
                Self::map(map.iter().map(|(k, v)| (k.as_str(), Self::from_json(v))))
            }
        }
    }
}

fn next_index(entries: &[(ArrayKey, Literal)]) -> i64 {
    entries
        .iter()
        .filter_map(|(k, _)| match k {
            ArrayKey::Index(i) => Some(*i + 1),
            ArrayKey::Name(_) => None,
        })
        .max()
        .unwrap_or(0)
        .max(0)
}

impl From<bool> for Literal {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Literal {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Literal {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Literal {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl<T: Into<Literal>> From<Option<T>> for Literal {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.export())
    }
}

// ============================================================================
// Export
// ============================================================================

/// Render a value as parsable source literal text.
///
/// Objects export as `NULL`. Booleans and null use their upper-case keywords.
/// Arrays render as `array(...)` with string keys as `'key' => value` and
/// integer keys positionally. With `indent`, every entry goes on its own line
/// prefixed by `level` tabs, followed by a trailing comma, and the closing
/// parenthesis is dedented one level.
pub fn export_value(value: &Literal, indent: bool, level: usize) -> String {
    let entries = match value {
        Literal::Array(entries) => entries,
        scalar => return export_scalar(scalar),
    };

    let list: Vec<String> = entries
        .iter()
        .map(|(key, entry)| {
            let entry_level = if entry.is_array() { level + 1 } else { level };
            let rendered = export_value(entry, indent, entry_level);
            match key {
                ArrayKey::Name(name) => format!("{} => {}", quote(name), rendered),
                ArrayKey::Index(_) => rendered,
            }
        })
        .collect();

    if list.is_empty() {
        return "array()".to_string();
    }

    if indent {
        let tabs = "\t".repeat(level);
        format!(
            "array(\n{tabs}{},\n{})",
            list.join(&format!(",\n{tabs}")),
            "\t".repeat(level.saturating_sub(1))
        )
    } else {
        format!("array({})", list.join(", "))
    }
}

fn export_scalar(value: &Literal) -> String {
    match value {
        Literal::Null | Literal::Object(_) => "NULL".to_string(),
        Literal::Bool(true) => "TRUE".to_string(),
        Literal::Bool(false) => "FALSE".to_string(),
        Literal::Int(i) => i.to_string(),
        Literal::Float(f) if f.is_nan() => "NAN".to_string(),
        Literal::Float(f) if f.is_infinite() => {
            if *f > 0.0 { "INF" } else { "-INF" }.to_string()
        }
        Literal::Float(f) => format!("{f:?}"),
        Literal::Str(s) => quote(s),
        Literal::Constant(expr) => expr.clone(),
        Literal::Array(_) => export_value(value, false, 1),
    }
}

fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// Map a value to the normalized type vocabulary used in metadata:
/// `any`, `bool`, `int`, `float`, `string`, `array`, `object`.
pub fn infer_type(value: &Literal) -> &'static str {
    match value {
        Literal::Null | Literal::Constant(_) => "any",
        Literal::Bool(_) => "bool",
        Literal::Int(_) => "int",
        Literal::Float(_) => "float",
        Literal::Str(_) => "string",
        Literal::Array(_) => "array",
        Literal::Object(_) => "object",
    }
}

// ============================================================================
// Parse
// ============================================================================

/// Parse a complete literal. Trailing text other than whitespace is an error.
pub fn parse_literal(text: &str) -> Result<Literal, DomainError> {
    let (value, consumed) = parse_prefix(text)?;
    let rest = &text[consumed..];
    if rest.trim().is_empty() {
        Ok(value)
    } else {
        Err(DomainError::InvalidLiteral {
            position: consumed + (rest.len() - rest.trim_start().len()),
            reason: "unexpected trailing input".into(),
        })
    }
}

/// Parse one literal from the start of `text`, returning it together with the
/// number of bytes consumed (leading whitespace included).
pub fn parse_prefix(text: &str) -> Result<(Literal, usize), DomainError> {
    let mut parser = Parser { src: text, pos: 0 };
    let value = parser.value()?;
    Ok((value, parser.pos))
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl Parser<'_> {
    fn rest(&self) -> &str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    fn error(&self, reason: impl Into<String>) -> DomainError {
        DomainError::InvalidLiteral {
            position: self.pos,
            reason: reason.into(),
        }
    }

    fn skip_ws(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn eat(&mut self, token: &str) -> bool {
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn value(&mut self) -> Result<Literal, DomainError> {
        self.skip_ws();
        match self.peek() {
            None => Err(self.error("unexpected end of input")),
            Some(b'[') => {
                self.pos += 1;
                self.array(b']')
            }
            Some(b'\'') => self.single_quoted().map(Literal::Str),
            Some(b'"') => self.double_quoted().map(Literal::Str),
            Some(c) if c == b'-' || c == b'+' || c == b'.' || c.is_ascii_digit() => {
                self.number()
            }
            Some(c) if c == b'_' || c == b'\\' || c.is_ascii_alphabetic() => self.word(),
            Some(c) => Err(self.error(format!("unexpected character '{}'", c as char))),
        }
    }

    fn array(&mut self, close: u8) -> Result<Literal, DomainError> {
        let mut array = Literal::array();
        loop {
            self.skip_ws();
            if self.peek() == Some(close) {
                self.pos += 1;
                return Ok(array);
            }

            let first = self.value()?;
            self.skip_ws();
            if self.eat("=>") {
                let key = self.key_from(first)?;
                let value = self.value()?;
                array.insert(key, value);
            } else {
                array.push(first);
            }

            self.skip_ws();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(c) if c == close => {}
                Some(c) => return Err(self.error(format!("expected ',' but found '{}'", c as char))),
                None => return Err(self.error("unterminated array")),
            }
        }
    }

    fn key_from(&self, key: Literal) -> Result<ArrayKey, DomainError> {
        match key {
            Literal::Int(i) => Ok(ArrayKey::Index(i)),
            Literal::Str(s) => Ok(normalize_key(&s)),
            Literal::Bool(b) => Ok(ArrayKey::Index(i64::from(b))),
            Literal::Float(f) => Ok(ArrayKey::Index(f.trunc() as i64)),
            Literal::Null => Ok(ArrayKey::Name(String::new())),
            Literal::Constant(c) => Ok(ArrayKey::Name(c)),
            Literal::Array(_) | Literal::Object(_) => Err(self.error("illegal array key")),
        }
    }

    fn single_quoted(&mut self) -> Result<String, DomainError> {
        let src = self.src;
        let start = self.pos;
        let mut out = String::new();
        let mut chars = src[start + 1..].char_indices();
        while let Some((offset, c)) = chars.next() {
            match c {
                '\'' => {
                    self.pos = start + offset + 2;
                    return Ok(out);
                }
                '\\' => match chars.next() {
                    Some((_, next @ ('\\' | '\''))) => out.push(next),
                    Some((_, next)) => {
                        out.push('\\');
                        out.push(next);
                    }
                    None => break,
                },
                other => out.push(other),
            }
        }
        Err(self.error("unterminated string"))
    }

    fn double_quoted(&mut self) -> Result<String, DomainError> {
        let src = self.src;
        let start = self.pos;
        let mut out = String::new();
        let mut chars = src[start + 1..].char_indices();
        while let Some((offset, c)) = chars.next() {
            match c {
                '"' => {
                    self.pos = start + offset + 2;
                    return Ok(out);
                }
                '\\' => match chars.next() {
                    Some((_, 'n')) => out.push('\n'),
                    Some((_, 't')) => out.push('\t'),
                    Some((_, 'r')) => out.push('\r'),
                    Some((_, next @ ('\\' | '"' | '$'))) => out.push(next),
                    Some((_, next)) => {
                        out.push('\\');
                        out.push(next);
                    }
                    None => break,
                },
                other => out.push(other),
            }
        }
        Err(self.error("unterminated string"))
    }

    fn number(&mut self) -> Result<Literal, DomainError> {
        let src = self.src;
        let start = self.pos;
        let negative = match self.peek() {
            Some(b'-') => {
                self.pos += 1;
                true
            }
            Some(b'+') => {
                self.pos += 1;
                false
            }
            _ => false,
        };

        let rest = &src[self.pos..];
        if rest.starts_with("0x") || rest.starts_with("0X") {
            let digits: String = rest[2..]
                .chars()
                .take_while(|c| c.is_ascii_hexdigit())
                .collect();
            self.pos += 2 + digits.len();
            let value =
                i64::from_str_radix(&digits, 16).map_err(|e| self.error(e.to_string()))?;
            return Ok(Literal::Int(if negative { -value } else { value }));
        }

        if rest.starts_with("INF") {
            self.pos += 3;
            return Ok(Literal::Float(if negative {
                f64::NEG_INFINITY
            } else {
                f64::INFINITY
            }));
        }

        let bytes = src.as_bytes();
        let mut is_float = false;
        while let Some(&c) = bytes.get(self.pos) {
            match c {
                b'0'..=b'9' | b'_' => self.pos += 1,
                b'.' => {
                    is_float = true;
                    self.pos += 1;
                }
                b'e' | b'E' => {
                    is_float = true;
                    self.pos += 1;
                    if matches!(bytes.get(self.pos), Some(b'-' | b'+')) {
                        self.pos += 1;
                    }
                }
                _ => break,
            }
        }

        let text: String = src[start..self.pos]
            .chars()
            .filter(|c| *c != '_' && *c != '+')
            .collect();
        if text.is_empty() || text == "-" || text == "." {
            self.pos = start;
            return Err(self.error("malformed number"));
        }

        if !is_float {
            if let Ok(i) = text.parse::<i64>() {
                return Ok(Literal::Int(i));
            }
        }
        text.parse::<f64>()
            .map(Literal::Float)
            .map_err(|e| DomainError::InvalidLiteral {
                position: start,
                reason: e.to_string(),
            })
    }

    fn identifier(&mut self) -> String {
        let src = self.src;
        let start = self.pos;
        let len = src[start..]
            .bytes()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == b'_' || *c == b'\\')
            .count();
        self.pos += len;
        src[start..self.pos].to_string()
    }

    fn word(&mut self) -> Result<Literal, DomainError> {
        let start = self.pos;
        let word = self.identifier();

        match word.to_ascii_lowercase().as_str() {
            "null" => return Ok(Literal::Null),
            "true" => return Ok(Literal::Bool(true)),
            "false" => return Ok(Literal::Bool(false)),
            "nan" => return Ok(Literal::Float(f64::NAN)),
            "inf" => return Ok(Literal::Float(f64::INFINITY)),
            "array" => {
                self.skip_ws();
                if self.eat("(") {
                    return self.array(b')');
                }
                self.pos = start;
                return Err(self.error("expected '(' after array"));
            }
            "new" => {
                self.skip_ws();
                let class = self.identifier();
                if class.is_empty() {
                    return Err(self.error("expected class name after new"));
                }
                self.skip_ws();
                if self.peek() == Some(b'(') {
                    self.skip_balanced()?;
                }
                return Ok(Literal::Object(class));
            }
            _ => {}
        }

        if self.eat("::") {
            let member = self.identifier();
            if member.is_empty() {
                return Err(self.error("expected constant name after '::'"));
            }
            return Ok(Literal::Constant(format!("{word}::{member}")));
        }
        Ok(Literal::Constant(word))
    }

    fn skip_balanced(&mut self) -> Result<(), DomainError> {
        let mut depth = 0usize;
        while let Some(c) = self.peek() {
            match c {
                b'(' => depth += 1,
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        self.pos += 1;
                        return Ok(());
                    }
                }
                b'\'' => {
                    self.single_quoted()?;
                    continue;
                }
                b'"' => {
                    self.double_quoted()?;
                    continue;
                }
                _ => {}
            }
            self.pos += 1;
        }
        Err(self.error("unbalanced parentheses"))
    }
}
