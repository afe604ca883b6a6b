use crate::patterns::ValuePattern;

const NULL_TOKEN: &str = "NULL";

/// One column of a dumped table: how its literal looks and how to clean it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub name: &'static str,
    pub pattern: ValuePattern,
    pub nullable: bool,
    pub unquote: bool,
    pub unescape: bool,
}

/// A raw capture, split into the two shapes a nullable column can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawValue<'a> {
    Null,
    Literal(&'a str),
}

impl ColumnDescriptor {
    pub const fn new(name: &'static str, pattern: ValuePattern) -> Self {
        Self {
            name,
            pattern,
            nullable: false,
            unquote: false,
            unescape: false,
        }
    }

    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub const fn unquoted(mut self) -> Self {
        self.unquote = true;
        self
    }

    /// Shorthand for string columns that are both unquoted and unescaped.
    pub const fn text(mut self) -> Self {
        self.unquote = true;
        self.unescape = true;
        self
    }

    /// Named capture group for this column.
    pub fn build_group_pattern(&self) -> String {
        if self.nullable {
            format!("(?P<{}>{}|(?:{}))", self.name, NULL_TOKEN, self.pattern.fragment())
        } else {
            format!("(?P<{}>{})", self.name, self.pattern.fragment())
        }
    }

    pub fn classify<'a>(&self, raw: &'a str) -> RawValue<'a> {
        if self.nullable && raw == NULL_TOKEN {
            RawValue::Null
        } else {
            RawValue::Literal(raw)
        }
    }

    /// Turns a raw capture into its CSV value. Unquoting runs before unescaping so
    /// that an escaped quote next to the delimiter survives as a literal quote.
    pub fn clean(&self, raw: &str) -> String {
        let literal = match self.classify(raw) {
            RawValue::Null => return String::new(),
            RawValue::Literal(s) => s,
        };
        let literal = if self.unquote {
            unquote(literal)
        } else {
            literal
        };
        if self.unescape {
            unescape(literal)
        } else {
            literal.to_string()
        }
    }
}

fn unquote(s: &str) -> &str {
    let s = s.strip_prefix('\'').unwrap_or(s);
    s.strip_suffix('\'').unwrap_or(s)
}

/// Reverses MySQL backslash escaping for quotes and backslashes only.
fn unescape(s: &str) -> String {
    if !s.contains('\\') {
        return s.to_string();
    }
    s.replace("\\'", "'")
        .replace("\\\"", "\"")
        .replace("\\\\", "\\")
}
