//! Primitive value grammars for the SQL literals that show up in MediaWiki dumps.
//!
//! Each [`ValuePattern`] renders to a regular-expression fragment with no capture
//! groups of its own, so fragments can be dropped into a larger row grammar
//! without disturbing its named groups.

use std::fmt;

/// Lexical shape of one SQL literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValuePattern {
    /// `-12`, `+7`, `0`
    Digits,
    /// `'20240101000000'`
    QuotedDigits,
    /// `0.5`, `-.25`, `3.`; every part is optional as in MySQL output
    Float,
    /// `'Foo\'s \\ bar'`
    EscapedString,
    /// `'anything'`, non-greedy and blind to escapes
    AnyQuoted,
    /// `'2024-01-15 10:30:00'`
    Timestamp,
    /// One of a closed set of quoted tokens, e.g. `'page'`
    QuotedEnum(&'static [&'static str]),
}

impl ValuePattern {
    pub const fn digits() -> Self {
        Self::Digits
    }

    pub const fn quoted_digits() -> Self {
        Self::QuotedDigits
    }

    pub const fn float_literal() -> Self {
        Self::Float
    }

    pub const fn escaped_string() -> Self {
        Self::EscapedString
    }

    pub const fn any_quoted() -> Self {
        Self::AnyQuoted
    }

    pub const fn timestamp() -> Self {
        Self::Timestamp
    }

    pub const fn quoted_enum(tokens: &'static [&'static str]) -> Self {
        Self::QuotedEnum(tokens)
    }

    /// Regex source for this literal shape.
    pub fn fragment(&self) -> String {
        match self {
            Self::Digits => r"[-+]?[0-9]+".to_string(),
            Self::QuotedDigits => r"'[-+]?[0-9]+'".to_string(),
            Self::Float => r"[-+]?[0-9]*\.?[0-9]*".to_string(),
            // Unrolled loop: runs of ordinary characters separated by escape pairs,
            // so `\'` never closes the literal and `\\` is consumed as one unit.
            Self::EscapedString => r"'[^'\\]*(?:\\.[^'\\]*)*'".to_string(),
            Self::AnyQuoted => r"'.*?'".to_string(),
            Self::Timestamp => {
                r"'[0-9]{4}-[0-9]{2}-[0-9]{2} [0-9]{2}:[0-9]{2}:[0-9]{2}'".to_string()
            }
            Self::QuotedEnum(tokens) => {
                let alternatives = tokens
                    .iter()
                    .map(|t| regex::escape(t))
                    .collect::<Vec<_>>()
                    .join("|");
                format!("'(?:{})'", alternatives)
            }
        }
    }
}

impl fmt::Display for ValuePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fragment())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    fn full_match(pattern: ValuePattern, text: &str) -> bool {
        Regex::new(&format!("^(?:{})$", pattern.fragment()))
            .unwrap()
            .is_match(text)
    }

    #[test]
    fn fragments_are_stable() {
        assert_eq!(ValuePattern::digits().fragment(), ValuePattern::digits().fragment());
        let kinds = ValuePattern::quoted_enum(&["page", "subcat"]);
        assert_eq!(kinds.fragment(), kinds.fragment());
        assert_eq!(kinds.to_string(), "'(?:page|subcat)'");
    }

    #[test]
    fn digits_accept_signs() {
        assert!(full_match(ValuePattern::digits(), "42"));
        assert!(full_match(ValuePattern::digits(), "-42"));
        assert!(full_match(ValuePattern::digits(), "+0"));
        assert!(!full_match(ValuePattern::digits(), ""));
        assert!(!full_match(ValuePattern::digits(), "'42'"));
        assert!(!full_match(ValuePattern::digits(), "٣"));
    }

    #[test]
    fn quoted_digits_require_quotes() {
        assert!(full_match(ValuePattern::quoted_digits(), "'20240101000000'"));
        assert!(!full_match(ValuePattern::quoted_digits(), "20240101000000"));
        assert!(!full_match(ValuePattern::quoted_digits(), "'2024a'"));
    }

    #[test]
    fn float_is_permissive() {
        for text in ["0.123", "-0.5", ".5", "3.", "17", "+1.0", ""] {
            assert!(full_match(ValuePattern::float_literal(), text), "{text}");
        }
        assert!(!full_match(ValuePattern::float_literal(), "1.2.3"));
    }

    #[test]
    fn escaped_string_skips_escaped_quote() {
        let re = Regex::new(&ValuePattern::escaped_string().fragment()).unwrap();
        let m = re.find(r"'Foo\'s Bar','next'").unwrap();
        assert_eq!(m.as_str(), r"'Foo\'s Bar'");
    }

    #[test]
    fn escaped_string_doubled_backslash_terminates() {
        let re = Regex::new(&ValuePattern::escaped_string().fragment()).unwrap();
        let m = re.find(r"'C:\\','x'").unwrap();
        assert_eq!(m.as_str(), r"'C:\\'");
    }

    #[test]
    fn escaped_string_rejects_bare_inner_quote() {
        assert!(!full_match(ValuePattern::escaped_string(), "'it's'"));
        assert!(full_match(ValuePattern::escaped_string(), "''"));
        assert!(full_match(ValuePattern::escaped_string(), r#"'say \"hi\"'"#));
    }

    #[test]
    fn any_quoted_is_non_greedy() {
        let re = Regex::new(&ValuePattern::any_quoted().fragment()).unwrap();
        assert_eq!(re.find("'a','b'").unwrap().as_str(), "'a'");
    }

    #[test]
    fn timestamp_shape() {
        assert!(full_match(ValuePattern::timestamp(), "'2024-01-15 10:30:00'"));
        assert!(!full_match(ValuePattern::timestamp(), "'2024-01-15T10:30:00'"));
    }

    #[test]
    fn quoted_enum_is_closed() {
        let kinds = ValuePattern::quoted_enum(&["page", "subcat", "file"]);
        assert!(full_match(kinds, "'subcat'"));
        assert!(!full_match(kinds, "'image'"));
        assert!(!full_match(kinds, "page"));
    }

    #[test]
    fn quoted_enum_escapes_tokens() {
        let dotted = ValuePattern::quoted_enum(&["a.b"]);
        assert!(full_match(dotted, "'a.b'"));
        assert!(!full_match(dotted, "'axb'"));
    }
}
