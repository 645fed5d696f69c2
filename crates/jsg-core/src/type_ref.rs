//! Unresolved type references as written in declarations.
//!
//! A [`TypeRef`] may mention type variables and unqualified builtin names;
//! [`crate::TypeContext::resolve`] turns it into a [`crate::TypeDescriptor`].

use std::fmt;
use std::str::FromStr;

use crate::errors::CoreError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// A declared type, possibly with type arguments. A bare name without
    /// arguments is looked up as a type variable first.
    Named { name: String, args: Vec<TypeRef> },
    /// Explicit type variable.
    Variable(String),
    /// Array of the inner reference.
    Array(Box<TypeRef>),
}

impl TypeRef {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named {
            name: name.into(),
            args: Vec::new(),
        }
    }

    #[must_use]
    pub fn generic(name: impl Into<String>, args: Vec<Self>) -> Self {
        Self::Named {
            name: name.into(),
            args,
        }
    }

    #[must_use]
    pub fn var(name: impl Into<String>) -> Self {
        Self::Variable(name.into())
    }

    #[must_use]
    pub fn array_of(component: Self) -> Self {
        Self::Array(Box::new(component))
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named { name, args } => {
                f.write_str(name)?;
                if !args.is_empty() {
                    f.write_str("<")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    f.write_str(">")?;
                }
                Ok(())
            }
            Self::Variable(name) => f.write_str(name),
            Self::Array(component) => write!(f, "{component}[]"),
        }
    }
}

impl FromStr for TypeRef {
    type Err = CoreError;

    /// Parses `Name`, `Name<Arg, ...>` and trailing `[]` suffixes.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parser = Parser { input: s, pos: 0 };
        let parsed = parser.parse_ref()?;
        parser.skip_whitespace();
        if parser.pos != s.len() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(parsed)
    }
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl Parser<'_> {
    fn parse_ref(&mut self) -> Result<TypeRef, CoreError> {
        self.skip_whitespace();
        let name = self.identifier()?;
        self.skip_whitespace();
        let mut args = Vec::new();
        if self.eat('<') {
            loop {
                args.push(self.parse_ref()?);
                self.skip_whitespace();
                if self.eat(',') {
                    continue;
                }
                if self.eat('>') {
                    break;
                }
                return Err(self.error("expected ',' or '>'"));
            }
        }
        let mut parsed = TypeRef::Named { name, args };
        loop {
            self.skip_whitespace();
            if !self.eat('[') {
                break;
            }
            if !self.eat(']') {
                return Err(self.error("expected ']'"));
            }
            parsed = TypeRef::array_of(parsed);
        }
        Ok(parsed)
    }

    fn identifier(&mut self) -> Result<String, CoreError> {
        let rest = &self.input[self.pos..];
        let len = rest
            .char_indices()
            .find(|(_, c)| !(c.is_alphanumeric() || matches!(c, '.' | '_' | '$')))
            .map_or(rest.len(), |(i, _)| i);
        if len == 0 {
            return Err(self.error("expected a type name"));
        }
        self.pos += len;
        Ok(rest[..len].to_string())
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.input[self.pos..].starts_with(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        let rest = &self.input[self.pos..];
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn error(&self, reason: &str) -> CoreError {
        CoreError::MalformedTypeReference {
            input: self.input.to_string(),
            reason: format!("{reason} at offset {}", self.pos),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn parses_nested_generics_and_arrays() {
        let parsed: TypeRef = "std.Map<String, List<T>[]>[]".parse().unwrap();
        let expected = TypeRef::array_of(TypeRef::generic(
            "std.Map",
            vec![
                TypeRef::named("String"),
                TypeRef::array_of(TypeRef::generic("List", vec![TypeRef::named("T")])),
            ],
        ));
        assert_eq!(parsed, expected);
    }

    #[test]
    fn display_round_trips_text() {
        let text = "Map<String, List<Foo>>";
        let parsed: TypeRef = text.parse().unwrap();
        assert_eq!(parsed.to_string(), text);
    }

    #[rstest]
    #[case("")]
    #[case("List<")]
    #[case("List<String")]
    #[case("Foo[")]
    #[case("Foo bar")]
    #[case("<String>")]
    fn rejects_malformed_input(#[case] input: &str) {
        let err = input.parse::<TypeRef>().unwrap_err();
        assert!(matches!(err, CoreError::MalformedTypeReference { .. }));
    }
}
