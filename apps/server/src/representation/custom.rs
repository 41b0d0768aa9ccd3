//! Parser for `custom:(a,b,c:(x,y))` representation requests.
//!
//! A nested field may carry its own field list or a level name, e.g.
//! `custom:(uuid,person:full,identifiers:(identifier,location:(name)))`.

use super::Representation;
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomRepresentation {
    pub fields: Vec<CustomField>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomField {
    pub name: String,
    /// Representation of a linked entity; `None` falls back to `ref`.
    pub nested: Option<Representation>,
}

impl CustomRepresentation {
    /// Parse the part after the `custom:` prefix.
    pub fn parse(input: &str) -> Result<Self> {
        let mut parser = Parser {
            input,
            chars: input.char_indices().peekable(),
        };
        let repr = parser.field_list()?;
        parser.skip_whitespace();
        if let Some((pos, c)) = parser.chars.next() {
            return Err(parser.error(pos, &format!("unexpected '{c}' after field list")));
        }
        Ok(repr)
    }

    pub fn field(&self, name: &str) -> Option<&CustomField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

struct Parser<'a> {
    input: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
}

impl<'a> Parser<'a> {
    fn field_list(&mut self) -> Result<CustomRepresentation> {
        self.skip_whitespace();
        self.expect('(')?;

        let mut fields = Vec::new();
        loop {
            fields.push(self.field()?);
            self.skip_whitespace();
            match self.chars.next() {
                Some((_, ',')) => continue,
                Some((_, ')')) => break,
                Some((pos, c)) => {
                    return Err(self.error(pos, &format!("expected ',' or ')', found '{c}'")))
                }
                None => return Err(self.error(self.input.len(), "unclosed '('")),
            }
        }

        Ok(CustomRepresentation { fields })
    }

    fn field(&mut self) -> Result<CustomField> {
        let name = self.identifier()?;
        self.skip_whitespace();

        let nested = match self.peek_char() {
            Some(':') => {
                self.chars.next();
                self.skip_whitespace();
                match self.peek_char() {
                    Some('(') => Some(Representation::Custom(self.field_list()?)),
                    _ => {
                        let pos = self.position();
                        let level = self.identifier()?;
                        Some(Representation::named(&level).ok_or_else(|| {
                            self.error(pos, &format!("unknown representation '{level}'"))
                        })?)
                    }
                }
            }
            _ => None,
        };

        Ok(CustomField { name, nested })
    }

    fn identifier(&mut self) -> Result<String> {
        self.skip_whitespace();
        let start = self.position();
        let mut name = String::new();
        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                name.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        if name.is_empty() {
            return Err(self.error(start, "expected a property name"));
        }
        Ok(name)
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        match self.chars.next() {
            Some((_, c)) if c == expected => Ok(()),
            Some((pos, c)) => Err(self.error(pos, &format!("expected '{expected}', found '{c}'"))),
            None => Err(self.error(self.input.len(), &format!("expected '{expected}'"))),
        }
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek_char().is_some_and(char::is_whitespace) {
            self.chars.next();
        }
    }

    fn position(&mut self) -> usize {
        self.chars
            .peek()
            .map(|(pos, _)| *pos)
            .unwrap_or(self.input.len())
    }

    fn error(&self, pos: usize, message: &str) -> Error {
        Error::BadRequest(format!(
            "Invalid custom representation '{}' at {pos}: {message}",
            self.input
        ))
    }
}
