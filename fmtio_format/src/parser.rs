// Copyright 2025 The Pigweed Authors
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License. You may obtain a copy of
// the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied. See the
// License for the specific language governing permissions and limitations under
// the License.

use fmtio_status::{Error, Result};
use fmtio_stream::{ReadUntilOptions, Reader};

// Widest argument index a replacement field can name.
pub(crate) const MAX_ARGS: usize = 128;

/// The format-string walker shared by the format, scan and validation
/// passes.
///
/// [`next_field`](Self::next_field) hands literal segments (with `{{`/`}}`
/// collapsed) to a callback and stops at each replacement field after its
/// arg-id, leaving the reader positioned on the field's spec.  The caller
/// then consumes the spec including the closing `}` before asking for the
/// next field.
pub(crate) struct Parser<'s> {
    pub(crate) rdr: Reader<'s>,
    use_positional: Option<bool>,
    next_auto_arg: u8,
}

impl<'s> Parser<'s> {
    pub(crate) fn new(format: &'s str) -> Self {
        Self {
            rdr: Reader::new(format),
            use_positional: None,
            next_auto_arg: 0,
        }
    }

    /// Advances to the next replacement field and returns its argument
    /// index, or `None` when the format string ends first.
    pub(crate) fn next_field<F>(&mut self, mut literal: F) -> Result<Option<u8>>
    where
        F: FnMut(&'s str) -> Result<()>,
    {
        let keep = ReadUntilOptions {
            keep_delimiter: true,
            ..ReadUntilOptions::default()
        };
        loop {
            if self.rdr.is_eof() {
                return Ok(None);
            }
            let chunk = self.rdr.read_until_any_of("{}", keep)?;
            if !chunk.is_empty() {
                literal(chunk)?;
            }
            if self.rdr.is_eof() {
                return Ok(None);
            }
            match self.rdr.read_char()? {
                '}' => {
                    // A lone closing brace only occurs escaped.
                    self.rdr
                        .read_if_match_char('}')
                        .map_err(|_| Error::InvalidFormat)?;
                    literal("}")?;
                }
                _ => {
                    if self.rdr.peek().map_err(|_| Error::InvalidFormat)? == '{' {
                        self.rdr.pop(1);
                        literal("{")?;
                    } else {
                        return self.parse_field_start().map(Some);
                    }
                }
            }
        }
    }

    // Parses the arg-id and enforces the positional-vs-automatic mode the
    // first field committed the string to.
    fn parse_field_start(&mut self) -> Result<u8> {
        let arg = if self.rdr.peek()?.is_ascii_digit() {
            if self.use_positional == Some(false) {
                return Err(Error::InvalidFormat);
            }
            self.use_positional = Some(true);
            self.rdr.parse_int::<u8>(10)?
        } else {
            if self.use_positional == Some(true) {
                return Err(Error::InvalidFormat);
            }
            self.use_positional = Some(false);
            let arg = self.next_auto_arg;
            self.next_auto_arg = arg.checked_add(1).ok_or(Error::InvalidFormat)?;
            arg
        };
        // Leave the reader on the spec: at the `}` of an empty spec, or
        // right behind the `:`.
        match self.rdr.peek()? {
            '}' => Ok(arg),
            ':' => {
                self.rdr.pop(1);
                Ok(arg)
            }
            _ => Err(Error::InvalidFormat),
        }
    }
}

/// Tracks which argument indices a format string referenced.
#[derive(Default)]
pub(crate) struct ArgCoverage {
    seen: u128,
}

impl ArgCoverage {
    pub(crate) fn mark(&mut self, arg: u8) -> Result<()> {
        if usize::from(arg) >= MAX_ARGS {
            return Err(Error::InvalidFormat);
        }
        self.seen |= 1 << arg;
        Ok(())
    }

    /// True if every index in `0..count` was referenced at least once.
    pub(crate) fn covers_first(&self, count: usize) -> bool {
        if count > MAX_ARGS {
            return false;
        }
        let want = if count == MAX_ARGS {
            u128::MAX
        } else {
            (1u128 << count) - 1
        };
        self.seen & want == want
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::string::String;
    use std::vec;
    use std::vec::Vec;

    // Collects the literal segments and field ids of a format string.
    fn walk(format: &str) -> Result<(String, Vec<u8>)> {
        let mut parser = Parser::new(format);
        let mut literals = String::new();
        let mut fields = Vec::new();
        loop {
            let field = parser.next_field(|lit| {
                literals.push_str(lit);
                Ok(())
            })?;
            let Some(arg) = field else { break };
            fields.push(arg);
            // Consume the spec so the walk can continue.
            let mut specs = crate::specs::FormatSpecs::default();
            crate::specs::parse_format_specs(&mut parser.rdr, &mut specs)?;
        }
        Ok((literals, fields))
    }

    #[test]
    fn literal_only_strings_pass_through() {
        assert_eq!(walk("hello").unwrap(), (String::from("hello"), Vec::new()));
        assert_eq!(walk("").unwrap(), (String::from(""), Vec::new()));
    }

    #[test]
    fn escaped_braces_collapse_to_single_braces() {
        assert_eq!(walk("{{}}").unwrap().0, "{}");
        assert_eq!(walk("a{{b}}c").unwrap().0, "a{b}c");
        assert_eq!(walk("{{{}}}").unwrap(), (String::from("{}"), vec![0]));
    }

    #[test]
    fn automatic_indexing_counts_fields() {
        assert_eq!(walk("{} {} {}").unwrap().1, vec![0, 1, 2]);
        assert_eq!(walk("{:>5} {:x}").unwrap().1, vec![0, 1]);
    }

    #[test]
    fn positional_indexing_uses_the_given_ids() {
        assert_eq!(walk("{1} {0} {1}").unwrap().1, vec![1, 0, 1]);
    }

    #[test]
    fn mixing_positional_and_automatic_is_rejected() {
        assert_eq!(walk("{0} {}").unwrap_err(), Error::InvalidFormat);
        assert_eq!(walk("{} {0}").unwrap_err(), Error::InvalidFormat);
    }

    #[test]
    fn unbalanced_braces_are_rejected() {
        assert_eq!(walk("}").unwrap_err(), Error::InvalidFormat);
        assert_eq!(walk("a}b").unwrap_err(), Error::InvalidFormat);
        assert_eq!(walk("{").unwrap_err(), Error::InvalidFormat);
        assert_eq!(walk("{foo}").unwrap_err(), Error::InvalidFormat);
    }

    #[test]
    fn coverage_requires_every_argument_to_be_referenced() {
        let mut coverage = ArgCoverage::default();
        coverage.mark(0).unwrap();
        coverage.mark(2).unwrap();
        assert!(coverage.covers_first(1));
        assert!(!coverage.covers_first(2));
        coverage.mark(1).unwrap();
        assert!(coverage.covers_first(3));
        assert!(coverage.mark(128).is_err());
    }
}
