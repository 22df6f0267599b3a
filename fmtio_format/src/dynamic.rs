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

use fmtio_status::Result;
use fmtio_stream::{Reader, Writer};

use crate::formatter::{Format, Formatter};

/// Width and precision decided at call time instead of in the format string.
///
/// Fields left at [`NOT_DEFINED`](Self::NOT_DEFINED) keep whatever the
/// format string specified.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FormatSpec {
    /// The width, or [`Self::NOT_DEFINED`].
    pub width: i32,
    /// The precision, or [`Self::NOT_DEFINED`].
    pub precision: i32,
}

impl FormatSpec {
    /// Marker for "keep the parsed spec's value".
    pub const NOT_DEFINED: i32 = -i32::MAX;

    /// Pairs this spec with a value to format.
    ///
    /// The returned wrapper borrows `value`; it is formattable wherever the
    /// underlying value is.
    pub const fn with<'a, T: ?Sized>(&self, value: &'a T) -> SpecWith<'a, T> {
        SpecWith { spec: *self, value }
    }
}

impl Default for FormatSpec {
    fn default() -> Self {
        Self {
            width: Self::NOT_DEFINED,
            precision: Self::NOT_DEFINED,
        }
    }
}

/// A value paired with a dynamic width/precision override.
#[derive(Clone, Copy, Debug)]
pub struct SpecWith<'a, T: ?Sized> {
    spec: FormatSpec,
    value: &'a T,
}

/// Forwards to the underlying type's formatter, applying the overrides.
pub struct SpecWithFormatter<T: Format + ?Sized> {
    inner: T::Formatter,
}

impl<T: Format + ?Sized> Default for SpecWithFormatter<T> {
    fn default() -> Self {
        Self {
            inner: T::Formatter::default(),
        }
    }
}

impl<'a, T> Formatter<SpecWith<'a, T>> for SpecWithFormatter<T>
where
    T: Format + ?Sized,
    T::Formatter: Clone,
{
    fn validate(rdr: &mut Reader<'_>) -> Result<()> {
        T::Formatter::validate(rdr)
    }

    fn parse(&mut self, rdr: &mut Reader<'_>) -> Result<()> {
        self.inner.parse(rdr)
    }

    fn format(&self, out: &mut Writer<'_>, arg: &SpecWith<'a, T>) -> Result<()> {
        let mut inner = self.inner.clone();
        if arg.spec.width != FormatSpec::NOT_DEFINED {
            inner.set_width(arg.spec.width.max(0));
        }
        if arg.spec.precision != FormatSpec::NOT_DEFINED {
            inner.set_precision(arg.spec.precision.max(0));
        }
        inner.format(out, arg.value)
    }
}

impl<'a, T> Format for SpecWith<'a, T>
where
    T: Format + ?Sized,
    T::Formatter: Clone,
{
    type Formatter = SpecWithFormatter<T>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use fmtio_stream::ArrayBuffer;
    use std::string::String;

    fn format_one<T: Format + ?Sized>(spec: &str, value: &T) -> Result<String> {
        let mut rdr = Reader::new(spec);
        let mut formatter = T::Formatter::default();
        formatter.parse(&mut rdr)?;

        let mut buf = ArrayBuffer::<128>::new();
        let mut out = Writer::new(&mut buf);
        formatter.format(&mut out, value)?;
        Ok(String::from(buf.as_str().unwrap()))
    }

    #[test]
    fn an_undefined_spec_keeps_the_parsed_values() {
        let spec = FormatSpec::default();
        assert_eq!(format_one("5}", &spec.with(&42)).unwrap(), "   42");
        assert_eq!(format_one("}", &spec.with(&42)).unwrap(), "42");
    }

    #[test]
    fn a_dynamic_width_overrides_the_parsed_one() {
        let spec = FormatSpec {
            width: 7,
            ..FormatSpec::default()
        };
        assert_eq!(format_one("}", &spec.with(&42)).unwrap(), "     42");
        assert_eq!(format_one("3}", &spec.with(&42)).unwrap(), "     42");
    }

    #[test]
    fn a_dynamic_precision_overrides_the_parsed_one() {
        let spec = FormatSpec {
            precision: 2,
            ..FormatSpec::default()
        };
        assert_eq!(format_one("f}", &spec.with(&1.5)).unwrap(), "1.50");
        assert_eq!(format_one(".4f}", &spec.with(&1.5)).unwrap(), "1.50");
        assert_eq!(format_one("}", &spec.with(&"hello")).unwrap(), "he");
    }

    #[test]
    fn negative_dynamic_values_clamp_to_zero() {
        let spec = FormatSpec {
            width: -5,
            precision: -1,
            ..FormatSpec::default()
        };
        assert_eq!(format_one("f}", &spec.with(&1.5)).unwrap(), "2");
    }
}
