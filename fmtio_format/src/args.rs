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
use crate::scan::{Scan, Scanner};

// Object-safe view of "parse the spec, then format the held value".  A
// trait object of this is exactly the erased pair the driver needs: a value
// pointer plus one dispatch function.
trait DynFormat {
    fn parse_and_format(&self, out: &mut Writer<'_>, spec: &mut Reader<'_>) -> Result<()>;
}

impl<T: Format + ?Sized> DynFormat for T {
    fn parse_and_format(&self, out: &mut Writer<'_>, spec: &mut Reader<'_>) -> Result<()> {
        let mut formatter = T::Formatter::default();
        formatter.parse(spec)?;
        formatter.format(out, self)
    }
}

/// A type-erased reference to one format argument.
///
/// The view borrows the argument; the caller keeps it alive for the duration
/// of the formatting call.  No allocation or copying is involved.
pub struct FormatArg<'a> {
    value: &'a dyn DynFormat,
    validate: fn(&mut Reader<'_>) -> Result<()>,
}

impl<'a> FormatArg<'a> {
    /// Creates the erased view of `value`.
    pub fn new<T: Format>(value: &'a T) -> Self {
        Self {
            value,
            validate: <T::Formatter as Formatter<T>>::validate,
        }
    }

    /// Validates a spec substring against the argument's type.
    pub(crate) fn validate(&self, spec: &mut Reader<'_>) -> Result<()> {
        (self.validate)(spec)
    }

    /// Parses the spec substring and formats the argument.
    pub(crate) fn process(&self, out: &mut Writer<'_>, spec: &mut Reader<'_>) -> Result<()> {
        self.value.parse_and_format(out, spec)
    }
}

// The scan-side counterpart; the held reference is the out-parameter.
trait DynScan {
    fn parse_and_scan(&mut self, input: &mut Reader<'_>, spec: &mut Reader<'_>) -> Result<()>;
}

impl<T: Scan> DynScan for T {
    fn parse_and_scan(&mut self, input: &mut Reader<'_>, spec: &mut Reader<'_>) -> Result<()> {
        let mut scanner = T::Scanner::default();
        scanner.parse(spec)?;
        scanner.scan(input, self)
    }
}

/// A type-erased reference to one scan out-parameter.
///
/// The target is only assigned when its replacement field scans
/// successfully.
pub struct ScanArg<'a> {
    value: &'a mut dyn DynScan,
    validate: fn(&mut Reader<'_>) -> Result<()>,
}

impl<'a> ScanArg<'a> {
    /// Creates the erased view of the out-parameter `value`.
    pub fn new<T: Scan>(value: &'a mut T) -> Self {
        Self {
            value,
            validate: <T::Scanner as Scanner<T>>::validate,
        }
    }

    /// Validates a spec substring against the argument's type.
    pub(crate) fn validate(&self, spec: &mut Reader<'_>) -> Result<()> {
        (self.validate)(spec)
    }

    /// Parses the spec substring and scans into the out-parameter.
    pub(crate) fn process(&mut self, input: &mut Reader<'_>, spec: &mut Reader<'_>) -> Result<()> {
        self.value.parse_and_scan(input, spec)
    }
}
