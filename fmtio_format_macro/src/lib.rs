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

//! Proc macros for the `fmtio_format` crate.
//!
//! The macros parse the format string at expansion time and reject malformed
//! strings as compile errors: bad spec grammar, unbalanced braces, mixing
//! positional and automatic indexing, argument indices without a matching
//! argument, and arguments a format string never references.  Spec
//! compatibility with the concrete argument *types* is enforced by the
//! validation pass of the expanded runtime call, since a macro cannot see
//! the types of its argument expressions.
//!
//! ```ignore
//! let mut buf = ArrayBuffer::<64>::new();
//! format_to!(buf, "{} {:.2f}", "pi is", 3.14159)?;
//!
//! let mut input = Reader::new("3/4");
//! let (mut num, mut den) = (0u32, 0u32);
//! scan_from!(input, "{}/{}", &mut num, &mut den)?;
//! ```

use proc_macro::TokenStream;
use quote::quote;
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::{Expr, LitStr, Token};

mod parser;

use parser::{check_format_string, Mode};

type TokenStream2 = proc_macro2::TokenStream;

// A format string literal followed by its argument expressions.
struct FormatAndArgs {
    format_string: LitStr,
    args: Vec<Expr>,
}

impl Parse for FormatAndArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let format_string = input.parse::<LitStr>()?;
        let args = if input.is_empty() {
            Vec::new()
        } else {
            input.parse::<Token![,]>()?;
            let punctuated = Punctuated::<Expr, Token![,]>::parse_terminated(input)?;
            punctuated.into_iter().collect()
        };
        Ok(FormatAndArgs {
            format_string,
            args,
        })
    }
}

fn checked_format(format_and_args: &FormatAndArgs, mode: Mode) -> syn::Result<()> {
    let format = format_and_args.format_string.value();
    check_format_string(&format, format_and_args.args.len(), mode)
        .map_err(|message| syn::Error::new_spanned(&format_and_args.format_string, message))
}

fn format_arg_array(args: &[Expr]) -> TokenStream2 {
    let args = args.iter().map(|arg| {
        quote! { ::fmtio_format::FormatArg::new(&#arg) }
    });
    quote! { &[#(#args),*] }
}

fn scan_arg_array(args: &[Expr]) -> TokenStream2 {
    let args = args.iter().map(|arg| {
        quote! { ::fmtio_format::ScanArg::new(#arg) }
    });
    quote! { &mut [#(#args),*] }
}

struct SinkFormatAndArgs {
    sink: Expr,
    format_and_args: FormatAndArgs,
}

impl Parse for SinkFormatAndArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let sink = input.parse::<Expr>()?;
        input.parse::<Token![,]>()?;
        let format_and_args = input.parse::<FormatAndArgs>()?;
        Ok(SinkFormatAndArgs {
            sink,
            format_and_args,
        })
    }
}

/// Formats arguments into a buffer: `format_to!(buffer, "...", args...)`.
///
/// Expands to a [`fmtio_status::Result<()>`] expression.  The format string
/// is checked at compile time.
#[proc_macro]
pub fn format_to(input: TokenStream) -> TokenStream {
    let SinkFormatAndArgs {
        sink,
        format_and_args,
    } = syn::parse_macro_input!(input as SinkFormatAndArgs);

    if let Err(e) = checked_format(&format_and_args, Mode::Format) {
        return e.to_compile_error().into();
    }
    let format = &format_and_args.format_string;
    let args = format_arg_array(&format_and_args.args);
    quote! {
        ::fmtio_format::format_to(&mut #sink, #format, #args)
    }
    .into()
}

/// Returns the formatted size of the arguments:
/// `formatted_size!("...", args...)`.
#[proc_macro]
pub fn formatted_size(input: TokenStream) -> TokenStream {
    let format_and_args = syn::parse_macro_input!(input as FormatAndArgs);

    if let Err(e) = checked_format(&format_and_args, Mode::Format) {
        return e.to_compile_error().into();
    }
    let format = &format_and_args.format_string;
    let args = format_arg_array(&format_and_args.args);
    quote! {
        ::fmtio_format::formatted_size(#format, #args)
    }
    .into()
}

struct SinkCountFormatAndArgs {
    sink: Expr,
    count: Expr,
    format_and_args: FormatAndArgs,
}

impl Parse for SinkCountFormatAndArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let sink = input.parse::<Expr>()?;
        input.parse::<Token![,]>()?;
        let count = input.parse::<Expr>()?;
        input.parse::<Token![,]>()?;
        let format_and_args = input.parse::<FormatAndArgs>()?;
        Ok(SinkCountFormatAndArgs {
            sink,
            count,
            format_and_args,
        })
    }
}

/// Formats with truncation: `format_to_n!(buffer, n, "...", args...)`.
///
/// Expands to `Result<usize>` holding the untruncated size.
#[proc_macro]
pub fn format_to_n(input: TokenStream) -> TokenStream {
    let SinkCountFormatAndArgs {
        sink,
        count,
        format_and_args,
    } = syn::parse_macro_input!(input as SinkCountFormatAndArgs);

    if let Err(e) = checked_format(&format_and_args, Mode::Format) {
        return e.to_compile_error().into();
    }
    let format = &format_and_args.format_string;
    let args = format_arg_array(&format_and_args.args);
    quote! {
        ::fmtio_format::format_to_n(&mut #sink, #count, #format, #args)
    }
    .into()
}

/// Scans values out of a reader: `scan_from!(reader, "...", &mut out...)`.
///
/// Expands to a `Result<()>` expression.  The scan string is checked at
/// compile time.
#[proc_macro]
pub fn scan_from(input: TokenStream) -> TokenStream {
    let SinkFormatAndArgs {
        sink,
        format_and_args,
    } = syn::parse_macro_input!(input as SinkFormatAndArgs);

    if let Err(e) = checked_format(&format_and_args, Mode::Scan) {
        return e.to_compile_error().into();
    }
    let format = &format_and_args.format_string;
    let args = scan_arg_array(&format_and_args.args);
    quote! {
        ::fmtio_format::scan_from(&mut #sink, #format, #args)
    }
    .into()
}
