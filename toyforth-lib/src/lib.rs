//! An interpreter for a small stack based language in the spirit of Forth.
//!
//! What you need to do to execute a script is the following:
//! 1. load the source into a string, e.g. with [`utils::read_source`]
//! 1. compile it into a program with [`parser::compile`]. This gives you a list value with
//!    one entry per top level token, plus the warnings for tokens that had to be skipped
//! 1. run the program with [`vm::execute`], or create a [`vm::Context`] if you want to keep
//!    the stack around for more programs (like the REPL does)
//!
//!    ```
//!    use toyforth_lib::{parser, vm};
//!
//!    let compiled = parser::compile("1 2 + print").unwrap();
//!    let mut out = vec![];
//!    vm::execute(&compiled.program, &mut out).unwrap();
//!    assert_eq!(out, b"3\n");
//!    ```
//!
//! [`run`] does the last two steps in one go.

pub mod buffer;
pub mod error;
pub mod operator;
pub mod parser;
pub mod utils;
pub mod value;
pub mod vm;

pub use error::Error;

use parser::ParseError;
use std::io::Write;
use value::Source;

/// compiles and executes `src`, returns the final stack and the compilation warnings
pub fn run(
    src: impl Into<Source>,
    out: &mut dyn Write,
) -> Result<(vm::Stack, Vec<ParseError>), Error> {
    let compiled = parser::compile(src)?;
    let stack = vm::execute(&compiled.program, out)?;
    Ok((stack, compiled.warnings))
}
