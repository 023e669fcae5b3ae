//! contains the evaluator. The bodies of the built-in operators are in [built_ins]

use crate::operator::Operator;
use crate::value::{Kind, Span, Value};
use std::io::{self, Write};
use std::result::Result as StdResult;
use thiserror::Error;

pub mod built_ins;
pub mod stack;
pub use stack::Stack;

#[derive(Error, Debug)]
pub enum Error {
    #[error("stack underflow: `{op}` needs {needed} value(s), but the stack holds {found}")]
    StackUnderflow {
        op: Operator,
        needed: usize,
        found: usize,
        span: Span,
    },

    #[error("type error: `{op}` expected {expected}, found {found}")]
    TypeError {
        op: Operator,
        expected: &'static str,
        found: &'static str,
        span: Span,
    },

    #[error("unrecognized symbol `{name}`")]
    UnrecognizedSymbol { name: String, span: Span },

    #[error("division by zero")]
    DivisionByZero { span: Span },

    #[error("integer overflow in `{op}`")]
    Overflow { op: Operator, span: Span },

    #[error("only lists can be executed, found {found}")]
    NotAList { found: &'static str, span: Span },

    #[error("writing output: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    pub(crate) fn type_error(
        op: Operator,
        expected: &'static str,
        found: &Value,
        span: Span,
    ) -> Self {
        Error::TypeError {
            op,
            expected,
            found: found.type_name(),
            span,
        }
    }

    /// the part of the source that caused the error
    pub fn span(&self) -> Option<Span> {
        use Error::*;
        match self {
            StackUnderflow { span, .. }
            | TypeError { span, .. }
            | UnrecognizedSymbol { span, .. }
            | DivisionByZero { span }
            | Overflow { span, .. }
            | NotAList { span, .. } => Some(*span),
            Io(_) => None,
        }
    }
}

pub type Result<T> = StdResult<T, Error>;

macro_rules! bail{
    ($($err:tt)*) => {
        return Err(Error::$($err)*)
    };
}
pub(crate) use bail;

/// Everything the evaluator works with: the stack and the sink `print` writes to
pub struct Context<'o> {
    pub stack: Stack,
    out: &'o mut dyn Write,
    trace: bool,
}

impl<'o> Context<'o> {
    pub fn new(out: &'o mut dyn Write) -> Self {
        Context {
            stack: Stack::default(),
            out,
            trace: false,
        }
    }

    /// if set, every evaluated value is logged to stderr together with the stack
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    /// Literals are pushed, symbols are looked up in the operator table and applied.
    pub fn evaluate(&mut self, value: &Value) -> Result<()> {
        if self.trace {
            eprintln!("{:>4} {} <- {}", self.stack.depth(), self.stack, value);
        }
        match value.kind() {
            Kind::Int(_) | Kind::Bool(_) | Kind::Str(_) | Kind::List(_) => {
                self.stack.push(value.clone());
                Ok(())
            }
            Kind::Symbol(name) => {
                let Some(op) = Operator::lookup(name.as_str()) else {
                    bail!(UnrecognizedSymbol {
                        name: name.as_str().to_string(),
                        span: value.span(),
                    });
                };
                built_ins::apply(op, self, value.span())
            }
        }
    }

    /// Evaluates the elements of `list` in order. The list itself is never modified by
    /// evaluation, so walking it by index is fine even when `if` recurses into it.
    pub fn evaluate_list(&mut self, list: &Value) -> Result<()> {
        let Some(elems) = list.as_list() else {
            bail!(NotAList {
                found: list.type_name(),
                span: list.span(),
            });
        };
        let mut i = 0;
        while let Some(v) = elems.get(i) {
            self.evaluate(&v)?;
            i += 1;
        }
        Ok(())
    }

    /// runs `program` on this context and hands back the final stack
    pub fn run(mut self, program: &Value) -> Result<Stack> {
        self.evaluate_list(program)?;
        Ok(self.stack)
    }
}

/// runs `program` on a fresh stack
pub fn execute(program: &Value, out: &mut dyn Write) -> Result<Stack> {
    Context::new(out).run(program)
}
