//! The built-in operators and the table that maps their names to them.
//!
//! The names are attached to the variants via strum, so the enum is the single source of
//! truth. The table is built on first use and never changes afterwards.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, IntoStaticStr)]
pub enum Operator {
    /// (a b -> a+b)
    #[strum(serialize = "+")]
    Add,
    /// (a b -> a-b)
    #[strum(serialize = "-")]
    Sub,
    /// (a b -> a*b)
    #[strum(serialize = "*")]
    Mul,
    /// (a b -> a/b), truncating
    #[strum(serialize = "/")]
    Div,
    /// (a b -> a<b)
    #[strum(serialize = "<")]
    Less,
    /// (a b -> a>b)
    #[strum(serialize = ">")]
    Greater,
    /// (cond then -> ), evaluates `then` if `cond` is, or evaluates to, true
    #[strum(serialize = "if")]
    If,
    /// (a -> a a)
    #[strum(serialize = "dup")]
    Dup,
    /// (a b -> b a)
    #[strum(serialize = "swap")]
    Swap,
    /// (a b c -> b c a)
    #[strum(serialize = "rot")]
    Rot,
    /// (a b -> a b a)
    #[strum(serialize = "over")]
    Over,
    /// (a -> )
    #[strum(serialize = "drop")]
    Drop,
    /// (a -> ), writes a to the output
    #[strum(serialize = "print")]
    Print,
}

static TABLE: Lazy<HashMap<&'static str, Operator>> =
    Lazy::new(|| Operator::iter().map(|op| (op.name(), op)).collect());

impl Operator {
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// finds the operator whose name is exactly `name`
    pub fn lookup(name: &str) -> Option<Operator> {
        TABLE.get(name).copied()
    }

    /// Returns the operator with the longest name that `input` starts with. There is no
    /// requirement for anything to follow the name.
    pub fn longest_prefix(input: &str) -> Option<Operator> {
        TABLE
            .iter()
            .filter(|(name, _)| input.starts_with(*name))
            .max_by_key(|(name, _)| name.len())
            .map(|(_, op)| *op)
    }

    /// how many values the operator pops
    pub fn arity(self) -> usize {
        use Operator::*;
        match self {
            Add | Sub | Mul | Div | Less | Greater | If | Swap | Over => 2,
            Rot => 3,
            Dup | Drop | Print => 1,
        }
    }
}
