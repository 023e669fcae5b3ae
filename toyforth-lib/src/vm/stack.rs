use crate::operator::Operator;
use crate::utils::bug;
use crate::value::{List, Span, Value};
use crate::vm::{Error, Result};
use derive_more::{Deref, Display};

/// The evaluator's working stack. It is an ordinary list value, pushing appends to the
/// tail and popping removes from it.
#[derive(Debug, Deref, Display)]
pub struct Stack(Value);

impl Default for Stack {
    fn default() -> Self {
        Stack(Value::list(Span::default()))
    }
}

impl Stack {
    fn list(&self) -> &List {
        match self.0.as_list() {
            Some(l) => l,
            None => bug!("the stack is a {}", (self.0.type_name())),
        }
    }

    pub fn push(&self, v: Value) {
        self.list().push(v);
    }

    pub fn depth(&self) -> usize {
        self.list().len()
    }

    /// fails unless the stack holds enough operands for `op`
    pub fn require(&self, op: Operator, span: Span) -> Result<()> {
        let found = self.depth();
        if found < op.arity() {
            return Err(Error::StackUnderflow {
                op,
                needed: op.arity(),
                found,
                span,
            });
        }
        Ok(())
    }

    /// pops the top value on behalf of `op`
    pub fn pop(&self, op: Operator, span: Span) -> Result<Value> {
        self.list().pop().ok_or(Error::StackUnderflow {
            op,
            needed: op.arity(),
            found: 0,
            span,
        })
    }

    pub fn pop_int(&self, op: Operator, span: Span) -> Result<i64> {
        let v = self.pop(op, span)?;
        v.as_int().ok_or_else(|| Error::type_error(op, "integer", &v, span))
    }

    /// new handles to all values, bottom first
    pub fn to_vec(&self) -> Vec<Value> {
        self.list().to_vec()
    }
}
