//! The bodies of the built-in operators.
//!
//! Every operator pops its operands, checks their types, pushes its results and lets go
//! of whatever it popped. The stack ends up holding exactly one reference per slot, no
//! matter how often a value got shuffled around.

use super::{bail, Context, Error, Result};
use crate::operator::Operator;
use crate::value::{Span, Value};

pub fn apply(op: Operator, ctx: &mut Context, span: Span) -> Result<()> {
    ctx.stack.require(op, span)?;
    use Operator::*;
    match op {
        Add => int_op(ctx, op, span, i64::checked_add),
        Sub => int_op(ctx, op, span, i64::checked_sub),
        Mul => int_op(ctx, op, span, i64::checked_mul),
        Div => div(ctx, span),
        Less => cmp_op(ctx, op, span, |a, b| a < b),
        Greater => cmp_op(ctx, op, span, |a, b| a > b),
        If => if_(ctx, span),
        Dup => {
            let a = ctx.stack.pop(op, span)?;
            ctx.stack.push(a.clone());
            ctx.stack.push(a);
            Ok(())
        }
        Swap => {
            let b = ctx.stack.pop(op, span)?;
            let a = ctx.stack.pop(op, span)?;
            ctx.stack.push(b);
            ctx.stack.push(a);
            Ok(())
        }
        Rot => {
            let c = ctx.stack.pop(op, span)?;
            let b = ctx.stack.pop(op, span)?;
            let a = ctx.stack.pop(op, span)?;
            ctx.stack.push(b);
            ctx.stack.push(c);
            ctx.stack.push(a);
            Ok(())
        }
        Over => {
            let b = ctx.stack.pop(op, span)?;
            let a = ctx.stack.pop(op, span)?;
            ctx.stack.push(a.clone());
            ctx.stack.push(b);
            ctx.stack.push(a);
            Ok(())
        }
        Drop => {
            ctx.stack.pop(op, span)?;
            Ok(())
        }
        Print => {
            let a = ctx.stack.pop(op, span)?;
            a.write_indented(&mut *ctx.out, 0)?;
            Ok(())
        }
    }
}

/// pops two integers, b first, and pushes f(a, b). `None` means overflow
fn int_op(
    ctx: &mut Context,
    op: Operator,
    span: Span,
    f: fn(i64, i64) -> Option<i64>,
) -> Result<()> {
    let b = ctx.stack.pop_int(op, span)?;
    let a = ctx.stack.pop_int(op, span)?;
    let res = f(a, b).ok_or(Error::Overflow { op, span })?;
    ctx.stack.push(Value::int(res, span));
    Ok(())
}

fn div(ctx: &mut Context, span: Span) -> Result<()> {
    let op = Operator::Div;
    let b = ctx.stack.pop_int(op, span)?;
    let a = ctx.stack.pop_int(op, span)?;
    if b == 0 {
        bail!(DivisionByZero { span });
    }
    // i64::MIN / -1 is the only other way to fail
    let res = a.checked_div(b).ok_or(Error::Overflow { op, span })?;
    ctx.stack.push(Value::int(res, span));
    Ok(())
}

fn cmp_op(ctx: &mut Context, op: Operator, span: Span, f: fn(i64, i64) -> bool) -> Result<()> {
    let b = ctx.stack.pop_int(op, span)?;
    let a = ctx.stack.pop_int(op, span)?;
    ctx.stack.push(Value::boolean(f(a, b), span));
    Ok(())
}

/// (cond then -> ). A list as condition is evaluated first, against the same stack, and
/// whatever ends up on top is the condition.
fn if_(ctx: &mut Context, span: Span) -> Result<()> {
    let op = Operator::If;
    let then = ctx.stack.pop(op, span)?;
    let mut cond = ctx.stack.pop(op, span)?;
    if then.as_list().is_none() {
        return Err(Error::type_error(op, "list", &then, span));
    }

    if cond.as_list().is_some() {
        ctx.evaluate_list(&cond)?;
        cond = ctx.stack.pop(op, span)?;
    }

    let Some(flag) = cond.as_bool() else {
        return Err(Error::type_error(op, "boolean", &cond, span));
    };
    if flag {
        ctx.evaluate_list(&then)?;
    }
    Ok(())
}
