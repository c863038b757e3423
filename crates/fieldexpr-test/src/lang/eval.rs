use std::cmp::Ordering;

use fieldexpr::{sibling_path, EvalContext, Value};

use super::parser::{Ast, BinaryOp, Literal};

impl Literal {
    fn to_value<'a>(&self) -> Value<'a> {
        match self {
            Literal::Null => Value::Nil,
            Literal::Number(n) => Value::Number(*n),
            Literal::Text(text) => Value::from(text.clone()),
            Literal::Bool(b) => Value::Bool(*b),
        }
    }
}

impl Ast {
    pub(crate) fn eval<'a>(&self, field_path: &str, ctx: &EvalContext<'a>) -> Value<'a> {
        match self {
            Ast::Literal(literal) => literal.to_value(),
            Ast::Field { path, subscripts } => {
                let keys: Vec<Value<'a>> = subscripts
                    .iter()
                    .map(|subscript| subscript.eval(field_path, ctx))
                    .collect();
                match path {
                    None => ctx.resolve_field(field_path, &keys),
                    Some(name) => ctx.resolve_field(&sibling_path(field_path, name), &keys),
                }
            }
            Ast::Not(inner) => Value::Bool(!truthy(&inner.eval(field_path, ctx))),
            Ast::Neg(inner) => match inner.eval(field_path, ctx) {
                Value::Number(n) => Value::Number(-n),
                _ => Value::Nil,
            },
            // Short-circuit: the right side is not evaluated when decided.
            Ast::Binary(BinaryOp::And, lhs, rhs) => Value::Bool(
                truthy(&lhs.eval(field_path, ctx)) && truthy(&rhs.eval(field_path, ctx)),
            ),
            Ast::Binary(BinaryOp::Or, lhs, rhs) => Value::Bool(
                truthy(&lhs.eval(field_path, ctx)) || truthy(&rhs.eval(field_path, ctx)),
            ),
            Ast::Binary(op, lhs, rhs) => {
                binary(*op, lhs.eval(field_path, ctx), rhs.eval(field_path, ctx))
            }
        }
    }
}

fn binary<'a>(op: BinaryOp, lhs: Value<'a>, rhs: Value<'a>) -> Value<'a> {
    match op {
        BinaryOp::Add => match (lhs, rhs) {
            (Value::Number(a), Value::Number(b)) => Value::Number(a + b),
            (Value::Text(a), Value::Text(b)) => Value::from(a.into_owned() + &*b),
            _ => Value::Nil,
        },
        BinaryOp::Sub => match (lhs, rhs) {
            (Value::Number(a), Value::Number(b)) => Value::Number(a - b),
            _ => Value::Nil,
        },
        BinaryOp::Eq => Value::Bool(lhs == rhs),
        BinaryOp::Ne => Value::Bool(lhs != rhs),
        BinaryOp::Lt => Value::Bool(compare(&lhs, &rhs) == Some(Ordering::Less)),
        BinaryOp::Le => Value::Bool(matches!(
            compare(&lhs, &rhs),
            Some(Ordering::Less | Ordering::Equal)
        )),
        BinaryOp::Gt => Value::Bool(compare(&lhs, &rhs) == Some(Ordering::Greater)),
        BinaryOp::Ge => Value::Bool(matches!(
            compare(&lhs, &rhs),
            Some(Ordering::Greater | Ordering::Equal)
        )),
        BinaryOp::And => Value::Bool(truthy(&lhs) && truthy(&rhs)),
        BinaryOp::Or => Value::Bool(truthy(&lhs) || truthy(&rhs)),
    }
}

fn compare(lhs: &Value<'_>, rhs: &Value<'_>) -> Option<Ordering> {
    match (lhs, rhs) {
        (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
        (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// Nil, `false`, zero and empty text are falsy.
pub(crate) fn truthy(value: &Value<'_>) -> bool {
    match value {
        Value::Nil => false,
        Value::Bool(b) => *b,
        Value::Number(n) => *n != 0.0,
        Value::Text(text) => !text.is_empty(),
        Value::Opaque(_) => true,
    }
}
