// In-memory evaluator for content query expressions.

use std::cmp::Ordering;

use serde_json::{Map, Value};

use crate::ast::Expr;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error("type error: {0}")]
    TypeError(String),
    #[error("unsupported expression")]
    Unsupported,
}

pub fn eval_filter(expr: &Expr, doc: &Value) -> Result<bool, EvalError> {
    match eval_expr(expr, doc)? {
        Value::Bool(b) => Ok(b),
        _ => Ok(false),
    }
}

pub fn eval_expr(expr: &Expr, doc: &Value) -> Result<Value, EvalError> {
    match expr {
        Expr::Everything => Ok(Value::Bool(true)),
        Expr::BoolLiteral(b) => Ok(Value::Bool(*b)),
        Expr::IntLiteral(n) => Ok(Value::Number((*n).into())),
        Expr::FloatLiteral(f) => Ok(serde_json::Number::from_f64(*f)
            .map(Value::Number)
            .unwrap_or(Value::Null)),
        Expr::StringLiteral(s) => Ok(Value::String(s.clone())),
        Expr::Null => Ok(Value::Null),
        Expr::Array(items) => items
            .iter()
            .map(|item| eval_expr(item, doc))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Expr::Object(fields) => {
            let mut map = Map::new();
            for (key, value) in fields {
                map.insert(key.clone(), eval_expr(value, doc)?);
            }
            Ok(Value::Object(map))
        }
        Expr::Ident(name) => Ok(doc.get(name).cloned().unwrap_or(Value::Null)),
        Expr::DotAccess(base, field) => {
            let v = eval_expr(base, doc)?;
            Ok(v.get(field).cloned().unwrap_or(Value::Null))
        }
        Expr::This => Ok(doc.clone()),
        Expr::Eq(l, r) => {
            let lv = eval_expr(l, doc)?;
            let rv = eval_expr(r, doc)?;
            Ok(Value::Bool(values_equal(&lv, &rv)))
        }
        Expr::Neq(l, r) => {
            let lv = eval_expr(l, doc)?;
            let rv = eval_expr(r, doc)?;
            Ok(Value::Bool(!values_equal(&lv, &rv)))
        }
        Expr::Lt(l, r) => compare(l, r, doc, Ordering::is_lt),
        Expr::Gt(l, r) => compare(l, r, doc, Ordering::is_gt),
        Expr::Lte(l, r) => compare(l, r, doc, Ordering::is_le),
        Expr::Gte(l, r) => compare(l, r, doc, Ordering::is_ge),
        Expr::In(needle, haystack) => {
            let nv = eval_expr(needle, doc)?;
            match eval_expr(haystack, doc)? {
                Value::Array(items) => Ok(Value::Bool(items.iter().any(|i| values_equal(i, &nv)))),
                Value::Null => Ok(Value::Null),
                other => Err(EvalError::TypeError(format!(
                    "`in` expects an array, got {other}"
                ))),
            }
        }
        Expr::And(l, r) => Ok(Value::Bool(eval_filter(l, doc)? && eval_filter(r, doc)?)),
        Expr::Or(l, r) => Ok(Value::Bool(eval_filter(l, doc)? || eval_filter(r, doc)?)),
        Expr::Not(inner) => Ok(Value::Bool(!eval_filter(inner, doc)?)),
        Expr::Filter(_) | Expr::Projection(_) | Expr::Pipeline(_) | Expr::Slice(..) => {
            Err(EvalError::Unsupported)
        }
    }
}

/// Run a query pipeline over a document set.
///
/// The first stage must be `Everything`; later stages are applied in order.
pub fn run_pipeline(expr: &Expr, docs: Vec<Value>) -> Result<Vec<Value>, EvalError> {
    let stages = match expr {
        Expr::Pipeline(stages) => stages.as_slice(),
        Expr::Everything => return Ok(docs),
        _ => return Err(EvalError::Unsupported),
    };
    match stages.first() {
        Some(Expr::Everything) => {}
        _ => {
            return Err(EvalError::TypeError(
                "pipeline must start with `*`".to_string(),
            ))
        }
    }

    let mut current = docs;
    for stage in &stages[1..] {
        current = match stage {
            Expr::Filter(predicate) => {
                let mut kept = Vec::with_capacity(current.len());
                for doc in current {
                    if eval_filter(predicate, &doc)? {
                        kept.push(doc);
                    }
                }
                kept
            }
            Expr::Projection(fields) => current
                .iter()
                .map(|doc| project(fields, doc))
                .collect::<Result<Vec<_>, _>>()?,
            Expr::Slice(start, end) => current
                .into_iter()
                .skip(*start)
                .take(end.saturating_sub(*start))
                .collect(),
            _ => return Err(EvalError::Unsupported),
        };
    }
    Ok(current)
}

fn project(fields: &[(String, Expr)], doc: &Value) -> Result<Value, EvalError> {
    let mut out = Map::new();
    for (name, expr) in fields {
        // Plain identifiers absent from the document are omitted, not nulled.
        if let Expr::Ident(key) = expr {
            if let Some(v) = doc.get(key) {
                out.insert(name.clone(), v.clone());
            }
            continue;
        }
        out.insert(name.clone(), eval_expr(expr, doc)?);
    }
    Ok(Value::Object(out))
}

fn compare(
    l: &Expr,
    r: &Expr,
    doc: &Value,
    accept: fn(Ordering) -> bool,
) -> Result<Value, EvalError> {
    let lv = eval_expr(l, doc)?;
    let rv = eval_expr(r, doc)?;
    Ok(match order_values(&lv, &rv) {
        Some(ord) => Value::Bool(accept(ord)),
        None => Value::Null,
    })
}

fn order_values(l: &Value, r: &Value) -> Option<Ordering> {
    match (l, r) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// Equality that treats `1` and `1.0` as the same number.
fn values_equal(l: &Value, r: &Value) -> bool {
    match (l, r) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => l == r,
    }
}
