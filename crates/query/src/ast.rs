use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Content query expression tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    // Literals
    StringLiteral(String),
    IntLiteral(i64),
    FloatLiteral(f64),
    BoolLiteral(bool),
    Null,
    Array(Vec<Expr>),
    Object(Vec<(String, Expr)>),

    // Identifiers & access
    Ident(String),
    DotAccess(Box<Expr>, String),
    This,

    // Comparison operators
    Eq(Box<Expr>, Box<Expr>),
    Neq(Box<Expr>, Box<Expr>),
    Lt(Box<Expr>, Box<Expr>),
    Gt(Box<Expr>, Box<Expr>),
    Lte(Box<Expr>, Box<Expr>),
    Gte(Box<Expr>, Box<Expr>),
    In(Box<Expr>, Box<Expr>),

    // Logical operators
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),

    // Query constructs
    Everything,
    Filter(Box<Expr>),
    Projection(Vec<(String, Expr)>),
    Pipeline(Vec<Expr>),
    /// Keep documents in `start..end` of the current set.
    Slice(usize, usize),
}

impl Expr {
    /// Lift a JSON value into a literal expression.
    pub fn literal(value: &Value) -> Expr {
        match value {
            Value::Null => Expr::Null,
            Value::Bool(b) => Expr::BoolLiteral(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Expr::IntLiteral(i),
                None => Expr::FloatLiteral(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => Expr::StringLiteral(s.clone()),
            Value::Array(items) => Expr::Array(items.iter().map(Expr::literal).collect()),
            Value::Object(map) => Expr::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Expr::literal(v)))
                    .collect(),
            ),
        }
    }

    /// Parse a dotted field path (`image.src`) into an access expression.
    pub fn path(field: &str) -> Expr {
        let mut parts = field.split('.');
        let head = parts.next().unwrap_or_default();
        parts.fold(Expr::Ident(head.to_string()), |base, part| {
            Expr::DotAccess(Box::new(base), part.to_string())
        })
    }

    /// Conjunction of all `exprs`, or `None` when empty.
    pub fn all_of(exprs: impl IntoIterator<Item = Expr>) -> Option<Expr> {
        exprs
            .into_iter()
            .reduce(|acc, next| Expr::And(Box::new(acc), Box::new(next)))
    }
}
