use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde_json::Value;

use crate::ast::Expr;
use crate::error::QueryError;
use crate::eval::run_pipeline;
use crate::source::ContentSource;

/// Entry point for querying content collections.
#[derive(Clone)]
pub struct ContentQueryService {
    source: Arc<dyn ContentSource>,
}

impl ContentQueryService {
    pub fn new(source: Arc<dyn ContentSource>) -> Self {
        Self { source }
    }

    /// Start a query against the named collection.
    pub fn query_collection(&self, name: impl Into<String>) -> CollectionQuery {
        CollectionQuery {
            source: Arc::clone(&self.source),
            collection: name.into(),
            fields: Vec::new(),
            conditions: Vec::new(),
        }
    }

    pub async fn ping(&self) -> Result<(), QueryError> {
        self.source.ping().await
    }
}

impl fmt::Debug for ContentQueryService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentQueryService").finish_non_exhaustive()
    }
}

/// Comparison operator accepted by [`CollectionQuery::where_op`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Neq,
    Lt,
    Gt,
    Lte,
    Gte,
    In,
}

impl FromStr for Op {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "=" | "==" => Ok(Op::Eq),
            "<>" | "!=" => Ok(Op::Neq),
            "<" => Ok(Op::Lt),
            ">" => Ok(Op::Gt),
            "<=" => Ok(Op::Lte),
            ">=" => Ok(Op::Gte),
            "IN" => Ok(Op::In),
            other => Err(QueryError::Eval(crate::eval::EvalError::TypeError(format!(
                "unknown operator {other:?}"
            )))),
        }
    }
}

impl Op {
    fn apply(self, field: Expr, value: Expr) -> Expr {
        let (l, r) = (Box::new(field), Box::new(value));
        match self {
            Op::Eq => Expr::Eq(l, r),
            Op::Neq => Expr::Neq(l, r),
            Op::Lt => Expr::Lt(l, r),
            Op::Gt => Expr::Gt(l, r),
            Op::Lte => Expr::Lte(l, r),
            Op::Gte => Expr::Gte(l, r),
            Op::In => Expr::In(l, r),
        }
    }
}

/// A query under construction: projection plus conjunctive conditions.
pub struct CollectionQuery {
    source: Arc<dyn ContentSource>,
    collection: String,
    fields: Vec<String>,
    conditions: Vec<Expr>,
}

impl CollectionQuery {
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Restrict returned documents to these fields. Without a call to
    /// `select` documents are returned whole.
    pub fn select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn where_eq(self, field: &str, value: impl Into<Value>) -> Self {
        self.where_op(field, Op::Eq, value)
    }

    pub fn where_op(mut self, field: &str, op: Op, value: impl Into<Value>) -> Self {
        let value = value.into();
        self.conditions
            .push(op.apply(Expr::path(field), Expr::literal(&value)));
        self
    }

    /// The pipeline this query evaluates.
    pub fn to_expr(&self) -> Expr {
        let mut stages = vec![Expr::Everything];
        if let Some(filter) = Expr::all_of(self.conditions.iter().cloned()) {
            stages.push(Expr::Filter(Box::new(filter)));
        }
        if !self.fields.is_empty() {
            stages.push(Expr::Projection(
                self.fields
                    .iter()
                    .map(|f| (f.clone(), Expr::Ident(f.clone())))
                    .collect(),
            ));
        }
        Expr::Pipeline(stages)
    }

    /// All matching documents, in source order.
    pub async fn all(self) -> Result<Vec<Value>, QueryError> {
        let expr = self.to_expr();
        let docs = self.source.documents(&self.collection).await?;
        let out = run_pipeline(&expr, docs)?;
        tracing::debug!(collection = %self.collection, matched = out.len(), "collection query");
        Ok(out)
    }

    /// The first matching document, if any.
    pub async fn first(self) -> Result<Option<Value>, QueryError> {
        let mut expr = self.to_expr();
        if let Expr::Pipeline(stages) = &mut expr {
            stages.push(Expr::Slice(0, 1));
        }
        let docs = self.source.documents(&self.collection).await?;
        Ok(run_pipeline(&expr, docs)?.into_iter().next())
    }
}
