//! Dialect renderers.
//!
//! A renderer turns validated leaves into native fragments and combines
//! them. SQL dialects emit text with placeholders and push values into a
//! [`Binder`]; the search dialect emits a JSON query document with values in
//! value positions only.

mod search;
mod sql;

pub use search::SearchRenderer;
pub use sql::{SqlFlavor, SqlRenderer};

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::adapter::AdapterId;
use crate::ast::{Direction, NullsPosition};
use crate::error::CompileError;
use crate::kind::Operator;
use crate::schema::FieldSpec;

/// Placeholder style for bound parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// `$1, $2, ...`
    Dollar,
    /// `?`
    Question,
    /// `@p1, @p2, ...`
    AtP,
    /// Values are embedded in the document; nothing is bound.
    Inline,
}

/// Collects bound parameters in placeholder order.
#[derive(Debug, Clone)]
pub struct Binder {
    style: Placeholder,
    params: Vec<Value>,
}

impl Binder {
    pub fn new(style: Placeholder) -> Self {
        Self {
            style,
            params: Vec::new(),
        }
    }

    /// Bind `value` and return the placeholder that refers to it.
    pub fn bind(&mut self, value: Value) -> String {
        if self.style == Placeholder::Inline {
            return String::new();
        }
        self.params.push(value);
        let n = self.params.len();
        match self.style {
            Placeholder::Dollar => format!("${}", n),
            Placeholder::Question => "?".to_string(),
            Placeholder::AtP => format!("@p{}", n),
            Placeholder::Inline => String::new(),
        }
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    pub fn into_params(self) -> Vec<Value> {
        self.params
    }
}

/// A native predicate fragment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Fragment {
    /// SQL boolean expression for a `WHERE` clause.
    Sql(String),
    /// Search-index query document.
    Document(Value),
}

impl Fragment {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Fragment::Sql(_) => "sql",
            Fragment::Document(_) => "document",
        }
    }
}

/// A compiled filter: fragment plus bound parameters, tagged with the adapter
/// it was produced for.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NativePredicate {
    pub adapter: AdapterId,
    pub fragment: Fragment,
    pub params: Vec<Value>,
}

impl NativePredicate {
    pub fn sql(&self) -> Option<&str> {
        match &self.fragment {
            Fragment::Sql(sql) => Some(sql),
            Fragment::Document(_) => None,
        }
    }

    pub fn document(&self) -> Option<&Value> {
        match &self.fragment {
            Fragment::Document(doc) => Some(doc),
            Fragment::Sql(_) => None,
        }
    }
}

/// One lowered order clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortClause {
    /// Native column: quoted for SQL, a field path for search.
    pub column: String,
    pub direction: Direction,
    /// `None` when the client left it to the backend or the dialect cannot
    /// express it.
    pub nulls: Option<NullsPosition>,
}

/// A compiled order expression.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NativeSort {
    pub adapter: AdapterId,
    pub clauses: Vec<SortClause>,
}

impl NativeSort {
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// `ORDER BY` body, or `None` for an empty order or the search dialect.
    pub fn to_sql(&self) -> Option<String> {
        if self.clauses.is_empty() || !self.adapter.is_sql() {
            return None;
        }
        let parts: Vec<String> = self
            .clauses
            .iter()
            .map(|c| match c.nulls {
                Some(NullsPosition::First) => format!("{} {} NULLS FIRST", c.column, c.direction),
                Some(NullsPosition::Last) => format!("{} {} NULLS LAST", c.column, c.direction),
                _ => format!("{} {}", c.column, c.direction),
            })
            .collect();
        Some(parts.join(", "))
    }

    /// Search `sort` array: `[{"field": {"order": "desc", "missing": "_last"}}]`.
    pub fn to_document(&self) -> Value {
        let clauses = self
            .clauses
            .iter()
            .map(|c| {
                let mut spec = serde_json::Map::new();
                let order = match c.direction {
                    Direction::Asc => "asc",
                    Direction::Desc => "desc",
                };
                spec.insert("order".to_string(), Value::from(order));
                match c.nulls {
                    Some(NullsPosition::First) => {
                        spec.insert("missing".to_string(), Value::from("_first"));
                    }
                    Some(NullsPosition::Last) => {
                        spec.insert("missing".to_string(), Value::from("_last"));
                    }
                    _ => {}
                }
                search::obj(&c.column, Value::Object(spec))
            })
            .collect();
        Value::Array(clauses)
    }
}

/// Dialect-specific rendering.
pub trait PredicateRenderer: Send + Sync {
    fn id(&self) -> AdapterId;

    fn placeholder(&self) -> Placeholder;

    fn supports_null_ordering(&self) -> bool;

    /// Quote a possibly dotted identifier.
    fn quote_ident(&self, ident: &str) -> String;

    /// Render one validated leaf.
    fn render_leaf(
        &self,
        field: &FieldSpec,
        op: Operator,
        value: &Value,
        binder: &mut Binder,
    ) -> Result<Fragment, CompileError>;

    /// Matches everything.
    fn always(&self) -> Fragment;

    /// Matches nothing.
    fn never(&self) -> Fragment;

    fn all(&self, parts: Vec<Fragment>) -> Result<Fragment, CompileError>;

    fn any(&self, parts: Vec<Fragment>) -> Result<Fragment, CompileError>;

    fn negate(&self, part: Fragment) -> Result<Fragment, CompileError>;

    fn sort_clause(&self, field: &FieldSpec, direction: Direction, nulls: NullsPosition)
        -> SortClause;

    /// Whether `fragment` is of the kind this dialect produces.
    fn accepts(&self, fragment: &Fragment) -> bool;

    fn new_binder(&self) -> Binder {
        Binder::new(self.placeholder())
    }
}

/// The renderer for `adapter`.
pub fn renderer_for(adapter: AdapterId) -> Arc<dyn PredicateRenderer> {
    match adapter {
        AdapterId::Postgres => Arc::new(SqlRenderer::new(SqlFlavor::Postgres)),
        AdapterId::MySql => Arc::new(SqlRenderer::new(SqlFlavor::MySql)),
        AdapterId::Sqlite => Arc::new(SqlRenderer::new(SqlFlavor::Sqlite)),
        AdapterId::MsSql => Arc::new(SqlRenderer::new(SqlFlavor::MsSql)),
        AdapterId::Search => Arc::new(SearchRenderer),
    }
}

pub(crate) fn mismatch(renderer: &dyn PredicateRenderer, found: &Fragment) -> CompileError {
    CompileError::AdapterMismatch {
        expected: renderer.id().to_string(),
        found: found.kind_name().to_string(),
    }
}
