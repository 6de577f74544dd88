//! SQL dialect renderer.
//!
//! Renders leaves to boolean SQL expressions with:
//! - Per-dialect identifier quoting (embedded quote characters doubled)
//! - Per-dialect placeholders for every client value
//! - `LIKE ... ESCAPE '!'` for the substring/prefix/suffix operators

use serde_json::Value;

use crate::adapter::AdapterId;
use crate::ast::{Direction, NullsPosition};
use crate::error::CompileError;
use crate::kind::{Operator, ScalarKind};
use crate::render::{mismatch, Binder, Fragment, Placeholder, PredicateRenderer, SortClause};
use crate::schema::FieldSpec;

/// Escape character used for pattern operators. `\` is avoided because
/// MySQL also treats it as a string-literal escape.
const LIKE_ESCAPE: char = '!';

/// The SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlFlavor {
    Postgres,
    MySql,
    Sqlite,
    MsSql,
}

/// Renderer for the relational adapters.
#[derive(Debug, Clone, Copy)]
pub struct SqlRenderer {
    flavor: SqlFlavor,
}

impl SqlRenderer {
    pub fn new(flavor: SqlFlavor) -> Self {
        Self { flavor }
    }

    pub fn flavor(&self) -> SqlFlavor {
        self.flavor
    }

    fn quote_segment(&self, segment: &str) -> String {
        match self.flavor {
            SqlFlavor::Postgres | SqlFlavor::Sqlite => {
                format!("\"{}\"", segment.replace('"', "\"\""))
            }
            SqlFlavor::MySql => format!("`{}`", segment.replace('`', "``")),
            SqlFlavor::MsSql => format!("[{}]", segment.replace(']', "]]")),
        }
    }

    /// Escape LIKE metacharacters so the client text matches literally.
    fn escape_like(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() + 4);
        for c in text.chars() {
            let special = matches!(c, '%' | '_' | LIKE_ESCAPE)
                || (c == '[' && self.flavor == SqlFlavor::MsSql);
            if special {
                out.push(LIKE_ESCAPE);
            }
            out.push(c);
        }
        out
    }

    fn pattern(
        &self,
        column: &str,
        field: &FieldSpec,
        op: Operator,
        value: &Value,
        binder: &mut Binder,
    ) -> Result<String, CompileError> {
        let text = expect_str(field, op, value)?;
        let escaped = self.escape_like(text);
        let pattern = match op {
            Operator::Contains => format!("%{}%", escaped),
            Operator::StartsWith => format!("{}%", escaped),
            _ => format!("%{}", escaped),
        };
        let p = binder.bind(Value::String(pattern));
        Ok(format!("{} LIKE {} ESCAPE '{}'", column, p, LIKE_ESCAPE))
    }

    fn unsupported(&self, field: &FieldSpec, op: Operator) -> CompileError {
        CompileError::UnsupportedOperator {
            field: field.name.clone(),
            operator: op.key().to_string(),
            kind: field.kind.to_string(),
            adapter: self.id(),
        }
    }

    fn unwrap_sql(&self, fragment: Fragment) -> Result<String, CompileError> {
        match fragment {
            Fragment::Sql(sql) => Ok(sql),
            other => Err(mismatch(self, &other)),
        }
    }

    fn join(&self, parts: Vec<Fragment>, sep: &str) -> Result<Fragment, CompileError> {
        let parts = parts
            .into_iter()
            .map(|p| self.unwrap_sql(p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Fragment::Sql(format!("({})", parts.join(sep))))
    }
}

impl PredicateRenderer for SqlRenderer {
    fn id(&self) -> AdapterId {
        match self.flavor {
            SqlFlavor::Postgres => AdapterId::Postgres,
            SqlFlavor::MySql => AdapterId::MySql,
            SqlFlavor::Sqlite => AdapterId::Sqlite,
            SqlFlavor::MsSql => AdapterId::MsSql,
        }
    }

    fn placeholder(&self) -> Placeholder {
        match self.flavor {
            SqlFlavor::Postgres => Placeholder::Dollar,
            SqlFlavor::MySql | SqlFlavor::Sqlite => Placeholder::Question,
            SqlFlavor::MsSql => Placeholder::AtP,
        }
    }

    fn supports_null_ordering(&self) -> bool {
        matches!(self.flavor, SqlFlavor::Postgres | SqlFlavor::Sqlite)
    }

    fn quote_ident(&self, ident: &str) -> String {
        ident
            .split('.')
            .map(|s| self.quote_segment(s))
            .collect::<Vec<_>>()
            .join(".")
    }

    fn render_leaf(
        &self,
        field: &FieldSpec,
        op: Operator,
        value: &Value,
        binder: &mut Binder,
    ) -> Result<Fragment, CompileError> {
        let col = self.quote_ident(&field.native_ref);
        let is_array = field.kind == ScalarKind::Array;

        let sql = match op {
            Operator::Eq => format!("{} = {}", col, binder.bind(value.clone())),
            Operator::Neq => format!("{} <> {}", col, binder.bind(value.clone())),
            Operator::Gt => format!("{} > {}", col, binder.bind(value.clone())),
            Operator::Gte => format!("{} >= {}", col, binder.bind(value.clone())),
            Operator::Lt => format!("{} < {}", col, binder.bind(value.clone())),
            Operator::Lte => format!("{} <= {}", col, binder.bind(value.clone())),
            Operator::In | Operator::NotIn => {
                let items = expect_list(field, op, value)?;
                if items.is_empty() {
                    // Empty membership: nothing is in it, everything is outside it.
                    if op == Operator::In {
                        return Ok(self.never());
                    }
                    return Ok(self.always());
                }
                let placeholders: Vec<String> =
                    items.iter().map(|v| binder.bind(v.clone())).collect();
                let keyword = if op == Operator::In { "IN" } else { "NOT IN" };
                format!("{} {} ({})", col, keyword, placeholders.join(", "))
            }
            Operator::Like => format!("{} LIKE {}", col, binder.bind(value.clone())),
            Operator::Ilike => {
                let p = binder.bind(value.clone());
                if self.flavor == SqlFlavor::Postgres {
                    format!("{} ILIKE {}", col, p)
                } else {
                    format!("LOWER({}) LIKE LOWER({})", col, p)
                }
            }
            Operator::Contains if is_array => {
                if self.flavor != SqlFlavor::Postgres {
                    return Err(self.unsupported(field, op));
                }
                format!("{} @> {}", col, binder.bind(value.clone()))
            }
            Operator::Overlaps => {
                if self.flavor != SqlFlavor::Postgres {
                    return Err(self.unsupported(field, op));
                }
                format!("{} && {}", col, binder.bind(value.clone()))
            }
            Operator::Contains | Operator::StartsWith | Operator::EndsWith => {
                self.pattern(&col, field, op, value, binder)?
            }
            Operator::Between => {
                let (low, high) = expect_range(field, op, value)?;
                let low = binder.bind(low.clone());
                let high = binder.bind(high.clone());
                format!("{} BETWEEN {} AND {}", col, low, high)
            }
            Operator::IsNull => match value.as_bool() {
                Some(true) => format!("{} IS NULL", col),
                Some(false) => format!("{} IS NOT NULL", col),
                None => return Err(invalid(field, op, "expected a boolean")),
            },
            Operator::Match
            | Operator::MatchPhrase
            | Operator::Near
            | Operator::WithinDistance
            | Operator::WithinBounds => return Err(self.unsupported(field, op)),
        };
        Ok(Fragment::Sql(sql))
    }

    fn always(&self) -> Fragment {
        Fragment::Sql("1=1".to_string())
    }

    fn never(&self) -> Fragment {
        Fragment::Sql("1=0".to_string())
    }

    fn all(&self, mut parts: Vec<Fragment>) -> Result<Fragment, CompileError> {
        match parts.len() {
            0 => Ok(self.always()),
            1 => Ok(Fragment::Sql(self.unwrap_sql(parts.remove(0))?)),
            _ => self.join(parts, " AND "),
        }
    }

    fn any(&self, mut parts: Vec<Fragment>) -> Result<Fragment, CompileError> {
        match parts.len() {
            0 => Ok(self.never()),
            1 => Ok(Fragment::Sql(self.unwrap_sql(parts.remove(0))?)),
            _ => self.join(parts, " OR "),
        }
    }

    fn negate(&self, part: Fragment) -> Result<Fragment, CompileError> {
        let sql = self.unwrap_sql(part)?;
        Ok(Fragment::Sql(format!("NOT ({})", sql)))
    }

    fn sort_clause(
        &self,
        field: &FieldSpec,
        direction: Direction,
        nulls: NullsPosition,
    ) -> SortClause {
        let nulls = match nulls {
            NullsPosition::Default => None,
            _ if self.supports_null_ordering() => Some(nulls),
            _ => None,
        };
        SortClause {
            column: self.quote_ident(&field.native_ref),
            direction,
            nulls,
        }
    }

    fn accepts(&self, fragment: &Fragment) -> bool {
        matches!(fragment, Fragment::Sql(_))
    }
}

pub(crate) fn invalid(field: &FieldSpec, op: Operator, message: &str) -> CompileError {
    CompileError::InvalidOperand {
        field: field.name.clone(),
        operator: op.key().to_string(),
        message: message.to_string(),
    }
}

pub(crate) fn expect_str<'v>(
    field: &FieldSpec,
    op: Operator,
    value: &'v Value,
) -> Result<&'v str, CompileError> {
    value
        .as_str()
        .ok_or_else(|| invalid(field, op, "expected a string"))
}

pub(crate) fn expect_list<'v>(
    field: &FieldSpec,
    op: Operator,
    value: &'v Value,
) -> Result<&'v [Value], CompileError> {
    value
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| invalid(field, op, "expected a list"))
}

pub(crate) fn expect_range<'v>(
    field: &FieldSpec,
    op: Operator,
    value: &'v Value,
) -> Result<(&'v Value, &'v Value), CompileError> {
    match expect_list(field, op, value)? {
        [low, high] => Ok((low, high)),
        _ => Err(invalid(field, op, "expected [low, high]")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    fn render(flavor: SqlFlavor, field: &FieldSpec, op: Operator, value: Value) -> (String, Vec<Value>) {
        let renderer = SqlRenderer::new(flavor);
        let mut binder = renderer.new_binder();
        match renderer.render_leaf(field, op, &value, &mut binder).unwrap() {
            Fragment::Sql(sql) => (sql, binder.into_params()),
            other => panic!("expected SQL, got {:?}", other),
        }
    }

    fn name() -> FieldSpec {
        FieldSpec::new("name", ScalarKind::String)
    }

    // ===== quoting =====

    #[test_case(SqlFlavor::Postgres, "users.age", "\"users\".\"age\"")]
    #[test_case(SqlFlavor::Sqlite, "we\"ird", "\"we\"\"ird\"")]
    #[test_case(SqlFlavor::MySql, "users.age", "`users`.`age`")]
    #[test_case(SqlFlavor::MySql, "a`b", "`a``b`")]
    #[test_case(SqlFlavor::MsSql, "users.age", "[users].[age]")]
    #[test_case(SqlFlavor::MsSql, "a]b", "[a]]b]")]
    fn test_quote_ident(flavor: SqlFlavor, ident: &str, expected: &str) {
        assert_eq!(SqlRenderer::new(flavor).quote_ident(ident), expected);
    }

    // ===== leaves =====

    #[test]
    fn test_placeholders_per_flavor() {
        let age = FieldSpec::new("age", ScalarKind::Integer).column("age_years");
        let range = json!([18, 65]);

        let (pg, params) = render(SqlFlavor::Postgres, &age, Operator::Between, range.clone());
        insta::assert_snapshot!(pg, @r#""age_years" BETWEEN $1 AND $2"#);
        assert_eq!(params, vec![json!(18), json!(65)]);

        let (mysql, _) = render(SqlFlavor::MySql, &age, Operator::Between, range.clone());
        insta::assert_snapshot!(mysql, @"`age_years` BETWEEN ? AND ?");

        let (mssql, _) = render(SqlFlavor::MsSql, &age, Operator::Between, range);
        insta::assert_snapshot!(mssql, @"[age_years] BETWEEN @p1 AND @p2");
    }

    #[test]
    fn test_membership() {
        let (sql, params) = render(
            SqlFlavor::Postgres,
            &name(),
            Operator::In,
            json!(["a", "b"]),
        );
        insta::assert_snapshot!(sql, @r#""name" IN ($1, $2)"#);
        assert_eq!(params.len(), 2);

        let (empty_in, params) = render(SqlFlavor::Sqlite, &name(), Operator::In, json!([]));
        assert_eq!(empty_in, "1=0");
        assert!(params.is_empty());

        let (empty_not_in, _) = render(SqlFlavor::Sqlite, &name(), Operator::NotIn, json!([]));
        assert_eq!(empty_not_in, "1=1");
    }

    #[test]
    fn test_pattern_operators_escape_metacharacters() {
        let (sql, params) = render(
            SqlFlavor::MySql,
            &name(),
            Operator::Contains,
            json!("50%_off!"),
        );
        insta::assert_snapshot!(sql, @"`name` LIKE ? ESCAPE '!'");
        assert_eq!(params, vec![json!("%50!%!_off!!%")]);

        let (_, params) = render(SqlFlavor::MsSql, &name(), Operator::StartsWith, json!("[x"));
        assert_eq!(params, vec![json!("![x%")]);

        let (_, params) = render(SqlFlavor::Postgres, &name(), Operator::EndsWith, json!("son"));
        assert_eq!(params, vec![json!("%son")]);
    }

    #[test]
    fn test_like_binds_client_pattern_verbatim() {
        let (sql, params) = render(SqlFlavor::Postgres, &name(), Operator::Ilike, json!("jo%"));
        assert_eq!(sql, "\"name\" ILIKE $1");
        assert_eq!(params, vec![json!("jo%")]);
    }

    #[test]
    fn test_null_checks() {
        let (is_null, params) = render(SqlFlavor::Postgres, &name(), Operator::IsNull, json!(true));
        assert_eq!(is_null, "\"name\" IS NULL");
        assert!(params.is_empty());

        let (not_null, _) = render(SqlFlavor::Postgres, &name(), Operator::IsNull, json!(false));
        assert_eq!(not_null, "\"name\" IS NOT NULL");
    }

    #[test]
    fn test_postgres_array_operators() {
        let tags = FieldSpec::new("tags", ScalarKind::Array);
        let (contains, _) = render(SqlFlavor::Postgres, &tags, Operator::Contains, json!(["a"]));
        assert_eq!(contains, "\"tags\" @> $1");

        let (overlaps, _) = render(SqlFlavor::Postgres, &tags, Operator::Overlaps, json!(["a"]));
        assert_eq!(overlaps, "\"tags\" && $1");

        let renderer = SqlRenderer::new(SqlFlavor::MySql);
        let mut binder = renderer.new_binder();
        let err = renderer
            .render_leaf(&tags, Operator::Overlaps, &json!(["a"]), &mut binder)
            .unwrap_err();
        assert!(matches!(err, CompileError::UnsupportedOperator { .. }));
    }

    // ===== combinators =====

    #[test]
    fn test_combinators() {
        let renderer = SqlRenderer::new(SqlFlavor::Postgres);
        let a = Fragment::Sql("a".to_string());
        let b = Fragment::Sql("b".to_string());

        assert_eq!(
            renderer.all(vec![a.clone(), b.clone()]).unwrap(),
            Fragment::Sql("(a AND b)".to_string())
        );
        assert_eq!(
            renderer.any(vec![a.clone(), b]).unwrap(),
            Fragment::Sql("(a OR b)".to_string())
        );
        assert_eq!(renderer.all(vec![a.clone()]).unwrap(), a);
        assert_eq!(renderer.all(Vec::new()).unwrap(), renderer.always());
        assert_eq!(renderer.any(Vec::new()).unwrap(), renderer.never());
        assert_eq!(
            renderer.negate(a).unwrap(),
            Fragment::Sql("NOT (a)".to_string())
        );
    }

    #[test]
    fn test_document_fragment_is_mismatch() {
        let renderer = SqlRenderer::new(SqlFlavor::Sqlite);
        let err = renderer
            .negate(Fragment::Document(json!({"match_all": {}})))
            .unwrap_err();
        assert_eq!(
            err,
            CompileError::AdapterMismatch {
                expected: "sqlite".to_string(),
                found: "document".to_string(),
            }
        );
    }

    #[test]
    fn test_sort_clause_drops_unsupported_nulls() {
        let age = FieldSpec::new("age", ScalarKind::Integer);
        let pg = SqlRenderer::new(SqlFlavor::Postgres).sort_clause(
            &age,
            Direction::Desc,
            NullsPosition::Last,
        );
        assert_eq!(pg.nulls, Some(NullsPosition::Last));

        let mysql = SqlRenderer::new(SqlFlavor::MySql).sort_clause(
            &age,
            Direction::Desc,
            NullsPosition::Last,
        );
        assert_eq!(mysql.column, "`age`");
        assert_eq!(mysql.nulls, None);
    }
}
