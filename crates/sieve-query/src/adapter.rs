//! Adapter identifiers and backend inference.
//!
//! An engine is bound to exactly one adapter at startup. The adapter decides
//! which operators are legal per kind and which renderer emits the native
//! predicate.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::error::SchemaError;

/// Backend dialect a filter engine is bound to.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum AdapterId {
    #[default]
    Postgres,
    MySql,
    Sqlite,
    MsSql,
    /// Document-style search index (Elasticsearch/OpenSearch query DSL).
    Search,
}

impl AdapterId {
    pub const ALL: [AdapterId; 5] = [
        AdapterId::Postgres,
        AdapterId::MySql,
        AdapterId::Sqlite,
        AdapterId::MsSql,
        AdapterId::Search,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AdapterId::Postgres => "postgres",
            AdapterId::MySql => "mysql",
            AdapterId::Sqlite => "sqlite",
            AdapterId::MsSql => "mssql",
            AdapterId::Search => "search",
        }
    }

    /// True for the relational dialects.
    pub fn is_sql(self) -> bool {
        !matches!(self, AdapterId::Search)
    }

    /// Infer an adapter from a storage backend identifier such as
    /// `Ecto.Adapters.Postgres`, `mariadb` or `opensearch`.
    pub fn infer_from_backend(backend: &str) -> Option<Self> {
        let backend = backend.to_ascii_lowercase();
        let has = |needles: &[&str]| needles.iter().any(|n| backend.contains(n));

        if has(&["postgres", "pgsql", "cockroach"]) || backend == "pg" {
            Some(AdapterId::Postgres)
        } else if has(&["mysql", "mariadb", "myxql"]) {
            Some(AdapterId::MySql)
        } else if has(&["sqlite"]) {
            Some(AdapterId::Sqlite)
        } else if has(&["mssql", "sqlserver", "sql_server", "tds"]) {
            Some(AdapterId::MsSql)
        } else if has(&["elasticsearch", "opensearch", "search"]) {
            Some(AdapterId::Search)
        } else {
            None
        }
    }

    /// Resolve the bound adapter.
    ///
    /// An explicit name always wins and must be known. Otherwise the adapter
    /// is inferred from the backend identifier; an unrecognised backend and a
    /// missing backend both fall back to [`AdapterId::Postgres`].
    pub fn resolve(explicit: Option<&str>, backend: Option<&str>) -> Result<Self, SchemaError> {
        if let Some(name) = explicit {
            let adapter = name.parse()?;
            debug!(adapter = %adapter, "Using explicitly configured adapter");
            return Ok(adapter);
        }

        match backend {
            Some(backend) => match Self::infer_from_backend(backend) {
                Some(adapter) => {
                    debug!(backend, adapter = %adapter, "Inferred adapter from backend");
                    Ok(adapter)
                }
                None => {
                    warn!(
                        backend,
                        "Unrecognised backend, falling back to the postgres adapter"
                    );
                    Ok(AdapterId::Postgres)
                }
            },
            None => Ok(AdapterId::Postgres),
        }
    }
}

impl fmt::Display for AdapterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AdapterId {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(AdapterId::Postgres),
            "mysql" | "mariadb" => Ok(AdapterId::MySql),
            "sqlite" | "sqlite3" => Ok(AdapterId::Sqlite),
            "mssql" | "sqlserver" => Ok(AdapterId::MsSql),
            "search" | "elasticsearch" | "opensearch" => Ok(AdapterId::Search),
            _ => Err(SchemaError::UnknownAdapter(s.to_string())),
        }
    }
}
