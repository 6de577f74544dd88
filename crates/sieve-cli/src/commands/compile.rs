use anyhow::Result;
use serde_json::{json, Value};

use sieve_config::SieveConfig;
use sieve_query::{FilterEngine, NativePredicate, NativeSort};

use super::{parse_json_arg, read_json_arg};

pub fn execute(config: SieveConfig, entity: String, filter: String, order: Option<String>) -> Result<()> {
    let output = render(&config, &entity, &filter, order.as_deref())?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Compile and shape the result for printing.
pub fn render(config: &SieveConfig, entity: &str, filter: &str, order: Option<&str>) -> Result<Value> {
    let engine = FilterEngine::from_config(config)?;

    let filter_text = read_json_arg(filter)?;
    let bound = engine.parse_filter_str(entity, &filter_text)?;
    let predicate = engine.compile_filter(&bound)?;

    let sort = match order {
        Some(order) => Some(engine.order(entity, &parse_json_arg(order)?)?),
        None => None,
    };

    Ok(shape(&predicate, sort.as_ref()))
}

fn shape(predicate: &NativePredicate, sort: Option<&NativeSort>) -> Value {
    let mut out = json!({ "adapter": predicate.adapter });
    match (predicate.sql(), predicate.document()) {
        (Some(sql), _) => {
            out["where"] = Value::from(sql);
            out["params"] = Value::Array(predicate.params.clone());
        }
        (None, Some(doc)) => out["query"] = doc.clone(),
        (None, None) => {}
    }

    if let Some(sort) = sort.filter(|s| !s.is_empty()) {
        match sort.to_sql() {
            Some(order_by) => out["order_by"] = Value::from(order_by),
            None => out["sort"] = sort.to_document(),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use sieve_config::TestConfigBuilder;

    fn config(adapter: &str) -> SieveConfig {
        TestConfigBuilder::new()
            .sample_schema()
            .adapter(adapter)
            .build()
    }

    #[test]
    fn test_render_sql() {
        let out = render(
            &config("postgres"),
            "User",
            r#"{"_or": [{"status": {"_eq": "active"}}, {"age": {"_gte": 18}}]}"#,
            Some(r#"[{"age": "desc"}]"#),
        )
        .unwrap();

        insta::assert_json_snapshot!(out, @r###"
        {
          "adapter": "postgres",
          "where": "(\"status\" = $1 OR \"age\" >= $2)",
          "params": [
            "active",
            18
          ],
          "order_by": "\"age\" DESC"
        }
        "###);
    }

    #[test]
    fn test_render_search() {
        let out = render(
            &config("search"),
            "User",
            r#"{"name": {"_eq": "Ada"}}"#,
            Some(r#"[{"age": "asc_nulls_last"}]"#),
        )
        .unwrap();

        assert_eq!(out["query"], json!({"term": {"name": "Ada"}}));
        assert_eq!(out["sort"], json!([{"age": {"order": "asc", "missing": "_last"}}]));
        assert!(out.get("params").is_none());
    }

    #[test]
    fn test_render_rejects_illegal_operator() {
        let err = render(&config("mysql"), "User", r#"{"name": {"_ilike": "a%"}}"#, None)
            .unwrap_err();
        assert!(err.to_string().contains("mysql"));
    }

    #[test]
    fn test_filter_from_file() {
        let file = sieve_config::write_temp_config(r#"{"age": {"_lt": 30}}"#, "json").unwrap();
        let arg = format!("@{}", file.path().display());

        let out = render(&config("sqlite"), "User", &arg, None).unwrap();
        assert_eq!(out["where"], "\"age\" < ?");
    }
}
