use anyhow::Result;

use sieve_config::SieveConfig;
use sieve_query::{FilterEngine, ScalarKind};

pub fn execute(config: SieveConfig, kind: Option<String>) -> Result<()> {
    print!("{}", render(&config, kind.as_deref())?);
    Ok(())
}

/// `kind: _eq, _neq, ...` per kind under the bound adapter. Kinds without a
/// set of their own show the fallback they use.
pub fn render(config: &SieveConfig, kind: Option<&str>) -> Result<String> {
    let engine = FilterEngine::from_config(config)?;
    let registry = engine.registry();
    let adapter = engine.adapter();

    let kinds: Vec<ScalarKind> = match kind {
        Some(kind) => vec![kind.parse()?],
        None => registry.kinds(),
    };

    let mut out = format!("adapter: {}\n", adapter);
    for kind in &kinds {
        let effective = registry.effective_kind(kind, adapter);
        let keys: Vec<&str> = registry
            .operators_for(effective, adapter)
            .iter()
            .map(|op| op.key())
            .collect();
        if effective == kind {
            out.push_str(&format!("{}: {}\n", kind, keys.join(", ")));
        } else {
            out.push_str(&format!("{} (as {}): {}\n", kind, effective, keys.join(", ")));
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sieve_config::TestConfigBuilder;

    #[test]
    fn test_single_kind() {
        let config = TestConfigBuilder::new().adapter("mysql").build();
        let out = render(&config, Some("string")).unwrap();

        assert!(out.starts_with("adapter: mysql\n"));
        assert!(out.contains("_like"));
        assert!(!out.contains("_ilike"));
    }

    #[test]
    fn test_fallback_shown() {
        let config = TestConfigBuilder::new().adapter("sqlite").build();
        let out = render(&config, Some("array")).unwrap();
        assert!(out.contains("(as generic)"));
    }

    #[test]
    fn test_enums_listed() {
        let config = TestConfigBuilder::new().sample_schema().build();
        let out = render(&config, None).unwrap();
        assert!(out.lines().any(|l| l.starts_with("enum:Status: ")));
    }

    #[test]
    fn test_unknown_kind() {
        let config = SieveConfig::default();
        assert!(render(&config, Some("quaternion")).is_err());
    }
}
