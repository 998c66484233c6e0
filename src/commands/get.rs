//! # Get Command Implementation
//!
//! Prints the chamber stored at a path as its JSON document, after
//! inheritance when the store is inheritable. With `--rule` only that rule's
//! value is printed, resolved for the version given by `--at` (base value
//! when omitted).

use anyhow::{Context, Result};
use clap::Args;

use realm::cancel::CancellationToken;
use realm::chamber::Chamber;
use realm::error::Error;
use realm::rule::Rule;
use realm::storage::{ChamberStorage, Storage};
use realm::version;

/// Print a chamber, or one rule resolved for a version
#[derive(Args, Debug)]
pub struct GetArgs {
    /// Logical path of the chamber, e.g. /teams/search.
    pub path: String,

    /// Print only this rule's resolved value.
    #[arg(long, value_name = "NAME")]
    pub rule: Option<String>,

    /// Consumer version to resolve the rule for.
    #[arg(long, value_name = "VERSION", requires = "rule")]
    pub at: Option<String>,
}

/// Execute the `get` command.
pub fn execute(args: GetArgs, storage: &dyn Storage, token: &CancellationToken) -> Result<()> {
    let chamber = storage
        .get_chamber(token, &args.path)
        .with_context(|| format!("Failed to read chamber {}", args.path))?;

    match &args.rule {
        None => println!("{}", serde_json::to_string_pretty(&chamber)?),
        Some(name) => {
            let version = args.at.as_deref().unwrap_or("");
            let value = resolve(&chamber, name, version)?;
            println!("{}", serde_json::to_string(value)?);
        }
    }
    Ok(())
}

fn resolve<'a>(chamber: &'a Chamber, name: &str, version: &str) -> Result<&'a Rule> {
    if !version.is_empty() {
        version::parse_version(version)?;
    }
    let rule = chamber.get(name).ok_or_else(|| Error::RuleNotFound {
        key: name.to_string(),
    })?;
    Ok(rule.value_at_version(version))
}

#[cfg(test)]
mod tests {
    use super::*;
    use realm::overrides::{Override, OverrideableRule};

    fn chamber() -> Chamber {
        let rule = OverrideableRule::with_overrides(
            "base",
            vec![Override::new("1.0.0", "1.9.9", "one").unwrap()],
        )
        .unwrap();
        Chamber::new("c").with_rule("mode", rule)
    }

    #[test]
    fn test_resolve_for_version() {
        let chamber = chamber();
        assert_eq!(resolve(&chamber, "mode", "v1.2.0").unwrap().as_str(), Some("one"));
        assert_eq!(resolve(&chamber, "mode", "").unwrap().as_str(), Some("base"));
        assert_eq!(resolve(&chamber, "mode", "2.0.0").unwrap().as_str(), Some("base"));
    }

    #[test]
    fn test_resolve_errors() {
        let chamber = chamber();
        assert!(resolve(&chamber, "missing", "").is_err());
        assert!(resolve(&chamber, "mode", "not-a-version").is_err());
    }
}
