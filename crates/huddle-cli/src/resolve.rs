//! Result references and TOML write-back.
//!
//! - [`resolve_result`] accepts either a 1-based index into the current
//!   results or a prefix of a result's id.
//! - [`read_plan_file`] parses a plan edited by hand.
//! - [`write_plan_id_to_file`] uses `toml_edit` to surgically insert
//!   `id = "..."` at the top of a plan file without disturbing comments
//!   or formatting.

use std::path::Path;

use anyhow::{Context, Result, bail};

use huddle_core::export;
use huddle_db::models::PlanningItem;

/// Find the result `reference` points at.
///
/// A reference that parses as a number is an index (1 is the first
/// result). Anything else is matched against result ids by prefix.
pub fn resolve_result<'a>(results: &'a [PlanningItem], reference: &str) -> Result<&'a PlanningItem> {
    if results.is_empty() {
        bail!("there are no current results; run `huddle generate` first");
    }

    if let Ok(index) = reference.parse::<usize>() {
        return match index.checked_sub(1).and_then(|i| results.get(i)) {
            Some(item) => Ok(item),
            None => bail!(
                "result {index} is out of range (1..={})",
                results.len()
            ),
        };
    }

    let mut matches = results
        .iter()
        .filter(|r| r.id.as_deref().is_some_and(|id| id.starts_with(reference)));
    match (matches.next(), matches.next()) {
        (Some(item), None) => Ok(item),
        (Some(_), Some(_)) => bail!("{reference:?} matches more than one result; use a longer prefix"),
        (None, _) => bail!("no result matches {reference:?}"),
    }
}

/// Read a plan from a TOML file in the layout `saved export --format toml`
/// writes.
pub fn read_plan_file(path: &Path) -> Result<PlanningItem> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read plan file: {}", path.display()))?;
    export::from_toml(&content).with_context(|| format!("failed to parse plan file: {}", path.display()))
}

/// Insert `id = "<id>"` as the first key of a plan TOML file, preserving
/// all other content including comments and formatting. An existing `id`
/// is replaced in place.
pub fn write_plan_id_to_file(path: &Path, id: &str) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let mut doc: toml_edit::DocumentMut = content
        .parse::<toml_edit::DocumentMut>()
        .with_context(|| format!("failed to parse {} as TOML document", path.display()))?;

    let root = doc.as_table_mut();
    if root.contains_key("id") {
        root.insert("id", toml_edit::value(id));
    } else {
        // Collect existing entries, insert id first, then re-add the rest.
        let entries: Vec<(String, toml_edit::Item)> = root
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();

        root.clear();
        root.insert("id", toml_edit::value(id));
        for (key, value) in entries {
            root.insert(&key, value);
        }
    }

    std::fs::write(path, doc.to_string())
        .with_context(|| format!("failed to write {}", path.display()))?;

    Ok(())
}
