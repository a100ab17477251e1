use crate::config::NamingConfig;
use crate::error::{QueryError, Result};

use super::model::{Dataset, RecordId};

// ---------------------------------------------------------------------------
// Display names
// ---------------------------------------------------------------------------

/// One display name per record, same length and order as the dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayNames {
    names: Vec<String>,
}

impl DisplayNames {
    /// Build the display name of every record.
    ///
    /// A usable primary name wins; otherwise the secondary identifier is
    /// turned into `<prefix><number>`; otherwise a positional placeholder
    /// `<placeholder>_<row>` is used. Works without a name column at all.
    pub fn build(dataset: &Dataset, naming: &NamingConfig) -> Self {
        let names = dataset
            .ids()
            .map(|id| {
                if let Some(name) = dataset.primary_name(id).and_then(|n| usable_name(n, naming)) {
                    return name.to_string();
                }
                match dataset.secondary_integer(id) {
                    Some(number) => format!("{}{number}", naming.secondary_prefix),
                    None => format!("{}_{}", naming.placeholder_prefix, id.row_number()),
                }
            })
            .collect();
        DisplayNames { names }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn get(&self, id: RecordId) -> Option<&str> {
        self.names.get(id.0).map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.names
    }

    /// First record whose display name is exactly `name`.
    pub fn position(&self, name: &str) -> Option<RecordId> {
        self.names.iter().position(|n| n == name).map(RecordId)
    }

    /// Names containing `term` case-insensitively, in load order, at most `limit`.
    pub fn search(&self, term: &str, limit: usize) -> Vec<&str> {
        let needle = term.trim().to_lowercase();
        self.names
            .iter()
            .filter(|name| name.to_lowercase().contains(&needle))
            .take(limit)
            .map(String::as_str)
            .collect()
    }
}

fn usable_name<'a>(raw: &'a str, naming: &NamingConfig) -> Option<&'a str> {
    let name = raw.trim();
    if name.is_empty()
        || name.chars().count() < naming.min_name_len
        || naming.rejected_names.iter().any(|r| r == name)
    {
        return None;
    }
    Some(name)
}

// ---------------------------------------------------------------------------
// Designator resolution
// ---------------------------------------------------------------------------

/// Resolve user text to a record.
///
/// Tried in order, first hit wins:
/// 1. exact display name;
/// 2. `<prefix><integer>` compared numerically with the secondary identifier;
/// 3. case-insensitive substring of the primary name field.
pub fn resolve_designator(
    dataset: &Dataset,
    names: &DisplayNames,
    naming: &NamingConfig,
    text: &str,
) -> Result<RecordId> {
    let designator = text.trim();
    let not_found = || QueryError::IdentityNotFound(designator.to_string());
    if designator.is_empty() {
        return Err(not_found());
    }

    if let Some(id) = names.position(designator) {
        return Ok(id);
    }

    if let Some(number) = parse_prefixed(designator, &naming.secondary_prefix) {
        let wanted = number as f64;
        if let Some(id) = dataset
            .ids()
            .find(|&id| dataset.secondary_value(id) == Some(wanted))
        {
            return Ok(id);
        }
    }

    let needle = designator.to_lowercase();
    dataset
        .ids()
        .find(|&id| {
            dataset
                .primary_name(id)
                .is_some_and(|name| name.to_lowercase().contains(&needle))
        })
        .ok_or_else(not_found)
}

/// `PGC303`, `pgc 303` → `303`.
fn parse_prefixed(text: &str, prefix: &str) -> Option<i64> {
    if prefix.is_empty() {
        return None;
    }
    let head = text.get(..prefix.len())?;
    if !head.eq_ignore_ascii_case(prefix) {
        return None;
    }
    text[prefix.len()..].trim().parse::<i64>().ok()
}
