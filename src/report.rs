//! Report generation: owner filtering, deterministic ordering, emission.

use anyhow::{Context, Result};
use regex::Regex;
use std::cmp::Reverse;
use std::path::Path;

use crate::symbol::Symbol;
use crate::tally::ReferenceTally;

/// Predicate over a symbol's owner, compiled from include/exclude patterns.
///
/// Patterns are regular expressions anchored at the start of the owner's
/// internal name, so `org/bukkit` matches the whole namespace below it.
#[derive(Debug, Clone)]
pub struct OwnerFilter {
    include: Regex,
    exclude: Option<Regex>,
}

impl OwnerFilter {
    pub fn new(include: &str, exclude: Option<&str>) -> Result<Self> {
        let include = anchored(include)
            .with_context(|| format!("invalid include pattern: {include}"))?;
        let exclude = match exclude {
            Some(pattern) => Some(
                anchored(pattern)
                    .with_context(|| format!("invalid exclude pattern: {pattern}"))?,
            ),
            None => None,
        };
        Ok(Self { include, exclude })
    }

    pub fn accepts(&self, owner: &str) -> bool {
        self.include.is_match(owner)
            && !self.exclude.as_ref().is_some_and(|e| e.is_match(owner))
    }
}

fn anchored(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("^(?:{pattern})"))
}

/// Filters the tally by owner and sorts by count descending, breaking ties
/// lexicographically over the symbol's textual form so output is identical
/// regardless of merge order.
pub fn report_entries(tally: &ReferenceTally, filter: &OwnerFilter) -> Vec<(Symbol, u64)> {
    let mut entries: Vec<(Symbol, u64)> = tally
        .iter()
        .filter(|(symbol, _)| filter.accepts(&symbol.owner))
        .map(|(symbol, count)| (symbol.clone(), count))
        .collect();
    entries.sort_by_cached_key(|(symbol, count)| (Reverse(*count), symbol.to_string()));
    entries
}

pub fn render_report(entries: &[(Symbol, u64)]) -> String {
    let mut out = String::new();
    for (symbol, count) in entries {
        out.push_str(&format!("{count} {symbol}\n"));
    }
    out
}

pub fn write_report(path: &Path, entries: &[(Symbol, u64)]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create report directory: {}", parent.display()))?;
    }
    std::fs::write(path, render_report(entries))
        .with_context(|| format!("failed to write report: {}", path.display()))
}
