//! Table-based field lookups.
//!
//! Each lookup takes an `accept` callback that cleans a raw cell value and
//! applies the caller's plausibility checks, returning `None` to reject it.

use crate::models::Field;
use crate::pdf::Table;

use super::rules::patterns::FIRST_AMOUNT;
use super::rules::{CellPick, RowLabelRule, TableLocator, TextRule};

/// Read a field from the column a [`TableLocator`] maps it to.
///
/// Scans up to `lookahead` rows below each matching header row. The first
/// accepted value is kept unless a later priority row supplies another.
pub fn column_lookup<F>(
    tables: &[Table],
    locator: &TableLocator,
    field: Field,
    lookahead: usize,
    mut accept: F,
) -> Option<String>
where
    F: FnMut(&str) -> Option<String>,
{
    let mut current: Option<String> = None;

    for table in tables {
        let Some(header) = (0..table.len()).find(|r| locator.is_header(&table.row_text(*r))) else {
            continue;
        };
        let Some(column) = locator.column_for(&table.rows[header], field) else {
            continue;
        };

        let end = (header + 1 + lookahead).min(table.len());
        for row in header + 1..end {
            let row_text = table.row_text(row);
            if locator.is_skipped(&row_text) {
                continue;
            }
            let Some(value) = table.cell(row, column).and_then(&mut accept) else {
                continue;
            };
            if current.is_none() || locator.is_priority(&row_text) {
                current = Some(value);
            }
        }
    }

    current
}

/// Find a cell matching the rule's label and read an amount to its right.
///
/// Percentage cells are never taken as amounts.
pub fn row_label_lookup<F>(tables: &[Table], rule: &RowLabelRule, mut accept: F) -> Option<String>
where
    F: FnMut(&str) -> Option<String>,
{
    for table in tables {
        for row in &table.rows {
            for (j, cell) in row.iter().enumerate() {
                let Some(text) = cell else {
                    continue;
                };
                if !rule.label().is_match(text) {
                    continue;
                }

                let amounts: Vec<&str> = row[j + 1..]
                    .iter()
                    .flatten()
                    .filter(|c| !c.contains('%'))
                    .filter_map(|c| FIRST_AMOUNT.captures(c).and_then(|caps| caps.get(1)))
                    .map(|m| m.as_str())
                    .collect();

                let found = match rule.pick() {
                    CellPick::First => amounts.iter().find_map(|a| accept(a)),
                    CellPick::Last => amounts.iter().rev().find_map(|a| accept(a)),
                };
                if found.is_some() {
                    return found;
                }
            }
        }
    }
    None
}

/// Apply a text rule to each row's joined text.
pub fn row_text_lookup<F>(tables: &[Table], rule: &TextRule, mut accept: F) -> Option<String>
where
    F: FnMut(&str) -> Option<String>,
{
    tables
        .iter()
        .flat_map(|table| (0..table.len()).map(move |r| table.row_text(r)))
        .find_map(|row_text| rule.candidates(&row_text).find_map(|c| accept(&c)))
}
