//! In-process evaluation of a [`FilterTree`], mirroring the SQL the builder emits.
//!
//! Comparisons are plain string comparisons, which is what the PostgreSQL side does
//! for the text columns the field sets expose. `on` compares the date prefix.

use super::builder::BuildError;
use super::{Condition, FieldSet, FilterTree, Logic};

/// A row that can hand out the text value of a filter field.
pub trait Filterable {
    fn field_text(&self, key: &str) -> Option<String>;
}

pub fn matches<T: Filterable>(tree: &FilterTree, fields: &FieldSet, row: &T) -> Result<bool, BuildError> {
    let mut results = Vec::with_capacity(tree.conditions.len() + tree.groups.len());
    for cond in &tree.conditions {
        results.push(condition_holds(cond, fields, row)?);
    }
    for group in tree.groups.iter().filter(|g| !g.conditions.is_empty()) {
        let mut inner = Vec::with_capacity(group.conditions.len());
        for cond in &group.conditions {
            inner.push(condition_holds(cond, fields, row)?);
        }
        results.push(combine(group.logic, &inner));
    }
    if results.is_empty() {
        return Ok(true);
    }
    Ok(combine(tree.logic, &results))
}

fn combine(logic: Logic, values: &[bool]) -> bool {
    match logic {
        Logic::And => values.iter().all(|v| *v),
        Logic::Or => values.iter().any(|v| *v),
    }
}

fn condition_holds<T: Filterable>(cond: &Condition, fields: &FieldSet, row: &T) -> Result<bool, BuildError> {
    if fields.column(&cond.field).is_none() {
        return Err(BuildError::UnknownField(cond.field.clone()));
    }
    if !fields.allows(&cond.op) {
        return Err(BuildError::UnknownOp(cond.op.clone()));
    }
    // A missing value behaves like SQL NULL: no comparison holds.
    let Some(actual) = row.field_text(&cond.field) else {
        return Ok(false);
    };
    let expected = cond.value.as_str();
    let holds = match cond.op.as_str() {
        "contains"     => actual.contains(expected),
        "not_contains" => !actual.contains(expected),
        "equals"       => actual == expected,
        "not_equals"   => actual != expected,
        "starts_with"  => actual.starts_with(expected),
        "before"       => actual.as_str() < expected,
        "after"        => actual.as_str() > expected,
        "on"           => match (actual.get(..10), expected.get(..10)) {
            (Some(day), Some(wanted)) => day == wanted,
            _ => false,
        },
        _ => return Err(BuildError::UnknownOp(cond.op.clone())),
    };
    Ok(holds)
}
