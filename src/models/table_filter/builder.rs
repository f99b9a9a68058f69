// src/models/table_filter/builder.rs

use super::{Condition, FieldSet, FilterTree, Logic};

#[derive(Debug, PartialEq)]
pub enum BuildError {
    UnknownField(String),
    UnknownOp(String),
}

/// A rendered WHERE fragment and its bind values, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct WhereClause {
    pub sql: String,
    pub params: Vec<String>,
}

impl WhereClause {
    fn passthrough() -> Self {
        WhereClause { sql: "1=1".to_string(), params: vec![] }
    }
}

/// Build a parameterized WHERE fragment from a FilterTree.
/// param_offset: the $N index to start from (so callers can combine with other params).
pub fn build_where_clause(
    tree: &FilterTree,
    fields: &FieldSet,
    param_offset: usize,
) -> Result<WhereClause, BuildError> {
    let mut params: Vec<String> = vec![];
    let mut parts: Vec<String> = vec![];

    for cond in &tree.conditions {
        parts.push(render_condition(cond, fields, param_offset, &mut params)?);
    }

    // Groups (one level deep)
    for group in &tree.groups {
        if group.conditions.is_empty() {
            continue;
        }
        let mut inner = vec![];
        for cond in &group.conditions {
            inner.push(render_condition(cond, fields, param_offset, &mut params)?);
        }
        parts.push(format!("({})", inner.join(joiner(group.logic))));
    }

    if parts.is_empty() {
        return Ok(WhereClause::passthrough());
    }
    Ok(WhereClause { sql: parts.join(joiner(tree.logic)), params })
}

fn joiner(logic: Logic) -> &'static str {
    match logic { Logic::And => " AND ", Logic::Or => " OR " }
}

fn render_condition(
    cond: &Condition,
    fields: &FieldSet,
    param_offset: usize,
    params: &mut Vec<String>,
) -> Result<String, BuildError> {
    let col = fields.column(&cond.field)
        .ok_or_else(|| BuildError::UnknownField(cond.field.clone()))?;
    if !fields.allows(&cond.op) {
        return Err(BuildError::UnknownOp(cond.op.clone()));
    }
    let n = param_offset + params.len() + 1;  // PostgreSQL uses 1-based $N
    let mut value = cond.value.clone();
    let sql = match cond.op.as_str() {
        "contains" | "not_contains" | "starts_with" => {
            value = escape_like(&cond.value);
            match cond.op.as_str() {
                "contains"     => format!("{col} LIKE '%' || ${n} || '%' ESCAPE '\\'"),
                "not_contains" => format!("{col} NOT LIKE '%' || ${n} || '%' ESCAPE '\\'"),
                _              => format!("{col} LIKE ${n} || '%' ESCAPE '\\'"),
            }
        }
        "equals"       => format!("{col} = ${n}"),
        "not_equals"   => format!("{col} != ${n}"),
        "before"       => format!("{col} < ${n}"),
        "after"        => format!("{col} > ${n}"),
        "on"           => format!("({col})::DATE = (${n})::DATE"),
        _ => return Err(BuildError::UnknownOp(cond.op.clone())),
    };
    params.push(value);
    Ok(sql)
}

/// Escape `\`, `%` and `_` so LIKE matches the text literally.
pub fn escape_like(value: &str) -> String {
    value.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}
