use serde::Deserialize;

use crate::models::table_filter::{Condition, FieldSet, FilterTree};

pub const FIELDS: FieldSet = FieldSet {
    columns: &[
        ("dict_name", "d.name"),
        ("label",     "dd.label"),
        ("value",     "dd.value"),
    ],
    ops: &["contains", "equals", "starts_with"],
};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DictDetailQueryCriteria {
    /// Substring of the label.
    pub label: Option<String>,
    /// Exact dictionary name.
    pub dict_name: Option<String>,
}

impl DictDetailQueryCriteria {
    pub fn to_filter(&self) -> FilterTree {
        let mut tree = FilterTree::default();
        if let Some(name) = self.dict_name.as_deref().filter(|s| !s.is_empty()) {
            tree = tree.with(Condition::new("dict_name", "equals", name));
        }
        if let Some(label) = self.label.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            tree = tree.with(Condition::new("label", "contains", label));
        }
        tree
    }

    pub fn by_dict_name(name: &str) -> Self {
        DictDetailQueryCriteria { label: None, dict_name: Some(name.to_string()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::table_filter::builder::build_where_clause;

    #[test]
    fn dict_name_is_an_exact_match() {
        let clause = build_where_clause(&DictDetailQueryCriteria::by_dict_name("user_status").to_filter(), &FIELDS, 0).unwrap();
        assert_eq!(clause.sql, "d.name = $1");
        assert_eq!(clause.params, vec!["user_status"]);
    }

    #[test]
    fn label_and_name_combine() {
        let criteria = DictDetailQueryCriteria { label: Some("Act".into()), dict_name: Some("user_status".into()) };
        let clause = build_where_clause(&criteria.to_filter(), &FIELDS, 0).unwrap();
        assert_eq!(clause.sql, r"d.name = $1 AND dd.label LIKE '%' || $2 || '%' ESCAPE '\'");
    }
}
