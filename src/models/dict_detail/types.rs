use serde::{Deserialize, Serialize};

use crate::auth::validate;
use crate::models::table_filter::eval::Filterable;

/// One label/value entry of a named dictionary.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct DictDetail {
    pub id: i64,
    pub dict_name: String,
    pub label: String,
    pub value: String,
    pub dict_sort: i32,
}

impl Filterable for DictDetail {
    fn field_text(&self, key: &str) -> Option<String> {
        match key {
            "dict_name" => Some(self.dict_name.clone()),
            "label" => Some(self.label.clone()),
            "value" => Some(self.value.clone()),
            _ => None,
        }
    }
}

fn default_sort() -> i32 {
    999
}

#[derive(Debug, Clone, Deserialize)]
pub struct DictDetailForm {
    pub dict_name: String,
    pub label: String,
    pub value: String,
    #[serde(default = "default_sort")]
    pub dict_sort: i32,
}

impl DictDetailForm {
    pub fn new(dict_name: &str, label: &str, value: &str) -> Self {
        DictDetailForm {
            dict_name: dict_name.to_string(),
            label: label.to_string(),
            value: value.to_string(),
            dict_sort: default_sort(),
        }
    }

    pub fn validate(&self) -> Vec<String> {
        let mut errors = vec![];
        errors.extend(validate::validate_required(&self.dict_name, "Dictionary name", 100));
        errors.extend(validate::validate_required(&self.label, "Label", 255));
        errors.extend(validate::validate_required(&self.value, "Value", 255));
        errors
    }
}
