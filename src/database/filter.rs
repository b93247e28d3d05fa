use serde_json::Value;

use super::store::{Document, StoreError};

/// One `field = value` condition. Values are compared in their JSON form.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: String,
    pub value: Value,
}

/// Conjunction of equality conditions plus an optional window.
///
/// Tenant-owned collections never see a bare `Filter`: the scoped repository
/// always prepends the `tenantId` condition before a filter reaches the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<Condition>,
    limit: Option<u64>,
    offset: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<String>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn by_id(id: impl Into<String>) -> Self {
        Self::new().eq("id", Value::String(id.into()))
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    /// Put a condition ahead of every existing one.
    pub fn prepend(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.insert(
            0,
            Condition {
                field: field.into(),
                value: value.into(),
            },
        );
        self
    }

    pub fn limit(mut self, limit: u64, offset: u64) -> Self {
        self.limit = Some(limit);
        self.offset = offset;
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn limit_value(&self) -> Option<u64> {
        self.limit
    }

    pub fn offset_value(&self) -> u64 {
        self.offset
    }

    /// Whether `doc` satisfies every condition. Missing fields only match `null`.
    pub fn matches(&self, doc: &Document) -> bool {
        self.conditions
            .iter()
            .all(|c| doc.get(&c.field).unwrap_or(&Value::Null) == &c.value)
    }

    /// Condition fields are spliced into SQL as JSON keys, so they are
    /// restricted to identifier characters.
    pub fn validate(&self) -> Result<(), StoreError> {
        for condition in &self.conditions {
            validate_field_name(&condition.field)?;
            if matches!(condition.value, Value::Array(_) | Value::Object(_)) {
                return Err(StoreError::InvalidFilter(format!(
                    "field '{}' must be compared against a scalar",
                    condition.field
                )));
            }
        }
        Ok(())
    }

    /// `WHERE` clause over the `body` JSONB column, numbering parameters from `$first_param`.
    pub fn to_where_sql(&self, first_param: usize) -> Result<SqlResult, StoreError> {
        self.validate()?;
        let mut clauses = Vec::with_capacity(self.conditions.len());
        let mut params = Vec::with_capacity(self.conditions.len());

        for condition in &self.conditions {
            match &condition.value {
                Value::Null => clauses.push(format!("body->>'{}' IS NULL", condition.field)),
                Value::String(s) => {
                    params.push(s.clone());
                    clauses.push(format!("body->>'{}' = ${}", condition.field, first_param + params.len() - 1));
                }
                other => {
                    params.push(other.to_string());
                    clauses.push(format!("body->>'{}' = ${}", condition.field, first_param + params.len() - 1));
                }
            }
        }

        let query = if clauses.is_empty() {
            "TRUE".to_string()
        } else {
            clauses.join(" AND ")
        };
        Ok(SqlResult { query, params })
    }

    pub fn to_select_sql(&self, table: &str) -> Result<SqlResult, StoreError> {
        let where_sql = self.to_where_sql(1)?;
        let mut query = format!(
            "SELECT body FROM \"{}\" WHERE {} ORDER BY created_at ASC, id ASC",
            table, where_sql.query
        );
        match self.limit {
            Some(limit) => query.push_str(&format!(" LIMIT {} OFFSET {}", limit, self.offset)),
            None if self.offset > 0 => query.push_str(&format!(" OFFSET {}", self.offset)),
            None => {}
        }
        Ok(SqlResult {
            query,
            params: where_sql.params,
        })
    }

    pub fn to_count_sql(&self, table: &str) -> Result<SqlResult, StoreError> {
        let where_sql = self.to_where_sql(1)?;
        Ok(SqlResult {
            query: format!("SELECT COUNT(*) AS count FROM \"{}\" WHERE {}", table, where_sql.query),
            params: where_sql.params,
        })
    }
}

fn validate_field_name(name: &str) -> Result<(), StoreError> {
    let mut chars = name.chars();
    let valid_start = chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if !valid_start || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(StoreError::InvalidFilter(format!("invalid field name: {}", name)));
    }
    Ok(())
}
