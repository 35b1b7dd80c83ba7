use serde_json::{Map, Value};
use sqlx::postgres::PgArguments;
use thiserror::Error;

/// Errors from building a partial-update clause
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SqlBuildError {
    #[error("No data to update")]
    EmptyUpdate,

    #[error("Invalid column name: {0}")]
    InvalidColumn(String),
}

/// A parameterized SET clause plus its positional bind values.
///
/// `set_clause` contains fragments of the form `"column"=$N` joined by `, `;
/// `values[i]` is the bind value for placeholder `$(i+1)`. Only column names
/// are interpolated into the clause text, and only after passing the
/// identifier check; values travel exclusively through positional binding.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateClause {
    pub set_clause: String,
    pub values: Vec<Value>,
}

/// Build a parameterized `SET` clause from a partial-update body.
///
/// `data` maps API field names to new values, in the order the client sent
/// them. `column_map` translates API names to column names (e.g.
/// `numEmployees` -> `num_employees`); fields without an entry pass through
/// unchanged. Placeholders start at `$1`, so callers appending WHERE
/// conditions continue from `$(values.len() + 1)`.
///
/// Fails with `EmptyUpdate` when `data` has no fields, and with
/// `InvalidColumn` when any resolved column name is not a plain SQL
/// identifier. The second check means a client-controlled key that lacks a
/// `column_map` entry can never smuggle SQL into the statement text.
pub fn sql_for_partial_update(
    data: &Map<String, Value>,
    column_map: &[(&str, &str)],
) -> Result<UpdateClause, SqlBuildError> {
    if data.is_empty() {
        return Err(SqlBuildError::EmptyUpdate);
    }

    let mut fragments = Vec::with_capacity(data.len());
    let mut values = Vec::with_capacity(data.len());

    for (idx, (field, value)) in data.iter().enumerate() {
        let column = column_map
            .iter()
            .find(|(api_name, _)| *api_name == field.as_str())
            .map(|(_, col)| *col)
            .unwrap_or(field.as_str());

        if !is_valid_identifier(column) {
            return Err(SqlBuildError::InvalidColumn(column.to_string()));
        }

        fragments.push(format!("\"{}\"=${}", column, idx + 1));
        values.push(value.clone());
    }

    Ok(UpdateClause {
        set_clause: fragments.join(", "),
        values,
    })
}

/// Plain unquoted-identifier shape: ASCII letter or underscore, then
/// letters, digits, underscores.
fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Bind a JSON value to the next positional parameter by variant.
pub fn bind_value<'q, O>(
    q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>,
    v: &'q Value,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>
where
    O: for<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow>,
{
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s),
        // Arrays and objects never appear in update bodies; bind as JSONB
        _ => q.bind(v.clone()),
    }
}
