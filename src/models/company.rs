use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::{FromRow, PgPool};

use crate::database::partial_update::{bind_value, sql_for_partial_update};
use crate::error::ApiError;

/// API field name -> column name translations for partial updates
pub const COMPANY_COLUMNS: &[(&str, &str)] =
    &[("numEmployees", "num_employees"), ("logoUrl", "logo_url")];

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub handle: String,
    pub name: String,
    pub description: String,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

/// A company plus its jobs, as returned by the detail endpoint
#[derive(Debug, Serialize)]
pub struct CompanyWithJobs {
    #[serde(flatten)]
    pub company: Company,
    pub jobs: Vec<CompanyJob>,
}

/// Job summary nested under a company (no redundant companyHandle)
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CompanyJob {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompanyNew {
    pub handle: String,
    pub name: String,
    pub description: String,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

impl CompanyNew {
    pub fn validate(&self) -> Result<(), ApiError> {
        validate_num_employees(self.num_employees.map(i64::from))
    }
}

/// Shared by create and partial update so both paths refuse a negative
/// employee count as a client fault instead of letting the table CHECK fire.
pub fn validate_num_employees(num_employees: Option<i64>) -> Result<(), ApiError> {
    if let Some(n) = num_employees {
        if n < 0 {
            return Err(ApiError::bad_request("numEmployees cannot be negative"));
        }
    }
    Ok(())
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompanyFilters {
    pub name: Option<String>,
    pub min_employees: Option<i32>,
    pub max_employees: Option<i32>,
}

impl CompanyFilters {
    /// Reject contradictory ranges before any query is built
    pub fn validate(&self) -> Result<(), ApiError> {
        if let (Some(min), Some(max)) = (self.min_employees, self.max_employees) {
            if min > max {
                return Err(ApiError::bad_request(
                    "minEmployees cannot be greater than maxEmployees",
                ));
            }
        }
        Ok(())
    }
}

const COMPANY_FIELDS: &str = "handle, name, description, num_employees, logo_url";

impl Company {
    pub async fn create(pool: &PgPool, data: &CompanyNew) -> Result<Company, ApiError> {
        let existing = sqlx::query_scalar::<_, String>("SELECT handle FROM companies WHERE handle = $1")
            .bind(&data.handle)
            .fetch_optional(pool)
            .await?;
        if existing.is_some() {
            return Err(ApiError::bad_request(format!(
                "Duplicate company: {}",
                data.handle
            )));
        }

        let company = sqlx::query_as::<_, Company>(&format!(
            "INSERT INTO companies (handle, name, description, num_employees, logo_url) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COMPANY_FIELDS}"
        ))
        .bind(&data.handle)
        .bind(&data.name)
        .bind(&data.description)
        .bind(data.num_employees)
        .bind(&data.logo_url)
        .fetch_one(pool)
        .await?;

        Ok(company)
    }

    /// List companies, optionally narrowed by name substring and employee
    /// count bounds. Callers validate the filter object first.
    pub async fn find_all(pool: &PgPool, filters: &CompanyFilters) -> Result<Vec<Company>, ApiError> {
        let mut conditions: Vec<String> = Vec::new();
        let mut params: Vec<Value> = Vec::new();

        if let Some(name) = &filters.name {
            params.push(Value::String(name.clone()));
            conditions.push(format!("name ILIKE '%' || ${} || '%'", params.len()));
        }
        if let Some(min) = filters.min_employees {
            params.push(Value::from(min));
            conditions.push(format!("num_employees >= ${}", params.len()));
        }
        if let Some(max) = filters.max_employees {
            params.push(Value::from(max));
            conditions.push(format!("num_employees <= ${}", params.len()));
        }

        let mut sql = format!("SELECT {COMPANY_FIELDS} FROM companies");
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(" ORDER BY name");

        let mut q = sqlx::query_as::<_, Company>(&sql);
        for p in params.iter() {
            q = bind_value(q, p);
        }

        Ok(q.fetch_all(pool).await?)
    }

    pub async fn get(pool: &PgPool, handle: &str) -> Result<CompanyWithJobs, ApiError> {
        let company = sqlx::query_as::<_, Company>(&format!(
            "SELECT {COMPANY_FIELDS} FROM companies WHERE handle = $1"
        ))
        .bind(handle)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("No company: {handle}")))?;

        let jobs = sqlx::query_as::<_, CompanyJob>(
            "SELECT id, title, salary, equity FROM jobs WHERE company_handle = $1 ORDER BY id",
        )
        .bind(handle)
        .fetch_all(pool)
        .await?;

        Ok(CompanyWithJobs { company, jobs })
    }

    /// Partial update: only the fields present in `data` change. The SET
    /// clause comes from the clause builder; the handle is bound after the
    /// update values.
    pub async fn update(
        pool: &PgPool,
        handle: &str,
        data: &Map<String, Value>,
    ) -> Result<Company, ApiError> {
        let clause = sql_for_partial_update(data, COMPANY_COLUMNS)?;
        let sql = format!(
            "UPDATE companies SET {} WHERE handle = ${} RETURNING {COMPANY_FIELDS}",
            clause.set_clause,
            clause.values.len() + 1
        );

        let mut q = sqlx::query_as::<_, Company>(&sql);
        for v in clause.values.iter() {
            q = bind_value(q, v);
        }

        q.bind(handle)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("No company: {handle}")))
    }

    pub async fn remove(pool: &PgPool, handle: &str) -> Result<(), ApiError> {
        let deleted =
            sqlx::query_scalar::<_, String>("DELETE FROM companies WHERE handle = $1 RETURNING handle")
                .bind(handle)
                .fetch_optional(pool)
                .await?;

        match deleted {
            Some(_) => Ok(()),
            None => Err(ApiError::not_found(format!("No company: {handle}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_range_validation() {
        let ok = CompanyFilters {
            min_employees: Some(1),
            max_employees: Some(10),
            ..Default::default()
        };
        assert!(ok.validate().is_ok());

        let inverted = CompanyFilters {
            min_employees: Some(10),
            max_employees: Some(1),
            ..Default::default()
        };
        assert_eq!(inverted.validate().unwrap_err().status_code(), 400);

        // One-sided bounds are always fine
        let open = CompanyFilters {
            min_employees: Some(10),
            ..Default::default()
        };
        assert!(open.validate().is_ok());
    }

    #[test]
    fn num_employees_bounds() {
        assert!(validate_num_employees(None).is_ok());
        assert!(validate_num_employees(Some(0)).is_ok());
        assert!(validate_num_employees(Some(950)).is_ok());
        assert_eq!(
            validate_num_employees(Some(-1)).unwrap_err().status_code(),
            400
        );
    }

    #[test]
    fn update_clause_uses_column_translations() {
        let mut data = Map::new();
        data.insert("name".to_string(), Value::from("NewCo"));
        data.insert("numEmployees".to_string(), Value::from(42));
        data.insert("logoUrl".to_string(), Value::from("http://logo"));

        let clause = sql_for_partial_update(&data, COMPANY_COLUMNS).unwrap();
        assert_eq!(
            clause.set_clause,
            "\"name\"=$1, \"num_employees\"=$2, \"logo_url\"=$3"
        );
        assert_eq!(clause.values.len(), 3);
    }
}
