use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::{FromRow, PgPool};

use crate::database::partial_update::{bind_value, sql_for_partial_update};
use crate::error::ApiError;
use crate::models::company::Company;

/// Job update fields already match their column names; the empty table keeps
/// the pass-through path of the clause builder in play.
pub const JOB_COLUMNS: &[(&str, &str)] = &[];

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<f64>,
    pub company_handle: String,
}

/// A job plus its company, as returned by the detail endpoint
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobWithCompany {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<f64>,
    pub company: Company,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobNew {
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<f64>,
    pub company_handle: String,
}

impl JobNew {
    pub fn validate(&self) -> Result<(), ApiError> {
        validate_salary(self.salary.map(i64::from))?;
        validate_equity(self.equity)?;
        Ok(())
    }
}

/// Shared by create and partial update so both paths refuse a negative
/// salary as a client fault instead of letting the table CHECK fire.
pub fn validate_salary(salary: Option<i64>) -> Result<(), ApiError> {
    if let Some(salary) = salary {
        if salary < 0 {
            return Err(ApiError::bad_request("salary cannot be negative"));
        }
    }
    Ok(())
}

/// Equity is a fraction of the company; anything outside [0, 1] is a client
/// mistake, caught before the statement is issued.
pub fn validate_equity(equity: Option<f64>) -> Result<(), ApiError> {
    if let Some(equity) = equity {
        if !(0.0..=1.0).contains(&equity) {
            return Err(ApiError::bad_request("equity must be between 0 and 1"));
        }
    }
    Ok(())
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobFilters {
    pub title: Option<String>,
    pub min_salary: Option<i32>,
    pub has_equity: Option<bool>,
}

const JOB_FIELDS: &str = "id, title, salary, equity, company_handle";

impl Job {
    pub async fn create(pool: &PgPool, data: &JobNew) -> Result<Job, ApiError> {
        let job = sqlx::query_as::<_, Job>(&format!(
            "INSERT INTO jobs (title, salary, equity, company_handle) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {JOB_FIELDS}"
        ))
        .bind(&data.title)
        .bind(data.salary)
        .bind(data.equity)
        .bind(&data.company_handle)
        .fetch_one(pool)
        .await
        .map_err(|e| match &e {
            // FK violation means the company doesn't exist
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23503") => {
                ApiError::not_found(format!("No company: {}", data.company_handle))
            }
            _ => e.into(),
        })?;

        Ok(job)
    }

    /// List jobs, optionally narrowed by title substring, minimum salary,
    /// and whether the job carries equity. `hasEquity=false` means "don't
    /// filter on equity", matching the listing contract.
    pub async fn find_all(pool: &PgPool, filters: &JobFilters) -> Result<Vec<Job>, ApiError> {
        let mut conditions: Vec<String> = Vec::new();
        let mut params: Vec<Value> = Vec::new();

        if let Some(title) = &filters.title {
            params.push(Value::String(title.clone()));
            conditions.push(format!("title ILIKE '%' || ${} || '%'", params.len()));
        }
        if let Some(min_salary) = filters.min_salary {
            params.push(Value::from(min_salary));
            conditions.push(format!("salary >= ${}", params.len()));
        }
        if filters.has_equity == Some(true) {
            conditions.push("equity > 0".to_string());
        }

        let mut sql = format!("SELECT {JOB_FIELDS} FROM jobs");
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(" ORDER BY title, id");

        let mut q = sqlx::query_as::<_, Job>(&sql);
        for p in params.iter() {
            q = bind_value(q, p);
        }

        Ok(q.fetch_all(pool).await?)
    }

    pub async fn get(pool: &PgPool, id: i32) -> Result<JobWithCompany, ApiError> {
        let job = sqlx::query_as::<_, Job>(&format!("SELECT {JOB_FIELDS} FROM jobs WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("No job: {id}")))?;

        let company = sqlx::query_as::<_, Company>(
            "SELECT handle, name, description, num_employees, logo_url \
             FROM companies WHERE handle = $1",
        )
        .bind(&job.company_handle)
        .fetch_one(pool)
        .await?;

        Ok(JobWithCompany {
            id: job.id,
            title: job.title,
            salary: job.salary,
            equity: job.equity,
            company,
        })
    }

    /// Partial update: title, salary and equity only. The id and company
    /// never change once a job is posted.
    pub async fn update(pool: &PgPool, id: i32, data: &Map<String, Value>) -> Result<Job, ApiError> {
        let clause = sql_for_partial_update(data, JOB_COLUMNS)?;
        let sql = format!(
            "UPDATE jobs SET {} WHERE id = ${} RETURNING {JOB_FIELDS}",
            clause.set_clause,
            clause.values.len() + 1
        );

        let mut q = sqlx::query_as::<_, Job>(&sql);
        for v in clause.values.iter() {
            q = bind_value(q, v);
        }

        q.bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("No job: {id}")))
    }

    pub async fn remove(pool: &PgPool, id: i32) -> Result<(), ApiError> {
        let deleted = sqlx::query_scalar::<_, i32>("DELETE FROM jobs WHERE id = $1 RETURNING id")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        match deleted {
            Some(_) => Ok(()),
            None => Err(ApiError::not_found(format!("No job: {id}"))),
        }
    }
}
