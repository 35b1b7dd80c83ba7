use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::{FromRow, PgPool};

use crate::database::partial_update::{bind_value, sql_for_partial_update};
use crate::error::ApiError;

/// API field name -> column name translations for partial updates
pub const USER_COLUMNS: &[(&str, &str)] = &[
    ("firstName", "first_name"),
    ("lastName", "last_name"),
    ("isAdmin", "is_admin"),
];

/// A user as exposed by the API. The password hash never leaves the model
/// layer; rows carrying it deserialize into `UserRow` instead.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_admin: bool,
}

#[derive(Debug, FromRow)]
struct UserRow {
    username: String,
    password: String,
    first_name: String,
    last_name: String,
    email: String,
    is_admin: bool,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            username: row.username,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            is_admin: row.is_admin,
        }
    }
}

/// A user plus the ids of jobs they applied to
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserWithJobs {
    #[serde(flatten)]
    pub user: User,
    pub applications: Vec<i32>,
}

/// Self-service registration payload: cannot set the admin flag
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UserRegister {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Admin-created user payload: may grant admin
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UserNew {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
}

const USER_FIELDS: &str = "username, first_name, last_name, email, is_admin";

impl User {
    /// Verify a username/password pair. Unknown user and wrong password are
    /// indistinguishable to the caller.
    pub async fn authenticate(
        pool: &PgPool,
        username: &str,
        password: &str,
    ) -> Result<User, ApiError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT username, password, first_name, last_name, email, is_admin \
             FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(pool)
        .await?;

        match row {
            Some(row) if bcrypt::verify(password, &row.password).unwrap_or(false) => {
                Ok(User::from(row))
            }
            _ => Err(ApiError::unauthorized("Invalid username/password")),
        }
    }

    /// Self-service registration; always creates a non-admin user
    pub async fn register(
        pool: &PgPool,
        data: &UserRegister,
        bcrypt_cost: u32,
    ) -> Result<User, ApiError> {
        let new = UserNew {
            username: data.username.clone(),
            password: data.password.clone(),
            first_name: data.first_name.clone(),
            last_name: data.last_name.clone(),
            email: data.email.clone(),
            is_admin: false,
        };
        Self::create(pool, &new, bcrypt_cost).await
    }

    pub async fn create(pool: &PgPool, data: &UserNew, bcrypt_cost: u32) -> Result<User, ApiError> {
        let existing =
            sqlx::query_scalar::<_, String>("SELECT username FROM users WHERE username = $1")
                .bind(&data.username)
                .fetch_optional(pool)
                .await?;
        if existing.is_some() {
            return Err(ApiError::bad_request(format!(
                "Duplicate username: {}",
                data.username
            )));
        }

        let hashed = hash_password(&data.password, bcrypt_cost)?;

        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (username, password, first_name, last_name, email, is_admin) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {USER_FIELDS}"
        ))
        .bind(&data.username)
        .bind(&hashed)
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(&data.email)
        .bind(data.is_admin)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    pub async fn find_all(pool: &PgPool) -> Result<Vec<User>, ApiError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_FIELDS} FROM users ORDER BY username"
        ))
        .fetch_all(pool)
        .await?;

        Ok(users)
    }

    pub async fn get(pool: &PgPool, username: &str) -> Result<UserWithJobs, ApiError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_FIELDS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("No user: {username}")))?;

        let applications = sqlx::query_scalar::<_, i32>(
            "SELECT job_id FROM applications WHERE username = $1 ORDER BY job_id",
        )
        .bind(username)
        .fetch_all(pool)
        .await?;

        Ok(UserWithJobs { user, applications })
    }

    /// Partial update. When the body carries a new password it is re-hashed
    /// here; the plain text never reaches the clause builder.
    pub async fn update(
        pool: &PgPool,
        username: &str,
        data: &Map<String, Value>,
        bcrypt_cost: u32,
    ) -> Result<User, ApiError> {
        let mut data = data.clone();
        if let Some(Value::String(password)) = data.get("password") {
            let hashed = hash_password(password, bcrypt_cost)?;
            data.insert("password".to_string(), Value::String(hashed));
        }

        let clause = sql_for_partial_update(&data, USER_COLUMNS)?;
        let sql = format!(
            "UPDATE users SET {} WHERE username = ${} RETURNING {USER_FIELDS}",
            clause.set_clause,
            clause.values.len() + 1
        );

        let mut q = sqlx::query_as::<_, User>(&sql);
        for v in clause.values.iter() {
            q = bind_value(q, v);
        }

        q.bind(username)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("No user: {username}")))
    }

    pub async fn remove(pool: &PgPool, username: &str) -> Result<(), ApiError> {
        let deleted = sqlx::query_scalar::<_, String>(
            "DELETE FROM users WHERE username = $1 RETURNING username",
        )
        .bind(username)
        .fetch_optional(pool)
        .await?;

        match deleted {
            Some(_) => Ok(()),
            None => Err(ApiError::not_found(format!("No user: {username}"))),
        }
    }

    /// Record an application; applying twice to the same job is a client
    /// fault (the table's primary key enforces it).
    pub async fn apply_to_job(pool: &PgPool, username: &str, job_id: i32) -> Result<(), ApiError> {
        let job = sqlx::query_scalar::<_, i32>("SELECT id FROM jobs WHERE id = $1")
            .bind(job_id)
            .fetch_optional(pool)
            .await?;
        if job.is_none() {
            return Err(ApiError::not_found(format!("No job: {job_id}")));
        }

        sqlx::query("INSERT INTO applications (username, job_id) VALUES ($1, $2)")
            .bind(username)
            .bind(job_id)
            .execute(pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
                    ApiError::bad_request(format!("Already applied to job: {job_id}"))
                }
                sqlx::Error::Database(db) if db.code().as_deref() == Some("23503") => {
                    ApiError::not_found(format!("No user: {username}"))
                }
                _ => e.into(),
            })?;

        Ok(())
    }
}

fn hash_password(password: &str, cost: u32) -> Result<String, ApiError> {
    bcrypt::hash(password, cost).map_err(|e| {
        tracing::error!("Password hashing failed: {}", e);
        ApiError::internal_server_error("Failed to process password")
    })
}
