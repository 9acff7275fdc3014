use libsql::{Builder, Database};

use crate::error::{AppError, AppResult};

pub async fn create_database(database_url: &str, auth_token: Option<&str>) -> AppResult<Database> {
    // Check if this is a Turso remote URL
    if database_url.starts_with("libsql://") {
        let auth_token = auth_token.ok_or_else(|| {
            AppError::Config("TURSO_AUTH_TOKEN must be set for remote database".to_string())
        })?;

        Ok(Builder::new_remote(database_url.to_string(), auth_token.to_string())
            .build()
            .await?)
    } else {
        // Local SQLite file
        let path = local_path(database_url);

        Ok(Builder::new_local(path).build().await?)
    }
}

fn local_path(database_url: &str) -> &str {
    database_url
        .strip_prefix("sqlite:")
        .unwrap_or(database_url)
        .split('?')
        .next()
        .filter(|path| !path.is_empty())
        .unwrap_or("restaurant.db")
}

/// Round-trips a trivial query so startup can report whether the database answers.
pub async fn ping(db: &Database) -> AppResult<()> {
    let conn = db.connect().map_err(AppError::from)?;
    let mut rows = conn.query("SELECT 1", ()).await.map_err(AppError::from)?;
    match rows.next().await.map_err(AppError::from)? {
        Some(_) => Ok(()),
        None => Err(AppError::Internal("ping returned no rows".to_string())),
    }
}
