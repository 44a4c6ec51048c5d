use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::*;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Open the SQLite file named by `DATABASE_URL`, creating it if needed.
pub async fn connect(config: &Config) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&config.database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;
    Ok(pool)
}

/// Create any missing tables. Existing tables are never altered.
pub async fn run_migrations(pool: &SqlitePool) -> anyhow::Result<()> {
    MIGRATOR.run(pool).await?;
    info!("Schema up to date.");
    Ok(())
}

// ── Products ──────────────────────────────────────────────────────────────────

pub async fn fetch_products(pool: &SqlitePool, category: Option<&str>) -> AppResult<Vec<Product>> {
    let products = sqlx::query_as::<_, Product>(
        r#"
        SELECT id, name, price, stock, unit, category, image
        FROM inventory
        WHERE (?1 IS NULL OR category = ?1)
        ORDER BY id
        "#,
    )
    .bind(category)
    .fetch_all(pool)
    .await?;

    Ok(products)
}

pub async fn fetch_inventory(pool: &SqlitePool) -> AppResult<Vec<InventoryRow>> {
    let rows = sqlx::query_as::<_, InventoryRow>(
        r#"
        SELECT id, name, price, stock, unit, category,
               (image IS NOT NULL) AS has_image
        FROM inventory
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn fetch_product_by_id(pool: &SqlitePool, id: i64) -> AppResult<Product> {
    sqlx::query_as::<_, Product>(
        "SELECT id, name, price, stock, unit, category, image FROM inventory WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Product not found".to_string()))
}

pub async fn fetch_product_image(pool: &SqlitePool, id: i64) -> AppResult<Vec<u8>> {
    let row: Option<(Option<Vec<u8>>,)> = sqlx::query_as("SELECT image FROM inventory WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.and_then(|(image,)| image)
        .ok_or_else(|| AppError::NotFound("Image not found".to_string()))
}

/// Insert a product and return its new id.
pub async fn insert_product(
    pool: &SqlitePool,
    input: &ProductInput,
    image: Option<&[u8]>,
) -> AppResult<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO inventory (name, price, stock, unit, category, image)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&input.name)
    .bind(input.price)
    .bind(input.stock)
    .bind(&input.unit)
    .bind(&input.category)
    .bind(image)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Overwrite all columns of a product. The stored image is kept unless `image` is `Some`.
/// Returns the number of rows touched (0 when the id does not exist).
pub async fn update_product(
    pool: &SqlitePool,
    id: i64,
    input: &ProductInput,
    image: Option<&[u8]>,
) -> AppResult<u64> {
    let query = match image {
        Some(bytes) => sqlx::query(
            r#"
            UPDATE inventory
            SET name = ?, price = ?, stock = ?, unit = ?, category = ?, image = ?
            WHERE id = ?
            "#,
        )
        .bind(&input.name)
        .bind(input.price)
        .bind(input.stock)
        .bind(&input.unit)
        .bind(&input.category)
        .bind(bytes)
        .bind(id),
        None => sqlx::query(
            r#"
            UPDATE inventory
            SET name = ?, price = ?, stock = ?, unit = ?, category = ?
            WHERE id = ?
            "#,
        )
        .bind(&input.name)
        .bind(input.price)
        .bind(input.stock)
        .bind(&input.unit)
        .bind(&input.category)
        .bind(id),
    };

    let result = query.execute(pool).await?;
    Ok(result.rows_affected())
}

/// Returns the number of rows removed (0 when the id does not exist).
pub async fn delete_product(pool: &SqlitePool, id: i64) -> AppResult<u64> {
    let result = sqlx::query("DELETE FROM inventory WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

// ── Users ─────────────────────────────────────────────────────────────────────

pub async fn user_exists(pool: &SqlitePool, username: &str, email: &str) -> AppResult<bool> {
    let row: Option<(i64,)> =
        sqlx::query_as("SELECT id FROM users WHERE username = ? OR email = ? LIMIT 1")
            .bind(username)
            .bind(email)
            .fetch_optional(pool)
            .await?;

    Ok(row.is_some())
}

pub async fn fetch_user_by_username(pool: &SqlitePool, username: &str) -> AppResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, name, username, email, password, address FROM users WHERE username = ?",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// Insert a user whose `password` is already hashed. A username/email that slipped
/// past the pre-check is rejected by the UNIQUE constraints and reported as a conflict.
pub async fn insert_user(pool: &SqlitePool, user: &NewUser) -> AppResult<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO users (name, username, email, password, address)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&user.name)
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.password)
    .bind(&user.address)
    .execute(pool)
    .await;

    match result {
        Ok(done) => Ok(done.last_insert_rowid()),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(AppError::Conflict(
            "Username or email already exists".to_string(),
        )),
        Err(e) => Err(e.into()),
    }
}

// ── Bills ─────────────────────────────────────────────────────────────────────

pub async fn fetch_bills(pool: &SqlitePool) -> AppResult<Vec<Bill>> {
    let bills = sqlx::query_as::<_, Bill>("SELECT id, date, total_amount FROM bills ORDER BY id")
        .fetch_all(pool)
        .await?;

    Ok(bills)
}

#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    // One connection that never expires: each new in-memory connection is a fresh database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None::<std::time::Duration>)
        .max_lifetime(None::<std::time::Duration>)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    run_migrations(&pool).await.expect("migrations");
    pool
}
