//! Catalog repository backed by SQLite.
//!
//! Owns the category → subcategory → product tree. The foreign keys carry
//! `ON DELETE CASCADE`, so deleting a category removes its subcategories
//! and their products in one statement and orphan rows never exist.

use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqlitePool;
use tracing::info;

/// A top-level catalog category. Names are globally unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// A subcategory; belongs to exactly one category. Names are unique within
/// their category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SubCategory {
    pub id: i64,
    pub name: String,
    pub category_id: i64,
}

/// A product; belongs to exactly one subcategory. `photo` holds a Telegram
/// file id when a photo was attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub photo: Option<String>,
    pub sub_category_id: i64,
}

/// Errors surfaced by repository operations.
#[derive(Debug)]
pub enum RepoError {
    /// A UNIQUE constraint rejected the write (name collision).
    Duplicate,
    /// The operation did not complete within the allowed time.
    Timeout,
    /// Any other persistence failure.
    Database(sqlx::Error),
}

impl std::fmt::Display for RepoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RepoError::Duplicate => write!(f, "name already exists"),
            RepoError::Timeout => write!(f, "repository operation timed out"),
            RepoError::Database(e) => write!(f, "database error: {e}"),
        }
    }
}

impl std::error::Error for RepoError {}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                return RepoError::Duplicate;
            }
        }
        RepoError::Database(err)
    }
}

/// Create the catalog tables if they do not exist yet.
pub async fn init_schema(pool: &SqlitePool) -> Result<(), RepoError> {
    info!("Initializing catalog schema");

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS sub_categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            category_id INTEGER NOT NULL
                REFERENCES categories(id) ON DELETE CASCADE,
            UNIQUE (category_id, name)
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS products (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            price REAL NOT NULL,
            photo TEXT,
            sub_category_id INTEGER NOT NULL
                REFERENCES sub_categories(id) ON DELETE CASCADE
        )",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// List all categories ordered by name.
pub async fn list_categories(pool: &SqlitePool) -> Result<Vec<Category>, RepoError> {
    let categories =
        sqlx::query_as::<_, Category>("SELECT id, name FROM categories ORDER BY name")
            .fetch_all(pool)
            .await?;
    Ok(categories)
}

/// List the subcategories of one category, ordered by name.
pub async fn list_subcategories(
    pool: &SqlitePool,
    category_id: i64,
) -> Result<Vec<SubCategory>, RepoError> {
    let subcategories = sqlx::query_as::<_, SubCategory>(
        "SELECT id, name, category_id FROM sub_categories
         WHERE category_id = ?1 ORDER BY name",
    )
    .bind(category_id)
    .fetch_all(pool)
    .await?;
    Ok(subcategories)
}

/// List the products of one subcategory, ordered by name.
pub async fn list_products(
    pool: &SqlitePool,
    subcategory_id: i64,
) -> Result<Vec<Product>, RepoError> {
    let products = sqlx::query_as::<_, Product>(
        "SELECT id, name, price, photo, sub_category_id FROM products
         WHERE sub_category_id = ?1 ORDER BY name",
    )
    .bind(subcategory_id)
    .fetch_all(pool)
    .await?;
    Ok(products)
}

pub async fn get_category(pool: &SqlitePool, id: i64) -> Result<Option<Category>, RepoError> {
    let category =
        sqlx::query_as::<_, Category>("SELECT id, name FROM categories WHERE id = ?1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(category)
}

pub async fn get_subcategory(
    pool: &SqlitePool,
    id: i64,
) -> Result<Option<SubCategory>, RepoError> {
    let subcategory = sqlx::query_as::<_, SubCategory>(
        "SELECT id, name, category_id FROM sub_categories WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(subcategory)
}

pub async fn get_product(pool: &SqlitePool, id: i64) -> Result<Option<Product>, RepoError> {
    let product = sqlx::query_as::<_, Product>(
        "SELECT id, name, price, photo, sub_category_id FROM products WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(product)
}

/// Create a category. A name collision yields `RepoError::Duplicate`.
pub async fn create_category(pool: &SqlitePool, name: &str) -> Result<i64, RepoError> {
    let result = sqlx::query("INSERT INTO categories (name) VALUES (?1)")
        .bind(name)
        .execute(pool)
        .await?;
    info!(category_id = result.last_insert_rowid(), name, "Category created");
    Ok(result.last_insert_rowid())
}

/// Create a subcategory under a category. The name must be unique within
/// that category only.
pub async fn create_subcategory(
    pool: &SqlitePool,
    name: &str,
    category_id: i64,
) -> Result<i64, RepoError> {
    let result = sqlx::query("INSERT INTO sub_categories (name, category_id) VALUES (?1, ?2)")
        .bind(name)
        .bind(category_id)
        .execute(pool)
        .await?;
    info!(
        subcategory_id = result.last_insert_rowid(),
        name, category_id, "Subcategory created"
    );
    Ok(result.last_insert_rowid())
}

/// Create a product under a subcategory, with an optional photo file id.
pub async fn create_product(
    pool: &SqlitePool,
    name: &str,
    price: f64,
    photo: Option<&str>,
    subcategory_id: i64,
) -> Result<i64, RepoError> {
    let result = sqlx::query(
        "INSERT INTO products (name, price, photo, sub_category_id) VALUES (?1, ?2, ?3, ?4)",
    )
    .bind(name)
    .bind(price)
    .bind(photo)
    .bind(subcategory_id)
    .execute(pool)
    .await?;
    info!(product_id = result.last_insert_rowid(), name, subcategory_id, "Product created");
    Ok(result.last_insert_rowid())
}

/// Delete a category and, through the cascade, everything under it.
/// Returns whether a row existed.
pub async fn delete_category(pool: &SqlitePool, id: i64) -> Result<bool, RepoError> {
    let result = sqlx::query("DELETE FROM categories WHERE id = ?1")
        .bind(id)
        .execute(pool)
        .await?;
    info!(category_id = id, deleted = result.rows_affected() > 0, "Category delete");
    Ok(result.rows_affected() > 0)
}

/// Delete a subcategory and its products. Returns whether a row existed.
pub async fn delete_subcategory(pool: &SqlitePool, id: i64) -> Result<bool, RepoError> {
    let result = sqlx::query("DELETE FROM sub_categories WHERE id = ?1")
        .bind(id)
        .execute(pool)
        .await?;
    info!(subcategory_id = id, deleted = result.rows_affected() > 0, "Subcategory delete");
    Ok(result.rows_affected() > 0)
}

/// Delete a single product. Returns whether a row existed.
pub async fn delete_product(pool: &SqlitePool, id: i64) -> Result<bool, RepoError> {
    let result = sqlx::query("DELETE FROM products WHERE id = ?1")
        .bind(id)
        .execute(pool)
        .await?;
    info!(product_id = id, deleted = result.rows_affected() > 0, "Product delete");
    Ok(result.rows_affected() > 0)
}
