//! Inventory store trait and SQLite implementation.

use crate::error::{StoreError, StoreResult};
use crate::repos::{CategoryRepo, ProductRepo, SessionRepo, UserRepo};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Combined inventory store trait.
#[async_trait]
pub trait InventoryStore:
    UserRepo + SessionRepo + CategoryRepo + ProductRepo + Send + Sync
{
    /// Run database migrations.
    async fn migrate(&self) -> StoreResult<()>;

    /// Check database connectivity and health.
    async fn health_check(&self) -> StoreResult<()>;
}

/// SQLite-based inventory store.
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    /// Open (creating if missing) a SQLite store and run migrations.
    pub async fn new(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}?mode=rwc", path.display()))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .foreign_keys(true)
            // Prevent transient "database is locked" errors under concurrent access.
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            // SQLite permits limited write concurrency; a single connection avoids
            // persistent "database is locked" failures under axum concurrency.
            .max_connections(1)
            .connect_with(opts)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }
}

#[async_trait]
impl InventoryStore for SqliteStore {
    async fn migrate(&self) -> StoreResult<()> {
        sqlx::query(SCHEMA_SQL).execute(&self.pool).await?;
        Ok(())
    }

    async fn health_check(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Whether a sqlx error is a SQLite UNIQUE constraint violation.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.message().contains("UNIQUE constraint"))
}

// Implement all the repository traits for SqliteStore
mod sqlite_impl {
    use super::*;
    use crate::models::*;
    use crate::repos::CategoryFilter;
    use time::OffsetDateTime;

    #[async_trait]
    impl UserRepo for SqliteStore {
        async fn create_user(&self, user: &NewUser) -> StoreResult<UserRow> {
            let result = sqlx::query_as::<_, UserRow>(
                r#"
                INSERT INTO users (name, email, password_hash, created_at)
                VALUES (?, ?, ?, ?)
                RETURNING *
                "#,
            )
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.created_at)
            .fetch_one(&self.pool)
            .await;

            match result {
                Ok(row) => Ok(row),
                Err(err) if is_unique_violation(&err) => Err(StoreError::AlreadyExists(format!(
                    "email '{}' already registered",
                    user.email
                ))),
                Err(err) => Err(err.into()),
            }
        }

        async fn get_user(&self, user_id: i64) -> StoreResult<Option<UserRow>> {
            let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = ?")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
            Ok(row)
        }

        async fn get_user_by_email(&self, email: &str) -> StoreResult<Option<UserRow>> {
            let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = ?")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;
            Ok(row)
        }
    }

    #[async_trait]
    impl SessionRepo for SqliteStore {
        async fn create_session(&self, session: &NewSession) -> StoreResult<SessionRow> {
            let row = sqlx::query_as::<_, SessionRow>(
                r#"
                INSERT INTO sessions (token_hash, user_id, created_at, expires_at)
                VALUES (?, ?, ?, ?)
                RETURNING *
                "#,
            )
            .bind(&session.token_hash)
            .bind(session.user_id)
            .bind(session.created_at)
            .bind(session.expires_at)
            .fetch_one(&self.pool)
            .await?;
            Ok(row)
        }

        async fn get_session_by_token_hash(
            &self,
            token_hash: &str,
        ) -> StoreResult<Option<SessionRow>> {
            let row =
                sqlx::query_as::<_, SessionRow>("SELECT * FROM sessions WHERE token_hash = ?")
                    .bind(token_hash)
                    .fetch_optional(&self.pool)
                    .await?;
            Ok(row)
        }

        async fn touch_session(
            &self,
            session_id: i64,
            used_at: OffsetDateTime,
        ) -> StoreResult<()> {
            sqlx::query("UPDATE sessions SET last_used_at = ? WHERE id = ?")
                .bind(used_at)
                .bind(session_id)
                .execute(&self.pool)
                .await?;
            Ok(())
        }

        async fn delete_expired_sessions(&self, now: OffsetDateTime) -> StoreResult<u64> {
            let result = sqlx::query("DELETE FROM sessions WHERE expires_at < ?")
                .bind(now)
                .execute(&self.pool)
                .await?;
            Ok(result.rows_affected())
        }
    }

    #[async_trait]
    impl CategoryRepo for SqliteStore {
        async fn create_category(&self, name: &str) -> StoreResult<CategoryRow> {
            let result = sqlx::query_as::<_, CategoryRow>(
                "INSERT INTO categories (name) VALUES (?) RETURNING *",
            )
            .bind(name)
            .fetch_one(&self.pool)
            .await;

            match result {
                Ok(row) => Ok(row),
                Err(err) if is_unique_violation(&err) => Err(StoreError::AlreadyExists(format!(
                    "category name '{name}' already exists"
                ))),
                Err(err) => Err(err.into()),
            }
        }

        async fn get_category(&self, category_id: i64) -> StoreResult<Option<CategoryRow>> {
            let row = sqlx::query_as::<_, CategoryRow>("SELECT * FROM categories WHERE id = ?")
                .bind(category_id)
                .fetch_optional(&self.pool)
                .await?;
            Ok(row)
        }

        async fn find_category_by_name(&self, name: &str) -> StoreResult<Option<CategoryRow>> {
            let row = sqlx::query_as::<_, CategoryRow>("SELECT * FROM categories WHERE name = ?")
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;
            Ok(row)
        }

        async fn list_categories(&self, filter: &CategoryFilter) -> StoreResult<Vec<CategoryRow>> {
            // Filters translate to SQL at this boundary; SQLite LIKE is
            // case-insensitive for ASCII, which matches the dashboard's
            // expectations for the search boxes.
            let mut sql = String::from("SELECT * FROM categories");
            let mut clauses: Vec<&str> = Vec::new();

            if filter.search.is_some() {
                clauses.push("name LIKE '%' || ? || '%'");
            }
            match filter.has_products {
                Some(true) => clauses.push(
                    "EXISTS (SELECT 1 FROM products WHERE products.category_id = categories.id)",
                ),
                Some(false) => clauses.push(
                    "NOT EXISTS (SELECT 1 FROM products WHERE products.category_id = categories.id)",
                ),
                None => {}
            }
            if filter.product_name.is_some() {
                clauses.push(
                    "EXISTS (SELECT 1 FROM products WHERE products.category_id = categories.id \
                     AND products.name LIKE '%' || ? || '%')",
                );
            }

            if !clauses.is_empty() {
                sql.push_str(" WHERE ");
                sql.push_str(&clauses.join(" AND "));
            }
            sql.push_str(" ORDER BY name");

            let mut query = sqlx::query_as::<_, CategoryRow>(&sql);
            if let Some(search) = &filter.search {
                query = query.bind(search);
            }
            if let Some(product_name) = &filter.product_name {
                query = query.bind(product_name);
            }

            let rows = query.fetch_all(&self.pool).await?;
            Ok(rows)
        }

        async fn delete_category(&self, category_id: i64) -> StoreResult<CategoryRow> {
            // Nullify dependents and delete in one transaction so the policy
            // holds even if the schema-level ON DELETE SET NULL is absent
            // (e.g. a database created by an older schema).
            let mut tx = self.pool.begin().await?;

            let row = sqlx::query_as::<_, CategoryRow>("SELECT * FROM categories WHERE id = ?")
                .bind(category_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| {
                    StoreError::NotFound(format!("category {category_id} not found"))
                })?;

            let cleared = sqlx::query("UPDATE products SET category_id = NULL WHERE category_id = ?")
                .bind(category_id)
                .execute(&mut *tx)
                .await?;

            sqlx::query("DELETE FROM categories WHERE id = ?")
                .bind(category_id)
                .execute(&mut *tx)
                .await?;

            tx.commit().await?;

            if cleared.rows_affected() > 0 {
                tracing::debug!(
                    category_id,
                    products = cleared.rows_affected(),
                    "cleared category references on dependent products"
                );
            }
            Ok(row)
        }
    }

    #[async_trait]
    impl ProductRepo for SqliteStore {
        async fn create_product(&self, product: &NewProduct) -> StoreResult<ProductRow> {
            let row = sqlx::query_as::<_, ProductRow>(
                r#"
                INSERT INTO products (name, sku, description, price, quantity, category_id, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                RETURNING *
                "#,
            )
            .bind(&product.name)
            .bind(&product.sku)
            .bind(&product.description)
            .bind(product.price)
            .bind(product.quantity)
            .bind(product.category_id)
            .bind(product.created_at)
            .fetch_one(&self.pool)
            .await?;
            Ok(row)
        }

        async fn get_product(&self, product_id: i64) -> StoreResult<Option<ProductRow>> {
            let row = sqlx::query_as::<_, ProductRow>("SELECT * FROM products WHERE id = ?")
                .bind(product_id)
                .fetch_optional(&self.pool)
                .await?;
            Ok(row)
        }

        async fn get_product_with_category(
            &self,
            product_id: i64,
        ) -> StoreResult<Option<ProductWithCategoryRow>> {
            let row = sqlx::query_as::<_, ProductWithCategoryRow>(
                r#"
                SELECT products.*, categories.name AS category_name
                FROM products
                LEFT JOIN categories ON categories.id = products.category_id
                WHERE products.id = ?
                "#,
            )
            .bind(product_id)
            .fetch_optional(&self.pool)
            .await?;
            Ok(row)
        }

        async fn list_products_with_categories(
            &self,
        ) -> StoreResult<Vec<ProductWithCategoryRow>> {
            let rows = sqlx::query_as::<_, ProductWithCategoryRow>(
                r#"
                SELECT products.*, categories.name AS category_name
                FROM products
                LEFT JOIN categories ON categories.id = products.category_id
                ORDER BY products.created_at DESC, products.id DESC
                "#,
            )
            .fetch_all(&self.pool)
            .await?;
            Ok(rows)
        }

        async fn list_products_in_category(
            &self,
            category_id: i64,
        ) -> StoreResult<Vec<ProductRow>> {
            let rows = sqlx::query_as::<_, ProductRow>(
                "SELECT * FROM products WHERE category_id = ? ORDER BY created_at DESC, id DESC",
            )
            .bind(category_id)
            .fetch_all(&self.pool)
            .await?;
            Ok(rows)
        }

        async fn update_product(
            &self,
            product_id: i64,
            changes: &ProductChanges,
        ) -> StoreResult<ProductRow> {
            // Read-then-write in one transaction: sku/description patches
            // resolve against the stored values, everything else is replaced.
            let mut tx = self.pool.begin().await?;

            let existing = sqlx::query_as::<_, ProductRow>("SELECT * FROM products WHERE id = ?")
                .bind(product_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| StoreError::NotFound(format!("product {product_id} not found")))?;

            let sku = changes.sku.apply(existing.sku);
            let description = changes.description.apply(existing.description);

            let updated = sqlx::query_as::<_, ProductRow>(
                r#"
                UPDATE products
                SET name = ?, sku = ?, description = ?, price = ?, quantity = ?, category_id = ?
                WHERE id = ?
                RETURNING *
                "#,
            )
            .bind(&changes.name)
            .bind(&sku)
            .bind(&description)
            .bind(changes.price)
            .bind(changes.quantity)
            .bind(changes.category_id)
            .bind(product_id)
            .fetch_one(&mut *tx)
            .await?;

            tx.commit().await?;
            Ok(updated)
        }

        async fn delete_product(&self, product_id: i64) -> StoreResult<ProductRow> {
            let row = sqlx::query_as::<_, ProductRow>(
                "DELETE FROM products WHERE id = ? RETURNING *",
            )
            .bind(product_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("product {product_id} not found")))?;
            Ok(row)
        }
    }
}

const SCHEMA_SQL: &str = r#"
-- Users
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    created_at TEXT NOT NULL
);

-- Bearer sessions (token stored as SHA-256 hex, never raw)
CREATE TABLE IF NOT EXISTS sessions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    token_hash TEXT NOT NULL UNIQUE,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    created_at TEXT NOT NULL,
    expires_at TEXT NOT NULL,
    last_used_at TEXT
);
CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id);
CREATE INDEX IF NOT EXISTS idx_sessions_expiry ON sessions(expires_at);

-- Categories (name uniqueness is case-sensitive after trimming)
CREATE TABLE IF NOT EXISTS categories (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);

-- Products
CREATE TABLE IF NOT EXISTS products (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    sku TEXT,
    description TEXT,
    price REAL NOT NULL,
    quantity INTEGER NOT NULL DEFAULT 0,
    category_id INTEGER REFERENCES categories(id) ON DELETE SET NULL,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_products_category ON products(category_id);
CREATE INDEX IF NOT EXISTS idx_products_created ON products(created_at);
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewProduct, NewUser, ProductChanges};
    use crate::repos::{CategoryFilter, resolve_category_id};
    use stockroom_core::product::TextPatch;
    use tempfile::tempdir;
    use time::OffsetDateTime;

    async fn open_store() -> (tempfile::TempDir, SqliteStore) {
        let temp = tempdir().unwrap();
        let store = SqliteStore::new(temp.path().join("inventory.db"))
            .await
            .unwrap();
        (temp, store)
    }

    fn new_product(name: &str, category_id: Option<i64>) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            sku: None,
            description: None,
            price: 1.0,
            quantity: 0,
            category_id,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[tokio::test]
    async fn migrate_is_idempotent() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("inventory.db");
        let store = SqliteStore::new(&path).await.unwrap();
        store.migrate().await.unwrap();
        store.health_check().await.unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn duplicate_email_is_already_exists() {
        let (_temp, store) = open_store().await;
        let user = NewUser {
            name: "Ada".to_string(),
            email: "ada@example.test".to_string(),
            password_hash: "$argon2id$stub".to_string(),
            created_at: OffsetDateTime::now_utc(),
        };
        store.create_user(&user).await.unwrap();
        let err = store.create_user(&user).await.unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn duplicate_category_name_is_already_exists() {
        let (_temp, store) = open_store().await;
        store.create_category("Snacks").await.unwrap();
        let err = store.create_category("Snacks").await.unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(_)));
        // Case differs: no conflict, uniqueness is case-sensitive.
        store.create_category("snacks").await.unwrap();
    }

    #[tokio::test]
    async fn resolver_against_sqlite_is_idempotent() {
        let (_temp, store) = open_store().await;
        let first = resolve_category_id(&store, Some("Snacks")).await.unwrap();
        let second = resolve_category_id(&store, Some(" Snacks "))
            .await
            .unwrap();
        assert_eq!(first, second);
        assert!(first.is_some());
        let all = store
            .list_categories(&CategoryFilter::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn category_filters_translate_to_sql() {
        let (_temp, store) = open_store().await;
        let snacks = store.create_category("Snacks").await.unwrap();
        store.create_category("Drinks").await.unwrap();
        store
            .create_product(&new_product("Chips", Some(snacks.id)))
            .await
            .unwrap();

        let found = store
            .list_categories(&CategoryFilter {
                search: Some("nack".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Snacks");

        // Search is case-insensitive even though uniqueness is not.
        let found = store
            .list_categories(&CategoryFilter {
                search: Some("SNACK".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(found.len(), 1);

        let with_products = store
            .list_categories(&CategoryFilter {
                has_products: Some(true),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(with_products.len(), 1);
        assert_eq!(with_products[0].name, "Snacks");

        let empty = store
            .list_categories(&CategoryFilter {
                has_products: Some(false),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(empty.len(), 1);
        assert_eq!(empty[0].name, "Drinks");

        let by_product = store
            .list_categories(&CategoryFilter {
                product_name: Some("chip".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_product.len(), 1);
        assert_eq!(by_product[0].name, "Snacks");
    }

    #[tokio::test]
    async fn update_product_patches_text_fields() {
        let (_temp, store) = open_store().await;
        let created = store
            .create_product(&NewProduct {
                sku: Some("AB-1".to_string()),
                description: Some("salted".to_string()),
                ..new_product("Chips", None)
            })
            .await
            .unwrap();

        // Omitted fields keep their stored values.
        let updated = store
            .update_product(
                created.id,
                &ProductChanges {
                    name: "Chips XL".to_string(),
                    price: 3.5,
                    quantity: 7,
                    sku: TextPatch::Keep,
                    description: TextPatch::Clear,
                    category_id: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Chips XL");
        assert_eq!(updated.price, 3.5);
        assert_eq!(updated.quantity, 7);
        assert_eq!(updated.sku.as_deref(), Some("AB-1"));
        assert_eq!(updated.description, None);
    }

    #[tokio::test]
    async fn update_unknown_product_is_not_found() {
        let (_temp, store) = open_store().await;
        let err = store
            .update_product(
                999,
                &ProductChanges {
                    name: "X".to_string(),
                    price: 1.0,
                    quantity: 0,
                    sku: TextPatch::Keep,
                    description: TextPatch::Keep,
                    category_id: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_category_clears_product_references() {
        let (_temp, store) = open_store().await;
        let snacks = store.create_category("Snacks").await.unwrap();
        let product = store
            .create_product(&new_product("Chips", Some(snacks.id)))
            .await
            .unwrap();

        let deleted = store.delete_category(snacks.id).await.unwrap();
        assert_eq!(deleted.name, "Snacks");

        let survivor = store.get_product(product.id).await.unwrap().unwrap();
        assert_eq!(survivor.category_id, None);

        let joined = store
            .get_product_with_category(product.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(joined.category_name, None);
    }

    #[tokio::test]
    async fn delete_product_returns_row() {
        let (_temp, store) = open_store().await;
        let created = store.create_product(&new_product("Chips", None)).await.unwrap();
        let deleted = store.delete_product(created.id).await.unwrap();
        assert_eq!(deleted.id, created.id);
        let err = store.delete_product(created.id).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn product_listing_is_newest_first() {
        let (_temp, store) = open_store().await;
        let now = OffsetDateTime::now_utc();
        store
            .create_product(&NewProduct {
                created_at: now - time::Duration::minutes(2),
                ..new_product("Older", None)
            })
            .await
            .unwrap();
        store
            .create_product(&NewProduct {
                created_at: now,
                ..new_product("Newer", None)
            })
            .await
            .unwrap();

        let listed = store.list_products_with_categories().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].name, "Newer");
        assert_eq!(listed[1].name, "Older");
    }
}
