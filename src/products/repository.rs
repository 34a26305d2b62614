use async_trait::async_trait;
use sqlx::PgPool;

use crate::db::StoreError;
use crate::products::models::Product;

/// Read access to the product catalog
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Product>, StoreError>;

    /// One window of products ordered by name, plus the total count
    async fn list(&self, offset: u64, limit: u32) -> Result<(Vec<Product>, u64), StoreError>;
}

/// PostgreSQL-backed product store
#[derive(Clone)]
pub struct PgProductStore {
    pool: PgPool,
}

impl PgProductStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<Product>, StoreError> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, image, name, product_type, description, price, quantity, availability
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    async fn list(&self, offset: u64, limit: u32) -> Result<(Vec<Product>, u64), StoreError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, image, name, product_type, description, price, quantity, availability
            FROM products
            ORDER BY name, id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(i64::from(limit))
        .bind(offset as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok((products, total.max(0) as u64))
    }
}

/// Fixed in-process catalog
#[derive(Debug, Default)]
pub struct MemoryProductStore {
    products: Vec<Product>,
}

impl MemoryProductStore {
    pub fn new(mut products: Vec<Product>) -> Self {
        products.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Self { products }
    }
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<Product>, StoreError> {
        Ok(self.products.iter().find(|p| p.id == id).cloned())
    }

    async fn list(&self, offset: u64, limit: u32) -> Result<(Vec<Product>, u64), StoreError> {
        let page = self
            .products
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect();
        Ok((page, self.products.len() as u64))
    }
}
