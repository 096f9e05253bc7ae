//! Product/brand catalog lookups.
//!
//! Lookups tolerate missing rows: a product or brand that has vanished from
//! the catalog simply does not appear in the returned map, and the resolver
//! stage decides what that means for the line item.

use std::collections::{HashMap, HashSet};

use clementine_core::{BrandId, BrandRef, ProductId};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use super::RepositoryError;

/// Catalog data needed to resolve one product's price and brand.
#[derive(Debug, Clone)]
pub struct CatalogProduct {
    /// Current regular price, used as the final price fallback.
    pub price: Option<Decimal>,
    /// Current sale price; preferred over `price` when positive.
    pub sale_price: Option<Decimal>,
    /// Brand field in either historical representation, if any.
    pub brand: Option<BrandRef>,
}

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    price: Option<Decimal>,
    sale_price: Option<Decimal>,
    brand_id: Option<Uuid>,
    brand_name: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct BrandRow {
    id: Uuid,
    name: String,
}

/// Read-only access to the product/brand catalog.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: PgPool,
}

impl CatalogRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Resolve a batch of product IDs to their catalog rows.
    ///
    /// Products that no longer exist are absent from the result.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn products_by_ids(
        &self,
        ids: &[ProductId],
    ) -> Result<HashMap<ProductId, CatalogProduct>, RepositoryError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let raw_ids: Vec<Uuid> = ids.iter().map(|id| id.as_uuid()).collect();
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, price, sale_price, brand_id, brand_name
            FROM products
            WHERE id = ANY($1)
            ",
        )
        .bind(&raw_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                (
                    ProductId::new(row.id),
                    CatalogProduct {
                        price: row.price,
                        sale_price: row.sale_price,
                        brand: BrandRef::from_catalog_columns(row.brand_id, row.brand_name),
                    },
                )
            })
            .collect())
    }

    /// Resolve a batch of brand IDs to their display names.
    ///
    /// Dangling references are absent from the result; the resolver maps
    /// them to the "Unknown" sentinel.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn brand_names_by_ids(
        &self,
        ids: &[BrandId],
    ) -> Result<HashMap<BrandId, String>, RepositoryError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let raw_ids: Vec<Uuid> = ids.iter().map(|id| id.as_uuid()).collect();
        let rows = sqlx::query_as::<_, BrandRow>(
            r"
            SELECT id, name
            FROM brands
            WHERE id = ANY($1)
            ",
        )
        .bind(&raw_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| (BrandId::new(row.id), row.name))
            .collect())
    }

    /// The set of product IDs belonging to a brand, used for tenant scoping.
    ///
    /// Only the referential brand form participates: legacy string-branded
    /// products cannot be addressed by brand ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn product_ids_for_brand(
        &self,
        brand: BrandId,
    ) -> Result<HashSet<ProductId>, RepositoryError> {
        let rows = sqlx::query_scalar::<_, Uuid>(
            r"
            SELECT id
            FROM products
            WHERE brand_id = $1
            ",
        )
        .bind(brand.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ProductId::new).collect())
    }
}
