use async_trait::async_trait;
use sqlx::PgPool;

use crate::db::product_repository::ProductRepository;
use crate::models::product::{Product, ProductFilter, ProductSummary};

const PRODUCT_COLUMNS: &str = r#"
    id,
    game_title,
    description,
    price,
    discount_price,
    dev_company,
    header_img,
    game_genre,
    game_theme,
    category
"#;

pub struct PostgresProductRepository {
    pub pool: PgPool,
}

/// Escapes LIKE wildcards so user input only ever matches literally.
fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for ch in query.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

#[async_trait]
impl ProductRepository for PostgresProductRepository {
    async fn find_product_by_title(&self, title: &str) -> Result<Option<Product>, sqlx::Error> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE game_title = $1");
        sqlx::query_as::<_, Product>(&sql)
            .bind(title)
            .fetch_optional(&self.pool)
            .await
    }

    async fn sample_products(
        &self,
        count: usize,
        discounted_only: bool,
    ) -> Result<Vec<Product>, sqlx::Error> {
        let sql = format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            WHERE ($2 = FALSE OR discount_price IS NOT NULL)
            ORDER BY random()
            LIMIT $1
            "#
        );
        sqlx::query_as::<_, Product>(&sql)
            .bind(i64::try_from(count).unwrap_or(i64::MAX))
            .bind(discounted_only)
            .fetch_all(&self.pool)
            .await
    }

    async fn find_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, sqlx::Error> {
        let sql = format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            WHERE category @> $1
              AND game_theme @> $2
              AND game_genre @> $3
              AND ($4::NUMERIC IS NULL OR COALESCE(discount_price, price) >= $4)
              AND ($5::NUMERIC IS NULL OR COALESCE(discount_price, price) <= $5)
            "#
        );
        sqlx::query_as::<_, Product>(&sql)
            .bind(&filter.tags)
            .bind(&filter.themes)
            .bind(&filter.genres)
            .bind(filter.min_price)
            .bind(filter.max_price)
            .fetch_all(&self.pool)
            .await
    }

    async fn search_titles(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<ProductSummary>, sqlx::Error> {
        sqlx::query_as::<_, ProductSummary>(
            r#"
            SELECT game_title, header_img, price, discount_price
            FROM products
            WHERE game_title ILIKE $1 ESCAPE '\'
            ORDER BY game_title
            LIMIT $2
            "#,
        )
        .bind(like_pattern(query))
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::like_pattern;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("half"), "%half%");
        assert_eq!(like_pattern("100%_off"), "%100\\%\\_off%");
    }
}
