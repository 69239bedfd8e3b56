use async_trait::async_trait;
use sqlx::{types::Json, PgPool, Row};

use crate::db::basket_repository::BasketRepository;
use crate::models::basket::{Basket, BasketItems};

pub struct PostgresBasketRepository {
    pub pool: PgPool,
}

#[async_trait]
impl BasketRepository for PostgresBasketRepository {
    async fn create_basket(&self, basket: &Basket) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO baskets (basket_id, items, promo) VALUES ($1, $2, $3)")
            .bind(&basket.basket_id)
            .bind(Json(&basket.items))
            .bind(&basket.promo)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_basket(&self, basket_id: &str) -> Result<Option<Basket>, sqlx::Error> {
        let row = sqlx::query("SELECT basket_id, items, promo FROM baskets WHERE basket_id = $1")
            .bind(basket_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|record| {
            let Json(items): Json<BasketItems> = record.try_get("items")?;
            Ok(Basket {
                basket_id: record.try_get("basket_id")?,
                items,
                promo: record.try_get("promo")?,
            })
        })
        .transpose()
    }

    async fn save_basket(&self, basket: &Basket) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE baskets SET items = $2, promo = $3 WHERE basket_id = $1")
            .bind(&basket.basket_id)
            .bind(Json(&basket.items))
            .bind(&basket.promo)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn delete_basket(&self, basket_id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM baskets WHERE basket_id = $1")
            .bind(basket_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
