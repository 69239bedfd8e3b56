use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::db::address_repository::AddressRepository;
use crate::models::address::{Address, AddressKind};

#[derive(FromRow)]
struct AddressRow {
    id: Uuid,
    kind: String,
    country: String,
    city: String,
    street: String,
    postal_code: String,
    is_default: bool,
}

impl TryFrom<AddressRow> for Address {
    type Error = sqlx::Error;

    fn try_from(row: AddressRow) -> Result<Self, Self::Error> {
        let kind = AddressKind::parse(&row.kind).ok_or_else(|| {
            sqlx::Error::Decode(format!("unknown address kind {:?}", row.kind).into())
        })?;
        Ok(Address {
            id: row.id,
            kind,
            country: row.country,
            city: row.city,
            street: row.street,
            postal_code: row.postal_code,
            is_default: row.is_default,
        })
    }
}

pub struct PostgresAddressRepository {
    pub pool: PgPool,
}

#[async_trait]
impl AddressRepository for PostgresAddressRepository {
    async fn create_address(&self, address: &Address) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO addresses (id, kind, country, city, street, postal_code, is_default)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(address.id)
        .bind(address.kind.as_str())
        .bind(&address.country)
        .bind(&address.city)
        .bind(&address.street)
        .bind(&address.postal_code)
        .bind(address.is_default)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_addresses(&self, ids: &[Uuid]) -> Result<Vec<Address>, sqlx::Error> {
        let rows = sqlx::query_as::<_, AddressRow>(
            r#"
            SELECT id, kind, country, city, street, postal_code, is_default
            FROM addresses
            WHERE id = ANY($1)
            ORDER BY is_default DESC, id
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Address::try_from).collect()
    }

    async fn update_address(&self, address: &Address) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE addresses
            SET country = $2, city = $3, street = $4, postal_code = $5, is_default = $6
            WHERE id = $1 AND kind = $7
            "#,
        )
        .bind(address.id)
        .bind(&address.country)
        .bind(&address.city)
        .bind(&address.street)
        .bind(&address.postal_code)
        .bind(address.is_default)
        .bind(address.kind.as_str())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn delete_addresses(&self, ids: &[Uuid]) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM addresses WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
