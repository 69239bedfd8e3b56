use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::user_repository::UserRepository;
use crate::models::user::{NewUser, ProfileUpdate, User};

const USER_COLUMNS: &str = r#"
    id,
    email,
    password_hash,
    first_name,
    last_name,
    birthday,
    is_activated,
    activation_link,
    billing_address_ids,
    shipping_address_ids,
    basket_id
"#;

pub struct PostgresUserRepository {
    pub pool: PgPool,
}

impl PostgresUserRepository {
    async fn fetch_one_by(&self, column: &str, value: &str) -> Result<Option<User>, sqlx::Error> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = $1");
        sqlx::query_as::<_, User>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, sqlx::Error> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        self.fetch_one_by("email", email).await
    }

    async fn find_user_by_activation_link(
        &self,
        activation_link: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        self.fetch_one_by("activation_link", activation_link).await
    }

    async fn is_email_taken(&self, email: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(&self.pool)
            .await
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User, sqlx::Error> {
        let sql = format!(
            r#"
            INSERT INTO users (
                id, email, password_hash, first_name, last_name, birthday,
                activation_link, billing_address_ids, shipping_address_ids
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {USER_COLUMNS}
            "#
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(new_user.id)
            .bind(&new_user.email)
            .bind(&new_user.password_hash)
            .bind(&new_user.first_name)
            .bind(&new_user.last_name)
            .bind(&new_user.birthday)
            .bind(&new_user.activation_link)
            .bind(&new_user.billing_address_ids)
            .bind(&new_user.shipping_address_ids)
            .fetch_one(&self.pool)
            .await
    }

    async fn set_user_activated(&self, user_id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET is_activated = TRUE WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn assign_basket(&self, user_id: Uuid, basket_id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET basket_id = $2
            WHERE id = $1 AND basket_id IS NULL
            "#,
        )
        .bind(user_id)
        .bind(basket_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn update_profile(
        &self,
        user_id: Uuid,
        update: &ProfileUpdate,
    ) -> Result<Option<User>, sqlx::Error> {
        let sql = format!(
            r#"
            UPDATE users
            SET first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                birthday = COALESCE($4, birthday)
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(user_id)
            .bind(update.first_name.as_deref().map(str::trim))
            .bind(update.last_name.as_deref().map(str::trim))
            .bind(update.birthday.as_deref().map(str::trim))
            .fetch_optional(&self.pool)
            .await
    }

    async fn remove_address_reference(
        &self,
        user_id: Uuid,
        address_id: Uuid,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE users
            SET billing_address_ids = array_remove(billing_address_ids, $2),
                shipping_address_ids = array_remove(shipping_address_ids, $2)
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(address_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_user(&self, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
