//! Item persistence.
//!
//! Composite writes (item + link + skills, skill replacement, cascade delete)
//! run inside a single transaction so a half-applied mutation can never be
//! observed.

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::portfolio::{LinkRow, PortfolioItemRow, WitnessRow};
use crate::portfolio::validation::ValidatedFields;
use crate::portfolio::witness::Witness;

/// Everything a caller sees about one item.
#[derive(Debug, Clone)]
pub struct ItemBundle {
    pub item: PortfolioItemRow,
    pub link: Option<LinkRow>,
    pub skills: Vec<String>,
    pub witnesses: Vec<Witness>,
}

/// Opaque token for unauthenticated public lookup. Generated once at
/// creation, immutable, and unrelated to the primary key.
pub fn generate_public_token() -> String {
    Uuid::new_v4().simple().to_string()
}

pub async fn load_item(pool: &PgPool, id: Uuid) -> Result<PortfolioItemRow, AppError> {
    let item: Option<PortfolioItemRow> =
        sqlx::query_as("SELECT * FROM portfolio_items WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
    item.ok_or_else(|| AppError::NotFound(format!("Portfolio item {id} not found")))
}

pub async fn load_witnesses(pool: &PgPool, item_id: Uuid) -> Result<Vec<Witness>, AppError> {
    let rows: Vec<WitnessRow> =
        sqlx::query_as("SELECT * FROM witnesses WHERE item_id = $1 ORDER BY created_at ASC")
            .bind(item_id)
            .fetch_all(pool)
            .await?;
    Ok(rows
        .into_iter()
        .map(|r| Witness {
            faculty_id: r.faculty_id,
            faculty_name: r.faculty_name,
        })
        .collect())
}

pub async fn load_skills(pool: &PgPool, item_id: Uuid) -> Result<Vec<String>, AppError> {
    let skills: Vec<String> =
        sqlx::query_scalar("SELECT name FROM skills WHERE item_id = $1 ORDER BY name ASC")
            .bind(item_id)
            .fetch_all(pool)
            .await?;
    Ok(skills)
}

/// Fetches the sub-resources for an already-loaded item row.
pub async fn load_bundle(pool: &PgPool, item: PortfolioItemRow) -> Result<ItemBundle, AppError> {
    let link: Option<LinkRow> = sqlx::query_as("SELECT * FROM links WHERE item_id = $1")
        .bind(item.id)
        .fetch_optional(pool)
        .await?;
    let skills = load_skills(pool, item.id).await?;
    let witnesses = load_witnesses(pool, item.id).await?;
    Ok(ItemBundle {
        item,
        link,
        skills,
        witnesses,
    })
}

pub async fn load_user_bundles(pool: &PgPool, owner_id: Uuid) -> Result<Vec<ItemBundle>, AppError> {
    let items: Vec<PortfolioItemRow> = sqlx::query_as(
        "SELECT * FROM portfolio_items WHERE owner_id = $1 ORDER BY created_at DESC",
    )
    .bind(owner_id)
    .fetch_all(pool)
    .await?;

    let mut bundles = Vec::with_capacity(items.len());
    for item in items {
        bundles.push(load_bundle(pool, item).await?);
    }
    Ok(bundles)
}

/// Inserts the item, its default-public link, and its skills in one
/// transaction, and returns the persisted row.
pub async fn insert_item(
    pool: &PgPool,
    owner_id: Uuid,
    fields: &ValidatedFields,
    cert_file: Option<String>,
    skills: &[String],
) -> Result<PortfolioItemRow, AppError> {
    let mut tx = pool.begin().await?;

    let item: PortfolioItemRow = sqlx::query_as(
        r#"
        INSERT INTO portfolio_items
            (owner_id, category, title, description, github_link, course_code,
             cert_title, issue_date, cert_file, public_token)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING *
        "#,
    )
    .bind(owner_id)
    .bind(fields.category.as_str())
    .bind(&fields.title)
    .bind(&fields.description)
    .bind(&fields.github_link)
    .bind(&fields.course_code)
    .bind(&fields.cert_title)
    .bind(fields.issue_date)
    .bind(&cert_file)
    .bind(generate_public_token())
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("INSERT INTO links (item_id, is_active) VALUES ($1, TRUE)")
        .bind(item.id)
        .execute(&mut *tx)
        .await?;

    for skill in skills {
        sqlx::query("INSERT INTO skills (item_id, name) VALUES ($1, $2)")
            .bind(item.id)
            .bind(skill)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    info!("Created {} item {} for user {owner_id}", item.category, item.id);
    Ok(item)
}

/// Writes back an updated item row; when `skills` is provided the prior set
/// is fully replaced (delete-then-insert, same transaction).
pub async fn persist_update(
    pool: &PgPool,
    item: &PortfolioItemRow,
    skills: Option<&[String]>,
) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        UPDATE portfolio_items
        SET category = $2, title = $3, description = $4, github_link = $5,
            course_code = $6, cert_title = $7, issue_date = $8, cert_file = $9,
            updated_at = $10
        WHERE id = $1
        "#,
    )
    .bind(item.id)
    .bind(&item.category)
    .bind(&item.title)
    .bind(&item.description)
    .bind(&item.github_link)
    .bind(&item.course_code)
    .bind(&item.cert_title)
    .bind(item.issue_date)
    .bind(&item.cert_file)
    .bind(item.updated_at)
    .execute(&mut *tx)
    .await?;

    if let Some(skills) = skills {
        sqlx::query("DELETE FROM skills WHERE item_id = $1")
            .bind(item.id)
            .execute(&mut *tx)
            .await?;
        for skill in skills {
            sqlx::query("INSERT INTO skills (item_id, name) VALUES ($1, $2)")
                .bind(item.id)
                .bind(skill)
                .execute(&mut *tx)
                .await?;
        }
    }

    tx.commit().await?;
    info!("Updated portfolio item {}", item.id);
    Ok(())
}

/// Writes back the validation axis only.
pub async fn persist_validation(pool: &PgPool, item: &PortfolioItemRow) -> Result<(), AppError> {
    sqlx::query(
        r#"
        UPDATE portfolio_items
        SET validated_by_faculty = $2, validated_by_id = $3, validated_by_name = $4,
            updated_at = $5
        WHERE id = $1
        "#,
    )
    .bind(item.id)
    .bind(item.validated_by_faculty)
    .bind(item.validated_by_id)
    .bind(&item.validated_by_name)
    .bind(item.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn insert_witness(
    pool: &PgPool,
    item_id: Uuid,
    faculty_id: Uuid,
    faculty_name: &str,
) -> Result<(), AppError> {
    sqlx::query("INSERT INTO witnesses (item_id, faculty_id, faculty_name) VALUES ($1, $2, $3)")
        .bind(item_id)
        .bind(faculty_id)
        .bind(faculty_name)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn delete_witness(
    pool: &PgPool,
    item_id: Uuid,
    faculty_id: Uuid,
) -> Result<(), AppError> {
    sqlx::query("DELETE FROM witnesses WHERE item_id = $1 AND faculty_id = $2")
        .bind(item_id)
        .bind(faculty_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Deletes the item and all owned sub-entities in one transaction.
pub async fn delete_item(pool: &PgPool, id: Uuid) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM skills WHERE item_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM witnesses WHERE item_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM links WHERE item_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM portfolio_items WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    info!("Deleted portfolio item {id}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_token_is_opaque() {
        let token = generate_public_token();
        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        // Not a bare counter; two tokens never collide in practice.
        assert_ne!(token, generate_public_token());
    }
}
