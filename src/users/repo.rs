use anyhow::Context;
use sqlx::PgPool;
use time::OffsetDateTime;

use crate::users::repo_types::{Contribution, NewAccount, UserLogin, UserWithProfile};

/// Check whether a users row with this email already exists.
pub async fn email_exists(db: &PgPool, email: &str) -> anyhow::Result<bool> {
    let row: Option<(String,)> = sqlx::query_as(
        r#"
        SELECT email
        FROM users
        WHERE email = $1
        "#,
    )
    .bind(email)
    .fetch_optional(db)
    .await?;
    Ok(row.is_some())
}

pub async fn find_login_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<UserLogin>> {
    let row = sqlx::query_as::<_, UserLogin>(
        r#"
        SELECT email, hashpass
        FROM user_login
        WHERE email = $1
        "#,
    )
    .bind(email)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

pub async fn find_profile_by_user_id(
    db: &PgPool,
    user_id: i32,
) -> anyhow::Result<Option<UserWithProfile>> {
    let row = sqlx::query_as::<_, UserWithProfile>(
        r#"
        SELECT u.user_id, u.email, u.first_name, u.last_name, u.joined, u.isadmin,
               p.github, p.linkedin, p.website, p.location, p.role, p.skills, p.bio
        FROM users u
        INNER JOIN user_profile p ON u.email = p.email
        WHERE u.user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

pub async fn find_profile_by_email(
    db: &PgPool,
    email: &str,
) -> anyhow::Result<Option<UserWithProfile>> {
    let row = sqlx::query_as::<_, UserWithProfile>(
        r#"
        SELECT u.user_id, u.email, u.first_name, u.last_name, u.joined, u.isadmin,
               p.github, p.linkedin, p.website, p.location, p.role, p.skills, p.bio
        FROM users u
        INNER JOIN user_profile p ON u.email = p.email
        WHERE u.email = $1
        "#,
    )
    .bind(email)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

/// Create the users, user_profile and user_login rows of one registration
/// inside a single transaction. `joined` is stamped here; `isadmin` starts
/// false; profile fields beyond github and role start NULL.
pub async fn create_account(db: &PgPool, account: &NewAccount) -> anyhow::Result<()> {
    let mut tx = db.begin().await.context("begin tx")?;

    sqlx::query(
        r#"
        INSERT INTO users (email, first_name, last_name, joined, isadmin)
        VALUES ($1, $2, $3, $4, FALSE)
        "#,
    )
    .bind(&account.email)
    .bind(&account.first_name)
    .bind(&account.last_name)
    .bind(OffsetDateTime::now_utc())
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO user_profile (email, github, linkedin, website, location, role, skills, bio)
        VALUES ($1, $2, NULL, NULL, NULL, $3, NULL, NULL)
        "#,
    )
    .bind(&account.email)
    .bind(&account.github)
    .bind(&account.role)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO user_login (email, hashpass)
        VALUES ($1, $2)
        "#,
    )
    .bind(&account.email)
    .bind(&account.hashpass)
    .execute(&mut *tx)
    .await?;

    tx.commit().await.context("commit tx")?;
    Ok(())
}

/// Check whether the (user, project) membership pair already exists.
/// Uniqueness of the pair is enforced here, not by a database constraint.
pub async fn contribution_exists(
    db: &PgPool,
    user_id: i32,
    project_id: i32,
) -> anyhow::Result<bool> {
    let row = sqlx::query_as::<_, Contribution>(
        r#"
        SELECT user_id, project_id
        FROM contribution
        WHERE user_id = $1 AND project_id = $2
        "#,
    )
    .bind(user_id)
    .bind(project_id)
    .fetch_optional(db)
    .await?;
    Ok(row.is_some())
}

pub async fn add_contribution(db: &PgPool, user_id: i32, project_id: i32) -> anyhow::Result<()> {
    let mut tx = db.begin().await.context("begin tx")?;
    sqlx::query(
        r#"
        INSERT INTO contribution (user_id, project_id)
        VALUES ($1, $2)
        "#,
    )
    .bind(user_id)
    .bind(project_id)
    .execute(&mut *tx)
    .await?;
    tx.commit().await.context("commit tx")?;
    Ok(())
}
