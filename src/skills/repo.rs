use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// How a skill is paid for. Stored as lowercase text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentKind {
    Credits,
    Favor,
}

/// How a session is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text")]
pub enum SessionMode {
    #[sqlx(rename = "online")]
    #[serde(rename = "online")]
    Online,
    #[sqlx(rename = "in-person")]
    #[serde(rename = "in-person")]
    InPerson,
}

/// Skill listing record. `teacher_email` is denormalized so listings and
/// session snapshots render without a join back to users.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Skill {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub payment_kind: PaymentKind,
    pub payment_amount: i64,
    pub session_mode: SessionMode,
    pub teacher_id: Uuid,
    pub teacher_email: String,
    pub created_at: OffsetDateTime,
}

/// Validated fields for a new listing.
#[derive(Debug)]
pub struct NewSkill<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub payment_kind: PaymentKind,
    pub payment_amount: i64,
    pub session_mode: SessionMode,
    pub teacher_id: Uuid,
    pub teacher_email: &'a str,
}

const SKILL_COLUMNS: &str =
    "id, name, description, payment_kind, payment_amount, session_mode, teacher_id, teacher_email, created_at";

impl Skill {
    pub async fn create(db: &PgPool, fields: &NewSkill<'_>) -> anyhow::Result<Skill> {
        let skill = sqlx::query_as::<_, Skill>(&format!(
            r#"
            INSERT INTO skills (name, description, payment_kind, payment_amount, session_mode, teacher_id, teacher_email)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {SKILL_COLUMNS}
            "#
        ))
        .bind(fields.name)
        .bind(fields.description)
        .bind(fields.payment_kind)
        .bind(fields.payment_amount)
        .bind(fields.session_mode)
        .bind(fields.teacher_id)
        .bind(fields.teacher_email)
        .fetch_one(db)
        .await?;
        Ok(skill)
    }

    pub async fn find(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Skill>> {
        let skill = sqlx::query_as::<_, Skill>(&format!(
            r#"SELECT {SKILL_COLUMNS} FROM skills WHERE id = $1"#
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(skill)
    }

    /// The caller's own listings.
    pub async fn list_by_teacher(db: &PgPool, teacher_id: Uuid) -> anyhow::Result<Vec<Skill>> {
        let skills = sqlx::query_as::<_, Skill>(&format!(
            r#"
            SELECT {SKILL_COLUMNS}
            FROM skills
            WHERE teacher_id = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(teacher_id)
        .fetch_all(db)
        .await?;
        Ok(skills)
    }

    /// Everyone else's listings, for browsing.
    pub async fn list_all_except(db: &PgPool, teacher_id: Uuid) -> anyhow::Result<Vec<Skill>> {
        let skills = sqlx::query_as::<_, Skill>(&format!(
            r#"
            SELECT {SKILL_COLUMNS}
            FROM skills
            WHERE teacher_id <> $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(teacher_id)
        .fetch_all(db)
        .await?;
        Ok(skills)
    }

    /// Remove a listing. No cascade: sessions referencing it keep their
    /// snapshot and stay valid. Ownership is checked by the caller.
    pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query(r#"DELETE FROM skills WHERE id = $1"#)
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
