use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::skills::repo::PaymentKind;

/// Lifecycle of a session request. `pending` is the only state that
/// admits a transition; `approved` and `rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Pending,
    Approved,
    Rejected,
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SessionStatus::Pending => "pending",
            SessionStatus::Approved => "approved",
            SessionStatus::Rejected => "rejected",
        };
        f.write_str(s)
    }
}

/// Session request record. Skill name and payment terms are snapshots
/// taken at request time; they do not follow later listing changes and
/// survive listing deletion.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    pub id: Uuid,
    pub skill_id: Uuid,
    pub skill_name: String,
    pub teacher_id: Uuid,
    pub teacher_email: String,
    pub learner_id: Uuid,
    pub learner_email: String,
    pub payment_kind: PaymentKind,
    pub payment_amount: i64,
    pub status: SessionStatus,
    pub preferred_date1: String,
    pub preferred_time1: String,
    pub preferred_date2: Option<String>,
    pub preferred_time2: Option<String>,
    pub preferred_date3: Option<String>,
    pub preferred_time3: Option<String>,
    pub scheduled_at: Option<OffsetDateTime>,
    pub requested_at: OffsetDateTime,
}

/// Fields for a new session request, snapshot already taken.
#[derive(Debug)]
pub struct NewSession<'a> {
    pub skill_id: Uuid,
    pub skill_name: &'a str,
    pub teacher_id: Uuid,
    pub teacher_email: &'a str,
    pub learner_id: Uuid,
    pub learner_email: &'a str,
    pub payment_kind: PaymentKind,
    pub payment_amount: i64,
    pub preferred_date1: &'a str,
    pub preferred_time1: &'a str,
    pub preferred_date2: Option<&'a str>,
    pub preferred_time2: Option<&'a str>,
    pub preferred_date3: Option<&'a str>,
    pub preferred_time3: Option<&'a str>,
}

const SESSION_COLUMNS: &str = "id, skill_id, skill_name, teacher_id, teacher_email, learner_id, learner_email, \
     payment_kind, payment_amount, status, preferred_date1, preferred_time1, preferred_date2, \
     preferred_time2, preferred_date3, preferred_time3, scheduled_at, requested_at";

impl Session {
    pub async fn create(db: &PgPool, fields: &NewSession<'_>) -> anyhow::Result<Session> {
        let session = sqlx::query_as::<_, Session>(&format!(
            r#"
            INSERT INTO sessions (skill_id, skill_name, teacher_id, teacher_email, learner_id,
                                  learner_email, payment_kind, payment_amount, status,
                                  preferred_date1, preferred_time1, preferred_date2,
                                  preferred_time2, preferred_date3, preferred_time3)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'pending', $9, $10, $11, $12, $13, $14)
            RETURNING {SESSION_COLUMNS}
            "#
        ))
        .bind(fields.skill_id)
        .bind(fields.skill_name)
        .bind(fields.teacher_id)
        .bind(fields.teacher_email)
        .bind(fields.learner_id)
        .bind(fields.learner_email)
        .bind(fields.payment_kind)
        .bind(fields.payment_amount)
        .bind(fields.preferred_date1)
        .bind(fields.preferred_time1)
        .bind(fields.preferred_date2)
        .bind(fields.preferred_time2)
        .bind(fields.preferred_date3)
        .bind(fields.preferred_time3)
        .fetch_one(db)
        .await?;
        Ok(session)
    }

    /// Sessions the user requested as a learner.
    pub async fn list_for_learner(db: &PgPool, learner_id: Uuid) -> anyhow::Result<Vec<Session>> {
        let sessions = sqlx::query_as::<_, Session>(&format!(
            r#"
            SELECT {SESSION_COLUMNS}
            FROM sessions
            WHERE learner_id = $1
            ORDER BY requested_at DESC
            "#
        ))
        .bind(learner_id)
        .fetch_all(db)
        .await?;
        Ok(sessions)
    }

    /// Sessions where the user is the teaching side.
    pub async fn list_for_teacher(db: &PgPool, teacher_id: Uuid) -> anyhow::Result<Vec<Session>> {
        let sessions = sqlx::query_as::<_, Session>(&format!(
            r#"
            SELECT {SESSION_COLUMNS}
            FROM sessions
            WHERE teacher_id = $1
            ORDER BY requested_at DESC
            "#
        ))
        .bind(teacher_id)
        .fetch_all(db)
        .await?;
        Ok(sessions)
    }

    /// Authoritative re-read inside the decision transaction. The row
    /// lock serializes concurrent approve/reject attempts on the same
    /// session.
    pub async fn lock_for_update(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> anyhow::Result<Option<Session>> {
        let session = sqlx::query_as::<_, Session>(&format!(
            r#"SELECT {SESSION_COLUMNS} FROM sessions WHERE id = $1 FOR UPDATE"#
        ))
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;
        Ok(session)
    }

    /// Approve: terminal status plus the server-assigned schedule stamp.
    pub async fn mark_approved(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> anyhow::Result<Session> {
        let session = sqlx::query_as::<_, Session>(&format!(
            r#"
            UPDATE sessions
            SET status = 'approved', scheduled_at = now()
            WHERE id = $1
            RETURNING {SESSION_COLUMNS}
            "#
        ))
        .bind(id)
        .fetch_one(&mut **tx)
        .await?;
        Ok(session)
    }

    /// Reject: status update only, no financial effect.
    pub async fn mark_rejected(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> anyhow::Result<Session> {
        let session = sqlx::query_as::<_, Session>(&format!(
            r#"
            UPDATE sessions
            SET status = 'rejected'
            WHERE id = $1
            RETURNING {SESSION_COLUMNS}
            "#
        ))
        .bind(id)
        .fetch_one(&mut **tx)
        .await?;
        Ok(session)
    }
}

/// Move `amount` credits from the learner to the teacher. Runs inside
/// the approval transaction: if either side's profile row is missing the
/// whole transaction rolls back and no balance changes.
pub async fn transfer_credits(
    tx: &mut Transaction<'_, Postgres>,
    learner_id: Uuid,
    teacher_id: Uuid,
    amount: i64,
) -> anyhow::Result<()> {
    let debited = sqlx::query(r#"UPDATE profiles SET credits = credits - $2 WHERE user_id = $1"#)
        .bind(learner_id)
        .bind(amount)
        .execute(&mut **tx)
        .await?
        .rows_affected();
    if debited != 1 {
        anyhow::bail!("learner profile {learner_id} missing during credit transfer");
    }

    let credited = sqlx::query(r#"UPDATE profiles SET credits = credits + $2 WHERE user_id = $1"#)
        .bind(teacher_id)
        .bind(amount)
        .execute(&mut **tx)
        .await?
        .rows_affected();
    if credited != 1 {
        anyhow::bail!("teacher profile {teacher_id} missing during credit transfer");
    }

    Ok(())
}
