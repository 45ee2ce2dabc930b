use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::profiles::dto::UpdateProfileRequest;

/// Every new account starts with this grant.
pub const STARTING_CREDITS: i64 = 100;

/// Profile record, keyed by the owning user's id. `credits` is mutated
/// only by the session-approval transfer in the sessions repo.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub rollno: String,
    pub department: String,
    pub course: String,
    pub year: String,
    pub credits: i64,
    pub created_at: OffsetDateTime,
}

/// Fields for a profile created at registration.
#[derive(Debug)]
pub struct NewProfile<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub rollno: &'a str,
    pub department: &'a str,
    pub course: &'a str,
    pub year: &'a str,
}

impl Profile {
    /// Create a profile with the fixed starting credit grant. Runs in the
    /// registration transaction alongside the user insert.
    pub async fn create(
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
        fields: &NewProfile<'_>,
    ) -> anyhow::Result<Profile> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (user_id, name, email, rollno, department, course, year, credits)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING user_id, name, email, rollno, department, course, year, credits, created_at
            "#,
        )
        .bind(user_id)
        .bind(fields.name)
        .bind(fields.email)
        .bind(fields.rollno)
        .bind(fields.department)
        .bind(fields.course)
        .bind(fields.year)
        .bind(STARTING_CREDITS)
        .fetch_one(&mut **tx)
        .await?;
        Ok(profile)
    }

    /// Point read. Absence is not an error; callers treat a missing
    /// profile as onboarding incomplete.
    pub async fn find(db: &PgPool, user_id: Uuid) -> anyhow::Result<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            SELECT user_id, name, email, rollno, department, course, year, credits, created_at
            FROM profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(profile)
    }

    /// Merge the non-financial fields; omitted fields keep their stored
    /// values. The credit balance is deliberately absent from the SET
    /// list.
    pub async fn update(
        db: &PgPool,
        user_id: Uuid,
        fields: &UpdateProfileRequest,
    ) -> anyhow::Result<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            UPDATE profiles
            SET name = $2,
                rollno = COALESCE($3, rollno),
                department = COALESCE($4, department),
                course = COALESCE($5, course),
                year = COALESCE($6, year)
            WHERE user_id = $1
            RETURNING user_id, name, email, rollno, department, course, year, credits, created_at
            "#,
        )
        .bind(user_id)
        .bind(&fields.name)
        .bind(fields.rollno.as_deref())
        .bind(fields.department.as_deref())
        .bind(fields.course.as_deref())
        .bind(fields.year.as_deref())
        .fetch_optional(db)
        .await?;
        Ok(profile)
    }
}

#[cfg(test)]
mod db_tests {
    use super::*;
    use crate::auth::repo::User;

    #[sqlx::test]
    async fn update_merges_only_provided_fields(pool: PgPool) {
        let mut tx = pool.begin().await.expect("begin");
        let user = User::create(&mut tx, "ada@example.com", "hash")
            .await
            .expect("user");
        Profile::create(
            &mut tx,
            user.id,
            &NewProfile {
                name: "Ada",
                email: "ada@example.com",
                rollno: "42",
                department: "CS",
                course: "BTech",
                year: "2",
            },
        )
        .await
        .expect("profile");
        tx.commit().await.expect("commit");

        let req = UpdateProfileRequest {
            name: "Ada L".into(),
            rollno: None,
            department: Some("Math".into()),
            course: None,
            year: None,
        };
        let updated = Profile::update(&pool, user.id, &req)
            .await
            .expect("update")
            .expect("profile exists");

        assert_eq!(updated.name, "Ada L");
        assert_eq!(updated.rollno, "42");
        assert_eq!(updated.department, "Math");
        assert_eq!(updated.course, "BTech");
        assert_eq!(updated.year, "2");
        assert_eq!(updated.credits, STARTING_CREDITS);
    }
}
