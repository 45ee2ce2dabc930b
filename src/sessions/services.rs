use sqlx::PgPool;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::profiles::repo::Profile;
use crate::sessions::dto::RequestSessionBody;
use crate::sessions::repo::{self, NewSession, Session, SessionStatus};
use crate::skills::repo::{PaymentKind, Skill};

/// The only legal transitions are pending -> approved and
/// pending -> rejected. Everything else, including re-deciding a
/// resolved session, is refused, which makes the credit transfer
/// un-repeatable.
pub fn transition_allowed(current: SessionStatus, requested: SessionStatus) -> bool {
    current == SessionStatus::Pending
        && matches!(
            requested,
            SessionStatus::Approved | SessionStatus::Rejected
        )
}

/// Funds check for the request-time precondition. Favor listings never
/// touch the balance.
pub fn has_sufficient_credits(kind: PaymentKind, amount: i64, balance: i64) -> bool {
    match kind {
        PaymentKind::Credits => balance >= amount,
        PaymentKind::Favor => true,
    }
}

/// Slot one is mandatory; slots two and three may be absent but must be
/// complete date/time pairs when present.
pub fn validate_slots(body: &RequestSessionBody) -> Result<(), ApiError> {
    if body.preferred_date1.trim().is_empty() || body.preferred_time1.trim().is_empty() {
        return Err(ApiError::validation(
            "The first preferred date and time are required",
        ));
    }
    for (date, time, n) in [
        (&body.preferred_date2, &body.preferred_time2, 2),
        (&body.preferred_date3, &body.preferred_time3, 3),
    ] {
        let date_set = date.as_deref().is_some_and(|d| !d.trim().is_empty());
        let time_set = time.as_deref().is_some_and(|t| !t.trim().is_empty());
        if date_set != time_set {
            return Err(ApiError::Validation(format!(
                "Preferred slot {n} needs both a date and a time"
            )));
        }
    }
    Ok(())
}

fn slot(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Create a session request against a listing, snapshotting the
/// listing's name and payment terms. The funds check runs against the
/// learner's current stored balance; approval is where the transfer
/// actually happens.
#[instrument(skip(db, learner, body), fields(learner_id = %learner.user_id, skill_id = %body.skill_id))]
pub async fn request_session(
    db: &PgPool,
    learner: &Profile,
    body: &RequestSessionBody,
) -> Result<Session, ApiError> {
    validate_slots(body)?;

    let skill = Skill::find(db, body.skill_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Skill not found"))?;

    if skill.teacher_id == learner.user_id {
        return Err(ApiError::validation(
            "You cannot request a session on your own skill",
        ));
    }

    if !has_sufficient_credits(skill.payment_kind, skill.payment_amount, learner.credits) {
        warn!(
            balance = learner.credits,
            amount = skill.payment_amount,
            "insufficient credits for request"
        );
        return Err(ApiError::InsufficientCredits);
    }

    let session = Session::create(
        db,
        &NewSession {
            skill_id: skill.id,
            skill_name: &skill.name,
            teacher_id: skill.teacher_id,
            teacher_email: &skill.teacher_email,
            learner_id: learner.user_id,
            learner_email: &learner.email,
            payment_kind: skill.payment_kind,
            payment_amount: skill.payment_amount,
            preferred_date1: body.preferred_date1.trim(),
            preferred_time1: body.preferred_time1.trim(),
            preferred_date2: slot(&body.preferred_date2),
            preferred_time2: slot(&body.preferred_time2),
            preferred_date3: slot(&body.preferred_date3),
            preferred_time3: slot(&body.preferred_time3),
        },
    )
    .await?;

    info!(session_id = %session.id, "session requested");
    Ok(session)
}

/// Approve or reject a pending session as its teacher. The session row
/// is re-read under a row lock inside the transaction, so the payment
/// amount is authoritative and a concurrent second decision waits and
/// then fails the pending-status check. On approval of a credits
/// session, the status change and both balance updates commit together
/// or not at all.
///
/// The learner's balance is deliberately not re-validated here; it may
/// have dropped since the request, in which case it goes negative.
#[instrument(skip(db))]
pub async fn decide_session(
    db: &PgPool,
    session_id: Uuid,
    acting_user_id: Uuid,
    target: SessionStatus,
) -> Result<Session, ApiError> {
    let mut tx = db.begin().await?;

    let session = Session::lock_for_update(&mut tx, session_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Session not found"))?;

    if session.teacher_id != acting_user_id {
        warn!(
            session_id = %session_id,
            caller = %acting_user_id,
            teacher = %session.teacher_id,
            "decision denied"
        );
        return Err(ApiError::forbidden(
            "Only the session's teacher can approve or reject it",
        ));
    }

    if !transition_allowed(session.status, target) {
        return Err(ApiError::InvalidTransition {
            from: session.status.to_string(),
            to: target.to_string(),
        });
    }

    let updated = match target {
        SessionStatus::Approved => {
            if session.payment_kind == PaymentKind::Credits && session.payment_amount > 0 {
                repo::transfer_credits(
                    &mut tx,
                    session.learner_id,
                    session.teacher_id,
                    session.payment_amount,
                )
                .await?;
            }
            Session::mark_approved(&mut tx, session_id).await?
        }
        SessionStatus::Rejected => Session::mark_rejected(&mut tx, session_id).await?,
        // Unreachable behind transition_allowed.
        SessionStatus::Pending => unreachable!("pending is never a transition target"),
    };

    tx.commit().await?;

    info!(
        session_id = %session_id,
        status = %updated.status,
        amount = updated.payment_amount,
        "session decided"
    );
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_pending_can_transition() {
        use SessionStatus::*;
        assert!(transition_allowed(Pending, Approved));
        assert!(transition_allowed(Pending, Rejected));
        assert!(!transition_allowed(Pending, Pending));
        assert!(!transition_allowed(Approved, Approved));
        assert!(!transition_allowed(Approved, Rejected));
        assert!(!transition_allowed(Rejected, Approved));
        assert!(!transition_allowed(Rejected, Pending));
    }

    #[test]
    fn funds_check_only_applies_to_credits() {
        assert!(has_sufficient_credits(PaymentKind::Credits, 30, 100));
        assert!(has_sufficient_credits(PaymentKind::Credits, 100, 100));
        assert!(!has_sufficient_credits(PaymentKind::Credits, 101, 100));
        // Favor exchanges ignore the balance entirely.
        assert!(has_sufficient_credits(PaymentKind::Favor, 0, 0));
        assert!(has_sufficient_credits(PaymentKind::Favor, 50, 0));
    }

    fn body() -> RequestSessionBody {
        RequestSessionBody {
            skill_id: Uuid::new_v4(),
            preferred_date1: "2026-09-01".into(),
            preferred_time1: "14:00".into(),
            preferred_date2: None,
            preferred_time2: None,
            preferred_date3: None,
            preferred_time3: None,
        }
    }

    #[test]
    fn first_slot_is_required() {
        let mut b = body();
        b.preferred_date1 = "  ".into();
        assert!(validate_slots(&b).is_err());

        let mut b = body();
        b.preferred_time1 = String::new();
        assert!(validate_slots(&b).is_err());

        assert!(validate_slots(&body()).is_ok());
    }

    #[test]
    fn later_slots_must_be_complete_pairs() {
        let mut b = body();
        b.preferred_date2 = Some("2026-09-02".into());
        assert!(validate_slots(&b).is_err());

        b.preferred_time2 = Some("10:00".into());
        assert!(validate_slots(&b).is_ok());

        b.preferred_time3 = Some("11:00".into());
        assert!(validate_slots(&b).is_err());

        b.preferred_date3 = Some("2026-09-03".into());
        assert!(validate_slots(&b).is_ok());
    }

    #[test]
    fn blank_optional_slots_count_as_absent() {
        let mut b = body();
        b.preferred_date2 = Some("   ".into());
        b.preferred_time2 = Some("".into());
        assert!(validate_slots(&b).is_ok());
        assert_eq!(slot(&b.preferred_date2), None);
    }
}
