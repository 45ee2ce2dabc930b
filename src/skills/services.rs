use crate::error::ApiError;
use crate::skills::dto::CreateSkillRequest;
use crate::skills::repo::{PaymentKind, SessionMode, Skill};

/// Normalized listing fields after validation.
#[derive(Debug, PartialEq)]
pub struct ValidatedSkill {
    pub name: String,
    pub description: String,
    pub payment_kind: PaymentKind,
    pub payment_amount: i64,
    pub session_mode: SessionMode,
}

/// Validate a create request. A `credits` listing needs a strictly
/// positive amount; a `favor` listing stores amount 0 whatever was sent.
pub fn validate_new_skill(req: &CreateSkillRequest) -> Result<ValidatedSkill, ApiError> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(ApiError::validation("Skill name is required"));
    }
    let description = req.description.trim();
    if description.is_empty() {
        return Err(ApiError::validation("Skill description is required"));
    }

    let payment_amount = match req.payment_kind {
        PaymentKind::Credits => {
            if req.payment_amount <= 0 {
                return Err(ApiError::validation("Payment amount must be positive"));
            }
            req.payment_amount
        }
        PaymentKind::Favor => 0,
    };

    Ok(ValidatedSkill {
        name: name.to_string(),
        description: description.to_string(),
        payment_kind: req.payment_kind,
        payment_amount,
        session_mode: req.session_mode,
    })
}

/// Pure predicate filter over an already-fetched listing set. `None`
/// means "no constraint".
pub fn filter_skills(
    skills: Vec<Skill>,
    payment: Option<PaymentKind>,
    mode: Option<SessionMode>,
) -> Vec<Skill> {
    skills
        .into_iter()
        .filter(|s| payment.map_or(true, |p| s.payment_kind == p))
        .filter(|s| mode.map_or(true, |m| s.session_mode == m))
        .collect()
}

/// Free-text search over name, description and teacher email.
pub fn search_skills(skills: Vec<Skill>, term: &str) -> Vec<Skill> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return skills;
    }
    skills
        .into_iter()
        .filter(|s| {
            s.name.to_lowercase().contains(&term)
                || s.description.to_lowercase().contains(&term)
                || s.teacher_email.to_lowercase().contains(&term)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn skill(name: &str, kind: PaymentKind, amount: i64, mode: SessionMode) -> Skill {
        Skill {
            id: Uuid::new_v4(),
            name: name.into(),
            description: format!("{name} lessons"),
            payment_kind: kind,
            payment_amount: amount,
            session_mode: mode,
            teacher_id: Uuid::new_v4(),
            teacher_email: format!("{}@example.com", name.to_lowercase()),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    fn sample() -> Vec<Skill> {
        vec![
            skill("Rust", PaymentKind::Credits, 30, SessionMode::Online),
            skill("Guitar", PaymentKind::Favor, 0, SessionMode::InPerson),
            skill("Chess", PaymentKind::Credits, 10, SessionMode::InPerson),
        ]
    }

    #[test]
    fn no_filters_is_identity() {
        let skills = sample();
        let names: Vec<_> = skills.iter().map(|s| s.name.clone()).collect();
        let filtered = filter_skills(skills, None, None);
        let filtered_names: Vec<_> = filtered.iter().map(|s| s.name.clone()).collect();
        assert_eq!(names, filtered_names);
    }

    #[test]
    fn filtering_twice_equals_once() {
        let once = filter_skills(sample(), Some(PaymentKind::Credits), None);
        let names_once: Vec<_> = once.iter().map(|s| s.name.clone()).collect();
        let twice = filter_skills(once, Some(PaymentKind::Credits), None);
        let names_twice: Vec<_> = twice.iter().map(|s| s.name.clone()).collect();
        assert_eq!(names_once, names_twice);
    }

    #[test]
    fn combined_filters_intersect() {
        let filtered = filter_skills(
            sample(),
            Some(PaymentKind::Credits),
            Some(SessionMode::InPerson),
        );
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "Chess");
    }

    #[test]
    fn search_matches_name_description_and_email() {
        let by_name = search_skills(sample(), "rust");
        assert_eq!(by_name.len(), 1);

        let by_desc = search_skills(sample(), "lessons");
        assert_eq!(by_desc.len(), 3);

        let by_email = search_skills(sample(), "guitar@example.com");
        assert_eq!(by_email.len(), 1);

        let blank = search_skills(sample(), "   ");
        assert_eq!(blank.len(), 3);
    }

    fn create_req(kind: PaymentKind, amount: i64) -> CreateSkillRequest {
        CreateSkillRequest {
            name: "Rust".into(),
            description: "Ownership and borrowing".into(),
            payment_kind: kind,
            payment_amount: amount,
            session_mode: SessionMode::Online,
        }
    }

    #[test]
    fn validate_accepts_positive_credit_amount() {
        let v = validate_new_skill(&create_req(PaymentKind::Credits, 30)).unwrap();
        assert_eq!(v.payment_amount, 30);
    }

    #[test]
    fn validate_rejects_zero_credit_amount() {
        assert!(validate_new_skill(&create_req(PaymentKind::Credits, 0)).is_err());
        assert!(validate_new_skill(&create_req(PaymentKind::Credits, -5)).is_err());
    }

    #[test]
    fn validate_zeroes_favor_amount() {
        let v = validate_new_skill(&create_req(PaymentKind::Favor, 99)).unwrap();
        assert_eq!(v.payment_amount, 0);
    }

    #[test]
    fn validate_rejects_blank_name_and_description() {
        let mut req = create_req(PaymentKind::Favor, 0);
        req.name = "   ".into();
        assert!(validate_new_skill(&req).is_err());

        let mut req = create_req(PaymentKind::Favor, 0);
        req.description = String::new();
        assert!(validate_new_skill(&req).is_err());
    }

    #[test]
    fn validate_trims_fields() {
        let mut req = create_req(PaymentKind::Favor, 0);
        req.name = "  Rust  ".into();
        let v = validate_new_skill(&req).unwrap();
        assert_eq!(v.name, "Rust");
    }
}
