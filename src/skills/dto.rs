use serde::Deserialize;

use crate::skills::repo::{PaymentKind, SessionMode};

/// Request body for creating a skill listing.
#[derive(Debug, Deserialize)]
pub struct CreateSkillRequest {
    pub name: String,
    pub description: String,
    pub payment_kind: PaymentKind,
    #[serde(default)]
    pub payment_amount: i64,
    pub session_mode: SessionMode,
}

/// Browse filters, all optional. `q` matches name, description or
/// teacher email, case-insensitively.
#[derive(Debug, Default, Deserialize)]
pub struct SkillFilterQuery {
    pub payment: Option<PaymentKind>,
    pub mode: Option<SessionMode>,
    pub q: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_parses_enums() {
        let json = r#"{"name":"Rust","description":"Ownership","payment_kind":"credits","payment_amount":30,"session_mode":"online"}"#;
        let req: CreateSkillRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.payment_kind, PaymentKind::Credits);
        assert_eq!(req.session_mode, SessionMode::Online);
        assert_eq!(req.payment_amount, 30);
    }

    #[test]
    fn favor_listing_defaults_amount_to_zero() {
        let json = r#"{"name":"Guitar","description":"Basics","payment_kind":"favor","session_mode":"in-person"}"#;
        let req: CreateSkillRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.payment_kind, PaymentKind::Favor);
        assert_eq!(req.session_mode, SessionMode::InPerson);
        assert_eq!(req.payment_amount, 0);
    }

    #[test]
    fn unknown_payment_kind_is_rejected() {
        let json = r#"{"name":"X","description":"Y","payment_kind":"gold","session_mode":"online"}"#;
        assert!(serde_json::from_str::<CreateSkillRequest>(json).is_err());
    }
}
