use serde::Deserialize;

/// Profile edit payload. Only the non-financial fields are present;
/// `deny_unknown_fields` makes a payload naming `credits` (or anything
/// else) a deserialization error, so the balance cannot be set through
/// this endpoint. Credits move only through session approval. Omitted
/// optional fields keep their stored values.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateProfileRequest {
    pub name: String,
    pub rollno: Option<String>,
    pub department: Option<String>,
    pub course: Option<String>,
    pub year: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_non_financial_fields() {
        let json = r#"{"name":"Ada","rollno":"42","department":"CS","course":"BTech","year":"3"}"#;
        let req: UpdateProfileRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.name, "Ada");
        assert_eq!(req.rollno.as_deref(), Some("42"));
    }

    #[test]
    fn rejects_credits_field() {
        let json = r#"{"name":"Ada","credits":1000000}"#;
        let err = serde_json::from_str::<UpdateProfileRequest>(json).unwrap_err();
        assert!(err.to_string().contains("credits"));
    }

    #[test]
    fn omitted_fields_stay_unset() {
        let json = r#"{"name":"Ada"}"#;
        let req: UpdateProfileRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.rollno, None);
        assert_eq!(req.department, None);
        assert_eq!(req.year, None);
    }
}
