//! JSON rendering. Key order is the struct field order.

use crate::{ReportError, ReportModel};

/// Pretty-printed JSON of the whole model.
pub fn render_json(model: &ReportModel) -> Result<String, ReportError> {
    Ok(serde_json::to_string_pretty(model)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::SectionVerification;

    #[test]
    fn optional_sections_serialize_as_null() {
        let m = ReportModel {
            title: "t".into(),
            coalition: None,
            elections: vec![],
            verification: Some(SectionVerification {
                success: true,
                checked: vec![19],
                unchecked: vec![],
                mismatches: vec![],
            }),
        };
        let v: serde_json::Value = serde_json::from_str(&render_json(&m).unwrap()).unwrap();
        assert!(v["coalition"].is_null());
        assert_eq!(v["verification"]["checked"], serde_json::json!([19]));
        assert_eq!(v["verification"]["success"], true);
    }
}
