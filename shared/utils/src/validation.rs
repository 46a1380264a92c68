use crate::error::{BionexaError, BionexaResult};
use validator::{Validate, ValidationErrors};

pub fn validate_model<T: Validate>(model: &T) -> BionexaResult<()> {
    match model.validate() {
        Ok(()) => Ok(()),
        Err(errors) => {
            let (field, message) = format_validation_errors(&errors);
            Err(BionexaError::validation(field, message))
        }
    }
}

/// Flattens validator output into the first offending field and a joined message.
pub fn format_validation_errors(errors: &ValidationErrors) -> (String, String) {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by_key(|(field, _)| *field);

    let mut messages = Vec::new();
    for (field, field_errors) in &fields {
        for error in field_errors.iter() {
            let message = match (&error.message, error.code.as_ref()) {
                (Some(message), _) => message.to_string(),
                (None, "length") => format!("Length validation failed for field '{}'", field),
                (None, "range") => format!("Value out of range for field '{}'", field),
                (None, "required") => format!("Field '{}' is required", field),
                (None, code) => format!("Validation failed for field '{}': {}", field, code),
            };
            messages.push(message);
        }
    }

    let field = fields
        .first()
        .map(|(field, _)| field.to_string())
        .unwrap_or_else(|| "model".to_string());
    (field, messages.join(", "))
}

/// Rejects empty or whitespace-only required text.
pub fn require_non_blank(field: &str, value: &str) -> BionexaResult<()> {
    if value.trim().is_empty() {
        return Err(BionexaError::validation(
            field,
            format!("Field '{}' is required", field),
        ));
    }
    Ok(())
}

/// Maps an identifier to a name that is safe as a single path component.
pub fn sanitize_file_name(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect::<String>()
        .trim_start_matches('.')
        .to_string()
}

/// Maps an identifier to a single path component, one-to-one.
///
/// ASCII letters, digits and `-` pass through, as does `.` after the first
/// position. Every other byte becomes `%XX`, so distinct identifiers never
/// share a file name.
pub fn encode_path_component(identifier: &str) -> String {
    let mut encoded = String::with_capacity(identifier.len());
    for (i, byte) in identifier.bytes().enumerate() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' => encoded.push(byte as char),
            b'.' if i > 0 => encoded.push('.'),
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    encoded
}

/// Trims optional free text and treats blank input as absent.
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_non_blank() {
        assert!(require_non_blank("chemical_name", "Acetone").is_ok());
        let err = require_non_blank("chemical_name", "   ").unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert!(err.to_string().contains("chemical_name"));
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("MERCK-ACE-001-BATCH 1234"), "MERCK-ACE-001-BATCH_1234");
        assert_eq!(sanitize_file_name("../etc/passwd"), "_etc_passwd");
        assert_eq!(sanitize_file_name("report.pdf"), "report.pdf");
    }

    #[test]
    fn test_encode_path_component_is_injective() {
        assert_eq!(encode_path_component("ACE-1-B-1"), "ACE-1-B-1");
        assert_eq!(encode_path_component("LOT 7-B-1"), "LOT%207-B-1");
        assert_eq!(encode_path_component("LOT/7-B-1"), "LOT%2F7-B-1");
        assert_eq!(encode_path_component("LOT_7-B-1"), "LOT%5F7-B-1");
        assert_eq!(encode_path_component("LOT%5F7-B-1"), "LOT%255F7-B-1");
        assert_eq!(encode_path_component(".hidden"), "%2Ehidden");
        assert_eq!(encode_path_component("v1.2"), "v1.2");
    }

    #[test]
    fn test_normalize_optional() {
        assert_eq!(normalize_optional(Some("  ".to_string())), None);
        assert_eq!(normalize_optional(None), None);
        assert_eq!(
            normalize_optional(Some(" GC-MS Room 1 ".to_string())),
            Some("GC-MS Room 1".to_string())
        );
    }
}
