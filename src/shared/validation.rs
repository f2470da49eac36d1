//! Validation Utilities

use once_cell::sync::Lazy;
use regex::Regex;
use validator::ValidationErrors;

use super::error::{AppError, FieldError};

/// Phone numbers: optional leading `+`, digits, spaces and dashes, 7-20 characters.
pub static PHONE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9 \-]{7,20}$").expect("valid phone regex"));

/// Convert validation errors to AppError, keeping one entry per failed rule.
pub fn validation_error(errors: ValidationErrors) -> AppError {
    let mut field_errors: Vec<FieldError> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| FieldError {
                field: field.to_string(),
                message: e
                    .message
                    .clone()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Valor inválido ({})", e.code)),
            })
        })
        .collect();

    // HashMap iteration order is unstable; keep responses deterministic
    field_errors.sort_by(|a, b| a.field.cmp(&b.field).then(a.message.cmp(&b.message)));

    AppError::Validation(field_errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 1, message = "El nombre es requerido"))]
        name: String,
        #[validate(regex(path = *PHONE_REGEX, message = "Teléfono inválido"))]
        phone: Option<String>,
    }

    #[test]
    fn test_collects_field_messages() {
        let sample = Sample {
            name: String::new(),
            phone: Some("abc".into()),
        };
        let err = validation_error(sample.validate().unwrap_err());
        match err {
            AppError::Validation(fields) => {
                assert_eq!(fields.len(), 2);
                assert_eq!(fields[0].field, "name");
                assert_eq!(fields[0].message, "El nombre es requerido");
                assert_eq!(fields[1].field, "phone");
                assert_eq!(fields[1].message, "Teléfono inválido");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_phone_regex_accepts_common_formats() {
        assert!(PHONE_REGEX.is_match("+34 600-123-456"));
        assert!(PHONE_REGEX.is_match("5551234"));
        assert!(!PHONE_REGEX.is_match("12"));
        assert!(!PHONE_REGEX.is_match("call me"));
    }
}
