use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use crate::error::{AppError, FieldViolation};

/// Run a DTO's declared validations and surface every violation at once.
pub fn check<T: Validate>(payload: &T) -> Result<(), AppError> {
    payload
        .validate()
        .map_err(|errors| AppError::ValidationError(flatten(&errors, "")))
}

/// Flatten nested validator output into dotted field paths
/// (`travelDetails.numberOfTravelers`, `additionalServices[1].price`).
pub fn flatten(errors: &ValidationErrors, prefix: &str) -> Vec<FieldViolation> {
    let mut out = Vec::new();
    collect(errors, prefix, &mut out);
    out
}

fn collect(errors: &ValidationErrors, prefix: &str, out: &mut Vec<FieldViolation>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    let message = error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| error.code.to_string());
                    out.push(FieldViolation::new(path.clone(), message));
                }
            }
            ValidationErrorsKind::Struct(nested) => collect(nested, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect(nested, &format!("{path}[{index}]"), out);
                }
            }
        }
    }
}
