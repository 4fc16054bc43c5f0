use crate::error::{Error, Result};

/// Trimmed, non-empty text.
pub(crate) fn required_text<'a>(field: &'static str, label: &str, value: &'a str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(field, format!("{label} is required.")));
    }
    Ok(trimmed)
}

/// Finite and `>= 0`.
pub(crate) fn non_negative(field: &'static str, label: &str, value: f64) -> Result<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::validation(
            field,
            format!("{label} must be a positive number."),
        ));
    }
    Ok(value)
}

/// Finite and within `[min, max]`.
pub(crate) fn in_range(field: &'static str, label: &str, value: f64, min: f64, max: f64) -> Result<f64> {
    if !value.is_finite() || value < min || value > max {
        return Err(Error::validation(field, format!("Invalid {label}.")));
    }
    Ok(value)
}
