//! Field-level validation of submitted forms.
//!
//! Helpers record a message against the field name and return a placeholder
//! so that a form's `validate()` can check every field in one pass and then
//! call [`FieldErrors::finish`].

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FieldErrors(Vec<(&'static str, String)>);

impl FieldErrors {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push((field, message.into()));
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First message recorded for `field`.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, message)| message.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(name, message)| (*name, message.as_str()))
    }

    /// `Ok(value)` when nothing was recorded.
    pub fn finish<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

pub fn required_text(
    errors: &mut FieldErrors,
    field: &'static str,
    label: &str,
    value: &str,
) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.add(field, format!("{label} is mandatory"));
    }
    trimmed.to_string()
}

#[must_use]
pub fn optional_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

pub fn optional_f64(
    errors: &mut FieldErrors,
    field: &'static str,
    label: &str,
    value: &str,
) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.parse::<f64>() {
        Ok(number) if number.is_finite() => Some(number),
        _ => {
            errors.add(field, format!("{label} must be a number"));
            None
        }
    }
}

pub fn required_f64(
    errors: &mut FieldErrors,
    field: &'static str,
    label: &str,
    value: &str,
) -> f64 {
    if value.trim().is_empty() {
        errors.add(field, format!("{label} is mandatory"));
        return 0.0;
    }
    optional_f64(errors, field, label, value).unwrap_or_default()
}

pub fn required_i32(
    errors: &mut FieldErrors,
    field: &'static str,
    label: &str,
    value: &str,
) -> i32 {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.add(field, format!("{label} is mandatory"));
        return 0;
    }
    trimmed.parse::<i32>().unwrap_or_else(|_| {
        errors.add(field, format!("{label} must be an integer"));
        0
    })
}

/// Renders an optional number back into a form value.
#[must_use]
pub fn number_value(value: Option<f64>) -> String {
    value.map(|n| n.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text() {
        let mut errors = FieldErrors::new();
        assert_eq!(required_text(&mut errors, "account", "Account", "  acc  "), "acc");
        assert!(errors.is_empty());

        required_text(&mut errors, "account", "Account", "   ");
        assert_eq!(errors.get("account"), Some("Account is mandatory"));
    }

    #[test]
    fn test_numbers() {
        let mut errors = FieldErrors::new();
        assert_eq!(required_f64(&mut errors, "term", "Term", "10.5"), 10.5);
        assert_eq!(optional_f64(&mut errors, "bid", "Bid", ""), None);
        assert_eq!(required_i32(&mut errors, "curveId", "Curve id", "7"), 7);
        assert!(errors.is_empty());

        required_f64(&mut errors, "term", "Term", "abc");
        required_f64(&mut errors, "value", "Value", "NaN");
        required_i32(&mut errors, "curveId", "Curve id", "1.5");
        required_i32(&mut errors, "orderNumber", "Order number", "");

        assert_eq!(errors.get("term"), Some("Term must be a number"));
        assert_eq!(errors.get("value"), Some("Value must be a number"));
        assert_eq!(errors.get("curveId"), Some("Curve id must be an integer"));
        assert_eq!(errors.get("orderNumber"), Some("Order number is mandatory"));
    }

    #[test]
    fn test_finish() {
        assert_eq!(FieldErrors::new().finish(5), Ok(5));

        let mut errors = FieldErrors::new();
        errors.add("name", "Name is mandatory");
        let err = errors.finish(5).unwrap_err();
        assert_eq!(err.iter().count(), 1);
    }
}
