//! Contact form model and validation.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

pub const NAME_MAX: usize = 100;
pub const SUBJECT_MAX: usize = 150;
pub const MESSAGE_MIN: usize = 10;
pub const MESSAGE_MAX: usize = 5000;

fn is_valid_email(email: &str) -> bool {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok())
        .as_ref()
        .map_or(false, |re| re.is_match(email))
}

/// A contact form as submitted by a visitor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub message: String,
}

/// Form field names, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    Email,
    Subject,
    Message,
}

/// A single validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: Field,
    pub message: String,
}

impl FieldError {
    fn new(field: Field, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl ContactForm {
    /// Copy with every field trimmed and an empty subject dropped.
    pub fn normalized(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            subject: self
                .subject
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            message: self.message.trim().to_string(),
        }
    }

    /// Check every field, reporting all failures in field order.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let form = self.normalized();
        let mut errors = Vec::new();

        if form.name.is_empty() {
            errors.push(FieldError::new(Field::Name, "Please enter your name."));
        } else if form.name.chars().count() > NAME_MAX {
            errors.push(FieldError::new(
                Field::Name,
                format!("Name must be at most {} characters.", NAME_MAX),
            ));
        }

        if form.email.is_empty() {
            errors.push(FieldError::new(Field::Email, "Please enter your email address."));
        } else if !is_valid_email(&form.email) {
            errors.push(FieldError::new(Field::Email, "Please enter a valid email address."));
        }

        if let Some(subject) = &form.subject {
            if subject.chars().count() > SUBJECT_MAX {
                errors.push(FieldError::new(
                    Field::Subject,
                    format!("Subject must be at most {} characters.", SUBJECT_MAX),
                ));
            }
        }

        let message_len = form.message.chars().count();
        if message_len == 0 {
            errors.push(FieldError::new(Field::Message, "Please enter a message."));
        } else if message_len < MESSAGE_MIN {
            errors.push(FieldError::new(
                Field::Message,
                format!("Message must be at least {} characters.", MESSAGE_MIN),
            ));
        } else if message_len > MESSAGE_MAX {
            errors.push(FieldError::new(
                Field::Message,
                format!("Message must be at most {} characters.", MESSAGE_MAX),
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> ContactForm {
        ContactForm {
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            subject: Some("Engines".to_string()),
            message: "I would like to talk about engines.".to_string(),
        }
    }

    fn failing_fields(form: &ContactForm) -> Vec<Field> {
        form.validate()
            .unwrap_err()
            .into_iter()
            .map(|e| e.field)
            .collect()
    }

    #[test]
    fn test_valid_form() {
        assert!(valid().validate().is_ok());

        let mut form = valid();
        form.subject = None;
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_all_errors_reported_in_order() {
        let form = ContactForm {
            name: "   ".to_string(),
            email: "not-an-email".to_string(),
            subject: Some("x".repeat(SUBJECT_MAX + 1)),
            message: "short".to_string(),
        };
        assert_eq!(
            failing_fields(&form),
            vec![Field::Name, Field::Email, Field::Subject, Field::Message]
        );
    }

    #[test]
    fn test_email_rules() {
        for bad in ["", "a@b", "a b@c.d", "@c.d", "a@@c.d"] {
            let mut form = valid();
            form.email = bad.to_string();
            assert_eq!(failing_fields(&form), vec![Field::Email], "email {:?}", bad);
        }
        let mut form = valid();
        form.email = "  first.last+tag@sub.example.org ".to_string();
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_message_length_counts_trimmed_chars() {
        let mut form = valid();
        form.message = "   123456789   ".to_string();
        assert_eq!(failing_fields(&form), vec![Field::Message]);

        form.message = "ééééééééééé".to_string();
        assert!(form.validate().is_ok());

        form.message = "x".repeat(MESSAGE_MAX + 1);
        assert_eq!(failing_fields(&form), vec![Field::Message]);
    }

    #[test]
    fn test_normalized_drops_blank_subject() {
        let mut form = valid();
        form.subject = Some("   ".to_string());
        form.name = " Ada ".to_string();
        let n = form.normalized();
        assert_eq!(n.subject, None);
        assert_eq!(n.name, "Ada");
    }
}
