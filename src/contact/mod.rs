//! Contact form: validation, submission, and storage of received forms.

pub mod client;
pub mod form;
pub mod store;

pub use client::{ContactClient, SubmissionResponse, SubmitOutcome};
pub use form::{ContactForm, Field, FieldError};
pub use store::{StoredSubmission, SubmissionStore};
