//! Contact form handlers.
//!
//! Submissions are validated, logged, and acknowledged. There is no mail
//! integration; enquiries are read from the structured logs.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::IntoResponse,
};
use ekagra_core::Email;
use serde::Deserialize;
use tracing::{info, instrument};

use crate::filters;
use crate::middleware::CspNonce;
use crate::state::AppState;

/// Contact form fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
}

/// Contact page template.
#[derive(Template, WebTemplate)]
#[template(path = "contact.html")]
pub struct ContactTemplate {
    pub form: ContactForm,
    pub errors: Vec<(&'static str, String)>,
    pub sent: bool,
    pub nonce: String,
    pub base_url: String,
}

/// Display the contact form.
#[instrument(skip(state, nonce))]
pub async fn form(State(state): State<AppState>, CspNonce(nonce): CspNonce) -> impl IntoResponse {
    ContactTemplate {
        form: ContactForm::default(),
        errors: Vec::new(),
        sent: false,
        nonce,
        base_url: state.config().base_url.clone(),
    }
}

/// Handle a contact form submission.
#[instrument(skip(state, nonce, form))]
pub async fn submit(
    State(state): State<AppState>,
    CspNonce(nonce): CspNonce,
    Form(form): Form<ContactForm>,
) -> impl IntoResponse {
    let errors = validate(&form);
    let sent = errors.is_empty();

    if sent {
        info!(
            name = %form.name.trim(),
            email = %form.email.trim(),
            message_len = form.message.trim().len(),
            "contact enquiry received"
        );
    }

    ContactTemplate {
        form: if sent { ContactForm::default() } else { form },
        errors,
        sent,
        nonce,
        base_url: state.config().base_url.clone(),
    }
}

fn validate(form: &ContactForm) -> Vec<(&'static str, String)> {
    let mut errors = Vec::new();
    if form.name.trim().is_empty() {
        errors.push(("name", "Please enter your name.".to_string()));
    }
    let email = form.email.trim();
    if email.is_empty() || Email::parse(email).is_err() {
        errors.push(("email", "Please enter a valid email address.".to_string()));
    }
    if form.message.trim().is_empty() {
        errors.push(("message", "Please enter a message.".to_string()));
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_submission_has_no_errors() {
        let form = ContactForm {
            name: "Priya".to_string(),
            email: "priya@example.com".to_string(),
            message: "Do you run the cohort twice a year?".to_string(),
        };
        assert!(validate(&form).is_empty());
    }

    #[test]
    fn test_blank_form_reports_every_field() {
        let errors = validate(&ContactForm::default());
        assert_eq!(errors.len(), 3);
    }
}
