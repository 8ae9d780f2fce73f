use anyhow::Result;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use super::{Page, Pages};
use crate::helpers::url_for;

/// Fields of the contact form
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl ContactForm {
    /// Problems with the submission, empty when it can be accepted
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (value, label) in [
            (&self.name, "Full name"),
            (&self.email, "Email address"),
            (&self.subject, "Subject"),
            (&self.message, "Message"),
        ] {
            if value.trim().is_empty() {
                errors.push(format!("{} is required.", label));
            }
        }

        if !self.email.trim().is_empty() && !is_email(self.email.trim()) {
            errors.push("Please enter a valid email address.".to_string());
        }

        errors
    }
}

/// Loose shape check: `local@domain.tld` without whitespace
fn is_email(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    match s.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        }
        None => false,
    }
}

impl Pages {
    /// Contact page with an empty form
    pub async fn contact(&self) -> Result<Page> {
        self.render_contact(&ContactForm::default(), &[], false, StatusCode::OK)
    }

    /// Handle a form submission
    ///
    /// Nothing is delivered anywhere; an accepted message is logged and the
    /// form is shown again, cleared, with a confirmation.
    pub async fn submit_contact(&self, form: ContactForm) -> Result<Page> {
        let errors = form.validate();
        if !errors.is_empty() {
            tracing::debug!(errors = errors.len(), "Contact form rejected");
            return self.render_contact(&form, &errors, false, StatusCode::UNPROCESSABLE_ENTITY);
        }

        tracing::info!(
            name = %form.name.trim(),
            email = %form.email.trim(),
            subject = %form.subject.trim(),
            "Contact message received"
        );
        self.render_contact(&ContactForm::default(), &[], true, StatusCode::OK)
    }

    fn render_contact(
        &self,
        form: &ContactForm,
        errors: &[String],
        sent: bool,
        status: StatusCode,
    ) -> Result<Page> {
        let path = url_for(&self.config, "/contact");
        let posts = self.observe_posts();
        let categories = self.observe_categories();
        let mut context = self.context_with_footer(&path, "", &posts, &categories);

        context.insert("form", form);
        context.insert("errors", errors);
        context.insert("sent", &sent);
        self.render("contact.html", &context, status)
    }
}
