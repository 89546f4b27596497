//! Session-wide state handed explicitly to every loader and form.
//!
//! Any component may set the user, an error or a message; nobody reads
//! another component's local state. The error and message slots are
//! transient: the page that displays them takes them out.

use crate::domain::auth::AuthenticatedUser;
use crate::domain::company::Company;

#[derive(Clone, Debug, Default)]
pub struct SharedContext {
    user: Option<AuthenticatedUser>,
    company: Company,
    error: Option<String>,
    message: Option<String>,
}

impl SharedContext {
    pub fn new(company: Company) -> Self {
        Self {
            company,
            ..Self::default()
        }
    }

    pub fn with_user(mut self, user: Option<AuthenticatedUser>) -> Self {
        self.user = user;
        self
    }

    pub fn user(&self) -> Option<&AuthenticatedUser> {
        self.user.as_ref()
    }

    pub fn set_user(&mut self, user: Option<AuthenticatedUser>) {
        self.user = user;
    }

    pub fn company(&self) -> &Company {
        &self.company
    }

    pub fn set_company(&mut self, company: Company) {
        self.company = company;
    }

    /// Stores an error for display. A later error replaces an earlier one.
    pub fn set_error(&mut self, error: impl Into<String>) {
        let error = error.into();
        log::debug!("context error set: {error}");
        self.error = Some(error);
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn take_error(&mut self) -> Option<String> {
        self.error.take()
    }

    pub fn take_message(&mut self) -> Option<String> {
        self.message.take()
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }
}
