//! Administrator allow-list.
//!
//! A user is an administrator when their id or their email is listed in the
//! configuration. There are no roles beyond that.

use crate::config::AdminConfig;

#[derive(Debug, Clone, Default)]
pub struct AdminAllowList {
    user_ids: Vec<String>,
    /// Stored lowercased.
    emails: Vec<String>,
}

impl AdminAllowList {
    pub fn new<I, E>(user_ids: I, emails: E) -> Self
    where
        I: IntoIterator<Item = String>,
        E: IntoIterator<Item = String>,
    {
        Self {
            user_ids: user_ids
                .into_iter()
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty())
                .collect(),
            emails: emails
                .into_iter()
                .map(|email| email.trim().to_lowercase())
                .filter(|email| !email.is_empty())
                .collect(),
        }
    }

    pub fn from_config(config: &AdminConfig) -> Self {
        Self::new(config.user_ids.clone(), config.emails.clone())
    }

    /// Add an email to the list, e.g. the built-in demo administrator.
    pub fn with_email(mut self, email: &str) -> Self {
        let email = email.trim().to_lowercase();
        if !email.is_empty() && !self.emails.contains(&email) {
            self.emails.push(email);
        }
        self
    }

    pub fn is_admin_user_id(&self, user_id: Option<&str>) -> bool {
        user_id.is_some_and(|id| self.user_ids.iter().any(|admin| admin == id))
    }

    /// Case-insensitive.
    pub fn is_admin_email(&self, email: Option<&str>) -> bool {
        email.is_some_and(|email| {
            let email = email.trim().to_lowercase();
            self.emails.iter().any(|admin| *admin == email)
        })
    }

    pub fn is_admin(&self, user_id: Option<&str>, email: Option<&str>) -> bool {
        self.is_admin_user_id(user_id) || self.is_admin_email(email)
    }

    pub fn is_empty(&self) -> bool {
        self.user_ids.is_empty() && self.emails.is_empty()
    }
}
