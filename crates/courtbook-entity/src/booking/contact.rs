//! Contact details of the person a booking is for.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Name, email, and phone of the booking user. All three are required and
/// must be non-empty after trimming.
#[derive(Debug, Clone, PartialEq, Eq, Validate, Serialize, Deserialize)]
pub struct ContactInfo {
    /// Full name.
    #[validate(length(min = 1, message = "User name is required"))]
    pub name: String,
    /// Email address, stored lowercased.
    #[validate(
        length(min = 1, message = "User email is required"),
        email(message = "User email is invalid")
    )]
    pub email: String,
    /// Phone number.
    #[validate(length(min = 1, message = "User phone is required"))]
    pub phone: String,
}

impl ContactInfo {
    /// Create contact details.
    pub fn new(name: impl Into<String>, email: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
        }
    }

    /// Trim every field and lowercase the email.
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_lowercase(),
            phone: self.phone.trim().to_string(),
        }
    }
}
