//! [`Role`] definitions.

use derive_more::{AsRef, Display, From};
use serde::{Deserialize, Serialize};

use crate::domain::Route;

/// Role of a [`User`], exactly as the API spelled it.
///
/// The original case is kept for storage. Comparisons go through
/// [`Role::normalized()`].
///
/// [`User`]: super::User
#[derive(
    AsRef,
    Clone,
    Debug,
    Deserialize,
    Display,
    Eq,
    From,
    PartialEq,
    Serialize,
)]
#[as_ref(str, String)]
#[from(&str, String)]
#[serde(transparent)]
pub struct Role(String);

impl Role {
    /// Normalized spellings of administrative [`Role`]s.
    const ADMINS: &'static [&'static str] =
        &["admin", "super-admin", "super_admin"];

    /// Returns this [`Role`] as it was stored.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the lower-cased form of this [`Role`] used for comparisons.
    #[must_use]
    pub fn normalized(&self) -> String {
        self.0.to_lowercase()
    }

    /// Indicates whether this [`Role`] grants access to the dashboard.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        Self::ADMINS.contains(&self.normalized().as_str())
    }
}

/// [`Route`] a freshly authenticated user lands on.
#[derive(Clone, Copy, Debug)]
pub struct Landing;

impl Landing {
    /// Picks the landing [`Route`] for the provided [`Role`].
    ///
    /// Administrators go to the dashboard, everybody else (customers,
    /// unknown roles and users without a role) to the public root.
    #[must_use]
    pub fn for_role(role: Option<&Role>) -> Route {
        match role {
            Some(r) if r.is_admin() => Route::Dashboard,
            Some(_) | None => Route::PublicRoot,
        }
    }
}
