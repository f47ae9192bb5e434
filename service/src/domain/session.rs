//! [`Session`] definitions.

use std::num::FpCategory;

use derive_more::{AsRef, Debug, Display, From};
use serde::{Deserialize, Serialize};

use crate::domain::{user::Role, User};

/// Authenticated session of a back-office [`User`].
///
/// This is the logical record behind the persisted keys. It is never
/// expired or refreshed locally.
#[derive(Clone, Debug, Default)]
pub struct Session {
    /// Access [`Token`] sent as a bearer credential.
    pub access_token: Option<Token>,

    /// Refresh [`Token`], stored but never exchanged.
    pub refresh_token: Option<Token>,

    /// Authenticated [`User`].
    pub user: Option<User>,
}

impl Session {
    /// Returns the [`Role`] of this [`Session`]'s [`User`].
    #[must_use]
    pub fn role(&self) -> Option<&Role> {
        self.user.as_ref().and_then(|u| u.role.as_ref())
    }
}

/// Opaque token of a [`Session`].
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
pub struct Token(#[debug(skip)] String);

impl Token {
    /// Number of UTF-16 code units a [`Token`] must exceed to be taken
    /// seriously.
    pub const MIN_LEN: usize = 10;

    /// Returns this [`Token`] as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Indicates whether this [`Token`] looks like a real credential, i.e.
    /// it's longer than [`Token::MIN_LEN`] UTF-16 code units.
    ///
    /// Nothing else about the [`Token`] is checked.
    #[must_use]
    pub fn is_plausible(&self) -> bool {
        self.0.encode_utf16().count() > Self::MIN_LEN
    }
}

/// Persisted `user` value, parsed leniently.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StoredUser {
    /// Value is a well-formed [`User`] record.
    Parsed(User),

    /// Value is empty, or a JSON literal that means "nothing" (`null`,
    /// `false`, `0` or `""`).
    Blank,

    /// Value is not a [`User`] record, but is non-empty.
    ///
    /// Still counts as a present [`User`]. This is a weak authentication
    /// contract and is kept as such.
    Malformed(String),
}

impl StoredUser {
    /// Parses the provided raw persisted value.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if raw.is_empty() {
            return Self::Blank;
        }
        match serde_json::from_str::<serde_json::Value>(raw) {
            Ok(v) if is_falsy(&v) => Self::Blank,
            Ok(v) => serde_json::from_value(v).map_or_else(
                |_| Self::Malformed(raw.to_owned()),
                Self::Parsed,
            ),
            Err(_) => Self::Malformed(raw.to_owned()),
        }
    }

    /// Indicates whether this value counts as a present [`User`].
    #[must_use]
    pub fn is_present(&self) -> bool {
        match self {
            Self::Parsed(_) | Self::Malformed(_) => true,
            Self::Blank => false,
        }
    }

    /// Returns the parsed [`User`], if any.
    #[must_use]
    pub fn user(&self) -> Option<&User> {
        match self {
            Self::Parsed(u) => Some(u),
            Self::Blank | Self::Malformed(_) => None,
        }
    }
}

/// Checks whether the provided JSON value means "nothing".
fn is_falsy(v: &serde_json::Value) -> bool {
    use serde_json::Value as V;

    match v {
        V::Null => true,
        V::Bool(b) => !b,
        V::Number(n) => n
            .as_f64()
            .is_some_and(|f| f.classify() == FpCategory::Zero),
        V::String(s) => s.is_empty(),
        V::Array(_) | V::Object(_) => false,
    }
}

/// Result of inspecting the persisted [`Session`] record.
#[derive(Clone, Debug)]
pub struct Validity {
    /// First plausible access [`Token`] found in any scope.
    pub token: Option<Token>,

    /// First non-empty `user` value found in any scope.
    pub user: StoredUser,

    /// Resolved [`Role`] of the [`User`].
    pub role: Option<Role>,
}

impl Validity {
    /// Indicates whether the persisted record lets its holder in.
    ///
    /// [`Token`] and [`User`] are checked independently and may come from
    /// different scopes.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.token.is_some() && self.user.is_present()
    }
}

/// Notification about authentication state changes within this process.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AuthEvent {
    /// Indicator whether a [`Session`] is persisted after the change.
    pub is_logged_in: bool,
}
