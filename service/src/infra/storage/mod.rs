//! [`Storage`]-related definitions.
//!
//! The persisted layout mirrors the one the web back-office keeps in the
//! browser, so the key names must not change.

mod local;

use std::fmt;

use common::define_kind;
use derive_more::{Display, Error as StdError, From};

pub use self::local::Local;

/// Key-value persistence of the [`Session`] record.
///
/// [`Session`]: crate::domain::Session
pub use common::Handler as Storage;

define_kind! {
    #[doc = "Persistence scope of a stored value."]
    enum Scope {
        #[doc = "Survives restarts (\"remember me\")."]
        Durable = 1,

        #[doc = "Lives until the end of the current session."]
        Ephemeral = 2,
    }
}

/// Persisted key.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Key {
    /// Legacy copy of the access token.
    Token,

    /// Access token.
    AccessToken,

    /// Refresh token.
    RefreshToken,

    /// JSON-serialized user record.
    User,

    /// ID of the user.
    UserId,

    /// Role of the user, in its original case.
    UserRole,
}

impl Key {
    /// [`Key`]s cleared before a new session is written.
    ///
    /// [`Key::UserRole`] is intentionally absent: it's overwritten only when
    /// the new session carries a role.
    pub const MANAGED: [Self; 5] = [
        Self::Token,
        Self::AccessToken,
        Self::RefreshToken,
        Self::User,
        Self::UserId,
    ];

    /// All the [`Key`]s of the session record.
    pub const ALL: [Self; 6] = [
        Self::Token,
        Self::AccessToken,
        Self::RefreshToken,
        Self::User,
        Self::UserId,
        Self::UserRole,
    ];

    /// Returns the persisted name of this [`Key`].
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Token => "token",
            Self::AccessToken => "access_token",
            Self::RefreshToken => "refresh_token",
            Self::User => "user",
            Self::UserId => "userId",
            Self::UserRole => "user_role",
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Location of a value: a [`Key`] in a [`Scope`].
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
#[display("{scope}:{key}")]
pub struct Slot {
    /// [`Scope`] of this [`Slot`].
    pub scope: Scope,

    /// [`Key`] of this [`Slot`].
    pub key: Key,
}

impl Slot {
    /// Creates a new [`Slot`].
    #[must_use]
    pub const fn new(scope: Scope, key: Key) -> Self {
        Self { scope, key }
    }
}

/// Value to be put into a [`Slot`].
#[derive(Clone, Debug)]
pub struct Entry {
    /// [`Slot`] to put the value into.
    pub slot: Slot,

    /// Value itself.
    pub value: String,
}

/// [`Storage`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// I/O error of a file-backed [`Scope`].
    #[display("I/O operation failed: {_0}")]
    Io(std::io::Error),

    /// Stored file is not a JSON object of strings.
    #[display("Stored file is corrupted: {_0}")]
    Corrupted(serde_json::Error),
}

#[cfg(test)]
mod spec {
    use super::{Key, Scope, Slot};

    #[test]
    fn key_names_match_persisted_layout() {
        let names = Key::ALL.map(Key::as_str);

        assert_eq!(
            names,
            [
                "token",
                "access_token",
                "refresh_token",
                "user",
                "userId",
                "user_role",
            ],
        );
        for k in Key::ALL {
            assert_eq!(k.to_string(), k.as_str());
        }
    }

    #[test]
    fn managed_keys_exclude_role() {
        assert_eq!(Key::MANAGED.len(), 5);
        assert!(!Key::MANAGED.contains(&Key::UserRole));
    }

    #[test]
    fn displays_slot() {
        assert_eq!(
            Slot::new(Scope::Ephemeral, Key::UserId).to_string(),
            "ephemeral:userId",
        );
    }
}
