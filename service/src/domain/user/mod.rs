//! [`User`] definitions.

pub mod role;

use std::{str::FromStr, sync::LazyLock};

use derive_more::{AsRef, Display, From};
use regex::Regex;
use secrecy::{zeroize::Zeroize, CloneableSecret};
use serde::{Deserialize, Serialize};

pub use self::role::Role;

/// Back-office user, as returned by the platform API.
///
/// Fields this crate doesn't know about are kept in [`User::extra`], so
/// a stored record round-trips without losing anything the API sent.
///
/// The [`Id`] is read from `_id`, or from `id` if there is no `_id`. When
/// both are present, `id` stays in [`User::extra`].
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(try_from = "RawUser")]
pub struct User {
    /// ID of this [`User`].
    #[serde(rename = "_id")]
    pub id: Id,

    /// Display name of this [`User`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Email address of this [`User`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// [`Role`] of this [`User`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,

    /// Any other fields of this [`User`].
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// [`User`] as it comes over the wire, with both ID spellings.
#[derive(Deserialize)]
struct RawUser {
    /// Mongo-style `_id`.
    #[serde(rename = "_id")]
    object_id: Option<Id>,

    /// Plain `id`.
    id: Option<Id>,

    /// Display name.
    #[serde(default)]
    name: Option<String>,

    /// Email address.
    #[serde(default)]
    email: Option<String>,

    /// [`Role`].
    #[serde(default)]
    role: Option<Role>,

    /// Any other fields.
    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

impl TryFrom<RawUser> for User {
    type Error = &'static str;

    fn try_from(raw: RawUser) -> Result<Self, Self::Error> {
        let RawUser {
            object_id,
            id,
            name,
            email,
            role,
            mut extra,
        } = raw;

        let id = match (object_id, id) {
            (Some(object_id), Some(id)) => {
                _ = extra.insert("id".to_owned(), id.0.into());
                object_id
            }
            (Some(id), None) | (None, Some(id)) => id,
            (None, None) => return Err("missing field `_id` or `id`"),
        };

        Ok(Self {
            id,
            name,
            email,
            role,
            extra,
        })
    }
}

/// ID of a [`User`].
#[derive(
    AsRef,
    Clone,
    Debug,
    Deserialize,
    Display,
    Eq,
    From,
    Hash,
    PartialEq,
    Serialize,
)]
#[as_ref(str, String)]
#[from(&str, String)]
#[serde(transparent)]
pub struct Id(String);

impl Id {
    /// Returns this [`Id`] as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Login email of a [`User`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct Email(String);

impl Email {
    /// Creates a new [`Email`] if the given `address` is valid.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Option<Self> {
        let address = address.into();
        Self::check(&address).then_some(Self(address))
    }

    /// Checks whether the given `address` is a valid [`Email`].
    fn check(address: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Email`] format.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex")
        });

        REGEX.is_match(address.as_ref())
    }
}

impl FromStr for Email {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Email`")
    }
}

/// Password of a [`User`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Password(String);

impl Password {
    /// Creates a new [`Password`] if the given `password` is valid.
    #[must_use]
    pub fn new(password: impl Into<String>) -> Option<Self> {
        let password = password.into();
        Self::check(&password).then_some(Self(password))
    }

    /// Returns this [`Password`] as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Checks whether the given `password` is a valid [`Password`].
    fn check(password: impl AsRef<str>) -> bool {
        let password = password.as_ref();
        !password.is_empty() && password.len() <= 128
    }
}

impl FromStr for Password {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Password`")
    }
}

impl CloneableSecret for Password {}
impl Zeroize for Password {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}
