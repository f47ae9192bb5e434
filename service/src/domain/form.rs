//! Form validation definitions.

use std::{collections::BTreeMap, fmt};

/// Validation [`Errors`] of a form, keyed by field name.
///
/// A form with any [`Errors`] is never submitted to the API.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Errors(BTreeMap<&'static str, String>);

impl Errors {
    /// Records an error `message` for the provided `field`.
    ///
    /// The first message recorded for a field wins.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        _ = self.0.entry(field).or_insert_with(|| message.into());
    }

    /// Returns the error message of the provided `field`, if any.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Indicates whether no errors have been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over `(field, message)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.0.iter().map(|(f, m)| (*f, m.as_str()))
    }

    /// Converts these [`Errors`] into a [`Result`], failing if any error has
    /// been recorded.
    ///
    /// # Errors
    ///
    /// Returns these [`Errors`] if they're not empty.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for Errors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, message)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Errors {}
