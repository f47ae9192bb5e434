//! [`Route`] definitions.

use std::fmt;

/// Client-side route the back-office navigates to.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Route {
    /// Login screen.
    Login,

    /// Root of the administrative dashboard.
    Dashboard,

    /// Root of the public site.
    PublicRoot,
}

impl Route {
    /// Returns the path of this [`Route`].
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Dashboard => "/dashboard",
            Self::PublicRoot => "/",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[cfg(test)]
mod spec {
    use super::Route;

    #[test]
    fn displays_as_path() {
        assert_eq!(Route::Login.to_string(), "/login");
        assert_eq!(Route::Dashboard.to_string(), "/dashboard");
        assert_eq!(Route::PublicRoot.to_string(), "/");
    }
}
