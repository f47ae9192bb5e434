//! [`Terminal`] definitions.

use service::{domain::Route, gate::Shell};
use tracing as log;

/// [`Shell`] reporting the [`AuthGate`] progress into the log.
///
/// [`AuthGate`]: service::AuthGate
#[derive(Clone, Copy, Debug, Default)]
pub struct Terminal {
    /// [`Route`] the last redirect pointed to.
    redirected_to: Option<Route>,
}

impl Terminal {
    /// Returns the [`Route`] the last redirect pointed to, if any.
    #[must_use]
    pub fn redirected_to(&self) -> Option<Route> {
        self.redirected_to
    }
}

impl Shell for Terminal {
    fn show_busy(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn hide_busy(&mut self) {
        log::debug!("authentication checked");
    }

    fn redirect(&mut self, route: Route, _: bool) {
        log::warn!("not logged in, redirecting to `{route}`");
        self.redirected_to = Some(route);
    }
}
