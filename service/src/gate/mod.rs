//! Guard of the protected area.
//!
//! The [`AuthGate`] is evaluated once per entry into the protected area: it
//! shows a busy indicator, checks the persisted [`Session`] record via
//! [`ReadSession`] and either admits the visitor or redirects them to the
//! [`Route::Login`]. The [`Token`] is not verified by the API.
//!
//! [`Session`]: crate::domain::Session
//! [`Token`]: crate::domain::session::Token

#[cfg(test)]
pub(crate) mod recorder;

use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{session::Validity, Route},
    query::{read_session, ReadSession},
    Query,
};

/// State of an [`AuthGate`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum State {
    /// Nothing has happened yet.
    #[default]
    Unchecked,

    /// Persisted [`Session`] record is being checked.
    ///
    /// [`Session`]: crate::domain::Session
    Checking,

    /// Visitor may see the protected content.
    Admitted,

    /// Visitor has been sent to the [`Route::Login`].
    Denied,
}

/// Input of the [`State`] machine.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Event {
    /// [`AuthGate`] has been mounted.
    Mounted,

    /// Persisted record has been evaluated.
    Evaluated {
        /// Indicator whether the record is valid.
        valid: bool,
    },

    /// Persisted record couldn't be read.
    Failed,
}

/// Side effect requested by a [`State`] transition.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Effect {
    /// Show a busy indicator with the provided message.
    ShowBusy(&'static str),

    /// Hide the busy indicator.
    HideBusy,

    /// Navigate to the provided [`Route`].
    Redirect {
        /// [`Route`] to navigate to.
        route: Route,

        /// Indicator whether the current history entry is replaced.
        replace: bool,
    },
}

impl State {
    /// Message shown while the [`State::Checking`] lasts.
    pub const BUSY_MESSAGE: &'static str = "Checking authentication...";

    /// Returns the next [`State`] and the [`Effect`]s of applying the
    /// provided [`Event`] to this [`State`].
    ///
    /// Anything not listed below leaves the [`State`] intact and has no
    /// [`Effect`]s:
    ///
    /// | from         | event               | to         |
    /// |--------------|---------------------|------------|
    /// | `Unchecked`  | `Mounted`           | `Checking` |
    /// | `Checking`   | `Evaluated` (valid) | `Admitted` |
    /// | `Checking`   | `Evaluated`         | `Denied`   |
    /// | `Checking`   | `Failed`            | `Denied`   |
    #[must_use]
    pub fn on(self, event: Event) -> (Self, Vec<Effect>) {
        match (self, event) {
            (Self::Unchecked, Event::Mounted) => {
                (Self::Checking, vec![Effect::ShowBusy(Self::BUSY_MESSAGE)])
            }
            (Self::Checking, Event::Evaluated { valid: true }) => {
                (Self::Admitted, vec![Effect::HideBusy])
            }
            (
                Self::Checking,
                Event::Evaluated { valid: false } | Event::Failed,
            ) => (
                Self::Denied,
                vec![
                    Effect::Redirect {
                        route: Route::Login,
                        replace: true,
                    },
                    Effect::HideBusy,
                ],
            ),
            (
                Self::Unchecked
                | Self::Checking
                | Self::Admitted
                | Self::Denied,
                Event::Mounted | Event::Evaluated { .. } | Event::Failed,
            ) => (self, Vec::new()),
        }
    }
}

/// Presentation layer the [`AuthGate`] performs its [`Effect`]s upon.
pub trait Shell {
    /// Shows a busy indicator with the provided `message`.
    fn show_busy(&mut self, message: &str);

    /// Hides the busy indicator.
    fn hide_busy(&mut self);

    /// Navigates to the provided [`Route`], replacing the current history
    /// entry if `replace` is `true`.
    fn redirect(&mut self, route: Route, replace: bool);
}

/// Guard evaluated once per entry into the protected area.
#[derive(Clone, Copy, Debug, Default)]
pub struct AuthGate {
    /// Current [`State`].
    state: State,
}

impl AuthGate {
    /// Returns the current [`State`] of this [`AuthGate`].
    #[must_use]
    pub fn state(&self) -> State {
        self.state
    }

    /// Mounts this [`AuthGate`], evaluating the persisted record of the
    /// provided `service` and performing the resulting [`Effect`]s on the
    /// provided [`Shell`].
    ///
    /// Mounting an already mounted [`AuthGate`] does nothing.
    ///
    /// If the returned future is dropped before completion, or the check
    /// panics, the [`AuthGate`] is [`State::Denied`] as if the check failed,
    /// so the busy indicator is hidden anyway.
    pub async fn mount<S, Sh>(&mut self, service: &S, shell: &mut Sh) -> State
    where
        S: Query<
            ReadSession,
            Ok = Validity,
            Err = Traced<read_session::ExecutionError>,
        >,
        Sh: Shell + ?Sized,
    {
        if self.state != State::Unchecked {
            return self.state;
        }
        let mut check = Check { gate: self, shell };
        check.gate.apply(Event::Mounted, &mut *check.shell);

        let event = match service.execute(ReadSession).await {
            Ok(v) => Event::Evaluated {
                valid: v.is_valid(),
            },
            Err(e) => {
                log::error!("failed to check session: {e}");
                Event::Failed
            }
        };
        check.gate.apply(event, &mut *check.shell);

        let state = check.gate.state;
        log::debug!("gate settled in `{state:?}` state");
        state
    }

    /// Applies the provided [`Event`], performing the [`Effect`]s on the
    /// provided [`Shell`].
    fn apply<Sh: Shell + ?Sized>(&mut self, event: Event, shell: &mut Sh) {
        let (state, effects) = self.state.on(event);
        self.state = state;
        for effect in effects {
            match effect {
                Effect::ShowBusy(msg) => shell.show_busy(msg),
                Effect::HideBusy => shell.hide_busy(),
                Effect::Redirect { route, replace } => {
                    shell.redirect(route, replace);
                }
            }
        }
    }
}

/// In-flight check of an [`AuthGate`], failing it if interrupted.
struct Check<'a, Sh: Shell + ?Sized> {
    /// [`AuthGate`] being mounted.
    gate: &'a mut AuthGate,

    /// [`Shell`] the [`AuthGate`] performs its [`Effect`]s upon.
    shell: &'a mut Sh,
}

impl<Sh: Shell + ?Sized> Drop for Check<'_, Sh> {
    fn drop(&mut self) {
        if self.gate.state == State::Checking {
            log::warn!("session check interrupted");
            self.gate.apply(Event::Failed, &mut *self.shell);
        }
    }
}
