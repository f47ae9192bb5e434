//! [`Shell`] recording everything done to it.

use crate::domain::Route;

use super::Shell;

/// Single action performed on a [`Recorder`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum Action {
    /// [`Shell::show_busy()`] has been called.
    ShowBusy(String),

    /// [`Shell::hide_busy()`] has been called.
    HideBusy,

    /// [`Shell::redirect()`] has been called.
    Redirect(Route, bool),
}

/// [`Shell`] recording every [`Action`] performed on it.
#[derive(Debug, Default)]
pub(crate) struct Recorder {
    /// Recorded [`Action`]s, in order.
    pub(crate) actions: Vec<Action>,
}

impl Recorder {
    /// Returns the recorded redirects.
    pub(crate) fn redirects(&self) -> Vec<(Route, bool)> {
        self.actions
            .iter()
            .filter_map(|a| match a {
                Action::Redirect(route, replace) => Some((*route, *replace)),
                Action::ShowBusy(_) | Action::HideBusy => None,
            })
            .collect()
    }

    /// Returns the number of show/hide pairs, checking they're balanced
    /// and never nested.
    pub(crate) fn busy_pairs(&self) -> usize {
        let mut shown = false;
        let mut pairs = 0;
        for a in &self.actions {
            match a {
                Action::ShowBusy(_) => {
                    assert!(!shown, "busy indicator shown twice");
                    shown = true;
                }
                Action::HideBusy => {
                    assert!(shown, "busy indicator hidden while not shown");
                    shown = false;
                    pairs += 1;
                }
                Action::Redirect(..) => {}
            }
        }
        assert!(!shown, "busy indicator left shown");
        pairs
    }
}

impl Shell for Recorder {
    fn show_busy(&mut self, message: &str) {
        self.actions.push(Action::ShowBusy(message.to_owned()));
    }

    fn hide_busy(&mut self) {
        self.actions.push(Action::HideBusy);
    }

    fn redirect(&mut self, route: Route, replace: bool) {
        self.actions.push(Action::Redirect(route, replace));
    }
}
