//! [`Command`] for clearing the persisted [`Session`].

use common::operations::{By, Delete};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::domain::Session;
use crate::{
    domain::session::AuthEvent,
    infra::{
        storage::{self, Key, Scope, Slot},
        Storage,
    },
    Service,
};

use super::Command;

/// [`Command`] for clearing the persisted [`Session`] (logging out).
///
/// Removes every [`Key`] from both [`Scope`]s.
#[derive(Clone, Copy, Debug)]
pub struct ClearSession;

impl<St, Ap> Command<ClearSession> for Service<St, Ap>
where
    St: Storage<
        Delete<By<String, Slot>>,
        Ok = (),
        Err = Traced<storage::Error>,
    >,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(&self, _: ClearSession) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        for scope in Scope::ALL {
            for key in Key::ALL {
                self.storage()
                    .execute(Delete(By::new(Slot::new(*scope, key))))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;
            }
        }

        log::debug!("session cleared");
        self.notify(AuthEvent {
            is_logged_in: false,
        });

        Ok(())
    }
}

/// Error of [`ClearSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Storage`] error.
    #[display("`Storage` operation failed: {_0}")]
    Storage(storage::Error),
}
