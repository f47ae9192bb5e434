//! [`Command`] for persisting a [`Session`].

use common::operations::{By, Delete, Insert};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{session::AuthEvent, Session},
    infra::{
        storage::{self, Entry, Key, Scope, Slot},
        Storage,
    },
    Service,
};

use super::Command;

/// [`Command`] for persisting a [`Session`], replacing the previous one.
#[derive(Clone, Debug)]
pub struct WriteSession {
    /// [`Session`] to persist.
    pub session: Session,

    /// Indicator whether the [`Session`] should be remembered.
    ///
    /// It doesn't affect the [`Scope::Durable`], which is always written,
    /// but suppresses the copy in the [`Scope::Ephemeral`].
    pub remember_me: bool,
}

impl WriteSession {
    /// Returns the [`Scope`]s the [`Session`] is written into.
    fn scopes(&self) -> &'static [Scope] {
        if self.remember_me {
            &[Scope::Durable]
        } else {
            &[Scope::Durable, Scope::Ephemeral]
        }
    }
}

impl<St, Ap> Command<WriteSession> for Service<St, Ap>
where
    St: Storage<Insert<Entry>, Ok = (), Err = Traced<storage::Error>>
        + Storage<
            Delete<By<String, Slot>>,
            Ok = (),
            Err = Traced<storage::Error>,
        >,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: WriteSession) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        for scope in Scope::ALL {
            for key in Key::MANAGED {
                self.storage()
                    .execute(Delete(By::new(Slot::new(*scope, key))))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;
            }
        }

        let values = layout(&cmd.session)
            .map_err(tracerr::from_and_wrap!(=> E))?;
        for scope in cmd.scopes() {
            for (key, value) in &values {
                self.storage()
                    .execute(Insert(Entry {
                        slot: Slot::new(*scope, *key),
                        value: value.clone(),
                    }))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;
            }
        }

        log::debug!("session written into {} scope(s)", cmd.scopes().len());
        self.notify(AuthEvent { is_logged_in: true });

        Ok(())
    }
}

/// Lays out the provided [`Session`] as persisted [`Key`] values.
fn layout(
    session: &Session,
) -> Result<Vec<(Key, String)>, serde_json::Error> {
    let mut values = Vec::with_capacity(Key::ALL.len());
    if let Some(token) = &session.access_token {
        values.push((Key::AccessToken, token.to_string()));
        values.push((Key::Token, token.to_string()));
    }
    if let Some(token) = &session.refresh_token {
        values.push((Key::RefreshToken, token.to_string()));
    }
    if let Some(user) = &session.user {
        values.push((Key::User, serde_json::to_string(user)?));
        values.push((Key::UserId, user.id.to_string()));
    }
    if let Some(role) = session.role() {
        values.push((Key::UserRole, role.to_string()));
    }
    Ok(values)
}

/// Error of [`WriteSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Storage`] error.
    #[display("`Storage` operation failed: {_0}")]
    Storage(storage::Error),

    /// [`User`] record cannot be serialized.
    ///
    /// [`User`]: crate::domain::User
    #[display("Failed to serialize `User`: {_0}")]
    Serialize(serde_json::Error),
}
