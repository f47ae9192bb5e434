//! [`Command`] for changing the password of the logged-in user.

use common::operations::Perform;
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret as _, SecretString};
use serde_json::json;
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{form, session::Validity, Reply},
    infra::{
        api::{self, Call, Method},
        Api,
    },
    query::{read_session, ReadSession},
    Query, Service,
};

use super::Command;

/// [`Command`] for changing the password of the logged-in user.
///
/// The form is validated locally first, and nothing is sent to the API if
/// it has any [`form::Errors`].
#[derive(Clone, Debug)]
pub struct ChangePassword {
    /// Current password.
    pub current_password: SecretString,

    /// New password.
    pub new_password: SecretString,

    /// Repeated new password.
    pub confirm_password: SecretString,
}

impl ChangePassword {
    /// API path of the password change endpoint.
    const PATH: &'static str = "auth/change-password";

    /// Minimal number of characters in a new password.
    pub const MIN_LEN: usize = 8;

    /// Maximal number of characters in a new password.
    pub const MAX_LEN: usize = 128;

    /// Validates this form.
    ///
    /// # Errors
    ///
    /// With the [`form::Errors`] of every invalid field.
    pub fn validate(&self) -> Result<(), form::Errors> {
        let current = self.current_password.expose_secret();
        let new = self.new_password.expose_secret();
        let confirm = self.confirm_password.expose_secret();

        let mut errs = form::Errors::default();
        if current.is_empty() {
            errs.add("currentPassword", "Current password is required");
        }
        let len = new.chars().count();
        if new.is_empty() {
            errs.add("newPassword", "New password is required");
        } else if len < Self::MIN_LEN {
            errs.add(
                "newPassword",
                format!(
                    "Password must be at least {} characters",
                    Self::MIN_LEN,
                ),
            );
        } else if len > Self::MAX_LEN {
            errs.add(
                "newPassword",
                format!(
                    "Password must be at most {} characters",
                    Self::MAX_LEN,
                ),
            );
        } else if new == current {
            errs.add(
                "newPassword",
                "New password must differ from the current one",
            );
        }
        if confirm.is_empty() {
            errs.add("confirmPassword", "Please confirm the new password");
        } else if confirm != new {
            errs.add("confirmPassword", "Passwords do not match");
        }
        errs.into_result()
    }
}

impl<St, Ap> Command<ChangePassword> for Service<St, Ap>
where
    Self: Query<
        ReadSession,
        Ok = Validity,
        Err = Traced<read_session::ExecutionError>,
    >,
    Ap: Api<Perform<Call>, Ok = serde_json::Value, Err = Traced<api::Error>>,
{
    type Ok = Reply;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: ChangePassword,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        cmd.validate().map_err(tracerr::from_and_wrap!(=> E))?;

        let bearer = self
            .execute(ReadSession)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .token;

        let call = Call::new(Method::Put, ChangePassword::PATH)
            .bearer(bearer)
            .json(json!({
                "currentPassword": cmd.current_password.expose_secret(),
                "newPassword": cmd.new_password.expose_secret(),
            }));
        let body = self
            .api()
            .execute(Perform(call))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        log::info!("password changed");

        Ok(Reply::from_body(body))
    }
}

/// Error of [`ChangePassword`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// Form has invalid fields.
    #[display("Invalid form: {_0}")]
    Invalid(form::Errors),

    /// [`Api`] error.
    #[display("Password change failed: {_0}")]
    Api(api::Error),

    /// [`ReadSession`] failed.
    #[display("Failed to read session: {_0}")]
    Session(read_session::ExecutionError),
}
