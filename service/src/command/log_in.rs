//! [`Command`] for logging a [`User`] in.

use common::operations::Perform;
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret as _, SecretBox};
use serde::Deserialize;
use serde_json::json;
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::domain::user::{Email, Password};
use crate::{
    domain::{
        session::Token,
        user::{self, role::Landing},
        Route, Session, User,
    },
    infra::{
        api::{self, Call, Method},
        Api,
    },
    Service,
};

use super::{write_session, Command, WriteSession};

/// [`Command`] for logging a [`User`] in by credentials.
///
/// On success the [`Session`] is persisted via [`WriteSession`].
#[derive(Clone, Debug)]
pub struct LogIn {
    /// [`Email`] of the [`User`].
    pub email: user::Email,

    /// [`Password`] of the [`User`].
    pub password: SecretBox<user::Password>,

    /// Indicator whether the [`Session`] should survive the process.
    pub remember_me: bool,
}

impl LogIn {
    /// API path of the login endpoint.
    const PATH: &'static str = "auth/login";
}

/// Output of [`LogIn`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// Persisted [`Session`].
    pub session: Session,

    /// [`Route`] the [`User`] should land on.
    pub landing: Route,
}

/// Successful login response of the API.
#[derive(Debug, Deserialize)]
struct Response {
    /// Login payload.
    data: Payload,
}

/// Payload of a [`Response`].
#[derive(Debug, Deserialize)]
struct Payload {
    /// Access [`Token`].
    #[serde(alias = "accessToken", alias = "access_token")]
    token: Option<Token>,

    /// Refresh [`Token`].
    #[serde(rename = "refreshToken", alias = "refresh_token")]
    refresh_token: Option<Token>,

    /// Authenticated [`User`].
    user: Option<User>,
}

impl<St, Ap> Command<LogIn> for Service<St, Ap>
where
    Self: Command<
        WriteSession,
        Ok = (),
        Err = Traced<write_session::ExecutionError>,
    >,
    Ap: Api<Perform<Call>, Ok = serde_json::Value, Err = Traced<api::Error>>,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: LogIn) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let LogIn {
            email,
            password,
            remember_me,
        } = cmd;

        let body = self
            .api()
            .execute(Perform(Call::new(Method::Post, LogIn::PATH).json(
                json!({
                    "email": email.to_string(),
                    "password": password.expose_secret().as_str(),
                }),
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let Response {
            data:
                Payload {
                    token,
                    refresh_token,
                    user,
                },
        } = serde_json::from_value(body)
            .map_err(tracerr::from_and_wrap!(=> E))?;
        let token = token
            .filter(|t| !t.as_str().is_empty())
            .ok_or(E::NoToken)
            .map_err(tracerr::wrap!())?;

        let session = Session {
            access_token: Some(token),
            refresh_token,
            user,
        };
        self.execute(WriteSession {
            session: session.clone(),
            remember_me,
        })
        .await
        .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let landing = Landing::for_role(session.role());
        log::info!("logged in as `{email}`, landing on `{landing}`");

        Ok(Output { session, landing })
    }
}

/// Error of [`LogIn`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Api`] error.
    #[display("Login request failed: {_0}")]
    Api(api::Error),

    /// API response is not a login payload.
    #[display("Unexpected login response: {_0}")]
    Decode(serde_json::Error),

    /// API response carries no access [`Token`].
    #[display("Login response carries no access token")]
    NoToken,

    /// [`Session`] cannot be persisted.
    #[display("Failed to persist session: {_0}")]
    Session(write_session::ExecutionError),
}

impl ExecutionError {
    /// Returns the human-readable message explaining this [`ExecutionError`].
    ///
    /// Prefers the message the API itself provided.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Api(e) => e.message(),
            Self::Decode(_) | Self::NoToken | Self::Session(_) => {
                self.to_string()
            }
        }
    }
}
