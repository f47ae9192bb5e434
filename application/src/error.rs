//! [`Error`]-related definitions.

use std::fmt;

use derive_more::Error as StdError;
use itertools::Itertools as _;
use service::{
    command::{
        change_password, clear_session, log_in, upload_gallery, write_session,
    },
    domain::form,
    infra::{api, storage},
    query::read_session,
};
use tracerr::{Trace, Traced};

/// Defines a new error type.
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_error {
    (
        enum $name:ident {
            $(
                #[code = $code:literal]
                #[exit = $exit_code:literal]
                #[message = $message:literal]
                $variant:ident
            ),* $(,)?
        }
    ) => {
        /// Error type.
        #[derive(
            Clone,
            Copy,
            Debug,
            ::derive_more::Display,
            ::derive_more::Error
        )]
        pub enum $name {
            $(
                #[display($message)]
                #[doc = $message]
                $variant,
            )*
        }

        impl From<$name> for $crate::Error {
            fn from(err: $name) -> Self {
                match err {
                    $(
                        $name::$variant => Self {
                            code: $code,
                            exit_code: $exit_code,
                            message: $message.to_string(),
                            backtrace: None,
                        },
                    )*
                }
            }
        }
    };
}

/// User-facing [`Error`] of a back-office command.
#[derive(Clone, Debug, StdError)]
pub struct Error {
    /// [`Error`] code.
    pub code: Code,

    /// Process exit code this [`Error`] results in.
    pub exit_code: u8,

    /// Backtrace of this [`Error`].
    #[error(not(backtrace))]
    pub backtrace: Option<Trace>,

    /// [`Error`] message.
    pub message: String,
}

impl Error {
    /// Exit code of an unexpected [`Error`].
    pub const INTERNAL_EXIT_CODE: u8 = 1;

    /// Create a new [`Error`] representing an unexpected failure.
    #[must_use]
    pub fn internal(msg: &impl ToString) -> Self {
        Self {
            code: "INTERNAL_ERROR",
            exit_code: Self::INTERNAL_EXIT_CODE,
            message: msg.to_string(),
            backtrace: None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            code,
            exit_code: _,
            backtrace,
            message,
        } = self;

        write!(
            f,
            "[{code}]: {message}{}",
            backtrace
                .iter()
                .format_with("\n", |trace, f| f(&format_args!("\n{trace}"))),
        )
    }
}

/// [`Error`] code.
pub type Code = &'static str;

/// Helper trait for converting types into [`Error`]s.
pub trait AsError {
    /// Tries to convert the type into an [`Error`].
    ///
    /// [`None`] is returned if the type cannot be converted into an [`Error`].
    fn try_as_error(&self) -> Option<Error>;

    /// Converts the type into an [`Error`].
    fn as_error(&self) -> Error
    where
        Self: fmt::Display,
    {
        self.try_as_error()
            .unwrap_or_else(|| Error::internal(&self))
    }

    /// Converts the type into an [`Error`] by consuming it.
    fn into_error(self) -> Error
    where
        Self: fmt::Display + Sized,
    {
        self.as_error()
    }
}

impl<E: AsError> AsError for Traced<E> {
    fn try_as_error(&self) -> Option<Error> {
        let mut error = self.as_ref().try_as_error()?;
        error.backtrace = Some(self.trace().clone());
        Some(error)
    }
}

impl AsError for storage::Error {
    fn try_as_error(&self) -> Option<Error> {
        None
    }
}

impl AsError for api::Error {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Status { status: 401, .. } => Some(Error {
                message: self.message(),
                ..ApiError::Unauthorized.into()
            }),
            Self::Status { .. } => Some(Error {
                message: self.message(),
                ..ApiError::Rejected.into()
            }),
            Self::Transport(_) => Some(Error {
                message: self.message(),
                ..ApiError::Unreachable.into()
            }),
            Self::Decode(_) => Some(Error {
                message: self.message(),
                ..ApiError::Malformed.into()
            }),
        }
    }
}

impl AsError for form::Errors {
    fn try_as_error(&self) -> Option<Error> {
        Some(Error {
            message: self.to_string(),
            ..FormError::Invalid.into()
        })
    }
}

impl AsError for read_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Storage(e) => e.try_as_error(),
        }
    }
}

impl AsError for write_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Storage(e) => e.try_as_error(),
            Self::Serialize(_) => None,
        }
    }
}

impl AsError for clear_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Storage(e) => e.try_as_error(),
        }
    }
}

impl AsError for log_in::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Api(e) => e.try_as_error(),
            Self::Session(e) => e.try_as_error(),
            Self::Decode(_) | Self::NoToken => None,
        }
    }
}

impl AsError for upload_gallery::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Api(e) => e.try_as_error(),
            Self::Session(e) => e.try_as_error(),
            Self::NoImages => Some(FormError::NoImages.into()),
        }
    }
}

impl AsError for change_password::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Invalid(e) => e.try_as_error(),
            Self::Api(e) => e.try_as_error(),
            Self::Session(e) => e.try_as_error(),
        }
    }
}

define_error! {
    enum ApiError {
        #[code = "UNAUTHORIZED"]
        #[exit = 3]
        #[message = "API refused the credentials"]
        Unauthorized,

        #[code = "API_REJECTED"]
        #[exit = 4]
        #[message = "API rejected the request"]
        Rejected,

        #[code = "API_UNREACHABLE"]
        #[exit = 5]
        #[message = "API cannot be reached"]
        Unreachable,

        #[code = "API_MALFORMED_RESPONSE"]
        #[exit = 5]
        #[message = "API responded with something other than JSON"]
        Malformed,
    }
}

define_error! {
    enum FormError {
        #[code = "INVALID_FORM"]
        #[exit = 2]
        #[message = "Form has invalid fields"]
        Invalid,

        #[code = "NO_IMAGES"]
        #[exit = 2]
        #[message = "No images to upload"]
        NoImages,
    }
}
