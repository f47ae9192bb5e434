//! [`Context`]-related definitions.

use std::path::Path;

use secrecy::{SecretBox, SecretString};
use serde_json::json;
use service::{
    command::{
        upload_gallery::Image, ChangePassword, ClearSession, CreateResource,
        DeleteResource, LogIn, UpdateResource, UploadGallery,
    },
    domain::{user::Password, Reply},
    gate::State,
    infra::{Http, Local},
    query::{GetResource, ListResources},
    AuthGate, Command as _, Query as _,
};
use tracing as log;

use crate::{
    args::Command, define_error, error::ApiError, AsError, Config, Error,
    Service, Terminal,
};

/// Application context.
#[derive(Debug)]
pub struct Context {
    /// [`Service`] instance.
    service: Service,
}

impl Context {
    /// Creates a new [`Context`] out of the provided [`Config`].
    ///
    /// # Errors
    ///
    /// If the session storage cannot be opened, or the API client cannot be
    /// built.
    pub async fn new(conf: &Config) -> Result<Self, Error> {
        let storage = Local::open(conf.storage.durable_path.clone())
            .await
            .map_err(AsError::into_error)?;
        let api = Http::new(&(&conf.api).into())
            .map_err(AsError::into_error)?;

        Ok(Self {
            service: Service::new((&conf.api).into(), storage, api),
        })
    }

    /// Returns [`Service`] instance of this [`Context`].
    #[must_use]
    pub fn service(&self) -> &Service {
        &self.service
    }

    /// Runs the provided [`Command`], returning its JSON output.
    ///
    /// Protected [`Command`]s pass the [`AuthGate`] first.
    ///
    /// # Errors
    ///
    /// If the [`Command`] fails or the [`AuthGate`] denies it.
    pub async fn run(
        &self,
        command: Command,
        shell: &mut Terminal,
    ) -> Result<serde_json::Value, Error> {
        if command.is_protected() {
            self.authorize(shell).await?;
        }

        match command {
            Command::Login {
                email,
                password,
                remember_me,
            } => {
                let password = Password::new(password)
                    .ok_or_else(|| Error::from(LoginError::InvalidPassword))?;
                let out = self
                    .service
                    .execute(LogIn {
                        email,
                        password: SecretBox::new(Box::new(password)),
                        remember_me,
                    })
                    .await
                    .map_err(AsError::into_error)?;
                Ok(json!({
                    "user": out.session.user,
                    "landing": out.landing.path(),
                }))
            }
            Command::Logout => {
                self.service
                    .execute(ClearSession)
                    .await
                    .map_err(AsError::into_error)?;
                Ok(json!({"loggedOut": true}))
            }
            Command::Gate => {
                self.authorize(shell).await?;
                Ok(json!({"admitted": true}))
            }
            Command::List { resource, params } => {
                let items = self
                    .service
                    .execute(ListResources { resource, params })
                    .await
                    .unwrap_or_else(|e| match e {});
                Ok(json!(items))
            }
            Command::Get { resource, id } => {
                let item = self
                    .service
                    .execute(GetResource { resource, id })
                    .await
                    .unwrap_or_else(|e| match e {});
                Ok(json!(item))
            }
            Command::Create { resource, data } => {
                let reply = self
                    .service
                    .execute(CreateResource { resource, data })
                    .await
                    .unwrap_or_else(|e| match e {});
                reply_output(reply)
            }
            Command::Update { resource, id, data } => {
                let reply = self
                    .service
                    .execute(UpdateResource { resource, id, data })
                    .await
                    .unwrap_or_else(|e| match e {});
                reply_output(reply)
            }
            Command::Delete { resource, id } => {
                let reply = self
                    .service
                    .execute(DeleteResource { resource, id })
                    .await
                    .unwrap_or_else(|e| match e {});
                reply_output(reply)
            }
            Command::Upload {
                resource,
                id,
                files,
            } => {
                let mut images = Vec::with_capacity(files.len());
                for path in &files {
                    images.push(image(path).await?);
                }
                let reply = self
                    .service
                    .execute(UploadGallery {
                        resource,
                        id,
                        images,
                    })
                    .await
                    .map_err(AsError::into_error)?;
                reply_output(reply)
            }
            Command::ChangePassword {
                current,
                new,
                confirm,
            } => {
                let reply = self
                    .service
                    .execute(ChangePassword {
                        current_password: SecretString::from(current),
                        new_password: SecretString::from(new),
                        confirm_password: SecretString::from(confirm),
                    })
                    .await
                    .map_err(AsError::into_error)?;
                reply_output(reply)
            }
        }
    }

    /// Passes the [`AuthGate`] with the provided [`Terminal`].
    async fn authorize(&self, shell: &mut Terminal) -> Result<(), Error> {
        match AuthGate::default().mount(&self.service, shell).await {
            State::Admitted => Ok(()),
            State::Unchecked | State::Checking | State::Denied => {
                Err(AuthError::AuthorizationRequired.into())
            }
        }
    }
}

/// Turns the provided [`Reply`] into a [`Context::run()`] output.
fn reply_output(reply: Reply) -> Result<serde_json::Value, Error> {
    if !reply.success {
        return Err(Error {
            message: reply
                .message
                .unwrap_or_else(|| ApiError::Rejected.to_string()),
            ..ApiError::Rejected.into()
        });
    }
    serde_json::to_value(reply).map_err(|e| Error::internal(&e))
}

/// Reads the [`Image`] at the provided `path`.
async fn image(path: &Path) -> Result<Image, Error> {
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        log::error!("failed to read `{}`: {e}", path.display());
        Error {
            message: format!("Cannot read `{}`: {e}", path.display()),
            ..FileError::Unreadable.into()
        }
    })?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(Image {
        mime: mime(&file_name).map(ToOwned::to_owned),
        file_name,
        bytes,
    })
}

/// Guesses the MIME type of an image by its `file_name`.
fn mime(file_name: &str) -> Option<&'static str> {
    let (_, ext) = file_name.rsplit_once('.')?;
    Some(match ext.to_ascii_lowercase().as_str() {
        "webp" => "image/webp",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "avif" => "image/avif",
        _ => return None,
    })
}

define_error! {
    enum AuthError {
        #[code = "AUTHORIZATION_REQUIRED"]
        #[exit = 3]
        #[message = "Authorization required, log in first"]
        AuthorizationRequired,
    }
}

define_error! {
    enum LoginError {
        #[code = "INVALID_PASSWORD"]
        #[exit = 2]
        #[message = "Password must be between 1 and 128 characters"]
        InvalidPassword,
    }
}

define_error! {
    enum FileError {
        #[code = "UNREADABLE_FILE"]
        #[exit = 2]
        #[message = "Cannot read the file"]
        Unreadable,
    }
}

#[cfg(test)]
mod spec {
    use std::io::Write as _;

    use service::domain::{user::Email, Route};

    use super::{mime, Context};
    use crate::{args::Command, config, Config, Terminal};

    async fn context(dir: &tempfile::TempDir) -> Context {
        Context::new(&Config {
            api: config::Api {
                // Nothing listens there, so any API call would fail.
                base_url: "http://127.0.0.1:9/api".into(),
                ..config::Api::default()
            },
            storage: config::Storage {
                durable_path: dir.path().join("session.json"),
            },
            log: config::Log::default(),
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn protected_commands_require_session() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir).await;
        let mut shell = Terminal::default();

        let err = ctx
            .run(
                Command::Delete {
                    resource: "visa".parse().unwrap(),
                    id: "v1".into(),
                },
                &mut shell,
            )
            .await
            .unwrap_err();

        assert_eq!(err.code, "AUTHORIZATION_REQUIRED");
        assert_eq!(err.exit_code, 3);
        assert_eq!(shell.redirected_to(), Some(Route::Login));
    }

    #[tokio::test]
    async fn gate_admits_persisted_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut file =
            std::fs::File::create(dir.path().join("session.json")).unwrap();
        write!(
            file,
            r#"{{"access_token":"abcdefghijk","user":"{{\"_id\":\"u1\"}}"}}"#,
        )
        .unwrap();
        let ctx = context(&dir).await;
        let mut shell = Terminal::default();

        let out = ctx.run(Command::Gate, &mut shell).await.unwrap();

        assert_eq!(out, serde_json::json!({"admitted": true}));
        assert_eq!(shell.redirected_to(), None);
    }

    #[tokio::test]
    async fn unreachable_api_has_own_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir).await;

        let err = ctx
            .run(
                Command::Login {
                    email: Email::new("a@b.com").unwrap(),
                    password: "secret-password".into(),
                    remember_me: false,
                },
                &mut Terminal::default(),
            )
            .await
            .unwrap_err();

        assert_eq!(err.code, "API_UNREACHABLE");
        assert_eq!(err.exit_code, 5);
        assert!(!dir.path().join("session.json").exists());
    }

    #[tokio::test]
    async fn logout_works_offline() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir).await;

        let out = ctx
            .run(Command::Logout, &mut Terminal::default())
            .await
            .unwrap();

        assert_eq!(out, serde_json::json!({"loggedOut": true}));
    }

    #[test]
    fn guesses_image_mime() {
        assert_eq!(mime("pool.WEBP"), Some("image/webp"));
        assert_eq!(mime("front.jpeg"), Some("image/jpeg"));
        assert_eq!(mime("notes.txt"), None);
        assert_eq!(mime("README"), None);
    }
}
