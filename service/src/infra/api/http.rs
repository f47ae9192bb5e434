//! [`Http`] [`Api`] implementation.

use std::time::Duration;

use common::operations::Perform;
use reqwest::multipart;
use smart_default::SmartDefault;
use tracerr::Traced;
use tracing as log;

use super::{error_message, Api, Body, Call, Error, Method, Upload};

/// [`Http`] client configuration.
#[derive(Clone, Debug, SmartDefault)]
pub struct Config {
    /// Base URL every [`Call`] path is resolved against.
    #[default("http://localhost:5000/api".to_owned())]
    pub base_url: String,

    /// Default timeout of a [`Call`].
    #[default(Duration::from_secs(30))]
    pub timeout: Duration,
}

/// [`Api`] client shared by all the service wrappers.
#[derive(Clone, Debug)]
pub struct Http {
    /// Underlying [`reqwest`] client.
    client: reqwest::Client,

    /// Base URL without a trailing slash.
    base_url: String,
}

impl Http {
    /// Creates a new [`Http`] client with the provided [`Config`].
    ///
    /// # Errors
    ///
    /// If the underlying [`reqwest::Client`] cannot be built.
    pub fn new(conf: &Config) -> Result<Self, Traced<Error>> {
        let client = reqwest::Client::builder()
            .timeout(conf.timeout)
            .build()
            .map_err(tracerr::from_and_wrap!(=> Error))?;

        Ok(Self {
            client,
            base_url: conf.base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Resolves the provided `path` against the base URL.
    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl Api<Perform<Call>> for Http {
    type Ok = serde_json::Value;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Perform(call): Perform<Call>,
    ) -> Result<Self::Ok, Self::Err> {
        let Call {
            method,
            path,
            query,
            bearer,
            body,
            timeout,
        } = call;

        let mut req = self.client.request(
            match method {
                Method::Get => reqwest::Method::GET,
                Method::Post => reqwest::Method::POST,
                Method::Put => reqwest::Method::PUT,
                Method::Delete => reqwest::Method::DELETE,
            },
            self.url(&path),
        );
        if !query.is_empty() {
            req = req.query(&query);
        }
        if let Some(token) = &bearer {
            req = req.bearer_auth(token.as_str());
        }
        if let Some(timeout) = timeout {
            req = req.timeout(timeout);
        }
        req = match body {
            Body::Empty => req,
            Body::Json(json) => req.json(&json),
            Body::Multipart(uploads) => req.multipart(
                form(uploads).map_err(tracerr::from_and_wrap!(=> Error))?,
            ),
        };

        log::debug!("{method} `{path}`");
        let resp = req
            .send()
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))?;
        let status = resp.status();
        let bytes = resp
            .bytes()
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))?;

        if !status.is_success() {
            let message = serde_json::from_slice::<serde_json::Value>(&bytes)
                .ok()
                .as_ref()
                .and_then(error_message);
            log::warn!("{method} `{path}` responded with `{status}`");
            return Err(tracerr::new!(Error::Status {
                status: status.as_u16(),
                message,
            }));
        }

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(serde_json::Value::Null);
        }
        serde_json::from_slice(&bytes)
            .map_err(tracerr::from_and_wrap!(=> Error))
    }
}

/// Builds a [`multipart::Form`] out of the provided [`Upload`]s.
fn form(uploads: Vec<Upload>) -> Result<multipart::Form, reqwest::Error> {
    uploads
        .into_iter()
        .try_fold(multipart::Form::new(), |form, upload| {
            let Upload {
                field,
                file_name,
                mime,
                bytes,
            } = upload;

            let part = multipart::Part::bytes(bytes).file_name(file_name);
            let part = match mime {
                Some(mime) => part.mime_str(&mime)?,
                None => part,
            };
            Ok(form.part(field, part))
        })
}

#[cfg(test)]
mod spec {
    use std::{collections::HashMap, time::Duration};

    use axum::{
        extract::{Multipart, Query},
        http::{HeaderMap, StatusCode},
        routing::{get, post},
        Json, Router,
    };
    use common::{operations::Perform, Handler as _};
    use serde_json::{json, Value};
    use tokio::net::TcpListener;

    use super::{Config, Http};
    use crate::{
        domain::session::Token,
        infra::api::{Body, Call, Error, Method, Upload},
    };

    async fn serve(router: Router) -> Http {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        }));

        Http::new(&Config {
            base_url: format!("http://{addr}/api/"),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn sends_bearer_and_query() {
        let http = serve(Router::new().route(
            "/api/events",
            get(
                |headers: HeaderMap,
                 Query(q): Query<HashMap<String, String>>| async move {
                    Json(json!({
                        "auth": headers
                            .get("authorization")
                            .and_then(|h| h.to_str().ok()),
                        "page": q.get("page"),
                    }))
                },
            ),
        ))
        .await;

        let mut call = Call::new(Method::Get, "/events")
            .bearer(Some(Token::from("abcdefghijk")));
        call.query.push(("page".into(), "2".into()));
        let body = http.execute(Perform(call)).await.unwrap();

        assert_eq!(
            body,
            json!({"auth": "Bearer abcdefghijk", "page": "2"}),
        );
    }

    #[tokio::test]
    async fn reports_status_with_api_message() {
        let http = serve(Router::new().route(
            "/api/auth/login",
            post(|| async {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({"message": "Invalid credentials"})),
                )
            }),
        ))
        .await;

        let err = http
            .execute(Perform(
                Call::new(Method::Post, "auth/login").json(json!({})),
            ))
            .await
            .unwrap_err();

        match err.into_inner() {
            Error::Status { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message.as_deref(), Some("Invalid credentials"));
            }
            e => panic!("unexpected error: {e}"),
        }
    }

    #[tokio::test]
    async fn treats_empty_body_as_null() {
        let http = serve(
            Router::new()
                .route("/api/visas/1", axum::routing::delete(|| async {})),
        )
        .await;

        let body = http
            .execute(Perform(Call::new(Method::Delete, "visas/1")))
            .await
            .unwrap();

        assert_eq!(body, Value::Null);
    }

    #[tokio::test]
    async fn uploads_multipart_parts() {
        let http = serve(Router::new().route(
            "/api/spas/s1/gallery",
            post(|mut form: Multipart| async move {
                let mut names = Vec::new();
                while let Some(field) = form.next_field().await.unwrap() {
                    names.push(format!(
                        "{}:{}",
                        field.name().unwrap_or_default(),
                        field.file_name().unwrap_or_default(),
                    ));
                }
                Json(json!({"uploaded": names}))
            }),
        ))
        .await;

        let mut call = Call::new(Method::Post, "spas/s1/gallery");
        call.body = Body::Multipart(
            ["front.webp", "pool.webp"]
                .into_iter()
                .map(|name| Upload {
                    field: "images".into(),
                    file_name: name.into(),
                    mime: Some("image/webp".into()),
                    bytes: vec![0; 16],
                })
                .collect(),
        );
        let body = http.execute(Perform(call)).await.unwrap();

        assert_eq!(
            body,
            json!({"uploaded": ["images:front.webp", "images:pool.webp"]}),
        );
    }
}
