//! [`Command`] for creating a [`Resource`] item.

use std::convert::Infallible;

use common::operations::Perform;
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{session::Validity, Reply, Resource},
    infra::{
        api::{self, Call, Method},
        Api,
    },
    query::{read_session, ReadSession},
    Query, Service,
};

use super::Command;

/// [`Command`] for creating a new item in a [`Resource`] collection.
///
/// Never fails: any failure is reported as an unsuccessful [`Reply`].
#[derive(Clone, Debug)]
pub struct CreateResource {
    /// [`Resource`] collection to create the item in.
    pub resource: Resource,

    /// Fields of the new item.
    pub data: serde_json::Value,
}

impl<St, Ap> Command<CreateResource> for Service<St, Ap>
where
    Self: Query<
        ReadSession,
        Ok = Validity,
        Err = Traced<read_session::ExecutionError>,
    >,
    Ap: Api<Perform<Call>, Ok = serde_json::Value, Err = Traced<api::Error>>,
{
    type Ok = Reply;
    type Err = Infallible;

    async fn execute(
        &self,
        cmd: CreateResource,
    ) -> Result<Self::Ok, Self::Err> {
        let CreateResource { resource, data } = cmd;

        let bearer = match self.execute(ReadSession).await {
            Ok(v) => v.token,
            Err(e) => {
                log::error!("failed to create `{resource}`: {e}");
                return Ok(Reply::failed(e.to_string()));
            }
        };

        let call =
            Call::new(Method::Post, resource.path()).bearer(bearer).json(data);
        Ok(match self.api().execute(Perform(call)).await {
            Ok(body) => Reply::from_body(body),
            Err(e) => {
                log::error!("failed to create `{resource}`: {e}");
                Reply::failed(e.as_ref().message())
            }
        })
    }
}

#[cfg(test)]
mod spec {
    use common::{operations::Insert, Handler as _};
    use serde_json::json;

    use super::CreateResource;
    use crate::{
        domain::{Reply, Resource},
        infra::{
            api::{fake::Fake, Body, Method},
            storage::{Entry, Key, Scope, Slot},
            Local,
        },
        Config, Service,
    };

    #[tokio::test]
    async fn posts_with_bearer() {
        let storage = Local::in_memory();
        storage
            .execute(Insert(Entry {
                slot: Slot::new(Scope::Durable, Key::AccessToken),
                value: "abcdefghijk".into(),
            }))
            .await
            .unwrap();
        let api = Fake::default().reply(json!({
            "success": true,
            "message": "Event created",
            "data": {"_id": "e1", "title": "Afro Nation"},
        }));
        let svc = Service::new(Config::default(), storage, api);

        let reply = svc
            .execute(CreateResource {
                resource: Resource::Event,
                data: json!({"title": "Afro Nation"}),
            })
            .await
            .unwrap();

        assert!(reply.success);
        assert_eq!(reply.data["_id"], "e1");
        let calls = svc.api().calls();
        assert_eq!(calls[0].method, Method::Post);
        assert_eq!(calls[0].path, "events");
        assert_eq!(calls[0].bearer.as_ref().unwrap().as_str(), "abcdefghijk");
        assert!(matches!(
            &calls[0].body,
            Body::Json(b) if b == &json!({"title": "Afro Nation"}),
        ));
    }

    #[tokio::test]
    async fn synthesizes_failed_reply() {
        let api = Fake::default().fail(422, Some("Title is required"));
        let svc = Service::new(Config::default(), Local::in_memory(), api);

        let reply = svc
            .execute(CreateResource {
                resource: Resource::Gym,
                data: json!({}),
            })
            .await
            .unwrap();

        assert_eq!(reply, Reply::failed("Title is required"));
    }
}
