//! [`Query`] for fetching a single [`Resource`] item.

use std::convert::Infallible;

use common::operations::Perform;
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{session::Validity, Resource},
    infra::{
        api::{self, Call, Method},
        Api,
    },
    Service,
};

use super::{read_session, Query, ReadSession};

/// [`Query`] for fetching a single item of a [`Resource`] collection.
///
/// Failures are logged and swallowed, like in [`ListResources`].
///
/// [`ListResources`]: super::ListResources
#[derive(Clone, Debug)]
pub struct GetResource {
    /// [`Resource`] collection the item belongs to.
    pub resource: Resource,

    /// ID of the item.
    pub id: String,
}

impl<St, Ap> Query<GetResource> for Service<St, Ap>
where
    Self: Query<
        ReadSession,
        Ok = Validity,
        Err = Traced<read_session::ExecutionError>,
    >,
    Ap: Api<Perform<Call>, Ok = serde_json::Value, Err = Traced<api::Error>>,
{
    type Ok = Option<serde_json::Value>;
    type Err = Infallible;

    async fn execute(&self, query: GetResource) -> Result<Self::Ok, Self::Err> {
        let GetResource { resource, id } = query;

        let bearer = match self.execute(ReadSession).await {
            Ok(v) => v.token,
            Err(e) => {
                log::error!("failed to get `{resource}` `{id}`: {e}");
                return Ok(None);
            }
        };

        let call =
            Call::new(Method::Get, resource.item_path(&id)).bearer(bearer);
        match self.api().execute(Perform(call)).await {
            Ok(serde_json::Value::Object(mut obj))
                if obj.contains_key("data") =>
            {
                Ok(obj.remove("data").filter(|d| !d.is_null()))
            }
            Ok(serde_json::Value::Null) => Ok(None),
            Ok(body) => Ok(Some(body)),
            Err(e) => {
                log::error!("failed to get `{resource}` `{id}`: {e}");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod spec {
    use common::Handler as _;
    use serde_json::json;

    use super::GetResource;
    use crate::{
        domain::Resource,
        infra::{api::fake::Fake, Local},
        Config, Service,
    };

    fn get(resource: Resource, id: &str) -> GetResource {
        GetResource {
            resource,
            id: id.into(),
        }
    }

    #[tokio::test]
    async fn unwraps_data_envelope() {
        let api = Fake::default()
            .reply(json!({"data": {"_id": "v1", "status": "pending"}}));
        let svc = Service::new(Config::default(), Local::in_memory(), api);

        let item = svc.execute(get(Resource::Visa, "v1")).await.unwrap();

        assert_eq!(item, Some(json!({"_id": "v1", "status": "pending"})));
        assert_eq!(svc.api().calls()[0].path, "visas/v1");
    }

    #[tokio::test]
    async fn swallows_not_found() {
        let api = Fake::default().fail(404, Some("Not found"));
        let svc = Service::new(Config::default(), Local::in_memory(), api);

        let item = svc.execute(get(Resource::Spa, "nope")).await.unwrap();

        assert_eq!(item, None);
    }
}
