//! [`Query`] for listing a [`Resource`] collection.

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

/// [`Query`] for listing the items of a [`Resource`] collection.
///
/// Failures are logged and swallowed: the caller gets [`None`] and decides
/// what to show.
#[derive(Clone, Debug)]
pub struct ListResources {
    /// [`Resource`] collection to list.
    pub resource: Resource,

    /// Query parameters (paging, search, filters) passed through as is.
    pub params: Vec<(String, String)>,
}

impl<St, Ap> Query<ListResources> for Service<St, Ap>
where
    Self: Query<
        ReadSession,
        Ok = Validity,
        Err = Traced<read_session::ExecutionError>,
    >,
    Ap: Api<Perform<Call>, Ok = serde_json::Value, Err = Traced<api::Error>>,
{
    type Ok = Option<Vec<serde_json::Value>>;
    type Err = Infallible;

    async fn execute(
        &self,
        query: ListResources,
    ) -> Result<Self::Ok, Self::Err> {
        let ListResources { resource, params } = query;

        let bearer = match self.execute(ReadSession).await {
            Ok(v) => v.token,
            Err(e) => {
                log::error!("failed to list `{resource}`: {e}");
                return Ok(None);
            }
        };

        let mut call = Call::new(Method::Get, resource.path()).bearer(bearer);
        call.query = params;
        let body = match self.api().execute(Perform(call)).await {
            Ok(body) => body,
            Err(e) => {
                log::error!("failed to list `{resource}`: {e}");
                return Ok(None);
            }
        };

        let items = items(body);
        if items.is_none() {
            log::warn!("unexpected shape of `{resource}` list response");
        }
        Ok(items)
    }
}

/// Extracts list items from the provided API response `body`.
///
/// Accepts a bare array, or an array under `data`, `items` or `results`,
/// possibly nested in a `data` envelope.
fn items(body: serde_json::Value) -> Option<Vec<serde_json::Value>> {
    use serde_json::Value as V;

    /// Fields an array of items may be put under.
    const FIELDS: [&str; 3] = ["data", "items", "results"];

    match body {
        V::Array(items) => Some(items),
        V::Object(mut obj) => {
            if let Some(V::Array(items)) = FIELDS
                .into_iter()
                .find(|f| obj.get(*f).is_some_and(V::is_array))
                .and_then(|f| obj.remove(f))
            {
                return Some(items);
            }
            match obj.remove("data") {
                Some(data @ V::Object(_)) => items(data),
                Some(_) | None => None,
            }
        }
        V::Null | V::Bool(_) | V::Number(_) | V::String(_) => None,
    }
}

#[cfg(test)]
mod spec {
    use common::Handler as _;
    use serde_json::json;

    use super::{items, ListResources};
    use crate::{
        domain::Resource,
        infra::{
            api::{fake::Fake, Method},
            Local,
        },
        Config, Service,
    };

    #[test]
    fn extracts_items_from_known_shapes() {
        let one = Some(vec![json!({"_id": "1"})]);

        assert_eq!(items(json!([{"_id": "1"}])), one);
        assert_eq!(items(json!({"data": [{"_id": "1"}]})), one);
        assert_eq!(items(json!({"results": [{"_id": "1"}]})), one);
        assert_eq!(
            items(json!({"data": {"items": [{"_id": "1"}], "total": 1}})),
            one,
        );
        assert_eq!(items(json!({"data": {"total": 1}})), None);
        assert_eq!(items(json!("oops")), None);
    }

    #[tokio::test]
    async fn lists_with_params() {
        let api = Fake::default().reply(json!({"data": [{"_id": "g1"}]}));
        let svc = Service::new(Config::default(), Local::in_memory(), api);

        let items = svc
            .execute(ListResources {
                resource: Resource::Gym,
                params: vec![("page".into(), "3".into())],
            })
            .await
            .unwrap();

        assert_eq!(items, Some(vec![json!({"_id": "g1"})]));
        let calls = svc.api().calls();
        assert_eq!(calls[0].method, Method::Get);
        assert_eq!(calls[0].path, "gyms");
        assert_eq!(calls[0].query, [("page".to_owned(), "3".to_owned())]);
        assert!(calls[0].bearer.is_none());
    }

    #[tokio::test]
    async fn swallows_failures() {
        let api = Fake::default().fail(500, Some("boom"));
        let svc = Service::new(Config::default(), Local::in_memory(), api);

        let items = svc
            .execute(ListResources {
                resource: Resource::Visa,
                params: vec![],
            })
            .await
            .unwrap();

        assert_eq!(items, None);
    }
}
