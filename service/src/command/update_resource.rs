//! [`Command`] for updating a [`Resource`] item.

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

/// [`Command`] for updating an item of a [`Resource`] collection.
///
/// Never fails: any failure is reported as an unsuccessful [`Reply`].
#[derive(Clone, Debug)]
pub struct UpdateResource {
    /// [`Resource`] collection the item belongs to.
    pub resource: Resource,

    /// ID of the item.
    pub id: String,

    /// Fields to update.
    pub data: serde_json::Value,
}

impl<St, Ap> Command<UpdateResource> for Service<St, Ap>
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
        cmd: UpdateResource,
    ) -> Result<Self::Ok, Self::Err> {
        let UpdateResource { resource, id, data } = cmd;

        let bearer = match self.execute(ReadSession).await {
            Ok(v) => v.token,
            Err(e) => {
                log::error!("failed to update `{resource}` `{id}`: {e}");
                return Ok(Reply::failed(e.to_string()));
            }
        };

        let call = Call::new(Method::Put, resource.item_path(&id))
            .bearer(bearer)
            .json(data);
        Ok(match self.api().execute(Perform(call)).await {
            Ok(body) => Reply::from_body(body),
            Err(e) => {
                log::error!("failed to update `{resource}` `{id}`: {e}");
                Reply::failed(e.as_ref().message())
            }
        })
    }
}
