//! [`Query`] definition.

pub mod get_resource;
pub mod list_resources;
pub mod read_session;

/// [`Query`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Query;

pub use self::{
    get_resource::GetResource, list_resources::ListResources,
    read_session::ReadSession,
};
