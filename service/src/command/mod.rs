//! [`Command`] definition.

pub mod change_password;
pub mod clear_session;
pub mod create_resource;
pub mod delete_resource;
pub mod log_in;
pub mod update_resource;
pub mod upload_gallery;
pub mod write_session;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    change_password::ChangePassword, clear_session::ClearSession,
    create_resource::CreateResource, delete_resource::DeleteResource,
    log_in::LogIn, update_resource::UpdateResource,
    upload_gallery::UploadGallery, write_session::WriteSession,
};
