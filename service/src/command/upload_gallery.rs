//! [`Command`] for uploading gallery images of a [`Resource`] item.

use common::operations::Perform;
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{session::Validity, Reply, Resource},
    infra::{
        api::{self, Body, Call, Method, Upload},
        Api,
    },
    query::{read_session, ReadSession},
    Query, Service,
};

use super::Command;

/// [`Command`] for uploading gallery images of a [`Resource`] item.
///
/// Images are sent as a single `multipart/form-data` request, which is given
/// the [`Config::upload_timeout`] instead of the usual one.
///
/// [`Config::upload_timeout`]: crate::Config::upload_timeout
#[derive(Clone, Debug)]
pub struct UploadGallery {
    /// [`Resource`] collection the item belongs to.
    pub resource: Resource,

    /// ID of the item.
    pub id: String,

    /// [`Image`]s to upload.
    pub images: Vec<Image>,
}

impl UploadGallery {
    /// Form field every [`Image`] is sent in.
    const FIELD: &'static str = "images";
}

/// Image file to be uploaded.
#[derive(Clone, derive_more::Debug)]
pub struct Image {
    /// Name of the file.
    pub file_name: String,

    /// MIME type of the file, if known.
    pub mime: Option<String>,

    /// Contents of the file.
    #[debug("{} bytes", bytes.len())]
    pub bytes: Vec<u8>,
}

impl<St, Ap> Command<UploadGallery> for Service<St, Ap>
where
    Self: Query<
        ReadSession,
        Ok = Validity,
        Err = Traced<read_session::ExecutionError>,
    >,
    Ap: Api<Perform<Call>, Ok = serde_json::Value, Err = Traced<api::Error>>,
{
    type Ok = Reply;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: UploadGallery) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UploadGallery {
            resource,
            id,
            images,
        } = cmd;
        if images.is_empty() {
            return Err(tracerr::new!(E::NoImages));
        }

        let bearer = self
            .execute(ReadSession)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .token;

        let count = images.len();
        let mut call = Call::new(
            Method::Post,
            format!("{}/gallery", resource.item_path(&id)),
        )
        .bearer(bearer);
        call.timeout = Some(self.config().upload_timeout);
        call.body = Body::Multipart(
            images
                .into_iter()
                .map(|img| Upload {
                    field: UploadGallery::FIELD.to_owned(),
                    file_name: img.file_name,
                    mime: img.mime,
                    bytes: img.bytes,
                })
                .collect(),
        );

        let body = self
            .api()
            .execute(Perform(call))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        log::info!("uploaded {count} image(s) to `{resource}` `{id}`");

        Ok(Reply::from_body(body))
    }
}

/// Error of [`UploadGallery`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Api`] error.
    #[display("Gallery upload failed: {_0}")]
    Api(api::Error),

    /// [`ReadSession`] failed.
    #[display("Failed to read session: {_0}")]
    Session(read_session::ExecutionError),

    /// No [`Image`]s were provided.
    #[display("No images to upload")]
    NoImages,
}
