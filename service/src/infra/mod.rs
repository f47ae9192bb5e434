//! Infrastructure layer.

pub mod api;
pub mod storage;

#[cfg(feature = "http")]
pub use self::api::Http;
pub use self::{
    api::Api,
    storage::{Local, Storage},
};
