//! Domain definitions.

pub mod form;
pub mod reply;
pub mod resource;
pub mod route;
pub mod session;
pub mod user;

pub use self::{
    reply::Reply,
    resource::Resource,
    route::Route,
    session::Session,
    user::{role::Landing, User},
};
