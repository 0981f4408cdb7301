pub mod api;
pub mod types;

pub use self::api::GLApi;
