//! Error types shared by every resource object and backend.

use serde_json;

#[derive(Debug, Fail)]
pub enum Error {
    #[fail(display = "Invalid argument: {}.", _0)]
    InvalidArgument(String),
    #[fail(display = "Failed to create {}.", _0)]
    ResourceCreation(String),
    #[fail(display = "Invalid state: {}.", _0)]
    InvalidState(String),
    #[fail(display = "Failed to link program, errors: \n{}.", _0)]
    Link(String),
    #[fail(display = "Failed to compile shader, errors: \n{}.", _0)]
    Compile(String),
    #[fail(display = "OpenGL implementation doesn\'t support {}.", _0)]
    Requirement(String),
    #[fail(display = "Backend: {}", _0)]
    Backend(String),
    #[fail(display = "Config: {}", _0)]
    Config(String),
}

pub type Result<T> = ::std::result::Result<T, Error>;

impl Error {
    #[inline]
    pub fn is_invalid_argument(&self) -> bool {
        match *self {
            Error::InvalidArgument(_) => true,
            _ => false,
        }
    }

    #[inline]
    pub fn is_invalid_state(&self) -> bool {
        match *self {
            Error::InvalidState(_) => true,
            _ => false,
        }
    }

    #[inline]
    pub fn is_resource_creation(&self) -> bool {
        match *self {
            Error::ResourceCreation(_) => true,
            _ => false,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Error {
        Error::Config(format!("{}", err))
    }
}
