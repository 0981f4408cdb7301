//! # GLES Objects
//!
//! Lifecycle objects for the native resources of OpenGL ES 1.1 and 2.0 contexts:
//! buffer objects, shader objects and program objects.
//!
//! Each object owns exactly one native handle. It is acquired on creation and
//! released by an explicit `delete`, after which every operation except another
//! `delete` fails with `Error::InvalidState`. Objects do not capture the context
//! they were created in, the `Context` is passed into every call instead, and it
//! keeps track of the binding points shared by all objects of that context.
//!
//! ```ignore
//! use gles_objects::prelude::*;
//!
//! let mut ctx = Context::headless();
//!
//! let mut vs = Shader::vertex(&mut ctx)?;
//! vs.set_source(&mut ctx, VS)?.compile(&mut ctx)?;
//!
//! let mut fs = Shader::fragment(&mut ctx)?;
//! fs.set_source(&mut ctx, FS)?.compile(&mut ctx)?;
//!
//! let mut program = Program::new(&mut ctx)?;
//! program
//!     .attach(&mut ctx, &vs)?
//!     .attach(&mut ctx, &fs)?
//!     .link(&mut ctx)?
//!     .use_program(&mut ctx)?;
//!
//! let mut vbo = VertexBuffer::array(&mut ctx)?;
//! vbo.upload(&mut ctx, &[0.0f32, 0.5, -0.5, -0.5, 0.5, -0.5], None, None)?;
//! ```
//!
//! The backend is selected when the context is created. `backends::new` loads the
//! OpenGL (ES) symbols of the context current on this thread, while
//! `backends::new_headless` works without any driver at all.

#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;
#[macro_use]
extern crate serde;
extern crate byteorder;
extern crate serde_json;
extern crate smallvec;

#[cfg(not(target_arch = "wasm32"))]
extern crate gl;

pub mod backends;
pub mod context;
pub mod errors;
pub mod objects;
pub mod settings;

pub mod prelude {
    pub use crate::backends::capabilities::{Capabilities, Operation, Version};
    pub use crate::backends::{GraphicsApi, Handle, RawHandle};
    pub use crate::context::{Bindings, Context};
    pub use crate::errors::{Error, Result};
    pub use crate::objects::prelude::*;
    pub use crate::settings::ContextParams;
}
