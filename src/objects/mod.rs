//! Lifecycle objects of native GPU resources.
//!
//! Every object owns exactly one native handle, acquired when it is created and
//! released by an explicit `delete`. Objects never hold a reference to their
//! `Context`, it is passed into every call instead.

pub mod buffer;
pub mod element;
pub mod program;
pub mod shader;

pub mod prelude {
    pub use super::buffer::{BufferKind, BufferState, BufferUsage, VertexBuffer};
    pub use super::element::{Element, ElementKind};
    pub use super::program::{Program, ProgramState};
    pub use super::shader::{Shader, ShaderKind, ShaderState};
}
