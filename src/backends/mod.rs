//! The backend of resource objects, which should be responsible for only one thing:
//! forwarding primitive calls to the low-level OpenGL (ES) APIs.

pub mod capabilities;
pub mod headless;

use std::fmt;
use std::num::NonZeroU32;

use crate::errors::*;
use crate::objects::prelude::{BufferKind, BufferUsage, ShaderKind};

use self::capabilities::{Capabilities, Operation};

/// The raw identifier returned by the native allocation primitives. Zero is
/// never a valid object.
pub type RawHandle = u32;

/// A non-zero identifier of a native GPU object. It stays valid until the
/// object is explicitly deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Handle(NonZeroU32);

impl Handle {
    /// Wraps `raw`, returns `None` if it is zero.
    #[inline]
    pub fn new(raw: RawHandle) -> Option<Self> {
        NonZeroU32::new(raw).map(Handle)
    }

    #[inline]
    pub fn get(self) -> RawHandle {
        self.0.get()
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Handle ({})", self.0)
    }
}

/// The capability interface of a graphics implementation. Resource objects only
/// talk to the driver through this trait, so the same objects work on top of
/// every version of the API and on top of the headless implementation.
///
/// All methods must be called on the thread owning the underlying context.
pub trait GraphicsApi {
    /// The version and extensions of the implementation.
    fn capabilities(&self) -> &Capabilities;

    /// Checks if the primitives of `op` are available.
    fn supports(&self, op: Operation) -> bool {
        self.capabilities().supports(op)
    }

    /// Allocates a buffer object name. Returns zero on failure.
    fn gen_buffer(&mut self, target: BufferKind) -> Result<RawHandle>;

    fn delete_buffers(&mut self, handles: &[Handle]) -> Result<()>;

    /// Binds `handle` to `target`, or unbinds the target with `None`.
    fn bind_buffer(&mut self, target: BufferKind, handle: Option<Handle>) -> Result<()>;

    /// Returns the buffer currently bound to `target`.
    fn buffer_binding(&self, target: BufferKind) -> Result<Option<Handle>>;

    /// Creates and initializes the data store of the buffer bound to `target`.
    fn buffer_data(
        &mut self,
        target: BufferKind,
        size: usize,
        data: &[u8],
        usage: BufferUsage,
    ) -> Result<()>;

    /// Updates a subset of the data store of the buffer bound to `target`.
    fn buffer_sub_data(
        &mut self,
        target: BufferKind,
        offset: usize,
        size: usize,
        data: &[u8],
    ) -> Result<()>;

    /// Creates a shader object. Returns zero on failure.
    fn create_shader(&mut self, kind: ShaderKind) -> Result<RawHandle>;

    fn shader_source(&mut self, shader: Handle, code: &str) -> Result<()>;

    fn compile_shader(&mut self, shader: Handle) -> Result<()>;

    fn shader_compile_status(&self, shader: Handle) -> Result<bool>;

    fn shader_info_log(&self, shader: Handle) -> Result<String>;

    fn delete_shader(&mut self, shader: Handle) -> Result<()>;

    /// Creates a program object. Returns zero on failure.
    fn create_program(&mut self) -> Result<RawHandle>;

    fn attach_shader(&mut self, program: Handle, shader: Handle) -> Result<()>;

    fn detach_shader(&mut self, program: Handle, shader: Handle) -> Result<()>;

    fn bind_attrib_location(&mut self, program: Handle, index: u32, name: &str) -> Result<()>;

    fn link_program(&mut self, program: Handle) -> Result<()>;

    fn program_link_status(&self, program: Handle) -> Result<bool>;

    fn program_info_log(&self, program: Handle) -> Result<String>;

    /// Returns the location of an attribute variable, `-1` if it is unknown.
    fn attrib_location(&self, program: Handle, name: &str) -> Result<i32>;

    /// Returns the location of an uniform variable, `-1` if it is unknown.
    fn uniform_location(&self, program: Handle, name: &str) -> Result<i32>;

    /// Installs `program` as part of current rendering state, or uninstalls
    /// the current one with `None`.
    fn use_program(&mut self, program: Option<Handle>) -> Result<()>;

    fn delete_program(&mut self, program: Handle) -> Result<()>;
}

impl<T: GraphicsApi + ?Sized> GraphicsApi for Box<T> {
    fn capabilities(&self) -> &Capabilities {
        (**self).capabilities()
    }

    fn supports(&self, op: Operation) -> bool {
        (**self).supports(op)
    }

    fn gen_buffer(&mut self, target: BufferKind) -> Result<RawHandle> {
        (**self).gen_buffer(target)
    }

    fn delete_buffers(&mut self, handles: &[Handle]) -> Result<()> {
        (**self).delete_buffers(handles)
    }

    fn bind_buffer(&mut self, target: BufferKind, handle: Option<Handle>) -> Result<()> {
        (**self).bind_buffer(target, handle)
    }

    fn buffer_binding(&self, target: BufferKind) -> Result<Option<Handle>> {
        (**self).buffer_binding(target)
    }

    fn buffer_data(
        &mut self,
        target: BufferKind,
        size: usize,
        data: &[u8],
        usage: BufferUsage,
    ) -> Result<()> {
        (**self).buffer_data(target, size, data, usage)
    }

    fn buffer_sub_data(
        &mut self,
        target: BufferKind,
        offset: usize,
        size: usize,
        data: &[u8],
    ) -> Result<()> {
        (**self).buffer_sub_data(target, offset, size, data)
    }

    fn create_shader(&mut self, kind: ShaderKind) -> Result<RawHandle> {
        (**self).create_shader(kind)
    }

    fn shader_source(&mut self, shader: Handle, code: &str) -> Result<()> {
        (**self).shader_source(shader, code)
    }

    fn compile_shader(&mut self, shader: Handle) -> Result<()> {
        (**self).compile_shader(shader)
    }

    fn shader_compile_status(&self, shader: Handle) -> Result<bool> {
        (**self).shader_compile_status(shader)
    }

    fn shader_info_log(&self, shader: Handle) -> Result<String> {
        (**self).shader_info_log(shader)
    }

    fn delete_shader(&mut self, shader: Handle) -> Result<()> {
        (**self).delete_shader(shader)
    }

    fn create_program(&mut self) -> Result<RawHandle> {
        (**self).create_program()
    }

    fn attach_shader(&mut self, program: Handle, shader: Handle) -> Result<()> {
        (**self).attach_shader(program, shader)
    }

    fn detach_shader(&mut self, program: Handle, shader: Handle) -> Result<()> {
        (**self).detach_shader(program, shader)
    }

    fn bind_attrib_location(&mut self, program: Handle, index: u32, name: &str) -> Result<()> {
        (**self).bind_attrib_location(program, index, name)
    }

    fn link_program(&mut self, program: Handle) -> Result<()> {
        (**self).link_program(program)
    }

    fn program_link_status(&self, program: Handle) -> Result<bool> {
        (**self).program_link_status(program)
    }

    fn program_info_log(&self, program: Handle) -> Result<String> {
        (**self).program_info_log(program)
    }

    fn attrib_location(&self, program: Handle, name: &str) -> Result<i32> {
        (**self).attrib_location(program, name)
    }

    fn uniform_location(&self, program: Handle, name: &str) -> Result<i32> {
        (**self).uniform_location(program, name)
    }

    fn use_program(&mut self, program: Option<Handle>) -> Result<()> {
        (**self).use_program(program)
    }

    fn delete_program(&mut self, program: Handle) -> Result<()> {
        (**self).delete_program(program)
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub mod gl;

/// Creates a boxed backend that talks to the OpenGL context current on this
/// thread, resolving symbols through `loader`.
///
/// # Safety
///
/// The context must be current on the calling thread and stay current for as long
/// as the returned backend is used.
#[cfg(not(target_arch = "wasm32"))]
pub unsafe fn new<F>(loader: F) -> Result<Box<dyn GraphicsApi>>
where
    F: FnMut(&str) -> *const ::std::os::raw::c_void,
{
    let api = self::gl::api::GLApi::load_with(loader)?;
    Ok(Box::new(api))
}

pub fn new_headless() -> Box<dyn GraphicsApi> {
    Box::new(self::headless::HeadlessApi::es20())
}
