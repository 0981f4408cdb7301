use std::ffi::{CStr, CString};
use std::os::raw::c_void;
use std::ptr;

use gl::types::*;

use crate::errors::*;
use crate::objects::prelude::{BufferKind, BufferUsage, ShaderKind};

use super::super::capabilities::{Capabilities, Extensions, Operation, Version};
use super::super::{GraphicsApi, Handle, RawHandle};
use super::types;

/// `GraphicsApi` on top of the OpenGL (ES) context that is current on this thread.
pub struct GLApi {
    capabilities: Capabilities,
}

impl GLApi {
    /// Loads the function pointers through `loader` and parses the capabilities of
    /// the implementation.
    ///
    /// # Safety
    ///
    /// The context must be current on the calling thread, and every method of the
    /// returned value must be called while it stays current.
    pub unsafe fn load_with<F>(loader: F) -> Result<Self>
    where
        F: FnMut(&str) -> *const c_void,
    {
        gl::load_with(loader);

        let capabilities = parse_capabilities()?;
        info!("GLApi {:#?}", capabilities);

        capabilities.require(Operation::BufferObjects)?;
        Ok(GLApi { capabilities })
    }
}

impl GraphicsApi for GLApi {
    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    fn gen_buffer(&mut self, _: BufferKind) -> Result<RawHandle> {
        unsafe {
            let mut id = 0;
            gl::GenBuffers(1, &mut id);
            check()?;
            Ok(id)
        }
    }

    fn delete_buffers(&mut self, handles: &[Handle]) -> Result<()> {
        let ids: Vec<GLuint> = handles.iter().map(|v| v.get()).collect();

        unsafe {
            gl::DeleteBuffers(ids.len() as GLsizei, ids.as_ptr());
            check()
        }
    }

    fn bind_buffer(&mut self, target: BufferKind, handle: Option<Handle>) -> Result<()> {
        unsafe {
            gl::BindBuffer(target.into(), handle.map_or(0, |v| v.get()));
            check()
        }
    }

    fn buffer_binding(&self, target: BufferKind) -> Result<Option<Handle>> {
        unsafe {
            let mut id = 0;
            gl::GetIntegerv(types::binding_query(target), &mut id);
            check()?;
            Ok(Handle::new(id as GLuint))
        }
    }

    fn buffer_data(
        &mut self,
        target: BufferKind,
        size: usize,
        data: &[u8],
        usage: BufferUsage,
    ) -> Result<()> {
        if data.len() < size {
            return Err(Error::InvalidArgument(format!(
                "{} bytes requested from {} bytes of data",
                size,
                data.len()
            )));
        }

        let value = if data.is_empty() {
            ptr::null()
        } else {
            data.as_ptr() as *const c_void
        };

        unsafe {
            gl::BufferData(target.into(), size as GLsizeiptr, value, usage.into());
            check()
        }
    }

    fn buffer_sub_data(
        &mut self,
        target: BufferKind,
        offset: usize,
        size: usize,
        data: &[u8],
    ) -> Result<()> {
        if data.len() < size {
            return Err(Error::InvalidArgument(format!(
                "{} bytes requested from {} bytes of data",
                size,
                data.len()
            )));
        }

        if size == 0 {
            return Ok(());
        }

        unsafe {
            gl::BufferSubData(
                target.into(),
                offset as GLintptr,
                size as GLsizeiptr,
                data.as_ptr() as *const c_void,
            );

            check()
        }
    }

    fn create_shader(&mut self, kind: ShaderKind) -> Result<RawHandle> {
        unsafe {
            let id = gl::CreateShader(kind.into());
            check()?;
            Ok(id)
        }
    }

    fn shader_source(&mut self, shader: Handle, code: &str) -> Result<()> {
        let c_str = c_string(code)?;

        unsafe {
            gl::ShaderSource(shader.get(), 1, &c_str.as_ptr(), ptr::null());
            check()
        }
    }

    fn compile_shader(&mut self, shader: Handle) -> Result<()> {
        unsafe {
            gl::CompileShader(shader.get());
            check()
        }
    }

    fn shader_compile_status(&self, shader: Handle) -> Result<bool> {
        unsafe {
            let mut status = GLint::from(gl::FALSE);
            gl::GetShaderiv(shader.get(), gl::COMPILE_STATUS, &mut status);
            check()?;
            Ok(status == GLint::from(gl::TRUE))
        }
    }

    fn shader_info_log(&self, shader: Handle) -> Result<String> {
        unsafe {
            let mut len = 0;
            gl::GetShaderiv(shader.get(), gl::INFO_LOG_LENGTH, &mut len);
            check()?;

            info_log(len, |len, written, buf| {
                gl::GetShaderInfoLog(shader.get(), len, written, buf)
            })
        }
    }

    fn delete_shader(&mut self, shader: Handle) -> Result<()> {
        unsafe {
            gl::DeleteShader(shader.get());
            check()
        }
    }

    fn create_program(&mut self) -> Result<RawHandle> {
        unsafe {
            let id = gl::CreateProgram();
            check()?;
            Ok(id)
        }
    }

    fn attach_shader(&mut self, program: Handle, shader: Handle) -> Result<()> {
        unsafe {
            gl::AttachShader(program.get(), shader.get());
            check()
        }
    }

    fn detach_shader(&mut self, program: Handle, shader: Handle) -> Result<()> {
        unsafe {
            gl::DetachShader(program.get(), shader.get());
            check()
        }
    }

    fn bind_attrib_location(&mut self, program: Handle, index: u32, name: &str) -> Result<()> {
        let c_name = c_string(name)?;

        unsafe {
            gl::BindAttribLocation(program.get(), index, c_name.as_ptr());
            check()
        }
    }

    fn link_program(&mut self, program: Handle) -> Result<()> {
        unsafe {
            gl::LinkProgram(program.get());
            check()
        }
    }

    fn program_link_status(&self, program: Handle) -> Result<bool> {
        unsafe {
            let mut status = GLint::from(gl::FALSE);
            gl::GetProgramiv(program.get(), gl::LINK_STATUS, &mut status);
            check()?;
            Ok(status == GLint::from(gl::TRUE))
        }
    }

    fn program_info_log(&self, program: Handle) -> Result<String> {
        unsafe {
            let mut len = 0;
            gl::GetProgramiv(program.get(), gl::INFO_LOG_LENGTH, &mut len);
            check()?;

            info_log(len, |len, written, buf| {
                gl::GetProgramInfoLog(program.get(), len, written, buf)
            })
        }
    }

    fn attrib_location(&self, program: Handle, name: &str) -> Result<i32> {
        let c_name = c_string(name)?;

        unsafe {
            let location = gl::GetAttribLocation(program.get(), c_name.as_ptr());
            check()?;
            Ok(location)
        }
    }

    fn uniform_location(&self, program: Handle, name: &str) -> Result<i32> {
        let c_name = c_string(name)?;

        unsafe {
            let location = gl::GetUniformLocation(program.get(), c_name.as_ptr());
            check()?;
            Ok(location)
        }
    }

    fn use_program(&mut self, program: Option<Handle>) -> Result<()> {
        unsafe {
            gl::UseProgram(program.map_or(0, |v| v.get()));
            check()
        }
    }

    fn delete_program(&mut self, program: Handle) -> Result<()> {
        unsafe {
            gl::DeleteProgram(program.get());
            check()
        }
    }
}

fn c_string(s: &str) -> Result<CString> {
    CString::new(s.as_bytes())
        .map_err(|_| Error::InvalidArgument(format!("{:?} contains a nul byte", s)))
}

unsafe fn info_log<F>(len: GLint, query: F) -> Result<String>
where
    F: FnOnce(GLsizei, *mut GLsizei, *mut GLchar),
{
    if len <= 1 {
        return Ok(String::new());
    }

    let mut buf = vec![0u8; len as usize];
    let mut written: GLsizei = 0;
    query(len, &mut written, buf.as_mut_ptr() as *mut GLchar);
    check()?;

    buf.truncate(written.max(0) as usize);
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

unsafe fn parse_str(id: GLenum) -> Result<String> {
    let s = gl::GetString(id);
    if s.is_null() {
        return Err(Error::Backend(format!("[GL] String of {} is null.", id)));
    }

    Ok(CStr::from_ptr(s as *const _).to_string_lossy().into_owned())
}

unsafe fn parse_capabilities() -> Result<Capabilities> {
    let version = Version::parse_str(&parse_str(gl::VERSION)?)?;

    let names: Vec<String> = if version >= Version::GL(3, 0) {
        let mut num_extensions = 0;
        gl::GetIntegerv(gl::NUM_EXTENSIONS, &mut num_extensions);
        (0..num_extensions)
            .filter_map(|i| {
                let ext = gl::GetStringi(gl::EXTENSIONS, i as GLuint);
                if ext.is_null() {
                    None
                } else {
                    Some(CStr::from_ptr(ext as *const _).to_string_lossy().into_owned())
                }
            })
            .collect()
    } else {
        parse_str(gl::EXTENSIONS)?
            .split(' ')
            .map(|e| e.to_owned())
            .collect()
    };

    Ok(Capabilities {
        version,
        vendor: parse_str(gl::VENDOR)?,
        renderer: parse_str(gl::RENDERER)?,
        extensions: Extensions::parse(names),
    })
}

unsafe fn check() -> Result<()> {
    let msg = match gl::GetError() {
        gl::NO_ERROR => return Ok(()),
        gl::INVALID_ENUM => "[GL] An unacceptable value is specified for an enumerated argument.",
        gl::INVALID_VALUE => "[GL] A numeric argument is out of range.",
        gl::INVALID_OPERATION => "[GL] The specified operation is not allowed in the current state.",
        gl::INVALID_FRAMEBUFFER_OPERATION => {
            "[GL] The command is trying to render to or read from the framebuffer while the \
             currently bound framebuffer is not framebuffer complete."
        }
        gl::OUT_OF_MEMORY => "[GL] There is not enough memory left to execute the command.",
        _ => "[GL] Oops, Unknown OpenGL error.",
    };

    Err(Error::Backend(msg.into()))
}
