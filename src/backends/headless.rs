//! A `GraphicsApi` without any driver behind it.
//!
//! `HeadlessApi` allocates handles, tracks binding points and data store sizes,
//! pretends to compile and link shaders, and records every mutating primitive as a
//! `Call`. It mirrors the error behaviour of a real implementation closely enough
//! to exercise resource objects without a window.

use std::collections::{HashMap, VecDeque};

use crate::errors::*;
use crate::objects::prelude::{BufferKind, BufferUsage, ShaderKind};

use super::capabilities::{Capabilities, Extensions, Operation, Version};
use super::{GraphicsApi, Handle, RawHandle};

const INVALID_VALUE: &str = "[GL] A numeric argument is out of range.";
const INVALID_OPERATION: &str = "[GL] The specified operation is not allowed in the current state.";

/// A recorded primitive call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    GenBuffer(BufferKind, RawHandle),
    DeleteBuffers(Vec<Handle>),
    BindBuffer(BufferKind, Option<Handle>),
    BufferData {
        target: BufferKind,
        size: usize,
        usage: BufferUsage,
    },
    BufferSubData {
        target: BufferKind,
        offset: usize,
        size: usize,
    },
    CreateShader(ShaderKind, RawHandle),
    ShaderSource(Handle),
    CompileShader(Handle),
    DeleteShader(Handle),
    CreateProgram(RawHandle),
    AttachShader(Handle, Handle),
    DetachShader(Handle, Handle),
    BindAttribLocation(Handle, u32, String),
    LinkProgram(Handle),
    UseProgram(Option<Handle>),
    DeleteProgram(Handle),
}

#[derive(Debug, Clone)]
struct HeadlessBuffer {
    bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
struct HeadlessShader {
    kind: ShaderKind,
    source: String,
    compiled: bool,
    log: String,
    flagged: bool,
}

#[derive(Debug, Clone, Default)]
struct HeadlessProgram {
    attached: Vec<Handle>,
    bound_attributes: HashMap<String, u32>,
    attributes: HashMap<String, i32>,
    uniforms: HashMap<String, i32>,
    linked: bool,
    log: String,
}

pub struct HeadlessApi {
    capabilities: Capabilities,
    next: RawHandle,
    fail_next_allocation: bool,
    link_rejections: VecDeque<String>,
    calls: Vec<Call>,
    array: Option<Handle>,
    element_array: Option<Handle>,
    program: Option<Handle>,
    buffers: HashMap<Handle, HeadlessBuffer>,
    shaders: HashMap<Handle, HeadlessShader>,
    programs: HashMap<Handle, HeadlessProgram>,
}

impl HeadlessApi {
    pub fn new(version: Version) -> Self {
        HeadlessApi {
            capabilities: Capabilities::new(version),
            next: 1,
            fail_next_allocation: false,
            link_rejections: VecDeque::new(),
            calls: Vec::new(),
            array: None,
            element_array: None,
            program: None,
            buffers: HashMap::new(),
            shaders: HashMap::new(),
            programs: HashMap::new(),
        }
    }

    /// An implementation of `version` that reports the extensions in `names`.
    pub fn with_extensions<I, S>(version: Version, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut api = Self::new(version);
        api.capabilities.extensions = Extensions::parse(names);
        api
    }

    /// An OpenGL ES 1.1 implementation, which has no programmable pipeline.
    pub fn es11() -> Self {
        Self::new(Version::ES(1, 1))
    }

    /// An OpenGL ES 2.0 implementation.
    pub fn es20() -> Self {
        Self::new(Version::ES(2, 0))
    }

    /// Makes the next `gen_buffer`, `create_shader` or `create_program` return
    /// zero, as a driver does when it runs out of names.
    pub fn fail_next_allocation(&mut self) {
        self.fail_next_allocation = true;
    }

    /// Makes the next `link_program` fail with `log`, regardless of the attached
    /// shaders.
    pub fn reject_next_link<T: Into<String>>(&mut self, log: T) {
        self.link_rejections.push_back(log.into());
    }

    /// All the mutating calls issued so far, in order.
    #[inline]
    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    /// Counts the recorded calls matching `predicate`.
    pub fn count<F>(&self, predicate: F) -> usize
    where
        F: Fn(&Call) -> bool,
    {
        self.calls.iter().filter(|v| predicate(v)).count()
    }

    #[inline]
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Returns the bytes of the data store of `buffer`.
    pub fn buffer_bytes(&self, buffer: Handle) -> Option<&[u8]> {
        self.buffers.get(&buffer).map(|v| &v.bytes[..])
    }

    /// Returns the last source code passed to `shader`.
    pub fn shader_code(&self, shader: Handle) -> Option<&str> {
        self.shaders.get(&shader).map(|v| &v.source[..])
    }

    /// Whether `handle` names a live object of any type. Shaders that are deleted
    /// while still attached to a program are not alive.
    pub fn is_alive(&self, handle: Handle) -> bool {
        self.buffers.contains_key(&handle)
            || self.shaders.get(&handle).map_or(false, |v| !v.flagged)
            || self.programs.contains_key(&handle)
    }

    fn allocate(&mut self) -> RawHandle {
        if self.fail_next_allocation {
            self.fail_next_allocation = false;
            return 0;
        }

        let id = self.next;
        self.next += 1;
        id
    }

    fn binding(&mut self, target: BufferKind) -> &mut Option<Handle> {
        match target {
            BufferKind::Array => &mut self.array,
            BufferKind::ElementArray => &mut self.element_array,
        }
    }

    fn bound_buffer_mut(&mut self, target: BufferKind) -> Result<&mut HeadlessBuffer> {
        let handle = (*self.binding(target))
            .ok_or_else(|| Error::Backend(format!("[Headless] No buffer bound to {:?}.", target)))?;

        self.buffers
            .get_mut(&handle)
            .ok_or_else(|| Error::Backend(format!("[Headless] {} is invalid.", handle)))
    }

    fn shader(&self, handle: Handle) -> Result<&HeadlessShader> {
        self.shaders
            .get(&handle)
            .ok_or_else(|| Error::Backend(format!("[Headless] Shader {} is invalid.", handle)))
    }

    fn program(&self, handle: Handle) -> Result<&HeadlessProgram> {
        self.programs
            .get(&handle)
            .ok_or_else(|| Error::Backend(format!("[Headless] Program {} is invalid.", handle)))
    }

    fn program_mut(&mut self, handle: Handle) -> Result<&mut HeadlessProgram> {
        self.programs
            .get_mut(&handle)
            .ok_or_else(|| Error::Backend(format!("[Headless] Program {} is invalid.", handle)))
    }

    /// Frees the shaders flagged for deletion once no program references them.
    fn release_flagged_shaders(&mut self) {
        let programs = &self.programs;
        self.shaders
            .retain(|k, v| !v.flagged || programs.values().any(|p| p.attached.contains(k)));
    }

    fn link(&self, program: &HeadlessProgram) -> ::std::result::Result<(), String> {
        let mut vs = false;
        let mut fs = false;

        for handle in &program.attached {
            let shader = match self.shaders.get(handle) {
                Some(v) => v,
                None => return Err(format!("Attached shader {} does not exist.", handle)),
            };

            if !shader.compiled {
                return Err(format!("Attached shader {} is not compiled.", handle));
            }

            match shader.kind {
                ShaderKind::Vertex => vs = true,
                ShaderKind::Fragment => fs = true,
            }
        }

        if !vs {
            return Err("No compiled vertex shader attached.".into());
        }

        if !fs {
            return Err("No compiled fragment shader attached.".into());
        }

        Ok(())
    }
}

/// Extracts the names declared with `qualifier` (`attribute` or `uniform`) from
/// GLSL source code.
fn declarations<'a>(source: &'a str, qualifier: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    source.split(';').filter_map(move |statement| {
        let mut tokens = statement.split_whitespace();
        if tokens.next() != Some(qualifier) {
            return None;
        }

        tokens
            .last()
            .map(|name| name.split('[').next().unwrap_or(name))
    })
}

impl GraphicsApi for HeadlessApi {
    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    fn gen_buffer(&mut self, target: BufferKind) -> Result<RawHandle> {
        self.capabilities.require(Operation::BufferObjects)?;

        let id = self.allocate();
        self.calls.push(Call::GenBuffer(target, id));

        if let Some(handle) = Handle::new(id) {
            self.buffers.insert(handle, HeadlessBuffer { bytes: Vec::new() });
        }

        Ok(id)
    }

    fn delete_buffers(&mut self, handles: &[Handle]) -> Result<()> {
        self.calls.push(Call::DeleteBuffers(handles.to_vec()));

        for handle in handles {
            // Unused names are silently ignored.
            self.buffers.remove(handle);

            if self.array == Some(*handle) {
                self.array = None;
            }

            if self.element_array == Some(*handle) {
                self.element_array = None;
            }
        }

        Ok(())
    }

    fn bind_buffer(&mut self, target: BufferKind, handle: Option<Handle>) -> Result<()> {
        self.calls.push(Call::BindBuffer(target, handle));

        if let Some(handle) = handle {
            if !self.buffers.contains_key(&handle) {
                return Err(Error::Backend(format!("[Headless] {} is invalid.", handle)));
            }
        }

        *self.binding(target) = handle;
        Ok(())
    }

    fn buffer_binding(&self, target: BufferKind) -> Result<Option<Handle>> {
        match target {
            BufferKind::Array => Ok(self.array),
            BufferKind::ElementArray => Ok(self.element_array),
        }
    }

    fn buffer_data(
        &mut self,
        target: BufferKind,
        size: usize,
        data: &[u8],
        usage: BufferUsage,
    ) -> Result<()> {
        self.calls.push(Call::BufferData {
            target,
            size,
            usage,
        });

        if data.len() < size {
            return Err(Error::Backend(format!(
                "[Headless] {} bytes requested from {} bytes of data.",
                size,
                data.len()
            )));
        }

        let buffer = self.bound_buffer_mut(target)?;
        buffer.bytes = data[..size].to_vec();
        Ok(())
    }

    fn buffer_sub_data(
        &mut self,
        target: BufferKind,
        offset: usize,
        size: usize,
        data: &[u8],
    ) -> Result<()> {
        self.calls.push(Call::BufferSubData {
            target,
            offset,
            size,
        });

        let buffer = self.bound_buffer_mut(target)?;
        if offset + size > buffer.bytes.len() || data.len() < size {
            return Err(Error::Backend(INVALID_VALUE.into()));
        }

        buffer.bytes[offset..offset + size].copy_from_slice(&data[..size]);
        Ok(())
    }

    fn create_shader(&mut self, kind: ShaderKind) -> Result<RawHandle> {
        self.capabilities.require(Operation::ShaderObjects)?;

        let id = self.allocate();
        self.calls.push(Call::CreateShader(kind, id));

        if let Some(handle) = Handle::new(id) {
            let shader = HeadlessShader {
                kind,
                source: String::new(),
                compiled: false,
                log: String::new(),
                flagged: false,
            };

            self.shaders.insert(handle, shader);
        }

        Ok(id)
    }

    fn shader_source(&mut self, shader: Handle, code: &str) -> Result<()> {
        self.calls.push(Call::ShaderSource(shader));

        let shader = self
            .shaders
            .get_mut(&shader)
            .ok_or_else(|| Error::Backend(format!("[Headless] Shader {} is invalid.", shader)))?;

        shader.source = code.to_owned();
        Ok(())
    }

    fn compile_shader(&mut self, shader: Handle) -> Result<()> {
        self.calls.push(Call::CompileShader(shader));

        let shader = self
            .shaders
            .get_mut(&shader)
            .ok_or_else(|| Error::Backend(format!("[Headless] Shader {} is invalid.", shader)))?;

        if shader.source.trim().is_empty() {
            shader.compiled = false;
            shader.log = "ERROR: 0:1: '' : syntax error: empty source".into();
        } else if shader.source.contains("#error") {
            shader.compiled = false;
            shader.log = "ERROR: 0:1: '#error' : preprocessor error".into();
        } else {
            shader.compiled = true;
            shader.log.clear();
        }

        Ok(())
    }

    fn shader_compile_status(&self, shader: Handle) -> Result<bool> {
        Ok(self.shader(shader)?.compiled)
    }

    fn shader_info_log(&self, shader: Handle) -> Result<String> {
        Ok(self.shader(shader)?.log.clone())
    }

    fn delete_shader(&mut self, shader: Handle) -> Result<()> {
        self.calls.push(Call::DeleteShader(shader));

        if let Some(v) = self.shaders.get_mut(&shader) {
            v.flagged = true;
        }

        self.release_flagged_shaders();
        Ok(())
    }

    fn create_program(&mut self) -> Result<RawHandle> {
        self.capabilities.require(Operation::ProgramObjects)?;

        let id = self.allocate();
        self.calls.push(Call::CreateProgram(id));

        if let Some(handle) = Handle::new(id) {
            self.programs.insert(handle, HeadlessProgram::default());
        }

        Ok(id)
    }

    fn attach_shader(&mut self, program: Handle, shader: Handle) -> Result<()> {
        self.calls.push(Call::AttachShader(program, shader));

        self.shader(shader)?;
        let program = self.program_mut(program)?;
        if program.attached.contains(&shader) {
            return Err(Error::Backend(INVALID_OPERATION.into()));
        }

        program.attached.push(shader);
        Ok(())
    }

    fn detach_shader(&mut self, program: Handle, shader: Handle) -> Result<()> {
        self.calls.push(Call::DetachShader(program, shader));

        let program = self.program_mut(program)?;
        let index = program
            .attached
            .iter()
            .position(|&v| v == shader)
            .ok_or_else(|| Error::Backend(INVALID_OPERATION.into()))?;

        program.attached.remove(index);
        self.release_flagged_shaders();
        Ok(())
    }

    fn bind_attrib_location(&mut self, program: Handle, index: u32, name: &str) -> Result<()> {
        self.calls.push(Call::BindAttribLocation(program, index, name.to_owned()));

        let program = self.program_mut(program)?;
        program.bound_attributes.insert(name.to_owned(), index);
        Ok(())
    }

    fn link_program(&mut self, handle: Handle) -> Result<()> {
        self.calls.push(Call::LinkProgram(handle));

        let result = match self.link_rejections.pop_front() {
            Some(log) => Err(log),
            None => self.link(self.program(handle)?),
        };

        let mut attributes = HashMap::new();
        let mut uniforms = HashMap::new();

        if result.is_ok() {
            let program = self.program(handle)?;
            let mut next = 0;

            for shader in program.attached.iter().filter_map(|v| self.shaders.get(v)) {
                if shader.kind == ShaderKind::Vertex {
                    for name in declarations(&shader.source, "attribute") {
                        let location = match program.bound_attributes.get(name) {
                            Some(&v) => v as i32,
                            None => {
                                while program.bound_attributes.values().any(|&v| v == next) {
                                    next += 1;
                                }

                                let location = next;
                                next += 1;
                                location as i32
                            }
                        };

                        attributes.insert(name.to_owned(), location);
                    }
                }

                for name in declarations(&shader.source, "uniform") {
                    let location = uniforms.len() as i32;
                    uniforms.entry(name.to_owned()).or_insert(location);
                }
            }
        }

        let program = self.program_mut(handle)?;
        match result {
            Ok(_) => {
                program.linked = true;
                program.log.clear();
                program.attributes = attributes;
                program.uniforms = uniforms;
            }
            Err(log) => {
                program.linked = false;
                program.log = log;
                program.attributes.clear();
                program.uniforms.clear();
            }
        }

        Ok(())
    }

    fn program_link_status(&self, program: Handle) -> Result<bool> {
        Ok(self.program(program)?.linked)
    }

    fn program_info_log(&self, program: Handle) -> Result<String> {
        Ok(self.program(program)?.log.clone())
    }

    fn attrib_location(&self, program: Handle, name: &str) -> Result<i32> {
        let program = self.program(program)?;
        Ok(program.attributes.get(name).cloned().unwrap_or(-1))
    }

    fn uniform_location(&self, program: Handle, name: &str) -> Result<i32> {
        let program = self.program(program)?;
        Ok(program.uniforms.get(name).cloned().unwrap_or(-1))
    }

    fn use_program(&mut self, program: Option<Handle>) -> Result<()> {
        self.calls.push(Call::UseProgram(program));

        if let Some(handle) = program {
            if !self.program(handle)?.linked {
                return Err(Error::Backend(INVALID_OPERATION.into()));
            }
        }

        self.program = program;
        Ok(())
    }

    fn delete_program(&mut self, program: Handle) -> Result<()> {
        self.calls.push(Call::DeleteProgram(program));
        self.programs.remove(&program);
        self.release_flagged_shaders();

        if self.program == Some(program) {
            self.program = None;
        }

        Ok(())
    }
}
