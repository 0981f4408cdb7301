//! Program objects, which link shaders into an executable pipeline.

use std::cell::RefCell;
use std::collections::HashMap;

use smallvec::SmallVec;

use crate::backends::capabilities::Operation;
use crate::backends::{GraphicsApi, Handle};
use crate::context::Context;
use crate::errors::*;

use super::shader::{Shader, ShaderState};

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ProgramState {
    /// The program needs linking before use.
    NeedsLinking,
    /// The program has been linked successfully.
    Linked,
    /// The program has been deleted.
    Deleted,
}

/// A program object. Shaders are attached by reference, the program never owns
/// their lifetime, and one shader could be attached to many programs.
#[derive(Debug)]
pub struct Program {
    handle: Handle,
    state: ProgramState,
    attached: SmallVec<[Handle; 4]>,
    attributes: RefCell<HashMap<String, Option<u32>>>,
    uniforms: RefCell<HashMap<String, Option<i32>>>,
    leak_warnings: bool,
}

impl Program {
    /// Creates a program object with `glCreateProgram`.
    pub fn new<A: GraphicsApi>(ctx: &mut Context<A>) -> Result<Self> {
        ctx.require(Operation::ProgramObjects)?;

        let raw = ctx.api_mut().create_program()?;
        let handle = Handle::new(raw).ok_or_else(|| {
            Error::ResourceCreation(format!("program, glCreateProgram() returns {}", raw))
        })?;

        info!("[Program] creates program {}.", handle);

        Ok(Program {
            handle,
            state: ProgramState::NeedsLinking,
            attached: SmallVec::new(),
            attributes: RefCell::new(HashMap::new()),
            uniforms: RefCell::new(HashMap::new()),
            leak_warnings: ctx.params().leak_warnings,
        })
    }

    #[inline]
    pub fn handle(&self) -> Handle {
        self.handle
    }

    #[inline]
    pub fn state(&self) -> ProgramState {
        self.state
    }

    /// Handles of the attached shaders, in attaching order.
    #[inline]
    pub fn attached_shaders(&self) -> &[Handle] {
        &self.attached
    }

    #[inline]
    pub fn is_attached(&self, shader: &Shader) -> bool {
        self.attached.contains(&shader.handle())
    }

    /// Attaches `shader` with `glAttachShader`. Attaching an attached shader does
    /// nothing. The program must be linked again for the change to take effect.
    pub fn attach<A: GraphicsApi>(
        &mut self,
        ctx: &mut Context<A>,
        shader: &Shader,
    ) -> Result<&mut Self> {
        self.ensure_alive()?;

        if shader.state() == ShaderState::Deleted {
            return Err(Error::InvalidState(format!(
                "Can not attach deleted shader {} to program {}",
                shader.handle(),
                self.handle
            )));
        }

        if self.is_attached(shader) {
            return Ok(self);
        }

        ctx.api_mut().attach_shader(self.handle, shader.handle())?;
        self.attached.push(shader.handle());
        Ok(self)
    }

    /// Detaches `shader` with `glDetachShader`.
    pub fn detach<A: GraphicsApi>(
        &mut self,
        ctx: &mut Context<A>,
        shader: &Shader,
    ) -> Result<&mut Self> {
        self.ensure_alive()?;

        let index = self
            .attached
            .iter()
            .position(|&v| v == shader.handle())
            .ok_or_else(|| {
                Error::InvalidState(format!(
                    "Shader {} is not attached to program {}",
                    shader.handle(),
                    self.handle
                ))
            })?;

        ctx.api_mut().detach_shader(self.handle, shader.handle())?;
        self.attached.remove(index);
        Ok(self)
    }

    /// Associates a generic vertex attribute index with `name`. It takes effect
    /// on the next `link`.
    pub fn bind_attribute_location<A: GraphicsApi>(
        &mut self,
        ctx: &mut Context<A>,
        index: u32,
        name: &str,
    ) -> Result<&mut Self> {
        self.ensure_alive()?;
        ctx.api_mut().bind_attrib_location(self.handle, index, name)?;
        Ok(self)
    }

    /// Links the attached shaders with `glLinkProgram`.
    ///
    /// On failure `Error::Link` carries the info log of the program, and the state
    /// stays unchanged so the program could be linked again after fixing the
    /// attachments. A failed re-link of a `Linked` program still discards its
    /// executable on the native side, so `use_program` fails with
    /// `Error::Backend` until the next successful link.
    ///
    /// Cached locations are discarded on every attempt.
    pub fn link<A: GraphicsApi>(&mut self, ctx: &mut Context<A>) -> Result<&mut Self> {
        self.ensure_alive()?;

        self.attributes.borrow_mut().clear();
        self.uniforms.borrow_mut().clear();

        ctx.api_mut().link_program(self.handle)?;
        if !ctx.api().program_link_status(self.handle)? {
            let log = ctx.api().program_info_log(self.handle)?;
            debug!("[Program] failed to link {}: {}", self.handle, log);
            return Err(Error::Link(log));
        }

        self.state = ProgramState::Linked;

        debug!("[Program] links program {}.", self.handle);
        Ok(self)
    }

    /// Installs this program as part of the current rendering state with
    /// `glUseProgram`.
    ///
    /// Requires `ProgramState::Linked`. The driver rejects a program whose last
    /// link attempt failed even though its state is still `Linked`, which shows up
    /// as `Error::Backend`.
    pub fn use_program<A: GraphicsApi>(&mut self, ctx: &mut Context<A>) -> Result<&mut Self> {
        self.ensure_linked()?;
        ctx.use_program(self.handle)?;
        Ok(self)
    }

    /// Returns the location of the attribute variable `name`, `None` if it is not
    /// an active attribute. Locations are cached until the next `link`.
    pub fn attribute_location<A: GraphicsApi>(
        &self,
        ctx: &Context<A>,
        name: &str,
    ) -> Result<Option<u32>> {
        self.ensure_linked()?;

        if let Some(location) = self.attributes.borrow().get(name).cloned() {
            return Ok(location);
        }

        let location = ctx.api().attrib_location(self.handle, name)?;
        let location = if location < 0 {
            None
        } else {
            Some(location as u32)
        };

        self.attributes.borrow_mut().insert(name.to_owned(), location);
        Ok(location)
    }

    /// Returns the location of the uniform variable `name`, `None` if it is not
    /// an active uniform. Locations are cached until the next `link`.
    pub fn uniform_location<A: GraphicsApi>(
        &self,
        ctx: &Context<A>,
        name: &str,
    ) -> Result<Option<i32>> {
        self.ensure_linked()?;

        if let Some(location) = self.uniforms.borrow().get(name).cloned() {
            return Ok(location);
        }

        let location = ctx.api().uniform_location(self.handle, name)?;
        let location = if location < 0 { None } else { Some(location) };

        self.uniforms.borrow_mut().insert(name.to_owned(), location);
        Ok(location)
    }

    pub fn info_log<A: GraphicsApi>(&self, ctx: &Context<A>) -> Result<String> {
        self.ensure_alive()?;
        ctx.api().program_info_log(self.handle)
    }

    /// Deletes the program object with `glDeleteProgram`. Deleting a deleted
    /// program does nothing.
    pub fn delete<A: GraphicsApi>(&mut self, ctx: &mut Context<A>) -> Result<&mut Self> {
        if self.state == ProgramState::Deleted {
            return Ok(self);
        }

        ctx.api_mut().delete_program(self.handle)?;
        ctx.forget_program(self.handle);

        self.attached.clear();
        self.attributes.borrow_mut().clear();
        self.uniforms.borrow_mut().clear();
        self.state = ProgramState::Deleted;

        info!("[Program] deletes program {}.", self.handle);
        Ok(self)
    }

    fn ensure_alive(&self) -> Result<()> {
        if self.state == ProgramState::Deleted {
            return Err(Error::InvalidState(format!(
                "Program {} has already been deleted",
                self.handle
            )));
        }

        Ok(())
    }

    fn ensure_linked(&self) -> Result<()> {
        self.ensure_alive()?;

        if self.state != ProgramState::Linked {
            return Err(Error::InvalidState(format!(
                "Program {} needs linking before use",
                self.handle
            )));
        }

        Ok(())
    }
}

impl Drop for Program {
    fn drop(&mut self) {
        if self.leak_warnings && self.state != ProgramState::Deleted {
            warn!("[Program] {} dropped without being deleted.", self.handle);
        }
    }
}
