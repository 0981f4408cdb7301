//! Shader objects.

use crate::backends::capabilities::Operation;
use crate::backends::{GraphicsApi, Handle};
use crate::context::Context;
use crate::errors::*;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum ShaderKind {
    /// `GL_VERTEX_SHADER`.
    Vertex,
    /// `GL_FRAGMENT_SHADER`.
    Fragment,
}

/// The lifecycle of a shader. Whether the shader compiled is reported by
/// `Shader::compile` and `Shader::compile_status` instead of being a state.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ShaderState {
    Created,
    Deleted,
}

#[derive(Debug)]
pub struct Shader {
    kind: ShaderKind,
    handle: Handle,
    state: ShaderState,
    leak_warnings: bool,
}

impl Shader {
    /// Creates a shader object of `kind` with `glCreateShader`.
    pub fn new<A: GraphicsApi>(ctx: &mut Context<A>, kind: ShaderKind) -> Result<Self> {
        ctx.require(Operation::ShaderObjects)?;

        let raw = ctx.api_mut().create_shader(kind)?;
        let handle = Handle::new(raw).ok_or_else(|| {
            Error::ResourceCreation(format!("{:?} shader, glCreateShader() returns {}", kind, raw))
        })?;

        info!("[Shader] creates {:?} shader {}.", kind, handle);

        Ok(Shader {
            kind,
            handle,
            state: ShaderState::Created,
            leak_warnings: ctx.params().leak_warnings,
        })
    }

    #[inline]
    pub fn vertex<A: GraphicsApi>(ctx: &mut Context<A>) -> Result<Self> {
        Self::new(ctx, ShaderKind::Vertex)
    }

    #[inline]
    pub fn fragment<A: GraphicsApi>(ctx: &mut Context<A>) -> Result<Self> {
        Self::new(ctx, ShaderKind::Fragment)
    }

    #[inline]
    pub fn kind(&self) -> ShaderKind {
        self.kind
    }

    #[inline]
    pub fn handle(&self) -> Handle {
        self.handle
    }

    #[inline]
    pub fn state(&self) -> ShaderState {
        self.state
    }

    /// Replaces the source code with `glShaderSource`.
    pub fn set_source<A: GraphicsApi>(
        &mut self,
        ctx: &mut Context<A>,
        code: &str,
    ) -> Result<&mut Self> {
        self.ensure_alive()?;
        ctx.api_mut().shader_source(self.handle, code)?;
        Ok(self)
    }

    /// Compiles the source code with `glCompileShader`. A failed compilation
    /// returns `Error::Compile` with the info log of the shader.
    pub fn compile<A: GraphicsApi>(&mut self, ctx: &mut Context<A>) -> Result<&mut Self> {
        self.ensure_alive()?;

        ctx.api_mut().compile_shader(self.handle)?;
        if !ctx.api().shader_compile_status(self.handle)? {
            let log = ctx.api().shader_info_log(self.handle)?;
            debug!("[Shader] failed to compile {}: {}", self.handle, log);
            return Err(Error::Compile(log));
        }

        debug!("[Shader] compiles {:?} shader {}.", self.kind, self.handle);
        Ok(self)
    }

    /// Whether the last compilation succeeded.
    pub fn compile_status<A: GraphicsApi>(&self, ctx: &Context<A>) -> Result<bool> {
        self.ensure_alive()?;
        ctx.api().shader_compile_status(self.handle)
    }

    pub fn info_log<A: GraphicsApi>(&self, ctx: &Context<A>) -> Result<String> {
        self.ensure_alive()?;
        ctx.api().shader_info_log(self.handle)
    }

    /// Deletes the shader object with `glDeleteShader`. Programs this shader is
    /// attached to keep their attachments. Deleting a deleted shader does nothing.
    pub fn delete<A: GraphicsApi>(&mut self, ctx: &mut Context<A>) -> Result<&mut Self> {
        if self.state == ShaderState::Deleted {
            return Ok(self);
        }

        ctx.api_mut().delete_shader(self.handle)?;
        self.state = ShaderState::Deleted;

        info!("[Shader] deletes {:?} shader {}.", self.kind, self.handle);
        Ok(self)
    }

    fn ensure_alive(&self) -> Result<()> {
        if self.state == ShaderState::Deleted {
            return Err(Error::InvalidState(format!(
                "Shader {} has already been deleted",
                self.handle
            )));
        }

        Ok(())
    }
}

impl Drop for Shader {
    fn drop(&mut self) {
        if self.leak_warnings && self.state != ShaderState::Deleted {
            warn!(
                "[Shader] {:?} shader {} dropped without being deleted.",
                self.kind, self.handle
            );
        }
    }
}
