//! The graphics context that resource objects are created in.
//!
//! OpenGL keeps one binding point per buffer target and one current program for
//! the whole context. `Context` owns a shadow of that state next to the
//! `GraphicsApi` implementation, so every resource object checks and updates the
//! same binding points without any global mutable state. Independent contexts
//! never observe each other's bindings.
//!
//! A `Context` is not synchronized. It must only be used from the thread that
//! owns the native context.

use crate::backends::capabilities::{Capabilities, Operation};
use crate::backends::{GraphicsApi, Handle};
use crate::errors::*;
use crate::objects::prelude::BufferKind;
use crate::settings::ContextParams;

/// The objects currently bound to the binding points of a context.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Bindings {
    pub array: Option<Handle>,
    pub element_array: Option<Handle>,
    pub program: Option<Handle>,
}

impl Bindings {
    /// Returns the buffer bound to the binding point of `kind`.
    #[inline]
    pub fn buffer(&self, kind: BufferKind) -> Option<Handle> {
        match kind {
            BufferKind::Array => self.array,
            BufferKind::ElementArray => self.element_array,
        }
    }

    #[inline]
    fn buffer_mut(&mut self, kind: BufferKind) -> &mut Option<Handle> {
        match kind {
            BufferKind::Array => &mut self.array,
            BufferKind::ElementArray => &mut self.element_array,
        }
    }
}

pub struct Context<A: GraphicsApi> {
    api: A,
    params: ContextParams,
    bindings: Bindings,
}

impl<A: GraphicsApi> Context<A> {
    /// Creates a context with default params, assuming nothing is bound yet.
    pub fn new(api: A) -> Self {
        Context {
            api,
            params: ContextParams::default(),
            bindings: Bindings::default(),
        }
    }

    /// Creates a context with `params`.
    pub fn with_params(api: A, params: ContextParams) -> Result<Self> {
        let mut ctx = Context {
            api,
            params,
            bindings: Bindings::default(),
        };

        if params.verify_bindings {
            ctx.sync_bindings()?;
        }

        info!(
            "Creates context on {} with {:?}.",
            ctx.api.capabilities().version,
            params
        );

        Ok(ctx)
    }

    #[inline]
    pub fn params(&self) -> &ContextParams {
        &self.params
    }

    #[inline]
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Gives direct access to the primitives. Bindings changed through this
    /// reference are not observed until `sync_bindings` is called.
    #[inline]
    pub fn api_mut(&mut self) -> &mut A {
        &mut self.api
    }

    #[inline]
    pub fn capabilities(&self) -> &Capabilities {
        self.api.capabilities()
    }

    #[inline]
    pub fn supports(&self, op: Operation) -> bool {
        self.api.supports(op)
    }

    /// Fails with `Error::Requirement` if the primitives of `op` are not available.
    pub fn require(&self, op: Operation) -> Result<()> {
        if self.api.supports(op) {
            Ok(())
        } else {
            Err(Error::Requirement(format!(
                "{} ({})",
                op,
                self.api.capabilities().version
            )))
        }
    }

    #[inline]
    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    /// Returns the buffer bound to the binding point of `kind`.
    #[inline]
    pub fn bound_buffer(&self, kind: BufferKind) -> Option<Handle> {
        self.bindings.buffer(kind)
    }

    /// Returns the program installed by the last successful `use_program`.
    #[inline]
    pub fn current_program(&self) -> Option<Handle> {
        self.bindings.program
    }

    /// Refreshes the buffer binding points from the implementation.
    pub fn sync_bindings(&mut self) -> Result<()> {
        self.bindings.array = self.api.buffer_binding(BufferKind::Array)?;
        self.bindings.element_array = self.api.buffer_binding(BufferKind::ElementArray)?;
        Ok(())
    }

    pub(crate) fn bind_buffer(&mut self, kind: BufferKind, handle: Handle) -> Result<()> {
        self.api.bind_buffer(kind, Some(handle))?;
        *self.bindings.buffer_mut(kind) = Some(handle);
        Ok(())
    }

    /// Deleting a bound buffer reverts its binding point to zero.
    pub(crate) fn forget_buffer(&mut self, kind: BufferKind, handle: Handle) {
        let binding = self.bindings.buffer_mut(kind);
        if *binding == Some(handle) {
            *binding = None;
        }
    }

    pub(crate) fn use_program(&mut self, handle: Handle) -> Result<()> {
        self.api.use_program(Some(handle))?;
        self.bindings.program = Some(handle);
        Ok(())
    }

    pub(crate) fn forget_program(&mut self, handle: Handle) {
        if self.bindings.program == Some(handle) {
            self.bindings.program = None;
        }
    }
}

impl Context<Box<dyn GraphicsApi>> {
    /// Creates a context on top of the headless backend.
    pub fn headless() -> Self {
        Context::new(crate::backends::new_headless())
    }
}
