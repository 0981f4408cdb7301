//! Vertex buffer objects.
//!
//! ```ignore
//! let mut ctx = Context::headless();
//!
//! // Creates and binds an array buffer.
//! let mut vb = VertexBuffer::array(&mut ctx)?;
//! vb.bind(&mut ctx)?;
//!
//! // Uploads all the elements with `BufferUsage::Static`.
//! vb.upload(&mut ctx, &[0.0f32, 1.0, 0.0, 1.0], None, None)?;
//!
//! vb.delete(&mut ctx)?;
//! ```

use crate::backends::capabilities::Operation;
use crate::backends::{GraphicsApi, Handle};
use crate::context::Context;
use crate::errors::*;

use super::element::{self, Element, ElementKind};

/// The binding target of a buffer object.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum BufferKind {
    /// `GL_ARRAY_BUFFER`, vertex attributes.
    Array,
    /// `GL_ELEMENT_ARRAY_BUFFER`, vertex indices.
    ElementArray,
}

/// Hint about the intended update strategy of the data. It affects performance
/// only, never correctness.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum BufferUsage {
    /// The data will be specified once and used many times.
    Static,
    /// The data will be respecified repeatedly and used many times.
    Dynamic,
    /// The data will be specified once and used at most a few times.
    Stream,
}

impl Default for BufferUsage {
    fn default() -> Self {
        BufferUsage::Static
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BufferState {
    Created,
    Deleted,
}

/// A buffer object which exclusively owns its native handle.
///
/// The binding point of a buffer kind is shared by the whole context, so binding a
/// buffer replaces whatever buffer of the same kind was bound before.
#[derive(Debug)]
pub struct VertexBuffer {
    kind: BufferKind,
    handle: Handle,
    state: BufferState,
    element_kind: Option<ElementKind>,
    capacity: usize,
    leak_warnings: bool,
}

impl VertexBuffer {
    /// Creates a buffer object of `kind` with `glGenBuffers`.
    pub fn new<A: GraphicsApi>(ctx: &mut Context<A>, kind: BufferKind) -> Result<Self> {
        ctx.require(Operation::BufferObjects)?;

        let raw = ctx.api_mut().gen_buffer(kind)?;
        let handle = Handle::new(raw).ok_or_else(|| {
            Error::ResourceCreation(format!("{:?} buffer, glGenBuffers() returns {}", kind, raw))
        })?;

        info!("[VertexBuffer] creates {:?} buffer {}.", kind, handle);

        Ok(VertexBuffer {
            kind,
            handle,
            state: BufferState::Created,
            element_kind: None,
            capacity: 0,
            leak_warnings: ctx.params().leak_warnings,
        })
    }

    /// Creates a `GL_ARRAY_BUFFER` buffer object.
    #[inline]
    pub fn array<A: GraphicsApi>(ctx: &mut Context<A>) -> Result<Self> {
        Self::new(ctx, BufferKind::Array)
    }

    /// Creates a `GL_ELEMENT_ARRAY_BUFFER` buffer object.
    #[inline]
    pub fn element_array<A: GraphicsApi>(ctx: &mut Context<A>) -> Result<Self> {
        Self::new(ctx, BufferKind::ElementArray)
    }

    #[inline]
    pub fn kind(&self) -> BufferKind {
        self.kind
    }

    #[inline]
    pub fn handle(&self) -> Handle {
        self.handle
    }

    #[inline]
    pub fn state(&self) -> BufferState {
        self.state
    }

    /// The element kind of the data passed to the last successful `upload`,
    /// `None` if nothing has been uploaded yet.
    #[inline]
    pub fn element_kind(&self) -> Option<ElementKind> {
        self.element_kind
    }

    /// The size in bytes of the data store allocated by the last `upload`.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Checks if this buffer is the one bound to the binding point of its kind.
    #[inline]
    pub fn is_bound<A: GraphicsApi>(&self, ctx: &Context<A>) -> bool {
        self.state != BufferState::Deleted && ctx.bound_buffer(self.kind) == Some(self.handle)
    }

    /// Binds this buffer with `glBindBuffer`.
    pub fn bind<A: GraphicsApi>(&mut self, ctx: &mut Context<A>) -> Result<&mut Self> {
        self.ensure_alive()?;
        ctx.bind_buffer(self.kind, self.handle)?;
        Ok(self)
    }

    /// Creates the data store of this buffer with `glBufferData`.
    ///
    /// `count` is the number of elements (not bytes) to upload, all of `data` with
    /// `None`. `usage` defaults to `BufferUsage::Static`. `u32` indices in an
    /// element array buffer need `Operation::UIntElementIndices`.
    ///
    /// **Rebinds implicitly.** If this buffer is not bound, it is bound before the
    /// upload, which silently replaces any other buffer of the same kind on the
    /// binding point. Callers that rely on another buffer staying bound must bind
    /// it again afterwards.
    ///
    /// **Whether this buffer is bound is read from the `Context`.** A buffer bound
    /// through `Context::api_mut` is invisible to that check, so the data would
    /// land in whatever buffer the native binding point holds. Call
    /// `Context::sync_bindings` after binding behind the back of the context.
    pub fn upload<A, T, C, U>(
        &mut self,
        ctx: &mut Context<A>,
        data: &[T],
        count: C,
        usage: U,
    ) -> Result<&mut Self>
    where
        A: GraphicsApi,
        T: Element,
        C: Into<Option<usize>>,
        U: Into<Option<BufferUsage>>,
    {
        self.ensure_alive()?;
        self.ensure_element::<A, T>(ctx)?;

        let count = Self::count(data, count.into())?;
        let size = Self::bytes::<T>(count)?;
        let usage = usage.into().unwrap_or_default();

        if !self.is_bound(ctx) {
            if ctx.params().rebind_warnings {
                if let Some(prev) = ctx.bound_buffer(self.kind) {
                    warn!(
                        "[VertexBuffer] uploading into {} replaces the bound {:?} buffer {}.",
                        self.handle, self.kind, prev
                    );
                }
            }

            self.bind(ctx)?;
        }

        let bytes = element::to_bytes(&data[..count]);
        ctx.api_mut().buffer_data(self.kind, size, &bytes, usage)?;

        self.element_kind = Some(T::KIND);
        self.capacity = size;
        Ok(self)
    }

    /// Updates a sub range of the data store with `glBufferSubData`.
    ///
    /// Both `count` and `offset` are measured in elements of `T`. This buffer must
    /// already be bound, it is never bound implicitly.
    pub fn upload_sub<A, T, C>(
        &mut self,
        ctx: &mut Context<A>,
        data: &[T],
        count: C,
        offset: usize,
    ) -> Result<&mut Self>
    where
        A: GraphicsApi,
        T: Element,
        C: Into<Option<usize>>,
    {
        self.ensure_alive()?;
        self.ensure_element::<A, T>(ctx)?;

        let count = Self::count(data, count.into())?;
        let size = Self::bytes::<T>(count)?;
        let offset = Self::bytes::<T>(offset)?;

        let end = offset
            .checked_add(size)
            .ok_or_else(|| Error::InvalidArgument("Offset overflows.".into()))?;

        if end > self.capacity {
            return Err(Error::InvalidArgument(format!(
                "Range {}..{} exceeds the {} bytes data store of {}",
                offset, end, self.capacity, self.handle
            )));
        }

        if !self.is_bound(ctx) {
            return Err(Error::InvalidState(format!(
                "{} must be bound before updating its data",
                self.handle
            )));
        }

        let bytes = element::to_bytes(&data[..count]);
        ctx.api_mut().buffer_sub_data(self.kind, offset, size, &bytes)?;

        Ok(self)
    }

    /// Deletes the buffer object with `glDeleteBuffers`. Deleting a deleted buffer
    /// does nothing.
    pub fn delete<A: GraphicsApi>(&mut self, ctx: &mut Context<A>) -> Result<&mut Self> {
        if self.state == BufferState::Deleted {
            return Ok(self);
        }

        ctx.api_mut().delete_buffers(&[self.handle])?;
        ctx.forget_buffer(self.kind, self.handle);
        self.state = BufferState::Deleted;

        info!("[VertexBuffer] deletes {:?} buffer {}.", self.kind, self.handle);
        Ok(self)
    }

    fn ensure_alive(&self) -> Result<()> {
        if self.state == BufferState::Deleted {
            return Err(Error::InvalidState(format!(
                "Vertex buffer {} has already been deleted",
                self.handle
            )));
        }

        Ok(())
    }

    fn ensure_element<A: GraphicsApi, T: Element>(&self, ctx: &Context<A>) -> Result<()> {
        if self.kind == BufferKind::ElementArray && T::KIND == ElementKind::UInt {
            ctx.require(Operation::UIntElementIndices)?;
        }

        Ok(())
    }

    fn count<T>(data: &[T], count: Option<usize>) -> Result<usize> {
        let count = count.unwrap_or_else(|| data.len());
        if count > data.len() {
            return Err(Error::InvalidArgument(format!(
                "Count {} exceeds the {} remaining elements",
                count,
                data.len()
            )));
        }

        Ok(count)
    }

    fn bytes<T: Element>(count: usize) -> Result<usize> {
        T::KIND
            .bytes(count)
            .ok_or_else(|| Error::InvalidArgument(format!("{} elements overflow", count)))
    }
}

impl Drop for VertexBuffer {
    fn drop(&mut self) {
        if self.leak_warnings && self.state != BufferState::Deleted {
            warn!(
                "[VertexBuffer] {:?} buffer {} dropped without being deleted.",
                self.kind, self.handle
            );
        }
    }
}
