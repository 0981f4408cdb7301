use gl::types::*;

use crate::objects::prelude::{BufferKind, BufferUsage, ShaderKind};

impl From<BufferKind> for GLenum {
    fn from(kind: BufferKind) -> Self {
        match kind {
            BufferKind::Array => gl::ARRAY_BUFFER,
            BufferKind::ElementArray => gl::ELEMENT_ARRAY_BUFFER,
        }
    }
}

impl From<BufferUsage> for GLenum {
    fn from(usage: BufferUsage) -> Self {
        match usage {
            BufferUsage::Static => gl::STATIC_DRAW,
            BufferUsage::Dynamic => gl::DYNAMIC_DRAW,
            BufferUsage::Stream => gl::STREAM_DRAW,
        }
    }
}

impl From<ShaderKind> for GLenum {
    fn from(kind: ShaderKind) -> Self {
        match kind {
            ShaderKind::Vertex => gl::VERTEX_SHADER,
            ShaderKind::Fragment => gl::FRAGMENT_SHADER,
        }
    }
}

/// The query that returns the buffer bound to `kind`.
pub fn binding_query(kind: BufferKind) -> GLenum {
    match kind {
        BufferKind::Array => gl::ARRAY_BUFFER_BINDING,
        BufferKind::ElementArray => gl::ELEMENT_ARRAY_BUFFER_BINDING,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn enums() {
        assert_eq!(GLenum::from(BufferKind::Array), 0x8892);
        assert_eq!(GLenum::from(BufferKind::ElementArray), 0x8893);
        assert_eq!(GLenum::from(BufferUsage::Stream), 0x88E0);
        assert_eq!(GLenum::from(BufferUsage::Static), 0x88E4);
        assert_eq!(GLenum::from(BufferUsage::Dynamic), 0x88E8);
        assert_eq!(GLenum::from(ShaderKind::Fragment), 0x8B30);
        assert_eq!(GLenum::from(ShaderKind::Vertex), 0x8B31);
        assert_eq!(binding_query(BufferKind::Array), 0x8894);
        assert_eq!(binding_query(BufferKind::ElementArray), 0x8895);
    }
}
