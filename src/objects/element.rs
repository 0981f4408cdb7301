//! Scalar element types of buffer data.

use byteorder::{ByteOrder, NativeEndian};

/// The data type of the elements in a typed upload. It determines how many bytes
/// an element occupies in the data store of a buffer object.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    Byte,
    UByte,
    Short,
    UShort,
    Int,
    UInt,
    Float,
    Long,
    ULong,
    Double,
}

impl ElementKind {
    /// The size of a single element in bytes.
    pub fn size(self) -> usize {
        match self {
            ElementKind::Byte | ElementKind::UByte => 1,
            ElementKind::Short | ElementKind::UShort => 2,
            ElementKind::Int | ElementKind::UInt | ElementKind::Float => 4,
            ElementKind::Long | ElementKind::ULong | ElementKind::Double => 8,
        }
    }

    /// The size of `count` elements in bytes, `None` on overflow.
    #[inline]
    pub fn bytes(self, count: usize) -> Option<usize> {
        count.checked_mul(self.size())
    }
}

/// A scalar type that could be uploaded into buffer objects.
pub trait Element: Copy + 'static {
    const KIND: ElementKind;

    /// Writes `src` into `dst` in the byte order of the host. `dst` must be
    /// exactly `src.len() * KIND.size()` bytes long.
    fn encode(src: &[Self], dst: &mut [u8]);
}

impl Element for u8 {
    const KIND: ElementKind = ElementKind::UByte;

    fn encode(src: &[Self], dst: &mut [u8]) {
        dst.copy_from_slice(src);
    }
}

impl Element for i8 {
    const KIND: ElementKind = ElementKind::Byte;

    fn encode(src: &[Self], dst: &mut [u8]) {
        for (d, s) in dst.iter_mut().zip(src) {
            *d = *s as u8;
        }
    }
}

macro_rules! impl_element {
    ($ty:ty, $kind:ident, $write:ident) => {
        impl Element for $ty {
            const KIND: ElementKind = ElementKind::$kind;

            #[inline]
            fn encode(src: &[Self], dst: &mut [u8]) {
                NativeEndian::$write(src, dst);
            }
        }
    };
}

impl_element!(i16, Short, write_i16_into);
impl_element!(u16, UShort, write_u16_into);
impl_element!(i32, Int, write_i32_into);
impl_element!(u32, UInt, write_u32_into);
impl_element!(f32, Float, write_f32_into);
impl_element!(i64, Long, write_i64_into);
impl_element!(u64, ULong, write_u64_into);
impl_element!(f64, Double, write_f64_into);

/// Encodes typed elements into the bytes handed to the driver.
pub fn to_bytes<T: Element>(data: &[T]) -> Vec<u8> {
    let mut bytes = vec![0; data.len() * T::KIND.size()];
    T::encode(data, &mut bytes);
    bytes
}
