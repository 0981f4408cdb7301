extern crate env_logger;
extern crate gles_objects;
extern crate rand;

use gles_objects::backends::headless::{Call, HeadlessApi};
use gles_objects::prelude::*;

fn testbed() -> Context<HeadlessApi> {
    let _ = env_logger::try_init();
    Context::new(HeadlessApi::es20())
}

fn uploads(ctx: &Context<HeadlessApi>) -> usize {
    ctx.api().count(|v| match *v {
        Call::BufferData { .. } | Call::BufferSubData { .. } => true,
        _ => false,
    })
}

#[test]
fn lifecycle() {
    let mut ctx = testbed();

    let mut vbo = VertexBuffer::array(&mut ctx).unwrap();
    assert_eq!(vbo.kind(), BufferKind::Array);
    assert_eq!(vbo.state(), BufferState::Created);
    assert_eq!(vbo.element_kind(), None);
    assert!(!vbo.is_bound(&ctx));

    vbo.bind(&mut ctx).unwrap();
    assert!(vbo.is_bound(&ctx));

    vbo.upload(&mut ctx, &[0.0f32, 1.0, 2.0, 3.0], None, BufferUsage::Static)
        .unwrap();

    assert_eq!(
        ctx.api().calls().last(),
        Some(&Call::BufferData {
            target: BufferKind::Array,
            size: 16,
            usage: BufferUsage::Static,
        })
    );

    let handle = vbo.handle();
    vbo.delete(&mut ctx).unwrap();
    assert_eq!(vbo.state(), BufferState::Deleted);
    assert_eq!(
        ctx.api().count(|v| *v == Call::DeleteBuffers(vec![handle])),
        1
    );

    let err = vbo
        .upload(&mut ctx, &[0.0f32, 1.0, 2.0, 3.0], None, None)
        .unwrap_err();
    assert!(err.is_invalid_state());
}

#[test]
fn creation_failure() {
    let mut ctx = testbed();
    ctx.api_mut().fail_next_allocation();

    let err = VertexBuffer::element_array(&mut ctx).unwrap_err();
    assert!(err.is_resource_creation());

    // The next allocation succeeds again.
    let mut ibo = VertexBuffer::element_array(&mut ctx).unwrap();
    ibo.delete(&mut ctx).unwrap();
}

#[test]
fn delete_twice() {
    let mut ctx = testbed();

    let mut vbo = VertexBuffer::array(&mut ctx).unwrap();
    vbo.delete(&mut ctx).unwrap().delete(&mut ctx).unwrap();
    assert_eq!(vbo.state(), BufferState::Deleted);

    let deletes = ctx.api().count(|v| match *v {
        Call::DeleteBuffers(_) => true,
        _ => false,
    });

    assert_eq!(deletes, 1);
}

#[test]
fn deleted_buffer_issues_nothing() {
    let mut ctx = testbed();

    let mut vbo = VertexBuffer::array(&mut ctx).unwrap();
    vbo.upload(&mut ctx, &[1u16, 2, 3], None, None).unwrap();
    vbo.delete(&mut ctx).unwrap();
    ctx.api_mut().clear_calls();

    assert!(vbo.bind(&mut ctx).unwrap_err().is_invalid_state());
    assert!(vbo
        .upload(&mut ctx, &[1u16], None, None)
        .unwrap_err()
        .is_invalid_state());
    assert!(vbo
        .upload_sub(&mut ctx, &[1u16], None, 0)
        .unwrap_err()
        .is_invalid_state());

    assert!(!vbo.is_bound(&ctx));
    assert!(ctx.api().calls().is_empty());
}

#[test]
fn upload_count() {
    let mut ctx = testbed();
    let mut vbo = VertexBuffer::array(&mut ctx).unwrap();

    let data: Vec<f32> = (0..10).map(|v| v as f32).collect();
    vbo.upload(&mut ctx, &data, None, None).unwrap();
    assert_eq!(vbo.capacity(), 40);
    assert_eq!(vbo.element_kind(), Some(ElementKind::Float));

    vbo.upload(&mut ctx, &data, 3usize, BufferUsage::Dynamic).unwrap();
    assert_eq!(vbo.capacity(), 12);
    assert_eq!(
        ctx.api().calls().last(),
        Some(&Call::BufferData {
            target: BufferKind::Array,
            size: 12,
            usage: BufferUsage::Dynamic,
        })
    );

    let bytes = ctx.api().buffer_bytes(vbo.handle()).unwrap();
    assert_eq!(bytes.len(), 12);
    assert_eq!(&bytes[4..8], &1.0f32.to_bits().to_ne_bytes());

    vbo.delete(&mut ctx).unwrap();
}

#[test]
fn upload_exceeding_count() {
    let mut ctx = testbed();
    let mut vbo = VertexBuffer::array(&mut ctx).unwrap();
    ctx.api_mut().clear_calls();

    let err = vbo.upload(&mut ctx, &[1i32, 2, 3], 4usize, None).unwrap_err();
    assert!(err.is_invalid_argument());
    assert_eq!(uploads(&ctx), 0);
    assert_eq!(vbo.element_kind(), None);

    // Validation happens before the implicit bind.
    assert!(ctx.api().calls().is_empty());
    assert!(!vbo.is_bound(&ctx));

    vbo.delete(&mut ctx).unwrap();
}

#[test]
fn element_sizes() {
    let mut ctx = testbed();
    let mut ibo = VertexBuffer::element_array(&mut ctx).unwrap();

    ibo.upload(&mut ctx, &[1u8, 2, 3, 4, 5], None, None).unwrap();
    assert_eq!(ibo.capacity(), 5);
    assert_eq!(ibo.element_kind(), Some(ElementKind::UByte));

    ibo.upload(&mut ctx, &[1i16, 2, 3, 4, 5], None, None).unwrap();
    assert_eq!(ibo.capacity(), 10);
    assert_eq!(ibo.element_kind(), Some(ElementKind::Short));

    ibo.upload(&mut ctx, &[1i32, 2, 3, 4, 5], None, None).unwrap();
    assert_eq!(ibo.capacity(), 20);
    assert_eq!(ibo.element_kind(), Some(ElementKind::Int));

    ibo.upload(&mut ctx, &[1.0f64, 2.0, 3.0, 4.0, 5.0], None, None)
        .unwrap();
    assert_eq!(ibo.capacity(), 40);
    assert_eq!(ibo.element_kind(), Some(ElementKind::Double));

    ibo.delete(&mut ctx).unwrap();
}

#[test]
fn uint_indices() {
    let mut ctx = testbed();
    let mut ibo = VertexBuffer::element_array(&mut ctx).unwrap();
    let mut vbo = VertexBuffer::array(&mut ctx).unwrap();
    ctx.api_mut().clear_calls();

    // ES 2.0 without `GL_OES_element_index_uint`.
    match ibo.upload(&mut ctx, &[0u32, 1, 2], None, None) {
        Err(Error::Requirement(_)) => {}
        other => panic!("unexpected {:?}", other),
    }

    assert!(ctx.api().calls().is_empty());
    assert_eq!(ibo.element_kind(), None);

    // Array buffers take any element.
    vbo.upload(&mut ctx, &[0u32, 1, 2], None, None).unwrap();
    assert_eq!(vbo.capacity(), 12);

    ibo.delete(&mut ctx).unwrap();
    vbo.delete(&mut ctx).unwrap();

    let api = HeadlessApi::with_extensions(Version::ES(2, 0), vec!["GL_OES_element_index_uint"]);
    let mut ctx = Context::new(api);
    let mut ibo = VertexBuffer::element_array(&mut ctx).unwrap();

    ibo.upload(&mut ctx, &[0u32, 1, 2, 3], None, None).unwrap();
    assert_eq!(ibo.capacity(), 16);
    assert_eq!(ibo.element_kind(), Some(ElementKind::UInt));

    ibo.upload_sub(&mut ctx, &[7u32], None, 3).unwrap();
    assert_eq!(&ctx.api().buffer_bytes(ibo.handle()).unwrap()[12..16], &7u32.to_ne_bytes());

    ibo.delete(&mut ctx).unwrap();
}

#[test]
fn random_sizes() {
    let mut ctx = testbed();
    let mut vbo = VertexBuffer::array(&mut ctx).unwrap();

    for _ in 0..64 {
        let len = rand::random::<usize>() % 256;
        let count = rand::random::<usize>() % (len + 1);
        let data: Vec<f32> = (0..len).map(|_| rand::random::<f32>()).collect();

        vbo.upload(&mut ctx, &data, count, None).unwrap();
        assert_eq!(vbo.capacity(), count * 4);
        assert_eq!(ctx.api().buffer_bytes(vbo.handle()).unwrap().len(), count * 4);
    }

    vbo.delete(&mut ctx).unwrap();
}

#[test]
fn implicit_rebind() {
    let mut ctx = testbed();

    let mut a = VertexBuffer::array(&mut ctx).unwrap();
    let mut b = VertexBuffer::array(&mut ctx).unwrap();
    let mut ibo = VertexBuffer::element_array(&mut ctx).unwrap();

    a.bind(&mut ctx).unwrap();
    ibo.bind(&mut ctx).unwrap();
    assert!(a.is_bound(&ctx));

    // Uploading into an unbound buffer replaces the buffer of the same kind only.
    b.upload(&mut ctx, &[1.0f32], None, None).unwrap();
    assert!(b.is_bound(&ctx));
    assert!(!a.is_bound(&ctx));
    assert!(ibo.is_bound(&ctx));
    assert_eq!(ctx.bound_buffer(BufferKind::Array), Some(b.handle()));

    // Uploading into a bound buffer does not bind again.
    ctx.api_mut().clear_calls();
    b.upload(&mut ctx, &[2.0f32], None, None).unwrap();
    assert_eq!(
        ctx.api().count(|v| match *v {
            Call::BindBuffer(..) => true,
            _ => false,
        }),
        0
    );

    a.delete(&mut ctx).unwrap();
    b.delete(&mut ctx).unwrap();
    ibo.delete(&mut ctx).unwrap();
}

#[test]
fn upload_after_foreign_bind() {
    let mut ctx = testbed();
    let mut a = VertexBuffer::array(&mut ctx).unwrap();
    let mut b = VertexBuffer::array(&mut ctx).unwrap();

    a.bind(&mut ctx).unwrap();
    ctx.api_mut()
        .bind_buffer(BufferKind::Array, Some(b.handle()))
        .unwrap();

    ctx.sync_bindings().unwrap();
    assert!(b.is_bound(&ctx));
    assert!(!a.is_bound(&ctx));

    a.upload(&mut ctx, &[1.0f32, 2.0], None, None).unwrap();
    assert!(a.is_bound(&ctx));
    assert_eq!(ctx.api().buffer_bytes(a.handle()).unwrap().len(), 8);
    assert_eq!(ctx.api().buffer_bytes(b.handle()).unwrap().len(), 0);

    a.delete(&mut ctx).unwrap();
    b.delete(&mut ctx).unwrap();
}

#[test]
fn bind_idempotent() {
    let mut ctx = testbed();
    let mut vbo = VertexBuffer::array(&mut ctx).unwrap();

    vbo.bind(&mut ctx).unwrap().bind(&mut ctx).unwrap();
    assert!(vbo.is_bound(&ctx));
    assert_eq!(ctx.bound_buffer(BufferKind::Array), Some(vbo.handle()));

    vbo.delete(&mut ctx).unwrap();
}

#[test]
fn delete_bound() {
    let mut ctx = testbed();
    let mut vbo = VertexBuffer::array(&mut ctx).unwrap();

    vbo.bind(&mut ctx).unwrap();
    vbo.delete(&mut ctx).unwrap();

    assert_eq!(ctx.bound_buffer(BufferKind::Array), None);
    assert!(!ctx.api().is_alive(vbo.handle()));
}

#[test]
fn upload_sub() {
    let mut ctx = testbed();
    let mut vbo = VertexBuffer::array(&mut ctx).unwrap();

    vbo.upload(&mut ctx, &[0u16; 8], None, None).unwrap();
    vbo.upload_sub(&mut ctx, &[7u16, 8, 9], 2usize, 3).unwrap();

    assert_eq!(
        ctx.api().calls().last(),
        Some(&Call::BufferSubData {
            target: BufferKind::Array,
            offset: 6,
            size: 4,
        })
    );

    let bytes = ctx.api().buffer_bytes(vbo.handle()).unwrap();
    assert_eq!(&bytes[6..8], &7u16.to_ne_bytes());
    assert_eq!(&bytes[8..10], &8u16.to_ne_bytes());
    assert_eq!(&bytes[10..12], &[0u8, 0]);

    vbo.delete(&mut ctx).unwrap();
}

#[test]
fn upload_sub_checks() {
    let mut ctx = testbed();
    let mut a = VertexBuffer::array(&mut ctx).unwrap();
    let mut b = VertexBuffer::array(&mut ctx).unwrap();

    a.upload(&mut ctx, &[0.0f32; 4], None, None).unwrap();
    ctx.api_mut().clear_calls();

    let err = a.upload_sub(&mut ctx, &[1.0f32], 2usize, 0).unwrap_err();
    assert!(err.is_invalid_argument());

    let err = a.upload_sub(&mut ctx, &[1.0f32, 2.0], None, 3).unwrap_err();
    assert!(err.is_invalid_argument());

    let err = a
        .upload_sub(&mut ctx, &[1.0f32], None, usize::max_value())
        .unwrap_err();
    assert!(err.is_invalid_argument());

    assert_eq!(uploads(&ctx), 0);

    // Never binds implicitly.
    b.bind(&mut ctx).unwrap();
    let err = a.upload_sub(&mut ctx, &[1.0f32], None, 0).unwrap_err();
    assert!(err.is_invalid_state());
    assert!(b.is_bound(&ctx));
    assert_eq!(uploads(&ctx), 0);

    a.delete(&mut ctx).unwrap();
    b.delete(&mut ctx).unwrap();
}

#[test]
fn requires_buffer_objects() {
    let _ = env_logger::try_init();
    let mut ctx = Context::new(HeadlessApi::new(Version::GL(1, 4)));

    match VertexBuffer::array(&mut ctx) {
        Err(Error::Requirement(_)) => {}
        other => panic!("unexpected {:?}", other),
    }

    assert!(ctx.api().calls().is_empty());
}

#[test]
fn es11_buffers() {
    let _ = env_logger::try_init();
    let mut ctx = Context::new(HeadlessApi::es11());

    let mut vbo = VertexBuffer::array(&mut ctx).unwrap();
    vbo.upload(&mut ctx, &[1.0f32, 2.0], None, BufferUsage::Stream)
        .unwrap();
    assert!(vbo.is_bound(&ctx));
    vbo.delete(&mut ctx).unwrap();
}
