extern crate gles_objects;
extern crate log;

use std::sync::Mutex;

use log::{Level, LevelFilter, Log, Metadata, Record};

use gles_objects::backends::headless::HeadlessApi;
use gles_objects::prelude::*;

struct Capture {
    warnings: Mutex<Vec<String>>,
}

impl Log for Capture {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Warn
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let mut warnings = self.warnings.lock().unwrap();
            warnings.push(format!("{}", record.args()));
        }
    }

    fn flush(&self) {}
}

static LOGGER: Capture = Capture {
    warnings: Mutex::new(Vec::new()),
};

fn take() -> Vec<String> {
    let mut warnings = LOGGER.warnings.lock().unwrap();
    warnings.drain(..).collect()
}

fn context(json: &str) -> Context<HeadlessApi> {
    let params = ContextParams::from_json(json).unwrap();
    Context::with_params(HeadlessApi::es20(), params).unwrap()
}

// Both switches share the process-wide logger, so they are checked in one test.
#[test]
fn warnings() {
    log::set_logger(&LOGGER).unwrap();
    log::set_max_level(LevelFilter::Warn);

    // Implicit rebinds are reported when asked for.
    let mut ctx = context(r#"{ "rebind_warnings": true }"#);
    let mut a = VertexBuffer::array(&mut ctx).unwrap();
    let mut b = VertexBuffer::array(&mut ctx).unwrap();
    a.bind(&mut ctx).unwrap();
    take();

    b.upload(&mut ctx, &[1.0f32], None, None).unwrap();
    let warnings = take();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("replaces"));

    // Uploading into the bound buffer replaces nothing.
    b.upload(&mut ctx, &[2.0f32], None, None).unwrap();
    assert!(take().is_empty());

    a.delete(&mut ctx).unwrap();
    b.delete(&mut ctx).unwrap();

    // Silent by default.
    let mut ctx = context("{}");
    let mut a = VertexBuffer::array(&mut ctx).unwrap();
    let mut b = VertexBuffer::array(&mut ctx).unwrap();
    a.bind(&mut ctx).unwrap();
    b.upload(&mut ctx, &[1.0f32], None, None).unwrap();
    a.delete(&mut ctx).unwrap();
    b.delete(&mut ctx).unwrap();
    assert!(take().is_empty());

    // Leaks are reported by default.
    {
        let _vbo = VertexBuffer::array(&mut ctx).unwrap();
        let _vs = Shader::vertex(&mut ctx).unwrap();
        let _program = Program::new(&mut ctx).unwrap();
    }

    let warnings = take();
    assert_eq!(warnings.len(), 3);
    assert!(warnings
        .iter()
        .all(|v| v.contains("dropped without being deleted")));

    // Deleted objects and disabled warnings are silent.
    let mut vbo = VertexBuffer::array(&mut ctx).unwrap();
    vbo.delete(&mut ctx).unwrap();
    drop(vbo);

    let mut ctx = context(r#"{ "leak_warnings": false }"#);
    {
        let _vbo = VertexBuffer::array(&mut ctx).unwrap();
        let _program = Program::new(&mut ctx).unwrap();
    }

    assert!(take().is_empty());
}
