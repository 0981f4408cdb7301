use std::cmp;
use std::fmt;

use crate::errors::*;

/// Describes a version.
///
/// A version can only be compared to another version if they belong to the same API.
/// For example, both `Version::GL(3, 0) >= Version::ES(3, 0)` and `Version::ES(3, 0) >=
/// Version::GL(3, 0)` return `false`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Version {
    /// Regular OpenGL.
    GL(u8, u8),
    /// OpenGL embedded system.
    ES(u8, u8),
}

impl PartialOrd for Version {
    #[inline]
    fn partial_cmp(&self, other: &Version) -> Option<cmp::Ordering> {
        let (es1, major1, minor1) = match *self {
            Version::GL(major, minor) => (false, major, minor),
            Version::ES(major, minor) => (true, major, minor),
        };

        let (es2, major2, minor2) = match *other {
            Version::GL(major, minor) => (false, major, minor),
            Version::ES(major, minor) => (true, major, minor),
        };

        if es1 != es2 {
            None
        } else {
            match major1.cmp(&major2) {
                cmp::Ordering::Equal => Some(minor1.cmp(&minor2)),
                v => Some(v),
            }
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Version::GL(major, minor) => write!(f, "OpenGL {}.{}", major, minor),
            Version::ES(major, minor) => write!(f, "OpenGL ES {}.{}", major, minor),
        }
    }
}

impl Version {
    /// Parses the string returned by `glGetString(GL_VERSION)`.
    ///
    /// ES implementations report `"OpenGL ES 2.0 <vendor-specific>"`, ES 1.x
    /// profiles `"OpenGL ES-CM 1.1"`, desktop drivers start with the number.
    pub fn parse_str(desc: &str) -> Result<Version> {
        let (es, desc) = if desc.starts_with("OpenGL ES-") {
            // Skips the two-letter profile, e.g. `CM` or `CL`.
            (true, desc.get(13..).unwrap_or(""))
        } else if desc.starts_with("OpenGL ES ") {
            (true, &desc[10..])
        } else {
            (false, desc)
        };

        let malformed = || Error::Backend(format!("[GL] Version string {:?} is unformaled.", desc));

        let desc = desc.trim_start().split(' ').next().ok_or_else(malformed)?;
        let mut iter = desc.split('.');

        let major = iter
            .next()
            .and_then(|v| v.parse().ok())
            .ok_or_else(malformed)?;

        let minor = iter
            .next()
            .and_then(|v| v.parse().ok())
            .ok_or_else(malformed)?;

        if es {
            Ok(Version::ES(major, minor))
        } else {
            Ok(Version::GL(major, minor))
        }
    }
}

macro_rules! extensions {
    ($($string:expr => $field:ident,)+) => {
        /// Contains data about the list of extensions.
        #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
        pub struct Extensions {
            $(
                pub $field: bool,
            )+
        }

        impl Extensions {
            /// Picks the extensions we care about out of the names reported by the
            /// implementation. Unknown names are ignored.
            pub fn parse<I, S>(names: I) -> Extensions
            where
                I: IntoIterator<Item = S>,
                S: AsRef<str>,
            {
                let mut extensions = Extensions::default();

                for name in names {
                    match name.as_ref() {
                        $(
                            $string => extensions.$field = true,
                        )+
                        _ => ()
                    }
                }

                extensions
            }
        }
    }
}

extensions! {
    "GL_ARB_shader_objects" => gl_arb_shader_objects,
    "GL_ARB_vertex_shader" => gl_arb_vertex_shader,
    "GL_ARB_fragment_shader" => gl_arb_fragment_shader,
    "GL_ARB_vertex_buffer_object" => gl_arb_vertex_buffer_object,
    "GL_OES_element_index_uint" => gl_oes_element_index_uint,
}

/// The groups of primitives whose availability differs between versions. An
/// ES 1.1 implementation exposes buffer objects only, while ES 2.0 adds the
/// programmable pipeline.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `glGenBuffers`, `glBindBuffer`, `glBufferData` and friends.
    BufferObjects,
    /// `glCreateShader`, `glCompileShader` and friends.
    ShaderObjects,
    /// `glCreateProgram`, `glLinkProgram`, `glUseProgram` and friends.
    ProgramObjects,
    /// `GL_UNSIGNED_INT` indices in element array buffers, which ES exposes only
    /// with `GL_OES_element_index_uint`.
    UIntElementIndices,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Operation::BufferObjects => write!(f, "buffer objects"),
            Operation::ShaderObjects => write!(f, "shader objects"),
            Operation::ProgramObjects => write!(f, "program objects"),
            Operation::UIntElementIndices => write!(f, "unsigned int element indices"),
        }
    }
}

/// Represents the capabilities of the context.
///
/// Contrary to the state, these values never change.
#[derive(Debug, Clone)]
pub struct Capabilities {
    /// Returns a version or release number.
    pub version: Version,
    /// The company responsible for this GL implementation.
    pub vendor: String,
    /// The name of the renderer. This name is typically specific to a particular
    /// configuration of a hardware platform.
    pub renderer: String,
    /// The list of OpenGL extensions support by this implementation.
    pub extensions: Extensions,
}

impl Capabilities {
    /// Creates capabilities of a bare implementation of `version` without any
    /// extension.
    pub fn new(version: Version) -> Self {
        Capabilities {
            version,
            vendor: String::new(),
            renderer: String::new(),
            extensions: Extensions::default(),
        }
    }

    /// Checks if the primitives of `op` could be used.
    pub fn supports(&self, op: Operation) -> bool {
        let exts = &self.extensions;

        match op {
            Operation::BufferObjects => {
                self.version >= Version::GL(1, 5)
                    || self.version >= Version::ES(1, 1)
                    || exts.gl_arb_vertex_buffer_object
            }
            Operation::ShaderObjects | Operation::ProgramObjects => {
                self.version >= Version::GL(2, 0)
                    || self.version >= Version::ES(2, 0)
                    || (exts.gl_arb_shader_objects
                        && exts.gl_arb_vertex_shader
                        && exts.gl_arb_fragment_shader)
            }
            Operation::UIntElementIndices => match self.version {
                Version::GL(..) => true,
                Version::ES(..) => exts.gl_oes_element_index_uint,
            },
        }
    }

    /// Fails with `Error::Requirement` if `op` is not supported.
    pub fn require(&self, op: Operation) -> Result<()> {
        if self.supports(op) {
            Ok(())
        } else {
            Err(Error::Requirement(format!("{} ({})", op, self.version)))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_version() {
        let v = Version::parse_str("OpenGL ES 2.0 build 1.8@905891").unwrap();
        assert_eq!(v, Version::ES(2, 0));

        let v = Version::parse_str("OpenGL ES-CM 1.1").unwrap();
        assert_eq!(v, Version::ES(1, 1));

        let v = Version::parse_str("4.5.0 NVIDIA 390.77").unwrap();
        assert_eq!(v, Version::GL(4, 5));

        assert!(Version::parse_str("OpenGL ES").is_err());
        assert!(Version::parse_str("").is_err());
        assert!(Version::parse_str("three.one").is_err());
    }

    #[test]
    fn compare_version() {
        assert!(Version::ES(2, 0) > Version::ES(1, 1));
        assert!(Version::GL(2, 1) >= Version::GL(2, 0));
        assert!(!(Version::GL(3, 0) >= Version::ES(3, 0)));
        assert!(!(Version::ES(3, 0) >= Version::GL(3, 0)));
    }

    #[test]
    fn supports() {
        let caps = Capabilities::new(Version::ES(1, 1));
        assert!(caps.supports(Operation::BufferObjects));
        assert!(!caps.supports(Operation::ShaderObjects));
        assert!(!caps.supports(Operation::ProgramObjects));
        assert!(caps.require(Operation::ProgramObjects).is_err());

        let caps = Capabilities::new(Version::ES(2, 0));
        assert!(caps.supports(Operation::ShaderObjects));
        assert!(caps.require(Operation::ProgramObjects).is_ok());

        let mut caps = Capabilities::new(Version::GL(1, 4));
        assert!(!caps.supports(Operation::BufferObjects));
        caps.extensions = Extensions::parse(vec!["GL_ARB_vertex_buffer_object", "GL_FOO"]);
        assert!(caps.supports(Operation::BufferObjects));
        assert!(!caps.supports(Operation::ShaderObjects));
    }

    #[test]
    fn uint_element_indices() {
        let mut caps = Capabilities::new(Version::ES(2, 0));
        assert!(!caps.supports(Operation::UIntElementIndices));
        caps.extensions = Extensions::parse(vec!["GL_OES_element_index_uint"]);
        assert!(caps.supports(Operation::UIntElementIndices));

        let caps = Capabilities::new(Version::GL(2, 1));
        assert!(caps.supports(Operation::UIntElementIndices));
    }
}
