//! Test fixtures: assembles real WAR archives (and the class files inside
//! them) so that tests exercise the same decode paths as production runs.

use std::io::{Cursor, Write};

use tempfile::NamedTempFile;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

pub const DEFAULT_WEB_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<web-app xmlns="http://java.sun.com/xml/ns/j2ee" version="2.4">
</web-app>
"#;

pub struct WarBuilder {
    web_xml: String,
    files: Vec<(String, Vec<u8>)>,
}

#[allow(dead_code)]
impl WarBuilder {
    pub fn new() -> Self {
        Self {
            web_xml: DEFAULT_WEB_XML.to_string(),
            files: Vec::new(),
        }
    }

    pub fn web_xml(mut self, text: &str) -> Self {
        self.web_xml = text.to_string();
        self
    }

    /// Omits web.xml entirely; the resulting archive is not a valid WAR.
    pub fn without_web_xml(mut self) -> Self {
        self.web_xml = String::new();
        self
    }

    pub fn file(mut self, path: &str, bytes: &[u8]) -> Self {
        self.files.push((path.to_string(), bytes.to_vec()));
        self
    }

    pub fn text_file(self, path: &str, text: &str) -> Self {
        self.file(path, text.as_bytes())
    }

    /// Places class bytes under `WEB-INF/classes` at the conventional path.
    pub fn class(self, class_name: &str, bytes: &[u8]) -> Self {
        let path = format!("WEB-INF/classes/{}.class", class_name.replace('.', "/"));
        self.file(&path, bytes)
    }

    /// Bundles a jar under `WEB-INF/lib` containing the given entries.
    pub fn lib_jar(self, jar_name: &str, entries: &[(&str, &[u8])]) -> Self {
        let bytes = zip_bytes(entries);
        self.file(&format!("WEB-INF/lib/{jar_name}"), &bytes)
    }

    /// Writes the archive to a temp file. The caller keeps the handle alive
    /// for as long as the WAR is open.
    pub fn build(self) -> NamedTempFile {
        let mut entries: Vec<(&str, &[u8])> = Vec::new();
        if !self.web_xml.is_empty() {
            entries.push(("WEB-INF/web.xml", self.web_xml.as_bytes()));
        }
        for (path, bytes) in &self.files {
            entries.push((path.as_str(), bytes.as_slice()));
        }
        let bytes = zip_bytes(&entries);
        let file = NamedTempFile::new().expect("create temp war");
        std::fs::write(file.path(), bytes).expect("write temp war");
        file
    }
}

fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, bytes) in entries {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .expect("start zip entry");
        writer.write_all(bytes).expect("write zip entry");
    }
    writer.finish().expect("finish zip").into_inner()
}

/// A class-level annotation to stamp onto an emitted class file.
#[allow(dead_code)]
pub struct TestAnnotation {
    pub descriptor: &'static str,
    pub members: Vec<(&'static str, TestMember)>,
}

#[allow(dead_code)]
pub enum TestMember {
    Str(&'static str),
    StrArray(Vec<&'static str>),
    EnumArray {
        type_descriptor: &'static str,
        constants: Vec<&'static str>,
    },
}

#[allow(dead_code)]
pub fn marker_annotation(descriptor: &'static str) -> TestAnnotation {
    TestAnnotation {
        descriptor,
        members: Vec::new(),
    }
}

/// Emits a minimal, format-valid class file: public class extending
/// `java.lang.Object` with no members and an optional
/// `RuntimeVisibleAnnotations` attribute. `class_name` uses dots.
#[allow(dead_code)]
pub fn class_bytes(class_name: &str, annotations: &[TestAnnotation]) -> Vec<u8> {
    let mut pool = ConstPool::default();
    let this_class = pool.class(&class_name.replace('.', "/"));
    let super_class = pool.class("java/lang/Object");

    let mut attr_body = Vec::new();
    attr_body.extend((annotations.len() as u16).to_be_bytes());
    for annotation in annotations {
        attr_body.extend(pool.utf8(annotation.descriptor).to_be_bytes());
        attr_body.extend((annotation.members.len() as u16).to_be_bytes());
        for (name, member) in &annotation.members {
            attr_body.extend(pool.utf8(name).to_be_bytes());
            encode_member(&mut pool, member, &mut attr_body);
        }
    }
    let attr_name = if annotations.is_empty() {
        0
    } else {
        pool.utf8("RuntimeVisibleAnnotations")
    };

    let mut out = Vec::new();
    out.extend(0xCAFE_BABEu32.to_be_bytes());
    out.extend(0u16.to_be_bytes()); // minor version
    out.extend(52u16.to_be_bytes()); // major version: Java 8
    out.extend((pool.count + 1).to_be_bytes());
    out.extend(&pool.bytes);
    out.extend(0x0021u16.to_be_bytes()); // ACC_PUBLIC | ACC_SUPER
    out.extend(this_class.to_be_bytes());
    out.extend(super_class.to_be_bytes());
    out.extend(0u16.to_be_bytes()); // interfaces
    out.extend(0u16.to_be_bytes()); // fields
    out.extend(0u16.to_be_bytes()); // methods
    if annotations.is_empty() {
        out.extend(0u16.to_be_bytes());
    } else {
        out.extend(1u16.to_be_bytes());
        out.extend(attr_name.to_be_bytes());
        out.extend((attr_body.len() as u32).to_be_bytes());
        out.extend(&attr_body);
    }
    out
}

fn encode_member(pool: &mut ConstPool, member: &TestMember, out: &mut Vec<u8>) {
    match member {
        TestMember::Str(value) => {
            out.push(b's');
            out.extend(pool.utf8(value).to_be_bytes());
        }
        TestMember::StrArray(items) => {
            out.push(b'[');
            out.extend((items.len() as u16).to_be_bytes());
            for item in items {
                out.push(b's');
                out.extend(pool.utf8(item).to_be_bytes());
            }
        }
        TestMember::EnumArray {
            type_descriptor,
            constants,
        } => {
            out.push(b'[');
            out.extend((constants.len() as u16).to_be_bytes());
            for constant in constants {
                out.push(b'e');
                out.extend(pool.utf8(type_descriptor).to_be_bytes());
                out.extend(pool.utf8(constant).to_be_bytes());
            }
        }
    }
}

#[derive(Default)]
struct ConstPool {
    bytes: Vec<u8>,
    count: u16,
}

impl ConstPool {
    fn utf8(&mut self, value: &str) -> u16 {
        self.bytes.push(1); // CONSTANT_Utf8
        self.bytes.extend((value.len() as u16).to_be_bytes());
        self.bytes.extend(value.as_bytes());
        self.count += 1;
        self.count
    }

    fn class(&mut self, internal_name: &str) -> u16 {
        let name_index = self.utf8(internal_name);
        self.bytes.push(7); // CONSTANT_Class
        self.bytes.extend(name_index.to_be_bytes());
        self.count += 1;
        self.count
    }
}
