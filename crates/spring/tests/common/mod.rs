//! WAR fixtures for front-controller resolution tests.

use std::io::{Cursor, Write};

use tempfile::NamedTempFile;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

pub struct WarBuilder {
    web_xml: String,
    files: Vec<(String, Vec<u8>)>,
}

#[allow(dead_code)]
impl WarBuilder {
    pub fn new(web_xml: &str) -> Self {
        Self {
            web_xml: web_xml.to_string(),
            files: Vec::new(),
        }
    }

    pub fn text_file(mut self, path: &str, text: &str) -> Self {
        self.files.push((path.to_string(), text.as_bytes().to_vec()));
        self
    }

    pub fn class(mut self, class_name: &str, bytes: &[u8]) -> Self {
        let path = format!("WEB-INF/classes/{}.class", class_name.replace('.', "/"));
        self.files.push((path, bytes.to_vec()));
        self
    }

    pub fn build(self) -> NamedTempFile {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("WEB-INF/web.xml", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(self.web_xml.as_bytes()).unwrap();
        for (path, bytes) in &self.files {
            writer
                .start_file(path.as_str(), SimpleFileOptions::default())
                .unwrap();
            writer.write_all(bytes).unwrap();
        }
        let bytes = writer.finish().unwrap().into_inner();

        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), bytes).unwrap();
        file
    }
}

/// Emits a minimal class file for a component-scanned controller:
/// `@Controller` plus a class-level `@RequestMapping` with the given paths
/// and request methods.
#[allow(dead_code)]
pub fn controller_class_bytes(class_name: &str, paths: &[&str], methods: &[&str]) -> Vec<u8> {
    let mut pool = ConstPool::default();
    let this_class = pool.class(&class_name.replace('.', "/"));
    let super_class = pool.class("java/lang/Object");

    let controller_type = pool.utf8("Lorg/springframework/stereotype/Controller;");
    let mapping_type = pool.utf8("Lorg/springframework/web/bind/annotation/RequestMapping;");

    let mut attr_body = Vec::new();
    attr_body.extend(2u16.to_be_bytes()); // two annotations

    // @Controller, no members
    attr_body.extend(controller_type.to_be_bytes());
    attr_body.extend(0u16.to_be_bytes());

    // @RequestMapping(value = {...}, method = {...})
    attr_body.extend(mapping_type.to_be_bytes());
    let pair_count = if methods.is_empty() { 1u16 } else { 2u16 };
    attr_body.extend(pair_count.to_be_bytes());

    attr_body.extend(pool.utf8("value").to_be_bytes());
    attr_body.push(b'[');
    attr_body.extend((paths.len() as u16).to_be_bytes());
    for path in paths {
        attr_body.push(b's');
        attr_body.extend(pool.utf8(path).to_be_bytes());
    }

    if !methods.is_empty() {
        let method_type = pool.utf8("Lorg/springframework/web/bind/annotation/RequestMethod;");
        attr_body.extend(pool.utf8("method").to_be_bytes());
        attr_body.push(b'[');
        attr_body.extend((methods.len() as u16).to_be_bytes());
        for method in methods {
            attr_body.push(b'e');
            attr_body.extend(method_type.to_be_bytes());
            attr_body.extend(pool.utf8(method).to_be_bytes());
        }
    }

    let attr_name = pool.utf8("RuntimeVisibleAnnotations");

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
    out.extend(1u16.to_be_bytes()); // attributes
    out.extend(attr_name.to_be_bytes());
    out.extend((attr_body.len() as u32).to_be_bytes());
    out.extend(&attr_body);
    out
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
