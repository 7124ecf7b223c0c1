//! Slim WAR fixture builder for inspector tests.

use std::io::{Cursor, Write};

use tempfile::NamedTempFile;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

pub struct WarBuilder {
    web_xml: String,
    files: Vec<(String, String)>,
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
        self.files.push((path.to_string(), text.to_string()));
        self
    }

    pub fn build(self) -> NamedTempFile {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("WEB-INF/web.xml", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(self.web_xml.as_bytes()).unwrap();
        for (path, text) in &self.files {
            writer
                .start_file(path.as_str(), SimpleFileOptions::default())
                .unwrap();
            writer.write_all(text.as_bytes()).unwrap();
        }
        let bytes = writer.finish().unwrap().into_inner();

        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), bytes).unwrap();
        file
    }
}
