//! The archive model: a read-only view over a packaged web application.
//!
//! A `Warfile` owns the opened archive, the parsed deployment descriptor,
//! and the bundled `WEB-INF/lib` jars (loaded into memory so their entries
//! can be browsed without re-reading the outer archive). Everything else in
//! the pipeline consumes the WAR through this type.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;

use ristretto_classfile::ClassFile;
use tracing::{debug, warn};
use zip::ZipArchive;
use zip::result::ZipError;

use crate::error::{Result, WarpathError};

const DESCRIPTOR_PATH: &str = "WEB-INF/web.xml";
const CLASSES_PREFIX: &str = "WEB-INF/classes/";
const LIB_PREFIX: &str = "WEB-INF/lib/";

/// One `<servlet-mapping>` entry joined to its `<servlet>` declaration.
#[derive(Debug, Clone)]
pub struct ServletMapping {
    pub url_pattern: String,
    pub servlet_name: String,
    pub servlet_class: String,
    pub init_params: BTreeMap<String, String>,
}

struct BundledJar {
    name: String,
    entries: Vec<String>,
    archive: ZipArchive<Cursor<Vec<u8>>>,
}

pub struct Warfile {
    // zip readers hand out entries via &mut self; the WAR is single-threaded
    // by contract, so interior mutability keeps the public API immutable
    archive: RefCell<ZipArchive<File>>,
    entry_names: Vec<String>,
    bundled_jars: RefCell<Vec<BundledJar>>,
    descriptor: String,
    servlet_mappings: Vec<ServletMapping>,
    context_params: BTreeMap<String, String>,
}

impl Warfile {
    /// Opens the archive and performs basic sanity checks. A file without a
    /// deployment descriptor is not a WAR, so this fails fast.
    pub fn open(path: &Path) -> Result<Warfile> {
        debug!("opening archive: {}", path.display());
        let file = File::open(path)?;
        let mut archive = ZipArchive::new(file).map_err(|e| {
            WarpathError::BadArchive(format!("unable to open {}: {e}", path.display()))
        })?;

        let entry_names: Vec<String> = archive
            .file_names()
            .filter(|name| !name.ends_with('/'))
            .map(str::to_string)
            .collect();

        let descriptor = match read_entry(&mut archive, DESCRIPTOR_PATH)? {
            Some(bytes) => String::from_utf8(bytes)
                .map_err(|e| WarpathError::Descriptor(format!("{DESCRIPTOR_PATH}: {e}")))?,
            None => {
                return Err(WarpathError::BadArchive(format!(
                    "{}: missing {DESCRIPTOR_PATH}",
                    path.display()
                )));
            }
        };
        let (servlet_mappings, context_params) = parse_descriptor(&descriptor)?;

        let bundled_jars = load_bundled_jars(&mut archive, &entry_names)?;

        Ok(Warfile {
            archive: RefCell::new(archive),
            entry_names,
            bundled_jars: RefCell::new(bundled_jars),
            descriptor,
            servlet_mappings,
            context_params,
        })
    }

    /// The raw deployment descriptor, for collaborators that reparse it.
    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    /// Every file in the archive, keyed by archive-absolute path (leading
    /// slash, directories excluded).
    pub fn all_files(&self) -> Vec<String> {
        self.entry_names
            .iter()
            .map(|name| format!("/{name}"))
            .collect()
    }

    /// Archive files that the container would serve directly: everything
    /// outside `WEB-INF` and `META-INF`.
    pub fn public_files(&self) -> Vec<String> {
        self.all_files()
            .into_iter()
            .filter(|name| !name.starts_with("/WEB-INF") && !name.starts_with("/META-INF"))
            .collect()
    }

    /// Files on the effective classpath: the `WEB-INF/classes` tree (paths
    /// relative to it) plus every entry of the bundled jars.
    pub fn classpath_files(&self) -> Vec<String> {
        let mut result: Vec<String> = self
            .entry_names
            .iter()
            .filter_map(|name| name.strip_prefix(CLASSES_PREFIX))
            .map(str::to_string)
            .collect();
        for jar in self.bundled_jars.borrow().iter() {
            result.extend(jar.entries.iter().cloned());
        }
        result
    }

    /// Reads a classpath-relative file, looking in `WEB-INF/classes` first
    /// and then in each bundled jar. Returns `None` if no classpath root
    /// contains the path.
    pub fn open_classpath_file(&self, path: &str) -> Result<Option<Vec<u8>>> {
        let qualified = format!("{CLASSES_PREFIX}{path}");
        if let Some(bytes) = read_entry(&mut self.archive.borrow_mut(), &qualified)? {
            return Ok(Some(bytes));
        }
        for jar in self.bundled_jars.borrow_mut().iter_mut() {
            if let Some(bytes) = read_entry(&mut jar.archive, path)? {
                debug!("resolved {path} from bundled jar {}", jar.name);
                return Ok(Some(bytes));
            }
        }
        Ok(None)
    }

    /// Reads an archive-absolute file (leading slash). Returns `None` for
    /// relative paths and absent entries.
    pub fn open_file(&self, path: &str) -> Result<Option<Vec<u8>>> {
        let Some(relative) = path.strip_prefix('/') else {
            return Ok(None);
        };
        read_entry(&mut self.archive.borrow_mut(), relative)
    }

    /// Loads and decodes a class from the classpath. A class that is absent
    /// or cannot be parsed is an error, not a skip: a scan over a corrupt
    /// classpath would otherwise be silently incomplete.
    pub fn load_class(&self, class_name: &str) -> Result<ClassFile> {
        let path = format!("{}.class", class_name.replace('.', "/"));
        let bytes = self
            .open_classpath_file(&path)?
            .ok_or_else(|| WarpathError::ClassDecode {
                class_name: class_name.to_string(),
                detail: "not found on classpath".to_string(),
            })?;
        ClassFile::from_bytes(&mut Cursor::new(bytes)).map_err(|e| WarpathError::ClassDecode {
            class_name: class_name.to_string(),
            detail: e.to_string(),
        })
    }

    /// The declared servlet mappings, in descriptor order.
    pub fn servlet_mappings(&self) -> &[ServletMapping] {
        &self.servlet_mappings
    }

    /// A `<context-param>` value from the deployment descriptor.
    pub fn context_param(&self, name: &str) -> Option<&str> {
        self.context_params.get(name).map(String::as_str)
    }
}

/// Reads a whole entry, treating "no such entry" as `None`. The entry handle
/// never escapes this function.
fn read_entry<R: Read + std::io::Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Option<Vec<u8>>> {
    match archive.by_name(name) {
        Ok(mut entry) => {
            let mut bytes = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut bytes)?;
            Ok(Some(bytes))
        }
        Err(ZipError::FileNotFound) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn load_bundled_jars(
    archive: &mut ZipArchive<File>,
    entry_names: &[String],
) -> Result<Vec<BundledJar>> {
    let mut jars = Vec::new();
    for name in entry_names {
        if !name.starts_with(LIB_PREFIX) || !name.ends_with(".jar") {
            continue;
        }
        debug!("loading bundled jar: {name}");
        let bytes = read_entry(archive, name)?.unwrap_or_default();
        let jar = ZipArchive::new(Cursor::new(bytes)).map_err(|e| {
            WarpathError::BadArchive(format!("unreadable bundled jar {name}: {e}"))
        })?;
        let entries: Vec<String> = jar
            .file_names()
            .filter(|entry| !entry.ends_with('/'))
            .map(str::to_string)
            .collect();
        jars.push(BundledJar {
            name: name.clone(),
            entries,
            archive: jar,
        });
    }
    Ok(jars)
}

/// Pulls servlet mappings and context parameters out of the descriptor.
/// Elements are matched by local name so that 2.4, 2.5, and Jakarta
/// namespaces all resolve.
fn parse_descriptor(text: &str) -> Result<(Vec<ServletMapping>, BTreeMap<String, String>)> {
    let document =
        roxmltree::Document::parse(text).map_err(|e| WarpathError::Descriptor(e.to_string()))?;
    let root = document.root_element();

    let mut servlets: BTreeMap<String, (String, BTreeMap<String, String>)> = BTreeMap::new();
    let mut context_params = BTreeMap::new();

    for node in root.children().filter(|n| n.is_element()) {
        match node.tag_name().name() {
            "servlet" => {
                let Some(name) = child_text(&node, "servlet-name") else {
                    warn!("<servlet> entry without <servlet-name>, skipping");
                    continue;
                };
                let class = child_text(&node, "servlet-class").unwrap_or_default();
                let mut init_params = BTreeMap::new();
                for param in element_children(&node, "init-param") {
                    if let (Some(key), Some(value)) = (
                        child_text(&param, "param-name"),
                        child_text(&param, "param-value"),
                    ) {
                        init_params.insert(key, value);
                    }
                }
                servlets.insert(name, (class, init_params));
            }
            "context-param" => {
                if let (Some(key), Some(value)) = (
                    child_text(&node, "param-name"),
                    child_text(&node, "param-value"),
                ) {
                    context_params.insert(key, value);
                }
            }
            _ => {}
        }
    }

    let mut mappings = Vec::new();
    for node in root.children().filter(|n| n.is_element()) {
        if node.tag_name().name() != "servlet-mapping" {
            continue;
        }
        let Some(servlet_name) = child_text(&node, "servlet-name") else {
            warn!("<servlet-mapping> without <servlet-name>, skipping");
            continue;
        };
        let Some((servlet_class, init_params)) = servlets.get(&servlet_name) else {
            warn!("<servlet-mapping> \"{servlet_name}\" does not have a <servlet> entry");
            continue;
        };
        for pattern in element_children(&node, "url-pattern") {
            let Some(url_pattern) = text_of(&pattern) else {
                continue;
            };
            mappings.push(ServletMapping {
                url_pattern,
                servlet_name: servlet_name.clone(),
                servlet_class: servlet_class.clone(),
                init_params: init_params.clone(),
            });
        }
    }
    debug!(
        "descriptor declares {} servlet mapping(s), {} context param(s)",
        mappings.len(),
        context_params.len()
    );

    Ok((mappings, context_params))
}

fn element_children<'a, 'input>(
    node: &roxmltree::Node<'a, 'input>,
    name: &'static str,
) -> impl Iterator<Item = roxmltree::Node<'a, 'input>> {
    node.children()
        .filter(move |child| child.is_element() && child.tag_name().name() == name)
}

fn child_text(node: &roxmltree::Node<'_, '_>, name: &str) -> Option<String> {
    node.children()
        .find(|child| child.is_element() && child.tag_name().name() == name)
        .and_then(|child| text_of(&child))
}

fn text_of(node: &roxmltree::Node<'_, '_>) -> Option<String> {
    let text = node.text()?.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}
