//! The baseline inspector: declared servlet mappings plus static resources.
//!
//! This always runs first in the pipeline. It registers one entry per
//! declared servlet-mapping URL pattern and one per public JSP/HTML file;
//! framework-aware inspectors run afterwards and may retract entries whose
//! implementation class turns out to be a front controller.

use std::fmt;

use tracing::debug;

use warpath_core::{Destination, Inspector, PathRepo, Result, Warfile};

/// A URL served by a declared servlet class.
pub struct ServletDestination {
    servlet_class: String,
}

impl ServletDestination {
    pub fn new(servlet_class: impl Into<String>) -> Self {
        Self {
            servlet_class: servlet_class.into(),
        }
    }
}

impl fmt::Display for ServletDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.servlet_class)
    }
}

impl Destination for ServletDestination {
    fn is_implemented_by(&self, class_name: &str) -> bool {
        class_name == self.servlet_class
    }
}

/// A JSP served straight from the archive.
pub struct JspDestination {
    path: String,
}

impl fmt::Display for JspDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

impl Destination for JspDestination {
    fn is_implemented_by(&self, _class_name: &str) -> bool {
        false
    }
}

/// A static HTML file.
pub struct HtmlDestination {
    path: String,
}

impl fmt::Display for HtmlDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

impl Destination for HtmlDestination {
    fn is_implemented_by(&self, _class_name: &str) -> bool {
        false
    }
}

pub struct ServletInspector;

impl Inspector for ServletInspector {
    fn name(&self) -> &'static str {
        "ServletInspector"
    }

    fn inspect(&self, war: &Warfile, paths: &mut PathRepo) -> Result<()> {
        add_servlets(war, paths);
        add_jsp_and_html(war, paths);
        Ok(())
    }
}

fn add_servlets(war: &Warfile, paths: &mut PathRepo) {
    for mapping in war.servlet_mappings() {
        debug!(
            "added servlet: {} => {}",
            mapping.url_pattern, mapping.servlet_class
        );
        paths.put_all(
            mapping.url_pattern.clone(),
            Box::new(ServletDestination::new(&mapping.servlet_class)),
        );
    }
}

fn add_jsp_and_html(war: &Warfile, paths: &mut PathRepo) {
    for path in war.public_files() {
        // extension check is case-insensitive; the URL keeps the archive's case
        let lower = path.to_ascii_lowercase();
        if lower.ends_with(".jsp") {
            debug!("added JSP: {path}");
            paths.put_all(path.clone(), Box::new(JspDestination { path }));
        } else if lower.ends_with(".html") || lower.ends_with(".htm") {
            debug!("added static HTML: {path}");
            paths.put_all(path.clone(), Box::new(HtmlDestination { path }));
        }
    }
}
