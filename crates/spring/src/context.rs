//! A Spring application context reconstructed from its XML resources.
//!
//! A context owns the bean definitions of its own resource locations and may
//! delegate lookups to a parent context. The parent chain models Spring's
//! root-context plus per-dispatcher child-context layering; levels never
//! share mutable state, combined views are computed on demand.

use std::collections::BTreeMap;
use std::sync::Arc;

use roxmltree::Document;
use tracing::debug;

use warpath_core::{Result, Warfile, WarpathError};

use crate::bean::BeanDefinition;

pub struct SpringContext {
    parent: Option<Arc<SpringContext>>,
    beans: BTreeMap<String, BeanDefinition>,
    component_scan_packages: Vec<String>,
}

impl SpringContext {
    /// Loads a context from a location string: a comma-separated list of
    /// resource locators, each either `classpath:`-relative or
    /// archive-absolute. Later locations override earlier ones' same-named
    /// beans. A location that cannot be resolved or parsed fails the whole
    /// context; an empty context would silently resolve to no mappings.
    pub fn load(
        war: &Warfile,
        context_location: &str,
        parent: Option<Arc<SpringContext>>,
    ) -> Result<SpringContext> {
        let mut context = SpringContext {
            parent,
            beans: BTreeMap::new(),
            component_scan_packages: Vec::new(),
        };
        for location in decompose_location(context_location) {
            debug!("parsing context resource: {location}");
            let bytes = open_resource(war, location)?
                .ok_or_else(|| WarpathError::ContextLocation(location.to_string()))?;
            let text = String::from_utf8(bytes).map_err(|e| WarpathError::ContextParse {
                location: location.to_string(),
                detail: e.to_string(),
            })?;
            context.add_definitions(location, &text)?;
        }
        Ok(context)
    }

    /// Builds a context from already-loaded documents. Primarily a test
    /// seam; `load` is the production path.
    pub fn from_xml(texts: &[&str], parent: Option<Arc<SpringContext>>) -> Result<SpringContext> {
        let mut context = SpringContext {
            parent,
            beans: BTreeMap::new(),
            component_scan_packages: Vec::new(),
        };
        for (index, text) in texts.iter().enumerate() {
            context.add_definitions(&format!("inline:{index}"), text)?;
        }
        Ok(context)
    }

    /// The definition for a named bean, delegating to the parent when not
    /// found locally.
    pub fn bean(&self, name: &str) -> Option<&BeanDefinition> {
        self.beans
            .get(name)
            .or_else(|| self.parent.as_ref().and_then(|parent| parent.bean(name)))
    }

    /// Every bean whose declared class matches, local definitions first,
    /// then the parent's matches.
    pub fn beans_by_class(&self, class_name: &str) -> Vec<&BeanDefinition> {
        let mut result: Vec<&BeanDefinition> = self
            .beans
            .values()
            .filter(|bean| bean.class() == class_name)
            .collect();
        if let Some(parent) = &self.parent {
            result.extend(parent.beans_by_class(class_name));
        }
        result
    }

    /// The combined bean map: the parent's set overlaid with local
    /// definitions, local winning on name collisions.
    pub fn beans(&self) -> BTreeMap<&str, &BeanDefinition> {
        let mut combined = match &self.parent {
            Some(parent) => parent.beans(),
            None => BTreeMap::new(),
        };
        for (name, bean) in &self.beans {
            combined.insert(name.as_str(), bean);
        }
        combined
    }

    /// Base packages named by `<component-scan>` elements, this level plus
    /// its ancestors.
    pub fn component_scan_packages(&self) -> Vec<String> {
        let mut packages = match &self.parent {
            Some(parent) => parent.component_scan_packages(),
            None => Vec::new(),
        };
        packages.extend(self.component_scan_packages.iter().cloned());
        packages
    }

    fn add_definitions(&mut self, location: &str, text: &str) -> Result<()> {
        let document = Document::parse(text).map_err(|e| WarpathError::ContextParse {
            location: location.to_string(),
            detail: e.to_string(),
        })?;

        let mut count = 0usize;
        for node in document.root_element().children().filter(|n| n.is_element()) {
            match node.tag_name().name() {
                "bean" => {
                    if let Some(definition) = BeanDefinition::from_node(&node) {
                        // duplicate names within one level: last write wins
                        self.beans.insert(definition.name().to_string(), definition);
                        count += 1;
                    }
                }
                "component-scan" => {
                    if let Some(packages) = node.attribute("base-package") {
                        self.component_scan_packages.extend(
                            packages
                                .split([',', ';'])
                                .map(str::trim)
                                .filter(|p| !p.is_empty())
                                .map(str::to_string),
                        );
                    }
                }
                _ => {}
            }
        }
        debug!("found {count} bean definition(s) in {location}");
        Ok(())
    }
}

fn decompose_location(context_location: &str) -> impl Iterator<Item = &str> {
    context_location
        .split(',')
        .map(str::trim)
        .filter(|location| !location.is_empty())
}

fn open_resource(war: &Warfile, location: &str) -> Result<Option<Vec<u8>>> {
    match location.strip_prefix("classpath:") {
        Some(path) => war.open_classpath_file(path),
        None => war.open_file(location),
    }
}
