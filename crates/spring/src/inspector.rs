//! The front-controller inspector.
//!
//! Runs after the baseline inspector. For every servlet mapping whose class
//! is the Spring dispatcher it retracts the baseline entry and replaces it
//! with the bean-level mappings resolved from the dispatcher's application
//! context, registered under the prefix derived from the retracted pattern.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use warpath_core::classfile::AnnotationInfo;
use warpath_core::{
    ClasspathScanner, Destination, HttpMethod, Inspector, PathRepo, Result, ServletMapping,
    Warfile,
};

use crate::constants::{
    BEAN_NAME_URL_HANDLER, CONTEXT_CONFIG_LOCATION, CONTROLLER_ANNOTATION, DISPATCHER_SERVLET,
    REQUEST_MAPPING_ANNOTATION, SIMPLE_URL_HANDLER,
};
use crate::context::SpringContext;

/// A URL resolved to a Spring-managed bean.
pub struct SpringDestination {
    bean_name: String,
    bean_class: String,
}

impl SpringDestination {
    pub fn new(bean_name: impl Into<String>, bean_class: impl Into<String>) -> Self {
        Self {
            bean_name: bean_name.into(),
            bean_class: bean_class.into(),
        }
    }

    /// For component-scanned classes, which have no declared bean name:
    /// Spring derives one by decapitalizing the simple class name.
    pub fn for_class(class_name: &str) -> Self {
        let simple = class_name.rsplit('.').next().unwrap_or(class_name);
        let mut bean_name = String::with_capacity(simple.len());
        let mut chars = simple.chars();
        if let Some(first) = chars.next() {
            bean_name.extend(first.to_lowercase());
            bean_name.push_str(chars.as_str());
        }
        Self::new(bean_name, class_name)
    }

    pub fn bean_name(&self) -> &str {
        &self.bean_name
    }
}

impl fmt::Display for SpringDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.bean_class.is_empty() {
            write!(f, "bean \"{}\"", self.bean_name)
        } else {
            write!(f, "{} (bean \"{}\")", self.bean_class, self.bean_name)
        }
    }
}

impl Destination for SpringDestination {
    fn is_implemented_by(&self, class_name: &str) -> bool {
        !self.bean_class.is_empty() && class_name == self.bean_class
    }
}

pub struct SpringInspector;

impl Inspector for SpringInspector {
    fn name(&self) -> &'static str {
        "SpringInspector"
    }

    fn inspect(&self, war: &Warfile, paths: &mut PathRepo) -> Result<()> {
        let dispatchers: Vec<&ServletMapping> = war
            .servlet_mappings()
            .iter()
            .filter(|mapping| mapping.servlet_class == DISPATCHER_SERVLET)
            .collect();
        if dispatchers.is_empty() {
            debug!("no front-controller mappings declared");
            return Ok(());
        }

        let root_context = match war.context_param(CONTEXT_CONFIG_LOCATION) {
            Some(location) => Some(Arc::new(SpringContext::load(war, location, None)?)),
            None => None,
        };

        for mapping in dispatchers {
            self.resolve_dispatcher(war, mapping, root_context.clone(), paths)?;
        }
        Ok(())
    }
}

impl SpringInspector {
    fn resolve_dispatcher(
        &self,
        war: &Warfile,
        mapping: &ServletMapping,
        root_context: Option<Arc<SpringContext>>,
        paths: &mut PathRepo,
    ) -> Result<()> {
        let location = match mapping.init_params.get(CONTEXT_CONFIG_LOCATION) {
            Some(location) => location.clone(),
            None => {
                // Spring's convention for an unconfigured dispatcher
                let location = format!("/WEB-INF/{}-servlet.xml", mapping.servlet_name);
                if war.open_file(&location)?.is_none() {
                    warn!(
                        "front controller \"{}\" has no resolvable configuration ({location} absent), keeping baseline entry",
                        mapping.servlet_name
                    );
                    return Ok(());
                }
                location
            }
        };

        debug!(
            "resolving front controller \"{}\" mapped to {}",
            mapping.servlet_name, mapping.url_pattern
        );
        paths.remove(&mapping.url_pattern, HttpMethod::Any);
        let prefix = url_prefix(&mapping.url_pattern);

        let context = SpringContext::load(war, &location, root_context)?;
        self.process_simple_url_mappings(&context, prefix, paths);
        self.process_bean_name_mappings(&context, prefix, paths);
        self.process_component_scans(war, &context, prefix, paths)?;
        Ok(())
    }

    fn process_simple_url_mappings(
        &self,
        context: &SpringContext,
        prefix: &str,
        paths: &mut PathRepo,
    ) {
        let handlers = context.beans_by_class(SIMPLE_URL_HANDLER);
        debug!("found {} SimpleUrlHandlerMapping bean(s)", handlers.len());

        for handler in handlers {
            let Some(mappings) = handler.property_as_properties("mappings") else {
                warn!("SimpleUrlHandlerMapping bean {} has no mappings", handler.name());
                continue;
            };
            if mappings.is_empty() {
                warn!("SimpleUrlHandlerMapping bean {} has no mappings", handler.name());
                continue;
            }

            for (relative, bean_name) in mappings {
                // verbatim concatenation: the framework does not normalize either half
                let url = format!("{prefix}{relative}");
                let Some(bean) = context.bean(&bean_name) else {
                    warn!("mapping {url} references missing bean \"{bean_name}\", skipped");
                    continue;
                };
                debug!("mapped {url} to bean \"{bean_name}\"");
                paths.put_all(url, Box::new(SpringDestination::new(bean_name, bean.class())));
            }
        }
    }

    fn process_bean_name_mappings(
        &self,
        context: &SpringContext,
        prefix: &str,
        paths: &mut PathRepo,
    ) {
        if context.beans_by_class(BEAN_NAME_URL_HANDLER).is_empty() {
            debug!("did not find BeanNameUrlHandlerMapping");
            return;
        }
        debug!("found BeanNameUrlHandlerMapping; scanning for beans with URL names");

        for (name, bean) in context.beans() {
            if !name.starts_with('/') {
                continue;
            }
            let url = format!("{prefix}{name}");
            debug!("mapped {url} to bean \"{name}\"");
            paths.put_all(url, Box::new(SpringDestination::new(name, bean.class())));
        }
    }

    fn process_component_scans(
        &self,
        war: &Warfile,
        context: &SpringContext,
        prefix: &str,
        paths: &mut PathRepo,
    ) -> Result<()> {
        let packages = context.component_scan_packages();
        if packages.is_empty() {
            return Ok(());
        }

        let scanner = ClasspathScanner::new()
            .with_base_packages(packages, true)
            .with_required_annotations([CONTROLLER_ANNOTATION.to_string()]);
        let controllers = scanner.scan_with_annotations(war)?;
        debug!("component scan found {} controller(s)", controllers.len());

        for (class_name, annotations) in controllers {
            let Some(mapping) = annotations
                .iter()
                .find(|annotation| annotation.class_name == REQUEST_MAPPING_ANNOTATION)
            else {
                warn!("controller {class_name} has no class-level request mapping, skipped");
                continue;
            };
            register_controller(&class_name, mapping, prefix, paths);
        }
        Ok(())
    }
}

fn register_controller(
    class_name: &str,
    mapping: &AnnotationInfo,
    prefix: &str,
    paths: &mut PathRepo,
) {
    let mapping_paths: Vec<&str> = mapping
        .member("value")
        .or_else(|| mapping.member("path"))
        .map(|member| member.as_list())
        .unwrap_or_default();
    if mapping_paths.is_empty() {
        warn!("controller {class_name} declares a request mapping without paths, skipped");
        return;
    }

    let methods: Vec<HttpMethod> = mapping
        .member("method")
        .map(|member| {
            member
                .as_list()
                .into_iter()
                .filter_map(|name| {
                    let method = HttpMethod::from_name(name);
                    if method.is_none() {
                        debug!("controller {class_name}: unsupported request method {name}");
                    }
                    method
                })
                .collect()
        })
        .unwrap_or_default();

    for path in mapping_paths {
        let url = format!("{prefix}{path}");
        debug!("mapped {url} to controller {class_name}");
        if methods.is_empty() {
            paths.put_all(url, Box::new(SpringDestination::for_class(class_name)));
        } else {
            for method in &methods {
                paths.put(
                    url.clone(),
                    *method,
                    Box::new(SpringDestination::for_class(class_name)),
                );
            }
        }
    }
}

/// The URL prefix for delegated mappings: the dispatcher's own pattern with
/// its final path segment removed (`/app/*` becomes `/app`).
fn url_prefix(url_pattern: &str) -> &str {
    match url_pattern.rfind('/') {
        Some(index) => &url_pattern[..index],
        None => url_pattern,
    }
}
