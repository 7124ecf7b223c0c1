//! Spring front-controller resolution.
//!
//! The baseline inspector registers a `DispatcherServlet` mapping like any
//! other servlet. This crate's inspector recognizes those mappings, retracts
//! them, resolves the servlet's application context, and registers the
//! bean-level mappings that the dispatcher would actually serve.

mod bean;
mod context;
mod inspector;

pub use bean::{BeanDefinition, PropertyValue};
pub use context::SpringContext;
pub use inspector::{SpringDestination, SpringInspector};

/// Well-known Spring class and annotation names.
pub mod constants {
    pub const DISPATCHER_SERVLET: &str = "org.springframework.web.servlet.DispatcherServlet";
    pub const SIMPLE_URL_HANDLER: &str =
        "org.springframework.web.servlet.handler.SimpleUrlHandlerMapping";
    pub const BEAN_NAME_URL_HANDLER: &str =
        "org.springframework.web.servlet.handler.BeanNameUrlHandlerMapping";
    pub const CONTROLLER_ANNOTATION: &str = "org.springframework.stereotype.Controller";
    pub const REQUEST_MAPPING_ANNOTATION: &str =
        "org.springframework.web.bind.annotation.RequestMapping";
    pub const CONTEXT_CONFIG_LOCATION: &str = "contextConfigLocation";
}
