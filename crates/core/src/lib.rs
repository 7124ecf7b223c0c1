pub mod classfile;
pub mod error;
pub mod inspector;
pub mod logging;
pub mod paths;
pub mod scanner;
pub mod warfile;

pub use error::{Result, WarpathError};
pub use inspector::{Inspector, run_inspectors};
pub use paths::{Destination, HttpMethod, PathRepo};
pub use scanner::ClasspathScanner;
pub use warfile::{ServletMapping, Warfile};
