//! Scans a WAR's classpath, applying zero or more filters to the classes
//! found there. An unconfigured scanner (one without filters) returns every
//! class on the classpath, including classes bundled inside library jars.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::classfile::{self, AnnotationInfo};
use crate::error::Result;
use crate::warfile::Warfile;

const CLASS_SUFFIX: &str = ".class";

#[derive(Debug, Default, Clone)]
pub struct ClasspathScanner {
    // package name -> include sub-packages
    base_packages: Vec<(String, bool)>,
    required_annotations: Option<BTreeSet<String>>,
}

impl ClasspathScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the scan to a package, optionally including sub-packages.
    /// May be called repeatedly; a class passes if any base package accepts
    /// it.
    pub fn with_base_package(mut self, package: impl Into<String>, recurse: bool) -> Self {
        self.base_packages.push((package.into(), recurse));
        self
    }

    pub fn with_base_packages(
        mut self,
        packages: impl IntoIterator<Item = String>,
        recurse: bool,
    ) -> Self {
        for package in packages {
            self.base_packages.push((package, recurse));
        }
        self
    }

    /// Restricts the scan to classes carrying at least one of the named
    /// class-level annotations. Replaces any previously configured set.
    pub fn with_required_annotations(
        mut self,
        annotations: impl IntoIterator<Item = String>,
    ) -> Self {
        self.required_annotations = Some(annotations.into_iter().collect());
        self
    }

    /// Returns the names of the classes passing every configured filter.
    /// The sorted order eases debugging; it is not part of the contract.
    pub fn scan(&self, war: &Warfile) -> Result<BTreeSet<String>> {
        if self.required_annotations.is_none() {
            return Ok(self.package_candidates(war).into_iter().collect());
        }
        let mut result = BTreeSet::new();
        self.scan_decoding(war, |class_name, _| {
            result.insert(class_name);
        })?;
        Ok(result)
    }

    /// Like `scan`, but returns the decoded class-level annotations of every
    /// matching class so that callers can reuse them without reparsing.
    pub fn scan_with_annotations(
        &self,
        war: &Warfile,
    ) -> Result<BTreeMap<String, Vec<AnnotationInfo>>> {
        let mut result = BTreeMap::new();
        self.scan_decoding(war, |class_name, annotations| {
            result.insert(class_name, annotations);
        })?;
        Ok(result)
    }

    /// Decodes every candidate class and applies the annotation filter.
    /// Classes that cannot be decoded fail the whole scan.
    fn scan_decoding(
        &self,
        war: &Warfile,
        mut accept: impl FnMut(String, Vec<AnnotationInfo>),
    ) -> Result<()> {
        for class_name in self.package_candidates(war) {
            let class = war.load_class(&class_name)?;
            let annotations = classfile::visible_annotations(&class_name, &class)?;
            if self.matches_annotations(&annotations) {
                accept(class_name, annotations);
            }
        }
        Ok(())
    }

    fn package_candidates(&self, war: &Warfile) -> Vec<String> {
        let mut candidates = Vec::new();
        for file in war.classpath_files() {
            let Some(stem) = file.strip_suffix(CLASS_SUFFIX) else {
                continue;
            };
            let class_name = stem.replace('/', ".");
            if self.matches_base_package(&class_name) {
                candidates.push(class_name);
            }
        }
        debug!("{} classpath candidate(s) after package filter", candidates.len());
        candidates
    }

    fn matches_base_package(&self, class_name: &str) -> bool {
        if self.base_packages.is_empty() {
            return true;
        }
        self.base_packages.iter().any(|(package, recurse)| {
            let Some(rest) = class_name.strip_prefix(package.as_str()) else {
                return false;
            };
            if *recurse {
                return true;
            }
            // non-recursive: no package separator may remain past the prefix
            let rest = rest.strip_prefix('.').unwrap_or(rest);
            !rest.contains('.')
        })
    }

    fn matches_annotations(&self, annotations: &[AnnotationInfo]) -> bool {
        match &self.required_annotations {
            None => true,
            Some(required) => annotations
                .iter()
                .any(|annotation| required.contains(&annotation.class_name)),
        }
    }
}
