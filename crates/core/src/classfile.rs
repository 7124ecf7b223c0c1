//! Decoding of class-level, runtime-retained annotations.
//!
//! Only the member shapes that declarative routing actually uses are
//! decoded: strings, enum constants, and arrays of either. Everything else
//! (nested annotations, class literals, numeric constants) is ignored.

use std::collections::BTreeMap;

use ristretto_classfile::attributes::{Annotation, AnnotationElement, Attribute};
use ristretto_classfile::{ClassFile, ConstantPool};

use crate::error::{Result, WarpathError};

/// A decoded member value. Enum constants decode to their constant name;
/// arrays flatten to the string forms of their decodable items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberValue {
    Text(String),
    List(Vec<String>),
}

impl MemberValue {
    /// The value as a list, treating a scalar as a one-element list.
    pub fn as_list(&self) -> Vec<&str> {
        match self {
            MemberValue::Text(text) => vec![text.as_str()],
            MemberValue::List(items) => items.iter().map(String::as_str).collect(),
        }
    }
}

/// One class-level annotation: the annotation's class name plus its decoded
/// members.
#[derive(Debug, Clone)]
pub struct AnnotationInfo {
    pub class_name: String,
    pub members: BTreeMap<String, MemberValue>,
}

impl AnnotationInfo {
    pub fn member(&self, name: &str) -> Option<&MemberValue> {
        self.members.get(name)
    }
}

/// Decodes the `RuntimeVisibleAnnotations` attribute of a class. Decoding
/// failures are errors: a truncated constant pool means the class file is
/// not trustworthy.
pub fn visible_annotations(class_name: &str, class: &ClassFile) -> Result<Vec<AnnotationInfo>> {
    let mut result = Vec::new();
    for attribute in &class.attributes {
        let Attribute::RuntimeVisibleAnnotations { annotations, .. } = attribute else {
            continue;
        };
        for annotation in annotations {
            result.push(decode_annotation(class_name, &class.constant_pool, annotation)?);
        }
    }
    Ok(result)
}

fn decode_annotation(
    class_name: &str,
    pool: &ConstantPool,
    annotation: &Annotation,
) -> Result<AnnotationInfo> {
    let descriptor = utf8(class_name, pool, annotation.type_index)?;
    let mut members = BTreeMap::new();
    for element in &annotation.elements {
        let name = utf8(class_name, pool, element.name_index)?;
        if let Some(value) = decode_element(pool, &element.value) {
            members.insert(name, value);
        }
    }
    Ok(AnnotationInfo {
        class_name: descriptor_to_class_name(&descriptor),
        members,
    })
}

fn decode_element(pool: &ConstantPool, element: &AnnotationElement) -> Option<MemberValue> {
    match element {
        AnnotationElement::String { const_value_index } => pool
            .try_get_utf8(*const_value_index)
            .ok()
            .map(|text| MemberValue::Text(text.to_string())),
        AnnotationElement::Enum {
            const_name_index, ..
        } => pool
            .try_get_utf8(*const_name_index)
            .ok()
            .map(|constant| MemberValue::Text(constant.to_string())),
        AnnotationElement::Array { values } => {
            let mut items = Vec::new();
            for value in values {
                if let Some(MemberValue::Text(text)) = decode_element(pool, value) {
                    items.push(text);
                }
            }
            Some(MemberValue::List(items))
        }
        _ => None,
    }
}

fn utf8(class_name: &str, pool: &ConstantPool, index: u16) -> Result<String> {
    pool.try_get_utf8(index)
        .map(|text| text.to_string())
        .map_err(|e| WarpathError::ClassDecode {
            class_name: class_name.to_string(),
            detail: e.to_string(),
        })
}

/// `Lcom/example/Foo;` → `com.example.Foo`
fn descriptor_to_class_name(descriptor: &str) -> String {
    descriptor
        .strip_prefix('L')
        .and_then(|s| s.strip_suffix(';'))
        .unwrap_or(descriptor)
        .replace('/', ".")
}
