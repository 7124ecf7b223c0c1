use thiserror::Error;

#[derive(Error, Debug)]
pub enum WarpathError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("not a web archive: {0}")]
    BadArchive(String),
    #[error("malformed deployment descriptor: {0}")]
    Descriptor(String),
    #[error("unable to decode class {class_name}: {detail}")]
    ClassDecode { class_name: String, detail: String },
    #[error("invalid context location: {0}")]
    ContextLocation(String),
    #[error("unparseable context {location}: {detail}")]
    ContextParse { location: String, detail: String },
}

pub type Result<T> = std::result::Result<T, WarpathError>;
