use alloc::string::String;

#[derive(thiserror::Error, Debug)]
pub enum ResourceErrorKind {
    #[error("Resource `{path}` not found")]
    NotFound { path: String },
    #[error("Resource `{path}` can't be loaded: no loader available")]
    Unsupported { path: String },
    #[cfg(feature = "std")]
    #[error("Resource `{path}` can't be read: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Custom(#[from] anyhow::Error),
}
