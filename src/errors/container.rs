use alloc::string::String;

#[derive(thiserror::Error, Debug)]
pub enum ConfigErrorKind {
    #[error("Container is locked. Definitions can't be changed after resolution has begun.")]
    Locked,
    #[error("Service `{name}` is already defined in container")]
    ServiceAlreadyDefined { name: String },
}
