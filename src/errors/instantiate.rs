use alloc::string::String;

/// Error returned by user code: constructors, setters and lazy computations.
#[derive(thiserror::Error, Debug)]
pub enum InstantiateErrorKind {
    #[error("Argument `{name}` is missing")]
    MissingArgument { name: String },
    #[error("Argument `{name}` is {actual}, expected {expected}")]
    MismatchedArgument {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },
    #[error("Instance passed to setter isn't a `{expected}`")]
    MismatchedReceiver { expected: &'static str },
    #[error(transparent)]
    Custom(#[from] anyhow::Error),
}
