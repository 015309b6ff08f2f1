#[cfg(not(feature = "std"))]
use alloc::string::ToString as _;

use crate::{errors::ResourceErrorKind, value::Value};

/// Loads resources for include and require lazies
pub trait ResourceLoader: Send + Sync {
    /// # Errors
    /// Returns [`ResourceErrorKind`] if the resource is missing or can't be loaded.
    fn load(&self, path: &str) -> Result<Value, ResourceErrorKind>;
}

impl<F> ResourceLoader for F
where
    F: Fn(&str) -> Result<Value, ResourceErrorKind> + Send + Sync,
{
    #[inline]
    fn load(&self, path: &str) -> Result<Value, ResourceErrorKind> {
        self(path)
    }
}

/// Reads UTF-8 files from the file system into [`Value::Str`].
#[cfg(feature = "std")]
#[derive(Clone, Copy, Debug, Default)]
pub struct FsLoader;

#[cfg(feature = "std")]
impl ResourceLoader for FsLoader {
    fn load(&self, path: &str) -> Result<Value, ResourceErrorKind> {
        use alloc::string::ToString as _;
        use std::io::ErrorKind;

        match std::fs::read_to_string(path) {
            Ok(content) => Ok(Value::Str(content)),
            Err(err) if err.kind() == ErrorKind::NotFound => Err(ResourceErrorKind::NotFound { path: path.to_string() }),
            Err(err) => Err(ResourceErrorKind::Io {
                path: path.to_string(),
                source: err,
            }),
        }
    }
}

/// Loader used without `std`, it can't load anything.
#[cfg(not(feature = "std"))]
#[derive(Clone, Copy, Debug, Default)]
pub struct NoLoader;

#[cfg(not(feature = "std"))]
impl ResourceLoader for NoLoader {
    fn load(&self, path: &str) -> Result<Value, ResourceErrorKind> {
        Err(ResourceErrorKind::Unsupported { path: path.to_string() })
    }
}

#[cfg(feature = "std")]
pub(crate) type DefaultLoader = FsLoader;
#[cfg(not(feature = "std"))]
pub(crate) type DefaultLoader = NoLoader;

#[cfg(all(test, feature = "std"))]
mod tests {
    extern crate std;

    use super::{FsLoader, ResourceLoader as _};
    use crate::{ResourceErrorKind, Value};

    use std::{env, fs, process};

    #[test]
    fn test_fs_loader() {
        let path = env::temp_dir().join(std::format!("lazydi-loader-{}.txt", process::id()));
        fs::write(&path, "host = localhost").unwrap();

        let loaded = FsLoader.load(path.to_str().unwrap());
        fs::remove_file(&path).unwrap();

        assert_eq!(loaded.unwrap(), Value::from("host = localhost"));
        assert!(matches!(
            FsLoader.load("/nonexistent/lazydi/resource.txt"),
            Err(ResourceErrorKind::NotFound { .. })
        ));
    }
}
