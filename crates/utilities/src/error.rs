use std::error::Error;

/// The error type used at crate and tool boundaries. Library code returns its
/// own `thiserror` enums, which convert into this type through `?`.
pub type FasimError = Box<dyn Error + Send + Sync>;
