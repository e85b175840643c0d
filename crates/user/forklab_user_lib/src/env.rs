use std::{env, path::Path};

/// Returns the file name the current program was invoked as.
#[must_use]
pub fn arg0() -> String {
    env::args_os()
        .next()
        .as_deref()
        .map(Path::new)
        .and_then(Path::file_name)
        .map_or_else(
            || env!("CARGO_PKG_NAME").to_owned(),
            |name| name.to_string_lossy().into_owned(),
        )
}
