// Logrep - platform/fs.rs
//
// Output sink creation. `-` means stdout; anything else is created (or
// truncated) as a regular file, with missing parent directories created.

use crate::util::constants;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Open the destination for the results.
pub fn create_output(path: &Path) -> io::Result<Box<dyn Write>> {
    if path.as_os_str() == constants::STDOUT_PATH {
        return Ok(Box::new(BufWriter::new(io::stdout().lock())));
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    tracing::debug!(path = %path.display(), "Output file created");
    Ok(Box::new(BufWriter::new(file)))
}
