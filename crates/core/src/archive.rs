//! ZIP packaging for multi-file results.

use crate::error::Result;
use std::collections::HashSet;
use std::io::{Cursor, Write};
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Pack `entries` into a deflated ZIP in the given order.
///
/// Repeated names get a ` (n)` suffix before the extension so no entry
/// shadows another.
pub fn package_zip<N, D>(entries: &[(N, D)]) -> Result<Vec<u8>>
where
    N: AsRef<str>,
    D: AsRef<[u8]>,
{
    let mut buffer = Vec::new();
    {
        let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut used = HashSet::new();

        for (name, data) in entries {
            let name = unique_name(name.as_ref(), &mut used);
            zip.start_file(name.as_str(), options)?;
            zip.write_all(data.as_ref())?;
        }
        zip.finish()?;
    }
    debug!("Packaged {} entries into {} byte archive", entries.len(), buffer.len());
    Ok(buffer)
}

fn unique_name(name: &str, used: &mut HashSet<String>) -> String {
    if used.insert(name.to_string()) {
        return name.to_string();
    }
    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (name, None),
    };
    let mut n = 2;
    loop {
        let candidate = match ext {
            Some(ext) => format!("{} ({}).{}", stem, n, ext),
            None => format!("{} ({})", name, n),
        };
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}
