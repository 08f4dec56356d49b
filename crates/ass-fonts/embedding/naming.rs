//! Embed name generation

use std::path::Path;

/// Extension every generated embed name carries
pub const EMBED_EXTENSION: &str = ".ttf";

/// Pick an embed name for a font file that no attachment uses yet
///
/// The name is the file stem, plus `suffix` when subsetting and the stem
/// does not already end with it, then `_2`, `_3`, ... until `taken`
/// rejects it no more.
#[must_use]
pub fn unique_embed_name(
    source: &Path,
    subset: bool,
    suffix: &str,
    taken: impl Fn(&str) -> bool,
) -> String {
    let mut stem = source
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    if subset && !stem.ends_with(suffix) {
        stem.push_str(suffix);
    }

    let mut candidate = format!("{stem}{EMBED_EXTENSION}");
    let mut counter = 2;
    while taken(&candidate) {
        candidate = format!("{stem}_{counter}{EMBED_EXTENSION}");
        counter += 1;
    }
    candidate
}
