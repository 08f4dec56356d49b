//! `[Fonts]` section
//!
//! Each attachment starts with a `fontname: <embed name>` line followed by
//! encoded data lines and ends at a blank line. Several attachments may
//! share an embed name, so every name maps to an ordered list of blobs and
//! a font is addressed by `(name, index)`.
//!
//! The encoded alphabet contains no lower-case letters, which is what makes
//! the `fontname:` prefix unambiguous inside data.

use indexmap::IndexMap;

use crate::utils::{
    errors::{CoreError, Result},
    uu,
};

/// Prefix of the line that opens an attachment
pub const FONTNAME_PREFIX: &str = "fontname:";

/// Default width of encoded data lines
pub const DEFAULT_LINE_WIDTH: usize = 80;

/// Embedded fonts keyed by embed name
///
/// Data is stored encoded, one string per attachment with line breaks
/// removed. Cloning yields an independent deep copy, which is what apply
/// uses as its rollback snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FontTable {
    entries: IndexMap<String, Vec<String>>,
}

impl FontTable {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a section line
    ///
    /// `open` is the parser's cursor naming the attachment currently being
    /// read. Returns `false` on a blank line, which closes the attachment and
    /// lets the next line start a new section; `true` otherwise.
    pub fn append(&mut self, line: &str, open: &mut Option<String>) -> bool {
        if line.is_empty() {
            *open = None;
            return false;
        }

        if let Some(name) = line.strip_prefix(FONTNAME_PREFIX) {
            let name = name.trim();
            if name.is_empty() {
                *open = None;
            } else {
                self.entries
                    .entry(name.to_string())
                    .or_default()
                    .push(String::new());
                *open = Some(name.to_string());
            }
        } else if let Some(blob) = open
            .as_deref()
            .and_then(|name| self.entries.get_mut(name))
            .and_then(|blobs| blobs.last_mut())
        {
            blob.push_str(line);
        }
        true
    }

    /// Encode and store font bytes, returning the index written
    ///
    /// With `overwrite` and an existing `(name, index)` the blob is replaced
    /// in place; otherwise it is appended to the name's list.
    pub fn add(&mut self, data: &[u8], name: &str, index: usize, overwrite: bool) -> usize {
        let encoded = uu::encode(data);
        let blobs = self.entries.entry(name.to_string()).or_default();
        if overwrite && index < blobs.len() {
            blobs[index] = encoded;
            index
        } else {
            blobs.push(encoded);
            blobs.len() - 1
        }
    }

    /// Remove one attachment, dropping the name once its list is empty
    ///
    /// Returns the encoded data that was removed.
    pub fn remove(&mut self, name: &str, index: usize) -> Option<String> {
        let blobs = self.entries.get_mut(name)?;
        if index >= blobs.len() {
            return None;
        }
        let removed = blobs.remove(index);
        if blobs.is_empty() {
            self.entries.shift_remove(name);
        }
        Some(removed)
    }

    /// Decode one attachment to bytes
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MissingAttachment`] for an unknown `(name, index)`
    /// and [`CoreError::Codec`] for malformed data.
    pub fn decode(&self, name: &str, index: usize) -> Result<Vec<u8>> {
        let blob = self
            .entries
            .get(name)
            .and_then(|blobs| blobs.get(index))
            .ok_or_else(|| CoreError::MissingAttachment {
                name: name.to_string(),
                index,
            })?;
        Ok(uu::decode(blob)?)
    }

    /// Encoded blobs stored under a name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.entries.get(name).map(Vec::as_slice)
    }

    /// Check whether an embed name exists
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Iterate `(name, blobs)` in document order
    pub fn entries(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, blobs)| (name.as_str(), blobs.as_slice()))
    }

    /// Number of distinct embed names
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Total number of attachments
    #[must_use]
    pub fn blob_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// Check whether the table holds no attachments
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write the section with data lines of `line_width` characters
    ///
    /// Attachments are separated by one blank line; nothing is written for an
    /// empty table.
    pub fn write_to(&self, out: &mut Vec<String>, line_width: usize) {
        if self.entries.is_empty() {
            return;
        }
        out.push("[Fonts]".to_string());
        let mut first = true;
        for (name, blobs) in &self.entries {
            for blob in blobs {
                if !first {
                    out.push(String::new());
                }
                first = false;
                out.push(format!("{FONTNAME_PREFIX} {name}"));
                out.extend(uu::wrap_lines(blob, line_width).map(str::to_string));
            }
        }
    }
}
