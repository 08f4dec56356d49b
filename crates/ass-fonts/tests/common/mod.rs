//! Shared fixtures for integration tests
//!
//! Font files here are plain text, `postscript|family|full|weight|italic`,
//! read by [`TextBackend`]. Subsetting appends `#chars:names` so tests can
//! see which characters and names reached the subsetter.

#![allow(dead_code)]

use std::{
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use ass_fonts::{
    fonts::{FaceNames, FontBackend, FontError, StyleFlag, SystemFontCatalog},
    EmbedConfig, FontSession,
};

/// Backend for the text font format
#[derive(Debug, Default)]
pub struct TextBackend;

/// Text of a fake font file
pub fn font_text(postscript: &str, family: &str, full: &str, weight: u16, italic: bool) -> String {
    format!(
        "{postscript}|{family}|{full}|{weight}|{}",
        u8::from(italic)
    )
}

impl FontBackend for TextBackend {
    fn read_faces(&self, data: &[u8]) -> Result<Vec<FaceNames>, FontError> {
        let text = std::str::from_utf8(data).map_err(FontError::malformed)?;
        let header = text.split('#').next().unwrap_or_default();
        let fields: Vec<&str> = header.split('|').collect();
        let [postscript, family, full, weight, italic] = fields.as_slice() else {
            return Err(FontError::malformed("expected five fields"));
        };
        Ok(vec![FaceNames {
            postscript_name: (*postscript).to_string(),
            family_names: BTreeSet::from([(*family).to_string()]),
            full_names: BTreeSet::from([(*full).to_string()]),
            weight: weight.parse().map_err(FontError::malformed)?,
            style: if *italic == "1" {
                StyleFlag::Italic
            } else {
                StyleFlag::Normal
            },
        }])
    }

    fn extract_face(&self, data: &[u8], _index: u32) -> Result<Vec<u8>, FontError> {
        Ok(data.to_vec())
    }

    fn subset(
        &self,
        data: &[u8],
        _index: u32,
        chars: &BTreeSet<char>,
        preserve_names: &BTreeSet<String>,
    ) -> Result<Vec<u8>, FontError> {
        let text = std::str::from_utf8(data).map_err(FontError::subset_failed)?;
        let header = text.split('#').next().unwrap_or_default();
        let chars: String = chars.iter().collect();
        let names: Vec<&str> = preserve_names.iter().map(String::as_str).collect();
        Ok(format!("{header}#{chars}:{}", names.join(",")).into_bytes())
    }
}

/// System catalog answering from a fixed list of `(name, path)` pairs
#[derive(Debug, Default)]
pub struct FakeCatalog {
    fonts: Mutex<Vec<(String, PathBuf)>>,
}

impl FakeCatalog {
    pub fn with<P: AsRef<Path>>(fonts: &[(&str, P)]) -> Self {
        Self {
            fonts: Mutex::new(
                fonts
                    .iter()
                    .map(|(name, path)| (name.to_lowercase(), path.as_ref().to_path_buf()))
                    .collect(),
            ),
        }
    }
}

impl SystemFontCatalog for FakeCatalog {
    fn match_font(&self, name: &str, _bold: bool, _italic: bool) -> Option<PathBuf> {
        let name = name.to_lowercase();
        self.fonts
            .lock()
            .ok()?
            .iter()
            .find(|(known, _)| *known == name)
            .map(|(_, path)| path.clone())
    }
}

/// Write a fake font file and return its path
pub fn write_font(dir: &Path, file: &str, contents: &str) -> PathBuf {
    let path = dir.join(file);
    fs::write(&path, contents).unwrap();
    path
}

/// Script with the given style and event lines
pub fn script(styles: &[&str], events: &[&str]) -> String {
    let mut text = String::from("[Script Info]\nTitle: test\nScriptType: v4.00+\n\n");
    text.push_str("[V4+ Styles]\nFormat: Name, Fontname, Fontsize, Bold, Italic\n");
    for style in styles {
        text.push_str(style);
        text.push('\n');
    }
    text.push_str("\n[Events]\nFormat: Layer, Start, End, Style, Text\n");
    for event in events {
        text.push_str(event);
        text.push('\n');
    }
    text
}

/// Write `text` as `sub.ass` in `dir` and open a session on it
pub fn open_session(
    dir: &Path,
    text: &str,
    system: Option<Arc<FakeCatalog>>,
    config: EmbedConfig,
) -> FontSession {
    let path = dir.join("sub.ass");
    fs::write(&path, text).unwrap();
    let system = system.map(|catalog| catalog as Arc<dyn SystemFontCatalog>);
    FontSession::open(&path, None, Arc::new(TextBackend), system, config).unwrap()
}
