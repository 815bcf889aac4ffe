use crate::bulk::{self, BulkOp};
use crate::error::EditError;
use crate::model::{ConnectionField, Document};
use crate::project::{ParameterRecord, project};
use crate::resolve::{self, FlagKind, FlagValue, Slot};
use crate::statics;
use crate::value::{ConfigValue, Layout};
use anyhow::Context;
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// A user interaction that changes the document.
#[derive(Debug, Clone, PartialEq)]
pub enum EditEvent {
    /// A checkbox or send-mode selector changed.
    Field {
        name: String,
        flag: FlagKind,
        value: FlagValue,
    },
    /// Text committed in a numeric flag field (fixed value, hold time).
    NumericText {
        name: String,
        flag: FlagKind,
        text: String,
    },
    /// Text committed in one of the connection settings.
    Connection { field: ConnectionField, text: String },
    Bulk(BulkOp),
}

/// What the view has to redraw after an accepted edit.
#[derive(Debug, Clone, PartialEq)]
pub enum Refresh {
    Row(Slot),
    /// The field should show `text` (the committed value after cleaning).
    Connection { field: ConnectionField, text: String },
    All,
}

/// A loaded configuration, preserving its original bytes so an unmodified document is
/// written back byte for byte.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub source_path: Option<PathBuf>,
    pub layout: Layout,
    pub bom: bool,
    pub original_bytes: Vec<u8>,
    pub document: Document,
    pub dirty: bool,
    /// Regenerated bytes of the unedited document; `dirty` compares against these.
    baseline: Vec<u8>,
}

impl LoadedConfig {
    pub fn load_path(path: &Path) -> anyhow::Result<Self> {
        let bytes = fs::read(path).with_context(|| format!("reading {path:?}"))?;
        let mut config = Self::from_bytes(bytes).with_context(|| format!("loading {path:?}"))?;
        config.source_path = Some(path.to_path_buf());
        log::info!(
            "loaded {path:?}: {} parameters",
            config.records().len()
        );
        Ok(config)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> anyhow::Result<Self> {
        let bom = bytes.starts_with(UTF8_BOM);
        let body = if bom { &bytes[UTF8_BOM.len()..] } else { &bytes[..] };
        let text = std::str::from_utf8(body).context("config file is not valid UTF-8")?;

        let layout = detect_layout(text);
        let raw = ConfigValue::parse(text).context("parsing JSON")?;
        let document = Document::load(raw).context("reading configuration")?;

        let mut config = Self {
            source_path: None,
            layout,
            bom,
            original_bytes: bytes,
            document,
            dirty: false,
            baseline: Vec::new(),
        };
        config.baseline = config.generate_bytes();
        if config.rewrites_layout() {
            log::warn!("comments and custom formatting will be normalized on the first save");
        }
        Ok(config)
    }

    /// True when saving an edited document cannot reproduce the untouched text of the
    /// original file (comments, inline arrays, unquoted keys and similar are normalized).
    pub fn rewrites_layout(&self) -> bool {
        self.baseline != self.original_bytes
    }

    /// The flattened parameter table for the current document.
    pub fn records(&self) -> Vec<ParameterRecord> {
        project(&self.document)
    }

    /// Applies one edit. A rejected edit leaves the document untouched and is logged.
    pub fn handle(&mut self, event: EditEvent) -> Result<Refresh, EditError> {
        let result = match event {
            EditEvent::Field { name, flag, value } => {
                resolve::apply(&mut self.document, &name, flag, value).map(Refresh::Row)
            }
            EditEvent::NumericText { name, flag, text } => {
                resolve::commit_flag_text(&mut self.document, &name, flag, &text).map(Refresh::Row)
            }
            EditEvent::Connection { field, text } => {
                let text = resolve::commit_connection(&mut self.document, field, &text);
                Ok(Refresh::Connection { field, text })
            }
            EditEvent::Bulk(op) => {
                bulk::run(&mut self.document, op);
                Ok(Refresh::All)
            }
        };

        match &result {
            Ok(_) => self.refresh_dirty(),
            Err(e) => log::warn!("edit rejected: {e}"),
        }
        result
    }

    /// Recompute `dirty` by comparing the regenerated bytes to those of the unedited document,
    /// so reverting an edit by hand clears it again.
    pub fn refresh_dirty(&mut self) {
        self.dirty = self.generate_bytes() != self.baseline;
    }

    /// Serialize the current document regardless of `dirty`.
    pub fn generate_bytes(&self) -> Vec<u8> {
        let text = self.document.serialize().to_pretty(&self.layout);
        let mut bytes = Vec::with_capacity(text.len() + UTF8_BOM.len());
        if self.bom {
            bytes.extend_from_slice(UTF8_BOM);
        }
        bytes.extend_from_slice(text.as_bytes());
        bytes
    }

    pub fn save_bytes(&self) -> Vec<u8> {
        if !self.dirty {
            return self.original_bytes.clone();
        }
        self.generate_bytes()
    }

    /// Writes to a temporary file next to `path` and renames it into place, so a failed
    /// save never leaves a truncated config behind. An existing target keeps its permissions.
    /// On error the session is unchanged.
    pub fn save_to_path(&mut self, path: &Path) -> anyhow::Result<()> {
        let bytes = self.save_bytes();

        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)
            .with_context(|| format!("creating temporary file in {dir:?}"))?;
        tmp.write_all(&bytes)
            .with_context(|| format!("writing {path:?}"))?;
        if let Ok(metadata) = fs::metadata(path) {
            tmp.as_file()
                .set_permissions(metadata.permissions())
                .with_context(|| format!("copying permissions of {path:?}"))?;
        }
        tmp.as_file()
            .sync_all()
            .with_context(|| format!("flushing {path:?}"))?;
        tmp.persist(path)
            .with_context(|| format!("replacing {path:?}"))?;

        log::info!("saved {path:?} ({} bytes)", bytes.len());
        self.source_path = Some(path.to_path_buf());
        self.original_bytes = bytes;
        self.baseline = self.generate_bytes();
        self.dirty = false;
        Ok(())
    }

    /// Saves back to the file the session was loaded from.
    pub fn save(&mut self) -> anyhow::Result<()> {
        let path = self
            .source_path
            .clone()
            .context("configuration has no file yet; use Save As")?;
        self.save_to_path(&path)
    }
}

fn detect_layout(text: &str) -> Layout {
    Layout {
        newline: detect_line_ending(text.as_bytes()),
        indent: detect_indent(text),
        trailing_newline: text.ends_with('\n'),
    }
}

fn detect_line_ending(text_bytes: &[u8]) -> &'static str {
    // Count actual terminators; a few stray CRLF lines must not flip an LF file.
    let mut lf_count = 0usize;
    let mut crlf_count = 0usize;

    for (i, b) in text_bytes.iter().enumerate() {
        if *b != b'\n' {
            continue;
        }
        if i > 0 && text_bytes[i - 1] == b'\r' {
            crlf_count += 1;
        } else {
            lf_count += 1;
        }
    }

    if crlf_count > lf_count {
        statics::NL_CRLF
    } else {
        statics::NL_LF
    }
}

/// The whitespace in front of the first indented line is one nesting level.
fn detect_indent(text: &str) -> String {
    text.lines()
        .skip(1)
        .map(|line| {
            let width = line.len() - line.trim_start_matches([' ', '\t']).len();
            &line[..width]
        })
        .find(|indent| !indent.is_empty())
        .unwrap_or(statics::DEFAULT_INDENT)
        .to_string()
}
