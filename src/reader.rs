//! Entry points: text, byte streams, files and directory trees.

use std::fs;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::{
    error::{Error, Result},
    parser::{Parser, DEFAULT_MAX_DEPTH},
    value::ValueNode,
};

/// Parsing options shared by every entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reader {
    max_depth: usize,
}

impl Default for Reader {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Reader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limits how deeply forms may nest; deeper input fails with [`Error::TooDeep`]
    pub fn max_depth(self, max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Parses every top-level form in `text`. At least one form is required.
    pub fn parse_str(&self, text: &str) -> Result<Vec<ValueNode>> {
        Parser::new(text, self.max_depth).forms()
    }

    /// Reads `reader` to its end as UTF-8 and parses the single form it contains.
    pub fn parse_reader<R: Read>(&self, mut reader: R) -> Result<ValueNode> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes).map_err(Error::Read)?;
        let text = std::str::from_utf8(&bytes)?;

        Parser::new(text, self.max_depth).single()
    }

    /// Parses every top-level form of a UTF-8 file.
    ///
    /// Parse failures are wrapped in [`Error::File`] so they can be traced back to `path`.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<Vec<ValueNode>> {
        let path = path.as_ref();
        let in_file = |source: Error| Error::File {
            path: path.to_owned(),
            source: Box::new(source),
        };

        let bytes = fs::read(path).map_err(|source| Error::Io {
            path: path.to_owned(),
            source,
        })?;
        let text = std::str::from_utf8(&bytes).map_err(|e| in_file(e.into()))?;

        let forms = self.parse_str(text).map_err(in_file)?;
        debug!(path = %path.display(), forms = forms.len(), "parsed file");
        Ok(forms)
    }

    /// Parses every `*.edn` file below `root` and concatenates their forms.
    ///
    /// Files are visited in the order the file system lists them. The first failure
    /// aborts the whole scan and no forms are returned.
    pub fn parse_dir(&self, root: impl AsRef<Path>) -> Result<Vec<ValueNode>> {
        let root = root.as_ref();
        debug!(root = %root.display(), "scanning directory");

        let mut forms = Vec::new();
        self.visit(root, &mut forms)?;
        Ok(forms)
    }

    fn visit(&self, dir: &Path, forms: &mut Vec<ValueNode>) -> Result<()> {
        let io_error = |path: &Path, source| Error::Io {
            path: path.to_owned(),
            source,
        };

        let entries = fs::read_dir(dir).map_err(|e| io_error(dir, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| io_error(dir, e))?;
            let path = entry.path();
            let file_type = entry.file_type().map_err(|e| io_error(&path, e))?;

            // `file_type` does not follow symlinks, so linked directories are skipped
            if file_type.is_dir() {
                self.visit(&path, forms)?;
            } else if is_edn_file(&path) {
                forms.extend(self.parse_file(&path)?);
            }
        }

        Ok(())
    }
}

fn is_edn_file(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "edn")
}

/// [`Reader::parse_str`] with default options
pub fn parse_str(text: &str) -> Result<Vec<ValueNode>> {
    Reader::default().parse_str(text)
}

/// [`Reader::parse_reader`] with default options
pub fn parse_reader<R: Read>(reader: R) -> Result<ValueNode> {
    Reader::default().parse_reader(reader)
}

/// [`Reader::parse_file`] with default options
pub fn parse_file(path: impl AsRef<Path>) -> Result<Vec<ValueNode>> {
    Reader::default().parse_file(path)
}

/// [`Reader::parse_dir`] with default options
pub fn parse_dir(root: impl AsRef<Path>) -> Result<Vec<ValueNode>> {
    Reader::default().parse_dir(root)
}
