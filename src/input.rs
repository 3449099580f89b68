/// Input acquisition: read the whole report from stdin or a file.
///
/// Reading from an interactive terminal is refused up front so the process
/// never sits waiting for input that will not come.
use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};

/// Where the report text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
}

impl InputSource {
    /// Map the optional CLI path to a source; `-` means stdin.
    pub fn from_arg(path: Option<&Path>) -> Self {
        match path {
            Some(p) if p != Path::new("-") => InputSource::File(p.to_path_buf()),
            _ => InputSource::Stdin,
        }
    }
}

#[derive(Debug)]
pub enum InputError {
    /// stdin is attached to a terminal, nothing was piped in.
    Terminal,
    /// Input contained only whitespace.
    Empty,
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    Read {
        source: std::io::Error,
    },
}

impl std::fmt::Display for InputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputError::Terminal => write!(
                f,
                "no data piped to stdin; pipe `ccache -s` output in or pass a file"
            ),
            InputError::Empty => write!(f, "input is empty"),
            InputError::Open { path, source } => {
                write!(f, "failed to open {}: {source}", path.display())
            }
            InputError::Read { source } => write!(f, "failed to read input: {source}"),
        }
    }
}

impl std::error::Error for InputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InputError::Open { source, .. } | InputError::Read { source } => Some(source),
            InputError::Terminal | InputError::Empty => None,
        }
    }
}

/// Read the full report text from `source`.
pub fn read_report(source: &InputSource) -> Result<String, InputError> {
    match source {
        InputSource::Stdin => {
            let stdin = std::io::stdin();
            if stdin.is_terminal() {
                return Err(InputError::Terminal);
            }
            read_all(stdin.lock())
        }
        InputSource::File(path) => {
            let file = std::fs::File::open(path).map_err(|e| InputError::Open {
                path: path.clone(),
                source: e,
            })?;
            read_all(file)
        }
    }
}

/// Drain a reader, decoding lossily so stray non-UTF-8 bytes in paths do
/// not sink the whole report.
fn read_all<R: Read>(mut reader: R) -> Result<String, InputError> {
    let mut buf = Vec::new();
    reader
        .read_to_end(&mut buf)
        .map_err(|e| InputError::Read { source: e })?;

    let text = String::from_utf8_lossy(&buf).into_owned();
    if text.trim().is_empty() {
        return Err(InputError::Empty);
    }

    tracing::debug!(bytes = buf.len(), lines = text.lines().count(), "read input");
    Ok(text)
}
