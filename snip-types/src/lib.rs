use anyhow::Result;
use std::cell::RefCell;
use std::fmt::Debug;
use std::io::{IsTerminal, Write};
use std::rc::Rc;
use thiserror::Error;

pub mod snippet;
pub use snippet::{Snippet, SnippetMeta, SnippetPatch};

/// Snip specific error types
#[derive(Error, Debug)]
pub enum SnipError {
    #[error("snippet '{0}' not found")]
    NotFound(String),

    #[error("snippet '{0}' already exists")]
    AlreadyExists(String),

    #[error("snippet '{name}' is corrupt: {reason}")]
    Corrupt { name: String, reason: String },

    #[error("invalid snippet name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error(
        "cannot run '{0}' snippets (supported: python, bash, sh, zsh, node/javascript/js, ruby, perl)"
    )]
    UnsupportedLanguage(String),

    #[error("{path}: {reason}")]
    PathError { path: String, reason: String },

    #[error("{operation} failed on {path}: {source}")]
    Io {
        operation: String,
        path: String,
        source: std::io::Error,
    },
}

impl SnipError {
    pub fn io(operation: impl Into<String>, path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        SnipError::Io {
            operation: operation.into(),
            path: path.as_ref().display().to_string(),
            source,
        }
    }

    pub fn path(path: impl AsRef<std::path::Path>, reason: impl Into<String>) -> Self {
        SnipError::PathError {
            path: path.as_ref().display().to_string(),
            reason: reason.into(),
        }
    }

    /// Process exit code reported for this error kind.
    pub fn exit_code(&self) -> i32 {
        match self {
            SnipError::NotFound(_) => 2,
            SnipError::AlreadyExists(_) => 3,
            SnipError::Corrupt { .. } => 4,
            SnipError::InvalidName { .. } => 5,
            SnipError::UnsupportedLanguage(_) => 6,
            SnipError::PathError { .. } => 7,
            SnipError::Io { .. } => 8,
        }
    }
}

pub type SnipResult<T> = std::result::Result<T, SnipError>;

/// Exit code used for usage errors and failures outside the storage layer.
pub const EXIT_FAILURE: i32 = 1;

/// A cloneable in-memory sink, used to capture command output.
#[derive(Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).to_string()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Output sinks and terminal state for one command invocation.
pub struct Context {
    pub interactive: bool,
    pub color: bool,
    outfile: RefCell<Box<dyn Write>>,
    errfile: RefCell<Box<dyn Write>>,
}

impl Context {
    pub fn new() -> Self {
        let interactive = std::io::stdin().is_terminal();
        let color = std::io::stdout().is_terminal();
        Context {
            interactive,
            color,
            outfile: RefCell::new(Box::new(std::io::stdout())),
            errfile: RefCell::new(Box::new(std::io::stderr())),
        }
    }

    pub fn with_writers(outfile: Box<dyn Write>, errfile: Box<dyn Write>, interactive: bool) -> Self {
        Context {
            interactive,
            color: false,
            outfile: RefCell::new(outfile),
            errfile: RefCell::new(errfile),
        }
    }

    /// Context whose stdout and stderr are captured in memory.
    pub fn captured(interactive: bool) -> (Self, SharedBuffer, SharedBuffer) {
        let out = SharedBuffer::default();
        let err = SharedBuffer::default();
        let ctx = Context::with_writers(Box::new(out.clone()), Box::new(err.clone()), interactive);
        (ctx, out, err)
    }

    pub fn write_stdout(&self, msg: &str) -> Result<()> {
        let mut file = self.outfile.borrow_mut();
        writeln!(file, "{msg}")?;
        file.flush()?;
        Ok(())
    }

    pub fn write_stderr(&self, msg: &str) -> Result<()> {
        let mut file = self.errfile.borrow_mut();
        writeln!(file, "{msg}")?;
        file.flush()?;
        Ok(())
    }

    /// Write a raw string without a trailing newline.
    pub fn write_raw(&self, msg: &str) -> Result<()> {
        let mut file = self.outfile.borrow_mut();
        file.write_all(msg.as_bytes())?;
        file.flush()?;
        Ok(())
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::result::Result<(), std::fmt::Error> {
        f.debug_struct("Context")
            .field("interactive", &self.interactive)
            .field("color", &self.color)
            .finish()
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ExitStatus {
    ExitedWith(i32),
    /// Exit code forwarded from a child process.
    Child(i32),
}

impl ExitStatus {
    pub fn code(&self) -> i32 {
        match self {
            ExitStatus::ExitedWith(code) | ExitStatus::Child(code) => *code,
        }
    }
}

impl From<&SnipError> for ExitStatus {
    fn from(err: &SnipError) -> Self {
        ExitStatus::ExitedWith(err.exit_code())
    }
}
