//! Subprocess execution utilities.

use std::ffi::OsStr;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::thread;

/// Which pipe a line of captured output came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

/// Output of a process run with [`ProcessBuilder::exec_streaming`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    /// Exit code; `None` if the process was terminated by a signal.
    pub code: Option<i32>,
    /// Raw bytes exactly as the child wrote them.
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// Builder for subprocess execution.
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
    cwd: Option<PathBuf>,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            cwd: None,
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(
            args.into_iter()
                .map(|s| s.as_ref().to_string_lossy().into_owned()),
        );
        self
    }

    /// Set the working directory.
    pub fn cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        cmd
    }

    /// Execute the command, handing each output line to `on_line` as it
    /// arrives, and return everything captured once the process exits.
    ///
    /// Lines passed to `on_line` are decoded lossily with the line ending
    /// stripped. The captured output keeps the raw bytes.
    ///
    /// Blocks the caller until the child exits.
    pub fn exec_streaming<F>(&self, mut on_line: F) -> io::Result<CapturedOutput>
    where
        F: FnMut(OutputStream, &str),
    {
        let mut cmd = self.build_command();
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let mut child = cmd.spawn()?;

        let (tx, rx) = mpsc::channel();
        let stdout = child
            .stdout
            .take()
            .map(|pipe| forward_lines(pipe, OutputStream::Stdout, tx.clone()));
        let stderr = child
            .stderr
            .take()
            .map(|pipe| forward_lines(pipe, OutputStream::Stderr, tx.clone()));
        drop(tx);

        for (stream, line) in rx {
            on_line(stream, &line);
        }

        let mut captured = CapturedOutput {
            stdout: join_reader(stdout),
            stderr: join_reader(stderr),
            ..CapturedOutput::default()
        };
        captured.code = child.wait()?.code();
        Ok(captured)
    }
}

/// Copy `reader` into a buffer, sending each line to `tx` along the way.
fn forward_lines<R>(
    reader: R,
    stream: OutputStream,
    tx: mpsc::Sender<(OutputStream, String)>,
) -> thread::JoinHandle<Vec<u8>>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut reader = BufReader::new(reader);
        let mut raw = Vec::new();
        let mut line = Vec::new();
        loop {
            line.clear();
            match reader.read_until(b'\n', &mut line) {
                Ok(0) | Err(_) => break,
                Ok(_) => {
                    raw.extend_from_slice(&line);
                    let text = String::from_utf8_lossy(&line);
                    let _ = tx.send((stream, text.trim_end_matches(['\n', '\r']).to_string()));
                }
            }
        }
        raw
    })
}

fn join_reader(reader: Option<thread::JoinHandle<Vec<u8>>>) -> Vec<u8> {
    reader
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default()
}

/// Find an executable in PATH.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}

/// Find CMake.
pub fn find_cmake() -> Option<PathBuf> {
    find_executable("cmake")
}
