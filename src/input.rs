//! Line input from files, directories, glob patterns and stdin
//!
//! [`LineSource`] turns the file arguments of the command line into one lazy
//! stream of lines. Sources that cannot be read are reported with a warning
//! and counted; reading continues with the next source. Bytes that are not
//! valid UTF-8 are replaced, so a damaged line reaches the parser like any
//! other malformed line.
//!
//! ## Argument Expansion
//!
//! - `-` reads standard input
//! - a directory is walked recursively, files in sorted order
//! - an argument containing `*`, `?` or `[` is expanded as a glob pattern
//! - anything else is opened as a file

use std::collections::VecDeque;
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

const STDIN_ARGUMENT: &str = "-";
const GLOB_METACHARACTERS: &[char] = &['*', '?', '['];

/// One readable input
#[derive(Debug, Clone, PartialEq, Eq)]
enum Source {
    Stdin,
    File(PathBuf),
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Stdin => f.write_str("<stdin>"),
            Source::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Source name and 1-based line number of a yielded line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub source: String,
    pub line: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source, self.line)
    }
}

struct OpenSource {
    name: String,
    reader: Box<dyn BufRead>,
    line: usize,
}

/// Lazy iterator over the lines of several sources
pub struct LineSource {
    pending: VecDeque<Source>,
    current: Option<OpenSource>,
    position: Option<Position>,
    read_sources: Vec<String>,
    failed_sources: usize,
}

impl LineSource {
    /// Expand `arguments` into sources; nothing is opened yet
    pub fn new<I, S>(arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut source = Self {
            pending: VecDeque::new(),
            current: None,
            position: None,
            read_sources: Vec::new(),
            failed_sources: 0,
        };
        for argument in arguments {
            source.expand(argument.as_ref());
        }
        debug!("Line source expanded to {} input(s)", source.pending.len());
        source
    }

    /// Position of the most recently yielded line
    pub fn position(&self) -> Option<&Position> {
        self.position.as_ref()
    }

    /// Number of sources that were opened successfully so far
    pub fn sources_read(&self) -> usize {
        self.read_sources.len()
    }

    /// Names of the sources opened so far, in reading order
    pub fn read_sources(&self) -> &[String] {
        &self.read_sources
    }

    /// Number of sources that could not be found or read
    pub fn failed_sources(&self) -> usize {
        self.failed_sources
    }

    fn expand(&mut self, argument: &str) {
        if argument == STDIN_ARGUMENT {
            self.pending.push_back(Source::Stdin);
        } else if argument.contains(GLOB_METACHARACTERS) {
            self.expand_glob(argument);
        } else {
            self.expand_path(Path::new(argument));
        }
    }

    fn expand_glob(&mut self, pattern: &str) {
        let paths = match glob::glob(pattern) {
            Ok(paths) => paths,
            Err(e) => {
                self.fail(pattern, &e);
                return;
            }
        };

        let before = self.pending.len();
        for entry in paths {
            match entry {
                Ok(path) => self.expand_path(&path),
                Err(e) => self.fail(&e.path().display().to_string(), e.error()),
            }
        }
        if self.pending.len() == before {
            warn!("Pattern '{}' matched no files", pattern);
            self.failed_sources += 1;
        }
    }

    fn expand_path(&mut self, path: &Path) {
        if !path.is_dir() {
            self.pending.push_back(Source::File(path.to_path_buf()));
            return;
        }

        for entry in WalkDir::new(path).follow_links(true).sort_by_file_name() {
            match entry {
                Ok(entry) if entry.file_type().is_file() => {
                    self.pending
                        .push_back(Source::File(entry.path().to_path_buf()));
                }
                Ok(_) => {}
                Err(e) => {
                    let name = e
                        .path()
                        .map_or_else(|| path.display().to_string(), |p| p.display().to_string());
                    self.fail(&name, &e);
                }
            }
        }
    }

    fn open(&mut self, source: Source) -> Option<OpenSource> {
        let name = source.to_string();
        let reader: Box<dyn BufRead> = match source {
            Source::Stdin => Box::new(io::stdin().lock()),
            Source::File(path) => match File::open(&path) {
                Ok(file) => Box::new(BufReader::new(file)),
                Err(e) => {
                    self.fail(&name, &e);
                    return None;
                }
            },
        };

        debug!("Reading from '{}'", name);
        self.read_sources.push(name.clone());
        Some(OpenSource {
            name,
            reader,
            line: 0,
        })
    }

    fn fail(&mut self, name: &str, error: &dyn fmt::Display) {
        warn!("Can't read from '{}': {}", name, error);
        self.failed_sources += 1;
    }
}

impl Iterator for LineSource {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            let Some(current) = self.current.as_mut() else {
                let source = self.pending.pop_front()?;
                self.current = self.open(source);
                continue;
            };

            let mut bytes = Vec::new();
            match current.reader.read_until(b'\n', &mut bytes) {
                Ok(0) => {
                    self.current = None;
                }
                Ok(_) => {
                    current.line += 1;
                    while matches!(bytes.last(), Some(b'\n' | b'\r')) {
                        bytes.pop();
                    }
                    let line = String::from_utf8_lossy(&bytes).into_owned();
                    self.position = Some(Position {
                        source: current.name.clone(),
                        line: current.line,
                    });
                    return Some(line);
                }
                Err(e) => {
                    let name = format!("{} (after line {})", current.name, current.line);
                    self.current = None;
                    self.fail(&name, &e);
                }
            }
        }
    }
}
