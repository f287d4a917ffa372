//! Input data handling for cache simulation
//!
//! Parses cache request logs from CSV files in a directory. Files are read
//! in name order and streamed one request at a time, so arbitrarily large
//! logs can be replayed without loading them into memory.

use crate::models::Request;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Error types for log parsing
#[derive(Debug)]
pub enum LogParseError {
    IoError(io::Error),
    ParseError(String),
}

impl std::fmt::Display for LogParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogParseError::IoError(e) => write!(f, "I/O error: {e}"),
            LogParseError::ParseError(msg) => write!(f, "parse error: {msg}"),
        }
    }
}

impl std::error::Error for LogParseError {}

impl From<io::Error> for LogParseError {
    fn from(err: io::Error) -> Self {
        LogParseError::IoError(err)
    }
}

/// Reader for cache request logs
pub struct LogReader {
    input_dir: PathBuf,
}

impl LogReader {
    pub fn new<P: AsRef<Path>>(input_dir: P) -> Self {
        Self {
            input_dir: input_dir.as_ref().to_path_buf(),
        }
    }

    /// Get all log files in the input directory, sorted by name
    fn log_files(&self) -> io::Result<Vec<PathBuf>> {
        let mut log_files = Vec::new();
        for entry in fs::read_dir(&self.input_dir)? {
            let path = entry?.path();
            if path.is_file() {
                if let Some(ext) = path.extension() {
                    if ext == "log" || ext == "csv" || ext == "txt" {
                        log_files.push(path);
                    }
                }
            }
        }
        log_files.sort();
        Ok(log_files)
    }

    /// Parse a `timestamp,key,size` line into a Request; header, comment,
    /// and blank lines yield `None`
    fn parse_line(line: &str, line_num: usize) -> Result<Option<Request>, LogParseError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || (line_num == 0 && line.contains("timestamp"))
        {
            return Ok(None);
        }

        let mut parts = line.splitn(3, ',');

        let ts_str = parts.next().ok_or_else(|| {
            LogParseError::ParseError(format!("line {} missing timestamp", line_num + 1))
        })?;
        let timestamp = ts_str.trim().parse::<u64>().map_err(|_| {
            LogParseError::ParseError(format!(
                "invalid timestamp in line {}: {}",
                line_num + 1,
                ts_str
            ))
        })?;

        let key_str = parts.next().ok_or_else(|| {
            LogParseError::ParseError(format!("line {} missing key", line_num + 1))
        })?;
        let key = key_str.trim().to_string();

        let size_str = parts.next().ok_or_else(|| {
            LogParseError::ParseError(format!("line {} missing size", line_num + 1))
        })?;
        let size = size_str.trim().parse::<u64>().map_err(|_| {
            LogParseError::ParseError(format!(
                "invalid size in line {}: {}",
                line_num + 1,
                size_str
            ))
        })?;

        Ok(Some(Request::new(timestamp, key, size)))
    }

    /// Create a streaming iterator over all requests in all log files
    pub fn stream_requests(&self) -> Result<RequestIterator, LogParseError> {
        let log_files = self.log_files()?;
        Ok(RequestIterator::new(log_files))
    }
}

/// Iterator that streams requests from multiple log files
pub struct RequestIterator {
    files: Vec<PathBuf>,
    current_file_index: usize,
    current_reader: Option<BufReader<File>>,
    current_line_num: usize,
    line_buffer: String,
}

impl RequestIterator {
    fn new(files: Vec<PathBuf>) -> Self {
        Self {
            files,
            current_file_index: 0,
            current_reader: None,
            current_line_num: 0,
            line_buffer: String::with_capacity(256),
        }
    }

    fn open_next_file(&mut self) -> io::Result<bool> {
        if self.current_file_index >= self.files.len() {
            return Ok(false);
        }
        let file = File::open(&self.files[self.current_file_index])?;
        self.current_reader = Some(BufReader::with_capacity(1024 * 1024, file));
        self.current_line_num = 0;
        self.current_file_index += 1;
        Ok(true)
    }
}

impl Iterator for RequestIterator {
    type Item = Result<Request, LogParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.current_reader.is_none() {
                match self.open_next_file() {
                    Ok(true) => {}
                    Ok(false) => return None,
                    Err(e) => return Some(Err(LogParseError::IoError(e))),
                }
            }

            if let Some(reader) = &mut self.current_reader {
                self.line_buffer.clear();
                match reader.read_line(&mut self.line_buffer) {
                    Ok(0) => {
                        self.current_reader = None;
                        continue;
                    }
                    Ok(_) => {
                        let line_num = self.current_line_num;
                        self.current_line_num += 1;
                        match LogReader::parse_line(&self.line_buffer, line_num) {
                            Ok(Some(request)) => return Some(Ok(request)),
                            Ok(None) => continue,
                            Err(e) => return Some(Err(e)),
                        }
                    }
                    Err(e) => return Some(Err(LogParseError::IoError(e))),
                }
            }
        }
    }
}
