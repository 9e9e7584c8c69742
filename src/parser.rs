use std::io::BufRead;
use std::iter::FusedIterator;

use crate::{
    error::{PlyError, Result},
    options::ErrorMode,
    point::{Fields, Point},
};

const VERTEX_COUNT_TOKEN: &str = "element vertex";
const END_HEADER_TOKEN: &str = "end_header";

/// Scan position of a parser
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    ScanningHeader,
    ReadingVertices { remaining: usize },
    Done,
}

/// What a line means while the header is scanned
#[derive(Debug, PartialEq, Eq)]
enum HeaderLine {
    VertexCount(i64),
    BadVertexCount,
    EndHeader,
    Other,
}

fn classify_header(line: &str) -> HeaderLine {
    if line.starts_with(VERTEX_COUNT_TOKEN) {
        let parts: Vec<&str> = line.split(' ').collect();
        if parts.len() != 3 {
            return HeaderLine::Other;
        }
        match parts[2].parse::<i64>() {
            Ok(count) => HeaderLine::VertexCount(count),
            Err(_) => HeaderLine::BadVertexCount,
        }
    } else if line.starts_with(END_HEADER_TOKEN) {
        HeaderLine::EndHeader
    } else {
        HeaderLine::Other
    }
}

/// Lazy reader of the vertices of an ASCII PLY stream.
///
/// Lines are pulled from the reader one at a time and only until the declared
/// vertex count has been emitted; whatever follows (faces, other elements) is
/// never read. Lines with fewer than three fields are skipped without being
/// counted. A line whose coordinates do not parse ends the stream with an error
/// in [`ErrorMode::Strict`] and is skipped in [`ErrorMode::Lenient`].
///
/// Dropping the parser drops the reader.
#[derive(Debug)]
pub struct PointStreamParser<R> {
    reader: R,
    raw: Vec<u8>,
    buf: String,
    line_number: usize,
    phase: Phase,
    error_mode: ErrorMode,
    declared_vertex_count: Option<i64>,
    skipped_lines: usize,
}

impl<R: BufRead> PointStreamParser<R> {
    pub fn new(reader: R) -> Self {
        Self::with_error_mode(reader, ErrorMode::default())
    }

    pub fn with_error_mode(reader: R, error_mode: ErrorMode) -> Self {
        Self {
            reader,
            raw: Vec::new(),
            buf: String::new(),
            line_number: 0,
            phase: Phase::ScanningHeader,
            error_mode,
            declared_vertex_count: None,
            skipped_lines: 0,
        }
    }

    /// vertex count declared by the last `element vertex` header line seen so far
    pub fn declared_vertex_count(&self) -> Option<i64> {
        self.declared_vertex_count
    }

    /// vertices still expected; 0 while scanning the header and once done
    pub fn remaining(&self) -> usize {
        match self.phase {
            Phase::ReadingVertices { remaining } => remaining,
            _ => 0,
        }
    }

    /// malformed lines passed over in lenient mode
    pub fn skipped_lines(&self) -> usize {
        self.skipped_lines
    }

    pub fn error_mode(&self) -> ErrorMode {
        self.error_mode
    }

    pub fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Reads the next line into `buf` without its `\n` or `\r\n` terminator.
    /// Bytes that are not UTF-8 are replaced with U+FFFD.
    /// Returns false at the end of the source.
    fn read_line(&mut self) -> Result<bool> {
        self.raw.clear();
        self.buf.clear();
        self.line_number += 1;
        let n = self
            .reader
            .read_until(b'\n', &mut self.raw)
            .map_err(|source| PlyError::Read {
                line_number: self.line_number,
                source,
            })?;
        if n == 0 {
            return Ok(false);
        }
        if self.raw.ends_with(b"\n") {
            self.raw.pop();
            if self.raw.ends_with(b"\r") {
                self.raw.pop();
            }
        }
        self.buf.push_str(&String::from_utf8_lossy(&self.raw));
        Ok(true)
    }

    fn fail(&mut self, error: PlyError) -> Option<Result<Point>> {
        self.phase = Phase::Done;
        Some(Err(error))
    }

    fn header_line(&mut self) -> Option<Result<Point>> {
        match classify_header(&self.buf) {
            HeaderLine::VertexCount(count) => {
                self.declared_vertex_count = Some(count);
            }
            HeaderLine::BadVertexCount => match self.error_mode {
                ErrorMode::Strict => {
                    return self.fail(PlyError::MalformedVertexCount {
                        line_number: self.line_number,
                        line: self.buf.clone(),
                    });
                }
                ErrorMode::Lenient => self.skipped_lines += 1,
            },
            HeaderLine::EndHeader => {
                let count = self.declared_vertex_count.unwrap_or(0).max(0);
                let remaining = usize::try_from(count).unwrap_or(usize::MAX);
                self.phase = match remaining {
                    0 => Phase::Done,
                    remaining => Phase::ReadingVertices { remaining },
                };
            }
            HeaderLine::Other => {}
        }
        None
    }

    fn vertex_line(&mut self, remaining: usize) -> Option<Result<Point>> {
        match Point::try_parse_fields(&self.buf) {
            Fields::TooFew => None,
            Fields::Point(point) => {
                self.phase = match remaining - 1 {
                    0 => Phase::Done,
                    remaining => Phase::ReadingVertices { remaining },
                };
                Some(Ok(point))
            }
            Fields::Malformed(source) => match self.error_mode {
                ErrorMode::Strict => self.fail(PlyError::MalformedCoordinate {
                    line_number: self.line_number,
                    line: self.buf.clone(),
                    source,
                }),
                ErrorMode::Lenient => {
                    self.skipped_lines += 1;
                    None
                }
            },
        }
    }
}

impl<R: BufRead> Iterator for PointStreamParser<R> {
    type Item = Result<Point>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.phase == Phase::Done {
                return None;
            }

            match self.read_line() {
                Ok(true) => {}
                Ok(false) => {
                    self.phase = Phase::Done;
                    return None;
                }
                Err(e) => return self.fail(e),
            }

            let item = match self.phase {
                Phase::ScanningHeader => self.header_line(),
                Phase::ReadingVertices { remaining } => self.vertex_line(remaining),
                Phase::Done => None,
            };
            if item.is_some() {
                return item;
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.phase {
            Phase::ScanningHeader => (0, None),
            Phase::ReadingVertices { remaining } => (0, Some(remaining)),
            Phase::Done => (0, Some(0)),
        }
    }
}

impl<R: BufRead> FusedIterator for PointStreamParser<R> {}
