use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use crate::{
    error::{PlyError, Result},
    options::{ErrorMode, MissingSource, ParseOptions},
    parser::PointStreamParser,
    point::Point,
};

/// Points materialized from one source, together with the fault that ended
/// the read early, if any
#[derive(Debug, Default)]
pub struct PointLoad {
    points: Vec<Point>,
    declared_vertex_count: Option<i64>,
    skipped_lines: usize,
    fault: Option<PlyError>,
    unavailable: Option<PlyError>,
}

impl PointLoad {
    /// Empty load of a source that could not be opened; the open error is kept.
    pub fn unavailable(error: PlyError) -> Self {
        Self {
            unavailable: Some(error),
            ..Self::default()
        }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn into_points(self) -> Vec<Point> {
        self.points
    }

    pub fn declared_vertex_count(&self) -> Option<i64> {
        self.declared_vertex_count
    }

    pub fn skipped_lines(&self) -> usize {
        self.skipped_lines
    }

    pub fn fault(&self) -> Option<&PlyError> {
        self.fault.as_ref()
    }

    /// why the source could not be opened, under [`MissingSource::Empty`]
    pub fn unavailable_reason(&self) -> Option<&PlyError> {
        self.unavailable.as_ref()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// source opened, no fault, and every declared vertex was found
    pub fn is_complete(&self) -> bool {
        let expected = self.declared_vertex_count.unwrap_or(0).max(0);
        let expected = usize::try_from(expected).unwrap_or(usize::MAX);
        self.unavailable.is_none() && self.fault.is_none() && self.points.len() >= expected
    }

    /// All or nothing: the points, or the fault if there was one.
    /// An unavailable source is not a fault here and gives no points.
    pub fn into_result(self) -> Result<Vec<Point>> {
        match self.fault {
            Some(fault) => Err(fault),
            None => Ok(self.points),
        }
    }
}

/// Opens a file for streaming.
pub fn open_points<P: AsRef<Path>>(
    path: P,
    error_mode: ErrorMode,
) -> Result<PointStreamParser<BufReader<File>>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| PlyError::SourceUnavailable {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(PointStreamParser::with_error_mode(
        BufReader::new(file),
        error_mode,
    ))
}

/// Collects every point of a stream; a fault stops the read and is kept in the load.
pub fn read_points<R: BufRead>(reader: R, error_mode: ErrorMode) -> PointLoad {
    collect(PointStreamParser::with_error_mode(reader, error_mode))
}

/// Reads all points of a file.
///
/// A file that cannot be opened gives an empty load holding the
/// [`PlyError::SourceUnavailable`] under [`MissingSource::Empty`], and that
/// error itself under [`MissingSource::Fail`]. Other faults are reported
/// through [`PointLoad::fault`].
pub fn load_points<P: AsRef<Path>>(path: P, options: &ParseOptions) -> Result<PointLoad> {
    match open_points(path, options.error_mode) {
        Ok(parser) => Ok(collect(parser)),
        Err(e @ PlyError::SourceUnavailable { .. })
            if options.missing_source == MissingSource::Empty =>
        {
            Ok(PointLoad::unavailable(e))
        }
        Err(e) => Err(e),
    }
}

fn collect<R: BufRead>(mut parser: PointStreamParser<R>) -> PointLoad {
    let (_, upper) = parser.size_hint();
    let mut points = Vec::with_capacity(upper.unwrap_or(0));
    let mut fault = None;
    for item in parser.by_ref() {
        match item {
            Ok(point) => points.push(point),
            Err(e) => {
                fault = Some(e);
                break;
            }
        }
    }
    PointLoad {
        points,
        declared_vertex_count: parser.declared_vertex_count(),
        skipped_lines: parser.skipped_lines(),
        fault,
        unavailable: None,
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    const SAMPLE: &str = include_str!("../data/sample.ply");

    fn write_temp(text: &str) -> NamedTempFile {
        let mut tmp = NamedTempFile::new().unwrap();
        tmp.write_all(text.as_bytes()).unwrap();
        tmp.flush().unwrap();
        tmp
    }

    #[test]
    fn load_sample_file() {
        let tmp = write_temp(SAMPLE);
        let load = load_points(tmp.path(), &ParseOptions::default()).unwrap();
        assert_eq!(load.declared_vertex_count(), Some(8));
        assert_eq!(load.len(), 8);
        assert!(load.is_complete());
        assert_eq!(load.points()[0], Point::new(0., 0., 0.));
        assert_eq!(load.points()[7], Point::new(1., 1., 1.));
    }

    #[test]
    fn missing_file_is_empty_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.ply");
        let load = load_points(&path, &ParseOptions::default()).unwrap();
        assert!(load.is_empty());
        assert!(load.fault().is_none());
        assert!(!load.is_complete());
        match load.unavailable_reason() {
            Some(PlyError::SourceUnavailable { path: p, source }) => {
                assert_eq!(p, &path);
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("unexpected reason: {:?}", other),
        }
        assert!(load.into_result().unwrap().is_empty());
    }

    #[test]
    fn missing_file_fails_when_configured() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.ply");
        let options = ParseOptions::default().with_missing_source(MissingSource::Fail);
        match load_points(&path, &options) {
            Err(PlyError::SourceUnavailable { path: p, .. }) => assert_eq!(p, path),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn fault_keeps_points_read_before_it() {
        let text = SAMPLE.replace("1 0 0", "1 O 0");
        let load = read_points(text.as_bytes(), ErrorMode::Strict);
        assert_eq!(load.len(), 1);
        assert!(!load.is_complete());
        assert!(matches!(
            load.fault(),
            Some(PlyError::MalformedCoordinate { .. })
        ));
        assert!(load.into_result().is_err());
    }

    #[test]
    fn lenient_load_counts_skipped_lines() {
        let text = SAMPLE.replace("1 0 0", "1 O 0");
        let load = read_points(text.as_bytes(), ErrorMode::Lenient);
        assert!(load.fault().is_none());
        assert_eq!(load.skipped_lines(), 1);
        // the face lines after the vertices are read as data to fill the budget
        assert_eq!(load.len(), 8);
    }

    #[test]
    fn truncated_load_is_incomplete_but_not_faulted() {
        let text = SAMPLE.replace("element vertex 8", "element vertex 100");
        let load = read_points(text.as_bytes(), ErrorMode::Strict);
        assert!(load.fault().is_none());
        assert!(!load.is_complete());
        assert!(load.len() >= 8);
    }

    #[test]
    fn into_result_consumes_points() {
        let load = read_points(SAMPLE.as_bytes(), ErrorMode::Strict);
        let points = load.into_result().unwrap();
        assert_eq!(points.len(), 8);
    }
}
