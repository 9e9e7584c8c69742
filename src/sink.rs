use std::{
    convert::Infallible,
    fmt::Display,
    io::{self, Write},
    ops::AddAssign,
};

use serde::Serialize;
use tracing::warn;

use crate::point::Point;

/// Downstream consumer that takes points one at a time
pub trait PointSink {
    type Error: Display;

    fn accept(&mut self, point: &Point) -> Result<(), Self::Error>;
}

impl PointSink for Vec<Point> {
    type Error = Infallible;

    fn accept(&mut self, point: &Point) -> Result<(), Self::Error> {
        self.push(*point);
        Ok(())
    }
}

/// Writes each point as one JSON object per line
pub struct JsonLinesSink<W> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> PointSink for JsonLinesSink<W> {
    type Error = io::Error;

    fn accept(&mut self, point: &Point) -> Result<(), Self::Error> {
        serde_json::to_writer(&mut self.writer, point)?;
        self.writer.write_all(b"\n")
    }
}

/// Writes each point as an `x y z` line
pub struct ListingSink<W> {
    writer: W,
}

impl<W: Write> ListingSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> PointSink for ListingSink<W> {
    type Error = io::Error;

    fn accept(&mut self, point: &Point) -> Result<(), Self::Error> {
        writeln!(self.writer, "{} {} {}", point.x(), point.y(), point.z())
    }
}

/// Tally of a feed
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FeedReport {
    pub accepted: usize,
    pub failed: usize,
}

impl FeedReport {
    pub fn total(&self) -> usize {
        self.accepted + self.failed
    }
}

impl AddAssign for FeedReport {
    fn add_assign(&mut self, rhs: Self) {
        self.accepted += rhs.accepted;
        self.failed += rhs.failed;
    }
}

/// Offers every point to the sink. A rejected point is logged and the feed
/// moves on to the next one.
pub fn feed_points<'a, S, I>(points: I, sink: &mut S) -> FeedReport
where
    S: PointSink,
    I: IntoIterator<Item = &'a Point>,
{
    let mut report = FeedReport::default();
    for (index, point) in points.into_iter().enumerate() {
        match sink.accept(point) {
            Ok(()) => report.accepted += 1,
            Err(e) => {
                warn!(
                    index,
                    x = point.x(),
                    y = point.y(),
                    z = point.z(),
                    "Error creating point: {}",
                    e
                );
                report.failed += 1;
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    /// accepts writes until `capacity` bytes are stored, then fails every write
    struct FullDisk {
        written: Vec<u8>,
        capacity: usize,
    }

    impl FullDisk {
        fn with_capacity(capacity: usize) -> Self {
            Self {
                written: Vec::new(),
                capacity,
            }
        }
    }

    impl Write for FullDisk {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.written.len() + buf.len() > self.capacity {
                return Err(io::Error::other("disk full"));
            }
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn single_digit_points() -> Vec<Point> {
        vec![
            Point::new(1., 2., 3.),
            Point::new(4., 5., 6.),
            Point::new(7., 8., 9.),
            Point::new(1., 1., 1.),
        ]
    }

    /// rejects points below the ground plane
    struct AboveGround {
        accepted: Vec<Point>,
    }

    impl PointSink for AboveGround {
        type Error = String;

        fn accept(&mut self, point: &Point) -> Result<(), Self::Error> {
            if point.z() < 0. {
                return Err(format!("z = {} is below ground", point.z()));
            }
            self.accepted.push(*point);
            Ok(())
        }
    }

    fn points() -> Vec<Point> {
        vec![
            Point::new(0., 0., 1.),
            Point::new(0., 0., -1.),
            Point::new(1., 2., 3.),
            Point::new(0., 0., -5.),
            Point::new(4., 5., 6.),
        ]
    }

    #[test]
    fn failed_point_does_not_stop_feed() {
        let pts = points();
        let mut sink = AboveGround { accepted: vec![] };
        let report = feed_points(&pts, &mut sink);
        assert_eq!(
            report,
            FeedReport {
                accepted: 3,
                failed: 2
            }
        );
        assert_eq!(report.total(), pts.len());
        assert_eq!(sink.accepted.last(), Some(&Point::new(4., 5., 6.)));
    }

    #[test]
    fn vec_sink_collects_in_order() {
        let pts = points();
        let mut sink: Vec<Point> = vec![];
        let report = feed_points(&pts, &mut sink);
        assert_eq!(report.failed, 0);
        assert_eq!(sink, pts);
    }

    #[test]
    fn json_lines_sink() {
        let pts = vec![Point::new(1., 2., 3.), Point::new(-0.5, 0., 1e3)];
        let mut sink = JsonLinesSink::new(Vec::new());
        feed_points(&pts, &mut sink);
        let out = String::from_utf8(sink.into_inner()).unwrap();
        let read: Vec<Point> = out
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(read, pts);
    }

    #[test]
    fn listing_sink() {
        let pts = vec![Point::new(1., 2.5, -3.)];
        let mut sink = ListingSink::new(Vec::new());
        feed_points(&pts, &mut sink);
        assert_eq!(sink.into_inner(), b"1 2.5 -3\n");
    }

    #[test]
    fn listing_write_failures_are_counted() {
        let pts = single_digit_points();
        // room for the first two "x y z\n" lines only
        let mut sink = ListingSink::new(FullDisk::with_capacity(12));
        let report = feed_points(&pts, &mut sink);
        assert_eq!(
            report,
            FeedReport {
                accepted: 2,
                failed: 2
            }
        );
        assert_eq!(sink.into_inner().written, b"1 2 3\n4 5 6\n");
    }

    #[test]
    fn json_lines_write_failures_are_counted() {
        let pts = single_digit_points();
        let line_len = serde_json::to_string(&pts[0]).unwrap().len() + 1;
        let mut sink = JsonLinesSink::new(FullDisk::with_capacity(3 * line_len));
        let report = feed_points(&pts, &mut sink);
        assert_eq!(
            report,
            FeedReport {
                accepted: 3,
                failed: 1
            }
        );

        let out = String::from_utf8(sink.into_inner().written).unwrap();
        let read: Vec<Point> = out
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(read, pts[..3]);
    }

    #[test]
    fn report_add_assign() {
        let mut report = FeedReport {
            accepted: 1,
            failed: 2,
        };
        report += FeedReport {
            accepted: 3,
            failed: 0,
        };
        assert_eq!(report.accepted, 4);
        assert_eq!(report.failed, 2);
    }

    #[test]
    fn serialize_report() {
        let report = FeedReport {
            accepted: 7,
            failed: 1,
        };
        assert_eq!(
            serde_json::to_string(&report).unwrap(),
            r#"{"accepted":7,"failed":1}"#
        );
    }
}
