//! A reader for annotated junctions and BED12 alignments.

use std::io::BufRead;
use std::io::{self};
use std::iter;

use crate::annotation;
use crate::bed;

/// The new line character.
const NEW_LINE: char = '\n';

/// The carriage return character.
const CARRIAGE_RETURN: char = '\r';

/// Prefixes of lines that never hold a record.
const HEADER_PREFIXES: &[&str] = &["#", "track", "browser"];

/// An error related to a [`Reader`].
#[derive(Debug)]
pub enum Error {
    /// An I/O error.
    Io(io::Error),

    /// An invalid annotated junction on the given line.
    InvalidAnnotation(usize, String, annotation::ParseError),

    /// An invalid alignment on the given line.
    InvalidAlignment(usize, String, bed::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(err) => write!(f, "i/o error: {err}"),
            Error::InvalidAnnotation(number, line, err) => write!(
                f,
                "invalid annotated junction on line {number}: {err}\n\nline: {line}"
            ),
            Error::InvalidAlignment(number, line, err) => write!(
                f,
                "invalid alignment record on line {number}: {err}\n\nline: {line}"
            ),
        }
    }
}

impl std::error::Error for Error {}

/// A [`Result`](std::result::Result) with an [`Error`].
type Result<T> = std::result::Result<T, Error>;

/// A line-oriented record reader.
#[derive(Clone, Debug)]
pub struct Reader<T>
where
    T: BufRead,
{
    /// The inner reader.
    inner: T,

    /// The number of lines read so far.
    lines_read: usize,
}

impl<T> Reader<T>
where
    T: BufRead,
{
    /// Creates a reader.
    ///
    /// # Examples
    ///
    /// ```
    /// let data = b"chr1\t100\t200\tgene1\t+\n";
    /// let reader = sscorrect::Reader::new(&data[..]);
    /// ```
    pub fn new(inner: T) -> Self {
        Self::from(inner)
    }

    /// Gets a reference to the inner reader.
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Consumes self and returns the inner reader.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Gets the number of lines read so far.
    pub fn lines_read(&self) -> usize {
        self.lines_read
    }

    /// Reads a raw, textual line from the underlying reader.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::io;
    ///
    /// let data = b"track name=juncs\nchr1\t100\t200\tgene1\t+";
    /// let mut reader = sscorrect::Reader::new(&data[..]);
    ///
    /// let mut buffer = String::new();
    ///
    /// assert_eq!(reader.read_line_raw(&mut buffer)?, 17);
    /// assert_eq!(buffer, "track name=juncs");
    ///
    /// assert_eq!(reader.read_line_raw(&mut buffer)?, 20);
    /// assert_eq!(buffer, "chr1\t100\t200\tgene1\t+");
    ///
    /// assert_eq!(reader.read_line_raw(&mut buffer)?, 0);
    ///
    /// # Ok::<(), io::Error>(())
    /// ```
    pub fn read_line_raw(&mut self, buffer: &mut String) -> io::Result<usize> {
        let read = read_line(&mut self.inner, buffer)?;

        if read > 0 {
            self.lines_read += 1;
        }

        Ok(read)
    }

    /// Returns an iterator over the annotated junctions in the underlying
    /// reader.
    ///
    /// # Examples
    ///
    /// ```
    /// let data = b"# known junctions\nchr1\t100\t200\tgene1\t+\n\nchr1\t300\t400\tgene1\t+\n";
    /// let mut reader = sscorrect::Reader::new(&data[..]);
    ///
    /// let records = reader.annotations().collect::<Result<Vec<_>, _>>()?;
    /// assert_eq!(records.len(), 2);
    /// assert_eq!(records[1].start(), 300);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn annotations(&mut self) -> impl Iterator<Item = Result<annotation::Record>> + '_ {
        let mut buffer = String::new();

        iter::from_fn(move || match self.read_record_line(&mut buffer) {
            Ok(Some(number)) => Some(
                buffer
                    .parse::<annotation::Record>()
                    .map_err(|err| Error::InvalidAnnotation(number, buffer.clone(), err)),
            ),
            Ok(None) => None,
            Err(err) => Some(Err(Error::Io(err))),
        })
    }

    /// Returns an iterator over the BED12 alignments in the underlying reader.
    ///
    /// # Examples
    ///
    /// ```
    /// let data = b"chr1\t50\t300\tread1\t0\t+\t50\t300\t0\t2\t53,103,\t0,147,\n";
    /// let mut reader = sscorrect::Reader::new(&data[..]);
    ///
    /// let records = reader.alignments().collect::<Result<Vec<_>, _>>()?;
    /// assert_eq!(records.len(), 1);
    /// assert_eq!(records[0].name(), "read1");
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn alignments(&mut self) -> impl Iterator<Item = Result<bed::Record>> + '_ {
        let mut buffer = String::new();

        iter::from_fn(move || match self.read_record_line(&mut buffer) {
            Ok(Some(number)) => Some(
                buffer
                    .parse::<bed::Record>()
                    .map_err(|err| Error::InvalidAlignment(number, buffer.clone(), err)),
            ),
            Ok(None) => None,
            Err(err) => Some(Err(Error::Io(err))),
        })
    }

    /// Reads the next line that holds a record and returns its line number.
    ///
    /// Blank lines and header lines are skipped.
    fn read_record_line(&mut self, buffer: &mut String) -> io::Result<Option<usize>> {
        loop {
            if self.read_line_raw(buffer)? == 0 {
                return Ok(None);
            }

            if !is_skipped(buffer) {
                return Ok(Some(self.lines_read));
            }
        }
    }
}

impl<T> From<T> for Reader<T>
where
    T: BufRead,
{
    fn from(inner: T) -> Self {
        Self {
            inner,
            lines_read: 0,
        }
    }
}

/// Whether a line holds no record.
fn is_skipped(line: &str) -> bool {
    line.trim().is_empty()
        || HEADER_PREFIXES
            .iter()
            .any(|prefix| line.starts_with(prefix))
}

/// Reads a line from a buffered reader, stripping the line ending.
fn read_line<T>(reader: &mut T, buffer: &mut String) -> io::Result<usize>
where
    T: BufRead,
{
    buffer.clear();

    match reader.read_line(buffer) {
        Ok(0) => Ok(0),
        Ok(n) => {
            if buffer.ends_with(NEW_LINE) {
                buffer.pop();

                if buffer.ends_with(CARRIAGE_RETURN) {
                    buffer.pop();
                }
            }

            Ok(n)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn test_read_line() {
        let data = b"hello\r\nworld!";
        let mut cursor = io::Cursor::new(data);

        let mut buffer = String::new();
        let len = read_line(&mut cursor, &mut buffer).unwrap();
        assert_eq!(buffer, "hello");
        assert_eq!(len, 7);

        let len = read_line(&mut cursor, &mut buffer).unwrap();
        assert_eq!(buffer, "world!");
        assert_eq!(len, 6);
    }

    #[test]
    fn skips_headers_and_blank_lines() {
        assert!(is_skipped(""));
        assert!(is_skipped("   "));
        assert!(is_skipped("# comment"));
        assert!(is_skipped("track name=reads"));
        assert!(is_skipped("browser position chr1:1-100"));
        assert!(!is_skipped("chr1\t100\t200\tgene1\t+"));
    }

    #[test]
    fn invalid_annotation_reports_the_line() {
        let data = b"track name=juncs\nchr1\t100\t200\tgene1\t+\nchr1\t100\tgene1\t+\n";
        let mut reader = Reader::new(&data[..]);

        let mut records = reader.annotations();
        assert!(records.next().unwrap().is_ok());

        let err = records.next().unwrap().unwrap_err();
        assert!(matches!(err, Error::InvalidAnnotation(3, _, _)));
        assert_eq!(
            err.to_string(),
            "invalid annotated junction on line 3: invalid number of fields in annotated \
             junction: expected at least 5 fields, found 4 fields\n\nline: chr1\t100\tgene1\t+"
        );
    }

    #[test]
    fn invalid_alignment_reports_the_line() {
        let data = b"chr1\t50\t300\tread1\t0\t+\t50\t300\t0\t2\t53,103,\n";
        let mut reader = Reader::new(&data[..]);

        let err = reader.alignments().next().unwrap().unwrap_err();
        assert!(matches!(err, Error::InvalidAlignment(1, _, _)));
        assert_eq!(
            err.to_string(),
            "invalid alignment record on line 1: parse error: invalid number of fields in BED12 \
             record: expected 12 fields, found 11 fields\n\nline: \
             chr1\t50\t300\tread1\t0\t+\t50\t300\t0\t2\t53,103,"
        );
    }

    #[test]
    fn crlf_records() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let data = b"chr1\t100\t200\tgene1\t-\r\n";
        let mut reader = Reader::new(&data[..]);

        let records = reader.annotations().collect::<Result<Vec<_>>>()?;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].strand(), crate::core::Strand::Negative);
        assert_eq!(reader.lines_read(), 1);

        Ok(())
    }
}
