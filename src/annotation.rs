//! Annotated junction records.
//!
//! An annotated junction is a whitespace-delimited line with at least five
//! fields: the chromosome, the junction start, the junction end, the label of
//! the annotation source, and the strand. The strand is always read from the
//! last field so that files with extra columns (such as BED6) are accepted.

use std::num::ParseIntError;
use std::str::FromStr;

use crate::core::strand;
use crate::core::Number;
use crate::core::Strand;

/// The minimum number of expected fields in an annotated junction record.
pub const MIN_NUM_FIELDS: usize = 5;

/// An error associated with parsing an annotated junction record.
#[derive(Debug)]
pub enum ParseError {
    /// Too few fields in the line.
    IncorrectNumberOfFields(usize),

    /// An invalid junction start.
    InvalidStart(ParseIntError),

    /// An invalid junction end.
    InvalidEnd(ParseIntError),

    /// An invalid strand.
    InvalidStrand(strand::ParseError),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::IncorrectNumberOfFields(fields) => write!(
                f,
                "invalid number of fields in annotated junction: expected at least \
                 {MIN_NUM_FIELDS} fields, found {fields} fields"
            ),
            ParseError::InvalidStart(err) => write!(f, "invalid junction start: {err}"),
            ParseError::InvalidEnd(err) => write!(f, "invalid junction end: {err}"),
            ParseError::InvalidStrand(err) => write!(f, "invalid strand: {err}"),
        }
    }
}

impl std::error::Error for ParseError {}

/// An annotated junction.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Record {
    /// The chromosome name.
    contig: String,

    /// The left boundary of the intron.
    start: Number,

    /// The right boundary of the intron.
    end: Number,

    /// The label of the annotation source.
    source: String,

    /// The strand of the intron.
    strand: Strand,
}

impl Record {
    /// Creates a new annotated junction.
    ///
    /// # Examples
    ///
    /// ```
    /// use sscorrect::annotation::Record;
    /// use sscorrect::core::Strand;
    ///
    /// let record = Record::new("chr1", 100, 200, "gencode", Strand::Positive);
    /// assert_eq!(record, "chr1\t100\t200\tgencode\t+".parse::<Record>()?);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn new(
        contig: impl Into<String>,
        start: Number,
        end: Number,
        source: impl Into<String>,
        strand: Strand,
    ) -> Self {
        Self {
            contig: contig.into(),
            start,
            end,
            source: source.into(),
            strand,
        }
    }

    /// Gets the chromosome name.
    pub fn contig(&self) -> &str {
        &self.contig
    }

    /// Gets the left boundary of the intron.
    pub fn start(&self) -> Number {
        self.start
    }

    /// Gets the right boundary of the intron.
    pub fn end(&self) -> Number {
        self.end
    }

    /// Gets the label of the annotation source.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Gets the strand.
    pub fn strand(&self) -> Strand {
        self.strand
    }
}

impl FromStr for Record {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s.split_whitespace().collect::<Vec<_>>();
        if parts.len() < MIN_NUM_FIELDS {
            return Err(ParseError::IncorrectNumberOfFields(parts.len()));
        }

        let start = parts[1].parse().map_err(ParseError::InvalidStart)?;
        let end = parts[2].parse().map_err(ParseError::InvalidEnd)?;
        let strand = parts[parts.len() - 1]
            .parse()
            .map_err(ParseError::InvalidStrand)?;

        Ok(Record::new(parts[0], start, end, parts[3], strand))
    }
}
