//! BED12 alignment records.

use std::num::ParseIntError;
use std::str::FromStr;

use crate::core::strand;
use crate::core::Number;
use crate::core::Strand;

pub mod blocks;

pub use blocks::Block;
pub use blocks::Blocks;

/// The delimiter written between fields of a record.
pub const DELIMITER: char = '\t';

/// The number of expected fields in a record.
pub const NUM_FIELDS: usize = 12;

/// The symbol for a record without a known strand.
pub const UNKNOWN_STRAND: &str = ".";

////////////////////////////////////////////////////////////////////////////////////////
// Errors
////////////////////////////////////////////////////////////////////////////////////////

/// An error associated with parsing a BED12 record.
#[derive(Debug)]
pub enum ParseError {
    /// An incorrect number of fields in the line.
    IncorrectNumberOfFields(usize),

    /// An invalid start position.
    InvalidStart(ParseIntError),

    /// An invalid end position.
    InvalidEnd(ParseIntError),

    /// An invalid score.
    InvalidScore(ParseIntError),

    /// An invalid strand.
    InvalidStrand(strand::ParseError),

    /// An invalid thick start position.
    InvalidThickStart(ParseIntError),

    /// An invalid thick end position.
    InvalidThickEnd(ParseIntError),

    /// Invalid blocks.
    InvalidBlocks(blocks::Error),

    /// The block at the given index extends past the end of the record.
    BlockOutOfBounds(usize),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::IncorrectNumberOfFields(fields) => write!(
                f,
                "invalid number of fields in BED12 record: expected {NUM_FIELDS} fields, found \
                 {fields} fields"
            ),
            ParseError::InvalidStart(err) => write!(f, "invalid start: {err}"),
            ParseError::InvalidEnd(err) => write!(f, "invalid end: {err}"),
            ParseError::InvalidScore(err) => write!(f, "invalid score: {err}"),
            ParseError::InvalidStrand(err) => write!(f, "invalid strand: {err}"),
            ParseError::InvalidThickStart(err) => write!(f, "invalid thick start: {err}"),
            ParseError::InvalidThickEnd(err) => write!(f, "invalid thick end: {err}"),
            ParseError::InvalidBlocks(err) => write!(f, "invalid blocks: {err}"),
            ParseError::BlockOutOfBounds(index) => {
                write!(f, "block {index} extends past the end of the record")
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// An error related to a [`Record`].
#[derive(Debug)]
pub enum Error {
    /// The end position is before the start position.
    EndBeforeStart(Number, Number),

    /// A parse error.
    Parse(ParseError),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::EndBeforeStart(start, end) => {
                write!(f, "the end position ({end}) is before the start position ({start})")
            }
            Error::Parse(err) => write!(f, "parse error: {err}"),
        }
    }
}

impl std::error::Error for Error {}

/// A [`Result`](std::result::Result) with an [`Error`].
type Result<T> = std::result::Result<T, Error>;

////////////////////////////////////////////////////////////////////////////////////////
// Record
////////////////////////////////////////////////////////////////////////////////////////

/// A BED12 alignment record.
///
/// Only the strand and the blocks are ever rewritten; every other field is
/// carried through as read.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Record {
    /// The chromosome name.
    contig: String,

    /// The start position.
    start: Number,

    /// The end position.
    end: Number,

    /// The read name.
    name: String,

    /// The score.
    score: i64,

    /// The strand, if known.
    strand: Option<Strand>,

    /// The thick start position.
    thick_start: Number,

    /// The thick end position.
    thick_end: Number,

    /// The item colour.
    color: String,

    /// The exon blocks.
    blocks: Blocks,
}

impl Record {
    /// Gets the chromosome name.
    ///
    /// # Examples
    ///
    /// ```
    /// use sscorrect::bed::Record;
    ///
    /// let record = "chr1\t50\t300\tread1\t0\t+\t50\t300\t0\t2\t53,103,\t0,147,"
    ///     .parse::<Record>()?;
    /// assert_eq!(record.contig(), "chr1");
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn contig(&self) -> &str {
        &self.contig
    }

    /// Gets the start position.
    pub fn start(&self) -> Number {
        self.start
    }

    /// Gets the end position.
    pub fn end(&self) -> Number {
        self.end
    }

    /// Gets the read name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gets the score.
    pub fn score(&self) -> i64 {
        self.score
    }

    /// Gets the strand.
    ///
    /// # Examples
    ///
    /// ```
    /// use sscorrect::bed::Record;
    /// use sscorrect::core::Strand;
    ///
    /// let record = "chr1\t50\t300\tread1\t0\t-\t50\t300\t0\t1\t250,\t0,"
    ///     .parse::<Record>()?;
    /// assert_eq!(record.strand(), Some(Strand::Negative));
    ///
    /// let record = "chr1\t50\t300\tread1\t0\t.\t50\t300\t0\t1\t250,\t0,"
    ///     .parse::<Record>()?;
    /// assert_eq!(record.strand(), None);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn strand(&self) -> Option<Strand> {
        self.strand
    }

    /// Sets the strand.
    pub fn set_strand(&mut self, strand: Strand) {
        self.strand = Some(strand);
    }

    /// Gets the thick start position.
    pub fn thick_start(&self) -> Number {
        self.thick_start
    }

    /// Gets the thick end position.
    pub fn thick_end(&self) -> Number {
        self.thick_end
    }

    /// Gets the item colour.
    pub fn color(&self) -> &str {
        &self.color
    }

    /// Gets the exon blocks.
    pub fn blocks(&self) -> &Blocks {
        &self.blocks
    }

    /// Replaces the exon blocks.
    pub fn set_blocks(&mut self, blocks: Blocks) {
        self.blocks = blocks;
    }
}

impl FromStr for Record {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts = s.split_whitespace().collect::<Vec<_>>();
        if parts.len() != NUM_FIELDS {
            return Err(Error::Parse(ParseError::IncorrectNumberOfFields(
                parts.len(),
            )));
        }

        let start = parts[1]
            .parse()
            .map_err(|err| Error::Parse(ParseError::InvalidStart(err)))?;
        let end = parts[2]
            .parse()
            .map_err(|err| Error::Parse(ParseError::InvalidEnd(err)))?;
        let score = parts[4]
            .parse()
            .map_err(|err| Error::Parse(ParseError::InvalidScore(err)))?;
        let strand = match parts[5] {
            UNKNOWN_STRAND => None,
            s => Some(
                s.parse()
                    .map_err(|err| Error::Parse(ParseError::InvalidStrand(err)))?,
            ),
        };
        let thick_start = parts[6]
            .parse()
            .map_err(|err| Error::Parse(ParseError::InvalidThickStart(err)))?;
        let thick_end = parts[7]
            .parse()
            .map_err(|err| Error::Parse(ParseError::InvalidThickEnd(err)))?;
        let blocks = Blocks::try_from_str_parts(parts[9], parts[10], parts[11])
            .map_err(|err| Error::Parse(ParseError::InvalidBlocks(err)))?;

        if end < start {
            return Err(Error::EndBeforeStart(start, end));
        }

        for (index, block) in blocks.iter().enumerate() {
            let block_end = start
                .checked_add(block.offset())
                .and_then(|block_start| block_start.checked_add(block.size()));

            if !matches!(block_end, Some(block_end) if block_end <= end) {
                return Err(Error::Parse(ParseError::BlockOutOfBounds(index)));
            }
        }

        Ok(Record {
            contig: parts[0].into(),
            start,
            end,
            name: parts[3].into(),
            score,
            strand,
            thick_start,
            thick_end,
            color: parts[8].into(),
            blocks,
        })
    }
}

impl std::fmt::Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let strand = match self.strand {
            Some(strand) => strand.to_string(),
            None => String::from(UNKNOWN_STRAND),
        };

        write!(
            f,
            "{}{DELIMITER}{}{DELIMITER}{}{DELIMITER}{}{DELIMITER}{}{DELIMITER}{}{DELIMITER}{}\
             {DELIMITER}{}{DELIMITER}{}{DELIMITER}{}",
            self.contig,
            self.start,
            self.end,
            self.name,
            self.score,
            strand,
            self.thick_start,
            self.thick_end,
            self.color,
            self.blocks
        )
    }
}
