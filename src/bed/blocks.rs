//! The exon blocks of a BED12 record.

use std::num::ParseIntError;

use nonempty::NonEmpty;

use crate::core::Number;

/// The delimiter between entries in a block list.
pub const LIST_DELIMITER: char = ',';

////////////////////////////////////////////////////////////////////////////////////////
// Errors
////////////////////////////////////////////////////////////////////////////////////////

/// An error related to the parsing of blocks.
#[derive(Debug)]
pub enum ParseError {
    /// An invalid block count.
    InvalidCount(ParseIntError),

    /// An invalid block size.
    InvalidSize(ParseIntError),

    /// An invalid block offset.
    InvalidOffset(ParseIntError),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::InvalidCount(err) => write!(f, "invalid block count: {err}"),
            ParseError::InvalidSize(err) => write!(f, "invalid block size: {err}"),
            ParseError::InvalidOffset(err) => write!(f, "invalid block offset: {err}"),
        }
    }
}

impl std::error::Error for ParseError {}

/// An error related to [`Blocks`].
#[derive(Debug)]
pub enum Error {
    /// No blocks were provided.
    Empty,

    /// The block lists do not agree with the block count.
    ///
    /// The values are the block count, the number of sizes, and the number of
    /// offsets.
    CountMismatch(usize, usize, usize),

    /// The number of sizes differs from the number of offsets.
    LengthMismatch(usize, usize),

    /// A parse error.
    Parse(ParseError),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Empty => write!(f, "at least one block is required"),
            Error::CountMismatch(count, sizes, offsets) => write!(
                f,
                "block count is {count}, but found {sizes} sizes and {offsets} offsets"
            ),
            Error::LengthMismatch(sizes, offsets) => {
                write!(f, "found {sizes} sizes but {offsets} offsets")
            }
            Error::Parse(err) => write!(f, "parse error: {err}"),
        }
    }
}

impl std::error::Error for Error {}

/// A [`Result`](std::result::Result) with an [`Error`].
type Result<T> = std::result::Result<T, Error>;

////////////////////////////////////////////////////////////////////////////////////////
// Blocks
////////////////////////////////////////////////////////////////////////////////////////

/// A single exon block.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Block {
    /// The offset of the block from the start of the record.
    offset: Number,

    /// The size of the block.
    size: Number,
}

impl Block {
    /// Creates a new block.
    pub fn new(offset: Number, size: Number) -> Self {
        Self { offset, size }
    }

    /// Gets the offset from the start of the record.
    pub fn offset(&self) -> Number {
        self.offset
    }

    /// Gets the size.
    pub fn size(&self) -> Number {
        self.size
    }
}

/// The ordered exon blocks of a record.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Blocks(NonEmpty<Block>);

impl Blocks {
    /// Attempts to create blocks from parallel lists of sizes and offsets.
    ///
    /// # Examples
    ///
    /// ```
    /// use sscorrect::bed::Blocks;
    ///
    /// let blocks = Blocks::try_new(vec![10, 20], vec![0, 50])?;
    /// assert_eq!(blocks.len(), 2);
    /// assert_eq!(blocks.sizes().collect::<Vec<_>>(), vec![10, 20]);
    /// assert_eq!(blocks.offsets().collect::<Vec<_>>(), vec![0, 50]);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn try_new(sizes: Vec<Number>, offsets: Vec<Number>) -> Result<Self> {
        if sizes.len() != offsets.len() {
            return Err(Error::LengthMismatch(sizes.len(), offsets.len()));
        }

        let blocks = offsets
            .into_iter()
            .zip(sizes)
            .map(|(offset, size)| Block::new(offset, size))
            .collect::<Vec<_>>();

        NonEmpty::from_vec(blocks).map(Self).ok_or(Error::Empty)
    }

    /// Creates a single block starting at offset zero.
    pub fn single(size: Number) -> Self {
        Self(NonEmpty::new(Block::new(0, size)))
    }

    /// Attempts to parse blocks from the count, size and offset columns of a
    /// BED12 line.
    ///
    /// Trailing commas on the lists are optional.
    ///
    /// # Examples
    ///
    /// ```
    /// use sscorrect::bed::Blocks;
    ///
    /// let blocks = Blocks::try_from_str_parts("2", "10,20,", "0,50")?;
    /// assert_eq!(blocks, Blocks::try_new(vec![10, 20], vec![0, 50])?);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn try_from_str_parts(count: &str, sizes: &str, offsets: &str) -> Result<Self> {
        let count = count
            .parse::<usize>()
            .map_err(|err| Error::Parse(ParseError::InvalidCount(err)))?;
        let sizes =
            parse_list(sizes).map_err(|err| Error::Parse(ParseError::InvalidSize(err)))?;
        let offsets =
            parse_list(offsets).map_err(|err| Error::Parse(ParseError::InvalidOffset(err)))?;

        if sizes.len() != count || offsets.len() != count {
            return Err(Error::CountMismatch(count, sizes.len(), offsets.len()));
        }

        Self::try_new(sizes, offsets)
    }

    /// Gets the number of blocks.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Gets the first block.
    pub fn first(&self) -> &Block {
        self.0.first()
    }

    /// Iterates over the blocks.
    pub fn iter(&self) -> impl Iterator<Item = &Block> + '_ {
        self.0.iter()
    }

    /// Iterates over the block sizes.
    pub fn sizes(&self) -> impl Iterator<Item = Number> + '_ {
        self.iter().map(Block::size)
    }

    /// Iterates over the block offsets.
    pub fn offsets(&self) -> impl Iterator<Item = Number> + '_ {
        self.iter().map(Block::offset)
    }
}

impl std::fmt::Display for Blocks {
    /// Writes the block count, sizes and offsets as the last three BED12
    /// columns, with comma-terminated lists.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\t", self.len())?;

        for size in self.sizes() {
            write!(f, "{size}{LIST_DELIMITER}")?;
        }

        write!(f, "\t")?;

        for offset in self.offsets() {
            write!(f, "{offset}{LIST_DELIMITER}")?;
        }

        Ok(())
    }
}

/// Parses a comma-separated list of numbers with an optional trailing comma.
fn parse_list(s: &str) -> std::result::Result<Vec<Number>, ParseIntError> {
    s.strip_suffix(LIST_DELIMITER)
        .unwrap_or(s)
        .split(LIST_DELIMITER)
        .map(str::parse)
        .collect()
}
