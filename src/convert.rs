//! Conversion between BED12 blocks and junction coordinates.
//!
//! A junction is the gap between two consecutive blocks: its left coordinate
//! is the (exclusive) end of the upstream block and its right coordinate is
//! the start of the downstream block.

use crate::bed::Blocks;
use crate::core::Number;

/// An error related to rebuilding blocks from junctions.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Error {
    /// The block at the given index would end before it starts.
    ///
    /// This happens when junctions cross each other or fall outside of the
    /// record.
    InvertedBlock(usize),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvertedBlock(index) => {
                write!(f, "block {index} would end before it starts")
            }
        }
    }
}

impl std::error::Error for Error {}

/// A [`Result`](std::result::Result) with an [`Error`].
type Result<T> = std::result::Result<T, Error>;

/// An intron, described by its two boundaries on the genome.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Junction {
    /// The left boundary.
    left: Number,

    /// The right boundary.
    right: Number,
}

impl Junction {
    /// Creates a new junction.
    pub fn new(left: Number, right: Number) -> Self {
        Self { left, right }
    }

    /// Gets the left boundary.
    pub fn left(&self) -> Number {
        self.left
    }

    /// Gets the right boundary.
    pub fn right(&self) -> Number {
        self.right
    }
}

impl std::fmt::Display for Junction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.left, self.right)
    }
}

/// Gets the junctions between consecutive blocks of a record starting at
/// `start`.
///
/// # Examples
///
/// ```
/// use sscorrect::bed::Blocks;
/// use sscorrect::convert;
/// use sscorrect::convert::Junction;
///
/// let blocks = Blocks::try_new(vec![53, 103], vec![0, 147])?;
/// let junctions = convert::blocks_to_junctions(50, &blocks);
///
/// assert_eq!(junctions, vec![Junction::new(103, 197)]);
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn blocks_to_junctions(start: Number, blocks: &Blocks) -> Vec<Junction> {
    blocks
        .iter()
        .zip(blocks.iter().skip(1))
        .map(|(upstream, downstream)| {
            Junction::new(
                start + upstream.offset() + upstream.size(),
                start + downstream.offset(),
            )
        })
        .collect()
}

/// Rebuilds the blocks of a record spanning `start` to `end` from its
/// junctions.
///
/// Without junctions, a single block spans the whole record. Zero-sized
/// blocks are returned as is; a block that would have a negative size is an
/// [`Error::InvertedBlock`].
///
/// # Examples
///
/// ```
/// use sscorrect::bed::Blocks;
/// use sscorrect::convert;
/// use sscorrect::convert::Junction;
///
/// let blocks = convert::junctions_to_blocks(50, 300, &[Junction::new(100, 200)])?;
/// assert_eq!(blocks, Blocks::try_new(vec![50, 100], vec![0, 150])?);
///
/// let blocks = convert::junctions_to_blocks(50, 300, &[])?;
/// assert_eq!(blocks, Blocks::single(250));
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn junctions_to_blocks(start: Number, end: Number, junctions: &[Junction]) -> Result<Blocks> {
    // Each block runs from the right side of the previous junction (or the
    // record start) to the left side of the next junction (or the record end).
    let block_starts = junctions.iter().map(Junction::right);
    let block_ends = junctions.iter().map(Junction::left);

    let mut sizes = Vec::with_capacity(junctions.len() + 1);
    let mut offsets = Vec::with_capacity(junctions.len() + 1);

    for (index, (from, to)) in std::iter::once(start)
        .chain(block_starts)
        .zip(block_ends.chain(std::iter::once(end)))
        .enumerate()
    {
        let offset = from.checked_sub(start).ok_or(Error::InvertedBlock(index))?;
        let size = to.checked_sub(from).ok_or(Error::InvertedBlock(index))?;

        offsets.push(offset);
        sizes.push(size);
    }

    Ok(Blocks::try_new(sizes, offsets)
        .unwrap_or_else(|_| unreachable!("at least one block is always produced")))
}
