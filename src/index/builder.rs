//! A builder for an [`Index`].

use std::collections::hash_map::Entry;
use std::io::BufRead;

use rust_lapper as lapper;
use tracing::debug;

use crate::annotation;
use crate::core::Number;
use crate::index::Index;
use crate::index::Window;
use crate::reader;
use crate::site::Kind;
use crate::site::Site;
use crate::site::Table;

/// The inner value of the window lookup data structure.
type Iv = lapper::Interval<Number, Number>;

/// An error related to building an [`Index`].
#[derive(Debug)]
pub enum Error {
    /// An error reading annotated junctions.
    InvalidAnnotations(reader::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidAnnotations(err) => write!(f, "invalid annotations: {err}"),
        }
    }
}

impl std::error::Error for Error {}

/// A [`Result`](std::result::Result) with an [`Error`].
type Result<T> = std::result::Result<T, Error>;

/// A builder for an [`Index`].
#[derive(Debug)]
pub struct Builder {
    /// The distance on either side of each annotated site to accept.
    wiggle: Number,

    /// The windows collected so far.
    windows: Vec<Iv>,

    /// The annotated sites collected so far.
    sites: Table,
}

impl Builder {
    /// Creates a builder whose windows extend `wiggle` positions on either
    /// side of each annotated site.
    pub fn new(wiggle: Number) -> Self {
        Self {
            wiggle,
            windows: Vec::new(),
            sites: Table::new(),
        }
    }

    /// Adds both splice sites of an annotated junction.
    ///
    /// A coordinate that was already added keeps its strand and kind; only
    /// the annotation source is added to its support.
    ///
    /// # Examples
    ///
    /// ```
    /// use sscorrect::annotation;
    /// use sscorrect::core::Strand;
    /// use sscorrect::index;
    /// use sscorrect::site::Kind;
    ///
    /// let mut builder = index::Builder::new(15);
    /// builder.push(&annotation::Record::new("chr1", 100, 200, "gencode", Strand::Negative));
    /// builder.push(&annotation::Record::new("chr1", 100, 300, "refseq", Strand::Negative));
    /// let index = builder.build();
    ///
    /// let site = index.site(100).unwrap();
    /// assert_eq!(site.kind(), Kind::Acceptor);
    /// assert_eq!(site.support().len(), 2);
    ///
    /// assert_eq!(index.site(200).unwrap().kind(), Kind::Donor);
    /// assert_eq!(index.len(), 3);
    /// ```
    pub fn push(&mut self, record: &annotation::Record) {
        let (left, right) = Kind::expected(record.strand());

        self.add_site(record, record.start(), left);
        self.add_site(record, record.end(), right);
    }

    /// Builds the [`Index`].
    pub fn build(self) -> Index {
        debug!(
            "indexed {} annotated splice sites with a wiggle of {}",
            self.sites.len(),
            self.wiggle
        );

        Index {
            windows: lapper::Lapper::new(self.windows),
            sites: self.sites,
            wiggle: self.wiggle,
        }
    }

    /// Builds an [`Index`] from every annotated junction in `reader`.
    ///
    /// # Examples
    ///
    /// ```
    /// let data = b"chr1\t100\t200\tgene1\t+\nchr1\t300\t400\tgene1\t+";
    /// let reader = sscorrect::Reader::new(&data[..]);
    ///
    /// let index = sscorrect::index::Builder::new(15).try_build_from(reader)?;
    /// assert_eq!(index.len(), 4);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn try_build_from<T>(mut self, mut reader: reader::Reader<T>) -> Result<Index>
    where
        T: BufRead,
    {
        for result in reader.annotations() {
            let record = result.map_err(Error::InvalidAnnotations)?;
            self.push(&record);
        }

        Ok(self.build())
    }

    /// Adds a single annotated site, opening a window for it if it is new.
    fn add_site(&mut self, record: &annotation::Record, coordinate: Number, kind: Kind) {
        match self.sites.entry(coordinate) {
            Entry::Occupied(mut entry) => entry.get_mut().add_support(record.source()),
            Entry::Vacant(entry) => {
                entry.insert(Site::annotated(
                    coordinate,
                    record.strand(),
                    kind,
                    record.source(),
                ));

                let window = Window::around(coordinate, self.wiggle);
                self.windows.push(lapper::Interval {
                    start: window.start(),
                    stop: window.end().saturating_add(1),
                    val: coordinate,
                });
            }
        }
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new(super::DEFAULT_WIGGLE)
    }
}
