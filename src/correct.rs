//! Correction of the splice junctions within BED12 alignments.
//!
//! Each record moves through the same steps: its junctions are extracted from
//! its blocks, both ends of every junction are resolved to their canonical
//! splice sites, the record is classified, and finally it is emitted with
//! either its corrected blocks (when consistent) or its original blocks (when
//! inconsistent). A record is never retried.

use std::collections::BTreeSet;
use std::io;
use std::io::BufRead;
use std::io::Write;

use tracing::debug;
use tracing::trace;

use crate::bed;
use crate::convert;
use crate::convert::Junction;
use crate::core::Number;
use crate::core::Strand;
use crate::reader;
use crate::resolve::Resolver;
use crate::resolve::Tally;
use crate::site::Kind;
use crate::Reader;

////////////////////////////////////////////////////////////////////////////////////////
// Errors
////////////////////////////////////////////////////////////////////////////////////////

/// An error related to a correction run.
#[derive(Debug)]
pub enum Error {
    /// An error reading alignments.
    InvalidAlignments(reader::Error),

    /// An error writing a corrected or inconsistent record.
    Io(io::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidAlignments(err) => write!(f, "invalid alignments: {err}"),
            Error::Io(err) => write!(f, "i/o error: {err}"),
        }
    }
}

impl std::error::Error for Error {}

/// A [`Result`](std::result::Result) with an [`Error`].
type Result<T> = std::result::Result<T, Error>;

////////////////////////////////////////////////////////////////////////////////////////
// Classification
////////////////////////////////////////////////////////////////////////////////////////

/// The reason a record was classified as inconsistent.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Reason {
    /// The record has junctions but no strand.
    UnknownStrand,

    /// A junction end did not resolve to a unique annotated site.
    UnresolvedSite,

    /// A junction resolved to two donors or two acceptors.
    IncompatibleSites,

    /// The resolved sites disagree on the strand.
    ConflictingStrands,

    /// A corrected block has no length.
    EmptyBlock,

    /// Corrected junctions cross each other or leave the record.
    InvertedBlock(convert::Error),
}

impl std::fmt::Display for Reason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Reason::UnknownStrand => write!(f, "spliced record without a strand"),
            Reason::UnresolvedSite => write!(f, "unresolved splice site"),
            Reason::IncompatibleSites => write!(f, "incompatible splice sites"),
            Reason::ConflictingStrands => write!(f, "splice sites on conflicting strands"),
            Reason::EmptyBlock => write!(f, "zero-length block"),
            Reason::InvertedBlock(err) => write!(f, "inverted block: {err}"),
        }
    }
}

/// The classification of a record.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Status {
    /// Every junction resolved to a donor/acceptor pair.
    Consistent,

    /// The record could not be corrected.
    Inconsistent(Reason),
}

/// A classified record, ready to be emitted.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Correction {
    /// The record to emit.
    record: bed::Record,

    /// The classification.
    status: Status,
}

impl Correction {
    /// Gets the record to emit.
    pub fn record(&self) -> &bed::Record {
        &self.record
    }

    /// Consumes self and returns the record to emit.
    pub fn into_record(self) -> bed::Record {
        self.record
    }

    /// Gets the classification.
    pub fn status(&self) -> Status {
        self.status
    }

    /// Whether the record is consistent.
    pub fn is_consistent(&self) -> bool {
        self.status == Status::Consistent
    }
}

/// Counts from a correction run.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Summary {
    /// Records read.
    pub records: usize,

    /// Records written to the corrected output.
    pub corrected: usize,

    /// Records written to the inconsistent output.
    pub inconsistent: usize,

    /// Outcomes of the distinct splice sites seen.
    pub sites: Tally,
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} records ({} corrected, {} inconsistent); splice sites: {}",
            self.records, self.corrected, self.inconsistent, self.sites
        )
    }
}

////////////////////////////////////////////////////////////////////////////////////////
// Corrector
////////////////////////////////////////////////////////////////////////////////////////

/// What the pipeline needs to know about a resolved junction end.
#[derive(Clone, Copy, Debug)]
struct Endpoint {
    /// The canonical coordinate.
    coordinate: Number,

    /// The kind of the canonical site.
    kind: Kind,

    /// The strand of the canonical site.
    strand: Strand,
}

/// Corrects the junctions of alignment records.
///
/// A corrector owns the [`Resolver`] for a single run, so every occurrence of
/// a coordinate within the run maps to the same canonical site.
#[derive(Debug)]
pub struct Corrector {
    /// The resolver shared by every record.
    resolver: Resolver,

    /// Whether to adopt the strand of the resolved splice sites.
    correct_strand: bool,
}

impl Corrector {
    /// Creates a corrector.
    ///
    /// When `correct_strand` is set, a record takes on the strand of its
    /// annotated splice sites, and sites on conflicting strands make it
    /// inconsistent.
    pub fn new(resolver: Resolver, correct_strand: bool) -> Self {
        Self {
            resolver,
            correct_strand,
        }
    }

    /// Gets the resolver.
    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Corrects and classifies a single record.
    ///
    /// When strand correction is enabled, only junction ends that resolved to
    /// an annotated site count as strand evidence. Novel and ambiguous ends
    /// merely echo the strand of the read, so a read with one annotated `-`
    /// end and one novel end is emitted as `-` (and still inconsistent),
    /// rather than being treated as a strand conflict.
    ///
    /// # Examples
    ///
    /// ```
    /// use sscorrect::correct::Corrector;
    /// use sscorrect::index;
    /// use sscorrect::resolve::Resolver;
    ///
    /// let annotations = b"chr1\t100\t200\tgene1\t+";
    /// let index = index::Builder::new(5).try_build_from(sscorrect::Reader::new(&annotations[..]))?;
    /// let mut corrector = Corrector::new(Resolver::new(index), false);
    ///
    /// let record = "chr1\t50\t300\tread1\t0\t+\t50\t300\t0\t2\t53,103,\t0,147,".parse()?;
    /// let correction = corrector.correct(record);
    ///
    /// assert!(correction.is_consistent());
    /// assert_eq!(
    ///     correction.record().to_string(),
    ///     "chr1\t50\t300\tread1\t0\t+\t50\t300\t0\t2\t50,100,\t0,150,"
    /// );
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn correct(&mut self, mut record: bed::Record) -> Correction {
        let junctions = convert::blocks_to_junctions(record.start(), record.blocks());

        let declared = match (record.strand(), junctions.is_empty()) {
            (Some(strand), _) => Some(strand),
            (None, true) => None,
            (None, false) => {
                return Correction {
                    record,
                    status: Status::Inconsistent(Reason::UnknownStrand),
                };
            }
        };

        let mut reason = None;
        let mut evidence = BTreeSet::new();
        let mut corrected = Vec::with_capacity(junctions.len());

        if let Some(strand) = declared {
            let (left_kind, right_kind) = Kind::expected(strand);

            for junction in &junctions {
                let left = self.endpoint(junction.left(), strand, left_kind);
                let right = self.endpoint(junction.right(), strand, right_kind);

                for endpoint in [left, right] {
                    if endpoint.kind != Kind::Unresolved {
                        evidence.insert(endpoint.strand);
                    }
                }

                if !left.kind.compatible(right.kind) {
                    let found = if left.kind == Kind::Unresolved || right.kind == Kind::Unresolved
                    {
                        Reason::UnresolvedSite
                    } else {
                        Reason::IncompatibleSites
                    };

                    reason.get_or_insert(found);
                }

                corrected.push(Junction::new(left.coordinate, right.coordinate));
            }
        }

        if self.correct_strand {
            let mut strands = evidence.into_iter();

            match (strands.next(), strands.next()) {
                (Some(_), Some(_)) => {
                    reason.get_or_insert(Reason::ConflictingStrands);
                }
                (Some(strand), None) => record.set_strand(strand),
                _ => {}
            }
        }

        let status = match (
            reason,
            convert::junctions_to_blocks(record.start(), record.end(), &corrected),
        ) {
            (Some(reason), _) => Status::Inconsistent(reason),
            (None, Err(err)) => Status::Inconsistent(Reason::InvertedBlock(err)),
            (None, Ok(blocks)) if blocks.sizes().any(|size| size == 0) => {
                Status::Inconsistent(Reason::EmptyBlock)
            }
            (None, Ok(blocks)) => {
                record.set_blocks(blocks);
                Status::Consistent
            }
        };

        trace!("{}: {:?}", record.name(), status);

        Correction { record, status }
    }

    /// Corrects every alignment in `reader`, writing consistent records to
    /// `corrected` and inconsistent records to `inconsistent` in input order.
    ///
    /// # Examples
    ///
    /// ```
    /// use sscorrect::correct::Corrector;
    /// use sscorrect::index;
    /// use sscorrect::resolve::Resolver;
    ///
    /// let annotations = b"chr1\t100\t200\tgene1\t+";
    /// let index = index::Builder::new(5).try_build_from(sscorrect::Reader::new(&annotations[..]))?;
    /// let mut corrector = Corrector::new(Resolver::new(index), false);
    ///
    /// let alignments = b"chr1\t50\t300\tread2\t0\t+\t50\t300\t0\t2\t53,150,\t0,100,\n";
    /// let mut corrected = Vec::new();
    /// let mut inconsistent = Vec::new();
    ///
    /// let summary = corrector.run(
    ///     sscorrect::Reader::new(&alignments[..]),
    ///     &mut corrected,
    ///     &mut inconsistent,
    /// )?;
    ///
    /// assert_eq!(summary.inconsistent, 1);
    /// assert!(corrected.is_empty());
    /// assert_eq!(inconsistent, alignments);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn run<T, C, I>(
        &mut self,
        mut reader: Reader<T>,
        corrected: &mut C,
        inconsistent: &mut I,
    ) -> Result<Summary>
    where
        T: BufRead,
        C: Write,
        I: Write,
    {
        let mut summary = Summary::default();

        for result in reader.alignments() {
            let record = result.map_err(Error::InvalidAlignments)?;
            let correction = self.correct(record);

            summary.records += 1;

            match correction.status() {
                Status::Consistent => {
                    summary.corrected += 1;
                    writeln!(corrected, "{}", correction.record()).map_err(Error::Io)?;
                }
                Status::Inconsistent(_) => {
                    summary.inconsistent += 1;
                    writeln!(inconsistent, "{}", correction.record()).map_err(Error::Io)?;
                }
            }
        }

        summary.sites = self.resolver.tally();
        debug!("{summary}");

        Ok(summary)
    }

    /// Resolves a junction end and keeps what classification needs.
    fn endpoint(&mut self, coordinate: Number, strand: Strand, expected: Kind) -> Endpoint {
        let site = self.resolver.resolve(coordinate, strand, expected);

        Endpoint {
            coordinate: site.coordinate(),
            kind: site.kind(),
            strand: site.strand(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index;

    fn corrector(annotations: &[u8], wiggle: Number, correct_strand: bool) -> Corrector {
        let index = index::Builder::new(wiggle)
            .try_build_from(Reader::new(annotations))
            .unwrap();
        Corrector::new(Resolver::new(index), correct_strand)
    }

    fn correct(corrector: &mut Corrector, line: &str) -> Correction {
        corrector.correct(line.parse().unwrap())
    }

    #[test]
    fn corrects_sites_within_the_window() {
        let mut corrector = corrector(b"chr1\t100\t200\tgene1\t+", 5, false);

        let correction = correct(
            &mut corrector,
            "chr1\t50\t300\tread1\t0\t+\t50\t300\t0\t2\t53,103,\t0,147,",
        );

        assert_eq!(correction.status(), Status::Consistent);
        assert_eq!(
            correction.record().to_string(),
            "chr1\t50\t300\tread1\t0\t+\t50\t300\t0\t2\t50,100,\t0,150,"
        );
    }

    #[test]
    fn novel_sites_keep_original_coordinates() {
        let mut corrector = corrector(b"chr1\t100\t200\tgene1\t+", 5, false);
        let line = "chr1\t50\t300\tread2\t0\t+\t50\t300\t0\t2\t53,150,\t0,100,";

        let correction = correct(&mut corrector, line);

        assert_eq!(
            correction.status(),
            Status::Inconsistent(Reason::UnresolvedSite)
        );
        assert_eq!(correction.record().to_string(), line);
    }

    #[test]
    fn reverse_strand_reads() {
        let mut corrector = corrector(b"chr1\t100\t200\tgene1\t-", 5, false);

        let correction = correct(
            &mut corrector,
            "chr1\t50\t300\tread1\t0\t-\t50\t300\t0\t2\t53,103,\t0,147,",
        );

        assert_eq!(correction.status(), Status::Consistent);
        assert_eq!(correction.record().strand(), Some(Strand::Negative));
    }

    #[test]
    fn two_donors_are_inconsistent() {
        let annotations = b"chr1\t100\t200\ta\t+\nchr1\t300\t400\ta\t+\nchr1\t500\t600\ta\t+\n";
        let mut corrector = corrector(annotations, 5, false);

        // (103, 197) is clean, but (302, 502) resolves to two donors.
        let line = "chr1\t50\t700\tread\t0\t+\t50\t700\t0\t3\t53,105,198,\t0,147,452,";
        let correction = correct(&mut corrector, line);

        assert_eq!(
            correction.status(),
            Status::Inconsistent(Reason::IncompatibleSites)
        );
        assert_eq!(correction.record().to_string(), line);
    }

    #[test]
    fn two_acceptors_are_inconsistent() {
        let annotations = b"chr1\t100\t200\ta\t+\nchr1\t300\t400\ta\t+\nchr1\t500\t600\ta\t+\n";
        let mut corrector = corrector(annotations, 5, false);

        // (103, 197) is clean, but (398, 598) resolves to two acceptors.
        let line = "chr1\t50\t700\tread\t0\t+\t50\t700\t0\t3\t53,201,102,\t0,147,548,";
        let correction = correct(&mut corrector, line);

        assert_eq!(
            correction.status(),
            Status::Inconsistent(Reason::IncompatibleSites)
        );
        assert_eq!(correction.record().to_string(), line);

        // A single junction from one acceptor to the next.
        let line = "chr1\t50\t700\tread\t0\t+\t50\t700\t0\t2\t148,302,\t0,348,";
        assert_eq!(
            correct(&mut corrector, line).status(),
            Status::Inconsistent(Reason::IncompatibleSites)
        );
    }

    #[test]
    fn zero_length_blocks_are_inconsistent() {
        let annotations = b"chr1\t100\t200\ta\t-\nchr1\t200\t300\tb\t+\n";
        let mut corrector = corrector(annotations, 5, false);

        // Both junctions resolve to valid pairs, but they meet at 200.
        let line = "chr1\t50\t400\tread\t0\t+\t50\t400\t0\t3\t52,4,102,\t0,148,248,";
        let correction = correct(&mut corrector, line);

        assert_eq!(correction.status(), Status::Inconsistent(Reason::EmptyBlock));
        assert_eq!(correction.record().to_string(), line);
    }

    #[test]
    fn inverted_blocks_are_inconsistent() {
        let mut corrector = corrector(b"chr1\t100\t200\tgene1\t+", 5, false);

        // The left end corrects to 100, before the start of the read.
        let line = "chr1\t101\t300\tread\t0\t+\t101\t300\t0\t2\t2,103,\t0,96,";
        let correction = correct(&mut corrector, line);

        assert_eq!(
            correction.status(),
            Status::Inconsistent(Reason::InvertedBlock(convert::Error::InvertedBlock(0)))
        );
        assert_eq!(correction.record().to_string(), line);
    }

    #[test]
    fn strand_is_corrected() {
        let annotations = b"chr1\t100\t200\tgene1\t-";
        let line = "chr1\t50\t300\tread\t0\t+\t50\t300\t0\t2\t52,102,\t0,148,";

        let mut corrector = corrector(annotations, 5, true);
        let correction = correct(&mut corrector, line);
        assert_eq!(correction.status(), Status::Consistent);
        assert_eq!(
            correction.record().to_string(),
            "chr1\t50\t300\tread\t0\t-\t50\t300\t0\t2\t50,100,\t0,150,"
        );

        let mut corrector = self::corrector(annotations, 5, false);
        let correction = correct(&mut corrector, line);
        assert_eq!(correction.status(), Status::Consistent);
        assert_eq!(correction.record().strand(), Some(Strand::Positive));
    }

    #[test]
    fn conflicting_strands_are_inconsistent() {
        let annotations = b"chr1\t100\t150\ta\t+\nchr1\t300\t400\tb\t-\n";
        let line = "chr1\t50\t500\tread\t0\t+\t50\t500\t0\t2\t51,201,\t0,249,";

        let mut corrector = corrector(annotations, 5, true);
        let correction = correct(&mut corrector, line);
        assert_eq!(
            correction.status(),
            Status::Inconsistent(Reason::ConflictingStrands)
        );
        assert_eq!(correction.record().to_string(), line);

        let mut corrector = self::corrector(annotations, 5, false);
        assert!(correct(&mut corrector, line).is_consistent());
    }

    #[test]
    fn inconsistent_records_carry_the_adopted_strand() {
        // The left end resolves to an annotated site on the negative strand,
        // the right end is novel.
        let mut corrector = corrector(b"chr1\t100\t200\tgene1\t-", 5, true);

        let correction = correct(
            &mut corrector,
            "chr1\t50\t300\tread\t0\t+\t50\t300\t0\t2\t53,150,\t0,100,",
        );

        assert_eq!(
            correction.status(),
            Status::Inconsistent(Reason::UnresolvedSite)
        );
        assert_eq!(
            correction.record().to_string(),
            "chr1\t50\t300\tread\t0\t-\t50\t300\t0\t2\t53,150,\t0,100,"
        );
    }

    #[test]
    fn unresolved_sites_keep_the_declared_strand() {
        let mut corrector = corrector(b"chr1\t100\t200\tgene1\t-", 5, true);

        let correction = correct(
            &mut corrector,
            "chr1\t1000\t3000\tread\t0\t+\t1000\t3000\t0\t2\t500,1000,\t0,1000,",
        );

        assert_eq!(
            correction.status(),
            Status::Inconsistent(Reason::UnresolvedSite)
        );
        assert_eq!(correction.record().strand(), Some(Strand::Positive));
    }

    #[test]
    fn single_exon_reads_pass_through() {
        let mut corrector = corrector(b"chr1\t100\t200\tgene1\t+", 5, true);

        for line in [
            "chr1\t50\t300\tread\t0\t+\t50\t300\t0\t1\t250,\t0,",
            "chr1\t50\t300\tread\t0\t.\t50\t300\t0\t1\t250,\t0,",
        ] {
            let correction = correct(&mut corrector, line);
            assert_eq!(correction.status(), Status::Consistent);
            assert_eq!(correction.record().to_string(), line);
        }

        assert_eq!(corrector.resolver().resolved(), 0);
    }

    #[test]
    fn unstranded_spliced_reads_pass_through() {
        let mut corrector = corrector(b"chr1\t100\t200\tgene1\t+", 5, true);
        let line = "chr1\t50\t300\tread\t0\t.\t50\t300\t0\t2\t53,103,\t0,147,";

        let correction = correct(&mut corrector, line);

        assert_eq!(
            correction.status(),
            Status::Inconsistent(Reason::UnknownStrand)
        );
        assert_eq!(correction.record().to_string(), line);
        assert_eq!(corrector.resolver().resolved(), 0);
    }

    #[test]
    fn run_partitions_records_in_order() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let mut corrector = corrector(b"chr1\t100\t200\tgene1\t+", 5, false);

        let alignments = b"track name=reads\n\
            chr1\t50\t300\tread1\t0\t+\t50\t300\t0\t2\t53,103,\t0,147,\n\
            chr1\t50\t300\tread2\t0\t+\t50\t300\t0\t2\t53,150,\t0,100,\n\
            chr1\t50\t300\tread3\t0\t+\t50\t300\t0\t2\t51,101,\t0,149,\n\
            chr1\t50\t300\tread4\t0\t+\t50\t300\t0\t2\t53,150,\t0,100,\n";

        let mut corrected = Vec::new();
        let mut inconsistent = Vec::new();
        let summary = corrector.run(
            Reader::new(&alignments[..]),
            &mut corrected,
            &mut inconsistent,
        )?;

        assert_eq!(
            String::from_utf8(corrected)?,
            "chr1\t50\t300\tread1\t0\t+\t50\t300\t0\t2\t50,100,\t0,150,\n\
             chr1\t50\t300\tread3\t0\t+\t50\t300\t0\t2\t50,100,\t0,150,\n"
        );
        assert_eq!(
            String::from_utf8(inconsistent)?,
            "chr1\t50\t300\tread2\t0\t+\t50\t300\t0\t2\t53,150,\t0,100,\n\
             chr1\t50\t300\tread4\t0\t+\t50\t300\t0\t2\t53,150,\t0,100,\n"
        );

        assert_eq!(summary.records, 4);
        assert_eq!(summary.corrected, 2);
        assert_eq!(summary.inconsistent, 2);

        // 103, 197, 101, 199 are corrected; 150 is novel once.
        assert_eq!(
            summary.sites,
            Tally {
                annotated: 0,
                corrected: 4,
                ambiguous: 0,
                novel: 1,
            }
        );

        Ok(())
    }

    #[test]
    fn run_stops_at_malformed_records() {
        let mut corrector = corrector(b"chr1\t100\t200\tgene1\t+", 5, false);
        let alignments = b"chr1\t50\t300\tread1\t0\t+\t50\t300\t0\t2\t53,103,\t0,147,\nchr1\t50\n";

        let mut corrected = Vec::new();
        let mut inconsistent = Vec::new();
        let err = corrector
            .run(Reader::new(&alignments[..]), &mut corrected, &mut inconsistent)
            .unwrap_err();

        assert!(matches!(
            err,
            Error::InvalidAlignments(reader::Error::InvalidAlignment(2, _, _))
        ));
    }
}
