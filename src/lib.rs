//! `sscorrect` is a crate for correcting the splice junctions of spliced
//! alignments against a set of annotated splice sites.
//!
//! Aligners frequently place a splice junction a few bases away from where
//! it really is. Given the junctions of a known annotation, this crate moves
//! every observed junction end to the closest annotated splice site within a
//! small window (the "wiggle"), and sorts each alignment into one of two
//! partitions:
//!
//! - **Corrected**: every junction now runs from a donor to an acceptor, and
//!   the blocks of the alignment were rebuilt from the corrected junctions.
//! - **Inconsistent**: some junction end could not be resolved (it is novel,
//!   or it is equally close to two annotated sites), a junction pairs two
//!   donors or two acceptors, the sites disagree about the strand, or the
//!   rebuilt blocks make no sense. These alignments are emitted untouched.
//!
//! ## Building an index
//!
//! Annotated junctions are read with a [`Reader`] and collected into an
//! [`index::Index`] using an [`index::Builder`]. Each annotated junction
//! contributes two splice sites whose kinds follow from its strand.
//!
//! ## Correcting alignments
//!
//! A [`resolve::Resolver`] wraps the index and remembers the answer for every
//! coordinate it resolves. A [`correct::Corrector`] drives the resolver over
//! BED12 records, either one record at a time via
//! [`correct::Corrector::correct()`] or over an entire input via
//! [`correct::Corrector::run()`].
//!
//! ```
//! use sscorrect::correct::Corrector;
//! use sscorrect::index;
//! use sscorrect::resolve::Resolver;
//!
//! let annotations = b"chr1\t100\t200\tgene1\t+\n";
//! let index = index::Builder::new(5).try_build_from(sscorrect::Reader::new(&annotations[..]))?;
//! let mut corrector = Corrector::new(Resolver::new(index), false);
//!
//! let alignments = b"chr1\t50\t300\tread1\t0\t+\t50\t300\t0\t2\t53,103,\t0,147,\n\
//!     chr1\t50\t300\tread2\t0\t+\t50\t300\t0\t2\t53,150,\t0,100,\n";
//!
//! let mut corrected = Vec::new();
//! let mut inconsistent = Vec::new();
//! let summary = corrector.run(
//!     sscorrect::Reader::new(&alignments[..]),
//!     &mut corrected,
//!     &mut inconsistent,
//! )?;
//!
//! assert_eq!(summary.corrected, 1);
//! assert_eq!(summary.inconsistent, 1);
//! assert_eq!(
//!     String::from_utf8(corrected)?,
//!     "chr1\t50\t300\tread1\t0\t+\t50\t300\t0\t2\t50,100,\t0,150,\n"
//! );
//!
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![warn(rust_2021_compatibility)]
#![warn(missing_debug_implementations)]
#![warn(clippy::missing_docs_in_private_items)]
#![warn(rustdoc::broken_intra_doc_links)]

pub mod annotation;
pub mod bed;
pub mod convert;
pub mod core;
pub mod correct;
pub mod index;
pub mod reader;
pub mod resolve;
pub mod site;

pub use self::reader::Reader;
