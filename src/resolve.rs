//! Resolution of observed splice sites to annotated splice sites.
//!
//! An observed coordinate is resolved by looking for annotated sites whose
//! tolerance window contains it:
//!
//! - If there are none, the site is novel.
//! - If several annotated sites are equally close, the site is ambiguous.
//!   A tie is never broken arbitrarily.
//! - Otherwise, the closest annotated site becomes the canonical site.
//!
//! Novel and ambiguous sites are their own canonical sites and have
//! [`Kind::Unresolved`]. Every coordinate is resolved at most once per
//! [`Resolver`]: later lookups of the same coordinate return the remembered
//! answer.

use std::collections::HashSet;

use tracing::trace;

use crate::core::Number;
use crate::core::Strand;
use crate::index::Index;
use crate::site::Kind;
use crate::site::Site;
use crate::site::Table;

/// The outcome of resolving a single coordinate.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Outcome {
    /// The coordinate is an annotated site.
    Annotated,

    /// The coordinate was corrected to the annotated site at the given
    /// coordinate.
    Corrected(Number),

    /// Several annotated sites are equally close to the coordinate.
    Ambiguous,

    /// No annotated site is close enough to the coordinate.
    Novel,
}

/// Counts of distinct coordinates by [`Outcome`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Tally {
    /// Coordinates that are annotated sites.
    pub annotated: usize,

    /// Coordinates corrected to an annotated site.
    pub corrected: usize,

    /// Coordinates equally close to several annotated sites.
    pub ambiguous: usize,

    /// Coordinates with no annotated site nearby.
    pub novel: usize,
}

impl Tally {
    /// Counts one outcome.
    fn count(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Annotated => self.annotated += 1,
            Outcome::Corrected(_) => self.corrected += 1,
            Outcome::Ambiguous => self.ambiguous += 1,
            Outcome::Novel => self.novel += 1,
        }
    }
}

impl std::fmt::Display for Tally {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} annotated, {} corrected, {} ambiguous, {} novel",
            self.annotated, self.corrected, self.ambiguous, self.novel
        )
    }
}

/// Resolves observed coordinates against an [`Index`], remembering every
/// answer for the lifetime of the resolver.
#[derive(Debug)]
pub struct Resolver {
    /// The annotated sites.
    index: Index,

    /// Observed sites that are not annotated, keyed by coordinate.
    observed: Table,

    /// Annotated coordinates that have been observed.
    seen: HashSet<Number>,

    /// The outcomes of the distinct coordinates resolved so far.
    tally: Tally,
}

impl Resolver {
    /// Creates a resolver with nothing resolved yet.
    pub fn new(index: Index) -> Self {
        Self {
            index,
            observed: Table::new(),
            seen: HashSet::new(),
            tally: Tally::default(),
        }
    }

    /// Gets the index.
    pub fn index(&self) -> &Index {
        &self.index
    }

    /// Gets the tally of outcomes so far.
    pub fn tally(&self) -> Tally {
        self.tally
    }

    /// Decides what an observed coordinate resolves to, without remembering
    /// the answer.
    ///
    /// # Examples
    ///
    /// ```
    /// use sscorrect::annotation;
    /// use sscorrect::core::Strand;
    /// use sscorrect::index;
    /// use sscorrect::resolve::Outcome;
    /// use sscorrect::resolve::Resolver;
    ///
    /// let mut builder = index::Builder::new(5);
    /// builder.push(&annotation::Record::new("chr1", 100, 110, "gene1", Strand::Positive));
    /// let resolver = Resolver::new(builder.build());
    ///
    /// assert_eq!(resolver.classify(100), Outcome::Annotated);
    /// assert_eq!(resolver.classify(97), Outcome::Corrected(100));
    /// assert_eq!(resolver.classify(105), Outcome::Ambiguous);
    /// assert_eq!(resolver.classify(150), Outcome::Novel);
    /// ```
    pub fn classify(&self, coordinate: Number) -> Outcome {
        if self.index.site(coordinate).is_some() {
            return Outcome::Annotated;
        }

        let windows = self.index.query(coordinate);

        let min = match windows.iter().map(|w| w.distance(coordinate)).min() {
            Some(min) => min,
            None => return Outcome::Novel,
        };

        let mut closest = windows.iter().filter(|w| w.distance(coordinate) == min);

        match (closest.next(), closest.next()) {
            (Some(window), None) => Outcome::Corrected(window.coordinate()),
            _ => Outcome::Ambiguous,
        }
    }

    /// Resolves an observed coordinate and returns its canonical site.
    ///
    /// `strand` and `expected` describe the read the coordinate was observed
    /// on. They are only recorded the first time a coordinate is seen.
    ///
    /// # Examples
    ///
    /// ```
    /// use sscorrect::annotation;
    /// use sscorrect::core::Strand;
    /// use sscorrect::index;
    /// use sscorrect::resolve::Resolver;
    /// use sscorrect::site::Kind;
    ///
    /// let mut builder = index::Builder::new(5);
    /// builder.push(&annotation::Record::new("chr1", 100, 200, "gene1", Strand::Positive));
    /// let mut resolver = Resolver::new(builder.build());
    ///
    /// let site = resolver.resolve(103, Strand::Positive, Kind::Donor);
    /// assert_eq!(site.coordinate(), 100);
    /// assert_eq!(site.kind(), Kind::Donor);
    ///
    /// let site = resolver.resolve(150, Strand::Positive, Kind::Acceptor);
    /// assert_eq!(site.coordinate(), 150);
    /// assert_eq!(site.kind(), Kind::Unresolved);
    /// ```
    pub fn resolve(&mut self, coordinate: Number, strand: Strand, expected: Kind) -> &Site {
        if !self.is_resolved(coordinate) {
            self.remember(coordinate, strand, expected);
        }

        self.canonical(coordinate)
            .unwrap_or_else(|| unreachable!("coordinate {coordinate} was just resolved"))
    }

    /// Gets the site recorded at `coordinate`, whether annotated or observed.
    pub fn site(&self, coordinate: Number) -> Option<&Site> {
        self.index
            .site(coordinate)
            .or_else(|| self.observed.get(&coordinate))
    }

    /// Gets the canonical site of an already resolved `coordinate`.
    pub fn canonical(&self, coordinate: Number) -> Option<&Site> {
        let site = self.site(coordinate)?;
        self.site(site.canonical())
    }

    /// Gets the number of distinct coordinates resolved so far.
    pub fn resolved(&self) -> usize {
        self.seen.len() + self.observed.len()
    }

    /// Whether `coordinate` has been resolved before.
    fn is_resolved(&self, coordinate: Number) -> bool {
        self.seen.contains(&coordinate) || self.observed.contains_key(&coordinate)
    }

    /// Classifies a coordinate that has not been seen before and records the
    /// resulting site.
    fn remember(&mut self, coordinate: Number, strand: Strand, expected: Kind) {
        let outcome = self.classify(coordinate);
        trace!("resolved splice site {coordinate} as {outcome:?}");
        self.tally.count(outcome);

        match outcome {
            // Annotated sites already live in the index.
            Outcome::Annotated => {
                self.seen.insert(coordinate);
            }
            Outcome::Corrected(canonical) => {
                let site = Site::corrected(coordinate, strand, expected, canonical);
                self.observed.insert(coordinate, site);
            }
            Outcome::Ambiguous | Outcome::Novel => {
                self.observed
                    .insert(coordinate, Site::unresolved(coordinate, strand));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index;
    use crate::Reader;

    fn resolver(data: &[u8], wiggle: Number) -> Resolver {
        let index = index::Builder::new(wiggle)
            .try_build_from(Reader::new(data))
            .unwrap();
        Resolver::new(index)
    }

    #[test]
    fn window_boundary() {
        let mut resolver = resolver(b"chr1\t100\t200\tgene1\t+", 5);

        assert_eq!(
            resolver.resolve(105, Strand::Positive, Kind::Donor).coordinate(),
            100
        );
        assert_eq!(
            resolver.resolve(95, Strand::Positive, Kind::Donor).coordinate(),
            100
        );

        let site = resolver.resolve(106, Strand::Positive, Kind::Donor);
        assert_eq!(site.coordinate(), 106);
        assert_eq!(site.kind(), Kind::Unresolved);
    }

    #[test]
    fn ties_are_unresolved() {
        let mut resolver = resolver(b"chr1\t100\t110\tgene1\t+", 5);

        let site = resolver.resolve(105, Strand::Positive, Kind::Donor);
        assert_eq!(site.coordinate(), 105);
        assert_eq!(site.kind(), Kind::Unresolved);
        assert!(site.is_canonical());

        assert_eq!(resolver.tally().ambiguous, 1);
    }

    #[test]
    fn nearest_site_wins() {
        let mut resolver = resolver(b"chr1\t100\t110\tgene1\t+", 5);

        let site = resolver.resolve(104, Strand::Positive, Kind::Acceptor);
        assert_eq!(site.coordinate(), 100);
        assert_eq!(site.kind(), Kind::Donor);

        let site = resolver.resolve(106, Strand::Positive, Kind::Acceptor);
        assert_eq!(site.coordinate(), 110);
        assert_eq!(site.kind(), Kind::Acceptor);
    }

    #[test]
    fn canonical_site_is_the_annotated_site() {
        let mut resolver = resolver(b"chr1\t100\t200\tgene1\t-", 5);

        let canonical = resolver
            .resolve(102, Strand::Positive, Kind::Donor)
            .clone();
        assert_eq!(Some(&canonical), resolver.index().site(100));
        assert_eq!(canonical.strand(), Strand::Negative);
        assert_eq!(canonical.kind(), Kind::Acceptor);

        // The observed site keeps what the read said about it.
        let observed = resolver.site(102).unwrap();
        assert_eq!(observed.strand(), Strand::Positive);
        assert_eq!(observed.kind(), Kind::Donor);
        assert_eq!(observed.canonical(), 100);
    }

    #[test]
    fn resolution_is_memoized() {
        let mut resolver = resolver(b"chr1\t100\t200\tgene1\t+", 5);

        let first = resolver
            .resolve(103, Strand::Positive, Kind::Donor)
            .clone();
        let second = resolver
            .resolve(103, Strand::Negative, Kind::Acceptor)
            .clone();
        assert_eq!(first, second);

        let first = resolver
            .resolve(150, Strand::Positive, Kind::Donor)
            .clone();
        let second = resolver
            .resolve(150, Strand::Negative, Kind::Acceptor)
            .clone();
        assert_eq!(first, second);
        assert_eq!(second.strand(), Strand::Positive);

        assert_eq!(
            resolver.tally(),
            Tally {
                annotated: 0,
                corrected: 1,
                ambiguous: 0,
                novel: 1,
            }
        );
        assert_eq!(resolver.resolved(), 2);
    }

    #[test]
    fn annotated_coordinates_resolve_to_themselves() {
        let mut resolver = resolver(b"chr1\t100\t200\tgene1\t+", 5);

        let site = resolver.resolve(200, Strand::Negative, Kind::Donor);
        assert_eq!(site.coordinate(), 200);
        assert_eq!(site.kind(), Kind::Acceptor);

        resolver.resolve(200, Strand::Negative, Kind::Donor);
        assert_eq!(resolver.tally().annotated, 1);
        assert_eq!(resolver.resolved(), 1);
    }

    #[test]
    fn zero_wiggle_only_matches_exactly() {
        let mut resolver = resolver(b"chr1\t100\t200\tgene1\t+", 0);

        assert_eq!(
            resolver.resolve(100, Strand::Positive, Kind::Donor).kind(),
            Kind::Donor
        );
        assert_eq!(
            resolver.resolve(101, Strand::Positive, Kind::Donor).kind(),
            Kind::Unresolved
        );
    }
}
