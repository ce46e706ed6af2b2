//! Splice sites.

use std::collections::BTreeSet;
use std::collections::HashMap;

use crate::core::Number;
use crate::core::Strand;

/// A table of splice sites keyed by coordinate.
pub type Table = HashMap<Number, Site>;

////////////////////////////////////////////////////////////////////////////////////////
// Kind
////////////////////////////////////////////////////////////////////////////////////////

/// The kind of a splice site relative to the strand of its feature.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Kind {
    /// The 5′ boundary of an intron.
    Donor,

    /// The 3′ boundary of an intron.
    Acceptor,

    /// A site that could not be tied to a unique annotated site.
    Unresolved,
}

impl Kind {
    /// Gets the kinds expected at the (left, right) ends of an intron on the
    /// given strand.
    ///
    /// # Examples
    ///
    /// ```
    /// use sscorrect::core::Strand;
    /// use sscorrect::site::Kind;
    ///
    /// assert_eq!(Kind::expected(Strand::Positive), (Kind::Donor, Kind::Acceptor));
    /// assert_eq!(Kind::expected(Strand::Negative), (Kind::Acceptor, Kind::Donor));
    /// ```
    pub fn expected(strand: Strand) -> (Kind, Kind) {
        match strand {
            Strand::Positive => (Kind::Donor, Kind::Acceptor),
            Strand::Negative => (Kind::Acceptor, Kind::Donor),
        }
    }

    /// Whether two kinds can bound the same intron.
    ///
    /// Only a donor paired with an acceptor (in either order) is compatible.
    /// Anything involving [`Kind::Unresolved`] is not.
    ///
    /// # Examples
    ///
    /// ```
    /// use sscorrect::site::Kind;
    ///
    /// assert!(Kind::Donor.compatible(Kind::Acceptor));
    /// assert!(Kind::Acceptor.compatible(Kind::Donor));
    /// assert!(!Kind::Donor.compatible(Kind::Donor));
    /// assert!(!Kind::Unresolved.compatible(Kind::Acceptor));
    /// ```
    pub fn compatible(self, other: Kind) -> bool {
        matches!(
            (self, other),
            (Kind::Donor, Kind::Acceptor) | (Kind::Acceptor, Kind::Donor)
        )
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Kind::Donor => write!(f, "donor"),
            Kind::Acceptor => write!(f, "acceptor"),
            Kind::Unresolved => write!(f, "unresolved"),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////
// Site
////////////////////////////////////////////////////////////////////////////////////////

/// A splice site.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Site {
    /// The position of the site.
    coordinate: Number,

    /// The strand of the feature the site was first seen on.
    strand: Strand,

    /// The kind of site.
    kind: Kind,

    /// The annotation sources that report this exact position.
    support: BTreeSet<String>,

    /// The coordinate of the canonical site.
    ///
    /// This is the key of the canonical [`Site`] within its [`Table`]. It is
    /// equal to `coordinate` when the site is its own canonical site.
    canonical: Number,
}

impl Site {
    /// Creates a new annotated site supported by `source`.
    ///
    /// An annotated site is its own canonical site.
    ///
    /// # Examples
    ///
    /// ```
    /// use sscorrect::core::Strand;
    /// use sscorrect::site::Kind;
    /// use sscorrect::site::Site;
    ///
    /// let site = Site::annotated(100, Strand::Positive, Kind::Donor, "gencode");
    ///
    /// assert_eq!(site.coordinate(), 100);
    /// assert_eq!(site.canonical(), 100);
    /// assert!(site.is_canonical());
    /// assert_eq!(site.support().len(), 1);
    /// ```
    pub fn annotated(
        coordinate: Number,
        strand: Strand,
        kind: Kind,
        source: impl Into<String>,
    ) -> Self {
        let mut support = BTreeSet::new();
        support.insert(source.into());

        Self {
            coordinate,
            strand,
            kind,
            support,
            canonical: coordinate,
        }
    }

    /// Creates an observed site that resolved to the site at `canonical`.
    pub fn corrected(coordinate: Number, strand: Strand, kind: Kind, canonical: Number) -> Self {
        Self {
            coordinate,
            strand,
            kind,
            support: BTreeSet::new(),
            canonical,
        }
    }

    /// Creates an observed site that could not be resolved.
    ///
    /// The site is its own canonical site and has [`Kind::Unresolved`].
    pub fn unresolved(coordinate: Number, strand: Strand) -> Self {
        Self {
            coordinate,
            strand,
            kind: Kind::Unresolved,
            support: BTreeSet::new(),
            canonical: coordinate,
        }
    }

    /// Gets the coordinate.
    pub fn coordinate(&self) -> Number {
        self.coordinate
    }

    /// Gets the strand.
    pub fn strand(&self) -> Strand {
        self.strand
    }

    /// Gets the kind.
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Gets the supporting annotation sources.
    pub fn support(&self) -> &BTreeSet<String> {
        &self.support
    }

    /// Adds a supporting annotation source.
    pub fn add_support(&mut self, source: impl Into<String>) {
        self.support.insert(source.into());
    }

    /// Gets the coordinate of the canonical site.
    pub fn canonical(&self) -> Number {
        self.canonical
    }

    /// Whether this site is its own canonical site.
    pub fn is_canonical(&self) -> bool {
        self.canonical == self.coordinate
    }
}
