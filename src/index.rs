//! An index of annotated splice sites.

use rust_lapper as lapper;

use crate::core::Number;
use crate::site::Site;
use crate::site::Table;

pub mod builder;

pub use builder::Builder;

/// The default distance within which an observed coordinate may be corrected
/// to an annotated splice site.
pub const DEFAULT_WIGGLE: Number = 15;

/// A tolerance window around an annotated splice site.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Window {
    /// The first position in the window.
    start: Number,

    /// The last position in the window.
    end: Number,

    /// The coordinate of the annotated site.
    coordinate: Number,
}

impl Window {
    /// Creates a window of `wiggle` positions on either side of `coordinate`.
    ///
    /// The window is clamped at the start of the contig.
    ///
    /// # Examples
    ///
    /// ```
    /// use sscorrect::index::Window;
    ///
    /// let window = Window::around(100, 15);
    /// assert_eq!(window.start(), 85);
    /// assert_eq!(window.end(), 115);
    /// assert!(window.contains(85));
    /// assert!(!window.contains(116));
    ///
    /// assert_eq!(Window::around(3, 15).start(), 0);
    /// ```
    pub fn around(coordinate: Number, wiggle: Number) -> Self {
        Self {
            start: coordinate.saturating_sub(wiggle),
            end: coordinate.saturating_add(wiggle),
            coordinate,
        }
    }

    /// Gets the first position in the window.
    pub fn start(&self) -> Number {
        self.start
    }

    /// Gets the last position in the window.
    pub fn end(&self) -> Number {
        self.end
    }

    /// Gets the coordinate of the annotated site.
    pub fn coordinate(&self) -> Number {
        self.coordinate
    }

    /// Whether `position` falls within the window.
    pub fn contains(&self, position: Number) -> bool {
        self.start <= position && position <= self.end
    }

    /// Gets the distance from `position` to the annotated site.
    pub fn distance(&self, position: Number) -> Number {
        self.coordinate.abs_diff(position)
    }
}

/// An index of annotated splice sites and their tolerance windows.
///
/// Generally, you will want to use a [`builder::Builder`] to construct one of
/// these.
#[derive(Debug)]
pub struct Index {
    /// The tolerance windows, valued by the coordinate of their site.
    ///
    /// Intervals are half-open, so each one stops one past the end of its
    /// [`Window`].
    windows: lapper::Lapper<Number, Number>,

    /// The annotated sites keyed by coordinate.
    sites: Table,

    /// The distance used to build the windows.
    wiggle: Number,
}

impl Index {
    /// Finds all windows that contain `position`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sscorrect::annotation;
    /// use sscorrect::core::Strand;
    /// use sscorrect::index;
    ///
    /// let mut builder = index::Builder::new(5);
    /// builder.push(&annotation::Record::new("chr1", 100, 200, "gene1", Strand::Positive));
    /// let index = builder.build();
    ///
    /// let windows = index.query(104);
    /// assert_eq!(windows.len(), 1);
    /// assert_eq!(windows[0].coordinate(), 100);
    ///
    /// assert!(index.query(150).is_empty());
    /// ```
    pub fn query(&self, position: Number) -> Vec<Window> {
        self.windows
            .find(position, position.saturating_add(1))
            .map(|iv| Window::around(iv.val, self.wiggle))
            .collect()
    }

    /// Gets the annotated site at `coordinate`, if there is one.
    pub fn site(&self, coordinate: Number) -> Option<&Site> {
        self.sites.get(&coordinate)
    }

    /// Gets the annotated sites.
    pub fn sites(&self) -> &Table {
        &self.sites
    }

    /// Gets the distance used to build the windows.
    pub fn wiggle(&self) -> Number {
        self.wiggle
    }

    /// Gets the number of annotated sites.
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    /// Whether the index holds no annotated sites.
    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index;
    use crate::Reader;

    #[test]
    fn window_boundaries() -> Result<(), Box<dyn std::error::Error>> {
        let data = b"chr1\t100\t200\tgene1\t+";
        let index = index::Builder::new(5).try_build_from(Reader::new(&data[..]))?;

        for position in [95, 100, 105, 195, 205] {
            assert_eq!(index.query(position).len(), 1, "{position}");
        }

        for position in [94, 106, 194, 206] {
            assert!(index.query(position).is_empty(), "{position}");
        }

        Ok(())
    }

    #[test]
    fn overlapping_windows() -> Result<(), Box<dyn std::error::Error>> {
        let data = b"chr1\t100\t110\tgene1\t+";
        let index = index::Builder::new(5).try_build_from(Reader::new(&data[..]))?;

        let mut coordinates = index
            .query(105)
            .iter()
            .map(Window::coordinate)
            .collect::<Vec<_>>();
        coordinates.sort_unstable();

        assert_eq!(coordinates, vec![100, 110]);

        Ok(())
    }

    #[test]
    fn zero_wiggle() -> Result<(), Box<dyn std::error::Error>> {
        let data = b"chr1\t100\t200\tgene1\t+";
        let index = index::Builder::new(0).try_build_from(Reader::new(&data[..]))?;

        assert_eq!(index.query(100).len(), 1);
        assert!(index.query(99).is_empty());
        assert!(index.query(101).is_empty());

        Ok(())
    }

    #[test]
    fn window_at_contig_start() -> Result<(), Box<dyn std::error::Error>> {
        let data = b"chr1\t3\t200\tgene1\t+";
        let index = index::Builder::new(15).try_build_from(Reader::new(&data[..]))?;

        let windows = index.query(0);
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].start(), 0);
        assert_eq!(windows[0].end(), 18);
        assert_eq!(windows[0].distance(0), 3);

        Ok(())
    }

    #[test]
    fn empty_index() {
        let index = index::Builder::new(15).build();

        assert!(index.is_empty());
        assert!(index.query(100).is_empty());
    }
}
