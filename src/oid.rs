//! Object Identifier (OID) and end-OID types.
//!
//! OIDs are stored as `SmallVec<[u32; 16]>` to avoid heap allocation for
//! common OIDs. Ordering compares arcs numerically, so `.1.9` sorts before
//! `.1.10`.

use crate::error::{Error, Result};
use smallvec::SmallVec;
use std::fmt;

/// Object Identifier.
///
/// Absolute OIDs display in the dotted form with a leading `.`
/// (`.1.3.6.1.2.1.1.1.0`), which is the form table descriptors and stored
/// walks use.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Oid {
    arcs: SmallVec<[u32; 16]>,
}

impl Oid {
    /// The zero-length OID, displayed as `.`.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from any sequence of arcs.
    ///
    /// ```
    /// use snmp_table::oid::Oid;
    ///
    /// let oid = Oid::new(vec![1, 3, 6, 1, 2, 1]);
    /// assert_eq!(oid.arcs(), &[1, 3, 6, 1, 2, 1]);
    /// ```
    pub fn new(arcs: impl IntoIterator<Item = u32>) -> Self {
        arcs.into_iter().collect()
    }

    /// Build from borrowed arcs; used by [`oid!`](crate::oid!).
    pub fn from_slice(arcs: &[u32]) -> Self {
        arcs.iter().copied().collect()
    }

    /// Parse the dotted text form.
    ///
    /// A leading `.` is optional and empty components are skipped, so
    /// `".1.3.6"`, `"1.3.6"` and `"1..3.6"` all parse to the same OID.
    ///
    /// ```
    /// use snmp_table::oid::Oid;
    ///
    /// let oid = Oid::parse(".1.3.6.1.2.1.2.2.1.1").unwrap();
    /// assert_eq!(oid.len(), 10);
    /// assert!(Oid::parse(".1.3.x").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        s.split('.')
            .filter(|part| !part.is_empty())
            .map(|part| part.parse::<u32>())
            .collect::<std::result::Result<_, _>>()
            .map(|arcs| Self { arcs })
            .map_err(|_| Error::InvalidOid(s.into()).boxed())
    }

    pub fn arcs(&self) -> &[u32] {
        &self.arcs
    }

    pub fn len(&self) -> usize {
        self.arcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }

    /// True when `prefix` names this OID or one of its ancestors.
    pub fn starts_with(&self, prefix: &Oid) -> bool {
        self.arcs.starts_with(&prefix.arcs)
    }

    /// Append all arcs of `suffix`.
    ///
    /// ```
    /// use snmp_table::oid::Oid;
    ///
    /// let base = Oid::parse(".1.3.6.1.2.1.2.2.1").unwrap();
    /// let column = Oid::parse("2").unwrap();
    /// assert_eq!(base.join(&column).to_string(), ".1.3.6.1.2.1.2.2.1.2");
    /// ```
    pub fn join(&self, suffix: &Oid) -> Oid {
        self.arcs.iter().chain(&suffix.arcs).copied().collect()
    }

    /// This OID with one more arc.
    pub fn child(&self, arc: u32) -> Oid {
        self.arcs.iter().copied().chain([arc]).collect()
    }

    /// The part of this OID that follows `prefix`.
    ///
    /// Strips positionally: the first `prefix.len()` arcs are dropped whether
    /// or not they match, mirroring how rows are correlated across columns.
    ///
    /// ```
    /// use snmp_table::oid::Oid;
    ///
    /// let fetch = Oid::parse(".1.3.6.1.2.1.2.2.1.1").unwrap();
    /// let row = Oid::parse(".1.3.6.1.2.1.2.2.1.1.2").unwrap();
    /// assert_eq!(row.end_oid(&fetch).to_string(), "2");
    /// ```
    pub fn end_oid(&self, prefix: &Oid) -> EndOid {
        let start = prefix.len().min(self.arcs.len());
        EndOid(Oid::from_slice(&self.arcs[start..]))
    }

    /// One byte per arc, the legacy `OID_BIN` encoding.
    ///
    /// Arcs above 255 do not fit and are truncated to their low byte.
    pub fn to_arc_bytes(&self) -> Vec<u8> {
        self.arcs
            .iter()
            .map(|&arc| {
                if arc > u8::MAX as u32 {
                    tracing::debug!(target: "snmp_table::fetch", { snmp.oid = %self, snmp.arc = arc }, "OID arc does not fit one byte, truncating");
                }
                (arc & 0xff) as u8
            })
            .collect()
    }

    fn write_arcs(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some((head, tail)) = self.arcs.split_first() else {
            return Ok(());
        };
        write!(f, "{head}")?;
        tail.iter().try_for_each(|arc| write!(f, ".{arc}"))
    }
}

impl FromIterator<u32> for Oid {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        Self {
            arcs: iter.into_iter().collect(),
        }
    }
}

impl fmt::Debug for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Oid({self})")
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ".")?;
        self.write_arcs(f)
    }
}

impl std::str::FromStr for Oid {
    type Err = Box<Error>;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<&[u32]> for Oid {
    fn from(arcs: &[u32]) -> Self {
        Self::from_slice(arcs)
    }
}

impl<const N: usize> From<[u32; N]> for Oid {
    fn from(arcs: [u32; N]) -> Self {
        Self::new(arcs)
    }
}

impl PartialOrd for Oid {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Oid {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.arcs.cmp(&other.arcs)
    }
}

/// Row identifier relative to a column's fetch OID.
///
/// The same logical table row has the same end-OID in every column even
/// though the absolute OIDs differ. Displays without a leading `.`
/// (`"2"`, `"1.3"`), which is also the `OID_END` index value.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EndOid(Oid);

impl EndOid {
    pub fn arcs(&self) -> &[u32] {
        self.0.arcs()
    }

    /// `OID_BIN` encoding of the end-OID alone.
    pub fn to_arc_bytes(&self) -> Vec<u8> {
        self.0.to_arc_bytes()
    }
}

impl fmt::Debug for EndOid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EndOid({self})")
    }
}

impl fmt::Display for EndOid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.write_arcs(f)
    }
}

/// Builds an [`Oid`] from literal arcs.
///
/// ```
/// use snmp_table::oid;
///
/// let sys_descr = oid!(1, 3, 6, 1, 2, 1, 1, 1, 0);
/// assert_eq!(sys_descr.to_string(), ".1.3.6.1.2.1.1.1.0");
/// ```
#[macro_export]
macro_rules! oid {
    ($($arc:expr),* $(,)?) => {
        $crate::oid::Oid::from_slice(&[$($arc),*])
    };
}
