//! Logical table descriptors.
//!
//! A [`TableDescriptor`] names a base OID, optional suboid infixes and the
//! target columns. Descriptors are plain data (and deserialize from JSON);
//! they are validated and normalized into one canonical shape when a fetch
//! starts.

use serde::{Deserialize, Serialize};

use crate::column::{Column, is_dotted_numeric};
use crate::error::{ConfigErrorKind, Error, Result};
use crate::oid::Oid;

/// Description of one logical SNMP table.
///
/// ```
/// use snmp_table::{Column, IndexKind, TableDescriptor};
///
/// // ifIndex, ifDescr, ifType plus the row index
/// let if_table = TableDescriptor::new(
///     ".1.3.6.1.2.1.2.2.1",
///     [Column::oid("1"), Column::oid("2"), Column::oid("3"), Column::index(IndexKind::End)],
/// );
/// assert_eq!(if_table.columns.len(), 4);
///
/// let json = r#"{"base": ".1.3.6.1.4.1.9.9.13.1", "suboids": ["3", "4"], "columns": ["1.2", "OID_END"]}"#;
/// let sensors: TableDescriptor = serde_json::from_str(json).unwrap();
/// assert_eq!(sensors.suboids, vec!["3", "4"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescriptor {
    /// Base OID, must start with `.`.
    pub base: String,
    /// Infixes between base and columns; empty means a single pass without one.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suboids: Vec<String>,
    /// Target columns in output order.
    pub columns: Vec<Column>,
}

impl TableDescriptor {
    /// A table without suboids.
    pub fn new(base: impl Into<String>, columns: impl IntoIterator<Item = Column>) -> Self {
        Self {
            base: base.into(),
            suboids: Vec::new(),
            columns: columns.into_iter().collect(),
        }
    }

    /// A table merged from parallel subtrees below `base`.
    pub fn with_suboids(
        base: impl Into<String>,
        suboids: impl IntoIterator<Item = impl Into<String>>,
        columns: impl IntoIterator<Item = Column>,
    ) -> Self {
        Self {
            base: base.into(),
            suboids: suboids.into_iter().map(Into::into).collect(),
            columns: columns.into_iter().collect(),
        }
    }

    /// Validate and normalize into the canonical form used by the engine.
    pub(crate) fn resolve(&self) -> Result<ResolvedTable> {
        if !self.base.starts_with('.') || self.base.len() < 2 || !is_dotted_numeric(&self.base) {
            return Err(Error::config(ConfigErrorKind::InvalidBaseOid(
                self.base.as_str().into(),
            )));
        }
        let base = Oid::parse(&self.base)
            .map_err(|_| Error::config(ConfigErrorKind::InvalidBaseOid(self.base.as_str().into())))?;

        let index_columns = self
            .columns
            .iter()
            .filter(|c| c.index_kind().is_some())
            .count();
        if index_columns > 1 {
            return Err(Error::config(ConfigErrorKind::MultipleIndexColumns {
                count: index_columns,
            }));
        }

        let column_suffixes = self
            .columns
            .iter()
            .map(Column::suffix_oid)
            .collect::<Result<Vec<_>>>()?;

        let mut passes = Vec::with_capacity(self.suboids.len().max(1));
        for text in &self.suboids {
            passes.push(Suboid::parse(text)?);
        }
        if passes.is_empty() {
            passes.push(None);
        }

        Ok(ResolvedTable {
            base,
            passes,
            columns: self.columns.clone(),
            column_suffixes,
        })
    }
}

/// A validated suboid infix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Suboid {
    pub(crate) oid: Oid,
    /// `"<suboid>."`, prepended to the first column's raw values.
    pub(crate) prefix: Vec<u8>,
}

impl Suboid {
    /// Empty text means "no suboid" for this pass.
    fn parse(text: &str) -> Result<Option<Self>> {
        if !is_dotted_numeric(text) {
            return Err(Error::config(ConfigErrorKind::InvalidSuboid(text.into())));
        }
        let oid = Oid::parse(text)
            .map_err(|_| Error::config(ConfigErrorKind::InvalidSuboid(text.into())))?;
        if oid.is_empty() {
            return Ok(None);
        }
        let prefix = format!("{}.", oid.end_oid(&Oid::empty())).into_bytes();
        Ok(Some(Self { oid, prefix }))
    }
}

/// Canonical table shape: base, one entry per pass, columns.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedTable {
    pub(crate) base: Oid,
    pub(crate) passes: Vec<Option<Suboid>>,
    pub(crate) columns: Vec<Column>,
    column_suffixes: Vec<Oid>,
}

impl ResolvedTable {
    /// Fetch OID of every column for one pass: `base[.suboid][.column]`.
    pub(crate) fn fetch_oids(&self, suboid: Option<&Suboid>) -> Vec<Oid> {
        let prefix = match suboid {
            Some(s) => self.base.join(&s.oid),
            None => self.base.clone(),
        };
        self.column_suffixes
            .iter()
            .map(|suffix| prefix.join(suffix))
            .collect()
    }
}
