//! Mock backend for testing.
//!
//! Provides a programmable backend that can simulate device responses and
//! failures without a network or stored walk.

use super::Backend;
use crate::config::HostConfig;
use crate::error::{Error, Result};
use crate::oid::Oid;
use crate::row::Row;
use bytes::Bytes;
use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A recorded backend call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordedCall {
    /// A `get` for this OID and context.
    Get { oid: Oid, context: Option<String> },
    /// A `walk` of this OID in this context.
    Walk {
        oid: Oid,
        section: Option<String>,
        context: Option<String>,
    },
}

/// A queued failure.
enum Failure {
    Backend(String),
    Timeout(Duration),
}

/// Mock backend state shared between clones.
struct MockBackendInner {
    /// Walk responses by (fetch OID, context)
    walks: HashMap<(Oid, Option<String>), Vec<Row>>,
    /// Get responses by (OID, context)
    values: HashMap<(Oid, Option<String>), Bytes>,
    /// Errors returned by the next calls, in order
    failures: VecDeque<Failure>,
    /// Recorded calls
    calls: Vec<RecordedCall>,
}

/// Mock backend for testing the table engine.
///
/// Walks of unknown OIDs return no rows; gets of unknown OIDs return `None`.
///
/// # Example
///
/// Requires the `testing` feature.
///
/// ```rust,ignore
/// use snmp_table::backend::MockBackend;
/// use snmp_table::{HostConfig, oid};
///
/// let mock = MockBackend::new(HostConfig::new("switch01"));
/// mock.add_walk(
///     oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 2),
///     [(oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 2, 1), "lo")],
/// );
/// mock.queue_failure("timeout");
/// ```
#[derive(Clone)]
pub struct MockBackend {
    config: HostConfig,
    inner: Arc<Mutex<MockBackendInner>>,
}

impl MockBackend {
    /// Create a new mock backend.
    pub fn new(config: HostConfig) -> Self {
        Self {
            config,
            inner: Arc::new(Mutex::new(MockBackendInner {
                walks: HashMap::new(),
                values: HashMap::new(),
                failures: VecDeque::new(),
                calls: Vec::new(),
            })),
        }
    }

    /// Set the rows a walk of `oid` returns in the default context.
    pub fn add_walk<V: Into<Bytes>>(&self, oid: Oid, rows: impl IntoIterator<Item = (Oid, V)>) {
        self.add_context_walk(oid, None, rows);
    }

    /// Set the rows a walk of `oid` returns in `context`.
    pub fn add_context_walk<V: Into<Bytes>>(
        &self,
        oid: Oid,
        context: Option<&str>,
        rows: impl IntoIterator<Item = (Oid, V)>,
    ) {
        let rows = rows.into_iter().map(|(o, v)| Row::new(o, v)).collect();
        let mut inner = self.inner.lock().unwrap();
        inner.walks.insert((oid, context.map(str::to_string)), rows);
    }

    /// Set the value a get of `oid` returns in `context`.
    pub fn add_value(&self, oid: Oid, context: Option<&str>, value: impl Into<Bytes>) {
        let mut inner = self.inner.lock().unwrap();
        inner
            .values
            .insert((oid, context.map(str::to_string)), value.into());
    }

    /// Make the next call fail with a backend error.
    pub fn queue_failure(&self, msg: impl Into<String>) {
        let mut inner = self.inner.lock().unwrap();
        inner.failures.push_back(Failure::Backend(msg.into()));
    }

    /// Make the next call time out after `elapsed`.
    pub fn queue_timeout(&self, elapsed: Duration) {
        let mut inner = self.inner.lock().unwrap();
        inner.failures.push_back(Failure::Timeout(elapsed));
    }

    /// Get all recorded calls.
    pub fn calls(&self) -> Vec<RecordedCall> {
        let inner = self.inner.lock().unwrap();
        inner.calls.clone()
    }

    /// Number of walks issued so far.
    pub fn walk_count(&self) -> usize {
        let inner = self.inner.lock().unwrap();
        inner
            .calls
            .iter()
            .filter(|c| matches!(c, RecordedCall::Walk { .. }))
            .count()
    }

    fn failure(&self, inner: &mut MockBackendInner) -> Option<Box<Error>> {
        let target = self.config.hostname.as_str();
        Some(match inner.failures.pop_front()? {
            Failure::Backend(msg) => Error::backend(target, std::io::Error::other(msg)),
            Failure::Timeout(elapsed) => Error::Timeout {
                target: target.into(),
                elapsed,
            }
            .boxed(),
        })
    }
}

impl Backend for MockBackend {
    fn config(&self) -> &HostConfig {
        &self.config
    }

    fn get(
        &self,
        oid: &Oid,
        context: Option<&str>,
    ) -> impl Future<Output = Result<Option<Bytes>>> + Send {
        let context = context.map(str::to_string);
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(RecordedCall::Get {
            oid: oid.clone(),
            context: context.clone(),
        });
        let result = match self.failure(&mut inner) {
            Some(err) => Err(err),
            None => Ok(inner.values.get(&(oid.clone(), context)).cloned()),
        };
        async move { result }
    }

    fn walk(
        &self,
        oid: &Oid,
        section: Option<&str>,
        _table_base: &Oid,
        context: Option<&str>,
    ) -> impl Future<Output = Result<Vec<Row>>> + Send {
        let context = context.map(str::to_string);
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(RecordedCall::Walk {
            oid: oid.clone(),
            section: section.map(str::to_string),
            context: context.clone(),
        });
        let result = match self.failure(&mut inner) {
            Some(err) => Err(err),
            None => Ok(inner
                .walks
                .get(&(oid.clone(), context))
                .cloned()
                .unwrap_or_default()),
        };
        async move { result }
    }
}
