use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::error::LoadError;

/// Metadata of one recorded execution session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub id: String,
    /// Epoch milliseconds when the session started
    pub start: i64,
    /// Epoch milliseconds when the data was dumped
    pub dump: i64,
}

impl SessionInfo {
    pub fn new<S: Into<String>>(id: S, start: i64, dump: i64) -> Self {
        Self {
            id: id.into(),
            start,
            dump,
        }
    }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.start)
    }

    pub fn dump_time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.dump)
    }
}

/// Probe hits recorded for a single class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionData {
    pub id: u64,
    pub name: String,
    pub probes: Vec<bool>,
}

impl ExecutionData {
    pub fn new<S: Into<String>>(id: u64, name: S, probes: Vec<bool>) -> Self {
        Self {
            id,
            name: name.into(),
            probes,
        }
    }

    pub fn hit_count(&self) -> usize {
        self.probes.iter().filter(|&&p| p).count()
    }

    /// ORs the probes of `other` into `self`
    ///
    /// # Errors
    /// * If the entries describe different classes or probe layouts
    pub fn merge(&mut self, other: &Self) -> Result<(), LoadError> {
        if self.name != other.name {
            return Err(LoadError::ClassNameMismatch {
                id: self.id,
                existing: self.name.clone(),
                incoming: other.name.clone(),
            });
        }
        if self.probes.len() != other.probes.len() {
            return Err(LoadError::ProbeCountMismatch {
                id: self.id,
                name: self.name.clone(),
            });
        }
        for (mine, theirs) in self.probes.iter_mut().zip(&other.probes) {
            *mine |= *theirs;
        }
        Ok(())
    }
}

/// In-memory execution data of one or more sessions, keyed by class id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionStore {
    sessions: Vec<SessionInfo>,
    entries: BTreeMap<u64, ExecutionData>,
}

impl ExecutionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_session(&mut self, info: SessionInfo) {
        self.sessions.push(info);
    }

    /// Adds execution data, merging it with an existing entry of the same id
    ///
    /// # Errors
    /// * If an entry with the same id but another class name or probe count
    ///   is already present
    pub fn put(&mut self, data: ExecutionData) -> Result<(), LoadError> {
        match self.entries.get_mut(&data.id) {
            Some(existing) => existing.merge(&data),
            None => {
                self.entries.insert(data.id, data);
                Ok(())
            }
        }
    }

    /// Merges another store into this one
    ///
    /// # Errors
    /// * If any entry conflicts, see [`ExecutionStore::put`]
    pub fn merge(&mut self, other: Self) -> Result<(), LoadError> {
        self.sessions.extend(other.sessions);
        other.entries.into_values().try_for_each(|data| self.put(data))
    }

    pub fn sessions(&self) -> &[SessionInfo] {
        &self.sessions
    }

    /// Entries in ascending class id order
    pub fn entries(&self) -> impl Iterator<Item = &ExecutionData> {
        self.entries.values()
    }

    pub fn get(&self, id: u64) -> Option<&ExecutionData> {
        self.entries.get(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_merges_probes() {
        let mut store = ExecutionStore::new();
        store
            .put(ExecutionData::new(7, "com/example/Foo", vec![true, false, false]))
            .unwrap();
        store
            .put(ExecutionData::new(7, "com/example/Foo", vec![false, false, true]))
            .unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.get(7).unwrap().probes, vec![true, false, true]);
        assert_eq!(store.get(7).unwrap().hit_count(), 2);
    }

    #[test]
    fn test_put_rejects_other_class_name() {
        let mut store = ExecutionStore::new();
        store.put(ExecutionData::new(1, "a/A", vec![true])).unwrap();

        let err = store.put(ExecutionData::new(1, "a/B", vec![true])).unwrap_err();
        assert!(matches!(err, LoadError::ClassNameMismatch { id: 1, .. }));
    }

    #[test]
    fn test_put_rejects_other_probe_count() {
        let mut store = ExecutionStore::new();
        store.put(ExecutionData::new(1, "a/A", vec![true])).unwrap();

        let err = store
            .put(ExecutionData::new(1, "a/A", vec![true, false]))
            .unwrap_err();
        assert!(matches!(err, LoadError::ProbeCountMismatch { .. }));
    }

    #[test]
    fn test_merge_stores() {
        let mut first = ExecutionStore::new();
        first.add_session(SessionInfo::new("s1", 1, 2));
        first.put(ExecutionData::new(2, "a/B", vec![false, true])).unwrap();

        let mut second = ExecutionStore::new();
        second.add_session(SessionInfo::new("s2", 3, 4));
        second.put(ExecutionData::new(1, "a/A", vec![true])).unwrap();
        second.put(ExecutionData::new(2, "a/B", vec![true, false])).unwrap();

        first.merge(second).unwrap();

        let ids: Vec<_> = first.sessions().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["s1", "s2"]);
        let names: Vec<_> = first.entries().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a/A", "a/B"]);
        assert_eq!(first.get(2).unwrap().probes, vec![true, true]);
    }

    #[test]
    fn test_session_timestamps() {
        let info = SessionInfo::new("host-1234", 1_700_000_000_000, 1_700_000_060_000);
        let start = info.start_time().unwrap();
        let dump = info.dump_time().unwrap();
        assert_eq!((dump - start).num_seconds(), 60);
    }
}
