//! Optional on-disk leveling table.
//!
//! Mirrors the external `users (user_id PRIMARY KEY, xp, level, messages)`
//! table with one sled tree per server. Keys are big-endian user ids so the
//! tree iterates in id order; values are bincode rows. The [`Store`] stays
//! the source of truth; the ledger is rewritten after each award.
//!
//! [`Store`]: crate::store::Store

use serde::{Deserialize, Serialize};
use sled::IVec;
use std::path::Path;
use thiserror::Error;

use crate::store::{ServerId, UserId};

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    #[error("serialization error: {0}")]
    Bincode(#[from] bincode::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// One row of the leveling table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRow {
    pub user_id: UserId,
    pub xp: u64,
    pub level: u32,
    pub messages: u64,
}

pub struct Ledger {
    db: sled::Db,
}

impl Ledger {
    /// Open (or create) the ledger rooted at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, LedgerError> {
        let path_ref = path.as_ref();
        std::fs::create_dir_all(path_ref)?;
        let db = sled::open(path_ref)?;
        Ok(Self { db })
    }

    fn tree(&self, server: ServerId) -> Result<sled::Tree, LedgerError> {
        Ok(self.db.open_tree(format!("users:{}", server))?)
    }

    fn deserialize(bytes: IVec) -> Result<LedgerRow, LedgerError> {
        Ok(bincode::deserialize::<LedgerRow>(&bytes)?)
    }

    /// Insert or replace the row keyed by `row.user_id`.
    pub fn upsert(&self, server: ServerId, row: LedgerRow) -> Result<(), LedgerError> {
        let tree = self.tree(server)?;
        let bytes = bincode::serialize(&row)?;
        tree.insert(row.user_id.to_be_bytes(), bytes)?;
        tree.flush()?;
        Ok(())
    }

    pub fn get(&self, server: ServerId, user: UserId) -> Result<Option<LedgerRow>, LedgerError> {
        let tree = self.tree(server)?;
        tree.get(user.to_be_bytes())?.map(Self::deserialize).transpose()
    }

    /// Rows ordered by xp descending, then user id.
    pub fn top(&self, server: ServerId, limit: usize) -> Result<Vec<LedgerRow>, LedgerError> {
        let tree = self.tree(server)?;
        let mut rows = tree
            .iter()
            .values()
            .map(|value| value.map_err(LedgerError::from).and_then(Self::deserialize))
            .collect::<Result<Vec<_>, _>>()?;
        rows.sort_by(|a, b| b.xp.cmp(&a.xp).then(a.user_id.cmp(&b.user_id)));
        rows.truncate(limit);
        Ok(rows)
    }

    pub fn len(&self, server: ServerId) -> Result<usize, LedgerError> {
        Ok(self.tree(server)?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn row(user_id: UserId, xp: u64) -> LedgerRow {
        LedgerRow { user_id, xp, level: 0, messages: 1 }
    }

    #[test]
    fn upsert_replaces_by_user_id() {
        let dir = TempDir::new().unwrap();
        let ledger = Ledger::open(dir.path()).unwrap();
        ledger.upsert(1, row(42, 10)).unwrap();
        ledger.upsert(1, LedgerRow { level: 1, ..row(42, 120) }).unwrap();
        assert_eq!(ledger.len(1).unwrap(), 1);
        let got = ledger.get(1, 42).unwrap().unwrap();
        assert_eq!(got.xp, 120);
        assert_eq!(got.level, 1);
        assert!(ledger.get(2, 42).unwrap().is_none());
    }

    #[test]
    fn top_orders_by_xp() {
        let dir = TempDir::new().unwrap();
        let ledger = Ledger::open(dir.path()).unwrap();
        for (id, xp) in [(1, 50), (2, 300), (3, 300), (4, 10)] {
            ledger.upsert(7, row(id, xp)).unwrap();
        }
        let ids: Vec<UserId> = ledger.top(7, 3).unwrap().iter().map(|r| r.user_id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }
}
