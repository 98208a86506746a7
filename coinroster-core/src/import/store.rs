//! Student persistence seam used by the roster import

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::SinkError;

/// A student login as stored by the shop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentAccount {
    /// Student id, also the login name
    pub student_id: String,
    pub password: String,
    pub is_admin: bool,
    pub name: String,
    pub gender: String,
    pub college: String,
    /// Love-coin issued
    pub points: i64,
    pub remaining_points: i64,
}

/// A store of student accounts keyed by student id
pub trait StudentStore {
    /// Open a transaction; all writes of one import go through it
    fn transaction(&mut self) -> Result<Box<dyn StudentTransaction + '_>, SinkError>;
}

/// One import batch. Dropping it without [`StudentTransaction::commit`]
/// discards every write made through it.
pub trait StudentTransaction {
    fn find(&self, student_id: &str) -> Result<Option<StudentAccount>, SinkError>;

    fn insert(&mut self, account: &StudentAccount) -> Result<(), SinkError>;

    /// Overwrite name, college and both point columns of an existing account
    fn update(&mut self, account: &StudentAccount) -> Result<(), SinkError>;

    fn commit(self: Box<Self>) -> Result<(), SinkError>;
}

/// In-memory store, used by tests and dry runs
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    accounts: BTreeMap<String, StudentAccount>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, student_id: &str) -> Option<&StudentAccount> {
        self.accounts.get(student_id)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

impl StudentStore for MemoryStore {
    fn transaction(&mut self) -> Result<Box<dyn StudentTransaction + '_>, SinkError> {
        let staged = self.accounts.clone();
        Ok(Box::new(MemoryTransaction {
            store: self,
            staged,
        }))
    }
}

struct MemoryTransaction<'a> {
    store: &'a mut MemoryStore,
    staged: BTreeMap<String, StudentAccount>,
}

impl StudentTransaction for MemoryTransaction<'_> {
    fn find(&self, student_id: &str) -> Result<Option<StudentAccount>, SinkError> {
        Ok(self.staged.get(student_id).cloned())
    }

    fn insert(&mut self, account: &StudentAccount) -> Result<(), SinkError> {
        if self.staged.contains_key(&account.student_id) {
            return Err(SinkError::Rejected(format!(
                "student {} already exists",
                account.student_id
            )));
        }
        self.staged
            .insert(account.student_id.clone(), account.clone());
        Ok(())
    }

    fn update(&mut self, account: &StudentAccount) -> Result<(), SinkError> {
        let existing = self.staged.get_mut(&account.student_id).ok_or_else(|| {
            SinkError::Rejected(format!("student {} does not exist", account.student_id))
        })?;
        existing.name = account.name.clone();
        existing.college = account.college.clone();
        existing.points = account.points;
        existing.remaining_points = account.remaining_points;
        Ok(())
    }

    fn commit(self: Box<Self>) -> Result<(), SinkError> {
        let MemoryTransaction { store, staged } = *self;
        store.accounts = staged;
        Ok(())
    }
}
