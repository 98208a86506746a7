//! SQLite-backed student store

use rusqlite::{Connection, OptionalExtension, Transaction, params};
use std::path::Path;

use super::store::{StudentAccount, StudentStore, StudentTransaction};
use crate::error::SinkError;

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the shop database at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SinkError> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, SinkError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    /// Wrap an existing connection, creating the users table if needed
    pub fn from_connection(conn: Connection) -> Result<Self, SinkError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS users(
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL,
                is_admin INTEGER NOT NULL DEFAULT 0,
                name TEXT,
                gender TEXT,
                college TEXT,
                points INTEGER NOT NULL DEFAULT 0,
                remaining_points INTEGER NOT NULL DEFAULT 0
            )",
            [],
        )?;
        Ok(Self { conn })
    }

    /// Look up one account outside of an import
    pub fn get(&self, student_id: &str) -> Result<Option<StudentAccount>, SinkError> {
        find_account(&self.conn, student_id)
    }

    pub fn count(&self) -> Result<usize, SinkError> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(n as usize)
    }
}

impl StudentStore for SqliteStore {
    fn transaction(&mut self) -> Result<Box<dyn StudentTransaction + '_>, SinkError> {
        let tx = self.conn.transaction()?;
        Ok(Box::new(SqliteTransaction { tx }))
    }
}

struct SqliteTransaction<'conn> {
    tx: Transaction<'conn>,
}

impl StudentTransaction for SqliteTransaction<'_> {
    fn find(&self, student_id: &str) -> Result<Option<StudentAccount>, SinkError> {
        find_account(&self.tx, student_id)
    }

    fn insert(&mut self, account: &StudentAccount) -> Result<(), SinkError> {
        self.tx.execute(
            "INSERT INTO users(username, password, is_admin, name, gender, college, points, remaining_points)
             VALUES(?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                account.student_id,
                account.password,
                account.is_admin,
                account.name,
                account.gender,
                account.college,
                account.points,
                account.remaining_points,
            ],
        )?;
        Ok(())
    }

    fn update(&mut self, account: &StudentAccount) -> Result<(), SinkError> {
        let changed = self.tx.execute(
            "UPDATE users SET name = ?, college = ?, points = ?, remaining_points = ?
             WHERE username = ?",
            params![
                account.name,
                account.college,
                account.points,
                account.remaining_points,
                account.student_id,
            ],
        )?;
        if changed == 0 {
            return Err(SinkError::Rejected(format!(
                "student {} does not exist",
                account.student_id
            )));
        }
        Ok(())
    }

    fn commit(self: Box<Self>) -> Result<(), SinkError> {
        self.tx.commit()?;
        Ok(())
    }
}

fn find_account(conn: &Connection, student_id: &str) -> Result<Option<StudentAccount>, SinkError> {
    let account = conn
        .query_row(
            "SELECT username, password, is_admin, name, gender, college, points, remaining_points
             FROM users WHERE username = ?",
            [student_id],
            |row| {
                Ok(StudentAccount {
                    student_id: row.get(0)?,
                    password: row.get(1)?,
                    is_admin: row.get(2)?,
                    name: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                    gender: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
                    college: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
                    points: row.get(6)?,
                    remaining_points: row.get(7)?,
                })
            },
        )
        .optional()?;
    Ok(account)
}
