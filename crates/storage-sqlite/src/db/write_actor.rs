//! Serializes every write through one connection on a dedicated thread.

use diesel::prelude::*;
use log::{debug, error};
use tokio::sync::{mpsc, oneshot};

use fidi_core::errors::{DatabaseError, Error, Result};

use super::DbPool;
use crate::errors::StorageError;

type Job = Box<dyn FnOnce(&mut SqliteConnection) + Send + 'static>;

/// Error carried out of a diesel transaction: either diesel's own or the
/// closure's.
enum TxError {
    Diesel(diesel::result::Error),
    App(Error),
}

impl From<diesel::result::Error> for TxError {
    fn from(err: diesel::result::Error) -> Self {
        TxError::Diesel(err)
    }
}

impl From<TxError> for Error {
    fn from(err: TxError) -> Self {
        match err {
            TxError::Diesel(e) => StorageError::from(e).into(),
            TxError::App(e) => e,
        }
    }
}

#[derive(Clone)]
pub struct WriteHandle {
    sender: mpsc::UnboundedSender<Job>,
}

impl WriteHandle {
    /// Runs `job` inside a transaction on the writer connection and returns
    /// its result. The transaction is rolled back when `job` fails.
    pub async fn exec<F, T>(&self, job: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel::<Result<T>>();
        let boxed: Job = Box::new(move |conn: &mut SqliteConnection| {
            let result = conn
                .transaction::<T, TxError, _>(|conn| job(conn).map_err(TxError::App))
                .map_err(Error::from);
            // The caller may have gone away; nothing to report to then.
            let _ = reply_tx.send(result);
        });

        self.sender.send(boxed).map_err(|_| {
            Error::Database(DatabaseError::Internal(
                "database writer is not running".to_string(),
            ))
        })?;

        reply_rx.await.map_err(|_| {
            Error::Database(DatabaseError::Internal(
                "database writer dropped the request".to_string(),
            ))
        })?
    }
}

/// Spawns the writer thread. It owns one pooled connection for its lifetime
/// and stops once every `WriteHandle` is dropped.
pub fn spawn_writer(pool: DbPool) -> WriteHandle {
    let (sender, mut receiver) = mpsc::unbounded_channel::<Job>();

    let spawned = std::thread::Builder::new()
        .name("fidi-db-writer".to_string())
        .spawn(move || {
            let mut conn = match pool.get() {
                Ok(conn) => conn,
                Err(err) => {
                    error!("[Storage] Writer could not acquire a connection: {}", err);
                    return;
                }
            };
            debug!("[Storage] Writer started");
            while let Some(job) = receiver.blocking_recv() {
                job(&mut *conn);
            }
            debug!("[Storage] Writer stopped");
        });
    if let Err(err) = spawned {
        error!("[Storage] Could not start writer thread: {}", err);
    }

    WriteHandle { sender }
}
