use std::any::Any;

use apex_core::errors::{RepositoryError, Result};
use diesel::SqliteConnection;
use log::{debug, error};
use tokio::sync::{mpsc, oneshot};

use super::DbPool;
use crate::errors::StorageError;

// A write job runs against the writer's dedicated connection and reports a core result.
type Job<T> = Box<dyn FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static>;

type ErasedJob = Job<Box<dyn Any + Send + 'static>>;
type ErasedReply = oneshot::Sender<Result<Box<dyn Any + Send + 'static>>>;

/// Handle for sending jobs to the writer actor.
#[derive(Clone)]
pub struct WriteHandle {
    tx: mpsc::Sender<(ErasedJob, ErasedReply)>,
}

impl WriteHandle {
    /// Executes a database job on the writer actor's dedicated connection.
    ///
    /// The job runs inside an immediate transaction; an error from the job
    /// rolls the transaction back and is returned unchanged.
    pub async fn exec<F, T>(&self, job: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
        T: Send + 'static + Any,
    {
        let (ret_tx, ret_rx) = oneshot::channel();

        self.tx
            .send((
                Box::new(move |c| job(c).map(|v| Box::new(v) as Box<dyn Any + Send>)),
                ret_tx,
            ))
            .await
            .map_err(|_| RepositoryError::Unavailable("Writer actor has stopped".to_string()))?;

        let reply = ret_rx.await.map_err(|_| {
            RepositoryError::Unavailable("Writer actor dropped the job without replying".to_string())
        })?;

        reply.map(|boxed: Box<dyn Any + Send + 'static>| {
            *boxed
                .downcast::<T>()
                .unwrap_or_else(|_| panic!("Failed to downcast writer actor result."))
        })
    }
}

/// Spawns a background Tokio task that acts as the single writer to the database.
///
/// The actor owns one pooled connection for its whole lifetime and processes
/// jobs serially. It stops once every `WriteHandle` is dropped.
pub fn spawn_writer(pool: DbPool) -> WriteHandle {
    let (tx, mut rx) = mpsc::channel::<(ErasedJob, ErasedReply)>(1024);

    tokio::spawn(async move {
        let mut conn = match pool.get() {
            Ok(conn) => conn,
            Err(e) => {
                error!("Writer actor could not acquire a database connection: {}", e);
                let reason = e.to_string();
                while let Some((_, reply_tx)) = rx.recv().await {
                    let _ = reply_tx.send(Err(RepositoryError::Unavailable(reason.clone()).into()));
                }
                return;
            }
        };

        while let Some((job, reply_tx)) = rx.recv().await {
            let result: Result<Box<dyn Any + Send + 'static>> = conn
                .immediate_transaction::<_, StorageError, _>(|c| job(c).map_err(StorageError::from))
                .map_err(|e: StorageError| e.into());

            // The requester may have gone away
            let _ = reply_tx.send(result);
        }
        debug!("Writer actor stopped");
    });

    WriteHandle { tx }
}
