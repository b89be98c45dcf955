use sqlx::SqliteConnection;

/// A live database connection borrowed from [ExternalConnectivity]
pub trait ConnectionHandle {
    fn borrow_connection(&mut self) -> &mut SqliteConnection;
}

/// Provides access to the external systems driven adapters talk to. Business logic only ever
/// sees this trait, so adapters can be swapped for fakes in tests.
pub trait ExternalConnectivity {
    type DbHandle<'cxn_borrow>: ConnectionHandle + Send
    where
        Self: 'cxn_borrow;

    async fn database_cxn(&mut self) -> Result<Self::DbHandle<'_>, anyhow::Error>;
}

/// Connectivity whose database work is part of an open transaction
pub trait TransactionHandle {
    async fn commit(self) -> Result<(), anyhow::Error>;
}

/// Connectivity that can begin a transaction. Dropping the returned handle without calling
/// [TransactionHandle::commit] rolls the transaction back.
pub trait Transactable {
    type Handle: ExternalConnectivity + TransactionHandle + Send;

    async fn start_transaction(&self) -> Result<Self::Handle, anyhow::Error>;
}

pub trait TransactableExternalConnectivity: ExternalConnectivity + Transactable {}

impl<T> TransactableExternalConnectivity for T where T: ExternalConnectivity + Transactable {}
