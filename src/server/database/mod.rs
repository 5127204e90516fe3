pub(crate) mod connection;
pub(crate) mod memory;
pub(crate) mod pool;
pub(crate) mod postgres;
pub(crate) mod store;
