mod pending_pool;

pub use pending_pool::{PendingPool, PendingPoolError};
