pub mod cassandra;
pub mod memory;
pub mod resilient;

pub use cassandra::CassandraPrincipalRepository;
pub use memory::InMemoryPrincipalRepository;
pub use resilient::ResilientRepository;
pub use resilient::StorePolicy;
