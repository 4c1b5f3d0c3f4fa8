mod convert;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod repository;
pub mod types;

pub use error::RepoError;
pub use memory::InMemoryRepository;
pub use postgres::PostgresJobRepository;
pub use repository::JobRepository;
pub use types::NewJob;
