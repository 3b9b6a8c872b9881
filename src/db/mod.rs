//! Database access layer.
//!
//! Repository traits live in [`repository`], concrete backends in
//! [`repositories`]. The [`factory`] module selects a backend at runtime
//! from environment variables or a `repository.toml` file; whichever is
//! chosen, the rest of the crate only ever sees `Arc<dyn FullRepository>`.

pub mod factory;
pub mod repo_config;
pub mod repositories;
pub mod repository;

pub use factory::{RepositoryFactory, RepositoryType};
pub use repo_config::RepositoryConfig;
pub use repositories::LocalRepository;
#[cfg(feature = "postgres-repo")]
pub use repositories::{PostgresConfig, PostgresRepository};
pub use repository::{
    ErrorContext, FlightRepository, FullRepository, ReferenceRepository, RepositoryError,
    RepositoryResult,
};
