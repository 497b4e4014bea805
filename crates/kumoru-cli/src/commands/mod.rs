//! CLI command implementations.
//!
//! Each submodule handles one command group:
//! - [`tokens`] - Token pair generation (`login`, `tokens create`)
//! - [`accounts`] - Account creation, password reset, lookup
//! - [`applications`] - Application lifecycle
//! - [`deployments`] - Deployment history
//! - [`locations`] - Provider locations
//! - [`pools`] - Capacity pools
//! - [`secrets`] - Stored secrets

pub mod accounts;
pub mod applications;
pub mod deployments;
pub mod locations;
pub mod pools;
pub mod secrets;
pub mod tokens;

pub use accounts::AccountCommand;
pub use applications::ApplicationCommand;
pub use deployments::DeploymentCommand;
pub use locations::LocationCommand;
pub use pools::PoolCommand;
pub use secrets::SecretCommand;
pub use tokens::TokenCommand;
