pub mod paths;
pub mod schema;

pub use {
    paths::{GlobalPaths, ProjectPaths},
    schema::{ClientCredentials, GasConfig},
};
