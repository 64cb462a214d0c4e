//! repobot-github: HTTP collaborators for the GitHub API.
//!
//! Two narrow clients, constructed explicitly with a token and base URL:
//! - [`VariableStore`]: repository Actions-variable get/set, the key/value
//!   store the job collection is persisted in.
//! - [`GithubGraphql`]: the single query/variables execution primitive the
//!   project-board synchronizer is built on.
//!
//! Every call is a single request with a bounded timeout; there is no
//! retry layer here (failures surface immediately as `ToolError::Remote`).

pub mod graphql;
pub mod variables;

pub use graphql::{GithubGraphql, GraphQl};
pub use variables::VariableStore;
