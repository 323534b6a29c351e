//! Elastic roles — rewrite a user command into a rendezvous-aware launch.
//!
//! An [`ElasticRole`] does not change what a role *is*, only how it is
//! constructed: the user's entrypoint and arguments are rewritten into an
//! invocation of the elastic distributed launcher, which coordinates worker
//! discovery through a rendezvous backend. The produced [`Role`] is ordinary
//! in every other way and can be bound to a container and replicated.

use crate::app::Role;
use crate::macros::ArgToken;

/// Interpreter every elastic role is launched with.
pub const ELASTIC_INTERPRETER: &str = "python";

/// Module invoked (via `-m`) to perform the rendezvous-aware launch.
pub const ELASTIC_LAUNCHER_MODULE: &str = "traingrid.distributed.launch";

/// Builder for a role launched through the elastic distributed launcher.
///
/// The argument vector it produces is a compatibility surface — flag names
/// and ordering are fixed:
///
/// ```text
/// -m <launcher> [--nnodes N] [--max_restarts R] [--no_python]
///   --rdzv_backend B --rdzv_id ID --role NAME <entrypoint> <user args...>
/// ```
#[derive(Debug, Clone)]
pub struct ElasticRole {
    name: String,
    nnodes: Option<String>,
    max_restarts: Option<u32>,
    no_python: bool,
    rdzv_backend: String,
    rdzv_id: ArgToken,
}

impl ElasticRole {
    /// Create an elastic role builder with default rendezvous parameters:
    /// etcd backend, rdzv id deferred to the submission-time app id, and
    /// `--no_python` enabled (the entrypoint is a binary, not a script).
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nnodes: None,
            max_restarts: None,
            no_python: true,
            rdzv_backend: "etcd".to_string(),
            rdzv_id: ArgToken::AppId,
        }
    }

    /// Set the node range, e.g. `"2:4"` for two to four nodes. Emitted only
    /// when explicitly set.
    pub fn nnodes(mut self, nnodes: impl Into<String>) -> Self {
        self.nnodes = Some(nnodes.into());
        self
    }

    /// Maximum worker restarts before the launch is declared failed.
    /// Emitted only when explicitly set.
    pub fn max_restarts(mut self, max_restarts: u32) -> Self {
        self.max_restarts = Some(max_restarts);
        self
    }

    /// Whether the entrypoint is executed directly (`true`) or handed to
    /// the interpreter as a script (`false`).
    pub fn no_python(mut self, no_python: bool) -> Self {
        self.no_python = no_python;
        self
    }

    /// Override the rendezvous backend.
    pub fn rdzv_backend(mut self, backend: impl Into<String>) -> Self {
        self.rdzv_backend = backend.into();
        self
    }

    /// Override the rendezvous id. Defaults to the app id assigned at
    /// submission time.
    pub fn rdzv_id(mut self, rdzv_id: impl Into<ArgToken>) -> Self {
        self.rdzv_id = rdzv_id.into();
        self
    }

    /// Consume the builder, producing the launcher invocation.
    ///
    /// The user entrypoint moves into the argument vector: relative paths
    /// are placed under the image root (already-prefixed entrypoints are
    /// left alone), absolute paths pass through. The produced role's own
    /// entrypoint is always the interpreter.
    pub fn runs<I, T>(self, entrypoint: impl Into<ArgToken>, user_args: I) -> Role
    where
        I: IntoIterator<Item = T>,
        T: Into<ArgToken>,
    {
        let mut args: Vec<ArgToken> =
            vec!["-m".into(), ELASTIC_LAUNCHER_MODULE.into()];

        if let Some(nnodes) = &self.nnodes {
            args.push("--nnodes".into());
            args.push(nnodes.as_str().into());
        }
        if let Some(max_restarts) = self.max_restarts {
            args.push("--max_restarts".into());
            args.push(max_restarts.to_string().into());
        }
        if self.no_python {
            args.push("--no_python".into());
        }
        args.push("--rdzv_backend".into());
        args.push(self.rdzv_backend.as_str().into());
        args.push("--rdzv_id".into());
        args.push(self.rdzv_id.clone());
        args.push("--role".into());
        args.push(self.name.as_str().into());

        args.push(rebase_entrypoint(entrypoint.into()));
        args.extend(user_args.into_iter().map(Into::into));

        Role::new(self.name).runs(ELASTIC_INTERPRETER, args)
    }
}

/// Place a relative entrypoint under the image root; leave absolute paths
/// and already-rebased entrypoints unchanged.
fn rebase_entrypoint(entrypoint: ArgToken) -> ArgToken {
    match entrypoint {
        ArgToken::Literal(path) if !path.starts_with('/') => {
            ArgToken::ImgRootPath(path)
        }
        other => other,
    }
}
