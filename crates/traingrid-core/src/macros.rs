//! Symbolic macro tokens resolved by a backend at submission time.
//!
//! Role arguments may reference values that only exist once a backend has
//! accepted the application: the assigned app id and the local root of the
//! fetched container image. Rather than splicing sentinel strings into the
//! argument vector, arguments are modeled as typed tokens which the data
//! model never resolves — resolution happens exactly once, inside the
//! backend's `submit`, keeping role descriptions backend-agnostic.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// One element of a role's argument vector.
///
/// Tokens are equality-comparable before resolution, but only to
/// themselves — a `Literal("${app_id}")` is *not* the app id macro.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgToken {
    /// A plain string passed through untouched.
    Literal(String),
    /// The application id assigned by the backend at submission.
    AppId,
    /// A path joined under the fetched image's local root.
    ImgRootPath(String),
}

impl ArgToken {
    /// The app-id macro.
    pub fn app_id() -> Self {
        ArgToken::AppId
    }

    /// A path under the image root, e.g. `img_root("train.sh")`.
    pub fn img_root(path: impl Into<String>) -> Self {
        ArgToken::ImgRootPath(path.into())
    }

    /// Resolve this token to the concrete string handed to the process.
    pub fn resolve(&self, values: &MacroValues) -> String {
        match self {
            ArgToken::Literal(s) => s.clone(),
            ArgToken::AppId => values.app_id.clone(),
            ArgToken::ImgRootPath(path) => {
                values.img_root.join(path).to_string_lossy().into_owned()
            }
        }
    }
}

impl From<&str> for ArgToken {
    fn from(s: &str) -> Self {
        ArgToken::Literal(s.to_string())
    }
}

impl From<String> for ArgToken {
    fn from(s: String) -> Self {
        ArgToken::Literal(s)
    }
}

impl fmt::Display for ArgToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgToken::Literal(s) => f.write_str(s),
            ArgToken::AppId => f.write_str("${app_id}"),
            ArgToken::ImgRootPath(path) => write!(f, "${{img_root}}/{path}"),
        }
    }
}

/// Concrete macro values, known only at submission time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroValues {
    pub app_id: String,
    pub img_root: PathBuf,
}

impl MacroValues {
    pub fn new(app_id: impl Into<String>, img_root: impl Into<PathBuf>) -> Self {
        Self {
            app_id: app_id.into(),
            img_root: img_root.into(),
        }
    }

    /// Resolve a whole argument vector.
    pub fn resolve_args(&self, args: &[ArgToken]) -> Vec<String> {
        args.iter().map(|arg| arg.resolve(self)).collect()
    }

    /// Resolve an entrypoint: relative paths run from the image root,
    /// absolute paths run as-is.
    pub fn resolve_entrypoint(&self, entrypoint: &str) -> PathBuf {
        let path = Path::new(entrypoint);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.img_root.join(path)
        }
    }
}
