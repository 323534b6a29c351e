//! Application descriptions: containers, roles, and the application itself.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::macros::ArgToken;
use crate::resources::Resources;

/// Backend-assigned application identifier.
///
/// Opaque to callers; unique for the lifetime of the backend that minted it.
pub type AppId = String;

/// How the backend manages an application after submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// The caller observes a terminal state before the backend reclaims
    /// process resources.
    #[default]
    Headless,
    /// The backend reaps completed processes without caller intervention.
    Managed,
}

/// A container image binding with its resource demand and exposed ports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Container {
    pub image: String,
    pub resources: Option<Resources>,
    pub port_map: HashMap<String, u16>,
}

impl Container {
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            resources: None,
            port_map: HashMap::new(),
        }
    }

    /// Declare the compute this container requires.
    pub fn require(mut self, resources: Resources) -> Self {
        self.resources = Some(resources);
        self
    }

    /// Expose named ports. Accumulates across calls.
    pub fn ports<I, S>(mut self, ports: I) -> Self
    where
        I: IntoIterator<Item = (S, u16)>,
        S: Into<String>,
    {
        for (name, port) in ports {
            self.port_map.insert(name.into(), port);
        }
        self
    }
}

/// One executable role of an application: what to run, in which container,
/// and how many replicas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub name: String,
    pub entrypoint: String,
    pub args: Vec<ArgToken>,
    pub env: HashMap<String, String>,
    pub container: Option<Container>,
    pub num_replicas: u32,
}

impl Role {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entrypoint: String::new(),
            args: Vec::new(),
            env: HashMap::new(),
            container: None,
            num_replicas: 1,
        }
    }

    /// Set the entrypoint and argument vector, replacing any previous ones.
    pub fn runs<I, T>(mut self, entrypoint: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ArgToken>,
    {
        self.entrypoint = entrypoint.into();
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Add environment variables for every replica. Accumulates across calls.
    pub fn envs<I, K, V>(mut self, env: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in env {
            self.env.insert(key.into(), value.into());
        }
        self
    }

    /// Bind the container this role runs in.
    pub fn on(mut self, container: Container) -> Self {
        self.container = Some(container);
        self
    }

    /// Set the replica count.
    pub fn replicas(mut self, num_replicas: u32) -> Self {
        self.num_replicas = num_replicas;
        self
    }
}

/// An ordered collection of roles submitted and tracked as one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub name: String,
    pub roles: Vec<Role>,
    pub run_mode: RunMode,
    is_attached: bool,
}

impl Application {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            roles: Vec::new(),
            run_mode: RunMode::default(),
            is_attached: false,
        }
    }

    /// Append roles. Role order is significant only for display.
    pub fn of<I>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = Role>,
    {
        self.roles.extend(roles);
        self
    }

    /// Whether this object is a read-only handle to an already-running
    /// application, created by a session `attach`. Attached applications
    /// cannot be resubmitted.
    pub fn is_attached(&self) -> bool {
        self.is_attached
    }

    /// Mark this application as an attached handle. Called by sessions when
    /// reconstructing an application from backend state, never by `run`.
    pub fn mark_attached(mut self) -> Self {
        self.is_attached = true;
        self
    }
}
