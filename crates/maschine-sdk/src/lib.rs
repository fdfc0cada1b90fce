//! Maschine plugin SDK
//!
//! Runtime core for plugin authors: a [`ResourceRegistry`] mapping resource
//! identifiers (MRNs) to handlers, a dispatcher that turns every outcome into
//! an [`ExecuteResponse`], and [`Parameters`], the typed accessor handlers
//! use to read their dynamically-typed arguments.
//!
//! The manifest model lives in `maschine-manifest` and is re-exported here as
//! [`manifest`].

pub mod context;
pub mod errors;
pub mod params;
pub mod plugin;
pub mod registry;
pub mod request;

pub use maschine_manifest as manifest;

pub use context::AppContext;
pub use errors::{ParamError, RegistryError};
pub use params::{FromParamValue, ParamValue, Parameters};
pub use plugin::{
    handshake, platform, BasePlugin, HealthStatus, Metadata, Resource, VersionInfo,
    HANDSHAKE_PROTOCOL_VERSION, MAGIC_COOKIE_KEY, MAGIC_COOKIE_VALUE,
};
pub use registry::{Handler, ResourceFunction, ResourceRegistry, OPERATION_KEY};
pub use request::{ExecuteRequest, ExecuteResponse, RequestBuilder, TypedRequest};
