//! HTTP API for managing Kubernetes Deployments and their paired Services.
//!
//! Provides a small REST surface for creating, updating, deleting, and
//! inspecting Deployments. All cluster state management is delegated to the
//! Kubernetes API server; every handler performs direct pass-through calls
//! and maps the result into an HTTP JSON response.

pub mod config;
pub mod k8s;
pub mod resources;
pub mod routes;
pub mod startup;
pub mod telemetry;
