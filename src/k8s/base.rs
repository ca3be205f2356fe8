use async_trait::async_trait;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Service;
use thiserror::Error;

/// Errors emitted by the Kubernetes integration.
///
/// Cluster-reported failures are surfaced verbatim; nothing is retried here.
#[derive(Debug, Error)]
pub enum K8sError {
    /// An error returned by the [`kube`] client when talking to the API
    /// server.
    #[error("An error occurred with kube when dealing with K8s: {0}")]
    Kube(#[from] kube::Error),
}

impl K8sError {
    /// Returns whether the API server reported the resource as missing.
    ///
    /// Used by handlers to map missing deployments to 404 and to treat
    /// deletes of already-absent services as successful.
    pub fn is_not_found(&self) -> bool {
        matches!(self, K8sError::Kube(kube::Error::Api(e)) if e.code == 404)
    }
}

/// Client interface describing the Kubernetes operations used by the API.
///
/// Each method performs exactly one call to the cluster control plane and
/// returns the resulting resource or the cluster-reported error. No method
/// waits for the cluster to converge (e.g. for pods to become ready).
#[async_trait]
pub trait K8sClient: Send + Sync {
    /// Creates a [`Deployment`] in the given namespace.
    async fn create_deployment(
        &self,
        namespace: &str,
        deployment: &Deployment,
    ) -> Result<Deployment, K8sError>;

    /// Replaces an existing [`Deployment`].
    ///
    /// The supplied object must carry the `resourceVersion` of the live
    /// resource, otherwise the API server rejects the write with a conflict.
    async fn update_deployment(
        &self,
        namespace: &str,
        name: &str,
        deployment: &Deployment,
    ) -> Result<Deployment, K8sError>;

    /// Deletes a [`Deployment`] by name.
    async fn delete_deployment(&self, namespace: &str, name: &str) -> Result<(), K8sError>;

    /// Retrieves a [`Deployment`] by name.
    async fn get_deployment(&self, namespace: &str, name: &str) -> Result<Deployment, K8sError>;

    /// Lists all [`Deployment`]s in the given namespace.
    async fn list_deployments(&self, namespace: &str) -> Result<Vec<Deployment>, K8sError>;

    /// Creates a [`Service`] in the given namespace.
    async fn create_service(
        &self,
        namespace: &str,
        service: &Service,
    ) -> Result<Service, K8sError>;

    /// Deletes a [`Service`] by name.
    async fn delete_service(&self, namespace: &str, name: &str) -> Result<(), K8sError>;
}
