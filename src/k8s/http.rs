use async_trait::async_trait;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Service;
use kube::Client;
use kube::api::{Api, DeleteParams, ListParams, PostParams};
use tracing::info;

use crate::k8s::base::{K8sClient, K8sError};

/// Kubernetes client backed by the [`kube`] crate.
///
/// A single instance is created at startup and shared across all in-flight
/// requests; the underlying [`Client`] is cheap to clone and safe for
/// concurrent use.
pub struct HttpK8sClient {
    client: Client,
}

impl HttpK8sClient {
    /// Creates a new client from the ambient cluster configuration.
    ///
    /// Uses the in-cluster config when running inside Kubernetes, otherwise
    /// falls back to the local `~/.kube/config`.
    pub async fn new() -> Result<HttpK8sClient, K8sError> {
        let client = Client::try_default().await?;

        Ok(HttpK8sClient { client })
    }

    fn deployments(&self, namespace: &str) -> Api<Deployment> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn services(&self, namespace: &str) -> Api<Service> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait]
impl K8sClient for HttpK8sClient {
    async fn create_deployment(
        &self,
        namespace: &str,
        deployment: &Deployment,
    ) -> Result<Deployment, K8sError> {
        info!("creating deployment");

        let created = self
            .deployments(namespace)
            .create(&PostParams::default(), deployment)
            .await?;

        info!("deployment created");

        Ok(created)
    }

    async fn update_deployment(
        &self,
        namespace: &str,
        name: &str,
        deployment: &Deployment,
    ) -> Result<Deployment, K8sError> {
        info!("updating deployment");

        let updated = self
            .deployments(namespace)
            .replace(name, &PostParams::default(), deployment)
            .await?;

        info!("deployment updated");

        Ok(updated)
    }

    async fn delete_deployment(&self, namespace: &str, name: &str) -> Result<(), K8sError> {
        info!("deleting deployment");

        self.deployments(namespace)
            .delete(name, &DeleteParams::default())
            .await?;

        info!("deployment deleted");

        Ok(())
    }

    async fn get_deployment(&self, namespace: &str, name: &str) -> Result<Deployment, K8sError> {
        let deployment = self.deployments(namespace).get(name).await?;

        Ok(deployment)
    }

    async fn list_deployments(&self, namespace: &str) -> Result<Vec<Deployment>, K8sError> {
        let deployments = self
            .deployments(namespace)
            .list(&ListParams::default())
            .await?;

        Ok(deployments.items)
    }

    async fn create_service(
        &self,
        namespace: &str,
        service: &Service,
    ) -> Result<Service, K8sError> {
        info!("creating service");

        let created = self
            .services(namespace)
            .create(&PostParams::default(), service)
            .await?;

        info!("service created");

        Ok(created)
    }

    async fn delete_service(&self, namespace: &str, name: &str) -> Result<(), K8sError> {
        info!("deleting service");

        self.services(namespace)
            .delete(name, &DeleteParams::default())
            .await?;

        info!("service deleted");

        Ok(())
    }
}
