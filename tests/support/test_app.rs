use async_trait::async_trait;
use deploy_api::k8s::{K8sClient, K8sError};
use deploy_api::routes::deployments::DeploymentRequest;
use deploy_api::startup::run;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Service;
use kube::core::ErrorResponse;
use std::collections::HashMap;
use std::io;
use std::net::TcpListener;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

fn not_found(kind: &str, name: &str) -> K8sError {
    K8sError::Kube(kube::Error::Api(ErrorResponse {
        status: "Failure".to_string(),
        message: format!("{kind} \"{name}\" not found"),
        reason: "NotFound".to_string(),
        code: 404,
    }))
}

fn internal_error(message: &str) -> K8sError {
    K8sError::Kube(kube::Error::Api(ErrorResponse {
        status: "Failure".to_string(),
        message: message.to_string(),
        reason: "InternalError".to_string(),
        code: 500,
    }))
}

fn key(namespace: &str, name: &str) -> String {
    format!("{namespace}/{name}")
}

/// In-memory [`K8sClient`] used by the integration tests.
///
/// Stores resources in maps keyed by `namespace/name` and can be told to fail
/// individual operations to exercise the partial-success paths.
#[derive(Default)]
pub struct FakeK8sClient {
    deployments: Mutex<HashMap<String, Deployment>>,
    services: Mutex<HashMap<String, Service>>,
    pub fail_deployment_create: AtomicBool,
    pub fail_service_create: AtomicBool,
    pub fail_service_delete: AtomicBool,
}

impl FakeK8sClient {
    pub fn deployment(&self, namespace: &str, name: &str) -> Option<Deployment> {
        self.deployments
            .lock()
            .unwrap()
            .get(&key(namespace, name))
            .cloned()
    }

    pub fn service(&self, namespace: &str, name: &str) -> Option<Service> {
        self.services
            .lock()
            .unwrap()
            .get(&key(namespace, name))
            .cloned()
    }

    pub fn deployment_count(&self) -> usize {
        self.deployments.lock().unwrap().len()
    }

    pub fn service_count(&self) -> usize {
        self.services.lock().unwrap().len()
    }

    /// Seeds a deployment directly, bypassing the API.
    pub fn insert_deployment(&self, namespace: &str, deployment: Deployment) {
        let name = deployment.metadata.name.clone().unwrap_or_default();
        self.deployments
            .lock()
            .unwrap()
            .insert(key(namespace, &name), deployment);
    }
}

#[async_trait]
impl K8sClient for FakeK8sClient {
    async fn create_deployment(
        &self,
        namespace: &str,
        deployment: &Deployment,
    ) -> Result<Deployment, K8sError> {
        if self.fail_deployment_create.load(Ordering::SeqCst) {
            return Err(internal_error("deployment creation rejected"));
        }

        let mut deployment = deployment.clone();
        deployment.metadata.resource_version = Some("1".to_string());

        let name = deployment.metadata.name.clone().unwrap_or_default();
        self.deployments
            .lock()
            .unwrap()
            .insert(key(namespace, &name), deployment.clone());

        Ok(deployment)
    }

    async fn update_deployment(
        &self,
        namespace: &str,
        name: &str,
        deployment: &Deployment,
    ) -> Result<Deployment, K8sError> {
        let mut deployments = self.deployments.lock().unwrap();
        if !deployments.contains_key(&key(namespace, name)) {
            return Err(not_found("deployments.apps", name));
        }

        let mut deployment = deployment.clone();
        let version: u64 = deployment
            .metadata
            .resource_version
            .as_deref()
            .unwrap_or("0")
            .parse()
            .unwrap_or_default();
        deployment.metadata.resource_version = Some((version + 1).to_string());

        deployments.insert(key(namespace, name), deployment.clone());

        Ok(deployment)
    }

    async fn delete_deployment(&self, namespace: &str, name: &str) -> Result<(), K8sError> {
        self.deployments
            .lock()
            .unwrap()
            .remove(&key(namespace, name))
            .map(|_| ())
            .ok_or_else(|| not_found("deployments.apps", name))
    }

    async fn get_deployment(&self, namespace: &str, name: &str) -> Result<Deployment, K8sError> {
        self.deployments
            .lock()
            .unwrap()
            .get(&key(namespace, name))
            .cloned()
            .ok_or_else(|| not_found("deployments.apps", name))
    }

    async fn list_deployments(&self, namespace: &str) -> Result<Vec<Deployment>, K8sError> {
        let prefix = format!("{namespace}/");
        let deployments = self
            .deployments
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, _)| k.starts_with(&prefix))
            .map(|(_, v)| v.clone())
            .collect();

        Ok(deployments)
    }

    async fn create_service(
        &self,
        namespace: &str,
        service: &Service,
    ) -> Result<Service, K8sError> {
        if self.fail_service_create.load(Ordering::SeqCst) {
            return Err(internal_error("service creation rejected"));
        }

        let name = service.metadata.name.clone().unwrap_or_default();
        self.services
            .lock()
            .unwrap()
            .insert(key(namespace, &name), service.clone());

        Ok(service.clone())
    }

    async fn delete_service(&self, namespace: &str, name: &str) -> Result<(), K8sError> {
        if self.fail_service_delete.load(Ordering::SeqCst) {
            return Err(internal_error("service deletion rejected"));
        }

        self.services
            .lock()
            .unwrap()
            .remove(&key(namespace, name))
            .map(|_| ())
            .ok_or_else(|| not_found("services", name))
    }
}

pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
    pub k8s: Arc<FakeK8sClient>,
    server_handle: tokio::task::JoinHandle<io::Result<()>>,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self.server_handle.abort();
    }
}

impl TestApp {
    pub async fn create_deployment(&self, request: &DeploymentRequest) -> reqwest::Response {
        self.api_client
            .post(format!("{}/deployments", self.address))
            .json(request)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn update_deployment(&self, request: &DeploymentRequest) -> reqwest::Response {
        self.api_client
            .patch(format!("{}/deployments", self.address))
            .json(request)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn delete_deployment(&self, request: &DeploymentRequest) -> reqwest::Response {
        self.api_client
            .delete(format!("{}/deployments", self.address))
            .json(request)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn read_deployments(&self, namespace: &str) -> reqwest::Response {
        self.api_client
            .get(format!("{}/deployments/{namespace}/list", self.address))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get_rollout_status(&self, namespace: &str, name: &str) -> reqwest::Response {
        self.api_client
            .get(format!(
                "{}/deployments/{namespace}/{name}/rollout-status",
                self.address
            ))
            .send()
            .await
            .expect("Failed to execute request.")
    }
}

pub async fn spawn_test_app() -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let k8s = Arc::new(FakeK8sClient::default());
    let server = run(listener, k8s.clone() as Arc<dyn K8sClient>)
        .await
        .expect("Failed to build server");
    let server_handle = tokio::spawn(server);

    TestApp {
        address: format!("http://127.0.0.1:{port}"),
        api_client: reqwest::Client::new(),
        k8s,
        server_handle,
    }
}
