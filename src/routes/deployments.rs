use actix_web::{
    HttpResponse, Responder, ResponseError, delete, get,
    http::{StatusCode, header::ContentType},
    patch, post,
    web::{Data, Json, Path},
};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use utoipa::ToSchema;

use crate::k8s::{K8sClient, K8sError};
use crate::resources;
use crate::routes::ErrorMessage;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("the {0} field must not be empty")]
    EmptyField(&'static str),

    #[error("replicas must be greater than zero")]
    NonPositiveReplicas,
}

#[derive(Debug, Error)]
pub enum DeploymentError {
    #[error("The deployment {0} was not found")]
    DeploymentNotFound(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("A K8s error occurred: {0}")]
    K8s(#[from] K8sError),
}

impl ResponseError for DeploymentError {
    fn status_code(&self) -> StatusCode {
        match self {
            DeploymentError::Validation(_) => StatusCode::BAD_REQUEST,
            DeploymentError::DeploymentNotFound(_) => StatusCode::NOT_FOUND,
            DeploymentError::K8s(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error_message = ErrorMessage {
            error: self.to_string(),
        };
        let body =
            serde_json::to_string(&error_message).expect("failed to serialize error message");
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(body)
    }
}

/// Service type for the exposure paired with a deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ServiceType {
    ClusterIP,
    NodePort,
    LoadBalancer,
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceType::ClusterIP => write!(f, "ClusterIP"),
            ServiceType::NodePort => write!(f, "NodePort"),
            ServiceType::LoadBalancer => write!(f, "LoadBalancer"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSpec {
    #[schema(example = 80, required = true)]
    pub port: i32,
    #[schema(example = 8080, required = true)]
    pub target_port: i32,
    #[schema(example = "ClusterIP", required = true)]
    pub r#type: ServiceType,
    /// Only meaningful when the type is `NodePort`.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = 30080)]
    pub node_port: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeploymentRequest {
    #[schema(example = "web", required = true)]
    pub name: String,
    #[schema(example = "default", required = true)]
    pub namespace: String,
    #[schema(example = "nginx", required = true)]
    pub image: String,
    #[schema(example = 2, required = true)]
    pub replicas: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<ServiceSpec>,
}

impl DeploymentRequest {
    /// Presence checks only; image format, replica bounds, and port ranges
    /// are left to the API server.
    fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyField("name"));
        }
        if self.namespace.is_empty() {
            return Err(ValidationError::EmptyField("namespace"));
        }
        if self.image.is_empty() {
            return Err(ValidationError::EmptyField("image"));
        }
        if self.replicas <= 0 {
            return Err(ValidationError::NonPositiveReplicas);
        }

        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateDeploymentResponse {
    #[schema(example = "deployment created")]
    pub message: String,
    #[schema(example = "web")]
    pub deployment: String,
    /// Present when the deployment was created but the service was not.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateDeploymentResponse {
    #[schema(example = "deployment updated")]
    pub message: String,
    #[schema(example = "web")]
    pub deployment: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteDeploymentResponse {
    #[schema(example = "deployment and service deleted")]
    pub message: String,
    /// Present when the deployment was deleted but the service was not.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeploymentSummary {
    #[schema(example = "web")]
    pub name: String,
    #[schema(example = "nginx")]
    pub image: String,
    #[schema(example = 2)]
    pub replicas: i32,
}

impl From<k8s_openapi::api::apps::v1::Deployment> for DeploymentSummary {
    fn from(deployment: k8s_openapi::api::apps::v1::Deployment) -> Self {
        let name = deployment.metadata.name.unwrap_or_default();
        let spec = deployment.spec.unwrap_or_default();
        let image = spec
            .template
            .spec
            .and_then(|pod| pod.containers.into_iter().next())
            .and_then(|container| container.image)
            .unwrap_or_default();

        Self {
            name,
            image,
            replicas: spec.replicas.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReadDeploymentsResponse {
    pub deployments: Vec<DeploymentSummary>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RolloutStatusResponse {
    #[schema(example = 2)]
    pub available: i32,
    #[schema(example = 2)]
    pub desired: i32,
    #[schema(example = 2)]
    pub updated: i32,
    #[schema(example = 2)]
    pub ready: i32,
}

#[utoipa::path(
    summary = "Create a deployment",
    description = "Creates the deployment and, when a service spec is present, its paired service. \
        The two writes are independent: a service failure after a successful deployment creation \
        is reported as a partial success, not rolled back.",
    request_body = DeploymentRequest,
    responses(
        (status = 200, description = "Deployment (and service, if requested) created", body = CreateDeploymentResponse),
        (status = 201, description = "Deployment created, but the service creation failed", body = CreateDeploymentResponse),
        (status = 400, description = "Invalid request body", body = ErrorMessage),
        (status = 500, description = "Cluster error", body = ErrorMessage),
    ),
    tag = "Deployments"
)]
#[post("/deployments")]
pub async fn create_deployment(
    k8s_client: Data<dyn K8sClient>,
    request: Json<DeploymentRequest>,
) -> Result<impl Responder, DeploymentError> {
    let request = request.into_inner();
    request.validate()?;

    let deployment = resources::deployment_for(&request);
    let created = k8s_client
        .create_deployment(&request.namespace, &deployment)
        .await?;
    let deployment_name = created.metadata.name.unwrap_or_else(|| request.name.clone());

    if let Some(service) = resources::service_for(&request) {
        if let Err(e) = k8s_client.create_service(&request.namespace, &service).await {
            // Partial success: the deployment exists, the service does not.
            // No compensating deletion is performed.
            let response = CreateDeploymentResponse {
                message: "deployment created, but failed to create service".to_string(),
                deployment: deployment_name,
                service_error: Some(e.to_string()),
            };

            return Ok(HttpResponse::Created().json(response));
        }
    }

    let response = CreateDeploymentResponse {
        message: "deployment created".to_string(),
        deployment: deployment_name,
        service_error: None,
    };

    Ok(HttpResponse::Ok().json(response))
}

#[utoipa::path(
    summary = "Update a deployment",
    description = "Replaces the deployment's spec with the one derived from the request. The live \
        resource is fetched first so the write carries its resourceVersion, satisfying the \
        cluster's optimistic-concurrency check. The paired service is not mutated.",
    request_body = DeploymentRequest,
    responses(
        (status = 200, description = "Deployment updated", body = UpdateDeploymentResponse),
        (status = 400, description = "Invalid request body", body = ErrorMessage),
        (status = 404, description = "Deployment not found", body = ErrorMessage),
        (status = 500, description = "Cluster error", body = ErrorMessage),
    ),
    tag = "Deployments"
)]
#[patch("/deployments")]
pub async fn update_deployment(
    k8s_client: Data<dyn K8sClient>,
    request: Json<DeploymentRequest>,
) -> Result<impl Responder, DeploymentError> {
    let request = request.into_inner();
    request.validate()?;

    let existing = match k8s_client
        .get_deployment(&request.namespace, &request.name)
        .await
    {
        Ok(existing) => existing,
        Err(e) if e.is_not_found() => {
            return Err(DeploymentError::DeploymentNotFound(request.name));
        }
        Err(e) => return Err(e.into()),
    };

    let mut deployment = resources::deployment_for(&request);
    deployment.metadata.resource_version = existing.metadata.resource_version;

    let updated = k8s_client
        .update_deployment(&request.namespace, &request.name, &deployment)
        .await?;

    let response = UpdateDeploymentResponse {
        message: "deployment updated".to_string(),
        deployment: updated.metadata.name.unwrap_or_else(|| request.name.clone()),
    };

    Ok(Json(response))
}

#[utoipa::path(
    summary = "Delete a deployment",
    description = "Deletes the deployment, then the service sharing its name. A missing service \
        is treated as success; any other service failure is reported as a partial success.",
    request_body = DeploymentRequest,
    responses(
        (status = 200, description = "Deployment (and service, if present) deleted", body = DeleteDeploymentResponse),
        (status = 400, description = "Invalid request body", body = ErrorMessage),
        (status = 500, description = "Cluster error", body = ErrorMessage),
    ),
    tag = "Deployments"
)]
#[delete("/deployments")]
pub async fn delete_deployment(
    k8s_client: Data<dyn K8sClient>,
    request: Json<DeploymentRequest>,
) -> Result<impl Responder, DeploymentError> {
    let request = request.into_inner();
    request.validate()?;

    k8s_client
        .delete_deployment(&request.namespace, &request.name)
        .await?;

    // The delete of the service is idempotent: a not-found service means there
    // was nothing to clean up. Any other failure leaves the service behind and
    // is reported as a partial success.
    if let Err(e) = k8s_client
        .delete_service(&request.namespace, &request.name)
        .await
    {
        if !e.is_not_found() {
            let response = DeleteDeploymentResponse {
                message: "deployment deleted, but failed to delete service".to_string(),
                service_error: Some(e.to_string()),
            };

            return Ok(Json(response));
        }
    }

    let response = DeleteDeploymentResponse {
        message: "deployment and service deleted".to_string(),
        service_error: None,
    };

    Ok(Json(response))
}

#[utoipa::path(
    summary = "List deployments",
    description = "Returns a summary of every deployment in the namespace.",
    params(
        ("namespace" = String, Path, description = "Namespace to list deployments in"),
    ),
    responses(
        (status = 200, description = "Deployments listed", body = ReadDeploymentsResponse),
        (status = 500, description = "Cluster error", body = ErrorMessage),
    ),
    tag = "Deployments"
)]
#[get("/deployments/{namespace}/list")]
pub async fn read_deployments(
    k8s_client: Data<dyn K8sClient>,
    namespace: Path<String>,
) -> Result<impl Responder, DeploymentError> {
    let namespace = namespace.into_inner();

    let deployments = k8s_client
        .list_deployments(&namespace)
        .await?
        .into_iter()
        .map(DeploymentSummary::from)
        .collect();

    let response = ReadDeploymentsResponse { deployments };

    Ok(Json(response))
}

#[utoipa::path(
    summary = "Get rollout status",
    description = "Returns the deployment's replica counts as reported by the cluster. Does not \
        wait for the rollout to converge.",
    params(
        ("namespace" = String, Path, description = "Namespace of the deployment"),
        ("name" = String, Path, description = "Name of the deployment"),
    ),
    responses(
        (status = 200, description = "Rollout status retrieved", body = RolloutStatusResponse),
        (status = 500, description = "Cluster error", body = ErrorMessage),
    ),
    tag = "Deployments"
)]
#[get("/deployments/{namespace}/{name}/rollout-status")]
pub async fn get_rollout_status(
    k8s_client: Data<dyn K8sClient>,
    path: Path<(String, String)>,
) -> Result<impl Responder, DeploymentError> {
    let (namespace, name) = path.into_inner();

    let deployment = k8s_client.get_deployment(&namespace, &name).await?;

    let desired = deployment
        .spec
        .and_then(|spec| spec.replicas)
        .unwrap_or_default();
    let status = deployment.status.unwrap_or_default();

    let response = RolloutStatusResponse {
        available: status.available_replicas.unwrap_or_default(),
        desired,
        updated: status.updated_replicas.unwrap_or_default(),
        ready: status.ready_replicas.unwrap_or_default(),
    };

    Ok(Json(response))
}
