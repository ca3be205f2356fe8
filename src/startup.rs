use actix_web::{App, HttpServer, dev::Server, web};
use std::{net::TcpListener, sync::Arc};
use tracing_actix_web::TracingLogger;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::ApiConfig,
    k8s::{K8sClient, http::HttpK8sClient},
    routes::{
        ErrorMessage,
        deployments::{
            CreateDeploymentResponse, DeleteDeploymentResponse, DeploymentRequest,
            DeploymentSummary, ReadDeploymentsResponse, RolloutStatusResponse, ServiceSpec,
            ServiceType, UpdateDeploymentResponse, create_deployment, delete_deployment,
            get_rollout_status, read_deployments, update_deployment,
        },
        health_check::health_check,
    },
};

pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    pub async fn build(config: ApiConfig) -> Result<Self, anyhow::Error> {
        let address = format!("{}:{}", config.application.host, config.application.port);
        let listener = TcpListener::bind(address)?;
        let port = listener.local_addr()?.port();

        // The Kubernetes client is created once and shared by all in-flight
        // requests for the lifetime of the process.
        let k8s_client = Arc::new(HttpK8sClient::new().await?) as Arc<dyn K8sClient>;

        let server = run(listener, k8s_client).await?;

        Ok(Self { port, server })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub async fn run(
    listener: TcpListener,
    k8s_client: Arc<dyn K8sClient>,
) -> Result<Server, anyhow::Error> {
    let k8s_client: web::Data<dyn K8sClient> = web::Data::from(k8s_client);

    #[derive(OpenApi)]
    #[openapi(
        paths(
            crate::routes::health_check::health_check,
            crate::routes::deployments::create_deployment,
            crate::routes::deployments::update_deployment,
            crate::routes::deployments::delete_deployment,
            crate::routes::deployments::read_deployments,
            crate::routes::deployments::get_rollout_status,
        ),
        components(schemas(
            DeploymentRequest,
            ServiceSpec,
            ServiceType,
            CreateDeploymentResponse,
            UpdateDeploymentResponse,
            DeleteDeploymentResponse,
            DeploymentSummary,
            ReadDeploymentsResponse,
            RolloutStatusResponse,
            ErrorMessage,
        ))
    )]
    struct ApiDoc;

    let openapi = ApiDoc::openapi();

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .service(health_check)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi.clone()),
            )
            .service(create_deployment)
            .service(update_deployment)
            .service(delete_deployment)
            .service(read_deployments)
            .service(get_rollout_status)
            .app_data(k8s_client.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
