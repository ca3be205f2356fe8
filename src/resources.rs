//! Translation from validated API requests into Kubernetes resources.
//!
//! These functions are pure: they build fresh resource descriptors per
//! request and perform no validation beyond what the handlers already did.

use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::api::core::v1::{
    Container, ContainerPort, PodSpec, PodTemplateSpec, Service, ServicePort,
    ServiceSpec as K8sServiceSpec,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use std::collections::BTreeMap;

use crate::routes::deployments::{DeploymentRequest, ServiceType};

/// Label key used to associate pods with their deployment and service.
const APP_LABEL: &str = "app";

/// Returns the `{app: <name>}` label set shared by the deployment selector,
/// the pod template, and the service selector.
fn app_labels(name: &str) -> BTreeMap<String, String> {
    BTreeMap::from([(APP_LABEL.to_string(), name.to_string())])
}

/// Builds the [`Deployment`] described by the request.
///
/// The selector and the pod template carry identical `{app: <name>}` labels;
/// this equality is what lets Kubernetes associate pods with the deployment
/// and lets the paired service's selector resolve. The container port is
/// declared only when a service spec is present and equals the service's
/// target port.
pub fn deployment_for(request: &DeploymentRequest) -> Deployment {
    let labels = app_labels(&request.name);

    let ports = request.service.as_ref().map(|service| {
        vec![ContainerPort {
            container_port: service.target_port,
            ..Default::default()
        }]
    });

    Deployment {
        metadata: ObjectMeta {
            name: Some(request.name.clone()),
            ..Default::default()
        },
        spec: Some(DeploymentSpec {
            replicas: Some(request.replicas),
            selector: LabelSelector {
                match_labels: Some(labels.clone()),
                ..Default::default()
            },
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    labels: Some(labels),
                    ..Default::default()
                }),
                spec: Some(PodSpec {
                    containers: vec![Container {
                        name: request.name.clone(),
                        image: Some(request.image.clone()),
                        ports,
                        ..Default::default()
                    }],
                    ..Default::default()
                }),
            },
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Builds the [`Service`] described by the request, if a service spec is
/// present.
///
/// The service shares the deployment's name, its selector matches the pod
/// labels, and the single port entry forwards `port` to `target_port`. The
/// node port is copied only when the type is `NodePort` and a value was
/// supplied; otherwise it is left unset for the cluster to auto-assign or
/// ignore.
pub fn service_for(request: &DeploymentRequest) -> Option<Service> {
    let spec = request.service.as_ref()?;

    let node_port = match spec.r#type {
        ServiceType::NodePort => spec.node_port,
        _ => None,
    };

    Some(Service {
        metadata: ObjectMeta {
            name: Some(request.name.clone()),
            ..Default::default()
        },
        spec: Some(K8sServiceSpec {
            selector: Some(app_labels(&request.name)),
            ports: Some(vec![ServicePort {
                port: spec.port,
                target_port: Some(IntOrString::Int(spec.target_port)),
                node_port,
                ..Default::default()
            }]),
            type_: Some(spec.r#type.to_string()),
            ..Default::default()
        }),
        ..Default::default()
    })
}
