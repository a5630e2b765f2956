#![deny(rust_2018_idioms)]
#![forbid(unsafe_code)]

mod cache;
mod resource_id;
mod store;

pub use self::{
    cache::{Cache, CacheError},
    resource_id::{NameError, ResourceId},
    store::Store,
};
pub use k8s_openapi::{
    api::{
        core::v1::{
            EndpointAddress, EndpointPort, EndpointSubset, Endpoints, ObjectReference, Pod,
            Secret, Service, ServicePort, ServiceSpec,
        },
        networking::v1::{
            HTTPIngressPath, HTTPIngressRuleValue, Ingress, IngressBackend, IngressRule,
            IngressServiceBackend, IngressSpec, IngressTLS, ServiceBackendPort,
        },
    },
    apimachinery::pkg::{apis::meta::v1::ObjectMeta, util::intstr::IntOrString},
    ByteString,
};
pub use kube::ResourceExt;
