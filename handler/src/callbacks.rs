/*
 * Default callbacks: log the transition and dump the object on the
 * console. They are meant to be handed to the Clientset controllers.
 */
use crate::errors::Error;
use kubewatch_api::ResourceView;
use kubewatch_api::json_pretty_print;

use k8s_openapi::api::core::v1::Namespace;
use k8s_openapi::api::core::v1::Node;
use k8s_openapi::api::core::v1::Pod;
use k8s_openapi::api::core::v1::Service;
use k8s_openapi::api::networking::v1::NetworkPolicy;
use log;

fn announce<R: ResourceView>(what: &str, transition: &str, obj: &R) -> Result<(), Error> {
    log::info!("=====> A {} got {}", what, transition);
    json_pretty_print(obj)?;
    Ok(())
}

pub fn pod_created(pod: &Pod) -> Result<(), Error> {
    announce("pod", "created", pod)
}

pub fn pod_deleted(pod: &Pod) -> Result<(), Error> {
    announce("pod", "deleted", pod)
}

pub fn pod_updated(_old: &Pod, updated: &Pod) -> Result<(), Error> {
    announce("pod", "updated", updated)
}

pub fn namespace_created(namespace: &Namespace) -> Result<(), Error> {
    announce("namespace", "created", namespace)
}

pub fn namespace_deleted(namespace: &Namespace) -> Result<(), Error> {
    announce("namespace", "deleted", namespace)
}

pub fn namespace_updated(_old: &Namespace, updated: &Namespace) -> Result<(), Error> {
    announce("namespace", "updated", updated)
}

pub fn network_policy_created(policy: &NetworkPolicy) -> Result<(), Error> {
    announce("network policy", "created", policy)
}

pub fn network_policy_deleted(policy: &NetworkPolicy) -> Result<(), Error> {
    announce("network policy", "deleted", policy)
}

pub fn network_policy_updated(_old: &NetworkPolicy, updated: &NetworkPolicy) -> Result<(), Error> {
    announce("network policy", "updated", updated)
}

pub fn service_created(service: &Service) -> Result<(), Error> {
    announce("service", "created", service)
}

pub fn service_deleted(service: &Service) -> Result<(), Error> {
    announce("service", "deleted", service)
}

pub fn service_updated(_old: &Service, updated: &Service) -> Result<(), Error> {
    announce("service", "updated", updated)
}

pub fn node_created(node: &Node) -> Result<(), Error> {
    announce("node", "created", node)
}

pub fn node_deleted(node: &Node) -> Result<(), Error> {
    announce("node", "deleted", node)
}

pub fn node_updated(_old: &Node, updated: &Node) -> Result<(), Error> {
    announce("node", "updated", updated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn callbacks_succeed_on_bare_objects() {
	assert!(pod_created(&Pod::default()).is_ok());
	assert!(namespace_deleted(&Namespace::default()).is_ok());
	assert!(network_policy_updated(&NetworkPolicy::default(), &NetworkPolicy::default()).is_ok());
	assert!(service_created(&Service::default()).is_ok());
	assert!(node_deleted(&Node::default()).is_ok());
    }
}
