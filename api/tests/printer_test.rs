use k8s_openapi::api::core::v1::{Node, NodeSpec, Service, ServicePort, ServiceSpec};
use k8s_openapi::api::networking::v1::{NetworkPolicy, NetworkPolicySpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kubewatch_api::{format_resource, ResourceKind, ResourceView};
use std::collections::BTreeMap;

fn meta(name: &str, namespace: Option<&str>) -> ObjectMeta {
    ObjectMeta {
	name: Some(name.to_string()),
	namespace: namespace.map(String::from),
	..Default::default()
    }
}

#[test]
fn network_policy_prints_its_policy_types() {
    let mut metadata = meta("deny-all", Some("prod"));
    metadata.labels = Some(BTreeMap::from([("app".to_string(), "db".to_string())]));

    let policy = NetworkPolicy {
	metadata,
	spec: Some(NetworkPolicySpec {
	    policy_types: Some(vec!["Ingress".to_string()]),
	    ..Default::default()
	}),
	..Default::default()
    };

    let out = format_resource(Some(1), &policy).unwrap();
    assert!(out.starts_with("====> NetworkPolicy nr 1 <====\n"));
    assert!(out.contains(" ######## NetworkPolicy's ObjectMetadata ########\n"));
    assert!(out.contains("\"namespace\": \"prod\""));
    assert!(out.contains("\"policyTypes\""));
    assert!(out.contains("\"Ingress\""));
    assert!(out.contains("\"app\": \"db\""));
    assert_eq!(NetworkPolicy::RESOURCE_KIND, ResourceKind::NetworkPolicy);
}

#[test]
fn service_prints_its_ports() {
    let service = Service {
	metadata: meta("frontend", Some("default")),
	spec: Some(ServiceSpec {
	    ports: Some(vec![ServicePort {
		port: 8080,
		..Default::default()
	    }]),
	    ..Default::default()
	}),
	..Default::default()
    };

    let out = format_resource(None, &service).unwrap();
    assert!(out.starts_with("====> Service <====\n"));
    assert!(out.contains("\"port\": 8080"));
    assert!(!out.contains("status"));
}

#[test]
fn node_spec_is_selected_not_status() {
    let node = Node {
	metadata: meta("worker-1", None),
	spec: Some(NodeSpec {
	    unschedulable: Some(true),
	    ..Default::default()
	}),
	..Default::default()
    };

    let out = format_resource(None, &node).unwrap();
    assert!(out.contains(" ######## Node's Spec ########\n{\n \"unschedulable\": true\n}\n"));
}
