use k8s_openapi::api::core::v1::{Namespace, NamespaceSpec};
use k8s_openapi::api::core::v1::{Node, NodeSpec};
use k8s_openapi::api::core::v1::{Pod, PodSpec};
use k8s_openapi::api::core::v1::{Service, ServiceSpec};
use k8s_openapi::api::networking::v1::{NetworkPolicy, NetworkPolicySpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::Resource;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Pod,
    Namespace,
    NetworkPolicy,
    Service,
    Node,
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("unknown resource kind `{0}`, expected one of: pods, namespaces, networkpolicies, services, nodes")]
pub struct UnknownKind(pub String);

impl ResourceKind {

    pub const ALL: [ResourceKind; 5] = [
	ResourceKind::Pod,
	ResourceKind::Namespace,
	ResourceKind::NetworkPolicy,
	ResourceKind::Service,
	ResourceKind::Node,
    ];

    /*
     * The CamelCase kind, as found in the `kind` field of the objects.
     */
    pub fn kind(&self) -> &'static str {
	match self {
	    ResourceKind::Pod => Pod::KIND,
	    ResourceKind::Namespace => Namespace::KIND,
	    ResourceKind::NetworkPolicy => NetworkPolicy::KIND,
	    ResourceKind::Service => Service::KIND,
	    ResourceKind::Node => Node::KIND,
	}
    }

    /*
     * The lowercase plural used by the REST paths (pods, services, ...)
     */
    pub fn plural(&self) -> &'static str {
	match self {
	    ResourceKind::Pod => Pod::URL_PATH_SEGMENT,
	    ResourceKind::Namespace => Namespace::URL_PATH_SEGMENT,
	    ResourceKind::NetworkPolicy => NetworkPolicy::URL_PATH_SEGMENT,
	    ResourceKind::Service => Service::URL_PATH_SEGMENT,
	    ResourceKind::Node => Node::URL_PATH_SEGMENT,
	}
    }

    pub fn is_namespaced(&self) -> bool {
	!matches!(self, ResourceKind::Namespace | ResourceKind::Node)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
	f.write_str(self.plural())
    }
}

impl FromStr for ResourceKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
	let wanted = s.trim().to_ascii_lowercase();

	ResourceKind::ALL
	    .into_iter()
	    .find(|kind| {
		wanted == kind.plural() || wanted == kind.kind().to_ascii_lowercase()
	    })
	    .ok_or_else(|| UnknownKind(s.to_string()))
    }
}

mod sealed {
    pub trait Sealed {}
}

/*
 * ResourceView gives every resource kind kubewatch handles the same
 * accessors: its metadata and its kind-specific spec.
 *
 * The trait is sealed: only the kinds listed in ResourceKind implement it.
 */
pub trait ResourceView:
    sealed::Sealed + Resource + k8s_openapi::Metadata<Ty = ObjectMeta>
{
    type Spec: Serialize;

    const RESOURCE_KIND: ResourceKind;

    fn spec(&self) -> Option<&Self::Spec>;
}

macro_rules! resource_view {
    ($ty:ty, $spec:ty, $kind:expr) => {
	impl sealed::Sealed for $ty {}

	impl ResourceView for $ty {
	    type Spec = $spec;

	    const RESOURCE_KIND: ResourceKind = $kind;

	    fn spec(&self) -> Option<&Self::Spec> {
		self.spec.as_ref()
	    }
	}
    };
}

resource_view!(Pod, PodSpec, ResourceKind::Pod);
resource_view!(Namespace, NamespaceSpec, ResourceKind::Namespace);
resource_view!(NetworkPolicy, NetworkPolicySpec, ResourceKind::NetworkPolicy);
resource_view!(Service, ServiceSpec, ResourceKind::Service);
resource_view!(Node, NodeSpec, ResourceKind::Node);
