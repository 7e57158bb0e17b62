use crate::controller::create_resource_controller;
use crate::controller::local_node_selector;
use crate::controller::ResourceController;
use crate::controller::ResourceEventHandlerFuncs;
use crate::controller::ERROR_LOG_LEVEL;
use crate::errors::Error;
use kubewatch_api::ResourceKind;
use kubewatch_api::ResourceView;
use kubewatch_api::print_list;

use k8s_openapi::NamespaceResourceScope;
use k8s_openapi::api::core::v1::Namespace as KubeNamespace;
use k8s_openapi::api::core::v1::Node as KubeNode;
use k8s_openapi::api::core::v1::Pod as KubePod;
use k8s_openapi::api::core::v1::Service as KubeService;
use k8s_openapi::api::networking::v1::NetworkPolicy as KubeNetworkPolicy;
use k8s_openapi::apimachinery::pkg::version::Info as KubeVersionInfo;
use kube::Api as KubeApi;
use kube::Client as KubeClient;
use kube::Resource as KubeResource;
use kube::api::ListParams as KubeListParams;
use kube::runtime::reflector::Store;
use kube::runtime::watcher::Config as KubeWatcherConfig;
use log;
use serde::de::DeserializeOwned;
use std::fmt::Debug;

/*
 * Wraps a fallible, typed callback so that its errors are logged and
 * never reach the watch machinery.
 */
pub(crate) fn adapt<T, F>(action: &'static str, kind: &'static str, handler: F) -> impl Fn(&T) + Send + Sync + 'static
where
    T: 'static,
    F: Fn(&T) -> Result<(), Error> + Send + Sync + 'static,
{
    move |obj: &T| {
	if let Err(err) = handler(obj) {
	    log::log!(ERROR_LOG_LEVEL, "Error while handling {} {}: {}", action, kind, err);
	}
    }
}

pub(crate) fn adapt_update<T, F>(kind: &'static str, handler: F) -> impl Fn(&T, &T) + Send + Sync + 'static
where
    T: 'static,
    F: Fn(&T, &T) -> Result<(), Error> + Send + Sync + 'static,
{
    move |old: &T, updated: &T| {
	if let Err(err) = handler(old, updated) {
	    log::log!(ERROR_LOG_LEVEL, "Error while handling Update {}: {}", kind, err);
	}
    }
}

fn typed_controller<K, A, D, U>(
    api: KubeApi<K>,
    selector: KubeWatcherConfig,
    add_func: A,
    delete_func: D,
    update_func: U,
) -> (Store<K>, ResourceController)
where
    K: ResourceView + KubeResource<DynamicType = ()> + Clone + DeserializeOwned + Debug + Send + Sync + 'static,
    A: Fn(&K) -> Result<(), Error> + Send + Sync + 'static,
    D: Fn(&K) -> Result<(), Error> + Send + Sync + 'static,
    U: Fn(&K, &K) -> Result<(), Error> + Send + Sync + 'static,
{
    let handlers = ResourceEventHandlerFuncs::new(
	adapt::<K, _>("Add", K::KIND, add_func),
	adapt::<K, _>("Delete", K::KIND, delete_func),
	adapt_update::<K, _>(K::KIND, update_func),
    );

    create_resource_controller(api, K::URL_PATH_SEGMENT, selector, handlers)
}

/*
 * Clientset is the entry point for everything kubewatch asks the API
 * server: one-shot listings, server discovery, and typed watch
 * controllers.
 */
#[derive(Clone)]
pub struct Clientset {
    client: KubeClient,
}

impl Clientset {

    pub fn new(client: KubeClient) -> Self {
	Self{
	    client: client,
	}
    }

    pub fn client(&self) -> &KubeClient {
	&self.client
    }

    /*
     * Api scoped to `namespace`, or spanning every namespace when it is
     * None (or empty).
     */
    fn scoped<K>(&self, namespace: Option<&str>) -> KubeApi<K>
    where
	K: KubeResource<Scope = NamespaceResourceScope, DynamicType = ()>,
    {
	match namespace {
	    Some(ns) if !ns.is_empty() => KubeApi::namespaced(self.client.clone(), ns),
	    _ => KubeApi::all(self.client.clone()),
	}
    }

    async fn list<K>(&self, api: KubeApi<K>) -> Vec<K>
    where
	K: ResourceView + Clone + DeserializeOwned + Debug,
    {
	match api.list(&KubeListParams::default()).await {
	    Ok(list) => list.items,
	    Err(err) => {
		log::error!("Error listing {}. Error: {}", K::URL_PATH_SEGMENT, err);
		vec![]
	    }
	}
    }

    pub async fn list_pods(&self, namespace: Option<&str>) -> Vec<KubePod> {
	self.list(self.scoped(namespace)).await
    }

    pub async fn list_namespaces(&self) -> Vec<KubeNamespace> {
	self.list(KubeApi::all(self.client.clone())).await
    }

    pub async fn list_network_policies(&self, namespace: Option<&str>) -> Vec<KubeNetworkPolicy> {
	self.list(self.scoped(namespace)).await
    }

    pub async fn list_services(&self, namespace: Option<&str>) -> Vec<KubeService> {
	self.list(self.scoped(namespace)).await
    }

    pub async fn list_nodes(&self) -> Vec<KubeNode> {
	self.list(KubeApi::all(self.client.clone())).await
    }

    /*
     * Asks the API server which version it runs.
     */
    pub async fn server_version(&self) -> Option<KubeVersionInfo> {
	match self.client.apiserver_version().await {
	    Ok(info) => Some(info),
	    Err(err) => {
		log::error!("Error discovering server version. Error: {}", err);
		None
	    }
	}
    }

    /*
     * Lists every kind in `kinds` and prints them one after the other.
     */
    pub async fn print_resources(&self, namespace: Option<&str>, kinds: &[ResourceKind]) {
	for kind in kinds {
	    let printed = match kind {
		ResourceKind::Pod => print_list(&self.list_pods(namespace).await),
		ResourceKind::Namespace => print_list(&self.list_namespaces().await),
		ResourceKind::NetworkPolicy => print_list(&self.list_network_policies(namespace).await),
		ResourceKind::Service => print_list(&self.list_services(namespace).await),
		ResourceKind::Node => print_list(&self.list_nodes().await),
	    };

	    if let Err(err) = printed {
		log::error!("Unable to print {}: {}", kind, err);
	    }
	}
    }

    pub fn create_namespace_controller<A, D, U>(&self, add_func: A, delete_func: D, update_func: U) -> (Store<KubeNamespace>, ResourceController)
    where
	A: Fn(&KubeNamespace) -> Result<(), Error> + Send + Sync + 'static,
	D: Fn(&KubeNamespace) -> Result<(), Error> + Send + Sync + 'static,
	U: Fn(&KubeNamespace, &KubeNamespace) -> Result<(), Error> + Send + Sync + 'static,
    {
	typed_controller(KubeApi::all(self.client.clone()), KubeWatcherConfig::default(),
			 add_func, delete_func, update_func)
    }

    pub fn create_pod_controller<A, D, U>(&self, namespace: Option<&str>, add_func: A, delete_func: D, update_func: U) -> (Store<KubePod>, ResourceController)
    where
	A: Fn(&KubePod) -> Result<(), Error> + Send + Sync + 'static,
	D: Fn(&KubePod) -> Result<(), Error> + Send + Sync + 'static,
	U: Fn(&KubePod, &KubePod) -> Result<(), Error> + Send + Sync + 'static,
    {
	typed_controller(self.scoped(namespace), KubeWatcherConfig::default(),
			 add_func, delete_func, update_func)
    }

    /*
     * Same as create_pod_controller(), but only for the pods scheduled on
     * `node_name`.
     */
    pub fn create_local_pod_controller<A, D, U>(&self, namespace: Option<&str>, node_name: &str, add_func: A, delete_func: D, update_func: U) -> (Store<KubePod>, ResourceController)
    where
	A: Fn(&KubePod) -> Result<(), Error> + Send + Sync + 'static,
	D: Fn(&KubePod) -> Result<(), Error> + Send + Sync + 'static,
	U: Fn(&KubePod, &KubePod) -> Result<(), Error> + Send + Sync + 'static,
    {
	typed_controller(self.scoped(namespace), local_node_selector(node_name),
			 add_func, delete_func, update_func)
    }

    pub fn create_network_policies_controller<A, D, U>(&self, namespace: Option<&str>, add_func: A, delete_func: D, update_func: U) -> (Store<KubeNetworkPolicy>, ResourceController)
    where
	A: Fn(&KubeNetworkPolicy) -> Result<(), Error> + Send + Sync + 'static,
	D: Fn(&KubeNetworkPolicy) -> Result<(), Error> + Send + Sync + 'static,
	U: Fn(&KubeNetworkPolicy, &KubeNetworkPolicy) -> Result<(), Error> + Send + Sync + 'static,
    {
	typed_controller(self.scoped(namespace), KubeWatcherConfig::default(),
			 add_func, delete_func, update_func)
    }

    pub fn create_service_controller<A, D, U>(&self, add_func: A, delete_func: D, update_func: U) -> (Store<KubeService>, ResourceController)
    where
	A: Fn(&KubeService) -> Result<(), Error> + Send + Sync + 'static,
	D: Fn(&KubeService) -> Result<(), Error> + Send + Sync + 'static,
	U: Fn(&KubeService, &KubeService) -> Result<(), Error> + Send + Sync + 'static,
    {
	typed_controller(KubeApi::all(self.client.clone()), KubeWatcherConfig::default(),
			 add_func, delete_func, update_func)
    }

    pub fn create_node_controller<A, D, U>(&self, add_func: A, delete_func: D, update_func: U) -> (Store<KubeNode>, ResourceController)
    where
	A: Fn(&KubeNode) -> Result<(), Error> + Send + Sync + 'static,
	D: Fn(&KubeNode) -> Result<(), Error> + Send + Sync + 'static,
	U: Fn(&KubeNode, &KubeNode) -> Result<(), Error> + Send + Sync + 'static,
    {
	typed_controller(KubeApi::all(self.client.clone()), KubeWatcherConfig::default(),
			 add_func, delete_func, update_func)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::EventDispatcher;
    use kube::api::ObjectMeta;
    use kube::runtime::watcher::Event as KubeWatchEvent;
    use std::sync::Arc;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn failing_callback_is_swallowed() {
	let calls = Arc::new(AtomicUsize::new(0));
	let counter = calls.clone();

	let handler = adapt("Add", "Pod", move |_pod: &KubePod| {
	    counter.fetch_add(1, Ordering::SeqCst);
	    Err(Error::Handler(String::from("boom")))
	});

	handler(&KubePod::default());
	handler(&KubePod::default());
	assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn failing_update_is_swallowed() {
	let calls = Arc::new(AtomicUsize::new(0));
	let counter = calls.clone();

	let handler = adapt_update("Service", move |old: &KubeService, new: &KubeService| {
	    counter.fetch_add(1, Ordering::SeqCst);
	    if old.metadata.name == new.metadata.name {
		return Err(Error::Handler(String::from("nothing changed")));
	    }
	    Ok(())
	});

	handler(&KubeService::default(), &KubeService::default());
	assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    fn named_pod(name: &str, version: &str) -> KubePod {
	let mut metadata = ObjectMeta::default();
	metadata.name = Some(name.to_string());
	metadata.namespace = Some(String::from("default"));
	metadata.resource_version = Some(version.to_string());

	KubePod{
	    metadata: metadata,
	    ..Default::default()
	}
    }

    #[test]
    fn events_keep_flowing_after_a_failing_callback() {
	let seen = Arc::new(Mutex::new(Vec::new()));
	let (added, deleted, updated) = (seen.clone(), seen.clone(), seen.clone());

	let handlers = ResourceEventHandlerFuncs::new(
	    adapt("Add", "Pod", move |_pod: &KubePod| {
		added.lock().unwrap().push("add");
		Err(Error::Handler(String::from("unable to handle pod")))
	    }),
	    adapt("Delete", "Pod", move |_pod: &KubePod| {
		deleted.lock().unwrap().push("delete");
		Ok(())
	    }),
	    adapt_update("Pod", move |_old: &KubePod, _new: &KubePod| {
		updated.lock().unwrap().push("update");
		Ok(())
	    }),
	);
	let mut dispatcher = EventDispatcher::new("pods", handlers);

	dispatcher.dispatch(KubeWatchEvent::Apply(named_pod("web", "1")));
	dispatcher.dispatch(KubeWatchEvent::Apply(named_pod("web", "2")));
	dispatcher.dispatch(KubeWatchEvent::Delete(named_pod("web", "3")));

	assert_eq!(*seen.lock().unwrap(), vec!["add", "update", "delete"]);
	assert!(dispatcher.store().state().is_empty());
    }
}
