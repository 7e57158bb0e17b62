use futures::future::BoxFuture;
use futures::FutureExt;
use futures::StreamExt;
use kube::Api as KubeApi;
use kube::Resource as KubeResource;
use kube::runtime::WatchStreamExt;
use kube::runtime::reflector as kube_reflector;
use kube::runtime::reflector::ObjectRef;
use kube::runtime::reflector::Store;
use kube::runtime::reflector::store::Writer;
use kube::runtime::watcher as kube_watcher;
use kube::runtime::watcher::Config as KubeWatcherConfig;
use kube::runtime::watcher::Event as KubeWatchEvent;
use log;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

/*
 * Verbosity used for errors that are logged and otherwise swallowed:
 * failing callbacks and watch stream errors.
 */
pub const ERROR_LOG_LEVEL: log::Level = log::Level::Debug;

pub type AddFunc<K> = Box<dyn Fn(&K) + Send + Sync>;
pub type DeleteFunc<K> = Box<dyn Fn(&K) + Send + Sync>;
pub type UpdateFunc<K> = Box<dyn Fn(&K, &K) + Send + Sync>;

/*
 * The callbacks a controller invokes on observed transitions.
 */
pub struct ResourceEventHandlerFuncs<K> {
    pub add_func: AddFunc<K>,
    pub delete_func: DeleteFunc<K>,
    pub update_func: UpdateFunc<K>,
}

impl<K> ResourceEventHandlerFuncs<K> {

    pub fn new<A, D, U>(add_func: A, delete_func: D, update_func: U) -> Self
    where
	A: Fn(&K) + Send + Sync + 'static,
	D: Fn(&K) + Send + Sync + 'static,
	U: Fn(&K, &K) + Send + Sync + 'static,
    {
	Self{
	    add_func: Box::new(add_func),
	    delete_func: Box::new(delete_func),
	    update_func: Box::new(update_func),
	}
    }
}

/*
 * EventDispatcher keeps the local cache of a resource type up to date and
 * turns raw watch events into add/update/delete notifications.
 *
 * The kube watcher only knows about "applied" and "deleted" objects, so the
 * previous state of an object is looked up in the cache before it gets
 * overwritten. A relist (Init .. InitDone) is compared against what the cache
 * held when it started: cached objects the relist did not return were
 * deleted while we were not watching.
 */
struct Relist<K>
where
    K: KubeResource<DynamicType = ()> + Clone + 'static,
{
    // objects known before the relist, not returned by it yet
    pending: HashMap<ObjectRef<K>, Arc<K>>,

    // objects already reported during this relist
    seen: HashMap<ObjectRef<K>, Arc<K>>,
}

pub(crate) struct EventDispatcher<K>
where
    K: KubeResource<DynamicType = ()> + Clone + 'static,
{
    resource: String,
    reader: Store<K>,
    writer: Writer<K>,
    handlers: ResourceEventHandlerFuncs<K>,
    relisting: Option<Relist<K>>,
}

impl<K> EventDispatcher<K>
where
    K: KubeResource<DynamicType = ()> + Clone + 'static,
{

    pub(crate) fn new(resource: &str, handlers: ResourceEventHandlerFuncs<K>) -> Self {
	let (reader, writer) = kube_reflector::store();

	Self{
	    resource: resource.to_string(),
	    reader: reader,
	    writer: writer,
	    handlers: handlers,
	    relisting: None,
	}
    }

    pub(crate) fn store(&self) -> Store<K> {
	self.reader.clone()
    }

    fn notify_applied(&self, old: Option<Arc<K>>, obj: &K) {
	match old {
	    Some(old) => (self.handlers.update_func)(old.as_ref(), obj),
	    None => (self.handlers.add_func)(obj),
	}
    }

    pub(crate) fn dispatch(&mut self, event: KubeWatchEvent<K>) {
	match &event {
	    KubeWatchEvent::Init => {
		log::debug!("Relisting {}", self.resource);

		match self.relisting.as_mut() {
		    /*
		     * The watch restarted in the middle of a relist: the store still
		     * holds the pre-relist state, so what was reported so far becomes
		     * the baseline of the new relist.
		     */
		    Some(relist) => {
			let seen = std::mem::take(&mut relist.seen);
			relist.pending.extend(seen);
		    },
		    None => {
			let pending = self.reader.state()
			    .into_iter()
			    .map(|obj| (ObjectRef::from_obj(obj.as_ref()), obj))
			    .collect();
			self.relisting = Some(Relist{
			    pending: pending,
			    seen: HashMap::new(),
			});
		    },
		}
		self.writer.apply_watcher_event(&event);
	    },
	    KubeWatchEvent::InitApply(obj) => {
		let key = ObjectRef::from_obj(obj);
		let old = match self.relisting.as_mut() {
		    Some(relist) => {
			let old = relist.seen.get(&key).cloned()
			    .or_else(|| relist.pending.remove(&key));
			relist.seen.insert(key.clone(), Arc::new(obj.clone()));
			old
		    },
		    None => self.reader.get(&key),
		};

		self.writer.apply_watcher_event(&event);
		self.notify_applied(old, obj);
	    },
	    KubeWatchEvent::InitDone => {
		self.writer.apply_watcher_event(&event);

		if let Some(relist) = self.relisting.take() {
		    for (key, obj) in relist.pending {
			log::debug!("{} is gone after relisting {}", key, self.resource);
			(self.handlers.delete_func)(obj.as_ref());
		    }
		}
	    },
	    KubeWatchEvent::Apply(obj) => {
		let old = self.reader.get(&ObjectRef::from_obj(obj));

		self.writer.apply_watcher_event(&event);
		self.notify_applied(old, obj);
	    },
	    KubeWatchEvent::Delete(obj) => {
		self.writer.apply_watcher_event(&event);
		(self.handlers.delete_func)(obj);
	    },
	}
    }
}

/*
 * A watch on one resource type. Nothing happens until run() is awaited,
 * usually on its own task:
 *
 *   tokio::spawn(controller.run());
 */
pub struct ResourceController {
    resource: String,
    task: BoxFuture<'static, ()>,
}

impl ResourceController {

    pub fn resource(&self) -> &str {
	&self.resource
    }

    pub async fn run(self) {
	log::info!("Starting {} controller", self.resource);

	self.task.await;

	log::warn!("{} controller stopped: watch stream ended", self.resource);
    }
}

/*
 * Creates a controller watching `resource` through `api` (scoped to a
 * namespace or not), restricted by the label/field selectors of
 * `selector`. The handler functions are called on Add/Delete/Update.
 *
 * Returns the local cache of the watched objects alongside the controller.
 */
pub fn create_resource_controller<K>(
    api: KubeApi<K>,
    resource: &str,
    selector: KubeWatcherConfig,
    handlers: ResourceEventHandlerFuncs<K>,
) -> (Store<K>, ResourceController)
where
    K: KubeResource<DynamicType = ()> + Clone + DeserializeOwned + Debug + Send + Sync + 'static,
{
    let mut dispatcher = EventDispatcher::new(resource, handlers);
    let store = dispatcher.store();

    let name = resource.to_string();
    let mut events = kube_watcher(api, selector).default_backoff().boxed();
    let task = async move {
	while let Some(event) = events.next().await {
	    match event {
		Ok(event) => dispatcher.dispatch(event),
		Err(err) => {
		    log::log!(ERROR_LOG_LEVEL, "Error while watching {}: {}", name, err);
		},
	    }
	}
    }.boxed();

    let controller = ResourceController{
	resource: resource.to_string(),
	task: task,
    };
    (store, controller)
}

/*
 * Field selector matching the pods scheduled on `node_name`.
 */
pub fn local_node_selector(node_name: &str) -> KubeWatcherConfig {
    KubeWatcherConfig::default().fields(&format!("spec.nodeName={}", node_name))
}
