use kubewatch_api::ResourceKind;
use kubewatch_handler::Clientset;
use kubewatch_handler::Error;
use kubewatch_handler::ResourceController;
use kubewatch_handler::callbacks;
use kubewatch_handler::cli;
use kubewatch_handler::cli::KubeconfigArgs;
use kubewatch_handler::client;

use axum::Router;
use clap::Parser;
use gethostname::gethostname;
use log;
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// List the resources of a cluster, then log every change made to them.
#[derive(Parser, Debug)]
#[command(name = "kubewatch", version)]
struct Cli {
    #[command(flatten)]
    kube: KubeconfigArgs,

    /// only watch the pods scheduled on this node
    #[arg(long)]
    local_pods: bool,

    /// node name used by --local-pods (default: the hostname)
    #[arg(long)]
    node_name: Option<String>,

    /// address of the (route-less) HTTP listener keeping the process alive
    #[arg(long, default_value = "0.0.0.0:8099")]
    listen: SocketAddr,

    /// do not list the resources before watching them
    #[arg(long)]
    skip_list: bool,
}

fn get_node_name(hostname: Option<String>) -> String {
    let hostname = match hostname {
	Some(hostname) => hostname,
	None => {
	    // Get the system hostname, instead.
	    gethostname().to_string_lossy().into_owned()
	}
    };
    hostname
}

fn controllers(clientset: &Clientset, cli: &Cli) -> Vec<ResourceController> {
    let namespace = cli.kube.namespace.as_deref();
    let mut controllers = vec![];

    for kind in &cli.kube.kinds {
	let controller = match kind {
	    ResourceKind::Namespace => {
		let (_store, ctrl) = clientset.create_namespace_controller(
		    callbacks::namespace_created, callbacks::namespace_deleted, callbacks::namespace_updated);
		ctrl
	    },
	    ResourceKind::Pod if cli.local_pods => {
		let node_name = get_node_name(cli.node_name.clone());
		log::info!("Watching the pods of node {}", node_name);

		let (_store, ctrl) = clientset.create_local_pod_controller(namespace, &node_name,
		    callbacks::pod_created, callbacks::pod_deleted, callbacks::pod_updated);
		ctrl
	    },
	    ResourceKind::Pod => {
		let (_store, ctrl) = clientset.create_pod_controller(namespace,
		    callbacks::pod_created, callbacks::pod_deleted, callbacks::pod_updated);
		ctrl
	    },
	    ResourceKind::NetworkPolicy => {
		let (_store, ctrl) = clientset.create_network_policies_controller(namespace,
		    callbacks::network_policy_created, callbacks::network_policy_deleted, callbacks::network_policy_updated);
		ctrl
	    },
	    ResourceKind::Service => {
		let (_store, ctrl) = clientset.create_service_controller(
		    callbacks::service_created, callbacks::service_deleted, callbacks::service_updated);
		ctrl
	    },
	    ResourceKind::Node => {
		let (_store, ctrl) = clientset.create_node_controller(
		    callbacks::node_created, callbacks::node_deleted, callbacks::node_updated);
		ctrl
	    },
	};
	controllers.push(controller);
    }
    controllers
}

/*
 * HTTP listener without any route: every request gets a 404. It only
 * keeps the process alive (and reachable) while the controllers run.
 */
async fn serve(addr: SocketAddr) -> Result<(), Error> {
    let listener = TcpListener::bind(addr).await?;
    log::info!("Listening on {}", addr);

    axum::serve(listener, Router::new()).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli: Cli = cli::parse_or_usage();

    match client::connect(&cli.kube.kubeconfig).await {
	Some(clientset) => {
	    if let Some(info) = clientset.server_version().await {
		log::info!("Connected to Kubernetes {} ({})", info.git_version, info.platform);
	    }

	    if !cli.skip_list {
		clientset.print_resources(cli.kube.namespace.as_deref(), &cli.kube.kinds).await;
	    }

	    for controller in controllers(&clientset, &cli) {
		log::debug!("Registering {} controller", controller.resource());
		tokio::spawn(controller.run());
	    }
	},
	None => {
	    log::error!("No usable cluster configuration, no controller registered");
	},
    }

    tokio::select! {
	res = serve(cli.listen) => res?,

	// handle CTRL^C as gracefully as we can.
	_ = tokio::signal::ctrl_c() => {},
    }
    Ok(())
}
