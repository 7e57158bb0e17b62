use kubewatch_handler::cli;
use kubewatch_handler::cli::KubeconfigArgs;
use kubewatch_handler::client;

use clap::Parser;
use log;
use std::time::Duration;

/// List the resources of a cluster and pretty-print them.
#[derive(Parser, Debug)]
#[command(name = "kubelist", version)]
struct Cli {
    #[command(flatten)]
    kube: KubeconfigArgs,

    /// list again every SECS seconds, forever, instead of once
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    interval: Option<u64>,
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli: Cli = cli::parse_or_usage();
    let clientset = match client::connect(&cli.kube.kubeconfig).await {
	Some(clientset) => clientset,
	None => {
	    log::error!("No usable cluster configuration, nothing to list");
	    return;
	}
    };

    if let Some(info) = clientset.server_version().await {
	println!("Kubernetes server version: {} ({})", info.git_version, info.platform);
    }

    loop {
	clientset.print_resources(cli.kube.namespace.as_deref(), &cli.kube.kinds).await;

	match cli.interval {
	    Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
	    None => break,
	}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_must_be_positive() {
	assert!(Cli::try_parse_from(["kubelist", "--interval", "0"]).is_err());

	let cli = Cli::try_parse_from(["kubelist", "--interval", "3"]).unwrap();
	assert_eq!(cli.interval, Some(3));
	assert!(Cli::try_parse_from(["kubelist"]).unwrap().interval.is_none());
    }
}
