use crate::clientset::Clientset;
use crate::errors::Error;

use kube::Client as KubeClient;
use kube::Config as KubeConfig;
use kube::config::KubeConfigOptions;
use kube::config::Kubeconfig;
use log;
use std::path::Path;

pub fn read_kubeconfig(path: &Path) -> Result<Kubeconfig, Error> {
    Ok(Kubeconfig::read_from(path)?)
}

/*
 * Builds the client configuration out of a kubeconfig, using its current
 * context.
 */
pub async fn config_from(kubeconfig: Kubeconfig) -> Result<KubeConfig, Error> {
    let options = KubeConfigOptions::default();
    Ok(KubeConfig::from_custom_kubeconfig(kubeconfig, &options).await?)
}

/*
 * Loads the configuration from the kubeconfig at `path`. When there is no
 * such file, the configuration is inferred instead (in-cluster service
 * account, or $KUBECONFIG / ~/.kube/config).
 */
pub async fn build_config(path: &Path) -> Result<KubeConfig, Error> {
    if !path.exists() {
	log::warn!("kubeconfig {} does not exist, inferring cluster configuration", path.display());
	return Ok(KubeConfig::infer().await?);
    }

    config_from(read_kubeconfig(path)?).await
}

/*
 * Creates the Clientset. Failures are logged and give None: callers carry
 * on without a cluster to talk to.
 */
pub async fn connect(path: &Path) -> Option<Clientset> {
    log::info!("The given kubeconfig is: {}", path.display());

    let config = match build_config(path).await {
	Ok(config) => config,
	Err(err) => {
	    log::error!("Error parsing kubeconfig. Error: {}", err);
	    return None;
	}
    };

    match KubeClient::try_from(config) {
	Ok(client) => Some(Clientset::new(client)),
	Err(err) => {
	    log::error!("Error creating Kubernetes client. Error: {}", err);
	    None
	}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KUBECONFIG: &str = "
apiVersion: v1
kind: Config
clusters:
- name: demo
  cluster:
    server: https://127.0.0.1:6443
    insecure-skip-tls-verify: true
contexts:
- name: demo
  context:
    cluster: demo
    user: demo
    namespace: demo-ns
current-context: demo
users:
- name: demo
  user:
    token: not-a-real-token
";

    #[test]
    fn missing_kubeconfig_is_an_error() {
	let err = read_kubeconfig(Path::new("/nonexistent/kubeconfig")).unwrap_err();
	assert!(matches!(err, Error::Kubeconfig(_)));
    }

    #[tokio::test]
    async fn config_follows_the_current_context() {
	let kubeconfig = Kubeconfig::from_yaml(KUBECONFIG).unwrap();
	let config = config_from(kubeconfig).await.unwrap();

	assert_eq!(config.cluster_url.host(), Some("127.0.0.1"));
	assert_eq!(config.cluster_url.port_u16(), Some(6443));
	assert_eq!(config.default_namespace, "demo-ns");
	assert!(config.accept_invalid_certs);
    }
}
