use clap::Parser;
use kubewatch_api::ResourceKind;
use std::ffi::OsString;
use std::path::PathBuf;

pub const DEFAULT_KUBECONFIG: &str = "./kubeconfig";

/*
 * Flags shared by every kubewatch binary.
 */
#[derive(clap::Args, Debug, Clone)]
pub struct KubeconfigArgs {

    /// absolute path to the kubeconfig file
    #[arg(long, default_value = DEFAULT_KUBECONFIG)]
    pub kubeconfig: PathBuf,

    /// restrict namespaced resources to this namespace (default: all namespaces)
    #[arg(long, short = 'n')]
    pub namespace: Option<String>,

    /// comma separated resource kinds to handle
    #[arg(long, value_delimiter = ',', default_values_t = ResourceKind::ALL)]
    pub kinds: Vec<ResourceKind>,
}

impl KubeconfigArgs {

    pub fn wants(&self, kind: ResourceKind) -> bool {
	self.kinds.contains(&kind)
    }
}

/*
 * Accepts the single dash spelling of the kubeconfig flag
 * (`-kubeconfig <path>`, `-kubeconfig=<path>`) by rewriting it to its
 * long form. Everything else is left untouched.
 */
pub fn normalize_args<I, A>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = A>,
    A: Into<OsString>,
{
    args.into_iter()
	.map(Into::into)
	.map(|arg| {
	    let long = match arg.to_str() {
		Some(flag) if flag == "-kubeconfig" || flag.starts_with("-kubeconfig=") => Some(format!("-{}", flag)),
		_ => None,
	    };
	    long.map(OsString::from).unwrap_or(arg)
	})
	.collect()
}

/*
 * Parses the command line, except when the program was run without any
 * argument at all: then the usage is printed and the process exits.
 */
pub fn parse_or_usage<T: Parser>() -> T {
    if std::env::args_os().len() <= 1 {
	let mut cmd = T::command();
	if let Err(err) = cmd.print_help() {
	    log::error!("Unable to print usage: {}", err);
	}
	std::process::exit(0);
    }

    T::parse_from(normalize_args(std::env::args_os()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Parser, Debug)]
    struct TestCli {
	#[command(flatten)]
	kube: KubeconfigArgs,
    }

    #[test]
    fn defaults_to_local_kubeconfig_and_every_kind() {
	let cli = TestCli::try_parse_from(["test", "-n", "default"]).unwrap();

	assert_eq!(cli.kube.kubeconfig, PathBuf::from("./kubeconfig"));
	assert_eq!(cli.kube.namespace.as_deref(), Some("default"));
	assert_eq!(cli.kube.kinds, ResourceKind::ALL.to_vec());
    }

    #[test]
    fn kinds_are_comma_separated() {
	let cli = TestCli::try_parse_from(["test", "--kinds", "pods,Service"]).unwrap();

	assert!(cli.kube.wants(ResourceKind::Pod));
	assert!(cli.kube.wants(ResourceKind::Service));
	assert!(!cli.kube.wants(ResourceKind::Node));
    }

    #[test]
    fn single_dash_kubeconfig_is_accepted() {
	let cli = TestCli::try_parse_from(normalize_args(["test", "-kubeconfig", "/tmp/kc"])).unwrap();
	assert_eq!(cli.kube.kubeconfig, PathBuf::from("/tmp/kc"));

	let cli = TestCli::try_parse_from(normalize_args(["test", "-kubeconfig=/tmp/other"])).unwrap();
	assert_eq!(cli.kube.kubeconfig, PathBuf::from("/tmp/other"));
    }

    #[test]
    fn normalize_leaves_other_arguments_alone() {
	let args = normalize_args(["test", "--kubeconfig", "-kubeconfig.yaml", "-n", "default"]);
	assert_eq!(args, vec!["test", "--kubeconfig", "-kubeconfig.yaml", "-n", "default"]);
    }

    #[test]
    fn unknown_kind_is_rejected() {
	assert!(TestCli::try_parse_from(["test", "--kinds", "deployments"]).is_err());
    }
}
