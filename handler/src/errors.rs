use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {

    /* encapsulate a kube-rust error */
    #[error("kube error: {0}")]
    Kube(#[from] kube::Error),

    #[error("unable to load kubeconfig: {0}")]
    Kubeconfig(#[from] kube::config::KubeconfigError),

    #[error("unable to infer cluster config: {0}")]
    InferConfig(#[from] kube::config::InferConfigError),

    #[error("unable to serialize object: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("handler error: {0}")]
    Handler(String),
}
