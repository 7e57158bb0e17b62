/*
 * kubewatch/handler - glue between the kube client and the typed
 * callbacks: client construction, listing, and watch controllers.
 */

pub mod errors;
pub use errors::Error;

pub mod cli;
pub mod client;

pub mod controller;
pub use controller::ResourceController;
pub use controller::ResourceEventHandlerFuncs;
pub use controller::ERROR_LOG_LEVEL;

pub mod clientset;
pub use clientset::Clientset;

pub mod callbacks;
