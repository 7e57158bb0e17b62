/*
 * kubewatch/api - the resource kinds kubewatch knows about and the way
 * they are rendered on the console.
 */

pub mod resource;
pub use resource::ResourceKind;
pub use resource::ResourceView;
pub use resource::UnknownKind;

pub mod printer;
pub use printer::format_resource;
pub use printer::json_pretty_print;
pub use printer::print_list;
