use crate::resource::ResourceKind;
use crate::resource::ResourceView;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Serializer;

/*
 * Serializes `value` as JSON, one space per indentation level.
 */
pub fn to_indented_json<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b" ");
    let mut ser = Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;

    // serde_json only ever writes valid UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

pub fn banner(kind: &str, nr: Option<usize>) -> String {
    match nr {
	Some(nr) => format!("====> {} nr {} <====", kind, nr),
	None => format!("====> {} <====", kind),
    }
}

pub fn count_line(kind: ResourceKind, count: usize) -> String {
    format!(" -----> There are {} {} in the cluster", count, kind.plural())
}

/*
 * Renders one object: a banner line naming the kind (and its ordinal
 * when it comes from a list), then its metadata and its spec as JSON.
 */
pub fn format_resource<R: ResourceView>(nr: Option<usize>, obj: &R) -> Result<String, serde_json::Error> {
    let kind = R::KIND;
    let meta = to_indented_json(obj.metadata())?;
    let spec = match obj.spec() {
	Some(spec) => to_indented_json(spec)?,
	None => String::from("{}"),
    };

    Ok(format!(
	"{}\n ######## {}'s ObjectMetadata ########\n{}\n ######## {}'s Spec ########\n{}\n",
	banner(kind, nr), kind, meta, kind, spec,
    ))
}

pub fn json_pretty_print<R: ResourceView>(obj: &R) -> Result<(), serde_json::Error> {
    println!("{}", format_resource(None, obj)?);
    Ok(())
}

pub fn print_list<R: ResourceView>(items: &[R]) -> Result<(), serde_json::Error> {
    println!("{}", count_line(R::RESOURCE_KIND, items.len()));

    for (nr, item) in items.iter().enumerate() {
	println!("{}", format_resource(Some(nr), item)?);
    }
    Ok(())
}
