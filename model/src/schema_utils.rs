use schemars::gen::SchemaGenerator;
use schemars::schema::{InstanceType, Schema, SchemaObject};
use serde::{Deserialize, Deserializer};

/// Instead of making new struct model fields `Option`s, we can use this function when deserializing
/// to assign the default value. This makes the structs more ergonomic to use, and makes yaml/json
/// representations backward compatible.
pub(crate) fn null_to_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    let opt = Option::deserialize(d)?;
    let val = opt.unwrap_or_default();
    Ok(val)
}

/// Provider specific content is opaque to us. A structural schema cannot describe it, so we mark it
/// as a nullable object whose unknown fields are preserved by the API server.
pub(crate) fn open_object(_: &mut SchemaGenerator) -> Schema {
    let mut schema = SchemaObject {
        instance_type: Some(InstanceType::Object.into()),
        ..Default::default()
    };
    schema.extensions.insert(
        "x-kubernetes-preserve-unknown-fields".to_owned(),
        serde_json::Value::Bool(true),
    );
    schema
        .extensions
        .insert("nullable".to_owned(), serde_json::Value::Bool(true));
    schema.into()
}
