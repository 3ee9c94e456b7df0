use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

/// Provides some conveniences for querying a `kube-rs` object.
pub trait CrdExt {
    /// Returns this objects `ObjectMeta` information (i.e. the `metadata` field). You implement
    /// this be returning `&self.metadata`. This allows the rest of this trait's functions to be
    /// implemented for you.
    fn object_meta(&self) -> &ObjectMeta;

    /// Returns the object.metadata.name field, unwrapping a potential `None` with `""`. This is
    /// named `object_name` to avoid confusion with `ResourceExt`.
    fn object_name(&self) -> &str {
        self.object_meta().name.as_deref().unwrap_or("")
    }

    /// Returns the object.metadata.namespace field, or `None` for objects that have not been
    /// assigned one yet.
    fn object_namespace(&self) -> Option<&str> {
        self.object_meta().namespace.as_deref()
    }

    /// Returns this object's YAML representation as a String.
    fn to_yaml(&self) -> Result<String, serde_yaml::Error>;

    /// Has someone requested that the object be deleted.
    fn is_delete_requested(&self) -> bool {
        self.object_meta().deletion_timestamp.is_some()
    }
}
