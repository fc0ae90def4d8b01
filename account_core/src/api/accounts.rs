use serde_json::{Map, Value};

/// The content type the user accounts API expects for partial updates.
pub const MERGE_PATCH_CONTENT_TYPE: &str = "application/merge-patch+json";

/// Profile fields to change, e.g. `{"email": "...", "name": "..."}`. Fields
/// that aren't present are left alone by the server.
pub type Patch = Map<String, Value>;
