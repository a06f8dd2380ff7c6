use reqwest::Method;
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::ApiError;

/// CRUD verbs understood by the PBX API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    Create,
    Update,
    Delete,
}

impl Verb {
    /// HTTP method the verb maps to
    pub fn method(self) -> Method {
        match self {
            Verb::Get => Method::GET,
            Verb::Create => Method::POST,
            Verb::Update => Method::PUT,
            Verb::Delete => Method::DELETE,
        }
    }

    /// Verbs that send a JSON body, and with it the reload flag
    pub fn has_body(self) -> bool {
        matches!(self, Verb::Create | Verb::Update)
    }

    /// Prefix the verb uses in conventional operation names
    pub fn prefix(self) -> &'static str {
        match self {
            Verb::Get => "get",
            Verb::Create => "create",
            Verb::Update => "update",
            Verb::Delete => "delete",
        }
    }

    const ALL: [Verb; 4] = [Verb::Get, Verb::Create, Verb::Update, Verb::Delete];
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// A `(verb, resource)` pair resolved from a conventional operation name
/// such as `get_extensions` or `delete_ringgroups`.
///
/// Resource names stay plain strings, so resource types added to the PBX
/// work without any change here. Names outside the four verb prefixes
/// fail with [`ApiError::UnknownOperation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub verb: Verb,
    pub resource: String,
}

impl FromStr for Operation {
    type Err = ApiError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        for verb in Verb::ALL {
            if let Some(resource) = name
                .strip_prefix(verb.prefix())
                .and_then(|rest| rest.strip_prefix('_'))
            {
                if !resource.is_empty() {
                    return Ok(Operation {
                        verb,
                        resource: resource.to_string(),
                    });
                }
            }
        }
        Err(ApiError::UnknownOperation {
            name: name.to_string(),
        })
    }
}

/// Per-request envelope: an optional id path segment, an optional JSON
/// payload, query parameters, and whether the PBX should apply the
/// configuration change immediately (the reload signal, on by default).
///
/// Built fresh for every call and consumed by
/// [`Session::request`](crate::session::Session::request).
#[derive(Debug, Clone)]
pub struct Call {
    pub(crate) id: Option<String>,
    pub(crate) data: Option<Map<String, Value>>,
    pub(crate) query: Vec<(String, String)>,
    pub(crate) reload: bool,
}

impl Default for Call {
    fn default() -> Self {
        Call {
            id: None,
            data: None,
            query: Vec::new(),
            reload: true,
        }
    }
}

impl Call {
    /// Create an empty call envelope with the reload signal on
    pub fn new() -> Self {
        Self::default()
    }

    /// Address a single record by id
    pub fn id(mut self, id: impl ToString) -> Self {
        self.id = Some(id.to_string());
        self
    }

    /// Address several records at once; the ids collapse into one comma
    /// separated path segment. An empty list addresses the collection.
    pub fn ids<I, T>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        let joined = ids
            .into_iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        self.id = if joined.is_empty() { None } else { Some(joined) };
        self
    }

    /// JSON payload for create/update calls. The map is copied here; the
    /// caller's original is never touched when the reload flag is merged.
    pub fn data(mut self, data: &Map<String, Value>) -> Self {
        self.data = Some(data.clone());
        self
    }

    /// Restrict the fields the server returns; joined into a single
    /// comma separated `fields` query parameter
    pub fn fields<I, T>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        let joined = fields
            .into_iter()
            .map(|field| field.to_string())
            .collect::<Vec<_>>()
            .join(",");
        if !joined.is_empty() {
            self.query.push(("fields".to_string(), joined));
        }
        self
    }

    /// Add an extra query parameter
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Control the PBX-side reload signal (on by default)
    pub fn reload(mut self, reload: bool) -> Self {
        self.reload = reload;
        self
    }

    /// Resolve the request path for a resource, appending the id segment
    /// when one is set. An empty id addresses the collection.
    pub(crate) fn path(&self, resource: &str) -> String {
        match self.id.as_deref() {
            Some(id) if !id.is_empty() => format!("{}/{}", resource, id),
            _ => resource.to_string(),
        }
    }

    /// Body to send for the given verb. Body-carrying verbs get a copy of
    /// the payload with `"reload": "true"` merged in when the flag is on;
    /// other verbs send no body regardless of the flag.
    pub(crate) fn body_for(&self, verb: Verb) -> Option<Map<String, Value>> {
        if !verb.has_body() {
            return None;
        }
        let mut body = self.data.clone().unwrap_or_default();
        if self.reload {
            body.insert("reload".to_string(), Value::String("true".to_string()));
        }
        Some(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_operation_parses_all_verb_prefixes() {
        let cases = [
            ("get_extensions", Verb::Get, "extensions"),
            ("create_ringgroups", Verb::Create, "ringgroups"),
            ("update_trunks", Verb::Update, "trunks"),
            ("delete_inboundroutes", Verb::Delete, "inboundroutes"),
        ];

        for (name, verb, resource) in cases {
            let op: Operation = name.parse().expect(name);
            assert_eq!(op.verb, verb);
            assert_eq!(op.resource, resource);
        }
    }

    #[test]
    fn test_operation_rejects_unknown_names() {
        for name in ["foo_bar", "get", "getextensions", "update_", "patch_extensions"] {
            match name.parse::<Operation>() {
                Err(ApiError::UnknownOperation { name: offender }) => {
                    assert_eq!(offender, name)
                }
                other => panic!("expected UnknownOperation for {:?}, got {:?}", name, other),
            }
        }
    }

    #[test]
    fn test_verb_method_mapping() {
        assert_eq!(Verb::Get.method(), Method::GET);
        assert_eq!(Verb::Create.method(), Method::POST);
        assert_eq!(Verb::Update.method(), Method::PUT);
        assert_eq!(Verb::Delete.method(), Method::DELETE);
        assert!(Verb::Create.has_body());
        assert!(Verb::Update.has_body());
        assert!(!Verb::Get.has_body());
        assert!(!Verb::Delete.has_body());
    }

    #[test]
    fn test_body_merges_reload_without_touching_input() {
        let data = json!({"name": "Test"});
        let original = data.as_object().unwrap().clone();

        let call = Call::new().data(&original);
        let body = call.body_for(Verb::Create).unwrap();

        assert_eq!(body.get("name"), Some(&json!("Test")));
        assert_eq!(body.get("reload"), Some(&json!("true")));
        assert!(!original.contains_key("reload"));
    }

    #[test]
    fn test_body_respects_reload_off() {
        let data = json!({"name": "Test"});
        let call = Call::new().data(data.as_object().unwrap()).reload(false);
        let body = call.body_for(Verb::Update).unwrap();

        assert!(!body.contains_key("reload"));
    }

    #[test]
    fn test_no_body_for_get_and_delete() {
        let data = json!({"name": "Test"});
        let call = Call::new().data(data.as_object().unwrap());

        assert_eq!(call.body_for(Verb::Get), None);
        assert_eq!(call.body_for(Verb::Delete), None);
    }

    #[test]
    fn test_ids_collapse_into_compound_segment() {
        let call = Call::new().ids(["100", "101"]);
        assert_eq!(call.path("extensions"), "extensions/100,101");
    }

    #[test]
    fn test_empty_ids_address_the_collection() {
        let call = Call::new().ids(Vec::<String>::new());
        assert_eq!(call.path("extensions"), "extensions");

        let call = Call::new().id("");
        assert_eq!(call.path("extensions"), "extensions");
    }

    #[test]
    fn test_numeric_ids() {
        let call = Call::new().id(2000);
        assert_eq!(call.path("extensions"), "extensions/2000");

        let call = Call::new().ids([100u32, 101]);
        assert_eq!(call.path("extensions"), "extensions/100,101");
    }

    #[test]
    fn test_fields_join_into_one_parameter() {
        let call = Call::new().fields(["name", "extension"]);
        assert_eq!(
            call.query,
            vec![("fields".to_string(), "name,extension".to_string())]
        );

        let call = Call::new().fields(Vec::<String>::new());
        assert!(call.query.is_empty());
    }
}
