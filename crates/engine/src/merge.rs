//! Layered request resolution.
//!
//! The base config supplied at session creation and the per-trigger override
//! are resolved independently, then combined field by field:
//!
//! - `url`: a non-empty override wins, otherwise the base, otherwise `""`
//! - `params`/`headers`: shallow merge, override keys replace base keys
//! - `body`: two mappings merge shallowly; any other defined override
//!   (including an explicit `null`) replaces the base
//!
//! The matching `transformRequest*` hook, when configured, runs on the merged
//! value and its return value becomes the resolved field.

use indexmap::IndexMap;
use refetch_types::{FieldValue, Headers, HttpMethod, Params, RequestConfig, TriggerArgs, resolve_field};
use serde_json::Value;

use crate::{
    error::{FetchError, HookStage},
    hooks::{Transforms, apply_hook},
};

/// Concrete request fields produced by merging and resolution.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResolvedRequest {
    pub url: String,
    pub method: HttpMethod,
    pub params: Params,
    /// `None` when neither layer declared a body.
    pub body: Option<Value>,
    pub headers: Headers,
}

/// Resolve and merge `base` with `overrides`, applying field transforms.
pub fn resolve_request(base: &RequestConfig, overrides: &TriggerArgs, transforms: &Transforms) -> Result<ResolvedRequest, FetchError> {
    let url = merge_url(base.url.as_ref(), overrides.url.as_ref());
    let url = apply_hook(transforms.request_url.as_ref(), HookStage::RequestUrl, url)?;

    let params = merge_mapping(base.params.as_ref(), overrides.params.as_ref());
    let params = apply_hook(transforms.request_params.as_ref(), HookStage::RequestParams, params)?;

    let body = merge_body(base.body.as_ref(), overrides.body.as_ref());
    let body = apply_hook(transforms.request_body.as_ref(), HookStage::RequestBody, body)?;

    let headers = merge_mapping(base.headers.as_ref(), overrides.headers.as_ref());
    let headers = apply_hook(transforms.request_headers.as_ref(), HookStage::RequestHeaders, headers)?;

    Ok(ResolvedRequest {
        url,
        method: overrides.method.or(base.method).unwrap_or_default(),
        params,
        body,
        headers,
    })
}

/// Pick the override URL when it resolves to a non-empty string.
pub fn merge_url(base: Option<&FieldValue<String>>, overrides: Option<&FieldValue<String>>) -> String {
    resolve_field(overrides)
        .filter(|url| !url.is_empty())
        .or_else(|| resolve_field(base))
        .unwrap_or_default()
}

/// Spread the override mapping on top of the base mapping.
pub fn merge_mapping<V: Clone>(
    base: Option<&FieldValue<IndexMap<String, V>>>,
    overrides: Option<&FieldValue<IndexMap<String, V>>>,
) -> IndexMap<String, V> {
    let mut merged = resolve_field(base).unwrap_or_default();
    if let Some(overrides) = resolve_field(overrides) {
        merged.extend(overrides);
    }
    merged
}

/// Combine body declarations. Absence falls back to the base; `null` does not.
pub fn merge_body(base: Option<&FieldValue<Value>>, overrides: Option<&FieldValue<Value>>) -> Option<Value> {
    match (resolve_field(base), resolve_field(overrides)) {
        (Some(Value::Object(mut base)), Some(Value::Object(overrides))) => {
            base.extend(overrides);
            Some(Value::Object(base))
        }
        (_, Some(overrides)) => Some(overrides),
        (base, None) => base,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use serde_json::json;

    fn params(value: Value) -> Params {
        serde_json::from_value(value).expect("object literal")
    }

    #[test]
    fn absent_override_is_identity() {
        let base = RequestConfig::new()
            .url("https://api.test/items")
            .method(HttpMethod::Post)
            .params(params(json!({"page": 1})))
            .body(json!({"name": "apple"}))
            .header("accept", "application/json");

        let resolved = resolve_request(&base, &TriggerArgs::default(), &Transforms::default()).expect("resolves");
        assert_eq!(resolved.url, "https://api.test/items");
        assert_eq!(resolved.method, HttpMethod::Post);
        assert_eq!(resolved.params, params(json!({"page": 1})));
        assert_eq!(resolved.body, Some(json!({"name": "apple"})));
        assert_eq!(resolved.headers.get("accept").map(String::as_str), Some("application/json"));
    }

    #[test]
    fn override_keys_take_precedence() {
        let base = FieldValue::literal(params(json!({"a": 1})));
        let overrides = FieldValue::literal(params(json!({"a": 2, "b": 3})));
        let merged = merge_mapping(Some(&base), Some(&overrides));
        assert_eq!(merged, params(json!({"a": 2, "b": 3})));
        assert_eq!(merged.keys().collect::<Vec<_>>(), ["a", "b"]);
    }

    #[test]
    fn url_falls_back_to_base_unless_override_is_non_empty() {
        let base = FieldValue::literal("https://a.test".to_string());
        let empty = FieldValue::literal(String::new());
        let other = FieldValue::literal("https://b.test".to_string());

        assert_eq!(merge_url(Some(&base), Some(&empty)), "https://a.test");
        assert_eq!(merge_url(Some(&base), None), "https://a.test");
        assert_eq!(merge_url(Some(&base), Some(&other)), "https://b.test");
        assert_eq!(merge_url(None, None), "");
    }

    #[test]
    fn producers_resolve_for_every_field() {
        let base = RequestConfig::new()
            .url_with(|| "https://live.test".to_string())
            .params_with(|| params(json!({"q": "x"})))
            .body_with(|| json!(42))
            .headers_with(|| Headers::from([("x-id".to_string(), "7".to_string())]));

        let resolved = resolve_request(&base, &TriggerArgs::default(), &Transforms::default()).expect("resolves");
        assert_eq!(resolved.url, "https://live.test");
        assert_eq!(resolved.params, params(json!({"q": "x"})));
        assert_eq!(resolved.body, Some(json!(42)));
        assert_eq!(resolved.headers.get("x-id").map(String::as_str), Some("7"));
    }

    #[test]
    fn bodies_merge_or_replace_by_shape() {
        let base = FieldValue::literal(json!({"a": 1, "b": 1}));
        let mapping = FieldValue::literal(json!({"b": 2}));
        let scalar = FieldValue::literal(json!("raw"));
        let null = FieldValue::literal(Value::Null);

        assert_eq!(merge_body(Some(&base), Some(&mapping)), Some(json!({"a": 1, "b": 2})));
        assert_eq!(merge_body(Some(&base), Some(&scalar)), Some(json!("raw")));
        assert_eq!(merge_body(Some(&base), Some(&null)), Some(Value::Null));
        assert_eq!(merge_body(Some(&scalar), None), Some(json!("raw")));
        assert_eq!(merge_body(None, None), None);
    }

    #[test]
    fn override_method_replaces_base_and_defaults_to_get() {
        let base = RequestConfig::new().url("https://a.test");
        let resolved = resolve_request(&base, &TriggerArgs::default(), &Transforms::default()).expect("resolves");
        assert_eq!(resolved.method, HttpMethod::Get);

        let overrides = TriggerArgs::new().method(HttpMethod::Delete);
        let resolved = resolve_request(&base.method(HttpMethod::Put), &overrides, &Transforms::default()).expect("resolves");
        assert_eq!(resolved.method, HttpMethod::Delete);
    }

    #[test]
    fn transforms_run_on_merged_values() {
        let base = RequestConfig::new().url("https://a.test").param("a", 1);
        let overrides = TriggerArgs::new().param("b", 2);
        let transforms = Transforms::new()
            .request_url(|url| Ok(format!("{url}/v2")))
            .request_params(|mut params| {
                params.insert("merged".into(), Value::Bool(params.len() == 2));
                Ok(params)
            })
            .request_body(|body| Ok(body.or(Some(json!({"default": true})))));

        let resolved = resolve_request(&base, &overrides, &transforms).expect("resolves");
        assert_eq!(resolved.url, "https://a.test/v2");
        assert_eq!(resolved.params.get("merged"), Some(&Value::Bool(true)));
        assert_eq!(resolved.body, Some(json!({"default": true})));
    }

    #[test]
    fn failing_transform_names_its_stage() {
        let transforms = Transforms::new().request_headers(|_| Err(anyhow!("no credentials")));
        let error = resolve_request(&RequestConfig::new(), &TriggerArgs::default(), &transforms).expect_err("hook fails");
        assert_eq!(error.hook_stage(), Some(HookStage::RequestHeaders));
    }
}
