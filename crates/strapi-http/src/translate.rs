//! Query translation.
//!
//! The backend exposes two endpoint families with different parameter
//! conventions. A [`QuerySpec`] is translated into bracket-notation
//! query pairs (`filters[title][$eq]=x`) for one of them.
//!
//! | concern    | content API                        | content manager        |
//! |------------|------------------------------------|------------------------|
//! | pagination | `pagination[page]`, `[pageSize]`   | `page`, `pageSize`     |
//! | (other)    | `pagination[start]`, `[limit]`     | `start`, `limit`       |
//! | sort       | `sort[0]=a:asc`, `sort[1]=b:desc`  | `sort=a:asc,b:desc`    |
//!
//! Everything else (filters, populate, fields, locale, status) is encoded
//! the same way for both. Extra keys are appended last, verbatim.

use serde_json::Value;

use strapi_core::query::{Populate, PopulateRelation, QuerySpec, Sort};
use strapi_core::Result;

/// Which endpoint family a query targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApiFamily {
    /// Public content API (`/api/...`).
    Content,
    /// Administrative content manager (`/content-manager/...`).
    ContentManager,
}

/// Ordered query-string pairs.
pub type QueryPairs = Vec<(String, String)>;

/// Translate a query specification for the given endpoint family.
///
/// # Errors
///
/// Returns an error when the specification fails validation (for example,
/// filters supplied as a pre-serialized string).
///
/// # Example
///
/// ```
/// use strapi_core::QuerySpec;
/// use strapi_http::translate::{translate, ApiFamily};
/// use serde_json::json;
///
/// let spec: QuerySpec = serde_json::from_value(json!({
///     "pagination": { "page": 2, "pageSize": 10 },
///     "sort": ["title:asc", "publishedAt:desc"]
/// })).unwrap();
///
/// let pairs = translate(&spec, ApiFamily::ContentManager).unwrap();
/// assert!(pairs.contains(&("page".into(), "2".into())));
/// assert!(pairs.contains(&("sort".into(), "title:asc,publishedAt:desc".into())));
///
/// let pairs = translate(&spec, ApiFamily::Content).unwrap();
/// assert!(pairs.contains(&("pagination[pageSize]".into(), "10".into())));
/// assert!(pairs.contains(&("sort[1]".into(), "publishedAt:desc".into())));
/// ```
pub fn translate(spec: &QuerySpec, family: ApiFamily) -> Result<QueryPairs> {
    spec.validate()?;

    let mut pairs = QueryPairs::new();
    match family {
        ApiFamily::Content => content_params(spec, &mut pairs),
        ApiFamily::ContentManager => content_manager_params(spec, &mut pairs),
    }
    shared_params(spec, &mut pairs);

    for (key, value) in &spec.extra {
        encode_value(key, value, &mut pairs);
    }

    Ok(pairs)
}

fn content_params(spec: &QuerySpec, out: &mut QueryPairs) {
    if let Some(pagination) = &spec.pagination {
        if let Some(page) = pagination.page {
            out.push(("pagination[page]".into(), page.to_string()));
        }
        if let Some(size) = pagination.page_size {
            out.push(("pagination[pageSize]".into(), size.to_string()));
        }
        for (key, value) in &pagination.extra {
            encode_value(&format!("pagination[{}]", key), value, out);
        }
    }

    if let Some(sort) = &spec.sort {
        encode_sort_list("sort", sort, out);
    }
}

fn content_manager_params(spec: &QuerySpec, out: &mut QueryPairs) {
    if let Some(pagination) = &spec.pagination {
        if let Some(page) = pagination.page {
            out.push(("page".into(), page.to_string()));
        }
        if let Some(size) = pagination.page_size {
            out.push(("pageSize".into(), size.to_string()));
        }
        for (key, value) in &pagination.extra {
            encode_value(key, value, out);
        }
    }

    if let Some(sort) = &spec.sort
        && !sort.fields().is_empty()
    {
        let joined = sort
            .fields()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        out.push(("sort".into(), joined));
    }
}

fn shared_params(spec: &QuerySpec, out: &mut QueryPairs) {
    if let Some(filters) = &spec.filters {
        encode_value("filters", filters, out);
    }

    if let Some(populate) = &spec.populate {
        encode_populate("populate", populate, out);
    }

    if let Some(fields) = &spec.fields {
        encode_list("fields", fields, out);
    }

    if let Some(locale) = &spec.locale {
        out.push(("locale".into(), locale.as_param().to_string()));
    }

    if let Some(status) = spec.status.and_then(|s| s.as_param()) {
        out.push(("status".into(), status.to_string()));
    }
}

fn encode_populate(prefix: &str, populate: &Populate, out: &mut QueryPairs) {
    match populate {
        Populate::All => out.push((prefix.to_string(), "*".into())),
        Populate::Fields(names) => encode_list(prefix, names, out),
        Populate::Nested(relations) => {
            for (name, relation) in relations {
                encode_relation(&format!("{}[{}]", prefix, name), relation, out);
            }
        }
    }
}

fn encode_relation(prefix: &str, relation: &PopulateRelation, out: &mut QueryPairs) {
    if relation.is_empty() {
        out.push((prefix.to_string(), "true".into()));
        return;
    }

    if let Some(populate) = &relation.populate {
        encode_populate(&format!("{}[populate]", prefix), populate, out);
    }
    if let Some(fields) = &relation.fields {
        encode_list(&format!("{}[fields]", prefix), fields, out);
    }
    if let Some(sort) = &relation.sort {
        encode_sort_list(&format!("{}[sort]", prefix), sort, out);
    }
    if let Some(filters) = &relation.filters {
        encode_value(&format!("{}[filters]", prefix), filters, out);
    }
    for (key, value) in &relation.extra {
        encode_value(&format!("{}[{}]", prefix, key), value, out);
    }
}

fn encode_sort_list(prefix: &str, sort: &Sort, out: &mut QueryPairs) {
    for (i, field) in sort.fields().iter().enumerate() {
        out.push((format!("{}[{}]", prefix, i), field.to_string()));
    }
}

fn encode_list(prefix: &str, items: &[String], out: &mut QueryPairs) {
    for (i, item) in items.iter().enumerate() {
        out.push((format!("{}[{}]", prefix, i), item.clone()));
    }
}

/// Bracket-encode an arbitrary JSON value under `prefix`.
///
/// Objects and arrays recurse; `null` becomes an empty string.
pub fn encode_value(prefix: &str, value: &Value, out: &mut QueryPairs) {
    match value {
        Value::Object(map) => {
            for (key, nested) in map {
                encode_value(&format!("{}[{}]", prefix, key), nested, out);
            }
        }
        Value::Array(items) => {
            for (i, nested) in items.iter().enumerate() {
                encode_value(&format!("{}[{}]", prefix, i), nested, out);
            }
        }
        Value::String(s) => out.push((prefix.to_string(), s.clone())),
        Value::Null => out.push((prefix.to_string(), String::new())),
        other => out.push((prefix.to_string(), other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn spec(value: Value) -> QuerySpec {
        serde_json::from_value(value).unwrap()
    }

    fn has(pairs: &QueryPairs, key: &str, value: &str) -> bool {
        pairs.iter().any(|(k, v)| k == key && v == value)
    }

    #[test]
    fn filters_are_bracket_encoded() {
        let pairs = translate(
            &spec(json!({
                "filters": {
                    "$or": [
                        { "title": { "$containsi": "rust" } },
                        { "views": { "$gt": 100 } }
                    ],
                    "author": { "name": { "$null": true } }
                }
            })),
            ApiFamily::Content,
        )
        .unwrap();

        assert!(has(&pairs, "filters[$or][0][title][$containsi]", "rust"));
        assert!(has(&pairs, "filters[$or][1][views][$gt]", "100"));
        assert!(has(&pairs, "filters[author][name][$null]", "true"));
        assert!(!pairs.iter().any(|(k, _)| k == "filters"));
    }

    #[test]
    fn string_filters_are_refused() {
        let result = translate(
            &spec(json!({ "filters": "{\"title\":\"x\"}" })),
            ApiFamily::Content,
        );
        assert!(result.is_err());
    }

    #[test]
    fn pagination_differs_by_family() {
        let query = spec(json!({ "pagination": { "page": 3, "pageSize": 25 } }));

        let content = translate(&query, ApiFamily::Content).unwrap();
        assert!(has(&content, "pagination[page]", "3"));
        assert!(has(&content, "pagination[pageSize]", "25"));

        let manager = translate(&query, ApiFamily::ContentManager).unwrap();
        assert!(has(&manager, "page", "3"));
        assert!(has(&manager, "pageSize", "25"));
        assert!(!manager.iter().any(|(k, _)| k.starts_with("pagination")));
    }

    #[test]
    fn offset_pagination_is_forwarded() {
        let query = spec(json!({
            "pagination": { "start": 20, "limit": 10, "withCount": false }
        }));

        let content = translate(&query, ApiFamily::Content).unwrap();
        assert!(has(&content, "pagination[start]", "20"));
        assert!(has(&content, "pagination[limit]", "10"));
        assert!(has(&content, "pagination[withCount]", "false"));

        let manager = translate(&query, ApiFamily::ContentManager).unwrap();
        assert!(has(&manager, "start", "20"));
        assert!(has(&manager, "limit", "10"));
        assert!(has(&manager, "withCount", "false"));
    }

    #[test]
    fn single_sort_term() {
        let query = spec(json!({ "sort": "title" }));
        assert!(has(
            &translate(&query, ApiFamily::Content).unwrap(),
            "sort[0]",
            "title"
        ));
        assert!(has(
            &translate(&query, ApiFamily::ContentManager).unwrap(),
            "sort",
            "title"
        ));
    }

    #[test]
    fn populate_wildcard_and_list() {
        let all = translate(&spec(json!({ "populate": "*" })), ApiFamily::Content).unwrap();
        assert_eq!(all, vec![("populate".to_string(), "*".to_string())]);

        let list = translate(
            &spec(json!({ "populate": ["author", "cover"] })),
            ApiFamily::Content,
        )
        .unwrap();
        assert!(has(&list, "populate[0]", "author"));
        assert!(has(&list, "populate[1]", "cover"));
    }

    #[test]
    fn nested_populate_keeps_depth() {
        let pairs = translate(
            &spec(json!({
                "populate": {
                    "author": {
                        "fields": ["name"],
                        "populate": { "avatar": { "fields": ["url"] } }
                    },
                    "tags": true,
                    "blocks": {
                        "on": { "shared.quote": { "fields": ["body"] } }
                    }
                }
            })),
            ApiFamily::Content,
        )
        .unwrap();

        assert!(has(&pairs, "populate[author][fields][0]", "name"));
        assert!(has(
            &pairs,
            "populate[author][populate][avatar][fields][0]",
            "url"
        ));
        assert!(has(&pairs, "populate[tags]", "true"));
        assert!(has(
            &pairs,
            "populate[blocks][on][shared.quote][fields][0]",
            "body"
        ));
    }

    #[test]
    fn locale_and_status() {
        let pairs = translate(
            &spec(json!({ "locale": "all", "status": "draft" })),
            ApiFamily::ContentManager,
        )
        .unwrap();
        assert!(has(&pairs, "locale", "*"));
        assert!(has(&pairs, "status", "draft"));

        let unfiltered = translate(&spec(json!({ "status": "all" })), ApiFamily::Content).unwrap();
        assert!(unfiltered.is_empty());
    }

    #[test]
    fn extra_keys_come_last() {
        let pairs = translate(
            &spec(json!({
                "fields": ["title"],
                "hasPublishedVersion": true,
                "plugins": { "i18n": { "relatedEntity": null } }
            })),
            ApiFamily::ContentManager,
        )
        .unwrap();

        assert_eq!(pairs[0], ("fields[0]".to_string(), "title".to_string()));
        assert!(has(&pairs, "hasPublishedVersion", "true"));
        assert!(has(&pairs, "plugins[i18n][relatedEntity]", ""));
        let fields_pos = pairs.iter().position(|(k, _)| k == "fields[0]").unwrap();
        let extra_pos = pairs
            .iter()
            .position(|(k, _)| k == "hasPublishedVersion")
            .unwrap();
        assert!(extra_pos > fields_pos);
    }
}
