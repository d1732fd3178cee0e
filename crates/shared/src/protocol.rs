use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A listing exactly as the listings service sends it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListingRecord {
    /// Empty when the service sent no usable reference.
    #[serde(default, deserialize_with = "string_or_number")]
    pub rif: String,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub agenzia: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub prezzo: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub prezzo_myagency: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<String>,
    #[serde(default, deserialize_with = "strict_true")]
    pub segnaposto: bool,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub comune: Option<String>,
}

/// The two shapes `GET /vetrine` may carry in `data`. Items that are not
/// objects decode to an empty record instead of failing the whole list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListingsPayload {
    #[serde(deserialize_with = "record_list")]
    Flat(Vec<ListingRecord>),
    #[serde(deserialize_with = "record_lists_by_branch")]
    ByBranch(BTreeMap<String, Vec<ListingRecord>>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingsResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ListingsPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub immobile: Option<ListingRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceUpdateRequest {
    pub rif: String,
    pub nuovo_prezzo: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceholderRequest {
    pub rif: String,
    pub placeholder: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn record_from_value(value: Value) -> ListingRecord {
    ListingRecord::deserialize(value).unwrap_or_default()
}

fn record_list<'de, D>(deserializer: D) -> Result<Vec<ListingRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Vec::<Value>::deserialize(deserializer)?
        .into_iter()
        .map(record_from_value)
        .collect())
}

fn record_lists_by_branch<'de, D>(
    deserializer: D,
) -> Result<BTreeMap<String, Vec<ListingRecord>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(BTreeMap::<String, Vec<Value>>::deserialize(deserializer)?
        .into_iter()
        .map(|(branch, items)| (branch, items.into_iter().map(record_from_value).collect()))
        .collect())
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => text,
        Value::Number(number) => number.to_string(),
        _ => String::new(),
    })
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|value| value.is_finite()))
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => Some(text),
        _ => None,
    })
}

// Only a literal JSON `true` marks a placeholder.
fn strict_true<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(matches!(Value::deserialize(deserializer)?, Value::Bool(true)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_flat_payload() {
        let body = r#"{"success":true,"data":[{"rif":"A1","agenzia":"caorle","prezzo":100}]}"#;
        let response: ListingsResponse = serde_json::from_str(body).expect("decode");
        match response.data {
            Some(ListingsPayload::Flat(records)) => {
                assert_eq!(records.len(), 1);
                assert_eq!(records[0].prezzo, Some(100.0));
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[test]
    fn decodes_branch_keyed_payload() {
        let body = r#"{"success":true,"data":{"caorle":[{"rif":"A1"}],"bibione":[]}}"#;
        let response: ListingsResponse = serde_json::from_str(body).expect("decode");
        match response.data {
            Some(ListingsPayload::ByBranch(map)) => {
                assert_eq!(map.len(), 2);
                assert_eq!(map["caorle"][0].rif, "A1");
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[test]
    fn record_fields_are_decoded_leniently() {
        let body = r#"{"rif":4512,"prezzo":"125000","prezzo_myagency":null,"timestamp":17,"segnaposto":"true"}"#;
        let record: ListingRecord = serde_json::from_str(body).expect("decode");
        assert_eq!(record.rif, "4512");
        assert_eq!(record.prezzo, Some(125_000.0));
        assert_eq!(record.prezzo_myagency, None);
        assert_eq!(record.timestamp, None);
        assert!(!record.segnaposto);
    }

    #[test]
    fn malformed_items_do_not_sink_the_list() {
        let body = r#"{"success":true,"data":[{"rif":"A1","prezzo":100},{"agenzia":"caorle","prezzo":5},null,{"rif":"B2","agenzia":7}]}"#;
        let response: ListingsResponse = serde_json::from_str(body).expect("decode");
        let Some(ListingsPayload::Flat(records)) = response.data else {
            panic!("expected flat payload");
        };
        let refs: Vec<&str> = records.iter().map(|r| r.rif.as_str()).collect();
        assert_eq!(refs, ["A1", "", "", "B2"]);
        assert_eq!(records[1].agenzia.as_deref(), Some("caorle"));
        assert_eq!(records[3].agenzia, None);
    }

    #[test]
    fn branch_keyed_items_are_decoded_one_by_one() {
        let body = r#"{"success":true,"data":{"caorle":[{"rif":"A1"},"junk"]}}"#;
        let response: ListingsResponse = serde_json::from_str(body).expect("decode");
        let Some(ListingsPayload::ByBranch(map)) = response.data else {
            panic!("expected branch-keyed payload");
        };
        assert_eq!(map["caorle"].len(), 2);
        assert_eq!(map["caorle"][1].rif, "");
    }

    #[test]
    fn mutation_requests_use_wire_names() {
        let body = serde_json::to_value(PriceUpdateRequest {
            rif: "A1".into(),
            nuovo_prezzo: 95_000.0,
        })
        .expect("encode");
        assert_eq!(body["rif"], "A1");
        assert_eq!(body["nuovo_prezzo"], 95_000.0);
    }
}
