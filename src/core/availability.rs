use crate::config::AvailabilityQuery;
use crate::domain::model::{DesiredProviderSet, ProviderRecord};
use crate::utils::error::{AlertError, Result};
use serde_json::Value;

/// Picks the providers that are open and wanted out of one API response.
///
/// Stage one keeps records whose availability field equals the configured value,
/// stage two keeps those whose identifier is in `desired`. Source order is preserved.
/// Pure: the same response always yields the same list.
pub fn find_matches(
    response: &Value,
    query: &AvailabilityQuery,
    desired: &DesiredProviderSet,
) -> Result<Vec<ProviderRecord>> {
    let entries = provider_entries(response, &query.list_field)?;
    let sentinel = Value::String(query.available_value.clone());
    let mut matches = Vec::new();

    for (index, entry) in entries.iter().enumerate() {
        let record = entry.as_object().ok_or_else(|| {
            AlertError::parse(format!("{}[{}] is not an object", query.list_field, index))
        })?;

        let availability = record.get(&query.availability_field).ok_or_else(|| {
            AlertError::parse(format!(
                "{}[{}] has no '{}' field",
                query.list_field, index, query.availability_field
            ))
        })?;
        if *availability != sentinel {
            continue;
        }

        let raw_id = record.get(&query.id_field).ok_or_else(|| {
            AlertError::parse(format!(
                "{}[{}] has no '{}' field",
                query.list_field, index, query.id_field
            ))
        })?;
        // 非整數的 id 不可能在清單內，直接略過
        let id = match raw_id.as_i64() {
            Some(id) if desired.contains(id) => id,
            _ => continue,
        };

        let name = record
            .get(&query.name_field)
            .and_then(Value::as_str)
            .ok_or_else(|| {
                AlertError::parse(format!(
                    "{}[{}] has no string '{}' field",
                    query.list_field, index, query.name_field
                ))
            })?;

        matches.push(ProviderRecord {
            id,
            name: name.to_string(),
            availability: query.available_value.clone(),
            fields: record.clone(),
        });
    }

    Ok(matches)
}

fn provider_entries<'a>(response: &'a Value, list_field: &str) -> Result<&'a Vec<Value>> {
    let root = response
        .as_object()
        .ok_or_else(|| AlertError::parse("top level of the response is not a JSON object"))?;

    root.get(list_field)
        .ok_or_else(|| AlertError::parse(format!("response has no '{}' key", list_field)))?
        .as_array()
        .ok_or_else(|| AlertError::parse(format!("'{}' is not an array", list_field)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn query() -> AvailabilityQuery {
        AvailabilityQuery::new("http://localhost/api/list-providers")
    }

    fn desired() -> DesiredProviderSet {
        DesiredProviderSet::from(vec![1000, 1004, 1019])
    }

    #[test]
    fn test_unavailable_provider_is_not_matched() {
        let response = json!({
            "providerList": [
                {"providerId": 1000, "providerName": "Javits Center", "availableAppointments": "N"}
            ]
        });

        let matches = find_matches(&response, &query(), &desired()).unwrap();
        assert!(matches.is_empty());
    }

    #[test]
    fn test_available_and_desired_provider_is_matched() {
        let response = json!({
            "providerList": [
                {
                    "providerId": 1004,
                    "providerName": "Westchester County Center",
                    "vaccineBrand": "Pfizer",
                    "address": "White Plains, NY",
                    "availableAppointments": "Y"
                }
            ],
            "lastUpdated": "3/18/2021, 6:07:59 PM"
        });

        let matches = find_matches(&response, &query(), &desired()).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].id, 1004);
        assert_eq!(matches[0].name, "Westchester County Center");
        assert_eq!(matches[0].availability, "Y");
        assert_eq!(matches[0].fields["address"], "White Plains, NY");
    }

    #[test]
    fn test_available_but_undesired_provider_is_excluded() {
        let response = json!({
            "providerList": [
                {"providerId": 1003, "providerName": "SUNY Albany", "availableAppointments": "Y"},
                {"providerId": 1019, "providerName": "Javits Center - Night", "availableAppointments": "Y"}
            ]
        });

        let matches = find_matches(&response, &query(), &desired()).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].id, 1019);
    }

    #[test]
    fn test_matches_keep_response_order() {
        let response = json!({
            "providerList": [
                {"providerId": 1019, "providerName": "C", "availableAppointments": "Y"},
                {"providerId": 1000, "providerName": "A", "availableAppointments": "Y"},
                {"providerId": 1004, "providerName": "B", "availableAppointments": "N"}
            ]
        });

        let matches = find_matches(&response, &query(), &desired()).unwrap();
        let ids: Vec<i64> = matches.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1019, 1000]);
    }

    #[test]
    fn test_legacy_sentinel_values() {
        let mut query = query();
        query.available_value = "AA".to_string();

        let response = json!({
            "providerList": [
                {"providerId": 1000, "providerName": "Javits Center - 8:00am", "availableAppointments": "NAC"},
                {"providerId": 1019, "providerName": "Javits Center - 9:00pm", "availableAppointments": "AA"},
                {"providerId": 1004, "providerName": "Westchester County Center", "availableAppointments": "Y"}
            ]
        });

        let matches = find_matches(&response, &query, &desired()).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].name, "Javits Center - 9:00pm");
    }

    #[test]
    fn test_non_string_availability_does_not_match() {
        let response = json!({
            "providerList": [
                {"providerId": 1000, "providerName": "Javits Center", "availableAppointments": true}
            ]
        });

        let matches = find_matches(&response, &query(), &desired()).unwrap();
        assert!(matches.is_empty());
    }

    #[test]
    fn test_same_response_gives_same_matches() {
        let response = json!({
            "providerList": [
                {"providerId": 1000, "providerName": "Javits Center", "availableAppointments": "Y"},
                {"providerId": 1004, "providerName": "Westchester County Center", "availableAppointments": "Y"}
            ]
        });

        let first = find_matches(&response, &query(), &desired()).unwrap();
        let second = find_matches(&response, &query(), &desired()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_list_key_is_parse_failure() {
        let response = json!({"providers": []});
        let err = find_matches(&response, &query(), &desired()).unwrap_err();
        assert!(matches!(err, AlertError::Parse { .. }));
        assert!(err.to_string().contains("providerList"));
    }

    #[test]
    fn test_non_object_response_is_parse_failure() {
        let response = json!([{"providerId": 1000}]);
        let err = find_matches(&response, &query(), &desired()).unwrap_err();
        assert!(matches!(err, AlertError::Parse { .. }));
    }

    #[test]
    fn test_record_without_availability_field_is_parse_failure() {
        let response = json!({
            "providerList": [
                {"providerId": 1000, "providerName": "Javits Center"}
            ]
        });

        let err = find_matches(&response, &query(), &desired()).unwrap_err();
        assert!(err.to_string().contains("availableAppointments"));
    }

    #[test]
    fn test_matched_record_without_name_is_parse_failure() {
        let response = json!({
            "providerList": [
                {"providerId": 1000, "availableAppointments": "Y"}
            ]
        });

        let err = find_matches(&response, &query(), &desired()).unwrap_err();
        assert!(err.to_string().contains("providerName"));
    }

    #[test]
    fn test_non_integer_id_is_skipped_not_fatal() {
        let response = json!({
            "providerList": [
                {"providerId": "popup-1", "providerName": "Pop-up Site", "availableAppointments": "Y"},
                {"providerId": 1004, "providerName": "Westchester County Center", "availableAppointments": "Y"}
            ]
        });

        let matches = find_matches(&response, &query(), &DesiredProviderSet::from(vec![1004])).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].name, "Westchester County Center");
    }

    #[test]
    fn test_available_record_without_id_is_parse_failure() {
        let response = json!({
            "providerList": [
                {"providerName": "Mystery Site", "availableAppointments": "Y"}
            ]
        });

        let err = find_matches(&response, &query(), &desired()).unwrap_err();
        assert!(matches!(err, AlertError::Parse { .. }));
        assert!(err.to_string().contains("providerId"));
    }

    #[test]
    fn test_empty_provider_list() {
        let response = json!({"providerList": [], "lastUpdated": "2/28/2021, 7:03:48 AM"});
        let matches = find_matches(&response, &query(), &desired()).unwrap();
        assert!(matches.is_empty());
    }
}
