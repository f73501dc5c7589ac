use crate::warehouse::bigquery::wire::{WireParam, WireParamType, WireParamValue};
use model::core::value::{QueryParam, Value};

/// Converts a named parameter into its `queryParameters` entry.
///
/// A null carries no value and is typed as `STRING`, which the warehouse
/// coerces where the comparison needs it.
pub fn to_wire_param(param: &QueryParam) -> WireParam {
    let (type_name, value) = match &param.value {
        Value::Int(i) => ("INT64", Some(i.to_string())),
        Value::Float(f) => ("FLOAT64", Some(f.to_string())),
        Value::String(s) => ("STRING", Some(s.clone())),
        Value::Boolean(b) => ("BOOL", Some(b.to_string())),
        Value::Date(d) => ("DATE", Some(d.format("%Y-%m-%d").to_string())),
        Value::Timestamp(ts) => (
            "TIMESTAMP",
            Some(ts.format("%Y-%m-%d %H:%M:%S%.6f+00:00").to_string()),
        ),
        Value::Null => ("STRING", None),
    };

    WireParam {
        name: param.name.clone(),
        parameter_type: WireParamType { type_name },
        parameter_value: WireParamValue { value },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn test_date_param_shape() {
        let param = QueryParam::new(
            "partition_date",
            Value::Date(NaiveDate::from_ymd_opt(2025, 3, 22).unwrap()),
        );
        let wire = serde_json::to_value(to_wire_param(&param)).unwrap();
        assert_eq!(
            wire,
            json!({
                "name": "partition_date",
                "parameterType": {"type": "DATE"},
                "parameterValue": {"value": "2025-03-22"}
            })
        );
    }

    #[test]
    fn test_scalar_params() {
        let ts = Utc.with_ymd_and_hms(2025, 3, 22, 1, 2, 3).unwrap();
        let cases = [
            (Value::Int(7), "INT64", Some("7")),
            (Value::Boolean(true), "BOOL", Some("true")),
            (Value::String("x".into()), "STRING", Some("x")),
            (Value::Timestamp(ts), "TIMESTAMP", Some("2025-03-22 01:02:03.000000+00:00")),
            (Value::Null, "STRING", None),
        ];

        for (value, type_name, expected) in cases {
            let wire = to_wire_param(&QueryParam::new("p", value));
            assert_eq!(wire.parameter_type.type_name, type_name);
            assert_eq!(wire.parameter_value.value.as_deref(), expected);
        }
    }
}
