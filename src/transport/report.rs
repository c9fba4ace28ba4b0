use serde::Deserialize;
use serde_json::Value;

use super::TransportError;
use super::text::TransportText;
use crate::domain::DeliveryReport;

#[derive(Debug, Clone, Deserialize)]
struct DeliveryJsonRecord {
    #[serde(default)]
    status: Option<TransportText>,
    #[serde(default)]
    sms_id: Option<TransportText>,
    #[serde(default)]
    from: Option<TransportText>,
    #[serde(default)]
    to: Option<TransportText>,
    #[serde(default)]
    custom: Option<TransportText>,
    #[serde(default)]
    sms_date: Option<TransportText>,
    #[serde(default)]
    dlr_date: Option<TransportText>,
}

impl DeliveryJsonRecord {
    fn into_report(self) -> Result<DeliveryReport, &'static str> {
        let required = |value: Option<TransportText>, field: &'static str| {
            value
                .map(TransportText::into_string)
                .filter(|value| !value.is_empty())
                .ok_or(field)
        };
        Ok(DeliveryReport {
            status: required(self.status, "status")?,
            sms_id: required(self.sms_id, "sms_id")?,
            from: required(self.from, "from")?,
            to: required(self.to, "to")?,
            custom: self.custom.map(TransportText::into_string),
            sms_date: self.sms_date.map(TransportText::into_string),
            dlr_date: self.dlr_date.map(TransportText::into_string),
        })
    }
}

/// Decode a delivery-report webhook body (a JSON array of records).
///
/// Each record is checked on its own: records missing `status`, `sms_id`,
/// `from` or `to` are logged and skipped, and the remaining records are
/// returned in order. A body that is not a JSON array is an error.
pub fn decode_delivery_reports(json: &str) -> Result<Vec<DeliveryReport>, TransportError> {
    let body: Value = serde_json::from_str(json)?;
    let Value::Array(records) = body else {
        return Err(TransportError::UnexpectedShape { expected: "array" });
    };

    let reports = records
        .iter()
        .enumerate()
        .filter_map(|(index, record)| {
            let parsed = if record.is_object() {
                DeliveryJsonRecord::deserialize(record).map_err(|err| err.to_string())
            } else {
                Err("record is not an object".to_owned())
            };
            match parsed.and_then(|record| {
                record
                    .into_report()
                    .map_err(|field| format!("missing field `{field}`"))
            }) {
                Ok(report) => Some(report),
                Err(reason) => {
                    tracing::warn!(index, %reason, "skipping malformed delivery report record");
                    None
                }
            }
        })
        .collect();
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_complete_and_minimal_records() {
        let json = r#"
        [
          {
            "status": "DELIVERED",
            "sms_id": "abc",
            "from": "Shop",
            "to": "34666666666",
            "custom": "order-1",
            "sms_date": "2025-01-01 10:00:00",
            "dlr_date": "2025-01-01 10:00:05"
          },
          {"status": "FAILED", "sms_id": 77, "from": "Shop", "to": 34666666667}
        ]
        "#;
        let reports = decode_delivery_reports(json).unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].custom.as_deref(), Some("order-1"));
        assert_eq!(reports[0].dlr_date.as_deref(), Some("2025-01-01 10:00:05"));
        assert_eq!(reports[1].sms_id, "77");
        assert_eq!(reports[1].to, "34666666667");
        assert_eq!(reports[1].custom, None);
        assert_eq!(reports[1].sms_date, None);
    }

    #[test]
    fn malformed_records_are_skipped_individually() {
        let json = r#"
        [
          {"status": "DELIVERED", "sms_id": "1", "from": "Shop", "to": "34666666666"},
          {"status": "DELIVERED", "from": "Shop", "to": "34666666666"},
          "garbage",
          {"status": "DELIVERED", "sms_id": "3", "from": "Shop", "to": "34666666668"}
        ]
        "#;
        let reports = decode_delivery_reports(json).unwrap();
        let ids = reports.iter().map(|r| r.sms_id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, ["1", "3"]);
    }

    #[test]
    fn empty_array_yields_no_reports() {
        assert!(decode_delivery_reports("[]").unwrap().is_empty());
    }

    #[test]
    fn non_array_bodies_are_rejected() {
        assert!(matches!(
            decode_delivery_reports(r#"{"status": "DELIVERED"}"#),
            Err(TransportError::UnexpectedShape { expected: "array" })
        ));
        assert!(matches!(
            decode_delivery_reports("not json"),
            Err(TransportError::Json(_))
        ));
    }
}
