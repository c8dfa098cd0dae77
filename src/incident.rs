//! ServiceNow incident records built from alerts
use serde::Serialize;

use crate::alert::Alert;

pub const CONTACT_TYPE: &str = "Monitoring System";
pub const CALLER_ID: &str = "Prometheus";
pub const IMPACT: &str = "4";
pub const URGENCY: &str = "3";

/// incident submitted to ServiceNow, serialized with the field names of the incident table
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Ticket {
    pub assignment_group: String,
    pub contact_type: String,
    pub caller_id: String,
    pub description: String,
    pub impact: String,
    pub short_description: String,
    pub urgency: String,
}

impl Ticket {
    /// Map an alert onto an incident.
    ///
    /// Never fails: labels or annotations the alert doesn't carry end up as empty fields.
    pub fn from_alert(alert: &Alert) -> Self {
        Self {
            assignment_group: alert.label("assignment_group").to_owned(),
            contact_type: CONTACT_TYPE.to_owned(),
            caller_id: CALLER_ID.to_owned(),
            description: alert.annotation("description").to_owned(),
            impact: IMPACT.to_owned(),
            short_description: alert.annotation("summary").to_owned(),
            urgency: URGENCY.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alert(labels: &[(&str, &str)], annotations: &[(&str, &str)]) -> Alert {
        Alert {
            labels: labels
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            annotations: annotations
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn maps_labels_and_annotations() {
        let alert = alert(
            &[("assignment_group", "G"), ("severity", "critical")],
            &[("summary", "S"), ("description", "D"), ("runbook", "R")],
        );

        assert_eq!(
            Ticket::from_alert(&alert),
            Ticket {
                assignment_group: "G".into(),
                contact_type: "Monitoring System".into(),
                caller_id: "Prometheus".into(),
                description: "D".into(),
                impact: "4".into(),
                short_description: "S".into(),
                urgency: "3".into(),
            }
        );
    }

    #[test]
    fn empty_alert_yields_empty_fields() {
        let ticket = Ticket::from_alert(&Alert::default());

        assert_eq!(ticket.assignment_group, "");
        assert_eq!(ticket.description, "");
        assert_eq!(ticket.short_description, "");
        assert_eq!(ticket.contact_type, CONTACT_TYPE);
        assert_eq!(ticket.caller_id, CALLER_ID);
        assert_eq!(ticket.impact, IMPACT);
        assert_eq!(ticket.urgency, URGENCY);
    }

    #[test]
    fn mapping_is_deterministic() {
        let alert = alert(&[("assignment_group", "db")], &[("summary", "disk full")]);

        let first = serde_json::to_vec(&Ticket::from_alert(&alert)).unwrap();
        let second = serde_json::to_vec(&Ticket::from_alert(&alert)).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn serializes_every_field() {
        let value = serde_json::to_value(Ticket::from_alert(&Alert::default())).unwrap();
        let object = value.as_object().unwrap();

        for key in [
            "assignment_group",
            "contact_type",
            "caller_id",
            "description",
            "impact",
            "short_description",
            "urgency",
        ] {
            assert!(object[key].is_string(), "{} missing", key);
        }
        assert_eq!(object.len(), 7);
    }
}
