use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Connection status of a WhatsApp instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceStatus {
    Disconnected,
    Connecting,
    AwaitingQr,
    Connected,
    Error,
}

impl InstanceStatus {
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s {
            "disconnected" => Ok(InstanceStatus::Disconnected),
            "connecting" => Ok(InstanceStatus::Connecting),
            "awaiting_qr" => Ok(InstanceStatus::AwaitingQr),
            "connected" => Ok(InstanceStatus::Connected),
            "error" => Ok(InstanceStatus::Error),
            _ => Err(format!("Unknown instance status: {}", s)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InstanceStatus::Disconnected => "disconnected",
            InstanceStatus::Connecting => "connecting",
            InstanceStatus::AwaitingQr => "awaiting_qr",
            InstanceStatus::Connected => "connected",
            InstanceStatus::Error => "error",
        }
    }
}

/// Trigger reported by the messaging API (or by the user for `Connect`/`Disconnect`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InstanceEvent {
    Connect,
    QrIssued { qr_code: String },
    ScanConfirmed { phone_number: Option<String> },
    Disconnect,
    Fail { reason: String },
}

impl InstanceEvent {
    pub fn name(&self) -> &'static str {
        match self {
            InstanceEvent::Connect => "connect",
            InstanceEvent::QrIssued { .. } => "qr_issued",
            InstanceEvent::ScanConfirmed { .. } => "scan_confirmed",
            InstanceEvent::Disconnect => "disconnect",
            InstanceEvent::Fail { .. } => "fail",
        }
    }
}

/// Status reached from `status` on `event`, or an error for an invalid pair.
pub fn next_status(status: InstanceStatus, event: &InstanceEvent) -> Result<InstanceStatus, String> {
    use InstanceStatus::*;
    match (status, event) {
        (_, InstanceEvent::Disconnect) => Ok(Disconnected),
        (_, InstanceEvent::Fail { .. }) => Ok(Error),
        (Disconnected | Error, InstanceEvent::Connect) => Ok(Connecting),
        // A QR refresh keeps the instance waiting
        (Connecting | AwaitingQr, InstanceEvent::QrIssued { .. }) => Ok(AwaitingQr),
        (Connecting | AwaitingQr, InstanceEvent::ScanConfirmed { .. }) => Ok(Connected),
        (s, e) => Err(format!(
            "Event '{}' is not valid in status '{}'",
            e.name(),
            s.as_str()
        )),
    }
}

/// WhatsApp number connected to the CRM through the external messaging API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhatsappInstance {
    pub id: Uuid,
    pub name: String,
    pub user_id: String,
    pub status: InstanceStatus,
    /// Present only while `AwaitingQr`
    pub qr_code: Option<String>,
    pub phone_number: Option<String>,
    pub last_error: Option<String>,
    pub updated_at: DateTime<Utc>,
    pub version: i32,
}

impl WhatsappInstance {
    pub fn new_for_insert(name: String, user_id: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            user_id,
            status: InstanceStatus::Disconnected,
            qr_code: None,
            phone_number: None,
            last_error: None,
            updated_at: Utc::now(),
            version: 0,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name is required".into());
        }
        if self.user_id.trim().is_empty() {
            return Err("user_id is required".into());
        }
        Ok(())
    }

    pub fn apply(&mut self, event: &InstanceEvent) -> Result<(), String> {
        let next = next_status(self.status, event)?;

        match event {
            InstanceEvent::QrIssued { qr_code } => self.qr_code = Some(qr_code.clone()),
            InstanceEvent::ScanConfirmed { phone_number } => {
                if phone_number.is_some() {
                    self.phone_number = phone_number.clone();
                }
            }
            InstanceEvent::Fail { reason } => self.last_error = Some(reason.clone()),
            InstanceEvent::Connect => self.last_error = None,
            InstanceEvent::Disconnect => {}
        }

        if next != InstanceStatus::AwaitingQr {
            self.qr_code = None;
        }
        self.status = next;
        Ok(())
    }

    pub fn before_write(&mut self) {
        self.version += 1;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance() -> WhatsappInstance {
        WhatsappInstance::new_for_insert("Comercial".into(), "user-1".into())
    }

    #[test]
    fn test_happy_path_connects() {
        let mut inst = instance();
        inst.apply(&InstanceEvent::Connect).unwrap();
        assert_eq!(inst.status, InstanceStatus::Connecting);

        inst.apply(&InstanceEvent::QrIssued {
            qr_code: "qr-1".into(),
        })
        .unwrap();
        assert_eq!(inst.status, InstanceStatus::AwaitingQr);
        assert_eq!(inst.qr_code.as_deref(), Some("qr-1"));

        inst.apply(&InstanceEvent::QrIssued {
            qr_code: "qr-2".into(),
        })
        .unwrap();
        assert_eq!(inst.qr_code.as_deref(), Some("qr-2"));

        inst.apply(&InstanceEvent::ScanConfirmed {
            phone_number: Some("5511999990000".into()),
        })
        .unwrap();
        assert_eq!(inst.status, InstanceStatus::Connected);
        assert_eq!(inst.qr_code, None);
        assert_eq!(inst.phone_number.as_deref(), Some("5511999990000"));
    }

    #[test]
    fn test_invalid_events_are_rejected() {
        let mut inst = instance();
        assert!(inst
            .apply(&InstanceEvent::ScanConfirmed { phone_number: None })
            .is_err());
        assert!(inst
            .apply(&InstanceEvent::QrIssued {
                qr_code: "qr".into()
            })
            .is_err());
        assert_eq!(inst.status, InstanceStatus::Disconnected);

        inst.apply(&InstanceEvent::Connect).unwrap();
        assert!(inst.apply(&InstanceEvent::Connect).is_err());
    }

    #[test]
    fn test_failure_and_recovery() {
        let mut inst = instance();
        inst.apply(&InstanceEvent::Connect).unwrap();
        inst.apply(&InstanceEvent::Fail {
            reason: "timeout".into(),
        })
        .unwrap();
        assert_eq!(inst.status, InstanceStatus::Error);
        assert_eq!(inst.last_error.as_deref(), Some("timeout"));

        inst.apply(&InstanceEvent::Connect).unwrap();
        assert_eq!(inst.status, InstanceStatus::Connecting);
        assert_eq!(inst.last_error, None);
    }

    #[test]
    fn test_disconnect_from_any_status() {
        for status in [
            InstanceStatus::Disconnected,
            InstanceStatus::Connecting,
            InstanceStatus::AwaitingQr,
            InstanceStatus::Connected,
            InstanceStatus::Error,
        ] {
            assert_eq!(
                next_status(status, &InstanceEvent::Disconnect),
                Ok(InstanceStatus::Disconnected)
            );
        }
    }

    #[test]
    fn test_event_deserializes_from_tagged_json() {
        let event: InstanceEvent =
            serde_json::from_str(r#"{"type":"qr_issued","qr_code":"abc"}"#).unwrap();
        assert_eq!(
            event,
            InstanceEvent::QrIssued {
                qr_code: "abc".into()
            }
        );
    }
}
