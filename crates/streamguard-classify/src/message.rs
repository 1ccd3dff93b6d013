use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ClassifyError, Result};
use crate::kind::{classify, MessageKind};

/// Sent by the server when a connection opens; names the Lightning node to pay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WelcomeMessage {
    pub ln_uri: String,
}

/// Invoice to pay for a subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    pub invoice: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentReceived {
    pub uuid: String,
    pub exchange: String,
    pub symbol: String,
    /// Paid subscription time, in seconds.
    pub duration: f64,
    pub event: String,
}

/// Remaining-time notice for a running subscription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeWarning {
    pub uuid: String,
    pub warnings: Warnings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warnings {
    pub duration: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unsubscribed {
    pub uuid: String,
    pub event: String,
    pub amount_refunded: f64,
}

/// A classified message.
///
/// Snapshot and data payloads stay untyped here; decode them against a
/// schema to get their concrete shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Welcome(WelcomeMessage),
    Invoice(InvoiceMessage),
    PaymentReceived(PaymentReceived),
    TimeWarning(TimeWarning),
    Unsubscribed(Unsubscribed),
    Snapshot { uuid: String, snapshot: Vec<Value> },
    DataUpdate { uuid: String, data: Vec<Value> },
    Other { uuid: String, body: Value },
}

#[derive(Deserialize)]
struct SnapshotParts {
    uuid: String,
    snapshot: Vec<Value>,
}

#[derive(Deserialize)]
struct DataParts {
    uuid: String,
    data: Vec<Value>,
}

impl Message {
    /// Parse a JSON frame and classify it.
    pub fn from_frame(frame: impl AsRef<[u8]>) -> Result<Self> {
        let value: Value = serde_json::from_slice(frame.as_ref()).map_err(ClassifyError::Parse)?;
        Self::from_value(value)
    }

    /// Classify `value` and deserialize it as the first matching kind.
    pub fn from_value(value: Value) -> Result<Self> {
        let kind = classify(&value).ok_or(ClassifyError::Unrecognized)?;

        let message = match kind {
            MessageKind::Welcome => Message::Welcome(typed(kind, value)?),
            MessageKind::Invoice => Message::Invoice(typed(kind, value)?),
            MessageKind::PaymentReceived => Message::PaymentReceived(typed(kind, value)?),
            MessageKind::TimeWarning => Message::TimeWarning(typed(kind, value)?),
            MessageKind::Unsubscribed => Message::Unsubscribed(typed(kind, value)?),
            MessageKind::Snapshot => {
                let parts: SnapshotParts = typed(kind, value)?;
                Message::Snapshot {
                    uuid: parts.uuid,
                    snapshot: parts.snapshot,
                }
            }
            MessageKind::DataUpdate => {
                let parts: DataParts = typed(kind, value)?;
                Message::DataUpdate {
                    uuid: parts.uuid,
                    data: parts.data,
                }
            }
            MessageKind::GenericUuidPayload => {
                let uuid = value
                    .get("uuid")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                Message::Other { uuid, body: value }
            }
        };

        Ok(message)
    }

    pub fn kind(&self) -> MessageKind {
        match self {
            Message::Welcome(_) => MessageKind::Welcome,
            Message::Invoice(_) => MessageKind::Invoice,
            Message::PaymentReceived(_) => MessageKind::PaymentReceived,
            Message::TimeWarning(_) => MessageKind::TimeWarning,
            Message::Unsubscribed(_) => MessageKind::Unsubscribed,
            Message::Snapshot { .. } => MessageKind::Snapshot,
            Message::DataUpdate { .. } => MessageKind::DataUpdate,
            Message::Other { .. } => MessageKind::GenericUuidPayload,
        }
    }

    /// Correlation identifier, when the message carries one.
    pub fn correlation_id(&self) -> Option<&str> {
        match self {
            Message::Welcome(_) => None,
            Message::Invoice(invoice) => invoice.uuid.as_deref(),
            Message::PaymentReceived(msg) => Some(msg.uuid.as_str()),
            Message::TimeWarning(msg) => Some(msg.uuid.as_str()),
            Message::Unsubscribed(msg) => Some(msg.uuid.as_str()),
            Message::Snapshot { uuid, .. }
            | Message::DataUpdate { uuid, .. }
            | Message::Other { uuid, .. } => Some(uuid.as_str()),
        }
    }
}

fn typed<T: DeserializeOwned>(kind: MessageKind, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|source| ClassifyError::Malformed { kind, source })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn builds_typed_control_messages() {
        let message = Message::from_frame(
            r#"{"uuid":"s1","exchange":"coinbase","symbol":"ETH-USD","duration":120,"event":"payment received"}"#,
        )
        .unwrap();

        assert_eq!(message.kind(), MessageKind::PaymentReceived);
        assert_eq!(message.correlation_id(), Some("s1"));
        match message {
            Message::PaymentReceived(paid) => {
                assert_eq!(paid.exchange, "coinbase");
                assert_eq!(paid.duration, 120.0);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unsubscribed_reads_camel_case_refund() {
        let message =
            Message::from_value(json!({ "uuid": "x", "event": "unsubscribed", "amountRefunded": 5 }))
                .unwrap();
        assert_eq!(
            message,
            Message::Unsubscribed(Unsubscribed {
                uuid: "x".to_string(),
                event: "unsubscribed".to_string(),
                amount_refunded: 5.0
            })
        );
    }

    #[test]
    fn welcome_and_invoice_without_uuid() {
        let welcome = Message::from_value(json!({ "ln_uri": "node@1.2.3.4:9735" })).unwrap();
        assert_eq!(welcome.correlation_id(), None);

        let invoice = Message::from_value(json!({ "invoice": "lnbc1" })).unwrap();
        assert_eq!(
            invoice,
            Message::Invoice(InvoiceMessage {
                uuid: None,
                invoice: "lnbc1".to_string()
            })
        );
    }

    #[test]
    fn payloads_stay_untyped() {
        let message = Message::from_value(json!({ "uuid": "d", "data": [{ "a": 1 }] })).unwrap();
        assert_eq!(
            message,
            Message::DataUpdate {
                uuid: "d".to_string(),
                data: vec![json!({ "a": 1 })]
            }
        );

        let other = Message::from_value(json!({ "uuid": "o", "status": "queued" })).unwrap();
        assert_eq!(other.kind(), MessageKind::GenericUuidPayload);
        assert_eq!(other.correlation_id(), Some("o"));
    }

    #[test]
    fn malformed_and_unknown_frames() {
        assert!(matches!(
            Message::from_frame("{oops"),
            Err(ClassifyError::Parse(_))
        ));
        assert!(matches!(
            Message::from_value(json!({ "hello": 1 })),
            Err(ClassifyError::Unrecognized)
        ));
        assert!(matches!(
            Message::from_value(json!({ "uuid": 3, "invoice": "lnbc" })),
            Err(ClassifyError::Malformed {
                kind: MessageKind::Invoice,
                ..
            })
        ));
    }
}
