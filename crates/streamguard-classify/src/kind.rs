use std::fmt;

use serde::Serialize;
use serde_json::Value;
use streamguard_schema::{SchemaDescriptor, SchemaRegistry};

use crate::predicates::{
    has_data_and_uuid, has_uuid, is_exchange_data_response, is_init_msg, is_invoice,
    is_payment_received, is_ppc_data_response, is_snapshot, is_time_warning, is_unsubscribed,
};

/// Logical kind of a control or payload message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MessageKind {
    Welcome,
    Invoice,
    PaymentReceived,
    TimeWarning,
    Unsubscribed,
    Snapshot,
    DataUpdate,
    GenericUuidPayload,
}

impl MessageKind {
    /// Every kind in classification precedence order.
    ///
    /// Kinds identified by a sentinel or a distinctive field come before
    /// the container kinds, and [`MessageKind::GenericUuidPayload`] comes
    /// last since every other uuid-bearing kind implies it.
    pub const PRECEDENCE: [MessageKind; 8] = [
        MessageKind::Welcome,
        MessageKind::Invoice,
        MessageKind::PaymentReceived,
        MessageKind::TimeWarning,
        MessageKind::Unsubscribed,
        MessageKind::Snapshot,
        MessageKind::DataUpdate,
        MessageKind::GenericUuidPayload,
    ];

    /// Run this kind's predicate.
    pub fn matches(self, value: &Value) -> bool {
        match self {
            MessageKind::Welcome => is_init_msg(value),
            MessageKind::Invoice => is_invoice(value),
            MessageKind::PaymentReceived => is_payment_received(value),
            MessageKind::TimeWarning => is_time_warning(value),
            MessageKind::Unsubscribed => is_unsubscribed(value),
            MessageKind::Snapshot => is_snapshot(value),
            MessageKind::DataUpdate => has_data_and_uuid(value),
            MessageKind::GenericUuidPayload => has_uuid(value),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MessageKind::Welcome => "welcome",
            MessageKind::Invoice => "invoice",
            MessageKind::PaymentReceived => "payment-received",
            MessageKind::TimeWarning => "time-warning",
            MessageKind::Unsubscribed => "unsubscribed",
            MessageKind::Snapshot => "snapshot",
            MessageKind::DataUpdate => "data-update",
            MessageKind::GenericUuidPayload => "generic-uuid-payload",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// First matching kind in [`MessageKind::PRECEDENCE`] order.
pub fn classify(value: &Value) -> Option<MessageKind> {
    let kind = MessageKind::PRECEDENCE
        .into_iter()
        .find(|kind| kind.matches(value));
    tracing::trace!(kind = ?kind, "classified message");
    kind
}

/// Every matching kind, in precedence order.
pub fn classify_all(value: &Value) -> Vec<MessageKind> {
    MessageKind::PRECEDENCE
        .into_iter()
        .filter(|kind| kind.matches(value))
        .collect()
}

/// Registry family a decoded payload response belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PayloadFamily {
    Exchange,
    Info,
}

impl PayloadFamily {
    pub fn as_str(self) -> &'static str {
        match self {
            PayloadFamily::Exchange => "exchange",
            PayloadFamily::Info => "info",
        }
    }
}

impl fmt::Display for PayloadFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Family of a payload response decoded with `schema`.
///
/// Schema names are unique across a registry, so at most one family matches.
pub fn classify_payload(
    value: &Value,
    schema: &SchemaDescriptor,
    registry: &SchemaRegistry,
) -> Option<PayloadFamily> {
    if is_exchange_data_response(value, schema, registry) {
        Some(PayloadFamily::Exchange)
    } else if is_ppc_data_response(value, schema, registry) {
        Some(PayloadFamily::Info)
    } else {
        None
    }
}
