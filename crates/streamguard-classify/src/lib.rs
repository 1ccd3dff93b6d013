//! Structural classification of streaming API messages.
//!
//! Control and payload messages share one channel without a uniform type
//! tag. The predicates in [`predicates`] recognize each kind by its fields;
//! [`classify`] runs them in a fixed precedence order and maps the first
//! match to a [`MessageKind`], so callers branch on an enum instead of
//! re-checking fields at every call site.

pub mod error;
pub mod kind;
pub mod message;
pub mod predicates;

pub use error::{ClassifyError, Result};
pub use kind::{classify, classify_all, classify_payload, MessageKind, PayloadFamily};
pub use message::{
    InvoiceMessage, Message, PaymentReceived, TimeWarning, Unsubscribed, Warnings, WelcomeMessage,
};
pub use predicates::{
    has_data_and_uuid, has_uuid, is_exchange_data_response, is_init_msg, is_invoice,
    is_payment_received, is_ppc_data_response, is_snapshot, is_time_warning, is_unsubscribed,
    EVENT_PAYMENT_RECEIVED, EVENT_UNSUBSCRIBED,
};
