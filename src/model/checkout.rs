use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// A checkout field reported missing or invalid by readiness checks.
///
/// Variants are declared in the order the rules are evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldId {
    RealName,
    PrimaryPhone,
    PrimaryAddress,
    DeliveryMode,
    DeliveryDate,
    PaymentMethod,
    Transport,
    DepositAmount,
    PaymentReference,
    DepositExceedsTotal,
}

impl FieldId {
    /// Customer-side fields, filled before delivery and payment.
    pub fn is_personal(self) -> bool {
        matches!(
            self,
            FieldId::RealName | FieldId::PrimaryPhone | FieldId::PrimaryAddress
        )
    }
}

impl Display for FieldId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FieldId::RealName => "real_name",
            FieldId::PrimaryPhone => "primary_phone",
            FieldId::PrimaryAddress => "primary_address",
            FieldId::DeliveryMode => "delivery_mode",
            FieldId::DeliveryDate => "delivery_date",
            FieldId::PaymentMethod => "payment_method",
            FieldId::Transport => "transport",
            FieldId::DepositAmount => "deposit_amount",
            FieldId::PaymentReference => "payment_reference",
            FieldId::DepositExceedsTotal => "deposit_exceeds_total",
        };
        f.write_str(name)
    }
}

/// Comma-separated field names, for error messages.
pub fn join_fields(fields: &[FieldId]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
