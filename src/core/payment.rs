//! Payment-intent links for the UPI rail.
//!
//! The rail gives no delivery receipt; a link only opens the payer's app with the
//! transfer prefilled.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct PaymentIntent {
    pub payee_address: String,
    pub payee_name: String,
    pub amount: f64,
    pub currency: String,
    pub memo: String,
}

impl PaymentIntent {
    pub fn to_upi_uri(&self) -> String {
        format!(
            "upi://pay?pa={}&pn={}&am={:.2}&cu={}&tn={}",
            encode_component(&self.payee_address),
            encode_component(&self.payee_name),
            self.amount,
            encode_component(&self.currency),
            encode_component(&self.memo),
        )
    }
}

/// Percent-encodes everything outside the RFC 3986 unreserved set, keeping `@` for UPI handles.
fn encode_component(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'@' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    encoded
}
