//! Shipping details captured at checkout.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Required length of a postal code.
pub const POSTAL_CODE_LENGTH: usize = 6;

/// A field of [`CustomerInfo`] that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerField {
    Name,
    Phone,
    Address,
    PostalCode,
}

impl CustomerField {
    /// Every field, in declaration order.
    pub const ALL: [Self; 4] = [Self::Name, Self::Phone, Self::Address, Self::PostalCode];
}

impl fmt::Display for CustomerField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name => write!(f, "name"),
            Self::Phone => write!(f, "phone"),
            Self::Address => write!(f, "address"),
            Self::PostalCode => write!(f, "postal_code"),
        }
    }
}

/// Validation failure listing every offending field.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid customer info: {}", format_fields(.fields))]
pub struct CustomerInfoError {
    pub fields: Vec<CustomerField>,
}

fn format_fields(fields: &[CustomerField]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Name, phone and delivery address for an order.
///
/// The postal code is sent as `pincode` on the wire, which is what the order
/// endpoint and the `orders` table call it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub name: String,
    pub phone: String,
    pub address: String,
    #[serde(rename = "pincode")]
    pub postal_code: String,
}

impl CustomerInfo {
    /// Check that every field is present and the postal code is numeric with
    /// the expected length.
    ///
    /// # Errors
    ///
    /// Returns `CustomerInfoError` naming all invalid fields, in declaration
    /// order.
    pub fn validate(&self) -> Result<(), CustomerInfoError> {
        let mut fields = Vec::new();

        if self.name.trim().is_empty() {
            fields.push(CustomerField::Name);
        }
        if self.phone.trim().is_empty() {
            fields.push(CustomerField::Phone);
        }
        if self.address.trim().is_empty() {
            fields.push(CustomerField::Address);
        }
        if !is_valid_postal_code(&self.postal_code) {
            fields.push(CustomerField::PostalCode);
        }

        if fields.is_empty() {
            Ok(())
        } else {
            Err(CustomerInfoError { fields })
        }
    }
}

fn is_valid_postal_code(code: &str) -> bool {
    let code = code.trim();
    code.len() == POSTAL_CODE_LENGTH && code.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid() -> CustomerInfo {
        CustomerInfo {
            name: "Asha Rao".to_string(),
            phone: "9876543210".to_string(),
            address: "12 MG Road, Bengaluru".to_string(),
            postal_code: "560001".to_string(),
        }
    }

    #[test]
    fn test_valid_customer_info() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_blank_fields_are_reported_together() {
        let info = CustomerInfo {
            name: "  ".to_string(),
            phone: String::new(),
            ..valid()
        };
        let err = info.validate().unwrap_err();
        assert_eq!(err.fields, vec![CustomerField::Name, CustomerField::Phone]);
        assert_eq!(err.to_string(), "invalid customer info: name, phone");
    }

    #[test]
    fn test_postal_code_format() {
        for bad in ["", "12345", "1234567", "56000a", "56 001"] {
            let info = CustomerInfo {
                postal_code: bad.to_string(),
                ..valid()
            };
            let err = info.validate().unwrap_err();
            assert_eq!(err.fields, vec![CustomerField::PostalCode], "{bad:?}");
        }
    }

    #[test]
    fn test_wire_name_for_postal_code() {
        let json = serde_json::to_value(valid()).unwrap();
        assert_eq!(json["pincode"], "560001");
    }
}
