//! Checkout form data and the step controller that gates order placement.
//!
//! The wizard walks `Billing → Shipping → Payment → Confirmation` in that
//! order only. Moving forward requires the current step to be complete;
//! moving back never re-validates. `Confirmation` is only entered by a
//! successful order placement.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

pub const DEFAULT_COUNTRY: &str = "România";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Address {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub street: String,
    pub city: String,
    pub county: String,
    pub postal_code: String,
    #[serde(default = "default_country")]
    pub country: String,
}

fn default_country() -> String {
    DEFAULT_COUNTRY.to_string()
}

impl Default for Address {
    fn default() -> Self {
        Self {
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            phone: String::new(),
            street: String::new(),
            city: String::new(),
            county: String::new(),
            postal_code: String::new(),
            country: default_country(),
        }
    }
}

impl Address {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }
}

/// Shipping form. Only the delivery location is collected; the recipient
/// contact is always taken from billing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ShippingDetails {
    pub same_as_billing: bool,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub county: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default = "default_country")]
    pub country: String,
}

impl Default for ShippingDetails {
    fn default() -> Self {
        Self {
            same_as_billing: true,
            street: String::new(),
            city: String::new(),
            county: String::new(),
            postal_code: String::new(),
            country: default_country(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Card,
    BankTransfer,
    CashOnDelivery,
}

impl PaymentMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::Card => "card",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::CashOnDelivery => "cash_on_delivery",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "card" => Some(PaymentMethod::Card),
            "bank_transfer" => Some(PaymentMethod::BankTransfer),
            "cash_on_delivery" => Some(PaymentMethod::CashOnDelivery),
            _ => None,
        }
    }
}

/// Saved customer profile used to pre-fill the billing step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Profile {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub county: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CheckoutData {
    pub billing_address: Address,
    #[serde(default)]
    pub shipping_address: ShippingDetails,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub accept_terms: bool,
    #[serde(default)]
    pub newsletter: bool,
}

impl CheckoutData {
    /// Defaults for a new checkout, with billing filled from whatever the
    /// profile has. The account email is used when the profile has none.
    pub fn prefilled(profile: Option<&Profile>, account_email: Option<&str>) -> Self {
        let mut data = Self::default();
        let billing = &mut data.billing_address;
        if let Some(email) = account_email {
            billing.email = email.to_string();
        }
        if let Some(p) = profile {
            let fill = |target: &mut String, value: &Option<String>| {
                if let Some(v) = value.as_deref().filter(|v| !v.trim().is_empty()) {
                    *target = v.to_string();
                }
            };
            fill(&mut billing.email, &p.email);
            fill(&mut billing.first_name, &p.first_name);
            fill(&mut billing.last_name, &p.last_name);
            fill(&mut billing.phone, &p.phone);
            fill(&mut billing.street, &p.street);
            fill(&mut billing.city, &p.city);
            fill(&mut billing.county, &p.county);
            fill(&mut billing.postal_code, &p.postal_code);
            fill(&mut billing.country, &p.country);
        }
        data
    }

    /// Required fields of `step` that are still empty.
    pub fn missing_fields(&self, step: CheckoutStep) -> Vec<&'static str> {
        let b = &self.billing_address;
        let s = &self.shipping_address;
        let required: Vec<(&'static str, &str)> = match step {
            CheckoutStep::Billing => vec![
                ("first_name", b.first_name.as_str()),
                ("last_name", b.last_name.as_str()),
                ("email", b.email.as_str()),
                ("phone", b.phone.as_str()),
                ("street", b.street.as_str()),
                ("city", b.city.as_str()),
                ("county", b.county.as_str()),
                ("postal_code", b.postal_code.as_str()),
            ],
            CheckoutStep::Shipping if s.same_as_billing => vec![],
            CheckoutStep::Shipping => vec![
                ("street", s.street.as_str()),
                ("city", s.city.as_str()),
                ("county", s.county.as_str()),
                ("postal_code", s.postal_code.as_str()),
            ],
            CheckoutStep::Payment => {
                return if self.accept_terms {
                    vec![]
                } else {
                    vec!["accept_terms"]
                };
            }
            CheckoutStep::Confirmation => vec![],
        };
        required
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| name)
            .collect()
    }

    pub fn is_step_valid(&self, step: CheckoutStep) -> bool {
        self.missing_fields(step).is_empty()
    }

    /// Address the order ships to: a copy of billing when the customer ticked
    /// "same as billing", otherwise the shipping location with billing contact.
    pub fn effective_shipping_address(&self) -> Address {
        let billing = &self.billing_address;
        let shipping = &self.shipping_address;
        if shipping.same_as_billing {
            return billing.clone();
        }
        Address {
            street: shipping.street.clone(),
            city: shipping.city.clone(),
            county: shipping.county.clone(),
            postal_code: shipping.postal_code.clone(),
            country: shipping.country.clone(),
            ..billing.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep {
    Billing,
    Shipping,
    Payment,
    Confirmation,
}

impl CheckoutStep {
    pub fn index(self) -> usize {
        match self {
            CheckoutStep::Billing => 0,
            CheckoutStep::Shipping => 1,
            CheckoutStep::Payment => 2,
            CheckoutStep::Confirmation => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CheckoutStep::Billing => "Date de facturare",
            CheckoutStep::Shipping => "Livrare",
            CheckoutStep::Payment => "Plată",
            CheckoutStep::Confirmation => "Confirmare",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepError {
    #[error("step {step:?} is incomplete: missing {missing:?}")]
    Incomplete {
        step: CheckoutStep,
        missing: Vec<&'static str>,
    },
    #[error("the payment step can only be left by placing the order")]
    SubmissionRequired,
    #[error("checkout is already confirmed")]
    Finished,
    #[error("order placement is only possible from the payment step (currently at {0:?})")]
    NotAtPayment(CheckoutStep),
}

#[derive(Debug, Clone)]
pub struct CheckoutWizard {
    step: CheckoutStep,
    data: CheckoutData,
}

impl CheckoutWizard {
    pub fn new(data: CheckoutData) -> Self {
        Self {
            step: CheckoutStep::Billing,
            data,
        }
    }

    /// Walk a freshly submitted form up to the payment step, stopping at the
    /// first incomplete step.
    pub fn at_payment(data: CheckoutData) -> Result<Self, StepError> {
        let mut wizard = Self::new(data);
        wizard.next()?;
        wizard.next()?;
        Ok(wizard)
    }

    pub fn step(&self) -> CheckoutStep {
        self.step
    }

    pub fn data(&self) -> &CheckoutData {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut CheckoutData {
        &mut self.data
    }

    pub fn can_advance(&self) -> bool {
        matches!(self.step, CheckoutStep::Billing | CheckoutStep::Shipping)
            && self.data.is_step_valid(self.step)
    }

    pub fn next(&mut self) -> Result<CheckoutStep, StepError> {
        let following = match self.step {
            CheckoutStep::Billing => CheckoutStep::Shipping,
            CheckoutStep::Shipping => CheckoutStep::Payment,
            CheckoutStep::Payment => return Err(StepError::SubmissionRequired),
            CheckoutStep::Confirmation => return Err(StepError::Finished),
        };
        let missing = self.data.missing_fields(self.step);
        if !missing.is_empty() {
            return Err(StepError::Incomplete {
                step: self.step,
                missing,
            });
        }
        self.step = following;
        Ok(self.step)
    }

    pub fn back(&mut self) -> CheckoutStep {
        self.step = match self.step {
            CheckoutStep::Billing => CheckoutStep::Billing,
            CheckoutStep::Shipping => CheckoutStep::Billing,
            CheckoutStep::Payment => CheckoutStep::Shipping,
            CheckoutStep::Confirmation => CheckoutStep::Confirmation,
        };
        self.step
    }

    /// Check that the order may be placed right now. Earlier steps are
    /// re-checked because their data may have been edited after going back.
    pub fn ready_to_submit(&self) -> Result<(), StepError> {
        if self.step != CheckoutStep::Payment {
            return Err(StepError::NotAtPayment(self.step));
        }
        for step in [
            CheckoutStep::Billing,
            CheckoutStep::Shipping,
            CheckoutStep::Payment,
        ] {
            let missing = self.data.missing_fields(step);
            if !missing.is_empty() {
                return Err(StepError::Incomplete { step, missing });
            }
        }
        Ok(())
    }

    pub(crate) fn confirm(&mut self) {
        if self.step == CheckoutStep::Payment {
            self.step = CheckoutStep::Confirmation;
        }
    }
}
