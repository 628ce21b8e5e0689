//! Customer Records
//!
//! [`CustomerRecord`] is the typed form submission; [`RawRecord`] is the
//! attribute-name keyed view the aligner consumes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Declares a categorical attribute whose variants are the training levels,
/// in the order the form lists them.
macro_rules! categorical {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            /// Every level, first listed option first
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Level label as seen at training time
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }

            /// Level labels in form order
            pub fn levels() -> Vec<String> {
                Self::ALL.iter().map(|level| level.as_str().to_string()).collect()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

categorical!(
    /// Customer gender
    Gender { Male => "Male", Female => "Female" }
);

categorical!(
    /// Plain yes/no answer
    YesNo { Yes => "Yes", No => "No" }
);

categorical!(
    /// Multiple phone lines
    MultipleLines { No => "No", Yes => "Yes", NoPhoneService => "No phone service" }
);

categorical!(
    /// Internet service type
    InternetService { Dsl => "DSL", FiberOptic => "Fiber optic", No => "No" }
);

categorical!(
    /// Add-on that only exists with an internet subscription
    InternetAddon { Yes => "Yes", No => "No", NoInternetService => "No internet service" }
);

categorical!(
    /// Contract term
    Contract { MonthToMonth => "Month-to-month", OneYear => "One year", TwoYear => "Two year" }
);

categorical!(
    /// Billing payment method
    PaymentMethod {
        ElectronicCheck => "Electronic check",
        MailedCheck => "Mailed check",
        BankTransfer => "Bank transfer (automatic)",
        CreditCard => "Credit card (automatic)",
    }
);

/// Attributes passed through as numbers, in training frame order
pub const NUMERIC_ATTRIBUTES: [&str; 4] = ["SeniorCitizen", "tenure", "MonthlyCharges", "TotalCharges"];

/// Attributes one-hot encoded at training time, in training frame order
pub const CATEGORICAL_ATTRIBUTES: [&str; 15] = [
    "gender",
    "Partner",
    "Dependents",
    "PhoneService",
    "MultipleLines",
    "InternetService",
    "OnlineSecurity",
    "OnlineBackup",
    "DeviceProtection",
    "TechSupport",
    "StreamingTV",
    "StreamingMovies",
    "Contract",
    "PaperlessBilling",
    "PaymentMethod",
];

/// A single customer as submitted through the form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    #[serde(rename = "gender")]
    pub gender: Gender,
    /// 0 or 1
    #[serde(rename = "SeniorCitizen")]
    pub senior_citizen: u8,
    #[serde(rename = "Partner")]
    pub partner: YesNo,
    #[serde(rename = "Dependents")]
    pub dependents: YesNo,
    /// Months with the company; whole numbers only, checked by the validator
    #[serde(rename = "tenure")]
    pub tenure: f64,
    #[serde(rename = "PhoneService")]
    pub phone_service: YesNo,
    #[serde(rename = "MultipleLines")]
    pub multiple_lines: MultipleLines,
    #[serde(rename = "InternetService")]
    pub internet_service: InternetService,
    #[serde(rename = "OnlineSecurity")]
    pub online_security: InternetAddon,
    #[serde(rename = "OnlineBackup")]
    pub online_backup: InternetAddon,
    #[serde(rename = "DeviceProtection")]
    pub device_protection: InternetAddon,
    #[serde(rename = "TechSupport")]
    pub tech_support: InternetAddon,
    #[serde(rename = "StreamingTV")]
    pub streaming_tv: InternetAddon,
    #[serde(rename = "StreamingMovies")]
    pub streaming_movies: InternetAddon,
    #[serde(rename = "Contract")]
    pub contract: Contract,
    #[serde(rename = "PaperlessBilling")]
    pub paperless_billing: YesNo,
    #[serde(rename = "PaymentMethod")]
    pub payment_method: PaymentMethod,
    #[serde(rename = "MonthlyCharges")]
    pub monthly_charges: f64,
    #[serde(rename = "TotalCharges")]
    pub total_charges: f64,
}

impl Default for CustomerRecord {
    /// The form's initial state: first listed option everywhere
    fn default() -> Self {
        Self {
            gender: Gender::Male,
            senior_citizen: 0,
            partner: YesNo::Yes,
            dependents: YesNo::Yes,
            tenure: 12.0,
            phone_service: YesNo::Yes,
            multiple_lines: MultipleLines::No,
            internet_service: InternetService::Dsl,
            online_security: InternetAddon::Yes,
            online_backup: InternetAddon::Yes,
            device_protection: InternetAddon::Yes,
            tech_support: InternetAddon::Yes,
            streaming_tv: InternetAddon::Yes,
            streaming_movies: InternetAddon::Yes,
            contract: Contract::MonthToMonth,
            paperless_billing: YesNo::Yes,
            payment_method: PaymentMethod::ElectronicCheck,
            monthly_charges: 70.0,
            total_charges: 1500.0,
        }
    }
}

impl CustomerRecord {
    fn categorical_values(&self) -> [&'static str; 15] {
        [
            self.gender.as_str(),
            self.partner.as_str(),
            self.dependents.as_str(),
            self.phone_service.as_str(),
            self.multiple_lines.as_str(),
            self.internet_service.as_str(),
            self.online_security.as_str(),
            self.online_backup.as_str(),
            self.device_protection.as_str(),
            self.tech_support.as_str(),
            self.streaming_tv.as_str(),
            self.streaming_movies.as_str(),
            self.contract.as_str(),
            self.paperless_billing.as_str(),
            self.payment_method.as_str(),
        ]
    }

    fn numeric_values(&self) -> [f64; 4] {
        [
            f64::from(self.senior_citizen),
            self.tenure,
            self.monthly_charges,
            self.total_charges,
        ]
    }

    /// Convert into the attribute-keyed record the aligner consumes
    pub fn to_raw(&self) -> RawRecord {
        let mut raw = RawRecord::new();
        for (attribute, value) in NUMERIC_ATTRIBUTES.iter().zip(self.numeric_values()) {
            raw.insert(*attribute, RawValue::Number(value));
        }
        for (attribute, level) in CATEGORICAL_ATTRIBUTES.iter().zip(self.categorical_values()) {
            raw.insert(*attribute, RawValue::Category(level.to_string()));
        }
        raw
    }

    /// Full level enumeration of every categorical attribute
    pub fn category_levels() -> BTreeMap<String, Vec<String>> {
        let levels = [
            Gender::levels(),
            YesNo::levels(),
            YesNo::levels(),
            YesNo::levels(),
            MultipleLines::levels(),
            InternetService::levels(),
            InternetAddon::levels(),
            InternetAddon::levels(),
            InternetAddon::levels(),
            InternetAddon::levels(),
            InternetAddon::levels(),
            InternetAddon::levels(),
            Contract::levels(),
            YesNo::levels(),
            PaymentMethod::levels(),
        ];
        CATEGORICAL_ATTRIBUTES
            .iter()
            .zip(levels)
            .map(|(attribute, levels)| (attribute.to_string(), levels))
            .collect()
    }

    /// Column layout of the training frame after one-hot encoding with the
    /// lexicographically first level of each attribute dropped.
    pub fn reference_columns() -> Vec<String> {
        let levels = Self::category_levels();
        let mut columns: Vec<String> = NUMERIC_ATTRIBUTES.iter().map(|a| a.to_string()).collect();
        for attribute in CATEGORICAL_ATTRIBUTES {
            let mut sorted = levels.get(attribute).cloned().unwrap_or_default();
            sorted.sort();
            columns.extend(sorted.iter().skip(1).map(|level| indicator_column(attribute, level)));
        }
        columns
    }
}

/// Name of the one-hot indicator column for `attribute == level`
pub fn indicator_column(attribute: &str, level: &str) -> String {
    format!("{attribute}_{level}")
}

/// Value of a single raw attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    /// Count, flag or currency amount
    Number(f64),
    /// Categorical level label
    Category(String),
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Category(value.to_string())
    }
}

/// Attribute name to value mapping for one prediction request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord {
    values: BTreeMap<String, RawValue>,
}

impl RawRecord {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an attribute, replacing any previous value
    pub fn insert(&mut self, attribute: impl Into<String>, value: impl Into<RawValue>) {
        self.values.insert(attribute.into(), value.into());
    }

    /// Builder form of [`RawRecord::insert`]
    pub fn with(mut self, attribute: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.insert(attribute, value);
        self
    }

    /// Look up an attribute
    pub fn get(&self, attribute: &str) -> Option<&RawValue> {
        self.values.get(attribute)
    }

    /// Number of attributes
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the record has no attributes
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate attributes in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_raw_covers_every_attribute() {
        let raw = CustomerRecord::default().to_raw();
        assert_eq!(raw.len(), NUMERIC_ATTRIBUTES.len() + CATEGORICAL_ATTRIBUTES.len());
        assert_eq!(raw.get("tenure"), Some(&RawValue::Number(12.0)));
        assert_eq!(raw.get("Contract"), Some(&RawValue::from("Month-to-month")));
        assert_eq!(raw.get("StreamingTV"), Some(&RawValue::from("Yes")));
    }

    #[test]
    fn test_reference_columns_drop_first_sorted_level() {
        let columns = CustomerRecord::reference_columns();
        assert_eq!(columns.len(), 30);
        assert_eq!(&columns[..4], &["SeniorCitizen", "tenure", "MonthlyCharges", "TotalCharges"]);
        assert!(columns.contains(&"gender_Male".to_string()));
        assert!(!columns.contains(&"gender_Female".to_string()));
        assert!(columns.contains(&"MultipleLines_No phone service".to_string()));
        assert!(!columns.contains(&"InternetService_DSL".to_string()));
        assert!(!columns.contains(&"PaymentMethod_Bank transfer (automatic)".to_string()));
        assert!(columns.contains(&"Contract_Two year".to_string()));
    }

    #[test]
    fn test_serde_uses_training_names() {
        let json = serde_json::to_value(CustomerRecord::default()).unwrap();
        assert_eq!(json["Contract"], "Month-to-month");
        assert_eq!(json["InternetService"], "DSL");
        assert_eq!(json["SeniorCitizen"], 0);

        let back: CustomerRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, CustomerRecord::default());
    }

    #[test]
    fn test_raw_record_from_json() {
        let raw: RawRecord =
            serde_json::from_str(r#"{"Contract": "Two year", "tenure": 12}"#).unwrap();
        assert_eq!(raw.get("Contract"), Some(&RawValue::from("Two year")));
        assert_eq!(raw.get("tenure"), Some(&RawValue::Number(12.0)));
    }
}
