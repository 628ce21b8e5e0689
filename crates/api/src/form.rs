//! HTML Form Rendering

use feature_engine::{
    Contract, CustomerRecord, Gender, InternetAddon, InternetService, MultipleLines,
    PaymentMethod, YesNo,
};
use inference_engine::{ChurnPrediction, RiskLabel};

const TITLE: &str = "Telco Customer Churn Prediction";

/// Outcome shown with the form after a submission
pub enum Outcome<'a> {
    /// Scored submission with an optional model caption
    Prediction {
        prediction: &'a ChurnPrediction,
        caption: Option<&'a str>,
    },
    /// Submission rejected before or during scoring, shown verbatim
    Error(String),
}

/// Escape text for HTML element and attribute content
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn select<T: PartialEq + Copy>(
    name: &str,
    label: &str,
    options: &[T],
    selected: T,
    text: impl Fn(T) -> String,
) -> String {
    let options: String = options
        .iter()
        .map(|&option| {
            let value = escape(&text(option));
            let marker = if option == selected { " selected" } else { "" };
            format!(r#"<option value="{value}"{marker}>{value}</option>"#)
        })
        .collect();
    format!(
        r#"<div class="field"><label for="{name}">{label}</label><select id="{name}" name="{name}">{options}</select></div>"#
    )
}

fn categorical<T>(name: &str, label: &str, options: &[T], selected: T) -> String
where
    T: PartialEq + Copy + std::fmt::Display,
{
    select(name, label, options, selected, |level| level.to_string())
}

fn number(name: &str, label: &str, value: f64, min: f64, max: f64, step: &str) -> String {
    format!(
        r#"<div class="field"><label for="{name}">{label}</label><input type="number" id="{name}" name="{name}" value="{value}" min="{min}" max="{max}" step="{step}" required></div>"#
    )
}

fn fields(record: &CustomerRecord) -> String {
    [
        categorical("gender", "Gender", Gender::ALL, record.gender),
        select("SeniorCitizen", "Senior Citizen", &[0u8, 1], record.senior_citizen, |v| {
            v.to_string()
        }),
        categorical("Partner", "Has Partner?", YesNo::ALL, record.partner),
        categorical("Dependents", "Has Dependents?", YesNo::ALL, record.dependents),
        number("tenure", "Tenure (months)", record.tenure, 0.0, 72.0, "1"),
        categorical("PhoneService", "Phone Service", YesNo::ALL, record.phone_service),
        categorical("MultipleLines", "Multiple Lines", MultipleLines::ALL, record.multiple_lines),
        categorical(
            "InternetService",
            "Internet Service",
            InternetService::ALL,
            record.internet_service,
        ),
        categorical("OnlineSecurity", "Online Security", InternetAddon::ALL, record.online_security),
        categorical("OnlineBackup", "Online Backup", InternetAddon::ALL, record.online_backup),
        categorical(
            "DeviceProtection",
            "Device Protection",
            InternetAddon::ALL,
            record.device_protection,
        ),
        categorical("TechSupport", "Tech Support", InternetAddon::ALL, record.tech_support),
        categorical("StreamingTV", "Streaming TV", InternetAddon::ALL, record.streaming_tv),
        categorical(
            "StreamingMovies",
            "Streaming Movies",
            InternetAddon::ALL,
            record.streaming_movies,
        ),
        categorical("Contract", "Contract", Contract::ALL, record.contract),
        categorical("PaperlessBilling", "Paperless Billing", YesNo::ALL, record.paperless_billing),
        categorical("PaymentMethod", "Payment Method", PaymentMethod::ALL, record.payment_method),
        number("MonthlyCharges", "Monthly Charges", record.monthly_charges, 0.0, 1000.0, "0.01"),
        number("TotalCharges", "Total Charges", record.total_charges, 0.0, 100000.0, "0.01"),
    ]
    .concat()
}

fn outcome_html(outcome: &Outcome<'_>) -> String {
    match outcome {
        Outcome::Prediction {
            prediction,
            caption,
        } => {
            let class = match prediction.label {
                RiskLabel::HighRisk => "banner error",
                RiskLabel::LowRisk => "banner success",
            };
            let caption = caption
                .map(|text| format!(r#"<p class="caption">Model: {}</p>"#, escape(text)))
                .unwrap_or_default();
            format!(
                r#"<div class="{class}" id="result">{}</div>{caption}"#,
                escape(&prediction.headline())
            )
        }
        Outcome::Error(message) => format!(
            r#"<div class="banner error" id="result">{}</div>"#,
            escape(message)
        ),
    }
}

fn page(body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>Telco Customer Churn Predictor</title>
    <style>
        body {{ font-family: sans-serif; max-width: 720px; margin: 2rem auto; padding: 0 1rem; }}
        .field {{ margin-bottom: 0.75rem; }}
        .field label {{ display: block; font-weight: 500; margin-bottom: 0.25rem; }}
        .field select, .field input {{ width: 100%; padding: 0.4rem; }}
        .banner {{ padding: 0.75rem 1rem; border-radius: 4px; margin: 1rem 0; }}
        .success {{ background: #e6f4ea; color: #1e4620; }}
        .error {{ background: #fdecea; color: #611a15; }}
        .caption {{ color: #666; font-size: 0.85rem; }}
    </style>
</head>
<body>
    <h1>{TITLE}</h1>
    {body}
</body>
</html>"#
    )
}

/// Form page for a loaded model, prefilled with `record`
pub fn render_form(record: &CustomerRecord, outcome: Option<Outcome<'_>>) -> String {
    // Errors sit above the form, results below it
    let (above, below) = match &outcome {
        Some(error @ Outcome::Error(_)) => (outcome_html(error), String::new()),
        Some(result) => (String::new(), outcome_html(result)),
        None => (String::new(), String::new()),
    };
    page(&format!(
        r#"<p>Enter customer details to predict whether they are likely to churn.</p>
    <div class="banner success">Model loaded successfully and ready to predict.</div>
    {above}
    <form method="post" action="/predict">
        {}
        <button type="submit">Predict Churn</button>
    </form>
    {below}"#,
        fields(record)
    ))
}

/// Diagnostic page shown when the artifact could not be loaded
pub fn render_unavailable(reason: &str) -> String {
    page(&format!(
        r#"<div class="banner error" id="unavailable">{}</div>"#,
        escape(reason)
    ))
}
