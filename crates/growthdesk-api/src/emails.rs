//! Transactional email bodies.
//!
//! Every renderer is a pure function from domain values to an
//! [`EmailMessage`]; delivery is left to the configured [`EmailSender`].
//! Anything a visitor typed is escaped before it reaches an HTML body.
//!
//! [`EmailSender`]: growthdesk_integrations::EmailSender

use chrono::{DateTime, Utc};
use growthdesk_core::{format_currency, format_money, FollowUpPriority, LeadSubmission, RoiProjection};
use growthdesk_integrations::{EmailAddress, EmailMessage};
use html_escape::{encode_double_quoted_attribute as attr, encode_text as esc};

const BRAND: &str = "GrowthDesk";

/// A completed payment, in major currency units.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentReceipt {
    pub customer_email: String,
    pub customer_name: String,
    pub company: Option<String>,
    pub plan_name: String,
    pub amount: f64,
    pub recurring: bool,
}

impl PaymentReceipt {
    fn company_or_na(&self) -> &str {
        self.company
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or("N/A")
    }
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>{title}</title></head>
<body style="font-family: Arial, sans-serif; color: #1f2937; max-width: 640px; margin: 0 auto;">
<div style="background: #111827; color: #ffffff; padding: 24px;"><h1 style="margin: 0;">{title}</h1></div>
<div style="padding: 24px;">
{body}
</div>
<div style="padding: 16px 24px; font-size: 12px; color: #6b7280;">{BRAND}</div>
</body>
</html>"#,
        title = esc(title),
    )
}

fn row(label: &str, value: &str) -> String {
    format!("<p><strong>{}:</strong> {}</p>\n", esc(label), esc(value))
}

fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() {
        "-"
    } else {
        value
    }
}

/// The personalised report sent back to the visitor who filled in the form.
pub fn roi_report(
    submission: &LeadSubmission,
    projection: &RoiProjection,
    booking_url: &str,
) -> EmailMessage {
    let contact = &submission.contact;
    let greeting = if contact.first_name.trim().is_empty() {
        "Hi there".to_string()
    } else {
        format!("Hi {}", contact.first_name.trim())
    };

    let figures = [
        (
            "Current Monthly Revenue",
            format_currency(projection.current_monthly_revenue, 0),
        ),
        (
            "Projected Monthly Revenue",
            format_currency(projection.projected_monthly_revenue, 0),
        ),
        (
            "Monthly Increase",
            format_currency(projection.monthly_increase, 0),
        ),
        (
            "Annual Increase",
            format_currency(projection.annual_increase, 0),
        ),
        (
            "Conversion Rate",
            format!(
                "{}% → {}%",
                format_money(projection.current_conversion_rate, 1),
                format_money(projection.projected_conversion_rate, 1)
            ),
        ),
        (
            "Recovered Orders per Month",
            format_money(projection.recovered_orders, 0),
        ),
        (
            "Annual ROI",
            format!("{}%", format_money(projection.annual_roi, 0)),
        ),
    ];

    let mut html_rows = String::new();
    let mut text_rows = String::new();
    for (label, value) in &figures {
        html_rows.push_str(&row(label, value));
        text_rows.push_str(&format!("- {label}: {value}\n"));
    }

    let html = layout(
        "Your Personalized ROI Report",
        &format!(
            r#"<p>{greeting},</p>
<p>Thanks for using the ROI calculator. Based on the numbers you shared, here is what better conversion and cart recovery could mean for your store:</p>
{html_rows}<p><a href="{url}" style="background: #2563eb; color: #ffffff; padding: 12px 20px; text-decoration: none;">Book your free strategy call</a></p>"#,
            greeting = esc(&greeting),
            url = attr(booking_url),
        ),
    );
    let text = format!(
        "{greeting},\n\nThanks for using the ROI calculator. Here is your projection:\n\n{text_rows}\nBook your free strategy call: {booking_url}\n"
    );

    EmailMessage {
        to: EmailAddress::named(contact.email.trim(), contact.full_name()),
        subject: format!(
            "Your Personalized ROI Report - {}/month Growth Potential",
            format_currency(projection.monthly_increase, 0)
        ),
        html,
        text: Some(text),
        reply_to: None,
        categories: vec!["roi-report".into()],
    }
}

/// Sales-inbox alert for a new calculator lead.
pub fn lead_notification(
    submission: &LeadSubmission,
    projection: &RoiProjection,
    lead_score: u8,
    notify_email: &str,
) -> EmailMessage {
    let contact = &submission.contact;
    let metrics = &submission.metrics;
    let company = contact.company_or("Unknown Company");
    let priority = FollowUpPriority::from_score(lead_score);
    let challenges = submission.biggest_challenges.join(", ");

    let sections: [(&str, Vec<(&str, String)>); 4] = [
        (
            "Contact",
            vec![
                ("Name", contact.full_name()),
                ("Email", contact.email.clone()),
                ("Company", company.to_string()),
                ("Phone", contact.phone.clone()),
                ("Website", contact.website.clone()),
            ],
        ),
        (
            "Business Metrics",
            vec![
                ("Monthly Revenue", format_currency(metrics.monthly_revenue, 0)),
                (
                    "Average Order Value",
                    format_currency(metrics.average_order_value, 2),
                ),
                ("Monthly Orders", format_money(metrics.monthly_orders, 0)),
                ("Category", metrics.business_category.to_string()),
                (
                    "Conversion Rate",
                    format!("{}%", format_money(metrics.current_conversion_rate, 1)),
                ),
                (
                    "Cart Abandonment",
                    format!("{}%", format_money(metrics.cart_abandonment_rate, 1)),
                ),
                (
                    "Monthly Ad Spend",
                    format_currency(submission.monthly_ad_spend, 0),
                ),
                ("Business Stage", submission.business_stage.clone()),
                (
                    "Manual Task Hours / Week",
                    submission.hours_week_manual_tasks.clone(),
                ),
                ("Biggest Challenges", challenges),
            ],
        ),
        (
            "Projection",
            vec![
                (
                    "Monthly Increase",
                    format_currency(projection.monthly_increase, 0),
                ),
                (
                    "Annual Increase",
                    format_currency(projection.annual_increase, 0),
                ),
                (
                    "Monthly ROI",
                    format!("{}%", format_money(projection.monthly_roi, 0)),
                ),
                (
                    "Payback Period",
                    format!("{} months", format_money(projection.payback_period, 1)),
                ),
            ],
        ),
        (
            "Follow-up",
            vec![
                ("Lead Score", format!("{lead_score}/100")),
                ("Priority", priority.recommendation().to_string()),
            ],
        ),
    ];

    let mut html_body = String::new();
    let mut text = String::new();
    for (heading, fields) in &sections {
        html_body.push_str(&format!("<h2>{}</h2>\n", esc(heading)));
        text.push_str(&format!("{heading}\n"));
        for (label, value) in fields {
            html_body.push_str(&row(label, or_dash(value)));
            text.push_str(&format!("- {label}: {}\n", or_dash(value)));
        }
        text.push('\n');
    }

    let reply_to = (!contact.email.trim().is_empty())
        .then(|| EmailAddress::named(contact.email.trim(), contact.full_name()));

    EmailMessage {
        to: EmailAddress::new(notify_email),
        subject: format!("New ROI Calculator Lead - {company} (Score: {lead_score}/100)"),
        html: layout("New ROI Calculator Lead", &html_body),
        text: Some(text),
        reply_to,
        categories: vec!["lead-notification".into()],
    }
}

pub fn payment_confirmation(receipt: &PaymentReceipt, paid_at: DateTime<Utc>) -> EmailMessage {
    let amount = format_currency(receipt.amount, 2);
    let date = paid_at.format("%B %d, %Y").to_string();
    let recurring_html = if receipt.recurring {
        "<p><strong>Billing:</strong> Monthly recurring payment set up</p>\n"
    } else {
        ""
    };
    let recurring_text = if receipt.recurring {
        "- Billing: Monthly recurring payment set up\n"
    } else {
        ""
    };

    let html = layout(
        "Payment Confirmation",
        &format!(
            "<p>Hi {name},</p>\n<p>Thank you! Your payment was received and your onboarding is now underway.</p>\n{plan}{amount_row}{date_row}{recurring_html}<p>Our team will reach out within one business day to schedule your kickoff call.</p>",
            name = esc(&receipt.customer_name),
            plan = row("Plan", &receipt.plan_name),
            amount_row = row("Amount", &amount),
            date_row = row("Date", &date),
        ),
    );
    let text = format!(
        "Hi {name},\n\nThank you! Your payment was received.\n\n- Plan: {plan}\n- Amount: {amount}\n- Date: {date}\n{recurring_text}\nOur team will reach out within one business day to schedule your kickoff call.\n",
        name = receipt.customer_name,
        plan = receipt.plan_name,
    );

    EmailMessage {
        to: EmailAddress::named(&receipt.customer_email, &receipt.customer_name),
        subject: format!("Payment Confirmation - {}", receipt.plan_name),
        html,
        text: Some(text),
        reply_to: None,
        categories: vec!["payment-confirmation".into()],
    }
}

pub fn payment_notification(
    receipt: &PaymentReceipt,
    notify_email: &str,
    paid_at: DateTime<Utc>,
) -> EmailMessage {
    let company = receipt.company_or_na();
    let amount = format_currency(receipt.amount, 2);
    let timestamp = paid_at.format("%Y-%m-%d %H:%M:%S UTC").to_string();
    let recurring = if receipt.recurring {
        "Yes - Monthly billing set up"
    } else {
        "No - One-time payment only"
    };

    let fields = [
        ("Customer", receipt.customer_name.as_str()),
        ("Email", receipt.customer_email.as_str()),
        ("Company", company),
        ("Plan", receipt.plan_name.as_str()),
        ("Amount", amount.as_str()),
        ("Received", timestamp.as_str()),
        ("Recurring", recurring),
    ];
    let html_rows: String = fields.iter().map(|(l, v)| row(l, v)).collect();
    let text_rows: String = fields
        .iter()
        .map(|(l, v)| format!("- {l}: {v}\n"))
        .collect();

    EmailMessage {
        to: EmailAddress::new(notify_email),
        subject: format!("New Payment Received - {} - {company}", receipt.plan_name),
        html: layout("New Payment Received", &html_rows),
        text: Some(format!("New payment received\n\n{text_rows}")),
        reply_to: Some(EmailAddress::named(
            &receipt.customer_email,
            &receipt.customer_name,
        )),
        categories: vec!["payment-notification".into()],
    }
}

/// Delivery check for `/api/test-email`.
pub fn test_message(to: &str, sent_at: DateTime<Utc>) -> EmailMessage {
    let stamp = sent_at.to_rfc3339();
    EmailMessage {
        to: EmailAddress::new(to),
        subject: "Email Function Test".into(),
        html: layout(
            "Email Test",
            &format!(
                "<p>This is a test email to verify that email delivery is working.</p>\n{}",
                row("Sent", &stamp)
            ),
        ),
        text: Some(format!(
            "This is a test email to verify that email delivery is working.\nSent: {stamp}\n"
        )),
        reply_to: None,
        categories: vec!["test".into()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use growthdesk_core::{project, BusinessCategory, BusinessMetricsInput, ContactDetails};

    fn submission() -> LeadSubmission {
        LeadSubmission {
            metrics: BusinessMetricsInput {
                monthly_revenue: 50_000.0,
                average_order_value: 80.0,
                monthly_orders: 625.0,
                business_category: BusinessCategory::FashionApparel,
                current_conversion_rate: 2.5,
                cart_abandonment_rate: 70.0,
            },
            contact: ContactDetails {
                first_name: "Ada".into(),
                last_name: "Lovelace".into(),
                email: "ada@shop.example".into(),
                company: "<Analytical & Co>".into(),
                ..Default::default()
            },
            business_stage: "growth".into(),
            hours_week_manual_tasks: "15".into(),
            biggest_challenges: vec!["Cart abandonment".into(), "Low repeat rate".into()],
            monthly_ad_spend: 4000.0,
        }
    }

    fn receipt() -> PaymentReceipt {
        PaymentReceipt {
            customer_email: "ada@shop.example".into(),
            customer_name: "Ada".into(),
            company: None,
            plan_name: "Professional Plan".into(),
            amount: 4997.0,
            recurring: true,
        }
    }

    #[test]
    fn roi_report_subject_and_figures() {
        let s = submission();
        let p = project(&s.metrics);
        let msg = roi_report(&s, &p, "https://book.example/call?a=1&b=2");

        assert_eq!(
            msg.subject,
            "Your Personalized ROI Report - $5,250/month Growth Potential"
        );
        assert_eq!(msg.to.email, "ada@shop.example");
        assert!(msg.html.contains("$55,250"));
        assert!(msg.html.contains("2.5% → 3.5%"));
        assert!(msg.html.contains("https://book.example/call?a=1&amp;b=2"));
        assert!(msg.text.unwrap().contains("- Recovered Orders per Month: 66"));
    }

    #[test]
    fn lead_notification_escapes_and_prioritises() {
        let s = submission();
        let p = project(&s.metrics);
        let msg = lead_notification(&s, &p, 40, "sales@shop.example");

        assert_eq!(
            msg.subject,
            "New ROI Calculator Lead - <Analytical & Co> (Score: 40/100)"
        );
        assert!(msg.html.contains("&lt;Analytical &amp; Co&gt;"));
        assert!(!msg.html.contains("<Analytical"));
        assert!(msg.html.contains("Cart abandonment, Low repeat rate"));
        assert!(msg.html.contains("Standard Priority - Contact within 48 hours"));
        assert!(msg.html.contains("1.0 months"));
        assert_eq!(msg.to.email, "sales@shop.example");
        assert_eq!(msg.reply_to.unwrap().email, "ada@shop.example");
    }

    #[test]
    fn lead_without_email_has_no_reply_to() {
        let mut s = submission();
        s.contact.email.clear();
        s.contact.company.clear();
        let p = project(&s.metrics);
        let msg = lead_notification(&s, &p, 75, "sales@shop.example");
        assert!(msg.reply_to.is_none());
        assert!(msg.subject.starts_with("New ROI Calculator Lead - Unknown Company"));
        assert!(msg.html.contains("High Priority"));
    }

    #[test]
    fn payment_emails() {
        let at = Utc.with_ymd_and_hms(2026, 3, 5, 14, 30, 0).unwrap();
        let confirmation = payment_confirmation(&receipt(), at);
        assert_eq!(confirmation.subject, "Payment Confirmation - Professional Plan");
        assert!(confirmation.html.contains("$4,997.00"));
        assert!(confirmation.html.contains("March 05, 2026"));
        assert!(confirmation.html.contains("Monthly recurring payment"));

        let mut one_time = receipt();
        one_time.recurring = false;
        let notification = payment_notification(&one_time, "sales@shop.example", at);
        assert_eq!(
            notification.subject,
            "New Payment Received - Professional Plan - N/A"
        );
        assert!(notification.html.contains("No - One-time payment only"));
        assert!(notification.text.unwrap().contains("2026-03-05 14:30:00 UTC"));
    }
}
