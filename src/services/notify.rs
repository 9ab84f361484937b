//! Outbound ticket confirmations.
//!
//! Delivery is best-effort: a failed send is logged and never affects the
//! booking that triggered it.

use serde_json::json;
use tracing::{info, warn};

/// Ticket confirmation payload handed to the notification collaborator.
#[derive(Debug, Clone)]
pub struct TicketConfirmation {
    pub pnr: String,
    pub train_name: String,
    pub train_number: String,
    pub from_station: String,
    pub to_station: String,
    pub travel_date: String,
    pub departure_time: Option<String>,
    pub arrival_time: Option<String>,
    pub passenger_details: String,
    /// Total fare in minor currency units
    pub total_price: i64,
    pub recipient_email: String,
}

/// Confirmation channel.
#[derive(Debug, Clone)]
pub enum Notifier {
    /// POST the confirmation as JSON to a webhook (mail gateway or similar).
    Webhook { client: reqwest::Client, url: String },
    /// No channel configured; log the confirmation instead.
    Log,
}

impl Notifier {
    pub fn from_webhook_url(url: Option<String>) -> Self {
        match url {
            Some(url) => Self::Webhook {
                client: reqwest::Client::new(),
                url,
            },
            None => Self::Log,
        }
    }

    pub async fn send(&self, ticket: &TicketConfirmation) {
        match self {
            Notifier::Webhook { client, url } => {
                let payload = json!({
                    "subject": "Your Train Ticket Confirmation",
                    "recipient": ticket.recipient_email,
                    "pnr": ticket.pnr,
                    "train": format!("{} ({})", ticket.train_name, ticket.train_number),
                    "from": ticket.from_station,
                    "to": ticket.to_station,
                    "date": ticket.travel_date,
                    "departure": ticket.departure_time,
                    "arrival": ticket.arrival_time,
                    "passengers": ticket.passenger_details,
                    "total_fare": ticket.total_price,
                });
                match client.post(url).json(&payload).send().await {
                    Ok(response) if response.status().is_success() => {
                        info!(pnr = %ticket.pnr, "Delivered ticket confirmation");
                    }
                    Ok(response) => {
                        warn!(
                            pnr = %ticket.pnr,
                            status = %response.status(),
                            "Ticket confirmation rejected by webhook"
                        );
                    }
                    Err(e) => {
                        warn!(pnr = %ticket.pnr, error = %e, "Failed to deliver ticket confirmation");
                    }
                }
            }
            Notifier::Log => {
                info!(
                    pnr = %ticket.pnr,
                    recipient = %ticket.recipient_email,
                    total_fare = ticket.total_price,
                    "Ticket confirmed (no notification channel configured)"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_webhook_url_falls_back_to_logging() {
        assert!(matches!(Notifier::from_webhook_url(None), Notifier::Log));
        assert!(matches!(
            Notifier::from_webhook_url(Some("http://mailer.local/send".into())),
            Notifier::Webhook { .. }
        ));
    }
}
