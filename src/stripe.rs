use rocket::http::Status;
use serde::Deserialize;

use crate::resp::problem::Problem;

static API_BASE_URL: &str = "https://api.stripe.com";

/// Thin client for the payment processor's PaymentIntents API. The intent is
/// created server-side and its client secret handed to the web client, which
/// confirms the card payment directly with the processor.
#[derive(Debug, Clone)]
pub struct StripeClient {
    secret_key: Option<String>,
    api_base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeError,
}

#[derive(Debug, Deserialize)]
struct StripeError {
    message: String,
}

fn processor_problem(detail: impl ToString) -> Problem {
    Problem::new_untyped(Status::InternalServerError, "Payment processor error.")
        .detail(detail)
        .clone()
}

/// Converts a decimal price into the smallest currency unit the processor
/// charges in.
pub fn amount_in_cents(price: f64) -> i64 {
    (price * 100.0).round() as i64
}

impl StripeClient {
    pub fn new(secret_key: Option<String>) -> StripeClient {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("unable to create payment processor HTTP client");

        StripeClient {
            secret_key,
            api_base_url: API_BASE_URL.to_string(),
            client,
        }
    }

    #[cfg(test)]
    fn with_api_base_url(mut self, url: impl ToString) -> StripeClient {
        self.api_base_url = url.to_string();
        self
    }

    fn intent_params(amount: i64) -> Vec<(&'static str, String)> {
        vec![
            ("amount", amount.to_string()),
            ("currency", "usd".to_string()),
            ("payment_method_types[]", "card".to_string()),
        ]
    }

    pub async fn create_payment_intent(&self, price: f64) -> Result<PaymentIntent, Problem> {
        let secret_key = self
            .secret_key
            .as_ref()
            .ok_or_else(|| processor_problem("Payment processor secret key isn't configured."))?;

        let amount = amount_in_cents(price);
        tracing::debug!("creating payment intent for {} cents", amount);

        let url = format!("{}/v1/payment_intents", self.api_base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(secret_key)
            .form(&Self::intent_params(amount))
            .send()
            .await
            .map_err(Problem::from)?;

        let status = response.status();
        let body = response.text().await.map_err(Problem::from)?;

        if !status.is_success() {
            tracing::error!("payment processor error: status={}, body={}", status, body);

            if let Ok(error_response) = serde_json::from_str::<StripeErrorResponse>(&body) {
                return Err(processor_problem(error_response.error.message));
            }

            return Err(processor_problem(format!("HTTP {}", status)));
        }

        let intent: PaymentIntent = serde_json::from_str(&body)
            .map_err(|_| processor_problem("Unable to parse payment processor response."))?;

        tracing::info!("created payment intent: {}", intent.id);

        Ok(intent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_is_rounded_to_cents() {
        assert_eq!(amount_in_cents(50.0), 5000);
        assert_eq!(amount_in_cents(19.99), 1999);
        assert_eq!(amount_in_cents(0.555), 56);
    }

    #[test]
    fn intent_params_charge_cards_in_usd() {
        let params = StripeClient::intent_params(5000);

        assert!(params.contains(&("amount", "5000".to_string())));
        assert!(params.contains(&("currency", "usd".to_string())));
        assert!(params.contains(&("payment_method_types[]", "card".to_string())));
    }

    #[tokio::test]
    async fn missing_secret_key_is_an_error() {
        let client = StripeClient::new(None).with_api_base_url("http://localhost:0");

        assert!(client.create_payment_intent(10.0).await.is_err());
    }
}
