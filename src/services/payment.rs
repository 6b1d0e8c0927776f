// ============================================================================
// PASSERELLE DE PAIEMENT
// ============================================================================
//
// Description:
//   Le checkout ne connaît que le trait PaymentGateway. L'implémentation
//   de production parle à l'API GraphQL de Braintree avec reqwest.
//
// Workflow:
//   1. Le frontend demande un client token (GET /product/braintree/token)
//   2. Le drop-in Braintree produit un nonce à usage unique
//   3. Le backend appelle sale(montant, nonce) (POST /product/braintree/payment)
//
// Points d'attention:
//   - Pas de retry: une erreur réseau remonte directement au client
//   - Un refus (carte déclinée, etc.) n'est pas une erreur: success = false
//
// ============================================================================

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};
use std::str::FromStr;
use thiserror::Error;

use crate::config::BraintreeConfig;
use crate::models::payment::{PaymentResult, PaymentTransaction};

const BRAINTREE_VERSION: &str = "2019-01-01";

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("gateway request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("gateway returned errors: {0}")]
    Gateway(String),

    #[error("unexpected gateway response: {0}")]
    Malformed(String),

    #[error("payment gateway is not configured")]
    NotConfigured,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Token pour initialiser le drop-in côté client
    async fn generate_client_token(&self) -> Result<String, PaymentError>;

    /// Débite `amount` sur le moyen de paiement représenté par `nonce`
    async fn sale(&self, amount: Decimal, nonce: &str) -> Result<PaymentResult, PaymentError>;
}

pub struct BraintreeGateway {
    client: reqwest::Client,
    config: BraintreeConfig,
}

#[derive(Deserialize)]
struct GraphQlResponse {
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

impl BraintreeGateway {
    pub fn new(config: BraintreeConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    async fn graphql(&self, query: &str, variables: Value) -> Result<GraphQlResponse, PaymentError> {
        if self.config.public_key.is_empty() || self.config.private_key.is_empty() {
            return Err(PaymentError::NotConfigured);
        }

        let response = self
            .client
            .post(self.config.environment.graphql_url())
            .basic_auth(&self.config.public_key, Some(&self.config.private_key))
            .header("Braintree-Version", BRAINTREE_VERSION)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json::<GraphQlResponse>().await?)
    }
}

fn join_errors(errors: &[GraphQlError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

#[async_trait]
impl PaymentGateway for BraintreeGateway {
    async fn generate_client_token(&self) -> Result<String, PaymentError> {
        let query = "mutation ClientToken($input: CreateClientTokenInput) { \
                     createClientToken(input: $input) { clientToken } }";
        let variables = json!({ "input": { "merchantAccountId": self.config.merchant_id } });

        let response = self.graphql(query, variables).await?;
        if !response.errors.is_empty() {
            return Err(PaymentError::Gateway(join_errors(&response.errors)));
        }

        response
            .data
            .as_ref()
            .and_then(|d| d.pointer("/createClientToken/clientToken"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| PaymentError::Malformed("missing clientToken".to_string()))
    }

    async fn sale(&self, amount: Decimal, nonce: &str) -> Result<PaymentResult, PaymentError> {
        let query = "mutation Charge($input: ChargePaymentMethodInput!) { \
                     chargePaymentMethod(input: $input) { \
                     transaction { id status amount { value } } } }";
        let variables = json!({
            "input": {
                "paymentMethodId": nonce,
                "transaction": { "amount": amount.round_dp(2).to_string() }
            }
        });

        let response = self.graphql(query, variables).await?;

        // Refus de la passerelle (validation, carte déclinée...)
        if !response.errors.is_empty() {
            return Ok(PaymentResult {
                success: false,
                transaction: None,
                message: Some(join_errors(&response.errors)),
            });
        }

        let transaction = response
            .data
            .as_ref()
            .and_then(|d| d.pointer("/chargePaymentMethod/transaction"))
            .ok_or_else(|| PaymentError::Malformed("missing transaction".to_string()))?;

        let id = transaction["id"].as_str().unwrap_or_default().to_string();
        let status = transaction["status"].as_str().unwrap_or_default().to_string();
        let charged = transaction
            .pointer("/amount/value")
            .and_then(Value::as_str)
            .and_then(|v| Decimal::from_str(v).ok())
            .unwrap_or(amount);

        Ok(PaymentResult {
            success: !id.is_empty() && !is_failed_status(&status),
            transaction: Some(PaymentTransaction {
                id,
                amount: charged,
                status,
            }),
            message: None,
        })
    }
}

fn is_failed_status(status: &str) -> bool {
    matches!(
        status,
        "FAILED" | "GATEWAY_REJECTED" | "PROCESSOR_DECLINED" | "SETTLEMENT_DECLINED" | "VOIDED"
    )
}
