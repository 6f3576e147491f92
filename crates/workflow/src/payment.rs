//! Payment and publication gate
//!
//! Mediates the payment-pending -> published edge. The gateway itself is
//! an external collaborator behind [`PaymentGateway`]; verification is
//! idempotent and never advances the manuscript on ambiguous input.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use scholarflow_common::config::PaymentConfig;
use scholarflow_common::errors::{AppError, Result};
use scholarflow_common::metrics::record_gateway_call;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::state::WorkflowState;
use crate::store::ManuscriptStore;

/// Payment verification status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentStatus {
    Pending,
    Verified,
    Failed,
}

/// Payment record attached to a manuscript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub manuscript_id: Uuid,
    pub amount: u64,
    pub currency: String,
    pub order_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PaymentRecord {
    pub fn is_verified(&self) -> bool {
        self.status == PaymentStatus::Verified
    }
}

/// Response to a checkout initiation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkout {
    pub order_id: String,
    pub amount: u64,
    pub currency: String,
}

/// Order as created on the gateway
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: u64,
    pub currency: String,
}

/// Gateway-side payment capture status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureStatus {
    Created,
    Authorized,
    Captured,
    Failed,
}

/// Payment as reported by the gateway
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayPayment {
    pub id: String,
    pub order_id: String,
    pub status: CaptureStatus,
}

/// External payment gateway contract
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create an order for the given amount
    async fn create_order(&self, amount: u64, currency: &str, receipt: &str)
        -> Result<GatewayOrder>;

    /// Fetch the current state of a payment
    async fn fetch_payment(&self, payment_id: &str) -> Result<GatewayPayment>;
}

/// HTTP payment gateway client
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
    key_id: String,
    key_secret: String,
}

#[derive(Serialize)]
struct CreateOrderRequest<'a> {
    amount: u64,
    currency: &'a str,
    receipt: &'a str,
}

impl HttpGateway {
    /// Build a client from the payment configuration
    pub fn from_config(config: &PaymentConfig) -> Result<Self> {
        let key_id = config
            .key_id
            .clone()
            .ok_or_else(|| AppError::Configuration {
                message: "payment.key_id is required for the HTTP gateway".to_string(),
            })?;
        let key_secret = config
            .key_secret
            .clone()
            .ok_or_else(|| AppError::Configuration {
                message: "payment.key_secret is required for the HTTP gateway".to_string(),
            })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Configuration {
                message: format!("Failed to build gateway HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url: config.gateway_url.trim_end_matches('/').to_string(),
            key_id,
            key_secret,
        })
    }
}

#[async_trait]
impl PaymentGateway for HttpGateway {
    async fn create_order(
        &self,
        amount: u64,
        currency: &str,
        receipt: &str,
    ) -> Result<GatewayOrder> {
        let start = Instant::now();
        let url = format!("{}/v1/orders", self.base_url);

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&CreateOrderRequest {
                amount,
                currency,
                receipt,
            })
            .send()
            .await
            .map_err(|e| AppError::GatewayError {
                message: format!("Order creation request failed: {}", e),
            })?;

        record_gateway_call("create_order", start.elapsed().as_secs_f64());

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::GatewayError {
                message: format!("Order creation failed with {}: {}", status, body),
            });
        }

        response.json().await.map_err(|e| AppError::GatewayError {
            message: format!("Failed to parse order response: {}", e),
        })
    }

    async fn fetch_payment(&self, payment_id: &str) -> Result<GatewayPayment> {
        let start = Instant::now();
        let url = format!("{}/v1/payments/{}", self.base_url, payment_id);

        let response = self
            .client
            .get(&url)
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .send()
            .await
            .map_err(|e| AppError::GatewayError {
                message: format!("Payment fetch failed: {}", e),
            })?;

        record_gateway_call("fetch_payment", start.elapsed().as_secs_f64());

        if !response.status().is_success() {
            let status = response.status();
            return Err(AppError::GatewayError {
                message: format!("Payment fetch failed with {}", status),
            });
        }

        response.json().await.map_err(|e| AppError::GatewayError {
            message: format!("Failed to parse payment response: {}", e),
        })
    }
}

/// Deterministic in-process gateway for development and tests.
///
/// Unknown payments report as captured; specific capture states can be
/// seeded with [`SandboxGateway::seed_payment`].
#[derive(Default)]
pub struct SandboxGateway {
    payments: RwLock<std::collections::HashMap<String, CaptureStatus>>,
}

impl SandboxGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the capture state the gateway will report for a payment id
    pub async fn seed_payment(&self, payment_id: &str, status: CaptureStatus) {
        self.payments
            .write()
            .await
            .insert(payment_id.to_string(), status);
    }
}

#[async_trait]
impl PaymentGateway for SandboxGateway {
    async fn create_order(
        &self,
        amount: u64,
        currency: &str,
        _receipt: &str,
    ) -> Result<GatewayOrder> {
        let suffix: [u8; 8] = rand::random();
        Ok(GatewayOrder {
            id: format!("order_{}", hex::encode(suffix)),
            amount,
            currency: currency.to_string(),
        })
    }

    async fn fetch_payment(&self, payment_id: &str) -> Result<GatewayPayment> {
        let status = self
            .payments
            .read()
            .await
            .get(payment_id)
            .copied()
            .unwrap_or(CaptureStatus::Captured);
        Ok(GatewayPayment {
            id: payment_id.to_string(),
            order_id: String::new(),
            status,
        })
    }
}

/// Compute the checkout callback signature: SHA-256 over
/// `order_id|payment_id` keyed with the gateway secret.
pub fn checkout_signature(order_id: &str, payment_id: &str, secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(order_id.as_bytes());
    hasher.update(b"|");
    hasher.update(payment_id.as_bytes());
    hasher.update(b"|");
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// The payment/publication gate
pub struct PaymentGate {
    store: Arc<ManuscriptStore>,
    gateway: Arc<dyn PaymentGateway>,
    secret: String,
    plans: std::collections::HashMap<String, u64>,
}

impl PaymentGate {
    pub fn new(
        store: Arc<ManuscriptStore>,
        gateway: Arc<dyn PaymentGateway>,
        secret: String,
        plans: std::collections::HashMap<String, u64>,
    ) -> Self {
        Self {
            store,
            gateway,
            secret,
            plans,
        }
    }

    /// Initiate checkout for a manuscript awaiting payment. A plan id
    /// selects a configured plan fee; otherwise the manuscript's own fee
    /// is charged.
    ///
    /// Fails with `AlreadyPaid` if a verified record exists, and with
    /// `IllegalTransition` when the manuscript is not at
    /// `payment-pending`. A failed earlier attempt is replaced by the
    /// fresh order.
    pub async fn initiate_checkout(
        &self,
        manuscript_id: Uuid,
        plan_id: Option<&str>,
    ) -> Result<Checkout> {
        let manuscript = self.store.get(manuscript_id).await?;

        if manuscript.has_verified_payment() {
            return Err(AppError::AlreadyPaid {
                manuscript_id: manuscript_id.to_string(),
            });
        }
        if manuscript.status != WorkflowState::PaymentPending {
            return Err(AppError::IllegalTransition {
                from: manuscript.status.as_str().to_string(),
                attempted: WorkflowState::Published.as_str().to_string(),
            });
        }

        let amount = match plan_id {
            Some(plan) => {
                self.plans
                    .get(plan)
                    .copied()
                    .ok_or_else(|| AppError::Validation {
                        message: format!("Unknown payment plan '{plan}'"),
                        field: Some("plan_id".to_string()),
                    })?
            }
            None => manuscript.fee.amount,
        };

        let order = self
            .gateway
            .create_order(amount, &manuscript.fee.currency, &manuscript.code)
            .await?;

        let checkout = Checkout {
            order_id: order.id.clone(),
            amount: order.amount,
            currency: order.currency.clone(),
        };

        self.store
            .update(manuscript_id, |m| {
                // Re-check under the lock; a concurrent verify may have landed
                if m.has_verified_payment() {
                    return Err(AppError::AlreadyPaid {
                        manuscript_id: manuscript_id.to_string(),
                    });
                }
                let now = Utc::now();
                m.payment = Some(PaymentRecord {
                    manuscript_id,
                    amount: order.amount,
                    currency: order.currency.clone(),
                    order_id: order.id.clone(),
                    payment_id: None,
                    status: PaymentStatus::Pending,
                    created_at: now,
                    updated_at: now,
                });
                m.updated_at = now;
                Ok(())
            })
            .await?;

        metrics::counter!("scholarflow_checkouts_initiated_total").increment(1);
        tracing::info!(
            manuscript_id = %manuscript_id,
            order_id = %checkout.order_id,
            amount = checkout.amount,
            plan = ?plan_id,
            "Checkout initiated"
        );

        Ok(checkout)
    }

    /// Verify a payment callback and, on success, publish the manuscript.
    ///
    /// Idempotent: repeated calls with the ids of an already verified
    /// payment return the same record without a second transition. On
    /// any failure the manuscript stays at `payment-pending`, the failed
    /// attempt is recorded, and `VerificationFailed` is returned.
    pub async fn verify(
        &self,
        manuscript_id: Uuid,
        payment_id: &str,
        order_id: &str,
        signature: &str,
        actor: Uuid,
    ) -> Result<PaymentRecord> {
        let manuscript = self.store.get(manuscript_id).await?;

        let record = manuscript
            .payment
            .clone()
            .ok_or_else(|| AppError::VerificationFailed {
                message: "No checkout has been initiated".to_string(),
            })?;

        // Idempotent replay of a successful verification
        if record.is_verified() {
            if record.payment_id.as_deref() == Some(payment_id) && record.order_id == order_id {
                return Ok(record);
            }
            return Err(AppError::AlreadyPaid {
                manuscript_id: manuscript_id.to_string(),
            });
        }

        if record.order_id != order_id {
            return self
                .fail_attempt(manuscript_id, payment_id, "Unknown order id")
                .await;
        }

        let expected = checkout_signature(order_id, payment_id, &self.secret);
        if expected != signature {
            return self
                .fail_attempt(manuscript_id, payment_id, "Signature mismatch")
                .await;
        }

        let mut payment = self.gateway.fetch_payment(payment_id).await?;
        if matches!(payment.status, CaptureStatus::Created | CaptureStatus::Authorized) {
            // One immediate re-check for an in-flight capture, never more
            payment = self.gateway.fetch_payment(payment_id).await?;
        }
        if payment.status != CaptureStatus::Captured {
            return self
                .fail_attempt(manuscript_id, payment_id, "Payment not captured")
                .await;
        }

        let (record, _) = self
            .store
            .update(manuscript_id, |m| {
                let mut record =
                    m.payment
                        .clone()
                        .ok_or_else(|| AppError::VerificationFailed {
                            message: "No checkout has been initiated".to_string(),
                        })?;
                if record.is_verified() {
                    // Concurrent verify won the race; replay semantics
                    return Ok(record);
                }
                // Transition first so a guard failure leaves the record intact
                m.apply_transition(WorkflowState::Published, actor, None)?;
                record.payment_id = Some(payment_id.to_string());
                record.status = PaymentStatus::Verified;
                record.updated_at = Utc::now();
                m.payment = Some(record.clone());
                Ok(record)
            })
            .await?;

        metrics::counter!("scholarflow_payments_verified_total").increment(1);
        tracing::info!(
            manuscript_id = %manuscript_id,
            payment_id = %payment_id,
            "Payment verified, manuscript published"
        );

        Ok(record)
    }

    /// Roll a stalled or failed payment back to `accepted` so the
    /// manuscript is never silently parked at `payment-pending`.
    pub async fn roll_back(&self, manuscript_id: Uuid, actor: Uuid, reason: &str) -> Result<()> {
        let (out, _) = self
            .store
            .update(manuscript_id, |m| {
                if m.has_verified_payment() {
                    return Err(AppError::AlreadyPaid {
                        manuscript_id: manuscript_id.to_string(),
                    });
                }
                m.apply_transition(
                    WorkflowState::Accepted,
                    actor,
                    Some(reason.to_string()),
                )
            })
            .await?;
        Ok(out)
    }

    /// Record a failed attempt and surface the error; no state change
    /// beyond the record itself.
    async fn fail_attempt(
        &self,
        manuscript_id: Uuid,
        payment_id: &str,
        message: &str,
    ) -> Result<PaymentRecord> {
        self.store
            .update(manuscript_id, |m| {
                if let Some(record) = m.payment.as_mut() {
                    record.payment_id = Some(payment_id.to_string());
                    record.status = PaymentStatus::Failed;
                    record.updated_at = Utc::now();
                }
                Ok(())
            })
            .await?;

        metrics::counter!("scholarflow_payments_failed_total").increment(1);
        tracing::warn!(
            manuscript_id = %manuscript_id,
            payment_id = %payment_id,
            reason = %message,
            "Payment verification failed"
        );

        Err(AppError::VerificationFailed {
            message: message.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{FinalVerdict, ReviewSubmission, Submission, WorkflowEngine};
    use crate::model::{Author, Files, Sections};
    use crate::review::Recommendation;
    use scholarflow_common::config::ReviewConfig;

    const SECRET: &str = "sandbox_secret";

    fn engine(store: Arc<ManuscriptStore>, fee: u64) -> WorkflowEngine {
        let review = ReviewConfig {
            max_reviewers_per_round: 5,
            max_rounds: 4,
            code_prefix: "SF".to_string(),
        };
        let payment = PaymentConfig {
            publication_fee: fee,
            ..PaymentConfig::default()
        };
        WorkflowEngine::new(store, &review, &payment)
    }

    /// Drive a fresh manuscript to payment-pending
    async fn awaiting_payment(engine: &WorkflowEngine) -> Uuid {
        let editor = Uuid::new_v4();
        let reviewer = Uuid::new_v4();
        let m = engine
            .submit(
                Uuid::new_v4(),
                Submission {
                    title: "Streaming Joins Under Skew".to_string(),
                    abstract_text: "Skew-aware joins.".to_string(),
                    sections: Sections::default(),
                    keywords: Vec::new(),
                    authors: vec![Author {
                        name: "L. Moreau".into(),
                        email: "l.moreau@example.edu".into(),
                        university: "Example University".into(),
                        affiliation: None,
                    }],
                    files: Files::default(),
                },
            )
            .await
            .unwrap();
        engine.assign_editor(m.id, editor, editor).await.unwrap();
        engine
            .assign_reviewers(m.id, vec![reviewer], editor)
            .await
            .unwrap();
        engine
            .record_review(
                m.id,
                1,
                reviewer,
                ReviewSubmission {
                    decision: Recommendation::Accept,
                    checklist: Vec::new(),
                    comments_for_author: "Sound.".to_string(),
                    confidential_comments_to_editor: None,
                    optional_file: None,
                },
            )
            .await
            .unwrap();
        engine.close_round(m.id, 1, editor).await.unwrap();
        engine
            .record_decision(m.id, FinalVerdict::Accepted, None, editor)
            .await
            .unwrap();
        m.id
    }

    fn gate(store: Arc<ManuscriptStore>) -> (PaymentGate, Arc<SandboxGateway>) {
        let sandbox = Arc::new(SandboxGateway::new());
        let plans = std::collections::HashMap::from([("institutional".to_string(), 29900)]);
        (
            PaymentGate::new(store, sandbox.clone(), SECRET.to_string(), plans),
            sandbox,
        )
    }

    #[test]
    fn test_signature_is_deterministic() {
        let a = checkout_signature("order_1", "pay_1", SECRET);
        let b = checkout_signature("order_1", "pay_1", SECRET);
        assert_eq!(a, b);
        assert_ne!(a, checkout_signature("order_1", "pay_1", "other"));
        assert_ne!(a, checkout_signature("order_2", "pay_1", SECRET));
    }

    #[tokio::test]
    async fn test_checkout_then_verify_publishes() {
        let store = Arc::new(ManuscriptStore::new());
        let engine = engine(store.clone(), 49900);
        let id = awaiting_payment(&engine).await;
        let (gate, _) = gate(store.clone());

        let checkout = gate.initiate_checkout(id, None).await.unwrap();
        assert_eq!(checkout.amount, 49900);
        assert_eq!(checkout.currency, "USD");

        let signature = checkout_signature(&checkout.order_id, "pay_1", SECRET);
        let record = gate
            .verify(id, "pay_1", &checkout.order_id, &signature, Uuid::new_v4())
            .await
            .unwrap();
        assert!(record.is_verified());

        let m = store.get(id).await.unwrap();
        assert_eq!(m.status, WorkflowState::Published);
        assert!(m.has_verified_payment());
    }

    #[tokio::test]
    async fn test_checkout_plan_selects_configured_fee() {
        let store = Arc::new(ManuscriptStore::new());
        let engine = engine(store.clone(), 49900);
        let id = awaiting_payment(&engine).await;
        let (gate, _) = gate(store.clone());

        let checkout = gate
            .initiate_checkout(id, Some("institutional"))
            .await
            .unwrap();
        assert_eq!(checkout.amount, 29900);
        assert_eq!(checkout.currency, "USD");
        assert_eq!(
            store.get(id).await.unwrap().payment.map(|p| p.amount),
            Some(29900)
        );

        let err = gate
            .initiate_checkout(id, Some("no-such-plan"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_verify_is_idempotent() {
        let store = Arc::new(ManuscriptStore::new());
        let engine = engine(store.clone(), 49900);
        let id = awaiting_payment(&engine).await;
        let (gate, _) = gate(store.clone());

        let checkout = gate.initiate_checkout(id, None).await.unwrap();
        let signature = checkout_signature(&checkout.order_id, "pay_1", SECRET);
        let actor = Uuid::new_v4();

        let first = gate
            .verify(id, "pay_1", &checkout.order_id, &signature, actor)
            .await
            .unwrap();
        let history_len = store.get(id).await.unwrap().history.len();

        let second = gate
            .verify(id, "pay_1", &checkout.order_id, &signature, actor)
            .await
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(store.get(id).await.unwrap().history.len(), history_len);
    }

    #[tokio::test]
    async fn test_bad_signature_fails_closed_then_recovers() {
        let store = Arc::new(ManuscriptStore::new());
        let engine = engine(store.clone(), 49900);
        let id = awaiting_payment(&engine).await;
        let (gate, _) = gate(store.clone());

        let checkout = gate.initiate_checkout(id, None).await.unwrap();
        let err = gate
            .verify(id, "pay_1", &checkout.order_id, "forged", Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::VerificationFailed { .. }));

        let m = store.get(id).await.unwrap();
        assert_eq!(m.status, WorkflowState::PaymentPending);
        assert_eq!(
            m.payment.as_ref().map(|p| p.status),
            Some(PaymentStatus::Failed)
        );

        // A fresh checkout replaces the failed attempt
        let retry = gate.initiate_checkout(id, None).await.unwrap();
        let signature = checkout_signature(&retry.order_id, "pay_2", SECRET);
        gate.verify(id, "pay_2", &retry.order_id, &signature, Uuid::new_v4())
            .await
            .unwrap();
        assert_eq!(
            store.get(id).await.unwrap().status,
            WorkflowState::Published
        );
    }

    #[tokio::test]
    async fn test_unknown_order_id_fails() {
        let store = Arc::new(ManuscriptStore::new());
        let engine = engine(store.clone(), 49900);
        let id = awaiting_payment(&engine).await;
        let (gate, _) = gate(store.clone());

        gate.initiate_checkout(id, None).await.unwrap();
        let signature = checkout_signature("order_unknown", "pay_1", SECRET);
        let err = gate
            .verify(id, "pay_1", "order_unknown", &signature, Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::VerificationFailed { .. }));
    }

    #[tokio::test]
    async fn test_uncaptured_payment_fails() {
        let store = Arc::new(ManuscriptStore::new());
        let engine = engine(store.clone(), 49900);
        let id = awaiting_payment(&engine).await;
        let (gate, sandbox) = gate(store.clone());

        let checkout = gate.initiate_checkout(id, None).await.unwrap();
        sandbox.seed_payment("pay_1", CaptureStatus::Failed).await;

        let signature = checkout_signature(&checkout.order_id, "pay_1", SECRET);
        let err = gate
            .verify(id, "pay_1", &checkout.order_id, &signature, Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::VerificationFailed { .. }));
        assert_eq!(
            store.get(id).await.unwrap().status,
            WorkflowState::PaymentPending
        );
    }

    #[tokio::test]
    async fn test_checkout_wrong_state_rejected() {
        let store = Arc::new(ManuscriptStore::new());
        let engine = engine(store.clone(), 49900);
        let m = engine
            .submit(
                Uuid::new_v4(),
                Submission {
                    title: "Premature Checkout".to_string(),
                    abstract_text: String::new(),
                    sections: Sections::default(),
                    keywords: Vec::new(),
                    authors: vec![Author {
                        name: "N. Author".into(),
                        email: "n@example.edu".into(),
                        university: "U".into(),
                        affiliation: None,
                    }],
                    files: Files::default(),
                },
            )
            .await
            .unwrap();
        let (gate, _) = gate(store);

        let err = gate.initiate_checkout(m.id, None).await.unwrap_err();
        assert!(matches!(err, AppError::IllegalTransition { .. }));
    }

    #[tokio::test]
    async fn test_checkout_after_verified_is_already_paid() {
        let store = Arc::new(ManuscriptStore::new());
        let engine = engine(store.clone(), 49900);
        let id = awaiting_payment(&engine).await;
        let (gate, _) = gate(store.clone());

        let checkout = gate.initiate_checkout(id, None).await.unwrap();
        let signature = checkout_signature(&checkout.order_id, "pay_1", SECRET);
        gate.verify(id, "pay_1", &checkout.order_id, &signature, Uuid::new_v4())
            .await
            .unwrap();

        let err = gate.initiate_checkout(id, None).await.unwrap_err();
        assert!(matches!(err, AppError::AlreadyPaid { .. }));
    }

    #[tokio::test]
    async fn test_roll_back_returns_to_accepted() {
        let store = Arc::new(ManuscriptStore::new());
        let engine = engine(store.clone(), 49900);
        let id = awaiting_payment(&engine).await;
        let (gate, _) = gate(store.clone());

        gate.initiate_checkout(id, None).await.unwrap();
        gate.roll_back(id, Uuid::new_v4(), "gateway timeout")
            .await
            .unwrap();

        let m = store.get(id).await.unwrap();
        assert_eq!(m.status, WorkflowState::Accepted);
        assert_eq!(
            m.history.last().unwrap().reason.as_deref(),
            Some("gateway timeout")
        );
    }
}
