mod common;

use common::{RECIPIENT, ScriptedSubmitter, StubSettlement, StubSigner, engine};
use rand::Rng;
use stablepay::application::validator::validate;
use stablepay::domain::outcome::{FailureReason, PaymentOutcome};
use stablepay::domain::request::PaymentRequest;
use stablepay::error::ValidationError;

#[tokio::test]
async fn test_non_positive_amounts_never_reach_network() {
    let mut rng = rand::thread_rng();
    let submitter = ScriptedSubmitter::new(vec![Ok("tx-1".into())]);
    let settlement = StubSettlement::confirming_after(0);
    let engine = engine(submitter.clone(), settlement.clone());

    for _ in 0..50 {
        let cents: u64 = rng.gen_range(0..=1_000_000);
        let amount = format!("-{}.{:02}", cents / 100, cents % 100);
        let request = PaymentRequest::new(amount.clone(), RECIPIENT, "Unlock insights");

        assert!(
            matches!(validate(&request), Err(ValidationError::Amount(_))),
            "accepted {amount}"
        );

        let outcome = engine.pay(&request, &StubSigner::new()).await;
        assert!(matches!(
            outcome,
            PaymentOutcome::Failure {
                reason: FailureReason::Validation { .. },
                attempts_made: 0,
                definitive: true,
            }
        ));
    }

    assert_eq!(submitter.calls(), 0);
    assert_eq!(settlement.network_calls(), 0);
}

#[tokio::test]
async fn test_malformed_recipient_rejected_before_submission() {
    let submitter = ScriptedSubmitter::new(vec![Ok("tx-1".into())]);
    let settlement = StubSettlement::confirming_after(0);
    let engine = engine(submitter.clone(), settlement.clone());

    for recipient in [
        "",
        "0x",
        "742d35Cc6634C0532925a3b8D4C9db96C4b4d8b6",
        "0x742d35Cc6634C0532925a3b8D4C9db96C4b4d8",
        "0xZZ2d35Cc6634C0532925a3b8D4C9db96C4b4d8b6",
    ] {
        let request = PaymentRequest::new("2.99", recipient, "Unlock insights");
        let outcome = engine.pay(&request, &StubSigner::new()).await;

        match outcome {
            PaymentOutcome::Failure {
                reason:
                    FailureReason::Validation {
                        error: ValidationError::Recipient(_),
                    },
                ..
            } => {}
            other => panic!("{recipient:?} produced {other:?}"),
        }
    }

    assert_eq!(submitter.calls(), 0);
    assert_eq!(settlement.network_calls(), 0);
}

#[test]
fn test_blank_description_rejected() {
    let request = PaymentRequest::new("2.99", RECIPIENT, "   ");
    assert_eq!(validate(&request), Err(ValidationError::Description));
}

#[test]
fn test_excess_precision_rejected() {
    let request = PaymentRequest::new("0.0000001", RECIPIENT, "Dust");
    assert!(matches!(validate(&request), Err(ValidationError::Amount(_))));
}
