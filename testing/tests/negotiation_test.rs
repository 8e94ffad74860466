//! Counter-offer negotiation flows.

#![allow(clippy::expect_used, clippy::unwrap_used)] // Test code can use unwrap/expect

use servicedesk_core::{LifecycleError, LifecycleEngine, Money, OfferResponse, RequestId, RequestKind, RequestStatus};
use servicedesk_testing::fixtures::{self, admin, owner};
use servicedesk_testing::harness;

async fn submitted(engine: &LifecycleEngine, price: i64) -> RequestId {
    engine
        .submit(fixtures::submission(RequestKind::Sell, price), &owner())
        .await
        .expect("valid submission")
}

#[tokio::test]
async fn accepted_counter_offer_sets_final_price_and_blocks_cancel() {
    harness::init_tracing();
    let (_, engine) = harness::engine();
    let id = submitted(&engine, 12_000).await;

    let offered = engine
        .send_offer(id, Money::new(8_500), "Scratches on the lid", &admin())
        .await
        .unwrap();
    assert_eq!(offered.status, RequestStatus::OfferSent);
    assert_eq!(offered.counter_offer.as_ref().unwrap().price, Money::new(8_500));
    assert_eq!(offered.final_price, None);

    let accepted = engine
        .respond(id, OfferResponse::Accept, &owner(), None)
        .await
        .unwrap();
    assert_eq!(accepted.status, RequestStatus::Accepted);
    assert_eq!(accepted.final_price, Some(Money::new(8_500)));
    assert_eq!(accepted.requested_price, Money::new(12_000));

    let error = engine.cancel(id, &owner(), None).await.unwrap_err();
    assert_eq!(
        error,
        LifecycleError::NotCancellable {
            id,
            status: RequestStatus::Accepted,
        }
    );

    assert_eq!(
        engine.get(id).await.unwrap().status_trail(),
        [RequestStatus::Pending, RequestStatus::OfferSent, RequestStatus::Accepted]
    );
}

#[tokio::test]
async fn resending_an_offer_revises_without_new_history() {
    let (_, engine) = harness::engine();
    let id = submitted(&engine, 5_000).await;

    engine
        .send_offer(id, Money::new(3_000), "", &admin())
        .await
        .unwrap();
    let revised = engine
        .send_offer(id, Money::new(3_400), "Checked the market again", &admin())
        .await
        .unwrap();

    let offer = revised.counter_offer.unwrap();
    assert_eq!(offer.price, Money::new(3_400));
    assert_eq!(offer.revision, 2);
    assert_eq!(offer.note, "Checked the market again");
    assert_eq!(revised.status_history.len(), 2);
    assert_eq!(revised.version, 3);
}

#[tokio::test]
async fn response_to_a_superseded_revision_is_stale() {
    let (_, engine) = harness::engine();
    let id = submitted(&engine, 5_000).await;
    engine
        .send_offer(id, Money::new(3_000), "", &admin())
        .await
        .unwrap();
    engine
        .send_offer(id, Money::new(2_800), "", &admin())
        .await
        .unwrap();

    let error = engine
        .respond(id, OfferResponse::Accept, &owner(), Some(1))
        .await
        .unwrap_err();
    assert!(matches!(error, LifecycleError::StaleOffer { .. }));

    let accepted = engine
        .respond(id, OfferResponse::Accept, &owner(), Some(2))
        .await
        .unwrap();
    assert_eq!(accepted.final_price, Some(Money::new(2_800)));
}

#[tokio::test]
async fn responding_without_an_open_offer_is_stale() {
    let (_, engine) = harness::engine();
    let id = submitted(&engine, 5_000).await;

    let error = engine
        .respond(id, OfferResponse::Reject, &owner(), None)
        .await
        .unwrap_err();

    assert_eq!(
        error,
        LifecycleError::StaleOffer {
            id,
            status: RequestStatus::Pending,
        }
    );
}

#[tokio::test]
async fn rejected_requests_are_closed_to_new_offers() {
    let (_, engine) = harness::engine();
    let id = submitted(&engine, 5_000).await;
    engine
        .send_offer(id, Money::new(2_000), "", &admin())
        .await
        .unwrap();
    let rejected = engine
        .respond(id, OfferResponse::Reject, &owner(), None)
        .await
        .unwrap();
    assert_eq!(rejected.status, RequestStatus::Rejected);
    assert_eq!(rejected.final_price, None);

    let error = engine
        .send_offer(id, Money::new(2_500), "", &admin())
        .await
        .unwrap_err();

    assert_eq!(
        error,
        LifecycleError::InvalidTransition {
            id,
            from: RequestStatus::Rejected,
            to: RequestStatus::OfferSent,
        }
    );
}

#[tokio::test]
async fn non_positive_counter_price_is_invalid() {
    let (_, engine) = harness::engine();
    let id = submitted(&engine, 5_000).await;

    let error = engine
        .send_offer(id, Money::new(-10), "", &admin())
        .await
        .unwrap_err();

    assert!(matches!(error, LifecycleError::Validation(_)));
    assert_eq!(engine.get(id).await.unwrap().status, RequestStatus::Pending);
}

#[tokio::test]
async fn only_staff_send_offers_and_only_the_owner_responds() {
    let (_, engine) = harness::engine();
    let id = submitted(&engine, 5_000).await;

    let error = engine
        .send_offer(id, Money::new(4_000), "", &owner())
        .await
        .unwrap_err();
    assert!(matches!(error, LifecycleError::ActorNotPermitted { .. }));

    engine
        .send_offer(id, Money::new(4_000), "", &admin())
        .await
        .unwrap();
    let error = engine
        .respond(id, OfferResponse::Accept, &admin(), None)
        .await
        .unwrap_err();
    assert!(matches!(error, LifecycleError::ActorNotPermitted { .. }));
}

#[tokio::test]
async fn customer_may_cancel_while_an_offer_is_open() {
    let (_, engine) = harness::engine();
    let id = submitted(&engine, 5_000).await;
    engine
        .send_offer(id, Money::new(4_000), "", &admin())
        .await
        .unwrap();

    let cancelled = engine
        .cancel(id, &owner(), Some("Sold it elsewhere".into()))
        .await
        .unwrap();

    assert_eq!(cancelled.status, RequestStatus::Cancelled);
    assert_eq!(cancelled.final_price, None);
}
