//! Full system tests: every table running, driven through the reconciler and checkout service.

use chrono::NaiveDate;
use live_checkout::checkout::{CheckoutEdit, CheckoutError};
use live_checkout::clients::SEARCH_LIMIT;
use live_checkout::error::{ErrorKind, Precondition};
use live_checkout::lifecycle::CheckoutSystem;
use live_checkout::model::{
    CaptureSession, ContactKind, DeliveryMode, FieldId, OrderStatus, PaymentMethod, SessionKind,
};
use live_checkout::reconciler::{
    CaptureError, CaptureIdentity, FixedDecision, LineDraft, MergeDecision,
};
use resource_actor::{ActorClient, Query};
use std::collections::HashSet;

fn alias(name: &str) -> CaptureIdentity {
    CaptureIdentity::Alias(name.to_string())
}

fn dress(quantity: u32) -> LineDraft {
    LineDraft::new("JP1", "Red dress", 15000.0, quantity)
}

async fn live_session(system: &CheckoutSystem) -> CaptureSession {
    system
        .sessions
        .open_session(SessionKind::Live, None)
        .await
        .unwrap()
        .capture()
}

fn delivery_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 7).unwrap()
}

#[tokio::test]
async fn test_capture_creates_order_then_merges() {
    let system = CheckoutSystem::new();
    let session = live_session(&system).await;
    let reconciler = system.reconciler(FixedDecision(MergeDecision::Merge));

    let first = reconciler
        .capture_line(&session, &alias("@amy"), &dress(1))
        .await
        .unwrap();
    assert!(first.order_created);
    assert!(!first.merged);
    let order = system.orders.require(first.order_id).await.unwrap();
    assert_eq!(order.status, OrderStatus::Created);
    assert_eq!(order.lines.len(), 1);
    assert_eq!(order.total(), 15000.0);

    // same alias, code and description: merged at the existing unit price
    let second = reconciler
        .capture_line(
            &session,
            &alias("@AMY"),
            &LineDraft::new("JP1", "Red dress", 99999.0, 2),
        )
        .await
        .unwrap();
    assert!(second.merged);
    assert_eq!(second.order_id, first.order_id);
    assert_eq!(second.line.quantity, 3);
    assert_eq!(second.line.line_total, 45000.0);
    assert_eq!(second.line.unit_price, 15000.0);

    let order = system.orders.require(first.order_id).await.unwrap();
    assert_eq!(order.lines.len(), 1);
    assert_eq!(order.total(), 45000.0);

    drop(reconciler);
    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_live_codes_are_unique_per_session() {
    let system = CheckoutSystem::new();
    let session = live_session(&system).await;
    let reconciler = system.reconciler(FixedDecision(MergeDecision::Merge));

    reconciler
        .capture_line(&session, &alias("@amy"), &dress(1))
        .await
        .unwrap();

    let err = reconciler
        .capture_line(&session, &alias("@bob"), &dress(1))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateCode);
    // rejected before anything was written
    assert!(system.customers.find_by_alias("@bob").await.unwrap().is_none());
    assert_eq!(system.orders.session_orders(session.session_id).await.unwrap().len(), 1);

    // same code, other description, same customer: still a collision
    let err = reconciler
        .capture_line(
            &session,
            &alias("@amy"),
            &LineDraft::new("JP1", "Blue dress", 10.0, 1),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CaptureError::DuplicateCode { .. }));

    // codes are case-sensitive
    reconciler
        .capture_line(&session, &alias("@bob"), &LineDraft::new("jp1", "Bag", 10.0, 1))
        .await
        .unwrap();

    let orders = system.orders.session_orders(session.session_id).await.unwrap();
    let mut codes = HashSet::new();
    for line in orders.iter().flat_map(|o| o.lines.iter()) {
        assert!(codes.insert(line.code.clone()), "code {} twice", line.code);
    }

    drop(reconciler);
    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_concurrent_captures_of_one_code_keep_it_unique() {
    let system = CheckoutSystem::new();
    let session = live_session(&system).await;

    let mut tasks = Vec::new();
    for n in 0..8 {
        let reconciler = system.reconciler(FixedDecision(MergeDecision::Merge));
        tasks.push(tokio::spawn(async move {
            reconciler
                .capture_line(
                    &session,
                    &alias(&format!("@buyer{n}")),
                    &LineDraft::new("JP9", "Scarf", 5000.0, 1),
                )
                .await
        }));
    }
    let mut won = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => won += 1,
            Err(e) => assert_eq!(e.kind(), ErrorKind::DuplicateCode),
        }
    }
    assert_eq!(won, 1);

    // losers left no empty order behind
    let orders = system.orders.session_orders(session.session_id).await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].lines.len(), 1);

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_duplicate_and_abort_decisions() {
    let system = CheckoutSystem::new();
    let live = live_session(&system).await;

    system
        .reconciler(FixedDecision(MergeDecision::Merge))
        .capture_line(&live, &alias("@amy"), &dress(1))
        .await
        .unwrap();

    let aborted = system
        .reconciler(FixedDecision(MergeDecision::Abort))
        .capture_line(&live, &alias("@amy"), &dress(5))
        .await
        .unwrap_err();
    assert_eq!(aborted, CaptureError::Aborted);
    assert_eq!(aborted.kind(), ErrorKind::Aborted);

    // a duplicate line would reuse a live code
    let duplicate = system
        .reconciler(FixedDecision(MergeDecision::Duplicate))
        .capture_line(&live, &alias("@amy"), &dress(5))
        .await
        .unwrap_err();
    assert_eq!(duplicate.kind(), ErrorKind::DuplicateCode);

    let orders = system.orders.session_orders(live.session_id).await.unwrap();
    assert_eq!(orders[0].lines.len(), 1);
    assert_eq!(orders[0].lines[0].quantity, 1);

    // regular sales may repeat a line
    system.sessions.close_session(live.session_id).await.unwrap();
    let regular = system
        .sessions
        .open_session(SessionKind::Regular, None)
        .await
        .unwrap()
        .capture();
    let reconciler = system.reconciler(FixedDecision(MergeDecision::Duplicate));
    let who = CaptureIdentity::RealName("Rasoa Be".to_string());
    reconciler.capture_line(&regular, &who, &dress(1)).await.unwrap();
    let second = reconciler.capture_line(&regular, &who, &dress(1)).await.unwrap();
    assert!(!second.merged);
    let order = system.orders.require(second.order_id).await.unwrap();
    assert_eq!(order.lines.len(), 2);

    drop(reconciler);
    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_capture_after_checkout_opens_new_order() {
    let system = CheckoutSystem::new();
    let session = live_session(&system).await;
    let reconciler = system.reconciler(FixedDecision(MergeDecision::Merge));
    let checkout = system.checkout();

    let first = reconciler
        .capture_line(&session, &alias("@amy"), &dress(1))
        .await
        .unwrap();
    checkout.load_checkout_context(first.order_id).await.unwrap();

    let next = reconciler
        .capture_line(&session, &alias("@amy"), &LineDraft::new("JP2", "Bag", 8000.0, 1))
        .await
        .unwrap();
    assert!(next.order_created);
    assert_ne!(next.order_id, first.order_id);
    assert_ne!(next.order_number, first.order_number);

    // the order in checkout no longer takes lines
    let locked = system
        .orders
        .merge_line(first.order_id, first.line.id, 1)
        .await
        .unwrap_err();
    assert_eq!(locked.kind(), ErrorKind::PreconditionFailed);

    drop((reconciler, checkout));
    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_invalid_amounts_write_nothing() {
    let system = CheckoutSystem::new();
    let session = live_session(&system).await;
    let reconciler = system.reconciler(FixedDecision(MergeDecision::Merge));

    for draft in [
        LineDraft::new("JP1", "Red dress", -1.0, 1),
        LineDraft::new("JP1", "Red dress", f64::NAN, 1),
        LineDraft::new("JP1", "Red dress", 10.0, 0),
    ] {
        let err = reconciler
            .capture_line(&session, &alias("@amy"), &draft)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidAmount);
    }
    assert!(system.customers.find_by_alias("@amy").await.unwrap().is_none());
    assert!(system.orders.session_orders(session.session_id).await.unwrap().is_empty());

    // blank code falls back to the default code
    let captured = reconciler
        .capture_line(&session, &alias("@amy"), &LineDraft::new(" ", "Red dress", 10.0, 1))
        .await
        .unwrap();
    assert_eq!(captured.line.code, "JP");

    drop(reconciler);
    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_live_capture_accepts_free_article() {
    let system = CheckoutSystem::new();
    let session = live_session(&system).await;
    let reconciler = system.reconciler(FixedDecision(MergeDecision::Merge));

    let gift = reconciler
        .capture_line(&session, &alias("@amy"), &LineDraft::new("JP9", "Gift", 0.0, 1))
        .await
        .unwrap();
    assert_eq!(gift.line.unit_price, 0.0);
    assert_eq!(gift.line.line_total, 0.0);
    assert!(system.orders.code_in_use(session.session_id, "JP9").await.unwrap());

    // an order worth nothing is not ready for preparation
    let summary = system.orders.pending_summary(session.session_id).await.unwrap();
    assert_eq!(summary.len(), 1);
    assert_eq!(summary[0].subtotal, 0.0);
    assert!(!summary[0].can_finalize);

    drop(reconciler);
    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_resolve_by_alias_is_idempotent_under_concurrency() {
    let system = CheckoutSystem::new();

    let mut tasks = Vec::new();
    for n in 0..10 {
        let customers = system.customers.clone();
        let alias = if n % 2 == 0 { "@Amy" } else { " @amy " };
        tasks.push(tokio::spawn(async move {
            customers.resolve_or_create_by_alias(alias).await.unwrap().id
        }));
    }
    let mut ids = HashSet::new();
    for task in tasks {
        ids.insert(task.await.unwrap());
    }
    assert_eq!(ids.len(), 1);
    assert_eq!(system.customers.find(Query::new()).await.unwrap().len(), 1);

    let empty = system.customers.resolve_or_create_by_alias("  ").await.unwrap_err();
    assert_eq!(empty.kind(), ErrorKind::Validation);

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_resolve_by_real_name_reuses_exact_match() {
    let system = CheckoutSystem::new();

    let first = system
        .customers
        .resolve_or_create_by_real_name("Rasoa Be")
        .await
        .unwrap();
    assert!(first.alias.starts_with("@rasoa_be_"));
    assert_eq!(first.real_name.as_deref(), Some("Rasoa Be"));

    let again = system
        .customers
        .resolve_or_create_by_real_name("  Rasoa Be ")
        .await
        .unwrap();
    assert_eq!(again.id, first.id);

    let other = system
        .customers
        .resolve_or_create_by_real_name("rasoa be")
        .await
        .unwrap();
    assert_ne!(other.id, first.id);
    assert_ne!(other.alias, first.alias);

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_primary_contact_stays_unique_under_concurrency() {
    let system = CheckoutSystem::new();
    let amy = system.customers.resolve_or_create_by_alias("@amy").await.unwrap();
    let amy_id = amy.id;

    let mut tasks = Vec::new();
    for n in 0..10 {
        let contacts = system.contacts.clone();
        tasks.push(tokio::spawn(async move {
            contacts
                .add_or_reuse(amy_id, ContactKind::Phone, &format!("034 00 000 {n:02}"), true)
                .await
                .unwrap()
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    let book = system.contacts.book(amy.id).await.unwrap().unwrap();
    assert_eq!(book.entries.len(), 10);
    assert_eq!(book.primary_count(ContactKind::Phone), 1);
    assert_eq!(book.primary_count(ContactKind::Address), 0);

    // explicit switch
    let target = book.entries[3].id;
    system
        .contacts
        .set_primary(amy.id, ContactKind::Phone, target)
        .await
        .unwrap();
    let contacts = system.contacts.contacts(amy.id).await.unwrap();
    assert_eq!(contacts[0].id, target);
    assert!(contacts[0].is_primary);
    assert_eq!(contacts.iter().filter(|c| c.is_primary).count(), 1);

    // an entry of another customer is not found
    let bob = system.customers.resolve_or_create_by_alias("@bob").await.unwrap();
    let err = system
        .contacts
        .set_primary(bob.id, ContactKind::Phone, target)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_contact_edit_and_remove() {
    let system = CheckoutSystem::new();
    let amy = system.customers.resolve_or_create_by_alias("@amy").await.unwrap();

    let home = system
        .contacts
        .add_or_reuse(amy.id, ContactKind::Address, "Lot 1", false)
        .await
        .unwrap();
    let work = system
        .contacts
        .add_or_reuse(amy.id, ContactKind::Address, "Lot 2", false)
        .await
        .unwrap();
    assert!(home.is_primary);
    assert!(!work.is_primary);

    let clash = system.contacts.edit_entry(work.id, "Lot 1").await.unwrap_err();
    assert_eq!(clash.kind(), ErrorKind::Conflict);
    let edited = system.contacts.edit_entry(work.id, " Lot 2B ").await.unwrap();
    assert_eq!(edited.value, "Lot 2B");

    let removed = system.contacts.remove(home.id).await.unwrap();
    assert_eq!(removed.id, home.id);
    let book = system.contacts.book(amy.id).await.unwrap().unwrap();
    assert!(book.primary(ContactKind::Address).is_none());
    assert_eq!(
        system.contacts.remove(home.id).await.unwrap_err().kind(),
        ErrorKind::NotFound
    );

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_province_order_reports_all_missing_payment_fields() {
    let system = CheckoutSystem::new();
    let session = live_session(&system).await;
    let reconciler = system.reconciler(FixedDecision(MergeDecision::Merge));
    let checkout = system.checkout();

    let captured = reconciler
        .capture_line(&session, &alias("@amy"), &dress(1))
        .await
        .unwrap();
    let id = captured.order_id;
    for edit in [
        CheckoutEdit::RealName("Amy Rasoa".into()),
        CheckoutEdit::Phone("034 12 345 67".into()),
        CheckoutEdit::Address("Toamasina".into()),
        CheckoutEdit::DeliveryMode(Some(DeliveryMode::CarrierDelivery)),
        CheckoutEdit::DeliveryDate(Some(delivery_date())),
        CheckoutEdit::Province(true),
    ] {
        checkout.update_checkout_field(id, edit).await.unwrap();
    }

    let context = checkout.load_checkout_context(id).await.unwrap();
    assert_eq!(
        context.readiness.missing_fields,
        vec![FieldId::PaymentMethod, FieldId::Transport, FieldId::DepositAmount]
    );
    assert_eq!(context.allowed_payment_methods(), &PaymentMethod::MOBILE_MONEY);

    let err = checkout.finalize_checkout(id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PreconditionFailed);
    assert_eq!(
        err.missing_fields(),
        Some(&[FieldId::PaymentMethod, FieldId::Transport, FieldId::DepositAmount][..])
    );

    let cash = checkout
        .update_checkout_field(id, CheckoutEdit::PaymentMethod(Some(PaymentMethod::Cash)))
        .await
        .unwrap_err();
    assert_eq!(cash.kind(), ErrorKind::Validation);

    drop((reconciler, checkout));
    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_cash_order_confirms_without_deposit_and_locks() {
    let system = CheckoutSystem::new();
    let session = live_session(&system).await;
    let reconciler = system.reconciler(FixedDecision(MergeDecision::Merge));
    let checkout = system.checkout();

    let captured = reconciler
        .capture_line(&session, &alias("@amy"), &dress(1))
        .await
        .unwrap();
    let id = captured.order_id;
    for edit in [
        CheckoutEdit::RealName("Amy Rasoa".into()),
        CheckoutEdit::Phone("034 12 345 67".into()),
        CheckoutEdit::Address("Analakely".into()),
        CheckoutEdit::DeliveryMode(Some(DeliveryMode::Pickup)),
        CheckoutEdit::DeliveryDate(Some(delivery_date())),
        CheckoutEdit::PaymentMethod(Some(PaymentMethod::Cash)),
        CheckoutEdit::Deposit(0.0),
    ] {
        checkout.update_checkout_field(id, edit).await.unwrap();
    }
    let context = checkout.load_checkout_context(id).await.unwrap();
    assert!(context.readiness.can_finalize);
    assert_eq!(context.completion_step(), 3);

    let order = checkout.finalize_checkout(id).await.unwrap();
    assert_eq!(order.status, OrderStatus::Confirmed);
    let feed = system.orders.confirmed_feed().await.unwrap();
    assert_eq!(feed.iter().map(|o| o.id).collect::<Vec<_>>(), vec![id]);

    // every edit is refused from now on
    for edit in [
        CheckoutEdit::RealName("Someone".into()),
        CheckoutEdit::Phone("032".into()),
        CheckoutEdit::Address("Elsewhere".into()),
        CheckoutEdit::DeliveryMode(None),
        CheckoutEdit::DeliveryDate(None),
        CheckoutEdit::Province(true),
        CheckoutEdit::Transport("Cotisse".into()),
        CheckoutEdit::PaymentMethod(Some(PaymentMethod::MVola)),
        CheckoutEdit::PaymentReference("TX".into()),
        CheckoutEdit::Deposit(1.0),
        CheckoutEdit::Paid(true),
    ] {
        let err = checkout.update_checkout_field(id, edit.clone()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PreconditionFailed, "{edit:?}");
    }
    let again = checkout.finalize_checkout(id).await.unwrap_err();
    assert_eq!(again.kind(), ErrorKind::PreconditionFailed);

    // downstream stages
    assert_eq!(
        system.orders.start_preparation(id).await.unwrap(),
        OrderStatus::InPreparation
    );
    assert_eq!(system.orders.mark_delivered(id).await.unwrap(), OrderStatus::Delivered);
    assert!(matches!(
        system.orders.cancel(id).await.unwrap_err(),
        live_checkout::order_actor::OrderError::Precondition(Precondition::IllegalTransition { .. })
    ));
    assert!(system.orders.confirmed_feed().await.unwrap().is_empty());

    drop((reconciler, checkout));
    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_paid_toggle_and_deposit_bound() {
    let system = CheckoutSystem::new();
    let session = live_session(&system).await;
    let reconciler = system.reconciler(FixedDecision(MergeDecision::Merge));
    let checkout = system.checkout();

    let captured = reconciler
        .capture_line(&session, &alias("@amy"), &dress(3))
        .await
        .unwrap();
    let id = captured.order_id;

    checkout
        .update_checkout_field(id, CheckoutEdit::Deposit(45000.0))
        .await
        .unwrap();
    let context = checkout.load_checkout_context(id).await.unwrap();
    assert!(context.is_fully_paid());
    assert_eq!(context.order.remaining(), 0.0);

    checkout
        .update_checkout_field(id, CheckoutEdit::Paid(false))
        .await
        .unwrap();
    let context = checkout.load_checkout_context(id).await.unwrap();
    assert!(!context.is_fully_paid());
    assert_eq!(context.order.payment.deposit, 0.0);

    let over = checkout
        .update_checkout_field(id, CheckoutEdit::Deposit(45001.0))
        .await
        .unwrap_err();
    assert!(matches!(over, CheckoutError::Order(_)));
    assert_eq!(over.kind(), ErrorKind::Validation);
    let negative = checkout
        .update_checkout_field(id, CheckoutEdit::Deposit(-1.0))
        .await
        .unwrap_err();
    assert_eq!(negative.kind(), ErrorKind::InvalidAmount);

    for order in system.orders.find(Query::new()).await.unwrap() {
        assert!(order.payment.deposit <= order.total());
    }

    drop((reconciler, checkout));
    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_province_switch_clears_cash() {
    let system = CheckoutSystem::new();
    let session = live_session(&system).await;
    let reconciler = system.reconciler(FixedDecision(MergeDecision::Merge));
    let checkout = system.checkout();

    let id = reconciler
        .capture_line(&session, &alias("@amy"), &dress(1))
        .await
        .unwrap()
        .order_id;
    checkout
        .update_checkout_field(id, CheckoutEdit::PaymentMethod(Some(PaymentMethod::Cash)))
        .await
        .unwrap();
    checkout
        .update_checkout_field(id, CheckoutEdit::Province(true))
        .await
        .unwrap();

    let order = system.orders.require(id).await.unwrap();
    assert!(order.delivery.is_province);
    assert_eq!(order.payment.method, None);

    drop((reconciler, checkout));
    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_regular_sale_checks_every_article_first() {
    let system = CheckoutSystem::new();
    let session = system
        .sessions
        .open_session(SessionKind::Regular, Some("Boutique".into()))
        .await
        .unwrap()
        .capture();
    let reconciler = system.reconciler(FixedDecision(MergeDecision::Merge));

    let err = reconciler
        .capture_regular_sale(
            &session,
            "Lala Rakoto",
            "033 44 555 66",
            &[
                LineDraft::new("", "Shoes", 30000.0, 1),
                LineDraft::new("", "Belt", 0.0, 1),
            ],
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidAmount);
    assert!(system.customers.search("lala").await.unwrap().is_empty());

    let missing_phone = reconciler
        .capture_regular_sale(&session, "Lala Rakoto", " ", &[LineDraft::new("", "Shoes", 1.0, 1)])
        .await
        .unwrap_err();
    assert_eq!(missing_phone, CaptureError::MissingPhone);

    let sale = reconciler
        .capture_regular_sale(
            &session,
            "Lala Rakoto",
            "033 44 555 66",
            &[
                LineDraft::new("", "Shoes", 30000.0, 1),
                LineDraft::new("", "Belt", 5000.0, 2),
            ],
        )
        .await
        .unwrap();
    assert_eq!(sale.lines.len(), 2);
    assert!(sale.phone.is_primary);
    assert_eq!(sale.customer.real_name.as_deref(), Some("Lala Rakoto"));
    let order = system.orders.require(sale.lines[0].order_id).await.unwrap();
    assert_eq!(order.total(), 40000.0);
    // regular sales do not reserve codes
    assert!(!system.orders.code_in_use(session.session_id, "JP").await.unwrap());

    let live = system.sessions.close_session(session.session_id).await.unwrap();
    assert!(!live.is_open());
    let live = live_session(&system).await;
    let wrong = reconciler
        .capture_regular_sale(&live, "Lala Rakoto", "033", &[LineDraft::new("", "Shoes", 1.0, 1)])
        .await
        .unwrap_err();
    assert_eq!(wrong.kind(), ErrorKind::PreconditionFailed);

    drop(reconciler);
    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_one_open_session_at_a_time() {
    let system = CheckoutSystem::new();

    let live = system
        .sessions
        .open_session(SessionKind::Live, None)
        .await
        .unwrap();
    assert!(live.name.starts_with("Live "));
    let second = system
        .sessions
        .open_session(SessionKind::Regular, None)
        .await
        .unwrap_err();
    assert_eq!(second.kind(), ErrorKind::Conflict);
    assert_eq!(
        system.sessions.current_session().await.unwrap().map(|s| s.id),
        Some(live.id)
    );

    system.sessions.close_session(live.id).await.unwrap();
    assert!(system.sessions.current_session().await.unwrap().is_none());
    let closed = system.sessions.capture_session(live.id).await.unwrap_err();
    assert_eq!(closed.kind(), ErrorKind::PreconditionFailed);
    assert_eq!(
        system.sessions.close_session(live.id).await.unwrap_err().kind(),
        ErrorKind::PreconditionFailed
    );

    let regular = system
        .sessions
        .open_session(SessionKind::Regular, Some(" Saturday ".into()))
        .await
        .unwrap();
    assert_eq!(regular.name, "Saturday");
    let renamed = system.sessions.rename(regular.id, "Saturday market").await.unwrap();
    assert_eq!(renamed.name, "Saturday market");

    let recent = system.sessions.recent_sessions(10).await.unwrap();
    assert_eq!(recent.iter().map(|s| s.id).collect::<Vec<_>>(), vec![regular.id, live.id]);

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_pending_summary_groups_by_customer() {
    let system = CheckoutSystem::new();
    let session = live_session(&system).await;
    let reconciler = system.reconciler(FixedDecision(MergeDecision::Merge));

    reconciler
        .capture_line(&session, &alias("@amy"), &LineDraft::new("A1", "Hat", 1000.0, 2))
        .await
        .unwrap();
    let bob = reconciler
        .capture_line(&session, &alias("@bob"), &LineDraft::new("B1", "Coat", 9000.0, 1))
        .await
        .unwrap();
    reconciler
        .capture_line(&session, &alias("@bob"), &LineDraft::new("B2", "Gloves", 500.0, 3))
        .await
        .unwrap();

    // an order left empty is not a real order yet
    let carl = system.customers.resolve_or_create_by_alias("@carl").await.unwrap();
    system
        .orders
        .open_order_for(session.session_id, carl.id, "CMD")
        .await
        .unwrap();

    system
        .orders
        .update_field(bob.order_id, live_checkout::order_actor::OrderUpdate::Deposit(5250.0))
        .await
        .unwrap();

    let summary = system.orders.pending_summary(session.session_id).await.unwrap();
    assert_eq!(summary.len(), 2);
    assert_eq!(summary[0].customer_id, bob.customer_id);
    assert_eq!(summary[0].subtotal, 10500.0);
    assert_eq!(summary[0].total_quantity, 4);
    assert!(summary[0].can_finalize);
    assert_eq!(summary[1].subtotal, 2000.0);
    assert!(!summary[1].can_finalize);

    drop(reconciler);
    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_pending_summary_sums_large_quantities() {
    let system = CheckoutSystem::new();
    let session = system
        .sessions
        .open_session(SessionKind::Regular, None)
        .await
        .unwrap()
        .capture();
    let reconciler = system.reconciler(FixedDecision(MergeDecision::Merge));
    let who = CaptureIdentity::RealName("Lala Rakoto".to_string());

    for (code, quantity) in [("A", 4_000_000_000), ("B", 1_000_000_000)] {
        reconciler
            .capture_line(&session, &who, &LineDraft::new(code, "Beads", 1.0, quantity))
            .await
            .unwrap();
    }

    let summary = system.orders.pending_summary(session.session_id).await.unwrap();
    assert_eq!(summary.len(), 1);
    assert_eq!(summary[0].total_quantity, 5_000_000_000);
    assert_eq!(summary[0].subtotal, 5_000_000_000.0);

    drop(reconciler);
    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_customer_profile_search_and_delete_guard() {
    let system = CheckoutSystem::new();
    let session = live_session(&system).await;
    let reconciler = system.reconciler(FixedDecision(MergeDecision::Merge));

    let captured = reconciler
        .capture_line(&session, &alias("@amy"), &dress(1))
        .await
        .unwrap();
    let lonely = system.customers.resolve_or_create_by_alias("@lonely").await.unwrap();

    let updated = system
        .customers
        .update_profile(
            captured.customer_id,
            live_checkout::model::CustomerUpdate {
                real_name: Some("Amy Rasoa".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.display_name(), "Amy Rasoa");

    let taken = system
        .customers
        .update_profile(
            lonely.id,
            live_checkout::model::CustomerUpdate {
                alias: Some("@AMY".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(taken.kind(), ErrorKind::Conflict);

    let found = system.customers.search("RASOA").await.unwrap();
    assert_eq!(found.iter().map(|c| c.id).collect::<Vec<_>>(), vec![captured.customer_id]);
    assert!(system.customers.search("").await.unwrap().len() <= SEARCH_LIMIT);

    system
        .contacts
        .add_or_reuse(lonely.id, ContactKind::Phone, "034 11 222 33", true)
        .await
        .unwrap();
    assert!(system.contacts.book(lonely.id).await.unwrap().is_some());

    let refused = system.customers.delete(captured.customer_id).await.unwrap_err();
    assert_eq!(refused.kind(), ErrorKind::PreconditionFailed);
    system.customers.delete(lonely.id).await.unwrap();
    assert!(system.customers.get(lonely.id).await.unwrap().is_none());
    // the contact book leaves with its customer
    assert!(system.contacts.book(lonely.id).await.unwrap().is_none());
    assert!(system.contacts.contacts(lonely.id).await.unwrap().is_empty());

    drop(reconciler);
    system.shutdown().await.unwrap();
}
