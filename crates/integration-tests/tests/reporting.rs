//! Dashboard assembly end-to-end, including the degraded-directory path.

use std::sync::Arc;

use rust_decimal::dec;

use servicelane_core::{Money, RequestStatus, UserRole};
use servicelane_data::models::MechanicShop;
use servicelane_data::reporting::{TREND_DAYS, UNKNOWN_SERVICE};
use servicelane_data::{Repository, Transport};
use servicelane_integration_tests::{TestContext, fixtures};

struct Workshop {
    ctx: TestContext,
    mechanic_label: String,
}

/// Seed a workshop with two settled jobs: an oil service for 100.00 and a
/// brake job for 250.00, both handled by the same mechanic.
async fn settled_workshop() -> Workshop {
    let ctx = TestContext::new();

    let client = ctx
        .services
        .users()
        .register(fixtures::user("casey", UserRole::Client))
        .await
        .expect("register client")
        .id
        .expect("id");
    let mechanic_user = ctx
        .services
        .users()
        .register(fixtures::user("sam", UserRole::Mechanic))
        .await
        .expect("register mechanic");
    let mechanic = mechanic_user.id.expect("id");

    let transport: Arc<dyn Transport> = ctx.backend.clone();
    let shops: Repository<MechanicShop> = Repository::new(Arc::clone(&transport));
    let shop = shops
        .create(&fixtures::shop("Axle & Sons", "Bergen"))
        .await
        .expect("create shop")
        .id
        .expect("id");

    let vehicle = ctx
        .services
        .vehicles()
        .register(fixtures::vehicle(client, "ABC123"))
        .await
        .expect("register vehicle")
        .id
        .expect("id");

    let offerings: Repository<servicelane_data::models::ServiceOffering> =
        Repository::new(transport);
    let oil = offerings
        .create(&fixtures::offering("Oil & Filters", dec!(100.00)))
        .await
        .expect("create offering")
        .id
        .expect("id");
    let brakes = offerings
        .create(&fixtures::offering("Brakes", dec!(250.00)))
        .await
        .expect("create offering")
        .id
        .expect("id");

    for (offering, estimate) in [(oil, dec!(100.00)), (brakes, dec!(250.00))] {
        let request_id = ctx
            .services
            .requests()
            .submit(fixtures::request(client, vehicle, shop, estimate))
            .await
            .expect("submit")
            .id
            .expect("id");

        ctx.services
            .items()
            .add(fixtures::item(request_id, offering, 1, estimate))
            .await
            .expect("add item");

        ctx.services
            .requests()
            .assign_mechanic(request_id, mechanic)
            .await
            .expect("assign");
        ctx.services
            .requests()
            .complete(request_id)
            .await
            .expect("complete");

        let payment_id = ctx
            .services
            .payments()
            .by_request(request_id)
            .await
            .expect("payments")
            .first()
            .expect("one payment")
            .id
            .expect("id");
        ctx.services
            .payments()
            .mark_completed(payment_id)
            .await
            .expect("settle");
    }

    Workshop {
        ctx,
        mechanic_label: mechanic_user.full_name,
    }
}

#[tokio::test]
async fn dashboard_aggregates_settled_work() {
    let workshop = settled_workshop().await;

    let report = workshop
        .ctx
        .services
        .reports()
        .dashboard()
        .await
        .expect("dashboard");

    assert_eq!(report.total_revenue, Money::new(dec!(350.00)));
    assert_eq!(report.average_ticket, Money::new(dec!(175.00)));
    assert_eq!(report.total_requests, 2);
    assert_eq!(report.active_requests, 0);
    assert_eq!(
        report.status_breakdown,
        vec![("Completed".to_owned(), 2)]
    );

    // Ranked descending by revenue, labeled by offering name.
    assert_eq!(
        report.revenue_by_service,
        vec![
            ("Brakes".to_owned(), Money::new(dec!(250.00))),
            ("Oil & Filters".to_owned(), Money::new(dec!(100.00))),
        ]
    );

    assert_eq!(
        report.revenue_by_mechanic,
        vec![(workshop.mechanic_label.clone(), Money::new(dec!(350.00)))]
    );

    // Payments settled today land in the newest trend bucket.
    assert_eq!(report.daily_trend.len(), TREND_DAYS as usize);
    let today_bucket = report.daily_trend.last().expect("today bucket");
    assert_eq!(today_bucket.amount, Money::new(dec!(350.00)));
}

#[tokio::test]
async fn dashboard_degrades_when_user_directory_fails() {
    let workshop = settled_workshop().await;

    workshop.ctx.backend.fail("users");
    let report = workshop
        .ctx
        .services
        .reports()
        .dashboard()
        .await
        .expect("dashboard still renders");

    assert_eq!(report.total_revenue, Money::new(dec!(350.00)));

    // No directory: revenue-keyed entries render under placeholder labels.
    assert_eq!(report.revenue_by_mechanic.len(), 1);
    let (label, amount) = report
        .revenue_by_mechanic
        .first()
        .expect("revenue entry survives");
    assert!(label.starts_with("Mechanic "), "got label {label:?}");
    assert_eq!(*amount, Money::new(dec!(350.00)));
}

#[tokio::test]
async fn dashboard_groups_unresolved_data_under_unknown() {
    let workshop = settled_workshop().await;
    let ctx = &workshop.ctx;

    // A third settled job with no line items has no service description.
    let client = ctx
        .services
        .users()
        .find_by_username("casey")
        .await
        .expect("query")
        .expect("present")
        .id
        .expect("id");
    let vehicle = ctx
        .services
        .vehicles()
        .by_client(client)
        .await
        .expect("vehicles")
        .first()
        .expect("one vehicle")
        .id
        .expect("id");
    let shop = ctx
        .services
        .shops()
        .all_by_name()
        .await
        .expect("shops")
        .first()
        .expect("one shop")
        .id
        .expect("id");
    let mechanic = ctx
        .services
        .users()
        .find_by_username("sam")
        .await
        .expect("query")
        .expect("present")
        .id
        .expect("id");

    let request_id = ctx
        .services
        .requests()
        .submit(fixtures::request(client, vehicle, shop, dec!(60.00)))
        .await
        .expect("submit")
        .id
        .expect("id");
    ctx.services
        .requests()
        .assign_mechanic(request_id, mechanic)
        .await
        .expect("assign");
    ctx.services.requests().complete(request_id).await.expect("complete");
    let payment_id = ctx
        .services
        .payments()
        .by_request(request_id)
        .await
        .expect("payments")
        .first()
        .expect("payment")
        .id
        .expect("id");
    ctx.services
        .payments()
        .mark_completed(payment_id)
        .await
        .expect("settle");

    let report = ctx.services.reports().dashboard().await.expect("dashboard");

    assert_eq!(report.total_revenue, Money::new(dec!(410.00)));
    assert!(
        report
            .revenue_by_service
            .contains(&(UNKNOWN_SERVICE.to_owned(), Money::new(dec!(60.00)))),
        "got {:?}",
        report.revenue_by_service
    );

    // The offerings referenced by the first two jobs still rank by revenue.
    let labels: Vec<_> = report
        .revenue_by_service
        .iter()
        .map(|(label, _)| label.as_str())
        .collect();
    assert_eq!(labels, vec!["Brakes", "Oil & Filters", UNKNOWN_SERVICE]);
}

#[tokio::test]
async fn enriched_views_back_the_screens() {
    let workshop = settled_workshop().await;
    let ctx = &workshop.ctx;

    let requests = ctx.services.requests().all().await.expect("requests");
    let views = ctx
        .services
        .requests()
        .enrich(&requests)
        .await
        .expect("enrich");

    assert_eq!(views.len(), 2);
    for view in &views {
        assert_eq!(view.client_name, "Casey Example");
        assert_eq!(view.vehicle_info, "2019 Toyota Corolla - ABC123");
        assert_eq!(view.request.status, Some(RequestStatus::Completed));
    }

    // The live-search predicate the screens use.
    let matches: Vec<_> = views.iter().filter(|view| view.matches("brakes")).collect();
    assert_eq!(matches.len(), 1);
}
