//! Pure in-memory aggregation for the admin dashboard.
//!
//! Everything here operates on materialized entity lists - no transport, no
//! I/O. Figures must render even when the data is incomplete: missing
//! statuses group under "Unknown", unresolvable payments are skipped, and a
//! missing mechanic directory degrades to id-derived labels. Nothing in this
//! module returns an error.
//!
//! Monetary figures are exact decimal sums; the only rounding step is the
//! half-up presentation rounding on the average ticket.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use servicelane_core::{Money, PaymentStatus, ServiceRequestId, UserId};

use crate::models::{Payment, RequestView, ServiceRequest};

/// How many categories the ranked revenue charts keep.
pub const TOP_CATEGORIES: usize = 10;

/// Display width for category labels on the bar charts.
pub const LABEL_WIDTH: usize = 20;

/// Days covered by the revenue trend, inclusive of today.
pub const TREND_DAYS: u32 = 7;

/// Category label for requests whose status is absent.
pub const UNKNOWN_STATUS: &str = "Unknown";

/// Category label for payments whose request has no service description.
pub const UNKNOWN_SERVICE: &str = "Unknown Service";

/// Revenue bucket for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyRevenue {
    pub date: NaiveDate,
    pub amount: Money,
}

/// Exact sum of completed payment amounts.
#[must_use]
pub fn total_revenue(payments: &[Payment]) -> Money {
    completed(payments).map(|payment| payment.amount).sum()
}

/// Average completed payment, rounded half-up to two decimal places.
///
/// Zero when there are no completed payments; never divides by zero.
#[must_use]
pub fn average_ticket(payments: &[Payment]) -> Money {
    let count = completed(payments).count();
    if count == 0 {
        return Money::ZERO;
    }

    let total = total_revenue(payments).amount();
    Money::new(total / Decimal::from(count)).round_half_up()
}

/// Requests whose status is neither Completed nor Cancelled.
///
/// A request with no status at all is counted as active.
#[must_use]
pub fn active_request_count(requests: &[ServiceRequest]) -> usize {
    requests
        .iter()
        .filter(|request| request.status.is_none_or(|status| status.is_active()))
        .count()
}

/// Count of requests per status category, in first-seen order.
///
/// Requests with an absent status group under [`UNKNOWN_STATUS`]; the
/// per-category counts always sum to the total request count.
#[must_use]
pub fn status_breakdown(requests: &[ServiceRequest]) -> Vec<(String, u64)> {
    let mut buckets: Vec<(String, u64)> = Vec::new();

    for request in requests {
        let label = request
            .status
            .map_or(UNKNOWN_STATUS, |status| status.label());
        match buckets.iter_mut().find(|(key, _)| key == label) {
            Some((_, count)) => *count += 1,
            None => buckets.push((label.to_owned(), 1)),
        }
    }

    buckets
}

/// Completed revenue per service description, in first-seen order.
///
/// Each payment resolves its parent request through an id index built once;
/// payments whose request is missing from `views` are skipped, and requests
/// without a description accumulate under [`UNKNOWN_SERVICE`].
#[must_use]
pub fn revenue_by_service(payments: &[Payment], views: &[RequestView]) -> Vec<(String, Money)> {
    let index = view_index(views);
    let mut buckets: Vec<(String, Money)> = Vec::new();

    for payment in completed(payments) {
        let Some(view) = index.get(&payment.service_request_id) else {
            continue;
        };

        let category = match view.service_description.as_deref() {
            Some(description) if !description.is_empty() => description,
            _ => UNKNOWN_SERVICE,
        };

        accumulate(&mut buckets, category, payment.amount);
    }

    buckets
}

/// Completed revenue per assigned mechanic, in first-seen order.
///
/// Payments whose request is missing or unassigned are skipped.
#[must_use]
pub fn revenue_by_mechanic(payments: &[Payment], views: &[RequestView]) -> Vec<(UserId, Money)> {
    let index = view_index(views);
    let mut buckets: Vec<(UserId, Money)> = Vec::new();

    for payment in completed(payments) {
        let Some(mechanic_id) = index
            .get(&payment.service_request_id)
            .and_then(|view| view.request.mechanic_id)
        else {
            continue;
        };

        match buckets.iter_mut().find(|(id, _)| *id == mechanic_id) {
            Some((_, total)) => *total += payment.amount,
            None => buckets.push((mechanic_id, payment.amount)),
        }
    }

    buckets
}

/// The mechanic revenue chart's display set: every mechanic that earned
/// revenue, labeled by name where the directory knows one, plus zero-revenue
/// entries for named mechanics that earned nothing.
///
/// With no directory at all (`names` is `None`), revenue-keyed entries still
/// render under id-derived placeholder labels.
#[must_use]
pub fn mechanic_revenue_display(
    by_mechanic: &[(UserId, Money)],
    names: Option<&HashMap<UserId, String>>,
) -> Vec<(String, Money)> {
    let mut display: Vec<(String, Money)> = Vec::new();

    for (id, revenue) in by_mechanic {
        let label = names
            .and_then(|names| names.get(id).cloned())
            .unwrap_or_else(|| format!("Mechanic {id}"));
        accumulate(&mut display, &label, *revenue);
    }

    if let Some(names) = names {
        for name in names.values() {
            if !display.iter().any(|(label, _)| label == name) {
                display.push((name.clone(), Money::ZERO));
            }
        }
    }

    display
}

/// The N highest-revenue categories, descending by amount.
///
/// The sort is stable: categories with equal amounts keep their first-seen
/// order, so the output is reproducible.
#[must_use]
pub fn top_n(buckets: &[(String, Money)], n: usize) -> Vec<(String, Money)> {
    let mut ranked = buckets.to_vec();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(n);
    ranked
}

/// Shorten a label to `width` characters, marking the cut with an ellipsis.
#[must_use]
pub fn truncate_label(label: &str, width: usize) -> String {
    if label.chars().count() <= width {
        return label.to_owned();
    }

    let kept: String = label.chars().take(width.saturating_sub(3)).collect();
    format!("{kept}...")
}

/// Completed revenue per day over the trailing [`TREND_DAYS`] window ending
/// at `today`, ordered oldest to newest.
///
/// All buckets are pre-seeded to zero so the series always has exactly
/// [`TREND_DAYS`] entries; payments outside the window are ignored.
#[must_use]
pub fn daily_revenue_trend(payments: &[Payment], today: NaiveDate) -> Vec<DailyRevenue> {
    let window_start = today - chrono::Days::new(u64::from(TREND_DAYS - 1));

    let mut buckets: Vec<DailyRevenue> = window_start
        .iter_days()
        .take(TREND_DAYS as usize)
        .map(|date| DailyRevenue {
            date,
            amount: Money::ZERO,
        })
        .collect();

    for payment in completed(payments) {
        let date = payment.created_at.date_naive();
        if date < window_start || date > today {
            continue;
        }
        if let Some(bucket) = buckets.iter_mut().find(|bucket| bucket.date == date) {
            bucket.amount += payment.amount;
        }
    }

    buckets
}

/// Every figure the admin dashboard renders, computed in one pass over
/// materialized inputs.
#[derive(Debug, Clone)]
pub struct DashboardReport {
    pub total_revenue: Money,
    pub average_ticket: Money,
    pub total_requests: usize,
    pub active_requests: usize,
    pub status_breakdown: Vec<(String, u64)>,
    /// Top service categories by revenue, labels truncated for display.
    pub revenue_by_service: Vec<(String, Money)>,
    /// Top mechanics by revenue, with degraded labels when the directory
    /// was unavailable.
    pub revenue_by_mechanic: Vec<(String, Money)>,
    /// Trailing window, oldest day first.
    pub daily_trend: Vec<DailyRevenue>,
}

impl DashboardReport {
    /// Build the full report.
    ///
    /// `mechanic_names` is `None` when the user directory could not be
    /// listed; the mechanic chart then falls back to placeholder labels.
    #[must_use]
    pub fn build(
        requests: &[ServiceRequest],
        views: &[RequestView],
        payments: &[Payment],
        mechanic_names: Option<&HashMap<UserId, String>>,
        today: NaiveDate,
    ) -> Self {
        let by_service = revenue_by_service(payments, views);
        let revenue_by_service = top_n(&by_service, TOP_CATEGORIES)
            .into_iter()
            .map(|(label, amount)| (truncate_label(&label, LABEL_WIDTH), amount))
            .collect();

        let by_mechanic = revenue_by_mechanic(payments, views);
        let mechanic_display = mechanic_revenue_display(&by_mechanic, mechanic_names);

        Self {
            total_revenue: total_revenue(payments),
            average_ticket: average_ticket(payments),
            total_requests: requests.len(),
            active_requests: active_request_count(requests),
            status_breakdown: status_breakdown(requests),
            revenue_by_service,
            revenue_by_mechanic: top_n(&mechanic_display, TOP_CATEGORIES),
            daily_trend: daily_revenue_trend(payments, today),
        }
    }
}

fn completed(payments: &[Payment]) -> impl Iterator<Item = &Payment> {
    payments
        .iter()
        .filter(|payment| payment.status == PaymentStatus::Completed)
}

fn view_index(views: &[RequestView]) -> HashMap<ServiceRequestId, &RequestView> {
    views
        .iter()
        .filter_map(|view| view.request.id.map(|id| (id, view)))
        .collect()
}

fn accumulate(buckets: &mut Vec<(String, Money)>, key: &str, amount: Money) {
    match buckets.iter_mut().find(|(label, _)| label == key) {
        Some((_, total)) => *total += amount,
        None => buckets.push((key.to_owned(), amount)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal::dec;
    use servicelane_core::{PaymentId, RequestStatus, ShopId, UserId, VehicleId};

    use crate::models::ServiceRequest;

    fn request(id: i64, status: Option<RequestStatus>) -> ServiceRequest {
        ServiceRequest {
            id: Some(ServiceRequestId::new(id)),
            client_id: UserId::new(1),
            vehicle_id: VehicleId::new(1),
            shop_id: ShopId::new(1),
            mechanic_id: None,
            status,
            total_price_estimated: Money::new(dec!(100)),
            total_price_final: None,
            created_at: Utc::now(),
        }
    }

    fn payment(id: i64, request: i64, amount: Decimal, status: PaymentStatus) -> Payment {
        Payment {
            id: Some(PaymentId::new(id)),
            service_request_id: ServiceRequestId::new(request),
            amount: Money::new(amount),
            status,
            created_at: Utc::now(),
        }
    }

    fn view(request_id: i64, description: Option<&str>, mechanic: Option<i64>) -> RequestView {
        let mut inner = request(request_id, Some(RequestStatus::Completed));
        inner.mechanic_id = mechanic.map(UserId::new);
        RequestView {
            request: inner,
            client_name: "Client".to_owned(),
            vehicle_info: "2020 Kia Rio - K123".to_owned(),
            service_description: description.map(str::to_owned),
        }
    }

    #[test]
    fn test_total_revenue_sums_completed_only() {
        let payments = [
            payment(1, 1, dec!(40), PaymentStatus::Completed),
            payment(2, 2, dec!(25), PaymentStatus::Pending),
            payment(3, 3, dec!(10), PaymentStatus::Completed),
        ];
        assert_eq!(total_revenue(&payments), Money::new(dec!(50)));
    }

    #[test]
    fn test_average_ticket_rounds_half_up() {
        // 100 / 3 = 33.333... -> 33.33; 50 / 3 = 16.666... -> 16.67
        let thirds = [
            payment(1, 1, dec!(50), PaymentStatus::Completed),
            payment(2, 2, dec!(25), PaymentStatus::Completed),
            payment(3, 3, dec!(25), PaymentStatus::Completed),
        ];
        assert_eq!(average_ticket(&thirds), Money::new(dec!(33.33)));
    }

    #[test]
    fn test_average_ticket_zero_payments_is_zero() {
        assert_eq!(average_ticket(&[]), Money::ZERO);

        let none_completed = [payment(1, 1, dec!(40), PaymentStatus::Failed)];
        assert_eq!(average_ticket(&none_completed), Money::ZERO);
    }

    #[test]
    fn test_active_count_excludes_completed_and_cancelled() {
        let requests = [
            request(1, Some(RequestStatus::Pending)),
            request(2, Some(RequestStatus::InProgress)),
            request(3, Some(RequestStatus::Rejected)),
            request(4, Some(RequestStatus::Completed)),
            request(5, Some(RequestStatus::Cancelled)),
            request(6, None),
        ];
        assert_eq!(active_request_count(&requests), 4);
    }

    #[test]
    fn test_status_breakdown_counts_sum_to_total() {
        let requests = [
            request(1, Some(RequestStatus::Pending)),
            request(2, Some(RequestStatus::Pending)),
            request(3, Some(RequestStatus::Completed)),
            request(4, None),
        ];
        let breakdown = status_breakdown(&requests);

        let total: u64 = breakdown.iter().map(|(_, count)| count).sum();
        assert_eq!(total as usize, requests.len());
        assert!(breakdown.contains(&("Pending".to_owned(), 2)));
        assert!(breakdown.contains(&(UNKNOWN_STATUS.to_owned(), 1)));
    }

    #[test]
    fn test_revenue_by_service_resolves_and_degrades() {
        let views = [
            view(1, Some("Brakes"), None),
            view(2, None, None),
        ];
        let payments = [
            payment(1, 1, dec!(120), PaymentStatus::Completed),
            payment(2, 2, dec!(30), PaymentStatus::Completed),
            payment(3, 99, dec!(500), PaymentStatus::Completed), // no such request
        ];

        let buckets = revenue_by_service(&payments, &views);
        assert_eq!(
            buckets,
            vec![
                ("Brakes".to_owned(), Money::new(dec!(120))),
                (UNKNOWN_SERVICE.to_owned(), Money::new(dec!(30))),
            ]
        );
    }

    #[test]
    fn test_revenue_by_mechanic_skips_unassigned() {
        let views = [
            view(1, Some("Brakes"), Some(8)),
            view(2, Some("Tires"), None),
            view(3, Some("Brakes"), Some(8)),
        ];
        let payments = [
            payment(1, 1, dec!(100), PaymentStatus::Completed),
            payment(2, 2, dec!(50), PaymentStatus::Completed),
            payment(3, 3, dec!(25), PaymentStatus::Completed),
        ];

        let buckets = revenue_by_mechanic(&payments, &views);
        assert_eq!(buckets, vec![(UserId::new(8), Money::new(dec!(125)))]);
    }

    #[test]
    fn test_top_n_orders_descending_and_truncates() {
        let buckets = vec![
            ("A".to_owned(), Money::new(dec!(30))),
            ("B".to_owned(), Money::new(dec!(50))),
            ("C".to_owned(), Money::new(dec!(10))),
            ("D".to_owned(), Money::new(dec!(20))),
        ];
        let ranked = top_n(&buckets, 3);
        assert_eq!(
            ranked,
            vec![
                ("B".to_owned(), Money::new(dec!(50))),
                ("A".to_owned(), Money::new(dec!(30))),
                ("D".to_owned(), Money::new(dec!(20))),
            ]
        );
    }

    #[test]
    fn test_top_n_ties_keep_first_seen_order() {
        let buckets = vec![
            ("First".to_owned(), Money::new(dec!(20))),
            ("Second".to_owned(), Money::new(dec!(20))),
            ("Third".to_owned(), Money::new(dec!(20))),
        ];
        assert_eq!(top_n(&buckets, 3), buckets);
    }

    #[test]
    fn test_truncate_label_adds_ellipsis() {
        assert_eq!(truncate_label("Brakes", 20), "Brakes");
        assert_eq!(
            truncate_label("Full Engine Diagnostics Package", 20),
            "Full Engine Diagn..."
        );
        assert_eq!(truncate_label("Full Engine Diagnostics Package", 20).chars().count(), 20);
    }

    #[test]
    fn test_daily_trend_seeds_window_and_ignores_outside() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 20).expect("valid date");
        let at = |days_ago: i64| {
            Utc.with_ymd_and_hms(2025, 6, 20, 12, 0, 0).single().expect("valid time")
                - Duration::days(days_ago)
        };

        let mut outside = payment(1, 1, dec!(99), PaymentStatus::Completed);
        outside.created_at = at(8);
        let mut mid = payment(2, 2, dec!(40), PaymentStatus::Completed);
        mid.created_at = at(3);
        let mut latest = payment(3, 3, dec!(10), PaymentStatus::Completed);
        latest.created_at = at(0);

        let trend = daily_revenue_trend(&[outside, mid, latest], today);

        assert_eq!(trend.len(), TREND_DAYS as usize);
        assert!(trend.windows(2).all(|pair| pair[0].date < pair[1].date));

        let total: Money = trend.iter().map(|bucket| bucket.amount).sum();
        assert_eq!(total, Money::new(dec!(50)));

        let mid_bucket = trend
            .iter()
            .find(|bucket| bucket.date == today - chrono::Days::new(3))
            .expect("bucket in window");
        assert_eq!(mid_bucket.amount, Money::new(dec!(40)));

        let today_bucket = trend.last().expect("today bucket");
        assert_eq!(today_bucket.date, today);
        assert_eq!(today_bucket.amount, Money::new(dec!(10)));
    }

    #[test]
    fn test_mechanic_display_with_directory() {
        let revenue = vec![(UserId::new(8), Money::new(dec!(125)))];
        let names: HashMap<UserId, String> = [
            (UserId::new(8), "Sam Rivera".to_owned()),
            (UserId::new(9), "Lee Wong".to_owned()),
        ]
        .into_iter()
        .collect();

        let display = mechanic_revenue_display(&revenue, Some(&names));
        assert!(display.contains(&("Sam Rivera".to_owned(), Money::new(dec!(125)))));
        assert!(display.contains(&("Lee Wong".to_owned(), Money::ZERO)));
    }

    #[test]
    fn test_mechanic_display_degrades_without_directory() {
        let revenue = vec![(UserId::new(8), Money::new(dec!(125)))];
        let display = mechanic_revenue_display(&revenue, None);
        assert_eq!(
            display,
            vec![("Mechanic 8".to_owned(), Money::new(dec!(125)))]
        );
    }

    #[test]
    fn test_dashboard_report_composes() {
        let requests = [
            request(1, Some(RequestStatus::Completed)),
            request(2, Some(RequestStatus::Pending)),
        ];
        let views = [view(1, Some("Brakes"), Some(8))];
        let payments = [payment(1, 1, dec!(120), PaymentStatus::Completed)];
        let today = NaiveDate::from_ymd_opt(2025, 6, 20).expect("valid date");

        let report = DashboardReport::build(&requests, &views, &payments, None, today);

        assert_eq!(report.total_revenue, Money::new(dec!(120)));
        assert_eq!(report.average_ticket, Money::new(dec!(120.00)));
        assert_eq!(report.total_requests, 2);
        assert_eq!(report.active_requests, 1);
        assert_eq!(report.daily_trend.len(), TREND_DAYS as usize);
        assert_eq!(
            report.revenue_by_mechanic,
            vec![("Mechanic 8".to_owned(), Money::new(dec!(120)))]
        );
    }
}
