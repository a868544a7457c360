mod common;

use common::{Row, coordinator, form_fields, request_fields, two_rows};
use expense_desk::application::coordinator::Stage;
use expense_desk::application::dispatcher::ChatOutcome;
use expense_desk::application::normalizer::normalize;
use expense_desk::domain::form::DecodedPayload;
use expense_desk::domain::money::Money;
use expense_desk::domain::request::grand_total;
use expense_desk::infrastructure::in_memory::{InMemoryChatNotifier, InMemoryMailer};
use expense_desk::rendering::DocumentRenderer;
use rand::Rng;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

#[tokio::test]
async fn test_worked_example_totals_200() {
    let mailer = InMemoryMailer::new();
    let fields = form_fields(&request_fields(&two_rows()));

    let submission = coordinator(&mailer, None)
        .run(async { Ok(DecodedPayload::new(fields, Vec::new())) })
        .await
        .unwrap();

    assert_eq!(submission.total, Money::new(dec!(200)));
    assert_eq!(submission.chat, ChatOutcome::Skipped);
    assert_eq!(mailer.sent().await.len(), 1);
}

#[tokio::test]
async fn test_unparsable_numbers_total_zero() {
    let mailer = InMemoryMailer::new();
    let chat = InMemoryChatNotifier::new();
    let rows: Vec<Row> = vec![(String::new(), "abc".to_string(), "-".to_string())];
    let fields = form_fields(&request_fields(&rows));

    let submission = coordinator(&mailer, Some(&chat))
        .run(async { Ok(DecodedPayload::new(fields, Vec::new())) })
        .await
        .unwrap();

    assert_eq!(submission.total, Money::ZERO);
    assert_eq!(submission.line_items, 1);
    assert_eq!(chat.posts().await[0].total, "R$ 0,00");
}

#[tokio::test]
async fn test_failure_reports_stage_and_message() {
    let mailer = InMemoryMailer::new();
    let fields = form_fields(
        &request_fields(&two_rows())
            .into_iter()
            .filter(|(name, _)| name != "urgencia")
            .collect::<Vec<_>>(),
    );

    let failure = coordinator(&mailer, None)
        .run(async { Ok(DecodedPayload::new(fields, Vec::new())) })
        .await
        .unwrap_err();

    assert_eq!(failure.stage, Stage::Normalizing);
    assert_eq!(failure.to_string(), "Missing required field: urgencia");
    assert!(mailer.sent().await.is_empty());
}

fn cents(rng: &mut impl Rng) -> String {
    Decimal::new(rng.gen_range(0..1_000_000), 2).to_string()
}

fn random_rows(rng: &mut impl Rng, count: usize) -> Vec<Row> {
    (0..count)
        .map(|_| {
            match rng.gen_range(0..3) {
                0 => (cents(rng), "0".to_string(), "0".to_string()),
                1 => ("0".to_string(), rng.gen_range(0..2_000).to_string(), cents(rng)),
                _ => (cents(rng), rng.gen_range(0..2_000).to_string(), cents(rng)),
            }
        })
        .collect()
}

#[test]
fn test_rendered_total_matches_sum_of_line_totals() {
    let mut rng = rand::thread_rng();
    let renderer = DocumentRenderer::default();

    for _ in 0..25 {
        let count = rng.gen_range(0..40);
        let rows = random_rows(&mut rng, count);
        let request = normalize(&form_fields(&request_fields(&rows)), "16/10/2026").unwrap();

        let expected: Decimal = rows
            .iter()
            .map(|(amount, distance, rate)| {
                amount.parse::<Decimal>().unwrap()
                    + distance.parse::<Decimal>().unwrap() * rate.parse::<Decimal>().unwrap()
            })
            .sum();

        for (item, (amount, distance, rate)) in request.items.iter().zip(&rows) {
            assert_eq!(
                item.line_total.value(),
                amount.parse::<Decimal>().unwrap()
                    + distance.parse::<Decimal>().unwrap() * rate.parse::<Decimal>().unwrap()
            );
        }
        assert_eq!(grand_total(&request.items).value(), expected);
        assert_eq!(renderer.layout(&request.record, &request.items).grand_total.value(), expected);
    }
}

#[test]
fn test_row_order_is_preserved() {
    let mut rng = rand::thread_rng();
    let rows = random_rows(&mut rng, 30);
    let request = normalize(&form_fields(&request_fields(&rows)), "16/10/2026").unwrap();

    let details: Vec<&str> = request.items.iter().map(|item| item.detail.as_str()).collect();
    let expected: Vec<String> = (0..30).map(|index| format!("Expense {index}")).collect();
    assert_eq!(details, expected);
}

#[test]
fn test_normalization_is_repeatable() {
    let mut rng = rand::thread_rng();
    let rows = random_rows(&mut rng, 10);
    let fields = form_fields(&request_fields(&rows));

    let first = normalize(&fields, "16/10/2026").unwrap();
    let second = normalize(&fields, "16/10/2026").unwrap();
    assert_eq!(
        serde_json::to_vec(&first).unwrap(),
        serde_json::to_vec(&second).unwrap()
    );
}
