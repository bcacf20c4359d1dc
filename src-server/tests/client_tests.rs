use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderName;
use budgetbook_core::budget_items::{ItemKind, ItemRole, LineItem};
use budgetbook_core::client::BudgetApiClient;
use budgetbook_core::db;
use budgetbook_core::errors::{Error, ValidationError};
use budgetbook_core::grid::{BudgetGrid, DebouncedSaver, GridSession};
use budgetbook_core::loans::{LoanUpdate, NewLoan};
use budgetbook_core::months::Month;
use budgetbook_server::main_lib::{app, build_state};
use tempfile::TempDir;

async fn spawn_server() -> (TempDir, String) {
    let dir = tempfile::tempdir().unwrap();
    let url = dir.path().join("client.db");
    let pool = db::init(url.to_str().unwrap(), 4).unwrap();
    let state = build_state(Arc::new(pool), HeaderName::from_static("x-user-id"));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app(state)).await.unwrap();
    });
    (dir, format!("http://{}", addr))
}

#[tokio::test]
async fn client_drives_budgets_and_items() {
    let (_dir, base) = spawn_server().await;
    let client = BudgetApiClient::new(&base, "alice");

    let changed = client.create_budget("2025").await.unwrap();
    assert_eq!(changed.budgets, vec!["2025"]);
    match client.create_budget("2025").await {
        Err(Error::Validation(ValidationError::InvalidInput(msg))) => {
            assert!(msg.contains("already exists"))
        }
        other => panic!("unexpected result: {:?}", other),
    }

    let mut grid = BudgetGrid::new("2025", client.get_items("2025").await.unwrap());
    let salary = grid.add_item("Salary", ItemKind::Income, ItemRole::None).id.clone();
    let rent = grid.add_item("Rent", ItemKind::Expense, ItemRole::None).id.clone();
    grid.set_cell(&salary, Month::January, "4000").unwrap();
    grid.set_cell(&rent, Month::January, "=1200+300").unwrap();
    client.put_items("2025", grid.items()).await.unwrap();

    let loaded = client.get_items("2025").await.unwrap();
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[0].name, "Salary");
    assert_eq!(loaded[1].months.get(Month::January), 1500.0);
    assert_eq!(loaded[1].formulas.get(&Month::January).unwrap(), "=1200+300");

    let changed = client.delete_budget("2025").await.unwrap();
    assert!(changed.budgets.is_empty());
    assert!(matches!(
        client.delete_budget("2025").await,
        Err(Error::NotFound(_))
    ));
}

#[tokio::test]
async fn client_manages_loans_and_ledger() {
    let (_dir, base) = spawn_server().await;
    let alice = BudgetApiClient::new(&base, "alice");
    let mallory = BudgetApiClient::new(&base, "mallory");

    let loan = alice
        .create_loan(&NewLoan {
            name: Some("Car".to_string()),
            amount: Some(5000.0),
            start_date: Some("2025-02-01".to_string()),
        })
        .await
        .unwrap();

    let payment = LineItem::new("Car payment", ItemKind::Expense)
        .with_role(ItemRole::LoanLinked {
            loan_id: loan.id.clone(),
        })
        .with_value(Month::March, 1000.0);
    alice.put_items("2025", &[payment]).await.unwrap();

    let ledger = alice.loan_ledger().await.unwrap();
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger[0].total_payment, 1000.0);
    assert_eq!(ledger[0].remaining, 4000.0);

    assert!(matches!(
        mallory
            .update_loan(
                &loan.id,
                &LoanUpdate {
                    amount: Some(0.0),
                    ..Default::default()
                }
            )
            .await,
        Err(Error::NotFound(_))
    ));
    assert!(matches!(
        mallory.delete_loan(&loan.id).await,
        Err(Error::NotFound(_))
    ));

    alice.delete_loan(&loan.id).await.unwrap();
    assert!(alice.list_loans().await.unwrap().is_empty());

    let anonymous = BudgetApiClient::new(&base, "");
    assert!(matches!(
        anonymous.list_budgets().await,
        Err(Error::Unauthorized(_))
    ));
}

#[tokio::test]
async fn grid_session_saves_the_last_snapshot() {
    let (_dir, base) = spawn_server().await;
    let client = Arc::new(BudgetApiClient::new(&base, "alice"));
    let saver = DebouncedSaver::new(Arc::clone(&client), Duration::from_millis(50));
    let mut session = GridSession::new(BudgetGrid::new("2025", Vec::new()), saver);

    let first = session.add_item("First", ItemKind::Expense, ItemRole::None);
    session.add_item("Second", ItemKind::Expense, ItemRole::None);
    session.set_cell(&first, Month::April, "=20*5").unwrap();

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(!session.saver().is_pending());
    let loaded = client.get_items("2025").await.unwrap();
    let names: Vec<&str> = loaded.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["First", "Second"]);
    assert_eq!(loaded[0].months.get(Month::April), 100.0);
}
