//! Typed HTTP client for the budget API.

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::budget_items::LineItem;
use crate::budgets::BudgetsChanged;
use crate::errors::{Error, Result};
use crate::grid::ItemsSink;
use crate::ledger::LoanPayment;
use crate::loans::{Loan, LoanUpdate, NewLoan};

pub const DEFAULT_USER_ID_HEADER: &str = "x-user-id";

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Serialize)]
struct CreateBudgetBody<'a> {
    year: &'a str,
}

#[derive(Debug, Serialize)]
struct SaveItemsBody<'a> {
    items: &'a [LineItem],
}

#[derive(Debug, Clone)]
pub struct BudgetApiClient {
    http: reqwest::Client,
    base_url: String,
    user_id: String,
    user_header: String,
}

impl BudgetApiClient {
    pub fn new(base_url: &str, user_id: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            user_id: user_id.to_string(),
            user_header: DEFAULT_USER_ID_HEADER.to_string(),
        }
    }

    pub fn with_user_header(mut self, header: &str) -> Self {
        self.user_header = header.to_string();
        self
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .header(self.user_header.as_str(), self.user_id.as_str())
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = builder.send().await?;
        let response = check_status(response).await?;
        Ok(response.json::<T>().await?)
    }

    pub async fn list_budgets(&self) -> Result<Vec<String>> {
        self.send(self.request(Method::GET, "/budgets")).await
    }

    pub async fn create_budget(&self, year: &str) -> Result<BudgetsChanged> {
        self.send(
            self.request(Method::POST, "/budgets")
                .json(&CreateBudgetBody { year }),
        )
        .await
    }

    pub async fn delete_budget(&self, year: &str) -> Result<BudgetsChanged> {
        self.send(self.request(Method::DELETE, &format!("/budgets/{}", year)))
            .await
    }

    pub async fn get_items(&self, year: &str) -> Result<Vec<LineItem>> {
        self.send(self.request(Method::GET, &format!("/budgets/{}/data", year)))
            .await
    }

    pub async fn put_items(&self, year: &str, items: &[LineItem]) -> Result<()> {
        debug!("PUT {} item(s) for {}", items.len(), year);
        let _: serde_json::Value = self
            .send(
                self.request(Method::PUT, &format!("/budgets/{}/data", year))
                    .json(&SaveItemsBody { items }),
            )
            .await?;
        Ok(())
    }

    pub async fn list_loans(&self) -> Result<Vec<Loan>> {
        self.send(self.request(Method::GET, "/loans")).await
    }

    pub async fn loan_ledger(&self) -> Result<Vec<LoanPayment>> {
        self.send(self.request(Method::GET, "/loans/ledger")).await
    }

    pub async fn create_loan(&self, new_loan: &NewLoan) -> Result<Loan> {
        self.send(self.request(Method::POST, "/loans").json(new_loan))
            .await
    }

    pub async fn update_loan(&self, loan_id: &str, update: &LoanUpdate) -> Result<Loan> {
        self.send(
            self.request(Method::PUT, &format!("/loans/{}", loan_id))
                .json(update),
        )
        .await
    }

    pub async fn delete_loan(&self, loan_id: &str) -> Result<()> {
        let _: serde_json::Value = self
            .send(self.request(Method::DELETE, &format!("/loans/{}", loan_id)))
            .await?;
        Ok(())
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => status.to_string(),
    };
    warn!("Request failed with {}: {}", status, message);
    Err(match status {
        StatusCode::BAD_REQUEST => Error::invalid_input(message),
        StatusCode::UNAUTHORIZED => Error::Unauthorized(message),
        StatusCode::NOT_FOUND => Error::NotFound(message),
        _ => Error::Http(format!("{}: {}", status, message)),
    })
}

#[async_trait]
impl ItemsSink for BudgetApiClient {
    async fn save_items(&self, year: &str, items: Vec<LineItem>) -> Result<()> {
        self.put_items(year, &items).await
    }
}
