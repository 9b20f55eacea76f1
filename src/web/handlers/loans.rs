//! Loan lists and the librarian renewal form.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Extension, Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use chrono::{NaiveDate, Utc};
use serde_json::json;

use crate::application::pagination::Page;
use crate::domain::entities::{BookInstance, Session};
use crate::error::AppError;
use crate::state::AppState;
use crate::web::context::Nav;
use crate::web::forms::{FormErrors, PaginationParams, RenewForm};
use crate::web::handlers::validation_outcome;

#[derive(Template, WebTemplate)]
#[template(path = "catalog/bookinstance_list_borrowed_user.html")]
pub struct MyLoansTemplate {
    pub nav: Nav,
    pub page: Page<BookInstance>,
    pub today: NaiveDate,
}

#[derive(Template, WebTemplate)]
#[template(path = "catalog/bookinstance_list_all_borrowed.html")]
pub struct AllLoansTemplate {
    pub nav: Nav,
    pub page: Page<BookInstance>,
    pub today: NaiveDate,
}

impl MyLoansTemplate {
    fn is_overdue(&self, copy: &BookInstance) -> bool {
        copy.is_overdue(self.today)
    }
}

impl AllLoansTemplate {
    fn is_overdue(&self, copy: &BookInstance) -> bool {
        copy.is_overdue(self.today)
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "catalog/book_renew_librarian.html")]
pub struct RenewTemplate {
    pub nav: Nav,
    pub copy: BookInstance,
    pub form: RenewForm,
    pub errors: FormErrors,
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

impl RenewTemplate {
    fn is_overdue(&self) -> bool {
        self.copy.is_overdue(today())
    }
}

/// Copies on loan to the signed-in user, soonest due first.
///
/// # Endpoint
///
/// `GET /catalog/mybooks/?page=N|last`
///
/// # Authentication
///
/// Login required; anonymous visitors are redirected to the login page.
pub async fn my_loans_handler(
    State(st): State<AppState>,
    Extension(session): Extension<Session>,
    Query(params): Query<PaginationParams>,
    nav: Nav,
) -> Result<impl IntoResponse, AppError> {
    let user_id = session
        .user_id
        .ok_or_else(|| AppError::unauthorized("Login required", json!({})))?;

    let page = st
        .loan_service
        .loans_for_user(user_id, params.page_request()?)
        .await?;

    Ok(MyLoansTemplate {
        nav,
        page,
        today: today(),
    })
}

/// Every copy on loan, with its borrower.
///
/// # Endpoint
///
/// `GET /catalog/borrowed/?page=N|last`
///
/// # Authentication
///
/// Requires `catalog.can_mark_returned`.
pub async fn all_loans_handler(
    State(st): State<AppState>,
    Query(params): Query<PaginationParams>,
    nav: Nav,
) -> Result<impl IntoResponse, AppError> {
    let page = st.loan_service.all_loans(params.page_request()?).await?;

    Ok(AllLoansTemplate {
        nav,
        page,
        today: today(),
    })
}

/// Renewal form proposing a due date three weeks from today.
///
/// # Endpoint
///
/// `GET /catalog/book/{id}/renew/`
pub async fn renew_form_handler(
    State(st): State<AppState>,
    Path(id): Path<i64>,
    nav: Nav,
) -> Result<impl IntoResponse, AppError> {
    let copy = st.loan_service.get_copy(id).await?;
    let proposed = st.loan_service.proposed_renewal_date(today());

    Ok(RenewTemplate {
        nav,
        copy,
        form: RenewForm::initial(proposed),
        errors: FormErrors::new(),
    })
}

/// Sets a new due date and returns to the list of all loans.
///
/// # Endpoint
///
/// `POST /catalog/book/{id}/renew/`
///
/// # Errors
///
/// Returns 404 for an unknown copy. A date in the past or more than four
/// weeks ahead re-renders the form with the reason.
pub async fn renew_handler(
    State(st): State<AppState>,
    Path(id): Path<i64>,
    Extension(session): Extension<Session>,
    nav: Nav,
    Form(form): Form<RenewForm>,
) -> Result<Response, AppError> {
    st.session_service
        .verify_csrf(&session, &form.csrf_token)?;
    let copy = st.loan_service.get_copy(id).await?;

    let outcome = match form.renewal_date() {
        Ok(date) => validation_outcome(st.loan_service.renew(id, date, today()).await)?,
        Err(errors) => Err(errors),
    };

    Ok(match outcome {
        Ok(_) => Redirect::to("/catalog/borrowed/").into_response(),
        Err(errors) => RenewTemplate {
            nav,
            copy,
            form,
            errors,
        }
        .into_response(),
    })
}
