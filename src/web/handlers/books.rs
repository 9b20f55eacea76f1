//! Book pages: list, detail and the create/update/delete forms.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Extension,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::Form;
use chrono::{NaiveDate, Utc};

use crate::application::pagination::Page;
use crate::application::services::catalog_service::BookFormChoices;
use crate::domain::entities::{Book, BookInstance, Session};
use crate::error::AppError;
use crate::state::AppState;
use crate::web::context::Nav;
use crate::web::forms::{BookForm, CsrfForm, FormErrors, PaginationParams};
use crate::web::handlers::validation_outcome;

#[derive(Template, WebTemplate)]
#[template(path = "catalog/book_list.html")]
pub struct BookListTemplate {
    pub nav: Nav,
    pub page: Page<Book>,
}

#[derive(Template, WebTemplate)]
#[template(path = "catalog/book_detail.html")]
pub struct BookDetailTemplate {
    pub nav: Nav,
    pub book: Book,
    pub copies: Vec<BookInstance>,
    pub today: NaiveDate,
}

impl BookDetailTemplate {
    fn is_overdue(&self, copy: &BookInstance) -> bool {
        copy.is_overdue(self.today)
    }
}

/// Create and update share one template; `book` is `None` when creating.
#[derive(Template, WebTemplate)]
#[template(path = "catalog/book_form.html")]
pub struct BookFormTemplate {
    pub nav: Nav,
    pub book: Option<Book>,
    pub form: BookForm,
    pub errors: FormErrors,
    pub choices: BookFormChoices,
}

#[derive(Template, WebTemplate)]
#[template(path = "catalog/book_confirm_delete.html")]
pub struct BookDeleteTemplate {
    pub nav: Nav,
    pub book: Book,
    pub errors: FormErrors,
}

fn book_url(id: i64) -> String {
    format!("/catalog/book/{id}")
}

/// Lists books four per page.
///
/// # Endpoint
///
/// `GET /catalog/books/?page=N|last`
///
/// # Errors
///
/// Returns 404 for a page that is not a number or out of range.
pub async fn book_list_handler(
    State(st): State<AppState>,
    Query(params): Query<PaginationParams>,
    nav: Nav,
) -> Result<impl IntoResponse, AppError> {
    let page = st.catalog_service.list_books(params.page_request()?).await?;
    Ok(BookListTemplate { nav, page })
}

/// Shows a book with every copy and its loan status.
///
/// # Endpoint
///
/// `GET /catalog/book/{id}`
pub async fn book_detail_handler(
    State(st): State<AppState>,
    Path(id): Path<i64>,
    nav: Nav,
) -> Result<impl IntoResponse, AppError> {
    let detail = st.catalog_service.book_detail(id).await?;
    Ok(BookDetailTemplate {
        nav,
        book: detail.book,
        copies: detail.copies,
        today: Utc::now().date_naive(),
    })
}

/// `GET /catalog/book/create/`
pub async fn book_create_form_handler(
    State(st): State<AppState>,
    nav: Nav,
) -> Result<impl IntoResponse, AppError> {
    Ok(BookFormTemplate {
        nav,
        book: None,
        form: BookForm::default(),
        errors: FormErrors::new(),
        choices: st.catalog_service.form_choices().await?,
    })
}

/// Creates a book and redirects to it, or re-renders the form with errors.
///
/// # Endpoint
///
/// `POST /catalog/book/create/`
pub async fn book_create_handler(
    State(st): State<AppState>,
    Extension(session): Extension<Session>,
    nav: Nav,
    Form(form): Form<BookForm>,
) -> Result<Response, AppError> {
    st.session_service
        .verify_csrf(&session, &form.csrf_token)?;

    let outcome = match form.to_input() {
        Ok(input) => validation_outcome(st.catalog_service.create_book(input).await)?,
        Err(errors) => Err(errors),
    };

    match outcome {
        Ok(book) => Ok(Redirect::to(&book_url(book.id)).into_response()),
        Err(errors) => Ok(BookFormTemplate {
            nav,
            book: None,
            form,
            errors,
            choices: st.catalog_service.form_choices().await?,
        }
        .into_response()),
    }
}

/// `GET /catalog/book/{id}/update/`
pub async fn book_update_form_handler(
    State(st): State<AppState>,
    Path(id): Path<i64>,
    nav: Nav,
) -> Result<impl IntoResponse, AppError> {
    let book = st.catalog_service.get_book(id).await?;
    Ok(BookFormTemplate {
        nav,
        form: BookForm::from_book(&book),
        book: Some(book),
        errors: FormErrors::new(),
        choices: st.catalog_service.form_choices().await?,
    })
}

/// Updates a book and redirects to it, or re-renders the form with errors.
///
/// # Endpoint
///
/// `POST /catalog/book/{id}/update/`
pub async fn book_update_handler(
    State(st): State<AppState>,
    Path(id): Path<i64>,
    Extension(session): Extension<Session>,
    nav: Nav,
    Form(form): Form<BookForm>,
) -> Result<Response, AppError> {
    st.session_service
        .verify_csrf(&session, &form.csrf_token)?;
    let book = st.catalog_service.get_book(id).await?;

    let outcome = match form.to_input() {
        Ok(input) => validation_outcome(st.catalog_service.update_book(id, input).await)?,
        Err(errors) => Err(errors),
    };

    match outcome {
        Ok(updated) => Ok(Redirect::to(&book_url(updated.id)).into_response()),
        Err(errors) => Ok(BookFormTemplate {
            nav,
            book: Some(book),
            form,
            errors,
            choices: st.catalog_service.form_choices().await?,
        }
        .into_response()),
    }
}

/// `GET /catalog/book/{id}/delete/`
pub async fn book_delete_form_handler(
    State(st): State<AppState>,
    Path(id): Path<i64>,
    nav: Nav,
) -> Result<impl IntoResponse, AppError> {
    Ok(BookDeleteTemplate {
        nav,
        book: st.catalog_service.get_book(id).await?,
        errors: FormErrors::new(),
    })
}

/// Deletes a book and redirects to the book list.
///
/// A book that still has copies is not deleted; the confirmation page is
/// shown again with the reason.
///
/// # Endpoint
///
/// `POST /catalog/book/{id}/delete/`
pub async fn book_delete_handler(
    State(st): State<AppState>,
    Path(id): Path<i64>,
    Extension(session): Extension<Session>,
    nav: Nav,
    Form(form): Form<CsrfForm>,
) -> Result<Response, AppError> {
    st.session_service
        .verify_csrf(&session, &form.csrf_token)?;

    match st.catalog_service.delete_book(id).await {
        Ok(()) => Ok(Redirect::to("/catalog/books/").into_response()),
        Err(AppError::Conflict { message, .. }) => Ok(BookDeleteTemplate {
            nav,
            book: st.catalog_service.get_book(id).await?,
            errors: FormErrors::non_field(message),
        }
        .into_response()),
        Err(e) => Err(e),
    }
}
