//! Author pages: list, detail and the create/update/delete forms.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Extension, Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};

use crate::domain::entities::{Author, Book, Session};
use crate::error::AppError;
use crate::state::AppState;
use crate::web::context::Nav;
use crate::web::forms::{AuthorForm, CsrfForm, FormErrors};
use crate::web::handlers::validation_outcome;

#[derive(Template, WebTemplate)]
#[template(path = "catalog/author_list.html")]
pub struct AuthorListTemplate {
    pub nav: Nav,
    pub authors: Vec<Author>,
}

#[derive(Template, WebTemplate)]
#[template(path = "catalog/author_detail.html")]
pub struct AuthorDetailTemplate {
    pub nav: Nav,
    pub author: Author,
    pub books: Vec<Book>,
}

#[derive(Template, WebTemplate)]
#[template(path = "catalog/author_form.html")]
pub struct AuthorFormTemplate {
    pub nav: Nav,
    pub author: Option<Author>,
    pub form: AuthorForm,
    pub errors: FormErrors,
}

#[derive(Template, WebTemplate)]
#[template(path = "catalog/author_confirm_delete.html")]
pub struct AuthorDeleteTemplate {
    pub nav: Nav,
    pub author: Author,
    pub books: Vec<Book>,
}

fn author_url(id: i64) -> String {
    format!("/catalog/author/{id}")
}

/// Lists all authors by last name.
///
/// # Endpoint
///
/// `GET /catalog/authors/`
pub async fn author_list_handler(
    State(st): State<AppState>,
    nav: Nav,
) -> Result<impl IntoResponse, AppError> {
    let authors = st.catalog_service.list_authors().await?;
    Ok(AuthorListTemplate { nav, authors })
}

/// `GET /catalog/author/{id}`
pub async fn author_detail_handler(
    State(st): State<AppState>,
    Path(id): Path<i64>,
    nav: Nav,
) -> Result<impl IntoResponse, AppError> {
    let detail = st.catalog_service.author_detail(id).await?;
    Ok(AuthorDetailTemplate {
        nav,
        author: detail.author,
        books: detail.books,
    })
}

/// `GET /catalog/author/create/`
pub async fn author_create_form_handler(nav: Nav) -> impl IntoResponse {
    AuthorFormTemplate {
        nav,
        author: None,
        form: AuthorForm::initial(),
        errors: FormErrors::new(),
    }
}

/// Creates an author and redirects to their page.
///
/// # Endpoint
///
/// `POST /catalog/author/create/`
///
/// Invalid input re-renders the form with messages next to each field.
pub async fn author_create_handler(
    State(st): State<AppState>,
    Extension(session): Extension<Session>,
    nav: Nav,
    Form(form): Form<AuthorForm>,
) -> Result<Response, AppError> {
    st.session_service
        .verify_csrf(&session, &form.csrf_token)?;

    let outcome = match form.to_input() {
        Ok(input) => validation_outcome(st.catalog_service.create_author(input).await)?,
        Err(errors) => Err(errors),
    };

    Ok(match outcome {
        Ok(author) => Redirect::to(&author_url(author.id)).into_response(),
        Err(errors) => AuthorFormTemplate {
            nav,
            author: None,
            form,
            errors,
        }
        .into_response(),
    })
}

/// `GET /catalog/author/{id}/update/`
pub async fn author_update_form_handler(
    State(st): State<AppState>,
    Path(id): Path<i64>,
    nav: Nav,
) -> Result<impl IntoResponse, AppError> {
    let author = st.catalog_service.get_author(id).await?;
    Ok(AuthorFormTemplate {
        nav,
        form: AuthorForm::from_author(&author),
        author: Some(author),
        errors: FormErrors::new(),
    })
}

/// `POST /catalog/author/{id}/update/`
pub async fn author_update_handler(
    State(st): State<AppState>,
    Path(id): Path<i64>,
    Extension(session): Extension<Session>,
    nav: Nav,
    Form(form): Form<AuthorForm>,
) -> Result<Response, AppError> {
    st.session_service
        .verify_csrf(&session, &form.csrf_token)?;
    let author = st.catalog_service.get_author(id).await?;

    let outcome = match form.to_input() {
        Ok(input) => validation_outcome(st.catalog_service.update_author(id, input).await)?,
        Err(errors) => Err(errors),
    };

    Ok(match outcome {
        Ok(updated) => Redirect::to(&author_url(updated.id)).into_response(),
        Err(errors) => AuthorFormTemplate {
            nav,
            author: Some(author),
            form,
            errors,
        }
        .into_response(),
    })
}

/// Confirmation page listing the books that will lose their author.
///
/// # Endpoint
///
/// `GET /catalog/author/{id}/delete/`
pub async fn author_delete_form_handler(
    State(st): State<AppState>,
    Path(id): Path<i64>,
    nav: Nav,
) -> Result<impl IntoResponse, AppError> {
    let detail = st.catalog_service.author_detail(id).await?;
    Ok(AuthorDeleteTemplate {
        nav,
        author: detail.author,
        books: detail.books,
    })
}

/// `POST /catalog/author/{id}/delete/` deletes and redirects to the author list.
pub async fn author_delete_handler(
    State(st): State<AppState>,
    Path(id): Path<i64>,
    Extension(session): Extension<Session>,
    Form(form): Form<CsrfForm>,
) -> Result<Redirect, AppError> {
    st.session_service
        .verify_csrf(&session, &form.csrf_token)?;
    st.catalog_service.delete_author(id).await?;

    Ok(Redirect::to("/catalog/authors/"))
}
