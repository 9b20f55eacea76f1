//! Loan listings, renewals and the librarian's copy bookkeeping.

use chrono::{Duration, NaiveDate};
use serde_json::json;
use std::sync::Arc;

use crate::application::pagination::{Page, PageRequest, PageWindow};
use crate::domain::entities::{BookInstance, LoanStatus, NewBookInstance};
use crate::domain::repositories::{BookInstanceRepository, UserRepository};
use crate::error::AppError;

/// Loans shown per page in both loan lists.
pub const LOANS_PER_PAGE: u32 = 4;

/// Default renewal period offered by the renewal form.
pub const DEFAULT_RENEWAL_WEEKS: i64 = 3;

/// Furthest a loan can be renewed into the future.
pub const MAX_RENEWAL_WEEKS: i64 = 4;

/// Service for querying and changing loans.
pub struct LoanService<I: BookInstanceRepository, U: UserRepository> {
    copies: Arc<I>,
    users: Arc<U>,
}

impl<I: BookInstanceRepository, U: UserRepository> LoanService<I, U> {
    /// Creates a new loan service.
    pub fn new(copies: Arc<I>, users: Arc<U>) -> Self {
        Self { copies, users }
    }

    /// Lists one page of the copies a user has on loan, soonest due first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the page does not exist.
    pub async fn loans_for_user(
        &self,
        user_id: i64,
        request: PageRequest,
    ) -> Result<Page<BookInstance>, AppError> {
        self.on_loan_page(Some(user_id), request).await
    }

    /// Lists one page of every copy on loan, soonest due first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the page does not exist.
    pub async fn all_loans(&self, request: PageRequest) -> Result<Page<BookInstance>, AppError> {
        self.on_loan_page(None, request).await
    }

    async fn on_loan_page(
        &self,
        borrower_id: Option<i64>,
        request: PageRequest,
    ) -> Result<Page<BookInstance>, AppError> {
        let count = self.copies.count_on_loan(borrower_id).await?;
        let window = PageWindow::resolve(request, count, LOANS_PER_PAGE)?;
        let items = self
            .copies
            .list_on_loan(borrower_id, window.offset, window.limit)
            .await?;

        Ok(Page::new(items, window, count))
    }

    /// Retrieves a copy by id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no copy has this id.
    pub async fn get_copy(&self, id: i64) -> Result<BookInstance, AppError> {
        self.copies
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Book copy not found", json!({ "id": id })))
    }

    /// The renewal date the form proposes: three weeks from `today`.
    pub fn proposed_renewal_date(&self, today: NaiveDate) -> NaiveDate {
        today + Duration::weeks(DEFAULT_RENEWAL_WEEKS)
    }

    /// Checks that a renewal date lies between today and four weeks ahead.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] attached to the `renewal_date` field.
    pub fn validate_renewal_date(&self, date: NaiveDate, today: NaiveDate) -> Result<(), AppError> {
        if date < today {
            return Err(AppError::field(
                "renewal_date",
                "Invalid date - renewal in past",
            ));
        }

        if date > today + Duration::weeks(MAX_RENEWAL_WEEKS) {
            return Err(AppError::field(
                "renewal_date",
                "Invalid date - renewal more than 4 weeks ahead",
            ));
        }

        Ok(())
    }

    /// Renews a copy by moving its due date.
    ///
    /// The copy is looked up before the date is validated, so a missing copy
    /// is reported as not found regardless of the submitted date.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no copy has this id.
    /// Returns [`AppError::Validation`] if the date is out of range.
    pub async fn renew(
        &self,
        id: i64,
        renewal_date: NaiveDate,
        today: NaiveDate,
    ) -> Result<BookInstance, AppError> {
        self.get_copy(id).await?;
        self.validate_renewal_date(renewal_date, today)?;

        let copy = self.copies.update_due_back(id, renewal_date).await?;
        tracing::info!(copy_id = id, due_back = %renewal_date, "Loan renewed");

        Ok(copy)
    }

    /// Registers a new copy of a book.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for a blank imprint.
    /// Returns [`AppError::Conflict`] if the book does not exist.
    pub async fn add_copy(&self, new_copy: NewBookInstance) -> Result<BookInstance, AppError> {
        if new_copy.imprint.trim().is_empty() || new_copy.imprint.chars().count() > 200 {
            return Err(AppError::field("imprint", "Imprint must be 1-200 characters."));
        }

        self.copies.create(new_copy).await
    }

    /// Lends a copy to a user until `due_back`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the copy or user does not exist.
    /// Returns [`AppError::Conflict`] if the copy is already on loan.
    pub async fn lend(
        &self,
        id: i64,
        username: &str,
        due_back: NaiveDate,
    ) -> Result<BookInstance, AppError> {
        let copy = self.get_copy(id).await?;
        if copy.status == LoanStatus::OnLoan {
            return Err(AppError::conflict(
                "Copy is already on loan",
                json!({ "id": id, "borrower": copy.borrower_username }),
            ));
        }

        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::not_found("User not found", json!({ "username": username })))?;

        let copy = self.copies.lend(id, user.id, due_back).await?;
        tracing::info!(copy_id = id, borrower = %user.username, "Copy lent");

        Ok(copy)
    }

    /// Marks a copy as returned and available.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no copy has this id.
    pub async fn mark_returned(&self, id: i64) -> Result<BookInstance, AppError> {
        let copy = self.copies.mark_returned(id).await?;
        tracing::info!(copy_id = id, "Copy returned");

        Ok(copy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Permission, User};
    use crate::domain::repositories::{MockBookInstanceRepository, MockUserRepository};
    use chrono::Utc;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    fn copy(id: i64, status: LoanStatus) -> BookInstance {
        BookInstance {
            id,
            book_id: 1,
            book_title: "Dune".into(),
            imprint: "Ace, 1990".into(),
            due_back: Some(today()),
            status,
            borrower_id: None,
            borrower_username: None,
        }
    }

    fn service(
        copies: MockBookInstanceRepository,
        users: MockUserRepository,
    ) -> LoanService<MockBookInstanceRepository, MockUserRepository> {
        LoanService::new(Arc::new(copies), Arc::new(users))
    }

    #[test]
    fn test_proposed_renewal_date_is_three_weeks() {
        let svc = service(MockBookInstanceRepository::new(), MockUserRepository::new());
        assert_eq!(
            svc.proposed_renewal_date(today()),
            NaiveDate::from_ymd_opt(2024, 3, 22).unwrap()
        );
    }

    #[test]
    fn test_validate_renewal_date_bounds() {
        let svc = service(MockBookInstanceRepository::new(), MockUserRepository::new());

        assert!(svc.validate_renewal_date(today(), today()).is_ok());
        assert!(
            svc.validate_renewal_date(today() + Duration::weeks(4), today())
                .is_ok()
        );

        let past = svc
            .validate_renewal_date(today() - Duration::days(1), today())
            .unwrap_err();
        assert_eq!(past.to_string(), "Invalid date - renewal in past");

        let far = svc
            .validate_renewal_date(today() + Duration::weeks(4) + Duration::days(1), today())
            .unwrap_err();
        assert_eq!(
            far.to_string(),
            "Invalid date - renewal more than 4 weeks ahead"
        );
    }

    #[tokio::test]
    async fn test_loans_for_user_filters_by_borrower() {
        let mut copies = MockBookInstanceRepository::new();
        copies
            .expect_count_on_loan()
            .withf(|b| *b == Some(7))
            .returning(|_| Ok(5));
        copies
            .expect_list_on_loan()
            .withf(|b, offset, limit| *b == Some(7) && *offset == 4 && *limit == 4)
            .times(1)
            .returning(|_, _, _| Ok(vec![copy(5, LoanStatus::OnLoan)]));

        let page = service(copies, MockUserRepository::new())
            .loans_for_user(7, PageRequest::Last)
            .await
            .unwrap();

        assert_eq!(page.number, 2);
        assert_eq!(page.items.len(), 1);
    }

    #[tokio::test]
    async fn test_all_loans_has_no_borrower_filter() {
        let mut copies = MockBookInstanceRepository::new();
        copies
            .expect_count_on_loan()
            .withf(|b| b.is_none())
            .returning(|_| Ok(0));
        copies
            .expect_list_on_loan()
            .withf(|b, _, _| b.is_none())
            .returning(|_, _, _| Ok(vec![]));

        let page = service(copies, MockUserRepository::new())
            .all_loans(PageRequest::default())
            .await
            .unwrap();

        assert!(page.is_empty());
        assert_eq!(page.num_pages, 1);
    }

    #[tokio::test]
    async fn test_renew_missing_copy_is_not_found() {
        let mut copies = MockBookInstanceRepository::new();
        copies.expect_find_by_id().returning(|_| Ok(None));
        copies.expect_update_due_back().never();

        // Even a date in the past reports the missing copy first.
        let err = service(copies, MockUserRepository::new())
            .renew(9, today() - Duration::days(3), today())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_renew_rejects_past_date() {
        let mut copies = MockBookInstanceRepository::new();
        copies
            .expect_find_by_id()
            .returning(|id| Ok(Some(copy(id, LoanStatus::OnLoan))));
        copies.expect_update_due_back().never();

        let err = service(copies, MockUserRepository::new())
            .renew(1, today() - Duration::days(1), today())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_renew_success() {
        let mut copies = MockBookInstanceRepository::new();
        copies
            .expect_find_by_id()
            .returning(|id| Ok(Some(copy(id, LoanStatus::OnLoan))));
        copies
            .expect_update_due_back()
            .withf(|id, date| *id == 1 && *date == NaiveDate::from_ymd_opt(2024, 3, 15).unwrap())
            .times(1)
            .returning(|id, date| {
                let mut c = copy(id, LoanStatus::OnLoan);
                c.due_back = Some(date);
                Ok(c)
            });

        let renewed = service(copies, MockUserRepository::new())
            .renew(1, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(), today())
            .await
            .unwrap();

        assert_eq!(renewed.due_back, NaiveDate::from_ymd_opt(2024, 3, 15));
    }

    #[tokio::test]
    async fn test_lend_already_on_loan() {
        let mut copies = MockBookInstanceRepository::new();
        copies
            .expect_find_by_id()
            .returning(|id| Ok(Some(copy(id, LoanStatus::OnLoan))));
        copies.expect_lend().never();

        let err = service(copies, MockUserRepository::new())
            .lend(1, "reader", today())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_lend_success() {
        let mut copies = MockBookInstanceRepository::new();
        copies
            .expect_find_by_id()
            .returning(|id| Ok(Some(copy(id, LoanStatus::Available))));
        copies
            .expect_lend()
            .withf(|id, borrower, _| *id == 1 && *borrower == 3)
            .times(1)
            .returning(|id, borrower, due| {
                let mut c = copy(id, LoanStatus::OnLoan);
                c.borrower_id = Some(borrower);
                c.due_back = Some(due);
                Ok(c)
            });

        let mut users = MockUserRepository::new();
        users.expect_find_by_username().returning(|name| {
            Ok(Some(User {
                id: 3,
                username: name.to_string(),
                password_hash: String::new(),
                is_active: true,
                permissions: vec![Permission::CanMarkReturned],
                created_at: Utc::now(),
            }))
        });

        let lent = service(copies, users)
            .lend(1, "reader", today())
            .await
            .unwrap();

        assert_eq!(lent.status, LoanStatus::OnLoan);
        assert_eq!(lent.borrower_id, Some(3));
    }

    #[tokio::test]
    async fn test_add_copy_requires_imprint() {
        let mut copies = MockBookInstanceRepository::new();
        copies.expect_create().never();

        let err = service(copies, MockUserRepository::new())
            .add_copy(NewBookInstance {
                book_id: 1,
                imprint: "  ".into(),
                status: LoanStatus::Available,
                due_back: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation { .. }));
    }
}
