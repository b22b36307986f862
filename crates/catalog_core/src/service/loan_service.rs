//! Loan status changes on individual copies.
//!
//! Any of the four statuses can follow any other. Lending sets `due_back`;
//! every other transition clears it.

use crate::model::book_instance::{BookInstance, BookInstanceId, LoanStatus};
use crate::repo::book_instance_repo::{BookInstanceListQuery, BookInstanceRepository};
use crate::repo::{RepoError, RepoResult};
use chrono::NaiveDate;
use log::info;

pub struct LoanService<R: BookInstanceRepository> {
    repo: R,
}

impl<R: BookInstanceRepository> LoanService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Marks the copy on loan until `due_back`.
    pub fn lend(&self, id: BookInstanceId, due_back: NaiveDate) -> RepoResult<BookInstance> {
        self.transition(id, LoanStatus::OnLoan, Some(due_back))
    }

    /// Puts the copy back on the shelf.
    pub fn return_copy(&self, id: BookInstanceId) -> RepoResult<BookInstance> {
        self.transition(id, LoanStatus::Available, None)
    }

    pub fn reserve(&self, id: BookInstanceId) -> RepoResult<BookInstance> {
        self.transition(id, LoanStatus::Reserved, None)
    }

    pub fn send_to_maintenance(&self, id: BookInstanceId) -> RepoResult<BookInstance> {
        self.transition(id, LoanStatus::Maintenance, None)
    }

    /// Copies on loan whose due date is before `today`, oldest first.
    pub fn list_overdue(&self, today: NaiveDate) -> RepoResult<Vec<BookInstance>> {
        let on_loan = self.repo.list_instances(&BookInstanceListQuery {
            status: Some(LoanStatus::OnLoan),
            ..BookInstanceListQuery::default()
        })?;
        Ok(on_loan
            .into_iter()
            .filter(|copy| copy.is_overdue(today))
            .collect())
    }

    fn transition(
        &self,
        id: BookInstanceId,
        status: LoanStatus,
        due_back: Option<NaiveDate>,
    ) -> RepoResult<BookInstance> {
        let mut copy = self
            .repo
            .get_instance(id)?
            .ok_or_else(|| RepoError::not_found("book instance", id))?;
        let previous = copy.status;
        copy.status = status;
        copy.due_back = due_back;
        self.repo.update_instance(&copy)?;

        info!(
            "event=loan_status_change module=service status=ok instance_id={} from={} to={}",
            id,
            previous.code(),
            status.code()
        );
        Ok(copy)
    }
}
