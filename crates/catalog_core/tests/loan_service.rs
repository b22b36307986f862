use catalog_core::db::open_db_in_memory;
use catalog_core::{
    BookInstance, BookInstanceRepository, BookRepository, LoanService, LoanStatus, NewBook,
    RepoError, SqliteBookInstanceRepository, SqliteBookRepository,
};
use chrono::NaiveDate;
use uuid::Uuid;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn lend_then_return_updates_status_and_due_date() {
    let conn = open_db_in_memory().unwrap();
    let book = SqliteBookRepository::try_new(&conn)
        .unwrap()
        .create_book(&NewBook::new("Dune", "9780441013593"))
        .unwrap();
    let repo = SqliteBookInstanceRepository::try_new(&conn).unwrap();
    let copy = BookInstance::new(book.id, "Ace, 2005");
    repo.create_instance(&copy).unwrap();

    let loans = LoanService::new(SqliteBookInstanceRepository::try_new(&conn).unwrap());

    let lent = loans.lend(copy.id, date(2024, 5, 1)).unwrap();
    assert_eq!(lent.status, LoanStatus::OnLoan);
    assert_eq!(lent.due_back, Some(date(2024, 5, 1)));
    assert_eq!(repo.get_instance(copy.id).unwrap().unwrap(), lent);

    let returned = loans.return_copy(copy.id).unwrap();
    assert_eq!(returned.status, LoanStatus::Available);
    assert_eq!(returned.due_back, None);

    assert_eq!(loans.reserve(copy.id).unwrap().status, LoanStatus::Reserved);
    assert_eq!(
        loans.send_to_maintenance(copy.id).unwrap().status,
        LoanStatus::Maintenance
    );
}

#[test]
fn list_overdue_only_returns_past_due_loans() {
    let conn = open_db_in_memory().unwrap();
    let book = SqliteBookRepository::try_new(&conn)
        .unwrap()
        .create_book(&NewBook::new("Dune", "9780441013593"))
        .unwrap();
    let repo = SqliteBookInstanceRepository::try_new(&conn).unwrap();
    let loans = LoanService::new(SqliteBookInstanceRepository::try_new(&conn).unwrap());

    let late = BookInstance::new(book.id, "late");
    let on_time = BookInstance::new(book.id, "on time");
    let mut shelved = BookInstance::new(book.id, "shelved");
    shelved.due_back = Some(date(2024, 1, 1));
    shelved.status = LoanStatus::Available;
    for copy in [&late, &on_time, &shelved] {
        repo.create_instance(copy).unwrap();
    }
    loans.lend(late.id, date(2024, 2, 1)).unwrap();
    loans.lend(on_time.id, date(2024, 4, 1)).unwrap();

    let overdue = loans.list_overdue(date(2024, 3, 1)).unwrap();
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0].id, late.id);
}

#[test]
fn transition_on_missing_copy_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let loans = LoanService::new(SqliteBookInstanceRepository::try_new(&conn).unwrap());

    let err = loans.return_copy(Uuid::new_v4()).unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound {
            entity: "book instance",
            ..
        }
    ));
}
