use catalog_core::db::open_db_in_memory;
use catalog_core::{
    BookInstance, BookInstanceListQuery, LoanStatus, NewAuthor, NewBook, RepoError,
    SqliteCatalogService,
};

#[test]
fn create_trims_text_input() {
    let conn = open_db_in_memory().unwrap();
    let catalog = SqliteCatalogService::open(&conn).unwrap();

    let author = catalog
        .create_author(NewAuthor::new("  Paulo ", " Coelho\n"))
        .unwrap();
    assert_eq!(author.to_string(), "Paulo Coelho");

    let genre = catalog.create_genre("  Fable ").unwrap();
    assert_eq!(genre.name, "Fable");

    let book = catalog
        .create_book(NewBook::new(" The Alchemist ", " 9780062315007 "))
        .unwrap();
    assert_eq!(book.title, "The Alchemist");
    assert_eq!(book.isbn, "9780062315007");
    assert!(catalog
        .find_book_by_isbn("9780062315007 ")
        .unwrap()
        .is_some());
}

#[test]
fn book_detail_follows_relations() {
    let conn = open_db_in_memory().unwrap();
    let catalog = SqliteCatalogService::open(&conn).unwrap();

    let author = catalog
        .create_author(NewAuthor::new("Frank", "Herbert"))
        .unwrap();
    let ids: Vec<i64> = ["Space Opera", "Adventure", "Politics", "Ecology"]
        .into_iter()
        .map(|name| catalog.create_genre(name).unwrap().id)
        .collect();

    let mut input = NewBook::new("Dune", "9780441013593");
    input.author_id = Some(author.id);
    input.genre_ids = ids;
    let book = catalog.create_book(input).unwrap();
    let copy = catalog
        .create_instance(&BookInstance::new(book.id, "Ace, 2005"))
        .unwrap();

    let detail = catalog.book_detail(book.id).unwrap().unwrap();
    assert_eq!(detail.author.as_ref(), Some(&author));
    assert_eq!(detail.genres.len(), 4);
    let names: Vec<&str> = detail
        .genres
        .iter()
        .map(|genre| genre.name.as_str())
        .collect();
    assert_eq!(
        names,
        vec!["Adventure", "Ecology", "Politics", "Space Opera"]
    );
    assert_eq!(detail.copies, vec![copy]);
    assert_eq!(detail.book.absolute_url(), format!("/catalog/book/{}", book.id));

    assert!(catalog.book_detail(book.id + 1).unwrap().is_none());
}

#[test]
fn author_detail_lists_their_books() {
    let conn = open_db_in_memory().unwrap();
    let catalog = SqliteCatalogService::open(&conn).unwrap();

    let author = catalog
        .create_author(NewAuthor::new("Jane", "Austen"))
        .unwrap();
    for (title, isbn) in [("Persuasion", "9780141439686"), ("Emma", "9780141439587")] {
        let mut input = NewBook::new(title, isbn);
        input.author_id = Some(author.id);
        catalog.create_book(input).unwrap();
    }
    catalog
        .create_book(NewBook::new("Anonymous", "0000000000000"))
        .unwrap();

    let detail = catalog.author_detail(author.id).unwrap().unwrap();
    let titles: Vec<&str> = detail.books.iter().map(|book| book.title.as_str()).collect();
    assert_eq!(titles, vec!["Emma", "Persuasion"]);
    assert_eq!(
        detail.author.absolute_url(),
        format!("/catalog/author/{}", author.id)
    );
}

#[test]
fn deleting_author_keeps_books_and_restricted_book_delete_is_reported() {
    let conn = open_db_in_memory().unwrap();
    let catalog = SqliteCatalogService::open(&conn).unwrap();

    let author = catalog
        .create_author(NewAuthor::new("Mary", "Shelley"))
        .unwrap();
    let mut input = NewBook::new("Frankenstein", "9780486282114");
    input.author_id = Some(author.id);
    let book = catalog.create_book(input).unwrap();
    catalog
        .create_instance(&BookInstance::new(book.id, "Dover"))
        .unwrap();

    catalog.delete_author(author.id).unwrap();
    let book = catalog.get_book(book.id).unwrap().unwrap();
    assert_eq!(book.author_id, None);

    let err = catalog.delete_book(book.id).unwrap_err();
    assert!(matches!(err, RepoError::DeleteRestricted { count: 1, .. }));
}

#[test]
fn instance_label_uses_book_title() {
    let conn = open_db_in_memory().unwrap();
    let catalog = SqliteCatalogService::open(&conn).unwrap();

    let book = catalog
        .create_book(NewBook::new("Beloved", "9781400033416"))
        .unwrap();
    let copy = catalog
        .create_instance(&BookInstance::new(book.id, "Vintage"))
        .unwrap();

    assert_eq!(
        catalog.instance_label(copy.id).unwrap(),
        format!("{} Beloved", copy.id)
    );
}

#[test]
fn stats_on_empty_catalog_are_zero() {
    let conn = open_db_in_memory().unwrap();
    let catalog = SqliteCatalogService::open(&conn).unwrap();

    let stats = catalog.stats().unwrap();
    assert_eq!(
        (stats.books, stats.copies, stats.authors, stats.genres),
        (0, 0, 0, 0)
    );
}

#[test]
fn stats_counts_records_and_available_copies() {
    let conn = open_db_in_memory().unwrap();
    let catalog = SqliteCatalogService::open(&conn).unwrap();

    catalog
        .create_author(NewAuthor::new("Toni", "Morrison"))
        .unwrap();
    catalog.create_genre("Literary").unwrap();
    let book = catalog
        .create_book(NewBook::new("Beloved", "9781400033416"))
        .unwrap();
    for status in [LoanStatus::Available, LoanStatus::Available, LoanStatus::OnLoan] {
        let mut copy = BookInstance::new(book.id, "Vintage");
        copy.status = status;
        catalog.create_instance(&copy).unwrap();
    }

    let stats = catalog.stats().unwrap();
    assert_eq!(stats.books, 1);
    assert_eq!(stats.copies, 3);
    assert_eq!(stats.available_copies, 2);
    assert_eq!(stats.authors, 1);
    assert_eq!(stats.genres, 1);

    let available = catalog
        .list_instances(&BookInstanceListQuery {
            status: Some(LoanStatus::Available),
            ..BookInstanceListQuery::default()
        })
        .unwrap();
    assert_eq!(available.len(), 2);
}
