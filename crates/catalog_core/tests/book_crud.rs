use catalog_core::db::open_db_in_memory;
use catalog_core::{
    BookInstance, BookInstanceRepository, BookListQuery, BookRepository, GenreRepository,
    NewBook, NewGenre, RepoError, SqliteBookInstanceRepository, SqliteBookRepository,
    SqliteGenreRepository,
};

#[test]
fn create_links_genres_deduplicated_and_sorted() {
    let conn = open_db_in_memory().unwrap();
    let genres = SqliteGenreRepository::try_new(&conn).unwrap();
    let books = SqliteBookRepository::try_new(&conn).unwrap();

    let fantasy = genres.create_genre(&NewGenre::new("Fantasy")).unwrap();
    let adventure = genres.create_genre(&NewGenre::new("Adventure")).unwrap();

    let mut input = NewBook::new("The Hobbit", "9780547928227");
    input.genre_ids = vec![fantasy.id, adventure.id, fantasy.id];
    let created = books.create_book(&input).unwrap();

    let mut expected_ids = vec![fantasy.id, adventure.id];
    expected_ids.sort_unstable();
    assert_eq!(created.genre_ids, expected_ids);

    let loaded = books.get_book(created.id).unwrap().unwrap();
    assert_eq!(loaded, created);

    let names: Vec<String> = books
        .genres_for_book(created.id)
        .unwrap()
        .into_iter()
        .map(|genre| genre.name)
        .collect();
    assert_eq!(names, vec!["Adventure", "Fantasy"]);
}

#[test]
fn duplicate_isbn_is_rejected_on_create_and_update() {
    let conn = open_db_in_memory().unwrap();
    let books = SqliteBookRepository::try_new(&conn).unwrap();

    books
        .create_book(&NewBook::new("The Alchemist", "9780062315007"))
        .unwrap();
    let err = books
        .create_book(&NewBook::new("Another Alchemist", "9780062315007"))
        .unwrap_err();
    assert!(matches!(err, RepoError::DuplicateIsbn(ref isbn) if isbn == "9780062315007"));

    let mut other = books
        .create_book(&NewBook::new("Dune", "9780441013593"))
        .unwrap();
    other.isbn = "9780062315007".to_string();
    let err = books.update_book(&other).unwrap_err();
    assert!(matches!(err, RepoError::DuplicateIsbn(_)));

    assert_eq!(books.list_books(&BookListQuery::default()).unwrap().len(), 2);
}

#[test]
fn deleting_book_with_copies_is_restricted() {
    let conn = open_db_in_memory().unwrap();
    let books = SqliteBookRepository::try_new(&conn).unwrap();
    let copies = SqliteBookInstanceRepository::try_new(&conn).unwrap();

    let book = books
        .create_book(&NewBook::new("Dune", "9780441013593"))
        .unwrap();
    let copy = BookInstance::new(book.id, "Ace, 2005");
    copies.create_instance(&copy).unwrap();

    let err = books.delete_book(book.id).unwrap_err();
    match err {
        RepoError::DeleteRestricted {
            entity,
            referenced_by,
            count,
            ..
        } => {
            assert_eq!(entity, "book");
            assert_eq!(referenced_by, "book_instances");
            assert_eq!(count, 1);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(books.get_book(book.id).unwrap().is_some());

    copies.delete_instance(copy.id).unwrap();
    books.delete_book(book.id).unwrap();
    assert!(books.get_book(book.id).unwrap().is_none());
}

#[test]
fn foreign_key_restrict_holds_even_for_raw_sql() {
    let conn = open_db_in_memory().unwrap();
    let books = SqliteBookRepository::try_new(&conn).unwrap();
    let copies = SqliteBookInstanceRepository::try_new(&conn).unwrap();

    let book = books
        .create_book(&NewBook::new("Dune", "9780441013593"))
        .unwrap();
    copies
        .create_instance(&BookInstance::new(book.id, "Ace, 2005"))
        .unwrap();

    let err = conn
        .execute("DELETE FROM books WHERE id = ?1;", [book.id])
        .unwrap_err();
    assert!(err.to_string().contains("FOREIGN KEY constraint failed"));
}

#[test]
fn deleting_book_removes_genre_links_only() {
    let conn = open_db_in_memory().unwrap();
    let genres = SqliteGenreRepository::try_new(&conn).unwrap();
    let books = SqliteBookRepository::try_new(&conn).unwrap();

    let genre = genres.create_genre(&NewGenre::new("Poetry")).unwrap();
    let mut input = NewBook::new("Leaves of Grass", "9780486456768");
    input.genre_ids = vec![genre.id];
    let book = books.create_book(&input).unwrap();

    books.delete_book(book.id).unwrap();

    let links: i64 = conn
        .query_row("SELECT COUNT(*) FROM book_genres;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(links, 0);
    assert!(genres.get_genre(genre.id).unwrap().is_some());
}

#[test]
fn deleting_genre_unlinks_books() {
    let conn = open_db_in_memory().unwrap();
    let genres = SqliteGenreRepository::try_new(&conn).unwrap();
    let books = SqliteBookRepository::try_new(&conn).unwrap();

    let genre = genres.create_genre(&NewGenre::new("Horror")).unwrap();
    let mut input = NewBook::new("Dracula", "9780486411095");
    input.genre_ids = vec![genre.id];
    let book = books.create_book(&input).unwrap();

    genres.delete_genre(genre.id).unwrap();

    let loaded = books.get_book(book.id).unwrap().unwrap();
    assert!(loaded.genre_ids.is_empty());
}

#[test]
fn unknown_author_or_genre_is_not_found_and_nothing_is_written() {
    let conn = open_db_in_memory().unwrap();
    let books = SqliteBookRepository::try_new(&conn).unwrap();

    let mut with_author = NewBook::new("Ghost", "0000000000001");
    with_author.author_id = Some(99);
    let err = books.create_book(&with_author).unwrap_err();
    assert!(matches!(err, RepoError::NotFound { entity: "author", .. }));

    let mut with_genre = NewBook::new("Ghost", "0000000000001");
    with_genre.genre_ids = vec![7];
    let err = books.create_book(&with_genre).unwrap_err();
    assert!(matches!(err, RepoError::NotFound { entity: "genre", .. }));

    assert!(books.find_book_by_isbn("0000000000001").unwrap().is_none());
}

#[test]
fn update_replaces_genre_set() {
    let conn = open_db_in_memory().unwrap();
    let genres = SqliteGenreRepository::try_new(&conn).unwrap();
    let books = SqliteBookRepository::try_new(&conn).unwrap();

    let first = genres.create_genre(&NewGenre::new("Mystery")).unwrap();
    let second = genres.create_genre(&NewGenre::new("Thriller")).unwrap();

    let mut input = NewBook::new("Gone Girl", "9780307588371");
    input.genre_ids = vec![first.id];
    let mut book = books.create_book(&input).unwrap();

    book.genre_ids = vec![second.id];
    book.summary = "A marriage gone wrong.".to_string();
    books.update_book(&book).unwrap();

    let loaded = books.get_book(book.id).unwrap().unwrap();
    assert_eq!(loaded.genre_ids, vec![second.id]);
    assert_eq!(loaded.summary, "A marriage gone wrong.");
}

#[test]
fn list_filters_by_genre_and_orders_by_title() {
    let conn = open_db_in_memory().unwrap();
    let genres = SqliteGenreRepository::try_new(&conn).unwrap();
    let books = SqliteBookRepository::try_new(&conn).unwrap();

    let scifi = genres.create_genre(&NewGenre::new("Science Fiction")).unwrap();
    for (title, isbn, tagged) in [
        ("Neuromancer", "9780441569595", true),
        ("Emma", "9780141439587", false),
        ("Dune", "9780441013593", true),
    ] {
        let mut input = NewBook::new(title, isbn);
        if tagged {
            input.genre_ids = vec![scifi.id];
        }
        books.create_book(&input).unwrap();
    }

    let all: Vec<String> = books
        .list_books(&BookListQuery::default())
        .unwrap()
        .into_iter()
        .map(|book| book.title)
        .collect();
    assert_eq!(all, vec!["Dune", "Emma", "Neuromancer"]);

    let query = BookListQuery {
        genre_id: Some(scifi.id),
        limit: Some(1),
        offset: 1,
        ..BookListQuery::default()
    };
    let page = books.list_books(&query).unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].title, "Neuromancer");
}

#[test]
fn isbn_over_13_chars_fails_validation() {
    let conn = open_db_in_memory().unwrap();
    let books = SqliteBookRepository::try_new(&conn).unwrap();

    let err = books
        .create_book(&NewBook::new("Too Long", "97800623150071"))
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
}

#[test]
fn isbn_is_trimmed_before_length_check_uniqueness_and_lookup() {
    let conn = open_db_in_memory().unwrap();
    let books = SqliteBookRepository::try_new(&conn).unwrap();

    let dune = books
        .create_book(&NewBook::new(" Dune ", "9780441013593 "))
        .unwrap();
    assert_eq!(dune.title, "Dune");
    assert_eq!(dune.isbn, "9780441013593");
    assert_eq!(books.get_book(dune.id).unwrap(), Some(dune.clone()));

    let first = books.create_book(&NewBook::new("Emma", "12345")).unwrap();
    let err = books
        .create_book(&NewBook::new("Emma again", " 12345"))
        .unwrap_err();
    assert!(matches!(err, RepoError::DuplicateIsbn(ref isbn) if isbn == "12345"));
    assert_eq!(books.count_books().unwrap(), 2);

    let found = books.find_book_by_isbn(" 12345\n").unwrap().unwrap();
    assert_eq!(found.id, first.id);

    let mut renamed = dune;
    renamed.isbn = "\t12345".to_string();
    assert!(matches!(
        books.update_book(&renamed).unwrap_err(),
        RepoError::DuplicateIsbn(_)
    ));
}

#[test]
fn genre_names_are_stored_trimmed() {
    let conn = open_db_in_memory().unwrap();
    let genres = SqliteGenreRepository::try_new(&conn).unwrap();

    let mut fable = genres.create_genre(&NewGenre::new("  Fable\n")).unwrap();
    assert_eq!(fable.name, "Fable");

    fable.name = " Myth ".to_string();
    genres.update_genre(&fable).unwrap();
    assert_eq!(genres.get_genre(fable.id).unwrap().unwrap().name, "Myth");
    assert_eq!(genres.count_genres().unwrap(), 1);
}
