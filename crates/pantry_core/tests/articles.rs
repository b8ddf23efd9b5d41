use chrono::NaiveDate;
use pantry_core::db::{open_db, open_db_in_memory};
use pantry_core::{
    Article, ArticleInput, ArticleService, OwnerId, OwnerRepository, PantryError, SectionId,
    SectionScope, SectionService, SqliteArticleRepository, SqliteOwnerRepository,
    SqliteSectionRepository,
};
use rusqlite::Connection;

fn setup() -> Connection {
    open_db_in_memory().unwrap()
}

fn create_owner(conn: &Connection, username: &str) -> OwnerId {
    SqliteOwnerRepository::try_new(conn)
        .unwrap()
        .create_owner(username)
        .unwrap()
}

fn create_section(conn: &Connection, owner_id: OwnerId, name: &str) -> SectionId {
    SectionService::new(
        SqliteOwnerRepository::try_new(conn).unwrap(),
        SqliteSectionRepository::try_new(conn).unwrap(),
    )
    .create_section(owner_id, name)
    .unwrap()
    .id
}

fn article_service(
    conn: &Connection,
) -> ArticleService<SqliteSectionRepository<'_>, SqliteArticleRepository<'_>> {
    ArticleService::new(
        SqliteSectionRepository::try_new(conn).unwrap(),
        SqliteArticleRepository::try_new(conn).unwrap(),
    )
}

fn input(name: &str, quantity: &str, expiration: &str, section_id: SectionId) -> ArticleInput {
    ArticleInput::new(name, quantity, expiration, section_id.to_string())
}

fn date(value: &str) -> Option<NaiveDate> {
    Some(NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap())
}

fn list(
    service: &ArticleService<SqliteSectionRepository<'_>, SqliteArticleRepository<'_>>,
    owner_id: OwnerId,
    section_id: SectionId,
) -> Vec<Article> {
    service
        .get_articles(owner_id, SectionScope::Section(section_id), "")
        .unwrap()
}

#[test]
fn adding_same_article_without_expiration_merges_quantities() {
    let conn = setup();
    let service = article_service(&conn);
    let owner = create_owner(&conn, "mario");
    let fridge = create_section(&conn, owner, "Fridge");

    service
        .add_articles(owner, &[input("egg", "6", "", fridge)])
        .unwrap();
    service
        .add_articles(owner, &[input("egg", "6", "", fridge)])
        .unwrap();

    let articles = list(&service, owner, fridge);
    assert_eq!(articles.len(), 1);
    assert_eq!(articles[0].name, "egg");
    assert_eq!(articles[0].quantity, Some(12.0));
    assert_eq!(articles[0].expiration, None);
}

#[test]
fn collisions_inside_one_batch_merge_too() {
    let conn = setup();
    let service = article_service(&conn);
    let owner = create_owner(&conn, "mario");
    let fridge = create_section(&conn, owner, "Fridge");

    service
        .add_articles(
            owner,
            &[
                input("butter", "1.5", "2024-03-01", fridge),
                input("butter", "2.25", "2024-03-01", fridge),
            ],
        )
        .unwrap();

    let articles = list(&service, owner, fridge);
    assert_eq!(articles.len(), 1);
    assert_eq!(articles[0].quantity, Some(3.75));
    assert_eq!(articles[0].expiration, date("2024-03-01"));
}

#[test]
fn distinct_expirations_never_merge() {
    let conn = setup();
    let service = article_service(&conn);
    let owner = create_owner(&conn, "mario");
    let fridge = create_section(&conn, owner, "Fridge");

    service
        .add_articles(
            owner,
            &[
                input("milk", "1", "2024-05-01", fridge),
                input("milk", "1", "2024-05-08", fridge),
                input("milk", "1", "", fridge),
            ],
        )
        .unwrap();

    let expirations: Vec<_> = list(&service, owner, fridge)
        .into_iter()
        .map(|article| article.expiration)
        .collect();
    assert_eq!(
        expirations,
        vec![date("2024-05-01"), date("2024-05-08"), None]
    );
}

#[test]
fn same_name_in_different_sections_stays_separate() {
    let conn = setup();
    let service = article_service(&conn);
    let owner = create_owner(&conn, "mario");
    let fridge = create_section(&conn, owner, "Fridge");
    let cellar = create_section(&conn, owner, "Cellar");

    service
        .add_articles(
            owner,
            &[input("cheese", "1", "", fridge), input("cheese", "2", "", cellar)],
        )
        .unwrap();

    assert_eq!(list(&service, owner, fridge)[0].quantity, Some(1.0));
    assert_eq!(list(&service, owner, cellar)[0].quantity, Some(2.0));
}

#[test]
fn merge_with_untracked_quantity_stays_untracked() {
    let conn = setup();
    let service = article_service(&conn);
    let owner = create_owner(&conn, "mario");
    let fridge = create_section(&conn, owner, "Fridge");

    service
        .add_articles(
            owner,
            &[input("jam", "2", "", fridge), input("jam", "", "", fridge)],
        )
        .unwrap();
    service
        .add_articles(
            owner,
            &[input("honey", "", "", fridge), input("honey", "3", "", fridge)],
        )
        .unwrap();

    let articles = list(&service, owner, fridge);
    assert_eq!(articles.len(), 2);
    assert!(articles.iter().all(|article| article.quantity.is_none()));
}

#[test]
fn batch_with_invalid_input_writes_nothing() {
    let conn = setup();
    let service = article_service(&conn);
    let owner = create_owner(&conn, "mario");
    let fridge = create_section(&conn, owner, "Fridge");

    let err = service
        .add_articles(
            owner,
            &[
                input("milk", "1", "", fridge),
                input("eggs", "a dozen", "", fridge),
            ],
        )
        .unwrap_err();
    assert_eq!(err, PantryError::InvalidQuantity);

    let err = service
        .add_articles(
            owner,
            &[
                input("milk", "1", "", fridge),
                input("eggs", "12", "2024-13-45", fridge),
            ],
        )
        .unwrap_err();
    assert_eq!(err, PantryError::InvalidExpiration);

    assert!(list(&service, owner, fridge).is_empty());
}

#[test]
fn batch_targeting_foreign_section_writes_nothing() {
    let conn = setup();
    let service = article_service(&conn);
    let owner = create_owner(&conn, "mario");
    let other = create_owner(&conn, "luigi");
    let fridge = create_section(&conn, owner, "Fridge");
    let foreign = create_section(&conn, other, "Cellar");

    let err = service
        .add_articles(
            owner,
            &[input("milk", "1", "", fridge), input("wine", "1", "", foreign)],
        )
        .unwrap_err();
    assert_eq!(err, PantryError::SectionNotFound);
    assert!(list(&service, owner, fridge).is_empty());
    assert!(list(&service, other, foreign).is_empty());
}

#[test]
fn unusable_section_reference_is_section_not_found() {
    let conn = setup();
    let service = article_service(&conn);
    let owner = create_owner(&conn, "mario");

    for section in ["", "fridge", "-3", "0"] {
        let err = service
            .add_articles(owner, &[ArticleInput::new("milk", "1", "", section)])
            .unwrap_err();
        assert_eq!(err, PantryError::SectionNotFound, "section `{section}`");
    }
}

#[test]
fn empty_batch_is_a_noop() {
    let conn = setup();
    let service = article_service(&conn);
    let owner = create_owner(&conn, "mario");

    service.add_articles(owner, &[]).unwrap();
}

#[test]
fn get_article_is_opaque_across_owners() {
    let conn = setup();
    let service = article_service(&conn);
    let owner = create_owner(&conn, "mario");
    let other = create_owner(&conn, "luigi");
    let fridge = create_section(&conn, owner, "Fridge");

    service
        .add_articles(owner, &[input("milk", "1", "2024-05-01", fridge)])
        .unwrap();
    let milk = list(&service, owner, fridge).remove(0);

    assert_eq!(service.get_article(owner, milk.id).unwrap(), milk);
    let foreign = service.get_article(other, milk.id).unwrap_err();
    let missing = service.get_article(owner, milk.id + 100).unwrap_err();
    assert_eq!(foreign, PantryError::ArticleNotFound);
    assert_eq!(foreign, missing);
}

#[test]
fn get_articles_checks_section_scope() {
    let conn = setup();
    let service = article_service(&conn);
    let owner = create_owner(&conn, "mario");
    let other = create_owner(&conn, "luigi");
    let fridge = create_section(&conn, owner, "Fridge");
    let foreign = create_section(&conn, other, "Cellar");

    assert!(list(&service, owner, fridge).is_empty());
    assert_eq!(
        service
            .get_articles(owner, SectionScope::Section(foreign), "")
            .unwrap_err(),
        PantryError::SectionNotFound
    );
    assert!(service
        .get_articles(owner, SectionScope::All, "")
        .unwrap()
        .is_empty());
}

#[test]
fn get_articles_all_spans_only_own_sections() {
    let conn = setup();
    let service = article_service(&conn);
    let owner = create_owner(&conn, "mario");
    let other = create_owner(&conn, "luigi");
    let fridge = create_section(&conn, owner, "Fridge");
    let freezer = create_section(&conn, owner, "Freezer");
    let foreign = create_section(&conn, other, "Cellar");

    service
        .add_articles(
            owner,
            &[
                input("peas", "1", "2025-01-01", freezer),
                input("milk", "1", "2024-05-01", fridge),
            ],
        )
        .unwrap();
    service
        .add_articles(other, &[input("wine", "1", "2023-01-01", foreign)])
        .unwrap();

    let names: Vec<_> = service
        .get_articles(owner, SectionScope::All, "")
        .unwrap()
        .into_iter()
        .map(|article| article.name)
        .collect();
    assert_eq!(names, vec!["milk", "peas"]);
}

#[test]
fn name_filter_is_case_insensitive_substring() {
    let conn = setup();
    let service = article_service(&conn);
    let owner = create_owner(&conn, "mario");
    let fridge = create_section(&conn, owner, "Fridge");

    service
        .add_articles(
            owner,
            &[
                input("milk", "1", "", fridge),
                input("Oat Milk", "1", "", fridge),
                input("butter", "1", "", fridge),
            ],
        )
        .unwrap();

    let names: Vec<_> = service
        .get_articles(owner, SectionScope::Section(fridge), "MiLk")
        .unwrap()
        .into_iter()
        .map(|article| article.name)
        .collect();
    assert_eq!(names, vec!["milk", "Oat Milk"]);

    assert!(service
        .get_articles(owner, SectionScope::All, "cheese")
        .unwrap()
        .is_empty());
}

#[test]
fn edit_with_identical_values_is_a_noop() {
    let conn = setup();
    let service = article_service(&conn);
    let owner = create_owner(&conn, "mario");
    let fridge = create_section(&conn, owner, "Fridge");

    service
        .add_articles(owner, &[input("milk", "2", "2024-05-01", fridge)])
        .unwrap();
    let milk = list(&service, owner, fridge).remove(0);

    service
        .edit_article(owner, milk.id, &input("milk", "2", "2024-05-01", fridge))
        .unwrap();
    assert_eq!(service.get_article(owner, milk.id).unwrap(), milk);
}

#[test]
fn edit_replaces_fields_and_can_clear_optional_values() {
    let conn = setup();
    let service = article_service(&conn);
    let owner = create_owner(&conn, "mario");
    let fridge = create_section(&conn, owner, "Fridge");

    service
        .add_articles(owner, &[input("milk", "2", "2024-05-01", fridge)])
        .unwrap();
    let milk = list(&service, owner, fridge).remove(0);

    service
        .edit_article(owner, milk.id, &input("whole milk", "", "", fridge))
        .unwrap();
    let edited = service.get_article(owner, milk.id).unwrap();
    assert_eq!(edited.id, milk.id);
    assert_eq!(edited.name, "whole milk");
    assert_eq!(edited.quantity, None);
    assert_eq!(edited.expiration, None);
}

#[test]
fn edit_moves_article_between_owned_sections() {
    let conn = setup();
    let service = article_service(&conn);
    let owner = create_owner(&conn, "mario");
    let fridge = create_section(&conn, owner, "Fridge");
    let freezer = create_section(&conn, owner, "Freezer");

    service
        .add_articles(owner, &[input("peas", "1", "", fridge)])
        .unwrap();
    let peas = list(&service, owner, fridge).remove(0);

    service
        .edit_article(owner, peas.id, &input("peas", "1", "", freezer))
        .unwrap();

    assert!(list(&service, owner, fridge).is_empty());
    let moved = list(&service, owner, freezer);
    assert_eq!(moved.len(), 1);
    assert_eq!(moved[0].id, peas.id);
    assert_eq!(moved[0].section_id, freezer);
}

#[test]
fn edit_rejects_key_used_by_another_article() {
    let conn = setup();
    let service = article_service(&conn);
    let owner = create_owner(&conn, "mario");
    let fridge = create_section(&conn, owner, "Fridge");
    let freezer = create_section(&conn, owner, "Freezer");

    service
        .add_articles(
            owner,
            &[
                input("milk", "1", "2024-05-01", fridge),
                input("milk", "1", "2024-05-08", fridge),
                input("milk", "1", "2024-05-01", freezer),
            ],
        )
        .unwrap();
    let fridge_milk = list(&service, owner, fridge);

    assert_eq!(
        service
            .edit_article(
                owner,
                fridge_milk[1].id,
                &input("milk", "1", "2024-05-01", fridge)
            )
            .unwrap_err(),
        PantryError::ArticleDuplicated
    );
    assert_eq!(
        service
            .edit_article(
                owner,
                fridge_milk[0].id,
                &input("milk", "1", "2024-05-01", freezer)
            )
            .unwrap_err(),
        PantryError::ArticleDuplicated
    );
    assert_eq!(list(&service, owner, fridge), fridge_milk);
}

#[test]
fn edit_rejects_bad_input_and_unowned_targets() {
    let conn = setup();
    let service = article_service(&conn);
    let owner = create_owner(&conn, "mario");
    let other = create_owner(&conn, "luigi");
    let fridge = create_section(&conn, owner, "Fridge");
    let foreign = create_section(&conn, other, "Cellar");

    service
        .add_articles(owner, &[input("milk", "1", "", fridge)])
        .unwrap();
    let milk = list(&service, owner, fridge).remove(0);

    assert_eq!(
        service
            .edit_article(owner, milk.id, &input("milk", "-2", "", fridge))
            .unwrap_err(),
        PantryError::InvalidQuantity
    );
    assert_eq!(
        service
            .edit_article(owner, milk.id, &input("milk", "1", "05/01/2024", fridge))
            .unwrap_err(),
        PantryError::InvalidExpiration
    );
    assert_eq!(
        service
            .edit_article(owner, milk.id, &input("milk", "1", "", foreign))
            .unwrap_err(),
        PantryError::SectionNotFound
    );
    assert_eq!(
        service
            .edit_article(owner, milk.id, &ArticleInput::new("milk", "1", "", "fridge"))
            .unwrap_err(),
        PantryError::SectionNotFound
    );
    assert_eq!(
        service
            .edit_article(other, milk.id, &input("mine", "1", "", foreign))
            .unwrap_err(),
        PantryError::ArticleNotFound
    );
    assert_eq!(service.get_article(owner, milk.id).unwrap(), milk);
}

#[test]
fn edit_without_section_keeps_current_section() {
    let conn = setup();
    let service = article_service(&conn);
    let owner = create_owner(&conn, "mario");
    let fridge = create_section(&conn, owner, "Fridge");

    service
        .add_articles(owner, &[input("milk", "1", "", fridge)])
        .unwrap();
    let milk = list(&service, owner, fridge).remove(0);

    service
        .edit_article(owner, milk.id, &ArticleInput::new("milk", "1", "", ""))
        .unwrap();
    assert_eq!(service.get_article(owner, milk.id).unwrap(), milk);

    service
        .edit_article(owner, milk.id, &ArticleInput::new("milk", "3", "", ""))
        .unwrap();
    let edited = service.get_article(owner, milk.id).unwrap();
    assert_eq!(edited.section_id, fridge);
    assert_eq!(edited.quantity, Some(3.0));

    service
        .edit_article(
            owner,
            milk.id,
            &ArticleInput::new("milk", "3", "2024-05-01", ""),
        )
        .unwrap();
    let edited = service.get_article(owner, milk.id).unwrap();
    assert_eq!(edited.section_id, fridge);
    assert_eq!(edited.expiration, date("2024-05-01"));
}

#[test]
fn edit_without_section_still_detects_duplicates() {
    let conn = setup();
    let service = article_service(&conn);
    let owner = create_owner(&conn, "mario");
    let fridge = create_section(&conn, owner, "Fridge");

    service
        .add_articles(
            owner,
            &[input("milk", "1", "", fridge), input("cream", "1", "", fridge)],
        )
        .unwrap();
    let cream = list(&service, owner, fridge)
        .into_iter()
        .find(|article| article.name == "cream")
        .unwrap();

    assert_eq!(
        service
            .edit_article(owner, cream.id, &ArticleInput::new("milk", "1", "", ""))
            .unwrap_err(),
        PantryError::ArticleDuplicated
    );
}

#[test]
fn delete_article_rejects_foreign_and_missing_articles() {
    let conn = setup();
    let service = article_service(&conn);
    let owner = create_owner(&conn, "mario");
    let other = create_owner(&conn, "luigi");
    let fridge = create_section(&conn, owner, "Fridge");

    service
        .add_articles(owner, &[input("milk", "1", "", fridge)])
        .unwrap();
    let milk = list(&service, owner, fridge).remove(0);

    assert_eq!(
        service.delete_article(other, milk.id).unwrap_err(),
        PantryError::ArticleNotFound
    );
    assert_eq!(service.delete_article(owner, milk.id).unwrap(), None);
    assert_eq!(
        service.delete_article(owner, milk.id).unwrap_err(),
        PantryError::ArticleNotFound
    );
}

#[test]
fn article_serializes_absent_values_as_null() {
    let conn = setup();
    let service = article_service(&conn);
    let owner = create_owner(&conn, "mario");
    let fridge = create_section(&conn, owner, "Fridge");

    service
        .add_articles(
            owner,
            &[
                input("salt", "", "", fridge),
                input("milk", "1", "2024-05-01", fridge),
            ],
        )
        .unwrap();
    let articles = list(&service, owner, fridge);

    let milk = serde_json::to_value(&articles[0]).unwrap();
    assert_eq!(milk["name"], "milk");
    assert_eq!(milk["expiration"], "2024-05-01");
    assert_eq!(milk["quantity"], 1.0);

    let salt = serde_json::to_value(&articles[1]).unwrap();
    assert_eq!(salt["expiration"], serde_json::Value::Null);
    assert_eq!(salt["quantity"], serde_json::Value::Null);
}

#[test]
fn merges_from_separate_connections_accumulate() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pantry.sqlite3");

    let first = open_db(&path).unwrap();
    let second = open_db(&path).unwrap();
    let owner = create_owner(&first, "mario");
    let fridge = create_section(&first, owner, "Fridge");

    article_service(&first)
        .add_articles(owner, &[input("egg", "6", "", fridge)])
        .unwrap();
    article_service(&second)
        .add_articles(owner, &[input("egg", "4", "", fridge)])
        .unwrap();

    let articles = list(&article_service(&first), owner, fridge);
    assert_eq!(articles.len(), 1);
    assert_eq!(articles[0].quantity, Some(10.0));
}
