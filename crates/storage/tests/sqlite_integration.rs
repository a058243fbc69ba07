use chrono::Duration;
use kotoba_core::model::{
    AppSetting, Language, LessonDraft, LessonId, UserId, WordDraft, WordId, WordPair,
};
use kotoba_core::time::fixed_now;
use storage::repository::{
    AppSettingsRepository, LessonRepository, NewLessonRecord, NewWordRecord, StorageError,
    WordRepository,
};
use storage::sqlite::SqliteRepository;

async fn connect(name: &str) -> SqliteRepository {
    let repo = SqliteRepository::connect(&format!("sqlite:file:{name}?mode=memory&cache=shared"))
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

fn lesson(owner: UserId, title: &str, minutes: i64) -> NewLessonRecord {
    let lesson = LessonDraft::titled(title)
        .with_description("опис")
        .validate(LessonId::new(0), owner, fixed_now() + Duration::minutes(minutes))
        .unwrap();
    NewLessonRecord::from_lesson(&lesson)
}

fn word(lesson_id: LessonId, draft: WordDraft, minutes: i64) -> NewWordRecord {
    let word = draft
        .validate(WordId::new(0), lesson_id, fixed_now() + Duration::minutes(minutes))
        .unwrap();
    NewWordRecord::from_word(&word)
}

#[tokio::test]
async fn sqlite_lesson_roundtrip_and_update() {
    let repo = connect("memdb_lessons").await;
    let owner = UserId::random();

    let first = repo.insert_new_lesson(lesson(owner, "Числа", 0)).await.unwrap();
    let second = repo
        .insert_new_lesson(lesson(owner, "Привітання", 3))
        .await
        .unwrap();

    let fetched = repo.get_lesson(owner, first).await.unwrap().expect("lesson");
    assert_eq!(fetched.title(), "Числа");
    assert_eq!(fetched.description(), "опис");
    assert_eq!(fetched.language_from(), Language::Japanese);
    assert_eq!(fetched.owner(), owner);

    let listed = repo.list_lessons(owner).await.unwrap();
    assert_eq!(listed.iter().map(|l| l.id()).collect::<Vec<_>>(), vec![second, first]);

    let later = fixed_now() + Duration::hours(1);
    let edited = fetched
        .apply(LessonDraft::titled("Числа 1-10"), later)
        .unwrap();
    repo.update_lesson(&edited).await.unwrap();
    let reloaded = repo.get_lesson(owner, first).await.unwrap().unwrap();
    assert_eq!(reloaded.title(), "Числа 1-10");
    assert_eq!(reloaded.updated_at(), later);
    assert_eq!(reloaded.created_at(), fixed_now());

    let stranger = UserId::random();
    assert!(repo.get_lesson(stranger, first).await.unwrap().is_none());
    assert!(repo.list_lessons(stranger).await.unwrap().is_empty());
}

#[tokio::test]
async fn sqlite_words_are_ordered_and_cascade() {
    let repo = connect("memdb_words").await;
    let owner = UserId::random();
    let lesson_id = repo.insert_new_lesson(lesson(owner, "Їжа", 0)).await.unwrap();

    let rice = repo
        .insert_new_word(word(
            lesson_id,
            WordDraft::pair("ご飯", "рис").with_furigana("ごはん"),
            5,
        ))
        .await
        .unwrap();
    let water = repo
        .insert_new_word(word(lesson_id, WordDraft::pair("水", "вода"), 1))
        .await
        .unwrap();

    let words = repo.list_words(lesson_id).await.unwrap();
    assert_eq!(words.iter().map(WordPair::id).collect::<Vec<_>>(), vec![water, rice]);
    assert_eq!(words[1].furigana(), Some("ごはん"));
    assert_eq!(repo.count_words(lesson_id).await.unwrap(), 2);

    assert!(repo.delete_word(lesson_id, water).await.unwrap());
    assert!(!repo.delete_word(lesson_id, water).await.unwrap());

    assert!(!repo.delete_lesson(UserId::random(), lesson_id).await.unwrap());
    assert!(repo.delete_lesson(owner, lesson_id).await.unwrap());
    assert_eq!(repo.count_words(lesson_id).await.unwrap(), 0);
    assert!(repo.get_word(lesson_id, rice).await.unwrap().is_none());
}

#[tokio::test]
async fn sqlite_word_update_and_missing_lesson() {
    let repo = connect("memdb_word_update").await;
    let owner = UserId::random();
    let lesson_id = repo.insert_new_lesson(lesson(owner, "Кольори", 0)).await.unwrap();
    let id = repo
        .insert_new_word(word(lesson_id, WordDraft::pair("赤", "червоний"), 0))
        .await
        .unwrap();

    let stored = repo.get_word(lesson_id, id).await.unwrap().unwrap();
    let edited = stored
        .apply(
            WordDraft::pair("赤い", "червоний").with_pronunciation("akai"),
            fixed_now() + Duration::minutes(2),
        )
        .unwrap();
    repo.update_word(&edited).await.unwrap();

    let reloaded = repo.get_word(lesson_id, id).await.unwrap().unwrap();
    assert_eq!(reloaded.japanese(), "赤い");
    assert_eq!(reloaded.pronunciation(), Some("akai"));

    let err = repo
        .insert_new_word(word(LessonId::new(404), WordDraft::pair("青", "синій"), 0))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::NotFound));
}

#[tokio::test]
async fn sqlite_title_lookup_folds_cyrillic_case() {
    let repo = connect("memdb_titles").await;
    assert!(repo.any_lesson_owner().await.unwrap().is_none());

    let owner = UserId::random();
    let id = repo
        .insert_new_lesson(lesson(owner, "Привітання", 0))
        .await
        .unwrap();

    let found = repo.find_lesson_by_title("  привітання ").await.unwrap();
    assert_eq!(found.map(|l| l.id()), Some(id));
    assert_eq!(repo.any_lesson_owner().await.unwrap(), Some(owner));
}

#[tokio::test]
async fn sqlite_flags_and_admins() {
    let repo = connect("memdb_flags").await;
    let admin = UserId::random();

    repo.insert_flag(&AppSetting::new("registration_open", true).unwrap())
        .await
        .unwrap();
    repo.insert_flag(&AppSetting::new("maintenance", false).unwrap())
        .await
        .unwrap();

    let flags = repo.list_flags().await.unwrap();
    let keys: Vec<&str> = flags.iter().map(|f| f.key.as_str()).collect();
    assert_eq!(keys, vec!["maintenance", "registration_open"]);

    let updated = repo
        .update_flag("maintenance", true, admin, fixed_now())
        .await
        .unwrap()
        .expect("known key");
    assert!(updated.value);
    assert_eq!(updated.updated_by, Some(admin));
    assert_eq!(updated.updated_at, Some(fixed_now()));
    assert!(
        repo.update_flag("unknown", true, admin, fixed_now())
            .await
            .unwrap()
            .is_none()
    );

    assert!(!repo.is_admin(admin).await.unwrap());
    repo.grant_admin(admin).await.unwrap();
    repo.grant_admin(admin).await.unwrap();
    assert!(repo.is_admin(admin).await.unwrap());
}

#[tokio::test]
async fn sqlite_ids_past_i64_read_as_missing() {
    let repo = connect("memdb_huge_ids").await;
    let owner = UserId::random();
    let huge = LessonId::new(u64::MAX);
    let huge_word = WordId::new(u64::MAX);
    let real = repo.insert_new_lesson(lesson(owner, "Кольори", 0)).await.unwrap();

    assert!(repo.get_lesson(owner, huge).await.unwrap().is_none());
    assert!(!repo.delete_lesson(owner, huge).await.unwrap());
    assert!(repo.list_words(huge).await.unwrap().is_empty());
    assert_eq!(repo.count_words(huge).await.unwrap(), 0);
    assert!(repo.get_word(real, huge_word).await.unwrap().is_none());
    assert!(!repo.delete_word(real, huge_word).await.unwrap());

    let err = repo
        .insert_new_word(word(huge, WordDraft::pair("白", "білий"), 0))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::NotFound));

    let phantom = LessonDraft::titled("Кольори")
        .validate(huge, owner, fixed_now())
        .unwrap();
    let err = repo.update_lesson(&phantom).await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound));
}
