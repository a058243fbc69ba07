use kotoba_core::model::{LessonDraft, UserId};
use kotoba_core::quiz::{Direction, Progress, SessionConfig};
use kotoba_core::time::fixed_now;
use services::{AppServices, Clock, parse_csv};
use storage::repository::WordRepository;

#[tokio::test]
async fn imported_lesson_can_be_studied_end_to_end() {
    let app = AppServices::in_memory(Clock::fixed(fixed_now()));
    let owner = UserId::random();

    let lesson = app
        .lessons()
        .create_lesson(owner, LessonDraft::titled("Дієслова 1"))
        .await
        .unwrap();

    let csv = "Japanese,Ukrainian\nあいます,зустрічатися\nあそびます,розважатися\nあらいます,мити\n";
    let report = app
        .import()
        .import_words("дієслова 1", parse_csv(csv), None)
        .await
        .unwrap();
    assert_eq!(report.lesson_id, lesson.id());
    assert_eq!(report.added, 3);

    let overview = app.lessons().list_lessons(owner).await.unwrap();
    assert_eq!(overview[0].word_count, 3);

    let mut session = app
        .study()
        .start_session(
            owner,
            lesson.id(),
            SessionConfig::new(Direction::JapaneseFirst, false),
        )
        .await
        .unwrap();

    let answers = [true, false, true];
    let mut summary = None;
    for correct in answers {
        if let Progress::Complete(done) = session.record_outcome(correct, fixed_now()).unwrap() {
            summary = Some(done);
        }
    }
    let summary = summary.expect("complete after three answers");
    assert_eq!(summary.correct(), 2);
    assert_eq!(summary.incorrect(), 1);
    assert_eq!(summary.accuracy_percent(), 67);

    let again = session.repeat_incorrect(fixed_now()).unwrap();
    assert_eq!(again.total_cards(), 1);
    assert_eq!(again.deck()[0].japanese(), "あそびます");
}

#[tokio::test]
async fn deleting_a_lesson_removes_it_from_study() {
    let app = AppServices::in_memory(Clock::fixed(fixed_now()));
    let owner = UserId::random();
    let lesson = app
        .lessons()
        .create_lesson(owner, LessonDraft::titled("Тимчасовий"))
        .await
        .unwrap();
    app.import()
        .add_words("Тимчасовий", vec![services::parse_pair("水 - вода").unwrap()])
        .await
        .unwrap();

    app.lessons().delete_lesson(owner, lesson.id()).await.unwrap();
    assert_eq!(app.storage().words.count_words(lesson.id()).await.unwrap(), 0);
    assert!(matches!(
        app.study().load_deck(owner, lesson.id()).await,
        Err(services::StudyError::LessonNotFound(_))
    ));
}
