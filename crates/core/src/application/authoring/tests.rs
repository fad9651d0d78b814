//! Unit tests for authoring validation and use cases

use super::*;
use crate::domain::LessonStatus;
use crate::port::id_provider::mocks::SequentialIdProvider;
use crate::port::lesson_repository::mocks::InMemoryLessonRepository;
use crate::port::program_repository::mocks::InMemoryProgramRepository;
use crate::port::time_provider::mocks::FixedTimeProvider;

fn program_request() -> CreateProgramRequest {
    CreateProgramRequest {
        title: "Spanish A1".to_string(),
        description: Some("Beginner Spanish".to_string()),
        language_primary: "en".to_string(),
        languages_available: vec!["en".to_string(), "es".to_string()],
    }
}

fn lesson_request(term_id: &str, number: i32) -> AddLessonRequest {
    AddLessonRequest {
        term_id: term_id.to_string(),
        lesson_number: number,
        title: format!("Lesson {}", number),
        content_kind: "video".to_string(),
        duration_ms: Some(540_000),
        is_paid: false,
        language_primary: "en".to_string(),
        languages_available: vec!["en".to_string()],
        content_urls: [("en".to_string(), "https://cdn.example/l1-en.mp4".to_string())]
            .into_iter()
            .collect(),
        subtitle_languages: vec![],
        subtitle_urls: BTreeMap::new(),
    }
}

#[tokio::test]
async fn test_create_program_rejects_empty_title() {
    let programs = InMemoryProgramRepository::new();
    let ids = SequentialIdProvider::new();
    let clock = FixedTimeProvider::new(1000);

    let mut req = program_request();
    req.title = "   ".to_string();

    let result = create_program(&programs, &ids, &clock, req).await;
    assert!(result.unwrap_err().to_string().contains("empty"));
}

#[tokio::test]
async fn test_create_program_rejects_primary_not_available() {
    let programs = InMemoryProgramRepository::new();
    let ids = SequentialIdProvider::new();
    let clock = FixedTimeProvider::new(1000);

    let mut req = program_request();
    req.language_primary = "fr".to_string();

    let result = create_program(&programs, &ids, &clock, req).await;
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("must be among available languages"));
}

#[tokio::test]
async fn test_create_program_persists_draft() {
    let programs = InMemoryProgramRepository::new();
    let ids = SequentialIdProvider::new();
    let clock = FixedTimeProvider::new(1000);

    let program_id = create_program(&programs, &ids, &clock, program_request())
        .await
        .unwrap();

    let program = programs.find_by_id(&program_id).await.unwrap().unwrap();
    assert_eq!(program.status, crate::domain::ProgramStatus::Draft);
    assert_eq!(program.created_at, 1000);
    assert_eq!(program.description.as_deref(), Some("Beginner Spanish"));
}

#[tokio::test]
async fn test_add_term_unknown_program() {
    let programs = InMemoryProgramRepository::new();
    let ids = SequentialIdProvider::new();
    let clock = FixedTimeProvider::new(1000);

    let result = add_term(
        &programs,
        &ids,
        &clock,
        AddTermRequest {
            program_id: "missing".to_string(),
            term_number: 1,
            title: "Term 1".to_string(),
        },
    )
    .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_add_term_duplicate_number_conflicts() {
    let programs = InMemoryProgramRepository::new();
    let ids = SequentialIdProvider::new();
    let clock = FixedTimeProvider::new(1000);

    let program_id = create_program(&programs, &ids, &clock, program_request())
        .await
        .unwrap();

    let req = AddTermRequest {
        program_id: program_id.clone(),
        term_number: 1,
        title: "Term 1".to_string(),
    };
    add_term(&programs, &ids, &clock, req.clone()).await.unwrap();

    let result = add_term(&programs, &ids, &clock, req).await;
    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn test_add_lesson_requires_url_per_language() {
    let lessons = InMemoryLessonRepository::new();
    let programs = InMemoryProgramRepository::new();
    let ids = SequentialIdProvider::new();
    let clock = FixedTimeProvider::new(1000);

    let mut req = lesson_request("term-1", 1);
    req.languages_available.push("es".to_string());

    let result = add_lesson(&lessons, &programs, &ids, &clock, req).await;
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("Missing content URL for language es"));
}

#[tokio::test]
async fn test_add_lesson_rejects_nonpositive_number() {
    let lessons = InMemoryLessonRepository::new();
    let programs = InMemoryProgramRepository::new();
    let ids = SequentialIdProvider::new();
    let clock = FixedTimeProvider::new(1000);

    let req = lesson_request("term-1", 0);
    let result = add_lesson(&lessons, &programs, &ids, &clock, req).await;
    assert!(result.unwrap_err().to_string().contains("positive"));
}

#[tokio::test]
async fn test_add_then_schedule_lesson() {
    let lessons = InMemoryLessonRepository::new();
    let programs = InMemoryProgramRepository::new();
    let ids = SequentialIdProvider::new();
    let clock = FixedTimeProvider::new(1000);

    let program_id = create_program(&programs, &ids, &clock, program_request())
        .await
        .unwrap();
    let term_id = add_term(
        &programs,
        &ids,
        &clock,
        AddTermRequest {
            program_id,
            term_number: 1,
            title: "Term 1".to_string(),
        },
    )
    .await
    .unwrap();

    let lesson_id = add_lesson(&lessons, &programs, &ids, &clock, lesson_request(&term_id, 1))
        .await
        .unwrap();

    schedule_lesson(&lessons, &clock, &lesson_id, 99_000)
        .await
        .unwrap();

    let lesson = lessons.find_by_id(&lesson_id).await.unwrap().unwrap();
    assert_eq!(lesson.status, LessonStatus::Scheduled);
    assert_eq!(lesson.schedule_at, Some(99_000));
}

#[tokio::test]
async fn test_schedule_published_lesson_rejected() {
    let lessons = InMemoryLessonRepository::new();
    let clock = FixedTimeProvider::new(1000);

    let mut lesson = crate::domain::Lesson::new_test("term-1", 1);
    lesson.schedule(500, 500).unwrap();
    lesson.publish(800).unwrap();
    let id = lesson.id.clone();
    lessons.insert(&lesson).await.unwrap();

    let result = schedule_lesson(&lessons, &clock, &id, 99_000).await;
    assert!(matches!(result, Err(AppError::Domain(_))));
}

#[tokio::test]
async fn test_revert_scheduled_lesson_to_draft() {
    let lessons = InMemoryLessonRepository::new();
    let clock = FixedTimeProvider::new(1000);

    let mut lesson = crate::domain::Lesson::new_test("term-1", 1);
    lesson.schedule(5000, 500).unwrap();
    let id = lesson.id.clone();
    lessons.insert(&lesson).await.unwrap();

    revert_lesson_to_draft(&lessons, &clock, &id).await.unwrap();

    let lesson = lessons.find_by_id(&id).await.unwrap().unwrap();
    assert_eq!(lesson.status, LessonStatus::Draft);
    assert_eq!(lesson.schedule_at, None);
}

#[tokio::test]
async fn test_publish_program_manual() {
    let programs = InMemoryProgramRepository::new();
    let ids = SequentialIdProvider::new();
    let clock = FixedTimeProvider::new(1000);

    let program_id = create_program(&programs, &ids, &clock, program_request())
        .await
        .unwrap();

    clock.advance(500);
    publish_program(&programs, &clock, &program_id).await.unwrap();

    let program = programs.find_by_id(&program_id).await.unwrap().unwrap();
    assert_eq!(program.status, crate::domain::ProgramStatus::Published);
    assert_eq!(program.published_at, Some(1500));
}
