use chrono::Utc;
use uuid::Uuid;

use learnhub_domain::lecture::{DEFAULT_LECTURE_CONTENT, LectureKind};
use learnhub_marketplace::domain::types::{Lecture, ResourceType};
use learnhub_marketplace::error::MarketplaceError;
use learnhub_marketplace::usecase::lecture::{
    CreateLectureInput, CreateLectureUseCase, UpdateLectureInput, UpdateLectureUseCase,
};

use crate::helpers::{MockLectureRepo, MockMedia, MockSectionRepo, staged_file, test_section};

#[tokio::test]
async fn should_default_content_when_no_files() {
    let section = test_section(Uuid::now_v7());
    let uc = CreateLectureUseCase {
        lectures: MockLectureRepo::default(),
        sections: MockSectionRepo::new(vec![section.clone()]),
        media: MockMedia::default(),
    };

    let lecture = uc
        .execute(CreateLectureInput {
            title: Some("Intro".into()),
            section_id: Some(section.id.to_string()),
            content: vec![],
        })
        .await
        .unwrap();

    assert_eq!(lecture.content, vec![DEFAULT_LECTURE_CONTENT.to_owned()]);
    assert_eq!(lecture.kind, LectureKind::Text);
}

#[tokio::test]
async fn should_infer_kind_from_last_classified_file() {
    let section = test_section(Uuid::now_v7());
    let media = MockMedia::default();
    let uc = CreateLectureUseCase {
        lectures: MockLectureRepo::default(),
        sections: MockSectionRepo::new(vec![section.clone()]),
        media: media.clone(),
    };

    let lecture = uc
        .execute(CreateLectureInput {
            title: Some("Slides and recording".into()),
            section_id: Some(section.id.to_string()),
            content: vec![
                staged_file("slides.pdf", "application/pdf"),
                staged_file("talk.mp4", "video/mp4"),
                staged_file("notes.txt", "text/plain"),
            ],
        })
        .await
        .unwrap();

    assert_eq!(lecture.kind, LectureKind::Video);
    assert_eq!(
        lecture.content,
        vec![
            "https://media.test/lms-content/slides.pdf".to_owned(),
            "https://media.test/lms-content/talk.mp4".to_owned(),
            "https://media.test/lms-content/notes.txt".to_owned(),
        ]
    );
    let resource_types: Vec<_> = media.recorded().into_iter().map(|u| u.2).collect();
    assert_eq!(
        resource_types,
        vec![ResourceType::Auto, ResourceType::Video, ResourceType::Auto]
    );
}

#[tokio::test]
async fn should_reject_unknown_section_on_create() {
    let uc = CreateLectureUseCase {
        lectures: MockLectureRepo::default(),
        sections: MockSectionRepo::default(),
        media: MockMedia::default(),
    };

    let result = uc
        .execute(CreateLectureInput {
            title: Some("Orphan".into()),
            section_id: Some(Uuid::now_v7().to_string()),
            content: vec![],
        })
        .await;

    assert!(
        matches!(result, Err(MarketplaceError::SectionNotFound)),
        "expected SectionNotFound, got {result:?}"
    );
}

#[tokio::test]
async fn should_keep_content_and_kind_when_updating_without_files() {
    let section = test_section(Uuid::now_v7());
    let now = Utc::now();
    let lecture = Lecture {
        id: Uuid::now_v7(),
        title: "Recording".into(),
        content: vec!["https://media.test/lms-content/a.mp4".into()],
        kind: LectureKind::Video,
        section_id: section.id,
        created_at: now,
        updated_at: now,
    };
    let lectures = MockLectureRepo::default();
    lectures.lectures.lock().unwrap().push(lecture.clone());
    let uc = UpdateLectureUseCase {
        lectures,
        sections: MockSectionRepo::new(vec![section]),
        media: MockMedia::default(),
    };

    let updated = uc
        .execute(
            lecture.id,
            UpdateLectureInput {
                title: Some("Recording, revised".into()),
                section_id: None,
                content: vec![],
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.title, "Recording, revised");
    assert_eq!(updated.content, lecture.content);
    assert_eq!(updated.kind, LectureKind::Video);
}

#[tokio::test]
async fn should_keep_previous_kind_when_new_files_are_unclassified() {
    let section = test_section(Uuid::now_v7());
    let now = Utc::now();
    let lecture = Lecture {
        id: Uuid::now_v7(),
        title: "Handout".into(),
        content: vec!["https://media.test/lms-content/h.pdf".into()],
        kind: LectureKind::Pdf,
        section_id: section.id,
        created_at: now,
        updated_at: now,
    };
    let lectures = MockLectureRepo::default();
    lectures.lectures.lock().unwrap().push(lecture.clone());
    let uc = UpdateLectureUseCase {
        lectures,
        sections: MockSectionRepo::new(vec![section]),
        media: MockMedia::default(),
    };

    let updated = uc
        .execute(
            lecture.id,
            UpdateLectureInput {
                title: None,
                section_id: None,
                content: vec![staged_file("data.csv", "text/csv")],
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.kind, LectureKind::Pdf);
    assert_eq!(
        updated.content,
        vec!["https://media.test/lms-content/data.csv".to_owned()]
    );
}
