use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use edureport::api::{router, AppState};
use edureport::{import_snapshot, Database, PerformanceEngine, Settings, Snapshot};

const SNAPSHOT: &str = r#"{
    "courses": [{"id": 1, "name": "Algebra"}, {"id": 2, "name": "Biology"}],
    "teachers": [{"id": 1, "name": "Ms. Tran"}, {"id": 2, "name": "Mr. Okafor"}],
    "students": [
        {"id": 1, "name": "Ana"}, {"id": 2, "name": "Ben"},
        {"id": 3, "name": "Chi"}, {"id": 4, "name": "Dev"}
    ],
    "classes": [
        {"id": 1, "name": "ALG-A", "course_id": 1, "teacher_id": 1, "start_date": "2025-03-01"},
        {"id": 2, "name": "BIO-A", "course_id": 2, "teacher_id": 2},
        {"id": 3, "name": "ALG-B", "course_id": 1, "teacher_id": 2, "start_date": "2025-03-10"},
        {"id": 4, "name": "ALG-C", "course_id": 1, "start_date": "2024-11-04"}
    ],
    "enrollments": [
        {"id": 1, "class_id": 1, "student_id": 1},
        {"id": 2, "class_id": 1, "student_id": 2},
        {"id": 3, "class_id": 1, "student_id": 3},
        {"id": 4, "class_id": 2, "student_id": 4},
        {"id": 5, "class_id": 3, "student_id": 4}
    ],
    "sessions": [
        {"id": 1, "class_id": 1, "date": "2025-03-03"},
        {"id": 2, "class_id": 1, "date": "2025-03-05"},
        {"id": 3, "class_id": 2, "date": "2025-03-04"}
    ],
    "attendance": [
        {"session_id": 1, "student_id": 1, "status": "PRESENT"},
        {"session_id": 1, "student_id": 2, "status": "PRESENT"},
        {"session_id": 1, "student_id": 3, "status": "PRESENT"},
        {"session_id": 2, "student_id": 1, "status": "PRESENT"},
        {"session_id": 2, "student_id": 2, "status": "ABSENT"},
        {"session_id": 2, "student_id": 3, "status": "EXCUSED"},
        {"session_id": 3, "student_id": 4, "status": "late"}
    ],
    "assignments": [
        {"id": 1, "class_id": 1, "title": "Quiz 1"},
        {"id": 2, "class_id": 2, "title": "Lab report"}
    ],
    "submissions": [
        {"id": 1, "assignment_id": 1, "student_id": 1, "score": 40},
        {"id": 2, "assignment_id": 1, "student_id": 2, "score": 60},
        {"id": 3, "assignment_id": 1, "student_id": 3, "score": 80},
        {"id": 4, "assignment_id": 2, "student_id": 4, "score": 90}
    ]
}"#;

async fn app_with(snapshot: Option<&str>) -> axum::Router {
    let db = Database::open_memory().await.unwrap();
    if let Some(json) = snapshot {
        import_snapshot(&db, Snapshot::from_json(json).unwrap())
            .await
            .unwrap();
    }
    let engine = PerformanceEngine::from_database(db, &Settings::default());
    router(Arc::new(AppState::new(Arc::new(engine))))
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn ids(body: &Value) -> Vec<&str> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn test_list_is_sorted_newest_period_then_course_name() {
    let (status, body) = get(app_with(Some(SNAPSHOT)).await, "/performance/reports").await;
    assert_eq!(status, StatusCode::OK);
    // March 2025: Algebra (1, 3) before Biology (2); then November 2024.
    assert_eq!(ids(&body), vec!["PERF-1", "PERF-3", "PERF-2", "PERF-4"]);
}

#[tokio::test]
async fn test_list_entries_use_camel_case_and_rounded_rates() {
    let (_, body) = get(app_with(Some(SNAPSHOT)).await, "/performance/reports").await;
    let first = &body[0];
    assert_eq!(first["classId"], 1);
    assert_eq!(first["courseName"], "Algebra");
    assert_eq!(first["teacherName"], "Ms. Tran");
    assert_eq!(first["month"], 3);
    assert_eq!(first["year"], 2025);
    assert_eq!(first["averageScore"], 60.0);
    assert_eq!(first["passRate"], 67.0);
    assert_eq!(first["attendanceRate"], 67.0);
    assert_eq!(first["totalStudents"], 3);
    assert_eq!(first["highPerformers"], 0);
    assert_eq!(first["lowPerformers"], 0);
    assert_eq!(first["improvementRate"], 0.0);
    assert!(first["notes"].is_null());
}

#[tokio::test]
async fn test_filters_combine_and_empty_values_are_ignored() {
    let app = app_with(Some(SNAPSHOT)).await;
    let (status, body) = get(app.clone(), "/performance/reports?course_id=1&month=3&year=2025").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec!["PERF-1", "PERF-3"]);

    let (_, body) = get(app.clone(), "/performance/reports?course_id=1&teacher_id=2").await;
    assert_eq!(ids(&body), vec!["PERF-3"]);

    let (_, body) = get(app, "/performance/reports?month=&year=&course_id=").await;
    assert_eq!(body.as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_malformed_filters_are_bad_requests() {
    let app = app_with(Some(SNAPSHOT)).await;
    for uri in [
        "/performance/reports?month=abc",
        "/performance/reports?month=13",
        "/performance/reports?year=20x5",
        "/performance/reports?course_id=1.5",
        "/performance/reports?teacher_id=NaN",
    ] {
        let (status, body) = get(app.clone(), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(body["error"].is_string());
        assert!(body["message"].is_string());
    }
}

#[tokio::test]
async fn test_detail_round_trips_a_list_entry() {
    let app = app_with(Some(SNAPSHOT)).await;
    let (_, list) = get(app.clone(), "/performance/reports").await;
    let entry = &list[0];

    let (status, detail) = get(app, "/performance/reports/PERF-1").await;
    assert_eq!(status, StatusCode::OK);
    for (key, value) in entry.as_object().unwrap() {
        assert_eq!(&detail[key], value, "field {key}");
    }

    let students = detail["students"].as_array().unwrap();
    assert_eq!(students.len() as u64, entry["totalStudents"].as_u64().unwrap());
    let names: Vec<&str> = students
        .iter()
        .map(|s| s["studentName"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Chi", "Ben", "Ana"]);
    assert_eq!(students[0]["attendance"], 50.0);
    assert_eq!(students[0]["assignmentsCompleted"], 1);
}

#[tokio::test]
async fn test_unknown_or_empty_reports_are_not_found() {
    let app = app_with(Some(SNAPSHOT)).await;
    // PERF-4 exists in the list but has no enrolled students.
    for uri in [
        "/performance/reports/PERF-999",
        "/performance/reports/not-an-id",
        "/performance/reports/PERF-4",
    ] {
        let (status, body) = get(app.clone(), uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn test_summary_over_empty_store_is_all_zero() {
    let (status, body) = get(app_with(None).await, "/performance/summary").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["averageScore"], 0.0);
    assert_eq!(body["totalCourses"], 0);
    assert_eq!(body["highPerforming"], 0);
    assert_eq!(body["lowPerforming"], 0);
    assert_eq!(body["overallImprovement"], 0.0);
}

#[tokio::test]
async fn test_summary_counts_classes_and_pools_scores() {
    let (status, body) = get(app_with(Some(SNAPSHOT)).await, "/performance/summary").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalCourses"], 4);
    assert_eq!(body["averageScore"], 67.5);
}
