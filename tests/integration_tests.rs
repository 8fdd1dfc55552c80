// Integration tests for Skill Match

use actix_web::{http::header, http::StatusCode, test, web, App};
use async_trait::async_trait;
use serde_json::{json, Value};
use skill_match::core::{Enricher, TeacherMatcher, ValidSkill};
use skill_match::models::{Embedded, ProficiencyLevel, Profile, SkillMatch, Teacher};
use skill_match::routes::{self, teachers::AppState};
use skill_match::services::{ChatPrompt, DescriptionGenerator, EnrichmentError, StoreError, TeacherStore};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

const FALLBACK: &str = "Experienced educator ready to help you learn.";

/// In-memory data store with call counters
#[derive(Default)]
struct MemoryStore {
    skills: Vec<(String, String, ProficiencyLevel)>,
    teachers: Vec<Teacher>,
    profiles: Vec<Profile>,
    skill_calls: AtomicUsize,
    profile_calls: AtomicUsize,
    fail_profiles: bool,
}

impl MemoryStore {
    fn teacher(mut self, id: &str, rank: u32, bio: Option<&str>) -> Self {
        self.teachers.push(Teacher {
            id: id.to_string(),
            user_id: format!("user-{}", id),
            occupation: "Software Engineer".to_string(),
            years_of_experience: 4,
            rank,
            bio: bio.map(str::to_string),
            expertise_areas: vec!["Backend".to_string()],
        });
        self.profiles.push(Profile {
            id: format!("user-{}", id),
            full_name: format!("Teacher {}", id),
            email: Some(format!("{}@example.com", id)),
        });
        self
    }

    fn skill(mut self, teacher_id: &str, name: &str) -> Self {
        self.skills.push((teacher_id.to_string(), name.to_string(), ProficiencyLevel::Advanced));
        self
    }
}

#[async_trait]
impl TeacherStore for MemoryStore {
    async fn find_skill_matches(&self, skill: &ValidSkill) -> Result<Vec<SkillMatch>, StoreError> {
        self.skill_calls.fetch_add(1, Ordering::SeqCst);
        let needle = skill.as_str().to_lowercase();

        Ok(self
            .skills
            .iter()
            .filter(|(_, name, _)| name.to_lowercase().contains(&needle))
            .map(|(teacher_id, name, level)| SkillMatch {
                teacher_id: teacher_id.clone(),
                skill_name: name.clone(),
                proficiency_level: *level,
                teachers: self
                    .teachers
                    .iter()
                    .find(|t| &t.id == teacher_id)
                    .cloned()
                    .map(|t| Embedded::Many(vec![t])),
            })
            .collect())
    }

    async fn fetch_profiles(&self, user_ids: &[String]) -> Result<Vec<Profile>, StoreError> {
        self.profile_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_profiles {
            return Err(StoreError::ApiError("profiles unavailable".to_string()));
        }
        Ok(self
            .profiles
            .iter()
            .filter(|p| user_ids.contains(&p.id))
            .cloned()
            .collect())
    }
}

/// Generator that fails for chosen teacher names and records every prompt
#[derive(Default)]
struct RecordingGenerator {
    fail_for: Vec<String>,
    prompts: Mutex<Vec<String>>,
}

#[async_trait]
impl DescriptionGenerator for RecordingGenerator {
    async fn generate(&self, prompt: &ChatPrompt) -> Result<String, EnrichmentError> {
        self.prompts.lock().unwrap().push(prompt.user.clone());
        let name = prompt
            .user
            .lines()
            .find_map(|line| line.strip_prefix("Name: "))
            .unwrap_or_default()
            .to_string();

        if self.fail_for.contains(&name) {
            Err(EnrichmentError::ApiError(503))
        } else {
            Ok(format!("{} is a great match.", name))
        }
    }
}

fn matcher(store: Arc<MemoryStore>, generator: Arc<RecordingGenerator>) -> TeacherMatcher {
    TeacherMatcher::new(store, Enricher::with_defaults(generator))
}

#[tokio::test]
async fn test_lower_rank_comes_first() {
    let store = Arc::new(
        MemoryStore::default()
            .teacher("a", 2, None)
            .teacher("b", 1, None)
            .skill("a", "Python Programming")
            .skill("b", "Python Basics"),
    );
    let response = matcher(store, Arc::default())
        .match_teachers(&json!("python"))
        .await
        .unwrap();

    let ids: Vec<_> = response.teachers.iter().map(|t| t.teacher.id.as_str()).collect();
    assert_eq!(ids, vec!["b", "a"]);
    assert_eq!(response.teachers[0].skill_name, "Python Basics");
}

#[tokio::test]
async fn test_no_matches_is_empty_list() {
    let store = Arc::new(MemoryStore::default().teacher("a", 1, None).skill("a", "Rust"));
    let response = matcher(store.clone(), Arc::default())
        .match_teachers(&json!("zz-nonexistent-skill"))
        .await
        .unwrap();

    assert!(response.teachers.is_empty());
    assert_eq!(serde_json::to_value(&response).unwrap(), json!({ "teachers": [] }));
    assert_eq!(store.profile_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_invalid_query_never_touches_store() {
    let store = Arc::new(MemoryStore::default().teacher("a", 1, None).skill("a", "Rust"));
    let m = matcher(store.clone(), Arc::default());

    for raw in [json!("r"), json!("x".repeat(101)), json!("rust;"), json!(7), Value::Null] {
        assert!(m.match_teachers(&raw).await.is_err(), "{} should be rejected", raw);
    }

    assert_eq!(store.skill_calls.load(Ordering::SeqCst), 0);
    assert_eq!(store.profile_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_two_matching_skills_give_two_entries() {
    let store = Arc::new(
        MemoryStore::default()
            .teacher("a", 1, None)
            .skill("a", "Python Programming")
            .skill("a", "Python for Data Science"),
    );
    let response = matcher(store.clone(), Arc::default())
        .match_teachers(&json!("Python"))
        .await
        .unwrap();

    let skills: Vec<_> = response.teachers.iter().map(|t| t.skill_name.as_str()).collect();
    assert_eq!(skills, vec!["Python Programming", "Python for Data Science"]);
    assert!(response.teachers.iter().all(|t| t.teacher.id == "a"));
    assert_eq!(store.profile_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_only_first_five_enriched_and_ties_stable() {
    let mut store = MemoryStore::default();
    for i in 0..8 {
        let id = format!("t{}", i);
        store = store.teacher(&id, if i % 2 == 0 { 2 } else { 1 }, None).skill(&id, "Guitar");
    }
    let generator = Arc::new(RecordingGenerator::default());
    let response = matcher(Arc::new(store), generator.clone())
        .match_teachers(&json!("guitar"))
        .await
        .unwrap();

    let ids: Vec<_> = response.teachers.iter().map(|t| t.teacher.id.as_str()).collect();
    assert_eq!(ids, vec!["t1", "t3", "t5", "t7", "t0", "t2", "t4", "t6"]);

    for (i, view) in response.teachers.iter().enumerate() {
        if i < 5 {
            let expected = format!("Teacher {} is a great match.", view.teacher.id);
            assert_eq!(view.ai_description.as_deref(), Some(expected.as_str()));
        } else {
            assert!(view.ai_description.is_none());
        }
    }
    assert_eq!(generator.prompts.lock().unwrap().len(), 5);

    let json = serde_json::to_value(&response).unwrap();
    assert!(json["teachers"][5].get("aiDescription").is_none());
    assert!(json["teachers"][0]["aiDescription"].is_string());
}

#[tokio::test]
async fn test_failed_enrichment_uses_bio_then_fixed_text() {
    let store = Arc::new(
        MemoryStore::default()
            .teacher("a", 1, Some("Ten years of teaching chess."))
            .teacher("b", 2, None)
            .teacher("c", 3, Some(""))
            .teacher("d", 4, None)
            .skill("a", "Chess")
            .skill("b", "Chess Openings")
            .skill("c", "Chess Endgames")
            .skill("d", "Chess Tactics"),
    );
    let generator = Arc::new(RecordingGenerator {
        fail_for: vec!["Teacher a".to_string(), "Teacher c".to_string()],
        ..Default::default()
    });

    let response = matcher(store, generator).match_teachers(&json!("chess")).await.unwrap();
    let descriptions: Vec<_> = response
        .teachers
        .iter()
        .map(|t| t.ai_description.as_deref().unwrap())
        .collect();

    assert_eq!(
        descriptions,
        vec![
            "Ten years of teaching chess.",
            "Teacher b is a great match.",
            FALLBACK,
            "Teacher d is a great match.",
        ]
    );
}

#[tokio::test]
async fn test_profile_failure_keeps_results() {
    let mut store = MemoryStore::default().teacher("a", 1, None).skill("a", "Drawing");
    store.fail_profiles = true;
    let generator = Arc::new(RecordingGenerator::default());

    let response = matcher(Arc::new(store), generator.clone())
        .match_teachers(&json!("draw"))
        .await
        .unwrap();

    assert_eq!(response.teachers.len(), 1);
    assert!(response.teachers[0].profile.is_none());
    assert!(generator.prompts.lock().unwrap()[0].contains("Name: Experienced teacher"));
}

#[tokio::test]
async fn test_orphaned_skill_rows_dropped() {
    let store = Arc::new(
        MemoryStore::default()
            .teacher("a", 3, None)
            .skill("a", "Spanish")
            .skill("deleted", "Spanish Grammar"),
    );
    let response = matcher(store, Arc::default())
        .match_teachers(&json!("spanish"))
        .await
        .unwrap();

    assert_eq!(response.teachers.len(), 1);
    assert_eq!(response.teachers[0].teacher.id, "a");
}

// HTTP surface

fn app_state(store: MemoryStore) -> AppState {
    AppState {
        matcher: Arc::new(matcher(Arc::new(store), Arc::default())),
    }
}

#[actix_web::test]
async fn test_http_match_success() {
    let state = app_state(
        MemoryStore::default()
            .teacher("a", 2, None)
            .teacher("b", 1, None)
            .skill("a", "Python Programming")
            .skill("b", "Python Basics"),
    );
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .app_data(routes::teachers::json_config())
            .wrap(routes::cors())
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/teachers/match")
        .set_json(json!({ "skill": "python" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["teachers"][0]["id"], "b");
    assert_eq!(body["teachers"][0]["rank"], 1);
    assert_eq!(body["teachers"][0]["profile"]["full_name"], "Teacher b");
    assert_eq!(body["teachers"][1]["skill_name"], "Python Programming");
}

#[actix_web::test]
async fn test_http_errors() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state(MemoryStore::default())))
            .app_data(routes::teachers::json_config())
            .wrap(routes::cors())
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/teachers/match")
        .set_json(json!({ "skill": "c++" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "Search term contains invalid characters" }));

    let req = test::TestRequest::post()
        .uri("/api/v1/teachers/match")
        .set_json(json!({}))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["error"], "Skill must be a string");

    let req = test::TestRequest::post()
        .uri("/api/v1/teachers/match")
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().starts_with("Invalid JSON"));
}

#[actix_web::test]
async fn test_http_preflight_through_cors() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state(MemoryStore::default())))
            .wrap(routes::cors())
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::default()
        .method(actix_web::http::Method::OPTIONS)
        .uri("/api/v1/teachers/match")
        .insert_header((header::ORIGIN, "https://app.example.com"))
        .insert_header((header::ACCESS_CONTROL_REQUEST_METHOD, "POST"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    assert!(test::read_body(resp).await.is_empty());
}

#[actix_web::test]
async fn test_http_health() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state(MemoryStore::default())))
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "healthy");
}
