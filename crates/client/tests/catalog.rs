use client::{CatalogClient, CatalogSession, ClientConfig, ErrorKind, ServiceError};
use models::{
    Course, CourseForm, Field, InstanceForm, InstanceKey, NewCourse, NewInstance, Semester, Term, Year,
};
use pretty_assertions::assert_eq;
use server::state::AppState;
use tokio::net::TcpListener;

async fn spawn_service() -> CatalogClient {
    spawn_service_with(AppState::new()).await
}

async fn spawn_service_with(state: AppState) -> CatalogClient {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(server::serve(listener, state));

    CatalogClient::new(&ClientConfig::new(format!("http://{addr}/api"))).unwrap()
}

fn course_form(id: &str, title: &str, prerequisites: &[&str]) -> CourseForm {
    CourseForm {
        course_id: id.to_string(),
        title: title.to_string(),
        description: format!("{title} covers the fundamentals."),
        prerequisites: prerequisites.iter().map(|p| p.to_string()).collect(),
    }
}

fn new_course(id: &str, title: &str, prerequisites: &[&str]) -> NewCourse {
    course_form(id, title, prerequisites).into_new_course().unwrap()
}

#[tokio::test]
async fn test_health() {
    let client = spawn_service().await;
    assert!(client.health().await);
}

#[tokio::test]
async fn test_course_id_with_space_round_trips() {
    let client = spawn_service().await;

    let created = client
        .create_course(&new_course(" cs 101 ", "Intro to Computing", &[]))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(created.course_id.as_str(), "CS 101");

    let fetched = client.get_course("CS 101").await.unwrap();
    assert_eq!(fetched, created);

    client.delete_course("CS 101").await.unwrap();
    let error = client.get_course("CS 101").await.unwrap_err();
    assert_eq!(error.kind(), ErrorKind::NotFound);
    assert_eq!(error.user_message(), "Course CS 101 not found");
}

#[tokio::test]
async fn test_duplicate_course_is_conflict() {
    let client = spawn_service().await;
    let course = new_course("MATH1001", "Calculus One", &[]);

    client.create_course(&course).await.unwrap();
    let error = client.create_course(&course).await.unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Conflict);
    assert_eq!(error.status(), Some(409));
}

#[tokio::test]
async fn test_prerequisite_blocks_delete() {
    let client = spawn_service().await;
    client
        .create_course(&new_course("CS101", "Intro to Computing", &[]))
        .await
        .unwrap();
    client
        .create_course(&new_course("CS201", "Data Structures", &["CS101"]))
        .await
        .unwrap();

    let error = client.delete_course("CS101").await.unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Conflict);
    assert!(error.user_message().contains("prerequisite"));

    let mut session = CatalogSession::start(client.clone(), Term::new(Year(2024), Semester::First))
        .await
        .unwrap();
    let error = session.delete_course("CS101").await.unwrap_err();
    assert!(matches!(error, ServiceError::PrerequisiteInUse { .. }));
    assert_eq!(
        error.user_message(),
        "Cannot delete course: it is a prerequisite for other courses."
    );
    assert!(session.index().contains("CS101"));

    session.delete_course("CS201").await.unwrap();
    session.delete_course("CS101").await.unwrap();
    assert!(session.index().is_empty());
}

#[tokio::test]
async fn test_delete_with_stale_index_is_conflict() {
    let seeded = vec![Course::from(new_course("CS101", "Intro to Computing", &[]))];
    let client = spawn_service_with(AppState::with_courses(seeded)).await;

    let mut session = CatalogSession::start(client.clone(), Term::new(Year(2024), Semester::First))
        .await
        .unwrap();
    assert_eq!(session.index().len(), 1);

    let other = CatalogClient::new(&ClientConfig::new(client.base_url().as_str())).unwrap();
    other
        .create_course(&new_course("CS201", "Data Structures", &["CS101"]))
        .await
        .unwrap();

    let error = session.delete_course("CS101").await.unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Conflict);
    assert!(matches!(error, ServiceError::Conflict { .. }));
    assert_eq!(error.user_message(), "Course CS101 is a prerequisite for CS201");
    assert_eq!(session.index().len(), 1);
    assert!(session.index().contains("CS101"));
}

#[tokio::test]
async fn test_created_instance_is_listed_in_its_term() {
    let client = spawn_service().await;
    client
        .create_course(&new_course("CS101", "Intro to Computing", &[]))
        .await
        .unwrap();

    let instance = NewInstance {
        course_id: "CS101".into(),
        year: Year(2024),
        semester: Semester::Second,
    };
    let created = client.create_instance(&instance).await.unwrap().unwrap();
    assert_eq!(created.title.as_deref(), Some("Intro to Computing"));

    let listed = client.list_instances(Year(2024), Semester::Second).await.unwrap();
    assert_eq!(listed, vec![created.clone()]);
    assert!(
        client
            .list_instances(Year(2024), Semester::First)
            .await
            .unwrap()
            .is_empty()
    );
    assert_eq!(client.list_instances_by_year(Year(2024)).await.unwrap().len(), 1);
    assert_eq!(client.list_course_instances("CS101").await.unwrap().len(), 1);

    let fetched = client.get_instance(&instance.key()).await.unwrap();
    assert_eq!(fetched, created);

    let error = client.create_instance(&instance).await.unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Conflict);

    client.delete_instance(&instance.key()).await.unwrap();
    let error = client.get_instance(&instance.key()).await.unwrap_err();
    assert_eq!(error.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_instance_for_unknown_course_is_bad_request() {
    let client = spawn_service().await;
    let instance = NewInstance {
        course_id: "CS999".into(),
        year: Year(2024),
        semester: Semester::First,
    };

    let error = client.create_instance(&instance).await.unwrap_err();
    assert_eq!(error.kind(), ErrorKind::BadRequest);
    assert_eq!(error.user_message(), "Course CS999 does not exist");
}

#[tokio::test]
async fn test_session_tracks_selected_term() {
    let client = spawn_service().await;
    let mut session = CatalogSession::start(client, Term::new(Year(2024), Semester::First))
        .await
        .unwrap();

    let created = session
        .create_course(&course_form("CS101", "Intro to Computing", &[]))
        .await
        .unwrap();
    assert!(created.refreshed);
    assert_eq!(created.value.course_id.as_str(), "CS101");
    assert_eq!(session.index().len(), 1);

    let offered = session
        .create_instance(&InstanceForm::new("CS101", 2024, 1))
        .await
        .unwrap();
    assert!(!offered.is_stale());
    assert_eq!(offered.value.title.as_deref(), Some("Intro to Computing"));
    session
        .create_instance(&InstanceForm::new("CS101", 2023, 2))
        .await
        .unwrap();
    assert_eq!(session.instances().len(), 1);

    let rows = session.instance_rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].title(), "Intro to Computing");

    session
        .select_term(Term::new(Year(2023), Semester::Second))
        .await
        .unwrap();
    assert_eq!(session.term(), Term::new(Year(2023), Semester::Second));
    assert_eq!(session.instances().len(), 1);

    session
        .delete_instance(&InstanceKey::new(Year(2023), Semester::Second, "CS101"))
        .await
        .unwrap();
    assert!(session.instances().is_empty());
}

#[tokio::test]
async fn test_invalid_form_sends_nothing() {
    let client = spawn_service().await;
    let mut session = CatalogSession::start(client.clone(), Term::new(Year(2024), Semester::First))
        .await
        .unwrap();

    let error = session
        .create_course(&course_form("", "Intro to Computing", &[]))
        .await
        .unwrap_err();
    let errors = error.form_errors().unwrap();
    assert_eq!(errors.len(), 1);
    assert!(errors.contains(Field::CourseId));

    assert!(client.list_courses().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_cycle_is_rejected_before_sending() {
    let client = spawn_service().await;
    let mut session = CatalogSession::start(client.clone(), Term::new(Year(2024), Semester::First))
        .await
        .unwrap();

    session
        .create_course(&course_form("CS101", "Intro to Computing", &["CS201"]))
        .await
        .unwrap();
    let error = session
        .create_course(&course_form("CS201", "Data Structures", &["CS101"]))
        .await
        .unwrap_err();
    assert!(error.form_errors().unwrap().contains(Field::Prerequisites));

    assert_eq!(client.list_courses().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_unreachable_service_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = CatalogClient::new(&ClientConfig::new(format!("http://{addr}/api"))).unwrap();
    let error = client.list_courses().await.unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Transport);
    assert!(!client.health().await);
}
