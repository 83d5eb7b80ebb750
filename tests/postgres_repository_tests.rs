//! Runs against a real PostgreSQL instance:
//! `DATABASE_URL=postgres://... cargo test -- --ignored`

use template_service::{
    config::DatabaseConfig,
    dto::filter::{FilterCondition, FilterOperator, PaginationInputWithFilter},
    error::AppError,
    models::{
        file::{File, FilePatch, NewFile},
        user::{NewUser, User},
    },
    repository::{PgRepository, PgUserRepository, Repository, UserRepository},
    services::database::Database,
};

async fn connect() -> Database {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let database = Database::connect(&DatabaseConfig {
        url,
        max_connections: 2,
    })
    .await
    .expect("failed to connect");
    database.migrate().await.expect("failed to migrate");
    database
}

fn new_file(description: &str) -> NewFile {
    NewFile {
        name: format!("{}.txt", uuid::Uuid::new_v4()),
        directory: "uploads".to_string(),
        description: description.to_string(),
        mime_type: "text/plain".to_string(),
    }
}

#[tokio::test]
#[ignore]
async fn test_file_repository_lifecycle() {
    let database = connect().await;
    let repo = PgRepository::<File>::new(database.pool().clone());

    let created = repo.create(new_file("before")).await.unwrap();
    assert!(created.id > 0);

    let updated = repo
        .update(
            created.id,
            FilePatch {
                description: Some("after".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.description, "after");
    assert!(updated.updated_at >= created.updated_at);

    let fetched = repo.get_by_id(created.id).await.unwrap();
    assert_eq!(fetched, updated);

    repo.delete(created.id).await.unwrap();
    assert!(matches!(
        repo.get_by_id(created.id).await,
        Err(AppError::NotFound { .. })
    ));
    assert!(matches!(
        repo.delete(created.id).await,
        Err(AppError::NotFound { .. })
    ));
    assert!(matches!(
        repo.update(created.id, FilePatch::default()).await,
        Err(AppError::NotFound { .. })
    ));
}

#[tokio::test]
#[ignore]
async fn test_file_repository_filter_and_paging() {
    let database = connect().await;
    let repo = PgRepository::<File>::new(database.pool().clone());
    let marker = uuid::Uuid::new_v4().to_string();

    for i in 0..3 {
        repo.create(new_file(&format!("{} #{}", marker, i))).await.unwrap();
    }

    let mut req = PaginationInputWithFilter::new(1, 2);
    req.filter.insert(
        "description".to_string(),
        FilterCondition {
            operator: FilterOperator::Contains,
            from: marker.clone(),
            to: None,
        },
    );

    let (total, items) = repo.get_by_filter(&req).await.unwrap();
    assert_eq!(total, 3);
    assert_eq!(items.len(), 2);
    assert!(items[0].id < items[1].id);

    req.page_number = 2;
    let (_, items) = repo.get_by_filter(&req).await.unwrap();
    assert_eq!(items.len(), 1);
}

#[tokio::test]
#[ignore]
async fn test_user_repository_enforces_unique_identity() {
    let database = connect().await;
    let users = PgUserRepository::new(database.pool().clone());
    let identity = uuid::Uuid::new_v4().to_string();

    assert!(!users.exists_user_id(&identity).await.unwrap());

    let user: User = users.create_user(NewUser::new(identity.as_str())).await.unwrap();
    assert_eq!(user.user_id, identity);
    assert!(users.exists_user_id(&identity).await.unwrap());

    let err = users
        .create_user(NewUser::new(identity.as_str()))
        .await
        .unwrap_err();
    assert!(err.is_duplicate());
}
