use mongodb::bson::{doc, DateTime as BsonDateTime};

use crate::bootstrap::init_db::USERS_COLLECTION;
use crate::database::MongoDB;
use crate::models::{User, UserInDb};
use crate::services::auth_service;
use crate::services::auth_service::RegisterRequest;

pub async fn find_user_by_username(
    db: &MongoDB,
    username: &str,
) -> Result<Option<UserInDb>, String> {
    let collection = db.collection::<UserInDb>(USERS_COLLECTION);

    collection
        .find_one(doc! { "username": username })
        .await
        .map_err(|e| format!("Database error: {}", e))
}

// Public lookup: password hash stripped
pub async fn get_user(db: &MongoDB, username: &str) -> Result<Option<User>, String> {
    let user = find_user_by_username(db, username).await?;
    Ok(user.map(User::from))
}

// User registration
pub async fn create_user(db: &MongoDB, request: &RegisterRequest) -> Result<User, String> {
    if request.username.trim().is_empty() {
        return Err("Username is required".to_string());
    }
    if request.password.is_empty() {
        return Err("Password is required".to_string());
    }
    if let Some(email) = &request.email {
        if !email.contains('@') {
            return Err(format!("Invalid email: {}", email));
        }
    }

    if find_user_by_username(db, &request.username).await?.is_some() {
        return Err("User already exists".to_string());
    }

    let new_user = UserInDb {
        id: None,
        username: request.username.clone(),
        email: request.email.clone(),
        hashed_password: auth_service::hash_password(&request.password)?,
        created_at: BsonDateTime::now(),
    };

    let collection = db.collection::<UserInDb>(USERS_COLLECTION);
    match collection.insert_one(&new_user).await {
        Ok(_) => {}
        // The unique indexes close the race between the existence check and
        // the insert
        Err(e) if is_duplicate_key(&e) => return Err("User already exists".to_string()),
        Err(e) => return Err(format!("Failed to create user: {}", e)),
    }

    log::info!("✅ User registered: {}", new_user.username);

    Ok(User::from(new_user))
}

// Change user password
pub async fn change_password(
    db: &MongoDB,
    username: &str,
    new_password: &str,
) -> Result<User, String> {
    if new_password.is_empty() {
        return Err("Password is required".to_string());
    }

    let hashed_password = auth_service::hash_password(new_password)?;

    let collection = db.collection::<UserInDb>(USERS_COLLECTION);
    let result = collection
        .update_one(
            doc! { "username": username },
            doc! { "$set": { "hashed_password": hashed_password } },
        )
        .await
        .map_err(|e| format!("Failed to update password: {}", e))?;

    if result.matched_count == 0 {
        return Err("User not found".to_string());
    }

    get_user(db, username)
        .await?
        .ok_or_else(|| "User not found".to_string())
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        mongodb::error::ErrorKind::Write(mongodb::error::WriteFailure::WriteError(
            write_error,
        )) => write_error.code == 11000,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db_name() -> String {
        "user_service_users_test".to_string()
    }

    async fn fresh_db() -> MongoDB {
        let uri = std::env::var("MONGODB_URI")
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        let db = MongoDB::new(&uri, &test_db_name()).await.unwrap();
        db.database().drop().await.unwrap();
        db
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_create_and_fetch_user() {
        let db = fresh_db().await;

        let request = RegisterRequest {
            username: "alice".to_string(),
            email: Some("alice@example.com".to_string()),
            password: "s3cret!".to_string(),
        };

        let created = create_user(&db, &request).await.unwrap();
        assert_eq!(created.username, "alice");

        let fetched = find_user_by_username(&db, "alice").await.unwrap().unwrap();
        assert_ne!(fetched.hashed_password, "s3cret!");

        let duplicate = create_user(&db, &request).await;
        assert_eq!(duplicate.unwrap_err(), "User already exists");
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_change_password() {
        let db = fresh_db().await;

        let request = RegisterRequest {
            username: "bob".to_string(),
            email: None,
            password: "old-password".to_string(),
        };
        create_user(&db, &request).await.unwrap();

        change_password(&db, "bob", "new-password").await.unwrap();

        let user = find_user_by_username(&db, "bob").await.unwrap().unwrap();
        assert!(auth_service::verify_password("new-password", &user.hashed_password).unwrap());
        assert!(!auth_service::verify_password("old-password", &user.hashed_password).unwrap());

        let missing = change_password(&db, "nobody", "pw").await;
        assert_eq!(missing.unwrap_err(), "User not found");
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_register_validation_rejects_bad_input() {
        let db = fresh_db().await;

        let blank_username = RegisterRequest {
            username: "   ".to_string(),
            email: None,
            password: "pw".to_string(),
        };
        assert_eq!(
            create_user(&db, &blank_username).await.unwrap_err(),
            "Username is required"
        );

        let bad_email = RegisterRequest {
            username: "carol".to_string(),
            email: Some("not-an-email".to_string()),
            password: "pw".to_string(),
        };
        assert!(create_user(&db, &bad_email)
            .await
            .unwrap_err()
            .starts_with("Invalid email"));
    }
}
