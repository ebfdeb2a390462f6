use mongodb::bson::doc;
use mongodb::options::IndexOptions;
use mongodb::IndexModel;

use crate::config::Config;
use crate::database::MongoDB;
use crate::utils::error::AppError;

pub const USERS_COLLECTION: &str = "users";
pub const USERNAME_INDEX: &str = "username_unique_idx";
pub const EMAIL_INDEX: &str = "email_unique_idx";

// Server error codes
const NAMESPACE_EXISTS: i32 = 48;
const INDEX_OPTIONS_CONFLICT: i32 = 85;
const INDEX_KEY_SPECS_CONFLICT: i32 = 86;
const DUPLICATE_USER: i32 = 51003;

/// One-time database bootstrap, run at startup before the server binds.
///
/// Ensures the `users` collection, the root user (dbOwner on the target
/// database only) and the two uniqueness indexes exist. Every step is safe
/// to re-run against an already-initialized database: restarts hit the same
/// code path as first boot. The one exception is an index that already
/// exists under the same name with different options, which means the
/// deployment has drifted and aborts startup.
pub async fn run(db: &MongoDB, config: &Config) -> Result<(), AppError> {
    log::info!("🔧 Bootstrapping database: {}", config.db_name);

    ensure_users_collection(db).await?;
    ensure_root_user(db, config).await?;
    ensure_indexes(db).await?;

    log::info!("✅ Database bootstrap complete");
    Ok(())
}

async fn ensure_users_collection(db: &MongoDB) -> Result<(), AppError> {
    match db.database().create_collection(USERS_COLLECTION).await {
        Ok(()) => log::info!("   ✅ Collection created: {}", USERS_COLLECTION),
        Err(e) if command_error_code(&e) == Some(NAMESPACE_EXISTS) => {
            log::info!("   ℹ️  Collection already exists: {}", USERS_COLLECTION);
        }
        Err(e) => {
            return Err(AppError::DatabaseError(format!(
                "failed to create collection {}: {}",
                USERS_COLLECTION, e
            )));
        }
    }
    Ok(())
}

/// Create the root user with dbOwner on the target database — full control
/// over this database, no server-wide privileges.
async fn ensure_root_user(db: &MongoDB, config: &Config) -> Result<(), AppError> {
    let command = doc! {
        "createUser": &config.root_username,
        "pwd": &config.root_password,
        "roles": [
            { "role": "dbOwner", "db": &config.db_name }
        ],
    };

    match db.database().run_command(command).await {
        Ok(_) => log::info!(
            "   ✅ Root user created: {} (dbOwner on {})",
            config.root_username,
            config.db_name
        ),
        Err(e) if command_error_code(&e) == Some(DUPLICATE_USER) => {
            log::warn!(
                "   ⚠️  Root user already exists: {} — keeping existing credentials",
                config.root_username
            );
        }
        Err(e) => {
            return Err(AppError::DatabaseError(format!(
                "failed to create root user {}: {}",
                config.root_username, e
            )));
        }
    }
    Ok(())
}

async fn ensure_indexes(db: &MongoDB) -> Result<(), AppError> {
    let users = db.collection::<mongodb::bson::Document>(USERS_COLLECTION);

    // users(username): unique across all documents
    let username_index = IndexModel::builder()
        .keys(doc! { "username": 1 })
        .options(
            IndexOptions::builder()
                .unique(true)
                .name(USERNAME_INDEX.to_string())
                .build(),
        )
        .build();

    create_index(&users, username_index, USERNAME_INDEX).await?;

    // users(email): unique but sparse — documents without an email are
    // excluded from the uniqueness check
    let email_index = IndexModel::builder()
        .keys(doc! { "email": 1 })
        .options(
            IndexOptions::builder()
                .unique(true)
                .sparse(true)
                .name(EMAIL_INDEX.to_string())
                .build(),
        )
        .build();

    create_index(&users, email_index, EMAIL_INDEX).await?;

    Ok(())
}

async fn create_index(
    collection: &mongodb::Collection<mongodb::bson::Document>,
    index: IndexModel,
    name: &str,
) -> Result<(), AppError> {
    match collection.create_index(index).await {
        Ok(_) => {
            log::info!("   ✅ Index ready: {}", name);
            Ok(())
        }
        Err(e)
            if matches!(
                command_error_code(&e),
                Some(INDEX_OPTIONS_CONFLICT) | Some(INDEX_KEY_SPECS_CONFLICT)
            ) =>
        {
            // Same name, different options: the deployment drifted from the
            // declared schema and must be fixed by hand.
            Err(AppError::Conflict(format!(
                "index {} exists with conflicting options: {}",
                name, e
            )))
        }
        Err(e) => Err(AppError::DatabaseError(format!(
            "failed to create index {}: {}",
            name, e
        ))),
    }
}

fn command_error_code(err: &mongodb::error::Error) -> Option<i32> {
    match err.kind.as_ref() {
        mongodb::error::ErrorKind::Command(command_error) => Some(command_error.code),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::Document;

    const TEST_DB: &str = "user_service_bootstrap_test";

    fn test_config() -> Config {
        Config {
            host: "127.0.0.1".to_string(),
            port: "0".to_string(),
            mongodb_uri: std::env::var("MONGODB_URI")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            db_name: TEST_DB.to_string(),
            root_username: "admin".to_string(),
            root_password: "secret".to_string(),
            secret_key: "test-secret".to_string(),
            access_token_expire_minutes: 60,
            refresh_token_expire_days: 30,
        }
    }

    async fn fresh_db(config: &Config) -> MongoDB {
        let db = MongoDB::new(&config.mongodb_uri, &config.db_name)
            .await
            .unwrap();
        db.database().drop().await.unwrap();
        // Drop the root user too so the create path is exercised
        let _ = db
            .database()
            .run_command(doc! { "dropUser": &config.root_username })
            .await;
        db
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_fresh_database_bootstrap() {
        let config = test_config();
        let db = fresh_db(&config).await;

        run(&db, &config).await.unwrap();

        let collections = db.database().list_collection_names().await.unwrap();
        assert!(collections.contains(&USERS_COLLECTION.to_string()));

        let index_names = db
            .collection::<Document>(USERS_COLLECTION)
            .list_index_names()
            .await
            .unwrap();
        assert!(index_names.contains(&USERNAME_INDEX.to_string()));
        assert!(index_names.contains(&EMAIL_INDEX.to_string()));

        // Root user exists and is scoped to this database only
        let info = db
            .database()
            .run_command(doc! { "usersInfo": &config.root_username })
            .await
            .unwrap();
        let users = info.get_array("users").unwrap();
        assert_eq!(users.len(), 1);
        let roles = users[0]
            .as_document()
            .unwrap()
            .get_array("roles")
            .unwrap();
        assert_eq!(roles.len(), 1);
        let role = roles[0].as_document().unwrap();
        assert_eq!(role.get_str("role").unwrap(), "dbOwner");
        assert_eq!(role.get_str("db").unwrap(), TEST_DB);
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_rerun_is_idempotent() {
        let config = test_config();
        let db = fresh_db(&config).await;

        run(&db, &config).await.unwrap();

        let users = db.collection::<Document>(USERS_COLLECTION);
        users
            .insert_one(doc! { "username": "alice", "hashed_password": "x" })
            .await
            .unwrap();

        // Second run must succeed and leave existing data alone
        run(&db, &config).await.unwrap();

        let count = users.count_documents(doc! {}).await.unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_username_uniqueness_enforced() {
        let config = test_config();
        let db = fresh_db(&config).await;
        run(&db, &config).await.unwrap();

        let users = db.collection::<Document>(USERS_COLLECTION);
        users
            .insert_one(doc! { "username": "alice", "hashed_password": "x" })
            .await
            .unwrap();

        let duplicate = users
            .insert_one(doc! { "username": "alice", "hashed_password": "y" })
            .await;
        assert!(duplicate.is_err());
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_email_uniqueness_is_sparse() {
        let config = test_config();
        let db = fresh_db(&config).await;
        run(&db, &config).await.unwrap();

        let users = db.collection::<Document>(USERS_COLLECTION);

        // Two documents without an email both insert fine
        users
            .insert_one(doc! { "username": "alice", "hashed_password": "x" })
            .await
            .unwrap();
        users
            .insert_one(doc! { "username": "bob", "hashed_password": "y" })
            .await
            .unwrap();

        // Duplicate non-null emails are rejected
        users
            .insert_one(doc! { "username": "carol", "email": "c@example.com", "hashed_password": "z" })
            .await
            .unwrap();
        let duplicate = users
            .insert_one(doc! { "username": "dave", "email": "c@example.com", "hashed_password": "w" })
            .await;
        assert!(duplicate.is_err());
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_conflicting_index_options_abort() {
        let config = test_config();
        let db = fresh_db(&config).await;

        // Pre-create the username index under the declared name but with
        // different options
        let users = db.collection::<Document>(USERS_COLLECTION);
        let non_unique = IndexModel::builder()
            .keys(doc! { "username": 1 })
            .options(IndexOptions::builder().name(USERNAME_INDEX.to_string()).build())
            .build();
        users.create_index(non_unique).await.unwrap();

        let result = run(&db, &config).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }
}
