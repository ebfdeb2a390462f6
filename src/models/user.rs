use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

/// User document as stored in the `users` collection.
///
/// `username` carries a unique index; `email` carries a unique sparse index,
/// so any number of users may omit it but no two may share one.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UserInDb {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub hashed_password: String,
    pub created_at: BsonDateTime,
}

/// Public user shape returned by the API. Never carries the password hash.
#[derive(Debug, Serialize, Deserialize, Clone, utoipa::ToSchema)]
pub struct User {
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl From<UserInDb> for User {
    fn from(user: UserInDb) -> Self {
        User {
            username: user.username,
            email: user.email,
        }
    }
}
