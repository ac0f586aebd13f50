/// Collection definitions
///
/// One `ResourceSpec` per collection; the generic operations in
/// `store::resource` and the routes in `routes::resources` are driven
/// entirely by these values.
use serde_json::{Map, Value};

use crate::auth::hash_password;
use crate::error::AppError;
use crate::store::resource::{Reference, ResourceSpec};

/// Replace the plaintext `password` field with its bcrypt hash before the
/// document hits the store. The plaintext never leaves this function.
fn hash_password_field(body: &mut Map<String, Value>) -> Result<(), AppError> {
    if let Some(Value::String(plaintext)) = body.get("password") {
        let hashed = hash_password(plaintext)?;
        body.insert("password".to_string(), Value::String(hashed));
    }
    Ok(())
}

/// `refreshTokens` is managed exclusively by the auth subsystem, so it is
/// neither client-settable nor ever serialized into a response.
pub static USERS: ResourceSpec = ResourceSpec {
    collection: "users",
    fields: &["username", "email", "password"],
    required: &["username", "email", "password"],
    unique: &["username", "email"],
    filterable: &["username", "email"],
    updatable: &["username", "email"],
    hidden: &["password", "refreshTokens"],
    references: &[],
    prepare: Some(hash_password_field),
};

pub static POSTS: ResourceSpec = ResourceSpec {
    collection: "posts",
    fields: &["title", "content", "sender"],
    required: &["title", "sender"],
    unique: &[],
    filterable: &["sender"],
    updatable: &["title", "content"],
    hidden: &[],
    references: &[],
    prepare: None,
};

pub static COMMENTS: ResourceSpec = ResourceSpec {
    collection: "comments",
    fields: &["postId", "content", "sender"],
    required: &["postId", "content", "sender"],
    unique: &[],
    filterable: &["postId", "sender"],
    updatable: &["content"],
    hidden: &[],
    references: &[
        Reference {
            field: "postId",
            collection: "posts",
            not_found_message: "Post not found",
        },
        Reference {
            field: "sender",
            collection: "users",
            not_found_message: "Sender not found",
        },
    ],
    prepare: None,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::verify_password;
    use serde_json::json;

    #[test]
    fn password_field_is_hashed_in_place() {
        let mut body = Map::new();
        body.insert("username".to_string(), json!("Tal"));
        body.insert("password".to_string(), json!("testpassword"));

        hash_password_field(&mut body).expect("Failed to hash");

        let stored = body["password"].as_str().unwrap();
        assert_ne!(stored, "testpassword");
        assert!(verify_password("testpassword", stored).unwrap());
    }

    #[test]
    fn missing_password_is_left_to_required_check() {
        let mut body = Map::new();
        body.insert("username".to_string(), json!("Tal"));

        hash_password_field(&mut body).expect("hook must not fail");
        assert!(body.get("password").is_none());
    }

    #[test]
    fn users_never_expose_credentials() {
        assert!(USERS.hidden.contains(&"password"));
        assert!(USERS.hidden.contains(&"refreshTokens"));
        // password is written at creation only
        assert!(!USERS.updatable.contains(&"password"));
    }
}
