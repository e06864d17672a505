use std::sync::Arc;

use base64::{engine::general_purpose, Engine as _};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde_json::{json, Value};
use sha2::Sha256;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::AuthUser;

pub struct TestConfig {
    pub jwt_secret: String,
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub clerk_webhook_secret: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
            clerk_webhook_secret: "whsec_MfKQ9r8GKYqrTwjUPD8ILPZIo2LaLaSw".to_string(),
        }
    }
}

impl TestConfig {
    pub fn with_store_url(url: &str) -> Self {
        Self {
            supabase_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            supabase_jwt_secret: self.jwt_secret.clone(),
            clerk_webhook_secret: self.clerk_webhook_secret.clone(),
            allowed_origin: String::new(),
            port: 3000,
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub external_id: String,
    pub email: String,
    pub role: String,
}

impl Default for TestUser {
    fn default() -> Self {
        Self::new("test@example.com", "user")
    }
}

impl TestUser {
    pub fn new(email: &str, role: &str) -> Self {
        Self {
            external_id: format!("user_{}", Uuid::new_v4().simple()),
            email: email.to_string(),
            role: role.to_string(),
        }
    }

    pub fn base(email: &str) -> Self {
        Self::new(email, "user")
    }

    pub fn writer(email: &str) -> Self {
        Self::new(email, "writer")
    }

    pub fn medical(email: &str) -> Self {
        Self::new(email, "medical")
    }

    pub fn admin(email: &str) -> Self {
        Self::new(email, "admin")
    }

    pub fn to_auth_user(&self) -> AuthUser {
        AuthUser {
            id: self.external_id.clone(),
            email: Some(self.email.clone()),
            role: Some(self.role.clone()),
            metadata: None,
            created_at: Some(Utc::now()),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(24));

        let header = json!({
            "alg": "HS256",
            "typ": "JWT"
        });

        let payload = json!({
            "sub": user.external_id,
            "email": user.email,
            "role": user.role,
            "iat": now.timestamp(),
            "exp": exp.timestamp()
        });

        let header_encoded = general_purpose::URL_SAFE_NO_PAD.encode(header.to_string());
        let payload_encoded = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());

        let signing_input = format!("{}.{}", header_encoded, payload_encoded);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();
        let signature_encoded = general_purpose::URL_SAFE_NO_PAD.encode(signature);

        format!("{}.{}", signing_input, signature_encoded)
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }
}

pub struct WebhookTestUtils;

impl WebhookTestUtils {
    /// Produce a `v1,<base64>` signature header for a webhook payload.
    pub fn sign_payload(secret: &str, message_id: &str, timestamp: &str, payload: &[u8]) -> String {
        let key_b64 = secret.strip_prefix("whsec_").unwrap_or(secret);
        let key = general_purpose::STANDARD
            .decode(key_b64)
            .expect("test secret must be base64");

        let mut mac =
            Hmac::<Sha256>::new_from_slice(&key).expect("HMAC can take key of any size");
        mac.update(message_id.as_bytes());
        mac.update(b".");
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(payload);

        format!("v1,{}", general_purpose::STANDARD.encode(mac.finalize().into_bytes()))
    }
}

/// Canned PostgREST rows for wiremock-backed handler tests.
pub struct MockRows;

impl MockRows {
    pub fn user(id: Uuid, external_id: &str, email: &str, role: &str) -> Value {
        json!({
            "id": id,
            "external_id": external_id,
            "email": email,
            "username": "testuser",
            "role": role,
            "bio": "",
            "specialty": "",
            "profile_picture_url": "",
            "meeting_link": "",
            "created_at": Utc::now().to_rfc3339(),
            "updated_at": Utc::now().to_rfc3339()
        })
    }

    pub fn medical_user(id: Uuid, external_id: &str, email: &str) -> Value {
        let mut row = Self::user(id, external_id, email, "medical");
        row["specialty"] = json!("Nutritionist");
        row["meeting_link"] = json!("https://meet.example.com/dr-test");
        row
    }

    pub fn availability_slot(id: Uuid, medical_user_id: Uuid, day_of_week: i32) -> Value {
        json!({
            "id": id,
            "medical_user_id": medical_user_id,
            "day_of_week": day_of_week,
            "start_time": "09:00",
            "end_time": "10:00",
            "created_at": Utc::now().to_rfc3339()
        })
    }

    pub fn booking(
        id: Uuid,
        patient_id: Uuid,
        medical_user_id: Uuid,
        start_time: &str,
        status: &str,
    ) -> Value {
        json!({
            "id": id,
            "patient_id": patient_id,
            "medical_user_id": medical_user_id,
            "start_time": start_time,
            "end_time": start_time,
            "status": status,
            "notes": "",
            "meeting_link": "https://meet.example.com/dr-test",
            "created_at": Utc::now().to_rfc3339(),
            "updated_at": Utc::now().to_rfc3339()
        })
    }

    pub fn application(
        id: Uuid,
        user_id: Uuid,
        user_external_id: &str,
        role_applied_for: &str,
        status: &str,
    ) -> Value {
        json!({
            "id": id,
            "user_external_id": user_external_id,
            "user_id": user_id,
            "role_applied_for": role_applied_for,
            "status": status,
            "bio": "I have been writing about nutrition for years.",
            "specialty": if role_applied_for == "medical" { "Dietician" } else { "" },
            "created_at": Utc::now().to_rfc3339(),
            "updated_at": Utc::now().to_rfc3339()
        })
    }

    pub fn category(id: Uuid, name: &str, slug: &str) -> Value {
        json!({
            "id": id,
            "name": name,
            "slug": slug,
            "description": "A test category",
            "image_url": "https://placehold.co/400x300/65a30d/FFFFFF?text=Category",
            "created_at": Utc::now().to_rfc3339()
        })
    }

    pub fn article(id: Uuid, author_external_id: &str, category_id: Uuid, status: &str) -> Value {
        json!({
            "id": id,
            "title": "Healthy Eating 101",
            "slug": "healthy-eating-101",
            "content": "Eat your vegetables.",
            "excerpt": "A primer on healthy eating.",
            "featured_image": "https://placehold.co/600x400/22c55e/FFFFFF?text=ThriveWell",
            "author_external_id": author_external_id,
            "author_name": "testuser",
            "category_id": category_id,
            "status": status,
            "created_at": Utc::now().to_rfc3339(),
            "updated_at": Utc::now().to_rfc3339()
        })
    }
}
