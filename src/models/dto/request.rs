use secrecy::{ExposeSecret, SecretString};
use serde::{Serialize, Serializer};

fn expose_secret<S: Serializer>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

#[derive(Debug, Serialize)]
pub struct Credentials {
    pub email: String,
    #[serde(serialize_with = "expose_secret")]
    pub password: SecretString,
}

impl Credentials {
    pub fn new(email: &str, password: &str) -> Self {
        Credentials {
            email: email.to_string(),
            password: SecretString::from(password.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    #[serde(serialize_with = "expose_secret")]
    pub password: SecretString,
    pub full_name: String,
    pub qualification: String,
    /// `YYYY-MM-DD`
    pub dob: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualification: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dob: Option<String>,
}
