//! Identity supplied by the upstream authentication gateway.
//!
//! Tokens and sessions are handled before requests reach this service; the
//! gateway forwards the authenticated user as headers.

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::error::AppError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("admin") {
            Role::Admin
        } else {
            Role::User
        }
    }
}

/// The authenticated caller; rejects the request with 401 when absent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: Uuid,
    pub role: Role,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

        let id = Uuid::parse_str(raw_id.trim())
            .map_err(|_| AppError::Unauthorized("Invalid user ID".to_string()))?;

        let role = parts
            .headers
            .get(USER_ROLE_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(Role::parse)
            .unwrap_or(Role::User);

        Ok(Self { id, role })
    }
}

/// A caller holding the admin role; 403 for everyone else
#[derive(Debug, Clone, Copy)]
pub struct AdminUser(pub CurrentUser);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(AppError::Forbidden("Admin access required".to_string()));
        }
        Ok(Self(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(headers: &[(&str, &str)]) -> Result<CurrentUser, AppError> {
        let mut builder = Request::builder().uri("/");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        CurrentUser::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_missing_user_is_unauthorized() {
        assert!(matches!(extract(&[]).await, Err(AppError::Unauthorized(_))));
        assert!(matches!(
            extract(&[(USER_ID_HEADER, "not-a-uuid")]).await,
            Err(AppError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_role_defaults_to_user() {
        let id = Uuid::new_v4().to_string();
        let user = extract(&[(USER_ID_HEADER, id.as_str())]).await.unwrap();
        assert_eq!(user.role, Role::User);

        let admin = extract(&[(USER_ID_HEADER, id.as_str()), (USER_ROLE_HEADER, "Admin")])
            .await
            .unwrap();
        assert!(admin.is_admin());
    }
}
