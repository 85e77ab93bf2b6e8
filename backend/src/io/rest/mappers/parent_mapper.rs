use crate::domain::models::Parent as DomainParent;
use shared::{Child as SharedChild, Parent as SharedParent, ParentResponse};

/// Mapper from domain parents to shared Parent DTOs. The password hash
/// never leaves the domain layer.
pub struct ParentMapper;

impl ParentMapper {
    pub fn to_dto(domain: DomainParent) -> SharedParent {
        SharedParent {
            id: domain.id,
            name: domain.name,
            age: domain.age,
            email: domain.email,
            created_at: domain.created_at,
        }
    }

    pub fn to_response(domain: DomainParent, message: &str, merged_child: Option<SharedChild>) -> ParentResponse {
        ParentResponse {
            parent: Self::to_dto(domain),
            success_message: message.to_string(),
            merged_child,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_to_dto_drops_password_hash() {
        let parent = DomainParent {
            id: 7,
            name: "Priya".to_string(),
            age: Some(31),
            email: "priya@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            created_at: Utc::now(),
        };

        let json = serde_json::to_string(&ParentMapper::to_dto(parent)).unwrap();

        assert!(json.contains("priya@example.com"));
        assert!(!json.contains("argon2"));
    }
}
